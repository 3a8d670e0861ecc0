//! JSON transcript chunks to WebVTT.
//!
//! Input looks like `{ "chunks": [ { "timestamp": [0, 2.5], "text": "Hi" } ] }`,
//! where a chunk may carry `start`/`end` instead of `timestamp`. Chunks that
//! cannot be resolved are skipped and never consume a cue index.

use serde::Serialize;
use serde_json::Value;

use crate::{
    format::VttWriter,
    types::{
        Chunk, ChunkOutcome, ResolvedChunk, ResolvedCue, SkipReason, TimeCandidate,
        resolve_interval, resolve_text,
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedChunk {
    /// Zero-based position in the `chunks` array
    pub position: usize,
    pub reason: SkipReason,
}

/// Result of converting a JSON chunk document
#[derive(Debug, Clone, Serialize)]
pub struct JsonConversion {
    pub document: String,
    pub cues: Vec<ResolvedCue>,
    /// `None` when the input had no `chunks` array at all
    pub chunk_count: Option<usize>,
    pub skipped: Vec<SkippedChunk>,
}

/// Decode one untrusted chunk value into a resolved chunk or a skip reason
pub fn decode_chunk(value: &Value) -> ChunkOutcome {
    let text = match resolve_text(value.get("text").and_then(Value::as_str)) {
        Ok(text) => text,
        Err(reason) => return ChunkOutcome::Invalid(reason),
    };

    let timestamp = match field(value, "timestamp") {
        None => TimeCandidate::Absent,
        Some(Value::Array(pair)) if pair.len() == 2 => {
            TimeCandidate::from_pair(pair[0].as_f64(), pair[1].as_f64())
        }
        Some(_) => TimeCandidate::Malformed,
    };
    let start_end = match (field(value, "start"), field(value, "end")) {
        (None, None) => TimeCandidate::Absent,
        (start, end) => {
            TimeCandidate::from_pair(start.and_then(Value::as_f64), end.and_then(Value::as_f64))
        }
    };

    match resolve_interval(timestamp, start_end) {
        Ok(interval) => ChunkOutcome::Valid(ResolvedChunk {
            interval,
            text: text.to_string(),
        }),
        Err(reason) => ChunkOutcome::Invalid(reason),
    }
}

/// A present, non-null field
fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

/// Convert a chunk document, keeping track of emitted cues and skipped chunks
pub fn convert_json(data: &Value) -> JsonConversion {
    let Some(chunks) = data.get("chunks").and_then(Value::as_array) else {
        return JsonConversion {
            document: VttWriter::new().finish(),
            cues: Vec::new(),
            chunk_count: None,
            skipped: Vec::new(),
        };
    };

    let (cues, skipped) = collect_cues(chunks.iter().map(decode_chunk));

    JsonConversion {
        document: render_cues(&cues),
        cues,
        chunk_count: Some(chunks.len()),
        skipped,
    }
}

/// Convert a chunk document to WebVTT.
///
/// Never fails: a missing or malformed `chunks` array yields a header-only
/// document.
pub fn convert_json_to_vtt(data: &Value) -> String {
    convert_json(data).document
}

/// Convert typed chunks using the same rules as [`convert_json_to_vtt`]
pub fn convert_chunks_to_vtt(chunks: &[Chunk]) -> String {
    let (cues, _) = collect_cues(chunks.iter().map(Chunk::resolve));
    render_cues(&cues)
}

fn collect_cues(
    outcomes: impl Iterator<Item = ChunkOutcome>,
) -> (Vec<ResolvedCue>, Vec<SkippedChunk>) {
    let mut cues = Vec::new();
    let mut skipped = Vec::new();

    for (position, outcome) in outcomes.enumerate() {
        match outcome {
            ChunkOutcome::Valid(chunk) => cues.push(ResolvedCue {
                index: cues.len() + 1,
                start: chunk.interval.start,
                end: chunk.interval.end,
                text: chunk.text,
            }),
            ChunkOutcome::Invalid(reason) => {
                tracing::debug!(position, ?reason, "skipping chunk");
                skipped.push(SkippedChunk { position, reason });
            }
        }
    }

    (cues, skipped)
}

fn render_cues(cues: &[ResolvedCue]) -> String {
    let mut writer = VttWriter::new();
    for cue in cues {
        writer.push_indexed_cue(cue.index, cue.start, cue.end, &cue.text);
    }
    writer.finish()
}
