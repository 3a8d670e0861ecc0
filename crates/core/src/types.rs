use serde::{Deserialize, Serialize};

/// A transcript chunk as typed Rust data.
///
/// Untrusted JSON goes through [`crate::json::decode_chunk`] instead, which
/// tolerates wrongly typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    pub text: String,
}

/// Time span of a cue in seconds. Resolution only yields finite, non-negative,
/// ordered values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

/// A chunk that passed validation, before it is given a cue index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedChunk {
    pub interval: Interval,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCue {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    MissingText,
    BlankText,
    MissingTime,
    InvalidTime,
    InvertedInterval { start: f64, end: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    Valid(ResolvedChunk),
    Invalid(SkipReason),
}

/// One candidate time pair found on a chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TimeCandidate {
    Absent,
    Malformed,
    Inverted { start: f64, end: f64 },
    Usable(Interval),
}

impl TimeCandidate {
    pub(crate) fn from_pair(start: Option<f64>, end: Option<f64>) -> Self {
        let (Some(start), Some(end)) = (start, end) else {
            return TimeCandidate::Malformed;
        };
        if !is_valid_seconds(start) || !is_valid_seconds(end) {
            return TimeCandidate::Malformed;
        }
        if start > end {
            return TimeCandidate::Inverted { start, end };
        }
        TimeCandidate::Usable(Interval { start, end })
    }
}

fn is_valid_seconds(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Pick the interval for a chunk: the timestamp pair wins whenever it is
/// usable, start/end is the fallback.
pub(crate) fn resolve_interval(
    timestamp: TimeCandidate,
    start_end: TimeCandidate,
) -> Result<Interval, SkipReason> {
    use TimeCandidate::*;

    match (timestamp, start_end) {
        (Usable(interval), _) | (_, Usable(interval)) => Ok(interval),
        (_, Inverted { start, end }) | (Inverted { start, end }, _) => {
            Err(SkipReason::InvertedInterval { start, end })
        }
        (Absent, Absent) => Err(SkipReason::MissingTime),
        _ => Err(SkipReason::InvalidTime),
    }
}

/// Validate the text field, returning its trimmed form
pub(crate) fn resolve_text(text: Option<&str>) -> Result<&str, SkipReason> {
    let text = text.ok_or(SkipReason::MissingText)?.trim();
    if text.is_empty() {
        return Err(SkipReason::BlankText);
    }
    Ok(text)
}

impl Chunk {
    /// Apply the same validation and precedence rules as the JSON converter
    pub fn resolve(&self) -> ChunkOutcome {
        let text = match resolve_text(Some(&self.text)) {
            Ok(text) => text,
            Err(reason) => return ChunkOutcome::Invalid(reason),
        };

        let timestamp = match self.timestamp {
            Some([start, end]) => TimeCandidate::from_pair(Some(start), Some(end)),
            None => TimeCandidate::Absent,
        };
        let start_end = match (self.start, self.end) {
            (None, None) => TimeCandidate::Absent,
            (start, end) => TimeCandidate::from_pair(start, end),
        };

        match resolve_interval(timestamp, start_end) {
            Ok(interval) => ChunkOutcome::Valid(ResolvedChunk {
                interval,
                text: text.to_string(),
            }),
            Err(reason) => ChunkOutcome::Invalid(reason),
        }
    }
}
