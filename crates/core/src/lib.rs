//! Cuekit Core Library
//!
//! Converts JSON transcript chunks and SubRip (SRT) subtitles to WebVTT.
//! The converters are pure functions over in-memory text; the pipeline
//! module adds async file helpers around them.

pub mod diagnostics;
pub mod error;
pub mod format;
pub mod json;
pub mod pipeline;
pub mod source;
pub mod srt;
pub mod types;

// Re-export commonly used items at crate root
pub use diagnostics::{DiagnosticSink, SrtDiagnostic, TracingSink};
pub use error::{CuekitError, Result};
pub use format::{VttWriter, WEBVTT_HEADER, format_timestamp};
pub use json::{
    JsonConversion, SkippedChunk, convert_chunks_to_vtt, convert_json, convert_json_to_vtt,
    decode_chunk,
};
pub use pipeline::{
    ConversionReport, Notice, convert_file, convert_text, parse_json_source, read_source,
    save_vtt,
};
pub use source::{SourceFormat, vtt_output_path};
pub use srt::{SrtCue, convert_srt_to_vtt, convert_srt_to_vtt_with, parse_srt, render_srt_cues};
pub use types::{Chunk, ChunkOutcome, Interval, ResolvedChunk, ResolvedCue, SkipReason};
