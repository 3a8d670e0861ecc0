use serde::Serialize;
use thiserror::Error;

/// Non-fatal problem found while converting SRT text
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SrtDiagnostic {
    #[error("malformed block at line {line} ({header:?}): {}", describe_found(.found))]
    MalformedBlock {
        /// 1-based line of the cue-number line, counted in the trimmed input
        line: usize,
        /// The cue-number line that opened the discarded block
        header: String,
        /// What stood where the timecode line was expected
        found: Option<String>,
    },
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(line) if line.trim().is_empty() => "missing timecode line".to_string(),
        Some(line) => format!("expected a timecode line, found {:?}", line),
        None => "input ended before the timecode line".to_string(),
    }
}

/// Receiver for diagnostics emitted during conversion
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: SrtDiagnostic);
}

/// Sink that logs each diagnostic as a warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: SrtDiagnostic) {
        tracing::warn!("skipping SRT block: {}", diagnostic);
    }
}

impl DiagnosticSink for Vec<SrtDiagnostic> {
    fn report(&mut self, diagnostic: SrtDiagnostic) {
        self.push(diagnostic);
    }
}
