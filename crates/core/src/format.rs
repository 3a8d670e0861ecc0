/// Header every WebVTT document starts with, including the blank line after it
pub const WEBVTT_HEADER: &str = "WEBVTT\n\n";

/// Format seconds as an `HH:MM:SS.mmm` WebVTT timestamp.
///
/// Milliseconds are rounded rather than truncated, so `1.0009` renders as
/// `00:00:01.001`. A remainder that rounds up to a full second carries into
/// the seconds, minutes and hours fields. Hours are at least two digits wide
/// and grow past that for values of 100 hours or more.
///
/// The input must be finite and non-negative. Values beyond the range of
/// `u128` milliseconds saturate instead of overflowing.
pub fn format_timestamp(seconds: f64) -> String {
    let whole_secs = seconds.floor() as u128;
    let millis = ((seconds % 1.0) * 1000.0).round() as u128;
    let total_ms = whole_secs.saturating_mul(1000).saturating_add(millis);

    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
}

/// Incremental builder for a WebVTT document
#[derive(Debug)]
pub struct VttWriter {
    output: String,
}

impl VttWriter {
    pub fn new() -> Self {
        Self {
            output: String::from(WEBVTT_HEADER),
        }
    }

    /// Append a numbered cue block timed from seconds
    pub fn push_indexed_cue(&mut self, index: usize, start: f64, end: f64, text: &str) {
        self.output.push_str(&format!("{}\n", index));
        self.output.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(start),
            format_timestamp(end)
        ));
        self.output.push_str(&format!("{}\n\n", text));
    }

    /// Append an un-numbered cue block with a ready-made timing line
    pub fn push_cue(&mut self, timing: &str, text: &str) {
        self.output.push_str(&format!("{}\n{}\n\n", timing, text));
    }

    pub fn finish(self) -> String {
        self.output
    }
}

impl Default for VttWriter {
    fn default() -> Self {
        Self::new()
    }
}
