//! SubRip (SRT) text to WebVTT.
//!
//! Each block is `number / timecode / text lines`, separated by blank lines.
//! The cue number is consumed but never written: the WebVTT output carries
//! only the timing line and the text. Commas in the timing line become periods.
//! A block whose second line lacks `-->` is dropped whole and reported to the
//! diagnostic sink; scanning resumes after the next blank line.

use serde::Serialize;

use crate::{
    diagnostics::{DiagnosticSink, SrtDiagnostic, TracingSink},
    format::VttWriter,
};

pub const TIMECODE_SEPARATOR: &str = "-->";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SrtCue {
    /// Timing line with SRT decimal commas already rewritten to periods
    pub timing: String,
    pub text: String,
}

enum ScanState<'a> {
    ExpectNumber,
    ExpectTimecode { line: usize, header: &'a str },
    CollectingText { timing: String, text: Vec<&'a str> },
    Recovering,
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Scan SRT text into cues, reporting malformed blocks to `sink`
pub fn parse_srt<S>(input: &str, sink: &mut S) -> Vec<SrtCue>
where
    S: DiagnosticSink + ?Sized,
{
    let mut cues = Vec::new();
    let mut state = ScanState::ExpectNumber;

    for (idx, line) in input.trim().lines().enumerate() {
        state = match state {
            ScanState::ExpectNumber if is_blank(line) => ScanState::ExpectNumber,
            ScanState::ExpectNumber => ScanState::ExpectTimecode {
                line: idx + 1,
                header: line,
            },
            ScanState::ExpectTimecode { .. } if line.contains(TIMECODE_SEPARATOR) => {
                ScanState::CollectingText {
                    timing: line.replace(',', "."),
                    text: Vec::new(),
                }
            }
            ScanState::ExpectTimecode { line: at, header } => {
                sink.report(SrtDiagnostic::MalformedBlock {
                    line: at,
                    header: header.to_string(),
                    found: Some(line.to_string()),
                });
                if is_blank(line) {
                    ScanState::ExpectNumber
                } else {
                    ScanState::Recovering
                }
            }
            ScanState::CollectingText { timing, text } if is_blank(line) => {
                cues.push(SrtCue {
                    timing,
                    text: text.join("\n"),
                });
                ScanState::ExpectNumber
            }
            ScanState::CollectingText { timing, mut text } => {
                text.push(line);
                ScanState::CollectingText { timing, text }
            }
            ScanState::Recovering if is_blank(line) => ScanState::ExpectNumber,
            ScanState::Recovering => ScanState::Recovering,
        };
    }

    match state {
        ScanState::CollectingText { timing, text } => cues.push(SrtCue {
            timing,
            text: text.join("\n"),
        }),
        ScanState::ExpectTimecode { line, header } => {
            sink.report(SrtDiagnostic::MalformedBlock {
                line,
                header: header.to_string(),
                found: None,
            });
        }
        ScanState::ExpectNumber | ScanState::Recovering => {}
    }

    cues
}

/// Render parsed cues as a WebVTT document without cue numbers
pub fn render_srt_cues(cues: &[SrtCue]) -> String {
    let mut writer = VttWriter::new();
    for cue in cues {
        writer.push_cue(&cue.timing, &cue.text);
    }
    writer.finish()
}

/// Convert SRT text to WebVTT, reporting malformed blocks to `sink`
pub fn convert_srt_to_vtt_with<S>(input: &str, sink: &mut S) -> String
where
    S: DiagnosticSink + ?Sized,
{
    render_srt_cues(&parse_srt(input, sink))
}

/// Convert SRT text to WebVTT, logging malformed blocks as warnings
pub fn convert_srt_to_vtt(input: &str) -> String {
    convert_srt_to_vtt_with(input, &mut TracingSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::WEBVTT_HEADER;

    const TWO_CUES: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello\n\n\
                            2\n00:00:03,000 --> 00:00:04,000\nWorld\nsecond line\n";

    fn convert_collecting(input: &str) -> (String, Vec<SrtDiagnostic>) {
        let mut diagnostics = Vec::new();
        let document = convert_srt_to_vtt_with(input, &mut diagnostics);
        (document, diagnostics)
    }

    #[test]
    fn converts_blocks_without_cue_numbers() {
        let (document, diagnostics) = convert_collecting(TWO_CUES);
        assert_eq!(
            document,
            "WEBVTT\n\n\
             00:00:01.000 --> 00:00:02.500\nHello\n\n\
             00:00:03.000 --> 00:00:04.000\nWorld\nsecond line\n\n"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn crlf_input_matches_lf_input() {
        let crlf = TWO_CUES.replace('\n', "\r\n");
        assert_eq!(convert_srt_to_vtt(&crlf), convert_srt_to_vtt(TWO_CUES));
    }

    #[test]
    fn empty_input_gives_header_only() {
        assert_eq!(convert_srt_to_vtt(""), WEBVTT_HEADER);
        assert_eq!(convert_srt_to_vtt(" \n\r\n\t\n"), WEBVTT_HEADER);
    }

    #[test]
    fn skips_block_missing_timecode_and_keeps_neighbours() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\nFirst\n\n\
                     2\nNo timing here\nstill discarded\n\n\
                     3\n00:00:05,000 --> 00:00:06,000\nThird\n";
        let (document, diagnostics) = convert_collecting(input);

        assert_eq!(
            document,
            "WEBVTT\n\n\
             00:00:01.000 --> 00:00:02.000\nFirst\n\n\
             00:00:05.000 --> 00:00:06.000\nThird\n\n"
        );
        assert_eq!(
            diagnostics,
            vec![SrtDiagnostic::MalformedBlock {
                line: 5,
                header: "2".to_string(),
                found: Some("No timing here".to_string()),
            }]
        );
        assert!(!document.contains("\n1\n"));
        assert!(!document.contains("\n3\n"));
    }

    #[test]
    fn number_line_followed_by_blank_is_malformed() {
        let input = "1\n\n2\n00:00:01,000 --> 00:00:02,000\nKept\n";
        let (document, diagnostics) = convert_collecting(input);

        assert_eq!(document, "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nKept\n\n");
        assert_eq!(
            diagnostics,
            vec![SrtDiagnostic::MalformedBlock {
                line: 1,
                header: "1".to_string(),
                found: Some(String::new()),
            }]
        );
    }

    #[test]
    fn trailing_number_line_is_reported() {
        let input = "1\n00:00:01,000 --> 00:00:02,000\nKept\n\n2\n";
        let (document, diagnostics) = convert_collecting(input);

        assert_eq!(document, "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nKept\n\n");
        assert_eq!(
            diagnostics,
            vec![SrtDiagnostic::MalformedBlock {
                line: 5,
                header: "2".to_string(),
                found: None,
            }]
        );
    }

    #[test]
    fn tolerates_extra_blank_lines() {
        let input = "\n\n1\n00:00:01,000 --> 00:00:02,000\nOne\n\n\n\n  \n2\n00:00:02,000 --> 00:00:03,000\nTwo\n\n\n";
        let cues = parse_srt(input, &mut Vec::new());
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].text, "Two");
    }

    #[test]
    fn rewrites_every_comma_in_timing_line() {
        let input = "1\n00:00:01,000 --> 00:00:02,000 align:start,x\nText, with comma\n";
        let cues = parse_srt(input, &mut Vec::new());
        assert_eq!(
            cues,
            vec![SrtCue {
                timing: "00:00:01.000 --> 00:00:02.000 align:start.x".to_string(),
                text: "Text, with comma".to_string(),
            }]
        );
    }

    #[test]
    fn cue_number_is_not_validated() {
        let input = "intro\n00:00:00,500 --> 00:00:01,000\nHi\n";
        assert_eq!(
            convert_srt_to_vtt(input),
            "WEBVTT\n\n00:00:00.500 --> 00:00:01.000\nHi\n\n"
        );
    }

    #[test]
    fn recovery_discards_until_blank_line() {
        let input = "1\nbroken\n00:00:01,000 --> 00:00:02,000\nlooks valid but is discarded\n\n\
                     2\n00:00:03,000 --> 00:00:04,000\nKept\n";
        let (document, diagnostics) = convert_collecting(input);

        assert_eq!(document, "WEBVTT\n\n00:00:03.000 --> 00:00:04.000\nKept\n\n");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn render_and_parse_compose_to_convert() {
        let cues = parse_srt(TWO_CUES, &mut Vec::new());
        assert_eq!(render_srt_cues(&cues), convert_srt_to_vtt(TWO_CUES));
    }
}
