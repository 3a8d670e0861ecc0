use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tokio::fs;

use crate::{
    diagnostics::SrtDiagnostic,
    error::{CuekitError, Result},
    json::convert_json,
    source::SourceFormat,
    srt::{parse_srt, render_srt_cues},
};

/// Remark about a conversion worth showing to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    MissingChunks,
    NoChunks,
    NothingConvertible { chunk_count: usize },
    SkippedChunks { count: usize },
    MalformedBlock { diagnostic: SrtDiagnostic },
    NoCues,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::MissingChunks => write!(f, "Invalid JSON structure: missing \"chunks\" array"),
            Notice::NoChunks => write!(f, "JSON file has no subtitle chunks to convert"),
            Notice::NothingConvertible { chunk_count } => write!(
                f,
                "JSON contained {} chunks, but none could be converted; check that chunks have valid time and text",
                chunk_count
            ),
            Notice::SkippedChunks { count } => {
                write!(f, "Skipped {} chunks without valid time or text", count)
            }
            Notice::MalformedBlock { diagnostic } => write!(f, "Skipped {}", diagnostic),
            Notice::NoCues => write!(f, "No convertible subtitle data found"),
        }
    }
}

/// Converted document plus what happened on the way
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub format: SourceFormat,
    pub document: String,
    pub cue_count: usize,
    pub notices: Vec<Notice>,
}

impl ConversionReport {
    pub fn is_empty(&self) -> bool {
        self.cue_count == 0
    }
}

/// Read a subtitle source as text, dropping a leading byte-order mark
pub async fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).await?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string())
}

/// Parse JSON source text, rejecting blank input
pub fn parse_json_source(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Err(CuekitError::EmptyInput);
    }
    Ok(serde_json::from_str(text)?)
}

/// Convert already decoded source text
pub fn convert_text(text: &str, format: SourceFormat) -> Result<ConversionReport> {
    match format {
        SourceFormat::Json => convert_json_text(text),
        SourceFormat::Srt => Ok(convert_srt_text(text)),
    }
}

fn convert_json_text(text: &str) -> Result<ConversionReport> {
    let data = parse_json_source(text)?;
    let conversion = convert_json(&data);

    let mut notices = Vec::new();
    match conversion.chunk_count {
        None => notices.push(Notice::MissingChunks),
        Some(0) => notices.push(Notice::NoChunks),
        Some(chunk_count) if conversion.cues.is_empty() => {
            notices.push(Notice::NothingConvertible { chunk_count })
        }
        Some(_) if !conversion.skipped.is_empty() => notices.push(Notice::SkippedChunks {
            count: conversion.skipped.len(),
        }),
        Some(_) => {}
    }

    Ok(ConversionReport {
        format: SourceFormat::Json,
        cue_count: conversion.cues.len(),
        document: conversion.document,
        notices,
    })
}

fn convert_srt_text(text: &str) -> ConversionReport {
    let mut diagnostics: Vec<SrtDiagnostic> = Vec::new();
    let cues = parse_srt(text, &mut diagnostics);

    let mut notices: Vec<Notice> = diagnostics
        .into_iter()
        .map(|diagnostic| Notice::MalformedBlock { diagnostic })
        .collect();
    if cues.is_empty() {
        notices.push(Notice::NoCues);
    }

    ConversionReport {
        format: SourceFormat::Srt,
        cue_count: cues.len(),
        document: render_srt_cues(&cues),
        notices,
    }
}

/// Read and convert a file, detecting its format from the extension unless
/// one is given
pub async fn convert_file(path: &Path, format: Option<SourceFormat>) -> Result<ConversionReport> {
    let format = format
        .or_else(|| SourceFormat::from_path(path))
        .ok_or_else(|| CuekitError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

    let text = read_source(path).await?;
    let report = convert_text(&text, format)?;
    tracing::debug!(
        path = %path.display(),
        format = format.name(),
        cues = report.cue_count,
        "converted"
    );
    Ok(report)
}

/// Write a WebVTT document, creating parent directories as needed
pub async fn save_vtt(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, document).await?;
    Ok(())
}
