use std::path::{Path, PathBuf};

use serde::Serialize;

/// Input format accepted by the converters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Srt,
}

impl SourceFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "json" => Some(SourceFormat::Json),
            "srt" => Some(SourceFormat::Srt),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Json => "JSON",
            SourceFormat::Srt => "SRT",
        }
    }
}

/// Get the `.vtt` path for an input, next to it or inside `output_dir`
pub fn vtt_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = Path::new(input.file_name().unwrap_or(input.as_os_str()))
        .with_extension("vtt");
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}
