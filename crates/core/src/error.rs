use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuekitError {
    #[error("Unsupported input format for {path}: expected a .json or .srt file")]
    UnsupportedFormat { path: PathBuf },

    #[error("Output {output} is already produced by {first}")]
    OutputCollision { output: PathBuf, first: PathBuf },

    #[error("Input is empty")]
    EmptyInput,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CuekitError>;
