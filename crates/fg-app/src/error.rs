use std::path::PathBuf;

use fg_core::FlowKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Nothing to generate: {0}")]
    NothingToGenerate(&'static str),

    #[error("No {0} result to save")]
    NoResult(FlowKind),

    #[error("Could not read image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },
}
