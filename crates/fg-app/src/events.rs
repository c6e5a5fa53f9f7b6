use std::path::PathBuf;

use fg_core::{FaceId, FlowKind, Language};

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SelectDefaultFace(FaceId),
    UploadImage(PathBuf),
    ClearUpload,

    SetPrompt(String),
    SetSteps(u32),
    ResetPrompt,
    GenerateFromText,

    SetAttribute { name: String, value: i64 },
    ResetAttributes,
    GenerateFace,

    SaveResult { kind: FlowKind, path: Option<PathBuf> },
    SetLanguage(Language),
}

/// What handling a [`UiEvent`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Updated,
    FlowStarted(FlowKind),
    /// The request had nothing to send (blank prompt, no face selected).
    FlowSkipped(FlowKind),
    ResultSaved(PathBuf),
}
