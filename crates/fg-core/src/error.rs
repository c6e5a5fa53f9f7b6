use thiserror::Error;

/// Failures reported by a [`FaceApi`](crate::FaceApi) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("No task ID received")]
    MissingTaskId,
}

impl ApiError {
    /// Message shown to the user, if the error carries one worth showing.
    ///
    /// Decode failures and a missing task id fall back to the flow's
    /// localized failure text.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Transport(msg) => Some(msg),
            Self::Http { message, .. } => Some(message),
            Self::Decode(_) | Self::MissingTaskId => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Value {value} for {name} is outside 0..=100")]
    ValueOutOfRange { name: String, value: i64 },

    #[error("Default face {0} does not exist (expected 1..=6)")]
    InvalidFaceId(u8),

    #[error("Step count {0} is outside 10..=50")]
    StepsOutOfRange(u32),

    #[error("Image data is empty")]
    EmptyImage,

    #[error("Not a supported image: {0}")]
    UnsupportedImage(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
}
