use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier the service assigns to a queued job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Returns `None` for blank ids, which the service uses to signal a
    /// submission it did not queue.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What one status check said about a task.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Still running; carries the service's progress message if it sent one
    /// worth showing.
    Pending(Option<String>),
    /// The service gave up on the task.
    Failed(Option<String>),
    /// The finished image.
    Done(ResultImage),
}

/// A generated image held in memory.
///
/// Cloning shares the bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultImage {
    id: Uuid,
    bytes: Arc<[u8]>,
    content_type: Option<String>,
    created_at: DateTime<Utc>,
}

impl ResultImage {
    pub fn new(bytes: impl Into<Arc<[u8]>>, content_type: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes: bytes.into(),
            content_type,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Format sniffed from the bytes, if recognizable.
    pub fn format(&self) -> Option<ImageFormat> {
        image::guess_format(&self.bytes).ok()
    }

    pub fn extension(&self) -> &'static str {
        self.format()
            .or_else(|| self.content_type().and_then(ImageFormat::from_mime_type))
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png")
    }

    /// `generated-face-<unix millis>.<ext>`
    pub fn suggested_filename(&self) -> String {
        format!(
            "generated-face-{}.{}",
            self.created_at.timestamp_millis(),
            self.extension()
        )
    }
}
