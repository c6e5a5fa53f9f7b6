use std::ops::RangeInclusive;

use crate::attributes::ApiAttributes;
use crate::error::CoreError;
use crate::input::{FaceId, ImageUpload};

pub const STEP_RANGE: RangeInclusive<u32> = 10..=50;
pub const DEFAULT_STEPS: u32 = 20;

pub const UPLOAD_FILENAME: &str = "uploaded_image.png";
pub const TEXT_GENERATED_FILENAME: &str = "generated_from_text.png";

/// Text-to-image inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSettings {
    prompt: String,
    steps: u32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            steps: DEFAULT_STEPS,
        }
    }
}

impl PromptSettings {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_steps(&mut self, steps: u32) -> Result<(), CoreError> {
        if !STEP_RANGE.contains(&steps) {
            return Err(CoreError::StepsOutOfRange(steps));
        }
        self.steps = steps;
        Ok(())
    }

    /// A prompt that is blank after trimming cannot be submitted.
    pub fn is_submittable(&self) -> bool {
        !self.prompt.trim().is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Everything needed to start one remote generation.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationRequest {
    /// Answered synchronously with the image.
    DefaultFace { face: FaceId, attrs: ApiAttributes },
    /// Queued; the image arrives through polling.
    Upload { image: ImageUpload, attrs: ApiAttributes },
    /// Queued; the image arrives through polling.
    TextPrompt { prompt: String, steps: u32 },
}

impl GenerationRequest {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DefaultFace { .. } => "default-face",
            Self::Upload { .. } => "upload",
            Self::TextPrompt { .. } => "text-prompt",
        }
    }
}
