use async_trait::async_trait;

use crate::attributes::ApiAttributes;
use crate::error::ApiError;
use crate::input::{FaceId, ImageUpload};
use crate::task::{PollOutcome, ResultImage, TaskId};

/// The remote face-generation service.
///
/// Implementations translate whatever the wire says into [`PollOutcome`];
/// nothing past this trait looks at content types.
#[async_trait]
pub trait FaceApi: Send + Sync {
    /// Queue a text-to-image job.
    async fn submit_prompt(&self, prompt: &str, steps: u32) -> Result<TaskId, ApiError>;

    async fn prompt_status(&self, task_id: &TaskId) -> Result<PollOutcome, ApiError>;

    /// Apply attributes to a bundled face. Answers with the image directly.
    async fn generate_default(&self, face: FaceId, attrs: &ApiAttributes) -> Result<ResultImage, ApiError>;

    /// Queue an attribute job for an arbitrary image.
    async fn submit_upload(&self, image: &ImageUpload, attrs: &ApiAttributes) -> Result<TaskId, ApiError>;

    async fn upload_status(&self, task_id: &TaskId) -> Result<PollOutcome, ApiError>;
}
