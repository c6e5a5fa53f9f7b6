use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};

use fg_core::attributes::ApiAttributes;
use fg_core::{ApiError, FaceApi, FaceId, ImageUpload, PollOutcome, ResultImage, TaskId};

use crate::config::ClientConfig;
use crate::response::{classify, http_error, is_json};
use crate::schemas::TaskCreated;

/// [`FaceApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFaceApi {
    config: ClientConfig,
    client: Client,
}

impl HttpFaceApi {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request, turning transport failures and non-2xx answers into
    /// [`ApiError`]s.
    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, ApiError> {
        debug!("Making request to {}", url);

        let response = request.send().await.map_err(|e| {
            error!("Request error for {}: {}", url, e);
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        debug!("Response received from {}: {}", url, status);

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let err = http_error(status.as_u16(), &body);
            error!("Response error from {}: {}", url, err);
            return Err(err);
        }

        Ok(response)
    }

    /// Read a response as (content type, body).
    async fn read(response: Response) -> Result<(Option<String>, Vec<u8>), ApiError> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok((content_type, body.to_vec()))
    }

    async fn task_id(response: Response) -> Result<TaskId, ApiError> {
        let (_, body) = Self::read(response).await?;
        match serde_json::from_slice::<TaskCreated>(&body) {
            Ok(created) => created.task_id().ok_or(ApiError::MissingTaskId),
            Err(e) => {
                debug!("Submission answer is not a task: {}", e);
                Err(ApiError::MissingTaskId)
            }
        }
    }

    async fn status(&self, path: &str, task_id: &TaskId) -> Result<PollOutcome, ApiError> {
        let url = self.config.endpoint(path);
        let request = self.client.get(&url).query(&[("task_id", task_id.as_str())]);
        let response = self.send(request, &url).await?;

        let (content_type, body) = Self::read(response).await?;
        classify(content_type.as_deref(), &body)
    }

    fn attrs_json(attrs: &ApiAttributes) -> Result<String, ApiError> {
        attrs.to_json().map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl FaceApi for HttpFaceApi {
    async fn submit_prompt(&self, prompt: &str, steps: u32) -> Result<TaskId, ApiError> {
        let url = self.config.endpoint("face_gen_prompt");
        let steps = steps.to_string();
        let request = self
            .client
            .post(&url)
            .form(&[("prompt", prompt), ("num_step", steps.as_str())]);

        let response = self.send(request, &url).await?;
        Self::task_id(response).await
    }

    async fn prompt_status(&self, task_id: &TaskId) -> Result<PollOutcome, ApiError> {
        self.status("face_gen_prompt_status", task_id).await
    }

    async fn generate_default(&self, face: FaceId, attrs: &ApiAttributes) -> Result<ResultImage, ApiError> {
        let url = self.config.endpoint("face_gen");
        let form = Form::new()
            .text("face_form", face.id().to_string())
            .text("attrs", Self::attrs_json(attrs)?);

        let response = self.send(self.client.post(&url).multipart(form), &url).await?;
        let (content_type, body) = Self::read(response).await?;

        if is_json(content_type.as_deref()) {
            let detail = String::from_utf8_lossy(&body).into_owned();
            return Err(ApiError::Decode(format!("expected an image, got {detail}")));
        }

        Ok(ResultImage::new(body, content_type))
    }

    async fn submit_upload(&self, image: &ImageUpload, attrs: &ApiAttributes) -> Result<TaskId, ApiError> {
        let url = self.config.endpoint("face_gen_upload");
        let file = Part::bytes(image.bytes().to_vec())
            .file_name(image.filename().to_string())
            .mime_str(image.mime_type())
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let form = Form::new()
            .part("binary_file", file)
            .text("attrs", Self::attrs_json(attrs)?);

        let response = self.send(self.client.post(&url).multipart(form), &url).await?;
        Self::task_id(response).await
    }

    async fn upload_status(&self, task_id: &TaskId) -> Result<PollOutcome, ApiError> {
        self.status("face_gen_upload_status", task_id).await
    }
}
