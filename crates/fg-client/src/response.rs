use fg_core::{ApiError, PollOutcome, ResultImage};

use crate::schemas::{ErrorBody, StatusPayload};

/// Whether the declared content type is the structured status payload.
pub fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
}

/// Turn a status response into a [`PollOutcome`]. The content type alone
/// decides between status payload and finished image.
pub fn classify(content_type: Option<&str>, body: &[u8]) -> Result<PollOutcome, ApiError> {
    if is_json(content_type) {
        let payload: StatusPayload =
            serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(payload.into_outcome())
    } else {
        Ok(PollOutcome::Done(ResultImage::new(
            body.to_vec(),
            content_type.map(str::to_string),
        )))
    }
}

/// Message for a non-2xx response: the body's `message` if it has one.
pub fn http_error(status: u16, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {status}"));

    ApiError::Http { status, message }
}
