use std::sync::Arc;

use crate::error::CoreError;
use crate::request::TEXT_GENERATED_FILENAME;
use crate::task::ResultImage;

/// One of the bundled default faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceId(u8);

impl FaceId {
    pub const COUNT: u8 = 6;

    pub fn new(id: u8) -> Result<Self, CoreError> {
        if (1..=Self::COUNT).contains(&id) {
            Ok(Self(id))
        } else {
            Err(CoreError::InvalidFaceId(id))
        }
    }

    /// Value sent as `face_form`
    pub fn id(&self) -> u8 {
        self.0
    }

    /// Name for display in UI
    pub fn name(&self) -> String {
        format!("Face {}", self.0)
    }

    /// Bundled preview asset
    pub fn asset(&self) -> String {
        format!("images/face{}.png", self.0)
    }

    pub fn all() -> impl Iterator<Item = FaceId> {
        (1..=Self::COUNT).map(FaceId)
    }
}

/// MIME type sent for bytes of unknown format.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Image bytes ready for the upload endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    bytes: Arc<[u8]>,
    filename: String,
    mime_type: String,
}

impl ImageUpload {
    /// A user-supplied file, checked to be something the service can decode.
    pub fn new(bytes: impl Into<Arc<[u8]>>, filename: impl Into<String>) -> Result<Self, CoreError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(CoreError::EmptyImage);
        }
        let format = image::guess_format(&bytes)
            .map_err(|e| CoreError::UnsupportedImage(e.to_string()))?;

        Ok(Self {
            bytes,
            filename: filename.into(),
            mime_type: format.to_mime_type().to_string(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Same bytes under a different multipart filename.
    pub fn renamed(&self, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..self.clone()
        }
    }
}

/// The service's own output goes back as-is, whatever its format.
impl From<&ResultImage> for ImageUpload {
    fn from(image: &ResultImage) -> Self {
        let mime_type = image
            .format()
            .map(|format| format.to_mime_type())
            .or_else(|| image.content_type())
            .unwrap_or(FALLBACK_MIME_TYPE);

        Self {
            bytes: image.shared_bytes(),
            filename: TEXT_GENERATED_FILENAME.to_string(),
            mime_type: mime_type.to_string(),
        }
    }
}

/// The face that attribute generation starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceInput {
    DefaultFace(FaceId),
    Uploaded(ImageUpload),
    TextGenerated(ResultImage),
}

/// Holds at most one [`FaceInput`]; choosing a source replaces whichever one
/// was there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSelection {
    current: Option<FaceInput>,
}

impl InputSelection {
    pub fn select_default_face(&mut self, face: FaceId) {
        self.current = Some(FaceInput::DefaultFace(face));
    }

    pub fn upload(&mut self, image: ImageUpload) {
        self.current = Some(FaceInput::Uploaded(image));
    }

    pub fn set_text_generated(&mut self, image: ResultImage) {
        self.current = Some(FaceInput::TextGenerated(image));
    }

    pub fn clear_upload(&mut self) {
        if matches!(self.current, Some(FaceInput::Uploaded(_))) {
            self.current = None;
        }
    }

    pub fn clear_text_generated(&mut self) {
        if matches!(self.current, Some(FaceInput::TextGenerated(_))) {
            self.current = None;
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&FaceInput> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn default_face(&self) -> Option<FaceId> {
        match &self.current {
            Some(FaceInput::DefaultFace(face)) => Some(*face),
            _ => None,
        }
    }

    pub fn uploaded(&self) -> Option<&ImageUpload> {
        match &self.current {
            Some(FaceInput::Uploaded(image)) => Some(image),
            _ => None,
        }
    }

    pub fn text_generated(&self) -> Option<&ResultImage> {
        match &self.current {
            Some(FaceInput::TextGenerated(image)) => Some(image),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::tests::PNG_MAGIC;

    fn upload() -> ImageUpload {
        ImageUpload::new(PNG_MAGIC.to_vec(), "me.png").unwrap()
    }

    #[test]
    fn test_face_ids() {
        assert_eq!(FaceId::all().count(), 6);
        assert!(FaceId::new(0).is_err());
        assert!(FaceId::new(7).is_err());
        assert_eq!(FaceId::new(3).unwrap().asset(), "images/face3.png");
    }

    #[test]
    fn test_upload_validation() {
        assert_eq!(ImageUpload::new(Vec::new(), "x.png"), Err(CoreError::EmptyImage));
        assert!(matches!(
            ImageUpload::new(b"hello world".to_vec(), "x.txt"),
            Err(CoreError::UnsupportedImage(_))
        ));
        assert_eq!(upload().mime_type(), "image/png");
        assert_eq!(upload().renamed("uploaded_image.png").filename(), "uploaded_image.png");
    }

    #[test]
    fn test_text_result_uploads_any_format() {
        let sniffed = ImageUpload::from(&ResultImage::new(PNG_MAGIC.to_vec(), Some("image/jpeg".into())));
        assert_eq!(sniffed.mime_type(), "image/png");
        assert_eq!(sniffed.filename(), TEXT_GENERATED_FILENAME);

        let declared = ImageUpload::from(&ResultImage::new(b"AVIF?".to_vec(), Some("image/avif".into())));
        assert_eq!(declared.mime_type(), "image/avif");
        assert_eq!(declared.bytes(), b"AVIF?");

        let unknown = ImageUpload::from(&ResultImage::new(b"????".to_vec(), None));
        assert_eq!(unknown.mime_type(), FALLBACK_MIME_TYPE);
    }

    #[test]
    fn test_selecting_face_clears_other_inputs() {
        let mut selection = InputSelection::default();
        selection.upload(upload());
        selection.select_default_face(FaceId::new(2).unwrap());
        assert_eq!(selection.default_face(), FaceId::new(2).ok());
        assert!(selection.uploaded().is_none());
        assert!(selection.text_generated().is_none());

        selection.set_text_generated(ResultImage::new(PNG_MAGIC.to_vec(), None));
        selection.select_default_face(FaceId::new(5).unwrap());
        assert!(selection.text_generated().is_none());
    }

    #[test]
    fn test_upload_clears_other_inputs() {
        let mut selection = InputSelection::default();
        selection.select_default_face(FaceId::new(1).unwrap());
        selection.upload(upload());
        assert!(selection.default_face().is_none());
        assert!(selection.uploaded().is_some());

        selection.set_text_generated(ResultImage::new(PNG_MAGIC.to_vec(), None));
        selection.upload(upload());
        assert!(selection.text_generated().is_none());
        assert!(selection.uploaded().is_some());
    }

    #[test]
    fn test_text_generated_clears_other_inputs() {
        let mut selection = InputSelection::default();
        selection.upload(upload());
        selection.set_text_generated(ResultImage::new(PNG_MAGIC.to_vec(), None));
        assert!(selection.uploaded().is_none());
        assert!(selection.default_face().is_none());

        selection.select_default_face(FaceId::new(1).unwrap());
        selection.set_text_generated(ResultImage::new(PNG_MAGIC.to_vec(), None));
        assert!(selection.default_face().is_none());
        assert!(selection.text_generated().is_some());
    }

    #[test]
    fn test_clear_upload_only_touches_upload() {
        let mut selection = InputSelection::default();
        selection.select_default_face(FaceId::new(4).unwrap());
        selection.clear_upload();
        assert!(selection.default_face().is_some());

        selection.upload(upload());
        selection.clear_upload();
        assert!(selection.is_empty());
    }
}
