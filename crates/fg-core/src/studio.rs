use log::debug;

use crate::attributes::{ActiveAttribute, AttributeSet};
use crate::error::CoreError;
use crate::flow::{Flow, FlowEvent, FlowKind, FlowUpdate, Ticket};
use crate::i18n::Language;
use crate::input::{FaceId, FaceInput, ImageUpload, InputSelection};
use crate::request::{GenerationRequest, PromptSettings, UPLOAD_FILENAME};

/// Everything the user is editing, plus the two generation flows.
#[derive(Debug)]
pub struct Studio {
    language: Language,
    selection: InputSelection,
    attributes: AttributeSet,
    prompt: PromptSettings,
    text_flow: Flow,
    face_flow: Flow,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl Studio {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            selection: InputSelection::default(),
            attributes: AttributeSet::new(),
            prompt: PromptSettings::default(),
            text_flow: Flow::new(FlowKind::TextToImage),
            face_flow: Flow::new(FlowKind::FaceAttributes),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn selection(&self) -> &InputSelection {
        &self.selection
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn prompt(&self) -> &PromptSettings {
        &self.prompt
    }

    pub fn prompt_mut(&mut self) -> &mut PromptSettings {
        &mut self.prompt
    }

    pub fn flow(&self, kind: FlowKind) -> &Flow {
        match kind {
            FlowKind::TextToImage => &self.text_flow,
            FlowKind::FaceAttributes => &self.face_flow,
        }
    }

    fn flow_mut(&mut self, kind: FlowKind) -> &mut Flow {
        match kind {
            FlowKind::TextToImage => &mut self.text_flow,
            FlowKind::FaceAttributes => &mut self.face_flow,
        }
    }

    pub fn select_default_face(&mut self, face: FaceId) {
        self.selection.select_default_face(face);
    }

    pub fn upload_image(&mut self, image: ImageUpload) {
        self.selection.upload(image.renamed(UPLOAD_FILENAME));
    }

    pub fn clear_upload(&mut self) {
        self.selection.clear_upload();
    }

    pub fn set_attribute(&mut self, name: &str, value: i64) -> Result<(), CoreError> {
        self.attributes.set(name, value)
    }

    pub fn reset_attributes(&mut self) {
        self.attributes.reset();
    }

    pub fn active_attributes(&self) -> Vec<ActiveAttribute> {
        self.attributes.active()
    }

    /// Drop the text-generated face and restore the prompt defaults.
    pub fn reset_prompt(&mut self) {
        self.selection.clear_text_generated();
        self.prompt.reset();
    }

    /// Start the text flow. Does nothing for a blank prompt.
    pub fn generate_from_text(&mut self) -> Option<(GenerationRequest, Ticket)> {
        if !self.prompt.is_submittable() {
            debug!("ignoring text generation with a blank prompt");
            return None;
        }

        let request = GenerationRequest::TextPrompt {
            prompt: self.prompt.prompt().to_string(),
            steps: self.prompt.steps(),
        };
        Some((request, self.text_flow.begin()))
    }

    /// Start the attribute flow from whichever face is selected. Does nothing
    /// when no face is selected.
    pub fn generate_face(&mut self) -> Option<(GenerationRequest, Ticket)> {
        let attrs = self.attributes.to_api();
        let request = match self.selection.current() {
            None => {
                debug!("ignoring face generation without an input face");
                return None;
            }
            Some(FaceInput::DefaultFace(face)) => GenerationRequest::DefaultFace { face: *face, attrs },
            Some(FaceInput::Uploaded(image)) => GenerationRequest::Upload {
                image: image.clone(),
                attrs,
            },
            Some(FaceInput::TextGenerated(image)) => GenerationRequest::Upload {
                image: ImageUpload::from(image),
                attrs,
            },
        };

        Some((request, self.face_flow.begin()))
    }

    /// Route an update to its flow. A finished text flow becomes the selected
    /// face.
    pub fn apply(&mut self, update: FlowUpdate) -> bool {
        let kind = update.kind;
        let language = self.language;
        let image = match (&kind, &update.event) {
            (FlowKind::TextToImage, FlowEvent::Succeeded(image)) => Some(image.clone()),
            _ => None,
        };

        let applied = self.flow_mut(kind).apply(update, language);
        if applied {
            if let Some(image) = image {
                self.selection.set_text_generated(image);
            }
        }
        applied
    }

    /// Stop both flows.
    pub fn cancel_all(&mut self) {
        self.text_flow.cancel();
        self.face_flow.cancel();
    }
}
