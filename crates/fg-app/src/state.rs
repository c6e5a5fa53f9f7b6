use std::path::PathBuf;
use std::sync::Arc;

use fg_core::{run_flow, FaceApi, FlowKind, FlowState, FlowUpdate, GenerationRequest, Studio, Ticket};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::events::{AppEvent, UiEvent};
use crate::output;

/// The editor session: page state plus the flows running against the
/// service.
pub struct AppState {
    pub studio: Studio,
    api: Arc<dyn FaceApi>,
    output_dir: PathBuf,

    updates_tx: UnboundedSender<FlowUpdate>,
    updates_rx: UnboundedReceiver<FlowUpdate>,
}

impl AppState {
    pub fn new(api: Arc<dyn FaceApi>, config: &AppConfig) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            studio: Studio::new(config.language),
            api,
            output_dir: config.output_dir.clone(),
            updates_tx,
            updates_rx,
        }
    }

    pub async fn on_ui_event(&mut self, event: UiEvent) -> anyhow::Result<AppEvent> {
        match event {
            UiEvent::SelectDefaultFace(face) => self.studio.select_default_face(face),
            UiEvent::UploadImage(path) => {
                let upload = output::load_upload(&path).await?;
                info!("Loaded {} ({} bytes)", upload.filename(), upload.bytes().len());
                self.studio.upload_image(upload);
            }
            UiEvent::ClearUpload => self.studio.clear_upload(),

            UiEvent::SetPrompt(prompt) => self.studio.prompt_mut().set_prompt(prompt),
            UiEvent::SetSteps(steps) => self.studio.prompt_mut().set_steps(steps)?,
            UiEvent::ResetPrompt => self.studio.reset_prompt(),
            UiEvent::GenerateFromText => {
                let started = self.studio.generate_from_text();
                return Ok(self.start(FlowKind::TextToImage, started));
            }

            UiEvent::SetAttribute { name, value } => self.studio.set_attribute(&name, value)?,
            UiEvent::ResetAttributes => self.studio.reset_attributes(),
            UiEvent::GenerateFace => {
                let started = self.studio.generate_face();
                return Ok(self.start(FlowKind::FaceAttributes, started));
            }

            UiEvent::SaveResult { kind, path } => {
                let image = self
                    .studio
                    .flow(kind)
                    .state()
                    .result()
                    .cloned()
                    .ok_or(AppError::NoResult(kind))?;
                let saved = output::save_result(&image, &self.output_dir, path.as_deref()).await?;
                return Ok(AppEvent::ResultSaved(saved));
            }
            UiEvent::SetLanguage(language) => self.studio.set_language(language),
        }

        Ok(AppEvent::Updated)
    }

    fn start(&self, kind: FlowKind, started: Option<(GenerationRequest, Ticket)>) -> AppEvent {
        let Some((request, ticket)) = started else {
            return AppEvent::FlowSkipped(kind);
        };

        let api = Arc::clone(&self.api);
        let updates = self.updates_tx.clone();
        tokio::spawn(async move {
            run_flow(api.as_ref(), request, ticket, updates).await;
        });

        AppEvent::FlowStarted(kind)
    }

    /// Next update from any running flow.
    pub async fn next_update(&mut self) -> Option<FlowUpdate> {
        self.updates_rx.recv().await
    }

    pub fn on_flow_update(&mut self, update: FlowUpdate) -> bool {
        let kind = update.kind;
        let applied = self.studio.apply(update);
        if applied {
            debug!("{} flow is now {:?}", kind, self.studio.flow(kind).state());
        }
        applied
    }

    /// Process updates until `kind` stops running.
    pub async fn wait_for(&mut self, kind: FlowKind) -> &FlowState {
        while self.studio.flow(kind).state().is_active() {
            match self.updates_rx.recv().await {
                Some(update) => {
                    self.on_flow_update(update);
                }
                None => break,
            }
        }
        self.studio.flow(kind).state()
    }

    /// One-line, localized summary of a flow.
    pub fn flow_line(&self, kind: FlowKind) -> String {
        let language = self.studio.language();
        let state = self.studio.flow(kind).state();
        let detail = match state {
            FlowState::Idle => String::new(),
            FlowState::Submitting => kind.generating().get(language).to_string(),
            FlowState::Polling { message, .. } => message.clone(),
            FlowState::Succeeded(image) => format!("{} bytes ({})", image.len(), image.extension()),
            FlowState::Failed(error) => error.clone(),
        };
        format!("{} {}: {}", state.icon(), kind, detail).trim_end().to_string()
    }

    pub fn shutdown(&mut self) {
        self.studio.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use fg_core::attributes::ApiAttributes;
    use fg_core::{ApiError, FaceId, FaceInput, ImageUpload, Language, PollOutcome, ResultImage, TaskId, Text};

    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[derive(Default)]
    struct StubApi {
        calls: AtomicUsize,
        statuses: Mutex<VecDeque<PollOutcome>>,
        prompts: Mutex<Vec<(String, u32)>>,
    }

    impl StubApi {
        fn with_statuses(statuses: Vec<PollOutcome>) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(statuses.into()),
                ..Self::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn next_status(&self) -> Result<PollOutcome, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(PollOutcome::Pending(None)))
        }
    }

    fn image() -> ResultImage {
        ResultImage::new(PNG.to_vec(), Some("image/png".into()))
    }

    #[async_trait]
    impl FaceApi for StubApi {
        async fn submit_prompt(&self, prompt: &str, steps: u32) -> Result<TaskId, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push((prompt.to_string(), steps));
            Ok(TaskId::new("prompt-task").unwrap())
        }

        async fn prompt_status(&self, _task_id: &TaskId) -> Result<PollOutcome, ApiError> {
            self.next_status()
        }

        async fn generate_default(&self, _face: FaceId, _attrs: &ApiAttributes) -> Result<ResultImage, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(image())
        }

        async fn submit_upload(&self, _image: &ImageUpload, _attrs: &ApiAttributes) -> Result<TaskId, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TaskId::new("upload-task").unwrap())
        }

        async fn upload_status(&self, _task_id: &TaskId) -> Result<PollOutcome, ApiError> {
            self.next_status()
        }
    }

    fn state_with(api: Arc<StubApi>) -> AppState {
        let config = AppConfig {
            output_dir: std::env::temp_dir().join(format!("facegen-state-{}", std::process::id())),
            ..AppConfig::default()
        };
        AppState::new(api, &config)
    }

    #[tokio::test]
    async fn test_generate_without_input_sends_nothing() {
        let api = StubApi::with_statuses(Vec::new());
        let mut state = state_with(api.clone());

        let event = state.on_ui_event(UiEvent::GenerateFace).await.unwrap();
        assert_eq!(event, AppEvent::FlowSkipped(FlowKind::FaceAttributes));

        let event = state.on_ui_event(UiEvent::SetPrompt("   ".into())).await.unwrap();
        assert_eq!(event, AppEvent::Updated);
        let event = state.on_ui_event(UiEvent::GenerateFromText).await.unwrap();
        assert_eq!(event, AppEvent::FlowSkipped(FlowKind::TextToImage));

        assert_eq!(api.calls(), 0);
        assert_eq!(state.studio.flow(FlowKind::FaceAttributes).state(), &FlowState::Idle);
    }

    #[tokio::test]
    async fn test_default_face_generation_and_save() {
        let api = StubApi::with_statuses(Vec::new());
        let mut state = state_with(api.clone());

        state
            .on_ui_event(UiEvent::SelectDefaultFace(FaceId::new(2).unwrap()))
            .await
            .unwrap();
        state
            .on_ui_event(UiEvent::SetAttribute { name: "Smiling".into(), value: 90 })
            .await
            .unwrap();

        let event = state.on_ui_event(UiEvent::GenerateFace).await.unwrap();
        assert_eq!(event, AppEvent::FlowStarted(FlowKind::FaceAttributes));

        let final_state = state.wait_for(FlowKind::FaceAttributes).await.clone();
        assert_eq!(final_state.result().map(ResultImage::bytes), Some(PNG));
        assert!(state.flow_line(FlowKind::FaceAttributes).starts_with("✅"));

        let saved = state
            .on_ui_event(UiEvent::SaveResult { kind: FlowKind::FaceAttributes, path: None })
            .await
            .unwrap();
        let AppEvent::ResultSaved(path) = saved else {
            panic!("unexpected event {saved:?}");
        };
        assert_eq!(tokio::fs::read(&path).await.unwrap(), PNG);
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_submitting_line_names_the_flow() {
        let mut state = state_with(StubApi::with_statuses(Vec::new()));

        state.on_ui_event(UiEvent::SetPrompt("a sailor".into())).await.unwrap();
        state.on_ui_event(UiEvent::GenerateFromText).await.unwrap();
        assert_eq!(state.flow_line(FlowKind::TextToImage), "📤 text-to-image: Generating from text...");

        state
            .on_ui_event(UiEvent::SelectDefaultFace(FaceId::new(4).unwrap()))
            .await
            .unwrap();
        state.on_ui_event(UiEvent::SetLanguage(Language::Vi)).await.unwrap();
        state.on_ui_event(UiEvent::GenerateFace).await.unwrap();
        assert_eq!(
            state.flow_line(FlowKind::FaceAttributes),
            format!("📤 face-attributes: {}", Text::Generating.get(Language::Vi))
        );
        state.shutdown();
    }

    #[tokio::test]
    async fn test_save_without_result() {
        let mut state = state_with(StubApi::with_statuses(Vec::new()));
        let err = state
            .on_ui_event(UiEvent::SaveResult { kind: FlowKind::TextToImage, path: None })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No text-to-image result"), "{err}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_result_becomes_input_face() {
        let api = StubApi::with_statuses(vec![
            PollOutcome::Pending(Some("step 5/20".into())),
            PollOutcome::Done(image()),
        ]);
        let mut state = state_with(api.clone());

        state.on_ui_event(UiEvent::SetPrompt("an old sailor".into())).await.unwrap();
        state.on_ui_event(UiEvent::SetSteps(30)).await.unwrap();
        let event = state.on_ui_event(UiEvent::GenerateFromText).await.unwrap();
        assert_eq!(event, AppEvent::FlowStarted(FlowKind::TextToImage));

        let final_state = state.wait_for(FlowKind::TextToImage).await;
        assert!(matches!(final_state, FlowState::Succeeded(_)));

        assert_eq!(*api.prompts.lock().unwrap(), vec![("an old sailor".to_string(), 30)]);
        assert!(matches!(state.studio.selection().current(), Some(FaceInput::TextGenerated(_))));

        // Generating a face now uploads the text result.
        let event = state.on_ui_event(UiEvent::GenerateFace).await.unwrap();
        assert_eq!(event, AppEvent::FlowStarted(FlowKind::FaceAttributes));
        assert!(state.studio.flow(FlowKind::FaceAttributes).is_busy());
        state.shutdown();
        assert_eq!(state.studio.flow(FlowKind::FaceAttributes).state(), &FlowState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_submission_wins() {
        let api = StubApi::with_statuses(vec![PollOutcome::Done(image())]);
        let mut state = state_with(api.clone());

        state.on_ui_event(UiEvent::SetPrompt("first".into())).await.unwrap();
        state.on_ui_event(UiEvent::GenerateFromText).await.unwrap();
        state.on_ui_event(UiEvent::SetPrompt("second".into())).await.unwrap();
        state.on_ui_event(UiEvent::GenerateFromText).await.unwrap();

        let final_state = state.wait_for(FlowKind::TextToImage).await;
        assert!(matches!(final_state, FlowState::Succeeded(_)));

        let prompts: Vec<String> = api.prompts.lock().unwrap().iter().map(|(p, _)| p.clone()).collect();
        assert!(!prompts.is_empty());
        assert_eq!(prompts.last().map(String::as_str), Some("second"));
    }

    #[tokio::test]
    async fn test_invalid_edits_are_errors() {
        let mut state = state_with(StubApi::with_statuses(Vec::new()));
        assert!(state.on_ui_event(UiEvent::SetSteps(5)).await.is_err());
        assert!(state
            .on_ui_event(UiEvent::SetAttribute { name: "Wings".into(), value: 10 })
            .await
            .is_err());
        assert!(state.studio.attributes().is_default());
    }
}
