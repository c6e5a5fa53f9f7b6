use std::fmt;
use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::FaceApi;
use crate::error::ApiError;
use crate::i18n::{Language, Text};
use crate::request::GenerationRequest;
use crate::task::{PollOutcome, ResultImage, TaskId};

/// Spacing between status checks of a queued task.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The two independent generation pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    TextToImage,
    FaceAttributes,
}

impl FlowKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TextToImage => "text-to-image",
            Self::FaceAttributes => "face-attributes",
        }
    }

    /// Shown while a submission is on its way, before any task id.
    pub fn generating(&self) -> Text {
        match self {
            Self::TextToImage => Text::GeneratingFromText,
            Self::FaceAttributes => Text::Generating,
        }
    }

    fn submitting(&self) -> Text {
        match self {
            Self::TextToImage => Text::SubmittingToQueue,
            Self::FaceAttributes => Text::SubmittingFaceGeneration,
        }
    }

    fn processing(&self) -> Text {
        match self {
            Self::TextToImage => Text::Processing,
            Self::FaceAttributes => Text::ProcessingFaceAttributes,
        }
    }

    /// Shown when the service reports ERROR without a message.
    fn service_failure(&self) -> Text {
        match self {
            Self::TextToImage => Text::TextPromptFailed,
            Self::FaceAttributes => Text::GenerateFailed,
        }
    }

    /// Shown when a request fails without a message of its own.
    fn request_failure(&self) -> Text {
        match self {
            Self::TextToImage => Text::TextPromptFailed,
            Self::FaceAttributes => Text::GenericError,
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    Idle,
    Submitting,
    Polling { task_id: TaskId, message: String },
    Succeeded(ResultImage),
    Failed(String),
}

impl FlowState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Submitting | Self::Polling { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    pub fn icon(&self) -> &str {
        match self {
            Self::Idle => "·",
            Self::Submitting => "📤",
            Self::Polling { .. } => "⏳",
            Self::Succeeded(_) => "✅",
            Self::Failed(_) => "❌",
        }
    }

    /// Progress text while the task is queued.
    pub fn status_message(&self) -> Option<&str> {
        match self {
            Self::Polling { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&ResultImage> {
        match self {
            Self::Succeeded(image) => Some(image),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// What a running submission observed. Messages are raw; localization
/// happens in [`Flow::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    Queued(TaskId),
    Progress(Option<String>),
    Succeeded(ResultImage),
    ServiceFailed(Option<String>),
    RequestFailed(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowUpdate {
    pub kind: FlowKind,
    pub submission: Uuid,
    pub event: FlowEvent,
}

/// Identity and cancellation handle of one submission.
#[derive(Debug, Clone)]
pub struct Ticket {
    kind: FlowKind,
    submission: Uuid,
    token: CancellationToken,
}

impl Ticket {
    fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            submission: Uuid::new_v4(),
            token: CancellationToken::new(),
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn submission(&self) -> Uuid {
        self.submission
    }

    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    fn cancel(&self) {
        self.token.cancel();
    }

    fn update(&self, event: FlowEvent) -> FlowUpdate {
        FlowUpdate {
            kind: self.kind,
            submission: self.submission,
            event,
        }
    }
}

/// State of one pipeline plus the submission currently allowed to change it.
///
/// Dropping the flow cancels its submission.
#[derive(Debug)]
pub struct Flow {
    kind: FlowKind,
    state: FlowState,
    active: Option<Ticket>,
}

impl Flow {
    pub fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            state: FlowState::Idle,
            active: None,
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_active()
    }

    /// Start a new submission, superseding any running one and dropping the
    /// previous result or error.
    pub fn begin(&mut self) -> Ticket {
        if let Some(previous) = self.active.take() {
            debug!("{} flow: superseding submission {}", self.kind, previous.submission);
            previous.cancel();
        }

        let ticket = Ticket::new(self.kind);
        self.state = FlowState::Submitting;
        self.active = Some(ticket.clone());
        ticket
    }

    /// Stop the running submission, if any. An unfinished flow returns to
    /// idle; a finished one keeps its outcome.
    pub fn cancel(&mut self) {
        if let Some(ticket) = self.active.take() {
            ticket.cancel();
            if self.state.is_active() {
                self.state = FlowState::Idle;
            }
        }
    }

    fn is_current(&self, update: &FlowUpdate) -> bool {
        update.kind == self.kind
            && self
                .active
                .as_ref()
                .is_some_and(|t| t.submission == update.submission && t.is_live())
    }

    /// Fold an update into the state. Returns `false` and changes nothing when
    /// the update belongs to a superseded or cancelled submission.
    pub fn apply(&mut self, update: FlowUpdate, lang: Language) -> bool {
        if !self.is_current(&update) {
            debug!("{} flow: ignoring stale update from {}", self.kind, update.submission);
            return false;
        }

        match update.event {
            FlowEvent::Queued(task_id) => {
                self.state = FlowState::Polling {
                    task_id,
                    message: self.kind.submitting().get(lang).to_string(),
                };
            }
            FlowEvent::Progress(message) => {
                let message = message.unwrap_or_else(|| self.kind.processing().get(lang).to_string());
                match &mut self.state {
                    FlowState::Polling { message: current, .. } => *current = message,
                    _ => return false,
                }
            }
            FlowEvent::Succeeded(image) => {
                self.state = FlowState::Succeeded(image);
            }
            FlowEvent::ServiceFailed(message) => {
                let message = message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| self.kind.service_failure().get(lang).to_string());
                self.state = FlowState::Failed(message);
            }
            FlowEvent::RequestFailed(error) => {
                let message = error
                    .user_message()
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| self.kind.request_failure().get(lang).to_string());
                self.state = FlowState::Failed(message);
            }
        }

        if self.state.is_terminal() {
            self.active = None;
        }
        true
    }
}

impl Drop for Flow {
    fn drop(&mut self) {
        if let Some(ticket) = self.active.take() {
            ticket.cancel();
        }
    }
}

/// Forwards updates while the ticket is live.
struct Reporter {
    ticket: Ticket,
    updates: UnboundedSender<FlowUpdate>,
}

impl Reporter {
    fn send(&self, event: FlowEvent) -> bool {
        if !self.ticket.is_live() {
            return false;
        }
        self.updates.send(self.ticket.update(event)).is_ok()
    }

    /// Runs `fut` unless the ticket is cancelled first.
    async fn guard<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.ticket.token.cancelled() => None,
            out = fut => Some(out),
        }
    }

    fn fail(&self, error: ApiError) {
        warn!("{} flow: request failed: {}", self.ticket.kind, error);
        self.send(FlowEvent::RequestFailed(error));
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusEndpoint {
    Prompt,
    Upload,
}

/// Drive one submission to a terminal outcome, reporting every step on
/// `updates`.
///
/// Queued tasks are checked every [`POLL_INTERVAL`], one check at a time,
/// until the service returns the image or an error. Cancelling the ticket
/// stops the loop and silences any late response.
pub async fn run_flow<A>(
    api: &A,
    request: GenerationRequest,
    ticket: Ticket,
    updates: UnboundedSender<FlowUpdate>,
) where
    A: FaceApi + ?Sized,
{
    let kind = ticket.kind;
    let reporter = Reporter { ticket, updates };
    info!("{} flow: submitting {} request", kind, request.label());

    let (submitted, endpoint) = match request {
        GenerationRequest::DefaultFace { face, attrs } => {
            match reporter.guard(api.generate_default(face, &attrs)).await {
                None => return,
                Some(Ok(image)) => {
                    info!("{} flow: received {} bytes", kind, image.len());
                    reporter.send(FlowEvent::Succeeded(image));
                }
                Some(Err(e)) => reporter.fail(e),
            }
            return;
        }
        GenerationRequest::TextPrompt { prompt, steps } => (
            reporter.guard(api.submit_prompt(&prompt, steps)).await,
            StatusEndpoint::Prompt,
        ),
        GenerationRequest::Upload { image, attrs } => (
            reporter.guard(api.submit_upload(&image, &attrs)).await,
            StatusEndpoint::Upload,
        ),
    };

    let task_id = match submitted {
        None => return,
        Some(Ok(task_id)) => task_id,
        Some(Err(e)) => {
            reporter.fail(e);
            return;
        }
    };

    info!("{} flow: queued as task {}", kind, task_id);
    if !reporter.send(FlowEvent::Queued(task_id.clone())) {
        return;
    }

    let mut ticker = time::interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if reporter.guard(ticker.tick()).await.is_none() {
            debug!("{} flow: polling of {} cancelled", kind, task_id);
            return;
        }

        let status = match endpoint {
            StatusEndpoint::Prompt => api.prompt_status(&task_id),
            StatusEndpoint::Upload => api.upload_status(&task_id),
        };

        match reporter.guard(status).await {
            None => return,
            Some(Ok(PollOutcome::Pending(message))) => {
                debug!("{} flow: task {} pending ({:?})", kind, task_id, message);
                if !reporter.send(FlowEvent::Progress(message)) {
                    return;
                }
            }
            Some(Ok(PollOutcome::Failed(message))) => {
                warn!("{} flow: task {} failed: {:?}", kind, task_id, message);
                reporter.send(FlowEvent::ServiceFailed(message));
                return;
            }
            Some(Ok(PollOutcome::Done(image))) => {
                info!("{} flow: task {} done ({} bytes)", kind, task_id, image.len());
                reporter.send(FlowEvent::Succeeded(image));
                return;
            }
            Some(Err(e)) => {
                reporter.fail(e);
                return;
            }
        }
    }
}
