pub mod api;
pub mod attributes;
pub mod error;
pub mod flow;
pub mod i18n;
pub mod input;
pub mod request;
pub mod studio;
pub mod task;

pub use api::FaceApi;
pub use attributes::{AttributeCategory, AttributeSet};
pub use error::{ApiError, CoreError};
pub use flow::{run_flow, Flow, FlowEvent, FlowKind, FlowState, FlowUpdate, Ticket, POLL_INTERVAL};
pub use i18n::{Language, Text};
pub use input::{FaceId, FaceInput, ImageUpload, InputSelection};
pub use request::{GenerationRequest, PromptSettings};
pub use studio::Studio;
pub use task::{PollOutcome, ResultImage, TaskId};
