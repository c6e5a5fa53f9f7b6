use serde::Deserialize;
use serde_json::Value;

use fg_core::{PollOutcome, TaskId};

/// Body of a successful queue submission.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaskCreated {
    #[serde(default)]
    pub task_id: Option<Value>,
}

impl TaskCreated {
    pub fn task_id(&self) -> Option<TaskId> {
        match self.task_id.as_ref()? {
            Value::String(id) => TaskId::new(id.clone()),
            Value::Number(id) => TaskId::new(id.to_string()),
            _ => None,
        }
    }
}

/// Structured answer of a status check. Both fields are optional and
/// untyped; only the exact strings `PENDING` and `ERROR` are special.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct StatusPayload {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl StatusPayload {
    fn message(&self) -> Option<String> {
        match self.message.as_ref()? {
            Value::Null => None,
            Value::String(message) if message.is_empty() => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn into_outcome(self) -> PollOutcome {
        match self.status.as_ref().and_then(Value::as_str) {
            Some("PENDING") => PollOutcome::Pending(None),
            Some("ERROR") => PollOutcome::Failed(self.message()),
            _ => PollOutcome::Pending(self.message()),
        }
    }
}

/// Error bodies may carry a human-readable `message`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_forms() {
        let created: TaskCreated = serde_json::from_str(r#"{"task_id": "abc-123"}"#).unwrap();
        assert_eq!(created.task_id().unwrap().as_str(), "abc-123");

        let created: TaskCreated = serde_json::from_str(r#"{"task_id": 42}"#).unwrap();
        assert_eq!(created.task_id().unwrap().as_str(), "42");

        let created: TaskCreated = serde_json::from_str(r#"{"status": "queued"}"#).unwrap();
        assert!(created.task_id().is_none());

        let created: TaskCreated = serde_json::from_str(r#"{"task_id": ""}"#).unwrap();
        assert!(created.task_id().is_none());
    }

    fn outcome(body: &str) -> PollOutcome {
        serde_json::from_str::<StatusPayload>(body).unwrap().into_outcome()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            outcome(r#"{"status": "PENDING", "message": "ignored"}"#),
            PollOutcome::Pending(None)
        );
        assert_eq!(
            outcome(r#"{"status": "ERROR", "message": "boom"}"#),
            PollOutcome::Failed(Some("boom".into()))
        );
        assert_eq!(outcome(r#"{"status": "ERROR"}"#), PollOutcome::Failed(None));
        assert_eq!(
            outcome(r#"{"status": "STARTED", "message": "Running step 4/20"}"#),
            PollOutcome::Pending(Some("Running step 4/20".into()))
        );
    }

    #[test]
    fn test_unusual_status_keeps_polling() {
        assert_eq!(
            outcome(r#"{"message": "Loading model"}"#),
            PollOutcome::Pending(Some("Loading model".into()))
        );
        assert_eq!(outcome(r#"{"status": null}"#), PollOutcome::Pending(None));
        assert_eq!(outcome(r#"{"status": 3, "message": ""}"#), PollOutcome::Pending(None));
        assert_eq!(outcome(r#"{"status": "pending"}"#), PollOutcome::Pending(None));
        assert_eq!(outcome("{}"), PollOutcome::Pending(None));
    }
}
