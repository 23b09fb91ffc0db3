use crate::AsyncError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure reason recorded when a rejection carries neither a payload nor a message.
pub const DEFAULT_FAILURE_REASON: &str = "Request failed";

/// Where the most recent async task of a slice stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No task has run yet. Only ever the initial value.
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Pending)
    }

    /// True once the most recent task has resolved either way.
    pub fn is_settled(&self) -> bool {
        matches!(self, Phase::Fulfilled | Phase::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Pending => "pending",
            Phase::Fulfilled => "fulfilled",
            Phase::Rejected => "rejected",
        }
    }
}

/// The busy flag, last failure reason and phase shared by every task of a slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    pub loading: bool,
    pub error: Option<String>,
    pub status: Phase,
}

impl Lifecycle {
    /// The fields after `signal`. Every signal fully determines all three fields, so
    /// signals from different tasks simply overwrite each other.
    pub fn after(&self, signal: &TaskSignal) -> Lifecycle {
        match signal {
            TaskSignal::Started => Lifecycle {
                loading: true,
                error: None,
                status: Phase::Pending,
            },
            TaskSignal::Succeeded(_) => Lifecycle {
                loading: false,
                error: None,
                status: Phase::Fulfilled,
            },
            TaskSignal::Failed { .. } => Lifecycle {
                loading: false,
                error: signal.failure_reason(),
                status: Phase::Rejected,
            },
        }
    }
}

/// Anything that may carry lifecycle fields.
pub trait HasLifecycle {
    fn lifecycle(&self) -> Option<&Lifecycle>;
}

impl HasLifecycle for Lifecycle {
    fn lifecycle(&self) -> Option<&Lifecycle> {
        Some(self)
    }
}

/// One of the three notifications an async task produces.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskSignal {
    Started,
    /// The resolved value. It is reported, never stored in the container.
    Succeeded(Value),
    Failed {
        /// Value the task explicitly rejected with.
        payload: Option<Value>,
        /// The failure object the task raised.
        error: Option<AsyncError>,
    },
}

impl TaskSignal {
    pub fn rejected_with(payload: impl Into<Value>) -> Self {
        TaskSignal::Failed {
            payload: Some(payload.into()),
            error: None,
        }
    }

    pub fn failed(error: AsyncError) -> Self {
        TaskSignal::Failed {
            payload: None,
            error: Some(error),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskSignal::Started => "pending",
            TaskSignal::Succeeded(_) => "fulfilled",
            TaskSignal::Failed { .. } => "rejected",
        }
    }

    /// The reason recorded for a failure: the explicit payload, else the failure
    /// object's message, else [`DEFAULT_FAILURE_REASON`]. `None` for other signals.
    pub fn failure_reason(&self) -> Option<String> {
        let TaskSignal::Failed { payload, error } = self else {
            return None;
        };
        let from_payload = payload.as_ref().and_then(|value| match value {
            Value::Null => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        });
        let from_error = error
            .as_ref()
            .map(ToString::to_string)
            .filter(|message| !message.is_empty());
        Some(
            from_payload
                .or(from_error)
                .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_string()),
        )
    }
}
