use crate::lifecycle::TaskSignal;
use crate::AsyncError;
use futures_core::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type TaskFn = dyn Fn(Value) -> BoxFuture<'static, TaskSignal> + Send + Sync;

/// A caller-supplied long-running operation registered on a slice.
///
/// The slice never runs it. The host runtime starts it through the pass-through command
/// of the same name and feeds the resulting signals back to the slice.
#[derive(Clone)]
pub struct AsyncTask {
    name: String,
    run: Arc<TaskFn>,
}

impl AsyncTask {
    pub fn new<F, Fut, R>(name: impl Into<String>, computation: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: TaskResult + 'static,
    {
        let run = move |argument: Value| -> BoxFuture<'static, TaskSignal> {
            let future = computation(argument);
            Box::pin(async move { future.await.into_signal() })
        };
        AsyncTask {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts the task. The future resolves to the terminal signal,
    /// [`TaskSignal::Succeeded`] or [`TaskSignal::Failed`].
    pub fn start(&self, argument: Value) -> BoxFuture<'static, TaskSignal> {
        (self.run)(argument)
    }
}

impl fmt::Debug for AsyncTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTask").field("name", &self.name).finish()
    }
}

/// Why a task failed: an explicit rejection value, a failure object, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub payload: Option<Value>,
    pub error: Option<AsyncError>,
}

impl Rejection {
    /// Rejects with an explicit value, which takes precedence as the failure reason.
    pub fn with_value(payload: impl Into<Value>) -> Self {
        Rejection {
            payload: Some(payload.into()),
            error: None,
        }
    }
}

impl From<AsyncError> for Rejection {
    fn from(error: AsyncError) -> Self {
        Rejection {
            payload: None,
            error: Some(error),
        }
    }
}

impl From<String> for Rejection {
    fn from(message: String) -> Self {
        AsyncError::Error(message).into()
    }
}

impl From<&str> for Rejection {
    fn from(message: &str) -> Self {
        AsyncError::error(message).into()
    }
}

impl From<Rejection> for TaskSignal {
    fn from(rejection: Rejection) -> Self {
        TaskSignal::Failed {
            payload: rejection.payload,
            error: rejection.error,
        }
    }
}

/// Values a task may resolve to.
pub trait TaskResult {
    fn into_signal(self) -> TaskSignal;
}

impl TaskResult for TaskSignal {
    fn into_signal(self) -> TaskSignal {
        self
    }
}

impl TaskResult for Value {
    fn into_signal(self) -> TaskSignal {
        TaskSignal::Succeeded(self)
    }
}

impl<T, E> TaskResult for Result<T, E>
where
    T: Serialize,
    E: Into<Rejection>,
{
    fn into_signal(self) -> TaskSignal {
        match self {
            Ok(value) => succeeded(&value),
            Err(rejection) => rejection.into().into(),
        }
    }
}

impl<T: Serialize> TaskResult for Option<T> {
    fn into_signal(self) -> TaskSignal {
        match self {
            Some(value) => succeeded(&value),
            None => TaskSignal::failed(AsyncError::None),
        }
    }
}

fn succeeded<T: Serialize>(value: &T) -> TaskSignal {
    match serde_json::to_value(value) {
        Ok(value) => TaskSignal::Succeeded(value),
        Err(error) => TaskSignal::failed(AsyncError::Error(error.to_string())),
    }
}
