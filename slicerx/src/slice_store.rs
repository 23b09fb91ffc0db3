use crate::lifecycle::TaskSignal;
use crate::slice::{Action, CommandKind, Slice};
use crate::slice_state::SliceState;
use crate::state_store::StateStore;
use crate::AsyncError;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A [`StateStore`] holding the state of one slice.
///
/// Commands go through the slice's reducer on the store's queue. Task commands start the
/// registered task and feed its signals back the same way.
pub struct SliceStore {
    slice: Arc<Slice>,
    store: StateStore<SliceState>,
}

impl SliceStore {
    pub fn new(slice: Slice) -> Self {
        Self::with_slice(Arc::new(slice))
    }

    pub fn with_slice(slice: Arc<Slice>) -> Self {
        let store = StateStore::new(slice.initial_state());
        SliceStore { slice, store }
    }

    pub fn slice(&self) -> &Slice {
        &self.slice
    }

    pub fn store(&self) -> &StateStore<SliceState> {
        &self.store
    }

    pub fn get_state(&self) -> SliceState {
        self.store.get_state()
    }

    pub async fn await_state(&self) -> Result<SliceState, AsyncError> {
        self.store.await_state().await
    }

    /// Queues an action for the slice's reducer.
    pub fn dispatch(&self, action: Action) -> Result<(), AsyncError> {
        let slice = self.slice.clone();
        self.store
            .set_state(move |state| slice.reduce(state, &action))
    }

    /// Invokes a command by name. A task command starts its task in the background.
    pub fn send(&self, command: &str, payload: impl Into<Value>) -> Result<(), AsyncError> {
        let Some(found) = self.slice.command(command) else {
            debug!(slice = %self.slice.name(), command, "unknown command");
            return Err(AsyncError::error(format!("unknown command: {command}")));
        };
        match found.kind() {
            CommandKind::Task => {
                drop(self.run_task(command, payload.into()));
                Ok(())
            }
            _ => self.dispatch(found.action(payload)),
        }
    }

    /// Runs a registered task, reporting its signals to the slice. The handle resolves
    /// once the terminal signal is queued.
    pub fn run_task(&self, name: &str, argument: Value) -> JoinHandle<Result<(), AsyncError>> {
        match self.slice.task(name) {
            Some(task) => self
                .store
                .async_execute(task.start(argument), self.signal_updater(name)),
            None => unknown_task(name),
        }
    }

    pub fn run_task_cancellable(
        &self,
        name: &str,
        argument: Value,
        cancellation_token: CancellationToken,
    ) -> JoinHandle<Result<(), AsyncError>> {
        match self.slice.task(name) {
            Some(task) => self.store.async_execute_cancellable(
                cancellation_token,
                |_| task.start(argument),
                self.signal_updater(name),
            ),
            None => unknown_task(name),
        }
    }

    pub fn run_task_with_timeout(
        &self,
        name: &str,
        argument: Value,
        timeout: Duration,
    ) -> JoinHandle<Result<(), AsyncError>> {
        match self.slice.task(name) {
            Some(task) => self.store.async_execute_with_timeout(
                task.start(argument),
                timeout,
                self.signal_updater(name),
            ),
            None => unknown_task(name),
        }
    }

    fn signal_updater(
        &self,
        name: &str,
    ) -> impl FnOnce(SliceState, TaskSignal) -> SliceState + Clone + Send + 'static {
        let slice = self.slice.clone();
        let task = name.to_string();
        move |state, signal| slice.reduce(state, &Action::lifecycle(task, signal))
    }
}

fn unknown_task(name: &str) -> JoinHandle<Result<(), AsyncError>> {
    let message = format!("unknown task: {name}");
    tokio::spawn(async move { Err(AsyncError::Error(message)) })
}
