use crate::lifecycle::TaskSignal;
use crate::AsyncError;
use crate::State;
use futures_signals::signal::{Mutable, MutableSignalCloned, SignalExt, SignalStream};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

type Reducer<S> = Box<dyn FnOnce(S) -> S + Send>;
type Reader<S> = Box<dyn FnOnce(S) + Send>;

/// Holds a state value and applies updates to it one at a time.
///
/// Updates are queued and applied in order by a single background task, so every
/// reducer runs to completion against the result of the previous one. Must be created
/// inside a tokio runtime.
pub struct StateStore<S: State> {
    state: Mutable<S>,
    set_state_tx: UnboundedSender<Reducer<S>>,
    with_state_tx: UnboundedSender<Reader<S>>,
}

impl<S: State> StateStore<S> {
    pub fn new(initial_state: S) -> Self {
        let state = Mutable::new(initial_state);
        let (set_state_tx, set_state_rx) = tokio::sync::mpsc::unbounded_channel::<Reducer<S>>();
        let (with_state_tx, with_state_rx) = tokio::sync::mpsc::unbounded_channel::<Reader<S>>();

        let state_clone = state.clone();

        tokio::spawn(async move {
            Self::process_queue(state_clone, set_state_rx, with_state_rx).await;
        });

        StateStore {
            state,
            set_state_tx,
            with_state_tx,
        }
    }

    async fn process_queue(
        state: Mutable<S>,
        mut set_state_rx: UnboundedReceiver<Reducer<S>>,
        mut with_state_rx: UnboundedReceiver<Reader<S>>,
    ) {
        loop {
            tokio::select! {
                biased;
                Some(reducer) = set_state_rx.recv() => {
                    let new_state = reducer(state.get_cloned());
                    state.set(new_state)
                }
                Some(action) = with_state_rx.recv() => {
                    action(state.get_cloned());
                }
                else => break,
            }
        }
        trace!("state queue closed");
    }

    pub fn to_stream(&self) -> SignalStream<MutableSignalCloned<S>> {
        self.state.signal_cloned().to_stream()
    }

    pub fn to_signal(&self) -> MutableSignalCloned<S> {
        self.state.signal_cloned()
    }

    /// Queues a reducer. Fails only if the queue has shut down.
    pub fn set_state<F>(&self, reducer: F) -> Result<(), AsyncError>
    where
        F: FnOnce(S) -> S + Send + 'static,
    {
        Self::send_reducer(&self.set_state_tx, Box::new(reducer))
    }

    /// Queues a read of the state as it is after all reducers queued before it.
    pub fn with_state<F>(&self, action: F) -> Result<(), AsyncError>
    where
        F: FnOnce(S) + Send + 'static,
    {
        self.with_state_tx.send(Box::new(action)).map_err(|_| {
            warn!("state queue is closed, dropping read");
            AsyncError::error("channel closed")
        })
    }

    /// The latest published state, without waiting for queued reducers.
    pub fn get_state(&self) -> S {
        self.state.get_cloned()
    }

    /// The state after every reducer queued so far has been applied.
    pub async fn await_state(&self) -> Result<S, AsyncError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.with_state(|state| {
            let _ = tx.send(state);
        })?;
        rx.await.map_err(|e| AsyncError::error(e.to_string()))
    }

    fn send_reducer(
        set_state_tx: &UnboundedSender<Reducer<S>>,
        reducer: Reducer<S>,
    ) -> Result<(), AsyncError> {
        set_state_tx.send(reducer).map_err(|_| {
            warn!("state queue is closed, dropping update");
            AsyncError::error("channel closed")
        })
    }

    fn apply_signal<U>(
        set_state_tx: &UnboundedSender<Reducer<S>>,
        state_updater: U,
        signal: TaskSignal,
    ) -> Result<(), AsyncError>
    where
        U: FnOnce(S, TaskSignal) -> S + Send + 'static,
    {
        Self::send_reducer(
            set_state_tx,
            Box::new(move |old_state| state_updater(old_state, signal)),
        )
    }

    fn execute_core<F, U>(
        &self,
        computation: F,
        state_updater: U,
        cancellation_token: Option<CancellationToken>,
        timeout: Option<Duration>,
    ) -> JoinHandle<Result<(), AsyncError>>
    where
        F: Future<Output = TaskSignal> + Send + 'static,
        U: FnOnce(S, TaskSignal) -> S + Clone + Send + 'static,
    {
        let set_state_tx = self.set_state_tx.clone();
        tokio::spawn(async move {
            Self::apply_signal(&set_state_tx, state_updater.clone(), TaskSignal::Started)?;
            // Let the pending state publish before the computation runs
            tokio::task::yield_now().await;

            let bounded = async move {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, computation)
                        .await
                        .unwrap_or_else(|_| TaskSignal::failed(AsyncError::Timeout)),
                    None => computation.await,
                }
            };
            let signal = match cancellation_token {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => TaskSignal::failed(AsyncError::Cancelled),
                    signal = bounded => signal,
                },
                None => bounded.await,
            };

            Self::apply_signal(&set_state_tx, state_updater, signal)
        })
    }

    /// Runs `computation`, reporting [`TaskSignal::Started`] first and then the signal it
    /// resolves to, both through `state_updater`.
    pub fn async_execute<F, U>(
        &self,
        computation: F,
        state_updater: U,
    ) -> JoinHandle<Result<(), AsyncError>>
    where
        F: Future<Output = TaskSignal> + Send + 'static,
        U: FnOnce(S, TaskSignal) -> S + Clone + Send + 'static,
    {
        self.execute_core(computation, state_updater, None, None)
    }

    /// Like [`StateStore::async_execute`]; cancelling the token fails the task with
    /// [`AsyncError::Cancelled`].
    pub fn async_execute_cancellable<F, U, Fut>(
        &self,
        cancellation_token: CancellationToken,
        computation: F,
        state_updater: U,
    ) -> JoinHandle<Result<(), AsyncError>>
    where
        Fut: Future<Output = TaskSignal> + Send + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        U: FnOnce(S, TaskSignal) -> S + Clone + Send + 'static,
    {
        self.execute_core(
            computation(cancellation_token.clone()),
            state_updater,
            Some(cancellation_token),
            None,
        )
    }

    /// Like [`StateStore::async_execute`]; running past `timeout` fails the task with
    /// [`AsyncError::Timeout`].
    pub fn async_execute_with_timeout<F, U>(
        &self,
        computation: F,
        timeout: Duration,
        state_updater: U,
    ) -> JoinHandle<Result<(), AsyncError>>
    where
        F: Future<Output = TaskSignal> + Send + 'static,
        U: FnOnce(S, TaskSignal) -> S + Clone + Send + 'static,
    {
        self.execute_core(computation, state_updater, None, Some(timeout))
    }
}
