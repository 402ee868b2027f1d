//! Session controller: owns the live run and publishes its state.
//!
//! [`SessionController`] opens one run per [`start`](SessionController::start),
//! drives its event stream on a tokio task and folds every event into the
//! shared [`SessionState`] through the reducer. The state is published on a
//! `watch` channel; renderers read it through [`SessionController::subscribe`].
//!
//! **Cancellation model:** the controller holds a root [`CancellationToken`].
//! Each run gets a child token. Retiring a run (cancel, reset, or a new
//! start) cancels its token *before* the state is touched, and the run task
//! re-checks its token under the `watch` lock before every write. A retired
//! run therefore cannot write into the state of the run that replaced it,
//! even if its transport keeps delivering events.
//!
//! **Failure model:** nothing escapes to the caller. Transport failures
//! become `error`; a cancellation-class failure is a clean stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::reducer::{fail_run, finish_run};
use super::state::SessionState;
use crate::transport::{AgentRunClient, EventStream, RunRequest};

/// Message used when a transport failure carries none.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Agent run failed";

/// Message used when `start` is called after `shutdown`.
pub const SHUT_DOWN_MESSAGE: &str = "Session controller has shut down";

/// How long `shutdown` waits for the live run task to exit.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-controller run counter value. Starts at 1.
pub type RunId = u64;

/// The one run that may write into the session state.
struct LiveRun {
    id: RunId,
    cancel_token: CancellationToken,
    join_handle: JoinHandle<()>,
}

impl LiveRun {
    fn retire(&self) {
        self.cancel_token.cancel();
    }
}

/// Drives agent runs and exposes their state.
///
/// Every instance is independent: tests can build as many controllers as
/// they like without shared globals.
pub struct SessionController<C> {
    client: C,
    state_tx: Arc<watch::Sender<SessionState>>,
    live: Mutex<Option<LiveRun>>,
    next_run_id: AtomicU64,
    root_cancel_token: CancellationToken,
}

impl<C: AgentRunClient> SessionController<C> {
    pub fn new(client: C) -> Self {
        let (state_tx, _) = watch::channel(SessionState::new());
        Self {
            client,
            state_tx: Arc::new(state_tx),
            live: Mutex::new(None),
            next_run_id: AtomicU64::new(1),
            root_cancel_token: CancellationToken::new(),
        }
    }

    /// Start a run for `input`, replacing any live run.
    ///
    /// Resets the state to a fresh streaming state, opens exactly one run on
    /// the client and spawns the task that applies its events. Never fails;
    /// problems surface as `error` in the state.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, input: impl Into<String>) -> RunId {
        let mut live = lock(&self.live);
        if let Some(previous) = live.take() {
            tracing::info!(run_id = previous.id, "Replacing live run");
            previous.retire();
        }

        let run_id = self.next_run_id.fetch_add(1, Ordering::SeqCst);

        if self.root_cancel_token.is_cancelled() {
            tracing::warn!(run_id, "Start requested after shutdown");
            let mut state = SessionState::new();
            state.error = Some(SHUT_DOWN_MESSAGE.to_string());
            self.state_tx.send_replace(state);
            return run_id;
        }

        self.state_tx.send_replace(SessionState::streaming());

        let request = RunRequest::new(input);
        tracing::info!(
            run_id,
            thread_id = %request.thread_id,
            remote_run_id = %request.run_id,
            "Starting agent run"
        );
        let events = self.client.open_run(request);

        let cancel_token = self.root_cancel_token.child_token();
        let join_handle = tokio::spawn(drive_run(
            run_id,
            events,
            cancel_token.clone(),
            self.state_tx.clone(),
        ));

        *live = Some(LiveRun {
            id: run_id,
            cancel_token,
            join_handle,
        });
        run_id
    }

    /// Abort the live run, if any, and stop streaming immediately.
    ///
    /// Does not wait for the transport and never sets `error`.
    pub fn cancel(&self) {
        let mut live = lock(&self.live);
        if let Some(run) = live.take() {
            tracing::info!(run_id = run.id, "Cancelling run");
            run.retire();
        }
        self.state_tx.send_if_modified(|state| {
            let was_streaming = state.is_streaming;
            state.is_streaming = false;
            was_streaming
        });
    }

    /// Cancel, then restore the initial state.
    pub fn reset(&self) {
        let mut live = lock(&self.live);
        if let Some(run) = live.take() {
            tracing::info!(run_id = run.id, "Resetting session");
            run.retire();
        }
        self.state_tx.send_replace(SessionState::new());
    }

    /// Cancel every run for good and wait (up to five seconds) for the
    /// live run task to exit. Later `start` calls only record an error.
    pub async fn shutdown(&self) {
        self.root_cancel_token.cancel();
        let run = lock(&self.live).take();
        if let Some(run) = run {
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, run.join_handle).await.is_err() {
                tracing::warn!(
                    run_id = run.id,
                    timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                    "Run task did not exit before the shutdown timeout"
                );
            }
        }
        self.state_tx.send_if_modified(|state| {
            let was_streaming = state.is_streaming;
            state.is_streaming = false;
            was_streaming
        });
        tracing::info!("Session controller shut down");
    }
}

impl<C> SessionController<C> {
    /// Clone of the current state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Read-only view that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Id of the run still reading its stream, if any. A run stops being
    /// live once it is retired or has applied its terminal transition.
    pub fn live_run(&self) -> Option<RunId> {
        lock(&self.live)
            .as_ref()
            .filter(|run| !run.cancel_token.is_cancelled() && !run.join_handle.is_finished())
            .map(|run| run.id)
    }

    /// Resolve once the state is no longer streaming.
    pub async fn wait_idle(&self) -> SessionState {
        let mut rx = self.state_tx.subscribe();
        match rx.wait_for(|state| !state.is_streaming).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }
}

impl<C> Drop for SessionController<C> {
    fn drop(&mut self) {
        self.root_cancel_token.cancel();
    }
}

/// Read the run's events until a terminal transition or retirement.
///
/// Exactly one terminal transition is applied per run: the loop returns
/// right after it, which drops the stream.
async fn drive_run(
    run_id: RunId,
    mut events: EventStream,
    cancel_token: CancellationToken,
    state_tx: Arc<watch::Sender<SessionState>>,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                tracing::debug!(run_id, "Run retired; dropping event stream");
                return;
            }
            next = events.next() => next,
        };

        match next {
            Some(Ok(event)) => {
                let kind = event.kind();
                tracing::debug!(run_id, kind = %kind, "Applying event");
                if !publish(&state_tx, &cancel_token, |state| state.apply_event(&event)) {
                    return;
                }
                if kind.is_terminal() {
                    tracing::info!(run_id, kind = %kind, "Run ended");
                    return;
                }
            }
            Some(Err(e)) if e.is_cancellation() => {
                tracing::info!(run_id, "Transport reported cancellation; stopping cleanly");
                publish(&state_tx, &cancel_token, finish_run);
                return;
            }
            Some(Err(e)) => {
                let message = e.message();
                tracing::warn!(run_id, error = %e, "Agent run failed");
                publish(&state_tx, &cancel_token, |state| {
                    fail_run(
                        state,
                        Some(message.as_deref().unwrap_or(TRANSPORT_FAILURE_MESSAGE)),
                    );
                });
                return;
            }
            None => {
                tracing::info!(run_id, "Event stream closed without a terminal event");
                publish(&state_tx, &cancel_token, finish_run);
                return;
            }
        }
    }
}

/// Apply `update` unless the run has been retired. The token is checked
/// under the channel's write lock, the same lock `start`/`reset` replace
/// the state under. Subscribers are only notified when the state changed.
/// Returns whether the update was accepted.
fn publish(
    state_tx: &watch::Sender<SessionState>,
    cancel_token: &CancellationToken,
    update: impl FnOnce(&mut SessionState),
) -> bool {
    let mut accepted = false;
    state_tx.send_if_modified(|state| {
        if cancel_token.is_cancelled() {
            return false;
        }
        accepted = true;
        let before = state.clone();
        update(state);
        *state != before
    });
    accepted
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
