//! In-process client fed through channels.
//!
//! Each [`AgentRunClient::open_run`] call creates a fresh unbounded channel
//! and hands its sending half to the host as a [`RunFeed`]. The host pushes
//! decoded events (or a failure) into the feed; the controller reads the
//! other half. When the controller retires a run it drops the receiver,
//! which the host can observe through [`RunFeed::is_aborted`].

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use futures::stream;

use super::{AgentRunClient, EventStream, RunRequest};
use crate::error::TransportError;
use crate::protocol::AgentEvent;

/// Sending side of one opened run.
pub struct RunFeed {
    pub request: RunRequest,
    sender: UnboundedSender<Result<AgentEvent, TransportError>>,
}

impl RunFeed {
    /// Deliver an event. Returns `false` once the run has been retired.
    pub fn send(&self, event: AgentEvent) -> bool {
        self.sender.unbounded_send(Ok(event)).is_ok()
    }

    /// Deliver a transport failure.
    pub fn fail(&self, error: TransportError) -> bool {
        self.sender.unbounded_send(Err(error)).is_ok()
    }

    /// End the stream without a terminal event.
    pub fn close(&self) {
        self.sender.close_channel();
    }

    /// True once the controller dropped this run's stream.
    pub fn is_aborted(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Client whose runs are driven by the host through [`RunFeed`]s.
#[derive(Clone)]
pub struct ChannelClient {
    runs: UnboundedSender<RunFeed>,
}

impl ChannelClient {
    /// Create the client and the receiver on which opened runs appear.
    pub fn new() -> (Self, UnboundedReceiver<RunFeed>) {
        let (runs, opened) = mpsc::unbounded();
        (Self { runs }, opened)
    }
}

impl AgentRunClient for ChannelClient {
    fn open_run(&self, request: RunRequest) -> EventStream {
        let (sender, receiver) = mpsc::unbounded();
        let run_id = request.run_id.clone();
        if self.runs.unbounded_send(RunFeed { request, sender }).is_err() {
            tracing::warn!(run_id = %run_id, "No host is accepting runs");
            return stream::once(async {
                Err(TransportError::Connect("no host is accepting runs".to_string()))
            })
            .boxed();
        }
        receiver.boxed()
    }
}
