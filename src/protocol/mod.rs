//! Wire vocabulary of the agent-run stream.
//!
//! [`events`] holds the event envelope the reducer is defined over;
//! [`snapshot`] holds the authoritative agent state those events carry.

pub mod events;
pub mod snapshot;

pub use events::{AgentEvent, EventKind};
pub use snapshot::{AgentSnapshot, ToolKind, ToolResult, ToolStatus};
