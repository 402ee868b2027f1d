//! Event envelope model for the agent-run stream.
//!
//! [`AgentEvent`] is the closed set of event kinds the session reducer is
//! defined over. Every payload field is optional on the wire: a missing
//! field decodes to `None` and the reducer treats it as the neutral value.
//! Envelope ids and codes are decoded leniently: a badly typed one becomes
//! `None` and the event itself still counts.
//! Frames that are not recognized, or that do not decode, become
//! [`AgentEvent::Unknown`] instead of an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::snapshot::AgentSnapshot;

/// One event delivered by the remote agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentEvent {
    // -- Run lifecycle --
    RunStarted {
        #[serde(
            rename = "threadId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        thread_id: Option<String>,
        #[serde(
            rename = "runId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        run_id: Option<String>,
    },
    RunFinished {
        #[serde(
            rename = "threadId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        thread_id: Option<String>,
        #[serde(
            rename = "runId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        run_id: Option<String>,
    },
    RunError {
        #[serde(default)]
        message: Option<String>,
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },

    // -- Narrative text --
    TextMessageStart {
        #[serde(
            rename = "messageId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        message_id: Option<String>,
    },
    TextMessageContent {
        #[serde(
            rename = "messageId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        message_id: Option<String>,
        #[serde(default)]
        delta: Option<String>,
    },
    TextMessageEnd {
        #[serde(
            rename = "messageId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        message_id: Option<String>,
    },

    // -- Tool calls --
    ToolCallStart {
        #[serde(
            rename = "toolCallId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        tool_call_id: Option<String>,
        #[serde(rename = "toolCallName", default)]
        tool_call_name: Option<String>,
    },
    ToolCallArgs {
        #[serde(
            rename = "toolCallId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        tool_call_id: Option<String>,
        #[serde(default)]
        delta: Option<String>,
    },
    ToolCallEnd {
        #[serde(
            rename = "toolCallId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        tool_call_id: Option<String>,
        #[serde(rename = "toolCallName", default, skip_serializing_if = "Option::is_none")]
        tool_call_name: Option<String>,
    },
    ToolCallResult {
        #[serde(
            rename = "toolCallId",
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        tool_call_id: Option<String>,
        #[serde(default)]
        content: Option<String>,
    },

    // -- Agent state --
    StateSnapshot {
        #[serde(default)]
        snapshot: Option<AgentSnapshot>,
    },
    /// RFC 6902 patch against the last snapshot.
    StateDelta {
        #[serde(default)]
        delta: Option<Value>,
    },

    // -- Diagnostics --
    Raw {
        #[serde(default)]
        event: Value,
        #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    Custom {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        value: Value,
    },

    /// Any discriminator this client does not handle.
    #[serde(other)]
    Unknown,
}

/// Decode an envelope field the reducer never reads. A value of the wrong
/// shape becomes `None` so it cannot take the rest of the frame down with it.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Discriminator of an [`AgentEvent`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RunStarted,
    RunFinished,
    RunError,
    TextMessageStart,
    TextMessageContent,
    TextMessageEnd,
    ToolCallStart,
    ToolCallArgs,
    ToolCallEnd,
    ToolCallResult,
    StateSnapshot,
    StateDelta,
    Raw,
    Custom,
    Unknown,
}

impl EventKind {
    /// Wire discriminator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunStarted => "RUN_STARTED",
            Self::RunFinished => "RUN_FINISHED",
            Self::RunError => "RUN_ERROR",
            Self::TextMessageStart => "TEXT_MESSAGE_START",
            Self::TextMessageContent => "TEXT_MESSAGE_CONTENT",
            Self::TextMessageEnd => "TEXT_MESSAGE_END",
            Self::ToolCallStart => "TOOL_CALL_START",
            Self::ToolCallArgs => "TOOL_CALL_ARGS",
            Self::ToolCallEnd => "TOOL_CALL_END",
            Self::ToolCallResult => "TOOL_CALL_RESULT",
            Self::StateSnapshot => "STATE_SNAPSHOT",
            Self::StateDelta => "STATE_DELTA",
            Self::Raw => "RAW",
            Self::Custom => "CUSTOM",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Kinds that end a run. At most one is applied per run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::RunFinished | Self::RunError)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AgentEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::RunStarted { .. } => EventKind::RunStarted,
            Self::RunFinished { .. } => EventKind::RunFinished,
            Self::RunError { .. } => EventKind::RunError,
            Self::TextMessageStart { .. } => EventKind::TextMessageStart,
            Self::TextMessageContent { .. } => EventKind::TextMessageContent,
            Self::TextMessageEnd { .. } => EventKind::TextMessageEnd,
            Self::ToolCallStart { .. } => EventKind::ToolCallStart,
            Self::ToolCallArgs { .. } => EventKind::ToolCallArgs,
            Self::ToolCallEnd { .. } => EventKind::ToolCallEnd,
            Self::ToolCallResult { .. } => EventKind::ToolCallResult,
            Self::StateSnapshot { .. } => EventKind::StateSnapshot,
            Self::StateDelta { .. } => EventKind::StateDelta,
            Self::Raw { .. } => EventKind::Raw,
            Self::Custom { .. } => EventKind::Custom,
            Self::Unknown => EventKind::Unknown,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }

    /// Decode one wire frame. Never fails: frames that do not match the
    /// envelope model are logged and returned as [`AgentEvent::Unknown`].
    pub fn decode(frame: Value) -> Self {
        let type_name = frame
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<missing>")
            .to_string();
        match serde_json::from_value(frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(event_type = %type_name, error = %e, "Ignoring malformed event");
                Self::Unknown
            }
        }
    }

    /// Parse and decode one JSON text frame (an SSE `data:` payload or a
    /// JSONL line). Invalid JSON is treated like any other malformed frame.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(frame) => Self::decode(frame),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring event frame that is not valid JSON");
                Self::Unknown
            }
        }
    }

    // -- Constructors --

    pub fn run_started() -> Self {
        Self::RunStarted {
            thread_id: None,
            run_id: None,
        }
    }

    pub fn run_finished() -> Self {
        Self::RunFinished {
            thread_id: None,
            run_id: None,
        }
    }

    pub fn run_error(message: impl Into<String>) -> Self {
        Self::RunError {
            message: Some(message.into()),
            code: None,
        }
    }

    pub fn text_delta(delta: impl Into<String>) -> Self {
        Self::TextMessageContent {
            message_id: None,
            delta: Some(delta.into()),
        }
    }

    pub fn tool_call_start(name: impl Into<String>) -> Self {
        Self::ToolCallStart {
            tool_call_id: None,
            tool_call_name: Some(name.into()),
        }
    }

    pub fn tool_call_args(delta: impl Into<String>) -> Self {
        Self::ToolCallArgs {
            tool_call_id: None,
            delta: Some(delta.into()),
        }
    }

    pub fn tool_call_end(name: impl Into<String>) -> Self {
        Self::ToolCallEnd {
            tool_call_id: None,
            tool_call_name: Some(name.into()),
        }
    }

    pub fn state_snapshot(snapshot: AgentSnapshot) -> Self {
        Self::StateSnapshot {
            snapshot: Some(snapshot),
        }
    }

    pub fn state_delta(operations: Vec<Value>) -> Self {
        Self::StateDelta {
            delta: Some(Value::Array(operations)),
        }
    }
}
