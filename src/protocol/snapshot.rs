//! Authoritative agent state carried by `STATE_SNAPSHOT` events.
//!
//! An [`AgentSnapshot`] is a full replacement of everything the remote run
//! has produced so far. The client never edits one in place; the next
//! snapshot (or a successfully patched copy, see
//! [`crate::session::reducer`]) supersedes it wholesale.

use serde::{Deserialize, Serialize};

/// Label used for a tool result whose `type` is absent.
pub const UNKNOWN_TOOL_LABEL: &str = "unknown";

/// Agent-visible result state published by the remote run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Tool the agent is executing right now, if any.
    #[serde(default)]
    pub current_tool: Option<String>,
    /// Results in the order the agent produced them.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tool_results: Vec<ToolResult>,
    /// Backend phase marker (`idle`, `executing`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_status: Option<String>,
    /// Date the run was started on, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_date: Option<String>,
    /// `current_date` plus seven days, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_week_from_now: Option<String>,
}

impl AgentSnapshot {
    /// Labels of every tool result, in snapshot order.
    pub fn completed_labels(&self) -> Vec<String> {
        self.tool_results
            .iter()
            .map(|r| r.label().to_string())
            .collect()
    }
}

/// One finished tool call as reported by the remote run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Raw type label (`calendar`, `incident_report`, `decision_record`, ...).
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<ToolStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
    /// Failure explanation supplied alongside an `error` status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Type-specific structured payload, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    /// The `type` label, or [`UNKNOWN_TOOL_LABEL`] when absent.
    pub fn label(&self) -> &str {
        self.kind.as_deref().unwrap_or(UNKNOWN_TOOL_LABEL)
    }

    /// Classified tool kind.
    pub fn tool_kind(&self) -> ToolKind {
        ToolKind::from_label(self.label())
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(ToolStatus::Success)
    }
}

/// Outcome reported for a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    #[serde(alias = "failure")]
    Error,
    /// Any status string this client does not know.
    #[serde(other)]
    Unknown,
}

/// The artifact families the meeting agent can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolKind {
    Calendar,
    IncidentReport,
    DecisionRecord,
    Other(String),
}

impl ToolKind {
    pub fn from_label(label: &str) -> Self {
        match label {
            "calendar" => Self::Calendar,
            "incident_report" => Self::IncidentReport,
            "decision_record" => Self::DecisionRecord,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Calendar => "calendar",
            Self::IncidentReport => "incident_report",
            Self::DecisionRecord => "decision_record",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `tool_results: null` is treated the same as an absent list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ToolResult>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ToolResult>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_decodes_backend_shape() {
        let snapshot: AgentSnapshot = serde_json::from_value(json!({
            "current_tool": null,
            "processing_status": "executing",
            "current_date": "2026-10-17",
            "one_week_from_now": "2026-10-24",
            "tool_results": [
                {"type": "calendar", "status": "success", "filename": "standup.ics",
                 "content": "BEGIN:VCALENDAR"},
                {"type": "incident_report", "status": "error", "message": "bad input"}
            ]
        }))
        .unwrap();

        assert_eq!(snapshot.current_tool, None);
        assert_eq!(snapshot.processing_status.as_deref(), Some("executing"));
        assert_eq!(snapshot.tool_results.len(), 2);
        assert!(snapshot.tool_results[0].is_success());
        assert_eq!(snapshot.tool_results[0].filename.as_deref(), Some("standup.ics"));
        assert_eq!(snapshot.tool_results[1].status, Some(ToolStatus::Error));
        assert_eq!(snapshot.tool_results[1].message.as_deref(), Some("bad input"));
    }

    #[test]
    fn missing_fields_are_neutral() {
        let snapshot: AgentSnapshot = serde_json::from_value(json!({})).unwrap();
        assert_eq!(snapshot, AgentSnapshot::default());

        let snapshot: AgentSnapshot =
            serde_json::from_value(json!({"tool_results": null})).unwrap();
        assert!(snapshot.tool_results.is_empty());
    }

    #[test]
    fn label_falls_back_to_unknown() {
        let result = ToolResult::default();
        assert_eq!(result.label(), "unknown");
        assert_eq!(result.tool_kind(), ToolKind::Other("unknown".into()));
    }

    #[test]
    fn completed_labels_keep_snapshot_order() {
        let snapshot: AgentSnapshot = serde_json::from_value(json!({
            "tool_results": [
                {"type": "decision_record"},
                {"status": "success"},
                {"type": "calendar"}
            ]
        }))
        .unwrap();
        assert_eq!(
            snapshot.completed_labels(),
            vec!["decision_record", "unknown", "calendar"]
        );
    }

    #[test]
    fn unfamiliar_status_and_failure_alias() {
        let result: ToolResult =
            serde_json::from_value(json!({"type": "calendar", "status": "failure"})).unwrap();
        assert_eq!(result.status, Some(ToolStatus::Error));

        let result: ToolResult =
            serde_json::from_value(json!({"type": "calendar", "status": "pending"})).unwrap();
        assert_eq!(result.status, Some(ToolStatus::Unknown));
        assert!(!result.is_success());
    }

    #[test]
    fn tool_kind_round_trips_known_labels() {
        for label in ["calendar", "incident_report", "decision_record", "slides"] {
            assert_eq!(ToolKind::from_label(label).as_str(), label);
        }
        assert_eq!(ToolKind::IncidentReport.to_string(), "incident_report");
    }
}
