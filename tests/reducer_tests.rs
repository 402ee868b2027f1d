use scribe::protocol::{AgentEvent, AgentSnapshot, ToolResult};
use scribe::session::{SessionState, reduce};
use scribe::transport::replay::parse_event_log;
use serde_json::json;

// ─── Helpers ──────────────────────────────────────────────────────────

fn fold(events: &[AgentEvent]) -> SessionState {
    events.iter().fold(SessionState::streaming(), reduce)
}

fn snapshot_of(kinds: &[&str]) -> AgentSnapshot {
    AgentSnapshot {
        tool_results: kinds
            .iter()
            .map(|k| ToolResult {
                kind: Some(k.to_string()),
                ..ToolResult::default()
            })
            .collect(),
        ..AgentSnapshot::default()
    }
}

/// Split `text` into chunks at every char boundary listed in `cuts`.
fn chunk(text: &str, cuts: &[usize]) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        events.push(AgentEvent::text_delta(&text[start..cut]));
        start = cut;
    }
    events.push(AgentEvent::text_delta(&text[start..]));
    events
}

// ============================================================
// Text accumulation
// ============================================================

#[test]
fn test_text_is_chunking_invariant() {
    let text = "Incident on checkout: 15 minutes of downtime · Bob owns the fix ✓";
    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).skip(1).collect();

    let splits: Vec<Vec<usize>> = vec![
        vec![],
        boundaries.clone(),
        boundaries.iter().copied().step_by(3).collect(),
        boundaries.iter().copied().step_by(7).collect(),
        vec![boundaries[boundaries.len() / 2]],
    ];

    for cuts in splits {
        let state = fold(&chunk(text, &cuts));
        assert_eq!(state.text_content, text, "cuts: {cuts:?}");
    }
}

#[test]
fn test_text_survives_interleaved_tool_events() {
    let state = fold(&[
        AgentEvent::text_delta("I found "),
        AgentEvent::tool_call_start("create_calendar_reminder"),
        AgentEvent::tool_call_args("{}"),
        AgentEvent::text_delta("two action items."),
        AgentEvent::tool_call_end("create_calendar_reminder"),
    ]);
    assert_eq!(state.text_content, "I found two action items.");
}

// ============================================================
// Snapshot precedence
// ============================================================

#[test]
fn test_snapshot_current_tool_wins() {
    for snapshot_tool in [Some("y"), None] {
        let state = fold(&[
            AgentEvent::tool_call_start("x"),
            AgentEvent::state_snapshot(AgentSnapshot {
                current_tool: snapshot_tool.map(str::to_string),
                ..AgentSnapshot::default()
            }),
        ]);
        assert_eq!(state.current_tool.as_deref(), snapshot_tool);
    }
}

#[test]
fn test_completed_tools_mirror_latest_snapshot() {
    let sequences: [&[&[&str]]; 3] = [
        &[&["calendar"], &["calendar", "incident_report"]],
        &[&["calendar", "incident_report"], &["decision_record"]],
        &[&["calendar"], &[]],
    ];
    for snapshots in sequences {
        let events: Vec<AgentEvent> = snapshots
            .iter()
            .map(|kinds| AgentEvent::state_snapshot(snapshot_of(kinds)))
            .collect();
        let state = fold(&events);
        let last = snapshots.last().unwrap();
        assert_eq!(state.completed_tools, last.to_vec());
    }
}

#[test]
fn test_incremental_events_after_snapshot_do_not_touch_results() {
    let state = fold(&[
        AgentEvent::state_snapshot(snapshot_of(&["calendar"])),
        AgentEvent::tool_call_start("generate_incident_report"),
        AgentEvent::tool_call_end("generate_incident_report"),
        AgentEvent::ToolCallResult {
            tool_call_id: None,
            content: Some("Generated incident report".into()),
        },
    ]);
    assert_eq!(state.completed_tools, vec!["calendar"]);
    assert_eq!(state.current_tool.as_deref(), Some("generate_incident_report"));
}

// ============================================================
// Recorded wire frames
// ============================================================

#[test]
fn test_recorded_meeting_run() {
    let log = [
        json!({"type": "RUN_STARTED", "threadId": "t1", "runId": "r1"}),
        json!({"type": "TEXT_MESSAGE_START", "messageId": "m1", "role": "assistant"}),
        json!({"type": "TEXT_MESSAGE_CONTENT", "messageId": "m1", "delta": "Hello "}),
        json!({"type": "TEXT_MESSAGE_CONTENT", "messageId": "m1", "delta": "world"}),
        json!({"type": "TEXT_MESSAGE_END", "messageId": "m1"}),
        json!({"type": "TOOL_CALL_START", "toolCallId": "c1", "toolCallName": "create_calendar_reminder"}),
        json!({"type": "TOOL_CALL_ARGS", "toolCallId": "c1", "delta": "{}"}),
        json!({"type": "TOOL_CALL_END", "toolCallId": "c1"}),
        json!({"type": "STATE_SNAPSHOT", "snapshot": {
            "current_tool": null,
            "processing_status": "executing",
            "tool_results": [{"type": "calendar", "status": "success", "filename": "a.ics"}]
        }}),
        json!({"type": "TOOL_CALL_RESULT", "toolCallId": "c1", "content": "Created calendar reminder"}),
        json!({"type": "RAW", "event": {"provider": "openrouter"}}),
        json!({"type": "RUN_FINISHED", "threadId": "t1", "runId": "r1"}),
    ]
    .iter()
    .map(|frame| frame.to_string())
    .collect::<Vec<_>>()
    .join("\n");

    let state = fold(&parse_event_log(&log));
    assert_eq!(state.text_content, "Hello world");
    assert_eq!(state.current_tool, None);
    assert_eq!(state.current_tool_args, "");
    assert_eq!(state.completed_tools, vec!["calendar"]);
    assert!(!state.is_streaming);
    assert_eq!(state.error, None);
    assert_eq!(
        state.agent_state.unwrap().processing_status.as_deref(),
        Some("executing")
    );
}

#[test]
fn test_state_delta_then_snapshot_replaces_patch() {
    let state = fold(&[
        AgentEvent::state_snapshot(snapshot_of(&["calendar"])),
        AgentEvent::state_delta(vec![json!({
            "op": "add", "path": "/tool_results/-", "value": {"type": "incident_report"}
        })]),
    ]);
    assert_eq!(state.completed_tools, vec!["calendar", "incident_report"]);

    let state = reduce(
        state,
        &AgentEvent::state_snapshot(snapshot_of(&["decision_record"])),
    );
    assert_eq!(state.completed_tools, vec!["decision_record"]);
}
