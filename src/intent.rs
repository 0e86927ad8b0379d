//! Intent emission: turn validated tool arguments into widget payloads.
//!
//! Emitters never touch a viewer. They normalize names and build the value
//! that the host will inject into the widget as `toolOutput`.

use crate::aliases::{normalize_tool_key, normalize_toolbar_item};
use crate::types::{SelectToolIntent, ToolbarAction, ToolbarIntent};
use chrono::{SecondsFormat, Utc};

/// Build a toolbar intent, normalizing every raw tool name in order.
///
/// Duplicates are kept; the consumer deduplicates against live state on `add`.
///
/// ```
/// use nutrient_mcp::intent::emit_toolbar_intent;
/// use nutrient_mcp::ToolbarAction;
///
/// let intent = emit_toolbar_intent(ToolbarAction::KeepOnly, &["thumbnail", "download"]);
/// assert_eq!(intent.tools, vec!["sidebar-thumbnails", "export-pdf"]);
/// ```
pub fn emit_toolbar_intent<S: AsRef<str>>(action: ToolbarAction, raw_tools: &[S]) -> ToolbarIntent {
    ToolbarIntent {
        action,
        tools: raw_tools
            .iter()
            .map(|t| normalize_toolbar_item(t.as_ref()))
            .collect(),
    }
}

/// Build a tool-selection intent. Only an explicit `Some(false)` turns
/// `keepSelectedTool` off.
pub fn emit_select_tool_intent(raw_tool: &str, keep_selected_tool: Option<bool>) -> SelectToolIntent {
    SelectToolIntent {
        tool_key: normalize_tool_key(raw_tool),
        keep_selected_tool: keep_selected_tool != Some(false),
    }
}

/// One-line text shown in the chat transcript for a toolbar intent.
pub fn toolbar_summary(intent: &ToolbarIntent) -> String {
    if intent.tools.is_empty() {
        format!("Toolbar update: {}", intent.action)
    } else {
        format!(
            "Toolbar update: {} [{}]",
            intent.action,
            intent.tools.join(", ")
        )
    }
}

/// One-line text shown in the chat transcript for a selection intent.
pub fn select_tool_summary(intent: &SelectToolIntent) -> String {
    if intent.is_clear() {
        "Clearing selected tool.".to_string()
    } else {
        format!("Selecting tool: {}", intent.tool_key)
    }
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_only_normalizes_in_order() {
        let intent = emit_toolbar_intent(ToolbarAction::KeepOnly, &["thumbnail", "download"]);
        assert_eq!(intent.action, ToolbarAction::KeepOnly);
        assert_eq!(intent.tools, vec!["sidebar-thumbnails", "export-pdf"]);
    }

    #[test]
    fn test_reset_without_tools() {
        let intent = emit_toolbar_intent::<&str>(ToolbarAction::Reset, &[]);
        assert!(intent.tools.is_empty());
        assert_eq!(toolbar_summary(&intent), "Toolbar update: reset");
    }

    #[test]
    fn test_duplicates_survive_emission() {
        let intent = emit_toolbar_intent(ToolbarAction::Add, &["pen", "draw", "Ink"]);
        assert_eq!(intent.tools, vec!["ink", "ink", "ink"]);
    }

    #[test]
    fn test_unknown_toolbar_item_passes_through() {
        let intent = emit_toolbar_intent(ToolbarAction::Remove, &[" Laser "]);
        assert_eq!(intent.tools, vec!["laser"]);
        assert_eq!(toolbar_summary(&intent), "Toolbar update: remove [laser]");
    }

    #[test]
    fn test_select_tool_defaults_keep_true() {
        let intent = emit_select_tool_intent("HAND", None);
        assert_eq!(intent.tool_key, "pan");
        assert!(intent.keep_selected_tool);
        assert!(emit_select_tool_intent("ink", Some(true)).keep_selected_tool);
    }

    #[test]
    fn test_select_tool_explicit_false() {
        let intent = emit_select_tool_intent("ink", Some(false));
        assert_eq!(intent.tool_key, "ink");
        assert!(!intent.keep_selected_tool);
        assert_eq!(select_tool_summary(&intent), "Selecting tool: ink");
    }

    #[test]
    fn test_select_tool_clear_synonyms() {
        for raw in ["none", "Clear", " reset "] {
            let intent = emit_select_tool_intent(raw, None);
            assert_eq!(intent.tool_key, "none");
            assert_eq!(select_tool_summary(&intent), "Clearing selected tool.");
        }
    }

    #[test]
    fn test_timestamp_is_rfc3339_utc() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
