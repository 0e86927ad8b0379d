//! Payload types shared by the tool surface and the widget session.
//!
//! Wire names match what the widget reads from `window.openai.toolOutput`:
//! camelCase fields (`toolKey`, `keepSelectedTool`) and snake_case toolbar
//! actions (`keep_only`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Toolbar mutation requested by `customize_toolbar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarAction {
    Remove,
    KeepOnly,
    Add,
    Reset,
    Get,
}

impl ToolbarAction {
    /// Every action, in schema order.
    pub const ALL: [ToolbarAction; 5] = [
        Self::Remove,
        Self::KeepOnly,
        Self::Add,
        Self::Reset,
        Self::Get,
    ];

    /// Wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::KeepOnly => "keep_only",
            Self::Add => "add",
            Self::Reset => "reset",
            Self::Get => "get",
        }
    }

    /// Parse the wire string. Only the five enumerated values are accepted.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s.trim())
    }

    /// Whether the action reads the intent's `tools` list.
    pub fn uses_tools(&self) -> bool {
        matches!(self, Self::Remove | Self::KeepOnly | Self::Add)
    }
}

impl std::fmt::Display for ToolbarAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A toolbar intent: an action plus canonical toolbar item types.
///
/// `tools` holds post-normalization identifiers in caller order, duplicates
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarIntent {
    pub action: ToolbarAction,
    #[serde(default)]
    pub tools: Vec<String>,
}

/// A tool-selection intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectToolIntent {
    /// Canonical interaction-mode key, or `"none"` to deactivate.
    pub tool_key: String,
    /// Keep the tool active after an annotation is created.
    pub keep_selected_tool: bool,
}

impl SelectToolIntent {
    /// Whether this intent clears the active interaction mode.
    pub fn is_clear(&self) -> bool {
        self.tool_key.is_empty() || self.tool_key == crate::aliases::NO_TOOL
    }
}

/// One entry in the viewer's toolbar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub selected: bool,
}

impl ToolbarItem {
    pub fn new(item_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            selected: false,
        }
    }
}

/// Viewer colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
    HighContrastLight,
    HighContrastDark,
}

impl Theme {
    /// SDK enum member name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "LIGHT",
            Self::Dark => "DARK",
            Self::Auto => "AUTO",
            Self::HighContrastLight => "HIGH_CONTRAST_LIGHT",
            Self::HighContrastDark => "HIGH_CONTRAST_DARK",
        }
    }

    /// Parse from string (case-insensitive, `-` or `_` separated).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "LIGHT" => Some(Self::Light),
            "DARK" => Some(Self::Dark),
            "AUTO" => Some(Self::Auto),
            "HIGH_CONTRAST_LIGHT" => Some(Self::HighContrastLight),
            "HIGH_CONTRAST_DARK" => Some(Self::HighContrastDark),
            _ => None,
        }
    }

    /// Theme to use when an SDK build lacks the high-contrast variants.
    pub fn fallback(&self) -> Self {
        match self {
            Self::HighContrastLight => Self::Light,
            Self::HighContrastDark => Self::Dark,
            other => *other,
        }
    }

    /// Human-readable label ("HIGH CONTRAST DARK").
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a user-visible widget message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Error,
}

/// A transient message shown in the widget; it auto-dismisses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// How long the widget keeps the message on screen.
    pub fn dismiss_after(&self) -> Duration {
        match self.kind {
            NoticeKind::Info => Duration::from_secs(3),
            NoticeKind::Error => Duration::from_secs(5),
        }
    }
}

/// Text block in a tool result's `content` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// `structuredContent` of a tool result. The widget polls the top-level
/// `toolbar` and `selectTool` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredContent {
    Toolbar {
        toolbar: ToolbarIntent,
        timestamp: String,
    },
    SelectTool {
        #[serde(rename = "selectTool")]
        select_tool: SelectToolIntent,
        timestamp: String,
    },
    ViewerStatus {
        #[serde(rename = "viewerReady")]
        viewer_ready: bool,
        #[serde(rename = "supportedFormats")]
        supported_formats: Vec<String>,
        timestamp: String,
    },
    Demo {
        action: String,
        timestamp: String,
    },
}

/// A complete tool-call result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<TextContent>,
    pub structured_content: StructuredContent,
    #[serde(rename = "_meta")]
    pub meta: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toolbar_action_wire_names() {
        assert_eq!(
            serde_json::to_value(ToolbarAction::KeepOnly).unwrap(),
            json!("keep_only")
        );
        assert_eq!(
            ToolbarAction::from_str_loose("keep_only"),
            Some(ToolbarAction::KeepOnly)
        );
        assert_eq!(ToolbarAction::from_str_loose("keep-only"), None);
        assert_eq!(ToolbarAction::from_str_loose("delete"), None);
    }

    #[test]
    fn test_toolbar_intent_missing_tools_defaults_empty() {
        let intent: ToolbarIntent = serde_json::from_value(json!({"action": "reset"})).unwrap();
        assert_eq!(intent.tools, Vec::<String>::new());
    }

    #[test]
    fn test_select_tool_intent_camel_case() {
        let intent = SelectToolIntent {
            tool_key: "inkEraser".into(),
            keep_selected_tool: false,
        };
        assert_eq!(
            serde_json::to_value(&intent).unwrap(),
            json!({"toolKey": "inkEraser", "keepSelectedTool": false})
        );
        assert!(!intent.is_clear());
    }

    #[test]
    fn test_theme_parse_and_fallback() {
        assert_eq!(
            Theme::from_str_loose("high-contrast-dark"),
            Some(Theme::HighContrastDark)
        );
        assert_eq!(Theme::HighContrastDark.fallback(), Theme::Dark);
        assert_eq!(Theme::Auto.fallback(), Theme::Auto);
        assert_eq!(Theme::HighContrastLight.label(), "HIGH CONTRAST LIGHT");
        assert_eq!(Theme::from_str_loose("sepia"), None);
    }

    #[test]
    fn test_structured_content_top_level_keys() {
        let sc = StructuredContent::Toolbar {
            toolbar: ToolbarIntent {
                action: ToolbarAction::Add,
                tools: vec!["ink".into()],
            },
            timestamp: "t".into(),
        };
        let v = serde_json::to_value(&sc).unwrap();
        assert_eq!(v["toolbar"]["action"], "add");
        assert_eq!(v["timestamp"], "t");
    }

    #[test]
    fn test_notice_dismiss_durations() {
        assert_eq!(Notice::info("x").dismiss_after(), Duration::from_secs(3));
        assert_eq!(Notice::error("x").dismiss_after(), Duration::from_secs(5));
    }
}
