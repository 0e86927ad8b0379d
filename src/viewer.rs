//! The viewer SDK surface the widget drives, and the interaction-mode table.
//!
//! The real viewer lives in the browser. [`Viewer`] names the handful of
//! capabilities the intent consumer needs; [`InMemoryViewer`] implements them
//! without a browser so sessions can be replayed from the CLI and tested.

use crate::types::{Theme, ToolbarItem};
use serde::{Deserialize, Serialize};

/// Toolbar item types the SDK ships by default, in display order.
pub const DEFAULT_TOOLBAR_ITEMS: &[&str] = &[
    "sidebar-thumbnails",
    "sidebar-document-outline",
    "sidebar-annotations",
    "sidebar-bookmarks",
    "pager",
    "pan",
    "zoom-out",
    "zoom-in",
    "zoom-mode",
    "spacer",
    "annotate",
    "ink",
    "highlighter",
    "text-highlighter",
    "ink-eraser",
    "signature",
    "image",
    "stamp",
    "note",
    "text",
    "line",
    "arrow",
    "rectangle",
    "ellipse",
    "polygon",
    "polyline",
    "print",
    "document-editor",
    "document-crop",
    "search",
    "export-pdf",
];

/// Viewer-native interaction modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionMode {
    Pan,
    MarqueeZoom,
    Search,
    Text,
    Note,
    Ink,
    InkEraser,
    ShapeLine,
    ShapeRectangle,
    ShapeEllipse,
    ShapePolygon,
    ShapePolyline,
    RedactTextHighlighter,
    RedactShapeRectangle,
    DocumentEditor,
    DocumentCrop,
    FormCreator,
    Measurement,
}

impl InteractionMode {
    /// Enum member name on the SDK's `InteractionMode` object.
    pub fn sdk_name(&self) -> &'static str {
        match self {
            Self::Pan => "PAN",
            Self::MarqueeZoom => "MARQUEE_ZOOM",
            Self::Search => "SEARCH",
            Self::Text => "TEXT",
            Self::Note => "NOTE",
            Self::Ink => "INK",
            Self::InkEraser => "INK_ERASER",
            Self::ShapeLine => "SHAPE_LINE",
            Self::ShapeRectangle => "SHAPE_RECTANGLE",
            Self::ShapeEllipse => "SHAPE_ELLIPSE",
            Self::ShapePolygon => "SHAPE_POLYGON",
            Self::ShapePolyline => "SHAPE_POLYLINE",
            Self::RedactTextHighlighter => "REDACT_TEXT_HIGHLIGHTER",
            Self::RedactShapeRectangle => "REDACT_SHAPE_RECTANGLE",
            Self::DocumentEditor => "DOCUMENT_EDITOR",
            Self::DocumentCrop => "DOCUMENT_CROP",
            Self::FormCreator => "FORM_CREATOR",
            Self::Measurement => "MEASUREMENT",
        }
    }

    /// Whether the mode needs an add-on license component.
    pub fn is_licensed(&self) -> bool {
        matches!(
            self,
            Self::RedactTextHighlighter
                | Self::RedactShapeRectangle
                | Self::DocumentEditor
                | Self::DocumentCrop
                | Self::FormCreator
                | Self::Measurement
        )
    }
}

impl std::fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sdk_name())
    }
}

/// A canonical tool key, the mode it activates, and the toolbar item types
/// to highlight while it is active.
#[derive(Debug, Clone, Copy)]
pub struct ModeBinding {
    pub key: &'static str,
    pub mode: InteractionMode,
    pub toolbar_types: &'static [&'static str],
}

const fn bind(
    key: &'static str,
    mode: InteractionMode,
    toolbar_types: &'static [&'static str],
) -> ModeBinding {
    ModeBinding {
        key,
        mode,
        toolbar_types,
    }
}

/// Tool key -> interaction mode. Actions such as `export-pdf` or `print`
/// are not modes and have no row.
pub const MODE_BINDINGS: &[ModeBinding] = &[
    // navigation
    bind("pan", InteractionMode::Pan, &["pan"]),
    bind("marqueeZoom", InteractionMode::MarqueeZoom, &["marquee-zoom", "marqueeZoom"]),
    bind("search", InteractionMode::Search, &["search"]),
    // annotations
    bind("text", InteractionMode::Text, &["text"]),
    bind("note", InteractionMode::Note, &["note"]),
    bind("ink", InteractionMode::Ink, &["ink"]),
    bind("inkEraser", InteractionMode::InkEraser, &["ink-eraser", "inkEraser"]),
    bind("line", InteractionMode::ShapeLine, &["line"]),
    bind("rectangle", InteractionMode::ShapeRectangle, &["rectangle"]),
    bind("ellipse", InteractionMode::ShapeEllipse, &["ellipse"]),
    bind("polygon", InteractionMode::ShapePolygon, &["polygon"]),
    bind("polyline", InteractionMode::ShapePolyline, &["polyline"]),
    // license components
    bind(
        "redactText",
        InteractionMode::RedactTextHighlighter,
        &["redact-text-highlighter", "redactText"],
    ),
    bind(
        "redactRectangle",
        InteractionMode::RedactShapeRectangle,
        &["redact-rectangle", "redactRectangle"],
    ),
    bind(
        "documentEditor",
        InteractionMode::DocumentEditor,
        &["document-editor", "documentEditor"],
    ),
    bind(
        "documentCrop",
        InteractionMode::DocumentCrop,
        &["document-crop", "documentCrop"],
    ),
    bind("formCreator", InteractionMode::FormCreator, &["form-creator", "formCreator"]),
    bind("measurement", InteractionMode::Measurement, &["measure", "measurement"]),
];

/// Look up the binding for a canonical tool key (case-sensitive).
pub fn mode_binding(key: &str) -> Option<&'static ModeBinding> {
    MODE_BINDINGS.iter().find(|b| b.key == key)
}

/// Capabilities of a live viewer instance.
///
/// Every call is a single synchronous mutation, so an update either applies
/// fully or not at all.
pub trait Viewer {
    /// Current toolbar items.
    fn toolbar_items(&self) -> Vec<ToolbarItem>;

    /// Replace the toolbar items.
    fn set_toolbar_items(&mut self, items: Vec<ToolbarItem>);

    /// The SDK's default toolbar.
    fn default_toolbar_items(&self) -> Vec<ToolbarItem>;

    /// Active interaction mode, if any.
    fn interaction_mode(&self) -> Option<InteractionMode>;

    fn set_interaction_mode(&mut self, mode: Option<InteractionMode>);

    fn keep_selected_tool(&self) -> bool;

    fn set_keep_selected_tool(&mut self, keep: bool);

    /// Whether this build/license exposes `mode`.
    fn supports_mode(&self, mode: InteractionMode) -> bool;

    fn theme(&self) -> Theme;

    fn set_theme(&mut self, theme: Theme);

    /// Whether this build exposes `theme`. High-contrast themes are missing
    /// from older builds.
    fn supports_theme(&self, _theme: Theme) -> bool {
        true
    }

    /// Functional toolbar update: read, transform, write back.
    fn update_toolbar_items<F>(&mut self, f: F)
    where
        F: FnOnce(Vec<ToolbarItem>) -> Vec<ToolbarItem>,
        Self: Sized,
    {
        let items = self.toolbar_items();
        self.set_toolbar_items(f(items));
    }

    /// Toolbar item types in display order.
    fn toolbar_item_types(&self) -> Vec<String> {
        self.toolbar_items()
            .into_iter()
            .map(|i| i.item_type)
            .collect()
    }
}

/// A viewer held entirely in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryViewer {
    items: Vec<ToolbarItem>,
    defaults: Vec<ToolbarItem>,
    mode: Option<InteractionMode>,
    keep_selected_tool: bool,
    theme: Theme,
    supported_modes: Option<Vec<InteractionMode>>,
    high_contrast: bool,
    toolbar_writes: usize,
}

impl Default for InMemoryViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryViewer {
    /// A viewer showing the default toolbar, with every mode available.
    pub fn new() -> Self {
        let defaults: Vec<ToolbarItem> = DEFAULT_TOOLBAR_ITEMS
            .iter()
            .map(|t| ToolbarItem::new(*t))
            .collect();
        Self {
            items: defaults.clone(),
            defaults,
            mode: None,
            keep_selected_tool: false,
            theme: Theme::default(),
            supported_modes: None,
            high_contrast: true,
            toolbar_writes: 0,
        }
    }

    /// A viewer whose current and default toolbar are `types`.
    pub fn with_toolbar<S: AsRef<str>>(mut self, types: &[S]) -> Self {
        self.defaults = types.iter().map(|t| ToolbarItem::new(t.as_ref())).collect();
        self.items = self.defaults.clone();
        self
    }

    /// Limit the available modes, as a build without add-on components would.
    pub fn with_supported_modes(mut self, modes: &[InteractionMode]) -> Self {
        self.supported_modes = Some(modes.to_vec());
        self
    }

    /// Drop every licensed mode.
    pub fn without_licensed_modes(self) -> Self {
        let modes: Vec<InteractionMode> = MODE_BINDINGS
            .iter()
            .map(|b| b.mode)
            .filter(|m| !m.is_licensed())
            .collect();
        self.with_supported_modes(&modes)
    }

    /// Emulate an SDK build without high-contrast themes.
    pub fn without_high_contrast(mut self) -> Self {
        self.high_contrast = false;
        self
    }

    /// Number of toolbar writes so far.
    pub fn toolbar_writes(&self) -> usize {
        self.toolbar_writes
    }

    /// Types of the toolbar items currently marked selected.
    pub fn selected_types(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| i.selected)
            .map(|i| i.item_type.clone())
            .collect()
    }
}

impl Viewer for InMemoryViewer {
    fn toolbar_items(&self) -> Vec<ToolbarItem> {
        self.items.clone()
    }

    fn set_toolbar_items(&mut self, items: Vec<ToolbarItem>) {
        self.items = items;
        self.toolbar_writes += 1;
    }

    fn default_toolbar_items(&self) -> Vec<ToolbarItem> {
        self.defaults.clone()
    }

    fn interaction_mode(&self) -> Option<InteractionMode> {
        self.mode
    }

    fn set_interaction_mode(&mut self, mode: Option<InteractionMode>) {
        self.mode = mode;
    }

    fn keep_selected_tool(&self) -> bool {
        self.keep_selected_tool
    }

    fn set_keep_selected_tool(&mut self, keep: bool) {
        self.keep_selected_tool = keep;
    }

    fn supports_mode(&self, mode: InteractionMode) -> bool {
        self.supported_modes
            .as_ref()
            .map_or(true, |modes| modes.contains(&mode))
    }

    fn theme(&self) -> Theme {
        self.theme
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn supports_theme(&self, theme: Theme) -> bool {
        self.high_contrast || theme.fallback() == theme
    }
}
