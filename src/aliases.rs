//! Natural-language alias tables for toolbar items and interaction modes.
//!
//! Two vocabularies exist and they are not interchangeable: toolbar items
//! name controls in the viewer chrome (`export-pdf`, `sidebar-thumbnails`),
//! while interaction modes name input-handling states (`pan`, `inkEraser`).
//! A toolbar item such as `export-pdf` has no interaction mode at all.
//!
//! Normalization never fails. Input is lowercased and trimmed, looked up,
//! and returned unchanged on a miss.
//!
//! ```
//! use nutrient_mcp::aliases::{normalize_toolbar_item, normalize_tool_key};
//!
//! assert_eq!(normalize_toolbar_item(" Download "), "export-pdf");
//! assert_eq!(normalize_tool_key("HAND"), "pan");
//! assert_eq!(normalize_toolbar_item("laser-pointer"), "laser-pointer");
//! ```

/// Free-form name -> toolbar item `type`.
///
/// Identity rows (`search`, `print`, ...) are listed so the table doubles as
/// the documented vocabulary.
pub const TOOLBAR_ALIASES: &[(&str, &str)] = &[
    ("thumbnail", "sidebar-thumbnails"),
    ("thumbnails", "sidebar-thumbnails"),
    ("download", "export-pdf"),
    ("export", "export-pdf"),
    ("save", "export-pdf"),
    ("search", "search"),
    ("find", "search"),
    ("crop", "document-crop"),
    ("print", "print"),
    ("signature", "signature"),
    ("sign", "signature"),
    ("highlight", "text-highlighter"),
    ("highlighter", "highlighter"),
    ("pen", "ink"),
    ("draw", "ink"),
    ("ink", "ink"),
    ("eraser", "ink-eraser"),
    ("zoom", "zoom-mode"),
    ("zoom-in", "zoom-in"),
    ("zoom-out", "zoom-out"),
    ("pan", "pan"),
    ("hand", "pan"),
    ("pager", "pager"),
    ("pages", "pager"),
    ("annotate", "annotate"),
    ("annotations", "sidebar-annotations"),
    ("outline", "sidebar-document-outline"),
    ("bookmarks", "sidebar-bookmarks"),
    ("note", "note"),
    ("text", "text"),
    ("image", "image"),
    ("stamp", "stamp"),
    ("line", "line"),
    ("arrow", "arrow"),
    ("rectangle", "rectangle"),
    ("ellipse", "ellipse"),
    ("circle", "ellipse"),
    ("polygon", "polygon"),
    ("editor", "document-editor"),
];

/// Free-form name -> interaction-mode key understood by the widget.
pub const TOOL_KEY_ALIASES: &[(&str, &str)] = &[
    // navigation
    ("hand", "pan"),
    ("move", "pan"),
    ("pan", "pan"),
    ("marquee zoom", "marqueeZoom"),
    ("marqueezoom", "marqueeZoom"),
    ("zoom", "marqueeZoom"),
    // annotation basics
    ("text", "text"),
    ("freetext", "text"),
    ("free text", "text"),
    ("note", "note"),
    ("comment", "note"),
    ("sticky", "note"),
    ("ink", "ink"),
    ("pen", "ink"),
    ("draw", "ink"),
    ("eraser", "inkEraser"),
    ("ink eraser", "inkEraser"),
    ("inkeraser", "inkEraser"),
    ("line", "line"),
    ("rectangle", "rectangle"),
    ("rect", "rectangle"),
    ("box", "rectangle"),
    ("ellipse", "ellipse"),
    ("circle", "ellipse"),
    ("polygon", "polygon"),
    ("polyline", "polyline"),
    // search
    ("search", "search"),
    ("find", "search"),
    // crop / editor
    ("crop", "documentCrop"),
    ("document crop", "documentCrop"),
    ("documentcrop", "documentCrop"),
    ("editor", "documentEditor"),
    ("document editor", "documentEditor"),
    ("documenteditor", "documentEditor"),
    // redaction
    ("redact", "redactText"),
    ("redact text", "redactText"),
    ("redacttext", "redactText"),
    ("redact rectangle", "redactRectangle"),
    ("redactrectangle", "redactRectangle"),
    // forms / measurement
    ("form", "formCreator"),
    ("form creator", "formCreator"),
    ("formcreator", "formCreator"),
    ("measure", "measurement"),
    ("measurement", "measurement"),
    // deactivate
    ("none", "none"),
    ("clear", "none"),
    ("reset", "none"),
];

/// The tool key that deactivates the current interaction mode.
pub const NO_TOOL: &str = "none";

fn lookup(table: &[(&str, &str)], raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    table
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(key)
}

/// Map a free-form name to a canonical toolbar item type.
pub fn normalize_toolbar_item(raw: &str) -> String {
    lookup(TOOLBAR_ALIASES, raw)
}

/// Map a free-form name to a canonical interaction-mode key (or `"none"`).
pub fn normalize_tool_key(raw: &str) -> String {
    lookup(TOOL_KEY_ALIASES, raw)
}

/// Whether `raw` (after lowercasing and trimming) is a known toolbar alias.
pub fn is_known_toolbar_alias(raw: &str) -> bool {
    let key = raw.trim().to_lowercase();
    TOOLBAR_ALIASES.iter().any(|(alias, _)| *alias == key)
}
