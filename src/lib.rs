//! # nutrient-mcp
//!
//! An MCP server that puts the Nutrient (PSPDFKit) web viewer inside a chat
//! host as an Apps SDK widget, and lets the assistant reshape it.
//!
//! Provides:
//! - **Tools**: `upload_pdf_viewer`, `demo_viewer`, `customize_toolbar`, `select_tool`
//! - **Resources**: the two widget pages, served as `text/html+skybridge`
//! - **Consumer**: the widget-side poll-and-apply loop, runnable against any [`Viewer`]
//! - **CLI**: `nutrient-mcp` binary (`nutrient-mcp serve` for stdio MCP)
//!
//! ## Intents
//!
//! Tools never touch the viewer. They return an intent that the host injects
//! into the widget as `toolOutput`; the widget polls for it and applies it.
//!
//! ```
//! use nutrient_mcp::intent::{emit_select_tool_intent, emit_toolbar_intent};
//! use nutrient_mcp::ToolbarAction;
//!
//! let toolbar = emit_toolbar_intent(ToolbarAction::Remove, &["download", "Print"]);
//! assert_eq!(toolbar.tools, vec!["export-pdf", "print"]);
//!
//! let select = emit_select_tool_intent("free text", None);
//! assert_eq!(select.tool_key, "text");
//! assert!(select.keep_selected_tool);
//! ```
//!
//! ## Replaying intents
//!
//! ```
//! use nutrient_mcp::channel::tool_output_channel;
//! use nutrient_mcp::{InMemoryViewer, WidgetSession};
//! use serde_json::json;
//!
//! let (host, widget) = tool_output_channel();
//! let mut session = WidgetSession::new(widget);
//! session
//!     .load_document("report.pdf", || Ok(InMemoryViewer::new().with_toolbar(&["pan", "ink"])))
//!     .unwrap();
//!
//! host.publish(json!({ "toolbar": { "action": "remove", "tools": ["ink"] } }));
//! session.poll_toolbar();
//! assert_eq!(session.toolbar_item_types(), vec!["pan"]);
//! ```

pub mod aliases;
pub mod channel;
pub mod config;
pub mod consumer;
pub mod error;
pub mod intent;
pub mod types;
pub mod viewer;
pub mod widgets;

pub mod mcp;

// Re-export key types at the crate root.
pub use config::Config;
pub use consumer::{run_poll_loops, WidgetSession};
pub use error::ViewerError;
pub use types::*;
pub use viewer::{InMemoryViewer, InteractionMode, Viewer};
pub use widgets::WidgetSet;
