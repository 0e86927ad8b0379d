//! Error types for the Nutrient MCP server.

/// Errors that can occur while serving tools, resources, or driving a widget session.
///
/// Unrecognized toolbar items and tool keys are deliberately absent here:
/// they pass through normalization unchanged and are dropped by the consumer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// HTTP request failed (fetching the app's widget HTML).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Tool arguments failed schema validation.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No tool is registered under this name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// No resource is registered under this URI.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// No viewer instance is loaded yet.
    #[error("Viewer not ready: {0}")]
    NotReady(String),

    /// The viewer failed to load a document.
    #[error("Failed to load {name}: {message}")]
    Load { name: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// stdio failure on the MCP transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for Results using [`ViewerError`].
pub type Result<T> = std::result::Result<T, ViewerError>;
