//! The host's `toolOutput` channel, modeled as a sampled value.
//!
//! The chat host exposes only the most recent tool output. The widget reads
//! it on a timer; anything published between two reads is overwritten and
//! never seen. This is a `watch` channel read with `borrow()`, never awaited
//! for notifications, so the lost-update behavior is preserved.

use serde_json::Value;
use tokio::sync::watch;

/// Field the widget polls for toolbar intents.
pub const TOOLBAR_FIELD: &str = "toolbar";

/// Field the widget polls for tool-selection intents.
pub const SELECT_TOOL_FIELD: &str = "selectTool";

/// Host side: replaces the current tool output.
#[derive(Debug)]
pub struct ToolOutputPublisher {
    tx: watch::Sender<Value>,
}

/// Widget side: reads the current tool output.
#[derive(Debug, Clone)]
pub struct ToolOutputSampler {
    rx: watch::Receiver<Value>,
}

/// Create a channel whose initial tool output is `null`.
pub fn tool_output_channel() -> (ToolOutputPublisher, ToolOutputSampler) {
    let (tx, rx) = watch::channel(Value::Null);
    (ToolOutputPublisher { tx }, ToolOutputSampler { rx })
}

impl ToolOutputPublisher {
    /// Replace the tool output (the `structuredContent` of the latest call).
    pub fn publish(&self, output: Value) {
        self.tx.send_replace(output);
    }

    /// Clear the tool output.
    pub fn clear(&self) {
        self.tx.send_replace(Value::Null);
    }
}

impl ToolOutputSampler {
    /// Current value of `field`, or `null` when absent.
    pub fn sample(&self, field: &str) -> Value {
        self.rx.borrow().get(field).cloned().unwrap_or(Value::Null)
    }

    /// The whole current tool output.
    pub fn snapshot(&self) -> Value {
        self.rx.borrow().clone()
    }

    /// Whether the host side has gone away.
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sample_missing_field_is_null() {
        let (_tx, rx) = tool_output_channel();
        assert_eq!(rx.sample(TOOLBAR_FIELD), Value::Null);
    }

    #[test]
    fn test_last_value_wins() {
        let (tx, rx) = tool_output_channel();
        tx.publish(json!({"toolbar": {"action": "add", "tools": ["ink"]}}));
        tx.publish(json!({"toolbar": {"action": "reset", "tools": []}}));
        assert_eq!(rx.sample(TOOLBAR_FIELD)["action"], "reset");
        assert_eq!(rx.sample(SELECT_TOOL_FIELD), Value::Null);
    }

    #[test]
    fn test_clear_and_close() {
        let (tx, rx) = tool_output_channel();
        tx.publish(json!({"selectTool": {"toolKey": "pan"}}));
        tx.clear();
        assert_eq!(rx.snapshot(), Value::Null);
        assert!(!rx.is_closed());
        drop(tx);
        assert!(rx.is_closed());
    }
}
