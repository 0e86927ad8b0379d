//! MCP (Model Context Protocol) server implementation.
//!
//! Implements the JSON-RPC 2.0 protocol over stdio, exposing the viewer
//! tools and widget resources to a chat host.

use crate::error::{Result, ViewerError};
use crate::intent::{
    emit_select_tool_intent, emit_toolbar_intent, select_tool_summary, timestamp, toolbar_summary,
};
use crate::types::{StructuredContent, TextContent, ToolResult, ToolbarAction};
use crate::widgets::{Widget, WidgetSet};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

const SUPPORTED_FORMATS: [&str; 5] = ["PDF", "Word", "Excel", "PowerPoint", "Images"];

/// Run the MCP server over stdin/stdout.
pub async fn run_server(widgets: WidgetSet) -> Result<()> {
    let server = McpServer::new(widgets);
    let stdin = io::stdin();
    let stdout = io::stdout();
    info!("MCP server listening on stdio");

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(request) => match server.handle_request(&request) {
                Some(response) => response,
                None => continue,
            },
            Err(e) => {
                warn!(error = %e, "unparseable request");
                error_response(&Value::Null, -32700, format!("Parse error: {}", e))
            }
        };

        let mut out = stdout.lock();
        writeln!(out, "{}", response)?;
        out.flush()?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

/// Request router. Holds the widget set the tools bind to.
#[derive(Debug, Clone)]
pub struct McpServer {
    widgets: WidgetSet,
}

impl McpServer {
    pub fn new(widgets: WidgetSet) -> Self {
        Self { widgets }
    }

    /// Handle one JSON-RPC message. Notifications produce no response.
    pub fn handle_request(&self, request: &Value) -> Option<Value> {
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = request["method"].as_str().unwrap_or("");
        debug!(method, "request");

        let response = match method {
            "initialize" => handle_initialize(&id),
            "ping" => ok_response(&id, json!({})),
            "tools/list" => ok_response(&id, json!({ "tools": self.tool_definitions() })),
            "tools/call" => self.handle_tool_call(&id, &request["params"]),
            "resources/list" => self.handle_resources_list(&id),
            "resources/templates/list" => ok_response(&id, json!({ "resourceTemplates": [] })),
            "resources/read" => self.handle_resource_read(&id, &request["params"]),
            m if m.starts_with("notifications/") => return None,
            _ => error_response(&id, -32601, format!("Method not found: {}", method)),
        };
        Some(response)
    }

    fn handle_resources_list(&self, id: &Value) -> Value {
        let resources: Vec<Value> = self.widgets.all().iter().map(|w| w.descriptor()).collect();
        ok_response(id, json!({ "resources": resources }))
    }

    fn handle_resource_read(&self, id: &Value, params: &Value) -> Value {
        let uri = params["uri"].as_str().unwrap_or("");
        match self.widgets.by_uri(uri) {
            Some(widget) => ok_response(id, widget.contents()),
            None => error_response(
                id,
                -32602,
                ViewerError::UnknownResource(uri.to_string()).to_string(),
            ),
        }
    }

    fn handle_tool_call(&self, id: &Value, params: &Value) -> Value {
        let tool_name = params["name"].as_str().unwrap_or("");
        let args = &params["arguments"];

        match self.call_tool(tool_name, args) {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => ok_response(id, value),
                Err(e) => error_response(id, -32603, format!("Internal error: {}", e)),
            },
            Err(ViewerError::InvalidArguments(msg)) => {
                warn!(tool = tool_name, %msg, "rejected tool arguments");
                error_response(id, -32602, format!("Invalid params: {}", msg))
            }
            Err(e) => ok_response(
                id,
                json!({
                    "content": [{ "type": "text", "text": format!("Error: {}", e) }],
                    "isError": true
                }),
            ),
        }
    }

    /// Dispatch a tool call by name.
    pub fn call_tool(&self, name: &str, args: &Value) -> Result<ToolResult> {
        let result = match name {
            "upload_pdf_viewer" => tool_upload_viewer(&self.widgets.upload, args)?,
            "demo_viewer" => tool_demo_viewer(&self.widgets.demo),
            "customize_toolbar" => tool_customize_toolbar(&self.widgets.upload, args)?,
            "select_tool" => tool_select_tool(&self.widgets.upload, args)?,
            _ => return Err(ViewerError::UnknownTool(name.to_string())),
        };
        info!(tool = name, "tool call handled");
        Ok(result)
    }

    fn tool_definitions(&self) -> Value {
        let upload = &self.widgets.upload;
        let demo = &self.widgets.demo;
        let actions: Vec<&str> = ToolbarAction::ALL.iter().map(|a| a.as_str()).collect();
        json!([
            {
                "name": upload.id,
                "title": upload.title,
                "description": "PRIMARY - Opens PDF viewer with upload capability. Use this by default for opening the app, viewing PDFs, or any document tasks. Supports PDF, Office documents (Word, Excel, PowerPoint), and images (PNG, JPG, TIFF).",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string", "description": "Optional message to display" }
                    }
                },
                "_meta": upload.tool_meta()
            },
            {
                "name": demo.id,
                "title": demo.title,
                "description": "Basic demo viewer - ONLY use when user explicitly asks for 'demo viewer' or 'demo view'. For all other requests use upload_pdf_viewer.",
                "inputSchema": { "type": "object", "properties": {} },
                "_meta": demo.tool_meta()
            },
            {
                "name": "customize_toolbar",
                "title": "Customize PDF Viewer Toolbar",
                "description": CUSTOMIZE_TOOLBAR_DESCRIPTION,
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "action": { "type": "string", "enum": actions, "description": "The action to perform" },
                        "tools": { "type": "array", "items": { "type": "string" }, "description": "Tool types to modify. Not needed for reset/get." }
                    },
                    "required": ["action"]
                },
                "_meta": upload.tool_meta()
            },
            {
                "name": "select_tool",
                "title": "Select tool in Nutrient viewer",
                "description": "Selects/activates a tool (interaction mode) in the Nutrient Web SDK viewer and keeps it selected.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "tool": { "type": "string", "description": "Tool key to select. Example: text, ink, rectangle, ellipse, pan, search, marqueeZoom, note, inkEraser, line, polygon, polyline, redactText, redactRectangle, documentCrop, documentEditor, formCreator, measurement, none" },
                        "keepSelectedTool": { "type": "boolean", "description": "Whether to keep the tool active after creating annotations." }
                    },
                    "required": ["tool"]
                },
                "_meta": upload.tool_meta()
            }
        ])
    }
}

fn handle_initialize(id: &Value) -> Value {
    ok_response(
        id,
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": "nutrient-mcp",
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

fn ok_response(id: &Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_response(id: &Value, code: i64, message: String) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

// --- Argument helpers ---

fn optional_str<'a>(args: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ViewerError::InvalidArguments(format!("'{}' must be a string", key))),
    }
}

fn optional_bool(args: &Value, key: &str) -> Result<Option<bool>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ViewerError::InvalidArguments(format!("'{}' must be a boolean", key))),
    }
}

fn optional_str_array<'a>(args: &'a Value, key: &str) -> Result<Vec<&'a str>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().ok_or_else(|| {
                    ViewerError::InvalidArguments(format!("'{}' must contain only strings", key))
                })
            })
            .collect(),
        Some(_) => Err(ViewerError::InvalidArguments(format!("'{}' must be an array", key))),
    }
}

// --- Tool implementations ---

fn tool_upload_viewer(widget: &Widget, args: &Value) -> Result<ToolResult> {
    let message = optional_str(args, "message")?.filter(|m| !m.is_empty()).unwrap_or(
        "PDF viewer is ready! You can now upload and view documents. \
         Click the upload button or drag and drop files.",
    );
    Ok(ToolResult {
        content: vec![TextContent::new(message)],
        structured_content: StructuredContent::ViewerStatus {
            viewer_ready: true,
            supported_formats: SUPPORTED_FORMATS.iter().map(|s| s.to_string()).collect(),
            timestamp: timestamp(),
        },
        meta: widget.tool_meta(),
    })
}

fn tool_demo_viewer(widget: &Widget) -> ToolResult {
    ToolResult {
        content: vec![TextContent::new(
            "Opening demo viewer. Note: For full features including theme switching, \
             use the PDF Upload Viewer instead.",
        )],
        structured_content: StructuredContent::Demo {
            action: "demo_viewer".to_string(),
            timestamp: timestamp(),
        },
        meta: widget.tool_meta(),
    }
}

fn tool_customize_toolbar(widget: &Widget, args: &Value) -> Result<ToolResult> {
    let action_str = optional_str(args, "action")?
        .ok_or_else(|| ViewerError::InvalidArguments("'action' parameter required".into()))?;
    let action = ToolbarAction::from_str_loose(action_str).ok_or_else(|| {
        ViewerError::InvalidArguments(format!(
            "'action' must be one of remove, keep_only, add, reset, get (got {})",
            action_str
        ))
    })?;
    let tools = optional_str_array(args, "tools")?;

    let intent = emit_toolbar_intent(action, &tools);
    Ok(ToolResult {
        content: vec![TextContent::new(toolbar_summary(&intent))],
        structured_content: StructuredContent::Toolbar {
            toolbar: intent,
            timestamp: timestamp(),
        },
        meta: widget.tool_meta(),
    })
}

fn tool_select_tool(widget: &Widget, args: &Value) -> Result<ToolResult> {
    let tool = optional_str(args, "tool")?
        .ok_or_else(|| ViewerError::InvalidArguments("'tool' parameter required".into()))?;
    let keep = optional_bool(args, "keepSelectedTool")?;

    let intent = emit_select_tool_intent(tool, keep);
    Ok(ToolResult {
        content: vec![TextContent::new(select_tool_summary(&intent))],
        structured_content: StructuredContent::SelectTool {
            select_tool: intent,
            timestamp: timestamp(),
        },
        meta: widget.tool_meta(),
    })
}

// --- Reference content ---

const CUSTOMIZE_TOOLBAR_DESCRIPTION: &str = r#"Customize the toolbar in the PDF viewer.

Actions:
- remove: Remove specific tools from toolbar
- keep_only: Keep ONLY specified tools, remove everything else
- add: Add tools to toolbar
- reset: Reset toolbar to defaults
- get: Get current toolbar items

Tool names (use exact names or aliases):
- sidebar-thumbnails (or: thumbnail, thumbnails)
- export-pdf (or: download, export, save)
- search (or: find)
- document-crop (or: crop)
- print
- signature (or: sign)
- zoom-in, zoom-out, zoom-mode
- annotate, ink, highlighter, text-highlighter
- note, text, line, arrow, rectangle, ellipse
- pager, pan, document-editor

Example: To keep only thumbnails and download, use action "keep_only" with tools ["sidebar-thumbnails", "export-pdf"]"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::widgets::{DEMO_WIDGET_URI, UPLOAD_WIDGET_URI};

    fn server() -> McpServer {
        McpServer::new(WidgetSet::new(&Config::default(), "<html>demo</html>".into()))
    }

    fn call(name: &str, arguments: Value) -> Value {
        server()
            .handle_request(&json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "tools/call",
                "params": { "name": name, "arguments": arguments }
            }))
            .unwrap()
    }

    #[test]
    fn test_initialize() {
        let resp = server()
            .handle_request(&json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}))
            .unwrap();
        assert_eq!(resp["result"]["serverInfo"]["name"], "nutrient-mcp");
        assert_eq!(resp["id"], 1);
    }

    #[test]
    fn test_notifications_have_no_response() {
        let resp = server()
            .handle_request(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}));
        assert!(resp.is_none());
    }

    #[test]
    fn test_unknown_method() {
        let resp = server()
            .handle_request(&json!({"jsonrpc": "2.0", "id": 2, "method": "prompts/list"}))
            .unwrap();
        assert_eq!(resp["error"]["code"], -32601);
    }

    #[test]
    fn test_tools_list_names() {
        let resp = server()
            .handle_request(&json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"}))
            .unwrap();
        let names: Vec<&str> = resp["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["upload_pdf_viewer", "demo_viewer", "customize_toolbar", "select_tool"]
        );
        assert_eq!(
            resp["result"]["tools"][2]["inputSchema"]["properties"]["action"]["enum"],
            json!(["remove", "keep_only", "add", "reset", "get"])
        );
    }

    #[test]
    fn test_customize_toolbar_result() {
        let resp = call(
            "customize_toolbar",
            json!({"action": "keep_only", "tools": ["thumbnail", "download"]}),
        );
        let result = &resp["result"];
        assert_eq!(
            result["structuredContent"]["toolbar"],
            json!({"action": "keep_only", "tools": ["sidebar-thumbnails", "export-pdf"]})
        );
        assert_eq!(
            result["content"][0]["text"],
            "Toolbar update: keep_only [sidebar-thumbnails, export-pdf]"
        );
        assert_eq!(result["_meta"]["openai/outputTemplate"], UPLOAD_WIDGET_URI);
        assert!(result["structuredContent"]["timestamp"].is_string());
    }

    #[test]
    fn test_customize_toolbar_reset_without_tools() {
        let resp = call("customize_toolbar", json!({"action": "reset"}));
        assert_eq!(
            resp["result"]["structuredContent"]["toolbar"],
            json!({"action": "reset", "tools": []})
        );
    }

    #[test]
    fn test_customize_toolbar_rejects_bad_action() {
        let resp = call("customize_toolbar", json!({"action": "shuffle"}));
        assert_eq!(resp["error"]["code"], -32602);
        let resp = call("customize_toolbar", json!({"action": "add", "tools": "ink"}));
        assert_eq!(resp["error"]["code"], -32602);
    }

    #[test]
    fn test_select_tool_result() {
        let resp = call("select_tool", json!({"tool": "HAND"}));
        assert_eq!(
            resp["result"]["structuredContent"]["selectTool"],
            json!({"toolKey": "pan", "keepSelectedTool": true})
        );
        assert_eq!(resp["result"]["content"][0]["text"], "Selecting tool: pan");

        let resp = call("select_tool", json!({"tool": "ink", "keepSelectedTool": false}));
        assert_eq!(
            resp["result"]["structuredContent"]["selectTool"],
            json!({"toolKey": "ink", "keepSelectedTool": false})
        );

        let resp = call("select_tool", json!({"tool": "clear"}));
        assert_eq!(resp["result"]["content"][0]["text"], "Clearing selected tool.");
    }

    #[test]
    fn test_select_tool_requires_tool() {
        let resp = call("select_tool", json!({}));
        assert_eq!(resp["error"]["code"], -32602);
    }

    #[test]
    fn test_upload_viewer_default_and_custom_message() {
        let resp = call("upload_pdf_viewer", json!({}));
        let sc = &resp["result"]["structuredContent"];
        assert_eq!(sc["viewerReady"], true);
        assert_eq!(sc["supportedFormats"][0], "PDF");
        assert!(resp["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("PDF viewer is ready!"));

        let resp = call("upload_pdf_viewer", json!({"message": "Here you go"}));
        assert_eq!(resp["result"]["content"][0]["text"], "Here you go");
    }

    #[test]
    fn test_demo_viewer_binds_demo_widget() {
        let resp = call("demo_viewer", Value::Null);
        assert_eq!(resp["result"]["structuredContent"]["action"], "demo_viewer");
        assert_eq!(resp["result"]["_meta"]["openai/outputTemplate"], DEMO_WIDGET_URI);
    }

    #[test]
    fn test_unknown_tool_is_error_result() {
        let resp = call("open_sdk", json!({}));
        assert_eq!(resp["result"]["isError"], true);
        assert_eq!(resp["result"]["content"][0]["text"], "Error: Unknown tool: open_sdk");
    }

    #[test]
    fn test_resources_list_and_read() {
        let srv = server();
        let resp = srv
            .handle_request(&json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"}))
            .unwrap();
        let resources = resp["result"]["resources"].as_array().unwrap();
        assert_eq!(resources.len(), 2);
        assert!(resources
            .iter()
            .all(|r| r["mimeType"] == "text/html+skybridge"));

        let resp = srv
            .handle_request(&json!({
                "jsonrpc": "2.0", "id": 5, "method": "resources/read",
                "params": { "uri": DEMO_WIDGET_URI }
            }))
            .unwrap();
        assert_eq!(resp["result"]["contents"][0]["text"], "<html>demo</html>");

        let resp = srv
            .handle_request(&json!({
                "jsonrpc": "2.0", "id": 6, "method": "resources/read",
                "params": { "uri": "ui://widget/nope.html" }
            }))
            .unwrap();
        assert_eq!(resp["error"]["code"], -32602);
    }
}
