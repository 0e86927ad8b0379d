//! Widget resources and the `_meta` that binds tools to them.
//!
//! Two HTML widgets are served as `text/html+skybridge` resources:
//! the primary upload viewer (built in, with the intent consumer) and a
//! basic demo viewer whose page comes from the app's own origin.

use crate::config::{Config, CDN_ORIGIN};
use crate::error::Result;
use crate::viewer::MODE_BINDINGS;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{info, warn};

/// MIME type the host expects for widget templates.
pub const WIDGET_MIME_TYPE: &str = "text/html+skybridge";

/// Public sample document opened by the demo viewer.
pub const DEMO_DOCUMENT_URL: &str = "https://www.nutrient.io/downloads/nutrient-web-demo.pdf";

pub const UPLOAD_WIDGET_URI: &str = "ui://widget/pdf-upload-viewer.html";
pub const DEMO_WIDGET_URI: &str = "ui://widget/demo-viewer.html";

const UPLOAD_TEMPLATE: &str = include_str!("../assets/pdf-upload-viewer.html");
const DEMO_TEMPLATE: &str = include_str!("../assets/demo-viewer.html");

/// Domains a widget frame may reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetCsp {
    pub connect_domains: Vec<String>,
    pub resource_domains: Vec<String>,
}

impl WidgetCsp {
    /// The SDK CDN, fonts, the app origin, and `blob:` for uploaded files.
    pub fn for_viewer(config: &Config) -> Self {
        let domains: Vec<String> = [
            CDN_ORIGIN.to_string(),
            "https://*.pspdfkit.com".to_string(),
            "https://fonts.googleapis.com".to_string(),
            "https://fonts.gstatic.com".to_string(),
            config.origin(),
            "blob:".to_string(),
        ]
        .into();
        Self {
            connect_domains: domains.clone(),
            resource_domains: domains,
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "connect_domains": self.connect_domains,
            "resource_domains": self.resource_domains,
        })
    }
}

/// An HTML widget and the tool-invocation copy shown while it opens.
#[derive(Debug, Clone)]
pub struct Widget {
    pub id: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub template_uri: &'static str,
    pub invoking: &'static str,
    pub invoked: &'static str,
    pub description: &'static str,
    pub widget_domain: String,
    pub prefers_border: bool,
    pub csp: Option<WidgetCsp>,
    pub html: String,
}

impl Widget {
    /// `_meta` attached to tool definitions and tool results.
    pub fn tool_meta(&self) -> Value {
        json!({
            "openai/outputTemplate": self.template_uri,
            "openai/toolInvocation/invoking": self.invoking,
            "openai/toolInvocation/invoked": self.invoked,
            "openai/widgetAccessible": true,
            "openai/resultCanProduceWidget": true,
        })
    }

    /// `_meta` attached to the resource and its contents.
    pub fn resource_meta(&self) -> Value {
        let mut meta = Map::new();
        meta.insert("openai/widgetDescription".into(), json!(self.description));
        meta.insert("openai/widgetPrefersBorder".into(), json!(self.prefers_border));
        meta.insert("openai/widgetDomain".into(), json!(self.widget_domain));
        if let Some(csp) = &self.csp {
            meta.insert("openai/widgetCSP".into(), csp.to_json());
        }
        Value::Object(meta)
    }

    /// Entry for `resources/list`.
    pub fn descriptor(&self) -> Value {
        json!({
            "uri": self.template_uri,
            "name": self.name,
            "title": self.title,
            "description": self.description,
            "mimeType": WIDGET_MIME_TYPE,
            "_meta": self.resource_meta(),
        })
    }

    /// Result body for `resources/read`.
    pub fn contents(&self) -> Value {
        json!({
            "contents": [{
                "uri": self.template_uri,
                "mimeType": WIDGET_MIME_TYPE,
                "text": self.html,
                "_meta": self.resource_meta(),
            }]
        })
    }
}

/// Every widget the server exposes.
#[derive(Debug, Clone)]
pub struct WidgetSet {
    pub upload: Widget,
    pub demo: Widget,
}

impl WidgetSet {
    /// Build the widget set with the given demo page HTML.
    pub fn new(config: &Config, demo_html: String) -> Self {
        let upload = Widget {
            id: "upload_pdf_viewer",
            name: "pdf-upload-widget",
            title: "PDF Upload & Viewer",
            template_uri: UPLOAD_WIDGET_URI,
            invoking: "Opening PDF viewer...",
            invoked: "PDF viewer ready",
            description: "Upload and view PDF documents with full annotation support",
            widget_domain: CDN_ORIGIN.to_string(),
            prefers_border: true,
            csp: Some(WidgetCsp::for_viewer(config)),
            html: render_upload_html(config),
        };
        let demo = Widget {
            id: "demo_viewer",
            name: "demo-viewer-widget",
            title: "Demo Viewer (Basic)",
            template_uri: DEMO_WIDGET_URI,
            invoking: "Opening demo viewer...",
            invoked: "Demo viewer opened",
            description: "Basic demo viewer - only use when user explicitly asks for demo. \
                          Use upload_pdf_viewer for full features.",
            widget_domain: config.origin(),
            prefers_border: false,
            csp: None,
            html: demo_html,
        };
        Self { upload, demo }
    }

    /// Build the widget set, fetching the demo page from the app's origin.
    /// A failed fetch falls back to the built-in demo page.
    pub async fn load(config: &Config) -> Self {
        let demo_html = match fetch_app_html(config).await {
            Ok(html) => {
                info!(origin = %config.origin(), "fetched demo widget page");
                format!("<html>{}</html>", html)
            }
            Err(e) => {
                warn!(error = %e, "demo widget page unavailable, using built-in page");
                render_demo_html(config)
            }
        };
        Self::new(config, demo_html)
    }

    pub fn all(&self) -> [&Widget; 2] {
        [&self.demo, &self.upload]
    }

    /// Widget registered under `uri`.
    pub fn by_uri(&self, uri: &str) -> Option<&Widget> {
        self.all().into_iter().find(|w| w.template_uri == uri)
    }
}

/// Fetch the app's root page.
pub async fn fetch_app_html(config: &Config) -> Result<String> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let html = http
        .get(config.base_url.as_str())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(html)
}

/// The upload viewer page with SDK location, poll interval and mode table filled in.
pub fn render_upload_html(config: &Config) -> String {
    UPLOAD_TEMPLATE
        .replace("{{SDK_SCRIPT_URL}}", &config.sdk_script_url())
        .replace("{{SDK_BASE_URL}}", &config.sdk_base_url())
        .replace(
            "{{POLL_INTERVAL_MS}}",
            &config.poll_interval().as_millis().to_string(),
        )
        .replace("{{MODE_BINDINGS_JSON}}", &mode_bindings_json().to_string())
}

/// The built-in demo page.
pub fn render_demo_html(config: &Config) -> String {
    DEMO_TEMPLATE
        .replace("{{SDK_SCRIPT_URL}}", &config.sdk_script_url())
        .replace("{{SDK_BASE_URL}}", &config.sdk_base_url())
        .replace("{{DEMO_DOCUMENT_URL}}", DEMO_DOCUMENT_URL)
}

/// `{ toolKey: { mode, toolbarTypes } }` as read by the widget script.
fn mode_bindings_json() -> Value {
    let map: Map<String, Value> = MODE_BINDINGS
        .iter()
        .map(|b| {
            (
                b.key.to_string(),
                json!({ "mode": b.mode.sdk_name(), "toolbarTypes": b.toolbar_types }),
            )
        })
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widgets() -> WidgetSet {
        let config = Config::default()
            .with_base_url("https://viewer.example.com")
            .unwrap();
        WidgetSet::new(&config, "<html></html>".into())
    }

    #[test]
    fn test_tool_meta_binds_template() {
        let meta = widgets().upload.tool_meta();
        assert_eq!(meta["openai/outputTemplate"], UPLOAD_WIDGET_URI);
        assert_eq!(meta["openai/widgetAccessible"], true);
        assert_eq!(meta["openai/resultCanProduceWidget"], true);
    }

    #[test]
    fn test_upload_resource_meta_has_csp() {
        let meta = widgets().upload.resource_meta();
        assert_eq!(meta["openai/widgetPrefersBorder"], true);
        assert_eq!(meta["openai/widgetDomain"], CDN_ORIGIN);
        let connect = meta["openai/widgetCSP"]["connect_domains"].as_array().unwrap();
        assert!(connect.contains(&json!("https://viewer.example.com")));
        assert!(connect.contains(&json!("blob:")));
    }

    #[test]
    fn test_demo_resource_meta() {
        let meta = widgets().demo.resource_meta();
        assert_eq!(meta["openai/widgetPrefersBorder"], false);
        assert_eq!(meta["openai/widgetDomain"], "https://viewer.example.com");
        assert!(meta.get("openai/widgetCSP").is_none());
    }

    #[test]
    fn test_by_uri() {
        let set = widgets();
        assert_eq!(set.by_uri(DEMO_WIDGET_URI).map(|w| w.id), Some("demo_viewer"));
        assert!(set.by_uri("ui://widget/missing.html").is_none());
    }

    #[test]
    fn test_upload_html_is_fully_rendered() {
        let html = render_upload_html(&Config::default());
        assert!(!html.contains("{{"));
        assert!(html.contains("pspdfkit-web@2024.7.0/pspdfkit.js"));
        assert!(html.contains("const POLL_INTERVAL_MS = 250;"));
        assert!(html.contains(r#""inkEraser":{"mode":"INK_ERASER""#));
    }

    #[test]
    fn test_upload_html_exposes_console_helpers() {
        let html = render_upload_html(&Config::default());
        for helper in [
            "window.removeToolbarItemsByType",
            "window.setToolbarToOnlyTypes",
            "window.addToolbarItemsByType",
            "window.resetToolbarToDefaults",
            "window.getToolbarItems",
        ] {
            assert!(html.contains(helper), "missing {helper}");
        }
    }

    #[test]
    fn test_csp_lists_origin_not_path() {
        let config = Config::default()
            .with_base_url("https://viewer.example.com/app/")
            .unwrap();
        let csp = WidgetCsp::for_viewer(&config);
        assert!(csp.connect_domains.contains(&"https://viewer.example.com".to_string()));
        assert!(!csp.connect_domains.iter().any(|d| d.contains("/app")));
    }

    #[test]
    fn test_demo_html_fallback() {
        let html = render_demo_html(&Config::default());
        assert!(!html.contains("{{"));
        assert!(html.contains(DEMO_DOCUMENT_URL));
    }

    #[tokio::test]
    async fn test_load_falls_back_when_origin_unreachable() {
        let config = Config::default().with_base_url("http://127.0.0.1:9").unwrap();
        let set = WidgetSet::load(&config).await;
        assert!(set.demo.html.contains(DEMO_DOCUMENT_URL));
    }
}
