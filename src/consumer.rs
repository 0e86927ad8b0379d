//! Widget-side intent consumer.
//!
//! A [`WidgetSession`] owns everything one embedded viewer needs: the live
//! viewer instance (if a document is loaded), the theme, the last-seen
//! serialization of each polled field, and the current on-screen notice.
//! Two watchers sample the host channel on independent timers and apply a
//! payload only when its serialization differs from the previous sample.
//!
//! Unknown identifiers are dropped, never raised. A payload that arrives with
//! no viewer loaded is dropped too; the next document load re-applies
//! whatever the channel holds at that moment.

use crate::aliases::NO_TOOL;
use crate::channel::{ToolOutputSampler, SELECT_TOOL_FIELD, TOOLBAR_FIELD};
use crate::error::{Result, ViewerError};
use crate::types::{
    Notice, NoticeKind, SelectToolIntent, Theme, ToolbarAction, ToolbarIntent, ToolbarItem,
};
use crate::viewer::{mode_binding, InteractionMode, Viewer};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Change detector for one polled field.
#[derive(Debug, Clone)]
pub struct PayloadWatch {
    field: &'static str,
    last_seen: Option<String>,
}

impl PayloadWatch {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            last_seen: None,
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Record `current` as seen and hand it back for the initial apply.
    pub fn start(&mut self, current: Value) -> Value {
        self.last_seen = Some(current.to_string());
        current
    }

    /// Return `current` if it differs from the last value seen.
    pub fn poll(&mut self, current: Value) -> Option<Value> {
        let key = current.to_string();
        if self.last_seen.as_deref() == Some(key.as_str()) {
            return None;
        }
        self.last_seen = Some(key);
        Some(current)
    }
}

/// Read a toolbar payload. `None` for `null` or an unknown action; a
/// non-array `tools` reads as empty and non-string entries are skipped.
pub fn toolbar_intent_from_value(payload: &Value) -> Option<ToolbarIntent> {
    let action = payload
        .get("action")
        .and_then(Value::as_str)
        .and_then(ToolbarAction::from_str_loose)?;
    let tools = payload
        .get("tools")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Some(ToolbarIntent { action, tools })
}

/// Read a tool-selection payload. A missing `toolKey` clears the tool; only
/// a literal `false` turns `keepSelectedTool` off.
pub fn select_tool_intent_from_value(payload: &Value) -> Option<SelectToolIntent> {
    if !payload.is_object() {
        return None;
    }
    let tool_key = payload
        .get("toolKey")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .unwrap_or(NO_TOOL)
        .to_string();
    let keep_selected_tool = payload.get("keepSelectedTool").and_then(Value::as_bool) != Some(false);
    Some(SelectToolIntent {
        tool_key,
        keep_selected_tool,
    })
}

/// Find a toolbar intent in a tool result, whichever shape the host used:
/// `structuredContent.toolbar`, a `structuredContent` or top-level object
/// tagged `kind: "NUTRIENT_TOOLBAR"`, or any of these under `data`.
pub fn extract_toolbar_payload(tool_result: &Value) -> Option<ToolbarIntent> {
    const KIND: &str = "NUTRIENT_TOOLBAR";
    let is_tagged = |v: &Value| v.get("kind").and_then(Value::as_str) == Some(KIND);

    let structured = tool_result
        .get("structuredContent")
        .or_else(|| tool_result.pointer("/data/structuredContent"));

    if let Some(sc) = structured {
        if let Some(toolbar) = sc.get(TOOLBAR_FIELD) {
            return toolbar_intent_from_value(toolbar);
        }
        if is_tagged(sc) {
            return toolbar_intent_from_value(sc);
        }
    }
    if is_tagged(tool_result) {
        return toolbar_intent_from_value(tool_result);
    }
    None
}

/// Apply a toolbar intent. Returns the notice to show, if any.
pub fn apply_toolbar_intent<V: Viewer>(viewer: &mut V, intent: &ToolbarIntent) -> Option<Notice> {
    let tools = &intent.tools;
    match intent.action {
        ToolbarAction::Reset => {
            let defaults = viewer.default_toolbar_items();
            viewer.set_toolbar_items(defaults);
            Some(Notice::info("Toolbar reset"))
        }
        ToolbarAction::KeepOnly => {
            viewer.update_toolbar_items(|items| {
                items
                    .into_iter()
                    .filter(|i| tools.contains(&i.item_type))
                    .collect()
            });
            Some(Notice::info("Toolbar updated"))
        }
        ToolbarAction::Remove => {
            viewer.update_toolbar_items(|items| {
                items
                    .into_iter()
                    .filter(|i| !tools.contains(&i.item_type))
                    .collect()
            });
            Some(Notice::info("Toolbar updated"))
        }
        ToolbarAction::Add => {
            viewer.update_toolbar_items(|mut items| {
                let existing: Vec<String> = items.iter().map(|i| i.item_type.clone()).collect();
                // Dedup is against the live toolbar only; repeats inside
                // `tools` are appended as given.
                items.extend(
                    tools
                        .iter()
                        .filter(|t| !existing.contains(t))
                        .map(ToolbarItem::new),
                );
                items
            });
            Some(Notice::info("Toolbar updated"))
        }
        ToolbarAction::Get => None,
    }
}

/// What applying a selection intent did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Interaction mode cleared and all toolbar items deselected.
    Cleared,
    /// Mode activated.
    Activated(InteractionMode),
    /// No mode is bound to the key.
    UnknownKey,
    /// The mode exists but this build or license lacks it.
    Unavailable(InteractionMode),
}

/// Apply a tool-selection intent.
///
/// `keepSelectedTool` is always written first, even when the key is then
/// dropped as unknown or unavailable.
pub fn apply_select_tool<V: Viewer>(viewer: &mut V, intent: &SelectToolIntent) -> SelectOutcome {
    viewer.set_keep_selected_tool(intent.keep_selected_tool);

    if intent.is_clear() {
        viewer.set_interaction_mode(None);
        viewer.update_toolbar_items(|items| {
            items
                .into_iter()
                .map(|i| ToolbarItem { selected: false, ..i })
                .collect()
        });
        return SelectOutcome::Cleared;
    }

    let Some(binding) = mode_binding(&intent.tool_key) else {
        warn!(tool_key = %intent.tool_key, "select_tool: unknown tool key");
        return SelectOutcome::UnknownKey;
    };

    if !viewer.supports_mode(binding.mode) {
        warn!(
            tool_key = %intent.tool_key,
            mode = %binding.mode,
            "select_tool: interaction mode not available"
        );
        return SelectOutcome::Unavailable(binding.mode);
    }

    viewer.set_interaction_mode(Some(binding.mode));

    let types = binding.toolbar_types;
    if !types.is_empty() {
        viewer.update_toolbar_items(|items| {
            items
                .into_iter()
                .map(|i| {
                    let selected = types.iter().any(|t| *t == i.item_type);
                    ToolbarItem { selected, ..i }
                })
                .collect()
        });
    }
    SelectOutcome::Activated(binding.mode)
}

/// State of one embedded viewer widget.
#[derive(Debug)]
pub struct WidgetSession<V> {
    viewer: Option<V>,
    theme: Theme,
    document: Option<String>,
    sampler: ToolOutputSampler,
    toolbar_watch: PayloadWatch,
    select_watch: PayloadWatch,
    notice: Option<Notice>,
    upload_visible: bool,
}

impl<V: Viewer> WidgetSession<V> {
    /// A session with no document loaded, reading tool output from `sampler`.
    pub fn new(sampler: ToolOutputSampler) -> Self {
        Self {
            viewer: None,
            theme: Theme::default(),
            document: None,
            sampler,
            toolbar_watch: PayloadWatch::new(TOOLBAR_FIELD),
            select_watch: PayloadWatch::new(SELECT_TOOL_FIELD),
            notice: None,
            upload_visible: true,
        }
    }

    pub fn viewer(&self) -> Option<&V> {
        self.viewer.as_ref()
    }

    pub fn viewer_mut(&mut self) -> Option<&mut V> {
        self.viewer.as_mut()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Name of the loaded (or last attempted) document.
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// The most recent message shown to the user.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Whether the upload prompt is showing instead of the viewer.
    pub fn is_upload_visible(&self) -> bool {
        self.upload_visible
    }

    pub fn sampler(&self) -> &ToolOutputSampler {
        &self.sampler
    }

    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => info!(text = %notice.text, "widget notice"),
            NoticeKind::Error => error!(text = %notice.text, "widget notice"),
        }
        self.notice = Some(notice);
    }

    /// Load a document. Any previous instance is unloaded first.
    ///
    /// On failure no instance remains, an error notice is shown, and the
    /// upload prompt comes back.
    pub fn load_document<F>(&mut self, name: &str, open: F) -> Result<()>
    where
        F: FnOnce() -> Result<V>,
    {
        if name.trim().is_empty() {
            self.notify(Notice::error("No file selected."));
            return Err(ViewerError::Load {
                name: String::new(),
                message: "no file selected".into(),
            });
        }

        self.document = Some(name.to_string());
        self.viewer = None;

        match open() {
            Ok(viewer) => {
                self.install(viewer);
                self.upload_visible = false;
                self.notify(Notice::info(format!("Loaded: {}", name)));
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.upload_visible = true;
                self.notify(Notice::error(format!(
                    "Failed to load {}. Error: {}",
                    name, message
                )));
                Err(ViewerError::Load {
                    name: name.to_string(),
                    message,
                })
            }
        }
    }

    /// Change theme. With no document loaded the choice is only recorded;
    /// otherwise the document is reopened under the new theme. A failed
    /// reopen leaves no instance and brings the upload prompt back.
    pub fn set_theme<F>(&mut self, theme: Theme, reopen: F) -> Result<()>
    where
        F: FnOnce(&str) -> Result<V>,
    {
        let Some(document) = self.document.clone() else {
            self.theme = theme;
            self.notify(Notice::info(format!(
                "Theme set to {}. Load a document to see it.",
                theme.label()
            )));
            return Ok(());
        };

        self.viewer = None;
        match reopen(&document) {
            Ok(viewer) => {
                self.theme = theme;
                self.install(viewer);
                self.notify(Notice::info(format!("Theme: {}", theme.label())));
                Ok(())
            }
            Err(e) => {
                self.upload_visible = true;
                self.notify(Notice::error(format!("Failed to apply theme: {}", e)));
                Err(e)
            }
        }
    }

    fn install(&mut self, mut viewer: V) {
        let theme = if viewer.supports_theme(self.theme) {
            self.theme
        } else {
            self.theme.fallback()
        };
        viewer.set_theme(theme);
        self.viewer = Some(viewer);
        self.start_watching();
    }

    /// Reset both watchers to the current channel values and apply them.
    pub fn start_watching(&mut self) {
        let toolbar = self.toolbar_watch.start(self.sampler.sample(TOOLBAR_FIELD));
        self.apply_toolbar_payload(&toolbar);
        let select = self.select_watch.start(self.sampler.sample(SELECT_TOOL_FIELD));
        self.apply_select_payload(&select);
    }

    /// One tick of the toolbar watcher.
    pub fn poll_toolbar(&mut self) {
        if let Some(next) = self.toolbar_watch.poll(self.sampler.sample(TOOLBAR_FIELD)) {
            debug!(payload = %next, "toolbar payload changed");
            self.apply_toolbar_payload(&next);
        }
    }

    /// One tick of the tool-selection watcher.
    pub fn poll_select_tool(&mut self) {
        if let Some(next) = self.select_watch.poll(self.sampler.sample(SELECT_TOOL_FIELD)) {
            debug!(payload = %next, "selectTool payload changed");
            self.apply_select_payload(&next);
        }
    }

    fn apply_toolbar_payload(&mut self, payload: &Value) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        let Some(intent) = toolbar_intent_from_value(payload) else {
            return;
        };
        if let Some(notice) = apply_toolbar_intent(viewer, &intent) {
            self.notify(notice);
        }
    }

    fn apply_select_payload(&mut self, payload: &Value) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if let Some(intent) = select_tool_intent_from_value(payload) {
            apply_select_tool(viewer, &intent);
        }
    }

    fn loaded_viewer(&mut self) -> Result<&mut V> {
        self.viewer
            .as_mut()
            .ok_or_else(|| ViewerError::NotReady("No document loaded".into()))
    }

    /// Remove every item whose type is in `types`.
    pub fn remove_toolbar_items<S: AsRef<str>>(&mut self, types: &[S]) -> Result<Vec<String>> {
        let viewer = self.loaded_viewer()?;
        viewer.update_toolbar_items(|items| {
            items
                .into_iter()
                .filter(|i| !types.iter().any(|t| t.as_ref() == i.item_type))
                .collect()
        });
        let current = viewer.toolbar_item_types();
        self.notify(Notice::info("Toolbar updated"));
        Ok(current)
    }

    /// Keep only items whose type is in `types`.
    pub fn keep_only_toolbar_items<S: AsRef<str>>(&mut self, types: &[S]) -> Result<Vec<String>> {
        let viewer = self.loaded_viewer()?;
        viewer.update_toolbar_items(|items| {
            items
                .into_iter()
                .filter(|i| types.iter().any(|t| t.as_ref() == i.item_type))
                .collect()
        });
        let current = viewer.toolbar_item_types();
        self.notify(Notice::info("Toolbar updated"));
        Ok(current)
    }

    /// Add missing `types`, appended or inserted at `index` when it is in range.
    pub fn add_toolbar_items<S: AsRef<str>>(
        &mut self,
        types: &[S],
        index: Option<usize>,
    ) -> Result<Vec<String>> {
        let viewer = self.loaded_viewer()?;
        viewer.update_toolbar_items(|mut items| {
            let new_items: Vec<ToolbarItem> = types
                .iter()
                .map(AsRef::as_ref)
                .filter(|t| !items.iter().any(|i| i.item_type == *t))
                .map(ToolbarItem::new)
                .collect();
            match index {
                Some(at) if at <= items.len() => {
                    items.splice(at..at, new_items);
                }
                _ => items.extend(new_items),
            }
            items
        });
        let current = viewer.toolbar_item_types();
        self.notify(Notice::info("Toolbar updated"));
        Ok(current)
    }

    /// Restore the SDK's default toolbar.
    pub fn reset_toolbar(&mut self) -> Result<Vec<String>> {
        let viewer = self
            .viewer
            .as_mut()
            .ok_or_else(|| ViewerError::NotReady("Viewer not ready".into()))?;
        let defaults = viewer.default_toolbar_items();
        viewer.set_toolbar_items(defaults);
        let current = viewer.toolbar_item_types();
        self.notify(Notice::info("Toolbar reset to defaults"));
        Ok(current)
    }

    /// Current toolbar item types; empty with no document loaded.
    pub fn toolbar_item_types(&self) -> Vec<String> {
        self.viewer
            .as_ref()
            .map(Viewer::toolbar_item_types)
            .unwrap_or_default()
    }
}

/// Drive both watchers until the host side of the channel is dropped, then
/// hand the session back.
///
/// The watchers run on two independent timers in one task, so they never
/// interleave within a tick and need no lock. Each applies its current value
/// immediately, before the first interval elapses.
pub async fn run_poll_loops<V: Viewer>(mut session: WidgetSession<V>, period: Duration) -> WidgetSession<V> {
    session.start_watching();

    let first = Instant::now() + period;
    let mut toolbar_tick = interval_at(first, period);
    let mut select_tick = interval_at(first, period);
    toolbar_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    select_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !session.sampler.is_closed() {
        tokio::select! {
            _ = toolbar_tick.tick() => session.poll_toolbar(),
            _ = select_tick.tick() => session.poll_select_tool(),
        }
    }
    debug!("tool output channel closed, poll loops stopped");
    session
}
