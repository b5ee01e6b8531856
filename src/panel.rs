/// Settings popup logic, independent of how it is rendered
use log::{debug, warn};

use crate::config::{ERROR_MESSAGE_DURATION_MS, PANEL_PRESETS, SAVE_MESSAGE_DURATION_MS};
use crate::error::{PanelError, StoreError};
use crate::host::{MessageBus, Tabs};
use crate::messages::Message;
use crate::query_param::is_jobs_url;
use crate::settings::{FilterSeconds, Preset, ValidationError, presets};
use crate::storage::{SettingsStore, Store};

/// What the popup shows
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub saved_value: FilterSeconds,
    pub enabled: bool,
    pub presets: Vec<Preset>,
}

impl PanelView {
    pub fn new(saved_value: FilterSeconds, enabled: bool) -> Self {
        PanelView {
            saved_value,
            enabled,
            presets: presets(&PANEL_PRESETS),
        }
    }

    /// Preset matching the saved value, if any
    pub fn selected_preset(&self) -> Option<Preset> {
        self.presets.iter().copied().find(|p| p.value == self.saved_value)
    }

    pub fn status_text(&self) -> &'static str {
        if self.enabled {
            "Extension is enabled"
        } else {
            "Extension is disabled"
        }
    }

    pub fn status_class(&self) -> &'static str {
        if self.enabled {
            "status-indicator active"
        } else {
            "status-indicator inactive"
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.enabled { "Disable" } else { "Enable" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message shown for a fixed time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub duration_ms: u32,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            kind: NoticeKind::Success,
            duration_ms: SAVE_MESSAGE_DURATION_MS,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Notice {
            text: text.into(),
            kind: NoticeKind::Error,
            duration_ms: ERROR_MESSAGE_DURATION_MS,
        }
    }

    pub fn for_save(result: &Result<FilterSeconds, PanelError>) -> Self {
        match result {
            Ok(_) => Notice::success("Time filter saved successfully!"),
            Err(PanelError::Invalid(_)) => Notice::error("Please enter a valid positive number"),
            Err(PanelError::Store(_)) => Notice::error("Failed to save time value. Please try again."),
        }
    }

    pub fn for_toggle(result: &Result<bool, PanelError>) -> Self {
        match result {
            Ok(true) => Notice::success("Extension enabled successfully!"),
            Ok(false) => Notice::success("Extension disabled successfully!"),
            Err(_) => Notice::error("Failed to toggle extension. Please try again."),
        }
    }

    pub fn load_failed() -> Self {
        Notice::error("Failed to initialize extension. Please refresh.")
    }
}

/// A checked preset wins over the free-form input
pub fn choose_value(selected: Option<FilterSeconds>, custom_input: &str) -> Result<FilterSeconds, ValidationError> {
    match selected {
        Some(value) => Ok(value),
        None => custom_input.parse(),
    }
}

pub struct SettingsPanel<S, B, T> {
    settings: SettingsStore<S>,
    bus: B,
    tabs: T,
}

impl<S, B, T> SettingsPanel<S, B, T>
where
    S: Store,
    B: MessageBus,
    T: Tabs,
{
    pub fn new(settings: SettingsStore<S>, bus: B, tabs: T) -> Self {
        SettingsPanel { settings, bus, tabs }
    }

    /// Read-only: opening the popup never writes
    pub async fn open(&self) -> Result<PanelView, StoreError> {
        let settings = self.settings.load().await?;
        Ok(PanelView::new(settings.filter_seconds, settings.enabled))
    }

    /// Validate, persist, then tell the active job page. The page rewrites
    /// its own URL when it receives the update.
    pub async fn save(&self, selected: Option<FilterSeconds>, custom_input: &str) -> Result<FilterSeconds, PanelError> {
        let value = choose_value(selected, custom_input)?;
        self.settings.set_filter_seconds(value).await?;
        self.notify_active_page(value).await;
        Ok(value)
    }

    /// Flip the enabled flag; returns the new state
    pub async fn toggle(&self) -> Result<bool, PanelError> {
        let enabled = !self.settings.enabled().await?;
        self.settings.set_enabled(enabled).await?;

        if enabled {
            let value = self.settings.filter_seconds().await?;
            self.notify_active_page(value).await;
        }
        Ok(enabled)
    }

    /// Returns true when the update reached a page
    async fn notify_active_page(&self, value: FilterSeconds) -> bool {
        let tab = match self.tabs.active_tab().await {
            Ok(Some(tab)) => tab,
            Ok(None) => return false,
            Err(e) => {
                warn!("Could not look up the active tab: {}", e);
                return false;
            }
        };

        let (Some(id), Some(url)) = (tab.id, tab.url.as_deref()) else {
            return false;
        };
        if !is_jobs_url(url) {
            debug!("Active tab is not a job search page");
            return false;
        }

        match self.bus.send_to_tab(id, &Message::TimeValueUpdated { time_value: value }).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to notify content script: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{STORAGE_KEY_ENABLED, STORAGE_KEY_FILTER_SECONDS};
    use crate::testing::{FixedTabs, MemoryStore, RecordingBus};
    use futures::executor::block_on;
    use serde_json::{Value, json};
    use std::rc::Rc;

    const JOBS_URL: &str = "https://www.linkedin.com/jobs/search/?keywords=rust";

    type TestPanel = SettingsPanel<Rc<MemoryStore>, Rc<RecordingBus>, FixedTabs>;

    fn panel(entries: &[(&str, Value)], tabs: FixedTabs) -> (Rc<MemoryStore>, Rc<RecordingBus>, TestPanel) {
        let store = Rc::new(MemoryStore::with_entries(entries));
        let bus = Rc::new(RecordingBus::default());
        let panel = SettingsPanel::new(SettingsStore::new(store.clone()), bus.clone(), tabs);
        (store, bus, panel)
    }

    fn secs(n: u64) -> FilterSeconds {
        FilterSeconds::new(n).unwrap()
    }

    #[test]
    fn test_open_shows_default_without_writing() {
        let (store, _, panel) = panel(&[], FixedTabs(None));

        let view = block_on(panel.open()).unwrap();

        assert_eq!(view.saved_value.get(), 3600);
        assert!(view.enabled);
        assert_eq!(view.selected_preset().map(|p| p.label), Some("Last Hour"));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_open_shows_stored_state() {
        let (_, _, panel) = panel(
            &[
                (STORAGE_KEY_FILTER_SECONDS, json!("1800")),
                (STORAGE_KEY_ENABLED, json!(false)),
            ],
            FixedTabs(None),
        );

        let view = block_on(panel.open()).unwrap();

        assert_eq!(view.saved_value.get(), 1800);
        assert_eq!(view.selected_preset(), None);
        assert_eq!(view.status_text(), "Extension is disabled");
        assert_eq!(view.toggle_label(), "Enable");
        assert_eq!(view.status_class(), "status-indicator inactive");
    }

    #[test]
    fn test_save_round_trips() {
        let (_, _, panel) = panel(&[], FixedTabs(None));
        for n in [1u64, 90, 3600, 43200, 604800, 31_536_000] {
            let saved = block_on(panel.save(None, &n.to_string())).unwrap();
            assert_eq!(saved.get(), n);
            assert_eq!(block_on(panel.open()).unwrap().saved_value.get(), n);
        }
    }

    #[test]
    fn test_save_rejects_invalid_input() {
        let (store, bus, panel) = panel(
            &[(STORAGE_KEY_FILTER_SECONDS, json!("86400"))],
            FixedTabs::on(1, JOBS_URL),
        );

        for input in ["0", "-60", "", "abc", "1.5", "12abc"] {
            let result = block_on(panel.save(None, input));
            assert!(matches!(result, Err(PanelError::Invalid(_))), "input {input:?}");
            assert_eq!(Notice::for_save(&result).kind, NoticeKind::Error);
            assert_eq!(Notice::for_save(&result).duration_ms, 3000);
        }

        assert_eq!(store.writes(), 0);
        assert_eq!(store.raw(STORAGE_KEY_FILTER_SECONDS), Some(json!("86400")));
        assert!(bus.delivered().is_empty());
    }

    #[test]
    fn test_selected_preset_wins() {
        let (_, _, panel) = panel(&[], FixedTabs(None));
        let saved = block_on(panel.save(Some(secs(604800)), "not a number")).unwrap();
        assert_eq!(saved.get(), 604800);
    }

    #[test]
    fn test_save_notifies_active_job_page() {
        let (_, bus, panel) = panel(&[], FixedTabs::on(12, JOBS_URL));

        let result = block_on(panel.save(None, "21600"));

        assert_eq!(Notice::for_save(&result).text, "Time filter saved successfully!");
        assert_eq!(
            bus.delivered(),
            vec![(12, Message::TimeValueUpdated { time_value: secs(21600) })]
        );
    }

    #[test]
    fn test_save_skips_other_pages() {
        let (store, bus, panel) = panel(&[], FixedTabs::on(12, "https://example.com/"));

        block_on(panel.save(None, "21600")).unwrap();

        assert_eq!(store.raw(STORAGE_KEY_FILTER_SECONDS), Some(json!("21600")));
        assert!(bus.delivered().is_empty());
    }

    #[test]
    fn test_save_survives_detached_page() {
        let (store, bus, panel) = panel(&[], FixedTabs::on(12, JOBS_URL));
        bus.page_attached.set(false);

        assert_eq!(block_on(panel.save(None, "600")), Ok(secs(600)));
        assert_eq!(store.raw(STORAGE_KEY_FILTER_SECONDS), Some(json!("600")));
    }

    #[test]
    fn test_save_storage_failure() {
        let (store, _, panel) = panel(&[], FixedTabs(None));
        store.fail_with("quota exceeded");

        let result = block_on(panel.save(None, "600"));

        assert!(matches!(result, Err(PanelError::Store(_))));
        assert_eq!(
            Notice::for_save(&result).text,
            "Failed to save time value. Please try again."
        );
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let (_, _, panel) = panel(&[], FixedTabs(None));
        let before = block_on(panel.open()).unwrap();

        assert_eq!(block_on(panel.toggle()), Ok(false));
        let middle = block_on(panel.open()).unwrap();
        assert!(!middle.enabled);
        assert_eq!(middle.toggle_label(), "Enable");

        assert_eq!(block_on(panel.toggle()), Ok(true));
        let after = block_on(panel.open()).unwrap();
        assert_eq!(after, before);
        assert_eq!(after.status_text(), "Extension is enabled");
        assert_eq!(after.toggle_label(), "Disable");
    }

    #[test]
    fn test_toggle_on_notifies_page() {
        let (_, bus, panel) = panel(
            &[
                (STORAGE_KEY_FILTER_SECONDS, json!("43200")),
                (STORAGE_KEY_ENABLED, json!(false)),
            ],
            FixedTabs::on(5, JOBS_URL),
        );

        let result = block_on(panel.toggle());

        assert_eq!(Notice::for_toggle(&result).text, "Extension enabled successfully!");
        assert_eq!(
            bus.delivered(),
            vec![(5, Message::TimeValueUpdated { time_value: secs(43200) })]
        );
    }

    #[test]
    fn test_toggle_off_sends_nothing() {
        let (_, bus, panel) = panel(&[], FixedTabs::on(5, JOBS_URL));

        assert_eq!(block_on(panel.toggle()), Ok(false));
        assert!(bus.delivered().is_empty());
    }
}
