/// Content script logic: applies the stored filter to a job search page
use log::{debug, error, info, warn};

use crate::error::{DeliveryError, PageError};
use crate::host::{MessageBus, SessionGuard};
use crate::messages::{Message, StateReply};
use crate::query_param;
use crate::settings::FilterSeconds;
use crate::storage::{SettingsStore, Store};

/// The page the content script is attached to
pub trait Page {
    fn url(&self) -> Option<String>;

    /// Set the page's own filter control and let the page react to it
    fn apply_filter(&self, value: FilterSeconds) -> Result<(), PageError>;

    /// Full navigation to `url`
    fn navigate(&self, url: &str) -> Result<(), PageError>;

    /// Inject the custom "date posted" options and keep them in place
    fn augment_filter_options(&self);
}

/// Result of [`PageAgent::initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    AlreadyInitialized,
    Disabled,
    Applied(FilterSeconds),
    Failed,
}

pub struct PageAgent<S, B, P, G> {
    settings: SettingsStore<S>,
    bus: B,
    page: P,
    session: G,
}

impl<S, B, P, G> PageAgent<S, B, P, G>
where
    S: Store,
    B: MessageBus,
    P: Page,
    G: SessionGuard,
{
    pub fn new(settings: SettingsStore<S>, bus: B, page: P, session: G) -> Self {
        PageAgent {
            settings,
            bus,
            page,
            session,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Runs once per page session; later calls return `AlreadyInitialized`
    pub async fn initialize(&self) -> InitOutcome {
        if !self.session.claim() {
            info!("QuickApply already initialized");
            return InitOutcome::AlreadyInitialized;
        }

        if !self.extension_enabled().await {
            debug!("Extension disabled; leaving page untouched");
            return InitOutcome::Disabled;
        }

        let value = match self.settings.filter_seconds().await {
            Ok(value) => value,
            Err(e) => {
                error!("Error initializing content script: {}", e);
                self.report(Message::InitError { error: e.to_string() }).await;
                return InitOutcome::Failed;
            }
        };

        if let Err(e) = self.page.apply_filter(value) {
            warn!("Could not apply time filter on load: {}", e);
        }
        self.page.augment_filter_options();

        InitOutcome::Applied(value)
    }

    /// Apply a pushed update. Returns the value applied, if any.
    pub async fn on_message(&self, message: &Message) -> Option<FilterSeconds> {
        match *message {
            Message::NavigationUpdate { time_value } => {
                self.apply(time_value);
                Some(time_value)
            }
            Message::TimeValueUpdated { time_value } => {
                self.apply(time_value);
                self.sync_url(time_value).await;
                Some(time_value)
            }
            _ => None,
        }
    }

    /// Ask the background worker. If it cannot answer, read the stored flag
    /// directly; only a failing store falls back to the default.
    async fn extension_enabled(&self) -> bool {
        let reply = match self.bus.send_to_background(&Message::GetExtensionState).await {
            Ok(Some(reply)) => serde_json::from_value::<StateReply>(reply)
                .map_err(|e| DeliveryError::MalformedReply(e.to_string())),
            Ok(None) => Err(DeliveryError::MalformedReply("empty reply".to_string())),
            Err(e) => Err(e),
        };

        let e = match reply {
            Ok(reply) => return reply.enabled,
            Err(e) => e,
        };

        debug!("Could not query extension state ({}), reading storage", e);
        match self.settings.enabled().await {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!("Could not read extension state, assuming enabled: {}", e);
                crate::config::DEFAULT_ENABLED
            }
        }
    }

    fn apply(&self, value: FilterSeconds) {
        if let Err(e) = self.page.apply_filter(value) {
            warn!("Could not apply time filter {}: {}", value, e);
        }
    }

    /// The page owns URL mutation: rewrite only when the URL disagrees
    async fn sync_url(&self, value: FilterSeconds) {
        let Some(url) = self.page.url() else {
            return;
        };
        if query_param::carries(&url, value) {
            return;
        }

        let result = query_param::with_filter(&url, Some(value))
            .map_err(PageError::from)
            .and_then(|updated| self.page.navigate(&updated));

        if let Err(e) = result {
            error!("Error updating URL: {}", e);
            self.report(Message::UrlUpdateError { error: e.to_string() }).await;
        }
    }

    async fn report(&self, message: Message) {
        if let Err(e) = self.bus.send_to_background(&message).await {
            warn!("Failed to report {} to background: {}", message.kind(), e);
        }
    }
}
