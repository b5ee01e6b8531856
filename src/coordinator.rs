/// Background worker: seeds defaults, pushes the filter to pages, answers state queries
use std::rc::Rc;

use log::{debug, error, info, warn};
use wasm_bindgen_futures::spawn_local;

use crate::host::{EventSource, HostEvent, InstallReason, MessageBus, Responder, TabId};
use crate::messages::{Message, StateReply};
use crate::query_param::is_jobs_url;
use crate::settings::FilterSeconds;
use crate::storage::{Seeded, SettingsStore, Store};

pub struct Coordinator<S, B> {
    settings: SettingsStore<S>,
    bus: B,
}

impl<S, B> Coordinator<S, B>
where
    S: Store + 'static,
    B: MessageBus + 'static,
{
    pub fn new(settings: SettingsStore<S>, bus: B) -> Self {
        Coordinator { settings, bus }
    }

    /// Handle every event `source` emits, each on its own local task
    pub fn register(self: Rc<Self>, source: &impl EventSource) {
        source.subscribe(Rc::new(move |event: HostEvent| {
            let coordinator = self.clone();
            spawn_local(async move {
                coordinator.handle(event).await;
            });
        }));
        info!("Background worker listening for browser events");
    }

    pub async fn handle(&self, event: HostEvent) {
        match event {
            HostEvent::Installed { reason } => {
                self.on_installed(reason).await;
            }
            HostEvent::TabUpdated {
                tab_id,
                complete: true,
                url: Some(url),
            } => {
                self.on_navigation(tab_id, &url).await;
            }
            HostEvent::TabUpdated { .. } => {}
            HostEvent::HistoryStateUpdated { tab_id, url } => match url {
                Some(url) => {
                    self.on_navigation(tab_id, &url).await;
                }
                None => warn!("History state update for tab {} carried no URL", tab_id),
            },
            HostEvent::Message { message, responder } => self.on_message(message, responder).await,
        }
    }

    /// Seed defaults on install and on extension update. Returns what was written.
    pub async fn on_installed(&self, reason: InstallReason) -> Option<Seeded> {
        if !matches!(reason, InstallReason::Install | InstallReason::Update) {
            debug!("Ignoring install event ({:?})", reason);
            return None;
        }

        match self.settings.seed_defaults().await {
            Ok(seeded) => {
                info!("Extension {:?}: seeded defaults {:?}", reason, seeded);
                Some(seeded)
            }
            Err(e) => {
                error!("Error setting default values: {}", e);
                None
            }
        }
    }

    /// Push the stored filter to a matching page. Returns the value delivered,
    /// `None` when nothing was sent or the page had no listener.
    pub async fn on_navigation(&self, tab_id: TabId, url: &str) -> Option<FilterSeconds> {
        if !is_jobs_url(url) {
            return None;
        }

        let value = match self.enabled_filter().await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("Extension disabled; not updating tab {}", tab_id);
                return None;
            }
            Err(e) => {
                error!("Error in navigation handler: {}", e);
                return None;
            }
        };

        let message = Message::NavigationUpdate { time_value: value };
        match self.bus.send_to_tab(tab_id, &message).await {
            Ok(()) => Some(value),
            Err(e) => {
                warn!("Failed to send message to content script in tab {}: {}", tab_id, e);
                None
            }
        }
    }

    pub async fn on_message(&self, message: Message, responder: Option<Responder>) {
        match message {
            Message::GetExtensionState => {
                let reply = self.extension_state().await;
                match responder {
                    Some(responder) => responder.send(reply),
                    None => warn!("State query arrived without a reply channel"),
                }
            }
            Message::UrlUpdateError { error } => error!("URL Update Error: {}", error),
            Message::InitError { error } => error!("Initialization Error: {}", error),
            other => debug!("Background ignoring {}", other.kind()),
        }
    }

    /// Stored flag; unreadable storage answers with the default
    pub async fn extension_state(&self) -> StateReply {
        match self.settings.enabled().await {
            Ok(enabled) => StateReply { enabled },
            Err(e) => {
                error!("Error reading extension state: {}", e);
                StateReply {
                    enabled: crate::config::DEFAULT_ENABLED,
                }
            }
        }
    }

    async fn enabled_filter(&self) -> Result<Option<FilterSeconds>, crate::error::StoreError> {
        if !self.settings.enabled().await? {
            return Ok(None);
        }
        Ok(Some(self.settings.filter_seconds().await?))
    }
}
