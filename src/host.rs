/// Seams between the extension logic and the browser it runs in
use std::rc::Rc;

use serde::Deserialize;

use crate::error::DeliveryError;
use crate::messages::{Message, StateReply};

pub type TabId = i32;

/// The subset of a browser tab the extension looks at
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TabInfo {
    pub id: Option<TabId>,
    #[serde(default)]
    pub url: Option<String>,
}

/// One-shot message delivery between extension contexts
#[allow(async_fn_in_trait)]
pub trait MessageBus {
    /// Deliver to the content script of `tab`. Fails when nothing is attached.
    async fn send_to_tab(&self, tab: TabId, message: &Message) -> Result<(), DeliveryError>;

    /// Deliver to the background worker and wait for its reply (`None` when
    /// the worker answered without a payload)
    async fn send_to_background(&self, message: &Message) -> Result<Option<serde_json::Value>, DeliveryError>;
}

impl<T: MessageBus> MessageBus for Rc<T> {
    async fn send_to_tab(&self, tab: TabId, message: &Message) -> Result<(), DeliveryError> {
        (**self).send_to_tab(tab, message).await
    }

    async fn send_to_background(&self, message: &Message) -> Result<Option<serde_json::Value>, DeliveryError> {
        (**self).send_to_background(message).await
    }
}

/// Access to the tab the popup was opened over
#[allow(async_fn_in_trait)]
pub trait Tabs {
    async fn active_tab(&self) -> Result<Option<TabInfo>, DeliveryError>;
}

impl<T: Tabs> Tabs for Rc<T> {
    async fn active_tab(&self) -> Result<Option<TabInfo>, DeliveryError> {
        (**self).active_tab().await
    }
}

/// Why `runtime.onInstalled` fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallReason {
    Install,
    Update,
    ChromeUpdate,
    SharedModuleUpdate,
}

/// Sends the answer to a message that expects one
pub struct Responder(Box<dyn FnOnce(StateReply)>);

impl Responder {
    pub fn new(respond: impl FnOnce(StateReply) + 'static) -> Self {
        Responder(Box::new(respond))
    }

    pub fn send(self, reply: StateReply) {
        (self.0)(reply)
    }
}

/// Browser events the background worker reacts to
pub enum HostEvent {
    Installed {
        reason: InstallReason,
    },
    /// A tab finished (or progressed) loading
    TabUpdated {
        tab_id: TabId,
        complete: bool,
        url: Option<String>,
    },
    /// In-page navigation through the History API
    HistoryStateUpdated {
        tab_id: TabId,
        url: Option<String>,
    },
    Message {
        message: Message,
        responder: Option<Responder>,
    },
}

pub type EventSink = Rc<dyn Fn(HostEvent)>;

/// Something that delivers [`HostEvent`]s to a subscriber
pub trait EventSource {
    fn subscribe(&self, sink: EventSink);
}

/// Guards one-time initialization for the lifetime of a page
pub trait SessionGuard {
    /// Returns true for the first caller only
    fn claim(&self) -> bool;
}

/// In-memory guard, scoped to whoever owns it
#[derive(Debug, Default)]
pub struct OnceGuard {
    claimed: std::cell::Cell<bool>,
}

impl SessionGuard for OnceGuard {
    fn claim(&self) -> bool {
        !self.claimed.replace(true)
    }
}
