/// In-memory stand-ins for the browser, shared by unit tests
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde_json::Value;

use crate::error::{DeliveryError, PageError, StoreError};
use crate::host::{MessageBus, TabId, TabInfo, Tabs};
use crate::messages::Message;
use crate::page_agent::Page;
use crate::settings::FilterSeconds;
use crate::storage::Store;

#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Value>>,
    writes: Cell<usize>,
    failure: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn with_entries(entries: &[(&str, Value)]) -> Self {
        let store = MemoryStore::default();
        store.entries.borrow_mut().extend(
            entries
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone())),
        );
        store
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn fail_with(&self, reason: &str) {
        *self.failure.borrow_mut() = Some(reason.to_string());
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.failure.borrow().as_ref() {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.check()?;
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.check()?;
        self.entries.borrow_mut().insert(key.to_string(), value);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Records deliveries; the background answers with `background_reply`
pub struct RecordingBus {
    pub delivered: RefCell<Vec<(TabId, Message)>>,
    pub dropped: RefCell<Vec<(TabId, Message)>>,
    pub to_background: RefCell<Vec<Message>>,
    pub page_attached: Cell<bool>,
    pub background_reply: RefCell<Result<Option<Value>, DeliveryError>>,
}

impl Default for RecordingBus {
    fn default() -> Self {
        RecordingBus {
            delivered: RefCell::default(),
            dropped: RefCell::default(),
            to_background: RefCell::default(),
            page_attached: Cell::new(true),
            background_reply: RefCell::new(Ok(None)),
        }
    }
}

impl RecordingBus {
    pub fn replying(reply: Result<Option<Value>, DeliveryError>) -> Self {
        RecordingBus {
            background_reply: RefCell::new(reply),
            ..RecordingBus::default()
        }
    }

    pub fn delivered(&self) -> Vec<(TabId, Message)> {
        self.delivered.borrow().clone()
    }
}

impl MessageBus for RecordingBus {
    async fn send_to_tab(&self, tab: TabId, message: &Message) -> Result<(), DeliveryError> {
        if self.page_attached.get() {
            self.delivered.borrow_mut().push((tab, message.clone()));
            Ok(())
        } else {
            self.dropped.borrow_mut().push((tab, message.clone()));
            Err(DeliveryError::NoReceiver)
        }
    }

    async fn send_to_background(&self, message: &Message) -> Result<Option<Value>, DeliveryError> {
        self.to_background.borrow_mut().push(message.clone());
        self.background_reply.borrow().clone()
    }
}

pub struct FixedTabs(pub Option<TabInfo>);

impl FixedTabs {
    pub fn on(id: TabId, url: &str) -> Self {
        FixedTabs(Some(TabInfo {
            id: Some(id),
            url: Some(url.to_string()),
        }))
    }
}

impl Tabs for FixedTabs {
    async fn active_tab(&self) -> Result<Option<TabInfo>, DeliveryError> {
        Ok(self.0.clone())
    }
}

pub struct FakePage {
    pub url: RefCell<String>,
    pub has_control: Cell<bool>,
    pub navigation_fails: Cell<bool>,
    pub applied: RefCell<Vec<FilterSeconds>>,
    pub navigations: RefCell<Vec<String>>,
    pub augmentations: Cell<u32>,
}

impl FakePage {
    pub fn at(url: &str) -> Self {
        FakePage {
            url: RefCell::new(url.to_string()),
            has_control: Cell::new(true),
            navigation_fails: Cell::new(false),
            applied: RefCell::default(),
            navigations: RefCell::default(),
            augmentations: Cell::new(0),
        }
    }

    pub fn applied(&self) -> Vec<FilterSeconds> {
        self.applied.borrow().clone()
    }
}

impl Page for FakePage {
    fn url(&self) -> Option<String> {
        Some(self.url.borrow().clone())
    }

    fn apply_filter(&self, value: FilterSeconds) -> Result<(), PageError> {
        if !self.has_control.get() {
            return Err(PageError::MissingElement("filter control".to_string()));
        }
        self.applied.borrow_mut().push(value);
        Ok(())
    }

    fn navigate(&self, url: &str) -> Result<(), PageError> {
        if self.navigation_fails.get() {
            return Err(PageError::Navigation("blocked".to_string()));
        }
        self.navigations.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn augment_filter_options(&self) {
        self.augmentations.set(self.augmentations.get() + 1);
    }
}
