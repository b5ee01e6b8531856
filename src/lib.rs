/// QuickApply - Chrome Extension that pins the job search "date posted" filter
/// Built with Rust + WASM + Yew

pub mod augment;
pub mod chrome;
pub mod config;
pub mod coordinator;
pub mod dom;
pub mod error;
pub mod host;
pub mod messages;
pub mod page_agent;
pub mod panel;
pub mod query_param;
pub mod settings;
pub mod storage;
pub mod ui;

#[cfg(test)]
mod testing;

use std::rc::Rc;

use log::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::chrome::{ChromeBus, ChromeEvents, ChromeStore, listen_for_messages};
use crate::coordinator::Coordinator;
use crate::dom::{DomPage, WindowSession};
use crate::page_agent::{InitOutcome, PageAgent};
use crate::storage::SettingsStore;

// Set up panic hook and logging once per context (worker, page, popup)
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Background service worker entry point
#[wasm_bindgen]
pub fn start_background() {
    let coordinator = Rc::new(Coordinator::new(SettingsStore::new(ChromeStore), ChromeBus));
    coordinator.register(&ChromeEvents);
}

// Content script entry point; safe to call again on re-injection
#[wasm_bindgen]
pub fn start_content() {
    let Some(window) = web_sys::window() else {
        error!("Content script loaded without a window");
        return;
    };

    let agent = Rc::new(PageAgent::new(
        SettingsStore::new(ChromeStore),
        ChromeBus,
        DomPage::new(window.clone()),
        WindowSession::new(window),
    ));

    spawn_local(async move {
        let outcome = agent.initialize().await;
        if outcome == InitOutcome::AlreadyInitialized {
            return;
        }
        info!("QuickApply content script ready ({:?})", outcome);

        listen_for_messages(move |message, _| {
            let agent = agent.clone();
            spawn_local(async move {
                agent.on_message(&message).await;
            });
        });
    });
}

// Start the Yew app for the settings popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
