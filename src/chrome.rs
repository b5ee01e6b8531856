/// Bindings to the chrome.* extension APIs
///
/// Everything here is a thin adapter: promise-based calls become `Result`s,
/// listener registrations become [`HostEvent`]s. Listener closures are leaked
/// on purpose; they live as long as the extension context does.
use js_sys::{Object, Reflect};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::error::{DeliveryError, StoreError};
use crate::host::{EventSink, EventSource, HostEvent, InstallReason, MessageBus, Responder, TabId, TabInfo, Tabs};
use crate::messages::{Message, StateReply};
use crate::storage::Store;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
    async fn storage_local_get(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
    async fn storage_local_set(items: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    async fn tabs_send_message(tab_id: TabId, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    async fn tabs_query(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    async fn runtime_send_message(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    fn on_message_add_listener(callback: &Closure<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>);

    // The background worker's chrome listeners are registered synchronously
    // by background.js, which buffers events until these subscribe
    #[wasm_bindgen(js_namespace = ["quickApplyRelay", "onInstalled"], js_name = addListener)]
    fn relay_installed(callback: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(js_namespace = ["quickApplyRelay", "onMessage"], js_name = addListener)]
    fn relay_message(callback: &Closure<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>);

    #[wasm_bindgen(js_namespace = ["quickApplyRelay", "onTabUpdated"], js_name = addListener)]
    fn relay_tab_updated(callback: &Closure<dyn FnMut(TabId, JsValue, JsValue)>);

    #[wasm_bindgen(js_namespace = ["quickApplyRelay", "onHistoryStateUpdated"], js_name = addListener)]
    fn relay_history_state_updated(callback: &Closure<dyn FnMut(JsValue)>);
}

/// Serialize to plain JS objects (maps become objects, not `Map`s)
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// Best-effort text for a rejected promise or thrown value
pub fn describe(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

fn string_field(object: &JsValue, name: &str) -> Option<String> {
    Reflect::get(object, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_string())
}

/// chrome.storage.local
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStore;

impl Store for ChromeStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let items = storage_local_get(key)
            .await
            .map_err(|e| StoreError::Unavailable(describe(&e)))?;
        let raw = Reflect::get(&items, &JsValue::from_str(key))
            .map_err(|e| StoreError::Unavailable(describe(&e)))?;

        if raw.is_undefined() || raw.is_null() {
            return Ok(None);
        }

        serde_wasm_bindgen::from_value(raw)
            .map(Some)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let encode_error = |reason: String| StoreError::Encode {
            key: key.to_string(),
            reason,
        };

        let encoded = to_js(&value).map_err(|e| encode_error(e.to_string()))?;
        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(key), &encoded).map_err(|e| encode_error(describe(&e)))?;

        storage_local_set(items.into())
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(describe(&e)))
    }
}

/// chrome.tabs.sendMessage / chrome.runtime.sendMessage
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeBus;

fn delivery_error(e: &JsValue) -> DeliveryError {
    let reason = describe(e);
    if reason.contains("Receiving end does not exist") || reason.contains("Could not establish connection") {
        DeliveryError::NoReceiver
    } else {
        DeliveryError::Failed(reason)
    }
}

impl MessageBus for ChromeBus {
    async fn send_to_tab(&self, tab: TabId, message: &Message) -> Result<(), DeliveryError> {
        let payload = to_js(message).map_err(|e| DeliveryError::Failed(e.to_string()))?;
        tabs_send_message(tab, payload)
            .await
            .map(|_| ())
            .map_err(|e| delivery_error(&e))
    }

    async fn send_to_background(&self, message: &Message) -> Result<Option<Value>, DeliveryError> {
        let payload = to_js(message).map_err(|e| DeliveryError::Failed(e.to_string()))?;
        let reply = runtime_send_message(payload).await.map_err(|e| delivery_error(&e))?;

        if reply.is_undefined() || reply.is_null() {
            return Ok(None);
        }

        serde_wasm_bindgen::from_value(reply)
            .map(Some)
            .map_err(|e| DeliveryError::MalformedReply(e.to_string()))
    }
}

/// chrome.tabs.query for the popup's window
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTabs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveTabQuery {
    active: bool,
    current_window: bool,
}

impl Tabs for ChromeTabs {
    async fn active_tab(&self) -> Result<Option<TabInfo>, DeliveryError> {
        let query = to_js(&ActiveTabQuery {
            active: true,
            current_window: true,
        })
        .map_err(|e| DeliveryError::Failed(e.to_string()))?;

        let tabs = tabs_query(query).await.map_err(|e| DeliveryError::Failed(describe(&e)))?;
        let tabs: Vec<TabInfo> =
            serde_wasm_bindgen::from_value(tabs).map_err(|e| DeliveryError::MalformedReply(e.to_string()))?;

        Ok(tabs.into_iter().next())
    }
}

#[derive(Deserialize)]
struct InstallDetails {
    reason: InstallReason,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryDetails {
    tab_id: TabId,
    #[serde(default)]
    url: Option<String>,
}

type MessageCallback = Closure<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>;

/// Register a `chrome.runtime.onMessage` listener. Messages that expect a
/// reply keep the channel open and get a [`Responder`]; unknown messages are
/// ignored.
pub fn listen_for_messages(handler: impl Fn(Message, Option<Responder>) + 'static) {
    let callback = message_callback(handler);
    on_message_add_listener(&callback);
    callback.forget();
}

fn message_callback(handler: impl Fn(Message, Option<Responder>) + 'static) -> MessageCallback {
    Closure::new(
        move |raw: JsValue, _sender: JsValue, send_response: js_sys::Function| -> JsValue {
            let message: Message = match serde_wasm_bindgen::from_value(raw) {
                Ok(message) => message,
                Err(e) => {
                    debug!("Ignoring unrecognized message: {}", e);
                    return JsValue::FALSE;
                }
            };

            if !message.expects_reply() {
                handler(message, None);
                return JsValue::FALSE;
            }

            let responder = Responder::new(move |reply: StateReply| match to_js(&reply) {
                Ok(reply) => {
                    if let Err(e) = send_response.call1(&JsValue::UNDEFINED, &reply) {
                        warn!("Failed to send reply: {}", describe(&e));
                    }
                }
                Err(e) => error!("Failed to encode reply: {}", e),
            });
            handler(message, Some(responder));

            // Keep the channel open for the asynchronous reply
            JsValue::TRUE
        },
    )
}

/// Background worker events: install, tab load, history navigation, messages.
/// Delivered through the `quickApplyRelay` object background.js sets up.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeEvents;

impl EventSource for ChromeEvents {
    fn subscribe(&self, sink: EventSink) {
        let installed = {
            let sink = sink.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |details: JsValue| {
                match serde_wasm_bindgen::from_value::<InstallDetails>(details) {
                    Ok(details) => sink(HostEvent::Installed { reason: details.reason }),
                    Err(e) => warn!("Unrecognized install details: {}", e),
                }
            })
        };
        relay_installed(&installed);
        installed.forget();

        let tab_updated = {
            let sink = sink.clone();
            Closure::<dyn FnMut(TabId, JsValue, JsValue)>::new(move |tab_id: TabId, change_info: JsValue, tab: JsValue| {
                sink(HostEvent::TabUpdated {
                    tab_id,
                    complete: string_field(&change_info, "status").as_deref() == Some("complete"),
                    url: string_field(&tab, "url"),
                })
            })
        };
        relay_tab_updated(&tab_updated);
        tab_updated.forget();

        let history = {
            let sink = sink.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |details: JsValue| {
                match serde_wasm_bindgen::from_value::<HistoryDetails>(details) {
                    Ok(details) => sink(HostEvent::HistoryStateUpdated {
                        tab_id: details.tab_id,
                        url: details.url,
                    }),
                    Err(e) => warn!("Navigation details are undefined: {}", e),
                }
            })
        };
        relay_history_state_updated(&history);
        history.forget();

        let messages = message_callback(move |message, responder| sink(HostEvent::Message { message, responder }));
        relay_message(&messages);
        messages.forget();
    }
}
