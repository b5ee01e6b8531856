/// The content script's view of the job search page
use std::cell::Cell;
use std::rc::Rc;

use js_sys::{Array, Reflect};
use log::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, Event, EventInit, HtmlInputElement, MutationObserver, MutationObserverInit,
    MutationRecord, Window,
};

use crate::augment::{colliding_options, custom_presets, option_id, select_option};
use crate::chrome::{ChromeBus, describe};
use crate::config::{
    CUSTOM_OPTION_MARKER, DROPDOWN_SELECTOR, DROPDOWN_VISIBILITY_ATTRIBUTE, FILTER_BUTTON_SELECTOR,
    FILTER_CONTROL_SELECTOR, OPTION_INPUT_NAME, OPTION_INPUT_SELECTOR, OPTIONS_LIST_SELECTOR,
    POLL_INTERVAL_MS, POLL_MAX_ATTEMPTS, SESSION_MARKER,
};
use crate::error::PageError;
use crate::host::{MessageBus, SessionGuard};
use crate::messages::Message;
use crate::page_agent::Page;
use crate::query_param;
use crate::settings::{FilterSeconds, Preset};

const BOUND_MARKER: &str = "data-quickapply-bound";
const OBSERVED_MARKER: &str = "data-quickapply-observed";

/// Marker on `window`, shared by every injection of the content script into
/// the same page
pub struct WindowSession {
    window: Window,
}

impl WindowSession {
    pub fn new(window: Window) -> Self {
        WindowSession { window }
    }
}

impl SessionGuard for WindowSession {
    fn claim(&self) -> bool {
        let key = JsValue::from_str(SESSION_MARKER);
        let claimed = Reflect::get(&self.window, &key)
            .map(|v| v.is_truthy())
            .unwrap_or(false);
        if claimed {
            return false;
        }

        if let Err(e) = Reflect::set(&self.window, &key, &JsValue::TRUE) {
            warn!("Could not mark page session: {}", describe(&e));
        }
        true
    }
}

pub struct DomPage {
    window: Window,
}

impl DomPage {
    pub fn new(window: Window) -> Self {
        DomPage { window }
    }

    fn document(&self) -> Result<Document, PageError> {
        self.window
            .document()
            .ok_or_else(|| PageError::MissingElement("document".to_string()))
    }
}

impl Page for DomPage {
    fn url(&self) -> Option<String> {
        self.window.location().href().ok()
    }

    fn apply_filter(&self, value: FilterSeconds) -> Result<(), PageError> {
        let control = self
            .document()?
            .query_selector(FILTER_CONTROL_SELECTOR)
            .ok()
            .flatten()
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .ok_or_else(|| PageError::MissingElement(FILTER_CONTROL_SELECTOR.to_string()))?;

        control.set_value(&query_param::encode(value));
        dispatch_change(&control).map_err(|e| PageError::Navigation(describe(&e)))
    }

    fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.window
            .location()
            .set_href(url)
            .map_err(|e| PageError::Navigation(describe(&e)))
    }

    fn augment_filter_options(&self) {
        match self.document() {
            Ok(document) => start_augmentation(self.window.clone(), document),
            Err(e) => warn!("Cannot augment filter options: {}", e),
        }
    }
}

fn dispatch_change(target: &HtmlInputElement) -> Result<(), JsValue> {
    let init = EventInit::new();
    init.set_bubbles(true);
    let event = Event::new_with_event_init_dict("change", &init)?;
    target.dispatch_event(&event)?;
    Ok(())
}

/// Inject now if the widget exists, otherwise poll until it renders
pub fn start_augmentation(window: Window, document: Document) {
    if install(&window, &document) {
        return;
    }

    let attempts = Rc::new(Cell::new(0u32));
    let handle = Rc::new(Cell::new(None::<i32>));

    let tick = {
        let window = window.clone();
        let handle = handle.clone();
        Closure::<dyn FnMut()>::new(move || {
            attempts.set(attempts.get() + 1);
            let done = install(&window, &document);
            if done || attempts.get() >= POLL_MAX_ATTEMPTS {
                if !done {
                    debug!("Date posted filter never rendered; giving up");
                }
                if let Some(id) = handle.take() {
                    window.clear_interval_with_handle(id);
                }
            }
        })
    };

    match window.set_interval_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), POLL_INTERVAL_MS) {
        Ok(id) => handle.set(Some(id)),
        Err(e) => error!("Could not start polling for the filter widget: {}", describe(&e)),
    }
    tick.forget();
}

/// Returns false while the options list has not rendered yet
fn install(window: &Window, document: &Document) -> bool {
    let Some(list) = document.query_selector(OPTIONS_LIST_SELECTOR).ok().flatten() else {
        return false;
    };

    match inject_custom_options(window, document, &list) {
        Ok(0) => {}
        Ok(count) => info!("Injected {} custom time filter options", count),
        Err(e) => error!("Failed to inject custom options: {}", describe(&e)),
    }
    observe_dropdown(window, document);
    true
}

/// Drop duplicated native options, put the custom presets first and bind
/// change listeners. Returns how many options were injected.
pub fn inject_custom_options(window: &Window, document: &Document, list: &Element) -> Result<usize, JsValue> {
    let already_injected = list
        .query_selector(&format!("[{CUSTOM_OPTION_MARKER}]"))?
        .is_some();

    let mut injected = 0;
    if !already_injected {
        let native = option_inputs(list)?;
        let values: Vec<String> = native.iter().map(|input| input.value()).collect();
        for index in colliding_options(values.iter().map(String::as_str)) {
            let input = &native[index];
            match input.closest("li")? {
                Some(item) => item.remove(),
                None => input.remove(),
            }
        }

        let current = window
            .location()
            .href()
            .ok()
            .and_then(|href| query_param::read_filter(&href));
        let anchor = list.first_child();
        for preset in custom_presets() {
            let item = build_option(document, &preset, current == Some(preset.value))?;
            list.insert_before(&item, anchor.as_ref())?;
            injected += 1;
        }
    }

    for input in option_inputs(list)? {
        bind_option(window, input);
    }

    Ok(injected)
}

fn option_inputs(list: &Element) -> Result<Vec<HtmlInputElement>, JsValue> {
    let nodes = list.query_selector_all(OPTION_INPUT_SELECTOR)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect())
}

fn build_option(document: &Document, preset: &Preset, checked: bool) -> Result<Element, JsValue> {
    let id = option_id(preset.value);

    let item = document.create_element("li")?;
    item.set_class_name("search-reusables__collection-values-item");
    item.set_attribute(CUSTOM_OPTION_MARKER, "true")?;

    let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
    input.set_type("radio");
    input.set_name(OPTION_INPUT_NAME);
    input.set_id(&id);
    input.set_value(&query_param::encode(preset.value));
    input.set_class_name("search-reusables__select-input");
    input.set_checked(checked);

    let label = document.create_element("label")?;
    label.set_attribute("for", &id)?;
    label.set_class_name("search-reusables__value-label");
    let text = document.create_element("span")?;
    text.set_text_content(Some(preset.label));
    label.append_child(&text)?;

    item.append_child(&input)?;
    item.append_child(&label)?;
    Ok(item)
}

fn bind_option(window: &Window, input: HtmlInputElement) {
    if input.has_attribute(BOUND_MARKER) {
        return;
    }
    if let Err(e) = input.set_attribute(BOUND_MARKER, "true") {
        warn!("Could not mark option: {}", describe(&e));
    }

    let on_change = {
        let window = window.clone();
        let input = input.clone();
        Closure::<dyn FnMut(Event)>::new(move |_event: Event| on_option_selected(&window, &input))
    };
    if let Err(e) = input.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref()) {
        warn!("Could not listen to option changes: {}", describe(&e));
    }
    on_change.forget();
}

/// Relabel the button and load the URL for the chosen option (full reload)
fn on_option_selected(window: &Window, input: &HtmlInputElement) {
    if !input.checked() {
        return;
    }
    let Ok(href) = window.location().href() else {
        return;
    };

    let result = select_option(&href, &input.value())
        .map_err(PageError::from)
        .and_then(|selection| {
            if let Some(document) = window.document() {
                relabel_filter_button(&document, &selection.label);
            }
            match selection.url {
                Some(url) => window
                    .location()
                    .set_href(&url)
                    .map_err(|e| PageError::Navigation(describe(&e))),
                None => Ok(()),
            }
        });

    if let Err(e) = result {
        error!("Error updating URL: {}", e);
        let report = Message::UrlUpdateError { error: e.to_string() };
        spawn_local(async move {
            if let Err(e) = ChromeBus.send_to_background(&report).await {
                warn!("Failed to report URL error: {}", e);
            }
        });
    }
}

/// Returns false when the page has no filter button
pub fn relabel_filter_button(document: &Document, label: &str) -> bool {
    match document.query_selector(FILTER_BUTTON_SELECTOR).ok().flatten() {
        Some(button) => {
            button.set_text_content(Some(label));
            true
        }
        None => false,
    }
}

/// Re-inject whenever the dropdown becomes visible again
fn observe_dropdown(window: &Window, document: &Document) {
    let Some(dropdown) = document.query_selector(DROPDOWN_SELECTOR).ok().flatten() else {
        debug!("Dropdown container not found; not observing");
        return;
    };
    if dropdown.has_attribute(OBSERVED_MARKER) {
        return;
    }

    let callback = {
        let window = window.clone();
        let document = document.clone();
        Closure::<dyn FnMut(Array, MutationObserver)>::new(move |records: Array, _observer: MutationObserver| {
            let became_visible = records.iter().any(|record| {
                let Ok(record) = record.dyn_into::<MutationRecord>() else {
                    return false;
                };
                record.attribute_name().as_deref() == Some(DROPDOWN_VISIBILITY_ATTRIBUTE)
                    && record
                        .target()
                        .and_then(|node| node.dyn_into::<Element>().ok())
                        .and_then(|element| element.get_attribute(DROPDOWN_VISIBILITY_ATTRIBUTE))
                        .as_deref()
                        == Some("false")
            });

            if became_visible {
                if let Some(list) = document.query_selector(OPTIONS_LIST_SELECTOR).ok().flatten() {
                    if let Err(e) = inject_custom_options(&window, &document, &list) {
                        error!("Failed to re-inject custom options: {}", describe(&e));
                    }
                }
            }
        })
    };

    let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => observer,
        Err(e) => {
            error!("Could not create mutation observer: {}", describe(&e));
            return;
        }
    };
    let options = MutationObserverInit::new();
    options.set_attributes(true);
    if let Err(e) = observer.observe_with_options(&dropdown, &options) {
        error!("Could not observe dropdown: {}", describe(&e));
        return;
    }
    if let Err(e) = dropdown.set_attribute(OBSERVED_MARKER, "true") {
        warn!("Could not mark dropdown as observed: {}", describe(&e));
    }
    callback.forget();
}
