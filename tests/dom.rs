//! Browser tests for the content script's DOM work (`wasm-pack test --headless --chrome`)
#![cfg(target_arch = "wasm32")]

use quickapply::config::{
    CUSTOM_OPTION_MARKER, DROPDOWN_SELECTOR, FILTER_BUTTON_SELECTOR, OPTIONS_LIST_SELECTOR, POLL_INTERVAL_MS,
    SESSION_MARKER,
};
use quickapply::dom::{DomPage, WindowSession, inject_custom_options, relabel_filter_button, start_augmentation};
use quickapply::error::PageError;
use quickapply::host::SessionGuard;
use quickapply::page_agent::Page;
use quickapply::settings::FilterSeconds;
use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlInputElement, Window};

wasm_bindgen_test_configure!(run_in_browser);

fn page() -> (Window, Document) {
    let window = web_sys::window().unwrap();
    let document = window.document().unwrap();
    (window, document)
}

fn mount(document: &Document, html: &str) {
    document.body().unwrap().set_inner_html(html);
}

const NATIVE_OPTIONS: &str = r#"
<div id="hoverable-outlet-date-posted-filter-value">
  <div class="artdeco-hoverable-content" aria-hidden="true">
    <ul class="search-reusables__collection-values-container">
      <li><input type="radio" name="date-posted-filter-value" value=""><label>Any time</label></li>
      <li><input type="radio" name="date-posted-filter-value" value="r2592000"><label>Past month</label></li>
      <li><input type="radio" name="date-posted-filter-value" value="r604800"><label>Past week</label></li>
      <li><input type="radio" name="date-posted-filter-value" value="r86400"><label>Past 24 hours</label></li>
      <li><input type="radio" name="date-posted-filter-value" value="r3600"><label>Past hour</label></li>
    </ul>
  </div>
</div>
"#;

fn option_values(document: &Document) -> Vec<String> {
    let nodes = document
        .query_selector_all("input[name=\"date-posted-filter-value\"]")
        .unwrap();
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .map(|node| node.dyn_into::<HtmlInputElement>().unwrap().value())
        .collect()
}

fn remove_custom_options(document: &Document) {
    let marked = document
        .query_selector_all(&format!("[{CUSTOM_OPTION_MARKER}]"))
        .unwrap();
    for i in 0..marked.length() {
        marked.item(i).unwrap().dyn_into::<web_sys::Element>().unwrap().remove();
    }
}

/// Resolves after `ms`, letting timers and mutation callbacks run
async fn sleep(window: &Window, ms: i32) {
    let promise = Promise::new(&mut |resolve, _| {
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
fn test_custom_options_go_first_without_duplicates() {
    let (window, document) = page();
    mount(&document, NATIVE_OPTIONS);
    let list = document.query_selector(OPTIONS_LIST_SELECTOR).unwrap().unwrap();

    let injected = inject_custom_options(&window, &document, &list).unwrap();

    assert_eq!(injected, 3);
    assert_eq!(
        option_values(&document),
        vec!["r3600", "r21600", "r43200", "", "r2592000", "r604800", "r86400"]
    );
    let marked = document
        .query_selector_all(&format!("[{CUSTOM_OPTION_MARKER}]"))
        .unwrap();
    assert_eq!(marked.length(), 3);
}

#[wasm_bindgen_test]
fn test_injection_is_idempotent() {
    let (window, document) = page();
    mount(&document, NATIVE_OPTIONS);
    let list = document.query_selector(OPTIONS_LIST_SELECTOR).unwrap().unwrap();

    inject_custom_options(&window, &document, &list).unwrap();
    let again = inject_custom_options(&window, &document, &list).unwrap();

    assert_eq!(again, 0);
    assert_eq!(option_values(&document).len(), 7);
}

#[wasm_bindgen_test]
fn test_apply_filter_sets_control() {
    let (window, document) = page();
    mount(&document, r#"<form><input type="hidden" name="f_TPR" value=""></form>"#);

    DomPage::new(window)
        .apply_filter(FilterSeconds::new(21600).unwrap())
        .unwrap();

    let control: HtmlInputElement = document
        .query_selector("input[name=\"f_TPR\"]")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    assert_eq!(control.value(), "r21600");
}

#[wasm_bindgen_test]
fn test_apply_filter_without_control() {
    let (window, document) = page();
    mount(&document, "<p>nothing here</p>");

    let result = DomPage::new(window).apply_filter(FilterSeconds::DEFAULT);

    assert!(matches!(result, Err(PageError::MissingElement(_))));
}

#[wasm_bindgen_test]
fn test_window_session_claims_once() {
    let (window, _) = page();
    js_sys::Reflect::delete_property(&window, &SESSION_MARKER.into()).unwrap();

    let first = WindowSession::new(window.clone());
    let second = WindowSession::new(window);

    assert!(first.claim());
    assert!(!second.claim());
    assert!(!first.claim());
}

#[wasm_bindgen_test]
async fn test_reopening_dropdown_reinjects_options() {
    let (window, document) = page();
    mount(&document, NATIVE_OPTIONS);
    start_augmentation(window.clone(), document.clone());
    assert_eq!(option_values(&document).len(), 7);

    remove_custom_options(&document);
    assert_eq!(option_values(&document), vec!["", "r2592000", "r604800", "r86400"]);

    let dropdown = document.query_selector(DROPDOWN_SELECTOR).unwrap().unwrap();
    dropdown.set_attribute("aria-hidden", "false").unwrap();
    sleep(&window, 0).await;

    assert_eq!(
        option_values(&document),
        vec!["r3600", "r21600", "r43200", "", "r2592000", "r604800", "r86400"]
    );
}

#[wasm_bindgen_test]
async fn test_hiding_dropdown_does_not_reinject() {
    let (window, document) = page();
    mount(&document, NATIVE_OPTIONS);
    start_augmentation(window.clone(), document.clone());
    remove_custom_options(&document);

    let dropdown = document.query_selector(DROPDOWN_SELECTOR).unwrap().unwrap();
    dropdown.set_attribute("aria-hidden", "true").unwrap();
    sleep(&window, 0).await;

    assert_eq!(option_values(&document).len(), 4);
}

#[wasm_bindgen_test]
async fn test_polling_stops_once_list_renders() {
    let (window, document) = page();
    mount(&document, "<p>loading</p>");
    start_augmentation(window.clone(), document.clone());
    assert!(option_values(&document).is_empty());

    mount(&document, NATIVE_OPTIONS);
    sleep(&window, POLL_INTERVAL_MS * 2).await;
    assert_eq!(option_values(&document).len(), 7);

    // Polling is over: nothing puts the options back
    remove_custom_options(&document);
    sleep(&window, POLL_INTERVAL_MS * 3).await;
    assert_eq!(option_values(&document).len(), 4);
}

#[wasm_bindgen_test]
fn test_relabel_filter_button() {
    let (_, document) = page();
    mount(&document, r#"<button id="searchFilter_timePostedRange">Date posted</button>"#);

    assert!(relabel_filter_button(&document, "Past 12 hours"));

    let button = document.query_selector(FILTER_BUTTON_SELECTOR).unwrap().unwrap();
    assert_eq!(button.text_content().as_deref(), Some("Past 12 hours"));
}

#[wasm_bindgen_test]
fn test_relabel_without_button() {
    let (_, document) = page();
    mount(&document, "<p>nothing here</p>");

    assert!(!relabel_filter_button(&document, "Any time"));
}
