/// Settings popup for QuickApply

use std::cell::RefCell;
use std::rc::Rc;

use log::error;
use patternfly_yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::chrome::{ChromeBus, ChromeStore, ChromeTabs};
use crate::panel::{Notice, PanelView, SettingsPanel};
use crate::settings::FilterSeconds;
use crate::storage::SettingsStore;
use crate::ui::components::{CustomValueInput, NoticeBanner, PresetOptions, StatusIndicator};

type ChromePanel = SettingsPanel<ChromeStore, ChromeBus, ChromeTabs>;

fn chrome_panel() -> ChromePanel {
    SettingsPanel::new(SettingsStore::new(ChromeStore), ChromeBus, ChromeTabs)
}

/// Show `notice`, then hide it after its duration unless a newer one replaced it
fn flash(notice: &UseStateHandle<Option<Notice>>, serial: &Rc<RefCell<u32>>, value: Notice) {
    let ticket = {
        let mut serial = serial.borrow_mut();
        *serial += 1;
        *serial
    };
    let duration = value.duration_ms as i32;
    notice.set(Some(value));

    let notice = notice.clone();
    let serial = serial.clone();
    let hide = Closure::once_into_js(move || {
        if *serial.borrow() == ticket {
            notice.set(None);
        }
    });

    if let Some(window) = web_sys::window() {
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(hide.unchecked_ref(), duration) {
            error!("Could not schedule notice timeout: {:?}", e);
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let view = use_state(|| None::<PanelView>);
    let selected = use_state(|| None::<FilterSeconds>);
    let custom_input = use_state(String::new);
    let notice = use_state(|| None::<Notice>);
    let notice_serial = use_mut_ref(|| 0u32);

    // Load saved settings on mount
    {
        let view = view.clone();
        let selected = selected.clone();
        let custom_input = custom_input.clone();
        let notice = notice.clone();
        let notice_serial = notice_serial.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match chrome_panel().open().await {
                    Ok(loaded) => {
                        selected.set(loaded.selected_preset().map(|p| p.value));
                        custom_input.set(loaded.saved_value.to_string());
                        view.set(Some(loaded));
                    }
                    Err(e) => {
                        error!("Error initializing popup: {}", e);
                        view.set(Some(PanelView::new(FilterSeconds::DEFAULT, true)));
                        flash(&notice, &notice_serial, Notice::load_failed());
                    }
                }
            });
            || ()
        });
    }

    // Save handler
    let on_save = {
        let view = view.clone();
        let selected = *selected;
        let custom_input = (*custom_input).clone();
        let notice = notice.clone();
        let notice_serial = notice_serial.clone();

        Callback::from(move |_: ()| {
            let view = view.clone();
            let custom_input = custom_input.clone();
            let notice = notice.clone();
            let notice_serial = notice_serial.clone();

            spawn_local(async move {
                let result = chrome_panel().save(selected, &custom_input).await;
                match &result {
                    Ok(value) => {
                        if let Some(current) = (*view).clone() {
                            view.set(Some(PanelView {
                                saved_value: *value,
                                ..current
                            }));
                        }
                    }
                    Err(e) => error!("Error saving time value: {}", e),
                }
                flash(&notice, &notice_serial, Notice::for_save(&result));
            });
        })
    };

    // Toggle handler
    let on_toggle = {
        let view = view.clone();
        let notice = notice.clone();
        let notice_serial = notice_serial.clone();

        Callback::from(move |_: ()| {
            let view = view.clone();
            let notice = notice.clone();
            let notice_serial = notice_serial.clone();

            spawn_local(async move {
                let result = chrome_panel().toggle().await;
                match &result {
                    Ok(enabled) => {
                        if let Some(current) = (*view).clone() {
                            view.set(Some(PanelView {
                                enabled: *enabled,
                                ..current
                            }));
                        }
                    }
                    Err(e) => error!("Error toggling extension: {}", e),
                }
                flash(&notice, &notice_serial, Notice::for_toggle(&result));
            });
        })
    };

    // Ctrl/Cmd+S saves, Ctrl/Cmd+T toggles. The listener is registered once
    // and always calls the latest handlers.
    let shortcuts = use_mut_ref(|| (Callback::from(|_: ()| ()), Callback::from(|_: ()| ())));
    *shortcuts.borrow_mut() = (on_save.clone(), on_toggle.clone());
    use_effect_with((), move |_| {
        let listener = Closure::<dyn FnMut(KeyboardEvent)>::new(move |e: KeyboardEvent| {
            if !(e.ctrl_key() || e.meta_key()) {
                return;
            }
            let (save, toggle) = shortcuts.borrow().clone();
            match e.key().as_str() {
                "s" => {
                    e.prevent_default();
                    save.emit(());
                }
                "t" => {
                    e.prevent_default();
                    toggle.emit(());
                }
                _ => {}
            }
        });

        let document = web_sys::window().and_then(|w| w.document());
        if let Some(document) = &document {
            if let Err(e) = document.add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref()) {
                error!("Error setting up keyboard shortcuts: {:?}", e);
            }
        }

        move || {
            if let Some(document) = document {
                let _ = document.remove_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
            }
        }
    });

    let on_select = {
        let selected = selected.clone();
        Callback::from(move |value: FilterSeconds| selected.set(Some(value)))
    };

    // Typing a custom value clears the preset choice
    let on_custom_input = {
        let selected = selected.clone();
        let custom_input = custom_input.clone();
        Callback::from(move |text: String| {
            selected.set(None);
            custom_input.set(text);
        })
    };

    let Some(current) = (*view).clone() else {
        return html! {
            <div class="loading-text-center">
                <Spinner />
            </div>
        };
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"QuickApply"}</h1>

            <StatusIndicator class={current.status_class()} text={current.status_text()} />

            <p class="saved-value">
                {"Saved filter: "}
                <span id="saved_value">{current.saved_value.to_string()}</span>
                {" seconds"}
            </p>

            if current.enabled {
                <div id="selection" class="flex-column-gap">
                    <PresetOptions
                        presets={current.presets.clone()}
                        selected={*selected}
                        on_select={on_select}
                    />
                    <CustomValueInput
                        value={(*custom_input).clone()}
                        on_input={on_custom_input}
                        on_enter={on_save.clone()}
                    />
                </div>
            }

            <div class="flex-column-gap">
                <Button
                    onclick={on_save.reform(|_: MouseEvent| ())}
                    disabled={!current.enabled}
                    variant={ButtonVariant::Primary}
                    block={true}
                >
                    {"Save"}
                </Button>
                <Button
                    onclick={on_toggle.reform(|_: MouseEvent| ())}
                    variant={ButtonVariant::Secondary}
                    block={true}
                >
                    {current.toggle_label()}
                </Button>
            </div>

            if let Some(message) = (*notice).clone() {
                <NoticeBanner notice={message} />
            }

            <p class="footer-popup">
                {"QuickApply v0.1.0"}
            </p>
        </div>
    }
}
