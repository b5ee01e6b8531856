/// Reusable UI components

use yew::prelude::*;
use web_sys::HtmlInputElement;
use patternfly_yew::prelude::*;
use crate::panel::{Notice, NoticeKind};
use crate::settings::{FilterSeconds, Preset};

#[derive(Properties, PartialEq)]
pub struct StatusIndicatorProps {
    pub class: &'static str,
    pub text: &'static str,
}

#[function_component(StatusIndicator)]
pub fn status_indicator(props: &StatusIndicatorProps) -> Html {
    html! {
        <div class="status-row">
            <span id="status_indicator" class={props.class}></span>
            <span id="status_text" class="status-text">{props.text}</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PresetOptionsProps {
    pub presets: Vec<Preset>,
    pub selected: Option<FilterSeconds>,
    pub on_select: Callback<FilterSeconds>,
}

/// Radio buttons for the fixed presets
#[function_component(PresetOptions)]
pub fn preset_options(props: &PresetOptionsProps) -> Html {
    html! {
        <div id="preset_container" class="preset-container">
            {for props.presets.iter().map(|preset| {
                let value = preset.value;
                let on_change = props.on_select.reform(move |_: Event| value);
                html! {
                    <label class="time-option">
                        <input
                            type="radio"
                            name="time"
                            value={value.to_string()}
                            checked={props.selected == Some(value)}
                            onchange={on_change}
                        />
                        {preset.label}
                    </label>
                }
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CustomValueInputProps {
    pub value: String,
    pub on_input: Callback<String>,
    pub on_enter: Callback<()>,
}

/// Free-form seconds input; Enter saves
#[function_component(CustomValueInput)]
pub fn custom_value_input(props: &CustomValueInputProps) -> Html {
    let oninput = props.on_input.reform(|e: InputEvent| {
        e.target_dyn_into::<HtmlInputElement>()
            .map(|input| input.value())
            .unwrap_or_default()
    });

    let onkeypress = {
        let on_enter = props.on_enter.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                on_enter.emit(());
            }
        })
    };

    html! {
        <label class="custom-time">
            {"Custom (seconds)"}
            <input
                id="f_TPR_value"
                type="number"
                min="1"
                value={props.value.clone()}
                {oninput}
                {onkeypress}
            />
        </label>
    }
}

#[derive(Properties, PartialEq)]
pub struct NoticeBannerProps {
    pub notice: Notice,
}

#[function_component(NoticeBanner)]
pub fn notice_banner(props: &NoticeBannerProps) -> Html {
    let alert_type = match props.notice.kind {
        NoticeKind::Success => AlertType::Success,
        NoticeKind::Error => AlertType::Danger,
    };

    html! {
        <div id="saved_message" class="message-top-margin">
            <Alert r#type={alert_type} title={props.notice.text.clone()} inline={true}>
            </Alert>
        </div>
    }
}
