/// Planning for the custom "date posted" options injected into the page
///
/// The DOM work lives in `dom`; this module decides what to inject, which
/// native options to drop, and what the filter button should say.
use crate::config::{CUSTOM_PAGE_PRESETS, URL_PARAM_NAME};
use crate::query_param;
use crate::settings::{FilterSeconds, Preset, presets};

const WEEK: u64 = 604_800;
const MONTH: u64 = 2_592_000;
const DAY: u64 = 86_400;
const HOUR: u64 = 3_600;
const MINUTE: u64 = 60;

pub fn custom_presets() -> Vec<Preset> {
    presets(&CUSTOM_PAGE_PRESETS)
}

/// Element id for an injected option
pub fn option_id(value: FilterSeconds) -> String {
    format!("quickapply-{}-{}", URL_PARAM_NAME, query_param::encode(value))
}

/// Value of a native option input; an empty value means "Any time"
pub fn parse_option_value(raw: &str) -> Option<FilterSeconds> {
    query_param::decode(raw)
}

/// Indices of native options that duplicate one of the custom presets
pub fn colliding_options<'a>(native_values: impl IntoIterator<Item = &'a str>) -> Vec<usize> {
    let custom = custom_presets();
    native_values
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            let value = parse_option_value(raw)?;
            custom.iter().any(|preset| preset.value == value).then_some(index)
        })
        .collect()
}

/// Text shown on the filter button for a selection
pub fn selection_label(value: Option<FilterSeconds>) -> String {
    let Some(value) = value else {
        return "Any time".to_string();
    };

    custom_presets()
        .into_iter()
        .find(|preset| preset.value == value)
        .map(|preset| preset.label.to_string())
        .unwrap_or_else(|| humanize(value))
}

/// What choosing a "date posted" option does to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub label: String,
    /// URL to load, or `None` when `href` already matches the choice
    pub url: Option<String>,
}

/// Button label and target URL for the option value `raw` chosen on `href`.
/// "Any time" removes the filter parameter.
pub fn select_option(href: &str, raw: &str) -> Result<Selection, url::ParseError> {
    let value = parse_option_value(raw);
    let updated = query_param::with_filter(href, value)?;
    Ok(Selection {
        label: selection_label(value),
        url: (updated != href).then_some(updated),
    })
}

/// "Past week", "Past 2 days", "Past 90 seconds", ...
pub fn humanize(value: FilterSeconds) -> String {
    let seconds = value.get();
    if seconds == MONTH {
        return "Past month".to_string();
    }
    if seconds == DAY {
        return "Past 24 hours".to_string();
    }

    let (count, unit) = [(WEEK, "week"), (DAY, "day"), (HOUR, "hour"), (MINUTE, "minute")]
        .into_iter()
        .find(|(size, _)| seconds % size == 0)
        .map(|(size, unit)| (seconds / size, unit))
        .unwrap_or((seconds, "second"));

    if count == 1 {
        format!("Past {unit}")
    } else {
        format!("Past {count} {unit}s")
    }
}
