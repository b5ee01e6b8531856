/// Messages exchanged between the background worker, content script and popup
use serde::{Deserialize, Serialize};

use crate::settings::FilterSeconds;

/// Wire format: `{ "type": "NAVIGATION_UPDATE", "timeValue": "3600" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Message {
    /// Page/popup -> background, replied to with [`StateReply`]
    GetExtensionState,
    /// Background -> page after a navigation on a matching page
    NavigationUpdate { time_value: FilterSeconds },
    /// Popup -> page after the saved value changed
    TimeValueUpdated { time_value: FilterSeconds },
    UrlUpdateError { error: String },
    InitError { error: String },
}

impl Message {
    /// Whether the sender waits for a reply
    pub fn expects_reply(&self) -> bool {
        matches!(self, Message::GetExtensionState)
    }

    /// Name of the variant as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Message::GetExtensionState => "GET_EXTENSION_STATE",
            Message::NavigationUpdate { .. } => "NAVIGATION_UPDATE",
            Message::TimeValueUpdated { .. } => "TIME_VALUE_UPDATED",
            Message::UrlUpdateError { .. } => "URL_UPDATE_ERROR",
            Message::InitError { .. } => "INIT_ERROR",
        }
    }
}

/// Reply to `GET_EXTENSION_STATE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateReply {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    crate::config::DEFAULT_ENABLED
}
