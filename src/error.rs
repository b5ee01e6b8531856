/// Error types for storage, messaging and page access
use thiserror::Error;

use crate::settings::ValidationError;

/// chrome.storage.local access failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode value for '{key}': {reason}")]
    Encode { key: String, reason: String },
}

/// A message could not be delivered or its reply was unusable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeliveryError {
    #[error("no receiving end attached")]
    NoReceiver,

    #[error("message delivery failed: {0}")]
    Failed(String),

    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

/// The page did not look the way the content script expects
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PageError {
    #[error("element not found: {0}")]
    MissingElement(String),

    #[error("invalid page url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("navigation failed: {0}")]
    Navigation(String),
}

/// Errors surfaced by the settings popup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PanelError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
