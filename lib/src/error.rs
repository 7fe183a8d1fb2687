//! Error shapes and the user-facing notice slot
//!
//! Wallet providers report failures as loosely nested payloads: the most
//! specific message may sit on a nested `error` object, on a `data` object,
//! or at the top level. [`ProviderError`] models that shape and
//! [`ProviderError::user_message`] resolves it with a fixed precedence, so
//! the rest of the crate never digs through payloads itself.

use std::fmt;

use thiserror::Error;

/// Fallback shown when a provider error carries no usable message anywhere.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error...";

/// Uppercase the first letter of `message`, leaving the rest untouched.
pub(crate) fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// A provider-shaped failure with optional nested diagnostic payloads.
///
/// Mirrors the error objects wallet providers hand back from consent and
/// transaction calls. Construction is builder-style; see
/// [`ProviderError::user_message`] for how a display message is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderError {
    /// Top-level message, the least specific slot.
    pub message: Option<String>,
    /// Nested provider error, the most specific slot.
    pub error: Option<Box<ProviderError>>,
    /// Auxiliary data payload, consulted after `error`.
    pub data: Option<Box<ProviderError>>,
}

impl ProviderError {
    /// An error carrying only a top-level message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Attach a nested `error` payload.
    pub fn with_nested(mut self, nested: ProviderError) -> Self {
        self.error = Some(Box::new(nested));
        self
    }

    /// Attach a `data` payload.
    pub fn with_data(mut self, data: ProviderError) -> Self {
        self.data = Some(Box::new(data));
        self
    }

    /// The most specific available message: nested `error.message`, then
    /// `data.message`, then the top-level message, then the unknown-error
    /// fallback.
    pub fn user_message(&self) -> String {
        self.error
            .as_deref()
            .and_then(|nested| nested.message.clone())
            .or_else(|| self.data.as_deref().and_then(|data| data.message.clone()))
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for ProviderError {}

/// Reasons a synchronization pass fails as a whole.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Unsupported network!")]
    UnsupportedNetwork,
    #[error("Could not find the contract, are you connected to the right chain?")]
    ContractMissing,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl SyncError {
    /// The notice published for this failure.
    pub(crate) fn notice(&self) -> Notice {
        match self {
            SyncError::Provider(err) => Notice::from_provider(err),
            other => Notice::plain(other.to_string()),
        }
    }
}

/// A single user-facing message held by the session's error slot.
///
/// Plain text is normalized with a leading capital; a pre-rendered fragment
/// (markup the presentation layer produced itself) is stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Plain(String),
    Markup(String),
}

impl Notice {
    /// A normalized plain-text notice.
    pub fn plain(message: impl AsRef<str>) -> Self {
        Notice::Plain(capitalize(message.as_ref()))
    }

    /// A pre-rendered fragment, stored as-is.
    pub fn markup(fragment: impl Into<String>) -> Self {
        Notice::Markup(fragment.into())
    }

    /// Extract and normalize the message of a provider error.
    pub fn from_provider(err: &ProviderError) -> Self {
        Notice::Plain(capitalize(&err.user_message()))
    }

    /// The displayable content, whichever variant holds it.
    pub fn text(&self) -> &str {
        match self {
            Notice::Plain(text) | Notice::Markup(text) => text,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
