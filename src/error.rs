//! Error types for the sweep.
//!
//! Only region enumeration failure propagates out of the orchestrator.
//! Everything else is captured as data in the sweep result (region-level
//! errors) or logged and swallowed (identity, notification).

use thiserror::Error;

/// A failure reported by one of the cloud collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{component}] {message}")]
pub struct ProviderError {
    pub component: String,
    pub message: String,
}

impl ProviderError {
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Build a `ProviderError` from an AWS SDK error, pulling the embedded
    /// service message out of the Debug representation when present.
    pub fn aws<E: std::fmt::Debug + std::fmt::Display>(component: &str, err: E) -> Self {
        let debug = format!("{err:?}");
        let display = err.to_string();
        Self::new(component, extract_error_details(&debug, &display))
    }
}

/// Extract a single-line message from an AWS SDK error.
///
/// SDK Display output is often just "service error"; the useful message is
/// buried in the Debug output as `message: Some("...")`.
fn extract_error_details(debug_str: &str, display_str: &str) -> String {
    if let Some(pos) = debug_str.find("message: Some(\"") {
        let start = pos + "message: Some(\"".len();
        let rest = &debug_str[start..];
        if let Some(end) = rest.find('"') {
            return rest[..end].to_string();
        }
    }

    if !display_str.to_lowercase().contains("service error") {
        return display_str.to_string();
    }

    "AWS API request failed".to_string()
}

/// Errors that abort the whole sweep.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    /// Region enumeration failed; without regions there is nothing to sweep.
    #[error("failed to enumerate regions: {0}")]
    FatalEnumeration(ProviderError),
}
