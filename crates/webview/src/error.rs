//! Error types for the webview crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebviewError {
    #[error("Native handle unavailable: {0}")]
    HandleUnavailable(String),

    #[error("Failed to initialize rendering backend: {0}")]
    BackendInit(String),

    #[error("Failed to create webview: {0}")]
    WebviewCreate(String),

    #[error("Failed to set webview bounds: {0}")]
    SetBounds(String),

    #[error("Failed to load URL: {0}")]
    LoadUrl(String),

    #[error("Failed to destroy webview: {0}")]
    Destroy(String),

    #[error("Unknown webview id {0}")]
    UnknownWebview(u64),

    #[error("Panel channel closed")]
    ChannelClosed,

    #[error("Platform not supported")]
    PlatformNotSupported,
}
