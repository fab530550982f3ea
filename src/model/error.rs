//! Error kinds for the catalog source, the persistence store and the engine

use thiserror::Error;

/// Failures from the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response from the catalog")]
    InvalidResponse,

    #[error("API quota exceeded, try again later")]
    QuotaExceeded,

    #[error("channel not found: {0}")]
    ChannelNotFound(String),
}

/// Failures from the local persistence store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt store data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Failures surfaced by engine operations.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("not configured. Set a YouTube API key to sync subscriptions")]
    NotConfigured,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}
