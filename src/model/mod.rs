//! Model module - Feed state and data types
//!
//! This module contains the domain layer of the tracker. It is organized
//! into submodules by responsibility:
//!
//! - `video`: Core entity types (channels, videos, watch status)
//! - `filter`: Filter configuration and the pure filter/sort projection
//! - `error`: Error kinds for catalog, store and engine
//! - `source`: Catalog source trait + YouTube Data API client
//! - `store`: Persistence trait + JSON file store
//! - `engine`: Sync engine with state machine and watch-state merge

mod engine;
mod error;
mod filter;
mod source;
mod store;
mod video;

// Re-export all public types for convenient access
pub use video::{Channel, Video, WatchStatus};

pub use filter::{SortOrder, VideoFilter, filtered_videos, unwatched_count};

pub use error::{CatalogError, FeedError, StoreError};

pub use source::{CatalogSource, YouTubeClient};

pub use store::{JsonVideoStore, VideoStore, default_data_dir};

pub use engine::{FeedEngine, SyncState};
