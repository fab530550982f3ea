//! Persistence boundary: the store trait plus a JSON-file implementation.

use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

use super::error::StoreError;
use super::video::{Channel, Video};

const VIDEOS_FILE: &str = "videos.json";
const CHANNELS_FILE: &str = "channels.json";

/// Local persistence for channel and video snapshots. Absence of prior data
/// loads as an empty collection, not an error.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn load_videos(&self) -> Result<Vec<Video>, StoreError>;
    async fn save_videos(&self, videos: &[Video]) -> Result<(), StoreError>;
    async fn load_channels(&self) -> Result<Vec<Channel>, StoreError>;
    async fn save_channels(&self, channels: &[Channel]) -> Result<(), StoreError>;
}

/// Stores both collections as JSON files in a single directory.
pub struct JsonVideoStore {
    dir: PathBuf,
}

impl JsonVideoStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn load_collection<T: serde::de::DeserializeOwned>(
        &self,
        file: &str,
    ) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_collection<T: serde::Serialize>(&self, file: &str, items: &[T]) -> Result<(), StoreError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let content = serde_json::to_string(items)?;
        fs::write(self.dir.join(file), content)?;
        Ok(())
    }
}

#[async_trait]
impl VideoStore for JsonVideoStore {
    async fn load_videos(&self) -> Result<Vec<Video>, StoreError> {
        self.load_collection(VIDEOS_FILE)
    }

    async fn save_videos(&self, videos: &[Video]) -> Result<(), StoreError> {
        self.save_collection(VIDEOS_FILE, videos)
    }

    async fn load_channels(&self) -> Result<Vec<Channel>, StoreError> {
        self.load_collection(CHANNELS_FILE)
    }

    async fn save_channels(&self, channels: &[Channel]) -> Result<(), StoreError> {
        self.save_collection(CHANNELS_FILE, channels)
    }
}

/// Default data directory for the store, alongside config and logs.
pub fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tubefeed").map(|dirs| dirs.data_dir().to_path_buf())
}
