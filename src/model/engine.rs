//! Subscription sync engine: owns the in-memory channel/video collections,
//! the watch-state merge, the sync state machine and the filter state the
//! presentation layer reads through snapshots.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

use super::error::FeedError;
use super::filter::{self, SortOrder, VideoFilter};
use super::source::CatalogSource;
use super::store::VideoStore;
use super::video::{Channel, Video, WatchStatus};

/// Lifecycle of a sync run. `Syncing` can only be entered from `Idle` or a
/// terminal state; a sync request while already `Syncing` is a no-op.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
    Completed,
    Failed(String),
}

/// Engine owning the subscription feed. All mutation entry points are
/// serialized through the internal locks; the catalog source and store are
/// consumed through their narrow interfaces.
pub struct FeedEngine {
    source: Arc<dyn CatalogSource>,
    store: Arc<dyn VideoStore>,
    videos: Arc<Mutex<Vec<Video>>>,
    channels: Arc<Mutex<Vec<Channel>>>,
    filter: Arc<Mutex<VideoFilter>>,
    search_text: Arc<Mutex<String>>,
    sync_state: Arc<Mutex<SyncState>>,
    state_tx: watch::Sender<SyncState>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl FeedEngine {
    pub fn new(source: Arc<dyn CatalogSource>, store: Arc<dyn VideoStore>) -> Self {
        let (state_tx, _) = watch::channel(SyncState::Idle);
        Self {
            source,
            store,
            videos: Arc::new(Mutex::new(Vec::new())),
            channels: Arc::new(Mutex::new(Vec::new())),
            filter: Arc::new(Mutex::new(VideoFilter::default())),
            search_text: Arc::new(Mutex::new(String::new())),
            sync_state: Arc::new(Mutex::new(SyncState::Idle)),
            state_tx,
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub async fn videos(&self) -> Vec<Video> {
        self.videos.lock().await.clone()
    }

    pub async fn channels(&self) -> Vec<Channel> {
        self.channels.lock().await.clone()
    }

    pub async fn sync_state(&self) -> SyncState {
        self.sync_state.lock().await.clone()
    }

    pub async fn is_syncing(&self) -> bool {
        *self.sync_state.lock().await == SyncState::Syncing
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    pub async fn filter(&self) -> VideoFilter {
        self.filter.lock().await.clone()
    }

    pub async fn search_text(&self) -> String {
        self.search_text.lock().await.clone()
    }

    /// The filtered/sorted projection of the current video snapshot,
    /// re-derived on every call.
    pub async fn filtered_videos(&self) -> Vec<Video> {
        let videos = self.videos.lock().await;
        let filter = self.filter.lock().await;
        let search = self.search_text.lock().await;
        filter::filtered_videos(&videos, &filter, &search)
    }

    /// Unwatched badge count over the unfiltered collection.
    pub async fn unwatched_count(&self) -> usize {
        filter::unwatched_count(&self.videos.lock().await)
    }

    /// Receiver for sync-state transitions; presentation layers may subscribe
    /// instead of polling snapshots.
    pub fn subscribe_sync_state(&self) -> watch::Receiver<SyncState> {
        self.state_tx.subscribe()
    }

    // ========================================================================
    // Filter state
    // ========================================================================

    pub async fn set_filter(&self, filter: VideoFilter) {
        *self.filter.lock().await = filter;
    }

    pub async fn set_search_text(&self, text: String) {
        *self.search_text.lock().await = text;
    }

    pub async fn select_channel(&self, channel_id: Option<String>) {
        self.filter.lock().await.selected_channel_id = channel_id;
    }

    pub async fn toggle_sort_order(&self) {
        let mut filter = self.filter.lock().await;
        filter.sort_order = match filter.sort_order {
            SortOrder::NewestFirst => SortOrder::OldestFirst,
            SortOrder::OldestFirst => SortOrder::NewestFirst,
        };
    }

    pub async fn reset_filters(&self) {
        *self.filter.lock().await = VideoFilter::default();
        self.search_text.lock().await.clear();
    }

    // ========================================================================
    // Loading and syncing
    // ========================================================================

    /// Read persisted channels and videos into memory. On failure the
    /// in-memory collections are left empty rather than half-populated.
    pub async fn load_from_storage(&self) {
        let videos = self.store.load_videos().await;
        let channels = self.store.load_channels().await;

        match (videos, channels) {
            (Ok(videos), Ok(channels)) => {
                tracing::debug!(
                    videos = videos.len(),
                    channels = channels.len(),
                    "loaded persisted state"
                );
                *self.videos.lock().await = videos;
                *self.channels.lock().await = channels;
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(error = %e, "failed to load persisted state");
                self.set_error(format!("Failed to load saved data: {}", e)).await;
            }
        }
    }

    /// Fetch the subscribed channels and their videos, merge local watch
    /// state back in and persist the result.
    ///
    /// Returns `Ok(())` both on completion and when another sync is already
    /// in flight (the single-flight no-op is not an error). The outcome is
    /// also published through the sync state machine.
    pub async fn sync(&self) -> Result<(), FeedError> {
        if !self.source.is_configured() {
            let err = FeedError::NotConfigured;
            self.set_state(SyncState::Failed(err.to_string())).await;
            return Err(err);
        }

        // Single-flight guard: at most one sync in flight.
        {
            let mut state = self.sync_state.lock().await;
            if *state == SyncState::Syncing {
                tracing::debug!("sync already in progress, ignoring request");
                return Ok(());
            }
            *state = SyncState::Syncing;
            self.state_tx.send_replace(SyncState::Syncing);
        }
        self.clear_error().await;
        tracing::info!("sync started");

        match self.sync_inner().await {
            Ok(()) => {
                tracing::info!("sync completed");
                self.set_state(SyncState::Completed).await;
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(error = %reason, "sync failed");
                self.set_error(reason.clone()).await;
                self.set_state(SyncState::Failed(reason)).await;
                Err(e)
            }
        }
    }

    async fn sync_inner(&self) -> Result<(), FeedError> {
        // Channel metadata is source-of-truth upstream: replace wholesale.
        let channels = self.source.fetch_subscriptions().await?;
        *self.channels.lock().await = channels.clone();
        self.store.save_channels(&channels).await?;

        // Only watch state carries forward across a refresh.
        let status_map: HashMap<String, (WatchStatus, Option<DateTime<Utc>>)> = {
            let videos = self.videos.lock().await;
            videos
                .iter()
                .map(|v| (v.id.clone(), (v.watch_status, v.watched_at)))
                .collect()
        };

        // Full refetch: the primary sync path passes no since-date.
        let mut fetched = self.source.fetch_all_subscription_videos(None).await?;
        for video in fetched.iter_mut() {
            if let Some((status, watched_at)) = status_map.get(&video.id) {
                video.watch_status = *status;
                video.watched_at = *watched_at;
            }
        }

        *self.videos.lock().await = fetched.clone();
        self.store.save_videos(&fetched).await?;
        Ok(())
    }

    // ========================================================================
    // Watch-state mutations
    // ========================================================================

    pub async fn mark_watched(&self, video_id: &str) {
        self.update_status(video_id, WatchStatus::Watched).await;
    }

    pub async fn mark_skipped(&self, video_id: &str) {
        self.update_status(video_id, WatchStatus::Skipped).await;
    }

    pub async fn mark_unwatched(&self, video_id: &str) {
        self.update_status(video_id, WatchStatus::Unwatched).await;
    }

    /// Watched toggles to unwatched; anything else (including skipped)
    /// toggles to watched.
    pub async fn toggle_watched(&self, video_id: &str) {
        let next = {
            let videos = self.videos.lock().await;
            match videos.iter().find(|v| v.id == video_id) {
                Some(v) if v.watch_status == WatchStatus::Watched => WatchStatus::Unwatched,
                Some(_) => WatchStatus::Watched,
                None => return,
            }
        };
        self.update_status(video_id, next).await;
    }

    /// Set the status of one video and persist the full set. A missing id is
    /// a silent no-op; the video may have been dropped by a concurrent sync.
    /// A persistence failure is reported but the in-memory change stands.
    async fn update_status(&self, video_id: &str, status: WatchStatus) {
        let snapshot = {
            let mut videos = self.videos.lock().await;
            let Some(video) = videos.iter_mut().find(|v| v.id == video_id) else {
                tracing::debug!(video_id, "status update for unknown video, ignoring");
                return;
            };
            video.watch_status = status;
            video.watched_at = if status == WatchStatus::Watched {
                Some(Utc::now())
            } else {
                None
            };
            videos.clone()
        };

        tracing::debug!(video_id, status = status.display_name(), "watch status updated");
        if let Err(e) = self.store.save_videos(&snapshot).await {
            tracing::error!(error = %e, "failed to persist watch status");
            self.set_error(format!("Failed to save video status: {}", e)).await;
        }
    }

    // ========================================================================
    // Internal state helpers
    // ========================================================================

    async fn set_state(&self, state: SyncState) {
        *self.sync_state.lock().await = state.clone();
        self.state_tx.send_replace(state);
    }

    async fn set_error(&self, message: String) {
        *self.last_error.lock().await = Some(message);
    }

    async fn clear_error(&self) {
        *self.last_error.lock().await = None;
    }
}
