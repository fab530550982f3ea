//! Catalog source boundary: the trait the engine syncs against, plus the
//! YouTube Data API v3 client backing it in production.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use super::error::CatalogError;
use super::video::{Channel, Video};

const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Page size for subscription and search listings (the API maximum).
const PAGE_SIZE: u32 = 50;

/// Request timeout; expiry maps to the network error kind.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote catalog of subscriptions and their videos.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Whether the source holds valid credentials. Sync refuses to run
    /// against an unconfigured source.
    fn is_configured(&self) -> bool;

    async fn fetch_subscriptions(&self) -> Result<Vec<Channel>, CatalogError>;

    async fn fetch_videos(
        &self,
        channel_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Video>, CatalogError>;

    /// Videos for every subscribed channel, concatenated. The default
    /// composition fetches the subscription list and then each channel in
    /// turn; implementations may provide a more efficient direct form.
    async fn fetch_all_subscription_videos(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Video>, CatalogError> {
        let channels = self.fetch_subscriptions().await?;
        let mut all = Vec::new();
        for channel in &channels {
            all.extend(self.fetch_videos(&channel.id, since).await?);
        }
        Ok(all)
    }
}

/// YouTube Data API v3 client.
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            base_url,
        }
    }

    fn key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// Issue a GET and decode the JSON body, mapping API error statuses to
    /// catalog error kinds.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        tracing::trace!(url, "catalog request");
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "catalog request failed");
            return Err(match status.as_u16() {
                403 if body.contains("quotaExceeded") || body.contains("rateLimitExceeded") => {
                    CatalogError::QuotaExceeded
                }
                404 => CatalogError::ChannelNotFound(url.to_string()),
                _ => CatalogError::InvalidResponse,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|_| CatalogError::InvalidResponse)
    }
}

#[async_trait]
impl CatalogSource for YouTubeClient {
    fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    async fn fetch_subscriptions(&self) -> Result<Vec<Channel>, CatalogError> {
        let url = format!("{}/subscriptions", self.base_url);
        let page_size = PAGE_SIZE.to_string();
        let mut channels = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("part", "snippet"),
                ("mine", "true"),
                ("maxResults", page_size.as_str()),
                ("key", self.key()),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: SubscriptionListResponse = self.get_json(&url, &query).await?;
            for item in page.items {
                channels.push(Channel {
                    id: item.snippet.resource_id.channel_id,
                    title: item.snippet.title,
                    thumbnail_url: item.snippet.thumbnails.and_then(|t| t.best()),
                    subscribed_at: item.snippet.published_at,
                });
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = channels.len(), "fetched subscriptions");
        Ok(channels)
    }

    async fn fetch_videos(
        &self,
        channel_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Video>, CatalogError> {
        let url = format!("{}/search", self.base_url);
        let page_size = PAGE_SIZE.to_string();
        let published_after = since.map(|d| d.to_rfc3339());

        let mut query = vec![
            ("part", "snippet"),
            ("channelId", channel_id),
            ("order", "date"),
            ("type", "video"),
            ("maxResults", page_size.as_str()),
            ("key", self.key()),
        ];
        if let Some(after) = published_after.as_deref() {
            query.push(("publishedAfter", after));
        }

        let page: SearchListResponse = self.get_json(&url, &query).await?;

        let mut videos: Vec<Video> = page
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(Video {
                    id: video_id,
                    channel_id: item.snippet.channel_id,
                    channel_title: item.snippet.channel_title,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    thumbnail_url: item.snippet.thumbnails.and_then(|t| t.best()),
                    published_at: item.snippet.published_at,
                    duration_secs: 0,
                    watch_status: Default::default(),
                    watched_at: None,
                })
            })
            .collect();

        self.fill_durations(&mut videos).await?;

        tracing::debug!(channel_id, count = videos.len(), "fetched channel videos");
        Ok(videos)
    }
}

impl YouTubeClient {
    /// Search results carry no duration; enrich via `videos?part=contentDetails`.
    async fn fill_durations(&self, videos: &mut [Video]) -> Result<(), CatalogError> {
        if videos.is_empty() {
            return Ok(());
        }

        let url = format!("{}/videos", self.base_url);
        let ids: Vec<String> = videos.iter().map(|v| v.id.clone()).collect();

        for batch in ids.chunks(PAGE_SIZE as usize) {
            let id_param = batch.join(",");
            let query = [
                ("part", "contentDetails"),
                ("id", id_param.as_str()),
                ("key", self.key()),
            ];
            let page: VideoListResponse = self.get_json(&url, &query).await?;

            for item in page.items {
                let secs = parse_iso8601_duration(&item.content_details.duration);
                if let Some(video) = videos.iter_mut().find(|v| v.id == item.id) {
                    video.duration_secs = secs;
                }
            }
        }
        Ok(())
    }
}

/// Parse an ISO-8601 duration as used by the Data API (e.g. "PT1H2M3S",
/// "PT45S", "P1DT2H") into whole seconds. Unparseable input yields zero.
pub(crate) fn parse_iso8601_duration(raw: &str) -> u32 {
    let Some(rest) = raw.strip_prefix('P') else {
        return 0;
    };

    let mut total: u64 = 0;
    let mut value: u64 = 0;
    let mut in_time = false;

    for ch in rest.chars() {
        match ch {
            'T' => in_time = true,
            '0'..='9' => value = value * 10 + u64::from(ch as u8 - b'0'),
            'D' if !in_time => {
                total += value * 86_400;
                value = 0;
            }
            'H' if in_time => {
                total += value * 3600;
                value = 0;
            }
            'M' if in_time => {
                total += value * 60;
                value = 0;
            }
            'S' if in_time => {
                total += value;
                value = 0;
            }
            _ => return 0,
        }
    }

    total.min(u64::from(u32::MAX)) as u32
}

// ---- Data API response shapes ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionListResponse {
    #[serde(default)]
    items: Vec<SubscriptionItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    snippet: SubscriptionSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionSnippet {
    title: String,
    published_at: DateTime<Utc>,
    resource_id: ResourceId,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    channel_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    channel_id: String,
    channel_title: String,
    title: String,
    #[serde(default)]
    description: String,
    published_at: DateTime<Utc>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    fn best(self) -> Option<String> {
        self.medium.or(self.default).map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}
