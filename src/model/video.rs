//! Core entity types: channels, videos and per-video watch state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Watch status of a video. Defaults to `Unwatched` for anything the user
/// has not acted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    #[default]
    Unwatched,
    Watched,
    Skipped,
}

impl WatchStatus {
    pub fn display_name(self) -> &'static str {
        match self {
            WatchStatus::Unwatched => "Unwatched",
            WatchStatus::Watched => "Watched",
            WatchStatus::Skipped => "Skipped",
        }
    }
}

/// A channel the user is subscribed to. Channel metadata is source-of-truth
/// from upstream and replaced wholesale on every successful sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub subscribed_at: DateTime<Utc>,
}

/// A video from a subscribed channel, together with its local watch state.
///
/// `watched_at` is present if and only if `watch_status` is `Watched`; every
/// write site in the engine maintains that invariant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub channel_id: String,
    pub channel_title: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub published_at: DateTime<Utc>,
    /// Duration in whole seconds. Zero is valid and renders as "0:00".
    pub duration_secs: u32,
    #[serde(default)]
    pub watch_status: WatchStatus,
    #[serde(default)]
    pub watched_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Formatted duration, e.g. "12:34" or "1:23:45". Hours are unpadded,
    /// minutes and seconds are zero-padded once an hour is present.
    pub fn formatted_duration(&self) -> String {
        let hours = self.duration_secs / 3600;
        let minutes = (self.duration_secs % 3600) / 60;
        let seconds = self.duration_secs % 60;
        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        }
    }

    /// Coarse relative time since publication, e.g. "2h ago".
    pub fn relative_published_time(&self) -> String {
        relative_time(self.published_at, Utc::now())
    }
}

/// Bucketed "time ago" string: days, hours or minutes, largest nonzero unit
/// wins; anything under a minute is "just now".
pub(crate) fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn video_with_duration(secs: u32) -> Video {
        Video {
            id: "v".to_string(),
            channel_id: "c".to_string(),
            channel_title: "Channel".to_string(),
            title: "Title".to_string(),
            description: String::new(),
            thumbnail_url: None,
            published_at: Utc::now(),
            duration_secs: secs,
            watch_status: WatchStatus::Unwatched,
            watched_at: None,
        }
    }

    #[test]
    fn duration_formats_minutes_and_seconds() {
        assert_eq!(video_with_duration(0).formatted_duration(), "0:00");
        assert_eq!(video_with_duration(59).formatted_duration(), "0:59");
        assert_eq!(video_with_duration(567).formatted_duration(), "9:27");
        assert_eq!(video_with_duration(1234).formatted_duration(), "20:34");
    }

    #[test]
    fn duration_formats_hours_without_padding() {
        assert_eq!(video_with_duration(3600).formatted_duration(), "1:00:00");
        assert_eq!(video_with_duration(3661).formatted_duration(), "1:01:01");
        assert_eq!(video_with_duration(7890).formatted_duration(), "2:11:30");
        assert_eq!(video_with_duration(36_000).formatted_duration(), "10:00:00");
    }

    #[test]
    fn relative_time_picks_largest_unit() {
        let now = Utc::now();
        assert_eq!(relative_time(now - TimeDelta::days(3), now), "3d ago");
        assert_eq!(relative_time(now - TimeDelta::hours(26), now), "1d ago");
        assert_eq!(relative_time(now - TimeDelta::hours(5), now), "5h ago");
        assert_eq!(relative_time(now - TimeDelta::minutes(12), now), "12m ago");
        assert_eq!(relative_time(now - TimeDelta::seconds(30), now), "just now");
        assert_eq!(relative_time(now, now), "just now");
    }

    #[test]
    fn watch_status_round_trips_through_json() {
        let json = serde_json::to_string(&WatchStatus::Skipped).unwrap();
        assert_eq!(json, "\"skipped\"");
        let back: WatchStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WatchStatus::Skipped);
    }
}
