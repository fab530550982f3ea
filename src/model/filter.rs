//! Filter configuration and the pure filter/sort projection over a video
//! snapshot. No side effects; callers re-derive the projection on every read.

use super::video::{Video, WatchStatus};

/// Sort order for the projected list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn display_name(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "Newest First",
            SortOrder::OldestFirst => "Oldest First",
        }
    }
}

/// Structured filter for the video list. The three status toggles are
/// independent; any combination is valid, including all off (which projects
/// an empty list by design). Free-text search is tracked separately by the
/// engine and passed alongside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFilter {
    pub show_unwatched: bool,
    pub show_watched: bool,
    pub show_skipped: bool,
    pub selected_channel_id: Option<String>,
    pub sort_order: SortOrder,
}

impl Default for VideoFilter {
    fn default() -> Self {
        Self {
            show_unwatched: true,
            show_watched: false,
            show_skipped: false,
            selected_channel_id: None,
            sort_order: SortOrder::NewestFirst,
        }
    }
}

impl VideoFilter {
    /// True if at least one status toggle is on.
    pub fn has_active_status_filter(&self) -> bool {
        self.show_unwatched || self.show_watched || self.show_skipped
    }

    /// True if every status toggle is on.
    pub fn shows_all_statuses(&self) -> bool {
        self.show_unwatched && self.show_watched && self.show_skipped
    }

    fn allows(&self, status: WatchStatus) -> bool {
        match status {
            WatchStatus::Unwatched => self.show_unwatched,
            WatchStatus::Watched => self.show_watched,
            WatchStatus::Skipped => self.show_skipped,
        }
    }
}

/// Apply the filter pipeline to a snapshot: status toggles, then channel,
/// then case-insensitive substring search over title / channel title /
/// description, then sort by publish date. Equal timestamps tie-break on id
/// so the projection is deterministic.
pub fn filtered_videos(videos: &[Video], filter: &VideoFilter, search_text: &str) -> Vec<Video> {
    let search = search_text.to_lowercase();

    let mut result: Vec<Video> = videos
        .iter()
        .filter(|v| filter.allows(v.watch_status))
        .filter(|v| match &filter.selected_channel_id {
            Some(channel_id) => &v.channel_id == channel_id,
            None => true,
        })
        .filter(|v| {
            search.is_empty()
                || v.title.to_lowercase().contains(&search)
                || v.channel_title.to_lowercase().contains(&search)
                || v.description.to_lowercase().contains(&search)
        })
        .cloned()
        .collect();

    match filter.sort_order {
        SortOrder::NewestFirst => result.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then_with(|| a.id.cmp(&b.id))
        }),
        SortOrder::OldestFirst => result.sort_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| a.id.cmp(&b.id))
        }),
    }

    result
}

/// Count of unwatched videos across the whole (unfiltered) collection.
/// Used as a badge, independent of the active filter.
pub fn unwatched_count(videos: &[Video]) -> usize {
    videos
        .iter()
        .filter(|v| v.watch_status == WatchStatus::Unwatched)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};

    fn video(id: &str, channel_id: &str, title: &str, status: WatchStatus, age_hours: i64) -> Video {
        Video {
            id: id.to_string(),
            channel_id: channel_id.to_string(),
            channel_title: format!("{} channel", channel_id),
            title: title.to_string(),
            description: String::new(),
            thumbnail_url: None,
            published_at: Utc::now() - TimeDelta::hours(age_hours),
            duration_secs: 60,
            watch_status: status,
            watched_at: None,
        }
    }

    fn sample() -> Vec<Video> {
        vec![
            video("v1", "c1", "What's new in Swift 6", WatchStatus::Unwatched, 1),
            video("v2", "c2", "Introducing iPhone 16", WatchStatus::Watched, 2),
            video("v3", "c3", "Building the Ultimate Gaming PC", WatchStatus::Skipped, 24),
            video("v4", "c1", "Building Modern Web Apps", WatchStatus::Unwatched, 48),
            video("v5", "c2", "WWDC 2025 Keynote", WatchStatus::Unwatched, 72),
        ]
    }

    #[test]
    fn default_filter_keeps_only_unwatched() {
        let videos = sample();
        let result = filtered_videos(&videos, &VideoFilter::default(), "");
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|v| v.watch_status == WatchStatus::Unwatched));
    }

    #[test]
    fn all_toggles_off_projects_empty() {
        let filter = VideoFilter {
            show_unwatched: false,
            show_watched: false,
            show_skipped: false,
            ..VideoFilter::default()
        };
        assert!(filtered_videos(&sample(), &filter, "").is_empty());
        assert!(!filter.has_active_status_filter());
    }

    #[test]
    fn all_toggles_on_keeps_everything() {
        let filter = VideoFilter {
            show_unwatched: true,
            show_watched: true,
            show_skipped: true,
            ..VideoFilter::default()
        };
        assert!(filter.shows_all_statuses());
        assert_eq!(filtered_videos(&sample(), &filter, "").len(), 5);
    }

    #[test]
    fn channel_filter_matches_exact_id() {
        let filter = VideoFilter {
            show_unwatched: true,
            show_watched: true,
            show_skipped: true,
            selected_channel_id: Some("c1".to_string()),
            ..VideoFilter::default()
        };
        let result = filtered_videos(&sample(), &filter, "");
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|v| v.channel_id == "c1"));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let filter = VideoFilter {
            show_unwatched: true,
            show_watched: true,
            show_skipped: true,
            ..VideoFilter::default()
        };
        let result = filtered_videos(&sample(), &filter, "swift");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "What's new in Swift 6");

        // Matches channel title and description too
        let result = filtered_videos(&sample(), &filter, "c2 CHANNEL");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn empty_search_keeps_all() {
        let filter = VideoFilter {
            show_unwatched: true,
            show_watched: true,
            show_skipped: true,
            ..VideoFilter::default()
        };
        assert_eq!(filtered_videos(&sample(), &filter, "").len(), 5);
    }

    #[test]
    fn sort_orders_by_publish_date() {
        let filter = VideoFilter {
            show_unwatched: true,
            show_watched: true,
            show_skipped: true,
            ..VideoFilter::default()
        };
        let newest = filtered_videos(&sample(), &filter, "");
        let ids: Vec<&str> = newest.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["v1", "v2", "v3", "v4", "v5"]);

        let filter = VideoFilter {
            sort_order: SortOrder::OldestFirst,
            ..filter
        };
        let oldest = filtered_videos(&sample(), &filter, "");
        let ids: Vec<&str> = oldest.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["v5", "v4", "v3", "v2", "v1"]);
    }

    #[test]
    fn equal_timestamps_tie_break_on_id() {
        let at = Utc::now();
        let mut a = video("b", "c1", "Second", WatchStatus::Unwatched, 0);
        let mut b = video("a", "c1", "First", WatchStatus::Unwatched, 0);
        a.published_at = at;
        b.published_at = at;

        let result = filtered_videos(&[a, b], &VideoFilter::default(), "");
        let ids: Vec<&str> = result.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn unwatched_count_ignores_active_filter() {
        let videos = sample();
        assert_eq!(unwatched_count(&videos), 3);
    }
}
