use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single thumbnail rendition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// The renditions YouTube publishes for one video. Any subset may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailSet {
    pub default: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStats {
    pub n_favorites: u64,
    pub n_comments: u64,
    pub n_dislikes: u64,
    pub n_likes: u64,
    pub n_views: u64,
}

/// One candidate video. The state machine only ever keys on `id`; the rest
/// is display payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// ISO-8601 duration as emitted by the backend (e.g. "PT4M13S").
    pub duration: String,
    pub channel_id: String,
    pub channel: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub thumbnails: ThumbnailSet,
    pub stats: VideoStats,
}
