//! Testimonial records and the adapters to the content endpoint's JSON.
//!
//! The endpoint has answered with both snake_case (`client_name`) and
//! camelCase (`clientName`) field names for the same record. Both are
//! accepted by [`RemoteTestimonial`] and normalized into [`Testimonial`];
//! nothing past this module sees the wire names.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sort position the content service assigns when none is given.
pub const DEFAULT_SORT_ORDER: i32 = 999;

/// Where a testimonial video comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    /// A file uploaded from the visitor's machine.
    #[default]
    Upload,
    /// A YouTube page or share link.
    YouTube,
    /// A direct link to a video file.
    Link,
}

impl std::fmt::Display for VideoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::YouTube => write!(f, "youtube"),
            Self::Link => write!(f, "link"),
        }
    }
}

/// Canonical testimonial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: i64,
    pub client_name: String,
    pub description: String,
    pub video_url: String,
    pub video_source: VideoSource,
    pub sort_order: i32,
}

/// A record as the content endpoint sends it, in either naming style.
///
/// Each dual-named field has one slot per spelling so a payload carrying
/// both still decodes; the snake_case value wins.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTestimonial {
    pub id: i64,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default, rename = "clientName")]
    client_name_camel: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default, rename = "videoUrl")]
    video_url_camel: Option<String>,
    /// Free text on the content side.
    #[serde(default)]
    video_type: Option<String>,
    #[serde(default, rename = "videoType")]
    video_type_camel: Option<String>,
    #[serde(default)]
    sort_order: Option<i32>,
    #[serde(default, rename = "sortOrder")]
    sort_order_camel: Option<i32>,
}

impl VideoSource {
    /// Read a stored kind; anything unrecognized counts as an upload.
    pub fn from_stored(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "youtube" => Self::YouTube,
            "link" => Self::Link,
            _ => Self::Upload,
        }
    }
}

impl From<RemoteTestimonial> for Testimonial {
    fn from(remote: RemoteTestimonial) -> Self {
        Self {
            id: remote.id,
            client_name: remote
                .client_name
                .or(remote.client_name_camel)
                .unwrap_or_default(),
            description: remote.description.unwrap_or_default(),
            video_url: remote
                .video_url
                .or(remote.video_url_camel)
                .unwrap_or_default(),
            video_source: remote
                .video_type
                .or(remote.video_type_camel)
                .map(|raw| VideoSource::from_stored(&raw))
                .unwrap_or_default(),
            sort_order: remote
                .sort_order
                .or(remote.sort_order_camel)
                .unwrap_or(DEFAULT_SORT_ORDER),
        }
    }
}

/// Body of the `PUT` proposing an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialUpdate {
    pub id: i64,
    pub client_name: String,
    pub description: String,
    pub video_url: String,
    pub video_type: VideoSource,
}

impl Testimonial {
    /// An edit proposal carrying this record's current values.
    pub fn to_update(&self) -> TestimonialUpdate {
        TestimonialUpdate {
            id: self.id,
            client_name: self.client_name.clone(),
            description: self.description.clone(),
            video_url: self.video_url.clone(),
            video_type: self.video_source,
        }
    }

    /// Apply an edit locally; id and sort order stay.
    pub fn apply(&mut self, update: &TestimonialUpdate) {
        self.client_name = update.client_name.clone();
        self.description = update.description.clone();
        self.video_url = update.video_url.clone();
        self.video_source = update.video_type;
    }

    /// How the video slot should render.
    pub fn display(&self) -> VideoDisplay {
        if self.video_url.is_empty() {
            return VideoDisplay::Placeholder { slot: self.id };
        }
        match self.video_source {
            VideoSource::YouTube => VideoDisplay::Embed {
                url: youtube_embed_url(&self.video_url),
            },
            VideoSource::Upload | VideoSource::Link => VideoDisplay::Player {
                url: self.video_url.clone(),
            },
        }
    }
}

/// Render decision for one video slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VideoDisplay {
    /// No video yet: "Место для видео {slot}".
    Placeholder { slot: i64 },
    /// Embedded player frame.
    Embed { url: String },
    /// Native video element.
    Player { url: String },
}

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("valid YouTube pattern")
});

/// Turn a YouTube page or share link into its embed URL.
///
/// Anything without an 11-character video id is returned unchanged.
pub fn youtube_embed_url(url: &str) -> String {
    YOUTUBE_ID
        .captures(url)
        .and_then(|caps| caps.get(2))
        .map(|id| id.as_str())
        .filter(|id| id.len() == 11)
        .map(|id| format!("https://www.youtube.com/embed/{id}"))
        .unwrap_or_else(|| url.to_string())
}
