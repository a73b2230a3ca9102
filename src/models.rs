//! Data models for scraped news records and the JSON bodies served around them.
//!
//! - [`NewsRecord`]: one extracted article summary
//! - [`ImageVariants`]: pre-rendered sizes of a record's primary image
//! - [`DebugInfo`]: page structure summary returned when nothing was extracted
//! - [`EmptyBody`] / [`ErrorBody`]: the non-list response bodies

use serde::{Deserialize, Serialize};

/// Description placeholder when nothing usable was extracted.
pub const NO_DESCRIPTION: &str = "No description available";

/// Appended to [`NO_DESCRIPTION`] when the record still carries body images.
pub const SEE_IMAGES_NOTE: &str = " (see additional images)";

/// Placeholder list entry when an article has no body images.
pub const NO_ADDITIONAL_IMAGES: &str = "No additional images";

/// Placeholder for optional descriptive fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sized renditions of the same source image.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ImageVariants {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_detail_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_thumb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mini_tile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_tile_image: Option<String>,
}

impl ImageVariants {
    /// All present variant URLs, largest rendition first.
    pub fn urls(&self) -> Vec<&str> {
        [
            &self.news_detail_image,
            &self.large_tile_image,
            &self.mobile_banner,
            &self.mini_tile_image,
            &self.post_thumb,
        ]
        .into_iter()
        .filter_map(|u| u.as_deref())
        .collect()
    }
}

/// One extracted news item.
///
/// `description` is always either a cleaned summary or a string starting with
/// [`NO_DESCRIPTION`]; it is never empty once a record leaves the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NewsRecord {
    pub topic: String,
    pub description: String,
    pub image_url: String,
    #[serde(flatten)]
    pub images: ImageVariants,
    pub article_url: String,
    pub additional_images: Vec<String>,
    pub category: String,
    pub date: String,
}

impl NewsRecord {
    /// A record with only a topic; every other field holds its placeholder.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            description: NO_DESCRIPTION.to_string(),
            image_url: String::new(),
            images: ImageVariants::default(),
            article_url: String::new(),
            additional_images: Vec::new(),
            category: NOT_AVAILABLE.to_string(),
            date: NOT_AVAILABLE.to_string(),
        }
    }

    /// True when the description is a placeholder rather than extracted text.
    pub fn has_placeholder_description(&self) -> bool {
        self.description.starts_with(NO_DESCRIPTION)
    }

    /// Body images, ignoring the placeholder entry.
    pub fn real_additional_images(&self) -> impl Iterator<Item = &String> {
        self.additional_images
            .iter()
            .filter(|u| u.as_str() != NO_ADDITIONAL_IMAGES)
    }
}

/// Page structure summary used to tune selectors when extraction finds nothing.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DebugInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pageTitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linksCount: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagesCount: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bodyStructure: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postsCount: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topLevelKeys: Option<Vec<String>>,
}

/// Body returned with status 200 when no records survived extraction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmptyBody {
    pub error: String,
    pub debug: DebugInfo,
}

impl EmptyBody {
    pub fn new(debug: DebugInfo) -> Self {
        Self {
            error: "No news items found".to_string(),
            debug,
        }
    }
}

/// Body returned with status 500 when the listing could not be fetched or parsed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
    pub url: String,
}

impl ErrorBody {
    pub fn new(details: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            error: "Failed to scrape news".to_string(),
            details: details.into(),
            url: url.into(),
        }
    }
}
