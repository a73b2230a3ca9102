//! The fixed table of listing endpoints selectable through `type`.
//!
//! | Name | Kind | Default endpoint |
//! |------|------|------------------|
//! | `latest` | HTML | `https://sinhala.newsfirst.lk/latest-news` |
//! | `local` | HTML | `https://sinhala.newsfirst.lk/local` |
//! | `sports` | HTML | `https://sinhala.newsfirst.lk/sports` |
//! | `featured` | JSON | `https://apisinhala.newsfirst.lk/post/featured` |
//! | `cricket` | JSON | `https://apisinhala.newsfirst.lk/post/category/cricket` |
//! | `world` | JSON | `https://apisinhala.newsfirst.lk/post/category/world` |
//! | `business` | JSON | `https://apisinhala.newsfirst.lk/post/category/business` |
//!
//! Every entry can be overridden from the settings file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Name used when `type` is absent or unknown.
pub const DEFAULT_SOURCE: &str = "latest";

const SITE_ORIGIN: &str = "https://sinhala.newsfirst.lk";
const API_ORIGIN: &str = "https://apisinhala.newsfirst.lk";

/// How a listing body is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Html,
    Json,
}

/// One selectable endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub url: String,
    pub kind: SourceKind,
    /// Origin used to resolve article links and images. Defaults to the origin of `url`.
    #[serde(default)]
    pub link_origin: Option<String>,
    /// Field names searched, in order, for the post list of a JSON payload.
    #[serde(default)]
    pub list_fields: Vec<String>,
    /// Whether the source names images `<base>-<W>x<H>.<ext>` so sized variants can be derived.
    #[serde(default)]
    pub derive_variants: bool,
}

impl SourceConfig {
    fn html(path: &str) -> Self {
        Self {
            url: format!("{SITE_ORIGIN}{path}"),
            kind: SourceKind::Html,
            link_origin: None,
            list_fields: Vec::new(),
            derive_variants: true,
        }
    }

    fn json(path: &str) -> Self {
        Self {
            url: format!("{API_ORIGIN}{path}"),
            kind: SourceKind::Json,
            link_origin: Some(SITE_ORIGIN.to_string()),
            list_fields: vec![
                "postResponseDto".to_string(),
                "posts".to_string(),
                "data".to_string(),
            ],
            derive_variants: false,
        }
    }

    /// Origin (`scheme://host[:port]`) that relative links resolve against.
    pub fn origin(&self) -> String {
        if let Some(origin) = &self.link_origin {
            return origin.trim_end_matches('/').to_string();
        }
        match Url::parse(&self.url) {
            Ok(u) => u.origin().ascii_serialization(),
            Err(_) => self.url.trim_end_matches('/').to_string(),
        }
    }
}

/// The built-in endpoint table.
pub fn default_sources() -> BTreeMap<String, SourceConfig> {
    let mut sources = BTreeMap::new();
    sources.insert("latest".to_string(), SourceConfig::html("/latest-news"));
    sources.insert("local".to_string(), SourceConfig::html("/local"));
    sources.insert("sports".to_string(), SourceConfig::html("/sports"));
    sources.insert("featured".to_string(), SourceConfig::json("/post/featured"));
    sources.insert(
        "cricket".to_string(),
        SourceConfig::json("/post/category/cricket"),
    );
    sources.insert(
        "world".to_string(),
        SourceConfig::json("/post/category/world"),
    );
    sources.insert(
        "business".to_string(),
        SourceConfig::json("/post/category/business"),
    );
    sources
}
