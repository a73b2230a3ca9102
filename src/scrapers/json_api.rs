//! JSON API listing extraction.
//!
//! Payloads carry a list of post objects, either at the top level or under one
//! of the source's configured list fields:
//!
//! ```json
//! { "postResponseDto": [ {
//!     "short_title": "...",
//!     "title": { "rendered": "..." },
//!     "post_url": "2024/10/12/some-story",
//!     "images": { "news_detail_image": "...", "post_thumb": "..." },
//!     "content": { "rendered": "<p>...</p>" },
//!     "categories": [ { "name": "World" } ],
//!     "date": "2024-10-12T08:00:00"
//! } ] }
//! ```
//!
//! Images are read from the structured `images` object; nothing is guessed.

use super::images::ImageFilter;
use super::{ExtractContext, Listing, accept_topic};
use crate::cleaning::{
    collapse_whitespace, decode_unicode_escapes, description_or_placeholder, finalize_description,
};
use crate::error::{Result, ScrapeError};
use crate::models::{DebugInfo, ImageVariants, NOT_AVAILABLE, NewsRecord};
use crate::utils::resolve_url;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};

static IMG_SRC: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());

/// Parse a JSON listing body into records.
///
/// Malformed JSON is a parse error; well-formed JSON without a post list is
/// an empty listing.
pub fn extract(body: &str, ctx: &ExtractContext<'_>, url: &str) -> Result<Listing> {
    let payload: Value = serde_json::from_str(body).map_err(|e| ScrapeError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let Some(posts) = find_posts(&payload, &ctx.source.list_fields) else {
        warn!("JSON payload has no post list");
        return Ok(Listing {
            records: Vec::new(),
            debug: debug_info(&payload, 0),
        });
    };

    let records: Vec<NewsRecord> = posts
        .iter()
        .filter_map(|post| record_from_post(post, ctx))
        .take(ctx.settings.primary_cap)
        .collect();
    info!(posts = posts.len(), count = records.len(), "Extracted posts");

    Ok(Listing {
        debug: debug_info(&payload, posts.len()),
        records,
    })
}

/// The post array: the payload itself, a configured field, or the first array-valued field.
fn find_posts<'a>(payload: &'a Value, list_fields: &[String]) -> Option<&'a Vec<Value>> {
    if let Some(list) = payload.as_array() {
        return Some(list);
    }
    let object = payload.as_object()?;
    list_fields
        .iter()
        .find_map(|f| object.get(f).and_then(Value::as_array))
        .or_else(|| object.values().find_map(Value::as_array))
}

fn debug_info(payload: &Value, posts: usize) -> DebugInfo {
    let keys = payload
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    DebugInfo {
        postsCount: Some(posts),
        topLevelKeys: Some(keys),
        ..Default::default()
    }
}

/// A string field, or the `rendered` member of an object field.
fn text_field<'a>(post: &'a Value, key: &str) -> Option<&'a str> {
    let value = post.get(key)?;
    value
        .as_str()
        .or_else(|| value.get("rendered").and_then(Value::as_str))
        .filter(|s| !s.trim().is_empty())
}

/// A name from a string, an object with `name`, or the first element of an array of either.
fn name_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(o) => o.get("name").and_then(name_field),
        Value::Array(a) => a.iter().find_map(name_field),
        _ => None,
    }
}

/// Build one record from a post object.
pub fn record_from_post(post: &Value, ctx: &ExtractContext<'_>) -> Option<NewsRecord> {
    let settings = ctx.settings;
    let raw_title = text_field(post, "short_title").or_else(|| text_field(post, "title"))?;
    let Some(topic) = accept_topic(&fragment_text(&decode_unicode_escapes(raw_title)), settings)
    else {
        debug!(title = raw_title, "Skipping post with short title");
        return None;
    };

    let mut record = NewsRecord::new(topic);
    record.article_url = text_field(post, "post_url")
        .or_else(|| text_field(post, "link"))
        .map(|u| resolve_url(ctx.origin, u))
        .unwrap_or_default();

    record.images = read_variants(post.get("images"), ctx.origin);
    record.image_url = record
        .images
        .urls()
        .first()
        .map(|u| u.to_string())
        .or_else(|| text_field(post, "featured_image").map(|u| resolve_url(ctx.origin, u)))
        .unwrap_or_default();

    let content = text_field(post, "content").map(decode_unicode_escapes);
    let description = content.as_deref().and_then(|html| {
        finalize_description(
            &fragment_text(html),
            settings.min_description_len,
            settings.json_description_cap,
        )
    });

    let mut exclude: Vec<String> = record.images.urls().iter().map(|u| u.to_string()).collect();
    if !record.image_url.is_empty() {
        exclude.push(record.image_url.clone());
    }
    let filter = ImageFilter {
        required_path: Some(settings.upload_path.as_str()),
        excluded_paths: &settings.excluded_image_paths,
        exclude: &exclude,
    };
    record.additional_images = content
        .as_deref()
        .map(|html| filter.apply(fragment_images(html, ctx.origin)))
        .unwrap_or_default();

    let has_images = !record.additional_images.is_empty();
    record.description = description_or_placeholder(description, has_images);
    record.category = post
        .get("categories")
        .or_else(|| post.get("category"))
        .and_then(name_field)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    record.date = text_field(post, "date")
        .or_else(|| text_field(post, "post_date"))
        .map(|d| d.trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    Some(record)
}

/// Read the sized image object. Values may be URLs or objects with a `url` member.
fn read_variants(images: Option<&Value>, origin: &str) -> ImageVariants {
    let Some(images) = images else {
        return ImageVariants::default();
    };
    let get = |key: &str| {
        let v = images.get(key)?;
        v.as_str()
            .or_else(|| v.get("url").and_then(Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| resolve_url(origin, s))
    };
    ImageVariants {
        news_detail_image: get("news_detail_image"),
        post_thumb: get("post_thumb"),
        mobile_banner: get("mobile_banner"),
        mini_tile_image: get("mini_tile_image"),
        large_tile_image: get("large_tile_image"),
    }
}

/// Visible text of an HTML fragment; `script` and `style` contents are dropped.
pub fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let pieces: Vec<&str> = fragment
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().filter_map(ElementRef::wrap).any(|e| {
                matches!(e.value().name(), "script" | "style" | "noscript")
            });
            (!hidden).then_some(&**text)
        })
        .collect();
    collapse_whitespace(&pieces.join(" "))
}

/// Every `img[src]` in an HTML fragment, resolved against `origin`.
fn fragment_images(html: &str, origin: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&IMG_SRC)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with("data:"))
        .map(|s| resolve_url(origin, s))
        .collect()
}
