//! Single article page extraction, used by enrichment.

use super::element_text;
use super::images::{ImageFilter, img_src};
use crate::cleaning::{META_MARKER, collapse_whitespace, finalize_description, is_boilerplate};
use crate::config::ExtractionSettings;
use crate::utils::char_len;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

const BODY_CONTAINERS: [&str; 6] = [
    ".article-body",
    ".content",
    ".post-content",
    ".entry-content",
    ".news-content",
    "article",
];

static BODY_PARAGRAPHS: Lazy<Selector> = Lazy::new(|| {
    let list = BODY_CONTAINERS.iter().map(|c| format!("{c} p")).join(", ");
    Selector::parse(&list).unwrap()
});
static BODY_IMAGES: Lazy<Selector> = Lazy::new(|| {
    let list = BODY_CONTAINERS.iter().map(|c| format!("{c} img")).join(", ");
    Selector::parse(&list).unwrap()
});
static ANY_PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());

/// What an article page adds to a listing record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleDetails {
    pub description: Option<String>,
    pub additional_images: Vec<String>,
}

/// Extract the body description and images from an article page.
///
/// Paragraphs inside body-like containers are joined (all paragraphs when the
/// page has no such container), skipping bylines, the generic meta text and
/// date stamps. The `description` meta tag is the fallback unless it is the
/// site-wide boilerplate. Images matching `exclude` are left out.
pub fn extract_article(
    body: &str,
    origin: &str,
    settings: &ExtractionSettings,
    description_cap: usize,
    exclude: &[String],
) -> ArticleDetails {
    let document = Html::parse_document(body);

    let mut paragraphs: Vec<String> = document.select(&BODY_PARAGRAPHS).map(element_text).collect();
    if paragraphs.is_empty() {
        paragraphs = document.select(&ANY_PARAGRAPH).map(element_text).collect();
    }
    let joined = paragraphs
        .into_iter()
        .filter(|t| char_len(t) > settings.min_description_len && !is_boilerplate(t))
        .unique()
        .join(" ");

    let description = finalize_description(&joined, settings.min_description_len, description_cap)
        .or_else(|| {
            let meta = document
                .select(&META_DESCRIPTION)
                .next()
                .and_then(|m| m.value().attr("content"))?;
            let meta = collapse_whitespace(meta);
            if meta.contains(META_MARKER) {
                return None;
            }
            finalize_description(&meta, settings.min_description_len, description_cap)
        });

    let filter = ImageFilter {
        required_path: None,
        excluded_paths: &settings.excluded_image_paths,
        exclude,
    };
    let additional_images = filter.apply(
        document
            .select(&BODY_IMAGES)
            .filter_map(|img| img_src(img, origin)),
    );

    ArticleDetails {
        description,
        additional_images,
    }
}
