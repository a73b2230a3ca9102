//! Image URL rules shared by the listing and article extractors.
//!
//! Uploaded images are stored as `<base>.<ext>` with pre-rendered sizes named
//! `<base>-<W>x<H>.<ext>`. Two URLs with the same base are the same picture.

use crate::models::ImageVariants;
use crate::utils::resolve_url;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// Attributes holding an image location, most preferred first.
const SRC_ATTRS: [&str; 3] = ["src", "data-src", "data-lazy-src"];

static RE_SIZE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<base>.+?)(?:-\d+x\d+)?(?P<ext>\.[A-Za-z0-9]+)$").unwrap());

/// Thumbnails, ads, logos and social icons.
static RE_NON_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(thumb|logo|icon|avatar|sprite|placeholder|/ads?/|[-_/]ads?[-_.]|banner|advert|facebook|twitter|whatsapp|instagram|youtube|social|-150x150\.)",
    )
    .unwrap()
});

/// Size suffix appended to the base name for each variant. Empty means the original upload.
const VARIANT_SUFFIXES: [(&str, &str); 5] = [
    ("news_detail_image", ""),
    ("post_thumb", "-150x150"),
    ("mobile_banner", "-600x315"),
    ("mini_tile_image", "-300x169"),
    ("large_tile_image", "-768x432"),
];

/// Location of an `img` element, resolved against `origin`. Inline `data:` URIs are skipped.
pub fn img_src(img: ElementRef<'_>, origin: &str) -> Option<String> {
    SRC_ATTRS
        .iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty() && !v.starts_with("data:"))
        .map(|v| resolve_url(origin, v))
}

/// The first image inside `container`.
pub fn primary_image(container: ElementRef<'_>, origin: &str) -> Option<String> {
    container
        .select(&IMG)
        .next()
        .and_then(|img| img_src(img, origin))
}

/// Last path segment of a URL, without query or fragment.
fn file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// File name with its extension and any `-WxH` size suffix removed, lowercased.
pub fn filename_base(url: &str) -> String {
    let name = file_name(url);
    match RE_SIZE_SUFFIX.captures(name) {
        Some(caps) => caps["base"].to_lowercase(),
        None => name.to_lowercase(),
    }
}

/// Whether two URLs point at the same picture (exact match or same base).
pub fn same_image(a: &str, b: &str) -> bool {
    a == b || (!a.is_empty() && !b.is_empty() && filename_base(a) == filename_base(b))
}

/// Derive sized variant URLs from an upload that follows the `-WxH` naming convention.
pub fn derive_variants(url: &str) -> ImageVariants {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = file_name(path);
    let Some(caps) = RE_SIZE_SUFFIX.captures(name) else {
        return ImageVariants::default();
    };
    let dir = &path[..path.len() - name.len()];
    let (base, ext) = (&caps["base"], &caps["ext"]);
    let mut variants = ImageVariants::default();
    for (field, suffix) in VARIANT_SUFFIXES {
        let derived = Some(format!("{dir}{base}{suffix}{ext}"));
        match field {
            "news_detail_image" => variants.news_detail_image = derived,
            "post_thumb" => variants.post_thumb = derived,
            "mobile_banner" => variants.mobile_banner = derived,
            "mini_tile_image" => variants.mini_tile_image = derived,
            _ => variants.large_tile_image = derived,
        }
    }
    variants
}

/// Whether an image URL is a thumbnail, ad, logo or social icon.
pub fn is_non_content(url: &str, excluded_paths: &[String]) -> bool {
    RE_NON_CONTENT.is_match(url) || excluded_paths.iter().any(|p| url.contains(p.as_str()))
}

/// Rules for picking additional images out of an article body.
#[derive(Debug, Clone, Copy)]
pub struct ImageFilter<'a> {
    /// Only URLs containing this fragment are kept, when set.
    pub required_path: Option<&'a str>,
    pub excluded_paths: &'a [String],
    /// Images already shown as the primary image or one of its variants.
    pub exclude: &'a [String],
}

impl ImageFilter<'_> {
    pub fn accepts(&self, url: &str) -> bool {
        if let Some(required) = self.required_path {
            if !url.contains(required) {
                return false;
            }
        }
        !is_non_content(url, self.excluded_paths)
            && !self.exclude.iter().any(|e| same_image(e, url))
    }

    /// Keep accepted URLs in order, dropping repeats of the same picture.
    pub fn apply<I>(&self, urls: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        urls.into_iter()
            .filter(|u| self.accepts(u))
            .unique_by(|u| filename_base(u))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const ORIGIN: &str = "https://sinhala.newsfirst.lk";

    #[test]
    fn test_src_preference_and_data_uri() {
        let doc = Html::parse_fragment(
            r#"<div><img src="data:image/gif;base64,R0lG" data-src="/a.jpg" data-lazy-src="/b.jpg"></div>"#,
        );
        let div = doc.select(&Selector::parse("div").unwrap()).next().unwrap();
        assert_eq!(
            primary_image(div, ORIGIN),
            Some(format!("{ORIGIN}/a.jpg"))
        );
    }

    #[test]
    fn test_no_image() {
        let doc = Html::parse_fragment("<div><p>text</p></div>");
        let div = doc.select(&Selector::parse("div").unwrap()).next().unwrap();
        assert_eq!(primary_image(div, ORIGIN), None);
    }

    #[test]
    fn test_filename_base_strips_size() {
        assert_eq!(
            filename_base("https://x.lk/uploads/2024/10/Flood-768x432.jpg?v=2"),
            "flood"
        );
        assert_eq!(filename_base("https://x.lk/uploads/flood.jpg"), "flood");
        assert!(same_image(
            "https://x.lk/uploads/flood-150x150.jpg",
            "https://cdn.x.lk/uploads/flood.jpg"
        ));
        assert!(!same_image("https://x.lk/a.jpg", "https://x.lk/b.jpg"));
    }

    #[test]
    fn test_derive_variants() {
        let variants = derive_variants("https://x.lk/uploads/2024/10/flood-300x169.jpg");
        assert_eq!(
            variants.news_detail_image.as_deref(),
            Some("https://x.lk/uploads/2024/10/flood.jpg")
        );
        assert_eq!(
            variants.post_thumb.as_deref(),
            Some("https://x.lk/uploads/2024/10/flood-150x150.jpg")
        );
        assert_eq!(
            variants.large_tile_image.as_deref(),
            Some("https://x.lk/uploads/2024/10/flood-768x432.jpg")
        );
        assert_eq!(derive_variants("https://x.lk/noext"), ImageVariants::default());
    }

    #[test]
    fn test_filter_excludes_primary_and_junk() {
        let exclude = vec!["https://x.lk/uploads/main-768x432.jpg".to_string()];
        let excluded_paths = vec!["/assets/".to_string()];
        let filter = ImageFilter {
            required_path: Some("/uploads/"),
            excluded_paths: &excluded_paths,
            exclude: &exclude,
        };
        let kept = filter.apply(vec![
            "https://x.lk/uploads/main.jpg".to_string(),
            "https://x.lk/uploads/body-1.jpg".to_string(),
            "https://x.lk/uploads/body-1-300x169.jpg".to_string(),
            "https://x.lk/assets/uploads/logo.png".to_string(),
            "https://x.lk/static/body-2.jpg".to_string(),
            "https://x.lk/uploads/body-3.jpg".to_string(),
        ]);
        assert_eq!(
            kept,
            vec![
                "https://x.lk/uploads/body-1.jpg".to_string(),
                "https://x.lk/uploads/body-3.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_non_content_patterns() {
        let none: Vec<String> = vec![];
        assert!(is_non_content("https://x.lk/img/site-logo.png", &none));
        assert!(is_non_content("https://x.lk/icons/facebook.svg", &none));
        assert!(is_non_content("https://x.lk/ads/leaderboard.gif", &none));
        assert!(!is_non_content("https://x.lk/uploads/roads-closed.jpg", &none));
    }
}
