//! HTML listing extraction.
//!
//! The listing page is handed to an ordered list of [`Strategy`] values. Each
//! container selector is its own strategy, from the most specific
//! (`.news-item`) to the most permissive (`div[class*="item"]`), followed by
//! the aggressive heading scan. The first strategy that yields a record wins.

use super::images::{derive_variants, primary_image};
use super::{ExtractContext, Listing, SeenUrls, accept_topic, element_text};
use crate::cleaning::{description_or_placeholder, finalize_description, is_boilerplate};
use crate::models::{DebugInfo, NOT_AVAILABLE, NewsRecord};
use crate::utils::{char_len, resolve_url};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

/// Container selectors, most specific first.
pub const CONTAINER_SELECTORS: [&str; 20] = [
    ".news-item",
    ".article-item",
    ".post-item",
    ".news-card",
    ".article-card",
    ".story-item",
    ".content-item",
    "article",
    ".article",
    ".post",
    ".story",
    ".content",
    r#"li[class*="news"]"#,
    r#"li[class*="article"]"#,
    r#"li[class*="post"]"#,
    r#"div[class*="news"]"#,
    r#"div[class*="article"]"#,
    r#"div[class*="post"]"#,
    r#"div[class*="story"]"#,
    r#"div[class*="item"]"#,
];

const TITLE_SELECTORS: [&str; 13] = [
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    ".title",
    ".headline",
    ".news-title",
    ".article-title",
    ".story-title",
    "a[title]",
    "a",
];

const DESCRIPTION_SELECTORS: [&str; 14] = [
    "p",
    ".summary",
    ".excerpt",
    ".description",
    ".content",
    ".text",
    ".lead",
    ".news-summary",
    ".article-summary",
    ".story-summary",
    ".story-content",
    ".article-content",
    ".news-content",
    ".post-content",
];

const AGGRESSIVE_SELECTOR: &str =
    r#"a, h1, h2, h3, h4, h5, h6, .title, [class*="title"], [class*="headline"]"#;

const DATE_SELECTORS: [&str; 4] = ["time", ".date", ".post-date", r#"[class*="date"]"#];

/// Ancestors an aggressive-pass heading borrows its description and image from.
const AGGRESSIVE_PARENTS: [&str; 4] = ["div", "article", "li", "section"];

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

fn compile(list: &[&str]) -> Vec<Selector> {
    list.iter().map(|s| Selector::parse(s).unwrap()).collect()
}

static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| compile(&CONTAINER_SELECTORS));
static TITLES: Lazy<Vec<Selector>> = Lazy::new(|| compile(&TITLE_SELECTORS));
static DESCRIPTIONS: Lazy<Vec<Selector>> = Lazy::new(|| compile(&DESCRIPTION_SELECTORS));
static DATES: Lazy<Vec<Selector>> = Lazy::new(|| compile(&DATE_SELECTORS));
static AGGRESSIVE: Lazy<Selector> = Lazy::new(|| Selector::parse(AGGRESSIVE_SELECTOR).unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse(&HEADINGS.join(", ")).unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// One way of turning a listing page into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Treat every match of `CONTAINER_SELECTORS[i]` as one news item.
    Container(usize),
    /// Scan headings, anchors and title-like elements directly.
    Aggressive,
}

impl Strategy {
    /// Every strategy in the order they are tried.
    pub fn all() -> impl Iterator<Item = Strategy> {
        (0..CONTAINER_SELECTORS.len())
            .map(Strategy::Container)
            .chain(std::iter::once(Strategy::Aggressive))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Container(i) => CONTAINER_SELECTORS[*i],
            Strategy::Aggressive => "aggressive",
        }
    }

    pub fn apply(
        &self,
        document: &Html,
        ctx: &ExtractContext<'_>,
        seen: &mut SeenUrls,
    ) -> Vec<NewsRecord> {
        match self {
            Strategy::Container(i) => container_pass(document, &CONTAINERS[*i], ctx, seen),
            Strategy::Aggressive => aggressive_pass(document, ctx, seen),
        }
    }
}

/// Run the strategies in order and keep the first non-empty result.
#[instrument(level = "debug", skip_all)]
pub fn extract(body: &str, ctx: &ExtractContext<'_>, seen: &mut SeenUrls) -> Listing {
    let document = Html::parse_document(body);
    for strategy in Strategy::all() {
        let records = strategy.apply(&document, ctx, seen);
        if !records.is_empty() {
            info!(
                count = records.len(),
                strategy = strategy.name(),
                "Found news items"
            );
            return Listing {
                records,
                debug: DebugInfo::default(),
            };
        }
    }
    let summary = debug_info(&document);
    info!(
        page_title = ?summary.pageTitle,
        links = ?summary.linksCount,
        images = ?summary.imagesCount,
        "No news items found with any strategy"
    );
    Listing {
        records: Vec::new(),
        debug: summary,
    }
}

fn container_pass(
    document: &Html,
    selector: &Selector,
    ctx: &ExtractContext<'_>,
    seen: &mut SeenUrls,
) -> Vec<NewsRecord> {
    let mut records = Vec::new();
    for container in document.select(selector) {
        if records.len() >= ctx.settings.primary_cap {
            break;
        }
        let Some(record) = record_from_container(container, ctx) else {
            continue;
        };
        if !seen.insert(&record.article_url) {
            debug!(url = %record.article_url, "Skipping container for an already seen article");
            continue;
        }
        records.push(record);
    }
    records
}

/// Build a record from one matched container, or `None` when it has no usable title.
pub fn record_from_container(
    container: ElementRef<'_>,
    ctx: &ExtractContext<'_>,
) -> Option<NewsRecord> {
    let settings = ctx.settings;
    let raw_title = find_title(container, settings.title_accept_len);
    let topic = accept_topic(&raw_title, settings)?;

    let mut record = NewsRecord::new(topic);
    record.article_url = container
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| resolve_url(ctx.origin, href))
        .unwrap_or_default();

    let description = find_description(container, &record.topic, ctx)
        .or_else(|| fallback_description(container, &raw_title, ctx));
    record.description = description_or_placeholder(description, false);

    if let Some(image) = primary_image(container, ctx.origin) {
        if ctx.source.derive_variants {
            record.images = derive_variants(&image);
        }
        record.image_url = image;
    }
    record.date = find_date(container).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    Some(record)
}

/// Try each title selector; stop at the first candidate longer than `accept_len`.
fn find_title(container: ElementRef<'_>, accept_len: usize) -> String {
    let mut topic = String::new();
    for selector in TITLES.iter() {
        let Some(el) = container.select(selector).next() else {
            continue;
        };
        let candidate = el
            .value()
            .attr("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| element_text(el));
        if !candidate.is_empty() {
            topic = candidate;
        }
        if char_len(&topic) > accept_len {
            break;
        }
    }
    topic
}

fn is_heading(el: ElementRef<'_>) -> bool {
    HEADINGS.contains(&el.value().name())
}

/// Navigation menus and "read more" links are never descriptions.
fn is_navigation(el: ElementRef<'_>) -> bool {
    let own = |e: ElementRef<'_>| {
        e.value().name() == "nav"
            || e.value().classes().any(|c| {
                let c = c.to_ascii_lowercase();
                c == "nav"
                    || ["read-more", "readmore", "more-link", "menu"]
                        .iter()
                        .any(|m| c.contains(*m))
            })
    };
    own(el) || el.ancestors().filter_map(ElementRef::wrap).any(own)
}

fn find_description(
    container: ElementRef<'_>,
    topic: &str,
    ctx: &ExtractContext<'_>,
) -> Option<String> {
    let settings = ctx.settings;
    for selector in DESCRIPTIONS.iter() {
        let Some(el) = container
            .select(selector)
            .find(|e| !is_heading(*e) && e.select(&HEADING).next().is_none() && !is_navigation(*e))
        else {
            continue;
        };
        let text = element_text(el);
        if text == topic
            || char_len(&text) <= settings.min_description_len
            || is_boilerplate(&text)
        {
            continue;
        }
        if let Some(d) = finalize_description(
            &text,
            settings.min_description_len,
            settings.listing_description_cap,
        ) {
            return Some(d);
        }
    }
    None
}

/// Container text after the title, cleaned.
fn fallback_description(
    container: ElementRef<'_>,
    title: &str,
    ctx: &ExtractContext<'_>,
) -> Option<String> {
    let text = element_text(container);
    let after = match text.split_once(title) {
        Some((_, after)) if !title.is_empty() => after.trim(),
        _ => return None,
    };
    if char_len(after) <= ctx.settings.min_description_len {
        return None;
    }
    finalize_description(
        after,
        ctx.settings.min_description_len,
        ctx.settings.listing_description_cap,
    )
}

fn find_date(container: ElementRef<'_>) -> Option<String> {
    DATES.iter().find_map(|selector| {
        let el = container.select(selector).next()?;
        let value = el
            .value()
            .attr("datetime")
            .map(|d| d.trim().to_string())
            .unwrap_or_else(|| element_text(el));
        (!value.is_empty()).then_some(value)
    })
}

/// Nearest element (including `el` itself) whose tag is one of `tags`.
fn closest<'a>(el: ElementRef<'a>, tags: &[&str]) -> Option<ElementRef<'a>> {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find(|e| tags.contains(&e.value().name()))
}

fn aggressive_pass(
    document: &Html,
    ctx: &ExtractContext<'_>,
    seen: &mut SeenUrls,
) -> Vec<NewsRecord> {
    let settings = ctx.settings;
    let mut records = Vec::new();
    for el in document.select(&AGGRESSIVE) {
        if records.len() >= settings.aggressive_cap {
            break;
        }
        let text = element_text(el);
        let len = char_len(&text);
        if len <= settings.aggressive_min_len || len >= settings.aggressive_max_len {
            continue;
        }
        let Some(topic) = accept_topic(&text, settings) else {
            continue;
        };
        let parent = closest(el, &AGGRESSIVE_PARENTS).unwrap_or(el);

        let mut record = NewsRecord::new(topic);
        let description = parent.select(&PARAGRAPH).next().and_then(|p| {
            finalize_description(
                &element_text(p),
                settings.min_description_len,
                settings.listing_description_cap,
            )
        });
        record.description = description_or_placeholder(description, false);
        if let Some(image) = primary_image(parent, ctx.origin) {
            if ctx.source.derive_variants {
                record.images = derive_variants(&image);
            }
            record.image_url = image;
        }
        let href = if el.value().name() == "a" {
            el.value().attr("href")
        } else {
            parent
                .select(&LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
        };
        record.article_url = href
            .map(|h| resolve_url(ctx.origin, h))
            .unwrap_or_default();

        if !seen.insert(&record.article_url) {
            continue;
        }
        records.push(record);
    }
    records
}

/// Summary of the page structure for manual selector tuning.
pub fn debug_info(document: &Html) -> DebugInfo {
    let page_title = document
        .select(&TITLE)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let body_structure = document
        .select(&BODY)
        .next()
        .map(|body| {
            body.children()
                .filter_map(ElementRef::wrap)
                .take(10)
                .map(|e| e.value().name().to_uppercase())
                .collect()
        })
        .unwrap_or_default();
    DebugInfo {
        pageTitle: Some(page_title),
        linksCount: Some(document.select(&ANCHOR).count()),
        imagesCount: Some(document.select(&IMAGE).count()),
        bodyStructure: Some(body_structure),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionSettings;
    use crate::models::NO_DESCRIPTION;
    use crate::sources::{SourceConfig, SourceKind};

    const ORIGIN: &str = "https://sinhala.newsfirst.lk";

    fn source(derive_variants: bool) -> SourceConfig {
        SourceConfig {
            url: format!("{ORIGIN}/latest-news"),
            kind: SourceKind::Html,
            link_origin: None,
            list_fields: vec![],
            derive_variants,
        }
    }

    fn run(html: &str) -> Listing {
        let src = source(false);
        let settings = ExtractionSettings::default();
        let ctx = ExtractContext {
            origin: ORIGIN,
            source: &src,
            settings: &settings,
        };
        extract(html, &ctx, &mut SeenUrls::default())
    }

    #[test]
    fn test_single_article_scenario() {
        let html = r#"<html><body>
            <article>
              <h2>Test Headline With Enough Length</h2>
              <p>A description that is sufficiently long to pass the twenty character minimum.</p>
              <img src="/img/photo.jpg">
            </article>
        </body></html>"#;
        let listing = run(html);
        assert_eq!(listing.records.len(), 1);
        let record = &listing.records[0];
        assert_eq!(record.topic, "Test Headline With Enough Length");
        assert!(record.description.contains(
            "A description that is sufficiently long to pass the twenty character minimum."
        ));
        assert_eq!(record.image_url, format!("{ORIGIN}/img/photo.jpg"));
        assert_eq!(record.article_url, "");
    }

    #[test]
    fn test_place_name_survives_in_description() {
        let html = r#"<html><body>
            <article>
              <h2>City streets closed for parade</h2>
              <p>Roads in Colombo (the commercial capital) were closed for the parade.</p>
            </article>
        </body></html>"#;
        let listing = run(html);
        assert_eq!(
            listing.records[0].description,
            "Roads in Colombo (the commercial capital) were closed for the parade."
        );
    }

    #[test]
    fn test_specific_container_wins_over_generic() {
        let html = r#"<html><body>
            <div class="news-item">
              <a href="/news/1"><h3>First specific headline here</h3></a>
              <p>COLOMBO (News1st) - bylined paragraph that should be skipped entirely.</p>
              <div class="summary">Summary text that is long enough to be kept as description.</div>
            </div>
            <article><h2>Should not be reached by the cascade</h2></article>
        </body></html>"#;
        let listing = run(html);
        assert_eq!(listing.records.len(), 1);
        let record = &listing.records[0];
        assert_eq!(record.topic, "First specific headline here");
        assert_eq!(record.article_url, format!("{ORIGIN}/news/1"));
        assert_eq!(
            record.description,
            "Summary text that is long enough to be kept as description."
        );
    }

    #[test]
    fn test_fallback_description_from_container_text() {
        let html = r#"<html><body>
            <div class="news-item">
              <h3>Headline for fallback text</h3>
              <span>12-10-2024 Text after the title that is long enough to keep.</span>
            </div>
        </body></html>"#;
        let listing = run(html);
        assert_eq!(
            listing.records[0].description,
            "Text after the title that is long enough to keep."
        );
    }

    #[test]
    fn test_short_description_gets_placeholder() {
        let html = r#"<html><body>
            <div class="news-item"><h3>Headline without any body</h3><p>tiny</p></div>
        </body></html>"#;
        let listing = run(html);
        assert_eq!(listing.records[0].description, NO_DESCRIPTION);
    }

    #[test]
    fn test_short_topic_is_rejected() {
        let html = r#"<html><body>
            <div class="news-item"><h3>Hi</h3></div>
            <div class="news-item"><h3>A proper headline</h3></div>
        </body></html>"#;
        let listing = run(html);
        assert_eq!(listing.records.len(), 1);
        assert_eq!(listing.records[0].topic, "A proper headline");
    }

    #[test]
    fn test_primary_cap() {
        let items: String = (0..30)
            .map(|i| {
                format!(r#"<div class="news-item"><h3>Headline number {i:02} here</h3></div>"#)
            })
            .collect();
        let listing = run(&format!("<html><body>{items}</body></html>"));
        assert_eq!(listing.records.len(), 20);
    }

    #[test]
    fn test_seen_urls_skip_repeated_links() {
        let html = r#"<html><body>
            <div class="news-item"><a href="/n/1">Same story headline A</a></div>
            <div class="news-item"><a href="/n/1">Same story headline B</a></div>
        </body></html>"#;
        let listing = run(html);
        assert_eq!(listing.records.len(), 1);
        assert_eq!(listing.records[0].topic, "Same story headline A");
    }

    #[test]
    fn test_aggressive_pass() {
        let html = r#"<html><body>
            <section>
              <span class="headline-text">Aggressive pass headline text</span>
              <p>Paragraph near the heading that is long enough.</p>
              <img data-src="uploads/a.jpg">
              <a href="https://other.test/story">link</a>
            </section>
        </body></html>"#;
        let listing = run(html);
        assert_eq!(listing.records.len(), 1);
        let record = &listing.records[0];
        assert_eq!(record.topic, "Aggressive pass headline text");
        assert_eq!(
            record.description,
            "Paragraph near the heading that is long enough."
        );
        assert_eq!(record.image_url, format!("{ORIGIN}/uploads/a.jpg"));
        assert_eq!(record.article_url, "https://other.test/story");
    }

    #[test]
    fn test_nothing_found_reports_structure() {
        let html = r#"<html><head><title>Newsfirst</title></head><body><main><span>x</span></main><footer></footer></body></html>"#;
        let listing = run(html);
        assert!(listing.records.is_empty());
        assert_eq!(listing.debug.pageTitle.as_deref(), Some("Newsfirst"));
        assert_eq!(listing.debug.linksCount, Some(0));
        assert_eq!(listing.debug.imagesCount, Some(0));
        assert_eq!(
            listing.debug.bodyStructure,
            Some(vec!["MAIN".to_string(), "FOOTER".to_string()])
        );
    }

    #[test]
    fn test_variants_and_date() {
        let src = source(true);
        let settings = ExtractionSettings::default();
        let ctx = ExtractContext {
            origin: ORIGIN,
            source: &src,
            settings: &settings,
        };
        let html = r#"<html><body><article>
            <h2>Headline with sized image</h2>
            <time datetime="2024-10-12T08:00:00+05:30">12 Oct</time>
            <img src="/uploads/2024/10/flood-300x169.jpg">
        </article></body></html>"#;
        let listing = extract(html, &ctx, &mut SeenUrls::default());
        let record = &listing.records[0];
        assert_eq!(record.date, "2024-10-12T08:00:00+05:30");
        assert_eq!(
            record.images.news_detail_image.as_deref(),
            Some("https://sinhala.newsfirst.lk/uploads/2024/10/flood.jpg")
        );
    }

    #[test]
    fn test_strategy_order() {
        let names: Vec<_> = Strategy::all().map(|s| s.name()).collect();
        assert_eq!(names.first(), Some(&".news-item"));
        assert_eq!(names.last(), Some(&"aggressive"));
        assert_eq!(names.len(), CONTAINER_SELECTORS.len() + 1);
    }
}
