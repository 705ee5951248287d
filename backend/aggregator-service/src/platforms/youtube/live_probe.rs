//! Live detection by scraping a channel's `/live` page
//!
//! `youtube.com/channel/{id}/live` serves the current broadcast when one is
//! running, and its `<link rel="canonical">` then points at `/watch?v={id}`.
//! This costs no Data API quota, unlike `search.list`.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static CANONICAL_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"link[rel="canonical"]"#).expect("valid selector"));

/// `href` of the first canonical link in `html`.
pub fn canonical_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&CANONICAL_LINK)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(str::to_string)
}

/// Video id from a `/watch?v=` canonical URL; `None` for channel URLs.
pub fn live_video_id(canonical: &str) -> Option<String> {
    if !canonical.contains("/watch?v=") {
        return None;
    }
    canonical
        .split_once('=')
        .map(|(_, rest)| rest.split('&').next().unwrap_or(rest))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
