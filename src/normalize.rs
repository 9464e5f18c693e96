use chrono::{DateTime, Utc};

/// Rendered-date format, whole-second granularity.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One canonical item, regardless of which fields the source feed
/// bothered to populate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: String,
    pub link: String,
    /// HTML-bearing body, passed through unsanitized
    pub content: String,
    pub date: String,
    /// Epoch seconds, the sort key
    pub timestamp: i64,
    /// Feed title, or the feed URL when the feed doesn't declare one
    pub source: String,
}

/// Map one raw feed entry into a canonical [`Entry`].
///
/// Never fails: feeds in the wild omit any subset of fields, so every
/// ambiguity resolves through a fixed precedence chain instead of an
/// error.
///
/// - date: `published`, else `updated`, else the current wall clock.
///   Stored both formatted (UTC calendar fields) and as epoch seconds.
/// - content: the content body, else the summary/description, else empty.
/// - title/link: verbatim, else empty.
/// - source: the feed's declared title, else the feed URL.
pub fn normalize_entry(
    raw: feed_rs::model::Entry,
    feed_title: Option<&str>,
    feed_url: &str,
) -> Entry {
    let resolved: DateTime<Utc> = raw.published.or(raw.updated).unwrap_or_else(Utc::now);
    let timestamp = resolved.timestamp();
    let date = resolved.format(DATE_FORMAT).to_string();

    let content = raw
        .content
        .and_then(|c| c.body)
        .or_else(|| raw.summary.map(|s| s.content))
        .unwrap_or_default();

    let title = raw.title.map(|t| t.content).unwrap_or_default();
    let link = raw
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();

    let source = match feed_title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => feed_url.to_string(),
    };

    Entry {
        title,
        link,
        content,
        date,
        timestamp,
        source,
    }
}
