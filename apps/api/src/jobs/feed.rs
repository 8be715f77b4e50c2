//! Feed client: fetches RSS 2.0 / Atom feeds and flattens their entries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use scraper::Html;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const FETCH_TIMEOUT_SECS: u64 = 10;
pub const MAX_ENTRIES_PER_FEED: usize = 10;
pub const MAX_ENTRIES_TOTAL: usize = 20;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// One job entry from a feed. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: String,
    pub source: String,
}

impl FeedEntry {
    /// `published` as a timestamp (RFC 2822 for RSS, RFC 3339 for Atom).
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.published.trim();
        DateTime::parse_from_rfc2822(raw)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    /// Case-insensitive substring match of any keyword against title or summary.
    /// An empty keyword list matches everything.
    pub fn matches_any(&self, keywords: &[String]) -> bool {
        if keywords.is_empty() {
            return true;
        }
        let haystack = format!("{} {}", self.title, self.summary).to_lowercase();
        keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// Splits a comma separated keyword field. Entries are trimmed and case-folded;
/// multi-word entries stay whole.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// The link itself when it is an absolute `http`/`https` URL, otherwise empty.
pub fn web_link(raw: &str) -> String {
    let link = raw.trim();
    let scheme = link.split_once("://").map(|(scheme, _)| scheme.to_ascii_lowercase());
    match scheme.as_deref() {
        Some("http") | Some("https") => link.to_string(),
        _ => String::new(),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Link,
    Published,
    Updated,
    Summary,
    Content,
}

#[derive(Default)]
struct EntryBuilder {
    title: String,
    link: String,
    published: String,
    updated: String,
    summary: String,
    content: String,
}

impl EntryBuilder {
    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
        }
    }

    fn finish(self, source: &str) -> FeedEntry {
        let published = if self.published.is_empty() { self.updated } else { self.published };
        let summary = if self.summary.is_empty() { self.content } else { self.summary };
        FeedEntry {
            title: self.title.trim().to_string(),
            link: web_link(&self.link),
            published: published.trim().to_string(),
            summary: clean_markup(&summary),
            source: source.to_string(),
        }
    }
}

fn field_for(local_name: &[u8]) -> Option<Field> {
    match local_name {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"pubDate" | b"published" => Some(Field::Published),
        b"updated" | b"date" => Some(Field::Updated),
        b"description" | b"summary" => Some(Field::Summary),
        b"content" | b"encoded" => Some(Field::Content),
        _ => None,
    }
}

fn is_entry(local_name: &[u8]) -> bool {
    matches!(local_name, b"item" | b"entry")
}

/// Atom `<link href>`; only alternate (or unqualified) links count.
fn atom_href(e: &BytesStart<'_>) -> Option<String> {
    let mut href = None;
    let mut rel_ok = true;
    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value),
            b"rel" => rel_ok = value == "alternate",
            _ => {}
        }
    }
    href.filter(|h| rel_ok && !h.is_empty())
}

fn decode_text(e: &BytesText<'_>) -> String {
    e.unescape()
        .map(|t| t.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(e).into_owned())
}

/// Parses RSS `<item>` and Atom `<entry>` elements. Namespaced tags match by local name.
pub fn parse_feed(xml: &str, source: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let name = e.local_name();
                if is_entry(name.as_ref()) {
                    current = Some(EntryBuilder::default());
                    field = None;
                } else if let Some(entry) = current.as_mut() {
                    if let Some(f) = field_for(name.as_ref()) {
                        field = Some(f);
                        if f == Field::Link && entry.link.is_empty() {
                            if let Some(href) = atom_href(e) {
                                entry.link = href;
                            }
                        }
                    }
                }
            }
            Event::Empty(ref e) => {
                if let Some(entry) = current.as_mut() {
                    if e.local_name().as_ref() == b"link" && entry.link.is_empty() {
                        if let Some(href) = atom_href(e) {
                            entry.link = href;
                        }
                    }
                }
            }
            Event::Text(ref e) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let text = decode_text(e);
                    let target = entry.field_mut(f);
                    // Atom links already filled from href
                    if f != Field::Link || target.is_empty() {
                        target.push_str(&text);
                    }
                }
            }
            Event::CData(e) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    entry
                        .field_mut(f)
                        .push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(ref e) => {
                let name = e.local_name();
                if is_entry(name.as_ref()) {
                    if let Some(entry) = current.take() {
                        entries.push(entry.finish(source));
                    }
                    field = None;
                } else if field_for(name.as_ref()).is_some() {
                    field = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

/// Plain text of an HTML summary, whitespace collapsed. Plain-text summaries pass through.
fn clean_markup(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fetches and parses one feed, keeping at most `limit` entries.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    limit: usize,
) -> Result<Vec<FeedEntry>, FeedError> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    let mut entries = parse_feed(&body, url)?;
    entries.truncate(limit);
    Ok(entries)
}

/// Fetches every feed in order. Failing feeds are logged and skipped.
pub async fn fetch_all(client: &reqwest::Client, urls: &[String]) -> Vec<FeedEntry> {
    let mut all = Vec::new();
    for url in urls {
        match fetch_feed(client, url, MAX_ENTRIES_PER_FEED).await {
            Ok(entries) => {
                info!("Fetched {} entries from {url}", entries.len());
                all.extend(entries);
            }
            Err(e) => warn!("Failed to fetch {url}: {e}"),
        }
        if all.len() >= MAX_ENTRIES_TOTAL {
            break;
        }
    }
    all.truncate(MAX_ENTRIES_TOTAL);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Remote Jobs</title>
    <link>https://jobs.example.com</link>
    <atom:link href="https://jobs.example.com/feed" rel="self"/>
    <item>
      <title>Python Developer</title>
      <link>https://jobs.example.com/1</link>
      <pubDate>Tue, 10 Sep 2024 12:00:00 +0000</pubDate>
      <description><![CDATA[<p>Looking for an experienced <b>Python</b> developer with FastAPI.</p>]]></description>
    </item>
    <item>
      <title>Backend Engineer &amp; SRE</title>
      <link>https://jobs.example.com/2</link>
      <dc:date>2024-09-11T08:30:00Z</dc:date>
      <description>Build scalable backend systems&lt;br/&gt;in Rust.</description>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Who is hiring</title>
  <link href="https://hn.example.com/" rel="self"/>
  <entry>
    <title type="html">Platform Engineer</title>
    <link rel="edit" href="https://hn.example.com/edit/9"/>
    <link href="https://hn.example.com/item/9"/>
    <published>2024-09-12T10:00:00Z</published>
    <updated>2024-09-13T10:00:00Z</updated>
    <content type="html">Kubernetes &amp;amp; Terraform</content>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_items() {
        let entries = parse_feed(RSS, "https://jobs.example.com/feed").unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].title, "Python Developer");
        assert_eq!(entries[0].link, "https://jobs.example.com/1");
        assert_eq!(entries[0].published, "Tue, 10 Sep 2024 12:00:00 +0000");
        assert_eq!(
            entries[0].summary,
            "Looking for an experienced Python developer with FastAPI."
        );
        assert_eq!(entries[0].source, "https://jobs.example.com/feed");

        assert_eq!(entries[1].title, "Backend Engineer & SRE");
        assert_eq!(entries[1].published, "2024-09-11T08:30:00Z");
        assert_eq!(entries[1].summary, "Build scalable backend systems in Rust.");
    }

    #[test]
    fn test_channel_metadata_is_not_an_entry() {
        let entries = parse_feed(RSS, "src").unwrap();
        assert!(entries.iter().all(|e| e.title != "Remote Jobs"));
    }

    #[test]
    fn test_parse_atom_entries() {
        let entries = parse_feed(ATOM, "atom").unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title, "Platform Engineer");
        assert_eq!(entry.link, "https://hn.example.com/item/9");
        assert_eq!(entry.published, "2024-09-12T10:00:00Z");
        assert_eq!(entry.summary, "Kubernetes & Terraform");
    }

    #[test]
    fn test_published_at_parses_both_formats() {
        let entries = parse_feed(RSS, "src").unwrap();
        assert!(entries[0].published_at().is_some());
        assert!(entries[1].published_at().is_some());
        let undated = FeedEntry::default();
        assert!(undated.published_at().is_none());
    }

    #[test]
    fn test_malformed_feed_is_an_error() {
        assert!(parse_feed("<rss><channel><item><title>x</item></rss>", "bad").is_err());
    }

    #[test]
    fn test_non_feed_document_yields_nothing() {
        let entries = parse_feed("<html><body>hello</body></html>", "html").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_keyword_filter() {
        let entries = parse_feed(RSS, "src").unwrap();
        let rust = parse_keywords("Rust");
        let hits: Vec<_> = entries.iter().filter(|e| e.matches_any(&rust)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Backend Engineer & SRE");
        assert!(entries.iter().all(|e| e.matches_any(&parse_keywords("  "))));
    }

    #[test]
    fn test_parse_keywords_splits_on_commas_only() {
        assert_eq!(
            parse_keywords(" Python, Machine Learning ,,remote"),
            vec!["python", "machine learning", "remote"]
        );
        let operator = FeedEntry {
            title: "Machine Operator".into(),
            ..Default::default()
        };
        assert!(!operator.matches_any(&parse_keywords("machine learning")));
    }

    #[test]
    fn test_escaped_angle_brackets_survive_in_plain_text() {
        let xml = r#"<rss><channel><item>
  <title>Analyst</title>
  <description>Salary &lt; 100k, team of 5 &gt; growing</description>
</item></channel></rss>"#;
        let entries = parse_feed(xml, "src").unwrap();
        assert_eq!(entries[0].summary, "Salary < 100k, team of 5 > growing");
    }

    #[test]
    fn test_non_web_links_are_dropped() {
        let xml = r#"<rss><channel><item>
  <title>Totally legit job</title>
  <link>javascript:alert(document.cookie)</link>
</item></channel></rss>"#;
        let entries = parse_feed(xml, "src").unwrap();
        assert_eq!(entries[0].link, "");

        assert_eq!(web_link(" HTTPS://jobs.example.com/1 "), "HTTPS://jobs.example.com/1");
        assert_eq!(web_link("data:text/html,<script>"), "");
        assert_eq!(web_link("/relative/path"), "");
    }
}
