//! Reads the MTA `serviceStatus` document.
//!
//! The feed does not keep a stable element order inside `<line>` entries, so
//! entries are deserialized by field name rather than position. Sections other
//! than `<subway>` (bus, rail, timestamps) are skipped.

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::warn;

use crate::error::FeedError;
use crate::models::LineStatusEntry;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Deserialize)]
struct ServiceDocument {
    #[serde(default)]
    subway: Option<SubwaySection>,
}

#[derive(Debug, Deserialize)]
struct SubwaySection {
    #[serde(rename = "line", default)]
    lines: Vec<RawLine>,
}

#[derive(Debug, Deserialize)]
struct RawLine {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "Date", default)]
    date: Option<String>,
    #[serde(rename = "Time", default)]
    time: Option<String>,
}

/// Parse the raw feed body into subway line entries, in document order.
pub fn parse_feed(body: &str) -> Result<Vec<LineStatusEntry>, FeedError> {
    let document: ServiceDocument = quick_xml::de::from_str(body)?;

    let raw_lines = document.subway.map(|s| s.lines).unwrap_or_default();

    let entries: Vec<LineStatusEntry> = raw_lines
        .into_iter()
        .filter_map(|raw| {
            let line_id = raw.name.trim().to_string();
            if line_id.is_empty() {
                warn!(status = %raw.status, "skipping feed entry without a line name");
                return None;
            }

            let status_text = raw.status.trim().to_ascii_uppercase();
            if status_text.is_empty() {
                warn!(line = %line_id, "skipping feed entry without a status");
                return None;
            }

            Some(LineStatusEntry {
                line_id,
                status_text,
                detail_text: raw.text.as_deref().and_then(plain_text),
                posted: posted_at(raw.date.as_deref(), raw.time.as_deref()),
            })
        })
        .collect();

    if entries.is_empty() {
        return Err(FeedError::Empty);
    }

    Ok(entries)
}

/// Strip the HTML the feed embeds in detail text and collapse whitespace
fn plain_text(html: &str) -> Option<String> {
    let stripped = TAG.replace_all(html, " ");
    // A stray `&` is not an entity; keep the text as written
    let decoded = unescape_with(&stripped, resolve_html5_entity)
        .unwrap_or(Cow::Borrowed(stripped.as_ref()));
    let text = WHITESPACE.replace_all(decoded.trim(), " ").into_owned();

    (!text.is_empty()).then_some(text)
}

fn posted_at(date: Option<&str>, time: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [date, time]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join(" "))
}
