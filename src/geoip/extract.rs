//! Field extractors: find the region and zone inside a response body.
//!
//! A selector is either a single locator pointing at a timezone name such as
//! `Europe/Amsterdam`, which is split into region and zone, or two locators
//! separated by a comma (`country,timezone`) naming the region and zone
//! fields directly. An empty selector means the format's default locator.

use super::types::{HandlerKind, ResultPair};
use thiserror::Error;
use tracing::debug;

/// Why a body could not be turned into a region/zone pair.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("empty response body")]
    Empty,

    #[error("malformed {format} body: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },
}

/// A format-specific strategy for locating the two fields.
pub trait FieldExtractor: Send + Sync {
    /// Parse `body` and locate the fields named by `selector`.
    fn try_extract(&self, body: &[u8], selector: &str) -> Result<ResultPair, ExtractError>;

    /// Like [`try_extract`](Self::try_extract), but any failure yields the
    /// unknown location.
    fn extract(&self, body: &[u8], selector: &str) -> ResultPair {
        self.try_extract(body, selector).unwrap_or_else(|e| {
            debug!(error = %e, selector, "GeoIP response not usable");
            ResultPair::default()
        })
    }

    /// The body as text, best effort.
    fn passthrough(&self, body: &[u8]) -> String {
        String::from_utf8_lossy(body).into_owned()
    }
}

/// The extractor for `kind`, if this build has one.
pub fn extractor_for(kind: HandlerKind) -> Option<&'static dyn FieldExtractor> {
    match kind {
        HandlerKind::None => None,
        HandlerKind::Json => Some(&JsonExtractor),
        #[cfg(feature = "xml")]
        HandlerKind::Xml => Some(&XmlExtractor),
        #[cfg(not(feature = "xml"))]
        HandlerKind::Xml => None,
    }
}

// ─── Selector handling ──────────────────────────────────────────

enum Selector<'a> {
    Timezone(&'a str),
    Fields { region: &'a str, zone: &'a str },
}

fn parse_selector<'a>(selector: &'a str, default: &'a str) -> Selector<'a> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Selector::Timezone(default);
    }
    match selector.split_once(',') {
        Some((region, zone)) => Selector::Fields {
            region: region.trim(),
            zone: zone.trim(),
        },
        None => Selector::Timezone(selector),
    }
}

/// Split "Europe/Amsterdam" into ("Europe", "Amsterdam"). Components after
/// the first stay together: "America/Argentina/Cordoba" has zone
/// "Argentina/Cordoba". Anything with fewer than two parts is unknown.
pub fn split_timezone(name: &str) -> ResultPair {
    let cleaned = name.trim().replace('\\', "");
    let mut parts = cleaned.split('/').filter(|p| !p.is_empty());
    match (parts.next(), parts.next()) {
        (Some(region), Some(first)) => {
            let zone = std::iter::once(first).chain(parts).collect::<Vec<_>>().join("/");
            ResultPair::new(region, zone)
        }
        _ => ResultPair::default(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn resolve_selector(selector: Selector<'_>, lookup: impl Fn(&str) -> Option<String>) -> ResultPair {
    match selector {
        Selector::Timezone(locator) => non_empty(lookup(locator))
            .map(|tz| split_timezone(&tz))
            .unwrap_or_default(),
        Selector::Fields { region, zone } => ResultPair {
            region: non_empty(lookup(region)),
            zone: non_empty(lookup(zone)),
        },
    }
}

// ─── JSON ───────────────────────────────────────────────────────

/// JSON responses. Locators are dotted key paths; numeric segments index
/// arrays (`results.0.timezone`).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

const JSON_DEFAULT_SELECTOR: &str = "time_zone";

fn json_lookup(root: &serde_json::Value, path: &str) -> Option<String> {
    let mut node = root;
    for segment in path.split('.') {
        node = match node {
            serde_json::Value::Object(map) => map.get(segment)?,
            serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match node {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl FieldExtractor for JsonExtractor {
    fn try_extract(&self, body: &[u8], selector: &str) -> Result<ResultPair, ExtractError> {
        if body.is_empty() {
            return Err(ExtractError::Empty);
        }
        let root: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| ExtractError::Malformed {
                format: "JSON",
                message: e.to_string(),
            })?;
        let selector = parse_selector(selector, JSON_DEFAULT_SELECTOR);
        Ok(resolve_selector(selector, |path| json_lookup(&root, path)))
    }
}

// ─── XML ────────────────────────────────────────────────────────

/// XML responses. Locators are element names; the first element of that
/// name with non-empty text is used.
#[cfg(feature = "xml")]
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlExtractor;

#[cfg(feature = "xml")]
const XML_DEFAULT_SELECTOR: &str = "TimeZone";

#[cfg(feature = "xml")]
fn xml_lookup(doc: &roxmltree::Document<'_>, tag: &str) -> Option<String> {
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == tag)
        .filter_map(|n| n.text())
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(feature = "xml")]
impl FieldExtractor for XmlExtractor {
    fn try_extract(&self, body: &[u8], selector: &str) -> Result<ResultPair, ExtractError> {
        if body.is_empty() {
            return Err(ExtractError::Empty);
        }
        let malformed = |message: String| ExtractError::Malformed {
            format: "XML",
            message,
        };
        let text = std::str::from_utf8(body).map_err(|e| malformed(e.to_string()))?;
        let doc = roxmltree::Document::parse(text).map_err(|e| malformed(e.to_string()))?;
        let selector = parse_selector(selector, XML_DEFAULT_SELECTOR);
        Ok(resolve_selector(selector, |tag| xml_lookup(&doc, tag)))
    }
}
