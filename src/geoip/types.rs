//! Core types for the GeoIP subsystem.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which response format a lookup service speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    None,
    Json,
    Xml,
}

/// Configuration names, matched case-sensitively.
const HANDLER_NAMES: &[(&str, HandlerKind)] = &[
    ("none", HandlerKind::None),
    ("json", HandlerKind::Json),
    ("xml", HandlerKind::Xml),
];

impl HandlerKind {
    /// Look up a style name from configuration. Returns `None` for names
    /// outside the table.
    pub fn from_name(name: &str) -> Option<Self> {
        HANDLER_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, kind)| *kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Whether this build can parse responses of this kind.
    pub fn is_supported(self) -> bool {
        match self {
            Self::None | Self::Json => true,
            Self::Xml => cfg!(feature = "xml"),
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a lookup: a region such as "Europe" (or a country code) and a
/// zone such as "Amsterdam". Both absent means the location is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPair {
    pub region: Option<String>,
    pub zone: Option<String>,
}

impl ResultPair {
    pub fn new(region: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            zone: Some(zone.into()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.region.is_none() && self.zone.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.region.is_some() && self.zone.is_some()
    }

    /// The pair joined back into a timezone name, e.g. "Europe/Amsterdam".
    pub fn timezone(&self) -> Option<String> {
        match (&self.region, &self.zone) {
            (Some(region), Some(zone)) => Some(format!("{}/{}", region, zone)),
            _ => None,
        }
    }

    /// The joined timezone, if it names a zone in the IANA database.
    pub fn tz(&self) -> Option<Tz> {
        self.timezone()?.parse().ok()
    }
}

impl fmt::Display for ResultPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.region, &self.zone) {
            (None, None) => write!(f, "unknown"),
            (region, zone) => write!(
                f,
                "{} / {}",
                region.as_deref().unwrap_or("?"),
                zone.as_deref().unwrap_or("?")
            ),
        }
    }
}

/// Unparsed response body, for diagnostics.
pub type RawResult = String;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_case_sensitive() {
        assert_eq!(HandlerKind::from_name("none"), Some(HandlerKind::None));
        assert_eq!(HandlerKind::from_name("json"), Some(HandlerKind::Json));
        assert_eq!(HandlerKind::from_name("xml"), Some(HandlerKind::Xml));
        assert_eq!(HandlerKind::from_name("JSON"), None);
        assert_eq!(HandlerKind::from_name("bogus"), None);
        assert_eq!(HandlerKind::from_name(""), None);
    }

    #[test]
    fn test_name_round_trips_through_table() {
        for kind in [HandlerKind::None, HandlerKind::Json, HandlerKind::Xml] {
            assert_eq!(HandlerKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_xml_support_follows_feature() {
        assert!(HandlerKind::Json.is_supported());
        assert_eq!(HandlerKind::Xml.is_supported(), cfg!(feature = "xml"));
    }

    #[test]
    fn test_empty_pair_is_unknown() {
        let pair = ResultPair::default();
        assert!(pair.is_unknown());
        assert!(!pair.is_complete());
        assert_eq!(pair.timezone(), None);
        assert_eq!(pair.to_string(), "unknown");
    }

    #[test]
    fn test_timezone_join_and_validate() {
        let pair = ResultPair::new("Europe", "Amsterdam");
        assert_eq!(pair.timezone().as_deref(), Some("Europe/Amsterdam"));
        assert_eq!(pair.tz(), Some(chrono_tz::Europe::Amsterdam));

        let nested = ResultPair::new("America", "Argentina/Cordoba");
        assert_eq!(nested.tz().map(|tz| tz.name()), Some("America/Argentina/Cordoba"));

        // A country code is a valid region but not a zone name.
        assert_eq!(ResultPair::new("NL", "Europe/Amsterdam").tz(), None);
    }

    #[test]
    fn test_partial_display() {
        let pair = ResultPair { region: Some("NL".into()), zone: None };
        assert!(!pair.is_unknown());
        assert_eq!(pair.to_string(), "NL / ?");
    }
}
