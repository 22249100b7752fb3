//! GeoIP resolver: turns a (style, url, selector) configuration into a
//! region/zone pair.
//!
//! Flow:  validity check → fetch → extractor for the style → pair
//! Every failure degrades to the unknown location; nothing here returns an
//! error or panics on bad input.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::dispatch::{self, Pending};
use super::extract::{extractor_for, FieldExtractor};
use super::fetch::{fetch_or_empty, Fetch, HttpFetcher};
use super::types::{HandlerKind, RawResult, ResultPair};

/// An immutable lookup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    kind: HandlerKind,
    url: String,
    selector: String,
}

impl Configuration {
    /// Build a configuration from settings strings. Unknown styles, and
    /// styles this build cannot parse, become [`HandlerKind::None`].
    pub fn new(implementation: &str, url: &str, selector: &str) -> Self {
        let kind = match HandlerKind::from_name(implementation) {
            Some(kind) if kind.is_supported() => kind,
            Some(kind) => {
                warn!(style = %kind, "GeoIP style is not supported in this build");
                HandlerKind::None
            }
            None => {
                warn!(style = implementation, "GeoIP style is not recognized");
                HandlerKind::None
            }
        };
        Self {
            kind,
            url: url.to_string(),
            selector: selector.to_string(),
        }
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// Resolves the configured lookup service.
///
/// Cloning is cheap and yields an independent snapshot; background queries
/// run on such a snapshot.
#[derive(Clone)]
pub struct Resolver {
    config: Configuration,
    fetcher: Arc<dyn Fetch>,
}

impl Resolver {
    pub fn new(implementation: &str, url: &str, selector: &str) -> Self {
        Self::with_fetcher(implementation, url, selector, Arc::new(HttpFetcher::new()))
    }

    /// Create a resolver with a specific fetcher (for testing or custom transports).
    pub fn with_fetcher(
        implementation: &str,
        url: &str,
        selector: &str,
        fetcher: Arc<dyn Fetch>,
    ) -> Self {
        Self::from_config(Configuration::new(implementation, url, selector), fetcher)
    }

    pub fn from_config(config: Configuration, fetcher: Arc<dyn Fetch>) -> Self {
        Self { config, fetcher }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn kind(&self) -> HandlerKind {
        self.config.kind
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn selector(&self) -> &str {
        &self.config.selector
    }

    /// A resolver with style `none` never touches the network.
    pub fn is_valid(&self) -> bool {
        self.config.kind != HandlerKind::None
    }

    /// Look up the location, blocking for one network round trip.
    pub fn get(&self) -> ResultPair {
        let Some(extractor) = self.extractor() else {
            return ResultPair::default();
        };
        let body = fetch_or_empty(self.fetcher.as_ref(), &self.config.url);
        let pair = extractor.extract(&body, &self.config.selector);
        debug!(style = %self.config.kind, url = %self.config.url, result = %pair, "GeoIP lookup finished");
        pair
    }

    /// [`get`](Self::get) on a background worker.
    pub fn query(&self) -> Pending<ResultPair> {
        let snapshot = self.clone();
        dispatch::offload(move || snapshot.get())
    }

    /// The unparsed response body, for diagnostics. Empty when the resolver
    /// is invalid or the fetch failed.
    pub fn get_raw(&self) -> RawResult {
        let Some(extractor) = self.extractor() else {
            return RawResult::new();
        };
        let body = fetch_or_empty(self.fetcher.as_ref(), &self.config.url);
        extractor.passthrough(&body)
    }

    /// [`get_raw`](Self::get_raw) on a background worker.
    pub fn query_raw(&self) -> Pending<RawResult> {
        let snapshot = self.clone();
        dispatch::offload(move || snapshot.get_raw())
    }

    fn extractor(&self) -> Option<&'static dyn FieldExtractor> {
        if !self.is_valid() {
            return None;
        }
        extractor_for(self.config.kind)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver").field("config", &self.config).finish_non_exhaustive()
    }
}
