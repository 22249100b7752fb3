//! GeoIP subsystem.
//!
//! Resolves the machine's approximate timezone by asking a lookup service
//! and extracting a region/zone pair from its JSON or XML response.

pub mod dispatch;
pub mod extract;
pub mod fetch;
pub mod resolver;
pub mod settings;
pub mod types;

pub use dispatch::Pending;
pub use extract::{extractor_for, split_timezone, ExtractError, FieldExtractor, JsonExtractor};
#[cfg(feature = "xml")]
pub use extract::XmlExtractor;
pub use fetch::{fetch_or_empty, Fetch, FetchError, HttpFetcher};
pub use resolver::{Configuration, Resolver};
pub use settings::{GeoIpSettings, SettingsError};
pub use types::{HandlerKind, RawResult, ResultPair};
