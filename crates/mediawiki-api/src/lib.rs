//! MediaWiki API client library.
//!
//! This library searches a MediaWiki wiki (Wikipedia by default) and loads
//! articles from it: summaries, plain text content, images, links,
//! categories, coordinates, sections and more. It validates language
//! prefixes, rate limits requests on demand and memoizes search results.
//!
//! ```no_run
//! use mediawiki_api::{MediaWikiClient, PageOptions};
//! use shared::MediaWikiConfig;
//!
//! # async fn run() -> mediawiki_api::Result<()> {
//! let client = MediaWikiClient::connect(&MediaWikiConfig::default()).await?;
//! let titles = client.search("Barack Obama", 10).await?;
//! let page = client.page(&titles[0], PageOptions::default()).await?;
//! println!("{}", page.summary().await?);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod continuation;
pub mod error;
pub mod html;
pub mod language;
pub mod page;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{HttpTransport, QueryParams, Transport, WikiRequest};
pub use cache::MemoCache;
pub use client::{GeoQuery, MediaWikiClient, PageOptions, SearchResults, SummaryOptions, DONATE_URL};
pub use error::{PageKey, Result, WikiError};
pub use language::{Language, LanguageRegistry};
pub use page::{Coordinates, WikipediaPage};
pub use resolver::{PageIdentity, ResolveOptions};
