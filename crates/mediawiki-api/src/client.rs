//! MediaWiki client facade.
//!
//! [`MediaWikiClient`] owns one endpoint configuration (language, user agent,
//! rate limit) and the memo caches of its language-dependent operations.
//! Independent clients share nothing.

use crate::api::types::{
    page_entry, parse_response, query_object, str_field, GeoSearchQuery, QueryResponse,
    RandomQuery, SearchQuery, MISSING_PAGE_KEY,
};
use crate::api::{check_response, HttpTransport, QueryParams, Transport, WikiRequest};
use crate::cache::MemoCache;
use crate::error::{PageKey, Result, WikiError};
use crate::language::{Language, LanguageRegistry};
use crate::page::WikipediaPage;
use crate::resolver::{resolve, ResolveOptions};
use shared::MediaWikiConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Wikimedia fundraising landing page
pub const DONATE_URL: &str =
    "https://donate.wikimedia.org/w/index.php?title=Special:FundraiserLandingPage";

/// Search result titles plus the API's spelling suggestion, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub titles: Vec<String>,
    pub suggestion: Option<String>,
}

/// Parameters of a coordinate search
#[derive(Debug, Clone, PartialEq)]
pub struct GeoQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Restrict the search to this article
    pub title: Option<String>,
    /// Maximum number of results
    pub results: u32,
    /// Search radius in meters, between 10 and 10000
    pub radius: u32,
}

impl GeoQuery {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            title: None,
            results: 10,
            radius: 1000,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn results(mut self, results: u32) -> Self {
        self.results = results;
        self
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    fn coordinates(&self) -> String {
        format!("{}|{}", self.latitude, self.longitude)
    }
}

/// How `summary` picks the page and trims its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SummaryOptions {
    /// Return only the first `n` sentences (at most 10)
    pub sentences: Option<u32>,
    /// Return roughly the first `n` characters; ignored when `sentences` is set
    pub chars: Option<u32>,
    pub auto_suggest: bool,
    pub redirect: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            sentences: None,
            chars: None,
            auto_suggest: true,
            redirect: true,
        }
    }
}

/// How `page` and `page_by_id` resolve their target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    /// Replace the title with the search suggestion or first search hit
    pub auto_suggest: bool,
    /// Follow redirects instead of failing
    pub redirect: bool,
    /// Load content, summary, images, references, links and sections eagerly
    pub preload: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            auto_suggest: true,
            redirect: true,
            preload: false,
        }
    }
}

type SearchKey = (Language, String, u32, bool);
type GeoKey = (Language, u64, u64, Option<String>, u32, u32);
type SuggestKey = (Language, String);
type SummaryKey = (Language, String, SummaryOptions);

/// Entry point for all MediaWiki operations
pub struct MediaWikiClient {
    request: Arc<WikiRequest>,
    registry: Arc<LanguageRegistry>,
    language: RwLock<Language>,
    max_redirects: u32,

    search_cache: MemoCache<SearchKey, SearchResults>,
    geosearch_cache: MemoCache<GeoKey, Vec<String>>,
    suggest_cache: MemoCache<SuggestKey, Option<String>>,
    summary_cache: MemoCache<SummaryKey, String>,
}

impl MediaWikiClient {
    /// Create a client that talks to the configured endpoint over HTTP
    pub async fn connect(config: &MediaWikiConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport)).await
    }

    /// Create a client over any [`Transport`]
    ///
    /// Loads the language registry once and validates the configured language.
    pub async fn with_transport(
        config: &MediaWikiConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let request = Arc::new(WikiRequest::new(
            transport,
            config.api_url.clone(),
            config.user_agent.clone(),
            config.rate_limit.min_wait(),
        ));

        let registry = LanguageRegistry::load(&request).await?;
        let language = registry.validate(&config.language)?;

        info!(
            language = %language,
            rate_limited = config.rate_limit.enabled,
            memoize = config.memoize,
            "MediaWiki client ready"
        );

        Ok(Self {
            request,
            registry: Arc::new(registry),
            language: RwLock::new(language),
            max_redirects: config.max_redirects,
            search_cache: MemoCache::new("search", config.memoize),
            geosearch_cache: MemoCache::new("geosearch", config.memoize),
            suggest_cache: MemoCache::new("suggest", config.memoize),
            summary_cache: MemoCache::new("summary", config.memoize),
        })
    }

    /// The active language
    pub async fn language(&self) -> Language {
        self.language.read().await.clone()
    }

    /// Switch to another language wiki
    ///
    /// Memoized results of the previous language are dropped.
    pub async fn set_language(&self, code: &str) -> Result<Language> {
        let language = self.registry.validate(code)?;

        {
            let mut current = self.language.write().await;
            if *current == language {
                return Ok(language);
            }
            *current = language.clone();
        }

        self.search_cache.clear().await;
        self.geosearch_cache.clear().await;
        self.suggest_cache.clear().await;
        self.summary_cache.clear().await;

        info!(language = %language, "Language changed");

        Ok(language)
    }

    pub async fn user_agent(&self) -> String {
        self.request.user_agent().await
    }

    pub async fn set_user_agent(&self, user_agent: impl Into<String>) {
        self.request.set_user_agent(user_agent).await;
    }

    /// Enable or disable waiting `min_wait` between consecutive requests
    pub async fn set_rate_limiting(&self, enabled: bool, min_wait: Duration) {
        let min_wait = enabled.then_some(min_wait);
        self.request.set_rate_limit(min_wait).await;

        info!(enabled = enabled, min_wait_ms = ?min_wait.map(|w| w.as_millis()), "Rate limiting updated");
    }

    /// Minimum wait between requests, `None` when rate limiting is off
    pub async fn rate_limit(&self) -> Option<Duration> {
        self.request.rate_limit().await
    }

    /// Titles matching `query`, at most `results` of them
    pub async fn search(&self, query: &str, results: u32) -> Result<Vec<String>> {
        Ok(self.run_search(query, results, false).await?.titles)
    }

    /// Like [`search`](Self::search), also returning the spelling suggestion
    pub async fn search_with_suggestion(
        &self,
        query: &str,
        results: u32,
    ) -> Result<SearchResults> {
        self.run_search(query, results, true).await
    }

    async fn run_search(&self, query: &str, results: u32, suggestion: bool) -> Result<SearchResults> {
        let language = self.language().await;
        let key = (language.clone(), query.to_string(), results, suggestion);

        self.search_cache
            .get_or_try_insert_with(key, || async {
                let mut params = QueryParams::new()
                    .set("list", "search")
                    .set("srprop", "")
                    .set("srlimit", results)
                    .set("limit", results)
                    .set("srsearch", query);
                if suggestion {
                    params.insert("srinfo", "suggestion");
                }

                let response = self.request.send(&language, params).await?;
                let parsed: QueryResponse<SearchQuery> = parse_response(response, query)?;

                Ok(SearchResults {
                    titles: parsed.query.search.into_iter().map(|hit| hit.title).collect(),
                    suggestion: parsed.query.searchinfo.and_then(|info| info.suggestion),
                })
            })
            .await
    }

    /// Titles of articles near a coordinate
    pub async fn geosearch(&self, query: &GeoQuery) -> Result<Vec<String>> {
        let language = self.language().await;
        let key = (
            language.clone(),
            query.latitude.to_bits(),
            query.longitude.to_bits(),
            query.title.clone(),
            query.results,
            query.radius,
        );

        self.geosearch_cache
            .get_or_try_insert_with(key, || async {
                let coordinates = query.coordinates();
                let mut params = QueryParams::new()
                    .set("list", "geosearch")
                    .set("gsradius", query.radius)
                    .set("gscoord", &coordinates)
                    .set("gslimit", query.results);
                if let Some(title) = &query.title {
                    params.insert("titles", title);
                }

                let response = self.request.send(&language, params).await?;
                let parsed: QueryResponse<GeoSearchQuery> = parse_response(response, &coordinates)?;

                let titles = match parsed.query.pages {
                    Some(pages) if !pages.is_empty() => pages
                        .iter()
                        .filter(|(key, _)| key.as_str() != MISSING_PAGE_KEY)
                        .map(|(_, page)| str_field(page, "title").map(str::to_string))
                        .collect::<Result<Vec<_>>>()?,
                    _ => parsed
                        .query
                        .geosearch
                        .into_iter()
                        .map(|hit| hit.title)
                        .collect(),
                };

                Ok(titles)
            })
            .await
    }

    /// The API's spelling suggestion for `query`, if it has one
    pub async fn suggest(&self, query: &str) -> Result<Option<String>> {
        let language = self.language().await;
        let key = (language.clone(), query.to_string());

        self.suggest_cache
            .get_or_try_insert_with(key, || async {
                let params = QueryParams::new()
                    .set("list", "search")
                    .set("srinfo", "suggestion")
                    .set("srprop", "")
                    .set("srsearch", query);

                let response = self.request.send(&language, params).await?;
                let parsed: QueryResponse<SearchQuery> = parse_response(response, query)?;

                Ok(parsed.query.searchinfo.and_then(|info| info.suggestion))
            })
            .await
    }

    /// Titles of `pages` random articles from the main namespace
    pub async fn random(&self, pages: u32) -> Result<Vec<String>> {
        let language = self.language().await;
        let params = QueryParams::new()
            .set("list", "random")
            .set("rnnamespace", 0)
            .set("rnlimit", pages);

        let response = self.request.send(&language, params).await?;
        let parsed: QueryResponse<RandomQuery> = parse_response(response, "random")?;

        Ok(parsed.query.random.into_iter().map(|page| page.title).collect())
    }

    /// Plain text summary of the article best matching `title`
    pub async fn summary(&self, title: &str, options: SummaryOptions) -> Result<String> {
        let language = self.language().await;
        let key = (language.clone(), title.to_string(), options);

        self.summary_cache
            .get_or_try_insert_with(key, || async {
                let page = self
                    .page(
                        title,
                        PageOptions {
                            auto_suggest: options.auto_suggest,
                            redirect: options.redirect,
                            preload: false,
                        },
                    )
                    .await?;

                let mut params = QueryParams::new()
                    .set("prop", "extracts")
                    .flag("explaintext")
                    .set("pageids", page.pageid());
                match (options.sentences, options.chars) {
                    (Some(sentences), _) if sentences > 0 => params.insert("exsentences", sentences),
                    (_, Some(chars)) if chars > 0 => params.insert("exchars", chars),
                    _ => params.insert("exintro", ""),
                }

                let response = self.request.send(&language, params).await?;
                check_response(&response, title)?;

                let entry = page_entry(query_object(&response)?, page.pageid())?;
                Ok(str_field(entry, "extract")?.to_string())
            })
            .await
    }

    /// Resolve `title` to a page
    ///
    /// With auto-suggest the title is first replaced by the search
    /// suggestion or the first search hit, so the returned page may differ
    /// from the exact title asked for.
    pub async fn page(&self, title: &str, options: PageOptions) -> Result<WikipediaPage> {
        let title = if options.auto_suggest {
            self.suggested_title(title).await?
        } else {
            title.to_string()
        };

        self.open(PageKey::Title(title), options).await
    }

    /// Resolve a page by its numeric id
    pub async fn page_by_id(&self, pageid: u64, options: PageOptions) -> Result<WikipediaPage> {
        self.open(PageKey::PageId(pageid), options).await
    }

    async fn suggested_title(&self, title: &str) -> Result<String> {
        let results = self.search_with_suggestion(title, 1).await?;

        let suggested = results
            .suggestion
            .or_else(|| results.titles.into_iter().next())
            .ok_or_else(|| WikiError::PageNotFound(PageKey::Title(title.to_string())))?;

        if suggested != title {
            debug!(requested = title, suggested = %suggested, "Using suggested title");
        }

        Ok(suggested)
    }

    async fn open(&self, target: PageKey, options: PageOptions) -> Result<WikipediaPage> {
        let language = self.language().await;
        let identity = resolve(
            &self.request,
            &language,
            target,
            ResolveOptions {
                follow_redirects: options.redirect,
                max_redirects: self.max_redirects,
            },
        )
        .await?;

        let page = WikipediaPage::new(
            Arc::clone(&self.request),
            Arc::clone(&self.registry),
            language,
            identity,
        );

        if options.preload {
            page.preload().await?;
        }

        Ok(page)
    }

    /// Every language prefix the wiki serves, with its local name
    pub fn languages(&self) -> &BTreeMap<String, String> {
        self.registry.languages()
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Where to donate to the Wikimedia Foundation
    pub fn donate_url(&self) -> &'static str {
        DONATE_URL
    }
}
