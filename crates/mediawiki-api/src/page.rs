//! Lazily populated Wikipedia page.
//!
//! A [`WikipediaPage`] is created from a resolved [`PageIdentity`]. Every
//! derived property is fetched on first access with one request (or one
//! continuation drain) and cached for the lifetime of the page.

use crate::api::types::{first_revision, str_field, u64_field};
use crate::api::{check_response, QueryParams, WikiRequest};
use crate::continuation::drain;
use crate::error::{Result, WikiError};
use crate::html;
use crate::language::{Language, LanguageRegistry};
use crate::resolver::PageIdentity;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

const CATEGORY_PREFIX: &str = "Category:";

/// Latitude and longitude of a page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Fields returned together by the content request
#[derive(Debug, Clone)]
struct Revision {
    content: String,
    revision_id: u64,
    parent_id: u64,
}

/// A resolved Wikipedia article
pub struct WikipediaPage {
    request: Arc<WikiRequest>,
    registry: Arc<LanguageRegistry>,
    language: Language,
    identity: PageIdentity,

    revision: OnceCell<Revision>,
    summary: OnceCell<String>,
    images: OnceCell<Vec<String>>,
    references: OnceCell<Vec<String>>,
    links: OnceCell<Vec<String>>,
    categories: OnceCell<Vec<String>>,
    coordinates: OnceCell<Option<Coordinates>>,
    sections: OnceCell<Vec<String>>,
    html: OnceCell<String>,
}

impl WikipediaPage {
    pub(crate) fn new(
        request: Arc<WikiRequest>,
        registry: Arc<LanguageRegistry>,
        language: Language,
        identity: PageIdentity,
    ) -> Self {
        Self {
            request,
            registry,
            language,
            identity,
            revision: OnceCell::new(),
            summary: OnceCell::new(),
            images: OnceCell::new(),
            references: OnceCell::new(),
            links: OnceCell::new(),
            categories: OnceCell::new(),
            coordinates: OnceCell::new(),
            sections: OnceCell::new(),
            html: OnceCell::new(),
        }
    }

    pub fn identity(&self) -> &PageIdentity {
        &self.identity
    }

    pub fn pageid(&self) -> u64 {
        self.identity.pageid
    }

    pub fn title(&self) -> &str {
        &self.identity.title
    }

    pub fn url(&self) -> &str {
        &self.identity.url
    }

    pub fn language_code(&self) -> &str {
        &self.identity.language_code
    }

    /// Load content, summary, images, references, links and sections now
    pub async fn preload(&self) -> Result<()> {
        self.content().await?;
        self.summary().await?;
        self.images().await?;
        self.references().await?;
        self.links().await?;
        self.sections().await?;
        Ok(())
    }

    /// Plain text content of the page, excluding images, tables, and other data
    pub async fn content(&self) -> Result<&str> {
        Ok(&self.revision().await?.content)
    }

    /// Revision id of the current version of the page
    pub async fn revision_id(&self) -> Result<u64> {
        Ok(self.revision().await?.revision_id)
    }

    /// Revision id of the parent of the current revision
    pub async fn parent_id(&self) -> Result<u64> {
        Ok(self.revision().await?.parent_id)
    }

    async fn revision(&self) -> Result<&Revision> {
        self.revision.get_or_try_init(|| self.fetch_revision()).await
    }

    async fn fetch_revision(&self) -> Result<Revision> {
        let page = self
            .query_page(
                QueryParams::new()
                    .set("prop", "extracts|revisions")
                    .flag("explaintext")
                    .set("rvprop", "ids"),
            )
            .await?;

        let revision = first_revision(&page)?;
        Ok(Revision {
            content: str_field(&page, "extract")?.to_string(),
            revision_id: u64_field(revision, "revid")?,
            parent_id: u64_field(revision, "parentid")?,
        })
    }

    /// Plain text summary (the introduction) of the page
    pub async fn summary(&self) -> Result<&str> {
        self.summary
            .get_or_try_init(|| self.fetch_summary())
            .await
            .map(String::as_str)
    }

    async fn fetch_summary(&self) -> Result<String> {
        let page = self
            .query_page(
                QueryParams::new()
                    .set("prop", "extracts")
                    .flag("explaintext")
                    .flag("exintro"),
            )
            .await?;

        Ok(str_field(&page, "extract")?.to_string())
    }

    /// URLs of the images on the page
    pub async fn images(&self) -> Result<&[String]> {
        self.images
            .get_or_try_init(|| {
                self.drain_page(
                    QueryParams::new()
                        .set("generator", "images")
                        .set("gimlimit", "max")
                        .set("prop", "imageinfo")
                        .set("iiprop", "url"),
                    "images",
                    |query| {
                        Ok(pages(query)
                            .filter_map(|page| {
                                page.get("imageinfo")?
                                    .get(0)?
                                    .get("url")?
                                    .as_str()
                                    .map(str::to_string)
                            })
                            .collect())
                    },
                )
            })
            .await
            .map(Vec::as_slice)
    }

    /// URLs of external links on the page
    ///
    /// May include links that are not cited anywhere. Protocol-relative URLs
    /// get an `http:` prefix.
    pub async fn references(&self) -> Result<&[String]> {
        let pageid = self.pageid();
        self.references
            .get_or_try_init(|| {
                self.drain_page(
                    QueryParams::new().set("prop", "extlinks").set("ellimit", "max"),
                    "references",
                    move |query| {
                        Ok(page_list(query, pageid, "extlinks")
                            .filter_map(|link| {
                                link.get("*")
                                    .or_else(|| link.get("url"))
                                    .and_then(Value::as_str)
                            })
                            .map(add_protocol)
                            .collect())
                    },
                )
            })
            .await
            .map(Vec::as_slice)
    }

    /// Titles of the articles linked from the page (namespace 0 only)
    pub async fn links(&self) -> Result<&[String]> {
        let pageid = self.pageid();
        self.links
            .get_or_try_init(|| {
                self.drain_page(
                    QueryParams::new()
                        .set("prop", "links")
                        .set("plnamespace", 0)
                        .set("pllimit", "max"),
                    "links",
                    move |query| Ok(page_titles(query, pageid, "links").collect()),
                )
            })
            .await
            .map(Vec::as_slice)
    }

    /// Categories of the page, without the `Category:` prefix
    pub async fn categories(&self) -> Result<&[String]> {
        let pageid = self.pageid();
        self.categories
            .get_or_try_init(|| {
                self.drain_page(
                    QueryParams::new().set("prop", "categories").set("cllimit", "max"),
                    "categories",
                    move |query| {
                        Ok(page_titles(query, pageid, "categories")
                            .map(|title| {
                                title
                                    .strip_prefix(CATEGORY_PREFIX)
                                    .map(str::to_string)
                                    .unwrap_or(title)
                            })
                            .collect())
                    },
                )
            })
            .await
            .map(Vec::as_slice)
    }

    /// Primary coordinates of the page, if it has any
    pub async fn coordinates(&self) -> Result<Option<Coordinates>> {
        self.coordinates
            .get_or_try_init(|| self.fetch_coordinates())
            .await
            .copied()
    }

    async fn fetch_coordinates(&self) -> Result<Option<Coordinates>> {
        let pageid = self.pageid();
        let response = self
            .send(
                QueryParams::new()
                    .set("prop", "coordinates")
                    .set("colimit", "max")
                    .set("pageids", pageid),
            )
            .await?;

        let first = response
            .get("query")
            .and_then(|query| query.get("pages"))
            .and_then(|pages| pages.get(pageid.to_string()))
            .and_then(|page| page.get("coordinates"))
            .and_then(|coordinates| coordinates.get(0));

        let Some(first) = first else {
            return Ok(None);
        };

        let latitude = first.get("lat").and_then(Value::as_f64);
        let longitude = first.get("lon").and_then(Value::as_f64);

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(Some(Coordinates {
                latitude,
                longitude,
            })),
            _ => Err(WikiError::malformed("coordinates without lat/lon")),
        }
    }

    /// Section titles from the table of contents
    pub async fn sections(&self) -> Result<&[String]> {
        self.sections
            .get_or_try_init(|| self.fetch_sections())
            .await
            .map(Vec::as_slice)
    }

    async fn fetch_sections(&self) -> Result<Vec<String>> {
        let response = self
            .send(
                QueryParams::new()
                    .set("action", "parse")
                    .set("prop", "sections")
                    .set("pageid", self.pageid()),
            )
            .await?;

        let sections = response
            .get("parse")
            .and_then(|parse| parse.get("sections"))
            .and_then(Value::as_array)
            .ok_or_else(|| WikiError::malformed("parse response has no sections"))?;

        Ok(sections
            .iter()
            .filter_map(|section| section.get("line").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Full rendered HTML of the page
    ///
    /// This can be slow for long pages.
    pub async fn html(&self) -> Result<&str> {
        self.html
            .get_or_try_init(|| self.fetch_html())
            .await
            .map(String::as_str)
    }

    async fn fetch_html(&self) -> Result<String> {
        let page = self
            .query_page(
                QueryParams::new()
                    .set("prop", "revisions")
                    .set("rvprop", "content")
                    .set("rvlimit", 1)
                    .flag("rvparse"),
            )
            .await?;

        Ok(str_field(first_revision(&page)?, "*")?.to_string())
    }

    /// Paragraph text of the rendered HTML, footnote markers removed
    pub async fn html_text(&self) -> Result<String> {
        Ok(html::strip_markup(self.html().await?))
    }

    /// Plain text of the section titled `section_title`
    ///
    /// Only the text up to the next heading is returned, so a section that
    /// starts with a subsection yields an empty string.
    pub async fn section(&self, section_title: &str) -> Result<Option<String>> {
        Ok(find_section(self.content().await?, section_title))
    }

    /// Title of this page in the wiki for `lang_code`, if it is linked
    pub async fn lang_title(&self, lang_code: &str) -> Result<Option<String>> {
        let target = self.registry.validate(lang_code)?;

        let page = self
            .query_page(
                QueryParams::new()
                    .set("prop", "langlinks")
                    .set("lllang", target.code()),
            )
            .await?;

        Ok(page
            .get("langlinks")
            .and_then(|links| links.get(0))
            .and_then(|link| link.get("*"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn send(&self, params: QueryParams) -> Result<Value> {
        let response = self.request.send(&self.language, params).await?;
        check_response(&response, self.title())?;
        Ok(response)
    }

    /// Query this page by id and return its `query.pages` entry
    async fn query_page(&self, params: QueryParams) -> Result<Value> {
        let pageid = self.pageid();
        let mut response = self.send(params.set("pageids", pageid)).await?;

        response
            .pointer_mut(&format!("/query/pages/{pageid}"))
            .map(Value::take)
            .ok_or_else(|| WikiError::malformed(format!("no page {pageid} in response")))
    }

    async fn drain_page<F>(&self, params: QueryParams, context: &str, extract: F) -> Result<Vec<String>>
    where
        F: FnMut(&Map<String, Value>) -> Result<Vec<String>>,
    {
        drain(
            &self.request,
            &self.language,
            params.set("pageids", self.pageid()),
            context,
            extract,
        )
        .await
    }
}

impl PartialEq for WikipediaPage {
    fn eq(&self, other: &Self) -> bool {
        self.identity.pageid == other.identity.pageid
            && self.identity.title == other.identity.title
            && self.identity.url == other.identity.url
    }
}

impl fmt::Debug for WikipediaPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikipediaPage")
            .field("pageid", &self.identity.pageid)
            .field("title", &self.identity.title)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for WikipediaPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<WikipediaPage '{}'>", self.identity.title)
    }
}

/// Text between `== section_title ==` and the next `==`, trimmed
pub fn find_section(content: &str, section_title: &str) -> Option<String> {
    let heading = format!("== {section_title} ==");
    let start = content.find(&heading)? + heading.len();

    let rest = &content[start..];
    let end = rest.find("==").unwrap_or(rest.len());

    Some(rest[..end].trim_start_matches('=').trim().to_string())
}

fn add_protocol(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("http:{url}")
    }
}

/// Every page object under `query.pages`
fn pages(query: &Map<String, Value>) -> impl Iterator<Item = &Value> {
    query
        .get("pages")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|pages| pages.values())
}

/// Items of the list property `prop` of page `pageid`
fn page_list<'a>(
    query: &'a Map<String, Value>,
    pageid: u64,
    prop: &str,
) -> impl Iterator<Item = &'a Value> {
    query
        .get("pages")
        .and_then(|pages| pages.get(pageid.to_string()))
        .and_then(|page| page.get(prop))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn page_titles<'a>(
    query: &'a Map<String, Value>,
    pageid: u64,
    prop: &str,
) -> impl Iterator<Item = String> + 'a {
    page_list(query, pageid, prop)
        .filter_map(|item| item.get("title").and_then(Value::as_str))
        .map(str::to_string)
}
