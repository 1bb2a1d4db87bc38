//! Page resolution.
//!
//! Turns a title or page id into a canonical [`PageIdentity`], following
//! redirects and detecting missing and disambiguation pages.

use crate::api::types::{first_revision, page_entry, query_object, str_field, u64_field};
use crate::api::{check_response, QueryParams, WikiRequest};
use crate::error::{PageKey, Result, WikiError};
use crate::html;
use crate::language::Language;
use serde_json::{Map, Value};
use tracing::debug;

/// Canonical identity of an existing article
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageIdentity {
    pub pageid: u64,
    pub title: String,
    pub url: String,
    pub language_code: String,
}

/// How redirects are handled while resolving
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Follow redirects instead of failing with [`WikiError::UnexpectedRedirect`]
    pub follow_redirects: bool,
    /// Hops allowed before failing with [`WikiError::TooManyRedirects`]
    pub max_redirects: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            max_redirects: 10,
        }
    }
}

/// Add `titles` or `pageids` for `target`
pub(crate) fn with_target(params: QueryParams, target: &PageKey) -> QueryParams {
    match target {
        PageKey::Title(title) => params.set("titles", title),
        PageKey::PageId(pageid) => params.set("pageids", pageid),
    }
}

/// Resolve `target` to an article, issuing one lookup per redirect hop
pub async fn resolve(
    request: &WikiRequest,
    language: &Language,
    target: PageKey,
    options: ResolveOptions,
) -> Result<PageIdentity> {
    let original = target.clone();
    let mut target = target;
    let mut hops = 0u32;

    loop {
        let params = QueryParams::new()
            .set("prop", "info|pageprops")
            .set("inprop", "url")
            .set("ppprop", "disambiguation")
            .flag("redirects");

        let response = request.send(language, with_target(params, &target)).await?;
        check_response(&response, &target.to_string())?;

        let query = query_object(&response)?;
        let page = first_page(query)?;

        if page.get("missing").is_some() || page.get("invalid").is_some() {
            return Err(WikiError::PageNotFound(target));
        }

        if let Some(redirect) = query.get("redirects").and_then(|r| r.get(0)) {
            if !options.follow_redirects {
                return Err(WikiError::UnexpectedRedirect(display_title(&target, page)));
            }

            hops += 1;
            if hops > options.max_redirects {
                return Err(WikiError::TooManyRedirects {
                    title: display_title(&original, page),
                    limit: options.max_redirects,
                });
            }

            let to = str_field(redirect, "to")?;
            debug!(from = %target, to = to, hop = hops, "Following redirect");

            target = PageKey::Title(to.to_string());
            continue;
        }

        let pageid = u64_field(page, "pageid")?;

        // Only `disambiguation` is requested in ppprop, so any pageprops means one
        if page.get("pageprops").is_some() {
            let candidates = disambiguation_candidates(request, language, &target, pageid).await?;
            return Err(WikiError::Disambiguation {
                title: display_title(&target, page),
                candidates,
            });
        }

        let identity = PageIdentity {
            pageid,
            title: str_field(page, "title")?.to_string(),
            url: str_field(page, "fullurl")?.to_string(),
            language_code: page
                .get("pagelanguage")
                .and_then(Value::as_str)
                .unwrap_or(language.code())
                .to_string(),
        };

        debug!(pageid = identity.pageid, title = %identity.title, "Page resolved");

        return Ok(identity);
    }
}

fn first_page(query: &Map<String, Value>) -> Result<&Value> {
    query
        .get("pages")
        .and_then(Value::as_object)
        .and_then(|pages| pages.values().next())
        .ok_or_else(|| WikiError::malformed("response has no pages"))
}

/// The requested title, or the page's own title when looked up by id
fn display_title(target: &PageKey, page: &Value) -> String {
    match target {
        PageKey::Title(title) => title.clone(),
        PageKey::PageId(pageid) => page
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| pageid.to_string()),
    }
}

/// Candidate titles listed on a disambiguation page
async fn disambiguation_candidates(
    request: &WikiRequest,
    language: &Language,
    target: &PageKey,
    pageid: u64,
) -> Result<Vec<String>> {
    let params = QueryParams::new()
        .set("prop", "revisions")
        .set("rvprop", "content")
        .flag("rvparse")
        .set("rvlimit", 1);

    let response = request.send(language, with_target(params, target)).await?;
    check_response(&response, &target.to_string())?;

    let page = page_entry(query_object(&response)?, pageid)?;
    let markup = str_field(first_revision(page)?, "*")?;

    Ok(html::extract_list_item_anchor_texts(markup))
}
