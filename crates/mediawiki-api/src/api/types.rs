//! MediaWiki API response types.
//!
//! These types represent the JSON responses of the `action=query` list
//! modules. Page-keyed responses (`query.pages`) are read from the raw
//! [`Value`] because their shape depends on the requested `prop`.

use crate::error::{Result, WikiError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key MediaWiki uses for pages that do not exist
pub const MISSING_PAGE_KEY: &str = "-1";

/// Generic `{"query": ...}` wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse<T> {
    pub query: T,
}

/// Any entry that carries a title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleEntry {
    pub title: String,
}

/// `list=search` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Vec<TitleEntry>,
    #[serde(default)]
    pub searchinfo: Option<SearchInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInfo {
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// `list=geosearch` result, optionally restricted by `titles`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoSearchQuery {
    #[serde(default)]
    pub geosearch: Vec<TitleEntry>,
    /// Page objects keyed by page id, in response order
    #[serde(default)]
    pub pages: Option<Map<String, Value>>,
}

/// `list=random` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomQuery {
    pub random: Vec<TitleEntry>,
}

/// `meta=siteinfo&siprop=languages` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteLanguagesQuery {
    pub languages: Vec<SiteLanguage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteLanguage {
    pub code: String,
    #[serde(rename = "*")]
    pub name: String,
}

/// Fail with the matching error when the response carries `error.info`
pub fn check_response(response: &Value, context: &str) -> Result<()> {
    match response.get("error") {
        None => Ok(()),
        Some(error) => {
            let info = error
                .get("info")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            Err(WikiError::from_api_info(info, context))
        }
    }
}

/// Check for API errors, then deserialize the whole response
pub fn parse_response<T: DeserializeOwned>(response: Value, context: &str) -> Result<T> {
    check_response(&response, context)?;
    Ok(serde_json::from_value(response)?)
}

/// The `query` object of a response
pub fn query_object<'a>(response: &'a Value) -> Result<&'a Map<String, Value>> {
    response
        .get("query")
        .and_then(Value::as_object)
        .ok_or_else(|| WikiError::malformed("response has no `query` object"))
}

/// The entry for `pageid` under `query.pages`
pub fn page_entry<'a>(query: &'a Map<String, Value>, pageid: u64) -> Result<&'a Value> {
    query
        .get("pages")
        .and_then(|pages| pages.get(pageid.to_string()))
        .ok_or_else(|| WikiError::malformed(format!("no page {pageid} in response")))
}

/// A string field of a JSON object
pub fn str_field<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| WikiError::malformed(format!("missing string field `{field}`")))
}

/// An unsigned integer field of a JSON object
pub fn u64_field(value: &Value, field: &str) -> Result<u64> {
    value
        .get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| WikiError::malformed(format!("missing integer field `{field}`")))
}

/// The `revisions[0]` entry of a page
pub fn first_revision(page: &Value) -> Result<&Value> {
    page.get("revisions")
        .and_then(|revisions| revisions.get(0))
        .ok_or_else(|| WikiError::malformed("page has no revisions"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_response_passes_clean_response() {
        let response = json!({"batchcomplete": "", "query": {}});
        assert!(check_response(&response, "q").is_ok());
    }

    #[test]
    fn test_check_response_maps_errors() {
        let response = json!({"error": {"code": "internal", "info": "Pool queue is full"}});
        assert!(matches!(
            check_response(&response, "Barack Obama"),
            Err(WikiError::RateLimitedTimeout(_))
        ));

        let response = json!({"error": {"code": "badvalue", "info": "Bad value"}});
        assert!(matches!(
            check_response(&response, "q"),
            Err(WikiError::RemoteApi(ref info)) if info == "Bad value"
        ));
    }

    #[test]
    fn test_parse_search_response() {
        let response = json!({
            "query": {
                "searchinfo": {"suggestion": "barack obama"},
                "search": [{"ns": 0, "title": "Barack Obama"}, {"ns": 0, "title": "Michelle Obama"}]
            }
        });

        let parsed: QueryResponse<SearchQuery> = parse_response(response, "q").unwrap();
        let titles: Vec<_> = parsed.query.search.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Barack Obama", "Michelle Obama"]);
        assert_eq!(
            parsed.query.searchinfo.and_then(|info| info.suggestion).as_deref(),
            Some("barack obama")
        );
    }

    #[test]
    fn test_parse_site_languages() {
        let response = json!({
            "query": {"languages": [{"code": "en", "*": "English"}, {"code": "fr", "*": "français"}]}
        });

        let parsed: QueryResponse<SiteLanguagesQuery> = parse_response(response, "languages").unwrap();
        assert_eq!(parsed.query.languages.len(), 2);
        assert_eq!(parsed.query.languages[1].name, "français");
    }

    #[test]
    fn test_page_entry_lookup() {
        let response = json!({"query": {"pages": {"1868108": {"pageid": 1868108, "title": "Celtuce"}}}});
        let query = query_object(&response).unwrap();

        let page = page_entry(query, 1868108).unwrap();
        assert_eq!(str_field(page, "title").unwrap(), "Celtuce");
        assert!(page_entry(query, 1).is_err());
    }
}
