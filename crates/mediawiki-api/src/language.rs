//! Language registry.
//!
//! Validates language prefixes against the list of languages the wiki
//! reports through `meta=siteinfo&siprop=languages`.

use crate::api::types::{parse_response, QueryResponse, SiteLanguagesQuery};
use crate::api::{QueryParams, WikiRequest};
use crate::error::{Result, WikiError};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Language used when none is configured
pub const DEFAULT_LANGUAGE: &str = "en";

/// A validated, lowercase language prefix
///
/// Only [`LanguageRegistry::validate`] and [`Language::default`] produce one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language(String);

impl Language {
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Language(DEFAULT_LANGUAGE.to_string())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of language prefixes served by the wiki, with their local names
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: BTreeMap<String, String>,
}

impl LanguageRegistry {
    /// Build a registry from `(code, local name)` pairs
    pub fn from_entries<C, N>(entries: impl IntoIterator<Item = (C, N)>) -> Self
    where
        C: AsRef<str>,
        N: Into<String>,
    {
        Self {
            languages: entries
                .into_iter()
                .map(|(code, name)| (code.as_ref().to_lowercase(), name.into()))
                .collect(),
        }
    }

    /// Fetch the language list from the default-language endpoint
    pub async fn load(request: &WikiRequest) -> Result<Self> {
        let params = QueryParams::new()
            .set("meta", "siteinfo")
            .set("siprop", "languages");

        let response = request.send(&Language::default(), params).await?;
        let parsed: QueryResponse<SiteLanguagesQuery> = parse_response(response, "languages")?;

        let registry = Self::from_entries(
            parsed
                .query
                .languages
                .into_iter()
                .map(|language| (language.code, language.name)),
        );

        info!(languages = registry.len(), "Language registry loaded");

        Ok(registry)
    }

    /// Normalize `code` and check that the wiki serves it
    pub fn validate(&self, code: &str) -> Result<Language> {
        let normalized = code.trim().to_lowercase();

        if self.languages.contains_key(&normalized) {
            Ok(Language(normalized))
        } else {
            Err(WikiError::InvalidLanguage(code.to_string()))
        }
    }

    /// All prefixes with their local language names
    pub fn languages(&self) -> &BTreeMap<String, String> {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> LanguageRegistry {
        LanguageRegistry::from_entries([
            ("en", "English"),
            ("fr", "français"),
            ("de", "Deutsch"),
            ("zh", "中文"),
        ])
    }

    #[test]
    fn test_known_codes_validate_lowercased() {
        let registry = registry();

        for code in ["en", "FR", "De", "zH"] {
            let language = registry.validate(code).unwrap();
            assert_eq!(language.code(), code.to_lowercase());
        }
    }

    #[test]
    fn test_unknown_codes_fail() {
        let registry = registry();

        for code in ["fakelang", "xx", ""] {
            assert!(matches!(
                registry.validate(code),
                Err(WikiError::InvalidLanguage(ref c)) if c == code
            ));
        }
    }

    #[test]
    fn test_default_language_is_english() {
        assert_eq!(Language::default().code(), "en");
        assert_eq!(Language::default().to_string(), "en");
    }

    #[tokio::test]
    async fn test_load_from_siteinfo() {
        let transport = Arc::new(ScriptedTransport::new().route(
            &[("meta", "siteinfo"), ("siprop", "languages")],
            json!({"batchcomplete": "", "query": {"languages": [
                {"code": "en", "*": "English"},
                {"code": "fr", "*": "français"}
            ]}}),
        ));
        let request = WikiRequest::new(
            transport.clone(),
            "https://{lang}.wikipedia.org/w/api.php",
            "test-agent/1.0",
            None,
        );

        let registry = LanguageRegistry::load(&request).await.unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.languages().get("fr").map(String::as_str), Some("français"));
        assert_eq!(transport.calls()[0].url, "https://en.wikipedia.org/w/api.php");
    }
}
