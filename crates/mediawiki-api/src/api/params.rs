//! Query string parameters for API requests.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// Ordered set of query parameters
///
/// Keys are unique; setting a key twice keeps the last value. Flags such as
/// `explaintext` or `redirects` are sent with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, builder style
    pub fn set(mut self, key: &str, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a value-less flag parameter, builder style
    pub fn flag(self, key: &str) -> Self {
        self.set(key, "")
    }

    pub fn insert(&mut self, key: &str, value: impl Display) {
        self.0.insert(key.to_string(), value.to_string());
    }

    /// Set `key` only when it is not present yet
    pub fn insert_default(&mut self, key: &str, value: impl Display) {
        self.0
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    /// Overlay every entry of `other` onto `self`
    pub fn merge(mut self, other: &QueryParams) -> Self {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_flags() {
        let params = QueryParams::new()
            .set("list", "search")
            .set("srlimit", 10)
            .flag("exintro");

        assert_eq!(params.get("list"), Some("search"));
        assert_eq!(params.get("srlimit"), Some("10"));
        assert_eq!(params.get("exintro"), Some(""));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_insert_default_keeps_existing() {
        let mut params = QueryParams::new().set("action", "parse");
        params.insert_default("action", "query");
        params.insert_default("format", "json");

        assert_eq!(params.get("action"), Some("parse"));
        assert_eq!(params.get("format"), Some("json"));
    }

    #[test]
    fn test_merge_overrides() {
        let base = QueryParams::new().set("prop", "links").set("pllimit", "max");
        let token: QueryParams = [("plcontinue", "736|0|Apple"), ("continue", "||")]
            .into_iter()
            .collect();

        let merged = base.merge(&token);
        assert_eq!(merged.get("prop"), Some("links"));
        assert_eq!(merged.get("plcontinue"), Some("736|0|Apple"));
        assert_eq!(merged.len(), 4);
    }
}
