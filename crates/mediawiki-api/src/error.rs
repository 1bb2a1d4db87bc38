//! Error types surfaced by the MediaWiki client.

use thiserror::Error;

/// `error.info` texts the API uses when it is overloaded
const TIMEOUT_MESSAGES: [&str; 2] = ["HTTP request timed out.", "Pool queue is full"];

/// Identifies the page a lookup was about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKey {
    Title(String),
    PageId(u64),
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageKey::Title(title) => write!(f, "\"{title}\""),
            PageKey::PageId(pageid) => write!(f, "page id {pageid}"),
        }
    }
}

/// Errors returned by the MediaWiki client
#[derive(Debug, Error)]
pub enum WikiError {
    /// The requested title or page id does not exist
    #[error("{0} does not match any pages. Try another query!")]
    PageNotFound(PageKey),

    /// A redirect was met while redirect following was disabled
    #[error("\"{0}\" resulted in a redirect. Enable redirects to follow it automatically.")]
    UnexpectedRedirect(String),

    /// The title resolved to a disambiguation page
    #[error("\"{title}\" may refer to: {}", .candidates.join(", "))]
    Disambiguation {
        title: String,
        candidates: Vec<String>,
    },

    /// The language code is not served by the wiki
    #[error("Language \"{0}\" is not supported by the wiki")]
    InvalidLanguage(String),

    /// The API reported a timeout or a full request queue
    #[error("Searching for \"{0}\" resulted in a timeout. Try again in a few seconds, and enable rate limiting.")]
    RateLimitedTimeout(String),

    /// Any other error reported by the API
    #[error("MediaWiki API error: {0}")]
    RemoteApi(String),

    /// Network or HTTP failure below the API level
    #[error("Transport error: {0}")]
    Transport(String),

    /// The redirect chain was longer than the configured limit
    #[error("Too many redirects while resolving \"{title}\" (limit {limit})")]
    TooManyRedirects { title: String, limit: u32 },

    /// The response did not have the expected shape
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),
}

impl WikiError {
    /// Map an `error.info` payload onto the matching variant
    pub fn from_api_info(info: &str, context: &str) -> Self {
        if TIMEOUT_MESSAGES.contains(&info) {
            WikiError::RateLimitedTimeout(context.to_string())
        } else {
            WikiError::RemoteApi(info.to_string())
        }
    }

    pub(crate) fn malformed(what: impl std::fmt::Display) -> Self {
        WikiError::MalformedResponse(what.to_string())
    }
}

impl From<reqwest::Error> for WikiError {
    fn from(err: reqwest::Error) -> Self {
        WikiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for WikiError {
    fn from(err: serde_json::Error) -> Self {
        WikiError::MalformedResponse(err.to_string())
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, WikiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_info_maps_to_rate_limited() {
        let err = WikiError::from_api_info("Pool queue is full", "Barack Obama");
        assert!(matches!(err, WikiError::RateLimitedTimeout(ref q) if q == "Barack Obama"));

        let err = WikiError::from_api_info("HTTP request timed out.", "40.1|117.2");
        assert!(matches!(err, WikiError::RateLimitedTimeout(_)));
    }

    #[test]
    fn test_other_info_is_verbatim() {
        let err = WikiError::from_api_info("Unrecognized value for parameter \"list\"", "q");
        assert!(
            matches!(err, WikiError::RemoteApi(ref info) if info == "Unrecognized value for parameter \"list\"")
        );
    }

    #[test]
    fn test_messages() {
        let err = WikiError::PageNotFound(PageKey::Title("purpleberry".to_string()));
        assert_eq!(
            err.to_string(),
            "\"purpleberry\" does not match any pages. Try another query!"
        );

        let err = WikiError::PageNotFound(PageKey::PageId(42));
        assert!(err.to_string().starts_with("page id 42"));

        let err = WikiError::Disambiguation {
            title: "Mercury".to_string(),
            candidates: vec!["Mercury (planet)".to_string(), "Mercury (element)".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "\"Mercury\" may refer to: Mercury (planet), Mercury (element)"
        );
    }
}
