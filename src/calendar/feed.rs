//! Fetching iCalendar feeds over HTTP.

use std::time::Duration;

use miette::Diagnostic;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Errors while obtaining or parsing a whole feed.
#[derive(Error, Diagnostic, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed {url}: {message}")]
    #[diagnostic(
        code(famille::calendar::fetch),
        help("Check that the calendar URL is reachable from the server")
    )]
    Fetch { url: String, message: String },

    #[error("Feed {url} answered with HTTP {status}")]
    #[diagnostic(code(famille::calendar::status))]
    Status { url: String, status: u16 },

    #[error("Feed is not valid iCalendar: {message}")]
    #[diagnostic(code(famille::calendar::parse))]
    Parse { message: String },
}

/// Source of raw iCalendar documents.
#[cfg_attr(test, automock)]
#[allow(async_fn_in_trait)]
pub trait FeedSource: Send + Sync {
    /// Download the document at `url`.
    async fn fetch(&self, url: &str) -> Result<String, FeedError>;
}

/// `webcal://` is a convention for "HTTPS, opened by a calendar app".
pub fn resolve_feed_url(url: &str) -> String {
    match url.strip_prefix("webcal://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}

/// Whether `url` uses a scheme we can fetch.
pub fn is_supported_feed_url(url: &str) -> bool {
    let url = url.trim();
    ["http://", "https://", "webcal://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme))
}

/// reqwest-backed feed source with a request timeout.
#[derive(Clone)]
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("famille/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Fetch {
                url: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<String, FeedError> {
        let url = resolve_feed_url(url);
        let fetch_error = |e: reqwest::Error| FeedError::Fetch {
            url: url.clone(),
            message: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(fetch_error)?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url: url.clone(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(fetch_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webcal_is_fetched_over_https() {
        assert_eq!(
            resolve_feed_url("webcal://example.com/cal.ics"),
            "https://example.com/cal.ics"
        );
        assert_eq!(
            resolve_feed_url("http://example.com/cal.ics"),
            "http://example.com/cal.ics"
        );
    }

    #[test]
    fn only_http_schemes_are_supported() {
        assert!(is_supported_feed_url("https://example.com/a.ics"));
        assert!(is_supported_feed_url("webcal://example.com/a.ics"));
        assert!(is_supported_feed_url("http://localhost:8080/a.ics"));
        assert!(!is_supported_feed_url("ftp://example.com/a.ics"));
        assert!(!is_supported_feed_url("https://"));
        assert!(!is_supported_feed_url("/etc/passwd"));
    }
}
