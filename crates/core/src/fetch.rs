//! Page fetching over HTTP.
//!
//! This module retrieves a single page's raw bytes, resolves the character
//! encoding from the body prefix and the declared content type, and returns
//! the decoded markup. The decoded text feeds both the readable-content
//! extractor and the next-link scanner, so the body is read exactly once.

use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::encoding::decode_body;
use crate::{AuditoError, Result};

/// HTTP client configuration for fetching source pages.
///
/// This struct controls timeout and user agent settings for page requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.90 Safari/537.36".to_string(),
        }
    }
}

/// One fetched page: its final URL and its decoded markup.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL the page was requested from, used to resolve relative links.
    pub url: Url,
    /// The body decoded to UTF-8 through the resolved encoding.
    pub html: String,
}

/// Fetches a page and decodes its body.
///
/// Issues a single GET with the configured User-Agent and a `Referer` header
/// equal to the target URL itself (some source sites refuse requests without
/// one). Any transport error or non-200 status is an error.
pub async fn fetch_page(url: &str, config: &FetchConfig) -> Result<FetchedPage> {
    let parsed_url = Url::parse(url).map_err(|e| AuditoError::InvalidUrl(e.to_string()))?;

    debug!(%parsed_url, "fetching page");

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(AuditoError::HttpError)?;

    let response = client
        .get(parsed_url.clone())
        .header("User-Agent", &config.user_agent)
        .header("Referer", url)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AuditoError::Timeout { timeout: config.timeout }
            } else {
                AuditoError::HttpError(e)
            }
        })?;

    if response.status() != StatusCode::OK {
        return Err(AuditoError::BadStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = response.bytes().await?;
    let html = decode_body(&body, &content_type);

    Ok(FetchedPage { url: parsed_url, html })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.contains("Mozilla"));
    }

    #[tokio::test]
    async fn test_fetch_page_invalid_url() {
        let config = FetchConfig::default();
        let result = fetch_page("not-a-url", &config).await;
        assert!(matches!(result, Err(AuditoError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_page_sends_referer_and_user_agent() {
        let server = MockServer::start().await;
        let url = format!("{}/book/1.html", server.uri());

        Mock::given(method("GET"))
            .and(path("/book/1.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let page = fetch_page(&url, &FetchConfig::default()).await.unwrap();
        assert_eq!(page.html, "<html>ok</html>");
        assert_eq!(page.url.path(), "/book/1.html");

        // Inspect the recorded request directly; a header matcher would split
        // the default User-Agent on its commas and never match.
        let requests = server.received_requests().await.unwrap();
        let headers = &requests[0].headers;
        let user_agent = headers.get("user-agent").and_then(|v| v.to_str().ok()).unwrap();
        assert_eq!(user_agent, FetchConfig::default().user_agent);
        let referer = headers.get("referer").and_then(|v| v.to_str().ok()).unwrap();
        assert_eq!(referer, url);
    }

    #[tokio::test]
    async fn test_fetch_page_non_200_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetch_page(&format!("{}/missing.html", server.uri()), &FetchConfig::default()).await;
        assert!(matches!(result, Err(AuditoError::BadStatus { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fetch_page_decodes_declared_charset() {
        let server = MockServer::start().await;
        // "你好，世界！" in GB18030
        let body: &[u8] = b"\xc4\xe3\xba\xc3\xa3\xac\xca\xc0\xbd\xe7\xa3\xa1";

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(body)
                    .insert_header("Content-Type", "text/html; charset=gb18030"),
            )
            .mount(&server)
            .await;

        let page = fetch_page(&format!("{}/p.html", server.uri()), &FetchConfig::default())
            .await
            .unwrap();
        assert_eq!(page.html, "你好，世界！");
    }
}
