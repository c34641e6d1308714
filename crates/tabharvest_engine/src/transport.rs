use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, REFERER};
use url::Url;

use crate::{HttpResponse, TransportError};

pub const DEFAULT_BASE_URL: &str = "https://ybio-brillonline-com.proxy.lib.duke.edu/ybio";

/// Final-URL substrings that mark a login/SSO redirect unless configured otherwise.
pub const DEFAULT_LOGIN_MARKERS: [&str; 2] = ["login", "shibboleth"];

pub fn default_login_markers() -> Vec<String> {
    DEFAULT_LOGIN_MARKERS.iter().map(|m| m.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
    pub accept: String,
    /// Substrings of the final URL that identify a login/SSO redirect.
    pub login_markers: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 10,
            max_bytes: 10 * 1024 * 1024,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            login_markers: default_login_markers(),
        }
    }
}

impl FetchSettings {
    pub fn parsed_base_url(&self) -> Result<Url, TransportError> {
        Url::parse(&self.base_url).map_err(|err| TransportError::InvalidUrl(err.to_string()))
    }
}

/// HTTP collaborator: one GET, redirects followed, status and final URL kept.
#[async_trait::async_trait]
pub trait PageTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError>;
}

/// Shared `reqwest` client; every worker issues independent requests on it.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ReqwestTransport {
    pub fn new(settings: &FetchSettings, jar: Option<Arc<Jar>>) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&settings.accept)
                .map_err(|err| TransportError::Network(err.to_string()))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&settings.base_url)
                .map_err(|err| TransportError::InvalidUrl(err.to_string()))?,
        );

        let mut builder = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit));
        if let Some(jar) = jar {
            builder = builder.cookie_provider(jar);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;

        Ok(Self {
            client,
            max_bytes: settings.max_bytes,
        })
    }

    fn too_large(&self, actual: u64) -> TransportError {
        TransportError::TooLarge {
            max_bytes: self.max_bytes,
            actual: Some(actual),
        }
    }
}

#[async_trait::async_trait]
impl PageTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(self.too_large(next_len));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponse {
            status,
            final_url,
            content_type,
            body: Bytes::from(body),
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout(err.to_string());
    }
    if err.is_redirect() {
        return TransportError::RedirectLimitExceeded(err.to_string());
    }
    TransportError::Network(err.to_string())
}
