use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};
use tabharvest_core::{FetchResult, PageIndex, Record};
use url::Url;

use crate::decode::decode_body;
use crate::extract::{extract_page, TableExtractor, ViewsTableExtractor};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::transport::{default_login_markers, PageTransport};

/// Anything that can turn a page index into a classified result.
///
/// Implementations are pure functions of the page and shared read-only
/// state; the scheduler owns all aggregate state.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, page: PageIndex) -> FetchResult;
}

/// Base URL with its `page` query parameter set to `page`.
pub fn page_url(base: &Url, page: PageIndex) -> Url {
    let mut url = base.clone();
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("page", &page.to_string());
    url
}

/// Why a single attempt did not settle the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryReason {
    Transient,
    NotFound,
}

enum Attempt {
    Settled(FetchResult),
    Retry(RetryReason),
}

/// Authenticated page fetcher with retry, backoff and failure classification.
pub struct PageFetcher {
    base_url: Url,
    transport: Arc<dyn PageTransport>,
    extractor: Arc<dyn TableExtractor>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    login_markers: Vec<String>,
}

impl PageFetcher {
    pub fn new(base_url: Url, transport: Arc<dyn PageTransport>) -> Self {
        Self {
            base_url,
            transport,
            extractor: Arc::new(ViewsTableExtractor::default()),
            sleeper: Arc::new(TokioSleeper),
            retry: RetryPolicy::default(),
            login_markers: default_login_markers(),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TableExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_login_markers(mut self, markers: Vec<String>) -> Self {
        self.login_markers = markers;
        self
    }

    async fn attempt(&self, page: PageIndex, url: &Url, attempt: u32) -> Attempt {
        let response = match self.transport.get(url).await {
            Ok(response) => response,
            Err(err) => {
                engine_warn!("Page {}: Error {} (attempt {})", page, err, attempt);
                return Attempt::Retry(RetryReason::Transient);
            }
        };

        if response.is_access_denied() {
            engine_warn!("Page {}: Access Denied ({})", page, response.status);
            return Attempt::Settled(FetchResult::AuthFailure);
        }
        if !response.is_ok() {
            engine_warn!("Page {}: Status {} (attempt {})", page, response.status, attempt);
            let reason = if response.status == 404 {
                RetryReason::NotFound
            } else {
                RetryReason::Transient
            };
            return Attempt::Retry(reason);
        }

        let decoded = match decode_body(&response.body, response.content_type.as_deref()) {
            Ok(decoded) => decoded,
            Err(err) => {
                engine_warn!("Page {}: {} (attempt {})", page, err, attempt);
                return Attempt::Retry(RetryReason::Transient);
            }
        };

        let extraction = extract_page(
            self.extractor.as_ref(),
            &decoded.html,
            &response.final_url,
            &self.login_markers,
        );
        match extraction.rows {
            Some(rows) => {
                engine_debug!("Page {}: {} rows", page, rows.len());
                Attempt::Settled(FetchResult::Rows(
                    rows.into_iter().map(Record::from_cells).collect(),
                ))
            }
            None if extraction.login_redirect => {
                engine_warn!("Page {}: Redirected to login page!", page);
                Attempt::Settled(FetchResult::AuthFailure)
            }
            None => {
                engine_warn!("Page {}: Table not found (attempt {})", page, attempt);
                Attempt::Retry(RetryReason::NotFound)
            }
        }
    }
}

#[async_trait::async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self, page: PageIndex) -> FetchResult {
        let url = page_url(&self.base_url, page);
        let mut last_reason = RetryReason::Transient;

        for attempt in self.retry.attempts() {
            match self.attempt(page, &url, attempt).await {
                Attempt::Settled(result) => return result,
                Attempt::Retry(reason) => last_reason = reason,
            }
            if !self.retry.is_last(attempt) {
                self.sleeper.sleep(self.retry.delay_after(attempt)).await;
            }
        }

        match last_reason {
            RetryReason::NotFound => FetchResult::NotFound,
            RetryReason::Transient => FetchResult::TransientFailure,
        }
    }
}
