// src/checker/http.rs
// =============================================================================
// This module checks if external URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download), following
//   redirects
// - Runs checks concurrently, with a fixed cap on in-flight requests
// - Sorts failures into two buckets:
//     * bad status (>= 400): the link is really broken, costs points
//     * timeout / connection failure / anything else: probably the network
//       the audit runs on, reported but free
//
// Nothing here touches the score. The checker returns one tagged result per
// URL and the auditor folds them into the ledger in one place.
// =============================================================================

use std::collections::BTreeSet;
use std::time::Duration;

use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;

/// Identifies the auditor to the servers it probes
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; site-audit/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Default number of requests in flight at once
pub const DEFAULT_WORKERS: usize = 10;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a probe never got a status code back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unreachable {
    Timeout,
    Connection,
    Other,
}

/// Outcome of probing one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExternalStatus {
    /// Final response (after redirects) was below 400
    Ok { code: u16 },
    /// Final response was 400 or above
    BadStatus { code: u16 },
    /// No response: counted as an environment problem, not a site defect
    Unreachable { reason: Unreachable, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalCheck {
    pub url: String,
    #[serde(flatten)]
    pub status: ExternalStatus,
}

impl ExternalCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, ExternalStatus::Ok { .. })
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.status, ExternalStatus::BadStatus { .. })
    }
}

pub struct ExternalChecker {
    client: Client,
    workers: usize,
}

impl ExternalChecker {
    // Builds a checker.
    //
    // Parameters:
    //   workers: max requests in flight (at least 1)
    //   timeout: per-request timeout, covering connect and response
    pub fn new(workers: usize, timeout: Duration) -> Result<Self> {
        // We'll reuse this client for all requests (connection pooling)
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            workers: workers.max(1),
        })
    }

    // Probes every URL once and returns the results sorted by URL.
    //
    // Completion order depends on the network; sorting afterwards makes the
    // report (and any scoring built on it) the same on every run.
    pub async fn check_all(&self, urls: &BTreeSet<String>) -> Vec<ExternalCheck> {
        info!("checking {} external link(s) with {} worker(s)", urls.len(), self.workers);

        let futures = urls.iter().map(|url| {
            let client = self.client.clone(); // Client is an Arc inside, cheap to clone
            let url = url.clone();
            async move { check_single_url(client, url).await }
        });

        // Run up to `workers` probes at once; results arrive as they finish
        let mut results: Vec<ExternalCheck> = stream::iter(futures)
            .buffer_unordered(self.workers)
            .collect()
            .await;

        results.sort_by(|a, b| a.url.cmp(&b.url));
        results
    }
}

async fn check_single_url(client: Client, url: String) -> ExternalCheck {
    let status = match client.head(&url).send().await {
        Ok(response) => classify_status(response.status().as_u16()),
        Err(e) => classify_error(&e),
    };
    debug!("{} -> {:?}", url, status);
    ExternalCheck { url, status }
}

fn classify_status(code: u16) -> ExternalStatus {
    if code >= 400 {
        ExternalStatus::BadStatus { code }
    } else {
        ExternalStatus::Ok { code }
    }
}

// Categorizes reqwest errors.
//
// None of these mean the link is broken for certain: a sandbox without
// outbound network looks exactly like a dead host.
fn classify_error(error: &reqwest::Error) -> ExternalStatus {
    let reason = if error.is_timeout() {
        Unreachable::Timeout
    } else if error.is_connect() {
        Unreachable::Connection
    } else {
        Unreachable::Other
    };

    ExternalStatus::Unreachable {
        reason,
        detail: error.to_string(),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why buffer_unordered instead of spawning a task per URL?
//    - buffer_unordered(N) keeps at most N futures running at once
//    - That's our worker pool: N in-flight connections, no matter how many
//      links the site has
//    - It's like Promise.all() but with a concurrency limit
//
// 2. Where do the results go?
//    - collect() gathers them into one Vec (the "fan-in" point)
//    - Only after that does anything touch the score, so no locks are needed
//
// 3. Why HEAD?
//    - We only care about the status code, not the body
//    - Some servers answer HEAD with 405; that's >= 400 and is reported as
//      broken, matching what a crawler doing HEAD checks would see
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn urls(items: &[String]) -> BTreeSet<String> {
        items.iter().cloned().collect()
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(200), ExternalStatus::Ok { code: 200 });
        assert_eq!(classify_status(399), ExternalStatus::Ok { code: 399 });
        assert_eq!(classify_status(404), ExternalStatus::BadStatus { code: 404 });
        assert_eq!(classify_status(500), ExternalStatus::BadStatus { code: 500 });
    }

    #[test]
    fn test_user_agent_identifies_tool() {
        assert!(USER_AGENT.contains("site-audit/"));
    }

    #[tokio::test]
    async fn test_ok_and_broken_links() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let ok = format!("{}/ok", server.uri());
        let missing = format!("{}/missing", server.uri());
        let checker = ExternalChecker::new(4, DEFAULT_TIMEOUT).unwrap();
        let results = checker.check_all(&urls(&[ok.clone(), missing.clone()])).await;

        assert_eq!(results.len(), 2);
        // sorted by URL: "/missing" < "/ok"
        assert_eq!(results[0].url, missing);
        assert_eq!(results[0].status, ExternalStatus::BadStatus { code: 404 });
        assert!(results[0].is_broken());
        assert_eq!(results[1].url, ok);
        assert!(results[1].is_ok());
    }

    #[tokio::test]
    async fn test_redirects_are_followed() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let checker = ExternalChecker::new(1, DEFAULT_TIMEOUT).unwrap();
        let results = checker.check_all(&urls(&[format!("{}/old", server.uri())])).await;
        assert_eq!(results[0].status, ExternalStatus::Ok { code: 200 });
    }

    #[tokio::test]
    async fn test_timeout_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let checker = ExternalChecker::new(2, Duration::from_millis(200)).unwrap();
        let results = checker.check_all(&urls(&[format!("{}/slow", server.uri())])).await;
        match &results[0].status {
            ExternalStatus::Unreachable { reason, .. } => assert_eq!(*reason, Unreachable::Timeout),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Bind and drop a listener so the port is known to be closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let checker = ExternalChecker::new(1, DEFAULT_TIMEOUT).unwrap();
        let results = checker
            .check_all(&urls(&[format!("http://127.0.0.1:{}/", port)]))
            .await;
        assert!(matches!(results[0].status, ExternalStatus::Unreachable { .. }));
        assert!(!results[0].is_broken());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let checker = ExternalChecker::new(0, DEFAULT_TIMEOUT).unwrap();
        assert!(checker.check_all(&BTreeSet::new()).await.is_empty());
    }
}
