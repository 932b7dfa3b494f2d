//! HTTP request primitive
//!
//! Everything the pipeline knows about HTTP is "issue a GET, receive a
//! status and a body". That primitive is the [`Fetch`] trait; the fetchers
//! are generic over it so tests can substitute canned responses for the
//! network.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// What came back from the wire. A non-2xx status is a normal `Ok` response;
/// only transport-level failures (DNS, connect, timeout) are `Err`.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Response, FetchError>> + Send;
}

/// Some endpoints (the watch page in particular) serve degraded markup to
/// clients without a browser user-agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed [`Fetch`] implementation used outside of tests.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Fetch for HttpClient {
    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Response { status, body })
    }
}
