//! Canned-response HTTP client for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::client::{Fetch, Response};
use crate::error::FetchError;

/// Routes requests by substring match against the URL, in registration
/// order. Unrouted URLs fail like a transport error. Counts every request
/// so tests can assert on network activity (or the absence of it).
pub(crate) struct MockClient {
    routes: Vec<(String, Response)>,
    requests: Mutex<Vec<String>>,
    count: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        }
    }

    pub fn route(mut self, url_part: &str, status: u16, body: &str) -> Self {
        self.routes.push((
            url_part.to_string(),
            Response {
                status,
                body: body.to_string(),
            },
        ));
        self
    }

    pub fn request_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetch for MockClient {
    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(url.to_string());

        self.routes
            .iter()
            .find(|(part, _)| url.contains(part.as_str()))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| FetchError::Request(format!("no mock route for {url}")))
    }
}
