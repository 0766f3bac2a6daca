//! Canned-response client for unit tests.

use super::client::HttpClient;
use async_trait::async_trait;
use std::sync::Mutex;

pub(crate) struct StubClient {
    status: u16,
    body: String,
    seen: Mutex<Vec<reqwest::Url>>,
}

impl StubClient {
    pub(crate) fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn ok(body: &str) -> Self {
        Self::new(200, body)
    }

    pub(crate) fn last_url(&self) -> Option<reqwest::Url> {
        self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.seen.lock().unwrap().push(req.url().clone());
        let resp = http::Response::builder()
            .status(self.status)
            .body(self.body.clone())
            .unwrap();
        Ok(reqwest::Response::from(resp))
    }
}
