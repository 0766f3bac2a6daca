use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Implemented by [`BasicClient`](super::BasicClient)
/// and by decorators such as [`UrlParam`](super::auth::UrlParam) that rewrite
/// the request before handing it on.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
