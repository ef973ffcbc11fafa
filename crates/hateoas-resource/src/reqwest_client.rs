//! A network transport backed by `reqwest`. Enabled with the `reqwest` feature.
//!
//! Relative hrefs are resolved against the configured base URL. The response
//! body is read chunk by chunk, reporting progress after each chunk.

use crate::error::ResourceError;
use crate::http::{HttpClient, HttpRequest, HttpResponse, Progress, ProgressSink};
use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestClient {
    /// `base_url` is prefixed to hrefs that start with `/`, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, href: &str) -> String {
        if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            href.to_string()
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(
        &self,
        request: HttpRequest,
        progress: ProgressSink,
    ) -> Result<HttpResponse, ResourceError> {
        let url = self.resolve(&request.url);
        debug!(method = %request.method, %url, "Dispatching over network");

        let mut builder = self.client.request(request.method, url);
        if let Some(data) = request.data {
            builder = builder.header(CONTENT_TYPE, "application/json").body(data);
        }
        let mut response = builder
            .send()
            .await
            .map_err(|e| ResourceError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let total = response.content_length();
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ResourceError::Transport(e.to_string()))?
        {
            bytes.extend_from_slice(&chunk);
            progress.notify(Progress {
                loaded: bytes.len() as u64,
                total,
            });
        }

        Ok(HttpResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
