use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::ArchiveResult;

/// Raw reply from the archive service. The body is kept undecoded so callers
/// can discriminate on its shape rather than on the status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait ArchiveTransport: Send + Sync {
    /// Issues a GET for `path` (relative to the service root, e.g. `/v1/...`).
    async fn get(&self, path: &str) -> ArchiveResult<HttpResponse>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ArchiveTransport for HttpTransport {
    async fn get(&self, path: &str) -> ArchiveResult<HttpResponse> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}
