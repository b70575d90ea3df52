use async_trait::async_trait;
use reqwest::Client;

use super::{HttpFetcher, HttpResponse, TransportError};

/// [`HttpFetcher`] backed by a shared `reqwest` client with transport defaults.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    http: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, TransportError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .map_err(|e| TransportError::Other(format!("Failed to read response body: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}

fn classify_send_error(err: reqwest::Error) -> TransportError {
    // Strip the URL: it carries the API key as a query parameter.
    let err = err.without_url();
    if err.is_connect() || err.is_timeout() || err.is_request() {
        TransportError::NoResponse(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
