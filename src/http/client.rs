use std::time::Duration;

use crate::http::request::Request;
use crate::http::response::Response;
use crate::{ReqchainError, Result};

/// 默认请求超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReqchainError::Request(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { inner })
    }

    pub async fn execute(&self, request: Request) -> Result<Response> {
        let mut req = self
            .inner
            .request(request.method.into(), request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            req = req.body(body);
        }

        let start = std::time::Instant::now();
        let response = req.send().await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        let duration = start.elapsed();

        Response::new(status, headers, body, duration)
    }
}
