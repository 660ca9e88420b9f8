use crate::Result;
use crate::http::types::Status;
use reqwest::header::HeaderMap as Headers;
use std::time::Duration;

/// 完整缓冲后的响应
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub headers: Headers,
    pub body: String,
    pub duration: Duration,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: String, duration: Duration) -> Result<Self> {
        Ok(Self {
            status: Status::new(status)?,
            headers,
            body,
            duration,
        })
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// B3 链路追踪 ID（如果服务端返回）
    pub fn trace_id(&self) -> Option<&str> {
        self.headers
            .get("X-B3-Traceid")
            .and_then(|value| value.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_and_trace_id() {
        let mut headers = Headers::new();
        headers.insert("x-b3-traceid", "abc123".parse().unwrap());
        let response = Response::new(
            200,
            headers,
            r#"{"id": 1}"#.to_string(),
            Duration::from_millis(5),
        )
        .unwrap();

        assert!(response.is_success());
        assert_eq!(response.trace_id(), Some("abc123"));
        assert_eq!(response.body, r#"{"id": 1}"#);
    }

    #[test]
    fn test_non_json_body() {
        let response =
            Response::new(500, Headers::new(), "oops".to_string(), Duration::ZERO).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.trace_id(), None);
    }
}
