use reqwest::header::{HeaderMap as Headers, HeaderName, HeaderValue};

use crate::http::types::{Method, parse_url};
use crate::{ReqchainError, Result};

/// 待发送的请求，所有模板占位符都已替换
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: url::Url,
    pub headers: Headers,
    pub body: Option<String>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Result<Self> {
        Ok(Self {
            method,
            url: parse_url(url)?,
            headers: Headers::new(),
            body: None,
        })
    }

    /// 追加 header；同名 header 保留多份
    fn append_header(&mut self, key: &str, value: &str) -> Result<()> {
        let name: HeaderName = key
            .parse()
            .map_err(|_| ReqchainError::Request(format!("invalid header name: {}", key)))?;
        let value: HeaderValue = value
            .parse()
            .map_err(|_| ReqchainError::Request(format!("invalid value for header {}", key)))?;
        self.headers.append(name, value);
        Ok(())
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self> {
        self.append_header(key, value)?;
        Ok(self)
    }

    /// 设置已序列化的 JSON body
    pub fn with_json_text(mut self, json: impl Into<String>) -> Self {
        self.body = Some(json.into());
        self
    }

    pub fn with_auth_bearer(self, token: &str) -> Result<Self> {
        self.with_header("Authorization", &format!("Bearer {}", token))
    }

    /// 同名 header 的所有值，按添加顺序
    pub fn header_values(&self, key: &str) -> Vec<&str> {
        self.headers
            .get_all(key)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_headers_are_preserved() {
        let request = Request::new(Method::Get, "http://example.com")
            .unwrap()
            .with_header("X-Tag", "a")
            .unwrap()
            .with_header("x-tag", "b")
            .unwrap();
        assert_eq!(request.header_values("X-Tag"), vec!["a", "b"]);
    }

    #[test]
    fn test_bearer_token() {
        let request = Request::new(Method::Get, "http://example.com")
            .unwrap()
            .with_auth_bearer("secret")
            .unwrap();
        assert_eq!(request.header_values("authorization"), vec!["Bearer secret"]);
    }

    #[test]
    fn test_invalid_header_name() {
        let result = Request::new(Method::Get, "http://example.com")
            .unwrap()
            .with_header("bad header", "x");
        assert!(matches!(result, Err(ReqchainError::Request(_))));
    }

    #[test]
    fn test_invalid_url() {
        assert!(Request::new(Method::Get, "http://exa mple.com").is_err());
    }
}
