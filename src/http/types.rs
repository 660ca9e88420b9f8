use std::fmt;

use crate::parser::token::TokenKind;
use crate::{ReqchainError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    /// 关键字词法单元到方法的映射，非方法关键字返回 None
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Get => Some(Method::Get),
            TokenKind::Post => Some(Method::Post),
            TokenKind::Put => Some(Method::Put),
            TokenKind::Delete => Some(Method::Delete),
            TokenKind::Patch => Some(Method::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

/// 默认 host，当 URL 中未指定 host 时使用
const DEFAULT_HOST: &str = "localhost";
/// 默认 scheme，当 URL 中未指定 scheme 时使用
const DEFAULT_SCHEME: &str = "http";

/// 解析 URL，支持简化写法:
/// - ":3000/api" -> "http://localhost:3000/api"
/// - "localhost:3000" -> "http://localhost:3000"
/// - "https://:8080" -> "https://localhost:8080"
pub fn parse_url(s: &str) -> Result<url::Url> {
    let input = s.trim();
    if input.is_empty() {
        return Err(ReqchainError::InvalidUrl("empty URL".to_string()));
    }

    let normalized = if input.starts_with(':') {
        format!("{}://{}{}", DEFAULT_SCHEME, DEFAULT_HOST, input)
    } else if let Some((scheme, rest)) = input.split_once("://") {
        if rest.starts_with(':') {
            format!("{}://{}{}", scheme, DEFAULT_HOST, rest)
        } else {
            input.to_string()
        }
    } else {
        format!("{}://{}", DEFAULT_SCHEME, input)
    };

    url::Url::parse(&normalized).map_err(|e| ReqchainError::InvalidUrl(format!("{}: {}", input, e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u16);

impl Status {
    pub fn new(code: u16) -> Result<Self> {
        if (100..600).contains(&code) {
            Ok(Self(code))
        } else {
            Err(ReqchainError::ParseError(format!(
                "Invalid HTTP status code: {}",
                code
            )))
        }
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.0)
    }

    pub fn reason_phrase(&self) -> &'static str {
        reqwest::StatusCode::from_u16(self.0)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}
