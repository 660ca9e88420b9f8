use serde::Deserialize;

use crate::config::AuthConfig;
use crate::http::Client;
use crate::{ReqchainError, Result};

/// 登录接口路径
pub const LOGIN_PATH: &str = "/api/v1/authentication/login";

/// 凭据提供者：每次运行开始前调用一次
#[allow(async_fn_in_trait)]
pub trait TokenProvider {
    async fn token(&self) -> Result<String>;
}

/// 固定 token
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    expires_at: Option<String>,
}

/// 通过登录接口换取 token
#[derive(Clone)]
pub struct LoginTokenProvider {
    client: Client,
    api_url: String,
    client_id: String,
    api_key: String,
}

impl LoginTokenProvider {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        client_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            client_id: client_id.into(),
            api_key: api_key.into(),
        }
    }

    fn login_url(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), LOGIN_PATH)
    }
}

impl TokenProvider for LoginTokenProvider {
    async fn token(&self) -> Result<String> {
        let url = self.login_url();
        tracing::debug!(url = %url, "requesting access token");

        let request = crate::http::Request::new(crate::http::Method::Post, &url)
            .and_then(|r| r.with_header("Content-Type", "application/json"))
            .and_then(|r| r.with_header("x-client-id", &self.client_id))
            .and_then(|r| r.with_header("x-api-key", &self.api_key))
            .map_err(|e| ReqchainError::Auth(e.to_string()))?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ReqchainError::Auth(e.to_string()))?;

        if !response.is_success() {
            return Err(ReqchainError::Auth(format!(
                "login failed with status {}",
                response.status
            )));
        }

        let login: LoginResponse = serde_json::from_str(&response.body)
            .map_err(|e| ReqchainError::Auth(format!("invalid login response: {}", e)))?;
        tracing::debug!(expires_at = ?login.expires_at, "login succeeded");

        login
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ReqchainError::Auth("login response has no token".to_string()))
    }
}

/// 按配置选择的凭据来源
#[derive(Clone)]
pub enum ConfiguredTokenProvider {
    Static(StaticTokenProvider),
    Login(LoginTokenProvider),
    Missing,
}

impl ConfiguredTokenProvider {
    /// 优先使用固定 token，其次使用登录接口
    pub fn from_config(auth: &AuthConfig, client: Client) -> Self {
        if let Some(token) = auth.token.as_deref().filter(|t| !t.is_empty()) {
            return Self::Static(StaticTokenProvider::new(token));
        }

        match auth.api_url.as_deref().filter(|u| !u.is_empty()) {
            Some(api_url) => Self::Login(LoginTokenProvider::new(
                client,
                api_url,
                auth.client_id.clone().unwrap_or_default(),
                auth.api_key.clone().unwrap_or_default(),
            )),
            None => Self::Missing,
        }
    }
}

impl TokenProvider for ConfiguredTokenProvider {
    async fn token(&self) -> Result<String> {
        match self {
            Self::Static(provider) => provider.token().await,
            Self::Login(provider) => provider.token().await,
            Self::Missing => Err(ReqchainError::Auth(
                "no credentials configured: set auth.token or auth.api_url".to_string(),
            )),
        }
    }
}
