use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::client::DEFAULT_TIMEOUT;
use crate::{ReqchainError, Result};

/// 认证配置
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// 登录接口所在的服务地址
    pub api_url: Option<String>,
    pub client_id: Option<String>,
    pub api_key: Option<String>,
    /// 固定 token，设置后不再调用登录接口
    pub token: Option<String>,
}

/// HTTP 客户端配置
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
}

/// 完整的配置文件
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        self.http
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// 展开 `${VAR}` 后再用环境变量覆盖
    fn resolve(mut self, env: impl Fn(&str) -> Option<String>) -> Self {
        let auth = &mut self.auth;
        for (field, var) in [
            (&mut auth.api_url, "REQCHAIN_API_URL"),
            (&mut auth.client_id, "REQCHAIN_CLIENT_ID"),
            (&mut auth.api_key, "REQCHAIN_API_KEY"),
            (&mut auth.token, "REQCHAIN_TOKEN"),
        ] {
            if let Some(value) = field.take() {
                *field = Some(resolve_env_vars(&value, &env));
            }
            if let Some(value) = env(var).filter(|v| !v.is_empty()) {
                *field = Some(value);
            }
        }
        self
    }
}

static ENV_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env pattern is valid")
});

/// 解析并替换 `${VAR}`，未定义的变量保持原样
pub fn resolve_env_vars(text: &str, env: impl Fn(&str) -> Option<String>) -> String {
    ENV_REGEX.replace_all(text, |caps: &Captures| {
        env(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
    .to_string()
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "reqchain.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ReqchainError::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            ReqchainError::Config(format!(
                "failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// 加载配置
    ///
    /// 显式路径必须存在；否则依次查找当前目录及其父目录、
    /// `~/.config/reqchain/`，都没有时使用默认配置
    pub fn load(explicit: Option<&Path>) -> Result<AppConfig> {
        let config = match explicit {
            Some(path) => Self::load_from_path(path)?,
            None => match Self::find() {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "using config file");
                    Self::load_from_path(&path)?
                }
                None => AppConfig::default(),
            },
        };
        Ok(config.resolve(process_env))
    }

    /// 查找配置文件路径
    pub fn find() -> Option<PathBuf> {
        Self::find_in_ancestors().or_else(Self::find_in_user_dir)
    }

    fn find_in_ancestors() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let config_path = dirs::home_dir()?
            .join(".config")
            .join("reqchain")
            .join(Self::CONFIG_FILE);

        config_path.exists().then_some(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fake_env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_load_from_path() {
        let config_content = r#"
[auth]
api_url = "http://localhost:8080"
client_id = "client"
api_key = "key"

[http]
timeout_secs = 5
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.auth.api_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.auth.token, None);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[auth\napi_url = 1").unwrap();
        temp_file.flush().unwrap();

        let result = ConfigLoader::load_from_path(temp_file.path());
        assert!(matches!(result, Err(ReqchainError::Config(_))));
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.auth, AuthConfig::default());
    }

    #[test]
    fn test_resolve_env_placeholders() {
        let config: AppConfig = toml::from_str(
            r#"
[auth]
api_url = "https://${HOST}/base"
api_key = "${MISSING}"
"#,
        )
        .unwrap();

        let resolved = config.resolve(fake_env(&[("HOST", "api.example.com")]));
        assert_eq!(
            resolved.auth.api_url.as_deref(),
            Some("https://api.example.com/base")
        );
        assert_eq!(resolved.auth.api_key.as_deref(), Some("${MISSING}"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let config: AppConfig = toml::from_str("[auth]\ntoken = \"from-file\"").unwrap();
        let resolved = config.resolve(fake_env(&[
            ("REQCHAIN_TOKEN", "from-env"),
            ("REQCHAIN_CLIENT_ID", "cid"),
        ]));
        assert_eq!(resolved.auth.token.as_deref(), Some("from-env"));
        assert_eq!(resolved.auth.client_id.as_deref(), Some("cid"));
    }
}
