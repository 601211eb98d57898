use crate::core::ConfigProvider;
use crate::utils::error::{Result, SspError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

pub const API_URL: &str = "https://solarsystem.linea.org.br";
pub const PAGE_SIZE: usize = 100;
pub const ASTEROID_ENDPOINT: &str = "/api/asteroids";
pub const PREDICTION_ENDPOINT: &str = "/api/occultations";

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub asteroid_endpoint: String,
    pub prediction_endpoint: String,
    pub page_size: usize,
    pub timeout_seconds: Option<u64>,
    pub show_progress: bool,
    pub user_agent: Option<String>,
    pub headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_URL.to_string(),
            asteroid_endpoint: ASTEROID_ENDPOINT.to_string(),
            prediction_endpoint: PREDICTION_ENDPOINT.to_string(),
            page_size: PAGE_SIZE,
            timeout_seconds: Some(60),
            show_progress: true,
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// 使用自訂 base URL，其餘沿用預設值
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SspError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SspError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SSP_TOKEN})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// base URL 去掉結尾的 '/'，方便直接串接端點路徑
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl ConfigProvider for ClientConfig {
    fn base_url(&self) -> &str {
        self.trimmed_base_url()
    }

    fn asteroid_endpoint(&self) -> &str {
        &self.asteroid_endpoint
    }

    fn prediction_endpoint(&self) -> &str {
        &self.prediction_endpoint
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }

    fn show_progress(&self) -> bool {
        self.show_progress
    }

    fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_endpoint_path("asteroid_endpoint", &self.asteroid_endpoint)?;
        validation::validate_endpoint_path("prediction_endpoint", &self.prediction_endpoint)?;
        validation::validate_positive_number("page_size", self.page_size, 1)?;

        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("timeout_seconds", timeout as usize, 1)?;
        }

        if let Some(agent) = &self.user_agent {
            validation::validate_non_empty_string("user_agent", agent)?;
        }

        Ok(())
    }
}
