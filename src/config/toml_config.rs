use crate::domain::model::{EndpointType, Format};
use crate::utils::error::{Open311Error, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Open311Config {
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// 端點設定：wrapper 在兩次呼叫之間可修改的狀態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    #[serde(default)]
    pub format: Format,
    pub jurisdiction_id: Option<String>,
    pub api_key: Option<String>,
    #[serde(rename = "type", default)]
    pub endpoint_type: EndpointType,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>, format: Format) -> Self {
        Self {
            url: url.into(),
            format,
            jurisdiction_id: None,
            api_key: None,
            endpoint_type: EndpointType::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    pub user_agent: Option<String>,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: None,
        }
    }
}

impl Open311Config {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(Open311Error::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| Open311Error::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPEN311_API_KEY})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| Open311Error::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("endpoint.url", &self.endpoint.url)?;

        if let Some(jurisdiction_id) = &self.endpoint.jurisdiction_id {
            validation::validate_non_empty_string("endpoint.jurisdiction_id", jurisdiction_id)?;
        }

        validation::validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 300)?;

        Ok(())
    }
}

impl Validate for Open311Config {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
