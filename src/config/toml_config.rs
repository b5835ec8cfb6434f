use crate::core::registration::DEFAULT_LANDING_ROUTE;
use crate::core::schema::{ValidationSchema, DEFAULT_PASSWORD_MIN_LENGTH};
use crate::utils::error::{AuthError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub project_id: String,
    pub timeout_seconds: Option<u64>,
}

impl ServiceConfig {
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationConfig {
    pub landing_route: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// 密碼最短長度；預設 0，維持原本寬鬆的行為
    pub password_min_length: Option<usize>,
}

impl TomlConfig {
    /// 只有服務端點與專案 ID，其餘使用預設值
    pub fn for_service(endpoint: &str, project_id: &str) -> Self {
        Self {
            service: ServiceConfig {
                endpoint: endpoint.to_string(),
                project_id: project_id.to_string(),
                timeout_seconds: None,
            },
            navigation: NavigationConfig::default(),
            validation: ValidationConfig::default(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AuthError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AuthError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${APPWRITE_PROJECT_ID})，未設定的保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AuthError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("service.endpoint", &self.service.endpoint)?;

        validation::validate_no_placeholder("service.project_id", &self.service.project_id)?;
        validation::validate_non_empty_string("service.project_id", &self.service.project_id)?;

        validation::validate_range("service.timeout_seconds", self.service.timeout_seconds(), 1, 300)?;

        validation::validate_route("navigation.landing_route", self.landing_route())?;

        Ok(())
    }

    pub fn landing_route(&self) -> &str {
        self.navigation
            .landing_route
            .as_deref()
            .unwrap_or(DEFAULT_LANDING_ROUTE)
    }

    pub fn password_min_length(&self) -> usize {
        self.validation
            .password_min_length
            .unwrap_or(DEFAULT_PASSWORD_MIN_LENGTH)
    }

    pub fn schema(&self) -> ValidationSchema {
        ValidationSchema::sign_up_with_password_min(self.password_min_length())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
