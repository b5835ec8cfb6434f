use crate::config::toml_config::TomlConfig;
use crate::domain::model::{Field, RegistrationInput};
use crate::utils::error::{AuthError, Result};
use clap::Parser;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "memories-signup")]
#[command(about = "Create a memories account and sign in")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "memories.toml")]
    pub config: String,

    /// Override the account service endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Override the account service project id
    #[arg(long)]
    pub project_id: Option<String>,

    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub username: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, env = "MEMORIES_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 讀取設定檔並套用命令列覆蓋；沒有設定檔時只靠命令列參數
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = if Path::new(&self.config).exists() {
            TomlConfig::from_file(&self.config)?
        } else {
            tracing::debug!("Config file '{}' not found, using command line only", self.config);
            let endpoint = self.endpoint.as_deref().ok_or_else(|| AuthError::MissingConfigError {
                field: "service.endpoint (--endpoint)".to_string(),
            })?;
            let project_id =
                self.project_id
                    .as_deref()
                    .ok_or_else(|| AuthError::MissingConfigError {
                        field: "service.project_id (--project-id)".to_string(),
                    })?;
            TomlConfig::for_service(endpoint, project_id)
        };

        if let Some(endpoint) = &self.endpoint {
            config.service.endpoint = endpoint.clone();
        }
        if let Some(project_id) = &self.project_id {
            config.service.project_id = project_id.clone();
        }

        Ok(config)
    }

    /// Field values in form order, as the user would type them.
    pub fn field_values(&self) -> [(Field, &str); 4] {
        [
            (Field::Name, self.name.as_str()),
            (Field::Username, self.username.as_str()),
            (Field::Email, self.email.as_str()),
            (Field::Password, self.password.as_str()),
        ]
    }

    pub fn registration_input(&self) -> RegistrationInput {
        let mut input = RegistrationInput::default();
        for (field, value) in self.field_values() {
            input.set(field, value.to_string());
        }
        input
    }
}
