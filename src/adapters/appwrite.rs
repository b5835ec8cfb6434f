use crate::config::toml_config::ServiceConfig;
use crate::domain::model::{AccountRecord, RegistrationInput, SessionHandle, SignInInput};
use crate::domain::ports::AccountService;
use crate::utils::error::{AuthError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

const PROJECT_HEADER: &str = "X-Appwrite-Project";

/// Account service backed by an Appwrite-compatible REST API.
///
/// The session cookie returned by sign-in is kept in the client's cookie
/// store, so `check_current_user` sees the session created by `sign_in`.
pub struct AppwriteAccountService {
    client: Client,
    endpoint: String,
    project_id: String,
}

impl AppwriteAccountService {
    pub fn new(endpoint: &str, project_id: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(
            &config.endpoint,
            &config.project_id,
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        tracing::debug!("POST {}", self.url(path));
        let response = self
            .client
            .post(self.url(path))
            .header(PROJECT_HEADER, &self.project_id)
            .json(&body)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!("GET {}", self.url(path));
        let response = self
            .client
            .get(self.url(path))
            .header(PROJECT_HEADER, &self.project_id)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        tracing::debug!("Account service response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn try_create_account(&self, input: &RegistrationInput) -> Result<AccountRecord> {
        // the account API has no username slot
        tracing::debug!("Creating account for username '{}'", input.username);
        self.post(
            "/account",
            json!({
                "userId": "unique()",
                "name": input.name,
                "email": input.email,
                "password": input.password,
            }),
        )
        .await
    }

    pub async fn try_sign_in(&self, credentials: &SignInInput) -> Result<SessionHandle> {
        self.post(
            "/account/sessions/email",
            json!({
                "email": credentials.email,
                "password": credentials.password,
            }),
        )
        .await
    }

    pub async fn try_current_account(&self) -> Result<AccountRecord> {
        self.get("/account").await
    }
}

#[async_trait]
impl AccountService for AppwriteAccountService {
    async fn create_account(&self, input: &RegistrationInput) -> Option<AccountRecord> {
        self.try_create_account(input)
            .await
            .map_err(|e| tracing::warn!("Account creation failed: {}", e))
            .ok()
    }

    async fn sign_in(&self, credentials: &SignInInput) -> Option<SessionHandle> {
        self.try_sign_in(credentials)
            .await
            .map_err(|e| tracing::warn!("Sign-in failed: {}", e))
            .ok()
    }

    async fn check_current_user(&self) -> bool {
        match self.try_current_account().await {
            Ok(account) => {
                tracing::debug!("Current user is {}", account.id);
                true
            }
            Err(e) => {
                tracing::warn!("No current user: {}", e);
                false
            }
        }
    }
}
