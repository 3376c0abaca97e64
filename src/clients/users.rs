/// User service client.
///
/// The user service owns identity records and password hashing; this service
/// only asks it to create users and to look them up by email. It is injected
/// as a capability so the session logic can be tested against a substitute.
use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{AuthError, Result};
use crate::models::{RegisterRequest, UserRecord};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create the user record. The directory hashes the password before
    /// persisting; any non-success outcome is a uniform failure and no
    /// session state may be issued for it.
    async fn create_user(&self, registration: &RegisterRequest) -> Result<()>;

    /// Look up a user by email. `None` covers unknown users; transport
    /// failures are logged and collapse into `None` so login responses stay
    /// uniform.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
}

pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserDirectory {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn create_user(&self, registration: &RegisterRequest) -> Result<()> {
        let url = format!("{}/users", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(registration)
            .send()
            .await
            .map_err(|e| AuthError::UserCreationFailed(e.to_string()))?;

        if response.status() != StatusCode::CREATED {
            return Err(AuthError::UserCreationFailed(format!(
                "user service responded with {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let url = format!("{}/users/email/{}", self.base_url, email);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("user service lookup failed: {}", e);
                return Ok(None);
            }
        };

        if response.status() != StatusCode::OK {
            return Ok(None);
        }

        match response.json::<UserRecord>().await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("failed to decode user service response: {}", e);
                Ok(None)
            }
        }
    }
}
