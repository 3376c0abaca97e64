//! Shared fixtures for integration tests: an in-process user directory
//! standing in for the user service.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use tokio::sync::Mutex;

use session_service::clients::UserDirectory;
use session_service::error::{AuthError, Result};
use session_service::models::{RegisterRequest, UserRecord};
use session_service::security::jwt::TokenCodec;
use session_service::services::SessionService;
use session_service::store::{InMemoryRefreshTokenStore, RefreshTokenStore};

pub const TEST_SECRET: &str = "integration-test-secret";

#[derive(Default)]
pub struct MockUserDirectory {
    users: Mutex<HashMap<String, UserRecord>>,
    fail_creates: bool,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            fail_creates: true,
        }
    }
}

#[async_trait]
impl UserDirectory for MockUserDirectory {
    async fn create_user(&self, registration: &RegisterRequest) -> Result<()> {
        if self.fail_creates {
            return Err(AuthError::UserCreationFailed(
                "user service unavailable".to_string(),
            ));
        }

        let mut users = self.users.lock().await;
        users.insert(
            registration.email.clone(),
            UserRecord {
                id: uuid::Uuid::new_v4().to_string(),
                name: registration.name.clone(),
                email: registration.email.clone(),
                password: hash_password(&registration.password),
            },
        );
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.lock().await;
        Ok(users.get(email).cloned())
    }
}

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("hashing should succeed")
        .to_string()
}

pub struct TestHarness {
    pub sessions: Arc<SessionService>,
    pub store: Arc<InMemoryRefreshTokenStore>,
}

pub fn harness() -> TestHarness {
    harness_with_directory(Arc::new(MockUserDirectory::new()))
}

pub fn harness_with_directory(directory: Arc<dyn UserDirectory>) -> TestHarness {
    let store = Arc::new(InMemoryRefreshTokenStore::new());
    let store_handle: Arc<dyn RefreshTokenStore> = store.clone();
    let sessions = SessionService::new(TokenCodec::new(TEST_SECRET), store_handle, directory);
    TestHarness {
        sessions: Arc::new(sessions),
        store,
    }
}

pub fn register_request(name: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}
