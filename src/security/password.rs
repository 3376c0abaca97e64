/// Password verification against Argon2id hashes.
///
/// The user service owns hashing at registration time; this module only
/// verifies a presented plaintext against the stored PHC string. The argon2
/// crate performs the comparison in constant time.
use argon2::{Argon2, PasswordHash, PasswordVerifier};

use crate::error::{AuthError, Result};

pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AuthError::Internal("invalid password hash format".to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidPassword)
}
