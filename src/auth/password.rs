use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error(transparent)]
    Bcrypt(#[from] BcryptError),
    #[error("hashing task failed: {0}")]
    Task(#[from] JoinError),
}

/// bcrypt runs on the blocking pool so request workers keep serving.
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_owned();
    Ok(spawn_blocking(move || hash(password, DEFAULT_COST)).await??)
}

/// False on mismatch as well as on a malformed hash.
pub async fn verify_password(password: &str, password_hash: &str) -> bool {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    match spawn_blocking(move || verify(password, &password_hash)).await {
        Ok(result) => result.unwrap_or(false),
        Err(e) => {
            tracing::warn!("Password verification task failed: {}", e);
            false
        }
    }
}
