use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::password::{hash_password, verify_password, PasswordError};
use crate::auth::{JwtError, JwtKeys};
use crate::database::models::{User, UserRole};
use crate::database::repositories::UserRepository;
use crate::database::DatabaseError;
use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email format")]
    InvalidEmail,
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
    #[error("display name is required")]
    DisplayNameRequired,
    #[error("An account with this email already exists")]
    EmailExists,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidEmail => ApiError::unprocessable("INVALID_EMAIL", message),
            AuthError::PasswordTooShort => ApiError::unprocessable("PASSWORD_TOO_SHORT", message),
            AuthError::DisplayNameRequired => {
                ApiError::unprocessable("DISPLAY_NAME_REQUIRED", message)
            }
            AuthError::EmailExists => ApiError::conflict("EMAIL_EXISTS", message),
            AuthError::InvalidCredentials => ApiError::Unauthorized {
                code: "INVALID_CREDENTIALS",
                message,
            },
            AuthError::UserNotFound => ApiError::NotFound {
                code: "USER_NOT_FOUND",
                message,
            },
            AuthError::Hashing(e) => {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal_server_error("Failed to process credentials")
            }
            AuthError::Token(e) => {
                tracing::error!("Token issue failed: {}", e);
                ApiError::internal_server_error("Failed to issue token")
            }
            AuthError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// A signed-in account and the token that proves it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// First violated rule wins.
pub fn validate_registration(input: &RegisterInput) -> Result<(), AuthError> {
    if !EMAIL_RE.is_match(input.email.trim()) {
        return Err(AuthError::InvalidEmail);
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    if input.display_name.trim().is_empty() {
        return Err(AuthError::DisplayNameRequired);
    }
    Ok(())
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtKeys) -> Self {
        Self { users, jwt }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.jwt
    }

    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        validate_registration(&input)?;

        let email = normalize_email(&input.email);
        if self.users.email_exists(&email).await? {
            return Err(AuthError::EmailExists);
        }

        let password_hash = hash_password(&input.password).await?;
        let user = self
            .users
            .create(
                &email,
                &password_hash,
                input.display_name.trim(),
                UserRole::User,
            )
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    AuthError::EmailExists
                } else {
                    AuthError::Database(e)
                }
            })?;
        tracing::info!("Registered user {}", user.id);

        let token = self.jwt.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self
            .users
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash).await {
            tracing::debug!("Password mismatch for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    pub async fn me(&self, user_id: i64) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
