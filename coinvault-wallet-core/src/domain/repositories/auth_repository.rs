//! Authentication API

use crate::shared::constants::MIN_FULL_NAME_LENGTH;
use crate::shared::error::WalletError;
use crate::shared::types::{AuthSession, User};
use crate::shared::utils::{validate_email, validate_password};
use crate::shared::WalletResult;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Body of `POST /auth/login`, validated on construction
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: &str) -> WalletResult<Self> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(WalletError::validation("Please fill in all fields"));
        }
        validate_email(email)?;
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /auth/register`, validated on construction
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    full_name: String,
    email: String,
    password: String,
}

impl RegisterRequest {
    pub fn new(full_name: &str, email: &str, password: &str, confirm_password: &str) -> WalletResult<Self> {
        let full_name = full_name.trim();
        let email = email.trim();
        if full_name.is_empty() || email.is_empty() || password.is_empty() || confirm_password.is_empty() {
            return Err(WalletError::validation("Please fill in all fields"));
        }
        if full_name.chars().count() < MIN_FULL_NAME_LENGTH {
            return Err(WalletError::validation(format!(
                "Full name must be at least {} characters",
                MIN_FULL_NAME_LENGTH
            )));
        }
        validate_email(email)?;
        validate_password(password)?;
        if password != confirm_password {
            return Err(WalletError::validation("Passwords do not match"));
        }
        Ok(Self {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> WalletResult<AuthSession>;

    async fn register(&self, request: &RegisterRequest) -> WalletResult<AuthSession>;

    /// Resolve the user behind a bearer token
    async fn me(&self, token: &str) -> WalletResult<User>;

    /// Token for subsequent authenticated calls; `None` after logout
    fn use_token(&self, _token: Option<&str>) {}
}
