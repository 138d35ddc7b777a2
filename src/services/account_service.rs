//! Domain service for the account lifecycle.
//!
//! Registration, email verification, login, password reset and profile
//! access. Every failure is a typed outcome; only infrastructure faults
//! surface as `Database`/`Internal`.

use serde::Serialize;
use thiserror::Error;

use crate::entities::accounts::Role;
use crate::services::jwt::SessionTokens;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("This username is already taken")]
    DuplicateUsername,

    /// Deliberately identical for unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive. Please verify your email.")]
    InactiveAccount,

    /// Collapses not-found, expired and tampered into one message.
    #[error("Invalid or expired link")]
    InvalidOrExpiredLink,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Account not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AccountError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Public account view. Never carries the credential.
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub id: i32,
    pub email: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileInfo {
    pub user: AccountInfo,
    pub bio: String,
    pub phone: String,
    pub location: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub tokens: SessionTokens,
    pub user: AccountInfo,
}

/// Registration input. A caller-supplied role or active flag is ignored:
/// public registration always yields an inactive Viewer.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Partial profile update; absent fields are left untouched. The owning
/// account comes from the authenticated caller, never from the payload.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<Option<String>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates a pending (inactive) account plus its empty profile and
    /// dispatches a verification link. Delivery failures do not roll the
    /// account back.
    ///
    /// # Errors
    ///
    /// [`AccountError::DuplicateEmail`], [`AccountError::DuplicateUsername`]
    /// or [`AccountError::Validation`] for malformed email / short password.
    async fn register(&self, registration: Registration) -> Result<AccountInfo, AccountError>;

    /// Consumes a verification link, activating the account. The token is
    /// single-use: activation changes the state it was derived from.
    async fn verify_email(&self, account_ref: &str, token: &str) -> Result<(), AccountError>;

    /// Verifies credentials and issues a stateless access/refresh pair.
    ///
    /// # Errors
    ///
    /// [`AccountError::InvalidCredentials`] for unknown email or wrong
    /// password (indistinguishable); [`AccountError::InactiveAccount`] when
    /// the password matches but the email was never verified.
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AccountError>;

    /// Exchanges a valid refresh token for a fresh pair.
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AccountError>;

    /// Dispatches a reset link when the email exists. Always succeeds with
    /// the same outcome either way so callers cannot enumerate accounts.
    async fn request_password_reset(&self, email: &str) -> Result<(), AccountError>;

    /// Consumes a reset link and replaces the credential, rotating the
    /// state every outstanding reset token was derived from. Activation is
    /// untouched.
    async fn confirm_password_reset(
        &self,
        account_ref: &str,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AccountError>;

    /// Idempotent fetch of the caller's profile, creating an empty one if
    /// it is somehow absent.
    async fn get_or_create_profile(&self, account_id: i32) -> Result<ProfileInfo, AccountError>;

    /// Merges a partial update into the caller's own profile.
    async fn update_profile(
        &self,
        account_id: i32,
        update: ProfileUpdate,
    ) -> Result<ProfileInfo, AccountError>;

    /// Administrative role change; the only path that can grant Admin.
    async fn set_role(&self, account_id: i32, role: Role) -> Result<AccountInfo, AccountError>;
}
