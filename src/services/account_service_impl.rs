//! `SeaORM` implementation of the `AccountService` trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::repositories::account::hash_password;
use crate::db::{AccountRepoError, NewAccount, ProfileChanges, Store, normalize_email};
use crate::entities::accounts::{self, Role};
use crate::services::account_service::{
    AccountError, AccountInfo, AccountService, LoginOutcome, MIN_PASSWORD_LENGTH, ProfileInfo,
    ProfileUpdate, Registration,
};
use crate::services::jwt::{SessionTokenService, SessionTokens, TokenKind};
use crate::services::notifier::Notifier;
use crate::services::token::{
    LifecycleTokenService, TokenPurpose, decode_account_ref, encode_account_ref,
};

impl From<accounts::Model> for AccountInfo {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            role: model.role,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

pub struct SeaOrmAccountService {
    store: Store,
    lifecycle_tokens: LifecycleTokenService,
    sessions: SessionTokenService,
    notifier: Arc<dyn Notifier>,
    base_url: String,
    send_timeout: Duration,
    /// Verified against when the email is unknown, so login timing does not
    /// reveal whether an account exists.
    dummy_hash: String,
}

impl SeaOrmAccountService {
    pub fn new(
        config: &Config,
        store: Store,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let security = &config.security;

        let lifecycle_tokens = LifecycleTokenService::new(
            &security.signing_secret,
            Duration::from_secs(security.lifecycle_token_max_age_hours * 3600),
        );
        let sessions = SessionTokenService::new(
            &security.signing_secret,
            security.access_token_ttl_minutes,
            security.refresh_token_ttl_days,
        );

        let dummy_hash = hash_password("timing-equalizer", security)?;

        Ok(Self {
            store,
            lifecycle_tokens,
            sessions,
            notifier,
            base_url: config.server.base_url.trim_end_matches('/').to_string(),
            send_timeout: Duration::from_secs(config.email.send_timeout_seconds),
            dummy_hash,
        })
    }

    /// Best-effort dispatch on a blocking task with a deadline. Failures and
    /// timeouts are logged; the triggering operation has already committed.
    async fn dispatch(&self, subject: String, body: String, recipient: String) {
        let notifier = self.notifier.clone();
        let log_recipient = recipient.clone();
        let send = task::spawn_blocking(move || notifier.send(&subject, &body, &recipient));

        match tokio::time::timeout(self.send_timeout, send).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => {
                warn!(recipient = %log_recipient, error = %e, "Email delivery failed");
            }
            Ok(Err(e)) => {
                warn!(recipient = %log_recipient, error = %e, "Email dispatch task panicked");
            }
            Err(_) => {
                warn!(
                    recipient = %log_recipient,
                    timeout_secs = self.send_timeout.as_secs(),
                    "Email dispatch timed out"
                );
            }
        }
    }

    fn verification_link(&self, account: &accounts::Model) -> String {
        let token = self
            .lifecycle_tokens
            .make_token(account, TokenPurpose::VerifyEmail);
        format!(
            "{}/api/accounts/verify-email/{}/{}/",
            self.base_url,
            encode_account_ref(account.id),
            token
        )
    }

    fn reset_link(&self, account: &accounts::Model) -> String {
        let token = self
            .lifecycle_tokens
            .make_token(account, TokenPurpose::ResetPassword);
        format!(
            "{}/api/accounts/reset-password/{}/{}/",
            self.base_url,
            encode_account_ref(account.id),
            token
        )
    }

    /// Resolve an opaque link reference. Every failure mode collapses into
    /// `InvalidOrExpiredLink` so callers cannot probe for accounts.
    async fn account_from_ref(&self, account_ref: &str) -> Result<accounts::Model, AccountError> {
        let id = decode_account_ref(account_ref).ok_or(AccountError::InvalidOrExpiredLink)?;
        self.store
            .get_account_by_id(id)
            .await
            .map_err(AccountError::from)?
            .ok_or(AccountError::InvalidOrExpiredLink)
    }
}

fn validate_email(email: &str) -> Result<(), AccountError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(AccountError::Validation("Enter a valid email address".to_string()))
    }
}

fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

impl From<AccountRepoError> for AccountError {
    fn from(err: AccountRepoError) -> Self {
        match err {
            AccountRepoError::DuplicateEmail => Self::DuplicateEmail,
            AccountRepoError::DuplicateUsername => Self::DuplicateUsername,
            AccountRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[async_trait]
impl AccountService for SeaOrmAccountService {
    async fn register(&self, registration: Registration) -> Result<AccountInfo, AccountError> {
        let email = normalize_email(&registration.email);
        validate_email(&email)?;
        validate_password(&registration.password)?;

        // Public registration is always a pending Viewer; elevation is a
        // separate admin-gated operation.
        let account = self
            .store
            .create_account(NewAccount {
                email,
                username: registration.username,
                first_name: registration.first_name,
                last_name: registration.last_name,
                password: registration.password,
                role: Role::Viewer,
                is_active: false,
                is_staff: false,
                is_superuser: false,
            })
            .await?;

        info!(account_id = account.id, "Account registered, pending verification");

        let greeting = account.display_name();
        let link = self.verification_link(&account);
        self.dispatch(
            "Verify your CountyConnect account".to_string(),
            format!("Hi {greeting},\nClick the link to verify your email: {link}"),
            account.email.clone(),
        )
        .await;

        Ok(account.into())
    }

    async fn verify_email(&self, account_ref: &str, token: &str) -> Result<(), AccountError> {
        let account = self.account_from_ref(account_ref).await?;

        if !self
            .lifecycle_tokens
            .check_token(&account, TokenPurpose::VerifyEmail, token)
        {
            return Err(AccountError::InvalidOrExpiredLink);
        }

        self.store.set_account_active(account.id, true).await?;
        info!(account_id = account.id, "Email verified, account activated");

        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AccountError> {
        let account = self.store.get_account_by_email(email).await?;

        let Some(account) = account else {
            // Burn the same hashing work as the known-account path.
            let _ = self
                .store
                .verify_account_password(&self.dummy_hash, password)
                .await;
            return Err(AccountError::InvalidCredentials);
        };

        let is_valid = self
            .store
            .verify_account_password(&account.password_hash, password)
            .await?;

        if !is_valid {
            return Err(AccountError::InvalidCredentials);
        }

        if !account.is_active {
            return Err(AccountError::InactiveAccount);
        }

        let tokens = self
            .sessions
            .issue_pair(account.id, account.role)
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        Ok(LoginOutcome {
            tokens,
            user: account.into(),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, AccountError> {
        let claims = self
            .sessions
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|_| AccountError::InvalidCredentials)?;

        // Role and activation are re-read so a demoted or deactivated
        // account cannot keep refreshing old claims.
        let account = self
            .store
            .get_account_by_id(claims.sub)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !account.is_active {
            return Err(AccountError::InactiveAccount);
        }

        self.sessions
            .issue_pair(account.id, account.role)
            .map_err(|e| AccountError::Internal(e.to_string()))
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AccountError> {
        let account = self.store.get_account_by_email(email).await?;

        if let Some(account) = account {
            let link = self.reset_link(&account);
            self.dispatch(
                "Reset your CountyConnect password".to_string(),
                format!("Hi,\nClick the link below to reset your password:\n{link}"),
                account.email.clone(),
            )
            .await;
        }

        // Identical outcome whether or not the email exists.
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        account_ref: &str,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AccountError> {
        if password != confirm_password {
            return Err(AccountError::PasswordMismatch);
        }
        validate_password(password)?;

        let account = self.account_from_ref(account_ref).await?;

        if !self
            .lifecycle_tokens
            .check_token(&account, TokenPurpose::ResetPassword, token)
        {
            return Err(AccountError::InvalidOrExpiredLink);
        }

        self.store.set_account_password(account.id, password).await?;
        info!(account_id = account.id, "Password reset completed");

        Ok(())
    }

    async fn get_or_create_profile(&self, account_id: i32) -> Result<ProfileInfo, AccountError> {
        let account = self
            .store
            .get_account_by_id(account_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        let profile = self.store.get_or_create_profile(account_id).await?;

        Ok(ProfileInfo {
            user: account.into(),
            bio: profile.bio,
            phone: profile.phone,
            location: profile.location,
            avatar_url: profile.avatar_url,
        })
    }

    async fn update_profile(
        &self,
        account_id: i32,
        update: ProfileUpdate,
    ) -> Result<ProfileInfo, AccountError> {
        let account = self
            .store
            .update_account_identity(
                account_id,
                update.first_name,
                update.last_name,
                update.username,
            )
            .await?;

        let profile = self
            .store
            .update_profile(
                account_id,
                ProfileChanges {
                    bio: update.bio,
                    phone: update.phone,
                    location: update.location,
                    avatar_url: update.avatar_url,
                },
            )
            .await?;

        Ok(ProfileInfo {
            user: account.into(),
            bio: profile.bio,
            phone: profile.phone,
            location: profile.location,
            avatar_url: profile.avatar_url,
        })
    }

    async fn set_role(&self, account_id: i32, role: Role) -> Result<AccountInfo, AccountError> {
        let updated = self
            .store
            .set_account_role(account_id, role)
            .await?
            .ok_or(AccountError::NotFound)?;

        info!(account_id, role = ?role, "Role updated by administrator");

        Ok(updated.into())
    }
}
