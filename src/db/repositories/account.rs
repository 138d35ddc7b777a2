use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use thiserror::Error;
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::accounts::{self, Role};
use crate::entities::profiles;

/// Errors from account creation and identity updates. Uniqueness is
/// enforced by the database indexes, so concurrent duplicate registrations
/// lose the race here rather than in an application-level check.
#[derive(Debug, Error)]
pub enum AccountRepoError {
    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Username already in use")]
    DuplicateUsername,

    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Input for account creation. The password arrives raw and is hashed
/// here; the email arrives raw and is normalized here.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub role: Role,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Lowercase + trim, applied before every uniqueness check and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct AccountRepository {
    conn: DatabaseConnection,
    security: SecurityConfig,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, security: SecurityConfig) -> Self {
        Self { conn, security }
    }

    /// Create an account together with its empty profile in one
    /// transaction, so no account ever exists without a profile row.
    pub async fn create(&self, new: NewAccount) -> Result<accounts::Model, AccountRepoError> {
        let password = new.password.clone();
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .map_err(|e| DbErr::Custom(format!("Hashing task panicked: {e}")))?
            .map_err(|e| DbErr::Custom(e.to_string()))?;

        let now = chrono::Utc::now().to_rfc3339();

        let txn = self.conn.begin().await?;

        let account = accounts::ActiveModel {
            email: Set(normalize_email(&new.email)),
            username: Set(new.username),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            password_hash: Set(password_hash),
            role: Set(new.role),
            is_active: Set(new.is_active),
            is_staff: Set(new.is_staff),
            is_superuser: Set(new.is_superuser),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(classify_unique_violation)?;

        profiles::ActiveModel {
            account_id: Set(account.id),
            bio: Set(String::new()),
            phone: Set(String::new()),
            location: Set(String::new()),
            avatar_url: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(account)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<accounts::Model>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(normalize_email(email)))
            .one(&self.conn)
            .await
            .context("Failed to query account by email")?;

        Ok(account)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<accounts::Model>> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account by ID")?;

        Ok(account)
    }

    /// Verify a raw password against a stored hash.
    /// Runs on `spawn_blocking` because Argon2 is CPU-intensive and would
    /// block the async runtime if run directly.
    pub async fn verify_password(&self, password_hash: &str, password: &str) -> Result<bool> {
        let password_hash = password_hash.to_string();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    /// Replace the stored credential. The hash is also the state reset
    /// tokens are derived from, so this rotates them all.
    pub async fn set_password(&self, id: i32, new_password: &str) -> Result<()> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for password update")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

        let password = new_password.to_string();
        let security = self.security.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let mut active: accounts::ActiveModel = account.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn set_active(&self, id: i32, is_active: bool) -> Result<()> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for activation update")?
            .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(is_active);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn set_role(&self, id: i32, role: Role) -> Result<Option<accounts::Model>> {
        let Some(account) = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query account for role update")?
        else {
            return Ok(None);
        };

        let mut active: accounts::ActiveModel = account.into();
        active.role = Set(role);
        let updated = active.update(&self.conn).await?;

        Ok(Some(updated))
    }

    /// Update the caller-editable identity fields; anything `None` is left
    /// as it was.
    pub async fn update_identity(
        &self,
        id: i32,
        first_name: Option<String>,
        last_name: Option<String>,
        username: Option<String>,
    ) -> Result<accounts::Model, AccountRepoError> {
        let account = accounts::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Account {id}")))?;

        // An update with nothing set would be rejected by the orm.
        if first_name.is_none() && last_name.is_none() && username.is_none() {
            return Ok(account);
        }

        let mut active: accounts::ActiveModel = account.into();
        if let Some(first_name) = first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = last_name {
            active.last_name = Set(last_name);
        }
        if let Some(username) = username {
            active.username = Set(Some(username));
        }

        let updated = active
            .update(&self.conn)
            .await
            .map_err(classify_unique_violation)?;

        Ok(updated)
    }
}

/// Map a storage-level unique violation to the matching domain error.
fn classify_unique_violation(err: DbErr) -> AccountRepoError {
    let message = err.to_string();
    if message.contains("accounts.email") {
        AccountRepoError::DuplicateEmail
    } else if message.contains("accounts.username") {
        AccountRepoError::DuplicateUsername
    } else {
        AccountRepoError::Database(err)
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, security: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        security.argon2_memory_cost_kib,
        security.argon2_time_cost,
        security.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn unique_violations_are_classified() {
        let email_err = DbErr::Custom(
            "Query Error: UNIQUE constraint failed: accounts.email".to_string(),
        );
        assert!(matches!(
            classify_unique_violation(email_err),
            AccountRepoError::DuplicateEmail
        ));

        let username_err = DbErr::Custom(
            "Query Error: UNIQUE constraint failed: accounts.username".to_string(),
        );
        assert!(matches!(
            classify_unique_violation(username_err),
            AccountRepoError::DuplicateUsername
        ));

        let other = DbErr::Custom("disk I/O error".to_string());
        assert!(matches!(
            classify_unique_violation(other),
            AccountRepoError::Database(_)
        ));
    }
}
