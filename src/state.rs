use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, LogNotifier, Notifier, SeaOrmAccountService, SessionTokenService,
    SmtpNotifier,
};

/// Picks the transport from config: real SMTP when enabled, otherwise a
/// notifier that logs the message instead of sending it.
fn build_notifier(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    if config.email.smtp_enabled {
        Ok(Arc::new(SmtpNotifier::new(&config.email)?))
    } else {
        Ok(Arc::new(LogNotifier))
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub accounts: Arc<dyn AccountService>,

    /// Verifies Bearer tokens on protected routes.
    pub sessions: Arc<SessionTokenService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let notifier = build_notifier(&config)?;
        Self::with_notifier(config, notifier).await
    }

    /// Same as [`SharedState::new`] but with a caller-supplied notifier,
    /// which is how tests capture the links that would go out by email.
    pub async fn with_notifier(
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.security.clone(),
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let accounts: Arc<dyn AccountService> = Arc::new(SeaOrmAccountService::new(
            &config,
            store.clone(),
            notifier,
        )?);

        let sessions = Arc::new(SessionTokenService::new(
            &config.security.signing_secret,
            config.security.access_token_ttl_minutes,
            config.security.refresh_token_ttl_days,
        ));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            accounts,
            sessions,
        })
    }
}
