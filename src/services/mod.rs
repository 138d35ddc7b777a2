pub mod account_service;
pub mod account_service_impl;
pub mod jwt;
pub mod notifier;
pub mod policy;
pub mod token;

pub use account_service::{
    AccountError, AccountInfo, AccountService, LoginOutcome, ProfileInfo, ProfileUpdate,
    Registration,
};
pub use account_service_impl::SeaOrmAccountService;
pub use jwt::{Claims, SessionTokenService, SessionTokens, TokenKind};
pub use notifier::{LogNotifier, Notifier, SmtpNotifier};
pub use policy::Role;
pub use token::{LifecycleTokenService, TokenPurpose};
