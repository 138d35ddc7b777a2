//! Single-use, time-bounded tokens for email verification and password reset.
//!
//! A token is never persisted. It carries its issuance timestamp plus an
//! HMAC-SHA256 over the account id, the purpose tag, the normalized email
//! and the purpose-relevant mutable field: the activation flag for
//! verification tokens, the password hash for reset tokens. Consuming the
//! protected action changes that field, so a consumed token fails its MAC
//! check on re-presentation. Expiry is an independent window measured from
//! the embedded timestamp.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt::Write;
use std::time::Duration;

use crate::entities::accounts;

type HmacSha256 = Hmac<Sha256>;

/// Separator between MAC input fields; cannot occur in any of them.
const FIELD_SEP: u8 = 0x1f;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenPurpose {
    VerifyEmail,
    ResetPassword,
}

impl TokenPurpose {
    const fn tag(self) -> &'static str {
        match self {
            Self::VerifyEmail => "verify-email",
            Self::ResetPassword => "reset-password",
        }
    }

    /// The mutable account field the token is derived from. Verification
    /// tokens die when the account activates; reset tokens die when the
    /// credential rotates.
    fn state_fingerprint(self, account: &accounts::Model) -> String {
        match self {
            Self::VerifyEmail => format!("active:{}", account.is_active),
            Self::ResetPassword => format!("cred:{}", account.password_hash),
        }
    }
}

#[derive(Clone)]
pub struct LifecycleTokenService {
    secret: Vec<u8>,
    max_age: Duration,
}

impl LifecycleTokenService {
    #[must_use]
    pub fn new(secret: &str, max_age: Duration) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            max_age,
        }
    }

    /// Issue a token bound to the account's current state.
    #[must_use]
    pub fn make_token(&self, account: &accounts::Model, purpose: TokenPurpose) -> String {
        self.make_token_at(account, purpose, Utc::now().timestamp())
    }

    /// Validate a presented token. Fails closed: malformed input, an
    /// unparseable or future timestamp, an elapsed window or a MAC mismatch
    /// all yield `false` without distinguishing which check failed.
    #[must_use]
    pub fn check_token(
        &self,
        account: &accounts::Model,
        purpose: TokenPurpose,
        token: &str,
    ) -> bool {
        self.check_token_at(account, purpose, token, Utc::now().timestamp())
    }

    fn make_token_at(
        &self,
        account: &accounts::Model,
        purpose: TokenPurpose,
        issued_at: i64,
    ) -> String {
        let mac = self.mac_bytes(account, purpose, issued_at);
        format!("{:x}-{}", issued_at, hex_encode(&mac))
    }

    fn check_token_at(
        &self,
        account: &accounts::Model,
        purpose: TokenPurpose,
        token: &str,
        now: i64,
    ) -> bool {
        let Some((ts_part, mac_part)) = token.split_once('-') else {
            return false;
        };

        let Ok(issued_at) = i64::from_str_radix(ts_part, 16) else {
            return false;
        };

        // Tokens from the future are as invalid as expired ones.
        if issued_at > now {
            return false;
        }

        let age = now.saturating_sub(issued_at);
        if u64::try_from(age).is_ok_and(|a| a > self.max_age.as_secs()) {
            return false;
        }

        let Some(presented) = hex_decode(mac_part) else {
            return false;
        };

        let mut mac = self.keyed_mac();
        mac.update(&self.mac_input(account, purpose, issued_at));
        mac.verify_slice(&presented).is_ok()
    }

    fn mac_bytes(&self, account: &accounts::Model, purpose: TokenPurpose, issued_at: i64) -> Vec<u8> {
        let mut mac = self.keyed_mac();
        mac.update(&self.mac_input(account, purpose, issued_at));
        mac.finalize().into_bytes().to_vec()
    }

    fn keyed_mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(&self.secret).expect("HMAC key")
    }

    fn mac_input(
        &self,
        account: &accounts::Model,
        purpose: TokenPurpose,
        issued_at: i64,
    ) -> Vec<u8> {
        let mut input = Vec::new();
        for field in [
            account.id.to_string(),
            purpose.tag().to_string(),
            account.email.clone(),
            purpose.state_fingerprint(account),
            issued_at.to_string(),
        ] {
            input.extend_from_slice(field.as_bytes());
            input.push(FIELD_SEP);
        }
        input
    }
}

/// Reversible opaque encoding of an account id for verification/reset links.
#[must_use]
pub fn encode_account_ref(id: i32) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

/// Decode an opaque account reference. Any decode failure means
/// "account not found" to the caller; it is never an error.
#[must_use]
pub fn decode_account_ref(encoded: &str) -> Option<i32> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()?.parse().ok()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(
        String::with_capacity(bytes.len() * 2),
        |mut acc, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        },
    )
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::accounts::Role;

    fn service() -> LifecycleTokenService {
        LifecycleTokenService::new("unit-test-secret", Duration::from_secs(24 * 3600))
    }

    fn account() -> accounts::Model {
        accounts::Model {
            id: 7,
            email: "a@x.com".to_string(),
            username: None,
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$argon2id$stub".to_string(),
            role: Role::Viewer,
            is_active: false,
            is_staff: false,
            is_superuser: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn round_trip() {
        let svc = service();
        let acct = account();
        let token = svc.make_token(&acct, TokenPurpose::VerifyEmail);
        assert!(svc.check_token(&acct, TokenPurpose::VerifyEmail, &token));
    }

    #[test]
    fn purposes_are_not_interchangeable() {
        let svc = service();
        let acct = account();
        let token = svc.make_token(&acct, TokenPurpose::VerifyEmail);
        assert!(!svc.check_token(&acct, TokenPurpose::ResetPassword, &token));

        let token = svc.make_token(&acct, TokenPurpose::ResetPassword);
        assert!(!svc.check_token(&acct, TokenPurpose::VerifyEmail, &token));
    }

    #[test]
    fn verification_token_dies_with_activation() {
        let svc = service();
        let acct = account();
        let token = svc.make_token(&acct, TokenPurpose::VerifyEmail);

        let mut activated = acct;
        activated.is_active = true;
        assert!(!svc.check_token(&activated, TokenPurpose::VerifyEmail, &token));
    }

    #[test]
    fn reset_token_dies_with_credential_rotation() {
        let svc = service();
        let acct = account();
        let token = svc.make_token(&acct, TokenPurpose::ResetPassword);

        let mut rotated = acct;
        rotated.password_hash = "$argon2id$other".to_string();
        assert!(!svc.check_token(&rotated, TokenPurpose::ResetPassword, &token));
    }

    #[test]
    fn reset_token_survives_activation() {
        // Activation is not the reset token's protected state.
        let svc = service();
        let acct = account();
        let token = svc.make_token(&acct, TokenPurpose::ResetPassword);

        let mut activated = acct;
        activated.is_active = true;
        assert!(svc.check_token(&activated, TokenPurpose::ResetPassword, &token));
    }

    #[test]
    fn token_expires_after_window() {
        let svc = service();
        let acct = account();
        let issued = 1_700_000_000;
        let token = svc.make_token_at(&acct, TokenPurpose::VerifyEmail, issued);

        let inside = issued + 23 * 3600;
        assert!(svc.check_token_at(&acct, TokenPurpose::VerifyEmail, &token, inside));

        let outside = issued + 25 * 3600;
        assert!(!svc.check_token_at(&acct, TokenPurpose::VerifyEmail, &token, outside));
    }

    #[test]
    fn future_and_malformed_tokens_fail_closed() {
        let svc = service();
        let acct = account();
        let now = 1_700_000_000;
        let future = svc.make_token_at(&acct, TokenPurpose::VerifyEmail, now + 600);
        assert!(!svc.check_token_at(&acct, TokenPurpose::VerifyEmail, &future, now));

        for bad in ["", "-", "zzz-abc", "1a2b", "1a2b-nothex", "1a2b-0f0"] {
            assert!(!svc.check_token(&acct, TokenPurpose::VerifyEmail, bad));
        }
    }

    #[test]
    fn tokens_are_account_specific() {
        let svc = service();
        let acct = account();
        let token = svc.make_token(&acct, TokenPurpose::VerifyEmail);

        let mut other = account();
        other.id = 8;
        assert!(!svc.check_token(&other, TokenPurpose::VerifyEmail, &token));
    }

    #[test]
    fn account_ref_round_trip() {
        assert_eq!(decode_account_ref(&encode_account_ref(42)), Some(42));
        assert_eq!(decode_account_ref("not-base64!!"), None);
        assert_eq!(decode_account_ref(""), None);
    }
}
