use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::crypto::CryptoService;
use crate::models::account::Account;
use crate::service::email_service::OtpNotifier;
use crate::service::error::AuthError;
use crate::service::store::AccountStore;
use crate::service::token_service::TokenService;

const OTP_TTL_MINUTES: i64 = 10;

/// Orchestrates the credential lifecycle: registration, OTP verification,
/// OTP reissue and login. All collaborators are injected so tests can swap
/// in fakes.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    notifier: Arc<dyn OtpNotifier>,
    crypto: CryptoService,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn OtpNotifier>,
        crypto: CryptoService,
        tokens: TokenService,
    ) -> Self {
        Self {
            store,
            notifier,
            crypto,
            tokens,
        }
    }

    /// Creates an unverified account with a live OTP challenge and emails the
    /// code. The insert happens before the send: if SMTP fails the account
    /// already exists and the caller recovers via resend.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = email.trim().to_lowercase();

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = self.crypto.hash_password(password)?;
        let otp = self.crypto.generate_otp();

        let account = Account {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash,
            verified: false,
            otp_code: Some(otp.clone()),
            otp_expires_at: Some(Utc::now() + Duration::minutes(OTP_TTL_MINUTES)),
            created_at: Utc::now(),
        };

        self.store.insert(&account).await?;
        self.notifier.send_otp(&email, &otp).await?;

        info!(email = %email, "account registered, verification code sent");
        Ok(email)
    }

    /// Consumes an outstanding OTP challenge. Verification is terminal: the
    /// code and expiry are cleared together and can never be reissued.
    #[instrument(skip(self, submitted_code))]
    pub async fn verify_otp(&self, email: &str, submitted_code: &str) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();

        let mut account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if account.verified {
            return Err(AuthError::AlreadyVerified);
        }

        let (code, expires_at) = match (&account.otp_code, account.otp_expires_at) {
            (Some(code), Some(expires_at)) => (code.clone(), expires_at),
            _ => return Err(AuthError::InvalidCode),
        };

        if submitted_code.trim() != code {
            return Err(AuthError::InvalidCode);
        }

        // Expiry is checked lazily here; an expired-but-matching code is
        // still rejected.
        if Utc::now() > expires_at {
            return Err(AuthError::CodeExpired);
        }

        account.verified = true;
        account.otp_code = None;
        account.otp_expires_at = None;
        self.store.update(&account).await?;

        info!(email = %email, "account verified");
        Ok(())
    }

    /// Replaces any outstanding challenge with a fresh code and window, then
    /// emails the new code.
    #[instrument(skip(self))]
    pub async fn resend_otp(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim().to_lowercase();

        let mut account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if account.verified {
            return Err(AuthError::AlreadyVerified);
        }

        let otp = self.crypto.generate_otp();
        account.otp_code = Some(otp.clone());
        account.otp_expires_at = Some(Utc::now() + Duration::minutes(OTP_TTL_MINUTES));

        self.store.update(&account).await?;
        self.notifier.send_otp(&email, &otp).await?;

        info!(email = %email, "verification code reissued");
        Ok(())
    }

    /// Checks the password and mints a bearer token. An unknown email and a
    /// wrong password return the same error so account existence does not
    /// leak.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, Account), AuthError> {
        let email = email.trim().to_lowercase();

        let account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.verified {
            return Err(AuthError::UnverifiedAccount);
        }

        if !self
            .crypto
            .verify_password(password, &account.password_hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.sign(account.id, &account.email)?;

        info!(email = %email, "login successful");
        Ok((token, account))
    }

    pub async fn profile(&self, id: Uuid) -> Result<Account, AuthError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
}
