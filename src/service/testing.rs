//! In-memory fakes standing in for the Postgres store and the SMTP notifier.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use color_eyre::Result;
use uuid::Uuid;

use crate::models::account::Account;
use crate::service::email_service::OtpNotifier;
use crate::service::error::AuthError;
use crate::service::store::AccountStore;

/// Keyed by normalized email, mirroring the unique index on the real table.
pub struct InMemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self, email: &str) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned()
    }

    /// Backdates the outstanding challenge so expiry paths can be exercised
    /// without waiting out the window.
    pub fn expire_otp(&self, email: &str) {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.email == email) {
            account.otp_expires_at = Some(Utc::now() - Duration::minutes(1));
        }
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        Ok(self.get(email))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn insert(&self, account: &Account) -> Result<(), AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AuthError::DuplicateAccount);
        }
        accounts.push(account.clone());
        Ok(())
    }

    async fn update(&self, account: &Account) -> Result<(), AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.iter_mut().find(|a| a.id == account.id) {
            Some(stored) => {
                *stored = account.clone();
                Ok(())
            }
            None => Err(AuthError::AccountNotFound),
        }
    }
}

/// Records every (recipient, code) pair instead of sending anything.
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn last_sent(&self) -> Option<(String, String)> {
        self.sent.lock().unwrap().last().cloned()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl OtpNotifier for RecordingNotifier {
    async fn send_otp(&self, to: &str, code: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), code.to_string()));
        Ok(())
    }
}

/// Always fails, for exercising the persisted-but-unnotified path.
pub struct FailingNotifier;

#[async_trait]
impl OtpNotifier for FailingNotifier {
    async fn send_otp(&self, _to: &str, _code: &str) -> Result<()> {
        Err(eyre::eyre!("smtp connection refused"))
    }
}
