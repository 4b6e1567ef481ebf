use async_trait::async_trait;
use eyre::Report;
use sqlx::{Error as SqlxError, PgPool};
use uuid::Uuid;

use crate::models::account::Account;
use crate::service::error::AuthError;

/// Durable keyed storage for accounts. Uniqueness of the normalized email is
/// enforced by the backing store, not by callers.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthError>;
    async fn insert(&self, account: &Account) -> Result<(), AuthError>;
    async fn update(&self, account: &Account) -> Result<(), AuthError>;
}

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(err: SqlxError, context: &'static str) -> AuthError {
    AuthError::Dependency(Report::new(err).wrap_err(context))
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(e, "Failed to fetch account by email"))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(e, "Failed to fetch account by id"))
    }

    async fn insert(&self, account: &Account) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
                INSERT INTO accounts (
                    id,
                    email,
                    password_hash,
                    verified,
                    otp_code,
                    otp_expires_at,
                    created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.verified)
        .bind(&account.otp_code)
        .bind(account.otp_expires_at)
        .bind(account.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                // A concurrent registration with the same normalized email
                // loses the race on the unique index.
                if let SqlxError::Database(db_err) = &err {
                    if db_err.constraint() == Some("idx_accounts_email") {
                        return Err(AuthError::DuplicateAccount);
                    }
                }
                Err(store_error(err, "Failed to insert account"))
            }
        }
    }

    async fn update(&self, account: &Account) -> Result<(), AuthError> {
        // Only the verification state is mutable; the email and password
        // hash never change after registration.
        sqlx::query(
            r#"
                UPDATE accounts
                SET verified = $1,
                    otp_code = $2,
                    otp_expires_at = $3
                WHERE id = $4
            "#,
        )
        .bind(account.verified)
        .bind(&account.otp_code)
        .bind(account.otp_expires_at)
        .bind(account.id)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error(e, "Failed to update account"))?;

        Ok(())
    }
}
