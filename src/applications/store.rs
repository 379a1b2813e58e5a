//! Persistence for loan applications.
//!
//! The store is append-only: applications are inserted once and read back,
//! never updated or deleted.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{ApplicationStatus, LoanApplication, NewLoanApplication};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Application id space exhausted")]
    IdExhausted,
}

#[async_trait]
pub trait LoanApplicationStore: Send + Sync {
    /// Insert a validated application; the store assigns `id`,
    /// `created_at` and the initial `pending` status.
    async fn create(&self, application: NewLoanApplication) -> Result<LoanApplication, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<LoanApplication>, StoreError>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgLoanApplicationStore {
    db_pool: PgPool,
}

impl PgLoanApplicationStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl LoanApplicationStore for PgLoanApplicationStore {
    async fn create(&self, application: NewLoanApplication) -> Result<LoanApplication, StoreError> {
        let record = sqlx::query_as::<_, LoanApplication>(
            r#"
            INSERT INTO loan_applications (
                first_name, last_name, email, income, identity_file_url,
                amount, duration, currency, iban, payment_method_type, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&application.first_name)
        .bind(&application.last_name)
        .bind(&application.email)
        .bind(application.income)
        .bind(&application.identity_file_url)
        .bind(application.amount)
        .bind(application.duration)
        .bind(application.currency)
        .bind(&application.iban)
        .bind(application.payment_method_type)
        .bind(ApplicationStatus::Pending)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(record)
    }

    async fn get(&self, id: i32) -> Result<Option<LoanApplication>, StoreError> {
        let record =
            sqlx::query_as::<_, LoanApplication>("SELECT * FROM loan_applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?;
        Ok(record)
    }
}

/// Process-local store. Ids start at 1 like a `SERIAL` column.
#[derive(Default)]
pub struct InMemoryLoanApplicationStore {
    records: RwLock<Vec<LoanApplication>>,
}

impl InMemoryLoanApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl LoanApplicationStore for InMemoryLoanApplicationStore {
    async fn create(&self, application: NewLoanApplication) -> Result<LoanApplication, StoreError> {
        let mut records = self.records.write().await;
        let id = i32::try_from(records.len() + 1).map_err(|_| StoreError::IdExhausted)?;
        let record = application.into_record(id, Utc::now());
        records.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: i32) -> Result<Option<LoanApplication>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, PaymentMethodType};

    fn application(email: &str) -> NewLoanApplication {
        NewLoanApplication {
            first_name: "Jane".to_string(),
            last_name: "Roe".to_string(),
            email: email.to_string(),
            income: 4200,
            identity_file_url: None,
            amount: 15000,
            duration: 36,
            currency: Currency::Gbp,
            iban: Some("GB82WEST12345698765432".to_string()),
            payment_method_type: PaymentMethodType::BankTransfer,
        }
    }

    #[tokio::test]
    async fn test_in_memory_assigns_sequential_ids() {
        let store = InMemoryLoanApplicationStore::new();
        let first = store.create(application("a@example.com")).await.unwrap();
        let second = store.create(application("b@example.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, ApplicationStatus::Pending);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_in_memory_duplicates_are_not_merged() {
        let store = InMemoryLoanApplicationStore::new();
        let a = store.create(application("same@example.com")).await.unwrap();
        let b = store.create(application("same@example.com")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_in_memory_get() {
        let store = InMemoryLoanApplicationStore::new();
        let created = store.create(application("c@example.com")).await.unwrap();

        assert_eq!(store.get(created.id).await.unwrap(), Some(created));
        assert_eq!(store.get(42).await.unwrap(), None);
    }
}
