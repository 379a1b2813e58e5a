//! Application service layer - validation and intake of loan applications

use std::sync::Arc;

use serde_json::Value;

use crate::applications::store::LoanApplicationStore;
use crate::error::ApiError;
use crate::models::LoanApplication;
use crate::validation::parse_application;

/// Loan application intake
#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn LoanApplicationStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn LoanApplicationStore>) -> Self {
        Self { store }
    }

    /// Validate a raw body and persist it as a new application.
    ///
    /// Nothing is written unless the whole payload passes. Each call creates
    /// a new record; identical payloads are not deduplicated.
    pub async fn submit(&self, payload: Value) -> Result<LoanApplication, ApiError> {
        let application = parse_application(&payload).map_err(|err| {
            tracing::debug!(field = %err.field, message = %err.message, "Application rejected");
            err
        })?;

        let record = self.store.create(application).await?;

        tracing::info!(
            application_id = record.id,
            currency = %record.currency,
            amount = record.amount,
            duration = record.duration,
            "Loan application received"
        );

        Ok(record)
    }

    pub async fn get(&self, id: i32) -> Result<LoanApplication, ApiError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Loan application {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::InMemoryLoanApplicationStore;
    use crate::models::ApplicationStatus;
    use serde_json::json;

    fn service() -> (ApplicationService, Arc<InMemoryLoanApplicationStore>) {
        let store = Arc::new(InMemoryLoanApplicationStore::new());
        (ApplicationService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_submit_persists_pending_record() {
        let (service, store) = service();
        let record = service
            .submit(json!({
                "firstName": "John",
                "lastName": "Doe",
                "email": "john@x.com",
                "income": "5000",
                "amount": 10000,
                "duration": 24,
                "currency": "EUR",
                "iban": "DE89370400440532013000",
                "status": "approved"
            }))
            .await
            .unwrap();

        assert_eq!(record.status, ApplicationStatus::Pending);
        assert_eq!(record.income, 5000);
        assert_eq!(store.len().await, 1);
        assert_eq!(service.get(record.id).await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_invalid_submit_writes_nothing() {
        let (service, store) = service();
        let err = service
            .submit(json!({
                "firstName": "John",
                "lastName": "Doe",
                "email": "john@x.com",
                "amount": 10000,
                "duration": 24,
                "currency": "EUR"
            }))
            .await
            .unwrap_err();

        match err {
            ApiError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("income")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (service, _) = service();
        assert!(matches!(service.get(9).await, Err(ApiError::NotFound(_))));
    }
}
