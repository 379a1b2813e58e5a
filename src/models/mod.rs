//! Data models for the NexBank loan intake backend

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};

/// Currencies a loan can be requested in
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Hash)]
#[sqlx(type_name = "currency_code", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Gbp,
    Chf,
    Jpy,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Eur,
        Currency::Usd,
        Currency::Gbp,
        Currency::Chf,
        Currency::Jpy,
    ];

    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Chf => "CHF",
            Currency::Jpy => "JPY",
        }
    }

    /// Parse an ISO code, case-sensitive like the wire format
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// How approved funds are disbursed
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "payment_method_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    #[default]
    BankTransfer,
    /// Direct-to-card payout. Not offered to applicants yet.
    Card,
}

impl PaymentMethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodType::BankTransfer => "bank_transfer",
            PaymentMethodType::Card => "card",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bank_transfer" => Some(PaymentMethodType::BankTransfer),
            "card" => Some(PaymentMethodType::Card),
            _ => None,
        }
    }
}

/// Review status of an application.
///
/// Only `Pending` is ever written here; the other states belong to a
/// back-office review process that lives elsewhere.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Persisted loan application
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub income: i32,
    pub identity_file_url: Option<String>,
    pub amount: i32,
    pub duration: i32,
    pub currency: Currency,
    pub iban: Option<String>,
    pub payment_method_type: PaymentMethodType,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// A validated application that has not been stored yet.
///
/// Only the validation module builds these, so anything holding one has
/// passed the full schema.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewLoanApplication {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub income: i32,
    pub identity_file_url: Option<String>,
    pub amount: i32,
    pub duration: i32,
    pub currency: Currency,
    pub iban: Option<String>,
    pub payment_method_type: PaymentMethodType,
}

impl NewLoanApplication {
    /// Attach server-assigned fields
    pub fn into_record(self, id: i32, created_at: DateTime<Utc>) -> LoanApplication {
        LoanApplication {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            income: self.income,
            identity_file_url: self.identity_file_url,
            amount: self.amount,
            duration: self.duration,
            currency: self.currency,
            iban: self.iban,
            payment_method_type: self.payment_method_type,
            status: ApplicationStatus::Pending,
            created_at,
        }
    }
}

/// Body the wizard posts to `/api/loans`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanApplicationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub income: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_file_url: Option<String>,
    pub amount: i64,
    pub duration: i64,
    pub currency: Currency,
    pub iban: String,
    pub payment_method_type: PaymentMethodType,
}

/// Response of `/api/upload`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FileUploadResponse {
    pub url: String,
    pub filename: String,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_codes_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::from_code(currency.code()), Some(currency));
        }
        assert_eq!(Currency::from_code("eur"), None);
        assert_eq!(Currency::from_code("BTC"), None);
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(serde_json::to_string(&Currency::Chf).unwrap(), "\"CHF\"");
        assert_eq!(
            serde_json::to_string(&PaymentMethodType::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::Pending).unwrap(),
            "\"pending\""
        );
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = NewLoanApplication {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john@x.com".to_string(),
            income: 5000,
            identity_file_url: None,
            amount: 10000,
            duration: 24,
            currency: Currency::Eur,
            iban: Some("DE89370400440532013000".to_string()),
            payment_method_type: PaymentMethodType::BankTransfer,
        }
        .into_record(7, Utc::now());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["paymentMethodType"], "bank_transfer");
        assert_eq!(json["status"], "pending");
        assert!(json["identityFileUrl"].is_null());
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_error_body_omits_missing_field() {
        let body = ErrorBody {
            message: "No file uploaded".to_string(),
            field: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"message":"No file uploaded"}"#
        );
    }
}
