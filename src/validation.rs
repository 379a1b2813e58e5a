//! Loan application schema validation
//!
//! Inbound bodies are loosely typed JSON. They are checked here, in schema
//! order, and either become a [`NewLoanApplication`] or fail with the first
//! offending field. The field-level rules are shared with the wizard.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Currency, NewLoanApplication, PaymentMethodType};

/// A single failed field check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_name(field: &'static str, value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, "Required"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_email(value: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("email", "Required"));
    }
    if !validator::validate_email(trimmed) {
        return Err(FieldError::new("email", "Invalid email"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_income(value: i64) -> Result<i32, FieldError> {
    if value < 1 {
        return Err(FieldError::new("income", "Income is required"));
    }
    i32::try_from(value).map_err(|_| FieldError::new("income", "Income is too large"))
}

/// Check an IBAN and return it normalized (spaces removed, upper case).
///
/// Structure: two-letter country, two check digits, 11-30 alphanumerics;
/// the ISO 7064 mod-97 checksum must equal 1.
pub fn validate_iban(value: &str) -> Result<String, FieldError> {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    if normalized.is_empty() {
        return Err(FieldError::new("iban", "IBAN is required for bank transfers"));
    }

    let bytes = normalized.as_bytes();
    let well_formed = (15..=34).contains(&bytes.len())
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..4].iter().all(u8::is_ascii_digit)
        && bytes[4..].iter().all(u8::is_ascii_alphanumeric);
    if !well_formed {
        return Err(FieldError::new("iban", "Invalid IBAN format"));
    }

    // Move the first four characters to the end, expand letters to 10..35
    // and reduce mod 97 digit by digit.
    let rearranged = normalized[4..].bytes().chain(normalized[..4].bytes());
    let mut remainder: u32 = 0;
    for b in rearranged {
        let digit = if b.is_ascii_digit() {
            (b - b'0') as u32
        } else {
            (b - b'A') as u32 + 10
        };
        remainder = if digit >= 10 {
            (remainder * 100 + digit) % 97
        } else {
            (remainder * 10 + digit) % 97
        };
    }
    if remainder != 1 {
        return Err(FieldError::new("iban", "Invalid IBAN checksum"));
    }

    Ok(normalized)
}

/// Integer from free text: `"5000"` and `"5000.0"` are accepted, `"5000.5"` is not
pub fn coerce_integer_text(field: &'static str, text: &str) -> Result<i64, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, "Required"));
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        Ok(_) => Err(FieldError::new(field, "Expected integer, received float")),
        Err(_) => Err(FieldError::new(field, "Expected number, received string")),
    }
}

/// Integers may arrive as JSON numbers or numeric strings
fn coerce_integer(field: &'static str, value: Option<&Value>) -> Result<i64, FieldError> {
    match value {
        None | Some(Value::Null) => Err(FieldError::new(field, "Required")),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                    _ => Err(FieldError::new(field, "Expected integer, received float")),
                }
            }
        }
        Some(Value::String(s)) => coerce_integer_text(field, s),
        Some(other) => Err(FieldError::new(
            field,
            format!("Expected number, received {}", json_type(other)),
        )),
    }
}

fn positive_i32(field: &'static str, value: Option<&Value>) -> Result<i32, FieldError> {
    let n = coerce_integer(field, value)?;
    if n < 1 {
        return Err(FieldError::new(field, "Number must be greater than 0"));
    }
    i32::try_from(n).map_err(|_| FieldError::new(field, "Number is too large"))
}

fn required_str<'a>(field: &'static str, value: Option<&'a Value>) -> Result<&'a str, FieldError> {
    match value {
        None | Some(Value::Null) => Err(FieldError::new(field, "Required")),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(FieldError::new(
            field,
            format!("Expected string, received {}", json_type(other)),
        )),
    }
}

/// Absent, null and blank strings all mean "not provided"
fn optional_str<'a>(
    field: &'static str,
    value: Option<&'a Value>,
) -> Result<Option<&'a str>, FieldError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(FieldError::new(
            field,
            format!("Expected string, received {}", json_type(other)),
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate an inbound application body against the full schema.
///
/// Unknown keys are ignored, so client-side extras such as `status` or
/// `termsAccepted` never reach storage.
pub fn parse_application(payload: &Value) -> Result<NewLoanApplication, FieldError> {
    let empty = Map::new();
    let body = match payload {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return Err(FieldError::new(
                "body",
                format!("Expected object, received {}", json_type(other)),
            ))
        }
    };

    let first_name = validate_name("firstName", required_str("firstName", body.get("firstName"))?)?;
    let last_name = validate_name("lastName", required_str("lastName", body.get("lastName"))?)?;
    let email = validate_email(required_str("email", body.get("email"))?)?;
    let income = validate_income(coerce_integer("income", body.get("income"))?)?;
    let identity_file_url =
        optional_str("identityFileUrl", body.get("identityFileUrl"))?.map(str::to_string);
    let amount = positive_i32("amount", body.get("amount"))?;
    let duration = positive_i32("duration", body.get("duration"))?;

    let currency_code = required_str("currency", body.get("currency"))?;
    let currency = Currency::from_code(currency_code.trim()).ok_or_else(|| {
        FieldError::new(
            "currency",
            "Invalid currency. Expected 'EUR' | 'USD' | 'GBP' | 'CHF' | 'JPY'",
        )
    })?;

    let payment_method_type = match optional_str("paymentMethodType", body.get("paymentMethodType"))? {
        None => PaymentMethodType::default(),
        Some(s) => PaymentMethodType::from_str(s.trim()).ok_or_else(|| {
            FieldError::new(
                "paymentMethodType",
                "Invalid payment method. Expected 'bank_transfer' | 'card'",
            )
        })?,
    };

    let iban = match (payment_method_type, optional_str("iban", body.get("iban"))?) {
        (PaymentMethodType::BankTransfer, None) => {
            return Err(FieldError::new("iban", "IBAN is required for bank transfers"))
        }
        (PaymentMethodType::BankTransfer, Some(raw)) => Some(validate_iban(raw)?),
        (PaymentMethodType::Card, raw) => raw.map(validate_iban).transpose()?,
    };

    Ok(NewLoanApplication {
        first_name,
        last_name,
        email,
        income,
        identity_file_url,
        amount,
        duration,
        currency,
        iban,
        payment_method_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "firstName": "John",
            "lastName": "Doe",
            "email": "john@x.com",
            "income": 5000,
            "amount": 10000,
            "duration": 24,
            "currency": "EUR",
            "iban": "DE89370400440532013000"
        })
    }

    #[test]
    fn test_valid_payload_defaults_method() {
        let app = parse_application(&valid_payload()).unwrap();
        assert_eq!(app.first_name, "John");
        assert_eq!(app.income, 5000);
        assert_eq!(app.payment_method_type, PaymentMethodType::BankTransfer);
        assert_eq!(app.iban.as_deref(), Some("DE89370400440532013000"));
        assert_eq!(app.identity_file_url, None);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let mut payload = valid_payload();
        payload["income"] = json!("5000");
        payload["amount"] = json!(" 10000 ");
        payload["duration"] = json!(24.0);
        let app = parse_application(&payload).unwrap();
        assert_eq!((app.income, app.amount, app.duration), (5000, 10000, 24));
    }

    #[test]
    fn test_first_failing_field_is_reported() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("income");
        payload["currency"] = json!("BTC");
        let err = parse_application(&payload).unwrap_err();
        assert_eq!(err.field, "income");
        assert_eq!(err.message, "Required");
    }

    #[test]
    fn test_field_errors() {
        let cases: Vec<(&str, Value, &str)> = vec![
            ("firstName", json!("   "), "firstName"),
            ("email", json!("not-an-email"), "email"),
            ("income", json!(0), "income"),
            ("income", json!("abc"), "income"),
            ("income", json!(12.5), "income"),
            ("amount", json!(true), "amount"),
            ("duration", json!(-3), "duration"),
            ("currency", json!("eur"), "currency"),
            ("paymentMethodType", json!("paypal"), "paymentMethodType"),
            ("iban", json!("DE00370400440532013000"), "iban"),
        ];

        for (key, value, expected_field) in cases {
            let mut payload = valid_payload();
            payload[key] = value.clone();
            let err = parse_application(&payload).unwrap_err();
            assert_eq!(err.field, expected_field, "{} = {}", key, value);
        }
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut payload = valid_payload();
        payload["status"] = json!("approved");
        payload["termsAccepted"] = json!(true);
        payload["id"] = json!(99);
        assert!(parse_application(&payload).is_ok());
    }

    #[test]
    fn test_blank_identity_url_is_absent() {
        let mut payload = valid_payload();
        payload["identityFileUrl"] = json!("");
        assert_eq!(parse_application(&payload).unwrap().identity_file_url, None);

        payload["identityFileUrl"] = json!("/uploads/abc");
        assert_eq!(
            parse_application(&payload).unwrap().identity_file_url.as_deref(),
            Some("/uploads/abc")
        );
    }

    #[test]
    fn test_card_does_not_need_iban() {
        let mut payload = valid_payload();
        payload["paymentMethodType"] = json!("card");
        payload.as_object_mut().unwrap().remove("iban");
        let app = parse_application(&payload).unwrap();
        assert_eq!(app.payment_method_type, PaymentMethodType::Card);
        assert_eq!(app.iban, None);
    }

    #[test]
    fn test_bank_transfer_requires_iban() {
        let mut payload = valid_payload();
        payload["iban"] = json!("");
        assert_eq!(parse_application(&payload).unwrap_err().field, "iban");
    }

    #[test]
    fn test_non_object_body() {
        let err = parse_application(&json!([1, 2])).unwrap_err();
        assert_eq!(err.field, "body");
        assert_eq!(parse_application(&Value::Null).unwrap_err().field, "firstName");
    }

    #[test]
    fn test_iban_normalization_and_checksum() {
        assert_eq!(
            validate_iban("de89 3704 0044 0532 0130 00").unwrap(),
            "DE89370400440532013000"
        );
        assert!(validate_iban("GB82WEST12345698765432").is_ok());
        assert!(validate_iban("GB82WEST12345698765431").is_err());
        assert!(validate_iban("DE89").is_err());
        assert!(validate_iban("1289370400440532013000").is_err());
    }
}
