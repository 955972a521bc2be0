use serde::{Deserialize, Serialize};

use super::money::{Cents, CurrencyCode, decimal_string};
use crate::application::AppError;

/// Direction of a balance change. DEBIT adds to the balance, CREDIT takes
/// from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationSign {
    Debit,
    Credit,
}

impl OperationSign {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationSign::Debit => "DEBIT",
            OperationSign::Credit => "CREDIT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DEBIT" => Some(OperationSign::Debit),
            "CREDIT" => Some(OperationSign::Credit),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A signed balance change aimed at one account. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub account_number: String,
    pub currency: CurrencyCode,
    #[serde(with = "decimal_string")]
    pub amount: Cents,
    #[serde(rename = "operationSign")]
    pub sign: OperationSign,
}

impl OperationRequest {
    pub fn new(
        account_number: impl Into<String>,
        currency: CurrencyCode,
        amount: Cents,
        sign: OperationSign,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            currency,
            amount,
            sign,
        }
    }

    pub fn debit(account_number: impl Into<String>, currency: CurrencyCode, amount: Cents) -> Self {
        Self::new(account_number, currency, amount, OperationSign::Debit)
    }

    pub fn credit(account_number: impl Into<String>, currency: CurrencyCode, amount: Cents) -> Self {
        Self::new(account_number, currency, amount, OperationSign::Credit)
    }

    /// Field-level checks a transport performs before the engine sees a request.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.account_number.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "accountNumber must be not empty".to_string(),
            ));
        }
        if self.amount <= 0 {
            return Err(AppError::InvalidAmount(
                "amount must be positive number".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_roundtrip() {
        for sign in [OperationSign::Debit, OperationSign::Credit] {
            assert_eq!(OperationSign::from_str(sign.as_str()), Some(sign));
        }
        assert_eq!(OperationSign::from_str("credit"), Some(OperationSign::Credit));
        assert_eq!(OperationSign::from_str("REFUND"), None);
    }

    #[test]
    fn test_request_json_shape() {
        let request: OperationRequest = serde_json::from_str(
            r#"{"accountNumber":"A1","currency":978,"amount":"10.00","operationSign":"CREDIT"}"#,
        )
        .unwrap();

        assert_eq!(request, OperationRequest::credit("A1", 978, 1000));
    }

    #[test]
    fn test_validate() {
        assert!(OperationRequest::debit("A1", 978, 1).validate().is_ok());
        assert!(matches!(
            OperationRequest::debit("A1", 978, 0).validate(),
            Err(AppError::InvalidAmount(_))
        ));
        assert!(matches!(
            OperationRequest::credit(" ", 978, 100).validate(),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_request_rejects_unknown_sign() {
        let result = serde_json::from_str::<OperationRequest>(
            r#"{"accountNumber":"A1","currency":978,"amount":"10.00","operationSign":"REFUND"}"#,
        );
        assert!(result.is_err());
    }
}
