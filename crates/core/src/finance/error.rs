//! Finance error types.

use rust_decimal::Decimal;
use thiserror::Error;
use tsnt_shared::types::{AmountError, BankAccountId, FinanceTransactionId, FundId};

/// Errors that can occur during fund and ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinanceError {
    /// Fund does not exist.
    #[error("Fund not found: {0}")]
    FundNotFound(FundId),

    /// Ledger entry does not exist.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(FinanceTransactionId),

    /// Bank account does not exist.
    #[error("Bank account not found: {0}")]
    BankAccountNotFound(BankAccountId),

    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A decrement would drive the balance negative.
    #[error("Insufficient balance in fund {fund_id} for amount {requested}")]
    InsufficientBalance {
        /// Fund that would go negative.
        fund_id: FundId,
        /// Amount that could not be withdrawn.
        requested: Decimal,
    },

    /// Fund still has ledger entries pointing at it.
    #[error("Fund {fund_id} still has {count} transactions")]
    FundHasTransactions {
        /// Fund that was asked to be deleted.
        fund_id: FundId,
        /// Number of referencing entries.
        count: u64,
    },

    /// Status changed underneath the caller.
    #[error("Concurrent modification detected")]
    ConcurrentModification,

    /// Stored balance disagrees with the ledger.
    #[error("Fund {fund_id} balance {stored} does not match ledger total {expected}")]
    ConsistencyGap {
        /// Audited fund.
        fund_id: FundId,
        /// Balance as stored.
        stored: Decimal,
        /// Balance derived from the ledger.
        expected: Decimal,
    },

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl FinanceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FundNotFound(_) => "FUND_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::FundHasTransactions { .. } => "FUND_HAS_TRANSACTIONS",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::ConsistencyGap { .. } => "CONSISTENCY_GAP",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InsufficientBalance { .. } => 400,
            Self::FundNotFound(_) | Self::TransactionNotFound(_) | Self::BankAccountNotFound(_) => {
                404
            }
            Self::FundHasTransactions { .. } | Self::ConcurrentModification => 409,
            Self::ConsistencyGap { .. } | Self::Storage(_) => 500,
        }
    }

    /// Shorthand for a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<AmountError> for FinanceError {
    fn from(err: AmountError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(FinanceError::FundNotFound(FundId::new()), 404, "FUND_NOT_FOUND")]
    #[case(FinanceError::TransactionNotFound(FinanceTransactionId::new()), 404, "TRANSACTION_NOT_FOUND")]
    #[case(FinanceError::validation("bad"), 400, "VALIDATION_ERROR")]
    #[case(
        FinanceError::InsufficientBalance { fund_id: FundId::new(), requested: dec!(5) },
        400,
        "INSUFFICIENT_BALANCE"
    )]
    #[case(
        FinanceError::FundHasTransactions { fund_id: FundId::new(), count: 2 },
        409,
        "FUND_HAS_TRANSACTIONS"
    )]
    #[case(FinanceError::ConcurrentModification, 409, "CONCURRENT_MODIFICATION")]
    #[case(FinanceError::Storage("down".into()), 500, "STORAGE_ERROR")]
    fn test_status_and_code(#[case] err: FinanceError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.http_status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_amount_error_maps_to_validation() {
        let err: FinanceError = AmountError::NotPositive(dec!(0)).into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_error_display() {
        let fund_id = FundId::new();
        let err = FinanceError::ConsistencyGap {
            fund_id,
            stored: dec!(100.00),
            expected: dec!(90.00),
        };
        assert_eq!(
            err.to_string(),
            format!("Fund {fund_id} balance 100.00 does not match ledger total 90.00")
        );
    }
}
