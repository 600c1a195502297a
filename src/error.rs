//! Error types for group splitting

use crate::money::Money;
use crate::schemas::MemberId;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed or inconsistent input, rejected before anything is persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    #[error("amount {0} is out of range")]
    AmountOutOfRange(Decimal),

    #[error("group has no members")]
    EmptyGroup,

    #[error("group name must not be empty")]
    EmptyGroupName,

    #[error("member id must not be empty")]
    EmptyMemberId,

    #[error("member {0} appears more than once")]
    DuplicateMember(MemberId),

    #[error("member {0} is not part of the group")]
    UnknownMember(MemberId),

    #[error("member {0} is referenced by existing expenses")]
    MemberReferenced(MemberId),

    #[error("the group creator {0} cannot be removed")]
    CreatorRemoval(MemberId),

    #[error("unknown split type: {0}")]
    UnknownSplitType(String),

    #[error("negative split input {value} for member {member}")]
    NegativeInput { member: MemberId, value: Decimal },

    #[error("zero total shares")]
    ZeroTotalShares,

    #[error("split total {actual} does not match {expected}")]
    TotalMismatch { expected: Decimal, actual: Decimal },
}

/// An expense refers to something outside its group. Indicates corrupted data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("expense {expense_id} was paid by {member}, who is not in the group")]
    UnknownPayer { expense_id: String, member: MemberId },

    #[error("expense {expense_id} splits to {member}, who is not in the group")]
    UnknownSplitMember { expense_id: String, member: MemberId },

    #[error("expense {expense_id} belongs to group {expense_group}, not {group}")]
    ForeignExpense {
        expense_id: String,
        expense_group: String,
        group: String,
    },

    #[error("expense {expense_id} pushes a total past the representable range")]
    AmountOverflow { expense_id: String },
}

/// Non-fatal inconsistency found while computing balances or settlements.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DataIntegrityWarning {
    #[error("balances sum to {imbalance} instead of zero")]
    #[serde(rename_all = "camelCase")]
    UnbalancedLedger { imbalance: Money },

    #[error("member {member_id} is left with unmatched balance {remaining}")]
    #[serde(rename_all = "camelCase")]
    UnmatchedBalance { member_id: MemberId, remaining: Money },
}

/// Service errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    fn error_type(&self) -> &str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::Reference(_) => "reference_error",
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::Database(_) => "database_error",
            Error::Config(_) => "config_error",
            Error::Io(_) => "io_error",
        }
    }
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        HttpResponse::build(status_code).json(json!({
            "error": {
                "code": status_code.as_u16(),
                "message": self.to_string(),
                "type": self.error_type()
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Reference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Database(_) | Error::Config(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_shares_message() {
        assert_eq!(ValidationError::ZeroTotalShares.to_string(), "zero total shares");
    }

    #[test]
    fn test_status_codes() {
        let validation: Error = ValidationError::EmptyGroup.into();
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let reference: Error = ReferenceError::UnknownPayer {
            expense_id: "e1".to_string(),
            member: MemberId::new("ghost").unwrap(),
        }
        .into();
        assert_eq!(reference.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(
            Error::NotFound("group g1".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_warning_serializes_with_kind() {
        let warning = DataIntegrityWarning::UnbalancedLedger {
            imbalance: Money::from_minor(5),
        };
        let value = serde_json::to_value(&warning).unwrap();
        assert_eq!(value["kind"], "unbalancedLedger");
        assert_eq!(value["imbalance"], "0.05");
    }
}
