//! Domain models for spendlens

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type TransactionId = i64;
pub type CategoryId = i64;

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ledger entry owned by the storage collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    /// Uncategorized transactions carry None and are skipped by the analyzers
    pub category_id: Option<CategoryId>,
    pub kind: TransactionKind,
    /// Positive magnitude; direction comes from `kind`
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: String,
    /// Set by anomaly detection, cleared by `mark_expected`
    pub is_anomaly: bool,
}

/// A spending or income category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub kind: TransactionKind,
    /// None = system category, visible to every user
    pub user_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transaction_kind_round_trip() {
        assert_eq!(TransactionKind::Expense.as_str(), "expense");
        assert_eq!(
            TransactionKind::from_str("INCOME").unwrap(),
            TransactionKind::Income
        );
        assert!(TransactionKind::from_str("transfer").is_err());
    }

    #[test]
    fn test_transaction_serialization() {
        let tx = Transaction {
            id: 1,
            user_id: 7,
            category_id: Some(3),
            kind: TransactionKind::Expense,
            amount: Decimal::new(1250, 2),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            description: "Coffee".to_string(),
            is_anomaly: false,
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["kind"], "expense");
        assert_eq!(json["amount"], "12.50");
    }
}
