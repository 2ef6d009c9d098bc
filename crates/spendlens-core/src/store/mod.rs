//! Collaborator traits for the data the engine reads
//!
//! Persistence lives outside this crate. The analyzers consume a narrow read
//! surface over transactions, categories, and profiles, plus one field-level
//! write (clearing an anomaly flag). The caller decides what sits behind the
//! traits: a database, a service client, or [`memory::MemoryStore`] in tests.

pub mod memory;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{Category, CategoryId, Transaction, TransactionId, UserId};

pub use memory::MemoryStore;

/// Read surface over a user's transactions, plus the anomaly-flag write
pub trait TransactionStore: Send + Sync {
    /// All transactions for `user` dated within `[start, end]`, inclusive
    fn transactions_in_range(
        &self,
        user: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>>;

    /// Point lookup by id, regardless of owner
    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>>;

    /// Set or clear the anomaly flag on a transaction
    fn set_anomaly_flag(&self, id: TransactionId, flagged: bool) -> Result<()>;
}

/// Read surface over the category directory
pub trait CategoryStore: Send + Sync {
    /// Display name for a category id; Ok(None) when the id is unknown
    fn category_name(&self, id: CategoryId) -> Result<Option<String>>;

    /// Categories visible to `user`: system categories plus their own
    fn visible_categories(&self, user: UserId) -> Result<Vec<Category>>;
}

/// Read surface over user profiles
pub trait ProfileStore: Send + Sync {
    /// Configured monthly income; Ok(None) when the user never set one
    fn monthly_income(&self, user: UserId) -> Result<Option<Decimal>>;
}
