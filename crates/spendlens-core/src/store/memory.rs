//! In-memory store for testing and development
//!
//! Implements all three collaborator traits over plain vectors. Useful for
//! unit tests and for embedding the engine without a real backend.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{
    Category, CategoryId, Transaction, TransactionId, TransactionKind, UserId,
};

use super::{CategoryStore, ProfileStore, TransactionStore};

#[derive(Default)]
struct Inner {
    transactions: Vec<Transaction>,
    categories: Vec<Category>,
    incomes: HashMap<UserId, Decimal>,
    next_transaction_id: TransactionId,
    next_category_id: CategoryId,
}

/// In-memory implementation of the store traits
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a category; None user_id makes it a system category
    pub fn add_category(
        &self,
        name: &str,
        kind: TransactionKind,
        user_id: Option<UserId>,
    ) -> CategoryId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_category_id += 1;
        let id = inner.next_category_id;
        inner.categories.push(Category {
            id,
            name: name.to_string(),
            kind,
            user_id,
        });
        id
    }

    /// Seed a transaction and return its id
    pub fn add_transaction(
        &self,
        user_id: UserId,
        category_id: Option<CategoryId>,
        kind: TransactionKind,
        amount: Decimal,
        date: NaiveDate,
        description: &str,
    ) -> TransactionId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_transaction_id += 1;
        let id = inner.next_transaction_id;
        inner.transactions.push(Transaction {
            id,
            user_id,
            category_id,
            kind,
            amount,
            date,
            description: description.to_string(),
            is_anomaly: false,
        });
        id
    }

    /// Seed a configured monthly income for a user
    pub fn set_monthly_income(&self, user: UserId, amount: Decimal) {
        self.inner.lock().unwrap().incomes.insert(user, amount);
    }

    /// Current anomaly flag for a transaction, for assertions in tests
    pub fn anomaly_flag(&self, id: TransactionId) -> Option<bool> {
        self.inner
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.is_anomaly)
    }

    /// Directly set the anomaly flag, for seeding flagged fixtures
    pub fn seed_anomaly_flag(&self, id: TransactionId, flagged: bool) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(tx) = inner.transactions.iter_mut().find(|t| t.id == id) {
            tx.is_anomaly = flagged;
        }
    }
}

impl TransactionStore for MemoryStore {
    fn transactions_in_range(
        &self,
        user: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .transactions
            .iter()
            .filter(|t| t.user_id == user && t.date >= start && t.date <= end)
            .cloned()
            .collect())
    }

    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.transactions.iter().find(|t| t.id == id).cloned())
    }

    fn set_anomaly_flag(&self, id: TransactionId, flagged: bool) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(tx) = inner.transactions.iter_mut().find(|t| t.id == id) {
            tx.is_anomaly = flagged;
        }
        Ok(())
    }
}

impl CategoryStore for MemoryStore {
    fn category_name(&self, id: CategoryId) -> Result<Option<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone()))
    }

    fn visible_categories(&self, user: UserId) -> Result<Vec<Category>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .categories
            .iter()
            .filter(|c| c.user_id.is_none() || c.user_id == Some(user))
            .cloned()
            .collect())
    }
}

impl ProfileStore for MemoryStore {
    fn monthly_income(&self, user: UserId) -> Result<Option<Decimal>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.incomes.get(&user).copied())
    }
}
