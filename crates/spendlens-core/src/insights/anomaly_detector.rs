//! Transaction anomaly detection
//!
//! Flags transactions whose amounts sit far outside their category's recent
//! distribution. Each qualifying category gets a mean and population standard
//! deviation over the trailing window; transactions beyond the z-score
//! threshold come back as [`AnomalyRecord`]s, most severe first. Users can
//! clear a flag through [`AnomalyDetector::mark_expected`].

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{CategoryId, Transaction, TransactionId, UserId};
use crate::stats::{decimal_mean, population_std_dev, round2, round_dp};
use crate::store::{CategoryStore, TransactionStore};

use super::types::{AnomalyRecord, AnomalySeverity};

/// Anomaly detection configuration
#[derive(Debug, Clone)]
pub struct AnomalyConfig {
    /// Months of history examined
    pub window_months: u32,
    /// Minimum transactions across all categories before detection runs
    pub min_total_transactions: usize,
    /// Minimum transactions a single category needs to qualify
    pub min_category_transactions: usize,
    /// |z| must exceed this to flag at all
    pub z_threshold: f64,
    /// |z| beyond this upgrades the severity to High
    pub high_severity_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            window_months: 3,
            min_total_transactions: 10,
            min_category_transactions: 5,
            z_threshold: 2.0,
            high_severity_threshold: 3.0,
        }
    }
}

/// Statistical outlier detection over a user's recent transactions
pub struct AnomalyDetector<'a> {
    transactions: &'a dyn TransactionStore,
    categories: &'a dyn CategoryStore,
    config: AnomalyConfig,
}

impl<'a> AnomalyDetector<'a> {
    pub fn new(transactions: &'a dyn TransactionStore, categories: &'a dyn CategoryStore) -> Self {
        Self {
            transactions,
            categories,
            config: AnomalyConfig::default(),
        }
    }

    pub fn with_config(
        transactions: &'a dyn TransactionStore,
        categories: &'a dyn CategoryStore,
        config: AnomalyConfig,
    ) -> Self {
        Self {
            transactions,
            categories,
            config,
        }
    }

    /// Detect against the local calendar date
    pub fn detect(&self, user: UserId) -> Result<Vec<AnomalyRecord>> {
        self.detect_as_of(user, chrono::Local::now().date_naive())
    }

    /// Detect with a pinned as-of date
    pub fn detect_as_of(&self, user: UserId, today: NaiveDate) -> Result<Vec<AnomalyRecord>> {
        let start = today - Months::new(self.config.window_months);
        let transactions = self.transactions.transactions_in_range(user, start, today)?;

        // Too little data overall and every category looks anomalous
        if transactions.len() < self.config.min_total_transactions {
            return Ok(Vec::new());
        }

        let mut by_category: BTreeMap<CategoryId, Vec<&Transaction>> = BTreeMap::new();
        for tx in &transactions {
            if let Some(category_id) = tx.category_id {
                by_category.entry(category_id).or_default().push(tx);
            }
        }

        let mut records = Vec::new();
        for (category_id, category_txns) in &by_category {
            if category_txns.len() < self.config.min_category_transactions {
                continue;
            }
            records.extend(self.category_outliers(*category_id, category_txns)?);
        }

        records.sort_by(|a, b| {
            b.severity.priority().cmp(&a.severity.priority()).then_with(|| {
                b.z_score
                    .abs()
                    .partial_cmp(&a.z_score.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        debug!(user, count = records.len(), "Anomaly detection complete");
        Ok(records)
    }

    fn category_outliers(
        &self,
        category_id: CategoryId,
        transactions: &[&Transaction],
    ) -> Result<Vec<AnomalyRecord>> {
        let amounts: Vec<Decimal> = transactions.iter().map(|t| t.amount).collect();
        let mean = round2(decimal_mean(&amounts).unwrap_or_default());
        let std_dev =
            round2(Decimal::from_f64(population_std_dev(&amounts, mean)).unwrap_or_default());

        // A flat category has no outliers, whatever the amounts
        if std_dev <= Decimal::ZERO {
            return Ok(Vec::new());
        }

        let category_name = self
            .categories
            .category_name(category_id)?
            .unwrap_or_else(|| format!("Category {}", category_id));

        let mut records = Vec::new();
        for tx in transactions {
            let z = round_dp((tx.amount - mean) / std_dev, 4)
                .to_f64()
                .unwrap_or_default();
            if z.abs() <= self.config.z_threshold {
                continue;
            }

            let severity = if z.abs() > self.config.high_severity_threshold {
                AnomalySeverity::High
            } else {
                AnomalySeverity::Medium
            };
            let reason = if z > 0.0 {
                format!("Amount is {:.1} standard deviations above average", z)
            } else {
                format!("Amount is {:.1} standard deviations below average", -z)
            };

            records.push(AnomalyRecord {
                transaction_id: tx.id,
                description: tx.description.clone(),
                amount: tx.amount,
                category_name: category_name.clone(),
                date: tx.date,
                category_mean: mean,
                category_std_dev: std_dev,
                z_score: z,
                severity,
                reason,
            });
        }
        Ok(records)
    }

    /// Clear the anomaly flag on one of the caller's own transactions.
    ///
    /// Unknown ids are NotFound and foreign transactions are Unauthorized;
    /// repeated calls converge on the same cleared state.
    pub fn mark_expected(&self, transaction_id: TransactionId, user: UserId) -> Result<()> {
        let tx = self
            .transactions
            .transaction(transaction_id)?
            .ok_or_else(|| Error::NotFound(format!("Transaction {} does not exist", transaction_id)))?;

        if tx.user_id != user {
            return Err(Error::Unauthorized(format!(
                "Transaction {} does not belong to user {}",
                transaction_id, user
            )));
        }

        self.transactions.set_anomaly_flag(transaction_id, false)
    }
}
