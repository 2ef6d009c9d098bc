//! Rule-based budget advice
//!
//! Compares the current calendar month's income and expense shape against
//! simple thresholds and emits ranked recommendations: a missing income
//! profile short-circuits everything, a thin savings margin raises a
//! high-priority warning, and any category eating more than its share of
//! income gets a reduction target.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::Result;
use crate::models::{CategoryId, TransactionKind, UserId};
use crate::stats::{round2, round_dp};
use crate::store::{CategoryStore, ProfileStore, TransactionStore};

use super::types::{AdviceItem, AdvicePriority};

/// Advice thresholds
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Savings rates below this percentage raise a high-priority item
    pub min_savings_rate_percent: f64,
    /// Categories above this share of income get a reduction item
    pub category_share_limit_percent: f64,
    /// Hard cap on returned items
    pub max_items: usize,
    /// Category label exempt from the share check (housing is expected to be large)
    pub exempt_category: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            min_savings_rate_percent: 10.0,
            category_share_limit_percent: 20.0,
            max_items: 5,
            exempt_category: "Rent".to_string(),
        }
    }
}

/// Threshold rules over the current month's transactions
pub struct BudgetAdvisor<'a> {
    transactions: &'a dyn TransactionStore,
    categories: &'a dyn CategoryStore,
    profiles: &'a dyn ProfileStore,
    config: AdvisorConfig,
}

impl<'a> BudgetAdvisor<'a> {
    pub fn new(
        transactions: &'a dyn TransactionStore,
        categories: &'a dyn CategoryStore,
        profiles: &'a dyn ProfileStore,
    ) -> Self {
        Self {
            transactions,
            categories,
            profiles,
            config: AdvisorConfig::default(),
        }
    }

    pub fn with_config(
        transactions: &'a dyn TransactionStore,
        categories: &'a dyn CategoryStore,
        profiles: &'a dyn ProfileStore,
        config: AdvisorConfig,
    ) -> Self {
        Self {
            transactions,
            categories,
            profiles,
            config,
        }
    }

    /// Advise against the local calendar date
    pub fn advise(&self, user: UserId) -> Result<Vec<AdviceItem>> {
        self.advise_as_of(user, chrono::Local::now().date_naive())
    }

    /// Advise with a pinned as-of date; the analysis month is `today`'s
    pub fn advise_as_of(&self, user: UserId, today: NaiveDate) -> Result<Vec<AdviceItem>> {
        let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap();
        let end = start + Months::new(1) - Duration::days(1);
        let transactions = self.transactions.transactions_in_range(user, start, end)?;

        let monthly_income = self
            .profiles
            .monthly_income(user)?
            .unwrap_or(Decimal::ZERO);

        // Without a configured income nothing else can be judged
        if monthly_income.is_zero() {
            return Ok(vec![AdviceItem {
                category: "Profile Setup".to_string(),
                recommendation: "Set up your monthly income in your profile".to_string(),
                current_spending: Decimal::ZERO,
                recommended_spending: None,
                percentage_of_income: 0.0,
                priority: AdvicePriority::High,
                action_item: "Go to Profile Settings and enter your monthly income".to_string(),
            }]);
        }

        let total_income: Decimal = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Income)
            .map(|t| t.amount)
            .sum();
        let total_expenses: Decimal = transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense)
            .map(|t| t.amount)
            .sum();

        // Prefer what actually arrived this month over the configured figure
        let effective_income = if total_income > Decimal::ZERO {
            total_income
        } else {
            monthly_income
        };

        let mut category_spending: BTreeMap<CategoryId, Decimal> = BTreeMap::new();
        for tx in transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense)
        {
            if let Some(category_id) = tx.category_id {
                *category_spending.entry(category_id).or_insert(Decimal::ZERO) += tx.amount;
            }
        }

        let mut items = Vec::new();

        // abs() collapses over- and under-spending into one magnitude
        let savings_rate = percent_of(
            (total_expenses - effective_income).abs(),
            effective_income,
        );

        if savings_rate < self.config.min_savings_rate_percent {
            items.push(AdviceItem {
                category: "Savings".to_string(),
                recommendation: format!(
                    "Your savings rate is below {:.0}%. Try to save at least 10-20% of your income.",
                    self.config.min_savings_rate_percent
                ),
                current_spending: total_expenses,
                recommended_spending: Some(round2(effective_income * Decimal::new(80, 2))),
                percentage_of_income: savings_rate,
                priority: AdvicePriority::High,
                action_item: "Review your expenses and identify areas to cut back".to_string(),
            });
        }

        for (category_id, amount) in &category_spending {
            let label = self
                .categories
                .category_name(*category_id)?
                .unwrap_or_else(|| format!("Category {}", category_id));
            let percentage = percent_of(*amount, effective_income);

            if percentage > self.config.category_share_limit_percent
                && label != self.config.exempt_category
            {
                let share = Decimal::from_f64(self.config.category_share_limit_percent / 100.0)
                    .unwrap_or_default();
                let recommended = round2(effective_income * share);
                items.push(AdviceItem {
                    category: label.clone(),
                    recommendation: format!(
                        "{} spending is {:.1}% of your income. Consider reducing to {:.0}% or less.",
                        label, percentage, self.config.category_share_limit_percent
                    ),
                    current_spending: *amount,
                    recommended_spending: Some(recommended),
                    percentage_of_income: percentage,
                    priority: AdvicePriority::Medium,
                    action_item: format!(
                        "Reduce {} spending by {}",
                        label,
                        round2(*amount - recommended)
                    ),
                });
            }
        }

        if items.is_empty() {
            items.push(AdviceItem {
                category: "Overall".to_string(),
                recommendation: "Great job! Your spending is well-balanced.".to_string(),
                current_spending: total_expenses,
                recommended_spending: None,
                percentage_of_income: savings_rate,
                priority: AdvicePriority::Low,
                action_item: "Keep up the good work and maintain your current habits".to_string(),
            });
        }

        items.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| b.current_spending.cmp(&a.current_spending))
        });
        items.truncate(self.config.max_items);

        debug!(user, count = items.len(), "Budget advice complete");
        Ok(items)
    }
}

/// `amount` as a percentage of `base`, 0.0 when `base` is not positive
fn percent_of(amount: Decimal, base: Decimal) -> f64 {
    if base <= Decimal::ZERO {
        return 0.0;
    }
    (round_dp(amount / base, 4) * Decimal::from(100))
        .to_f64()
        .unwrap_or_default()
}
