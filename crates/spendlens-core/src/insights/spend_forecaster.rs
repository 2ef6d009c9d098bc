//! Spend forecaster
//!
//! Predicts next month's spending per expense category by fitting an
//! ordinary-least-squares line over the trailing monthly totals. When the fit
//! cannot produce a usable value (too little history, a degenerate series, a
//! negative extrapolation) it falls back to the historical mean nudged in the
//! trend direction. A synthesized total row is prepended when any category
//! prediction exists.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{CategoryId, Transaction, TransactionKind, UserId};
use crate::stats::{decimal_mean, fit_line, round2, round_dp};
use crate::store::{CategoryStore, TransactionStore};

use super::types::{SpendForecast, Trend};

/// Minimum transactions a category needs inside the window before it is
/// forecast. 1 means every category with any spending shows up; callers
/// wanting the stricter behavior of older releases pass 3 through
/// [`ForecastConfig`].
pub const MIN_CATEGORY_TRANSACTIONS: usize = 1;

/// Display name of the synthesized total row
const TOTAL_ROW_NAME: &str = "Total Monthly Expenses";

/// Forecast configuration
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Months of history fed into the fit
    pub history_months: u32,
    /// Minimum transactions per category inside the window
    pub min_category_transactions: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_months: 6,
            min_category_transactions: MIN_CATEGORY_TRANSACTIONS,
        }
    }
}

/// Per-category next-month spend prediction
pub struct SpendForecaster<'a> {
    transactions: &'a dyn TransactionStore,
    categories: &'a dyn CategoryStore,
    config: ForecastConfig,
}

impl<'a> SpendForecaster<'a> {
    pub fn new(transactions: &'a dyn TransactionStore, categories: &'a dyn CategoryStore) -> Self {
        Self {
            transactions,
            categories,
            config: ForecastConfig::default(),
        }
    }

    pub fn with_config(
        transactions: &'a dyn TransactionStore,
        categories: &'a dyn CategoryStore,
        config: ForecastConfig,
    ) -> Self {
        Self {
            transactions,
            categories,
            config,
        }
    }

    /// Forecast against the local calendar date
    pub fn forecast(&self, user: UserId) -> Result<Vec<SpendForecast>> {
        self.forecast_as_of(user, chrono::Local::now().date_naive())
    }

    /// Forecast with a pinned as-of date; identical inputs give identical output
    pub fn forecast_as_of(&self, user: UserId, today: NaiveDate) -> Result<Vec<SpendForecast>> {
        let start = today - Months::new(self.config.history_months);
        let transactions = self.transactions.transactions_in_range(user, start, today)?;

        let mut by_category: BTreeMap<CategoryId, Vec<&Transaction>> = BTreeMap::new();
        for tx in transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense)
        {
            if let Some(category_id) = tx.category_id {
                by_category.entry(category_id).or_default().push(tx);
            }
        }

        let mut forecasts = Vec::new();
        for (category_id, category_txns) in &by_category {
            if category_txns.len() < self.config.min_category_transactions {
                continue;
            }
            // One bad category must not take down the rest of the forecast
            match self.forecast_category(*category_id, category_txns) {
                Ok(forecast) => forecasts.push(forecast),
                Err(e) => {
                    warn!(category_id, error = %e, "Skipping category forecast");
                }
            }
        }

        if !forecasts.is_empty() {
            let total = Self::total_row(&forecasts);
            forecasts.insert(0, total);
        }

        debug!(user, count = forecasts.len(), "Spend forecast complete");
        Ok(forecasts)
    }

    fn forecast_category(
        &self,
        category_id: CategoryId,
        transactions: &[&Transaction],
    ) -> Result<SpendForecast> {
        let category_name = self
            .categories
            .category_name(category_id)?
            .unwrap_or_else(|| format!("Category {}", category_id));

        // Calendar-month totals, oldest month first; months without spending
        // simply don't appear in the sequence
        let mut monthly: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
        for tx in transactions {
            *monthly
                .entry((tx.date.year(), tx.date.month()))
                .or_insert(Decimal::ZERO) += tx.amount;
        }
        let totals: Vec<Decimal> = monthly.into_values().collect();

        let historical_average = round2(decimal_mean(&totals).unwrap_or_default());
        let trend = classify_trend(&totals);

        let series: Vec<f64> = totals
            .iter()
            .map(|t| t.to_f64().unwrap_or_default())
            .collect();
        let fit = fit_line(&series);
        let predicted = fit.predict(totals.len() as f64);

        let (predicted_amount, confidence_score) =
            if predicted.is_nan() || predicted.is_infinite() || predicted < 0.0 {
                // Fallback: historical mean, nudged 5% in the trend direction
                let amount = if totals.len() >= 2 {
                    match trend {
                        Trend::Increasing => round2(historical_average * Decimal::new(105, 2)),
                        Trend::Decreasing => round2(historical_average * Decimal::new(95, 2)),
                        Trend::Stable => historical_average,
                    }
                } else {
                    historical_average
                };
                let confidence = (0.40 + 0.05 * totals.len() as f64).min(0.70);
                (amount, confidence)
            } else {
                let amount =
                    round2(Decimal::from_f64(predicted).unwrap_or(historical_average));
                let confidence =
                    if fit.r_squared.is_nan() || fit.r_squared.is_infinite() || fit.r_squared < 0.0 {
                        0.50
                    } else {
                        fit.r_squared.clamp(0.0, 1.0)
                    };
                (amount, confidence)
            };

        Ok(SpendForecast {
            category_id: Some(category_id),
            category_name,
            predicted_amount,
            historical_average,
            confidence_score,
            trend,
        })
    }

    /// Roll the category rows up into one summary row.
    ///
    /// The total trend uses the same 5% band as the fallback adjustment, not
    /// the 10% band of the per-category classifier.
    fn total_row(forecasts: &[SpendForecast]) -> SpendForecast {
        let total_predicted: Decimal = forecasts.iter().map(|f| f.predicted_amount).sum();
        let total_historical: Decimal = forecasts.iter().map(|f| f.historical_average).sum();
        let avg_confidence =
            forecasts.iter().map(|f| f.confidence_score).sum::<f64>() / forecasts.len() as f64;

        let trend = if total_predicted > total_historical * Decimal::new(105, 2) {
            Trend::Increasing
        } else if total_predicted < total_historical * Decimal::new(95, 2) {
            Trend::Decreasing
        } else {
            Trend::Stable
        };

        SpendForecast {
            category_id: None,
            category_name: TOTAL_ROW_NAME.to_string(),
            predicted_amount: total_predicted,
            historical_average: total_historical,
            confidence_score: avg_confidence,
            trend,
        }
    }
}

/// Classify a monthly series by the percent change between its endpoints.
/// A zero first month makes the percentage undefined; the series counts as
/// increasing unless it is flat at zero.
fn classify_trend(totals: &[Decimal]) -> Trend {
    if totals.len() < 2 {
        return Trend::Stable;
    }
    let first = totals[0];
    let last = totals[totals.len() - 1];

    if first.is_zero() {
        return if last.is_zero() {
            Trend::Stable
        } else {
            Trend::Increasing
        };
    }

    let percent_change = round_dp((last - first) / first, 4) * Decimal::from(100);
    if percent_change > Decimal::from(10) {
        Trend::Increasing
    } else if percent_change < Decimal::from(-10) {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use crate::store::MemoryStore;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const USER: UserId = 1;

    #[test]
    fn test_linear_history_extrapolates_with_full_confidence() {
        let store = MemoryStore::new();
        let groceries = store.add_category("Groceries", TransactionKind::Expense, None);
        for (month, amount) in [(3, "100"), (4, "110"), (5, "120"), (6, "130")] {
            store.add_transaction(
                USER,
                Some(groceries),
                TransactionKind::Expense,
                d(amount),
                date(2026, month, 10),
                "weekly shop",
            );
        }

        let forecaster = SpendForecaster::new(&store, &store);
        let forecasts = forecaster.forecast_as_of(USER, date(2026, 7, 15)).unwrap();

        // Total row plus one category row
        assert_eq!(forecasts.len(), 2);
        let row = &forecasts[1];
        assert_eq!(row.category_id, Some(groceries));
        assert_eq!(row.category_name, "Groceries");
        assert_eq!(row.predicted_amount, d("140.00"));
        assert_eq!(row.historical_average, d("115.00"));
        assert!((row.confidence_score - 1.0).abs() < 1e-9);
        assert_eq!(row.trend, Trend::Increasing);
    }

    #[test]
    fn test_single_month_falls_back_to_history() {
        let store = MemoryStore::new();
        let dining = store.add_category("Dining", TransactionKind::Expense, None);
        store.add_transaction(
            USER,
            Some(dining),
            TransactionKind::Expense,
            d("50"),
            date(2026, 6, 3),
            "lunch",
        );

        let forecaster = SpendForecaster::new(&store, &store);
        let forecasts = forecaster.forecast_as_of(USER, date(2026, 7, 15)).unwrap();

        let row = &forecasts[1];
        assert_eq!(row.predicted_amount, d("50.00"));
        // 0.40 + 0.05 * 1 sample
        assert!((row.confidence_score - 0.45).abs() < 1e-9);
        assert_eq!(row.trend, Trend::Stable);
    }

    #[test]
    fn test_flat_history_predicts_mean_at_half_confidence() {
        let store = MemoryStore::new();
        let rent = store.add_category("Rent", TransactionKind::Expense, None);
        for month in [4, 5, 6] {
            store.add_transaction(
                USER,
                Some(rent),
                TransactionKind::Expense,
                d("75"),
                date(2026, month, 1),
                "rent",
            );
        }

        let forecaster = SpendForecaster::new(&store, &store);
        let forecasts = forecaster.forecast_as_of(USER, date(2026, 7, 15)).unwrap();

        // Slope is zero so the regression succeeds, but a flat series has no
        // variance to explain: R-squared is NaN and confidence lands on 0.50
        let row = &forecasts[1];
        assert_eq!(row.predicted_amount, d("75.00"));
        assert!((row.confidence_score - 0.50).abs() < 1e-9);
        assert_eq!(row.trend, Trend::Stable);
    }

    #[test]
    fn test_negative_extrapolation_falls_back_with_trend_adjustment() {
        let store = MemoryStore::new();
        let fuel = store.add_category("Fuel", TransactionKind::Expense, None);
        for (month, amount) in [(4, "300"), (5, "150"), (6, "10")] {
            store.add_transaction(
                USER,
                Some(fuel),
                TransactionKind::Expense,
                d(amount),
                date(2026, month, 8),
                "fill up",
            );
        }

        let forecaster = SpendForecaster::new(&store, &store);
        let forecasts = forecaster.forecast_as_of(USER, date(2026, 7, 15)).unwrap();

        // Extrapolating the slope goes below zero, so the mean (153.33) is
        // used instead, shaved 5% for the decreasing trend
        let row = &forecasts[1];
        assert_eq!(row.historical_average, d("153.33"));
        assert_eq!(row.predicted_amount, d("145.66"));
        assert!((row.confidence_score - 0.55).abs() < 1e-9);
        assert_eq!(row.trend, Trend::Decreasing);
    }

    #[test]
    fn test_total_row_is_prepended_and_sums_categories() {
        let store = MemoryStore::new();
        let a = store.add_category("A", TransactionKind::Expense, None);
        let b = store.add_category("B", TransactionKind::Expense, None);
        for (month, amount) in [(4, "100"), (5, "110"), (6, "120")] {
            store.add_transaction(
                USER,
                Some(a),
                TransactionKind::Expense,
                d(amount),
                date(2026, month, 2),
                "a",
            );
        }
        store.add_transaction(
            USER,
            Some(b),
            TransactionKind::Expense,
            d("40"),
            date(2026, 6, 20),
            "b",
        );

        let forecaster = SpendForecaster::new(&store, &store);
        let forecasts = forecaster.forecast_as_of(USER, date(2026, 7, 15)).unwrap();

        assert_eq!(forecasts.len(), 3);
        let total = &forecasts[0];
        assert_eq!(total.category_id, None);
        assert_eq!(total.category_name, "Total Monthly Expenses");
        // 130 (extrapolated) + 40 (single-month fallback)
        assert_eq!(total.predicted_amount, d("170.00"));
        assert_eq!(total.historical_average, d("150.00"));
        // Mean of 1.0 and 0.45
        assert!((total.confidence_score - 0.725).abs() < 1e-9);
        // 170 vs 150 exceeds the 5% band
        assert_eq!(total.trend, Trend::Increasing);
        // Category rows come back in id order
        assert_eq!(forecasts[1].category_id, Some(a));
        assert_eq!(forecasts[2].category_id, Some(b));
    }

    #[test]
    fn test_min_transaction_threshold_is_configurable() {
        let store = MemoryStore::new();
        let hobby = store.add_category("Hobby", TransactionKind::Expense, None);
        store.add_transaction(
            USER,
            Some(hobby),
            TransactionKind::Expense,
            d("20"),
            date(2026, 5, 5),
            "paint",
        );
        store.add_transaction(
            USER,
            Some(hobby),
            TransactionKind::Expense,
            d("25"),
            date(2026, 6, 5),
            "brushes",
        );

        let strict = ForecastConfig {
            min_category_transactions: 3,
            ..ForecastConfig::default()
        };
        let forecaster = SpendForecaster::with_config(&store, &store, strict);
        assert!(forecaster
            .forecast_as_of(USER, date(2026, 7, 15))
            .unwrap()
            .is_empty());

        let forecaster = SpendForecaster::new(&store, &store);
        assert_eq!(
            forecaster
                .forecast_as_of(USER, date(2026, 7, 15))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_income_and_uncategorized_are_ignored() {
        let store = MemoryStore::new();
        let salary = store.add_category("Salary", TransactionKind::Income, None);
        store.add_transaction(
            USER,
            Some(salary),
            TransactionKind::Income,
            d("3000"),
            date(2026, 6, 1),
            "pay",
        );
        store.add_transaction(
            USER,
            None,
            TransactionKind::Expense,
            d("99"),
            date(2026, 6, 2),
            "mystery",
        );

        let forecaster = SpendForecaster::new(&store, &store);
        assert!(forecaster
            .forecast_as_of(USER, date(2026, 7, 15))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unknown_category_gets_placeholder_name() {
        let store = MemoryStore::new();
        store.add_transaction(
            USER,
            Some(42),
            TransactionKind::Expense,
            d("10"),
            date(2026, 6, 2),
            "orphan",
        );

        let forecaster = SpendForecaster::new(&store, &store);
        let forecasts = forecaster.forecast_as_of(USER, date(2026, 7, 15)).unwrap();
        assert_eq!(forecasts[1].category_name, "Category 42");
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let store = MemoryStore::new();
        let a = store.add_category("A", TransactionKind::Expense, None);
        let b = store.add_category("B", TransactionKind::Expense, None);
        for month in [4, 5, 6] {
            store.add_transaction(
                USER,
                Some(a),
                TransactionKind::Expense,
                d("31.37"),
                date(2026, month, 3),
                "a",
            );
            store.add_transaction(
                USER,
                Some(b),
                TransactionKind::Expense,
                d("55.01"),
                date(2026, month, 9),
                "b",
            );
        }

        let forecaster = SpendForecaster::new(&store, &store);
        let first = forecaster.forecast_as_of(USER, date(2026, 7, 15)).unwrap();
        let second = forecaster.forecast_as_of(USER, date(2026, 7, 15)).unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_classify_trend_thresholds() {
        assert_eq!(classify_trend(&[d("100")]), Trend::Stable);
        assert_eq!(classify_trend(&[d("100"), d("111")]), Trend::Increasing);
        assert_eq!(classify_trend(&[d("100"), d("110")]), Trend::Stable);
        assert_eq!(classify_trend(&[d("100"), d("90")]), Trend::Stable);
        assert_eq!(classify_trend(&[d("100"), d("89")]), Trend::Decreasing);
        // Zero first month: undefined percentage, guarded instead of divided
        assert_eq!(classify_trend(&[d("0"), d("50")]), Trend::Increasing);
        assert_eq!(classify_trend(&[d("0"), d("0")]), Trend::Stable);
    }
}
