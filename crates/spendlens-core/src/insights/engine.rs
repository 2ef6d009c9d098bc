//! Insight engine - one front door over the four analyzers
//!
//! Borrows the collaborator stores once and exposes the engine's public
//! operations: forecast, anomaly detection (plus flag clearing), budget
//! advice, and category suggestion (plus the correction hook). The analyzers
//! never call each other; each reads its own snapshot from the stores.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{CategoryId, TransactionId, UserId};
use crate::store::{CategoryStore, ProfileStore, TransactionStore};

use super::anomaly_detector::{AnomalyConfig, AnomalyDetector};
use super::budget_advisor::{AdvisorConfig, BudgetAdvisor};
use super::category_suggester::{CategorySuggester, KeywordLexicon};
use super::spend_forecaster::{ForecastConfig, SpendForecaster};
use super::types::{AdviceItem, AnomalyRecord, CategorySuggestion, SpendForecast};

/// The main insight engine
pub struct InsightEngine<'a> {
    transactions: &'a dyn TransactionStore,
    categories: &'a dyn CategoryStore,
    profiles: &'a dyn ProfileStore,
    forecaster: SpendForecaster<'a>,
    detector: AnomalyDetector<'a>,
    advisor: BudgetAdvisor<'a>,
    suggester: CategorySuggester<'a>,
}

impl<'a> InsightEngine<'a> {
    /// Create an engine with default configuration for every analyzer
    pub fn new(
        transactions: &'a dyn TransactionStore,
        categories: &'a dyn CategoryStore,
        profiles: &'a dyn ProfileStore,
    ) -> Self {
        Self {
            transactions,
            categories,
            profiles,
            forecaster: SpendForecaster::new(transactions, categories),
            detector: AnomalyDetector::new(transactions, categories),
            advisor: BudgetAdvisor::new(transactions, categories, profiles),
            suggester: CategorySuggester::new(categories),
        }
    }

    /// Replace the forecast configuration
    pub fn with_forecast_config(mut self, config: ForecastConfig) -> Self {
        self.forecaster = SpendForecaster::with_config(self.transactions, self.categories, config);
        self
    }

    /// Replace the anomaly detection configuration
    pub fn with_anomaly_config(mut self, config: AnomalyConfig) -> Self {
        self.detector = AnomalyDetector::with_config(self.transactions, self.categories, config);
        self
    }

    /// Replace the advisor configuration
    pub fn with_advisor_config(mut self, config: AdvisorConfig) -> Self {
        self.advisor =
            BudgetAdvisor::with_config(self.transactions, self.categories, self.profiles, config);
        self
    }

    /// Replace the keyword lexicon behind category suggestion
    pub fn with_lexicon(mut self, lexicon: KeywordLexicon) -> Self {
        self.suggester = CategorySuggester::with_lexicon(self.categories, lexicon);
        self
    }

    /// Next-month spend predictions per category, total row first
    pub fn forecast(&self, user: UserId) -> Result<Vec<SpendForecast>> {
        self.forecaster.forecast(user)
    }

    /// [`Self::forecast`] with a pinned as-of date
    pub fn forecast_as_of(&self, user: UserId, today: NaiveDate) -> Result<Vec<SpendForecast>> {
        self.forecaster.forecast_as_of(user, today)
    }

    /// Statistical outliers among recent transactions, most severe first
    pub fn detect_anomalies(&self, user: UserId) -> Result<Vec<AnomalyRecord>> {
        self.detector.detect(user)
    }

    /// [`Self::detect_anomalies`] with a pinned as-of date
    pub fn detect_anomalies_as_of(
        &self,
        user: UserId,
        today: NaiveDate,
    ) -> Result<Vec<AnomalyRecord>> {
        self.detector.detect_as_of(user, today)
    }

    /// Clear the anomaly flag on one of the caller's own transactions
    pub fn mark_expected(&self, transaction_id: TransactionId, user: UserId) -> Result<()> {
        self.detector.mark_expected(transaction_id, user)
    }

    /// Ranked budget recommendations for the current month, at most five
    pub fn advise(&self, user: UserId) -> Result<Vec<AdviceItem>> {
        self.advisor.advise(user)
    }

    /// [`Self::advise`] with a pinned as-of date
    pub fn advise_as_of(&self, user: UserId, today: NaiveDate) -> Result<Vec<AdviceItem>> {
        self.advisor.advise_as_of(user, today)
    }

    /// Best-guess category for a free-text description
    pub fn suggest_category(
        &self,
        description: &str,
        user: UserId,
    ) -> Result<Option<CategorySuggestion>> {
        self.suggester.suggest(description, user)
    }

    /// Accept (and validate) a categorization correction; no learning yet
    pub fn record_correction(
        &self,
        description: &str,
        category_id: CategoryId,
        user: UserId,
    ) -> Result<()> {
        self.suggester.record_correction(description, category_id, user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_engine_runs_all_operations_on_empty_store() {
        let store = MemoryStore::new();
        let engine = InsightEngine::new(&store, &store, &store);
        let today = date(2026, 7, 15);

        assert!(engine.forecast_as_of(1, today).unwrap().is_empty());
        assert!(engine.detect_anomalies_as_of(1, today).unwrap().is_empty());
        // No configured income: exactly the profile-setup nudge
        assert_eq!(engine.advise_as_of(1, today).unwrap().len(), 1);
        assert!(engine.suggest_category("coffee", 1).unwrap().is_none());
    }

    #[test]
    fn test_engine_config_overrides_apply() {
        let store = MemoryStore::new();
        let groceries = store.add_category("Groceries", TransactionKind::Expense, None);
        store.add_transaction(
            1,
            Some(groceries),
            TransactionKind::Expense,
            d("25"),
            date(2026, 6, 10),
            "shop",
        );

        let engine = InsightEngine::new(&store, &store, &store).with_forecast_config(
            ForecastConfig {
                min_category_transactions: 2,
                ..ForecastConfig::default()
            },
        );
        assert!(engine.forecast_as_of(1, date(2026, 7, 15)).unwrap().is_empty());
    }
}
