//! Spendlens Core Library
//!
//! The financial insights engine of the Spendlens personal finance tool:
//! - Next-month spend forecasts per category (least squares over monthly totals)
//! - Statistical outlier flags on individual transactions (category z-scores)
//! - Ranked, rule-based budgeting advice for the current month
//! - Keyword-scored category suggestions for free-text descriptions
//!
//! Persistence, transport, auth, and caching live outside this crate. The
//! analyzers read through the narrow collaborator traits in [`store`] and are
//! deterministic for a given data snapshot and as-of date; the only write is
//! clearing a transaction's anomaly flag.

pub mod error;
pub mod insights;
pub mod models;
pub mod store;

mod stats;

pub use error::{Error, Result};
pub use insights::{
    AdviceItem, AdvicePriority, AdvisorConfig, AnomalyConfig, AnomalyDetector, AnomalyRecord,
    AnomalySeverity, BudgetAdvisor, CategorySuggester, CategorySuggestion, ForecastConfig,
    InsightEngine, KeywordLexicon, SpendForecast, SpendForecaster, Trend,
};
pub use models::{Category, CategoryId, Transaction, TransactionId, TransactionKind, UserId};
pub use store::{CategoryStore, MemoryStore, ProfileStore, TransactionStore};
