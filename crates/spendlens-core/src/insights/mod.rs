//! Insight analyzers - forecasts, anomalies, advice, suggestions
//!
//! Four independent analyzers over a user's transaction history:
//!
//! - **Spend Forecaster** - next-month spend per category via least squares
//! - **Anomaly Detector** - z-score outlier flags on individual transactions
//! - **Budget Advisor** - ranked threshold-based recommendations
//! - **Category Suggester** - keyword-scored category for free text
//!
//! [`InsightEngine`] fronts all four; each is also usable standalone.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendlens_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::new(&store, &store, &store);
//! let forecasts = engine.forecast(user_id)?;
//! let anomalies = engine.detect_anomalies(user_id)?;
//! ```

pub mod anomaly_detector;
pub mod budget_advisor;
pub mod category_suggester;
pub mod engine;
pub mod spend_forecaster;
pub mod types;

pub use anomaly_detector::{AnomalyConfig, AnomalyDetector};
pub use budget_advisor::{AdvisorConfig, BudgetAdvisor};
pub use category_suggester::{CategorySuggester, KeywordLexicon};
pub use engine::InsightEngine;
pub use spend_forecaster::{ForecastConfig, SpendForecaster, MIN_CATEGORY_TRANSACTIONS};
pub use types::{
    AdviceItem, AdvicePriority, AnomalyRecord, AnomalySeverity, CategorySuggestion, SpendForecast,
    Trend,
};
