//! Core types for the insight analyzers

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{CategoryId, TransactionId};

/// Direction of a spending series between its first and last periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increasing" => Ok(Trend::Increasing),
            "decreasing" => Ok(Trend::Decreasing),
            "stable" => Ok(Trend::Stable),
            _ => Err(format!("Unknown trend: {}", s)),
        }
    }
}

/// How far outside its category's distribution an anomalous amount sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    /// |z| above the flag threshold but at or below the high threshold
    Medium,
    /// |z| above the high threshold
    High,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalySeverity::Medium => "medium",
            AnomalySeverity::High => "high",
        }
    }

    /// Numeric priority for sorting (higher = more severe)
    pub fn priority(&self) -> u8 {
        match self {
            AnomalySeverity::Medium => 1,
            AnomalySeverity::High => 2,
        }
    }
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnomalySeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medium" => Ok(AnomalySeverity::Medium),
            "high" => Ok(AnomalySeverity::High),
            _ => Err(format!("Unknown anomaly severity: {}", s)),
        }
    }
}

/// Urgency of a budget recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvicePriority {
    High,
    Medium,
    Low,
}

impl AdvicePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvicePriority::High => "high",
            AdvicePriority::Medium => "medium",
            AdvicePriority::Low => "low",
        }
    }

    /// Sort rank: High sorts before Medium sorts before Low
    pub fn rank(&self) -> u8 {
        match self {
            AdvicePriority::High => 1,
            AdvicePriority::Medium => 2,
            AdvicePriority::Low => 3,
        }
    }
}

impl fmt::Display for AdvicePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdvicePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(AdvicePriority::High),
            "medium" => Ok(AdvicePriority::Medium),
            "low" => Ok(AdvicePriority::Low),
            _ => Err(format!("Unknown advice priority: {}", s)),
        }
    }
}

/// Next-month spend prediction for one category, or the synthesized total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendForecast {
    /// None marks the synthesized total row
    pub category_id: Option<CategoryId>,
    pub category_name: String,
    /// Never negative, rounded to 2 decimal places
    pub predicted_amount: Decimal,
    /// Mean of the monthly totals behind the prediction, rounded to 2 places
    pub historical_average: Decimal,
    /// Always within [0, 1]
    pub confidence_score: f64,
    pub trend: Trend,
}

/// A transaction flagged as a statistical outlier within its category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub transaction_id: TransactionId,
    pub description: String,
    pub amount: Decimal,
    pub category_name: String,
    pub date: NaiveDate,
    pub category_mean: Decimal,
    pub category_std_dev: Decimal,
    /// Signed distance from the category mean, in standard deviations
    pub z_score: f64,
    pub severity: AnomalySeverity,
    pub reason: String,
}

/// One ranked budgeting recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceItem {
    pub category: String,
    pub recommendation: String,
    pub current_spending: Decimal,
    pub recommended_spending: Option<Decimal>,
    pub percentage_of_income: f64,
    pub priority: AdvicePriority,
    pub action_item: String,
}

/// Best-guess category for a free-text transaction description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category_id: CategoryId,
    pub category_name: String,
    /// Within [0, 100]
    pub confidence: f64,
    pub reason: String,
}
