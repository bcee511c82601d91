use crate::error::{DashboardError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Business type used for synthetic records that sum several business lines.
pub const AGGREGATED_BUSINESS_TYPE: &str = "Aggregated";

/// Trend length used when the settings do not override it.
pub const DEFAULT_TREND_POINTS: usize = 15;

/// One business line's metrics for one reporting period, as stored in the
/// `business_data` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawBusinessRecord {
    #[schemars(description = "Sortable period identifier, e.g. 2024-W26")]
    pub period_id: String,

    #[schemars(description = "Human readable period label, e.g. 2024年第26周")]
    pub period_label: String,

    #[schemars(description = "Business line identifier, unique within a period")]
    pub business_type: String,

    #[serde(default, deserialize_with = "zero_if_null")]
    #[schemars(with = "Option<f64>", description = "Written premium in 万元")]
    pub premium_written: f64,

    #[serde(default, deserialize_with = "zero_if_null")]
    #[schemars(with = "Option<f64>", description = "Earned premium in 万元")]
    pub premium_earned: f64,

    #[serde(default, deserialize_with = "zero_if_null")]
    #[schemars(with = "Option<f64>", description = "Total incurred loss in 万元")]
    pub total_loss_amount: f64,

    #[serde(default, deserialize_with = "zero_if_null")]
    #[schemars(with = "Option<f64>", description = "Expense amount in 万元")]
    pub expense_amount_raw: f64,

    #[serde(default, deserialize_with = "zero_if_null")]
    #[schemars(with = "Option<f64>", description = "Number of reported claims")]
    pub claim_count: f64,

    #[serde(default, deserialize_with = "zero_if_null")]
    #[schemars(with = "Option<f64>", description = "Average premium per policy in 元")]
    pub avg_premium_per_policy: f64,

    #[serde(default, deserialize_with = "zero_if_null")]
    #[schemars(
        with = "Option<f64>",
        description = "Average commercial pricing coefficient. Only meaningful for a single business line."
    )]
    pub avg_commercial_index: f64,
}

fn zero_if_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl RawBusinessRecord {
    /// All-zero record carrying the given identity.
    pub fn zeroed(period_id: &str, period_label: &str, business_type: &str) -> Self {
        Self {
            period_id: period_id.to_string(),
            period_label: period_label.to_string(),
            business_type: business_type.to_string(),
            premium_written: 0.0,
            premium_earned: 0.0,
            total_loss_amount: 0.0,
            expense_amount_raw: 0.0,
            claim_count: 0.0,
            avg_premium_per_policy: 0.0,
            avg_commercial_index: 0.0,
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RawBusinessRecord)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Cumulative figures since the start of the year.
    #[default]
    Ytd,
    /// Movement between two consecutive periods.
    Pop,
    /// Cumulative figures against a user-selected period.
    Comparison,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Ytd => "ytd",
            AnalysisMode::Pop => "pop",
            AnalysisMode::Comparison => "comparison",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AnalysisMode::Ytd => "累计 (YTD)",
            AnalysisMode::Pop => "当周 (PoP)",
            AnalysisMode::Comparison => "对比 (Comparison)",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ytd" => Ok(AnalysisMode::Ytd),
            "pop" => Ok(AnalysisMode::Pop),
            "comparison" => Ok(AnalysisMode::Comparison),
            other => Err(DashboardError::UnknownAnalysisMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Sorted by id, newest first.
    pub periods: Vec<PeriodOption>,
    /// Sorted lexically.
    pub business_types: Vec<String>,
}

impl FilterOptions {
    pub fn period_label(&self, period_id: &str) -> Option<&str> {
        self.periods
            .iter()
            .find(|p| p.id == period_id)
            .map(|p| p.label.as_str())
    }

    /// Ids of the periods strictly older than `period_id`, nearest first.
    pub fn periods_before(&self, period_id: &str) -> Vec<&str> {
        self.periods
            .iter()
            .position(|p| p.id == period_id)
            .map(|idx| {
                self.periods[idx + 1..]
                    .iter()
                    .map(|p| p.id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Raw records for one trend point and the period immediately before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendWindowEntry {
    pub period_id: String,
    pub period_label: String,
    pub current: Vec<RawBusinessRecord>,
    pub previous: Vec<RawBusinessRecord>,
}

/// What the consumer asked to see. Empty fields are filled in by
/// [`crate::service::DashboardService::resolve_request`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DashboardRequest {
    #[schemars(description = "Reporting period id. Defaults to the newest period.")]
    pub current_period: String,

    #[schemars(
        description = "Explicit comparison period id, used in comparison mode. Defaults to the second newest period."
    )]
    pub compare_period: String,

    pub mode: AnalysisMode,

    #[schemars(description = "Business lines to include. Empty selects every business line.")]
    pub selected_business_types: Vec<String>,
}

impl DashboardRequest {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DashboardRequest)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Number of points in the trailing trend.
    pub trend_points: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            trend_points: DEFAULT_TREND_POINTS,
        }
    }
}

impl DashboardSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trend_points == 0 {
            return Err(DashboardError::InvalidSettings(
                "trend_points must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
