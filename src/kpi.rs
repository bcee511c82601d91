//! KPI catalogue: the closed set of keys, their static definitions and the
//! [`KpiSet`] value container.

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use KpiUnit::{Coefficient, Count, Percent, WanYuan, Yuan};
use Polarity::{HigherIsBetter, LowerIsBetter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKey {
    PremiumWritten,
    PremiumEarned,
    TotalLossAmount,
    ClaimCount,
    ExpenseAmount,
    PolicyCount,
    AvgPremiumPerPolicy,
    AvgLossPerCase,
    PremiumEarnedRatio,
    ExpenseRatio,
    LossRatio,
    ClaimFrequency,
    VariableCostRatio,
    MarginalContributionRatio,
    MarginalContributionAmount,
    PremiumShare,
    AvgCommercialIndex,
}

impl KpiKey {
    pub const ALL: [KpiKey; 17] = [
        KpiKey::PremiumWritten,
        KpiKey::PremiumEarned,
        KpiKey::TotalLossAmount,
        KpiKey::ClaimCount,
        KpiKey::ExpenseAmount,
        KpiKey::PolicyCount,
        KpiKey::AvgPremiumPerPolicy,
        KpiKey::AvgLossPerCase,
        KpiKey::PremiumEarnedRatio,
        KpiKey::ExpenseRatio,
        KpiKey::LossRatio,
        KpiKey::ClaimFrequency,
        KpiKey::VariableCostRatio,
        KpiKey::MarginalContributionRatio,
        KpiKey::MarginalContributionAmount,
        KpiKey::PremiumShare,
        KpiKey::AvgCommercialIndex,
    ];

    pub fn as_str(&self) -> &'static str {
        self.definition().id
    }

    pub fn definition(&self) -> &'static KpiDefinition {
        &KPI_DEFINITIONS[*self as usize]
    }

    pub fn unit(&self) -> KpiUnit {
        self.definition().unit
    }

    pub fn polarity(&self) -> Polarity {
        self.definition().polarity
    }
}

impl fmt::Display for KpiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KpiKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        KPI_DEFINITIONS
            .iter()
            .find(|d| d.id == s.trim())
            .map(|d| d.key)
            .ok_or_else(|| DashboardError::UnknownKpi(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiUnit {
    /// Monetary amount in 万元 (10k currency units).
    WanYuan,
    /// Per-unit monetary amount in 元.
    Yuan,
    /// Whole items (policies, claims).
    Count,
    Percent,
    /// Difference between two percentages.
    PercentagePoint,
    /// Dimensionless pricing coefficient.
    Coefficient,
}

impl KpiUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            KpiUnit::WanYuan => "万元",
            KpiUnit::Yuan => "元",
            KpiUnit::Count => "件",
            KpiUnit::Percent => "%",
            KpiUnit::PercentagePoint => "p.p.",
            KpiUnit::Coefficient => "",
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self, KpiUnit::Percent | KpiUnit::PercentagePoint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiDefinition {
    pub key: KpiKey,
    pub id: &'static str,
    /// Display label.
    pub name: &'static str,
    pub unit: KpiUnit,
    pub polarity: Polarity,
}

const fn def(
    key: KpiKey,
    id: &'static str,
    name: &'static str,
    unit: KpiUnit,
    polarity: Polarity,
) -> KpiDefinition {
    KpiDefinition {
        key,
        id,
        name,
        unit,
        polarity,
    }
}

/// Indexed by `KpiKey as usize`; order must follow the enum.
pub static KPI_DEFINITIONS: [KpiDefinition; 17] = [
    def(KpiKey::PremiumWritten, "premium_written", "跟单保费", WanYuan, HigherIsBetter),
    def(KpiKey::PremiumEarned, "premium_earned", "满期保费", WanYuan, HigherIsBetter),
    def(KpiKey::TotalLossAmount, "total_loss_amount", "总赔款", WanYuan, LowerIsBetter),
    def(KpiKey::ClaimCount, "claim_count", "已报件数", Count, LowerIsBetter),
    def(KpiKey::ExpenseAmount, "expense_amount", "费用额", WanYuan, LowerIsBetter),
    def(KpiKey::PolicyCount, "policy_count", "保单件数", Count, HigherIsBetter),
    def(KpiKey::AvgPremiumPerPolicy, "avg_premium_per_policy", "单均保费", Yuan, HigherIsBetter),
    def(KpiKey::AvgLossPerCase, "avg_loss_per_case", "案均赔款", Yuan, LowerIsBetter),
    def(KpiKey::PremiumEarnedRatio, "premium_earned_ratio", "保费满期率", Percent, HigherIsBetter),
    def(KpiKey::ExpenseRatio, "expense_ratio", "费用率", Percent, LowerIsBetter),
    def(KpiKey::LossRatio, "loss_ratio", "满期赔付率", Percent, LowerIsBetter),
    def(KpiKey::ClaimFrequency, "claim_frequency", "满期出险率", Percent, LowerIsBetter),
    def(KpiKey::VariableCostRatio, "variable_cost_ratio", "变动成本率", Percent, LowerIsBetter),
    def(
        KpiKey::MarginalContributionRatio,
        "marginal_contribution_ratio",
        "边际贡献率",
        Percent,
        HigherIsBetter,
    ),
    def(
        KpiKey::MarginalContributionAmount,
        "marginal_contribution_amount",
        "边贡额",
        WanYuan,
        HigherIsBetter,
    ),
    def(KpiKey::PremiumShare, "premium_share", "保费占比", Percent, HigherIsBetter),
    def(
        KpiKey::AvgCommercialIndex,
        "avg_commercial_index",
        "商业险平均自主系数",
        Coefficient,
        LowerIsBetter,
    ),
];

/// Card order for the KPI grid.
pub const KPI_GRID_LAYOUT: [KpiKey; 16] = [
    KpiKey::PremiumWritten,
    KpiKey::PremiumEarned,
    KpiKey::TotalLossAmount,
    KpiKey::ExpenseAmount,
    KpiKey::PolicyCount,
    KpiKey::ClaimCount,
    KpiKey::AvgPremiumPerPolicy,
    KpiKey::AvgLossPerCase,
    KpiKey::PremiumEarnedRatio,
    KpiKey::ExpenseRatio,
    KpiKey::LossRatio,
    KpiKey::ClaimFrequency,
    KpiKey::VariableCostRatio,
    KpiKey::MarginalContributionRatio,
    KpiKey::MarginalContributionAmount,
    KpiKey::PremiumShare,
];

/// Additive KPIs that make sense as a share-of-total breakdown.
pub const PARETO_KPIS: [KpiKey; 7] = [
    KpiKey::PremiumWritten,
    KpiKey::PremiumEarned,
    KpiKey::TotalLossAmount,
    KpiKey::ExpenseAmount,
    KpiKey::PolicyCount,
    KpiKey::ClaimCount,
    KpiKey::MarginalContributionAmount,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub premium_written: f64,
    pub premium_earned: f64,
    pub total_loss_amount: f64,
    pub claim_count: f64,
    pub expense_amount: f64,
    pub policy_count: f64,
    pub avg_premium_per_policy: f64,
    pub avg_loss_per_case: f64,
    pub premium_earned_ratio: f64,
    pub expense_ratio: f64,
    pub loss_ratio: f64,
    pub claim_frequency: f64,
    pub variable_cost_ratio: f64,
    pub marginal_contribution_ratio: f64,
    pub marginal_contribution_amount: f64,
    pub premium_share: f64,
    pub avg_commercial_index: f64,
}

impl KpiSet {
    pub fn get(&self, key: KpiKey) -> f64 {
        match key {
            KpiKey::PremiumWritten => self.premium_written,
            KpiKey::PremiumEarned => self.premium_earned,
            KpiKey::TotalLossAmount => self.total_loss_amount,
            KpiKey::ClaimCount => self.claim_count,
            KpiKey::ExpenseAmount => self.expense_amount,
            KpiKey::PolicyCount => self.policy_count,
            KpiKey::AvgPremiumPerPolicy => self.avg_premium_per_policy,
            KpiKey::AvgLossPerCase => self.avg_loss_per_case,
            KpiKey::PremiumEarnedRatio => self.premium_earned_ratio,
            KpiKey::ExpenseRatio => self.expense_ratio,
            KpiKey::LossRatio => self.loss_ratio,
            KpiKey::ClaimFrequency => self.claim_frequency,
            KpiKey::VariableCostRatio => self.variable_cost_ratio,
            KpiKey::MarginalContributionRatio => self.marginal_contribution_ratio,
            KpiKey::MarginalContributionAmount => self.marginal_contribution_amount,
            KpiKey::PremiumShare => self.premium_share,
            KpiKey::AvgCommercialIndex => self.avg_commercial_index,
        }
    }

    pub fn set(&mut self, key: KpiKey, value: f64) {
        let slot = match key {
            KpiKey::PremiumWritten => &mut self.premium_written,
            KpiKey::PremiumEarned => &mut self.premium_earned,
            KpiKey::TotalLossAmount => &mut self.total_loss_amount,
            KpiKey::ClaimCount => &mut self.claim_count,
            KpiKey::ExpenseAmount => &mut self.expense_amount,
            KpiKey::PolicyCount => &mut self.policy_count,
            KpiKey::AvgPremiumPerPolicy => &mut self.avg_premium_per_policy,
            KpiKey::AvgLossPerCase => &mut self.avg_loss_per_case,
            KpiKey::PremiumEarnedRatio => &mut self.premium_earned_ratio,
            KpiKey::ExpenseRatio => &mut self.expense_ratio,
            KpiKey::LossRatio => &mut self.loss_ratio,
            KpiKey::ClaimFrequency => &mut self.claim_frequency,
            KpiKey::VariableCostRatio => &mut self.variable_cost_ratio,
            KpiKey::MarginalContributionRatio => &mut self.marginal_contribution_ratio,
            KpiKey::MarginalContributionAmount => &mut self.marginal_contribution_amount,
            KpiKey::PremiumShare => &mut self.premium_share,
            KpiKey::AvgCommercialIndex => &mut self.avg_commercial_index,
        };
        *slot = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (KpiKey, f64)> + '_ {
        KpiKey::ALL.iter().map(move |key| (*key, self.get(*key)))
    }

    pub fn is_finite(&self) -> bool {
        self.iter().all(|(_, value)| value.is_finite())
    }
}
