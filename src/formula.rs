use crate::kpi::KpiSet;
use crate::schema::RawBusinessRecord;

/// Division that yields 0 instead of `NaN`/`Infinity` when the denominator is
/// zero or not finite.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() {
        quotient
    } else {
        0.0
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Derives the full KPI set for one raw record.
///
/// `premium_share` is left at 0 because its denominator depends on the whole
/// selection; the dashboard processor fills it in.
pub fn compute_kpis(record: &RawBusinessRecord) -> KpiSet {
    let premium_written = finite_or_zero(record.premium_written);
    let premium_earned = finite_or_zero(record.premium_earned);
    let total_loss_amount = finite_or_zero(record.total_loss_amount);
    let claim_count = finite_or_zero(record.claim_count);
    let avg_premium_per_policy = finite_or_zero(record.avg_premium_per_policy);

    // premium is in 万元, average premium in 元
    let policy_count = safe_divide(premium_written * 10_000.0, avg_premium_per_policy);

    let expense_ratio = safe_divide(record.expense_amount_raw, premium_written) * 100.0;
    let expense_amount = premium_written * expense_ratio / 100.0;

    let premium_earned_ratio = safe_divide(premium_earned, premium_written) * 100.0;
    let loss_ratio = safe_divide(total_loss_amount, premium_earned) * 100.0;
    let avg_loss_per_case = safe_divide(total_loss_amount * 10_000.0, claim_count);

    let earned_policy_count = policy_count * premium_earned_ratio / 100.0;
    let claim_frequency = safe_divide(claim_count, earned_policy_count) * 100.0;

    let variable_cost_ratio = loss_ratio + expense_ratio;
    let marginal_contribution_ratio = 100.0 - variable_cost_ratio;
    let marginal_contribution_amount = premium_earned * marginal_contribution_ratio / 100.0;

    KpiSet {
        premium_written,
        premium_earned,
        total_loss_amount,
        claim_count,
        expense_amount,
        policy_count,
        avg_premium_per_policy,
        avg_loss_per_case,
        premium_earned_ratio,
        expense_ratio,
        loss_ratio,
        claim_frequency,
        variable_cost_ratio,
        marginal_contribution_ratio,
        marginal_contribution_amount,
        premium_share: 0.0,
        avg_commercial_index: finite_or_zero(record.avg_commercial_index),
    }
}
