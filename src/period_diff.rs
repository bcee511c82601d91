use crate::formula::finite_or_zero;
use crate::schema::RawBusinessRecord;
use std::collections::HashMap;

/// Subtracts the previous period from the current one, line by line.
///
/// Lines are matched by `business_type`. A line missing from `previous` is
/// diffed against zero; lines only in `previous` are dropped. Averages and
/// coefficients are taken from `current` unchanged.
pub fn diff(current: &[RawBusinessRecord], previous: &[RawBusinessRecord]) -> Vec<RawBusinessRecord> {
    let previous_by_type: HashMap<&str, &RawBusinessRecord> = previous
        .iter()
        .map(|r| (r.business_type.as_str(), r))
        .collect();

    current
        .iter()
        .map(|cur| match previous_by_type.get(cur.business_type.as_str()) {
            Some(prev) => subtract(cur, prev),
            None => subtract(
                cur,
                &RawBusinessRecord::zeroed(&cur.period_id, &cur.period_label, &cur.business_type),
            ),
        })
        .collect()
}

fn subtract(current: &RawBusinessRecord, previous: &RawBusinessRecord) -> RawBusinessRecord {
    let delta = |c: f64, p: f64| finite_or_zero(c) - finite_or_zero(p);

    RawBusinessRecord {
        period_id: current.period_id.clone(),
        period_label: current.period_label.clone(),
        business_type: current.business_type.clone(),
        premium_written: delta(current.premium_written, previous.premium_written),
        premium_earned: delta(current.premium_earned, previous.premium_earned),
        total_loss_amount: delta(current.total_loss_amount, previous.total_loss_amount),
        expense_amount_raw: delta(current.expense_amount_raw, previous.expense_amount_raw),
        claim_count: delta(current.claim_count, previous.claim_count),
        avg_premium_per_policy: current.avg_premium_per_policy,
        avg_commercial_index: current.avg_commercial_index,
    }
}
