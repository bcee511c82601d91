use crate::formula::{finite_or_zero, safe_divide};
use crate::schema::{RawBusinessRecord, AGGREGATED_BUSINESS_TYPE};

/// Collapses many business lines into one synthetic `"Aggregated"` record.
///
/// Additive fields are summed and `avg_premium_per_policy` is weighted by
/// written premium. `avg_commercial_index` survives only when there is a
/// single input line; an average of the coefficient across lines is not
/// meaningful. Period identity comes from the first record.
pub fn aggregate(records: &[RawBusinessRecord]) -> RawBusinessRecord {
    let Some(first) = records.first() else {
        return RawBusinessRecord::zeroed("", "", AGGREGATED_BUSINESS_TYPE);
    };

    let mut aggregated =
        RawBusinessRecord::zeroed(&first.period_id, &first.period_label, AGGREGATED_BUSINESS_TYPE);
    let mut weighted_avg_premium = 0.0;

    for record in records {
        let premium_written = finite_or_zero(record.premium_written);

        aggregated.premium_written += premium_written;
        aggregated.premium_earned += finite_or_zero(record.premium_earned);
        aggregated.total_loss_amount += finite_or_zero(record.total_loss_amount);
        aggregated.expense_amount_raw += finite_or_zero(record.expense_amount_raw);
        aggregated.claim_count += finite_or_zero(record.claim_count);

        weighted_avg_premium += finite_or_zero(record.avg_premium_per_policy) * premium_written;
    }

    aggregated.avg_premium_per_policy =
        safe_divide(weighted_avg_premium, aggregated.premium_written);

    if records.len() == 1 {
        aggregated.avg_commercial_index = finite_or_zero(first.avg_commercial_index);
    }

    aggregated
}

/// Sum of written premium, treating non-finite values as zero.
pub fn total_premium_written(records: &[RawBusinessRecord]) -> f64 {
    records
        .iter()
        .map(|r| finite_or_zero(r.premium_written))
        .sum()
}
