//! Seeded synthetic business book for demos and tests.
//!
//! Figures are cumulative within each ISO year, like the real store, so the
//! PoP view recovers the weekly movement.

use crate::error::{DashboardError, Result};
use crate::schema::RawBusinessRecord;
use crate::utils::trailing_weeks;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::collections::HashMap;

/// Business line profile: weekly written premium (万元), base loss ratio,
/// expense ratio, average premium per policy (元), commercial index.
const BUSINESS_LINES: [(&str, f64, f64, f64, f64, f64); 7] = [
    ("交强险", 420.0, 0.62, 0.12, 950.0, 1.0),
    ("车损险", 780.0, 0.58, 0.22, 2600.0, 0.86),
    ("三者险", 650.0, 0.55, 0.20, 1400.0, 0.88),
    ("座位险", 60.0, 0.35, 0.25, 180.0, 0.90),
    ("盗抢险", 35.0, 0.30, 0.28, 260.0, 0.92),
    ("新能源车险", 310.0, 0.72, 0.18, 4100.0, 0.95),
    ("摩托车险", 25.0, 0.48, 0.15, 320.0, 1.02),
];

/// Average claim size in 元, used to derive claim counts from losses.
const AVG_CLAIM_SIZE: f64 = 5_200.0;

#[derive(Debug, Clone)]
pub struct SampleBookConfig {
    pub end: NaiveDate,
    pub weeks: usize,
    pub seed: u64,
    /// Relative standard deviation of weekly movements, 0.0 to 1.0.
    pub noise_factor: f64,
}

impl SampleBookConfig {
    pub fn new(end: NaiveDate, weeks: usize) -> Self {
        Self {
            end,
            weeks,
            seed: 7,
            noise_factor: 0.08,
        }
    }
}

pub fn sample_business_lines() -> Vec<String> {
    BUSINESS_LINES.iter().map(|line| line.0.to_string()).collect()
}

#[derive(Default)]
struct Running {
    year: i32,
    premium: f64,
    loss: f64,
    expense: f64,
}

pub fn generate_sample_book(config: &SampleBookConfig) -> Result<Vec<RawBusinessRecord>> {
    if !(0.0..=1.0).contains(&config.noise_factor) {
        return Err(DashboardError::InvalidSettings(format!(
            "noise factor {} must be between 0.0 and 1.0",
            config.noise_factor
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise_factor)
        .map_err(|e| DashboardError::InvalidSettings(e.to_string()))?;

    let mut running: HashMap<&str, Running> = HashMap::new();
    let mut rows = Vec::with_capacity(config.weeks * BUSINESS_LINES.len());

    for period in trailing_weeks(config.end, config.weeks) {
        let (year, week) = period
            .id
            .split_once("-W")
            .and_then(|(y, w)| Some((y.parse::<i32>().ok()?, w.parse::<u32>().ok()?)))
            .unwrap_or((0, 1));

        for &(name, weekly_premium, loss_ratio, expense_ratio, avg_premium, index) in &BUSINESS_LINES {
            let state = running.entry(name).or_default();
            if state.year != year {
                *state = Running {
                    year,
                    ..Running::default()
                };
            }

            let premium = (weekly_premium * (1.0 + normal.sample(&mut rng))).max(0.0);
            state.premium += premium;
            state.expense += premium * expense_ratio;

            let earned_ratio = (0.15 + 0.016 * week as f64).min(0.95);
            let earned = state.premium * earned_ratio;
            let weekly_loss = premium * earned_ratio * loss_ratio * (1.0 + normal.sample(&mut rng));
            state.loss += weekly_loss.max(0.0);

            rows.push(RawBusinessRecord {
                period_id: period.id.clone(),
                period_label: period.label.clone(),
                business_type: name.to_string(),
                premium_written: state.premium,
                premium_earned: earned,
                total_loss_amount: state.loss,
                expense_amount_raw: state.expense,
                claim_count: (state.loss * 10_000.0 / AVG_CLAIM_SIZE).round(),
                avg_premium_per_policy: avg_premium * (1.0 + normal.sample(&mut rng) / 4.0),
                avg_commercial_index: index,
            });
        }
    }

    Ok(rows)
}
