use crate::kpi::KpiUnit;

/// Abbreviation applied to large values when a short label is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortScale {
    pub threshold: f64,
    pub divisor: f64,
    pub suffix: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatStrategy {
    /// Rounded to an integer with thousands separators.
    Rounded { short_scale: Option<ShortScale> },
    /// Fixed number of decimals followed by a suffix.
    Fixed { decimals: usize, suffix: &'static str },
}

const TEN_THOUSAND: f64 = 10_000.0;

impl KpiUnit {
    pub const fn format_strategy(self) -> FormatStrategy {
        match self {
            KpiUnit::WanYuan => FormatStrategy::Rounded {
                short_scale: Some(ShortScale {
                    threshold: TEN_THOUSAND,
                    divisor: TEN_THOUSAND,
                    suffix: "亿",
                }),
            },
            KpiUnit::Yuan => FormatStrategy::Rounded {
                short_scale: Some(ShortScale {
                    threshold: TEN_THOUSAND,
                    divisor: TEN_THOUSAND,
                    suffix: "万",
                }),
            },
            KpiUnit::Count => FormatStrategy::Rounded { short_scale: None },
            KpiUnit::Percent => FormatStrategy::Fixed {
                decimals: 1,
                suffix: "%",
            },
            KpiUnit::PercentagePoint => FormatStrategy::Fixed {
                decimals: 1,
                suffix: "p.p.",
            },
            KpiUnit::Coefficient => FormatStrategy::Fixed {
                decimals: 4,
                suffix: "",
            },
        }
    }
}

/// Renders a KPI value for display. `short` abbreviates large amounts
/// (万元 → 亿, 元 → 万) for axis ticks and cards.
pub fn format_kpi_value(value: f64, unit: KpiUnit, short: bool) -> String {
    if value.is_nan() {
        return "N/A".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }

    match unit.format_strategy() {
        FormatStrategy::Rounded { short_scale } => {
            let rounded = value.round();
            match short_scale {
                Some(scale) if short && rounded.abs() >= scale.threshold => {
                    format!("{}{}", group_number(rounded / scale.divisor, 1), scale.suffix)
                }
                _ => group_number(rounded, 0),
            }
        }
        FormatStrategy::Fixed { decimals, suffix } => format!("{:.*}{}", decimals, value, suffix),
    }
}

/// Formats with at most `max_fraction_digits` decimals (trailing zeros
/// trimmed) and comma thousands separators.
pub fn group_number(value: f64, max_fraction_digits: usize) -> String {
    let fixed = format!("{:.*}", max_fraction_digits, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac)) => (int_part, frac.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_number() {
        assert_eq!(group_number(0.0, 0), "0");
        assert_eq!(group_number(999.0, 0), "999");
        assert_eq!(group_number(1000.0, 0), "1,000");
        assert_eq!(group_number(1234567.0, 0), "1,234,567");
        assert_eq!(group_number(-1234567.0, 0), "-1,234,567");
        assert_eq!(group_number(12.34, 1), "12.3");
        assert_eq!(group_number(12.0, 1), "12");
        assert_eq!(group_number(-0.2, 0), "0");
    }

    #[test]
    fn test_amounts() {
        assert_eq!(format_kpi_value(12345.6, KpiUnit::WanYuan, false), "12,346");
        assert_eq!(format_kpi_value(12345.6, KpiUnit::WanYuan, true), "1.2亿");
        assert_eq!(format_kpi_value(20000.0, KpiUnit::WanYuan, true), "2亿");
        assert_eq!(format_kpi_value(9999.4, KpiUnit::WanYuan, true), "9,999");
        assert_eq!(format_kpi_value(-35000.0, KpiUnit::WanYuan, true), "-3.5亿");
        assert_eq!(format_kpi_value(45678.0, KpiUnit::Yuan, true), "4.6万");
        assert_eq!(format_kpi_value(2500.4, KpiUnit::Yuan, true), "2,500");
    }

    #[test]
    fn test_counts_never_abbreviate() {
        assert_eq!(format_kpi_value(1234567.0, KpiUnit::Count, true), "1,234,567");
        assert_eq!(format_kpi_value(41.5, KpiUnit::Count, false), "42");
    }

    #[test]
    fn test_percentages_and_coefficients() {
        assert_eq!(format_kpi_value(65.432, KpiUnit::Percent, false), "65.4%");
        assert_eq!(format_kpi_value(-1.26, KpiUnit::PercentagePoint, false), "-1.3p.p.");
        assert_eq!(format_kpi_value(0.87654, KpiUnit::Coefficient, true), "0.8765");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_kpi_value(f64::NAN, KpiUnit::Percent, false), "N/A");
        assert_eq!(format_kpi_value(f64::INFINITY, KpiUnit::Percent, false), "∞");
        assert_eq!(format_kpi_value(f64::NEG_INFINITY, KpiUnit::Count, false), "-∞");
    }
}
