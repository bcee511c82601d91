use serde::{Deserialize, Serialize};

/// Profitability band of a variable cost ratio (loss ratio + expense ratio).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    /// VCR ≤ 85%.
    Healthy,
    /// 85% < VCR ≤ 90%.
    Caution,
    /// 90% < VCR ≤ 94%.
    Warning,
    /// 94% < VCR ≤ 100%.
    Danger,
    /// VCR > 100%: the line loses money before fixed costs.
    Critical,
}

impl RiskBand {
    pub fn classify(variable_cost_ratio: f64) -> Self {
        if variable_cost_ratio <= 85.0 {
            RiskBand::Healthy
        } else if variable_cost_ratio <= 90.0 {
            RiskBand::Caution
        } else if variable_cost_ratio <= 94.0 {
            RiskBand::Warning
        } else if variable_cost_ratio <= 100.0 {
            RiskBand::Danger
        } else {
            RiskBand::Critical
        }
    }

    pub fn hue(&self) -> u16 {
        match self {
            RiskBand::Healthy => 140,
            RiskBand::Caution => 210,
            RiskBand::Warning => 60,
            RiskBand::Danger => 0,
            RiskBand::Critical => 330,
        }
    }
}

/// CSS `hsl()` colour for a variable cost ratio. Within a band the shade
/// darkens as the ratio moves away from the 85-90% boundary.
pub fn vcr_color(variable_cost_ratio: f64) -> String {
    let vcr = variable_cost_ratio;
    let band = RiskBand::classify(vcr);

    let lightness = match band {
        RiskBand::Healthy => {
            let depth = ((85.0 - vcr) / 35.0).clamp(0.0, 1.0);
            40.0 - 15.0 * depth
        }
        RiskBand::Caution => {
            let position = (vcr - 85.0) / 5.0;
            45.0 - 15.0 * (1.0 - position)
        }
        RiskBand::Warning => 50.0 - 15.0 * (vcr - 90.0) / 4.0,
        RiskBand::Danger => 50.0 - 15.0 * (vcr - 94.0) / 6.0,
        RiskBand::Critical => {
            let depth = ((vcr - 100.0) / 30.0).min(1.0);
            55.0 - 20.0 * depth
        }
    };

    format!("hsl({}, 80%, {:.1}%)", band.hue(), lightness)
}
