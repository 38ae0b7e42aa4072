//! Presentation-boundary helpers. The engine keeps full precision; only
//! what is shown or written as text goes through here.

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Fixed-point text with exactly `decimals` places.
pub fn format_fixed(value: f64, decimals: u32) -> String {
    format!("{:.*}", decimals as usize, round_to(value, decimals))
}

/// Coarse reading of a correlation coefficient, used for cell shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationStrength {
    VeryStrongPositive,
    StrongPositive,
    Weak,
    StrongNegative,
    VeryStrongNegative,
}

impl CorrelationStrength {
    pub fn of(r: f64) -> Self {
        if r >= 0.8 {
            Self::VeryStrongPositive
        } else if r >= 0.5 {
            Self::StrongPositive
        } else if r <= -0.8 {
            Self::VeryStrongNegative
        } else if r <= -0.5 {
            Self::StrongNegative
        } else {
            Self::Weak
        }
    }
}

/// Whether a correlation cell should be emphasised.
pub fn is_emphasised(r: f64, threshold: f64) -> bool {
    r.abs() >= threshold
}
