use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use rusty_dash::data::model::CellValue;
use rusty_dash::stats::format::CorrelationStrength;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: cell value → Color32
// ---------------------------------------------------------------------------

/// Maps unique values of a chosen column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its unique values.
    pub fn new(column: &str, unique_values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<CellValue, Color32> = unique_values
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given cell value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Correlation shading
// ---------------------------------------------------------------------------

/// Cell background for a correlation value; `None` leaves the cell unshaded.
pub fn correlation_fill(r: f64) -> Option<Color32> {
    match CorrelationStrength::of(r) {
        CorrelationStrength::VeryStrongPositive => Some(Color32::from_rgb(0xc8, 0xe6, 0xc9)),
        CorrelationStrength::StrongPositive => Some(Color32::from_rgb(0xe8, 0xf5, 0xe9)),
        CorrelationStrength::VeryStrongNegative => Some(Color32::from_rgb(0xff, 0xcd, 0xd2)),
        CorrelationStrength::StrongNegative => Some(Color32::from_rgb(0xff, 0xeb, 0xee)),
        CorrelationStrength::Weak => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn unknown_values_fall_back_to_gray() {
        let vals = BTreeSet::from([CellValue::from("a"), CellValue::from("b")]);
        let cm = ColorMap::new("k", &vals);
        assert_ne!(cm.color_for(&CellValue::from("a")), Color32::GRAY);
        assert_eq!(cm.color_for(&CellValue::from("zzz")), Color32::GRAY);
    }

    #[test]
    fn only_strong_correlations_are_shaded() {
        assert!(correlation_fill(0.3).is_none());
        assert!(correlation_fill(0.9).is_some());
        assert!(correlation_fill(-0.6).is_some());
    }
}
