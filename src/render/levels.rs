//! Contour levels, band classification and colour-bar ticks
//!
//! Levels are `n` values `vmin + k * spacing` with `spacing = (vmax - vmin) / n`,
//! i.e. they cover `[vmin, vmax)` and never reach `vmax` itself. Consecutive
//! levels bound the filled bands; values outside the level range are clipped to
//! the first or last band.

use crate::errors::{Result, SliceVisError};

/// Colour-bar ticks of the 19 to 20 °C temperature movies
pub const LEGACY_TEMPERATURE_TICKS: [f64; 6] = [19.0, 19.2, 19.4, 19.6, 19.8, 20.0];

const MAX_DERIVED_TICKS: usize = 6;

/// Distance between consecutive contour levels
#[must_use]
pub fn contour_spacing(vmin: f64, vmax: f64, n_contours: usize) -> f64 {
    (vmax - vmin) / n_contours as f64
}

/// The `n_contours` evenly spaced contour levels starting at `vmin`
#[must_use]
pub fn contour_levels(vmin: f64, vmax: f64, n_contours: usize) -> Vec<f64> {
    let spacing = contour_spacing(vmin, vmax, n_contours);
    (0..n_contours)
        .map(|k| vmin + k as f64 * spacing)
        .collect()
}

/// Filled bands between consecutive contour levels
#[derive(Debug, Clone, PartialEq)]
pub struct ContourBands {
    levels: Vec<f64>,
}

impl ContourBands {
    /// # Errors
    ///
    /// Returns [`SliceVisError::RenderBackend`] unless there are at least two
    /// finite, strictly increasing levels.
    pub fn new(levels: Vec<f64>) -> Result<Self> {
        if levels.len() < 2 {
            return Err(SliceVisError::RenderBackend(format!(
                "filled contours need at least 2 levels, got {}",
                levels.len()
            )));
        }
        if levels.iter().any(|l| !l.is_finite()) || levels.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SliceVisError::RenderBackend(
                "contour levels must be finite and strictly increasing".to_string(),
            ));
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn band_count(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn lowest(&self) -> f64 {
        self.levels[0]
    }

    pub fn highest(&self) -> f64 {
        self.levels[self.levels.len() - 1]
    }

    /// Band index for `value`; `None` for NaN.
    pub fn classify(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let above = self.levels.partition_point(|&level| level <= value);
        Some(above.saturating_sub(1).min(self.band_count() - 1))
    }

    /// Colormap position of band `k`, at the band's midpoint in level space
    pub fn band_position(&self, k: usize) -> f64 {
        (k as f64 + 0.5) / self.band_count() as f64
    }
}

/// Colour-bar tick selection
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColorbarTicks {
    /// "Nice" ticks derived from the value range
    #[default]
    Derived,
    /// Literal tick values
    Fixed(Vec<f64>),
}

impl ColorbarTicks {
    pub fn legacy_temperature() -> Self {
        Self::Fixed(LEGACY_TEMPERATURE_TICKS.to_vec())
    }

    pub fn resolve(&self, vmin: f64, vmax: f64) -> Vec<f64> {
        match self {
            Self::Derived => derived_ticks(vmin, vmax),
            Self::Fixed(values) => values.clone(),
        }
    }
}

/// Up to six ticks spanning the range, on the finest 1/2/2.5/5 × 10^k step
/// (starting at a fifth of the range) that keeps their count within six.
///
/// Ticks are built in integer units of the step's last decimal, so they compare
/// equal to the same values written as literals.
pub fn derived_ticks(vmin: f64, vmax: f64) -> Vec<f64> {
    let range = vmax - vmin;
    if !range.is_finite() || range <= 0.0 {
        return Vec::new();
    }

    let start = nice_step_index(range / (MAX_DERIVED_TICKS - 1) as f64);
    (start..start + 8)
        .find_map(|index| {
            let (step_units, decimals) = nice_step(index);
            let scale = 10f64.powi(decimals as i32);
            let first = ((vmin * scale - 1e-6) / step_units as f64).ceil() as i64;
            let last = ((vmax * scale + 1e-6) / step_units as f64).floor() as i64;
            let count = (last - first + 1).max(0) as usize;

            (count <= MAX_DERIVED_TICKS).then(|| {
                (first..=last)
                    .map(|n| (n * step_units) as f64 / scale)
                    .collect()
            })
        })
        .unwrap_or_default()
}

// Nice step mantissas within one decade, as (digits, decimals)
const MANTISSAS: [(i64, i32); 4] = [(1, 0), (2, 0), (25, 1), (5, 0)];

/// Position of the largest nice step not exceeding `raw` in the ascending
/// sequence 1, 2, 2.5, 5, 10, 20, ...
fn nice_step_index(raw: f64) -> i64 {
    let exponent = raw.log10().floor() as i64;
    let fraction = raw / 10f64.powi(exponent as i32);
    let within = if fraction >= 5.0 {
        3
    } else if fraction >= 2.5 {
        2
    } else if fraction >= 2.0 {
        1
    } else {
        0
    };
    exponent * MANTISSAS.len() as i64 + within
}

/// Nice step at `index` as `(units, decimals)`, meaning `units / 10^decimals`
fn nice_step(index: i64) -> (i64, u32) {
    let exponent = index.div_euclid(MANTISSAS.len() as i64) as i32;
    let (mantissa, mantissa_decimals) = MANTISSAS[index.rem_euclid(MANTISSAS.len() as i64) as usize];

    let power = exponent - mantissa_decimals;
    if power >= 0 {
        (mantissa * 10i64.pow(power as u32), 0)
    } else {
        (mantissa, (-power) as u32)
    }
}

/// Fewest decimals (up to 6) that print every value exactly
pub fn tick_decimals(values: &[f64]) -> usize {
    (0..=6)
        .find(|&d| {
            let scale = 10f64.powi(d as i32);
            values
                .iter()
                .all(|v| ((v * scale).round() - v * scale).abs() < 1e-6)
        })
        .unwrap_or(6)
}

/// Formats ticks with a shared number of decimals
pub fn format_ticks(values: &[f64]) -> Vec<String> {
    let decimals = tick_decimals(values);
    values
        .iter()
        .map(|v| {
            // avoid "-0"
            let v = if v.abs() < 0.5 * 10f64.powi(-(decimals as i32)) { 0.0 } else { *v };
            format!("{v:.decimals$}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_levels() {
        let spacing = contour_spacing(19.0, 20.05, 100);
        assert!((spacing - 0.0105).abs() < 1e-12);

        let levels = contour_levels(19.0, 20.05, 100);
        assert_eq!(levels.len(), 100);
        assert_eq!(levels[0], 19.0);
        let last = *levels.last().unwrap();
        assert!((last - 20.0395).abs() < 1e-9);
        assert!(last < 20.05);
        assert!(levels.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_band_classification_clips_to_extremes() {
        let bands = ContourBands::new(contour_levels(0.0, 10.0, 5)).unwrap();
        // levels 0, 2, 4, 6, 8 -> four bands
        assert_eq!(bands.band_count(), 4);
        assert_eq!(bands.classify(-3.0), Some(0));
        assert_eq!(bands.classify(0.0), Some(0));
        assert_eq!(bands.classify(2.0), Some(1));
        assert_eq!(bands.classify(7.9), Some(3));
        assert_eq!(bands.classify(8.0), Some(3));
        assert_eq!(bands.classify(1e9), Some(3));
        assert_eq!(bands.classify(f64::NAN), None);
    }

    #[test]
    fn test_band_positions_are_midpoints() {
        let bands = ContourBands::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(bands.band_position(0), 0.25);
        assert_eq!(bands.band_position(1), 0.75);
    }

    #[test]
    fn test_single_level_is_backend_error() {
        let err = ContourBands::new(contour_levels(19.0, 20.0, 1)).unwrap_err();
        assert!(matches!(err, SliceVisError::RenderBackend(_)));
    }

    #[test]
    fn test_derived_ticks_match_legacy_temperature_set() {
        assert_eq!(derived_ticks(19.0, 20.05), LEGACY_TEMPERATURE_TICKS.to_vec());
    }

    #[test]
    fn test_derived_ticks_other_ranges() {
        assert_eq!(derived_ticks(0.0, 100.0), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(derived_ticks(-1.0, 1.0), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(derived_ticks(0.0, 0.7), vec![0.0, 0.2, 0.4, 0.6]);
        assert_eq!(derived_ticks(0.0, 7.0), vec![0.0, 2.0, 4.0, 6.0]);
        assert_eq!(derived_ticks(3.0, 4.0), vec![3.0, 3.2, 3.4, 3.6, 3.8, 4.0]);
        assert!(derived_ticks(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_derived_ticks_reach_the_top_of_the_range() {
        for (vmin, vmax) in [
            (19.0, 20.05),
            (-1.0, 1.0),
            (0.0, 0.7),
            (0.0, 7.0),
            (-2.3, 17.9),
            (0.001, 0.0042),
            (1e4, 3.3e4),
        ] {
            let ticks = derived_ticks(vmin, vmax);
            assert!((2..=6).contains(&ticks.len()), "{vmin}..{vmax}: {ticks:?}");
            let step = ticks[1] - ticks[0];
            assert!(ticks.iter().all(|t| (vmin - 1e-9..=vmax + 1e-9).contains(t)));
            assert!(ticks[0] - vmin < step + 1e-9, "{vmin}..{vmax}: {ticks:?}");
            assert!(vmax - ticks[ticks.len() - 1] < step + 1e-9, "{vmin}..{vmax}: {ticks:?}");
        }
    }

    #[test]
    fn test_fixed_ticks_pass_through() {
        let ticks = ColorbarTicks::legacy_temperature().resolve(0.0, 1.0);
        assert_eq!(ticks, LEGACY_TEMPERATURE_TICKS.to_vec());
    }

    #[test]
    fn test_format_ticks() {
        assert_eq!(
            format_ticks(&LEGACY_TEMPERATURE_TICKS),
            vec!["19.0", "19.2", "19.4", "19.6", "19.8", "20.0"]
        );
        assert_eq!(format_ticks(&[0.0, 25.0, 50.0]), vec!["0", "25", "50"]);
        assert_eq!(format_ticks(&[0.0, -12.5, -25.0]), vec!["0.0", "-12.5", "-25.0"]);
    }
}
