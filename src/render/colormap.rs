//! Named colormaps
//!
//! Each map is a short table of evenly spaced anchor colours sampled from the
//! matplotlib map of the same name, linearly interpolated in between. A `_r`
//! suffix reverses any map.

use crate::errors::{Result, SliceVisError};

/// RGB colour
pub type Rgb = [u8; 3];

const INFERNO: &[Rgb] = &[
    [0, 0, 4],
    [31, 12, 72],
    [85, 15, 109],
    [136, 34, 106],
    [186, 54, 85],
    [227, 89, 51],
    [249, 140, 10],
    [249, 201, 50],
    [252, 255, 164],
];

const MAGMA: &[Rgb] = &[
    [0, 0, 4],
    [28, 16, 68],
    [79, 18, 123],
    [129, 37, 129],
    [181, 54, 122],
    [229, 80, 100],
    [251, 135, 97],
    [254, 194, 135],
    [252, 253, 191],
];

const PLASMA: &[Rgb] = &[
    [13, 8, 135],
    [65, 4, 157],
    [106, 0, 168],
    [143, 13, 164],
    [177, 42, 144],
    [204, 71, 120],
    [225, 100, 98],
    [246, 136, 70],
    [240, 249, 33],
];

const VIRIDIS: &[Rgb] = &[
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

const CIVIDIS: &[Rgb] = &[
    [0, 34, 78],
    [35, 62, 108],
    [87, 92, 109],
    [124, 123, 120],
    [166, 157, 117],
    [212, 194, 99],
    [255, 234, 70],
];

const GREYS: &[Rgb] = &[[255, 255, 255], [0, 0, 0]];

const GRAY: &[Rgb] = &[[0, 0, 0], [255, 255, 255]];

const REGISTRY: &[(&str, &[Rgb])] = &[
    ("inferno", INFERNO),
    ("magma", MAGMA),
    ("plasma", PLASMA),
    ("viridis", VIRIDIS),
    ("cividis", CIVIDIS),
    ("Greys", GREYS),
    ("gray", GRAY),
];

/// A colormap resolved from the registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colormap {
    name: &'static str,
    anchors: &'static [Rgb],
    reversed: bool,
}

impl Colormap {
    /// Looks up `name`, accepting a trailing `_r` for the reversed map.
    ///
    /// # Errors
    ///
    /// Returns [`SliceVisError::UnknownColormap`] if the name is not registered.
    pub fn by_name(name: &str) -> Result<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };

        REGISTRY
            .iter()
            .find(|(registered, _)| *registered == base)
            .map(|&(registered, anchors)| Self {
                name: registered,
                anchors,
                reversed,
            })
            .ok_or_else(|| SliceVisError::UnknownColormap {
                name: name.to_string(),
            })
    }

    /// Registered base names
    pub fn names() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|(name, _)| *name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Colour at position `t`, clamped to `[0, 1]`
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };

        let segments = self.anchors.len() - 1;
        let scaled = t * segments as f64;
        let lower = (scaled.floor() as usize).min(segments - 1);
        let frac = scaled - lower as f64;

        interpolate(self.anchors[lower], self.anchors[lower + 1], frac)
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self {
            name: "inferno",
            anchors: INFERNO,
            reversed: false,
        }
    }
}

fn interpolate(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}
