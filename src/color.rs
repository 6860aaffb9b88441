use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

/// 8-bit sRGB triple, serialized as `[r, g, b]`.
pub type Rgb = [u8; 3];

const DEFAULT_COLOR: Rgb = [128, 128, 128];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: label → Rgb
// ---------------------------------------------------------------------------

/// Maps the distinct labels of one column to distinct colours.
///
/// Built from the whole record set so a label keeps its colour whatever the
/// current selection is.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Rgb>,
}

impl ColorMap {
    pub fn new(labels: &[String]) -> Self {
        let palette = generate_palette(labels.len());
        let mapping = labels.iter().cloned().zip(palette).collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a label; unknown labels are grey.
    pub fn color_for(&self, label: &str) -> Rgb {
        self.mapping.get(label).copied().unwrap_or(DEFAULT_COLOR)
    }
}

/// One colour map per column the charts colour by.
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    pub region: ColorMap,
    pub powertrain: ColorMap,
    pub mode: ColorMap,
    pub category: ColorMap,
}
