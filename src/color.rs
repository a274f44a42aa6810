use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::config::ChartStyle;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues, as
/// `#rrggbb` strings.
pub fn generate_palette(n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_hex(rgb.into_format())
        })
        .collect()
}

fn to_hex(rgb: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.red, rgb.green, rgb.blue)
}

/// Parses `#rrggbb` (or `rrggbb`); `None` for anything else.
pub fn parse_hex(text: &str) -> Option<Srgb<u8>> {
    text.trim().parse::<Srgb<u8>>().ok()
}

/// Blue–white–red scale for values in `[-1, 1]`, mixed in linear RGB.
pub fn diverging(value: f64) -> String {
    let cold: LinSrgb = Srgb::new(0.231f32, 0.298, 0.753).into_linear();
    let mid: LinSrgb = Srgb::new(0.969f32, 0.969, 0.969).into_linear();
    let hot: LinSrgb = Srgb::new(0.706f32, 0.016, 0.149).into_linear();
    let t = value.clamp(-1.0, 1.0) as f32;
    let mixed = if t < 0.0 { mid.mix(cold, -t) } else { mid.mix(hot, t) };
    let srgb: Srgb = Srgb::from_linear(mixed);
    to_hex(srgb.into_format())
}

// ---------------------------------------------------------------------------
// Categorical palette from the chart style
// ---------------------------------------------------------------------------

/// The style's categorical colors, normalized, extended on demand.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    /// Invalid hex entries in the style are replaced by generated hues.
    pub fn from_style(style: &ChartStyle) -> Self {
        let generated = generate_palette(style.palette.len().max(1));
        let colors = style
            .palette
            .iter()
            .zip(generated)
            .map(|(hex, fallback)| match parse_hex(hex) {
                Some(rgb) => to_hex(rgb),
                None => {
                    log::warn!("ignoring invalid palette color {hex:?}");
                    fallback
                }
            })
            .collect();
        Palette { colors }
    }

    /// At least `n` colors: the style's first, then evenly spaced hues.
    pub fn take(&self, n: usize) -> Vec<String> {
        let mut out: Vec<String> = self.colors.iter().take(n).cloned().collect();
        if out.len() < n {
            out.extend(generate_palette(n - out.len()));
        }
        out
    }

    pub fn get(&self, i: usize) -> String {
        match self.colors.get(i) {
            Some(c) => c.clone(),
            None => self.take(i + 1).pop().unwrap_or_else(|| "#808080".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Color mapping: label → colour
// ---------------------------------------------------------------------------

/// Maps the values of a label column to distinct colours, stable across
/// panels of one figure.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, String>,
    default_color: String,
}

impl ColorMap {
    /// Build a colour map; labels get colours in the order given.
    pub fn new<'a, I>(labels: I, palette: &Palette) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut order: Vec<String> = Vec::new();
        for label in labels {
            if !order.iter().any(|l| l == label) {
                order.push(label.to_string());
            }
        }
        let colors = palette.take(order.len());
        let mapping = order.into_iter().zip(colors).collect();

        ColorMap {
            mapping,
            default_color: "#808080".to_string(),
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> &str {
        self.mapping
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_hues_are_distinct_hex() {
        let colors = generate_palette(12);
        assert_eq!(colors.len(), 12);
        for c in &colors {
            assert_eq!(c.len(), 7);
            assert!(c.starts_with('#'));
            assert!(parse_hex(c).is_some());
        }
        let mut unique = colors.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 12);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn diverging_scale_endpoints() {
        assert_ne!(diverging(-1.0), diverging(1.0));
        assert_eq!(diverging(5.0), diverging(1.0));
        let mid = parse_hex(&diverging(0.0)).unwrap();
        assert!(mid.red > 240 && mid.green > 240 && mid.blue > 240);
    }

    #[test]
    fn palette_extends_past_style() {
        let style = ChartStyle {
            palette: vec!["#2e86ab".into(), "not a color".into()],
            ..ChartStyle::default()
        };
        let palette = Palette::from_style(&style);
        let colors = palette.take(5);
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], "#2E86AB");
        assert!(parse_hex(&colors[1]).is_some());
        assert!(parse_hex(&palette.get(7)).is_some());
    }

    #[test]
    fn color_map_is_stable() {
        let palette = Palette::from_style(&ChartStyle::default());
        let map = ColorMap::new(["PSEUDO", "tRNA", "PSEUDO"], &palette);
        assert_eq!(map.color_for("PSEUDO"), "#2E86AB");
        assert_eq!(map.color_for("tRNA"), "#A23B72");
        assert_eq!(map.color_for("unknown"), "#808080");
    }
}
