//! Palettes and multi-stop interpolation engine.
//!
//! A palette is a list of colors spread evenly over `[0, 1]`; values in
//! between are linearly interpolated.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    #[error("unknown color '{0}'")]
    UnknownColor(String),

    #[error("palette has no colors")]
    Empty,
}

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

// ─── Named colors (CSS) ────────────────────────────────────────────────

const NAMED: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("lime", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("orange", Rgb::new(255, 165, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("purple", Rgb::new(128, 0, 128)),
    ("brown", Rgb::new(165, 42, 42)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
    ("navy", Rgb::new(0, 0, 128)),
    ("teal", Rgb::new(0, 128, 128)),
];

/// Parse a CSS color name or a hex string (`#rrggbb`, `rrggbb`, `#rgb`).
pub fn parse_color(value: &str) -> Result<Rgb, PaletteError> {
    let v = value.trim().to_ascii_lowercase();
    if let Some((_, rgb)) = NAMED.iter().find(|(name, _)| *name == v) {
        return Ok(*rgb);
    }

    let hex = v.strip_prefix('#').unwrap_or(&v);
    let unknown = || PaletteError::UnknownColor(value.to_string());
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(unknown());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| unknown());
    match hex.len() {
        6 => Ok(Rgb::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let short = |i: usize| channel(&hex[i..i + 1]).map(|c| c * 17);
            Ok(Rgb::new(short(0)?, short(1)?, short(2)?))
        }
        _ => Err(unknown()),
    }
}

// ─── Interpolation engine ──────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

/// An evenly spaced multi-stop palette.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    stops: Vec<ColorStop>,
}

impl Palette {
    /// Spread `colors` evenly over [0, 1].
    pub fn new(colors: Vec<Rgb>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        let last = (colors.len() - 1).max(1) as f64;
        let stops = colors
            .into_iter()
            .enumerate()
            .map(|(i, color)| ColorStop {
                t: i as f64 / last,
                color,
            })
            .collect();
        Ok(Self { stops })
    }

    /// Build from CSS names or hex strings, e.g. `["green", "red"]`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, PaletteError> {
        let colors = names
            .iter()
            .map(|n| parse_color(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// Black to white, used for layers without a palette
    pub fn grayscale() -> Self {
        Self {
            stops: vec![ColorStop::new(0.0, 0, 0, 0), ColorStop::new(1.0, 255, 255, 255)],
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Evaluate at normalized position `t`, clamped to [0, 1].
    pub fn evaluate(&self, t: f64) -> Rgb {
        let stops = &self.stops;
        if stops.len() == 1 || t <= 0.0 {
            return stops[0].color;
        }
        if t >= 1.0 {
            return stops[stops.len() - 1].color;
        }
        for i in 1..stops.len() {
            if t <= stops[i].t {
                let ratio = (t - stops[i - 1].t) / (stops[i].t - stops[i - 1].t);
                return lerp_color(stops[i - 1].color, stops[i].color, ratio);
            }
        }
        stops[stops.len() - 1].color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn litter_palette_endpoints() {
        let p = Palette::from_names(&["green", "red"]).unwrap();
        assert_eq!(p.evaluate(0.0), Rgb::new(0, 128, 0));
        assert_eq!(p.evaluate(1.0), Rgb::new(255, 0, 0));
        assert_eq!(p.evaluate(0.5), Rgb::new(128, 64, 0));
    }

    #[test]
    fn clamping_outside_unit_range() {
        let p = Palette::from_names(&["green", "red"]).unwrap();
        assert_eq!(p.evaluate(-0.5), Rgb::new(0, 128, 0));
        assert_eq!(p.evaluate(1.5), Rgb::new(255, 0, 0));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_color("#00796b").unwrap(), Rgb::new(0, 121, 107));
        assert_eq!(parse_color("004D40").unwrap(), Rgb::new(0, 77, 64));
        assert_eq!(parse_color("#f00").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(parse_color(" Red ").unwrap(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn bad_colors_are_rejected() {
        assert_eq!(
            parse_color("chartreuse-ish"),
            Err(PaletteError::UnknownColor("chartreuse-ish".to_string()))
        );
        assert!(parse_color("#12345").is_err());
        assert_eq!(Palette::new(vec![]), Err(PaletteError::Empty));
    }

    #[test]
    fn three_stop_midpoint_is_middle_color() {
        let p = Palette::from_names(&["blue", "white", "red"]).unwrap();
        assert_eq!(p.stops().len(), 3);
        assert_eq!(p.evaluate(0.5), Rgb::new(255, 255, 255));
    }

    #[test]
    fn single_color_palette_is_constant() {
        let p = Palette::from_names(&["orange"]).unwrap();
        assert_eq!(p.evaluate(0.0), p.evaluate(1.0));
    }
}
