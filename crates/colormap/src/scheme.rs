//! Color schemes and multi-stop interpolation engine.

use serde::{Deserialize, Serialize};

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Opaque RGBA bytes.
    pub const fn rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
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

/// Available color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Dark purple -> Teal -> Yellow (perceptually uniform)
    #[default]
    Viridis,
    /// Pale yellow -> Dark green
    YellowGreen,
    /// Pale yellow -> Orange -> Brown
    YellowOrangeBrown,
    /// Black -> White
    Grayscale,
}

impl ColorScheme {
    /// All available schemes.
    pub const ALL: &[ColorScheme] = &[
        Self::Viridis,
        Self::YellowGreen,
        Self::YellowOrangeBrown,
        Self::Grayscale,
    ];

    /// Configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Viridis => "viridis",
            Self::YellowGreen => "yellow_green",
            Self::YellowOrangeBrown => "yellow_orange_brown",
            Self::Grayscale => "grayscale",
        }
    }
}

impl std::str::FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name() == wanted)
            .ok_or_else(|| format!("unknown color scheme '{}'", s))
    }
}

// ─── Color stop definitions ────────────────────────────────────────────

const VIRIDIS_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 68, 1, 84),
    ColorStop::new(0.25, 59, 82, 139),
    ColorStop::new(0.50, 33, 145, 140),
    ColorStop::new(0.75, 94, 201, 98),
    ColorStop::new(1.00, 253, 231, 37),
];

const YELLOW_GREEN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 255, 255, 229),
    ColorStop::new(0.25, 217, 240, 163),
    ColorStop::new(0.50, 120, 198, 121),
    ColorStop::new(0.75, 35, 132, 67),
    ColorStop::new(1.00, 0, 69, 41),
];

const YELLOW_ORANGE_BROWN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 255, 255, 212),
    ColorStop::new(0.25, 254, 217, 142),
    ColorStop::new(0.50, 254, 153, 41),
    ColorStop::new(0.75, 204, 76, 2),
    ColorStop::new(1.00, 102, 37, 6),
];

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

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    if t <= 0.0 {
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

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// Values outside the unit interval clamp to the end colors.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    match scheme {
        ColorScheme::Viridis => multi_stop(VIRIDIS_STOPS, t),
        ColorScheme::YellowGreen => multi_stop(YELLOW_GREEN_STOPS, t),
        ColorScheme::YellowOrangeBrown => multi_stop(YELLOW_ORANGE_BROWN_STOPS, t),
        ColorScheme::Grayscale => {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viridis_endpoints() {
        assert_eq!(evaluate(ColorScheme::Viridis, 0.0), Rgb::new(68, 1, 84));
        assert_eq!(evaluate(ColorScheme::Viridis, 1.0), Rgb::new(253, 231, 37));
    }

    #[test]
    fn grayscale_midpoint() {
        assert_eq!(evaluate(ColorScheme::Grayscale, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn interpolates_between_stops() {
        // Halfway between the first two yellow-green stops
        let c = evaluate(ColorScheme::YellowGreen, 0.125);
        assert_eq!(c, Rgb::new(236, 248, 196));
    }

    #[test]
    fn clamping() {
        assert_eq!(evaluate(ColorScheme::YellowOrangeBrown, -0.5), Rgb::new(255, 255, 212));
        assert_eq!(evaluate(ColorScheme::YellowOrangeBrown, 1.5), Rgb::new(102, 37, 6));
    }

    #[test]
    fn parse_names() {
        for &scheme in ColorScheme::ALL {
            assert_eq!(scheme.name().parse::<ColorScheme>().unwrap(), scheme);
        }
        assert_eq!("Yellow-Green".parse::<ColorScheme>().unwrap(), ColorScheme::YellowGreen);
        assert!("rainbow".parse::<ColorScheme>().is_err());
    }
}
