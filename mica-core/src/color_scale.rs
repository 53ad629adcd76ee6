//! Sequential color scale for the hexagon choropleth and its legend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nine-class sequential blue ramp, light to dark.
pub const BLUES: [Rgb; 9] = [
    Rgb(0xf7, 0xfb, 0xff),
    Rgb(0xde, 0xeb, 0xf7),
    Rgb(0xc6, 0xdb, 0xef),
    Rgb(0x9e, 0xca, 0xe1),
    Rgb(0x6b, 0xae, 0xd6),
    Rgb(0x42, 0x92, 0xc6),
    Rgb(0x21, 0x71, 0xb5),
    Rgb(0x08, 0x51, 0x9c),
    Rgb(0x08, 0x30, 0x6b),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// HSL lightness in [0, 1].
    pub fn lightness(&self) -> f64 {
        let channels = [self.0, self.1, self.2];
        let max = channels.iter().copied().max().unwrap_or(0) as f64 / 255.0;
        let min = channels.iter().copied().min().unwrap_or(0) as f64 / 255.0;
        (max + min) / 2.0
    }

    /// Text color that stays readable on top of this fill.
    pub fn legible_text_color(&self) -> &'static str {
        if self.lightness() > 0.5 {
            "#000"
        } else {
            "#fff"
        }
    }

    fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Linear,
    Log,
}

/// Maps a count domain onto [`BLUES`]. Monotonic: larger counts never get lighter colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    pub kind: ScaleKind,
}

impl ColorScale {
    pub fn new(kind: ScaleKind, min: f64, max: f64) -> Self {
        let (mut min, mut max) = if min <= max { (min, max) } else { (max, min) };
        if kind == ScaleKind::Log {
            min = min.max(1.0);
            max = max.max(min);
        }
        ColorScale { min, max, kind }
    }

    pub fn log(min: f64, max: f64) -> Self {
        Self::new(ScaleKind::Log, min, max)
    }

    pub fn linear(min: f64, max: f64) -> Self {
        Self::new(ScaleKind::Linear, min, max)
    }

    /// Position of `value` in the domain, clamped to [0, 1]. A degenerate
    /// domain puts everything in the middle.
    pub fn normalize(&self, value: f64) -> f64 {
        let (lo, hi, v) = match self.kind {
            ScaleKind::Linear => (self.min, self.max, value),
            ScaleKind::Log => {
                if value <= 0.0 {
                    return 0.0;
                }
                (self.min.ln(), self.max.ln(), value.ln())
            }
        };
        if hi == lo {
            return 0.5;
        }
        ((v - lo) / (hi - lo)).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f64) -> Rgb {
        let t = self.normalize(value);
        let segments = (BLUES.len() - 1) as f64;
        let pos = t * segments;
        let i = (pos.floor() as usize).min(BLUES.len() - 2);
        Rgb::lerp(BLUES[i], BLUES[i + 1], pos - i as f64)
    }

    /// `n` legend ticks spread over the domain (geometrically for log scales).
    pub fn ticks(&self, n: usize) -> Vec<(f64, Rgb)> {
        if n == 0 {
            return Vec::new();
        }
        if n == 1 || self.min == self.max {
            return vec![(self.min, self.color(self.min))];
        }
        (0..n)
            .map(|i| {
                let f = i as f64 / (n - 1) as f64;
                let value = match self.kind {
                    ScaleKind::Linear => self.min + (self.max - self.min) * f,
                    ScaleKind::Log => (self.min.ln() + (self.max.ln() - self.min.ln()) * f).exp(),
                };
                (value, self.color(value))
            })
            .collect()
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        ColorScale::log(1.0, 1.0)
    }
}
