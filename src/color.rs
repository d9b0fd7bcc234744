//! Colour helpers for the ASCII demos: linear RGB blending, duotone mapping
//! and the rotating palette of duotone pairs.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise linear interpolation, rounded to the nearest integer.
    pub fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
        Rgb {
            r: lerp_channel(a.r, b.r, t),
            g: lerp_channel(a.g, b.g, t),
            b: lerp_channel(a.b, b.b, t),
        }
    }

    /// CSS `rgb()` notation.
    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let v = a as f64 + (b as f64 - a as f64) * t;
    // JS Math.round: halves go up
    (v + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Two-colour gradient indexed by brightness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Duotone {
    pub dark: Rgb,
    pub light: Rgb,
}

impl Duotone {
    pub fn map(&self, brightness: f64) -> Rgb {
        Rgb::lerp(self.dark, self.light, brightness)
    }
}

impl Default for Duotone {
    fn default() -> Self {
        Palette::default().pairs[0].duotone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPair {
    pub name: String,
    pub dark: Rgb,
    pub light: Rgb,
}

impl ColorPair {
    pub fn new(name: &str, dark: Rgb, light: Rgb) -> Self {
        Self {
            name: name.to_string(),
            dark,
            light,
        }
    }

    pub fn duotone(&self) -> Duotone {
        Duotone {
            dark: self.dark,
            light: self.light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    pub pairs: Vec<ColorPair>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            pairs: vec![
                ColorPair::new("Blue & Yellow", Rgb::new(30, 80, 200), Rgb::new(255, 220, 60)),
                ColorPair::new("Pink & Green", Rgb::new(255, 61, 130), Rgb::new(0, 255, 147)),
                ColorPair::new("Violet & Orange", Rgb::new(138, 43, 226), Rgb::new(255, 140, 0)),
                ColorPair::new("Red & Green", Rgb::new(220, 20, 60), Rgb::new(50, 205, 50)),
            ],
        }
    }
}

impl Palette {
    /// Random pair index, never equal to `last` while there is a choice.
    /// Returns `None` for an empty palette.
    pub fn pick_distinct<R: Rng + ?Sized>(&self, rng: &mut R, last: Option<usize>) -> Option<usize> {
        match self.pairs.len() {
            0 => None,
            1 => Some(0),
            len => {
                let index = match last {
                    // draw from the remaining len-1 slots and skip over `last`
                    Some(last) if last < len => {
                        let i = rng.gen_range(0..len - 1);
                        if i >= last {
                            i + 1
                        } else {
                            i
                        }
                    }
                    _ => rng.gen_range(0..len),
                };
                Some(index)
            }
        }
    }
}
