use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Glyphs ordered from least to most dense. A glyph may be more than one
/// character wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Ramp {
    glyphs: Vec<String>,
}

impl Ramp {
    pub fn new<I, S>(glyphs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let glyphs: Vec<String> = glyphs.into_iter().map(Into::into).collect();
        if glyphs.is_empty() {
            return Err(Error::EmptyRamp);
        }
        Ok(Self { glyphs })
    }

    fn preset(glyphs: &[&str]) -> Self {
        Self {
            glyphs: glyphs.iter().map(|g| g.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyph(&self, index: usize) -> &str {
        &self.glyphs[index.min(self.glyphs.len() - 1)]
    }

    /// Quantize a brightness in [0, 1] to a glyph index.
    pub fn index_for(&self, brightness: f64) -> usize {
        let last = self.glyphs.len() - 1;
        if brightness >= 1.0 {
            return last;
        }
        let scaled = (brightness * self.glyphs.len() as f64).floor();
        if scaled <= 0.0 {
            0
        } else {
            (scaled as usize).min(last)
        }
    }

    pub fn glyph_for(&self, brightness: f64) -> &str {
        self.glyph(self.index_for(brightness))
    }

    pub fn inverted(&self) -> Self {
        let mut glyphs = self.glyphs.clone();
        glyphs.reverse();
        Self { glyphs }
    }

    /// `. ○ + ⁘ ∗ ◎`, the click-through gallery ramp.
    pub fn circles() -> Self {
        Self::preset(&[".", "○", "+", "⁘", "∗", "◎"])
    }

    /// `. + ◆ █`, distinct shapes for the looping scroll map.
    pub fn geometric() -> Self {
        Self::preset(&[".", "+", "◆", "█"])
    }

    /// Solid block first, light shade last.
    pub fn shades() -> Self {
        Self::preset(&["░", "▒", "▓", "█"]).inverted()
    }

    /// Interchangeable sets of similar density used by the mousemove demo.
    pub fn swap_sets() -> Vec<Self> {
        [
            [" ", "„", "▂", "▄", "●", "█"],
            [" ", ".", "▁", "▀", "◆", "■"],
            [" ", "·", "‗", "◢", "◉", "▓"],
            [" ", ",", "_", "▃", "◐", "▉"],
            [" ", "'", "¯", "▅", "◕", "▊"],
        ]
        .iter()
        .map(|set| Self::preset(set).inverted())
        .collect()
    }
}

impl TryFrom<Vec<String>> for Ramp {
    type Error = Error;

    fn try_from(glyphs: Vec<String>) -> Result<Self> {
        Ramp::new(glyphs)
    }
}

impl From<Ramp> for Vec<String> {
    fn from(ramp: Ramp) -> Self {
        ramp.glyphs
    }
}

/// A ramp with a display name, as cycled through by the text morph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRamp {
    pub name: String,
    pub steps: Ramp,
}

impl NamedRamp {
    fn preset(name: &str, glyphs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            steps: Ramp::preset(glyphs),
        }
    }

    pub fn text_sets() -> Vec<Self> {
        vec![
            Self::preset("Minimal Dots", &[" ", ".", ":", "*", "█"]),
            Self::preset("Simple Lines", &[" ", "-", "=", "≡", "█"]),
            Self::preset("Geometric", &[" ", ".", "◦", "◆", "█"]),
            Self::preset("Dense Blocks", &[" ", "░", "▒", "▓", "█"]),
            Self::preset("Organic", &[" ", "~", "≈", "∞", "█"]),
            Self::preset("Tech", &[" ", "·", "+", "#", "█"]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantizes_into_equal_bands() {
        let ramp = Ramp::geometric();
        assert_eq!(ramp.glyph_for(0.0), ".");
        assert_eq!(ramp.glyph_for(0.24), ".");
        assert_eq!(ramp.glyph_for(0.25), "+");
        assert_eq!(ramp.glyph_for(0.74), "◆");
        assert_eq!(ramp.glyph_for(0.99), "█");
        assert_eq!(ramp.glyph_for(1.0), "█");
        assert_eq!(ramp.glyph_for(1.7), "█");
        assert_eq!(ramp.glyph_for(-0.2), ".");
    }

    #[test]
    fn shades_start_dense() {
        let ramp = Ramp::shades();
        assert_eq!(ramp.glyph(0), "█");
        assert_eq!(ramp.glyph(3), "░");
        assert_eq!(ramp.inverted().glyph(0), "░");
    }

    #[test]
    fn empty_ramp_is_rejected() {
        assert!(matches!(Ramp::new(Vec::<String>::new()), Err(Error::EmptyRamp)));
        assert!(serde_json::from_str::<Ramp>("[]").is_err());
    }

    #[test]
    fn multi_character_glyphs() {
        let ramp = Ramp::new(["cycle", "ANA"]).unwrap();
        assert_eq!(ramp.glyph_for(0.3), "cycle");
        assert_eq!(ramp.glyph_for(0.6), "ANA");
    }

    #[test]
    fn swap_sets_share_length() {
        let sets = Ramp::swap_sets();
        assert_eq!(sets.len(), 5);
        assert!(sets.iter().all(|s| s.len() == 6));
        assert_eq!(sets[0].glyph(0), "█");
        assert_eq!(sets[0].glyph(5), " ");
    }
}
