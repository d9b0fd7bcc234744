//! Pointer-driven glyph shuffling: every cell renders through one of several
//! equally dense ramps, and moving the pointer advances a random share of
//! cells to the next ramp.

use rand::seq::index;
use rand::Rng;

use crate::ramp::Ramp;

#[derive(Debug, Clone)]
pub struct SetRotation {
    sets: Vec<Ramp>,
    positions: Vec<usize>,
}

impl SetRotation {
    pub fn new(sets: Vec<Ramp>, cells: usize) -> Self {
        Self {
            sets,
            positions: vec![0; cells],
        }
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Advance `floor(cells * fraction)` distinct random cells to their next
    /// set. Returns how many cells moved.
    pub fn swap<R: Rng + ?Sized>(&mut self, fraction: f64, rng: &mut R) -> usize {
        if self.sets.is_empty() {
            return 0;
        }
        let total = self.positions.len();
        let count = ((total as f64 * fraction).floor() as usize).min(total);
        for i in index::sample(rng, total, count).into_iter() {
            self.positions[i] = (self.positions[i] + 1) % self.sets.len();
        }
        count
    }

    pub fn render(&self, brightness: &[f64], width: usize) -> String {
        let mut out = String::new();
        if self.sets.is_empty() {
            return out;
        }
        for (i, &b) in brightness.iter().enumerate() {
            if i > 0 && width > 0 && i % width == 0 {
                out.push('\n');
            }
            let set = self.positions.get(i).copied().unwrap_or(0);
            out.push_str(self.sets[set % self.sets.len()].glyph_for(b));
        }
        out
    }
}

/// Accumulates pointer travel and fires once it reaches `threshold` pixels.
#[derive(Debug, Clone)]
pub struct MotionAccumulator {
    last: (f64, f64),
    total: f64,
    threshold: f64,
}

impl MotionAccumulator {
    pub fn new(threshold: f64) -> Self {
        Self {
            last: (0.0, 0.0),
            total: 0.0,
            threshold,
        }
    }

    pub fn record(&mut self, x: f64, y: f64) -> bool {
        let (dx, dy) = (x - self.last.0, y - self.last.1);
        self.total += (dx * dx + dy * dy).sqrt();
        self.last = (x, y);
        if self.total >= self.threshold {
            self.total = 0.0;
            true
        } else {
            false
        }
    }
}
