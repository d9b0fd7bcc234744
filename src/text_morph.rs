//! Text rendered as a block of random glyphs, swapped cell by cell to a new
//! character set at staggered times.

use rand::Rng;

use crate::ramp::Ramp;

/// Alpha channel of a rasterized text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMask {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<u8>,
}

impl TextMask {
    pub fn new(width: usize, height: usize, alpha: Vec<u8>) -> Self {
        debug_assert_eq!(alpha.len(), width * height);
        Self { width, height, alpha }
    }

    fn alpha_at(&self, x: usize, y: usize) -> u8 {
        self.alpha.get(y * self.width + x).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextCell {
    pub glyph: usize,
    pub is_text: bool,
    /// Progress at which this cell switches to the target glyph.
    pub swap_at: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextGrid {
    rows: Vec<Vec<TextCell>>,
}

impl TextGrid {
    /// Sample the mask every `sample_rate` pixels. Covered cells get a random
    /// non-blank glyph and a random swap time, the rest stay blank.
    pub fn sample<R: Rng + ?Sized>(mask: &TextMask, ramp: &Ramp, sample_rate: usize, rng: &mut R) -> Self {
        let step = sample_rate.max(1);
        let rows = (0..mask.height)
            .step_by(step)
            .map(|y| {
                (0..mask.width)
                    .step_by(step)
                    .map(|x| {
                        if mask.alpha_at(x, y) > 128 {
                            let glyph = if ramp.len() > 1 {
                                rng.gen_range(1..ramp.len())
                            } else {
                                0
                            };
                            TextCell {
                                glyph,
                                is_text: true,
                                swap_at: rng.gen::<f64>(),
                            }
                        } else {
                            TextCell {
                                glyph: 0,
                                is_text: false,
                                swap_at: 0.0,
                            }
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<TextCell>] {
        &self.rows
    }
}

/// Render the morph between two sampled grids over their common area. Each
/// text cell flips once `progress` reaches the source cell's swap time.
pub fn morph_text(from: &TextGrid, from_ramp: &Ramp, to: &TextGrid, to_ramp: &Ramp, progress: f64) -> String {
    let mut out = String::new();
    for (from_row, to_row) in from.rows.iter().zip(&to.rows) {
        for (a, b) in from_row.iter().zip(to_row) {
            if a.is_text || b.is_text {
                if progress < a.swap_at {
                    out.push_str(from_ramp.glyph(a.glyph));
                } else {
                    out.push_str(to_ramp.glyph(b.glyph));
                }
            } else {
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out
}

/// The snap section nearest to the scroll position.
pub fn section_for_scroll(scroll_y: f64, viewport_h: f64, count: usize) -> usize {
    if count == 0 || viewport_h <= 0.0 {
        return 0;
    }
    let section = (scroll_y / viewport_h).round().max(0.0) as usize;
    section.min(count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn bar_mask() -> TextMask {
        // 4x2, left half opaque
        TextMask::new(4, 2, vec![255, 255, 0, 0, 255, 255, 0, 0])
    }

    #[test]
    fn sampling_marks_covered_cells() {
        let ramp = Ramp::new([" ", ".", ":"]).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let grid = TextGrid::sample(&bar_mask(), &ramp, 2, &mut rng);
        assert_eq!((grid.width(), grid.height()), (2, 1));
        let cells = &grid.rows()[0];
        assert!(cells[0].is_text);
        assert!(cells[0].glyph >= 1);
        assert!((0.0..1.0).contains(&cells[0].swap_at));
        assert!(!cells[1].is_text);
        assert_eq!(cells[1].glyph, 0);
    }

    #[test]
    fn swaps_follow_source_timing() {
        let from = TextGrid {
            rows: vec![vec![
                TextCell { glyph: 1, is_text: true, swap_at: 0.3 },
                TextCell { glyph: 2, is_text: true, swap_at: 0.7 },
                TextCell { glyph: 0, is_text: false, swap_at: 0.0 },
            ]],
        };
        let to = TextGrid {
            rows: vec![vec![
                TextCell { glyph: 3, is_text: true, swap_at: 0.9 },
                TextCell { glyph: 3, is_text: true, swap_at: 0.1 },
                TextCell { glyph: 0, is_text: false, swap_at: 0.0 },
            ]],
        };
        let a = Ramp::new([" ", ".", ":"]).unwrap();
        let b = Ramp::new([" ", "-", "=", "#"]).unwrap();
        assert_eq!(morph_text(&from, &a, &to, &b, 0.0), ".: \n");
        assert_eq!(morph_text(&from, &a, &to, &b, 0.5), "#: \n");
        assert_eq!(morph_text(&from, &a, &to, &b, 1.0), "## \n");
    }

    #[test]
    fn morph_covers_only_the_common_area() {
        let cell = |glyph| TextCell { glyph, is_text: true, swap_at: 0.5 };
        let from = TextGrid {
            rows: vec![vec![cell(1); 4], vec![cell(2); 4]],
        };
        let to = TextGrid {
            rows: vec![vec![cell(3); 2]],
        };
        let a = Ramp::new([" ", ".", ":"]).unwrap();
        let b = Ramp::new([" ", "-", "=", "#"]).unwrap();
        assert_eq!(morph_text(&from, &a, &to, &b, 0.0), "..\n");
        assert_eq!(morph_text(&from, &a, &to, &b, 1.0), "##\n");
        assert_eq!(morph_text(&to, &b, &from, &a, 1.0), "..\n");
    }

    #[test]
    fn sections_clamp_to_count() {
        assert_eq!(section_for_scroll(0.0, 800.0, 6), 0);
        assert_eq!(section_for_scroll(1300.0, 800.0, 6), 2);
        assert_eq!(section_for_scroll(99_999.0, 800.0, 6), 5);
        assert_eq!(section_for_scroll(100.0, 800.0, 0), 0);
    }
}
