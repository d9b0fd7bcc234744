use log::{debug, info};

use crate::color::{Duotone, Rgb};
use crate::error::{Error, Result};
use crate::pixels::{brightness, PixelBuffer};
use crate::ramp::Ramp;

/// How a freshly built grid is coloured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tint {
    /// Keep the adjusted source colour.
    Source,
    Duotone(Duotone),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub glyph: usize,
    pub brightness: f64,
    pub rgb: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl AsciiGrid {
    pub fn from_pixels(pixels: &PixelBuffer, ramp: &Ramp, tint: Tint) -> Result<Self> {
        if pixels.is_empty() {
            return Err(Error::EmptyGrid {
                width: pixels.width(),
                height: pixels.height(),
            });
        }

        let cells = pixels
            .as_rgba()
            .chunks_exact(4)
            .map(|px| {
                let b = brightness(px[0], px[1], px[2]);
                let rgb = match tint {
                    Tint::Source => Rgb::new(px[0], px[1], px[2]),
                    Tint::Duotone(d) => d.map(b),
                };
                Cell {
                    glyph: ramp.index_for(b),
                    brightness: b,
                    rgb,
                }
            })
            .collect();

        debug!("built {}x{} ascii grid", pixels.width(), pixels.height());
        Ok(Self {
            width: pixels.width(),
            height: pixels.height(),
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn brightness(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.brightness).collect()
    }

    /// Recolour every cell from its brightness.
    pub fn retint(&mut self, duotone: Duotone) {
        for cell in &mut self.cells {
            cell.rgb = duotone.map(cell.brightness);
        }
    }

    pub fn to_text(&self, ramp: &Ramp) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height);
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 && i % self.width == 0 {
                out.push('\n');
            }
            out.push_str(ramp.glyph(cell.glyph));
        }
        out
    }
}

/// One grid per source image, all sharing the same dimensions so any two
/// can be cross-faded.
#[derive(Debug, Default)]
pub struct GridCache {
    dims: Option<(usize, usize)>,
    entries: Vec<(String, AsciiGrid)>,
}

impl GridCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, grid: AsciiGrid) -> Result<usize> {
        match self.dims {
            Some(expected) if expected != grid.dims() => {
                return Err(Error::GridMismatch {
                    expected,
                    found: grid.dims(),
                })
            }
            _ => self.dims = Some(grid.dims()),
        }

        let label = label.into();
        info!("cached {} as grid {} ({}x{})", label, self.entries.len(), grid.width, grid.height);
        self.entries.push((label, grid));
        Ok(self.entries.len() - 1)
    }

    pub fn get(&self, index: usize) -> Result<&AsciiGrid> {
        self.entries
            .get(index)
            .map(|(_, grid)| grid)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    pub fn label(&self, index: usize) -> Result<&str> {
        self.entries
            .get(index)
            .map(|(label, _)| label.as_str())
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dims(&self) -> Option<(usize, usize)> {
        self.dims
    }

    pub fn retint(&mut self, duotone: Duotone) {
        for (_, grid) in &mut self.entries {
            grid.retint(duotone);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dims = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grey(width: usize, height: usize, levels: &[u8]) -> PixelBuffer {
        let data = levels.iter().flat_map(|&v| [v, v, v, 255]).collect();
        PixelBuffer::from_rgba(width, height, data).unwrap()
    }

    #[test]
    fn text_rows_are_newline_separated() {
        let ramp = Ramp::geometric();
        let grid = AsciiGrid::from_pixels(&grey(2, 2, &[0, 255, 128, 70]), &ramp, Tint::Source).unwrap();
        assert_eq!(grid.to_text(&ramp), ".█\n◆+");
    }

    #[test]
    fn duotone_tint_follows_brightness() {
        let duotone = Duotone {
            dark: Rgb::new(0, 0, 0),
            light: Rgb::new(200, 100, 0),
        };
        let grid = AsciiGrid::from_pixels(&grey(2, 1, &[0, 255]), &Ramp::circles(), Tint::Duotone(duotone)).unwrap();
        assert_eq!(grid.cells()[0].rgb, duotone.dark);
        assert_eq!(grid.cells()[1].rgb, duotone.light);
    }

    #[test]
    fn cache_retint_recolours_every_grid() {
        let ramp = Ramp::circles();
        let mut cache = GridCache::new();
        for name in ["a.jpg", "b.jpg"] {
            let grid = AsciiGrid::from_pixels(&grey(2, 1, &[0, 255]), &ramp, Tint::Source).unwrap();
            cache.insert(name, grid).unwrap();
        }
        let duotone = Duotone {
            dark: Rgb::new(10, 20, 30),
            light: Rgb::new(250, 240, 230),
        };
        cache.retint(duotone);
        for i in 0..cache.len() {
            let cells = cache.get(i).unwrap().cells();
            assert_eq!(cells[0].rgb, duotone.dark);
            assert_eq!(cells[1].rgb, duotone.light);
            assert_eq!(cells[1].glyph, ramp.len() - 1);
        }
    }

    #[test]
    fn cache_rejects_other_dimensions() {
        let ramp = Ramp::geometric();
        let mut cache = GridCache::new();
        let a = AsciiGrid::from_pixels(&grey(2, 1, &[0, 0]), &ramp, Tint::Source).unwrap();
        let b = AsciiGrid::from_pixels(&grey(1, 2, &[0, 0]), &ramp, Tint::Source).unwrap();
        assert_eq!(cache.insert("a.jpg", a.clone()).unwrap(), 0);
        assert_eq!(cache.insert("b.jpg", a).unwrap(), 1);
        assert!(matches!(
            cache.insert("c.jpg", b),
            Err(Error::GridMismatch { expected: (2, 1), found: (1, 2) })
        ));
        assert_eq!(cache.label(1).unwrap(), "b.jpg");
        assert!(matches!(cache.get(5), Err(Error::IndexOutOfRange { index: 5, len: 2 })));
    }
}
