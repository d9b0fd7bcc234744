//! Grid-sized RGBA sample buffers: fitting a source image onto a character
//! grid, tone adjustments and per-pixel brightness.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Transparent black buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * 4;
        if data.len() != expected {
            return Err(Error::BufferLength {
                width,
                height,
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    pub fn rgba(&self, index: usize) -> [u8; 4] {
        let i = index * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn set_rgba(&mut self, index: usize, px: [u8; 4]) {
        let i = index * 4;
        self.data[i..i + 4].copy_from_slice(&px);
    }

    pub fn alpha(&self) -> Vec<u8> {
        self.data.chunks_exact(4).map(|px| px[3]).collect()
    }

    /// Draw `src` into a `grid_w` x `grid_h` buffer through `placement`,
    /// sampling the nearest source pixel at every cell centre. Cells outside
    /// the placement stay transparent.
    pub fn resample(src: &PixelBuffer, grid_w: usize, grid_h: usize, placement: Placement) -> Self {
        let mut out = PixelBuffer::new(grid_w, grid_h);
        if src.is_empty() || placement.width <= 0.0 || placement.height <= 0.0 {
            return out;
        }

        for cy in 0..grid_h {
            let py = cy as f64 + 0.5;
            let v = (py - placement.y) / placement.height;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let sy = ((v * src.height as f64) as usize).min(src.height - 1);
            for cx in 0..grid_w {
                let px = cx as f64 + 0.5;
                let u = (px - placement.x) / placement.width;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let sx = ((u * src.width as f64) as usize).min(src.width - 1);
                out.set_rgba(cy * grid_w + cx, src.rgba(sy * src.width + sx));
            }
        }
        out
    }

    /// Linear contrast around mid-grey. `amount` is a percentage; 0 leaves
    /// the buffer untouched.
    pub fn adjust_contrast(&mut self, amount: f64) {
        if amount == 0.0 {
            return;
        }
        let contrast = amount / 100.0 + 1.0;
        let intercept = 128.0 * (1.0 - contrast);
        self.map_rgb(|v| v * contrast + intercept);
    }

    pub fn adjust_gamma(&mut self, gamma: f64) {
        if gamma <= 0.0 {
            return;
        }
        let correction = 1.0 / gamma;
        self.map_rgb(|v| 255.0 * (v / 255.0).powf(correction));
    }

    fn map_rgb(&mut self, f: impl Fn(f64) -> f64) {
        for px in self.data.chunks_exact_mut(4) {
            for channel in &mut px[..3] {
                *channel = clamp_u8(f(*channel as f64));
            }
        }
    }

    /// Per-pixel brightness, see [`brightness`].
    pub fn brightness_map(&self) -> Vec<f64> {
        self.data
            .chunks_exact(4)
            .map(|px| brightness(px[0], px[1], px[2]))
            .collect()
    }
}

// 8-bit clamped storage: clamp, then round half to even.
fn clamp_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Mean of R, G and B over 255, rounded up to two decimals.
pub fn brightness(r: u8, g: u8, b: u8) -> f64 {
    let avg = (r as f64 + g as f64 + b as f64) / 3.0;
    (avg / 255.0 * 100.0).ceil() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum Fit {
    /// Crop to fill the grid.
    #[default]
    Cover,
    /// Letterbox inside the grid with the given padding.
    #[serde(rename_all = "camelCase")]
    Contain { pad_x: f64, pad_y: f64 },
}

/// Where the source image lands on the grid, in cell units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Source aspect ratio compensated for non-square glyph cells.
pub fn image_ratio(natural_w: f64, natural_h: f64, glyph_ratio: f64) -> f64 {
    natural_w / (natural_h * glyph_ratio)
}

/// Resolve grid dimensions, deriving whichever side is missing from the
/// glyph-compensated image ratio.
pub fn grid_size(
    natural_w: f64,
    natural_h: f64,
    glyph_ratio: f64,
    width: Option<usize>,
    height: Option<usize>,
) -> Result<(usize, usize)> {
    let ratio = image_ratio(natural_w, natural_h, glyph_ratio);
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(Error::EmptyGrid {
            width: width.unwrap_or(0),
            height: height.unwrap_or(0),
        });
    }

    let width = match width {
        Some(w) => w,
        None => (height.unwrap_or(0) as f64 * ratio).floor() as usize,
    };
    let height = match height {
        Some(h) => h,
        None => (width as f64 / ratio).ceil() as usize,
    };

    if width == 0 || height == 0 {
        return Err(Error::EmptyGrid { width, height });
    }
    Ok((width, height))
}

pub fn place(fit: Fit, grid_w: usize, grid_h: usize, image_ratio: f64) -> Placement {
    let (cw, ch) = (grid_w as f64, grid_h as f64);
    let wide = cw / ch >= image_ratio;

    match fit {
        Fit::Cover => {
            if wide {
                let height = cw / image_ratio;
                Placement {
                    x: 0.0,
                    y: (ch - height) / 2.0,
                    width: cw,
                    height,
                }
            } else {
                let width = ch * image_ratio;
                Placement {
                    x: (cw - width) / 2.0,
                    y: 0.0,
                    width,
                    height: ch,
                }
            }
        }
        Fit::Contain { pad_x, pad_y } => {
            if wide {
                let height = ch - pad_y * 2.0;
                let width = height * image_ratio;
                Placement {
                    x: (cw - width) / 2.0,
                    y: pad_y,
                    width,
                    height,
                }
            } else {
                let width = cw - pad_x * 2.0;
                let height = width / image_ratio;
                Placement {
                    x: pad_x,
                    y: (ch - height) / 2.0,
                    width,
                    height,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, px: [u8; 4]) -> PixelBuffer {
        let data = px.iter().copied().cycle().take(width * height * 4).collect();
        PixelBuffer::from_rgba(width, height, data).unwrap()
    }

    #[test]
    fn brightness_rounds_up() {
        assert_eq!(brightness(0, 0, 0), 0.0);
        assert_eq!(brightness(255, 255, 255), 1.0);
        // 100/255 = 0.392.. -> 0.40
        assert_eq!(brightness(100, 100, 100), 0.4);
        assert_eq!(brightness(255, 0, 0), 0.34);
    }

    #[test]
    fn contrast_clamps_and_skips_alpha() {
        let mut buf = PixelBuffer::from_rgba(2, 1, vec![10, 128, 200, 77, 64, 65, 255, 0]).unwrap();
        buf.adjust_contrast(100.0);
        // v * 2 - 128
        assert_eq!(buf.rgba(0), [0, 128, 255, 77]);
        assert_eq!(buf.rgba(1), [0, 2, 255, 0]);
    }

    #[test]
    fn zero_contrast_is_noop() {
        let mut buf = solid(3, 3, [12, 34, 56, 255]);
        let before = buf.clone();
        buf.adjust_contrast(0.0);
        assert_eq!(buf, before);
    }

    #[test]
    fn gamma_keeps_endpoints() {
        let mut buf = PixelBuffer::from_rgba(1, 1, vec![0, 255, 64, 255]).unwrap();
        buf.adjust_gamma(2.0);
        let [r, g, b, _] = buf.rgba(0);
        assert_eq!((r, g), (0, 255));
        // 255 * sqrt(64/255) = 127.75
        assert_eq!(b, 128);
    }

    #[test]
    fn wrong_length_rejected() {
        let err = PixelBuffer::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, Error::BufferLength { expected: 16, found: 15, .. }));
    }

    #[test]
    fn missing_side_is_derived() {
        // 200x100 image with glyph ratio 0.5 -> ratio 4
        assert_eq!(grid_size(200.0, 100.0, 0.5, Some(40), None).unwrap(), (40, 10));
        assert_eq!(grid_size(200.0, 100.0, 0.5, None, Some(10)).unwrap(), (40, 10));
        assert!(grid_size(200.0, 0.0, 0.5, Some(40), None).is_err());
        assert!(grid_size(200.0, 100.0, 0.5, None, None).is_err());
    }

    #[test]
    fn cover_crops_the_long_side() {
        // wide container, square-ish image: fills width, overflows height
        let p = place(Fit::Cover, 20, 10, 1.0);
        assert_eq!((p.x, p.width), (0.0, 20.0));
        assert_eq!((p.y, p.height), (-5.0, 20.0));

        let p = place(Fit::Cover, 10, 10, 2.0);
        assert_eq!((p.x, p.width), (-5.0, 20.0));
        assert_eq!((p.y, p.height), (0.0, 10.0));
    }

    #[test]
    fn contain_letterboxes() {
        let p = place(Fit::Contain { pad_x: 0.0, pad_y: 1.0 }, 20, 10, 1.0);
        assert_eq!((p.y, p.height), (1.0, 8.0));
        assert_eq!((p.x, p.width), (6.0, 8.0));
    }

    #[test]
    fn resample_leaves_outside_transparent() {
        let src = solid(4, 4, [255, 255, 255, 255]);
        let placement = Placement {
            x: 1.0,
            y: 0.0,
            width: 2.0,
            height: 2.0,
        };
        let out = PixelBuffer::resample(&src, 4, 2, placement);
        assert_eq!(out.alpha(), vec![0, 255, 255, 0, 0, 255, 255, 0]);
    }

    #[test]
    fn resample_picks_nearest_source_pixel() {
        // left half black, right half white
        let mut src = PixelBuffer::new(2, 1);
        src.set_rgba(0, [0, 0, 0, 255]);
        src.set_rgba(1, [255, 255, 255, 255]);
        let out = PixelBuffer::resample(
            &src,
            4,
            1,
            Placement {
                x: 0.0,
                y: 0.0,
                width: 4.0,
                height: 1.0,
            },
        );
        assert_eq!(out.brightness_map(), vec![0.0, 0.0, 1.0, 1.0]);
    }
}
