//! Dot dissolve: a rasterized text block is shown pixel by pixel, each
//! pixel gated by its own random threshold against the dissolve amount.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pixels::PixelBuffer;

pub const DOT_SIZE: f64 = 1.0;
const FLOAT_RADIUS: f64 = 2.0;
const FLOAT_SPEED: f64 = 0.02;
const WAVE_SPEED: f64 = 0.03;
const WAVE_AMOUNT: f64 = 1.0;

/// Independent uniform threshold per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct DissolveMap {
    thresholds: Vec<f32>,
}

impl DissolveMap {
    pub fn random<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Self {
        Self {
            thresholds: (0..len).map(|_| rng.gen::<f32>()).collect(),
        }
    }

    pub fn from_thresholds(thresholds: Vec<f32>) -> Self {
        Self { thresholds }
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn threshold(&self, pixel: usize) -> f32 {
        self.thresholds[pixel]
    }

    pub fn visible(&self, pixel: usize, amount: f64) -> bool {
        self.thresholds[pixel] as f64 > amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub x: usize,
    pub y: usize,
    pub threshold: f32,
    pub pixel: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Track {
    /// Scroll offset of the document over one viewport height.
    #[default]
    DocumentPosition,
    /// Element top travelling through the upper half of the viewport.
    ElementPosition,
}

pub fn track_progress(track: Track, scroll_top: f64, element_top: f64, viewport_h: f64) -> f64 {
    if viewport_h <= 0.0 {
        return 0.0;
    }
    match track {
        Track::DocumentPosition => (scroll_top / viewport_h).min(1.0),
        Track::ElementPosition => 1.0 - (element_top / (viewport_h / 2.0)).min(1.0),
    }
}

/// Map progress in [0, 1] linearly onto [start, limit].
pub fn dissolve_amount(progress: f64, start: f64, limit: f64) -> f64 {
    start + progress * (limit - start)
}

pub fn dot_radius(amount: f64, min_radius: f64) -> f64 {
    (amount - 0.5).abs() / 5.0 + min_radius
}

/// Slow position-seeded orbit plus a secondary wave, so that neighbouring
/// dots drift independently. `time` counts animation frames.
pub fn organic_offset(x: f64, y: f64, time: f64) -> (f64, f64) {
    let seed = (x * 0.1).sin() * 1000.0 + (y * 0.1).cos() * 1000.0;
    let speed = (x * 0.05 + y * 0.05).sin() * 0.5 + 1.0;

    let angle = time * FLOAT_SPEED * speed + seed;
    let phase = time * WAVE_SPEED * speed + seed * 2.0;
    let radius = ((x * 0.08).sin() * 0.5 + 1.0) * FLOAT_RADIUS;

    (
        angle.cos() * radius + phase.sin() * WAVE_AMOUNT,
        angle.sin() * radius + phase.cos() * WAVE_AMOUNT,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotDraw {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DissolveFrame {
    /// Individually placed dots, canvas cleared first.
    Dots(Vec<DotDraw>),
    /// RGBA image to put back verbatim.
    Mask(Vec<u8>),
}

/// A rasterized block together with its dissolve map and the opaque
/// pixels that can become dots.
#[derive(Debug, Clone)]
pub struct DissolveLayer {
    reference: PixelBuffer,
    map: DissolveMap,
    dots: Vec<Dot>,
    min_radius: f64,
}

impl DissolveLayer {
    pub fn new(reference: PixelBuffer, map: DissolveMap) -> Result<Self> {
        if map.len() != reference.len() {
            return Err(Error::BufferLength {
                width: reference.width(),
                height: reference.height(),
                expected: reference.len(),
                found: map.len(),
            });
        }
        let dots = extract_dots(&reference, &map);
        Ok(Self {
            reference,
            map,
            dots,
            min_radius: DOT_SIZE * 0.75,
        })
    }

    pub fn width(&self) -> usize {
        self.reference.width()
    }

    pub fn height(&self) -> usize {
        self.reference.height()
    }

    /// Fully opaque pixels, highest threshold first.
    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn visible_dots(&self, amount: f64) -> impl Iterator<Item = &Dot> + '_ {
        self.dots.iter().filter(move |d| d.threshold as f64 > amount)
    }

    /// Regular dissolve. Far from the midpoint dots are drawn individually
    /// with a radius that grows with the distance; at the midpoint the
    /// reference is masked in place.
    pub fn frame(&self, amount: f64, exclude: &HashSet<usize>, time: f64, scale: f64) -> DissolveFrame {
        let radius = dot_radius(amount, self.min_radius);

        if radius > self.min_radius {
            let size = if scale == 1.0 { radius } else { radius * 1.5 };
            let draws = self
                .visible_dots(amount)
                .filter(|d| !exclude.contains(&d.pixel))
                .map(|d| {
                    let (ox, oy) = organic_offset(d.x as f64, d.y as f64, time);
                    DotDraw {
                        x: d.x as f64 + ox,
                        y: d.y as f64 + oy,
                        size,
                    }
                })
                .collect();
            DissolveFrame::Dots(draws)
        } else {
            let mut data = self.reference.as_rgba().to_vec();
            for (pixel, px) in data.chunks_exact_mut(4).enumerate() {
                if exclude.contains(&pixel) || !self.map.visible(pixel, amount) {
                    px[3] = 0;
                }
            }
            DissolveFrame::Mask(data)
        }
    }

    /// Only the listed pixels, used while a migration owns this layer.
    pub fn frame_only(&self, visible: &HashSet<usize>, time: f64) -> DissolveFrame {
        let draws = self
            .dots
            .iter()
            .filter(|d| visible.contains(&d.pixel))
            .map(|d| {
                let (ox, oy) = organic_offset(d.x as f64, d.y as f64, time);
                DotDraw {
                    x: d.x as f64 + ox,
                    y: d.y as f64 + oy,
                    size: DOT_SIZE,
                }
            })
            .collect();
        DissolveFrame::Dots(draws)
    }
}

fn extract_dots(reference: &PixelBuffer, map: &DissolveMap) -> Vec<Dot> {
    let width = reference.width();
    let mut dots: Vec<Dot> = reference
        .as_rgba()
        .chunks_exact(4)
        .enumerate()
        .filter(|(_, px)| px[3] == 255)
        .map(|(pixel, _)| Dot {
            x: pixel % width,
            y: pixel / width,
            threshold: map.threshold(pixel),
            pixel,
        })
        .collect();
    dots.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
    dots
}
