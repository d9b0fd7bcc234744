//! Dots that leave one dissolve layer and land in another.
//!
//! Both layers keep a static population that never moves. The rest of the
//! source population is paired with random target dots and either migrates
//! once, paced by scroll ([`ScrollMigration`]), or circulates between the
//! two layers forever on a four-part duty cycle ([`Circulation`]).

use std::collections::HashSet;
use std::f64::consts::PI;

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dissolve::{organic_offset, Dot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Density {
    pub source_start: f64,
    pub source_end: f64,
    pub target_start: f64,
    pub target_end: f64,
}

impl Default for Density {
    fn default() -> Self {
        Self {
            source_start: 0.5,
            source_end: 0.05,
            target_start: 0.05,
            target_end: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Maps a layer's local pixel grid onto screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Anchor {
    pub fn to_screen(&self, dot: &Dot) -> Point {
        Point {
            x: self.left + dot.x as f64 * self.scale_x,
            y: self.top + dot.y as f64 * self.scale_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    AtSource,
    ToTarget,
    AtTarget,
    ToSource,
}

/// Which dots stay put and which move, with each mover's landing spot.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub static_source: Vec<Dot>,
    pub static_target: Vec<Dot>,
    pub movers: Vec<(Dot, Dot)>,
}

impl Partition {
    /// `source` is re-sorted by ascending threshold; `target` is used in the
    /// order given. Returns `None` when either side has no dots.
    pub fn split<R: Rng + ?Sized>(source: &[Dot], target: &[Dot], density: &Density, rng: &mut R) -> Option<Self> {
        if source.is_empty() || target.is_empty() {
            return None;
        }

        let mut source = source.to_vec();
        source.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));

        let n = source.len() as f64;
        let lo = (n * density.source_end).floor() as usize;
        let hi = ((n * density.source_start).floor() as usize).min(source.len());
        let static_target = (target.len() as f64 * density.target_start).floor() as usize;

        let movers = source
            .get(lo..hi)
            .unwrap_or(&[])
            .iter()
            .map(|&s| (s, target[rng.gen_range(0..target.len())]))
            .collect();

        Some(Self {
            static_source: source[..lo.min(source.len())].to_vec(),
            static_target: target[..static_target.min(target.len())].to_vec(),
            movers,
        })
    }
}

/// Common surface of the two migration flavours, as driven by a frame loop.
pub trait Migration {
    /// Advance one animation frame.
    fn advance(&mut self);

    /// Feed the page's scroll progress in [0, 1].
    fn set_scroll(&mut self, _progress: f64) {}

    /// Pixel indices a layer should show: its static dots plus movers
    /// currently resting on that side.
    fn visible_indices(&self, side: Side) -> HashSet<usize>;

    /// Screen positions of the dots in flight.
    fn travelers(&self, source: &Anchor, target: &Anchor, time: f64) -> Vec<Point>;
}

fn static_indices(partition: &Partition, side: Side) -> HashSet<usize> {
    let dots = match side {
        Side::Source => &partition.static_source,
        Side::Target => &partition.static_target,
    };
    dots.iter().map(|d| d.pixel).collect()
}

fn lerp(from: Point, to: Point, t: f64) -> Point {
    Point {
        x: from.x + (to.x - from.x) * t,
        y: from.y + (to.y - from.y) * t,
    }
}

// JS Math.round
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// A traveller is drawn on the whole pixel, jittered by the organic drift
/// of the dot it left from.
fn drifted(pos: Point, origin: &Dot, time: f64) -> Point {
    let (ox, oy) = organic_offset(origin.x as f64, origin.y as f64, time);
    Point {
        x: round_half_up(pos.x) + ox,
        y: round_half_up(pos.y) + oy,
    }
}

#[derive(Debug, Clone)]
struct Pair {
    source: Dot,
    target: Dot,
    completion: f64,
    state: DotState,
    travel: f64,
}

/// One-way migration: pair `i` of `n` has arrived once scroll progress
/// reaches `i / n`.
#[derive(Debug, Clone)]
pub struct ScrollMigration {
    partition: Partition,
    pairs: Vec<Pair>,
    progress: f64,
}

impl ScrollMigration {
    pub fn new(partition: Partition) -> Self {
        let len = partition.movers.len();
        let pairs = partition
            .movers
            .iter()
            .enumerate()
            .map(|(i, &(source, target))| Pair {
                source,
                target,
                completion: i as f64 / len as f64,
                state: DotState::AtSource,
                travel: 0.0,
            })
            .collect();
        info!(
            "migration set up: {} moving, {} static source, {} static target",
            len,
            partition.static_source.len(),
            partition.static_target.len()
        );
        let mut migration = Self {
            partition,
            pairs,
            progress: 0.0,
        };
        migration.set_progress(0.0);
        migration
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress;
        for pair in &mut self.pairs {
            if progress >= pair.completion {
                pair.state = DotState::AtTarget;
                continue;
            }
            let travel = progress / pair.completion;
            if travel <= 0.0 {
                pair.state = DotState::AtSource;
            } else {
                pair.state = DotState::ToTarget;
                pair.travel = travel;
            }
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn states(&self) -> impl Iterator<Item = DotState> + '_ {
        self.pairs.iter().map(|p| p.state)
    }
}

impl Migration for ScrollMigration {
    fn advance(&mut self) {}

    fn set_scroll(&mut self, progress: f64) {
        self.set_progress(progress);
    }

    fn visible_indices(&self, side: Side) -> HashSet<usize> {
        let mut indices = static_indices(&self.partition, side);
        for pair in &self.pairs {
            match (side, pair.state) {
                (Side::Source, DotState::AtSource) => {
                    indices.insert(pair.source.pixel);
                }
                (Side::Target, DotState::AtTarget) => {
                    indices.insert(pair.target.pixel);
                }
                _ => {}
            }
        }
        indices
    }

    fn travelers(&self, source: &Anchor, target: &Anchor, time: f64) -> Vec<Point> {
        self.pairs
            .iter()
            .filter(|p| p.state == DotState::ToTarget)
            .map(|p| {
                let pos = lerp(source.to_screen(&p.source), target.to_screen(&p.target), p.travel);
                drifted(pos, &p.source, time)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CirculatingDot {
    pub source: Dot,
    pub target: Dot,
    pub phase: f64,
    pub speed_variation: f64,
    pub ellipse_phase: f64,
    pub ellipse_width: f64,
    pub ellipse_height: f64,
    pub state: DotState,
}

impl CirculatingDot {
    pub fn new<R: Rng + ?Sized>(source: Dot, target: Dot, rng: &mut R) -> Self {
        let phase = rng.gen::<f64>();
        Self {
            source,
            target,
            phase,
            speed_variation: 0.8 + rng.gen::<f64>() * 0.4,
            ellipse_phase: rng.gen::<f64>() * PI * 2.0,
            ellipse_width: 50.0 + rng.gen::<f64>() * 100.0,
            ellipse_height: 30.0 + rng.gen::<f64>() * 70.0,
            state: state_for_phase(phase),
        }
    }

    pub fn step(&mut self, speed: f64) {
        self.phase = (self.phase + speed * self.speed_variation) % 1.0;
        self.state = state_for_phase(self.phase);
    }

    /// Progress along the current journey, if travelling.
    pub fn travel(&self) -> Option<f64> {
        match self.state {
            DotState::ToTarget => Some((self.phase - 0.2) / 0.3),
            DotState::ToSource => Some((self.phase - 0.7) / 0.3),
            _ => None,
        }
    }
}

/// Duty cycle: rest at the source, travel out, rest at the target, travel
/// back.
pub fn state_for_phase(phase: f64) -> DotState {
    if phase < 0.2 {
        DotState::AtSource
    } else if phase < 0.5 {
        DotState::ToTarget
    } else if phase < 0.7 {
        DotState::AtTarget
    } else {
        DotState::ToSource
    }
}

/// Straight path from `from` to `to`, bowed sideways by a half sine wave.
pub fn elliptical_position(
    from: Point,
    to: Point,
    progress: f64,
    ellipse_phase: f64,
    ellipse_width: f64,
    ellipse_height: f64,
) -> Point {
    let base = lerp(from, to, progress);
    let bow = (progress * PI + ellipse_phase).sin();

    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = (dx * dx + dy * dy).sqrt();
    if length > 0.0 {
        let (px, py) = (-dy / length, dx / length);
        Point {
            x: base.x + px * bow * ellipse_width,
            y: base.y + py * bow * ellipse_height,
        }
    } else {
        base
    }
}

/// Endless circulation between the two layers.
#[derive(Debug, Clone)]
pub struct Circulation {
    partition: Partition,
    dots: Vec<CirculatingDot>,
    speed: f64,
}

impl Circulation {
    pub fn new<R: Rng + ?Sized>(partition: Partition, speed: f64, rng: &mut R) -> Self {
        let dots: Vec<_> = partition
            .movers
            .iter()
            .map(|&(source, target)| CirculatingDot::new(source, target, rng))
            .collect();
        info!(
            "circulation set up: {} circulating, {} static source, {} static target",
            dots.len(),
            partition.static_source.len(),
            partition.static_target.len()
        );
        Self { partition, dots, speed }
    }

    pub fn dots(&self) -> &[CirculatingDot] {
        &self.dots
    }
}

impl Migration for Circulation {
    fn advance(&mut self) {
        for dot in &mut self.dots {
            dot.step(self.speed);
        }
    }

    fn visible_indices(&self, side: Side) -> HashSet<usize> {
        let mut indices = static_indices(&self.partition, side);
        for dot in &self.dots {
            match (side, dot.state) {
                (Side::Source, DotState::AtSource) => {
                    indices.insert(dot.source.pixel);
                }
                (Side::Target, DotState::AtTarget) => {
                    indices.insert(dot.target.pixel);
                }
                _ => {}
            }
        }
        indices
    }

    fn travelers(&self, source: &Anchor, target: &Anchor, time: f64) -> Vec<Point> {
        self.dots
            .iter()
            .filter_map(|dot| {
                let travel = dot.travel()?;
                let (s, t) = (source.to_screen(&dot.source), target.to_screen(&dot.target));
                let (from, to) = match dot.state {
                    DotState::ToTarget => (s, t),
                    _ => (t, s),
                };
                let pos = elliptical_position(from, to, travel, dot.ellipse_phase, dot.ellipse_width, dot.ellipse_height);
                Some(drifted(pos, &dot.source, time))
            })
            .collect()
    }
}
