//! Cross-fading between two cached grids, and the two ways progress is
//! driven: an eased timed transition, or a scroll position mapped onto
//! consecutive image pairs.

use log::{debug, info};

use crate::color::{Duotone, Rgb};
use crate::error::{Error, Result};
use crate::grid::AsciiGrid;
use crate::ramp::Ramp;

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// How colour is carried through a morph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Blend {
    /// Recolour from the interpolated brightness.
    Duotone(Duotone),
    /// Interpolate the cached RGB values directly.
    Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphFrame {
    width: usize,
    glyphs: Vec<String>,
    colors: Vec<Rgb>,
}

impl MorphFrame {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (i, glyph) in self.glyphs.iter().enumerate() {
            if i > 0 && i % self.width == 0 {
                out.push('\n');
            }
            out.push_str(glyph);
        }
        out
    }

    /// One coloured `<span>` per cell, rows separated by newlines.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(self.glyphs.len() * 40);
        for (i, (glyph, rgb)) in self.glyphs.iter().zip(&self.colors).enumerate() {
            if i > 0 && i % self.width == 0 {
                out.push('\n');
            }
            out.push_str("<span style=\"color:");
            out.push_str(&rgb.css());
            out.push_str("\">");
            push_escaped(&mut out, glyph);
            out.push_str("</span>");
        }
        out
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Interpolate every cell of `from` towards `to` and re-quantize.
pub fn morph(from: &AsciiGrid, to: &AsciiGrid, progress: f64, ramp: &Ramp, blend: Blend) -> Result<MorphFrame> {
    if from.dims() != to.dims() {
        return Err(Error::GridMismatch {
            expected: from.dims(),
            found: to.dims(),
        });
    }

    let len = from.cells().len();
    let mut glyphs = Vec::with_capacity(len);
    let mut colors = Vec::with_capacity(len);

    for (a, b) in from.cells().iter().zip(to.cells()) {
        let brightness = a.brightness + (b.brightness - a.brightness) * progress;
        glyphs.push(ramp.glyph_for(brightness).to_string());
        colors.push(match blend {
            Blend::Duotone(d) => d.map(brightness),
            Blend::Rgb => Rgb::lerp(a.rgb, b.rgb, progress),
        });
    }

    Ok(MorphFrame {
        width: from.width(),
        glyphs,
        colors,
    })
}

/// What a timed transition does when asked to start while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrigger {
    /// Begin again from the current target.
    Restart,
    /// Drop the request.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub raw: f64,
    pub eased: f64,
    pub finished: bool,
}

/// Timed morph between two indices with cubic easing.
#[derive(Debug, Clone)]
pub struct Transition {
    from: usize,
    to: usize,
    started_at: f64,
    duration_ms: f64,
    running: bool,
    retrigger: Retrigger,
}

impl Transition {
    pub fn new(duration_ms: f64, retrigger: Retrigger) -> Self {
        Self {
            from: 0,
            to: 0,
            started_at: 0.0,
            duration_ms,
            running: false,
            retrigger,
        }
    }

    pub fn from(&self) -> usize {
        self.from
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start morphing towards `target`. Returns false when the request was
    /// ignored.
    pub fn start(&mut self, target: usize, now_ms: f64) -> bool {
        if self.running && self.retrigger == Retrigger::Ignore {
            debug!("transition to {} ignored, already running", target);
            return false;
        }
        self.from = self.to;
        self.to = target;
        self.started_at = now_ms;
        self.running = true;
        info!("starting transition: {} -> {}", self.from, self.to);
        true
    }

    pub fn tick(&mut self, now_ms: f64) -> Tick {
        if !self.running {
            return Tick {
                raw: 1.0,
                eased: 1.0,
                finished: true,
            };
        }

        let raw = if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - self.started_at) / self.duration_ms).clamp(0.0, 1.0)
        };
        let finished = raw >= 1.0;
        if finished {
            self.running = false;
            self.from = self.to;
            info!("transition complete, showing {}", self.to);
        }
        Tick {
            raw,
            eased: ease_in_out_cubic(raw),
            finished,
        }
    }

    /// Drop back to a resting transition at 0 when either end no longer
    /// names one of `len` items.
    pub fn clamp_to(&mut self, len: usize) {
        if self.from < len && self.to < len {
            return;
        }
        debug!("transition {} -> {} out of range for {} items", self.from, self.to, len);
        self.from = 0;
        self.to = 0;
        self.running = false;
    }

    /// Index whose label should be shown: the target from halfway on.
    pub fn label_index(&self, raw: f64) -> usize {
        if raw >= 0.5 {
            self.to
        } else {
            self.from
        }
    }
}

pub fn scroll_progress(scroll_y: f64, max_scroll: f64) -> f64 {
    if max_scroll <= 0.0 {
        return 0.0;
    }
    (scroll_y / max_scroll).clamp(0.0, 1.0)
}

/// One segment of a scroll map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
    pub progress: f64,
}

impl Segment {
    /// The destination is named once the morph is nearly done.
    pub fn label_index(&self) -> usize {
        if self.progress >= 0.95 {
            self.to
        } else {
            self.from
        }
    }
}

/// Maps overall scroll progress onto consecutive image pairs, the last
/// looping back to the first.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollSchedule {
    Uniform(usize),
    /// Segment start offsets, ascending from 0; the last segment runs to 1.
    Breakpoints(Vec<f64>),
}

impl ScrollSchedule {
    /// The fixed three-image map: 0 → 1 → 2 → 0.
    pub fn three_way() -> Self {
        ScrollSchedule::Breakpoints(vec![0.0, 0.33, 0.66])
    }

    pub fn len(&self) -> usize {
        match self {
            ScrollSchedule::Uniform(n) => *n,
            ScrollSchedule::Breakpoints(starts) => starts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn segment(&self, progress: f64) -> Option<Segment> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let progress = progress.clamp(0.0, 1.0);

        let (index, local) = match self {
            ScrollSchedule::Uniform(n) => {
                let scaled = progress * *n as f64;
                let index = (scaled.floor() as usize).min(n - 1);
                (index, (scaled - index as f64).min(1.0))
            }
            ScrollSchedule::Breakpoints(starts) => {
                let index = starts.iter().rposition(|&s| progress >= s).unwrap_or(0);
                let start = starts[index];
                let end = starts.get(index + 1).copied().unwrap_or(1.0);
                let local = if end > start {
                    ((progress - start) / (end - start)).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                (index, local)
            }
        };

        Some(Segment {
            from: index,
            to: (index + 1) % n,
            progress: local,
        })
    }
}
