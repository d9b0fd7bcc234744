//! Image morph demos: `#asciiArt` shows a cache of ASCII renderings of the
//! page's `.source-img` images, blended on click or as the page scrolls.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::JsValue;
use web_sys::{Element, HtmlElement, HtmlImageElement};

use super::dom;
use crate::color::Duotone;
use crate::config::{self, ColorMode, ImageMorphConfig};
use crate::grid::{AsciiGrid, GridCache, Tint};
use crate::layout;
use crate::morph::{self, Blend, Retrigger, ScrollSchedule, Transition};
use crate::pixels::{self, image_ratio};
use crate::ramp::Ramp;
use crate::EffectRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Click,
    Scroll,
    ScrollFixed,
}

struct ImageMorph {
    mode: Mode,
    config: ImageMorphConfig,
    ramp: Ramp,
    images: Vec<HtmlImageElement>,
    cache: GridCache,
    transition: Transition,
    schedule: ScrollSchedule,
    palette_index: Option<usize>,
    duotone: Option<Duotone>,
    rng: EffectRng,
    art: Element,
    name: Option<Element>,
    shown_label: Option<usize>,
    dirty: bool,
}

pub fn start(mode: Mode) -> Result<(), JsValue> {
    let document = dom::document()?;
    let art = dom::by_id(&document, "asciiArt")?;
    let base = match mode {
        Mode::Click => ImageMorphConfig::default(),
        Mode::Scroll => ImageMorphConfig::scroll(),
        Mode::ScrollFixed => ImageMorphConfig::scroll_fixed(),
    };
    let config = config::parse_onto(base, dom::config_attr(&art).as_deref())?;
    let images: Vec<HtmlImageElement> = dom::query_all(&document, ".source-img")?;
    if images.is_empty() {
        return Err("no .source-img images on the page".into());
    }

    let mut morph = ImageMorph {
        mode,
        ramp: config.effective_ramp(),
        transition: Transition::new(config.transition_ms, Retrigger::Restart),
        config,
        images,
        cache: GridCache::new(),
        schedule: ScrollSchedule::Uniform(0),
        palette_index: None,
        duotone: None,
        rng: dom::rng(),
        art,
        name: document.get_element_by_id("imageName"),
        shown_label: None,
        dirty: true,
    };
    morph.next_palette();
    morph.rebuild()?;
    if mode == Mode::Scroll {
        morph.stretch_page()?;
    }

    let morph = Rc::new(RefCell::new(morph));
    let window = dom::window()?;

    match mode {
        Mode::Click => {
            let morph = morph.clone();
            dom::listen(&document, "click", move |_| {
                if let Err(e) = morph.borrow_mut().advance(dom::now()) {
                    log::error!("click transition failed: {:?}", e);
                }
            })?;
        }
        Mode::Scroll | Mode::ScrollFixed => {
            let morph = morph.clone();
            dom::listen(&window, "scroll", move |_| morph.borrow_mut().dirty = true)?;
        }
    }

    let debounce = dom::Debounce::default();
    let delay = morph.borrow().config.resize_debounce_ms;
    {
        let morph = morph.clone();
        dom::listen(&window, "resize", move |_| {
            let morph = morph.clone();
            debounce.schedule(delay, move || {
                if let Err(e) = morph.borrow_mut().rebuild() {
                    log::error!("rebuild after resize failed: {:?}", e);
                }
            });
        })?;
    }

    dom::animation_loop(move |now| {
        if let Err(e) = morph.borrow_mut().frame(now) {
            log::error!("morph frame failed: {:?}", e);
        }
    })
}

impl ImageMorph {
    /// Grid dimensions and glyph ratio for the current viewport.
    fn grid_dims(&self) -> Result<(usize, usize, f64), JsValue> {
        let document = dom::document()?;
        let (vw, vh) = dom::viewport()?;
        let (cw, ch) = dom::glyph_cell(&document)?;
        let ((w, h), measured) = match self.mode {
            Mode::Click => (layout::fill_viewport(vw, vh, cw, ch), cw / ch),
            Mode::Scroll => (layout::fill_viewport(vw, vh, cw, ch), layout::glyph_ratio_for(vw)),
            Mode::ScrollFixed => (layout::bounded(vw, cw), layout::glyph_ratio_for(vw)),
        };
        Ok((w, h, self.config.glyph_ratio.unwrap_or(measured)))
    }

    fn tint(&self) -> Tint {
        match (self.config.color, self.duotone) {
            (ColorMode::Duotone, Some(duotone)) => Tint::Duotone(duotone),
            _ => Tint::Source,
        }
    }

    fn blend(&self) -> Blend {
        match (self.config.color, self.duotone) {
            (ColorMode::Duotone, Some(duotone)) => Blend::Duotone(duotone),
            _ => Blend::Rgb,
        }
    }

    /// Re-rasterize every source image at the current viewport size. The
    /// previous cache stays in place if anything fails.
    fn rebuild(&mut self) -> Result<(), JsValue> {
        let (mut width, mut height, glyph_ratio) = self.grid_dims()?;
        let sized = self
            .images
            .iter()
            .find(|image| image.natural_width() > 0 && image.natural_height() > 0);
        if let Some(image) = sized {
            let (nw, nh) = (image.natural_width() as f64, image.natural_height() as f64);
            if let Some((w, h)) = self.config.fixed_grid(nw, nh, glyph_ratio)? {
                (width, height) = (w, h);
            }
        }

        let mut cache = GridCache::new();
        for image in &self.images {
            let (nw, nh) = (image.natural_width() as f64, image.natural_height() as f64);
            if nw <= 0.0 || nh <= 0.0 {
                warn!("skipping image {} with no natural size", image.src());
                continue;
            }
            let placement = pixels::place(self.config.fit, width, height, image_ratio(nw, nh, glyph_ratio));
            let mut buffer = dom::rasterize_image(image, width, height, placement)?;
            if let Some(gamma) = self.config.gamma {
                buffer.adjust_gamma(gamma);
            }
            buffer.adjust_contrast(self.config.contrast);
            let grid = AsciiGrid::from_pixels(&buffer, &self.ramp, self.tint())?;
            cache.insert(file_name(&image.src()), grid)?;
        }

        if cache.is_empty() {
            return Err("no image could be rasterized".into());
        }
        self.schedule = match self.mode {
            Mode::ScrollFixed if cache.len() >= 3 => ScrollSchedule::three_way(),
            Mode::ScrollFixed => {
                warn!("fixed scroll map wants 3 images, found {}", cache.len());
                ScrollSchedule::Uniform(cache.len())
            }
            _ => ScrollSchedule::Uniform(cache.len()),
        };
        self.transition.clamp_to(cache.len());
        self.cache = cache;
        self.shown_label = None;
        info!("cached {} grids at {}x{}", self.cache.len(), width, height);
        self.dirty = true;
        Ok(())
    }

    /// The looping scroll map needs one viewport of scroll per image.
    fn stretch_page(&self) -> Result<(), JsValue> {
        let body: HtmlElement = dom::document()?.body().ok_or("no body")?;
        let height = format!("{}vh", layout::scroll_height_vh(self.cache.len()));
        body.style().set_property("height", &height)
    }

    fn next_palette(&mut self) {
        if self.config.color != ColorMode::Duotone {
            return;
        }
        self.palette_index = self.config.palette.pick_distinct(&mut self.rng, self.palette_index);
        self.duotone = self
            .palette_index
            .and_then(|i| self.config.palette.pairs.get(i))
            .map(|pair| pair.duotone());
        if let Some(duotone) = self.duotone {
            self.cache.retint(duotone);
        }
    }

    /// Click: head for the next image with a fresh colour pair.
    fn advance(&mut self, now: f64) -> Result<(), JsValue> {
        if self.cache.is_empty() {
            return Ok(());
        }
        let next = (self.transition.to() + 1) % self.cache.len();
        self.transition.start(next, now);
        self.next_palette();
        self.dirty = true;
        Ok(())
    }

    fn frame(&mut self, now: f64) -> Result<(), JsValue> {
        if self.cache.is_empty() {
            return Ok(());
        }
        match self.mode {
            Mode::Click => {
                if !self.transition.is_running() && !self.dirty {
                    return Ok(());
                }
                let (from, to) = (self.transition.from(), self.transition.to());
                if self.transition.is_running() {
                    let tick = self.transition.tick(now);
                    let label = if tick.raw >= 0.5 { to } else { from };
                    self.render(from, to, tick.eased, label)?;
                } else {
                    self.render(from, to, 0.0, from)?;
                }
            }
            Mode::Scroll | Mode::ScrollFixed => {
                if !self.dirty {
                    return Ok(());
                }
                let progress = morph::scroll_progress(dom::scroll_y(), dom::max_scroll()?);
                if let Some(segment) = self.schedule.segment(progress) {
                    self.render(segment.from, segment.to, segment.progress, segment.label_index())?;
                }
            }
        }
        self.dirty = false;
        Ok(())
    }

    fn render(&mut self, from: usize, to: usize, progress: f64, label: usize) -> Result<(), JsValue> {
        let frame = morph::morph(self.cache.get(from)?, self.cache.get(to)?, progress, &self.ramp, self.blend())?;
        self.art.set_inner_html(&frame.to_html());

        if self.shown_label != Some(label) {
            if let Some(name) = &self.name {
                name.set_text_content(Some(self.cache.label(label)?));
            }
            self.shown_label = Some(label);
        }
        Ok(())
    }
}

fn file_name(src: &str) -> String {
    src.rsplit('/').next().unwrap_or(src).to_string()
}
