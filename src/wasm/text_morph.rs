//! Text morph demo: a word drawn in random glyphs, switching character set
//! each time the page snaps to a new section.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use super::dom;
use crate::config::{self, TextMorphConfig};
use crate::morph::{Retrigger, Transition};
use crate::ramp::NamedRamp;
use crate::text_morph::{morph_text, section_for_scroll, TextGrid, TextMask};

struct TextMorph {
    charsets: Vec<NamedRamp>,
    grids: Vec<TextGrid>,
    transition: Transition,
    text: Element,
    name: Option<Element>,
    shown_label: Option<usize>,
}

pub fn start() -> Result<(), JsValue> {
    let document = dom::document()?;
    let text = dom::by_id(&document, "asciiText")?;
    let config: TextMorphConfig = config::parse(dom::config_attr(&text).as_deref())?;
    if config.charsets.is_empty() {
        return Err("text morph needs at least one character set".into());
    }

    let mask = rasterize_text(&document, &config.text, config.font_size)?;
    let mut rng = dom::rng();
    let grids: Vec<TextGrid> = config
        .charsets
        .iter()
        .map(|set| TextGrid::sample(&mask, &set.steps, config.sample_rate, &mut rng))
        .collect();
    info!(
        "sampled '{}' into {} grids of {}x{}",
        config.text,
        grids.len(),
        grids[0].width(),
        grids[0].height()
    );

    if let Some(container) = document.get_element_by_id("scrollContainer") {
        add_sections(&document, &container, config.charsets.len())?;
    }

    let mut morph = TextMorph {
        charsets: config.charsets.clone(),
        grids,
        transition: Transition::new(config.transition_ms, Retrigger::Ignore),
        text,
        name: document.get_element_by_id("charsetName"),
        shown_label: None,
    };
    morph.render(0, 0, 0.0, 0);
    let morph = Rc::new(RefCell::new(morph));

    let window = dom::window()?;
    let debounce = dom::Debounce::default();
    let delay = config.scroll_debounce_ms;
    {
        let morph = morph.clone();
        dom::listen(&window, "scroll", move |_| {
            let morph = morph.clone();
            debounce.schedule(delay, move || {
                let (_, vh) = dom::viewport().unwrap_or((0.0, 0.0));
                morph.borrow_mut().snap(dom::scroll_y(), vh, dom::now());
            });
        })?;
    }

    dom::animation_loop(move |now| morph.borrow_mut().frame(now))
}

/// One full-height snap section per character set.
fn add_sections(document: &Document, container: &Element, count: usize) -> Result<(), JsValue> {
    for _ in 0..count {
        let section = document.create_element("div")?;
        section.set_class_name("snap-section");
        container.append_child(&section)?;
    }
    Ok(())
}

fn rasterize_text(document: &Document, text: &str, font_size: f64) -> Result<TextMask, JsValue> {
    let font = format!("bold {}px Arial, sans-serif", font_size);
    let (_, probe) = dom::canvas(document, 1, 1)?;
    probe.set_font(&font);
    let width = probe.measure_text(text)?.width().ceil().max(1.0) as usize;
    let height = (font_size * 1.2).ceil().max(1.0) as usize;

    let (_, ctx) = dom::canvas(document, width as u32, height as u32)?;
    ctx.set_font(&font);
    ctx.set_text_baseline("top");
    ctx.fill_text(text, 0.0, 0.0)?;
    let pixels = dom::read_pixels(&ctx, width, height)?;
    Ok(TextMask::new(width, height, pixels.alpha()))
}

impl TextMorph {
    fn snap(&mut self, scroll_y: f64, viewport_h: f64, now: f64) {
        if self.transition.is_running() {
            return;
        }
        let section = section_for_scroll(scroll_y, viewport_h, self.grids.len());
        if section != self.transition.to() {
            self.transition.start(section, now);
        }
    }

    fn frame(&mut self, now: f64) {
        if !self.transition.is_running() {
            return;
        }
        let (from, to) = (self.transition.from(), self.transition.to());
        let tick = self.transition.tick(now);
        let label = if tick.raw >= 0.5 { to } else { from };
        self.render(from, to, tick.eased, label);
    }

    fn render(&mut self, from: usize, to: usize, progress: f64, label: usize) {
        let (Some(from_grid), Some(to_grid)) = (self.grids.get(from), self.grids.get(to)) else {
            return;
        };
        let text = morph_text(
            from_grid,
            &self.charsets[from].steps,
            to_grid,
            &self.charsets[to].steps,
            progress,
        );
        self.text.set_text_content(Some(&text));

        if self.shown_label != Some(label) {
            if let (Some(name), Some(set)) = (&self.name, self.charsets.get(label)) {
                name.set_text_content(Some(&set.name));
            }
            self.shown_label = Some(label);
        }
    }
}
