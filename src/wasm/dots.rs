//! Dot demos: each `<dissolve-element text="...">` rasterizes its text into
//! a canvas and dissolves it with scroll. With two or more blocks, dots
//! migrate from the first block to the second over a fixed overlay canvas.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use super::dom;
use crate::config::{self, DissolveConfig, MigrationConfig, MigrationMode};
use crate::dissolve::{dissolve_amount, track_progress, DissolveFrame, DissolveLayer, DissolveMap, Dot, DOT_SIZE};
use crate::migration::{Anchor, Circulation, Migration, Partition, ScrollMigration, Side};
use crate::morph::scroll_progress;
use crate::EffectRng;

struct DissolveBlock {
    element: HtmlElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    config: DissolveConfig,
    layer: Option<DissolveLayer>,
    scale: f64,
    progress: f64,
    hovered: bool,
}

struct Flight {
    migration: Box<dyn Migration>,
    overlay: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

struct DotsDemo {
    blocks: Vec<DissolveBlock>,
    flight: Option<Flight>,
    config: MigrationConfig,
    rng: EffectRng,
    time: f64,
}

pub fn start(moving: bool) -> Result<(), JsValue> {
    let document = dom::document()?;
    let body = document.body().ok_or("no body")?;
    let base = MigrationConfig {
        mode: if moving { MigrationMode::Circulate } else { MigrationMode::Scroll },
        ..MigrationConfig::default()
    };
    let config = config::parse_onto(base, dom::config_attr(&body).as_deref())?;

    let elements: Vec<HtmlElement> = dom::query_all(&document, "dissolve-element")?;
    let mut blocks = Vec::with_capacity(elements.len());
    for element in elements {
        blocks.push(DissolveBlock::new(&document, element)?);
    }

    let mut demo = DotsDemo {
        blocks,
        flight: None,
        config,
        rng: dom::rng(),
        time: 0.0,
    };
    demo.rebuild()?;
    let demo = Rc::new(RefCell::new(demo));

    let count = demo.borrow().blocks.len();
    for index in 0..count {
        let element = demo.borrow().blocks[index].element.clone();
        for (event, hovered) in [("mouseenter", true), ("mouseleave", false)] {
            let demo = demo.clone();
            dom::listen(&element, event, move |_| {
                if let Some(block) = demo.borrow_mut().blocks.get_mut(index) {
                    block.hovered = hovered;
                }
            })?;
        }
    }

    let window = dom::window()?;
    let debounce = dom::Debounce::default();
    {
        let demo = demo.clone();
        dom::listen(&window, "resize", move |_| {
            let demo = demo.clone();
            debounce.schedule(200, move || {
                if let Err(e) = demo.borrow_mut().rebuild() {
                    log::error!("rebuild after resize failed: {:?}", e);
                }
            });
        })?;
    }

    dom::animation_loop(move |_| {
        if let Err(e) = demo.borrow_mut().frame() {
            log::error!("dots frame failed: {:?}", e);
        }
    })
}

impl DissolveBlock {
    fn new(document: &Document, element: HtmlElement) -> Result<Self, JsValue> {
        let config: DissolveConfig = config::parse(dom::config_attr(&element).as_deref())?;
        let (canvas, ctx) = dom::canvas(document, 0, 0)?;
        element.append_child(&canvas)?;
        Ok(Self {
            element,
            canvas,
            ctx,
            config,
            layer: None,
            scale: 1.0,
            progress: 0.0,
            hovered: false,
        })
    }

    fn ruler(&self, name: &str) -> Result<HtmlElement, JsValue> {
        Ok(self
            .element
            .query_selector(&format!("[name=\"{}\"]", name))?
            .ok_or_else(|| format!("{} not found", name))?
            .dyn_into()?)
    }

    /// Draw the text at the current viewport scale and give it a fresh
    /// dissolve map.
    fn rasterize(&mut self, rng: &mut EffectRng) -> Result<(), JsValue> {
        let text = self.element.get_attribute("text").unwrap_or_default();
        let (vw, _) = dom::viewport()?;
        self.scale = DissolveConfig::scale_for(vw);

        let font_size = self.ruler("line-ruler")?.offset_height() as f64 * self.scale;
        let line_height = font_size * self.config.line_height;
        let padding = self.ruler("padding-ruler")?.offset_height() as f64 * self.scale;
        let lines: Vec<&str> = text.split('/').collect();

        let width = (self.element.offset_width() as f64 * self.scale) as usize;
        let height = (lines.len() as f64 * line_height + padding * 2.0 * self.scale) as usize;
        if width == 0 || height == 0 {
            self.layer = None;
            warn!("dissolve block '{}' has no size", text);
            return Ok(());
        }
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);

        let offset = self.config.baseline_offset * line_height;
        self.ctx.set_font(&format!("bold {}px Arial, sans-serif", font_size));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("top");
        for (i, line) in lines.iter().enumerate() {
            self.ctx
                .fill_text(line, width as f64 / 2.0, line_height * i as f64 + padding + offset)?;
        }

        let reference = dom::read_pixels(&self.ctx, width, height)?;
        let map = DissolveMap::random(reference.len(), rng);
        let layer = DissolveLayer::new(reference, map)?;
        info!("dissolve block '{}' ready: {} dots", text, layer.dots().len());
        self.layer = Some(layer);
        Ok(())
    }

    fn update_progress(&mut self, scroll_top: f64, viewport_h: f64) {
        let top = self.element.get_bounding_client_rect().top();
        self.progress = track_progress(self.config.track, scroll_top, top, viewport_h);
    }

    fn anchor(&self) -> Option<Anchor> {
        let layer = self.layer.as_ref()?;
        let rect = self.canvas.get_bounding_client_rect();
        Some(Anchor {
            left: rect.left(),
            top: rect.top(),
            scale_x: rect.width() / layer.width() as f64,
            scale_y: rect.height() / layer.height() as f64,
        })
    }

    fn paint(&self, frame: DissolveFrame) -> Result<(), JsValue> {
        let Some(layer) = &self.layer else { return Ok(()) };
        let (w, h) = (layer.width(), layer.height());
        match frame {
            DissolveFrame::Dots(draws) => {
                self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
                for dot in draws {
                    self.ctx.fill_rect(dot.x, dot.y, dot.size, dot.size);
                }
                Ok(())
            }
            DissolveFrame::Mask(rgba) => dom::write_pixels(&self.ctx, w, h, &rgba),
        }
    }
}

impl Flight {
    fn new(document: &Document, migration: Box<dyn Migration>) -> Result<Self, JsValue> {
        let (overlay, ctx) = dom::canvas(document, 0, 0)?;
        let style = overlay.style();
        for (property, value) in [
            ("position", "fixed"),
            ("top", "0"),
            ("left", "0"),
            ("width", "100vw"),
            ("height", "100vh"),
            ("pointer-events", "none"),
            ("z-index", "99"),
        ] {
            style.set_property(property, value)?;
        }
        document.body().ok_or("no body")?.append_child(&overlay)?;
        Ok(Self { migration, overlay, ctx })
    }

    fn fit_viewport(&self) -> Result<(), JsValue> {
        let (vw, vh) = dom::viewport()?;
        self.overlay.set_width(vw as u32);
        self.overlay.set_height(vh as u32);
        Ok(())
    }
}

fn layer_dots(blocks: &[DissolveBlock], index: usize) -> Option<&[Dot]> {
    blocks.get(index)?.layer.as_ref().map(DissolveLayer::dots)
}

impl DotsDemo {
    fn rebuild(&mut self) -> Result<(), JsValue> {
        for block in &mut self.blocks {
            if let Err(e) = block.rasterize(&mut self.rng) {
                log::error!("could not draw dissolve block: {:?}", e);
                block.layer = None;
            }
        }

        let old = self.flight.take();
        let partition = match (layer_dots(&self.blocks, 0), layer_dots(&self.blocks, 1)) {
            (Some(source), Some(target)) => Partition::split(source, target, &self.config.density, &mut self.rng),
            _ => None,
        };
        let Some(partition) = partition else {
            if let Some(old) = old {
                old.overlay.remove();
            }
            return Ok(());
        };

        let migration: Box<dyn Migration> = match self.config.mode {
            MigrationMode::Scroll => Box::new(ScrollMigration::new(partition)),
            MigrationMode::Circulate => Box::new(Circulation::new(
                partition,
                self.config.circulation_speed,
                &mut self.rng,
            )),
        };
        let flight = match old {
            Some(old) => Flight { migration, ..old },
            None => Flight::new(&dom::document()?, migration)?,
        };
        flight.fit_viewport()?;
        self.flight = Some(flight);
        Ok(())
    }

    fn frame(&mut self) -> Result<(), JsValue> {
        self.time += 1.0;
        let (vw, vh) = dom::viewport()?;
        let scroll_top = dom::scroll_y();

        if let Some(flight) = &mut self.flight {
            flight
                .migration
                .set_scroll(scroll_progress(scroll_top, dom::max_scroll()?));
            flight.migration.advance();
        }

        let none = HashSet::new();
        for (i, block) in self.blocks.iter_mut().enumerate() {
            block.update_progress(scroll_top, vh);
            let Some(layer) = &block.layer else { continue };
            let side = match i {
                0 => Some(Side::Source),
                1 => Some(Side::Target),
                _ => None,
            };
            let frame = match (&self.flight, side) {
                (Some(flight), Some(side)) => layer.frame_only(&flight.migration.visible_indices(side), self.time),
                _ => {
                    let amount = if block.hovered {
                        0.0
                    } else {
                        dissolve_amount(block.progress, block.config.start_for(vw), block.config.limit_for(vw))
                    };
                    layer.frame(amount, &none, self.time, block.scale)
                }
            };
            block.paint(frame)?;
        }

        if let Some(flight) = &self.flight {
            let (Some(source), Some(target)) = (self.blocks[0].anchor(), self.blocks[1].anchor()) else {
                return Ok(());
            };
            let (w, h) = (flight.overlay.width() as f64, flight.overlay.height() as f64);
            flight.ctx.clear_rect(0.0, 0.0, w, h);
            for point in flight.migration.travelers(&source, &target, self.time) {
                flight.ctx.fill_rect(point.x, point.y, DOT_SIZE, DOT_SIZE);
            }
        }
        Ok(())
    }
}
