//! Mousemove demo: every `.target-img` gets an ASCII overlay whose glyphs
//! cycle through equally dense sets as the pointer travels.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlImageElement, MouseEvent};

use super::dom;
use crate::config::{self, SwapConfig};
use crate::layout;
use crate::pixels::{self, image_ratio, Fit};
use crate::ramp::Ramp;
use crate::swap::{MotionAccumulator, SetRotation};
use crate::EffectRng;

struct AsciiImage {
    image: HtmlImageElement,
    container: Element,
    output: Element,
    sets: Vec<Ramp>,
    width: usize,
    brightness: Vec<f64>,
    rotation: SetRotation,
}

struct Swapper {
    config: SwapConfig,
    images: Vec<AsciiImage>,
    motion: MotionAccumulator,
    rng: EffectRng,
}

pub fn start() -> Result<(), JsValue> {
    let document = dom::document()?;
    let body = document.body().ok_or("no body")?;
    let config: SwapConfig = config::parse(dom::config_attr(&body).as_deref())?;

    let targets: Vec<HtmlImageElement> = dom::query_all(&document, ".target-img")?;
    if targets.is_empty() {
        info!("no .target-img images, nothing to convert");
        return Ok(());
    }

    let mut images = Vec::new();
    for image in targets {
        match AsciiImage::wrap(&document, image, &config) {
            Ok(Some(ascii)) => images.push(ascii),
            Ok(None) => {}
            Err(e) => log::error!("could not convert image: {:?}", e),
        }
    }
    info!("converted {} images", images.len());

    let swapper = Rc::new(RefCell::new(Swapper {
        motion: MotionAccumulator::new(config.min_distance),
        config,
        images,
        rng: dom::rng(),
    }));

    {
        let swapper = swapper.clone();
        dom::listen(&document, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                swapper
                    .borrow_mut()
                    .on_move(event.client_x() as f64, event.client_y() as f64);
            }
        })?;
    }

    let window = dom::window()?;
    let debounce = dom::Debounce::default();
    dom::listen(&window, "resize", move |_| {
        let swapper = swapper.clone();
        debounce.schedule(300, move || swapper.borrow_mut().resize());
    })
}

impl AsciiImage {
    /// Insert an overlay next to the image's `<picture>` and render it once.
    /// Returns `None` when the image has no usable size yet.
    fn wrap(document: &Document, image: HtmlImageElement, config: &SwapConfig) -> Result<Option<Self>, JsValue> {
        let picture = image.parent_element().ok_or("image has no parent")?;
        let container = match image.closest(".marching-img")? {
            Some(container) => container,
            None => picture.parent_element().unwrap_or_else(|| picture.clone()),
        };

        let output = document.create_element("div")?;
        output.set_class_name("ascii-art");
        let wrapper = document.create_element("div")?;
        wrapper.set_class_name("ascii-wrapper");
        picture
            .parent_node()
            .ok_or("picture is detached")?
            .insert_before(&wrapper, Some(&picture))?;
        wrapper.append_child(&output)?;
        wrapper.append_child(&picture)?;

        let invert = image.dataset().get("invert").as_deref() == Some("true") || config.invert;
        let sets = if invert {
            config.sets.iter().map(Ramp::inverted).collect()
        } else {
            config.sets.clone()
        };

        let mut ascii = Self {
            image,
            container,
            output,
            sets,
            width: 0,
            brightness: Vec::new(),
            rotation: SetRotation::new(Vec::new(), 0),
        };
        let ready = ascii.rasterize(document, config)?;
        Ok(ready.then_some(ascii))
    }

    fn rasterize(&mut self, document: &Document, config: &SwapConfig) -> Result<bool, JsValue> {
        let (vw, _) = dom::viewport()?;
        let (unit_w, _) = dom::glyph_cell(document)?;
        let (width, height) = layout::container(self.container.client_width() as f64, unit_w, vw);
        let (nw, nh) = (self.image.natural_width() as f64, self.image.natural_height() as f64);
        if width == 0 || height == 0 || nh == 0.0 {
            warn!(
                "cannot convert {}: grid {}x{}, container {}px",
                self.image.src(),
                width,
                height,
                self.container.client_width()
            );
            return Ok(false);
        }

        let ratio = image_ratio(nw, nh, layout::glyph_ratio_for(vw));
        let placement = pixels::place(Fit::Cover, width, height, ratio);
        let mut buffer = dom::rasterize_image(&self.image, width, height, placement)?;
        if let Some(gamma) = config.gamma {
            buffer.adjust_gamma(gamma);
        }
        buffer.adjust_contrast(config.contrast);

        self.width = width;
        self.brightness = buffer.brightness_map();
        self.rotation = SetRotation::new(self.sets.clone(), self.brightness.len());
        self.render();
        Ok(true)
    }

    fn render(&self) {
        let text = self.rotation.render(&self.brightness, self.width);
        self.output.set_text_content(Some(&text));
    }
}

impl Swapper {
    fn on_move(&mut self, x: f64, y: f64) {
        if !self.motion.record(x, y) {
            return;
        }
        for image in &mut self.images {
            image.rotation.swap(self.config.fraction, &mut self.rng);
            image.render();
        }
    }

    fn resize(&mut self) {
        let Ok(document) = dom::document() else { return };
        for image in &mut self.images {
            if let Err(e) = image.rasterize(&document, &self.config) {
                log::error!("could not re-rasterize image: {:?}", e);
            }
        }
    }
}
