use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use wasm_bindgen::{closure::Closure, Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, Element, EventTarget, HtmlCanvasElement, HtmlImageElement, ImageData, Window};

use crate::pixels::{PixelBuffer, Placement};
use crate::EffectRng;

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| "no window".into())
}

pub fn document() -> Result<Document, JsValue> {
    window()?.document().ok_or_else(|| "no document".into())
}

pub fn by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| format!("#{} not found", id).into())
}

pub fn query_all<T: JsCast>(document: &Document, selector: &str) -> Result<Vec<T>, JsValue> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect())
}

pub fn viewport() -> Result<(f64, f64), JsValue> {
    let window = window()?;
    let w = window.inner_width()?.as_f64().ok_or("viewport width")?;
    let h = window.inner_height()?.as_f64().ok_or("viewport height")?;
    Ok((w, h))
}

pub fn scroll_y() -> f64 {
    window().and_then(|w| w.scroll_y()).unwrap_or(0.0)
}

/// Scrollable distance of the document.
pub fn max_scroll() -> Result<f64, JsValue> {
    let root = document()?.document_element().ok_or("no document element")?;
    let (_, vh) = viewport()?;
    Ok((root.scroll_height() as f64 - vh).max(0.0))
}

/// Width and height of a rendered element.
pub fn rect_size(element: &Element) -> (f64, f64) {
    let rect = element.get_bounding_client_rect();
    (rect.width(), rect.height())
}

/// Character cell size, measured from a hidden `.ascii-unit` span.
pub fn glyph_cell(document: &Document) -> Result<(f64, f64), JsValue> {
    let unit = document
        .query_selector(".ascii-unit")?
        .ok_or(".ascii-unit not found")?;
    let (w, h) = rect_size(&unit);
    if w <= 0.0 || h <= 0.0 {
        return Err("ascii unit has no size".into());
    }
    Ok((w, h))
}

pub fn config_attr(element: &Element) -> Option<String> {
    element.get_attribute("data-config")
}

pub fn now() -> f64 {
    window()
        .ok()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

pub fn rng() -> EffectRng {
    let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
    EffectRng::seed_from_u64(seed << 32 ^ now().to_bits())
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    Ok(canvas
        .get_context("2d")?
        .ok_or("2d canvas not supported")?
        .dyn_into()?)
}

pub fn canvas(document: &Document, width: u32, height: u32) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = context_2d(&canvas)?;
    Ok((canvas, ctx))
}

pub fn read_pixels(ctx: &CanvasRenderingContext2d, width: usize, height: usize) -> Result<PixelBuffer, JsValue> {
    let data = ctx.get_image_data(0.0, 0.0, width as f64, height as f64)?.data();
    Ok(PixelBuffer::from_rgba(width, height, data.0)?)
}

pub fn write_pixels(ctx: &CanvasRenderingContext2d, width: usize, height: usize, rgba: &[u8]) -> Result<(), JsValue> {
    let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(rgba), width as u32, height as u32)?;
    ctx.put_image_data(&image, 0.0, 0.0)
}

/// Draw `image` onto a `grid_w` x `grid_h` canvas at `placement` and read it
/// back, one pixel per grid cell.
pub fn rasterize_image(image: &HtmlImageElement, grid_w: usize, grid_h: usize, placement: Placement) -> Result<PixelBuffer, JsValue> {
    let (_, ctx) = canvas(&document()?, grid_w as u32, grid_h as u32)?;
    ctx.draw_image_with_html_image_element_and_dw_and_dh(
        image,
        placement.x,
        placement.y,
        placement.width,
        placement.height,
    )?;
    read_pixels(&ctx, grid_w, grid_h)
}

pub fn listen(target: &EventTarget, event: &str, handler: impl FnMut(web_sys::Event) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Call `frame` with the frame timestamp on every animation frame for the
/// lifetime of the page.
pub fn animation_loop(mut frame: impl FnMut(f64) + 'static) -> Result<(), JsValue> {
    // `f` holds the closure so it can re-request itself.
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        frame(timestamp);
        if let (Ok(window), Some(next)) = (window(), f.borrow().as_ref()) {
            if let Err(e) = window.request_animation_frame(next.as_ref().unchecked_ref()) {
                log::error!("requestAnimationFrame failed: {:?}", e);
            }
        }
    }));

    let first = g.borrow();
    let first = first.as_ref().ok_or("animation closure missing")?;
    window()?.request_animation_frame(first.as_ref().unchecked_ref())?;
    Ok(())
}

/// Runs the last scheduled callback once no new one arrives for the delay.
#[derive(Clone, Default)]
pub struct Debounce {
    pending: Rc<Cell<Option<i32>>>,
}

impl Debounce {
    pub fn schedule(&self, delay_ms: i32, callback: impl FnOnce() + 'static) {
        let Ok(window) = window() else { return };
        if let Some(handle) = self.pending.take() {
            window.clear_timeout_with_handle(handle);
        }
        let pending = self.pending.clone();
        let callback = Closure::once_into_js(move || {
            pending.set(None);
            callback();
        });
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms) {
            Ok(handle) => self.pending.set(Some(handle)),
            Err(e) => log::error!("setTimeout failed: {:?}", e),
        }
    }
}
