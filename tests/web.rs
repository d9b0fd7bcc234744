#![cfg(target_arch = "wasm32")]

use anacycle_wasm::dissolve::{DissolveLayer, DissolveMap};
use anacycle_wasm::pixels::PixelBuffer;
use anacycle_wasm::ramp::Ramp;
use anacycle_wasm::text_morph::{TextGrid, TextMask};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

wasm_bindgen_test_configure!(run_in_browser);

fn rasterized_text(text: &str, width: u32, height: u32) -> PixelBuffer {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx: CanvasRenderingContext2d = canvas.get_context("2d").unwrap().unwrap().dyn_into().unwrap();
    ctx.set_font("bold 48px Arial, sans-serif");
    ctx.set_text_baseline("top");
    ctx.fill_text(text, 0.0, 0.0).unwrap();
    let data = ctx
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .unwrap()
        .data();
    PixelBuffer::from_rgba(width as usize, height as usize, data.0).unwrap()
}

#[wasm_bindgen_test]
fn canvas_text_becomes_dots() {
    let pixels = rasterized_text("ANA", 160, 60);
    let mut rng = SmallRng::seed_from_u64(4);
    let map = DissolveMap::random(pixels.len(), &mut rng);
    let layer = DissolveLayer::new(pixels, map).unwrap();
    assert!(!layer.dots().is_empty());
    assert!(layer.dots().len() < 160 * 60);
}

#[wasm_bindgen_test]
fn canvas_text_samples_into_glyphs() {
    let pixels = rasterized_text("cycle", 160, 60);
    let mask = TextMask::new(160, 60, pixels.alpha());
    let ramp = Ramp::new([" ", ".", ":", "*", "█"]).unwrap();
    let mut rng = SmallRng::seed_from_u64(5);
    let grid = TextGrid::sample(&mask, &ramp, 8, &mut rng);
    assert_eq!((grid.width(), grid.height()), (20, 8));
    assert!(grid.rows().iter().flatten().any(|cell| cell.is_text));
}
