use anacycle_wasm::color::Rgb;
use anacycle_wasm::grid::{AsciiGrid, GridCache, Tint};
use anacycle_wasm::morph::{self, Blend, Retrigger, ScrollSchedule, Transition};
use anacycle_wasm::pixels::{self, image_ratio, Fit, PixelBuffer};
use anacycle_wasm::ramp::Ramp;
use anacycle_wasm::Error;

const BLACK: [u8; 4] = [0, 0, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn two_pixel_image(left: [u8; 4], right: [u8; 4]) -> PixelBuffer {
    PixelBuffer::from_rgba(2, 1, [left, right].concat()).unwrap()
}

/// Rasterize a 2x1 source onto a 4x2 grid with square glyphs.
fn grid_of(src: &PixelBuffer, ramp: &Ramp) -> AsciiGrid {
    let ratio = image_ratio(src.width() as f64, src.height() as f64, 1.0);
    let placement = pixels::place(Fit::Cover, 4, 2, ratio);
    let buffer = PixelBuffer::resample(src, 4, 2, placement);
    AsciiGrid::from_pixels(&buffer, ramp, Tint::Source).unwrap()
}

#[test]
fn image_to_ascii_text() {
    let ramp = Ramp::geometric();
    let grid = grid_of(&two_pixel_image(BLACK, WHITE), &ramp);
    assert_eq!(grid.dims(), (4, 2));
    assert_eq!(grid.to_text(&ramp), "..██\n..██");
}

#[test]
fn halfway_morph_meets_in_the_middle() {
    let ramp = Ramp::geometric();
    let a = grid_of(&two_pixel_image(BLACK, WHITE), &ramp);
    let b = grid_of(&two_pixel_image(WHITE, BLACK), &ramp);

    let frame = morph::morph(&a, &b, 0.5, &ramp, Blend::Rgb).unwrap();
    assert!(frame.glyphs().iter().all(|g| g == "◆"));
    assert!(frame.colors().iter().all(|&c| c == Rgb::new(128, 128, 128)));

    let start = morph::morph(&a, &b, 0.0, &ramp, Blend::Rgb).unwrap();
    assert_eq!(start.to_text(), grid_of(&two_pixel_image(BLACK, WHITE), &ramp).to_text(&ramp));
    let html = start.to_html();
    assert!(html.starts_with("<span style=\"color:rgb(0,0,0)\">.</span>"));
    assert_eq!(html.matches('\n').count(), 1);
}

#[test]
fn cache_drives_a_scroll_map() {
    let ramp = Ramp::geometric();
    let mut cache = GridCache::new();
    cache.insert("left.jpg", grid_of(&two_pixel_image(BLACK, WHITE), &ramp)).unwrap();
    cache.insert("right.jpg", grid_of(&two_pixel_image(WHITE, BLACK), &ramp)).unwrap();

    let schedule = ScrollSchedule::Uniform(cache.len());
    let segment = schedule.segment(0.25).unwrap();
    assert_eq!((segment.from, segment.to), (0, 1));
    assert!((segment.progress - 0.5).abs() < 1e-12);
    assert_eq!(cache.label(segment.label_index()).unwrap(), "left.jpg");

    let frame = morph::morph(
        cache.get(segment.from).unwrap(),
        cache.get(segment.to).unwrap(),
        segment.progress,
        &ramp,
        Blend::Rgb,
    )
    .unwrap();
    assert_eq!(frame.to_text(), "◆◆◆◆\n◆◆◆◆");

    let small = AsciiGrid::from_pixels(&PixelBuffer::new(1, 1), &ramp, Tint::Source).unwrap();
    assert!(matches!(cache.insert("tiny.jpg", small), Err(Error::GridMismatch { .. })));
    assert!(matches!(cache.get(5), Err(Error::IndexOutOfRange { index: 5, len: 2 })));
}

#[test]
fn click_transition_renders_eased_frames() {
    let ramp = Ramp::geometric();
    let mut cache = GridCache::new();
    cache.insert("a", grid_of(&two_pixel_image(BLACK, BLACK), &ramp)).unwrap();
    cache.insert("b", grid_of(&two_pixel_image(WHITE, WHITE), &ramp)).unwrap();

    let mut transition = Transition::new(1000.0, Retrigger::Restart);
    assert!(transition.start(1, 0.0));

    let (from, to) = (transition.from(), transition.to());
    let quarter = transition.tick(250.0);
    assert!(!quarter.finished);
    // 4 * 0.25^3 = 0.0625, still the darkest glyph
    let frame = morph::morph(cache.get(from).unwrap(), cache.get(to).unwrap(), quarter.eased, &ramp, Blend::Rgb).unwrap();
    assert!(frame.glyphs().iter().all(|g| g == "."));
    assert_eq!(transition.label_index(quarter.raw), 0);

    let done = transition.tick(1000.0);
    assert!(done.finished);
    assert_eq!(done.eased, 1.0);
    assert_eq!((transition.from(), transition.to()), (1, 1));
}
