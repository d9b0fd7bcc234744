//! Character-grid sizing from viewport and glyph measurements.

/// Viewports at or below this width use the narrow-screen constants.
pub const NARROW_VIEWPORT: f64 = 700.0;

/// Enough cells to cover the whole viewport.
pub fn fill_viewport(viewport_w: f64, viewport_h: f64, char_w: f64, char_h: f64) -> (usize, usize) {
    (
        (viewport_w / char_w).ceil().max(1.0) as usize,
        (viewport_h / char_h).ceil().max(1.0) as usize,
    )
}

/// 90% of the viewport width clamped to 80..=300 columns, two columns per
/// row.
pub fn bounded(viewport_w: f64, char_w: f64) -> (usize, usize) {
    let width = ((viewport_w / char_w * 0.9).floor() as usize).clamp(80, 300);
    (width, width / 2)
}

/// Sized to a container, with a fixed width:height cell ratio that
/// narrows on small screens.
pub fn container(container_w: f64, unit_w: f64, viewport_w: f64) -> (usize, usize) {
    let width = (container_w / unit_w).round().max(0.0) as usize;
    let aspect = if viewport_w <= NARROW_VIEWPORT { 2.75 } else { 3.5 };
    let height = (width as f64 / aspect).round() as usize;
    (width, height)
}

/// Page height for the looping scroll map: one viewport per image.
pub fn scroll_height_vh(images: usize) -> usize {
    images * 100
}

pub fn glyph_ratio_for(viewport_w: f64) -> f64 {
    if viewport_w <= NARROW_VIEWPORT {
        0.35
    } else {
        0.45
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rounds_up() {
        assert_eq!(fill_viewport(1280.0, 720.0, 9.0, 16.0), (143, 45));
    }

    #[test]
    fn bounded_clamps_width() {
        assert_eq!(bounded(400.0, 10.0), (80, 40));
        assert_eq!(bounded(1000.0, 10.0), (90, 45));
        assert_eq!(bounded(10_000.0, 10.0), (300, 150));
    }

    #[test]
    fn container_narrows_on_small_screens() {
        assert_eq!(container(700.0, 7.0, 1200.0), (100, 29));
        assert_eq!(container(700.0, 7.0, 600.0), (100, 36));
        assert_eq!(glyph_ratio_for(700.0), 0.35);
        assert_eq!(glyph_ratio_for(701.0), 0.45);
    }

    #[test]
    fn one_viewport_of_scroll_per_image() {
        assert_eq!(scroll_height_vh(5), 500);
        assert_eq!(scroll_height_vh(1), 100);
    }
}
