//! Per-demo settings, read from a JSON `data-config` attribute. Every field
//! is optional; defaults reproduce the stock demos.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::Palette;
use crate::dissolve::Track;
use crate::error::Result;
use crate::migration::Density;
use crate::pixels::{grid_size, Fit};
use crate::ramp::{NamedRamp, Ramp};

/// Parse a config, falling back to defaults when there is no attribute.
pub fn parse<T: Serialize + DeserializeOwned + Default>(json: Option<&str>) -> Result<T> {
    parse_onto(T::default(), json)
}

/// Apply the fields present in `json` on top of `base`. Nested objects are
/// merged key by key, everything else is replaced.
pub fn parse_onto<T: Serialize + DeserializeOwned>(base: T, json: Option<&str>) -> Result<T> {
    let json = match json.map(str::trim) {
        None | Some("") => return Ok(base),
        Some(json) => json,
    };
    let overrides: Value = serde_json::from_str(json)?;
    let mut merged = serde_json::to_value(&base)?;
    merge(&mut merged, overrides);
    Ok(serde_json::from_value(merged)?)
}

fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, value) => *base = value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorMode {
    /// Keep the source image colours.
    #[default]
    Source,
    /// Recolour with a duotone pair, changed on every transition.
    Duotone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageMorphConfig {
    pub ramp: Ramp,
    pub invert: bool,
    /// Contrast boost in percent, 0 disables.
    pub contrast: f64,
    pub gamma: Option<f64>,
    pub fit: Fit,
    /// Fixed grid columns. With only one of `columns` and `rows` set, the
    /// other follows the first image's proportions.
    pub columns: Option<usize>,
    pub rows: Option<usize>,
    /// Fixed glyph ratio; measured from the page when absent.
    pub glyph_ratio: Option<f64>,
    pub color: ColorMode,
    pub palette: Palette,
    pub transition_ms: f64,
    pub resize_debounce_ms: i32,
}

impl Default for ImageMorphConfig {
    fn default() -> Self {
        Self {
            ramp: Ramp::circles(),
            invert: false,
            contrast: 100.0,
            gamma: None,
            fit: Fit::Cover,
            columns: None,
            rows: None,
            glyph_ratio: None,
            color: ColorMode::Duotone,
            palette: Palette::default(),
            transition_ms: 1500.0,
            resize_debounce_ms: 300,
        }
    }
}

impl ImageMorphConfig {
    /// Settings of the looping scroll map.
    pub fn scroll() -> Self {
        Self {
            ramp: Ramp::geometric(),
            color: ColorMode::Source,
            ..Self::default()
        }
    }

    /// Settings of the fixed three-image scroll map.
    pub fn scroll_fixed() -> Self {
        Self {
            ramp: Ramp::shades(),
            color: ColorMode::Source,
            ..Self::default()
        }
    }

    /// Grid size pinned by `columns`/`rows`, or `None` to size from the
    /// viewport.
    pub fn fixed_grid(&self, natural_w: f64, natural_h: f64, glyph_ratio: f64) -> Result<Option<(usize, usize)>> {
        if self.columns.is_none() && self.rows.is_none() {
            return Ok(None);
        }
        grid_size(natural_w, natural_h, glyph_ratio, self.columns, self.rows).map(Some)
    }

    pub fn effective_ramp(&self) -> Ramp {
        if self.invert {
            self.ramp.inverted()
        } else {
            self.ramp.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextMorphConfig {
    pub text: String,
    pub charsets: Vec<NamedRamp>,
    pub font_size: f64,
    pub sample_rate: usize,
    pub transition_ms: f64,
    pub scroll_debounce_ms: i32,
}

impl Default for TextMorphConfig {
    fn default() -> Self {
        Self {
            text: "ANAcycle".to_string(),
            charsets: NamedRamp::text_sets(),
            font_size: 200.0,
            sample_rate: 8,
            transition_ms: 1200.0,
            scroll_debounce_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwapConfig {
    pub sets: Vec<Ramp>,
    pub invert: bool,
    pub contrast: f64,
    pub gamma: Option<f64>,
    /// Share of cells advanced per swap.
    pub fraction: f64,
    /// Pointer travel in pixels that triggers a swap.
    pub min_distance: f64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            sets: Ramp::swap_sets(),
            invert: false,
            contrast: 100.0,
            gamma: None,
            fraction: 0.2,
            min_distance: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MigrationMode {
    /// Movers travel once as the page scrolls.
    #[default]
    Scroll,
    /// Movers circulate between both blocks continuously.
    Circulate,
}

/// Viewports narrower than this use the mobile dissolve settings.
pub const MOBILE_BREAKPOINT: f64 = 600.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DissolveConfig {
    pub track: Track,
    pub start: Option<f64>,
    pub limit: Option<f64>,
    /// Baseline nudge as a share of the line height.
    pub baseline_offset: f64,
    pub line_height: f64,
}

impl Default for DissolveConfig {
    fn default() -> Self {
        Self {
            track: Track::DocumentPosition,
            start: None,
            limit: None,
            baseline_offset: 0.075,
            line_height: 0.85,
        }
    }
}

impl DissolveConfig {
    fn fallback(viewport_w: f64) -> f64 {
        if viewport_w < MOBILE_BREAKPOINT {
            0.7
        } else {
            0.8
        }
    }

    pub fn start_for(&self, viewport_w: f64) -> f64 {
        self.start.unwrap_or_else(|| Self::fallback(viewport_w))
    }

    pub fn limit_for(&self, viewport_w: f64) -> f64 {
        self.limit.unwrap_or_else(|| Self::fallback(viewport_w))
    }

    /// Canvas pixels per CSS pixel.
    pub fn scale_for(viewport_w: f64) -> f64 {
        if viewport_w < MOBILE_BREAKPOINT {
            2.0
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MigrationConfig {
    pub mode: MigrationMode,
    pub density: Density,
    /// Phase advance per frame while circulating.
    pub circulation_speed: f64,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            mode: MigrationMode::Scroll,
            density: Density::default(),
            circulation_speed: 0.002,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn missing_attribute_gives_defaults() {
        let cfg: ImageMorphConfig = parse(None).unwrap();
        assert_eq!(cfg, ImageMorphConfig::default());
        let cfg: TextMorphConfig = parse(Some("  ")).unwrap();
        assert_eq!(cfg.charsets.len(), 6);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let cfg: ImageMorphConfig =
            parse(Some(r##"{"ramp": [" ", "#"], "transitionMs": 500, "color": "source"}"##)).unwrap();
        assert_eq!(cfg.ramp, Ramp::new([" ", "#"]).unwrap());
        assert_eq!(cfg.transition_ms, 500.0);
        assert_eq!(cfg.color, ColorMode::Source);
        assert_eq!(cfg.contrast, 100.0);

        let cfg: MigrationConfig = parse(Some(r#"{"mode": "circulate", "density": {"sourceEnd": 0.1}}"#)).unwrap();
        assert_eq!(cfg.mode, MigrationMode::Circulate);
        assert_eq!(cfg.density.source_end, 0.1);
        assert_eq!(cfg.density.source_start, 0.5);
    }

    #[test]
    fn contain_padding_is_camel_case() {
        let cfg: ImageMorphConfig =
            parse(Some(r#"{"fit": {"mode": "contain", "padX": 2, "padY": 1}}"#)).unwrap();
        assert_eq!(cfg.fit, Fit::Contain { pad_x: 2.0, pad_y: 1.0 });
        assert!(parse::<ImageMorphConfig>(Some(r#"{"fit": {"mode": "contain", "pad_x": 2, "pad_y": 1}}"#)).is_err());
    }

    #[test]
    fn pinned_columns_derive_rows() {
        let cfg = ImageMorphConfig::default();
        assert_eq!(cfg.fixed_grid(200.0, 100.0, 0.5).unwrap(), None);
        let cfg: ImageMorphConfig = parse(Some(r#"{"columns": 40}"#)).unwrap();
        assert_eq!(cfg.fixed_grid(200.0, 100.0, 0.5).unwrap(), Some((40, 10)));
        let cfg: ImageMorphConfig = parse(Some(r#"{"rows": 10}"#)).unwrap();
        assert_eq!(cfg.fixed_grid(200.0, 100.0, 0.5).unwrap(), Some((40, 10)));
        assert!(cfg.fixed_grid(200.0, 0.0, 0.5).is_err());
    }

    #[test]
    fn overrides_keep_preset_fields() {
        let cfg = parse_onto(ImageMorphConfig::scroll_fixed(), Some(r#"{"contrast": 0}"#)).unwrap();
        assert_eq!(cfg.ramp, Ramp::shades());
        assert_eq!(cfg.contrast, 0.0);
        let cfg = parse_onto(ImageMorphConfig::scroll(), None).unwrap();
        assert_eq!(cfg, ImageMorphConfig::scroll());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse::<SwapConfig>(Some("{nope")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(parse::<ImageMorphConfig>(Some(r#"{"ramp": []}"#)).is_err());
    }

    #[test]
    fn dissolve_defaults_follow_viewport() {
        let cfg = DissolveConfig::default();
        assert_eq!(cfg.start_for(500.0), 0.7);
        assert_eq!(cfg.limit_for(1024.0), 0.8);
        assert_eq!(DissolveConfig::scale_for(500.0), 2.0);
        let cfg: DissolveConfig = parse(Some(r#"{"start": 0.2, "track": "elementPosition"}"#)).unwrap();
        assert_eq!(cfg.start_for(500.0), 0.2);
        assert_eq!(cfg.track, Track::ElementPosition);
    }
}
