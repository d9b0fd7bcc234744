//! ASCII morphing and dot-dissolve effects for the browser.
//!
//! The effect maths lives in plain modules that build and test on the host;
//! the `wasm` module binds them to the page when compiled for `wasm32`.

pub mod color;
pub mod config;
pub mod dissolve;
pub mod error;
pub mod grid;
pub mod layout;
pub mod migration;
pub mod morph;
pub mod pixels;
pub mod ramp;
pub mod swap;
pub mod text_morph;

pub use error::{Error, Result};

/// Generator used for every random choice in the effects.
pub type EffectRng = rand::rngs::SmallRng;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    mod dom;
    mod dots;
    mod image_morph;
    mod mousemove;
    mod text_morph;

    impl From<crate::Error> for JsValue {
        fn from(err: crate::Error) -> Self {
            JsValue::from_str(&err.to_string())
        }
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        // The module may finish loading after the page has.
        if dom::document()?.ready_state() == "complete" {
            return start_demo();
        }
        let window = dom::window()?;
        let on_load = Closure::once_into_js(move || {
            if let Err(e) = start_demo() {
                log::error!("demo failed to start: {:?}", e);
            }
        });
        window.add_event_listener_with_callback("load", on_load.unchecked_ref())?;
        Ok(())
    }

    /// Start the demo named by `<body data-demo="...">`.
    fn start_demo() -> Result<(), JsValue> {
        let document = dom::document()?;
        let body = document.body().ok_or("no body")?;
        let demo = body.dataset().get("demo").unwrap_or_default();
        log::info!("starting demo '{}'", demo);

        match demo.as_str() {
            "image-click" => image_morph::start(image_morph::Mode::Click),
            "image-scroll" => image_morph::start(image_morph::Mode::Scroll),
            "image-scroll-fixed" => image_morph::start(image_morph::Mode::ScrollFixed),
            "image-mousemove" => mousemove::start(),
            "text-morph" => text_morph::start(),
            "dots" => dots::start(false),
            "dots-moving" => dots::start(true),
            "" => Err("body has no data-demo attribute".into()),
            other => Err(format!("unknown demo '{}'", other).into()),
        }
    }
}
