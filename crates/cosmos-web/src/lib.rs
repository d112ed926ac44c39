//! Browser bindings: a single engine instance behind `#[wasm_bindgen]` exports.

pub mod runner;

pub use runner::{BufferRenderer, CosmosRunner, Upload};

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use cosmos_engine::{CosmosConfig, InputEvent, OrientationSample, SurfaceDesc};

thread_local! {
    static RUNNER: RefCell<Option<CosmosRunner>> = RefCell::new(None);
}

/// Run `f` against the live runner. Calls made before `cosmos_init` (or
/// after a failed init) fall through to the default value.
fn with_runner<R: Default>(f: impl FnOnce(&mut CosmosRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => {
            log::warn!("cosmos not initialized; call cosmos_init() first");
            R::default()
        }
    })
}

/// Create the engine for a `width`x`height` surface. Returns false if the
/// surface cannot be rendered to.
#[wasm_bindgen]
pub fn cosmos_init(width: u32, height: u32, device_pixel_ratio: f32) -> bool {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let mut surface = SurfaceDesc::new(width, height);
    if device_pixel_ratio > 0.0 {
        surface = surface.with_device_pixel_ratio(device_pixel_ratio);
    }

    match CosmosRunner::new(CosmosConfig::default(), surface) {
        Ok(runner) => {
            RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
            log::info!("cosmos: initialized");
            true
        }
        Err(e) => {
            web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
            false
        }
    }
}

#[wasm_bindgen]
pub fn cosmos_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

#[wasm_bindgen]
pub fn cosmos_sync_config(json: &str) {
    with_runner(|r| r.sync_config(json));
}

/// Tear down the engine. Returns the resource ids the host must still free.
#[wasm_bindgen]
pub fn cosmos_dispose() -> js_sys::Uint32Array {
    let released = RUNNER.with(|cell| {
        cell.borrow_mut()
            .take()
            .map(|mut runner| runner.dispose())
            .unwrap_or_default()
    });
    js_sys::Uint32Array::from(released.as_slice())
}

// ---- Input ----

#[wasm_bindgen]
pub fn cosmos_pointer_down(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
}

#[wasm_bindgen]
pub fn cosmos_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
}

#[wasm_bindgen]
pub fn cosmos_pointer_up() {
    with_runner(|r| r.push_input(InputEvent::PointerUp));
}

#[wasm_bindgen]
pub fn cosmos_wheel(delta_y: f32) {
    with_runner(|r| r.push_input(InputEvent::Wheel { delta_y }));
}

/// Device orientation in degrees. Either angle may be missing.
#[wasm_bindgen]
pub fn cosmos_orientation(beta: Option<f32>, gamma: Option<f32>) {
    with_runner(|r| r.push_input(InputEvent::Orientation(OrientationSample::new(beta, gamma))));
}

/// Record the outcome of the host's motion-permission prompt.
#[wasm_bindgen]
pub fn cosmos_set_orientation_permitted(permitted: bool) {
    with_runner(|r| r.set_orientation_permitted(permitted));
}

#[wasm_bindgen]
pub fn cosmos_resize(width: u32, height: u32) {
    with_runner(|r| r.push_input(InputEvent::Resize { width, height }));
}

// ---- Telemetry ----

#[wasm_bindgen]
pub fn get_fps() -> u32 {
    with_runner(|r| r.telemetry().fps)
}

#[wasm_bindgen]
pub fn get_energy() -> f32 {
    with_runner(|r| r.telemetry().energy)
}

#[wasm_bindgen]
pub fn get_impulse() -> f32 {
    with_runner(|r| r.telemetry().impulse)
}

#[wasm_bindgen]
pub fn get_pixel_ratio() -> f32 {
    with_runner(|r| r.pixel_ratio())
}

// ---- Frame data ----

#[wasm_bindgen]
pub fn get_frame_ptr() -> *const f32 {
    RUNNER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |r| r.frame_ptr())
    })
}

#[wasm_bindgen]
pub fn get_frame_len() -> u32 {
    with_runner(|r| r.frame_len())
}

#[wasm_bindgen]
pub fn get_record_count() -> u32 {
    with_runner(|r| r.record_count())
}

/// Geometry and material descriptions first drawn since the last call, as JSON.
#[wasm_bindgen]
pub fn take_uploads() -> String {
    with_runner(|r| r.take_uploads_json())
}

/// Resource ids the host should free.
#[wasm_bindgen]
pub fn take_released() -> js_sys::Uint32Array {
    let released = with_runner(|r| r.take_released());
    js_sys::Uint32Array::from(released.as_slice())
}
