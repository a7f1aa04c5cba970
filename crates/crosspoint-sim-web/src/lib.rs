//! WASM browser shell for the CrossPoint X4 emulator.
//!
//! The emulated device core (compiled separately) calls the exported
//! render entry points with its packed framebuffers; this shell decodes
//! them to the `<canvas>`, feeds keyboard/mouse/touch back as button
//! signals, and copies uploaded books into the core's MEMFS.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Element, FileReader, HtmlCanvasElement, HtmlInputElement, ImageData,
};

use crosspoint_shell::{
    Button, ButtonPort, FrameRaster, InputBridge, PanelPlane, PresentationSurface, RefreshMode,
    ShellEngine, Storage, StorageError,
};

// Exports of the device core's WASM module.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Module, js_name = _simulator_button_down)]
    fn simulator_button_down(index: u32);
    #[wasm_bindgen(js_namespace = Module, js_name = _simulator_button_up)]
    fn simulator_button_up(index: u32);
}

// Emscripten MEMFS, the core's virtual filesystem.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = FS, js_name = mkdir)]
    fn memfs_mkdir(path: &str) -> Result<(), JsValue>;
    #[wasm_bindgen(catch, js_namespace = FS, js_name = writeFile)]
    fn memfs_write_file(path: &str, data: &js_sys::Uint8Array) -> Result<(), JsValue>;
}

struct WebShell {
    engine: ShellEngine<CanvasSurface>,
    bridge: InputBridge<CorePort>,
    storage: MemfsStorage,
}

thread_local! {
    static SHELL: RefCell<Option<WebShell>> = const { RefCell::new(None) };
}

fn with_shell(f: impl FnOnce(&mut WebShell)) {
    SHELL.with(|cell| {
        if let Some(shell) = cell.borrow_mut().as_mut() {
            f(shell);
        }
    });
}

/// Canvas-backed presentation surface.
struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    status: Element,
}

impl PresentationSurface for CanvasSurface {
    fn present(&mut self, raster: &FrameRaster) {
        if self.canvas.width() != raster.width() {
            self.canvas.set_width(raster.width());
        }
        if self.canvas.height() != raster.height() {
            self.canvas.set_height(raster.height());
        }
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(raster.as_bytes()),
            raster.width(),
            raster.height(),
        );
        if let Ok(image) = image {
            let _ = self.ctx.put_image_data(&image, 0.0, 0.0);
        }
    }

    fn flash(&mut self, duration_ms: u32) {
        let style = self.canvas.style();
        let _ = style.set_property("filter", "invert(1)");

        // Deferred revert on the same event loop; a later present does
        // not cancel it.
        let canvas = self.canvas.clone();
        let revert: js_sys::Function = Closure::once_into_js(move || {
            let _ = canvas.style().set_property("filter", "");
        })
        .unchecked_into();
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                &revert,
                duration_ms as i32,
            );
        }
    }

    fn set_status(&mut self, status: &str) {
        self.status.set_text_content(Some(status));
    }
}

/// Button signals into the device core's exports.
struct CorePort;

impl ButtonPort for CorePort {
    fn button_down(&mut self, button: Button) {
        simulator_button_down(button.index() as u32);
    }

    fn button_up(&mut self, button: Button) {
        simulator_button_up(button.index() as u32);
    }
}

/// MEMFS-backed storage.
struct MemfsStorage;

impl Storage for MemfsStorage {
    fn make_dir(&mut self, path: &str) -> Result<(), StorageError> {
        // mkdir throws when the directory exists; that is success here.
        let _ = memfs_mkdir(path);
        Ok(())
    }

    fn write_file(&mut self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let data = js_sys::Uint8Array::from(bytes);
        memfs_write_file(path, &data)
            .map_err(|_| StorageError::Io("MEMFS write failed".to_string()))
    }
}

// --- Entry points called by the device core ---

/// 1-bit render. `mode` carries the core's raw refresh-mode value.
#[wasm_bindgen]
pub fn render_framebuffer(buffer: &[u8], width: u32, height: u32, mode: u32) {
    with_shell(|shell| {
        let plane = PanelPlane::new(buffer, width, height);
        shell.engine.render_mono(&plane, RefreshMode::from_raw(mode));
    });
}

/// 2-bit render from LSB and MSB planes. Never flashes.
#[wasm_bindgen]
pub fn render_grayscale(lsb: &[u8], msb: &[u8], width: u32, height: u32) {
    with_shell(|shell| {
        let low = PanelPlane::new(lsb, width, height);
        let high = PanelPlane::new(msb, width, height);
        shell.engine.render_gray(&low, &high);
    });
}

#[wasm_bindgen]
pub fn on_deep_sleep() {
    with_shell(|shell| shell.engine.notify_sleep());
}

#[wasm_bindgen]
pub fn on_runtime_ready() {
    with_shell(|shell| shell.engine.notify_ready());
}

// --- Shell setup ---

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = document
        .get_element_by_id("display")
        .ok_or_else(|| JsValue::from_str("missing #display canvas"))?
        .dyn_into()?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    let status = document
        .get_element_by_id("status-text")
        .ok_or_else(|| JsValue::from_str("missing #status-text"))?;

    let surface = CanvasSurface {
        canvas,
        ctx,
        status,
    };
    SHELL.with(|cell| {
        *cell.borrow_mut() = Some(WebShell {
            engine: ShellEngine::new(surface),
            bridge: InputBridge::new(CorePort),
            storage: MemfsStorage,
        });
    });

    wire_keyboard(&document)?;
    wire_controls(&document)?;
    wire_upload(&document)?;

    Ok(())
}

fn wire_keyboard(document: &web_sys::Document) -> Result<(), JsValue> {
    let keydown = Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
        let key = e.key();
        let mut mapped = None;
        with_shell(|shell| mapped = shell.bridge.key_down(&key));
        if let Some(button) = mapped {
            e.prevent_default();
            set_control_pressed(button, true);
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    keydown.forget();

    let keyup = Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
        let key = e.key();
        let mut mapped = None;
        with_shell(|shell| mapped = shell.bridge.key_up(&key));
        if let Some(button) = mapped {
            e.prevent_default();
            set_control_pressed(button, false);
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
    keyup.forget();

    Ok(())
}

/// Toggle the pressed highlight on the on-screen control for `button`.
fn set_control_pressed(button: Button, pressed: bool) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let selector = format!(".hw-btn[data-btn=\"{}\"]", button.index());
    if let Ok(Some(el)) = document.query_selector(&selector) {
        let class_list = el.class_list();
        let _ = if pressed {
            class_list.add_1("pressed")
        } else {
            class_list.remove_1("pressed")
        };
    }
}

fn wire_controls(document: &web_sys::Document) -> Result<(), JsValue> {
    let controls = document.query_selector_all(".hw-btn")?;
    for i in 0..controls.length() {
        let Some(node) = controls.item(i) else {
            continue;
        };
        let Ok(el) = node.dyn_into::<Element>() else {
            continue;
        };
        let Some(index) = el
            .get_attribute("data-btn")
            .and_then(|v| v.parse::<u8>().ok())
        else {
            continue;
        };
        wire_control(&el, index)?;
    }
    Ok(())
}

fn wire_control(el: &Element, index: u8) -> Result<(), JsValue> {
    // Press begin: mouse and touch.
    for event in ["mousedown", "touchstart"] {
        let el_down = el.clone();
        let down = Closure::wrap(Box::new(move |e: web_sys::Event| {
            e.prevent_default();
            with_shell(|shell| {
                shell.bridge.control_down(index);
            });
            let _ = el_down.class_list().add_1("pressed");
        }) as Box<dyn FnMut(_)>);
        el.add_event_listener_with_callback(event, down.as_ref().unchecked_ref())?;
        down.forget();
    }

    // Press end, plus pointer leaving while held. The extra "up" on
    // leave-after-release is intentional; the core debounces.
    for event in ["mouseup", "mouseleave", "touchend"] {
        let el_up = el.clone();
        let prevent_default = event != "mouseleave";
        let up = Closure::wrap(Box::new(move |e: web_sys::Event| {
            if prevent_default {
                e.prevent_default();
            }
            with_shell(|shell| {
                shell.bridge.control_up(index);
            });
            let _ = el_up.class_list().remove_1("pressed");
        }) as Box<dyn FnMut(_)>);
        el.add_event_listener_with_callback(event, up.as_ref().unchecked_ref())?;
        up.forget();
    }

    Ok(())
}

fn wire_upload(document: &web_sys::Document) -> Result<(), JsValue> {
    let input: HtmlInputElement = document
        .get_element_by_id("epub-file")
        .ok_or_else(|| JsValue::from_str("missing #epub-file input"))?
        .dyn_into()?;

    let change = Closure::wrap(Box::new(move |e: web_sys::Event| {
        let Some(input) = e
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };
        let name = file.name();
        with_shell(|shell| shell.engine.ingest_begin(&name));

        let Ok(reader) = FileReader::new() else {
            with_shell(|shell| shell.engine.ingest_failed());
            return;
        };

        let result_reader = reader.clone();
        let onload: js_sys::Function =
            Closure::once_into_js(move |_: web_sys::ProgressEvent| {
                let bytes = result_reader
                    .result()
                    .ok()
                    .map(|buf| js_sys::Uint8Array::new(&buf).to_vec());
                with_shell(|shell| match &bytes {
                    Some(bytes) => {
                        let _ = shell.engine.ingest_book(&mut shell.storage, &name, bytes);
                    }
                    None => shell.engine.ingest_failed(),
                });
            })
            .unchecked_into();
        reader.set_onload(Some(&onload));

        let onerror: js_sys::Function = Closure::once_into_js(move |_: web_sys::ProgressEvent| {
            with_shell(|shell| shell.engine.ingest_failed());
        })
        .unchecked_into();
        reader.set_onerror(Some(&onerror));

        if reader.read_as_array_buffer(&file).is_err() {
            with_shell(|shell| shell.engine.ingest_failed());
        }
    }) as Box<dyn FnMut(_)>);
    input.add_event_listener_with_callback("change", change.as_ref().unchecked_ref())?;
    change.forget();

    Ok(())
}
