//! Host-side scenario harness for the X4 simulator shell.
//!
//! Couples the shell engine with the recording surface, a mock storage,
//! and a button-signal log, so scenario tests can drive every external
//! interface headlessly and assert on exactly what a host would show.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use png::{BitDepth, ColorType, Encoder};

use crosspoint_shell::{
    Button, ButtonPort, InputBridge, MockStorage, PanelPlane, RefreshMode, ShellEngine,
    StorageError, TestSurface,
};

/// One emitted button signal, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSignal {
    Down(Button),
    Up(Button),
}

/// Device-core stand-in that records every signal the bridge emits.
#[derive(Default)]
pub struct SignalLog {
    signals: Vec<ButtonSignal>,
}

impl SignalLog {
    pub fn signals(&self) -> &[ButtonSignal] {
        &self.signals
    }
}

impl ButtonPort for SignalLog {
    fn button_down(&mut self, button: Button) {
        self.signals.push(ButtonSignal::Down(button));
    }

    fn button_up(&mut self, button: Button) {
        self.signals.push(ButtonSignal::Up(button));
    }
}

/// Couples engine, storage, and input bridge for scenario tests.
pub struct ShellHarness {
    engine: ShellEngine<TestSurface>,
    storage: MockStorage,
    bridge: InputBridge<SignalLog>,
}

impl Default for ShellHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellHarness {
    pub fn new() -> Self {
        Self {
            engine: ShellEngine::new(TestSurface::new()),
            storage: MockStorage::new(),
            bridge: InputBridge::new(SignalLog::default()),
        }
    }

    /// Drive the 1-bit render entry point.
    pub fn render_mono(&mut self, bytes: &[u8], width: u32, height: u32, mode: RefreshMode) {
        let plane = PanelPlane::new(bytes, width, height);
        self.engine.render_mono(&plane, mode);
    }

    /// Drive the 2-bit render entry point.
    pub fn render_gray(&mut self, lsb: &[u8], msb: &[u8], width: u32, height: u32) {
        let low = PanelPlane::new(lsb, width, height);
        let high = PanelPlane::new(msb, width, height);
        self.engine.render_gray(&low, &high);
    }

    pub fn sleep(&mut self) {
        self.engine.notify_sleep();
    }

    pub fn ready(&mut self) {
        self.engine.notify_ready();
    }

    pub fn key_down(&mut self, key: &str) -> Option<Button> {
        self.bridge.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> Option<Button> {
        self.bridge.key_up(key)
    }

    pub fn control_down(&mut self, index: u8) -> Option<Button> {
        self.bridge.control_down(index)
    }

    pub fn control_up(&mut self, index: u8) -> Option<Button> {
        self.bridge.control_up(index)
    }

    /// Drive the upload path end to end.
    pub fn upload(&mut self, name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        self.engine.ingest_begin(name);
        self.engine.ingest_book(&mut self.storage, name, bytes)
    }

    /// Simulate the host failing to read the selected file.
    pub fn upload_read_failed(&mut self, name: &str) {
        self.engine.ingest_begin(name);
        self.engine.ingest_failed();
    }

    pub fn surface(&self) -> &TestSurface {
        self.engine.surface()
    }

    pub fn surface_mut(&mut self) -> &mut TestSurface {
        self.engine.surface_mut()
    }

    pub fn storage(&self) -> &MockStorage {
        &self.storage
    }

    pub fn signals(&self) -> &[ButtonSignal] {
        self.bridge.port().signals()
    }

    /// Save the last presented frame as an 8-bit grayscale PNG.
    pub fn save_screenshot_png(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let raster = self
            .surface()
            .last_frame()
            .ok_or_else(|| "nothing presented yet".to_string())?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let mut data = Vec::with_capacity((raster.width() * raster.height()) as usize);
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                data.push(raster.gray_at(x, y));
            }
        }

        let file = File::create(path).map_err(|e| e.to_string())?;
        let writer = BufWriter::new(file);
        let mut encoder = Encoder::new(writer, raster.width(), raster.height());
        encoder.set_color(ColorType::Grayscale);
        encoder.set_depth(BitDepth::Eight);
        let mut png_writer = encoder.write_header().map_err(|e| e.to_string())?;
        png_writer
            .write_image_data(&data)
            .map_err(|e| e.to_string())
    }
}
