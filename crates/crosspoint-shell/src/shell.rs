//! Shell engine: the device core's window onto the host.
//!
//! The engine owns an injected [`PresentationSurface`] and turns render
//! notifications from the core into composed frames, flash cues, and
//! status-line updates. All work for one render call completes before the
//! call returns; the flash revert is the surface's deferred concern.

extern crate alloc;

use alloc::format;
use alloc::string::String;

use crate::compositor::{compose_gray, compose_mono};
use crate::ingest::{store_book, Storage, StorageError};
use crate::plane::PanelPlane;
use crate::raster::FrameRaster;

/// Duration of the full-refresh flash cue.
pub const FLASH_DURATION_MS: u32 = 80;

/// Status line shown once the device core's runtime is up.
pub const STATUS_RUNNING: &str = "Simulator running";
/// Status line shown while the core is in deep sleep.
pub const STATUS_SLEEPING: &str = "Device sleeping (press any key to wake)";
/// Status line shown when reading the selected file fails.
pub const STATUS_UPLOAD_FAILED: &str = "Upload failed!";

/// Refresh mode flag passed by the device core with each 1-bit render.
/// Raw values match the core's FULL_REFRESH / HALF_REFRESH / FAST_REFRESH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    Full,
    Half,
    Fast,
}

impl RefreshMode {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => RefreshMode::Full,
            1 => RefreshMode::Half,
            _ => RefreshMode::Fast,
        }
    }

    /// Only a full refresh shows the hardware's characteristic flash.
    pub fn flashes(self) -> bool {
        matches!(self, RefreshMode::Full)
    }
}

/// Host capability the engine presents through.
///
/// Implementations: canvas (web), SDL window (desktop), recording surface
/// (tests). All mutation happens on the host's single event-loop thread.
pub trait PresentationSurface {
    /// Commit a finished frame. The raster is fully composed; the surface
    /// must not observe partial states.
    fn present(&mut self, raster: &FrameRaster);

    /// Show a transient inversion of the presented frame for roughly
    /// `duration_ms`, then revert. Fire-and-forget: must not block, and a
    /// later `present` does not cancel the pending revert.
    fn flash(&mut self, duration_ms: u32);

    /// Replace the human-readable status line.
    fn set_status(&mut self, status: &str);
}

/// The simulator shell: composes frames for one presentation surface.
pub struct ShellEngine<S: PresentationSurface> {
    surface: S,
}

impl<S: PresentationSurface> ShellEngine<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    /// 1-bit render entry point, called by the device core whenever it
    /// repaints. A full refresh also triggers the flash cue.
    pub fn render_mono(&mut self, plane: &PanelPlane<'_>, mode: RefreshMode) {
        let raster = compose_mono(plane);
        self.surface.present(&raster);
        if mode.flashes() {
            self.surface.flash(FLASH_DURATION_MS);
        }
    }

    /// 2-bit render entry point. Grayscale updates never flash.
    pub fn render_gray(&mut self, low: &PanelPlane<'_>, high: &PanelPlane<'_>) {
        let raster = compose_gray(low, high);
        self.surface.present(&raster);
    }

    /// Deep-sleep notification: black out the display and say so.
    pub fn notify_sleep(&mut self) {
        log::info!("[SHELL] device entered deep sleep");
        let raster = FrameRaster::filled(crate::DISPLAY_WIDTH, crate::DISPLAY_HEIGHT, 0x00);
        self.surface.present(&raster);
        self.surface.set_status(STATUS_SLEEPING);
    }

    /// Runtime-ready notification, fired once at startup.
    pub fn notify_ready(&mut self) {
        log::info!("[SHELL] device core runtime ready");
        self.surface.set_status(STATUS_RUNNING);
    }

    /// A file selection started; the host is reading its bytes.
    pub fn ingest_begin(&mut self, file_name: &str) {
        self.surface
            .set_status(&format!("Uploading: {}...", file_name));
    }

    /// Reading the selected file failed; nothing was written.
    pub fn ingest_failed(&mut self) {
        log::warn!("[UPLOAD] host file read failed");
        self.surface.set_status(STATUS_UPLOAD_FAILED);
    }

    /// Store a selected file's bytes under the book directory and report
    /// the outcome on the status line.
    pub fn ingest_book<T: Storage>(
        &mut self,
        storage: &mut T,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        match store_book(storage, file_name, bytes) {
            Ok(path) => {
                log::info!("[UPLOAD] stored {} ({} bytes)", path, bytes.len());
                self.surface.set_status(&format!(
                    "Uploaded: {} ({} KB) — navigate to My Library to open it",
                    file_name,
                    format_kib(bytes.len()),
                ));
                Ok(path)
            }
            Err(err) => {
                log::warn!("[UPLOAD] storing {} failed: {}", file_name, err);
                self.surface.set_status(STATUS_UPLOAD_FAILED);
                Err(err)
            }
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

/// Size in KiB with one decimal, as the status line shows it.
fn format_kib(len: usize) -> String {
    format!("{:.1}", len as f64 / 1024.0)
}
