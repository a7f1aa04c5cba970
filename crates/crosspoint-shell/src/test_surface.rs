//! Recording presentation surface for headless tests.
//!
//! Keeps the last presented raster plus a log of flash and status
//! activity, so scenario tests can assert on exactly what a host surface
//! would have shown. The flash overlay expires only when a test says so —
//! simulated time, no real delays.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::raster::FrameRaster;
use crate::shell::PresentationSurface;

#[derive(Default)]
pub struct TestSurface {
    last_frame: Option<FrameRaster>,
    present_count: usize,
    flash_active: bool,
    flash_requests: Vec<u32>,
    status_log: Vec<String>,
}

impl TestSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently presented frame, if any.
    pub fn last_frame(&self) -> Option<&FrameRaster> {
        self.last_frame.as_ref()
    }

    pub fn present_count(&self) -> usize {
        self.present_count
    }

    /// Whether the flash overlay is currently shown.
    pub fn flash_active(&self) -> bool {
        self.flash_active
    }

    /// Durations of every flash requested so far.
    pub fn flash_requests(&self) -> &[u32] {
        &self.flash_requests
    }

    /// Simulate the revert timer firing.
    pub fn expire_flash(&mut self) {
        self.flash_active = false;
    }

    pub fn status(&self) -> Option<&str> {
        self.status_log.last().map(String::as_str)
    }

    pub fn status_log(&self) -> &[String] {
        &self.status_log
    }
}

impl PresentationSurface for TestSurface {
    fn present(&mut self, raster: &FrameRaster) {
        self.last_frame = Some(raster.clone());
        self.present_count += 1;
    }

    fn flash(&mut self, duration_ms: u32) {
        self.flash_active = true;
        self.flash_requests.push(duration_ms);
    }

    fn set_status(&mut self, status: &str) {
        self.status_log.push(status.to_string());
    }
}
