//! Presentation and input-bridging shell for the CrossPoint X4 emulator.
//! Decodes the device core's packed panel framebuffers into a viewable
//! raster, and maps host input back into the core's button protocol.
//! Works in the browser (WASM), on the desktop, and headless in tests.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

extern crate alloc;

pub mod compositor;
pub mod ingest;
pub mod input;
pub mod panel_frame;
pub mod plane;
pub mod raster;
pub mod rotate;
pub mod shell;
pub mod test_surface;

#[cfg(feature = "std")]
pub mod host_storage;
#[cfg(feature = "std")]
pub mod mock_storage;

pub use compositor::{compose_gray, compose_mono};
pub use ingest::{store_book, BOOKS_DIR, STORAGE_ROOT, Storage, StorageError};
pub use input::{button_for_key, Button, ButtonPort, InputBridge};
pub use panel_frame::PanelFrame;
pub use plane::{gray_level, mono_is_white, PanelPlane, GRAY_LEVELS, MONO_BLACK, MONO_WHITE};
pub use raster::FrameRaster;
pub use rotate::{rotate_ccw, rotated_size};
pub use shell::{
    PresentationSurface, RefreshMode, ShellEngine, FLASH_DURATION_MS, STATUS_RUNNING,
    STATUS_SLEEPING, STATUS_UPLOAD_FAILED,
};
pub use test_surface::TestSurface;

#[cfg(feature = "std")]
pub use host_storage::HostStorage;
#[cfg(feature = "std")]
pub use mock_storage::MockStorage;

/// Native panel dimensions (800x480 landscape).
/// The SSD1677 panel is mounted sideways in the X4 enclosure, so the
/// presented image is the 90-degree rotation of this buffer.
pub const PANEL_WIDTH: u32 = 800;
pub const PANEL_HEIGHT: u32 = 480;
pub const PANEL_WIDTH_BYTES: usize = (PANEL_WIDTH / 8) as usize;
pub const PANEL_BUFFER_SIZE: usize = PANEL_WIDTH_BYTES * PANEL_HEIGHT as usize;

/// Presented (portrait) dimensions.
pub const DISPLAY_WIDTH: u32 = PANEL_HEIGHT;
pub const DISPLAY_HEIGHT: u32 = PANEL_WIDTH;
