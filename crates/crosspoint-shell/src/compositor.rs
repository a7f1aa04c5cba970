//! Frame composition: decode packed panel memory, rotate, and fill a
//! display raster.
//!
//! The walk is the same one the panel controller performs: rows, then
//! byte columns, then bit positions. Every native pixel maps to exactly
//! one display pixel, so the raster is fully covered with no overdraw.

use crate::plane::{gray_level, mono_is_white, PanelPlane, GRAY_LEVELS, MONO_BLACK, MONO_WHITE};
use crate::raster::FrameRaster;
use crate::rotate::{rotate_ccw, rotated_size};

/// Compose a display raster from 1-bit panel memory.
pub fn compose_mono(plane: &PanelPlane<'_>) -> FrameRaster {
    let (display_w, display_h) = rotated_size(plane.width(), plane.height());
    let mut raster = FrameRaster::new(display_w, display_h);

    for y in 0..plane.height() {
        for x_byte in 0..plane.width_bytes() {
            let byte = plane.byte_at(y, x_byte);
            for bit in 0..8u8 {
                let x = x_byte as u32 * 8 + bit as u32;
                let (dx, dy) = rotate_ccw(x, y, plane.width());
                let gray = if mono_is_white(byte, bit) {
                    MONO_WHITE
                } else {
                    MONO_BLACK
                };
                raster.set_gray(dx, dy, gray);
            }
        }
    }

    raster
}

/// Compose a display raster from 2-bit panel memory (low + high planes).
/// Both planes must have identical dimensions.
pub fn compose_gray(low: &PanelPlane<'_>, high: &PanelPlane<'_>) -> FrameRaster {
    debug_assert!(low.width() == high.width() && low.height() == high.height());

    let (display_w, display_h) = rotated_size(low.width(), low.height());
    let mut raster = FrameRaster::new(display_w, display_h);

    for y in 0..low.height() {
        for x_byte in 0..low.width_bytes() {
            let lsb = low.byte_at(y, x_byte);
            let msb = high.byte_at(y, x_byte);
            for bit in 0..8u8 {
                let x = x_byte as u32 * 8 + bit as u32;
                let (dx, dy) = rotate_ccw(x, y, low.width());
                let level = gray_level(lsb, msb, bit);
                raster.set_gray(dx, dy, GRAY_LEVELS[level as usize]);
            }
        }
    }

    raster
}
