//! Packed panel framebuffer producer.
//!
//! The device-core side of the shell's contract: a native-landscape
//! (800x480) 1-bit buffer drawn through portrait coordinates, packed
//! exactly as the panel expects (MSB first, 1 = white). The portrait
//! transpose here is the inverse of the compositor's view rotation, so a
//! pixel drawn at portrait (x, y) is presented at display (x, y).
//!
//! The simulators use this as a stand-in core to generate frames; tests
//! use it to build synthetic panel memory.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH, PANEL_BUFFER_SIZE, PANEL_WIDTH, PANEL_WIDTH_BYTES};

/// 1-bit native-landscape frame, drawable in portrait coordinates.
pub struct PanelFrame {
    buffer: Vec<u8>,
}

impl PanelFrame {
    /// New frame, cleared to white.
    pub fn new() -> Self {
        Self {
            buffer: vec![0xFF; PANEL_BUFFER_SIZE],
        }
    }

    /// Clear to white.
    pub fn clear(&mut self) {
        self.buffer.fill(0xFF);
    }

    /// Set a pixel in portrait coordinates (x: 0..480, y: 0..800).
    /// `BinaryColor::On` is ink (black), `Off` is white.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return;
        }

        // Inverse of the view rotation: portrait (x, y) lives at native
        // column (799 - y), row x.
        let native_x = (PANEL_WIDTH - 1) - y;
        let native_y = x;

        let byte_index = native_y as usize * PANEL_WIDTH_BYTES + (native_x as usize / 8);
        let bit_index = 7 - (native_x % 8); // MSB first

        match color {
            BinaryColor::On => self.buffer[byte_index] &= !(1 << bit_index),
            BinaryColor::Off => self.buffer[byte_index] |= 1 << bit_index,
        }
    }

    /// Raw packed buffer in native 800x480 orientation.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for PanelFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawTarget for PanelFrame {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color);
            }
        }
        Ok(())
    }
}

impl OriginDimensions for PanelFrame {
    fn size(&self) -> Size {
        // Callers draw in portrait; the packed buffer stays native.
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::compose_mono;
    use crate::plane::{PanelPlane, MONO_BLACK, MONO_WHITE};
    use crate::{PANEL_HEIGHT, PANEL_WIDTH};

    #[test]
    fn buffer_size_and_default_white() {
        let frame = PanelFrame::new();
        assert_eq!(frame.buffer().len(), 48000); // 800 * 480 / 8
        assert!(frame.buffer().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn portrait_origin_lands_at_native_right_edge() {
        let mut frame = PanelFrame::new();
        frame.set_pixel(0, 0, BinaryColor::On);
        // native_x = 799, native_y = 0 -> last byte of row 0, LSB position.
        assert_eq!(frame.buffer()[99], 0xFE);
    }

    #[test]
    fn round_trip_through_compositor() {
        // A pixel drawn in portrait must be presented at the same
        // portrait position after the view rotation.
        let mut frame = PanelFrame::new();
        for &(x, y) in &[(0u32, 0u32), (479, 0), (0, 799), (479, 799), (123, 456)] {
            frame.clear();
            frame.set_pixel(x, y, BinaryColor::On);
            let plane = PanelPlane::new(frame.buffer(), PANEL_WIDTH, PANEL_HEIGHT);
            let raster = compose_mono(&plane);
            assert_eq!(raster.gray_at(x, y), MONO_BLACK, "pixel ({x},{y})");
            // Everything else stayed white; spot-check the origin.
            if (x, y) != (0, 0) {
                assert_eq!(raster.gray_at(0, 0), MONO_WHITE);
            }
        }
    }

    #[test]
    fn out_of_bounds_draw_is_ignored() {
        let mut frame = PanelFrame::new();
        frame.set_pixel(480, 0, BinaryColor::On);
        frame.set_pixel(0, 800, BinaryColor::On);
        assert!(frame.buffer().iter().all(|&b| b == 0xFF));
    }
}
