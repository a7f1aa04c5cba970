//! Native-to-display coordinate rotation.
//!
//! The panel scans in landscape (800x480) but is mounted sideways in the
//! enclosure, so the presented image is the 90-degree counter-clockwise
//! rotation: a native column becomes a display row counted from the
//! bottom.

/// Map a native pixel `(x, y)` to its display position.
/// `width` is the native panel width. The map is a bijection from
/// `[0, width) x [0, height)` onto `[0, height) x [0, width)`.
#[inline]
pub fn rotate_ccw(x: u32, y: u32, width: u32) -> (u32, u32) {
    (y, (width - 1) - x)
}

/// Display dimensions for a native `(width, height)` panel.
#[inline]
pub fn rotated_size(width: u32, height: u32) -> (u32, u32) {
    (height, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn corners() {
        // 800x480 native panel.
        assert_eq!(rotate_ccw(0, 0, 800), (0, 799));
        assert_eq!(rotate_ccw(799, 0, 800), (0, 0));
        assert_eq!(rotate_ccw(0, 479, 800), (479, 799));
        assert_eq!(rotate_ccw(799, 479, 800), (479, 0));
    }

    #[test]
    fn bijective_over_native_rectangle() {
        let (width, height) = (32u32, 24u32);
        let (dw, dh) = rotated_size(width, height);
        let mut seen = vec![false; (dw * dh) as usize];
        for y in 0..height {
            for x in 0..width {
                let (dx, dy) = rotate_ccw(x, y, width);
                assert!(dx < dw && dy < dh);
                let index = (dy * dw + dx) as usize;
                assert!(!seen[index], "({x},{y}) collides at ({dx},{dy})");
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|&hit| hit));
    }
}
