//! Scenario tests for the decode-and-rotate render path.

use crosspoint_scenario_harness::ShellHarness;
use crosspoint_shell::{
    RefreshMode, DISPLAY_HEIGHT, DISPLAY_WIDTH, FLASH_DURATION_MS, GRAY_LEVELS, MONO_BLACK,
    MONO_WHITE, PANEL_BUFFER_SIZE, PANEL_HEIGHT, PANEL_WIDTH, STATUS_SLEEPING,
};

#[test]
fn all_white_panel_renders_full_portrait_raster() {
    let mut harness = ShellHarness::new();
    let buffer = vec![0xFFu8; PANEL_BUFFER_SIZE];
    harness.render_mono(&buffer, PANEL_WIDTH, PANEL_HEIGHT, RefreshMode::Fast);

    let raster = harness.surface().last_frame().unwrap();
    assert_eq!(raster.width(), DISPLAY_WIDTH);
    assert_eq!(raster.height(), DISPLAY_HEIGHT);
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            assert_eq!(raster.gray_at(x, y), MONO_WHITE);
            assert_eq!(raster.alpha_at(x, y), 0xFF);
        }
    }
}

#[test]
fn single_msb_pixel_rotates_to_bottom_of_first_column() {
    // width=8, height=1, MSB set: native (0,0) is white; the rotated
    // raster is 1x8 with the white pixel at (0,7) and black above it.
    let mut harness = ShellHarness::new();
    harness.render_mono(&[0b1000_0000], 8, 1, RefreshMode::Fast);

    let raster = harness.surface().last_frame().unwrap();
    assert_eq!((raster.width(), raster.height()), (1, 8));
    assert_eq!(raster.gray_at(0, 7), MONO_WHITE);
    for y in 0..7 {
        assert_eq!(raster.gray_at(0, y), MONO_BLACK);
    }
}

#[test]
fn every_destination_pixel_written_exactly_once() {
    // The raster starts transparent, so alpha-255 everywhere proves full
    // coverage; the white count matching the buffer's set bits proves no
    // conflicting overwrite.
    let mut harness = ShellHarness::new();
    let buffer: Vec<u8> = (0..PANEL_BUFFER_SIZE).map(|i| (i % 251) as u8).collect();
    let set_bits: u32 = buffer.iter().map(|b| b.count_ones()).sum();

    harness.render_mono(&buffer, PANEL_WIDTH, PANEL_HEIGHT, RefreshMode::Fast);

    let raster = harness.surface().last_frame().unwrap();
    let mut white = 0u32;
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            assert_eq!(raster.alpha_at(x, y), 0xFF, "unwritten pixel at ({x},{y})");
            let gray = raster.gray_at(x, y);
            assert!(gray == MONO_WHITE || gray == MONO_BLACK);
            if gray == MONO_WHITE {
                white += 1;
            }
        }
    }
    assert_eq!(white, set_bits);
}

#[test]
fn full_refresh_flashes_once_others_do_not() {
    let mut harness = ShellHarness::new();
    let buffer = vec![0xFFu8; 100];

    harness.render_mono(&buffer, 80, 10, RefreshMode::Fast);
    assert!(harness.surface().flash_requests().is_empty());

    harness.render_mono(&buffer, 80, 10, RefreshMode::Half);
    assert!(harness.surface().flash_requests().is_empty());

    harness.render_mono(&buffer, 80, 10, RefreshMode::Full);
    assert_eq!(harness.surface().flash_requests(), &[FLASH_DURATION_MS]);
    assert!(harness.surface().flash_active());

    // The revert is deferred; a new render does not cancel it.
    harness.render_mono(&buffer, 80, 10, RefreshMode::Fast);
    assert!(harness.surface().flash_active());
    harness.surface_mut().expire_flash();
    assert!(!harness.surface().flash_active());
    assert_eq!(harness.surface().flash_requests().len(), 1);
}

#[test]
fn grayscale_ramp_levels_are_monotonic() {
    // Two one-row planes exercising levels 0..=3 across four pixel pairs.
    let lsb = [0b0101_0011u8];
    let msb = [0b0011_0101u8];
    let mut harness = ShellHarness::new();
    harness.render_gray(&lsb, &msb, 8, 1);

    let raster = harness.surface().last_frame().unwrap();
    // Native x maps to display (0, 7 - x).
    let levels: Vec<u8> = (0..8).map(|x| raster.gray_at(0, 7 - x)).collect();
    let expected: Vec<u8> = [0u8, 1, 2, 3, 0, 2, 1, 3]
        .iter()
        .map(|&l| GRAY_LEVELS[l as usize])
        .collect();
    assert_eq!(levels, expected);
    assert!(GRAY_LEVELS.windows(2).all(|w| w[0] < w[1]));
    // Grayscale renders never flash.
    assert!(harness.surface().flash_requests().is_empty());
}

#[test]
fn deep_sleep_blacks_out_display_and_updates_status() {
    let mut harness = ShellHarness::new();
    let buffer = vec![0xFFu8; PANEL_BUFFER_SIZE];
    harness.render_mono(&buffer, PANEL_WIDTH, PANEL_HEIGHT, RefreshMode::Fast);

    harness.sleep();

    let raster = harness.surface().last_frame().unwrap();
    assert_eq!(raster.width(), DISPLAY_WIDTH);
    assert_eq!(raster.height(), DISPLAY_HEIGHT);
    for y in (0..raster.height()).step_by(37) {
        for x in (0..raster.width()).step_by(23) {
            assert_eq!(raster.gray_at(x, y), 0x00);
        }
    }
    assert_eq!(harness.surface().status(), Some(STATUS_SLEEPING));
}

#[test]
fn startup_notification_sets_running_status() {
    let mut harness = ShellHarness::new();
    harness.ready();
    assert_eq!(harness.surface().status(), Some("Simulator running"));
}

#[test]
fn screenshot_roundtrip_writes_png() {
    let mut harness = ShellHarness::new();
    harness.render_mono(&[0b1111_0000], 8, 1, RefreshMode::Fast);

    let path = std::env::temp_dir().join("crosspoint-harness-screenshot.png");
    let _ = std::fs::remove_file(&path);
    harness.save_screenshot_png(&path).unwrap();

    let meta = std::fs::metadata(&path).unwrap();
    assert!(meta.len() > 0);
    let _ = std::fs::remove_file(&path);
}
