//! Desktop SDL shell for the CrossPoint X4 emulator.
//!
//! Runs the decode-and-rotate engine against an SDL window, with a small
//! built-in demo core that produces packed panel buffers — useful for
//! eyeballing rotation, gray levels, and the full-refresh flash without
//! the real device core. An optional file argument is sideloaded into
//! `./sd/books/` through the ingestion bridge.

use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics_simulator::{
    sdl2::Keycode, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};

use crosspoint_shell::{
    Button, ButtonPort, FrameRaster, HostStorage, PanelFrame, PanelPlane, PresentationSurface,
    RefreshMode, ShellEngine, DISPLAY_HEIGHT, DISPLAY_WIDTH, PANEL_HEIGHT, PANEL_WIDTH,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_settings = OutputSettingsBuilder::new().scale(1).build();
    let display: SimulatorDisplay<Gray8> =
        SimulatorDisplay::new(Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT));
    let mut window = Window::new("CrossPoint X4", &output_settings);

    let mut engine = ShellEngine::new(SdlSurface::new(display));
    let mut core = DemoCore::new();

    // Sideload a book if one was given on the command line.
    if let Some(path) = std::env::args().nth(1) {
        sideload(&mut engine, &path);
    }

    engine.notify_ready();
    core.render(&mut engine, RefreshMode::Full);
    window.update(engine.surface().display());

    println!("CrossPoint X4 Simulator");
    println!("Controls:");
    println!("  Left/Right        - Cycle test screens (full refresh + flash)");
    println!("  Up/Down           - Pattern scale");
    println!("  Enter / Space     - Redraw (fast refresh)");
    println!("  P                 - Sleep / wake");
    println!("  Close window      - Quit");

    'running: loop {
        let events = window.events().collect::<Vec<_>>();

        for event in events {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => {
                    if let Some(button) = keycode_to_button(keycode) {
                        core.button_down(button);
                    }
                }
                SimulatorEvent::KeyUp { keycode, .. } => {
                    if let Some(button) = keycode_to_button(keycode) {
                        core.button_up(button);
                    }
                }
                _ => {}
            }
        }

        if let Some(mode) = core.take_pending_refresh() {
            core.render(&mut engine, mode);
        }
        engine.surface_mut().tick();
        window.update(engine.surface().display());

        std::thread::sleep(Duration::from_millis(15));
    }

    Ok(())
}

fn keycode_to_button(keycode: Keycode) -> Option<Button> {
    match keycode {
        Keycode::Escape | Keycode::Backspace => Some(Button::Back),
        Keycode::Return | Keycode::Space => Some(Button::Confirm),
        Keycode::Left => Some(Button::Left),
        Keycode::Right => Some(Button::Right),
        Keycode::Up => Some(Button::Up),
        Keycode::Down => Some(Button::Down),
        Keycode::P => Some(Button::Power),
        _ => None,
    }
}

fn sideload(engine: &mut ShellEngine<SdlSurface>, path: &str) {
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    engine.ingest_begin(&name);
    match std::fs::read(path) {
        Ok(bytes) => {
            let mut storage = HostStorage::new(".");
            let _ = engine.ingest_book(&mut storage, &name, &bytes);
        }
        Err(err) => {
            eprintln!("reading {path} failed: {err}");
            engine.ingest_failed();
        }
    }
}

/// SDL-window presentation surface. The flash overlay is a timed
/// inversion of the last presented raster.
struct SdlSurface {
    display: SimulatorDisplay<Gray8>,
    last: Option<FrameRaster>,
    flash_until: Option<Instant>,
}

impl SdlSurface {
    fn new(display: SimulatorDisplay<Gray8>) -> Self {
        Self {
            display,
            last: None,
            flash_until: None,
        }
    }

    fn display(&self) -> &SimulatorDisplay<Gray8> {
        &self.display
    }

    fn blit(&mut self, inverted: bool) {
        if let Some(raster) = &self.last {
            let pixels = raster.pixels().map(|Pixel(point, color)| {
                let luma = if inverted {
                    255 - color.luma()
                } else {
                    color.luma()
                };
                Pixel(point, Gray8::new(luma))
            });
            let _ = self.display.draw_iter(pixels);
        }
    }

    /// Revert the flash once its deadline passes.
    fn tick(&mut self) {
        if self.flash_until.is_some_and(|until| Instant::now() >= until) {
            self.flash_until = None;
            self.blit(false);
        }
    }
}

impl PresentationSurface for SdlSurface {
    fn present(&mut self, raster: &FrameRaster) {
        self.last = Some(raster.clone());
        let inverted = self.flash_until.is_some();
        self.blit(inverted);
    }

    fn flash(&mut self, duration_ms: u32) {
        self.flash_until = Some(Instant::now() + Duration::from_millis(duration_ms as u64));
        self.blit(true);
    }

    fn set_status(&mut self, status: &str) {
        println!("[STATUS] {status}");
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Screen {
    Checkerboard,
    Stripes,
    Rings,
    GrayRamp,
}

impl Screen {
    const ALL: [Screen; 4] = [
        Screen::Checkerboard,
        Screen::Stripes,
        Screen::Rings,
        Screen::GrayRamp,
    ];
}

/// Stand-in device core: draws test patterns into packed panel memory
/// and reacts to button signals the way the shell delivers them.
struct DemoCore {
    frame: PanelFrame,
    screen: usize,
    scale: u32,
    sleeping: bool,
    pending: Option<RefreshMode>,
}

impl DemoCore {
    fn new() -> Self {
        Self {
            frame: PanelFrame::new(),
            screen: 0,
            scale: 40,
            sleeping: false,
            pending: None,
        }
    }

    fn take_pending_refresh(&mut self) -> Option<RefreshMode> {
        self.pending.take()
    }

    fn render(&mut self, engine: &mut ShellEngine<SdlSurface>, mode: RefreshMode) {
        if self.sleeping {
            engine.notify_sleep();
            return;
        }
        match Screen::ALL[self.screen] {
            Screen::GrayRamp => {
                let (lsb, msb) = gray_ramp_planes();
                let low = PanelPlane::new(&lsb, PANEL_WIDTH, PANEL_HEIGHT);
                let high = PanelPlane::new(&msb, PANEL_WIDTH, PANEL_HEIGHT);
                engine.render_gray(&low, &high);
            }
            screen => {
                self.frame.clear();
                draw_screen(&mut self.frame, screen, self.scale);
                let plane = PanelPlane::new(self.frame.buffer(), PANEL_WIDTH, PANEL_HEIGHT);
                engine.render_mono(&plane, mode);
            }
        }
    }
}

impl ButtonPort for DemoCore {
    fn button_down(&mut self, button: Button) {
        match button {
            Button::Power => {
                self.sleeping = !self.sleeping;
                self.pending = Some(RefreshMode::Full);
            }
            _ if self.sleeping => {}
            Button::Left => {
                self.screen = (self.screen + Screen::ALL.len() - 1) % Screen::ALL.len();
                self.pending = Some(RefreshMode::Full);
            }
            Button::Right => {
                self.screen = (self.screen + 1) % Screen::ALL.len();
                self.pending = Some(RefreshMode::Full);
            }
            Button::Up => {
                self.scale = (self.scale * 2).min(160);
                self.pending = Some(RefreshMode::Fast);
            }
            Button::Down => {
                self.scale = (self.scale / 2).max(10);
                self.pending = Some(RefreshMode::Fast);
            }
            Button::Confirm => self.pending = Some(RefreshMode::Fast),
            Button::Back => {}
        }
    }

    fn button_up(&mut self, _button: Button) {
        // The demo core acts on press only.
    }
}

fn draw_screen(frame: &mut PanelFrame, screen: Screen, scale: u32) {
    let style = PrimitiveStyle::with_fill(embedded_graphics::pixelcolor::BinaryColor::On);
    match screen {
        Screen::Checkerboard => {
            for row in 0..DISPLAY_HEIGHT.div_ceil(scale) {
                for col in 0..DISPLAY_WIDTH.div_ceil(scale) {
                    if (row + col) % 2 == 0 {
                        let _ = Rectangle::new(
                            Point::new((col * scale) as i32, (row * scale) as i32),
                            Size::new(scale, scale),
                        )
                        .into_styled(style)
                        .draw(frame);
                    }
                }
            }
        }
        Screen::Stripes => {
            for row in 0..DISPLAY_HEIGHT.div_ceil(scale * 2) {
                let _ = Rectangle::new(
                    Point::new(0, (row * scale * 2) as i32),
                    Size::new(DISPLAY_WIDTH, scale),
                )
                .into_styled(style)
                .draw(frame);
            }
        }
        Screen::Rings => {
            let center = Point::new(DISPLAY_WIDTH as i32 / 2, DISPLAY_HEIGHT as i32 / 2);
            let mut diameter = scale;
            while diameter < DISPLAY_HEIGHT {
                let _ = Circle::with_center(center, diameter)
                    .into_styled(PrimitiveStyle::with_stroke(
                        embedded_graphics::pixelcolor::BinaryColor::On,
                        4,
                    ))
                    .draw(frame);
                diameter += scale;
            }
        }
        Screen::GrayRamp => {}
    }
}

/// Build the two packed planes of a horizontal 4-level gray ramp.
/// Level follows the native column, so the presented image shows the
/// ramp running down the portrait display.
fn gray_ramp_planes() -> (Vec<u8>, Vec<u8>) {
    let width_bytes = (PANEL_WIDTH / 8) as usize;
    let mut lsb = vec![0u8; width_bytes * PANEL_HEIGHT as usize];
    let mut msb = vec![0u8; width_bytes * PANEL_HEIGHT as usize];

    for y in 0..PANEL_HEIGHT {
        for x in 0..PANEL_WIDTH {
            let level = (x * 4 / PANEL_WIDTH) as u8;
            let index = y as usize * width_bytes + (x / 8) as usize;
            let bit = 7 - (x % 8);
            if level & 1 != 0 {
                lsb[index] |= 1 << bit;
            }
            if level & 2 != 0 {
                msb[index] |= 1 << bit;
            }
        }
    }

    (lsb, msb)
}
