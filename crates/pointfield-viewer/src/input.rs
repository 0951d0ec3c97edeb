//! Host-side inputs for the animator: pointer position and frame clock.

use std::time::{Duration, Instant};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;

/// Converts a cursor position in physical pixels to NDC (`x` right, `y` up).
pub fn cursor_to_ndc(pos: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> [f32; 2] {
    let w = size.width.max(1) as f64;
    let h = size.height.max(1) as f64;
    let x = (pos.x / w) * 2.0 - 1.0;
    let y = -((pos.y / h) * 2.0 - 1.0);
    [x.clamp(-1.0, 1.0) as f32, y.clamp(-1.0, 1.0) as f32]
}

/// Latest known pointer position. Reports `(0, 0)` until the cursor is first
/// seen over the window and keeps the last value after it leaves.
#[derive(Debug, Default)]
pub struct PointerTracker {
    ndc: [f32; 2],
    size: PhysicalSize<u32>,
}

impl PointerTracker {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self { ndc: [0.0; 2], size }
    }

    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => self.size = *size,
            WindowEvent::CursorMoved { position, .. } => {
                self.ndc = cursor_to_ndc(*position, self.size);
            }
            _ => {}
        }
    }

    pub fn ndc(&self) -> [f32; 2] {
        self.ndc
    }
}

/// Elapsed-time source plus a smoothed frame rate for the overlay.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            fps: 0.0,
        }
    }

    /// Restarts the animation clock, e.g. after the field was rebuilt.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    /// Marks a new frame and returns the seconds elapsed since start.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        self.record(now.duration_since(self.last));
        self.last = now;
        now.duration_since(self.start).as_secs_f64()
    }

    fn record(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();
        if dt <= 0.0 {
            return;
        }
        let inst = 1.0 / dt;
        self.fps = if self.fps == 0.0 {
            inst
        } else {
            self.fps + (inst - self.fps) * 0.05
        };
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
