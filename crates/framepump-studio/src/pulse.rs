use std::time::Duration;

use anyhow::Result;
use winit::window::Window;

use framepump_engine::device::{GpuInit, SurfaceErrorAction, WindowGpu};
use framepump_engine::surface::{RenderClock, RenderSurface};

/// Seconds for one full trip around the hue wheel.
const HUE_PERIOD: f32 = 12.0;

const SUMMARY_EVERY: u64 = 300;

/// Clears the window to a color that cycles with render time.
///
/// While the loop is paused the color holds still, but frames keep being
/// presented at the tick rate.
pub struct PulseSurface {
    gpu: WindowGpu,
    clock: RenderClock,
    frames: u64,
    skipped: u64,
    lost: bool,
}

impl PulseSurface {
    pub fn new(window: Window, init: GpuInit) -> Result<Self> {
        let gpu = WindowGpu::create(window, init)?;
        Ok(Self {
            gpu,
            clock: RenderClock::new(),
            frames: 0,
            skipped: 0,
            lost: false,
        })
    }
}

impl RenderSurface for PulseSurface {
    fn render_duration(&self) -> Duration {
        self.clock.elapsed()
    }

    fn advance(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    fn draw(&mut self) {
        if self.lost {
            return;
        }

        self.frames += 1;
        match self.gpu.clear(pulse_color(self.clock.as_secs_f32())) {
            Ok(()) => {}
            Err(SurfaceErrorAction::Fatal) => {
                log::error!("surface out of memory after {} frames", self.frames);
                self.lost = true;
            }
            Err(action) => {
                self.skipped += 1;
                log::trace!("frame {} not presented: {action:?}", self.frames);
            }
        }

        if self.frames % SUMMARY_EVERY == 0 {
            log::debug!(
                "{} frames ({} skipped), render time {:.2}s",
                self.frames,
                self.skipped,
                self.clock.as_secs_f32(),
            );
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(winit::dpi::PhysicalSize::new(width, height));
    }

    fn is_lost(&self) -> bool {
        self.lost
    }
}

/// Background color at render time `t` seconds.
pub fn pulse_color(t: f32) -> wgpu::Color {
    let hue = (t / HUE_PERIOD).rem_euclid(1.0);
    let (r, g, b) = hsv_to_rgb(hue, 0.55, 0.85);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

/// `h`, `s`, `v` in `[0, 1]`.
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let h6 = h * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32, f32), b: (f32, f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5 && (a.2 - b.2).abs() < 1e-5
    }

    #[test]
    fn primary_hues() {
        assert!(close(hsv_to_rgb(0.0, 1.0, 1.0), (1.0, 0.0, 0.0)));
        assert!(close(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), (0.0, 1.0, 0.0)));
        assert!(close(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), (0.0, 0.0, 1.0)));
    }

    #[test]
    fn zero_saturation_is_grey() {
        assert!(close(hsv_to_rgb(0.4, 0.0, 0.5), (0.5, 0.5, 0.5)));
    }

    #[test]
    fn color_repeats_every_period() {
        let a = pulse_color(1.5);
        let b = pulse_color(1.5 + HUE_PERIOD);
        assert!((a.r - b.r).abs() < 1e-4);
        assert!((a.g - b.g).abs() < 1e-4);
        assert!((a.b - b.b).abs() < 1e-4);
    }

    #[test]
    fn color_changes_with_time() {
        assert_ne!(pulse_color(0.0), pulse_color(HUE_PERIOD / 4.0));
    }
}
