//! Renderable surface contract.
//!
//! A surface receives two independent signals from the frame loop: a time
//! delta through [`RenderSurface::advance`] and a cadence trigger through
//! [`RenderSurface::draw`]. Pausing withholds the first and never the second.

mod clock;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub use clock::RenderClock;

/// Shared handle to a surface.
///
/// The host creates the surface and keeps a handle; the frame loop holds a
/// clone, so the surface stays alive for as long as anything can still tick it.
pub type SharedSurface<S> = Rc<RefCell<S>>;

pub fn share<S>(surface: S) -> SharedSurface<S> {
    Rc::new(RefCell::new(surface))
}

/// Something the frame loop can advance and draw.
pub trait RenderSurface {
    /// Accumulated time the surface has been advanced by.
    fn render_duration(&self) -> Duration;

    /// Advances the surface's own clock by `dt`.
    fn advance(&mut self, dt: Duration);

    /// Draws one frame using the current render duration.
    fn draw(&mut self);

    /// Called when the drawable area changes size, in physical pixels.
    fn resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Returns true once the surface can no longer present (e.g. device lost).
    ///
    /// The runtime shuts the loop down when this becomes true.
    fn is_lost(&self) -> bool {
        false
    }
}
