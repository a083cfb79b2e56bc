//! Renderer seam and the software raster that implements it.
//!
//! The protocol only ever talks to a [`Renderer`]. Every replica (the
//! host and each client) owns exactly one [`Raster`], and only one task
//! ever mutates it, so no lock guards the pixels.

mod color;
mod raster;

pub use color::Rgb;
pub use raster::{CANVAS_HEIGHT, CANVAS_WIDTH, Raster};

/// Primitive drawing surface consumed by [`crate::Command::apply`].
///
/// Coordinates are surface-local and unbounded; implementations clip.
/// `color` is an opaque token the renderer resolves on its own.
pub trait Renderer {
    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: u32);

    fn draw_rectangle(&mut self, corner: (f64, f64), opposite: (f64, f64), color: &str, width: u32);

    fn draw_oval(&mut self, corner: (f64, f64), opposite: (f64, f64), color: &str, width: u32);

    fn draw_text(&mut self, anchor: (f64, f64), text: &str, color: &str, size: u32);

    /// Reset to a blank surface of the canonical size.
    fn clear_surface(&mut self);
}
