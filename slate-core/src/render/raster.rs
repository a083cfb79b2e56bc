//! Deterministic software raster.
//!
//! Every replica runs the same pipeline, so identical command
//! sequences produce identical pixels on the host and on every client.
//! Fractional coordinates are rounded to the nearest pixel once, at the
//! start of each primitive.

use tracing::debug;

use super::{Renderer, Rgb};

/// Canonical surface width in pixels.
pub const CANVAS_WIDTH: u32 = 1024;
/// Canonical surface height in pixels.
pub const CANVAS_HEIGHT: u32 = 600;

/// A fixed-size RGB pixel surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    background: Rgb,
    /// Row-major, `width * height` entries.
    pixels: Vec<Rgb>,
}

impl Raster {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self {
            width,
            height,
            background,
            pixels: vec![background; width as usize * height as usize],
        }
    }

    /// A blank white surface of the canonical size.
    pub fn blank() -> Self {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT, Rgb::WHITE)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    /// The pixel at `(x, y)`, or `None` when off-surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Number of pixels currently holding `color`.
    pub fn count(&self, color: Rgb) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| *p == self.background)
    }

    /// blake3 digest of the surface, hex encoded.
    ///
    /// Two replicas hold the same image exactly when their fingerprints
    /// match.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.width.to_le_bytes());
        hasher.update(&self.height.to_le_bytes());
        for Rgb(r, g, b) in &self.pixels {
            hasher.update(&[*r, *g, *b]);
        }
        hasher.finalize().to_hex().to_string()
    }

    // ── Pixel helpers ────────────────────────────────────────────

    fn resolve(color: &str) -> Rgb {
        Rgb::parse(color).unwrap_or_else(|| {
            debug!("unknown colour {color:?}, drawing in black");
            Rgb::BLACK
        })
    }

    /// Fill the inclusive rectangle `[x0, x1] × [y0, y1]`, clipped.
    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        let max_x = self.width as i64 - 1;
        let max_y = self.height as i64 - 1;
        let (x0, x1) = (x0.max(0), x1.min(max_x));
        let (y0, y1) = (y0.max(0), y1.min(max_y));
        if x0 > x1 || y0 > y1 {
            return;
        }
        let stride = self.width as usize;
        for y in y0..=y1 {
            let row = y as usize * stride;
            self.pixels[row + x0 as usize..=row + x1 as usize].fill(color);
        }
    }
}

impl Default for Raster {
    fn default() -> Self {
        Self::blank()
    }
}

impl Renderer for Raster {
    /// A square brush of side `width` swept from `from` to `to`.
    ///
    /// Filled one surface row at a time, so the cost is bounded by the
    /// surface area whatever the width or the endpoints.
    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: &str, width: u32) {
        let color = Self::resolve(color);
        let w = width as i64;
        let (lo, hi) = ((w - 1) / 2, w / 2);
        let (x0, y0) = (round(from.0) as f64, round(from.1) as f64);
        let (x1, y1) = (round(to.0) as f64, round(to.1) as f64);

        for row in 0..self.height as i64 {
            // Brush centres whose square reaches this row.
            let (band_top, band_bottom) = ((row - hi) as f64, (row + lo) as f64);
            let (t0, t1) = if y0 == y1 {
                if y0 < band_top || y0 > band_bottom {
                    continue;
                }
                (0.0, 1.0)
            } else {
                let ta = (band_top - y0) / (y1 - y0);
                let tb = (band_bottom - y0) / (y1 - y0);
                let (ta, tb) = (ta.min(tb).max(0.0), ta.max(tb).min(1.0));
                if ta > tb {
                    continue;
                }
                (ta, tb)
            };

            let xa = x0 + t0 * (x1 - x0);
            let xb = x0 + t1 * (x1 - x0);
            let left = round(xa.min(xb)) - lo;
            let right = round(xa.max(xb)) + hi;
            self.fill_rect(left, row, right, row, color);
        }
    }

    fn draw_rectangle(&mut self, corner: (f64, f64), opposite: (f64, f64), color: &str, width: u32) {
        let color = Self::resolve(color);
        let (x0, y0, x1, y1) = bounding_box(corner, opposite);
        let w = width as i64;

        self.fill_rect(x0, y0, x1, (y0 + w - 1).min(y1), color);
        self.fill_rect(x0, (y1 - w + 1).max(y0), x1, y1, color);
        self.fill_rect(x0, y0, (x0 + w - 1).min(x1), y1, color);
        self.fill_rect((x1 - w + 1).max(x0), y0, x1, y1, color);
    }

    fn draw_oval(&mut self, corner: (f64, f64), opposite: (f64, f64), color: &str, width: u32) {
        let color = Self::resolve(color);
        let (x0, y0, x1, y1) = bounding_box(corner, opposite);

        let cx = (x0 + x1) as f64 / 2.0;
        let cy = (y0 + y1) as f64 / 2.0;
        let a = (x1 - x0) as f64 / 2.0 + 0.5;
        let b = (y1 - y0) as f64 / 2.0 + 0.5;
        let ai = a - width as f64;
        let bi = b - width as f64;
        let has_hole = ai > 0.0 && bi > 0.0;

        let (sx0, sx1) = (x0.max(0), x1.min(self.width as i64 - 1));
        let (sy0, sy1) = (y0.max(0), y1.min(self.height as i64 - 1));
        let stride = self.width as usize;
        for y in sy0..=sy1 {
            let py = y as f64 - cy;
            for x in sx0..=sx1 {
                let px = x as f64 - cx;
                let outer = (px / a).powi(2) + (py / b).powi(2) <= 1.0;
                let inner = has_hole && (px / ai).powi(2) + (py / bi).powi(2) < 1.0;
                if outer && !inner {
                    self.pixels[y as usize * stride + x as usize] = color;
                }
            }
        }
    }

    /// There is no font engine behind the raster: each visible glyph is
    /// a solid cell `size` pixels tall, anchored top-left at `anchor`.
    fn draw_text(&mut self, anchor: (f64, f64), text: &str, color: &str, size: u32) {
        let color = Self::resolve(color);
        let size = size as i64;
        let cell = (size * 3 / 5).max(1);
        let gap = (size / 5).max(1);

        let (left, top) = (round(anchor.0), round(anchor.1));
        let (mut pen_x, mut pen_y) = (left, top);
        for c in text.chars() {
            if c == '\n' {
                pen_x = left;
                pen_y = pen_y.saturating_add(size + gap);
                continue;
            }
            if !c.is_whitespace() {
                self.fill_rect(pen_x, pen_y, pen_x + cell - 1, pen_y + size - 1, color);
            }
            pen_x = pen_x.saturating_add(cell + gap);
        }
    }

    fn clear_surface(&mut self) {
        self.pixels.fill(self.background);
    }
}

// ── Geometry ─────────────────────────────────────────────────────

/// Far enough off-surface to clip everything, small enough that pixel
/// arithmetic never overflows.
const COORD_LIMIT: f64 = 1e12;

fn round(v: f64) -> i64 {
    v.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i64
}

/// Normalised inclusive pixel bounds of two corners.
fn bounding_box(a: (f64, f64), b: (f64, f64)) -> (i64, i64, i64, i64) {
    let (ax, ay, bx, by) = (round(a.0), round(a.1), round(b.0), round(b.1));
    (ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
}
