//! Replicated drawing commands.
//!
//! A [`Command`] is a closed tagged variant: it is decoded once at the
//! wire boundary and every consumer matches it exhaustively. The serde
//! representation is the wire format, an object whose `"action"` field
//! carries the variant tag:
//!
//! ```text
//! {"action":"line","x1":0.0,"y1":0.0,"x2":10.0,"y2":10.0,"color":"black","width":2}
//! {"action":"clear"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SlateError;
use crate::render::Renderer;

// ── Command ──────────────────────────────────────────────────────

/// One atomic drawing operation.
///
/// Commands carry no identity or sequence number; their order is the
/// order in which they arrive on a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Command {
    /// A straight stroke from `(x1, y1)` to `(x2, y2)`.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
        width: u32,
    },
    /// An axis-aligned rectangle outline spanning the two corners.
    Rectangle {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
        width: u32,
    },
    /// An ellipse outline inscribed in the bounding box.
    Oval {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
        width: u32,
    },
    /// A text label anchored at `(x, y)`.
    Text {
        x: f64,
        y: f64,
        text: String,
        color: String,
        size: u32,
    },
    /// Wipe the surface back to blank.
    Clear,
}

impl Command {
    /// The wire tag of this command.
    pub fn action(&self) -> &'static str {
        match self {
            Command::Line { .. } => "line",
            Command::Rectangle { .. } => "rectangle",
            Command::Oval { .. } => "oval",
            Command::Text { .. } => "text",
            Command::Clear => "clear",
        }
    }

    /// Check the invariants serde cannot express: finite coordinates and
    /// a strictly positive width or size.
    pub fn validate(&self) -> Result<(), SlateError> {
        let (coords, thickness): (&[f64], u32) = match self {
            Command::Line {
                x1, y1, x2, y2, width, ..
            }
            | Command::Rectangle {
                x1, y1, x2, y2, width, ..
            }
            | Command::Oval {
                x1, y1, x2, y2, width, ..
            } => (&[*x1, *y1, *x2, *y2], *width),
            Command::Text { x, y, size, .. } => (&[*x, *y], *size),
            Command::Clear => return Ok(()),
        };

        if coords.iter().any(|c| !c.is_finite()) {
            return Err(SlateError::MalformedCommand(format!(
                "{}: coordinates must be finite",
                self.action()
            )));
        }
        if thickness == 0 {
            return Err(SlateError::MalformedCommand(format!(
                "{}: width/size must be positive",
                self.action()
            )));
        }
        Ok(())
    }

    /// Apply this command to a renderer.
    pub fn apply<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        match self {
            Command::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => renderer.draw_line((*x1, *y1), (*x2, *y2), color, *width),
            Command::Rectangle {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => renderer.draw_rectangle((*x1, *y1), (*x2, *y2), color, *width),
            Command::Oval {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => renderer.draw_oval((*x1, *y1), (*x2, *y2), color, *width),
            Command::Text {
                x,
                y,
                text,
                color,
                size,
            } => renderer.draw_text((*x, *y), text, color, *size),
            Command::Clear => renderer.clear_surface(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            }
            | Command::Rectangle {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            }
            | Command::Oval {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => write!(
                f,
                "{} ({x1},{y1})->({x2},{y2}) {color} w={width}",
                self.action()
            ),
            Command::Text {
                x,
                y,
                text,
                color,
                size,
            } => write!(f, "text ({x},{y}) {text:?} {color} s={size}"),
            Command::Clear => write!(f, "clear"),
        }
    }
}
