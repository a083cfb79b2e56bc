//! Configuration for the slate host.

use std::path::Path;

use serde::{Deserialize, Serialize};
use slate_core::{CANVAS_HEIGHT, CANVAS_WIDTH, DEFAULT_MAX_FRAME_LEN, LinkOptions, Raster, Rgb};
use slate_core::network::DEFAULT_WRITER_QUEUE;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Drawing surface.
    pub canvas: CanvasConfig,
    /// Wire protocol limits.
    pub protocol: ProtocolConfig,
    /// Operator console defaults.
    pub console: ConsoleConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the acceptor binds (IP:port).
    pub bind_address: String,
}

/// Canvas settings. Clients must use the same values to converge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Colour token the surface is cleared to.
    pub background: String,
}

/// Protocol limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Largest accepted inbound frame in bytes. 0 disables the limit.
    pub max_frame_bytes: usize,
    /// Frames queued per client before it is considered stalled.
    pub writer_queue: usize,
}

/// Console defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub brush_color: String,
    pub eraser_color: String,
    pub brush_size: u32,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            canvas: CanvasConfig::default(),
            protocol: ProtocolConfig::default(),
            console: ConsoleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:12345".into(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            background: "white".into(),
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_LEN,
            writer_queue: DEFAULT_WRITER_QUEUE,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            brush_color: "black".into(),
            eraser_color: "white".into(),
            brush_size: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl HostConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Per-connection settings for the acceptor.
    pub fn link_options(&self) -> LinkOptions {
        LinkOptions {
            max_frame_len: match self.protocol.max_frame_bytes {
                0 => None,
                n => Some(n),
            },
            writer_queue: self.protocol.writer_queue.max(1),
        }
    }

    /// A blank host raster per the canvas settings.
    pub fn new_raster(&self) -> Raster {
        let background = Rgb::parse(&self.canvas.background).unwrap_or_else(|| {
            tracing::warn!(
                "unknown canvas background {:?}; using white",
                self.canvas.background
            );
            Rgb::WHITE
        });
        Raster::new(self.canvas.width.max(1), self.canvas.height.max(1), background)
    }
}

// ── Tests ────────────────────────────────────────────────────────
