//! Client configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use slate_core::{CANVAS_HEIGHT, CANVAS_WIDTH, CommandCodec, DEFAULT_MAX_FRAME_LEN, Raster, Rgb};

/// Top-level configuration for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Local replica settings. Must match the host's canvas.
    pub canvas: CanvasConfig,
    /// Protocol limits.
    pub protocol: ProtocolConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Host address (IP:port or name:port).
    pub host_address: String,
    /// Connection timeout in milliseconds.
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Largest accepted frame in bytes. 0 disables the limit.
    pub max_frame_bytes: usize,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            canvas: CanvasConfig::default(),
            protocol: ProtocolConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host_address: "127.0.0.1:12345".into(),
            timeout_ms: 5000,
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

impl ClientConfig {
    /// Load from a TOML file, falling back to defaults.
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

    /// Codec honouring the configured frame limit.
    pub fn codec(&self) -> CommandCodec {
        CommandCodec::with_max_frame_len(match self.protocol.max_frame_bytes {
            0 => None,
            n => Some(n),
        })
    }

    /// A blank replica per the canvas settings.
    pub fn new_raster(&self) -> Raster {
        let background = Rgb::parse(&self.canvas.background).unwrap_or(Rgb::WHITE);
        Raster::new(self.canvas.width.max(1), self.canvas.height.max(1), background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips() {
        let text = toml::to_string_pretty(&ClientConfig::default()).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.network.host_address, "127.0.0.1:12345");
        assert_eq!(parsed.protocol.max_frame_bytes, DEFAULT_MAX_FRAME_LEN);
    }

    #[test]
    fn zero_frame_limit_means_unbounded() {
        let parsed: ClientConfig = toml::from_str("[protocol]\nmax_frame_bytes = 0\n").unwrap();
        assert_eq!(parsed.codec().max_frame_len(), None);
        assert_eq!(parsed.network.timeout_ms, 5000);
    }

    #[test]
    fn config_file_loads_back() {
        let path = std::env::temp_dir().join(format!("slate-client-{}.toml", std::process::id()));
        std::fs::write(&path, toml::to_string_pretty(&ClientConfig::default()).unwrap()).unwrap();
        let loaded = ClientConfig::load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.network.host_address, "127.0.0.1:12345");
    }

    #[test]
    fn replica_defaults_to_blank_canvas() {
        assert_eq!(ClientConfig::default().new_raster(), Raster::blank());
    }
}
