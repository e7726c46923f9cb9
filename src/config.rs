//! Server configuration from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `GLBVIEW_BIND_ADDR` | `0.0.0.0` | Interface both listeners bind to |
//! | `SOCKET_PORT` | `8000` | Websocket hub port |
//! | `HTTP_PORT` | `8001` | Scene file + static viewer port |
//! | `GLB_PATH` | `scene.glb` | Exported scene file |
//! | `STATIC_DIR` | `viewer/dist` | Built viewer served as the HTTP fallback |
//! | `EXPORT_COMMAND` | unset | Shell command that writes `GLB_PATH` |
//! | `CLIENT_BUFFER` | `256` | Outbound queue depth per websocket client |

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use wire::{DEFAULT_HTTP_PORT, DEFAULT_SOCKET_PORT};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
    #[error("SOCKET_PORT and HTTP_PORT must differ (both are {0})")]
    PortClash(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub socket_port: u16,
    pub http_port: u16,
    pub glb_path: PathBuf,
    pub static_dir: PathBuf,
    pub export_command: Option<String>,
    pub client_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            socket_port: DEFAULT_SOCKET_PORT,
            http_port: DEFAULT_HTTP_PORT,
            glb_path: PathBuf::from("scene.glb"),
            static_dir: PathBuf::from("viewer/dist"),
            export_command: None,
            client_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// Read the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unparsable values or clashing ports.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Blank values count as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unparsable values or clashing ports.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let config = Self {
            bind_addr: parse_or(var("GLBVIEW_BIND_ADDR"), "GLBVIEW_BIND_ADDR", defaults.bind_addr)?,
            socket_port: parse_or(var("SOCKET_PORT"), "SOCKET_PORT", defaults.socket_port)?,
            http_port: parse_or(var("HTTP_PORT"), "HTTP_PORT", defaults.http_port)?,
            glb_path: var("GLB_PATH").map_or(defaults.glb_path, PathBuf::from),
            static_dir: var("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            export_command: var("EXPORT_COMMAND"),
            client_buffer: parse_or(var("CLIENT_BUFFER"), "CLIENT_BUFFER", defaults.client_buffer)?,
        };

        if config.client_buffer == 0 {
            return Err(ConfigError::Invalid {
                key: "CLIENT_BUFFER",
                value: "0".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if config.socket_port != 0 && config.socket_port == config.http_port {
            return Err(ConfigError::PortClash(config.socket_port));
        }
        Ok(config)
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.socket_port)
    }

    #[must_use]
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid { key, reason: e.to_string(), value }),
    }
}
