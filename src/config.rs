//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key has a default, so an empty
//! environment starts a working server on port 3000.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (`HOST`:`PORT`).
    pub listen_addr: SocketAddr,

    /// Directory served for static assets.
    pub static_dir: PathBuf,

    /// Page served at `/`, relative to `static_dir`.
    pub index_file: PathBuf,

    /// Optional cap on submitted message size in bytes. `None` accepts
    /// any length.
    pub max_message_bytes: Option<usize>,

    /// Interval between SSE keep-alive comments. `None` disables them.
    pub sse_keep_alive: Option<Duration>,

    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOST` or `PORT` is set but cannot be parsed.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOST` or `PORT` is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host: IpAddr = lookup("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()?;
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse()?,
            None => DEFAULT_PORT,
        };

        let static_dir = lookup("STATIC_DIR").map_or_else(|| PathBuf::from("public"), PathBuf::from);
        let index_file =
            lookup("INDEX_FILE").map_or_else(|| PathBuf::from("chat.html"), PathBuf::from);

        let max_message_bytes = parse_value(&lookup, "MAX_MESSAGE_BYTES");
        let keep_alive_secs: u64 = parse_value(&lookup, "SSE_KEEP_ALIVE_SECS").unwrap_or(15);
        let sse_keep_alive = (keep_alive_secs > 0).then(|| Duration::from_secs(keep_alive_secs));

        let log_json = matches!(
            lookup("LOG_FORMAT").as_deref().map(str::trim),
            Some("json" | "JSON")
        );

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            static_dir,
            index_file,
            max_message_bytes,
            sse_keep_alive,
            log_json,
        })
    }

    /// Full path of the index page.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join(&self.index_file)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            static_dir: PathBuf::from("public"),
            index_file: PathBuf::from("chat.html"),
            max_message_bytes: None,
            sse_keep_alive: Some(Duration::from_secs(15)),
            log_json: false,
        }
    }
}

/// Parses a value as `T`, returning `None` on missing or invalid input.
fn parse_value<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
