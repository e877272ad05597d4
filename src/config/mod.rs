// Configuration module entry point
// Loads configuration once at startup and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Environment variable that overrides `server.port`
pub const PORT_ENV: &str = "PORT";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, the optional file,
    /// `SONGBOX_*` variables (`SONGBOX_SERVER__HOST`), then `PORT`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SONGBOX")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var(PORT_ENV).ok())?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn missing_file() -> String {
        let dir = std::env::temp_dir().join("songbox-no-such-config");
        dir.to_string_lossy().into_owned()
    }

    #[test]
    fn test_defaults() {
        let _lock = env_lock();
        std::env::remove_var(PORT_ENV);

        let cfg = Config::load_from(&missing_file()).unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.uploads_dir, "uploads");
        assert_eq!(cfg.storage.max_file_size, 52_428_800);
        assert!(cfg.http.max_body_size > cfg.storage.max_file_size);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_port_env_overrides_default() {
        let _lock = env_lock();
        std::env::set_var(PORT_ENV, "8123");
        let cfg = Config::load_from(&missing_file());
        std::env::remove_var(PORT_ENV);

        assert_eq!(cfg.unwrap().server.port, 8123);
    }

    #[test]
    fn test_file_values_are_applied() {
        let _lock = env_lock();
        std::env::remove_var(PORT_ENV);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songbox.toml");
        std::fs::write(
            &path,
            "[server]\nport = 4000\n\n[storage]\nuploads_dir = \"/srv/music\"\n",
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.storage.uploads_dir, "/srv/music");
        // Untouched sections keep their defaults
        assert_eq!(cfg.storage.index_file, "static/index.html");
        assert!(cfg.logging.access_log);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 3001;
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:3001");

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
