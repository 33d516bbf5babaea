// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig, StoreConfig,
};

/// Environment variable that overrides `server.port`
pub const PORT_ENV: &str = "PORT";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "site.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_port(config_path, std::env::var(PORT_ENV).ok())
    }

    /// Load configuration with an explicit port override
    ///
    /// The override is applied last, above the config file and `SITE_*`
    /// environment variables.
    pub fn load_with_port(
        config_path: &str,
        port: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SITE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("site.root", "public")?
            .set_default("site.index_file", "index.html")?
            .set_default("site.intake_path", "/api/intake")?
            .set_default("store.file", "data/intake.json")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "site-intake/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_override_option("server.port", port)?
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

    const MISSING: &str = "definitely-not-a-config-file";

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_with_port(MISSING, None).unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.site.root, std::path::PathBuf::from("public"));
        assert_eq!(cfg.site.index_file, "index.html");
        assert_eq!(cfg.site.intake_path, "/api/intake");
        assert_eq!(cfg.store.file, std::path::PathBuf::from("data/intake.json"));
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_port_override() {
        let cfg = Config::load_with_port(MISSING, Some("8181".to_string())).unwrap();
        assert_eq!(cfg.server.port, 8181);
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8181);
    }

    #[test]
    fn test_invalid_port_override_is_rejected() {
        assert!(Config::load_with_port(MISSING, Some("not-a-port".to_string())).is_err());
    }

    #[test]
    fn test_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(
            &path,
            "[server]\nport = 4100\n[site]\nroot = \"www\"\n[store]\nfile = \"var/leads.json\"\n",
        )
        .unwrap();

        let base = dir.path().join("site");
        let cfg = Config::load_with_port(base.to_str().unwrap(), None).unwrap();
        assert_eq!(cfg.server.port, 4100);
        assert_eq!(cfg.site.root, std::path::PathBuf::from("www"));
        assert_eq!(cfg.store.file, std::path::PathBuf::from("var/leads.json"));
        // untouched keys keep their defaults
        assert_eq!(cfg.site.index_file, "index.html");
    }
}
