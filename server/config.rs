use std::path::PathBuf;
use tracing::Level;

pub const ENV_ADDR: &str = "FEATURE_VIZ_ADDR";
pub const ENV_UPLOAD_DIR: &str = "FEATURE_VIZ_UPLOAD_DIR";
pub const ENV_LOG: &str = "FEATURE_VIZ_LOG";

/// Runtime settings for the HTTP server, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:5000`.
    pub addr: String,
    /// Where uploads are kept while they are being analysed.
    pub upload_dir: PathBuf,
    pub log_level: Level,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: "127.0.0.1:5000".to_owned(),
            upload_dir: PathBuf::from("uploads"),
            log_level: Level::INFO,
        }
    }
}

impl ServerConfig {
    /// Builds the config from `FEATURE_VIZ_*` variables, keeping the default
    /// for anything unset. An unparseable log level also keeps the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServerConfig::default();
        if let Some(addr) = lookup(ENV_ADDR).filter(|s| !s.trim().is_empty()) {
            config.addr = addr.trim().to_owned();
        }
        if let Some(dir) = lookup(ENV_UPLOAD_DIR).filter(|s| !s.trim().is_empty()) {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup(ENV_LOG).and_then(|s| s.trim().parse().ok()) {
            config.log_level = level;
        }
        config
    }
}
