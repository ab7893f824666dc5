use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub admin: AdminSeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Use the first `X-Forwarded-For` entry as the client address.
    /// Only enable behind a reverse proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory backing the "apk" bucket (blobs plus the current pointer)
    #[serde(default = "default_apk_path")]
    pub apk_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Key of the `app_stats` row holding the download counter
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// Prefix for versioned blob names
    #[serde(default = "default_apk_basename")]
    pub apk_basename: String,
    /// File name offered to browsers on download
    #[serde(default = "default_download_name")]
    pub download_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: u64,
    /// Where uploads are spooled before publishing; the system temp dir if unset
    #[serde(default)]
    pub temp_dir: Option<String>,
}

impl UploadConfig {
    pub fn spool_dir(&self) -> PathBuf {
        match &self.temp_dir {
            Some(dir) => PathBuf::from(dir),
            None => env::temp_dir(),
        }
    }
}

/// Bootstrap account created when `admin_users` is empty
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminSeedConfig {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_db_path() -> String {
    "data/revenge.db".to_string()
}

fn default_apk_path() -> String {
    "data/apk".to_string()
}

fn default_app_name() -> String {
    "revenge_browser".to_string()
}

fn default_display_name() -> String {
    "Revenge Browser".to_string()
}

fn default_apk_basename() -> String {
    "revenge-browser".to_string()
}

fn default_download_name() -> String {
    "revenge-browser-v1.apk".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_upload_bytes() -> u64 {
    200 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            trust_forwarded_for: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            apk_path: default_apk_path(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            display_name: default_display_name(),
            apk_basename: default_apk_basename(),
            download_name: default_download_name(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_upload_bytes(),
            temp_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        tracing::info!(
            "Serving {} from {} (database {})",
            config.app.display_name,
            config.storage.apk_path,
            config.database.path
        );
        Ok(config)
    }

    /// Load configuration from config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["config.toml", "data/config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: RW_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("RW_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("RW_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = env::var("RW_CONF_SERVER_STATIC_DIR") {
            self.server.static_dir = val;
        }
        if let Ok(val) = env::var("RW_CONF_SERVER_TRUST_FORWARDED_FOR") {
            if let Ok(v) = val.parse() {
                self.server.trust_forwarded_for = v;
            }
        }

        // Database overrides
        if let Ok(val) = env::var("RW_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // Storage overrides
        if let Ok(val) = env::var("RW_CONF_STORAGE_APK_PATH") {
            self.storage.apk_path = val;
        }

        // App overrides
        if let Ok(val) = env::var("RW_CONF_APP_NAME") {
            if !val.trim().is_empty() {
                self.app.name = val;
            }
        }
        if let Ok(val) = env::var("RW_CONF_APP_DOWNLOAD_NAME") {
            if !val.trim().is_empty() {
                self.app.download_name = val;
            }
        }

        // Download rate limit overrides
        if let Ok(val) = env::var("RW_CONF_DOWNLOAD_MAX_ATTEMPTS") {
            if let Ok(n) = val.parse() {
                self.download.max_attempts = n;
            }
        }
        if let Ok(val) = env::var("RW_CONF_DOWNLOAD_WINDOW_SECS") {
            if let Ok(secs) = val.parse() {
                self.download.window_secs = secs;
            }
        }

        // Upload overrides
        if let Ok(val) = env::var("RW_CONF_UPLOAD_MAX_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.upload.max_bytes = bytes;
            }
        }
        if let Ok(val) = env::var("RW_CONF_UPLOAD_TEMP_DIR") {
            if !val.trim().is_empty() {
                self.upload.temp_dir = Some(val);
            }
        }

        // Admin seed overrides
        if let Ok(val) = env::var("RW_CONF_ADMIN_NAME") {
            self.admin.name = Some(val);
        }
        if let Ok(val) = env::var("RW_CONF_ADMIN_EMAIL") {
            self.admin.email = Some(val);
        }
        if let Ok(val) = env::var("RW_CONF_ADMIN_PASSWORD") {
            self.admin.password = Some(val);
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.database.path).parent() {
            fs::create_dir_all(parent)?;
        }

        fs::create_dir_all(&self.storage.apk_path)?;
        if let Some(dir) = &self.upload.temp_dir {
            fs::create_dir_all(dir)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_download_policy() {
        let config = Config::default();
        assert_eq!(config.download.max_attempts, 5);
        assert_eq!(config.download.window_secs, 60);
        assert_eq!(config.upload.max_bytes, 209_715_200);
        assert_eq!(config.app.name, "revenge_browser");
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [admin]
            email = "root@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.apk_path, "data/apk");
        assert_eq!(config.admin.email.as_deref(), Some("root@example.com"));
        assert!(config.admin.password.is_none());
    }
}
