use std::path::PathBuf;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;

/// Built client bundle (scripts, styles, images) served under `/assets`
pub fn assets_service(config: &ServerConfig) -> ServeDir {
    let dir = PathBuf::from(&config.static_dir);
    if !dir.is_dir() {
        tracing::warn!("Static asset directory {:?} does not exist", dir);
    }
    ServeDir::new(dir)
}
