//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging setup
//! - Default storage backend (LocalStorage on web, JSON file on native)
//! - The JS-facing session bridge (web only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::persistence::ScoreStore;

/// Environment variable naming the native score file
#[cfg(not(target_arch = "wasm32"))]
pub const STORE_ENV: &str = "POCKET_ARCADE_STORE";
/// Score file used when `STORE_ENV` is unset
#[cfg(not(target_arch = "wasm32"))]
pub const DEFAULT_STORE_PATH: &str = "pocket_arcade_scores.json";

/// Install the logger. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Install the console logger and panic hook. Safe to call more than once.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Console logger already installed");
    }
}

/// Score store backed by the platform's default storage
#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> ScoreStore {
    let path = std::env::var(STORE_ENV).unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string());
    log::info!("Scores stored in {}", path);
    ScoreStore::new(crate::persistence::JsonFileBackend::new(path))
}

/// Score store backed by the platform's default storage
#[cfg(target_arch = "wasm32")]
pub fn default_store() -> ScoreStore {
    ScoreStore::new(crate::persistence::LocalStorageBackend)
}
