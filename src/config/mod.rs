// src/config/mod.rs
pub mod app;

pub use app::{load_default, load_from, AppConfig, ENV_CONFIG_PATH};
