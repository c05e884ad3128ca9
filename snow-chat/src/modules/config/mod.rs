//! 配置模块

pub mod manager;

pub use manager::{ConfigManager, SpeechSettings, UserConfig};
