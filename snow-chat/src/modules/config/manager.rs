//! 配置管理器

use crate::error::ConfigError;
use crate::modules::network::SnowballConfig;
use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// 语音设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// 是否启用语音输入
    pub enabled: bool,
    /// 识别区域设置
    pub locale: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            locale: crate::modules::speech::DEFAULT_LOCALE.to_string(),
        }
    }
}

/// 用户配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// 服务器连接配置
    pub server: SnowballConfig,
    /// 语音设置
    pub speech: SpeechSettings,
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    config: ArcSwap<UserConfig>,
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::APP_DIR);
        Self::new(config_dir)
    }
}

impl ConfigManager {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_path = config_dir.join("config.toml");
        let config = ArcSwap::new(Arc::new(UserConfig::default()));
        Self { config, config_path }
    }

    /// 从磁盘加载配置，文件不存在时返回默认值
    pub fn load(&self) -> Result<UserConfig, ConfigError> {
        if !self.config_path.exists() {
            return Ok(UserConfig::default());
        }
        let content = std::fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::LoadFailed(e.to_string()))
    }

    /// 保存配置到磁盘并更新当前配置
    pub fn save(&self, config: &UserConfig) -> Result<(), ConfigError> {
        let content =
            toml::to_string(config).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        std::fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        self.config.store(Arc::new(config.clone()));
        Ok(())
    }

    /// 当前配置
    pub fn current(&self) -> Arc<UserConfig> {
        self.config.load_full()
    }

    /// 修改并保存配置
    pub fn update<F>(&self, f: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut UserConfig),
    {
        let mut config = (*self.current()).clone();
        f(&mut config);
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::network::Dialect;

    #[test]
    fn test_user_config_defaults() {
        let config = UserConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8765);
        assert_eq!(config.server.dialect, Dialect::Message);
        assert!(!config.speech.enabled);
        assert_eq!(config.speech.locale, "en-US");
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(temp_dir.path().to_path_buf());

        let config = manager.load().unwrap();
        assert_eq!(config.server.port, 8765);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(temp_dir.path().to_path_buf());

        let mut config = UserConfig::default();
        config.server.host = "192.168.1.20".to_string();
        config.server.port = 5000;
        config.server.dialect = Dialect::Command;
        config.speech.enabled = true;

        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.server.host, "192.168.1.20");
        assert_eq!(loaded.server.port, 5000);
        assert_eq!(loaded.server.dialect, Dialect::Command);
        assert!(loaded.speech.enabled);
    }

    #[test]
    fn test_update_stores_current() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(temp_dir.path().to_path_buf());

        manager.update(|c| c.server.port = 5000).unwrap();
        assert_eq!(manager.current().server.port, 5000);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("config.toml"), "not [valid").unwrap();
        let manager = ConfigManager::new(temp_dir.path().to_path_buf());

        let result = manager.load();
        assert!(matches!(result, Err(ConfigError::LoadFailed(_))));
    }
}
