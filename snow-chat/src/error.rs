//! SnowChat 错误类型定义
//!
//! 所有模块的错误类型统一在此定义，使用 thiserror 自动派生 Error trait

use thiserror::Error;

/// 应用统一错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 网络相关错误
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// 协议相关错误
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// 配置相关错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 语音识别相关错误
    #[error(transparent)]
    Speech(#[from] SpeechError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 错误代码（用于宿主界面显示）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // 网络错误
    NetworkConnectFailed,
    NetworkLost,
    NetworkSendFailed,
    NetworkReceiveFailed,

    // 协议错误
    ProtocolInvalidFrame,
    ProtocolMissingField,

    // 配置错误
    ConfigLoadFailed,
    ConfigSaveFailed,

    // 语音错误
    SpeechUnavailable,
    SpeechFailed,

    // 内部错误
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NetworkConnectFailed => write!(f, "NETWORK_CONNECT_FAILED"),
            ErrorCode::NetworkLost => write!(f, "NETWORK_LOST"),
            ErrorCode::NetworkSendFailed => write!(f, "NETWORK_SEND_FAILED"),
            ErrorCode::NetworkReceiveFailed => write!(f, "NETWORK_RECEIVE_FAILED"),
            ErrorCode::ProtocolInvalidFrame => write!(f, "PROTOCOL_INVALID_FRAME"),
            ErrorCode::ProtocolMissingField => write!(f, "PROTOCOL_MISSING_FIELD"),
            ErrorCode::ConfigLoadFailed => write!(f, "CONFIG_LOAD_FAILED"),
            ErrorCode::ConfigSaveFailed => write!(f, "CONFIG_SAVE_FAILED"),
            ErrorCode::SpeechUnavailable => write!(f, "SPEECH_UNAVAILABLE"),
            ErrorCode::SpeechFailed => write!(f, "SPEECH_FAILED"),
            ErrorCode::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// 网络相关错误
#[derive(Debug, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection lost - disconnected from server")]
    ConnectionLost,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive error: {0}")]
    ReceiveError(String),
}

/// 协议相关错误
///
/// 入站帧解析失败不会导致会话终止，只上报为解析失败事件
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Frame is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Frame missing expected field: {0}")]
    MissingField(String),
}

/// 配置相关错误
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found")]
    NotFound,
}

/// 语音识别相关错误
#[derive(Debug, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("No speech recognizer available")]
    Unavailable,

    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("Recognition session already active")]
    AlreadyActive,
}

impl AppError {
    /// 获取对应的错误代码
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Network(e) => match e {
                NetworkError::ConnectionFailed(_) => ErrorCode::NetworkConnectFailed,
                NetworkError::ConnectionLost => ErrorCode::NetworkLost,
                NetworkError::SendFailed(_) => ErrorCode::NetworkSendFailed,
                NetworkError::ReceiveError(_) => ErrorCode::NetworkReceiveFailed,
            },
            AppError::Protocol(e) => match e {
                ProtocolError::InvalidJson(_) => ErrorCode::ProtocolInvalidFrame,
                ProtocolError::MissingField(_) => ErrorCode::ProtocolMissingField,
            },
            AppError::Config(e) => match e {
                ConfigError::LoadFailed(_) => ErrorCode::ConfigLoadFailed,
                ConfigError::SaveFailed(_) => ErrorCode::ConfigSaveFailed,
                ConfigError::NotFound => ErrorCode::ConfigLoadFailed,
            },
            AppError::Speech(e) => match e {
                SpeechError::Unavailable => ErrorCode::SpeechUnavailable,
                SpeechError::RecognitionFailed(_) => ErrorCode::SpeechFailed,
                SpeechError::AlreadyActive => ErrorCode::SpeechFailed,
            },
            AppError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// 检查是否为可恢复错误
    ///
    /// 传输层错误可通过新建会话恢复；协议解析失败不影响会话本身
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Network(NetworkError::ConnectionLost)
                | AppError::Network(NetworkError::ConnectionFailed(_))
                | AppError::Protocol(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::NetworkConnectFailed.to_string(), "NETWORK_CONNECT_FAILED");
        assert_eq!(ErrorCode::ProtocolInvalidFrame.to_string(), "PROTOCOL_INVALID_FRAME");
        assert_eq!(ErrorCode::ConfigSaveFailed.to_string(), "CONFIG_SAVE_FAILED");
        assert_eq!(ErrorCode::SpeechUnavailable.to_string(), "SPEECH_UNAVAILABLE");
    }

    #[test]
    fn test_network_error_display() {
        let error = NetworkError::ConnectionLost;
        assert_eq!(error.to_string(), "Connection lost - disconnected from server");

        let error = NetworkError::ConnectionFailed("connection refused".to_string());
        assert!(error.to_string().contains("Connection failed"));
    }

    #[test]
    fn test_protocol_error_display() {
        let error = ProtocolError::MissingField("reply".to_string());
        assert!(error.to_string().contains("missing expected field"));

        let error = ProtocolError::InvalidJson("not json".to_string());
        assert!(error.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_app_error_from_network() {
        let network_error = NetworkError::ConnectionLost;
        let app_error: AppError = network_error.into();
        assert_eq!(app_error.code(), ErrorCode::NetworkLost);
    }

    #[test]
    fn test_app_error_from_protocol() {
        let protocol_error = ProtocolError::MissingField("response".to_string());
        let app_error: AppError = protocol_error.into();
        assert_eq!(app_error.code(), ErrorCode::ProtocolMissingField);
    }

    #[test]
    fn test_app_error_from_config() {
        let config_error = ConfigError::NotFound;
        let app_error: AppError = config_error.into();
        assert_eq!(app_error.code(), ErrorCode::ConfigLoadFailed);
    }

    #[test]
    fn test_app_error_is_recoverable() {
        let connection_lost = AppError::Network(NetworkError::ConnectionLost);
        assert!(connection_lost.is_recoverable());

        let parse_failure = AppError::Protocol(ProtocolError::InvalidJson("{".to_string()));
        assert!(parse_failure.is_recoverable());

        let config_error = AppError::Config(ConfigError::NotFound);
        assert!(!config_error.is_recoverable());

        let send_failed = AppError::Network(NetworkError::SendFailed("broken pipe".to_string()));
        assert!(!send_failed.is_recoverable());
    }
}
