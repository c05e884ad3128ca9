//! 线路协议
//!
//! Snowball 服务端有两种观测到的 JSON 字段命名方案，
//! 作为同一协议的两种方言处理，通过配置选择，不做统一

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// 协议方言
///
/// `Command`: 出站 `{"command": ...}`，入站 `{"reply": ...}`
/// `Message`: 出站 `{"message": ...}`，入站 `{"response": ...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Command,
    #[default]
    Message,
}

impl Dialect {
    /// 出站帧的字段名
    pub fn outbound_field(&self) -> &'static str {
        match self {
            Dialect::Command => "command",
            Dialect::Message => "message",
        }
    }

    /// 入站帧的字段名
    pub fn inbound_field(&self) -> &'static str {
        match self {
            Dialect::Command => "reply",
            Dialect::Message => "response",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Command => write!(f, "command/reply"),
            Dialect::Message => write!(f, "message/response"),
        }
    }
}

/// 入站帧分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// 助手回复文本
    Reply(String),
    /// 服务端错误通知
    ServerError(String),
}

/// 帧编解码器
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec {
    dialect: Dialect,
}

impl FrameCodec {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 将用户文本编码为出站命令帧
    pub fn encode_command(&self, text: &str) -> String {
        match self.dialect {
            Dialect::Command => serde_json::json!({ "command": text }),
            Dialect::Message => serde_json::json!({ "message": text }),
        }
        .to_string()
    }

    /// 解析入站文本帧
    ///
    /// 畸形帧（非 JSON，或既无回复字段也无 error 字段）返回错误，
    /// 由调用方上报为解析失败事件
    pub fn parse_inbound(&self, raw: &str) -> Result<Inbound, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

        if let Some(text) = value.get(self.dialect.inbound_field()).and_then(|v| v.as_str()) {
            return Ok(Inbound::Reply(text.to_string()));
        }

        if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
            return Ok(Inbound::ServerError(message.to_string()));
        }

        Err(ProtocolError::MissingField(self.dialect.inbound_field().to_string()))
    }
}
