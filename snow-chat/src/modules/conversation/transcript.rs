//! 会话记录
//!
//! 会话期间只追加，插入顺序即显示顺序，不持久化

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// 消息发送方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sender {
    User,
    Snowball,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "You"),
            Sender::Snowball => write!(f, "Snowball"),
        }
    }
}

/// 一条会话消息，追加后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// 会话记录
///
/// 追加在锁内对当前状态完成，并发到达的追加按获得锁的顺序串行化
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Mutex<Vec<ChatMessage>>,
}

impl Transcript {
    /// 创建空的会话记录
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条消息，返回追加的副本
    pub fn push(&self, sender: Sender, text: &str) -> ChatMessage {
        let message = ChatMessage {
            sender,
            text: text.to_string(),
            timestamp: Utc::now(),
        };
        self.entries.lock().push(message.clone());
        message
    }

    /// 当前所有消息的快照
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.entries.lock().clone()
    }

    /// 消息数量
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
