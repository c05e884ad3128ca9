//! 事件分发模块
//!
//! 将核心事件转发给宿主界面，宿主通过注册回调接收

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// 宿主界面事件
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum UiEvent {
    /// 连接状态变化
    ConnectionStateChanged { is_connected: bool, state: String },
    /// 会话记录新增一条消息
    MessageAppended {
        sender: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
    /// 用户可见警告
    Alert { message: String },
    /// 语音识别状态变化
    ListeningStateChanged { is_listening: bool },
}

/// 事件回调类型
pub type UiEventCallback = Box<dyn Fn(&UiEvent) + Send + Sync>;

/// 事件分发器
///
/// 同步调用所有已注册回调，调用顺序即注册顺序
pub struct EventDispatcher {
    /// 已注册回调
    callbacks: Mutex<Vec<UiEventCallback>>,
    /// 是否启用
    enabled: AtomicBool,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// 创建新的事件分发器
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    /// 注册事件回调
    pub fn on_event<F>(&self, callback: F)
    where
        F: Fn(&UiEvent) + Send + Sync + 'static,
    {
        self.callbacks.lock().push(Box::new(callback));
    }

    /// 分发事件
    pub fn emit(&self, event: UiEvent) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        tracing::debug!("Emitting UI event: {:?}", event);
        let callbacks = self.callbacks.lock();
        for callback in callbacks.iter() {
            callback(&event);
        }
    }

    /// 发送连接状态变化事件
    pub fn emit_connection_state(&self, is_connected: bool, state: &str) {
        self.emit(UiEvent::ConnectionStateChanged {
            is_connected,
            state: state.to_string(),
        });
    }

    /// 发送消息新增事件
    pub fn emit_message_appended(&self, sender: &str, text: &str, timestamp: DateTime<Utc>) {
        self.emit(UiEvent::MessageAppended {
            sender: sender.to_string(),
            text: text.to_string(),
            timestamp,
        });
    }

    /// 发送警告事件
    pub fn emit_alert(&self, message: &str) {
        self.emit(UiEvent::Alert {
            message: message.to_string(),
        });
    }

    /// 发送语音识别状态事件
    pub fn emit_listening_state(&self, is_listening: bool) {
        self.emit(UiEvent::ListeningStateChanged { is_listening });
    }

    /// 启用/禁用事件分发
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// 检查是否启用
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}
