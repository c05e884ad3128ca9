//! 应用状态
//!
//! 定义全局运行时状态

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 应用运行时状态
#[derive(Clone)]
pub struct AppState {
    /// 是否已连接
    pub is_connected: Arc<AtomicBool>,
    /// 语音识别是否进行中
    pub is_listening: Arc<AtomicBool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            is_connected: Arc::new(AtomicBool::new(false)),
            is_listening: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    pub fn set_connected(&self, connected: bool) {
        self.is_connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_listening(&self) -> bool {
        self.is_listening.load(Ordering::SeqCst)
    }

    pub fn set_listening(&self, listening: bool) {
        self.is_listening.store(listening, Ordering::SeqCst);
    }
}
