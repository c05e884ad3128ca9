//! 语音识别模块
//!
//! 语音转文本引擎是外部协作方，这里只定义契约：
//! 引擎按区域设置启动，通过回调交付最终转写文本（不消费中间结果）

use crate::error::SpeechError;
use auto_impl::auto_impl;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 默认识别区域设置
pub const DEFAULT_LOCALE: &str = "en-US";

/// 最终转写结果回调
pub type ResultCallback = Box<dyn Fn(String) + Send + Sync>;

/// 语音识别引擎契约
#[auto_impl(Box)]
pub trait SpeechRecognizer: Send + Sync {
    /// 开始识别会话，最终转写结果通过回调交付
    fn start(&mut self, locale: &str, on_result: ResultCallback) -> Result<(), SpeechError>;

    /// 停止识别会话
    fn stop(&mut self);
}

/// 语音识别会话
///
/// 持有引擎实例，把最终转写结果转交给提交回调
pub struct SpeechSession {
    /// 识别引擎
    recognizer: Box<dyn SpeechRecognizer>,
    /// 区域设置
    locale: String,
    /// 会话是否进行中
    active: Arc<AtomicBool>,
}

impl SpeechSession {
    /// 创建新的语音识别会话
    pub fn new(recognizer: Box<dyn SpeechRecognizer>, locale: impl Into<String>) -> Self {
        Self {
            recognizer,
            locale: locale.into(),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 开始识别，结果经 submit 回调提交
    pub fn start<F>(&mut self, submit: F) -> Result<(), SpeechError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        if self.active.load(Ordering::SeqCst) {
            return Err(SpeechError::AlreadyActive);
        }
        self.active.store(true, Ordering::SeqCst);

        let result = self.recognizer.start(&self.locale, Box::new(submit));
        if result.is_err() {
            self.active.store(false, Ordering::SeqCst);
        }
        result
    }

    /// 停止识别
    pub fn stop(&mut self) {
        if self.active.swap(false, Ordering::SeqCst) {
            self.recognizer.stop();
        }
    }

    /// 会话是否进行中
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// 当前区域设置
    pub fn locale(&self) -> &str {
        &self.locale
    }
}
