//! 会话控制器
//!
//! 在用户输入（键入或语音转写）与连接任务之间做中介，
//! 维护会话记录顺序并触发命令发送

use crate::modules::conversation::transcript::{Sender, Transcript};
use crate::modules::events::EventDispatcher;
use crate::modules::network::SnowballEvent;
use crate::state::AppState;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// 会话控制器
///
/// 每次用户提交先追加本地消息，再把文本送入出站通道；
/// 两步都在调用线程同步完成，保证本地消息先于命令发出
pub struct ConversationController {
    /// 会话记录
    transcript: Arc<Transcript>,
    /// 出站命令通道
    outbound: mpsc::Sender<String>,
    /// 事件分发器
    dispatcher: Arc<EventDispatcher>,
    /// 运行时状态
    state: AppState,
    /// 待发送输入缓冲
    input_buffer: Mutex<String>,
}

impl ConversationController {
    /// 创建新的会话控制器
    pub fn new(
        state: AppState,
        outbound: mpsc::Sender<String>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            transcript: Arc::new(Transcript::new()),
            outbound,
            dispatcher,
            state,
            input_buffer: Mutex::new(String::new()),
        }
    }

    /// 获取会话记录
    pub fn transcript(&self) -> Arc<Transcript> {
        self.transcript.clone()
    }

    /// 设置待发送输入
    pub fn set_pending_input(&self, text: &str) {
        *self.input_buffer.lock() = text.to_string();
    }

    /// 当前待发送输入
    pub fn pending_input(&self) -> String {
        self.input_buffer.lock().clone()
    }

    /// 提交键入文本
    ///
    /// 空白输入静默忽略；提交后清空输入缓冲
    pub fn submit_text(&self, text: &str) {
        self.submit(text, true);
    }

    /// 提交语音转写结果
    ///
    /// 与 submit_text 契约相同，但不触碰输入缓冲
    pub fn submit_voice_result(&self, text: &str) {
        self.submit(text, false);
    }

    fn submit(&self, text: &str, clear_input: bool) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            tracing::debug!("Ignoring empty submission");
            return;
        }

        let message = self.transcript.push(Sender::User, trimmed);
        self.dispatcher.emit_message_appended(
            &message.sender.to_string(),
            &message.text,
            message.timestamp,
        );

        if let Err(e) = self.outbound.try_send(trimmed.to_string()) {
            tracing::warn!("Dropping outbound command, connection task unavailable: {}", e);
        }

        if clear_input {
            self.input_buffer.lock().clear();
        }
    }

    /// 处理助手回复
    pub fn on_remote_reply(&self, text: &str) {
        let message = self.transcript.push(Sender::Snowball, text);
        self.dispatcher.emit_message_appended(
            &message.sender.to_string(),
            &message.text,
            message.timestamp,
        );
    }

    /// 处理服务端错误通知，不追加到会话记录
    pub fn on_server_error(&self, message: &str) {
        tracing::warn!("Server reported error: {}", message);
        self.dispatcher.emit_alert(message);
    }

    /// 处理传输层错误，不追加到会话记录，会话不因此终止
    pub fn on_connection_error(&self, message: &str) {
        tracing::error!("WebSocket error: {}", message);
        self.dispatcher.emit_alert(&format!("WebSocket connection error: {}", message));
    }

    /// 处理连接任务上报的会话事件
    pub fn handle_event(&self, event: SnowballEvent) {
        match event {
            SnowballEvent::Opened => {
                self.state.set_connected(true);
                self.dispatcher.emit_connection_state(true, "Open");
            }
            SnowballEvent::Reply { text, .. } => self.on_remote_reply(&text),
            SnowballEvent::ServerError { message } => self.on_server_error(&message),
            SnowballEvent::ParseFailed { detail } => {
                // 已在连接任务记录日志，对用户无可见影响
                tracing::debug!("Inbound frame dropped: {}", detail);
            }
            SnowballEvent::ConnectionError { message } => self.on_connection_error(&message),
            SnowballEvent::Closed => {
                self.state.set_connected(false);
                self.dispatcher.emit_connection_state(false, "Closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::conversation::transcript::ChatMessage;
    use crate::modules::events::UiEvent;

    fn make_controller() -> (ConversationController, mpsc::Receiver<String>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(8);
        let dispatcher = Arc::new(EventDispatcher::new());
        let controller = ConversationController::new(AppState::new(), outbound_tx, dispatcher);
        (controller, outbound_rx)
    }

    fn texts(entries: &[ChatMessage]) -> Vec<(Sender, &str)> {
        entries.iter().map(|m| (m.sender, m.text.as_str())).collect()
    }

    #[test]
    fn test_submit_text_appends_once_and_sends_once() {
        let (controller, mut outbound_rx) = make_controller();

        controller.submit_text("turn on the lights");

        let entries = controller.transcript().snapshot();
        assert_eq!(texts(&entries), vec![(Sender::User, "turn on the lights")]);
        assert_eq!(outbound_rx.try_recv().unwrap(), "turn on the lights");
        assert!(outbound_rx.try_recv().is_err());
    }

    #[test]
    fn test_empty_submissions_ignored() {
        let (controller, mut outbound_rx) = make_controller();

        controller.submit_text("");
        controller.submit_text("   ");
        controller.submit_voice_result("  \t ");

        assert!(controller.transcript().is_empty());
        assert!(outbound_rx.try_recv().is_err());
    }

    #[test]
    fn test_rapid_submissions_preserve_order() {
        let (controller, mut outbound_rx) = make_controller();

        controller.submit_text("hello");
        controller.submit_text("how are you");

        let entries = controller.transcript().snapshot();
        assert_eq!(
            texts(&entries),
            vec![(Sender::User, "hello"), (Sender::User, "how are you")]
        );
        assert_eq!(outbound_rx.try_recv().unwrap(), "hello");
        assert_eq!(outbound_rx.try_recv().unwrap(), "how are you");
    }

    #[test]
    fn test_replies_append_in_receipt_order() {
        let (controller, _outbound_rx) = make_controller();

        controller.on_remote_reply("first");
        controller.on_remote_reply("second");

        let entries = controller.transcript().snapshot();
        assert_eq!(
            texts(&entries),
            vec![(Sender::Snowball, "first"), (Sender::Snowball, "second")]
        );
    }

    #[test]
    fn test_lights_scenario() {
        let (controller, mut outbound_rx) = make_controller();

        controller.submit_text("turn on the lights");
        assert_eq!(outbound_rx.try_recv().unwrap(), "turn on the lights");

        controller.on_remote_reply("Lights are on.");

        let entries = controller.transcript().snapshot();
        assert_eq!(
            texts(&entries),
            vec![
                (Sender::User, "turn on the lights"),
                (Sender::Snowball, "Lights are on."),
            ]
        );
    }

    #[test]
    fn test_interleaved_appends_apply_to_current_state() {
        let (controller, _outbound_rx) = make_controller();

        controller.submit_text("hello");
        controller.on_remote_reply("hi there");
        controller.submit_text("bye");

        let entries = controller.transcript().snapshot();
        assert_eq!(
            texts(&entries),
            vec![
                (Sender::User, "hello"),
                (Sender::Snowball, "hi there"),
                (Sender::User, "bye"),
            ]
        );
    }

    #[test]
    fn test_connection_error_alerts_without_append() {
        let (outbound_tx, _outbound_rx) = mpsc::channel(8);
        let dispatcher = Arc::new(EventDispatcher::new());
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let alerts_clone = alerts.clone();
        dispatcher.on_event(move |event| {
            if let UiEvent::Alert { message } = event {
                alerts_clone.lock().push(message.clone());
            }
        });
        let controller =
            ConversationController::new(AppState::new(), outbound_tx, dispatcher);

        controller.handle_event(SnowballEvent::ConnectionError {
            message: "connection refused".to_string(),
        });

        assert!(controller.transcript().is_empty());
        let alerts = alerts.lock();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("connection refused"));
    }

    #[test]
    fn test_server_error_alerts_without_append() {
        let (controller, _outbound_rx) = make_controller();

        controller.handle_event(SnowballEvent::ServerError {
            message: "unknown command".to_string(),
        });

        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn test_parse_failure_has_no_visible_effect() {
        let (controller, mut outbound_rx) = make_controller();

        controller.handle_event(SnowballEvent::ParseFailed {
            detail: "Frame is not valid JSON".to_string(),
        });

        assert!(controller.transcript().is_empty());
        assert!(outbound_rx.try_recv().is_err());
    }

    #[test]
    fn test_submit_text_clears_input_buffer() {
        let (controller, _outbound_rx) = make_controller();

        controller.set_pending_input("turn on the lights");
        controller.submit_text("turn on the lights");
        assert_eq!(controller.pending_input(), "");
    }

    #[test]
    fn test_voice_result_keeps_input_buffer() {
        let (controller, mut outbound_rx) = make_controller();

        controller.set_pending_input("half-typed message");
        controller.submit_voice_result("play some music");

        assert_eq!(controller.pending_input(), "half-typed message");
        assert_eq!(outbound_rx.try_recv().unwrap(), "play some music");
        let entries = controller.transcript().snapshot();
        assert_eq!(texts(&entries), vec![(Sender::User, "play some music")]);
    }

    #[test]
    fn test_connection_state_tracked() {
        let (controller, _outbound_rx) = make_controller();

        controller.handle_event(SnowballEvent::Opened);
        assert!(controller.state.is_connected());

        controller.handle_event(SnowballEvent::Closed);
        assert!(!controller.state.is_connected());
    }
}
