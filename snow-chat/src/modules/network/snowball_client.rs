//! Snowball 客户端
//!
//! 封装 WebSocket 客户端，维护与 Snowball 助手的单次会话：
//! 出站命令编码、入站帧分类、生命周期事件上报

use crate::error::NetworkError;
use crate::modules::network::protocol::{Dialect, FrameCodec, Inbound};
use crate::modules::network::websocket::{ConnectionState, WebSocketClient, WsMessage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Snowball 连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowballConfig {
    /// 服务器主机
    pub host: String,
    /// 服务器端口
    pub port: u16,
    /// 协议方言
    pub dialect: Dialect,
}

impl Default for SnowballConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            dialect: Dialect::Message,
        }
    }
}

impl SnowballConfig {
    /// 构建 WebSocket URL
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// 会话事件
///
/// 从连接任务上报给会话控制器
#[derive(Debug, Clone)]
pub enum SnowballEvent {
    /// 连接已建立
    Opened,
    /// 助手回复
    Reply { text: String, timestamp: DateTime<Utc> },
    /// 服务端错误通知
    ServerError { message: String },
    /// 入站帧解析失败，帧被丢弃
    ParseFailed { detail: String },
    /// 传输层错误
    ConnectionError { message: String },
    /// 连接已关闭
    Closed,
}

/// 关闭句柄
///
/// 从任意任务请求关闭会话；关闭后不再上报任何事件
#[derive(Debug, Clone)]
pub struct CloseHandle {
    closed: Arc<AtomicBool>,
}

impl CloseHandle {
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Snowball 客户端
///
/// 一个实例对应一次会话；连接关闭后需新建实例
#[derive(Debug)]
pub struct SnowballClient {
    /// WebSocket 客户端
    ws: WebSocketClient,
    /// 帧编解码器
    codec: FrameCodec,
    /// 关闭标记
    closed: Arc<AtomicBool>,
}

impl Default for SnowballClient {
    fn default() -> Self {
        Self::new(SnowballConfig::default())
    }
}

impl SnowballClient {
    /// 创建新的 Snowball 客户端
    pub fn new(config: SnowballConfig) -> Self {
        Self {
            ws: WebSocketClient::new(config.url()),
            codec: FrameCodec::new(config.dialect),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 连接到 Snowball 服务
    pub async fn connect(&mut self) -> Result<(), NetworkError> {
        self.ws.connect().await
    }

    /// 获取关闭句柄
    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            closed: self.closed.clone(),
        }
    }

    /// 关闭会话，幂等
    pub async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        self.ws.close().await;
    }

    /// 检查是否已连接
    pub fn is_open(&self) -> bool {
        self.ws.is_open()
    }

    /// 获取连接状态
    pub fn connection_state(&self) -> ConnectionState {
        self.ws.connection_state()
    }

    /// 发送用户命令
    ///
    /// 仅在 Open 状态实际发送；其余状态静默丢弃并记录日志
    pub async fn send_command(&mut self, text: &str) -> Result<(), NetworkError> {
        if !self.ws.is_open() {
            tracing::warn!(
                "Dropping outbound command, connection state is {}",
                self.ws.connection_state()
            );
            return Ok(());
        }
        let frame = self.codec.encode_command(text);
        self.ws.send_text(&frame).await
    }

    /// 分类入站文本帧
    fn classify_frame(&self, raw: &str) -> SnowballEvent {
        match self.codec.parse_inbound(raw) {
            Ok(Inbound::Reply(text)) => SnowballEvent::Reply {
                text,
                timestamp: Utc::now(),
            },
            Ok(Inbound::ServerError(message)) => SnowballEvent::ServerError { message },
            Err(e) => {
                tracing::warn!("Dropping malformed inbound frame: {}", e);
                SnowballEvent::ParseFailed {
                    detail: e.to_string(),
                }
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// 连接任务主循环
    ///
    /// 单任务串行处理出站命令通道和入站帧，保证事件按接收顺序上报。
    /// 出站通道关闭视为本地关闭请求，不上报 Closed 事件
    pub async fn run(
        mut self,
        mut outbound: mpsc::Receiver<String>,
        events: mpsc::Sender<SnowballEvent>,
    ) {
        if !self.ws.is_open() {
            return;
        }
        self.emit(&events, SnowballEvent::Opened).await;

        loop {
            tokio::select! {
                cmd = outbound.recv() => {
                    if self.is_closed() {
                        break;
                    }
                    match cmd {
                        Some(text) => {
                            if let Err(e) = self.send_command(&text).await {
                                self.emit(&events, SnowballEvent::ConnectionError {
                                    message: e.to_string(),
                                }).await;
                                self.emit(&events, SnowballEvent::Closed).await;
                                break;
                            }
                        }
                        None => break,
                    }
                }
                incoming = self.ws.receive() => {
                    if self.is_closed() {
                        break;
                    }
                    match incoming {
                        Ok(Some(WsMessage::Text(raw))) => {
                            let event = self.classify_frame(&raw);
                            self.emit(&events, event).await;
                        }
                        Ok(Some(WsMessage::Close)) | Ok(None) => {
                            self.emit(&events, SnowballEvent::Closed).await;
                            break;
                        }
                        Ok(Some(_)) => {
                            tracing::trace!("Ignoring non-text frame");
                        }
                        Err(e) => {
                            self.emit(&events, SnowballEvent::ConnectionError {
                                message: e.to_string(),
                            }).await;
                            self.emit(&events, SnowballEvent::Closed).await;
                            break;
                        }
                    }
                }
            }
        }

        self.close().await;
    }

    /// 上报事件；会话关闭后不再上报
    async fn emit(&self, events: &mpsc::Sender<SnowballEvent>, event: SnowballEvent) {
        if self.is_closed() {
            return;
        }
        let _ = events.send(event).await;
    }
}
