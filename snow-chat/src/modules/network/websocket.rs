//! WebSocket 客户端
//!
//! 使用 tokio-tungstenite 实现单连接的 WebSocket 传输层

use crate::error::NetworkError;
use futures_util::sink::SinkExt;
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// 连接状态
///
/// Idle → Connecting → Open → Closed，Closed 为终态；
/// 不做自动重连，新会话需要新的客户端实例
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
}

impl ConnectionState {
    /// 检查是否已连接
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// 检查是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "Idle"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}

/// WebSocket 消息
#[derive(Debug, Clone)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

/// WebSocket 客户端
///
/// 处理连接建立、消息收发和关闭；生命周期内最多经历一次 Open
#[derive(Debug)]
pub struct WebSocketClient {
    /// WebSocket 流
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    /// 连接状态
    state: Arc<Mutex<ConnectionState>>,
    /// 服务器 URL
    url: String,
}

impl WebSocketClient {
    /// 创建新的 WebSocket 客户端
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            stream: None,
            state: Arc::new(Mutex::new(ConnectionState::Idle)),
            url: url.into(),
        }
    }

    /// 异步连接到 WebSocket 服务器
    ///
    /// 失败时进入 Closed 终态
    pub async fn connect(&mut self) -> Result<(), NetworkError> {
        self.set_state(ConnectionState::Connecting);

        match connect_async(&self.url).await {
            Ok((stream, _response)) => {
                self.stream = Some(stream);
                self.set_state(ConnectionState::Open);
                tracing::info!("Connected to Snowball WebSocket server at {}", self.url);
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();
                self.set_state(ConnectionState::Closed);
                Err(NetworkError::ConnectionFailed(error_msg))
            }
        }
    }

    /// 关闭连接，幂等
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
            tracing::info!("WebSocket connection closed");
        }
        self.set_state(ConnectionState::Closed);
    }

    /// 检查是否已连接
    pub fn is_open(&self) -> bool {
        self.state.lock().is_open()
    }

    /// 获取当前连接状态
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// 异步发送文本消息
    ///
    /// 仅在 Open 状态有效，其余状态返回 ConnectionLost
    pub async fn send_text(&mut self, text: &str) -> Result<(), NetworkError> {
        if let Some(ref mut stream) = self.stream {
            let message = Message::Text(text.to_string().into());
            stream
                .send(message)
                .await
                .map_err(|e| NetworkError::SendFailed(e.to_string()))?;
            Ok(())
        } else {
            Err(NetworkError::ConnectionLost)
        }
    }

    /// 接收下一条消息
    ///
    /// `Ok(None)` 表示对端关闭流；传输层错误进入 Closed 终态并返回 Err
    pub async fn receive(&mut self) -> Result<Option<WsMessage>, NetworkError> {
        let Some(stream) = &mut self.stream else {
            return Ok(None);
        };

        match stream.next().await {
            Some(Ok(message)) => match message {
                Message::Text(text) => Ok(Some(WsMessage::Text(text.as_str().to_string()))),
                Message::Binary(data) => Ok(Some(WsMessage::Binary(data.to_vec()))),
                Message::Ping(data) => Ok(Some(WsMessage::Ping(data.to_vec()))),
                Message::Pong(data) => Ok(Some(WsMessage::Pong(data.to_vec()))),
                Message::Close(_) => {
                    self.stream = None;
                    self.set_state(ConnectionState::Closed);
                    Ok(Some(WsMessage::Close))
                }
                Message::Frame(_) => Ok(None),
            },
            Some(Err(e)) => {
                self.stream = None;
                self.set_state(ConnectionState::Closed);
                Err(NetworkError::ReceiveError(e.to_string()))
            }
            None => {
                self.stream = None;
                self.set_state(ConnectionState::Closed);
                Ok(None)
            }
        }
    }

    /// 设置连接状态
    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }
}
