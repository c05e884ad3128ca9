//! 网络通信模块
//!
//! 提供 WebSocket 连接、线路协议和 Snowball 会话客户端

pub mod protocol;
pub mod snowball_client;
pub mod websocket;

pub use protocol::{Dialect, FrameCodec, Inbound};
pub use snowball_client::{CloseHandle, SnowballClient, SnowballConfig, SnowballEvent};
pub use websocket::{ConnectionState, WebSocketClient, WsMessage};
