//! SnowChat 核心库
//!
//! Snowball 助手的桌面聊天客户端：
//! 维护一条 WebSocket 会话，按提交/接收顺序维护会话记录

mod error;
mod modules;
mod state;

use anyhow::Result;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

pub use error::{AppError, ConfigError, ErrorCode, NetworkError, ProtocolError, SpeechError};
pub use modules::config::{ConfigManager, SpeechSettings, UserConfig};
pub use modules::conversation::{ChatMessage, ConversationController, Sender, Transcript};
pub use modules::events::{EventDispatcher, UiEvent, UiEventCallback};
pub use modules::network::{
    CloseHandle, ConnectionState, Dialect, FrameCodec, Inbound, SnowballClient, SnowballConfig,
    SnowballEvent, WebSocketClient, WsMessage,
};
pub use modules::speech::{ResultCallback, SpeechRecognizer, SpeechSession, DEFAULT_LOCALE};
pub use state::AppState;

pub(crate) const APP_DIR: &str = "snow-chat";

/// 初始化应用
pub fn init_app() -> Result<()> {
    use tracing_subscriber::fmt;
    fmt::init();
    Ok(())
}

/// 运行终端聊天客户端
///
/// 事件循环在单任务内串行处理用户输入与会话事件，
/// 会话记录追加因此天然有序
pub async fn run() -> Result<()> {
    init_app()?;

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(APP_DIR);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    let config_manager = ConfigManager::new(config_dir);
    let config = config_manager.load()?;

    if config.speech.enabled {
        tracing::warn!("Speech input is enabled but no recognizer is bundled, ignoring");
    }

    let state = AppState::new();
    let dispatcher = Arc::new(EventDispatcher::new());
    dispatcher.on_event(|event| match event {
        UiEvent::MessageAppended { sender, text, .. } => println!("{}: {}", sender, text),
        UiEvent::Alert { message } => eprintln!("[!] {}", message),
        UiEvent::ConnectionStateChanged { state, .. } => {
            tracing::info!("Connection state: {}", state);
        }
        UiEvent::ListeningStateChanged { .. } => {}
    });

    let mut client = SnowballClient::new(config.server.clone());
    if let Err(e) = client.connect().await {
        dispatcher.emit_alert(&format!("WebSocket connection error: {}", e));
        return Err(e.into());
    }
    let close_handle = client.close_handle();

    let (outbound_tx, outbound_rx) = mpsc::channel(32);
    let (event_tx, mut event_rx) = mpsc::channel(100);
    let controller = Arc::new(ConversationController::new(
        state.clone(),
        outbound_tx,
        dispatcher.clone(),
    ));

    let connection_task = tokio::spawn(client.run(outbound_rx, event_tx));

    println!(
        "Connected to Snowball at {} ({}). Type a command, /quit to exit.",
        config.server.url(),
        config.server.dialect
    );

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(event) => controller.handle_event(event),
                // 连接任务已退出
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if line.trim() == "/quit" {
                        break;
                    }
                    controller.submit_text(&line);
                }
                // stdin 关闭
                None => break,
            },
        }
    }

    close_handle.close();
    drop(controller);
    connection_task.await?;
    Ok(())
}
