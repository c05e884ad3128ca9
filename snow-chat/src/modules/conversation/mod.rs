//! 会话模块
//!
//! 提供会话记录和会话控制器

pub mod controller;
pub mod transcript;

pub use controller::ConversationController;
pub use transcript::{ChatMessage, Sender, Transcript};
