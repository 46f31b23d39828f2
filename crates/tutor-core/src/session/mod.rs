//! Chat session state: the ordered turn log for one student.

mod chat;
mod message;

pub use chat::ChatSession;
pub use message::{ChatMessage, ChatRole, MessageExtras, SearchStatus};
