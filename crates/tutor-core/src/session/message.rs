//! Chat turn types.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::response::QualityScores;

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Outcome of the curriculum lookup for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchStatus {
    /// No lookup was attempted (greeting or non-educational question).
    Skipped,
    /// Retrieved context was non-empty.
    Found,
    /// Lookup ran but returned nothing, or the search failed.
    NotFound,
    /// No retriever for the current grade/subject.
    Unavailable,
}

/// Rendering metadata carried by assistant turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_markup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_scores: Option<QualityScores>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality_issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_status: Option<SearchStatus>,
}

/// A single turn in the chat log.
///
/// Messages are created by [`ChatSession::append`](super::ChatSession::append)
/// and never mutated afterwards. `id` equals the message's position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: usize,
    pub role: ChatRole,
    pub content: String,
    /// Local wall-clock time, `HH:MM:SS`.
    pub timestamp: String,
    #[serde(flatten)]
    pub extras: MessageExtras,
}

impl ChatMessage {
    pub fn is_user(&self) -> bool {
        self.role == ChatRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == ChatRole::Assistant
    }

    /// The text a reader sees for this turn: the explanation for assistant
    /// turns that carry one, otherwise the raw content.
    pub fn display_text(&self) -> &str {
        self.extras.explanation.as_deref().unwrap_or(&self.content)
    }
}
