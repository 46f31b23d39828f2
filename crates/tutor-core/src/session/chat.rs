//! In-memory chat session.

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::{ChatMessage, ChatRole, MessageExtras};
use crate::curriculum::{Grade, Subject};

/// The state of one student's conversation.
///
/// The log is append-only: ids are dense and match list position, and
/// [`clear`](Self::clear) is the only way to drop turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub grade: Grade,
    pub subject: Subject,
    history: Vec<ChatMessage>,
    conversation_started: bool,
}

impl ChatSession {
    pub fn new(grade: Grade, subject: Subject) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            grade,
            subject,
            history: Vec::new(),
            conversation_started: false,
        }
    }

    /// Appends a turn and returns it. The id is the next ordinal.
    pub fn append(
        &mut self,
        role: ChatRole,
        content: impl Into<String>,
        extras: MessageExtras,
    ) -> &ChatMessage {
        let message = ChatMessage {
            id: self.history.len(),
            role,
            content: content.into(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            extras,
        };
        self.history.push(message);
        self.conversation_started = true;
        &self.history[self.history.len() - 1]
    }

    /// Empties the log and resets the started flag.
    pub fn clear(&mut self) {
        self.history.clear();
        self.conversation_started = false;
    }

    /// Changes the grade/subject selection. Returns whether anything changed.
    ///
    /// The log is kept; callers that want a fresh conversation call
    /// [`clear`](Self::clear) as well.
    pub fn select(&mut self, grade: Grade, subject: Subject) -> bool {
        let changed = self.grade != grade || self.subject != subject;
        self.grade = grade;
        self.subject = subject;
        changed
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn conversation_started(&self) -> bool {
        self.conversation_started
    }

    /// Marks the welcome message as shown.
    pub fn mark_started(&mut self) {
        self.conversation_started = true;
    }

    pub fn last_assistant(&self) -> Option<&ChatMessage> {
        self.history.iter().rev().find(|m| m.is_assistant())
    }

    /// Welcome text for the current selection.
    pub fn welcome_message(&self, tutor_ready: bool) -> String {
        let intro = format!(
            "أهلاً وسهلاً! أنا معلمك الذكي لطلاب {} في مادة {}.",
            self.grade.display_name(),
            self.subject.title()
        );
        let outro = if tutor_ready {
            "اسألني أي سؤال وسأجيبك بشرح مبسط ورسم توضيحي! 😊"
        } else {
            "حالياً، النظام في مرحلة الإعداد. يرجى المحاولة لاحقاً."
        };
        format!("{intro}\n{outro}")
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(Grade::default(), Subject::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_dense_ids() {
        let mut session = ChatSession::new(Grade::Grade1, Subject::Math);
        assert!(!session.conversation_started());

        session.append(ChatRole::User, "كم 2+3؟", MessageExtras::default());
        session.append(ChatRole::Assistant, "5", MessageExtras::default());
        session.append(ChatRole::User, "شكراً", MessageExtras::default());

        let ids: Vec<usize> = session.history().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(session.conversation_started());
        assert_eq!(session.last_assistant().unwrap().content, "5");
    }

    #[test]
    fn test_clear_resets_log_and_flag() {
        let mut session = ChatSession::default();
        session.append(ChatRole::User, "مرحبا", MessageExtras::default());
        session.clear();

        assert!(session.is_empty());
        assert!(!session.conversation_started());

        let first = session.append(ChatRole::User, "سؤال جديد", MessageExtras::default());
        assert_eq!(first.id, 0);
    }

    #[test]
    fn test_select_reports_change() {
        let mut session = ChatSession::new(Grade::Grade1, Subject::Arabic);
        assert!(!session.select(Grade::Grade1, Subject::Arabic));
        assert!(session.select(Grade::Grade3, Subject::Science));
        assert_eq!(session.grade, Grade::Grade3);
        assert_eq!(session.subject, Subject::Science);
    }

    #[test]
    fn test_welcome_message_names_selection() {
        let session = ChatSession::new(Grade::Grade2, Subject::Arabic);
        let ready = session.welcome_message(true);
        assert!(ready.contains("الصف الثاني الابتدائي"));
        assert!(ready.contains("لغتي الجميلة"));
        assert!(session.welcome_message(false).contains("مرحلة الإعداد"));
    }
}
