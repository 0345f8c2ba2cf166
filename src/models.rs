//! Frontend Models
//!
//! View-only state; backend records live in `cnpj_insight_core::models`.

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u32,
    pub author: Author,
    pub text: String,
}

impl ChatMessage {
    pub fn class(&self) -> &'static str {
        match self.author {
            Author::User => "chat-message user",
            Author::Assistant => "chat-message assistant",
        }
    }
}

/// Opportunity board layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Cards,
    List,
}

/// Progress of a one-shot backend load
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<String> {
        match self {
            LoadState::Failed(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}
