//! Application Context
//!
//! Shared state provided via Leptos Context API.

use cnpj_insight_core::{AppConfig, Section, SectionJump};
use leptos::prelude::*;
use tracing::debug;

use crate::api::ApiClient;
use crate::storage;

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Visible top-level view - read
    pub section: ReadSignal<Section>,
    /// Visible top-level view - write
    set_section: WriteSignal<Section>,
    /// Sidebar stays expanded - read
    pub sidebar_pinned: ReadSignal<bool>,
    /// Sidebar stays expanded - write
    set_sidebar_pinned: WriteSignal<bool>,
    /// Text pushed into the chat input (recent-search clicks) - read
    pub chat_prefill: ReadSignal<String>,
    set_chat_prefill: WriteSignal<String>,
    /// Prefill waiting for the view a chat message jumped to - read
    pub pending_jump: ReadSignal<Option<SectionJump>>,
    set_pending_jump: WriteSignal<Option<SectionJump>>,
    config: StoredValue<AppConfig>,
    api: StoredValue<ApiClient>,
}

impl AppContext {
    pub fn new(
        section: (ReadSignal<Section>, WriteSignal<Section>),
        sidebar_pinned: (ReadSignal<bool>, WriteSignal<bool>),
        chat_prefill: (ReadSignal<String>, WriteSignal<String>),
        pending_jump: (ReadSignal<Option<SectionJump>>, WriteSignal<Option<SectionJump>>),
        config: AppConfig,
    ) -> Self {
        Self {
            section: section.0,
            set_section: section.1,
            sidebar_pinned: sidebar_pinned.0,
            set_sidebar_pinned: sidebar_pinned.1,
            chat_prefill: chat_prefill.0,
            set_chat_prefill: chat_prefill.1,
            pending_jump: pending_jump.0,
            set_pending_jump: pending_jump.1,
            api: StoredValue::new(ApiClient::new(config.clone())),
            config: StoredValue::new(config),
        }
    }

    pub fn api(&self) -> ApiClient {
        self.api.get_value()
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    pub fn navigate(&self, section: Section) {
        debug!(?section, "navigate");
        self.set_section.set(section);
    }

    /// Flip and persist the pin
    pub fn toggle_pin(&self) {
        let pinned = !self.sidebar_pinned.get_untracked();
        self.set_sidebar_pinned.set(pinned);
        storage::save(storage::SIDEBAR_PINNED_KEY, &pinned);
    }

    pub fn fill_chat(&self, text: String) {
        self.set_chat_prefill.set(text);
        self.navigate(Section::Chat);
    }

    /// Switch views and leave the prefill for the target view
    pub fn jump(&self, jump: SectionJump) {
        self.navigate(jump.section());
        self.set_pending_jump.set(Some(jump));
    }

    /// Hand the pending jump to `section`'s view, at most once
    pub fn take_jump(&self, section: Section) -> Option<SectionJump> {
        let jump = self.pending_jump.get()?;
        if jump.section() != section {
            return None;
        }
        self.set_pending_jump.set(None);
        Some(jump)
    }
}
