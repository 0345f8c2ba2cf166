//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. Lists fetched
//! from the backend are replaced wholesale; the storage-backed lists are
//! written through to `localStorage` by the helpers below.

use cnpj_insight_core::favorites::{self, FavoriteOpportunity};
use cnpj_insight_core::models::{Company, Opportunity, Player, SavedFilters};
use cnpj_insight_core::recents;
use leptos::prelude::*;
use reactive_stores::Store;
use serde_json::Value;

use crate::models::{Author, ChatMessage};
use crate::storage;

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Prospecting table rows
    pub companies: Vec<Company>,
    /// Opportunity board rows
    pub opportunities: Vec<Opportunity>,
    /// Sector players under the market charts
    pub players: Vec<Player>,
    /// Last KPI body; the cards are derived from it and it backs the JSON export
    pub market_raw: Option<Value>,
    /// Market filters in effect
    pub market_filters: SavedFilters,
    /// Chat transcript, oldest first
    pub messages: Vec<ChatMessage>,
    /// Most recent first
    pub recent_searches: Vec<String>,
    pub favorites: Vec<FavoriteOpportunity>,
}

impl AppState {
    /// Restore the storage-backed lists
    pub fn load() -> Self {
        Self {
            recent_searches: storage::load(storage::RECENT_SEARCHES_KEY).unwrap_or_default(),
            favorites: storage::load(storage::FAVORITES_KEY).unwrap_or_default(),
            market_filters: storage::load(storage::SAVED_FILTERS_KEY).unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Append a chat message
pub fn store_push_message(store: &AppStore, author: Author, text: String) {
    let binding = store.messages();
    let mut messages = binding.write();
    let id = messages.last().map_or(0, |m| m.id + 1);
    messages.push(ChatMessage { id, author, text });
}

/// Record a sent query and persist the list
pub fn store_push_recent(store: &AppStore, query: &str) {
    let binding = store.recent_searches();
    let mut list = binding.write();
    if recents::push_recent(&mut list, query) {
        storage::save(storage::RECENT_SEARCHES_KEY, &*list);
    }
}

/// Star or unstar; returns whether the opportunity is now starred
pub fn store_toggle_favorite(store: &AppStore, opportunity: &Opportunity, added_at: String) -> bool {
    let binding = store.favorites();
    let mut list = binding.write();
    let starred = if favorites::remove_favorite(&mut list, &opportunity.id) {
        false
    } else {
        favorites::add_favorite(&mut list, FavoriteOpportunity::from_opportunity(opportunity, added_at))
    };
    storage::save(storage::FAVORITES_KEY, &*list);
    starred
}

/// Persist the market filters currently in effect
pub fn store_save_filters(store: &AppStore) {
    storage::save(storage::SAVED_FILTERS_KEY, &store.market_filters().get_untracked());
}

/// Reset the market filters, in memory and in storage
pub fn store_clear_filters(store: &AppStore) {
    store.market_filters().set(SavedFilters::default());
    storage::remove(storage::SAVED_FILTERS_KEY);
}
