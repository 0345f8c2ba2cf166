//! CNPJ Insight App
//!
//! Sidebar plus one main view at a time. Root state is created here and
//! handed down through context.

use cnpj_insight_core::{AppConfig, Section, SectionJump};
use leptos::prelude::*;
use reactive_stores::Store;
use tracing::info;

use crate::browser;
use crate::components::{ChatPanel, CnpjLookup, CompaniesTable, MarketView, OpportunityBoard, Sidebar};
use crate::context::AppContext;
use crate::storage;
use crate::store::AppState;

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    let mut state = AppState::load();
    // A shared link wins over saved filters and opens the market view
    let shared = browser::shared_filters();
    let start = if let Some(filters) = shared {
        info!(cnae = %filters.cnae, uf = %filters.uf, "opening shared market filters");
        state.market_filters = filters;
        Section::Market
    } else {
        Section::default()
    };

    let section = signal(start);
    let pinned = signal(storage::load::<bool>(storage::SIDEBAR_PINNED_KEY).unwrap_or(false));
    let prefill = signal(String::new());
    let jump = signal(None::<SectionJump>);

    let ctx = AppContext::new(section, pinned, prefill, jump, config);
    provide_context(ctx);
    provide_context(Store::new(state));

    view! {
        <div class=move || if ctx.sidebar_pinned.get() { "app-layout sidebar-pinned" } else { "app-layout" }>
            <Sidebar />
            <main class="main-content">
                <header class="view-header">
                    <span class="view-icon">{move || ctx.section.get().icon()}</span>
                    <h1>{move || ctx.section.get().title()}</h1>
                </header>
                {move || match ctx.section.get() {
                    Section::Chat => view! { <ChatPanel /> }.into_any(),
                    Section::Market => view! { <MarketView /> }.into_any(),
                    Section::Companies => view! { <CompaniesTable /> }.into_any(),
                    Section::Opportunities => view! { <OpportunityBoard /> }.into_any(),
                    Section::CnpjLookup => view! { <CnpjLookup /> }.into_any(),
                }}
            </main>
        </div>
    }
}
