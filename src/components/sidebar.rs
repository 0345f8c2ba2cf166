//! Sidebar
//!
//! Section navigation, recent chat searches and the pin toggle. Unpinned,
//! the sidebar collapses to icons and expands on hover.

use cnpj_insight_core::recents;
use cnpj_insight_core::Section;
use leptos::prelude::*;

use crate::context::AppContext;
use crate::storage;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();
    let user_label = if storage::is_authenticated() { "Conectado" } else { "Visitante" };

    view! {
        <aside class=move || if ctx.sidebar_pinned.get() { "sidebar pinned" } else { "sidebar" }>
            <div class="sidebar-header">
                <span class="brand">"CNPJ Insight"</span>
                <button
                    class="pin-btn"
                    title=move || if ctx.sidebar_pinned.get() { "Desafixar menu" } else { "Fixar menu" }
                    on:click=move |_| ctx.toggle_pin()
                >
                    {move || if ctx.sidebar_pinned.get() { "📌" } else { "📍" }}
                </button>
            </div>

            <nav class="sidebar-nav">
                {Section::ALL.into_iter().map(|section| view! {
                    <button
                        class=move || if ctx.section.get() == section { "nav-item active" } else { "nav-item" }
                        on:click=move |_| ctx.navigate(section)
                    >
                        <span class="nav-icon">{section.icon()}</span>
                        <span class="nav-label">{section.title()}</span>
                    </button>
                }).collect_view()}
            </nav>

            <div class="sidebar-recents">
                <h4>"Buscas recentes"</h4>
                <Show
                    when=move || !store.recent_searches().read().is_empty()
                    fallback=|| view! { <p class="muted">"Nenhuma busca ainda"</p> }
                >
                    <ul>
                        {move || recents::shown(&store.recent_searches().read())
                            .iter()
                            .cloned()
                            .map(|query| {
                                let text = query.clone();
                                view! {
                                    <li class="recent-item" title=query.clone() on:click=move |_| ctx.fill_chat(text.clone())>
                                        {query.clone()}
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                </Show>
            </div>

            <div class="sidebar-footer">
                <span class="user-label">{user_label}</span>
            </div>
        </aside>
    }
}
