//! Chat Panel
//!
//! Transcript plus input. Each sent message is answered by the intent
//! router and may also move the dashboard to a related view.

use cnpj_insight_core::intent::section_jump;
use cnpj_insight_core::reply::{answer, HELP_TEXT};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::debug;

use crate::context::AppContext;
use crate::models::Author;
use crate::store::{store_push_message, store_push_recent, use_app_store, AppStateStoreFields};

#[component]
pub fn ChatPanel() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();

    let (draft, set_draft) = signal(String::new());
    let (pending, set_pending) = signal(0usize);
    let transcript_ref = NodeRef::<html::Div>::new();

    if store.messages().read_untracked().is_empty() {
        store_push_message(&store, Author::Assistant, HELP_TEXT.to_string());
    }

    // Sidebar recent-search clicks
    Effect::new(move |_| {
        let text = ctx.chat_prefill.get();
        if !text.is_empty() {
            set_draft.set(text);
        }
    });

    // Keep the latest message in view
    Effect::new(move |_| {
        let _ = store.messages().read().len();
        let _ = pending.get();
        if let Some(el) = transcript_ref.get() {
            el.set_scroll_top(el.scroll_height());
        }
    });

    let send = move || {
        let text = draft.get_untracked().trim().to_string();
        if text.is_empty() {
            return;
        }
        set_draft.set(String::new());
        store_push_message(&store, Author::User, text.clone());
        store_push_recent(&store, &text);

        if let Some(jump) = section_jump(&text) {
            debug!(?jump, "chat jump");
            ctx.jump(jump);
        }

        set_pending.update(|n| *n += 1);
        spawn_local(async move {
            let reply = answer(&ctx.api(), &text).await;
            store_push_message(&store, Author::Assistant, reply);
            set_pending.update(|n| *n = n.saturating_sub(1));
        });
    };

    view! {
        <section class="chat-panel">
            <div class="chat-transcript" node_ref=transcript_ref>
                <For
                    each=move || store.messages().get()
                    key=|m| m.id
                    children=|m| view! { <div class=m.class()>{m.text.clone()}</div> }
                />
                <Show when=move || { pending.get() > 0 }>
                    <div class="chat-message assistant typing">
                        <span class="dot"></span>
                        <span class="dot"></span>
                        <span class="dot"></span>
                    </div>
                </Show>
            </div>
            <form
                class="chat-input-row"
                on:submit=move |ev| {
                    ev.prevent_default();
                    send();
                }
            >
                <input
                    type="text"
                    class="chat-input"
                    placeholder="Pergunte sobre CNPJs, setores ou licitações..."
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                />
                <button type="submit" class="primary-btn" disabled=move || draft.get().trim().is_empty()>
                    "Enviar"
                </button>
            </form>
        </section>
    }
}
