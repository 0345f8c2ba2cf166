//! Confirm Button Component
//!
//! Inline two-step button for actions that discard saved state.

use leptos::prelude::*;

/// Shows `label` first; clicking swaps in `prompt` with ✓/✗ buttons.
///
/// # Arguments
/// * `label` - text of the initial button (e.g. "Limpar")
/// * `button_class` - CSS class for the initial button
/// * `hint` - tooltip describing what will be discarded
/// * `prompt` - question shown while confirming
/// * `on_confirm` - Callback to execute when the user confirms
#[component]
pub fn ConfirmButton(
    #[prop(into)] label: String,
    #[prop(into)] button_class: String,
    #[prop(into)] hint: Signal<String>,
    #[prop(into, optional)] prompt: Option<String>,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let (confirming, set_confirming) = signal(false);
    let prompt = prompt.unwrap_or_else(|| "Confirmar?".to_string());

    view! {
        <Show
            when=move || confirming.get()
            fallback=move || view! {
                <button
                    class=button_class.clone()
                    title=move || hint.get()
                    on:click=move |_| set_confirming.set(true)
                >
                    {label.clone()}
                </button>
            }
        >
            <span class="confirm-inline" title=move || hint.get()>
                <span class="confirm-text">{prompt.clone()}</span>
                <button
                    class="confirm-btn"
                    on:click=move |_| {
                        set_confirming.set(false);
                        on_confirm.run(());
                    }
                >
                    "✓"
                </button>
                <button class="cancel-btn" on:click=move |_| set_confirming.set(false)>
                    "✗"
                </button>
            </span>
        </Show>
    }
}
