//! CNAE Autocomplete Component
//!
//! CNAE input with backend suggestions. Fetches are debounced and only fire
//! for terms of two or more characters, or when a sector is chosen.

use cnpj_insight_core::models::CnaeSuggestion;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::warn;
use wasm_bindgen::JsCast;

use crate::context::AppContext;
use crate::debounce::Debouncer;

/// Whether `term` (or a chosen sector) is enough to ask for suggestions
pub fn should_suggest(term: &str, sector: &str) -> bool {
    term.trim().chars().count() >= 2 || !sector.is_empty()
}

/// CNAE input with a suggestion list
///
/// Props:
/// - value: CNAE text shown in the input (kept in sync by the parent)
/// - sector: selected sector, narrows the suggestions
/// - on_input: every keystroke, so the parent can track free text
/// - on_select: a suggestion was picked
#[component]
pub fn CnaeAutocomplete(
    #[prop(into)] value: Signal<String>,
    #[prop(into)] sector: Signal<String>,
    #[prop(into)] on_input: Callback<String>,
    #[prop(into)] on_select: Callback<CnaeSuggestion>,
) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let debouncer = Debouncer::new(ctx.config().suggest_debounce_ms);
    let (suggestions, set_suggestions) = signal(Vec::<CnaeSuggestion>::new());
    let (selected_idx, set_selected_idx) = signal(0usize);

    let fetch_suggestions = move |term: String| {
        let sector = sector.get_untracked();
        if !should_suggest(&term, &sector) {
            set_suggestions.set(Vec::new());
            return;
        }
        debouncer.run(move || {
            spawn_local(async move {
                match ctx.api().cnae_suggestions(term.trim(), &sector).await {
                    Ok(list) => {
                        set_selected_idx.set(0);
                        set_suggestions.set(list);
                    }
                    Err(e) => {
                        warn!(error = %e, "CNAE suggestions failed");
                        set_suggestions.set(Vec::new());
                    }
                }
            });
        });
    };

    // A sector change refreshes the list even with an empty term
    Effect::new(move |prev: Option<String>| {
        let current = sector.get();
        if prev.is_some_and(|p| p != current) {
            fetch_suggestions(value.get_untracked());
        }
        current
    });

    let handle_select = move |s: CnaeSuggestion| {
        set_suggestions.set(Vec::new());
        set_selected_idx.set(0);
        on_select.run(s);
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        let sugg = suggestions.get_untracked();
        match ev.key().as_str() {
            "Tab" | "Enter" => {
                let sel = selected_idx.get_untracked();
                if let Some(s) = sugg.get(sel) {
                    ev.prevent_default();
                    handle_select(s.clone());
                }
            }
            "ArrowDown" => {
                ev.prevent_default();
                let sel = selected_idx.get_untracked();
                if sel + 1 < sugg.len() {
                    set_selected_idx.set(sel + 1);
                }
            }
            "ArrowUp" => {
                ev.prevent_default();
                let sel = selected_idx.get_untracked();
                if sel > 0 {
                    set_selected_idx.set(sel - 1);
                }
            }
            "Escape" => set_suggestions.set(Vec::new()),
            _ => {}
        }
    };

    view! {
        <div class="cnae-input-wrapper">
            <input
                type="text"
                class="filter-input"
                placeholder="CNAE ou atividade (ex: 6204 ou software)"
                autocomplete="off"
                prop:value=move || value.get()
                on:input=move |ev| {
                    let Some(input) = ev.target().and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok()) else {
                        return;
                    };
                    let text = input.value();
                    on_input.run(text.clone());
                    fetch_suggestions(text);
                }
                on:keydown=on_keydown
            />

            {move || {
                let sugg = suggestions.get();
                if sugg.is_empty() {
                    view! { <div></div> }.into_any()
                } else {
                    let selected = selected_idx.get();
                    view! {
                        <div class="autocomplete-list">
                            {sugg.into_iter().enumerate().map(|(i, s)| {
                                let label = s.label();
                                view! {
                                    <button
                                        type="button"
                                        class=if i == selected { "autocomplete-item selected" } else { "autocomplete-item" }
                                        on:click=move |ev| {
                                            ev.prevent_default();
                                            handle_select(s.clone());
                                        }
                                    >
                                        {label}
                                    </button>
                                }
                            }).collect_view()}
                        </div>
                    }.into_any()
                }
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_suggest() {
        assert!(!should_suggest("", ""));
        assert!(!should_suggest(" a ", ""));
        assert!(should_suggest("62", ""));
        assert!(should_suggest("", "Tecnologia"));
    }
}
