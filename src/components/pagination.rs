//! Pagination Component
//!
//! `‹ 1 … 4 5 6 … 12 ›` controls under a paged list.

use cnpj_insight_core::pipeline::{next_page, page_strip, prev_page, PageLink};
use leptos::prelude::*;

/// Page strip with previous/next buttons
///
/// Props:
/// - current: 1-based page shown
/// - total_pages: page count after filtering (at least 1)
/// - on_change: called with the requested page
#[component]
pub fn Pagination(
    #[prop(into)] current: Signal<usize>,
    #[prop(into)] total_pages: Signal<usize>,
    #[prop(into)] on_change: Callback<usize>,
) -> impl IntoView {
    let links = move || page_strip(current.get(), total_pages.get());

    view! {
        <nav class="pagination">
            <button
                class="page-btn"
                disabled=move || prev_page(current.get()).is_none()
                on:click=move |_| {
                    if let Some(n) = prev_page(current.get_untracked()) {
                        on_change.run(n);
                    }
                }
            >
                "‹"
            </button>
            {move || links().into_iter().map(|link| match link {
                PageLink::Page(n) => view! {
                    <button
                        class=move || if current.get() == n { "page-btn active" } else { "page-btn" }
                        on:click=move |_| on_change.run(n)
                    >
                        {n}
                    </button>
                }.into_any(),
                PageLink::Ellipsis => view! { <span class="page-ellipsis">"…"</span> }.into_any(),
            }).collect_view()}
            <button
                class="page-btn"
                disabled=move || next_page(current.get(), total_pages.get()).is_none()
                on:click=move |_| {
                    if let Some(n) = next_page(current.get_untracked(), total_pages.get_untracked()) {
                        on_change.run(n);
                    }
                }
            >
                "›"
            </button>
        </nav>
    }
}
