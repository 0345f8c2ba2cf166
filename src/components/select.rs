//! Select Options
//!
//! `<option>` lists for the filter selects. The first option is always the
//! empty "all" value.

use cnpj_insight_core::filters::SelectValue;
use cnpj_insight_core::format::STATES;
use leptos::prelude::*;

pub fn select_options<T: SelectValue>(all_label: &'static str) -> impl IntoView {
    view! {
        <option value="">{all_label}</option>
        {T::ALL.iter().map(|v| view! { <option value=v.value()>{v.label()}</option> }).collect_view()}
    }
}

pub fn uf_options(all_label: &'static str) -> impl IntoView {
    view! {
        <option value="">{all_label}</option>
        {STATES.iter().map(|uf| view! { <option value=*uf>{*uf}</option> }).collect_view()}
    }
}

/// Empty select value means "no filter"
pub fn parse_select<T: SelectValue>(value: &str) -> Option<T> {
    if value.is_empty() {
        None
    } else {
        T::parse(value)
    }
}

/// Numeric column filter; blank or invalid input clears it
pub fn parse_min<N: std::str::FromStr>(value: &str) -> Option<N> {
    value.trim().parse().ok()
}
