//! Opportunity Board
//!
//! PNCP notices as cards or a list, with removable filter chips and a
//! favourite star per notice.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use cnpj_insight_core::favorites::is_favorite;
use cnpj_insight_core::filters::{FilterField, OpportunityFilter, OpportunitySort, SelectValue, ValueRange};
use cnpj_insight_core::format::{chance_of_success, format_currency_rounded, format_date_br, opportunity_match_class};
use cnpj_insight_core::models::Opportunity;
use cnpj_insight_core::{paginate, Page, Section, SectionJump};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::{info, warn};

use crate::browser;
use crate::components::pagination::Pagination;
use crate::components::select::{parse_select, select_options};
use crate::context::AppContext;
use crate::debounce::Debouncer;
use crate::models::{LoadState, ViewMode};
use crate::store::{store_toggle_favorite, use_app_store, AppStateStoreFields};

const MODALITIES: [&str; 5] = ["Pregão", "Concorrência", "Dispensa", "Inexigibilidade", "Leilão"];

/// Agencies present in the loaded notices, for the agency select
fn agency_options(rows: &[Opportunity]) -> Vec<String> {
    rows.iter()
        .map(|o| o.agency.trim())
        .filter(|a| !a.is_empty() && *a != cnpj_insight_core::format::DASH)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[component]
pub fn OpportunityBoard() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();
    let config = ctx.config();
    let page_size = config.opportunities_page_size;
    let debouncer = Debouncer::new(config.search_debounce_ms);
    let today = browser::today();

    let (filter, set_filter) = signal(OpportunityFilter::default());
    let (sort, set_sort) = signal(OpportunitySort::default());
    let (page, set_page) = signal(1usize);
    let (view_mode, set_view_mode) = signal(ViewMode::default());
    let (load_state, set_load_state) = signal(LoadState::Idle);
    let (reload, set_reload) = signal(0u32);

    Effect::new(move |_| {
        let _ = reload.get();
        let f = filter.get_untracked();
        set_load_state.set(LoadState::Loading);
        spawn_local(async move {
            match ctx.api().list_opportunities(&f.term, &f.agency, &f.modality, today).await {
                Ok(rows) => {
                    info!(count = rows.len(), "opportunities loaded");
                    store.opportunities().set(rows);
                    set_load_state.set(LoadState::Idle);
                }
                Err(e) => {
                    warn!(error = %e, "opportunity listing failed");
                    store.opportunities().set(Vec::new());
                    set_load_state.set(LoadState::Failed("Não foi possível carregar as oportunidades.".to_string()));
                }
            }
        });
    });

    let refetch = move || set_reload.update(|v| *v += 1);

    Effect::new(move |_| {
        if let Some(SectionJump::Opportunities { search }) = ctx.take_jump(Section::Opportunities) {
            set_filter.update(|f| f.term = search);
            set_page.set(1);
            refetch();
        }
    });

    let current: Memo<Page<Opportunity>> = Memo::new(move |_| {
        let rows = store.opportunities().read();
        paginate(&rows, &filter.get(), &sort.get(), page.get(), page_size)
    });

    Effect::new(move |_| {
        let index = current.get().index;
        if index != page.get_untracked() {
            set_page.set(index);
        }
    });

    let remove_chip = move |field: FilterField| {
        set_filter.update(|f| f.clear(field));
        set_page.set(1);
        if field != FilterField::Value {
            refetch();
        }
    };

    let toggle_favorite = move |o: Opportunity| {
        let starred = store_toggle_favorite(&store, &o, browser::now_rfc3339());
        spawn_local(async move {
            let api = ctx.api();
            let result = if starred {
                api.add_favorite(&o).await
            } else {
                api.remove_favorite(&o.id).await
            };
            if let Err(e) = result {
                warn!(error = %e, id = %o.id, "favourite sync failed; keeping local copy");
            }
        });
    };

    let render = move |o: Opportunity| {
        let starred = Signal::derive({
            let id = o.id.clone();
            move || is_favorite(&store.favorites().read(), &id)
        });
        match view_mode.get_untracked() {
            ViewMode::Cards => opportunity_card(o, today, starred, toggle_favorite),
            ViewMode::List => opportunity_list_row(o, today, starred, toggle_favorite),
        }
    };

    view! {
        <section class="opportunities-view">
            <div class="filters-bar">
                <input
                    type="search"
                    class="filter-input search"
                    placeholder="Buscar por objeto ou município"
                    prop:value=move || filter.get().term
                    on:input=move |ev| {
                        let term = event_target_value(&ev);
                        set_filter.update(|f| f.term = term);
                        set_page.set(1);
                        debouncer.run(refetch);
                    }
                />
                <select
                    class="filter-select"
                    prop:value=move || filter.get().agency
                    on:change=move |ev| {
                        let agency = event_target_value(&ev);
                        set_filter.update(|f| f.agency = agency);
                        set_page.set(1);
                        refetch();
                    }
                >
                    <option value="">"Todos os órgãos"</option>
                    {move || agency_options(&store.opportunities().read())
                        .into_iter()
                        .map(|a| view! { <option value=a.clone()>{a.clone()}</option> })
                        .collect_view()}
                </select>
                <select
                    class="filter-select"
                    prop:value=move || filter.get().modality
                    on:change=move |ev| {
                        let modality = event_target_value(&ev);
                        set_filter.update(|f| f.modality = modality);
                        set_page.set(1);
                        refetch();
                    }
                >
                    <option value="">"Todas as modalidades"</option>
                    {MODALITIES.iter().map(|m| view! { <option value=*m>{*m}</option> }).collect_view()}
                </select>
                <select
                    class="filter-select"
                    prop:value=move || filter.get().value_range.map(|r| r.value()).unwrap_or_default()
                    on:change=move |ev| {
                        let range = parse_select::<ValueRange>(&event_target_value(&ev));
                        set_filter.update(|f| f.value_range = range);
                        set_page.set(1);
                    }
                >
                    {select_options::<ValueRange>("Qualquer valor")}
                </select>
                <select
                    class="filter-select"
                    prop:value=move || sort.get().value()
                    on:change=move |ev| {
                        set_sort.set(OpportunitySort::parse(&event_target_value(&ev)).unwrap_or_default());
                        set_page.set(1);
                    }
                >
                    {OpportunitySort::ALL.iter().map(|s| view! { <option value=s.value()>{s.label()}</option> }).collect_view()}
                </select>
                <div class="view-toggle">
                    <button
                        class=move || if view_mode.get() == ViewMode::Cards { "toggle-btn active" } else { "toggle-btn" }
                        on:click=move |_| set_view_mode.set(ViewMode::Cards)
                    >
                        "▦"
                    </button>
                    <button
                        class=move || if view_mode.get() == ViewMode::List { "toggle-btn active" } else { "toggle-btn" }
                        on:click=move |_| set_view_mode.set(ViewMode::List)
                    >
                        "☰"
                    </button>
                </div>
            </div>

            <div class="filter-chips">
                {move || filter.get().chips().into_iter().map(|chip| {
                    let field = chip.field;
                    view! {
                        <span class="filter-chip">
                            {chip.label}
                            <button class="chip-remove" on:click=move |_| remove_chip(field)>"×"</button>
                        </span>
                    }
                }).collect_view()}
            </div>

            <p class="result-count">{move || format!("{} oportunidades encontradas", current.get().total_items)}</p>
            {move || load_state.get().error().map(|msg| view! { <div class="error-banner">{msg}</div> })}

            <Show
                when=move || !current.get().is_empty()
                fallback=move || view! {
                    <div class="empty-state">
                        {move || if load_state.get().is_loading() {
                            "Carregando oportunidades..."
                        } else {
                            "Nenhuma oportunidade encontrada com os filtros atuais."
                        }}
                    </div>
                }
            >
                <div class=move || match view_mode.get() {
                    ViewMode::Cards => "opportunity-grid",
                    ViewMode::List => "opportunity-list",
                }>
                    {move || {
                        let _ = view_mode.get();
                        current.get().items.into_iter().map(render).collect_view()
                    }}
                </div>
            </Show>

            <Pagination
                current=Signal::derive(move || current.get().index)
                total_pages=Signal::derive(move || current.get().total_pages)
                on_change=move |n: usize| set_page.set(n)
            />
        </section>
    }
}

fn star_button(o: Opportunity, starred: Signal<bool>, on_toggle: impl Fn(Opportunity) + Copy + 'static) -> impl IntoView {
    view! {
        <button
            class=move || if starred.get() { "star-btn starred" } else { "star-btn" }
            title=move || if starred.get() { "Remover dos favoritos" } else { "Adicionar aos favoritos" }
            on:click=move |ev| {
                ev.stop_propagation();
                on_toggle(o.clone());
            }
        >
            {move || if starred.get() { "★" } else { "☆" }}
        </button>
    }
}

fn opportunity_card(
    o: Opportunity,
    today: NaiveDate,
    starred: Signal<bool>,
    on_toggle: impl Fn(Opportunity) + Copy + 'static,
) -> AnyView {
    let status = o.deadline_status(today);
    let place = format!("{} • {}", o.uf, o.municipality);
    view! {
        <article class="opportunity-card">
            <header class="card-header">
                <span class=format!("deadline-badge {}", status.class())>{status.label()}</span>
                {star_button(o.clone(), starred, on_toggle)}
            </header>
            <h3 class="card-title">{o.title.clone()}</h3>
            <p class="card-agency">{o.agency.clone()}</p>
            <p class="card-meta">{o.modality.clone()} " • " {place}</p>
            <div class="card-value">{format_currency_rounded(o.value)}</div>
            <div class=format!("match-pill {}", opportunity_match_class(o.match_score))>
                {format!("{}% • {}", o.match_score, chance_of_success(o.match_score))}
            </div>
            <footer class="card-footer">
                <span>"Publicado em " {format_date_br(&o.published)}</span>
                <span>{status.remaining_text()}</span>
            </footer>
        </article>
    }
    .into_any()
}

fn opportunity_list_row(
    o: Opportunity,
    today: NaiveDate,
    starred: Signal<bool>,
    on_toggle: impl Fn(Opportunity) + Copy + 'static,
) -> AnyView {
    let status = o.deadline_status(today);
    view! {
        <div class="opportunity-row">
            {star_button(o.clone(), starred, on_toggle)}
            <div class="row-main">
                <div class="row-title">{o.title.clone()}</div>
                <div class="muted">{o.agency.clone()} " • " {o.modality.clone()}</div>
            </div>
            <div class="row-value">{format_currency_rounded(o.value)}</div>
            <span class=format!("deadline-badge {}", status.class())>{status.label()}</span>
        </div>
    }
    .into_any()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_opportunity(agency: &str) -> Opportunity {
        Opportunity {
            id: agency.to_string(),
            title: "Serviços de TI".to_string(),
            agency: agency.to_string(),
            modality: "Pregão".to_string(),
            value: 10_000.0,
            deadline: String::new(),
            deadline_days: None,
            situation: String::new(),
            uf: "SP".to_string(),
            municipality: "Campinas".to_string(),
            published: String::new(),
            match_score: 0,
        }
    }

    #[test]
    fn test_agency_options_sorted_and_unique() {
        let rows = vec![
            make_opportunity("Prefeitura de Campinas"),
            make_opportunity("Governo do Estado"),
            make_opportunity("Prefeitura de Campinas"),
            make_opportunity("—"),
            make_opportunity(" "),
        ];
        assert_eq!(agency_options(&rows), vec!["Governo do Estado", "Prefeitura de Campinas"]);
    }
}
