//! Companies Table
//!
//! B2B prospecting list. The backend is queried with the coarse filters;
//! the full criteria, sort and pagination then run client-side over the
//! rows it returned.

use cnpj_insight_core::filters::{AgeRange, ColumnFilters, CompanyFilter, CompanySort, MatchBand, SelectValue};
use cnpj_insight_core::format::{
    badge_class, company_match_class, format_currency_rounded, format_optional_integer, normalize_cnpj, DASH,
};
use cnpj_insight_core::models::Company;
use cnpj_insight_core::{paginate, Page, Section, SectionJump};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::{info, warn};

use crate::api::CompanyListing;
use crate::components::pagination::Pagination;
use crate::components::select::{parse_min, parse_select, select_options, uf_options};
use crate::context::AppContext;
use crate::debounce::Debouncer;
use crate::models::LoadState;
use crate::store::{use_app_store, AppStateStoreFields};

fn listing_for(filter: &CompanyFilter, sort: CompanySort, page: usize) -> CompanyListing {
    CompanyListing {
        search: filter.term.trim().to_string(),
        uf: filter.uf.clone(),
        size: filter.size.clone(),
        age: filter.age_range.map(|r| r.value().to_string()).unwrap_or_default(),
        situation: filter.situation.clone(),
        order: sort.value().to_string(),
        page,
    }
}

#[component]
pub fn CompaniesTable() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();
    let config = ctx.config();
    let page_size = config.companies_page_size;
    let debouncer = Debouncer::new(config.search_debounce_ms);

    let (filter, set_filter) = signal(CompanyFilter::default());
    let (sort, set_sort) = signal(CompanySort::default());
    let (page, set_page) = signal(1usize);
    let (load_state, set_load_state) = signal(LoadState::Idle);
    let (reload, set_reload) = signal(0u32);

    // Fetch when the backend-side filters change
    Effect::new(move |_| {
        let _ = reload.get();
        let f = filter.get_untracked();
        let order = sort.get_untracked();
        set_load_state.set(LoadState::Loading);
        spawn_local(async move {
            let api = ctx.api();
            let result = match normalize_cnpj(f.term.trim()) {
                Some(cnpj) => api.compatible_companies(&cnpj, &f.uf).await,
                None => api.list_companies(&listing_for(&f, order, 1)).await,
            };
            match result {
                Ok(rows) => {
                    info!(count = rows.len(), "companies loaded");
                    store.companies().set(rows);
                    set_load_state.set(LoadState::Idle);
                }
                Err(e) => {
                    warn!(error = %e, "company listing failed");
                    store.companies().set(Vec::new());
                    set_load_state.set(LoadState::Failed("Não foi possível carregar as empresas.".to_string()));
                }
            }
        });
    });

    let refetch = move || set_reload.update(|v| *v += 1);

    // Chat jumps prefill the search
    Effect::new(move |_| {
        if let Some(SectionJump::Companies { search }) = ctx.take_jump(Section::Companies) {
            set_filter.update(|f| f.term = search);
            set_page.set(1);
            refetch();
        }
    });

    let current: Memo<Page<Company>> = Memo::new(move |_| {
        let rows = store.companies().read();
        paginate(&rows, &filter.get(), &sort.get(), page.get(), page_size)
    });

    // Write the clamped index back
    Effect::new(move |_| {
        let index = current.get().index;
        if index != page.get_untracked() {
            set_page.set(index);
        }
    });

    // Backend filters refetch; client-only filters just re-page
    let update_remote = move |apply: Box<dyn FnOnce(&mut CompanyFilter)>| {
        set_filter.update(apply);
        set_page.set(1);
        refetch();
    };
    let update_local = move |apply: Box<dyn FnOnce(&mut CompanyFilter)>| {
        set_filter.update(apply);
        set_page.set(1);
    };
    let update_column = move |apply: Box<dyn FnOnce(&mut ColumnFilters)>| {
        set_filter.update(|f| apply(&mut f.columns));
        set_page.set(1);
    };

    view! {
        <section class="companies-view">
            <div class="filters-bar">
                <input
                    type="search"
                    class="filter-input search"
                    placeholder="Buscar por nome, CNAE ou CNPJ do seu negócio"
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
                    prop:value=move || filter.get().uf
                    on:change=move |ev| {
                        let uf = event_target_value(&ev);
                        update_remote(Box::new(move |f| f.uf = uf));
                    }
                >
                    {uf_options("Todas as UFs")}
                </select>
                <select
                    class="filter-select"
                    prop:value=move || filter.get().match_band.map(|b| b.value()).unwrap_or_default()
                    on:change=move |ev| {
                        let band = parse_select::<MatchBand>(&event_target_value(&ev));
                        update_local(Box::new(move |f| f.match_band = band));
                    }
                >
                    {select_options::<MatchBand>("Qualquer match")}
                </select>
                <select
                    class="filter-select"
                    prop:value=move || filter.get().size
                    on:change=move |ev| {
                        let size = event_target_value(&ev);
                        update_remote(Box::new(move |f| f.size = size));
                    }
                >
                    <option value="">"Qualquer porte"</option>
                    <option value="Microempresa">"Microempresa"</option>
                    <option value="Pequeno Porte">"Pequeno Porte"</option>
                    <option value="Médio Porte">"Médio Porte"</option>
                    <option value="Grande Porte">"Grande Porte"</option>
                </select>
                <select
                    class="filter-select"
                    prop:value=move || filter.get().age_range.map(|r| r.value()).unwrap_or_default()
                    on:change=move |ev| {
                        let range = parse_select::<AgeRange>(&event_target_value(&ev));
                        update_remote(Box::new(move |f| f.age_range = range));
                    }
                >
                    {select_options::<AgeRange>("Qualquer idade")}
                </select>
                <select
                    class="filter-select"
                    prop:value=move || filter.get().situation
                    on:change=move |ev| {
                        let situation = event_target_value(&ev);
                        update_remote(Box::new(move |f| f.situation = situation));
                    }
                >
                    <option value="">"Qualquer situação"</option>
                    <option value="Ativa">"Ativa"</option>
                    <option value="Crescimento">"Crescimento"</option>
                    <option value="Expansão">"Expansão"</option>
                    <option value="Consolidada">"Consolidada"</option>
                </select>
                <select
                    class="filter-select"
                    prop:value=move || sort.get().value()
                    on:change=move |ev| {
                        set_sort.set(CompanySort::parse(&event_target_value(&ev)).unwrap_or_default());
                        set_page.set(1);
                    }
                >
                    {CompanySort::ALL.iter().map(|s| view! { <option value=s.value()>{s.label()}</option> }).collect_view()}
                </select>
            </div>

            <p class="result-count">
                {move || {
                    let p = current.get();
                    if filter.get().is_cnpj_search() {
                        format!("{} empresas compatíveis com o CNPJ informado", p.total_items)
                    } else {
                        format!("{} empresas encontradas", p.total_items)
                    }
                }}
            </p>
            {move || load_state.get().error().map(|msg| view! { <div class="error-banner">{msg}</div> })}

            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Empresa"</th>
                        <th>"Setor"</th>
                        <th>"UF / Município"</th>
                        <th>"Porte"</th>
                        <th>"Idade"</th>
                        <th>"Capital"</th>
                        <th>"Sócios"</th>
                        <th>"Match"</th>
                    </tr>
                    <tr class="column-filters">
                        <th>
                            <input type="text" placeholder="Nome"
                                on:input=move |ev| {
                                    let v = event_target_value(&ev);
                                    update_column(Box::new(move |c| c.name = v));
                                }
                            />
                        </th>
                        <th>
                            <input type="text" placeholder="Setor"
                                on:input=move |ev| {
                                    let v = event_target_value(&ev);
                                    update_column(Box::new(move |c| c.sector = v));
                                }
                            />
                        </th>
                        <th></th>
                        <th>
                            <input type="text" placeholder="Porte"
                                on:input=move |ev| {
                                    let v = event_target_value(&ev);
                                    update_column(Box::new(move |c| c.size = v));
                                }
                            />
                        </th>
                        <th>
                            <input type="number" min="0" placeholder="≥ anos"
                                on:input=move |ev| {
                                    let v = parse_min(&event_target_value(&ev));
                                    update_column(Box::new(move |c| c.min_age = v));
                                }
                            />
                        </th>
                        <th>
                            <input type="number" min="0" placeholder="≥ R$"
                                on:input=move |ev| {
                                    let v = parse_min(&event_target_value(&ev));
                                    update_column(Box::new(move |c| c.min_capital = v));
                                }
                            />
                        </th>
                        <th>
                            <input type="number" min="0" placeholder="≥"
                                on:input=move |ev| {
                                    let v = parse_min(&event_target_value(&ev));
                                    update_column(Box::new(move |c| c.min_partners = v));
                                }
                            />
                        </th>
                        <th>
                            <input type="number" min="0" max="100" placeholder="≥ %"
                                on:input=move |ev| {
                                    let v = parse_min(&event_target_value(&ev));
                                    update_column(Box::new(move |c| c.min_match = v));
                                }
                            />
                        </th>
                    </tr>
                </thead>
                <tbody>
                    <Show
                        when=move || !current.get().is_empty()
                        fallback=move || view! {
                            <tr>
                                <td colspan="8" class="empty-state">
                                    {move || if load_state.get().is_loading() {
                                        "Carregando empresas..."
                                    } else {
                                        "Nenhuma empresa encontrada com os filtros atuais."
                                    }}
                                </td>
                            </tr>
                        }
                    >
                        {move || current.get().items.into_iter().map(company_row).collect_view()}
                    </Show>
                </tbody>
            </table>

            <Pagination
                current=Signal::derive(move || current.get().index)
                total_pages=Signal::derive(move || current.get().total_pages)
                on_change=move |n: usize| set_page.set(n)
            />
        </section>
    }
}

fn company_row(c: Company) -> impl IntoView {
    let score = c.match_score.unwrap_or(0);
    let place = if c.municipality.is_empty() {
        c.uf.clone()
    } else {
        format!("{} / {}", c.uf, c.municipality)
    };
    view! {
        <tr>
            <td>
                <div class="company-name">{c.trade_name.clone()}</div>
                <div class="company-legal">{c.legal_name.clone()}</div>
                <div class="badges">
                    {c.badges.iter().map(|b| view! {
                        <span class=format!("badge {}", badge_class(b))>{b.clone()}</span>
                    }).collect_view()}
                </div>
            </td>
            <td>
                <div>{if c.cnae.is_empty() { DASH.to_string() } else { c.cnae.clone() }}</div>
                <div class="muted">{c.cnae_desc.clone()}</div>
            </td>
            <td>{place}</td>
            <td>{if c.size.is_empty() { DASH.to_string() } else { c.size.clone() }}</td>
            <td>{c.age.map(|a| format!("{} anos", a)).unwrap_or_else(|| DASH.to_string())}</td>
            <td>{c.share_capital.map(format_currency_rounded).unwrap_or_else(|| DASH.to_string())}</td>
            <td>{format_optional_integer(c.partners.map(i64::from))}</td>
            <td>
                <span class=format!("match-badge {}", company_match_class(score))>{format!("{}%", score)}</span>
            </td>
        </tr>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_carries_backend_filters() {
        let filter = CompanyFilter {
            term: "  software ".into(),
            uf: "SP".into(),
            age_range: Some(AgeRange::From2To5),
            ..CompanyFilter::default()
        };
        let listing = listing_for(&filter, CompanySort::CapitalDesc, 2);
        assert_eq!(listing.search, "software");
        assert_eq!(listing.age, "2-5");
        assert_eq!(listing.order, "capital_desc");
        assert_eq!(listing.page, 2);
    }
}
