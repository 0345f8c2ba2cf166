//! Market Analysis View
//!
//! KPI cards and charts for a CNAE/UF slice of the registry, the filter bar
//! that drives them, and the sector players found for the chosen CNAE.

use cnpj_insight_core::format::{
    format_currency_rounded, format_fixed1, format_integer, format_optional_integer, format_percent, DASH,
};
use cnpj_insight_core::market::{summarize, KpiPayload, MarketSummary, RankingRow, Window};
use cnpj_insight_core::models::{CnaeSuggestion, Player, SavedFilters, SectorQuery};
use cnpj_insight_core::{Section, SectionJump};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::{info, warn};

use crate::browser;
use crate::components::charts::{EntriesExitsChart, HorizontalBars, LineChart};
use crate::components::cnae_autocomplete::CnaeAutocomplete;
use crate::components::confirm_button::ConfirmButton;
use crate::components::select::uf_options;
use crate::context::AppContext;
use crate::models::LoadState;
use crate::store::{store_clear_filters, store_save_filters, use_app_store, AppStateStoreFields};

fn delta_text(delta: f64) -> String {
    if delta >= 0.0 {
        format!("▲ {}", format_percent(delta))
    } else {
        format!("▼ {}", format_percent(delta.abs()))
    }
}

fn delta_class(delta: f64) -> &'static str {
    if delta >= 0.0 {
        "kpi-delta up"
    } else {
        "kpi-delta down"
    }
}

/// Tooltip of the clear button, naming what it discards
fn clear_hint(filters: &SavedFilters) -> String {
    let mut parts = Vec::new();
    if !filters.cnae.is_empty() {
        parts.push(format!("CNAE {}", filters.cnae));
    }
    if !filters.uf.is_empty() {
        parts.push(format!("UF {}", filters.uf));
    }
    if parts.is_empty() {
        "Nenhum filtro aplicado".to_string()
    } else {
        format!("Remove os filtros salvos: {}", parts.join(", "))
    }
}

fn export_filename(filters: &SavedFilters) -> String {
    let scope = if filters.cnae.is_empty() { "geral" } else { filters.cnae.as_str() };
    if filters.uf.is_empty() {
        format!("analise-mercado-{}.json", scope)
    } else {
        format!("analise-mercado-{}-{}.json", scope, filters.uf.to_lowercase())
    }
}

#[component]
pub fn MarketView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();
    let players_limit = ctx.config().players_limit;

    let (cnae_text, set_cnae_text) = signal(String::new());
    let (uf, set_uf) = signal(String::new());
    let (sector, set_sector) = signal(String::new());
    let (sectors, set_sectors) = signal(Vec::<String>::new());
    let (churn, set_churn) = signal(Window::Days30);
    let (growth, set_growth) = signal(Window::Days30);
    let (load_state, set_load_state) = signal(LoadState::Idle);
    let (notice, set_notice) = signal(None::<String>);

    // Sector list for the select
    spawn_local(async move {
        match ctx.api().sectors().await {
            Ok(list) => set_sectors.set(list),
            Err(e) => warn!(error = %e, "sector list failed"),
        }
    });

    // Filters in effect drive both the KPIs and the players
    Effect::new(move |_| {
        let filters = store.market_filters().get();
        set_cnae_text.set(filters.cnae.clone());
        set_uf.set(filters.uf.clone());
        set_load_state.set(LoadState::Loading);
        spawn_local(async move {
            let api = ctx.api();
            match api.market_kpis(&filters).await {
                Ok((raw, _)) => {
                    store.market_raw().set(Some(raw));
                    set_load_state.set(LoadState::Idle);
                }
                Err(e) => {
                    warn!(error = %e, "market KPIs failed");
                    set_load_state.set(LoadState::Failed("Não foi possível carregar os indicadores.".to_string()));
                }
            }
            if filters.cnae.is_empty() {
                store.players().set(Vec::new());
                return;
            }
            let query = SectorQuery::players(&filters.cnae, &filters.uf, players_limit);
            match api.analyze_sector(&query).await {
                Ok(analysis) => {
                    info!(count = analysis.empresas.len(), cnae = %filters.cnae, "sector players loaded");
                    store.players().set(analysis.empresas);
                }
                Err(e) => {
                    warn!(error = %e, "sector players failed");
                    store.players().set(Vec::new());
                }
            }
        });
    });

    Effect::new(move |_| {
        if let Some(SectionJump::Market { cnae, uf }) = ctx.take_jump(Section::Market) {
            store
                .market_filters()
                .set(SavedFilters::normalized(&cnae, uf.as_deref().unwrap_or_default()));
        }
    });

    let summary: Memo<Option<MarketSummary>> = Memo::new(move |_| {
        let (churn, growth) = (churn.get(), growth.get());
        store
            .market_raw()
            .with(|raw| raw.as_ref().map(|raw| summarize(&KpiPayload::from_value(raw), churn, growth)))
    });

    let apply = move || {
        let filters = SavedFilters::normalized(&cnae_text.get_untracked(), &uf.get_untracked());
        set_notice.set(None);
        store.market_filters().set(filters);
    };

    let on_pick = move |s: CnaeSuggestion| {
        set_cnae_text.set(s.code.clone());
        let filters = SavedFilters::normalized(&s.code, &uf.get_untracked());
        store.market_filters().set(filters);
    };

    let on_save = move |_| {
        store_save_filters(&store);
        set_notice.set(Some("Filtros salvos".to_string()));
    };

    let on_clear = move |_: ()| {
        store_clear_filters(&store);
        set_sector.set(String::new());
        set_notice.set(Some("Filtros limpos".to_string()));
    };

    let on_export = move |_| {
        let Some(raw) = store.market_raw().get_untracked() else {
            set_notice.set(Some("Nenhum dado para exportar".to_string()));
            return;
        };
        let filters = store.market_filters().get_untracked();
        let result = serde_json::to_string_pretty(&raw)
            .map_err(|e| e.to_string())
            .and_then(|json| browser::download_json(&export_filename(&filters), &json));
        if let Err(e) = result {
            warn!(error = %e, "KPI export failed");
            set_notice.set(Some("Falha ao exportar".to_string()));
        }
    };

    let on_share = move |_| {
        let query = store.market_filters().get_untracked().share_query();
        let Some(url) = browser::page_url_with(&query) else {
            return;
        };
        spawn_local(async move {
            match browser::copy_to_clipboard(&url).await {
                Ok(()) => set_notice.set(Some("Link copiado!".to_string())),
                Err(e) => {
                    warn!(error = %e, "share link copy failed");
                    set_notice.set(Some(url));
                }
            }
        });
    };

    view! {
        <section class="market-view">
            <div class="filters-bar">
                <CnaeAutocomplete
                    value=cnae_text
                    sector=sector
                    on_input=move |text: String| set_cnae_text.set(text)
                    on_select=on_pick
                />
                <select
                    class="filter-select"
                    prop:value=move || sector.get()
                    on:change=move |ev| set_sector.set(event_target_value(&ev))
                >
                    <option value="">"Todos os setores"</option>
                    {move || sectors.get().into_iter().map(|s| view! { <option value=s.clone()>{s.clone()}</option> }).collect_view()}
                </select>
                <select
                    class="filter-select"
                    prop:value=move || uf.get()
                    on:change=move |ev| set_uf.set(event_target_value(&ev))
                >
                    {uf_options("Brasil")}
                </select>
                <button class="primary-btn" on:click=move |_| apply()>"Analisar"</button>
                <button class="secondary-btn" on:click=on_save>"Salvar"</button>
                <ConfirmButton
                    label="Limpar"
                    button_class="secondary-btn"
                    hint=Signal::derive(move || clear_hint(&store.market_filters().read()))
                    prompt="Limpar filtros?"
                    on_confirm=on_clear
                />
                <button class="secondary-btn" on:click=on_export>"Exportar"</button>
                <button class="secondary-btn" on:click=on_share>"Compartilhar"</button>
            </div>
            {move || notice.get().map(|msg| view! { <div class="notice">{msg}</div> })}
            {move || load_state.get().error().map(|msg| view! { <div class="error-banner">{msg}</div> })}

            {move || match summary.get() {
                None => view! {
                    <div class="empty-state">
                        {if load_state.get().is_loading() { "Carregando indicadores..." } else { "Sem indicadores" }}
                    </div>
                }.into_any(),
                Some(s) => market_body(s, churn, set_churn, growth, set_growth),
            }}

            <PlayersGrid />
        </section>
    }
}

fn window_toggle(current: ReadSignal<Window>, set: WriteSignal<Window>) -> impl IntoView {
    let btn = move |w: Window| {
        view! {
            <button
                class=move || if current.get() == w { "window-btn active" } else { "window-btn" }
                on:click=move |_| set.set(w)
            >
                {format!("{}d", w.days())}
            </button>
        }
    };
    view! { <span class="window-toggle">{btn(Window::Days30)} {btn(Window::Days60)}</span> }
}

fn ranking_list(title: &'static str, rows: Vec<RankingRow>, as_delta: bool) -> impl IntoView {
    view! {
        <div class="ranking">
            <h4>{title}</h4>
            <ol>
                {rows.into_iter().map(|r| {
                    let value = if as_delta { format!("{}%", r.value) } else { format_integer(r.value) };
                    view! { <li><span>{r.label}</span><strong>{value}</strong></li> }
                }).collect_view()}
            </ol>
        </div>
    }
}

fn market_body(
    s: MarketSummary,
    churn: ReadSignal<Window>,
    set_churn: WriteSignal<Window>,
    growth: ReadSignal<Window>,
    set_growth: WriteSignal<Window>,
) -> AnyView {
    let validity = s.validity_message();
    let filtered = s
        .total_filtered
        .map(|t| format!("{} empresas no filtro", format_integer(t)));
    view! {
        <div class="kpi-grid">
            <div class="kpi-card">
                <span class="kpi-title">"Empresas ativas"</span>
                <strong class="kpi-value">{format_optional_integer(s.total_active)}</strong>
                <span class=delta_class(s.active_delta)>{delta_text(s.active_delta)}</span>
            </div>
            <div class="kpi-card">
                <span class="kpi-title">"Entradas"</span>
                <strong class="kpi-value">{format_optional_integer(s.entries)}</strong>
                <span class=delta_class(s.entries_delta)>{delta_text(s.entries_delta)}</span>
                <span class="kpi-sub">{s.period_label.clone()}</span>
                {s.yoy.clone().map(|y| view! { <span class="kpi-sub">{y}</span> })}
            </div>
            <div class="kpi-card">
                <span class="kpi-title">"Saídas " {window_toggle(churn, set_churn)}</span>
                <strong class="kpi-value">{format_optional_integer(s.exits)}</strong>
                <span class=delta_class(-s.exits_delta)>{delta_text(s.exits_delta)}</span>
            </div>
            <div class="kpi-card">
                <span class="kpi-title">"Idade média"</span>
                <strong class="kpi-value">
                    {s.average_age.map(|a| format!("{} anos", format_fixed1(a))).unwrap_or_else(|| DASH.to_string())}
                </strong>
            </div>
            <div class="kpi-card">
                <span class="kpi-title">"Dados válidos"</span>
                <strong class="kpi-value">{s.valid_pct.map(format_percent).unwrap_or_else(|| DASH.to_string())}</strong>
                <span class="kpi-sub">{validity}</span>
            </div>
            <div class="kpi-card">
                <span class="kpi-title">"Potencial de crescimento " {window_toggle(growth, set_growth)}</span>
                <strong class="kpi-value">{format_percent(s.growth_potential)}</strong>
                <span class="kpi-sub">
                    {s.risk_score.map(|r| format!("Risco: {}/100", r)).unwrap_or_default()}
                </span>
            </div>
        </div>
        {filtered.map(|f| view! { <p class="result-count">{f}</p> })}

        <div class="chart-grid">
            <div class="chart-card">
                <h4>"Evolução de empresas ativas"</h4>
                <LineChart series=s.evolution.clone() />
            </div>
            <div class="chart-card">
                <h4>"Entradas vs saídas"</h4>
                <EntriesExitsChart data=s.entries_vs_exits.clone() />
                <div class="chart-legend">
                    <span class="legend entries">"Entradas"</span>
                    <span class="legend exits">"Saídas"</span>
                </div>
            </div>
            <div class="chart-card">
                <h4>"Distribuição por UF"</h4>
                <HorizontalBars series=s.by_state.clone() />
            </div>
        </div>

        <div class="ranking-grid">
            {ranking_list("Setores em destaque", s.top_sectors.clone(), false)}
            {ranking_list("Estados em crescimento", s.growing_states.clone(), true)}
        </div>
    }
    .into_any()
}

/// Up to `players_limit` active companies of the chosen CNAE
#[component]
fn PlayersGrid() -> impl IntoView {
    let store = use_app_store();

    view! {
        <div class="players">
            <h3>"Principais players"</h3>
            <p class="result-count">{move || format!("{} empresas encontradas", store.players().read().len())}</p>
            <Show
                when=move || !store.players().read().is_empty()
                fallback=|| view! {
                    <div class="empty-state">"Selecione um CNAE para ver as empresas do setor."</div>
                }
            >
                <div class="players-grid">
                    {move || store.players().get().into_iter().map(player_card).collect_view()}
                </div>
            </Show>
        </div>
    }
}

fn player_card(p: Player) -> impl IntoView {
    let capital = p.share_capital();
    view! {
        <article class="player-card">
            <h4>{p.legal_name()}</h4>
            <div class="muted">{p.cnpj_display()}</div>
            <div class="player-meta">
                <span>{p.uf_display()}</span>
                <span>{p.situation()}</span>
                <span>{p.size()}</span>
            </div>
            <div class="player-capital">
                {if capital > 0.0 { format_currency_rounded(capital) } else { DASH.to_string() }}
            </div>
        </article>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_text() {
        assert_eq!(delta_text(12.5), "▲ 12.5%");
        assert_eq!(delta_text(-3.0), "▼ 3.0%");
        assert_eq!(delta_class(0.0), "kpi-delta up");
    }

    #[test]
    fn test_clear_hint_names_filters() {
        assert_eq!(clear_hint(&SavedFilters::default()), "Nenhum filtro aplicado");
        assert_eq!(
            clear_hint(&SavedFilters::normalized("6204-0/00", "sp")),
            "Remove os filtros salvos: CNAE 6204000, UF SP"
        );
        assert_eq!(clear_hint(&SavedFilters::normalized("", "rj")), "Remove os filtros salvos: UF RJ");
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename(&SavedFilters::default()), "analise-mercado-geral.json");
        assert_eq!(
            export_filename(&SavedFilters::normalized("6204-0/00", "sp")),
            "analise-mercado-6204000-sp.json"
        );
    }
}
