//! CNPJ Lookup
//!
//! One search box: a full CNPJ opens the company's registry card, anything
//! else searches partners and company names.

use cnpj_insight_core::format::{
    cnpj_feedback, digits_only, format_brl, format_cep, format_cnpj, format_date_br, format_integer, DASH,
};
use cnpj_insight_core::models::{BiddingResponse, Company, CompanyProfile, PartnerMatch};
use leptos::prelude::*;
use leptos::task::spawn_local;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::models::LoadState;

const INVALID_CNPJ: &str = "CNPJ deve conter 14 dígitos";
const PROFILE_PARTNERS: usize = 5;

/// What a submitted search resolves to
#[derive(Debug, Clone, PartialEq)]
enum Lookup {
    Profile(String),
    Names(String),
    Invalid,
    Empty,
}

/// Inputs made only of digits and CNPJ punctuation are CNPJ attempts
fn classify_input(input: &str) -> Lookup {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Lookup::Empty;
    }
    let digits = digits_only(trimmed);
    let cnpj_shaped = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '/' | '-' | ' '));
    if digits.len() == 14 && trimmed.chars().count() <= 18 && cnpj_shaped {
        Lookup::Profile(digits)
    } else if cnpj_shaped {
        Lookup::Invalid
    } else {
        Lookup::Names(trimmed.to_string())
    }
}

/// Row of the name search, from either the partner index or the registry
#[derive(Debug, Clone, PartialEq)]
struct Hit {
    name: String,
    detail: String,
    cnpj: Option<String>,
}

impl From<PartnerMatch> for Hit {
    fn from(m: PartnerMatch) -> Self {
        let partner = m.nome_socio.clone().unwrap_or_default();
        let detail = match m.qualification() {
            Some(q) if !partner.is_empty() => format!("{} • {}", partner, q),
            Some(q) => q,
            None => partner,
        };
        Self { name: m.company_name(), detail, cnpj: m.cnpj() }
    }
}

impl From<Company> for Hit {
    fn from(c: Company) -> Self {
        let name = if c.legal_name.is_empty() { c.trade_name.clone() } else { c.legal_name.clone() };
        let detail = [c.uf.as_str(), c.municipality.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" / ");
        let cnpj = c.cnpj.as_deref().map(digits_only).filter(|d| d.len() == 14);
        Self { name, detail, cnpj }
    }
}

#[component]
pub fn CnpjLookup() -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    let (input, set_input) = signal(String::new());
    let (inline_error, set_inline_error) = signal(None::<&'static str>);
    let (profile, set_profile) = signal(None::<(String, CompanyProfile)>);
    let (bidding, set_bidding) = signal(None::<BiddingResponse>);
    let (hits, set_hits) = signal(Vec::<Hit>::new());
    let (load_state, set_load_state) = signal(LoadState::Idle);

    let feedback = Memo::new(move |_| cnpj_feedback(&input.get()));

    let open_profile = move |cnpj: String| {
        set_load_state.set(LoadState::Loading);
        set_bidding.set(None);
        spawn_local(async move {
            let api = ctx.api();
            match api.profile_by_cnpj(&cnpj).await {
                Ok(p) => {
                    info!(cnpj = %cnpj, "profile loaded");
                    set_profile.set(Some((cnpj.clone(), p)));
                    set_load_state.set(LoadState::Idle);
                }
                Err(e) => {
                    warn!(error = %e, cnpj = %cnpj, "profile lookup failed");
                    set_profile.set(None);
                    set_load_state.set(LoadState::Failed("CNPJ não encontrado ou indisponível.".to_string()));
                    return;
                }
            }
            match api.bidding_for_cnpj(&cnpj).await {
                Ok(b) => set_bidding.set(Some(b)),
                Err(e) => warn!(error = %e, "bidding summary failed"),
            }
        });
    };

    let search_names = move |term: String| {
        set_load_state.set(LoadState::Loading);
        set_profile.set(None);
        spawn_local(async move {
            let api = ctx.api();
            let partners = match api.search_partners(&term).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(error = %e, "partner search failed");
                    Vec::new()
                }
            };
            let found: Vec<Hit> = if partners.is_empty() {
                match api.search_registry(&term).await {
                    Ok(rows) => rows.into_iter().map(Hit::from).collect(),
                    Err(e) => {
                        warn!(error = %e, "registry search failed");
                        Vec::new()
                    }
                }
            } else {
                partners.into_iter().map(Hit::from).collect()
            };
            info!(count = found.len(), "name search finished");
            set_hits.set(found);
            set_load_state.set(LoadState::Idle);
        });
    };

    let submit = move || {
        set_inline_error.set(None);
        match classify_input(&input.get_untracked()) {
            Lookup::Empty => {}
            Lookup::Invalid => set_inline_error.set(Some(INVALID_CNPJ)),
            Lookup::Profile(cnpj) => {
                set_hits.set(Vec::new());
                open_profile(cnpj);
            }
            Lookup::Names(term) => search_names(term),
        }
    };

    view! {
        <section class="lookup-view">
            <form
                class="lookup-form"
                on:submit=move |ev| {
                    ev.prevent_default();
                    submit();
                }
            >
                <input
                    type="search"
                    class=move || format!("filter-input search {}", feedback.get().input_class())
                    placeholder="CNPJ, razão social ou nome do sócio"
                    prop:value=move || input.get()
                    on:input=move |ev| set_input.set(event_target_value(&ev))
                />
                <button type="submit" class="primary-btn">"Consultar"</button>
            </form>
            <div class="cnpj-feedback">{move || feedback.get().message()}</div>
            {move || inline_error.get().map(|msg| view! { <div class="inline-error">{msg}</div> })}
            {move || load_state.get().error().map(|msg| view! { <div class="error-banner">{msg}</div> })}
            <Show when=move || load_state.get().is_loading()>
                <div class="empty-state">"Consultando..."</div>
            </Show>

            {move || profile.get().map(|(cnpj, p)| profile_card(cnpj, p, bidding))}

            <Show when=move || !hits.get().is_empty()>
                <ul class="lookup-results">
                    {move || hits.get().into_iter().map(|hit| {
                        let target = hit.cnpj.clone();
                        let cnpj_text = hit.cnpj.as_deref().map(format_cnpj).unwrap_or_else(|| DASH.to_string());
                        view! {
                            <li
                                class="lookup-hit"
                                on:click=move |_| {
                                    if let Some(cnpj) = target.clone() {
                                        set_hits.set(Vec::new());
                                        open_profile(cnpj);
                                    }
                                }
                            >
                                <strong>{hit.name}</strong>
                                <span class="muted">{hit.detail}</span>
                                <span class="muted">{cnpj_text}</span>
                            </li>
                        }
                    }).collect_view()}
                </ul>
            </Show>
        </section>
    }
}

fn or_dash(value: Option<String>) -> String {
    value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| DASH.to_string())
}

fn profile_card(cnpj: String, p: CompanyProfile, bidding: ReadSignal<Option<BiddingResponse>>) -> impl IntoView {
    let status_class = if p.is_active() { "badge status-active" } else { "badge status-inactive" };
    let cnae = match (p.main_cnae(), p.main_cnae_description()) {
        (Some(code), Some(desc)) => format!("{} - {}", code, desc),
        (Some(code), None) => code,
        (None, _) => DASH.to_string(),
    };
    let place = match (p.municipality(), p.uf.clone()) {
        (Some(m), Some(uf)) => format!("{} / {}", m, uf),
        (m, uf) => or_dash(m.or(uf)),
    };
    let secondary = p.secondary_cnae_count();
    let partners: Vec<String> = p
        .highlighted_partners(PROFILE_PARTNERS)
        .into_iter()
        .map(|s| format!("{} ({})", s.name(), s.qualification()))
        .collect();

    view! {
        <article class="profile-card">
            <header class="profile-header">
                <span class=status_class>{p.status_text()}</span>
                {p.size_label().map(|s| view! { <span class="badge size">{s}</span> })}
            </header>
            <h2>{p.legal_name()}</h2>
            <p class="muted">{p.trade_name()}</p>
            <dl class="profile-fields">
                <dt>"CNPJ"</dt>
                <dd>{format_cnpj(&p.cnpj_or(&cnpj))}</dd>
                <dt>"Abertura"</dt>
                <dd>{p.opening_date().map(|d| format_date_br(&d)).unwrap_or_else(|| DASH.to_string())}</dd>
                <dt>"CNAE principal"</dt>
                <dd>
                    {cnae}
                    {(secondary > 0).then(|| view! { <span class="muted">{format!(" (+{} secundários)", secondary)}</span> })}
                </dd>
                <dt>"Natureza jurídica"</dt>
                <dd>{p.legal_nature()}</dd>
                <dt>"Capital social"</dt>
                <dd>{p.share_capital().map(|c| format_brl(c, true)).unwrap_or_else(|| DASH.to_string())}</dd>
                <dt>"Endereço"</dt>
                <dd>{p.street_line()} <br/> {or_dash(p.bairro.clone())} " • " {place}</dd>
                <dt>"CEP"</dt>
                <dd>{p.cep.as_deref().map(format_cep).unwrap_or_else(|| DASH.to_string())}</dd>
                <dt>"E-mail"</dt>
                <dd>{or_dash(p.correio_eletronico.clone())}</dd>
                <dt>"Telefone"</dt>
                <dd>{or_dash(p.phone())}</dd>
            </dl>
            {(!partners.is_empty()).then(|| view! {
                <div class="profile-partners">
                    <h4>"Sócios"</h4>
                    <ul>{partners.into_iter().map(|s| view! { <li>{s}</li> }).collect_view()}</ul>
                </div>
            })}
            {move || bidding.get().map(|b| view! {
                <div class="profile-bidding">
                    <h4>"Licitações"</h4>
                    <p>{format!("{} licitações encontradas", format_integer(b.total as i64))}</p>
                    <ul>
                        {b.records.into_iter().take(3).map(|r| view! {
                            <li>
                                <strong>{r.title}</strong>
                                <span class="muted">{r.agency} " • " {r.modality}</span>
                                <span>{r.value.map(|v| format_brl(v, false)).unwrap_or_else(|| DASH.to_string())}</span>
                            </li>
                        }).collect_view()}
                    </ul>
                </div>
            })}
        </article>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_input() {
        assert_eq!(classify_input("  "), Lookup::Empty);
        assert_eq!(classify_input("11.222.333/0001-81"), Lookup::Profile("11222333000181".into()));
        assert_eq!(classify_input("11222333000181"), Lookup::Profile("11222333000181".into()));
        assert_eq!(classify_input("11.222.333"), Lookup::Invalid);
        assert_eq!(classify_input("Maria Silva"), Lookup::Names("Maria Silva".into()));
    }

    #[test]
    fn test_hit_from_partner() {
        let m = PartnerMatch {
            nome_socio: Some("MARIA SILVA".into()),
            qualificacao_socio: Some("Sócio-Administrador".into()),
            cnpj: Some("11222333000181".into()),
            razao_social: Some("ACME LTDA".into()),
            ..PartnerMatch::default()
        };
        let hit = Hit::from(m);
        assert_eq!(hit.name, "ACME LTDA");
        assert_eq!(hit.detail, "MARIA SILVA • Sócio-Administrador");
        assert_eq!(hit.cnpj.as_deref(), Some("11222333000181"));
    }
}
