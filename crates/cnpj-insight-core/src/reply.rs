//! Chat Replies
//!
//! `dispatch` runs one intent against the backend and always comes back with
//! text: failures become user-facing messages, never errors.

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::format::{format_brl, format_cnpj, format_date_br, DASH};
use crate::intent::{classify, Intent};
use crate::models::{
    BiddingResponse, CompanyProfile, NlQuery, NlQueryResult, PartnerMatch, SectorAnalysis, SectorQuery,
};

pub const HELP_TEXT: &str = "Olá! Posso ajudar com:\n- Consultar CNPJ 00000000000000\n- Analisar CNAE 6204000 em SP\n- Ver licitações PNCP do CNPJ\n- Buscar empresas por palavra-chave (ex: software em SP)";

const NOT_UNDERSTOOD: &str = "Não consegui entender. Tente: Consultar CNPJ 00000000000000, Analisar CNAE 6204000 em SP, Ver licitações PNCP do CNPJ.";
const INAPTA_NOTE: &str = "A situação INAPTA indica omissão de declarações junto à Receita Federal e pode impactar a regularidade comercial e fiscal.";

const TOP_OPPORTUNITIES: usize = 6;
const TOP_PARTNERS: usize = 5;
const SAMPLE_ROWS: usize = 5;
const NL_LIMIT: u32 = 20;

/// The backend calls the assistant needs
#[allow(async_fn_in_trait)]
pub trait RegistryApi {
    async fn bidding_by_cnpj(&self, cnpj: &str) -> ApiResult<BiddingResponse>;
    async fn company_profile(&self, cnpj: &str) -> ApiResult<CompanyProfile>;
    async fn sector_analysis(&self, query: &SectorQuery) -> ApiResult<SectorAnalysis>;
    async fn partner_search(&self, name: &str) -> ApiResult<Vec<PartnerMatch>>;
    async fn natural_language_query(&self, query: &NlQuery) -> ApiResult<NlQueryResult>;
}

/// Status errors get their own wording; everything else reads as a network failure
fn failure(e: &ApiError, on_status: impl FnOnce(u16) -> String, on_network: &str) -> String {
    warn!(error = %e, "chat backend call failed");
    match e.status() {
        Some(code) => on_status(code),
        None => on_network.to_string(),
    }
}

/// Classify and answer in one step
pub async fn answer<A: RegistryApi>(api: &A, message: &str) -> String {
    dispatch(api, &classify(message)).await
}

pub async fn dispatch<A: RegistryApi>(api: &A, intent: &Intent) -> String {
    info!(?intent, "dispatching chat intent");
    match intent {
        Intent::BiddingForCnpj { cnpj } => match api.bidding_by_cnpj(cnpj).await {
            Ok(resp) => bidding_for_cnpj_reply(cnpj, &resp),
            Err(e) => failure(
                &e,
                |s| format!("Erro ao buscar oportunidades B2G do CNPJ {}: {}", cnpj, s),
                &format!("Falha de rede ao buscar oportunidades B2G para o CNPJ {}.", cnpj),
            ),
        },
        Intent::CompanyProfile { cnpj: None } => "Informe um CNPJ válido com 14 dígitos.".to_string(),
        Intent::CompanyProfile { cnpj: Some(cnpj) } => match api.company_profile(cnpj).await {
            Ok(profile) => profile_reply(cnpj, &profile),
            Err(e) => failure(&e, |s| format!("Erro ao consultar CNPJ: {}", s), "Falha de rede ao consultar CNPJ."),
        },
        Intent::SectorAnalysis { cnae, uf } => {
            let query = SectorQuery::new(cnae.as_deref().unwrap_or_default(), uf.as_deref().unwrap_or_default());
            match api.sector_analysis(&query).await {
                Ok(analysis) => sector_reply(cnae.as_deref(), uf.as_deref(), &analysis),
                Err(e) => failure(&e, |s| format!("Erro na análise setorial: {}", s), "Falha de rede na análise setorial."),
            }
        }
        Intent::BiddingLookup { cnpj: None } => "Informe um CNPJ para consultar licitações.".to_string(),
        Intent::BiddingLookup { cnpj: Some(cnpj) } => match api.bidding_by_cnpj(cnpj).await {
            Ok(resp) => format!("Licitações PNCP\nCNPJ: {}\nTotal encontradas: {}", cnpj, resp.total),
            Err(e) => failure(&e, |s| format!("Erro nas licitações: {}", s), "Falha de rede ao consultar licitações."),
        },
        Intent::PartnerSearch { name } => match api.partner_search(name).await {
            Ok(matches) => partner_reply(&matches),
            Err(e) => failure(&e, |s| format!("Erro na busca de sócios: {}", s), "Falha de rede na busca de sócios."),
        },
        Intent::Help => HELP_TEXT.to_string(),
        Intent::NaturalLanguage { question } => {
            let query = NlQuery {
                pergunta: question.clone(),
                limite: NL_LIMIT,
            };
            match api.natural_language_query(&query).await {
                Ok(result) => nl_reply(&result),
                Err(e) => failure(&e, |_| NOT_UNDERSTOOD.to_string(), "Falha ao interpretar sua pergunta."),
            }
        }
    }
}

// ========================
// Formatting
// ========================

pub fn bidding_for_cnpj_reply(cnpj: &str, resp: &BiddingResponse) -> String {
    if resp.records.is_empty() {
        return format!("Nenhuma oportunidade B2G encontrada para o CNPJ {}.", cnpj);
    }
    let mut sorted: Vec<_> = resp.records.iter().collect();
    sorted.sort_by(|a, b| b.value.unwrap_or(0.0).total_cmp(&a.value.unwrap_or(0.0)));
    let entries: Vec<String> = sorted
        .iter()
        .take(TOP_OPPORTUNITIES)
        .enumerate()
        .map(|(i, o)| {
            let value = o.value.map(|v| format_brl(v, false)).unwrap_or_else(|| DASH.to_string());
            format!(
                "{}. {}\n   Órgão: {} • Modalidade: {}\n   Valor: {} • Prazo: {}",
                i + 1,
                o.title,
                o.agency,
                o.modality,
                value,
                o.deadline
            )
        })
        .collect();
    format!("Oportunidades B2G do CNPJ {}\n\n{}", cnpj, entries.join("\n\n"))
}

fn address_lines(p: &CompanyProfile) -> String {
    let street: Vec<&str> = [&p.logradouro, &p.numero, &p.complemento]
        .iter()
        .filter_map(|x| x.as_deref())
        .collect();
    let line1 = if street.is_empty() {
        DASH.to_string()
    } else {
        street.join(", ")
    };
    let city_uf: Vec<String> = [p.municipality(), p.uf.clone()].into_iter().flatten().collect();
    let mut line2 = Vec::new();
    if !city_uf.is_empty() {
        line2.push(city_uf.join(" – "));
    }
    if let Some(cep) = &p.cep {
        line2.push(format!("CEP {}", cep));
    }
    line2.push("Brasil".to_string());
    format!("{}\n{}", line1, line2.join(", "))
}

pub fn profile_reply(cnpj: &str, p: &CompanyProfile) -> String {
    let capital = p
        .share_capital()
        .map(|v| format_brl(v, true))
        .unwrap_or_else(|| DASH.to_string());
    let opening = p.opening_date().map(|d| format_date_br(&d)).unwrap_or_else(|| DASH.to_string());
    let cnae_code = p.main_cnae().unwrap_or_else(|| DASH.to_string());
    let main_activity = match p.main_cnae_description() {
        Some(desc) => format!("{} (CNAE {})", desc, cnae_code),
        None => format!("CNAE {}", cnae_code),
    };
    let secondary = match p.secondary_cnae_count() {
        0 => DASH.to_string(),
        n => format!("({} atividades)", n),
    };
    let partners: Vec<String> = p
        .highlighted_partners(TOP_PARTNERS)
        .iter()
        .map(|s| format!("{} – {}", s.name(), s.qualification()))
        .collect();
    let status = p.status_text();

    let mut lines = vec![
        "📌 Informações principais".to_string(),
        format!("CNPJ: {}", format_cnpj(cnpj)),
        format!("Razão Social: {}", p.legal_name()),
        format!("Nome Fantasia: {}", p.trade_name()),
        format!("Data de Abertura: {}", opening),
        format!("Natureza Jurídica: {}", p.legal_nature()),
        format!("Status da Empresa: {}", status),
        format!("Capital Social: {}", capital),
        "🏢 Endereço".to_string(),
        address_lines(p),
        "📊 Atividade Econômica".to_string(),
        format!("Atividade principal: {}", main_activity),
        format!("Atividades secundárias: {}", secondary),
        "👥 Sócios/Administradores".to_string(),
        if partners.is_empty() {
            DASH.to_string()
        } else {
            partners.join("\n")
        },
    ];
    if status.eq_ignore_ascii_case("INAPTA") {
        lines.push("⚠️ Observação:".to_string());
        lines.push(INAPTA_NOTE.to_string());
    }
    lines.join("\n")
}

pub fn sector_reply(cnae: Option<&str>, uf: Option<&str>, analysis: &SectorAnalysis) -> String {
    let kpis = analysis
        .kpis
        .as_ref()
        .filter(|k| !k.is_null())
        .map(Value::to_string)
        .unwrap_or_else(|| "{}".to_string());
    format!(
        "Análise Setorial\nCNAE: {}\nUF: {}\nKPIs: {}\nResumo: {}",
        cnae.unwrap_or(DASH),
        uf.unwrap_or(DASH),
        kpis,
        analysis.resumo.as_deref().unwrap_or(DASH)
    )
}

pub fn partner_reply(matches: &[PartnerMatch]) -> String {
    if matches.is_empty() {
        return "Nenhum sócio encontrado.".to_string();
    }
    let head: Vec<String> = matches
        .iter()
        .take(TOP_PARTNERS)
        .map(|s| {
            format!(
                "{} • {} • {}",
                s.nome_socio.as_deref().unwrap_or(DASH),
                s.qualification().unwrap_or_else(|| DASH.to_string()),
                s.cnpj().unwrap_or_else(|| DASH.to_string())
            )
        })
        .collect();
    format!("Sócios encontrados (top 5)\n{}", head.join("\n"))
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn nl_reply(result: &NlQueryResult) -> String {
    let columns = if result.columns.is_empty() {
        DASH.to_string()
    } else {
        result.columns.join(", ")
    };
    let rows: Vec<String> = result
        .rows
        .iter()
        .take(SAMPLE_ROWS)
        .map(|r| r.iter().map(cell_text).collect::<Vec<_>>().join(" | "))
        .collect();
    let sample = if rows.is_empty() { DASH.to_string() } else { rows.join("\n") };
    format!(
        "Consulta NL → SQL\nColunas: {}\nAmostra:\n{}\nSQL: {}",
        columns,
        sample,
        result.sql.as_deref().unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BiddingRecord, Partner};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;

    /// In-memory backend; every call is recorded
    #[derive(Default)]
    struct FakeRegistry {
        bidding: Option<ApiResult<BiddingResponse>>,
        profile: Option<ApiResult<CompanyProfile>>,
        sector: Option<ApiResult<SectorAnalysis>>,
        partners: Option<ApiResult<Vec<PartnerMatch>>>,
        nl: Option<ApiResult<NlQueryResult>>,
        calls: RefCell<Vec<String>>,
    }

    fn canned<T: Clone>(slot: &Option<ApiResult<T>>) -> ApiResult<T> {
        slot.clone().unwrap_or(Err(ApiError::Network("unconfigured".into())))
    }

    impl RegistryApi for FakeRegistry {
        async fn bidding_by_cnpj(&self, cnpj: &str) -> ApiResult<BiddingResponse> {
            self.calls.borrow_mut().push(format!("bidding {}", cnpj));
            canned(&self.bidding)
        }

        async fn company_profile(&self, cnpj: &str) -> ApiResult<CompanyProfile> {
            self.calls.borrow_mut().push(format!("profile {}", cnpj));
            canned(&self.profile)
        }

        async fn sector_analysis(&self, query: &SectorQuery) -> ApiResult<SectorAnalysis> {
            self.calls.borrow_mut().push(format!("sector {:?} {}", query.cnae_codes, query.uf));
            canned(&self.sector)
        }

        async fn partner_search(&self, name: &str) -> ApiResult<Vec<PartnerMatch>> {
            self.calls.borrow_mut().push(format!("partners {}", name));
            canned(&self.partners)
        }

        async fn natural_language_query(&self, query: &NlQuery) -> ApiResult<NlQueryResult> {
            self.calls.borrow_mut().push(format!("nl {} {}", query.pergunta, query.limite));
            canned(&self.nl)
        }
    }

    fn record(title: &str, value: Option<f64>) -> BiddingRecord {
        BiddingRecord {
            title: title.to_string(),
            agency: "Prefeitura".to_string(),
            modality: "Pregão".to_string(),
            value,
            deadline: "2024-07-01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bidding_reply_sorted_by_value() {
        let api = FakeRegistry {
            bidding: Some(Ok(BiddingResponse {
                records: vec![record("Pequena", Some(1000.0)), record("Sem valor", None), record("Grande", Some(250000.0))],
                total: 3,
            })),
            ..Default::default()
        };
        let text = answer(&api, "licitações do cnpj 11222333000181").await;
        assert!(text.starts_with("Oportunidades B2G do CNPJ 11222333000181\n\n1. Grande\n"));
        assert!(text.contains("Valor: R$\u{a0}250.000 • Prazo: 2024-07-01"));
        assert!(text.contains("3. Sem valor\n   Órgão: Prefeitura • Modalidade: Pregão\n   Valor: — •"));
        assert_eq!(api.calls.borrow().as_slice(), ["bidding 11222333000181"]);
    }

    #[tokio::test]
    async fn test_bidding_reply_errors() {
        let api = FakeRegistry {
            bidding: Some(Err(ApiError::Status(502))),
            ..Default::default()
        };
        assert_eq!(
            answer(&api, "b2g 11222333000181").await,
            "Erro ao buscar oportunidades B2G do CNPJ 11222333000181: 502"
        );
        let offline = FakeRegistry::default();
        assert_eq!(
            answer(&offline, "b2g 11222333000181").await,
            "Falha de rede ao buscar oportunidades B2G para o CNPJ 11222333000181."
        );
        let empty = FakeRegistry {
            bidding: Some(Ok(BiddingResponse::default())),
            ..Default::default()
        };
        assert_eq!(
            answer(&empty, "b2g 11222333000181").await,
            "Nenhuma oportunidade B2G encontrada para o CNPJ 11222333000181."
        );
    }

    #[tokio::test]
    async fn test_profile_reply() {
        let profile: CompanyProfile = serde_json::from_value(json!({
            "razao_social": "Alpha Tecnologia LTDA",
            "data_inicio_atividade": "2015-03-09",
            "situacao_cadastral_nome": "INAPTA",
            "capital_social": 50000,
            "logradouro": "Av. Paulista",
            "numero": "1000",
            "municipio": "São Paulo",
            "uf": "SP",
            "cep": "01310100",
            "cnae_fiscal": "6204000",
            "cnae_descricao": "Consultoria em TI",
            "cnaes_secundarios": [{}, {}],
            "qsa": [{"nome_socio": "Ana", "qualificacao_socio": "Sócio-Administrador"}]
        }))
        .unwrap();
        let api = FakeRegistry {
            profile: Some(Ok(profile)),
            ..Default::default()
        };
        let text = answer(&api, "Consultar CNPJ 11222333000181").await;
        let expected = [
            "📌 Informações principais",
            "CNPJ: 11.222.333/0001-81",
            "Razão Social: Alpha Tecnologia LTDA",
            "Nome Fantasia: —",
            "Data de Abertura: 09/03/2015",
            "Natureza Jurídica: —",
            "Status da Empresa: INAPTA",
            "Capital Social: R$\u{a0}50.000,00",
            "🏢 Endereço",
            "Av. Paulista, 1000",
            "São Paulo – SP, CEP 01310100, Brasil",
            "📊 Atividade Econômica",
            "Atividade principal: Consultoria em TI (CNAE 6204000)",
            "Atividades secundárias: (2 atividades)",
            "👥 Sócios/Administradores",
            "Ana – Sócio-Administrador",
            "⚠️ Observação:",
            INAPTA_NOTE,
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[tokio::test]
    async fn test_profile_without_cnpj_skips_backend() {
        let api = FakeRegistry::default();
        assert_eq!(answer(&api, "consultar cnpj").await, "Informe um CNPJ válido com 14 dígitos.");
        assert!(api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_sector_reply() {
        let api = FakeRegistry {
            sector: Some(Ok(SectorAnalysis {
                kpis: Some(json!({"total": 12})),
                resumo: Some("Setor aquecido".into()),
                empresas: Vec::new(),
            })),
            ..Default::default()
        };
        assert_eq!(
            answer(&api, "Analisar CNAE 6204000 em SP").await,
            "Análise Setorial\nCNAE: 6204000\nUF: SP\nKPIs: {\"total\":12}\nResumo: Setor aquecido"
        );
        assert_eq!(api.calls.borrow()[0], "sector [\"6204000\"] SP");
    }

    #[tokio::test]
    async fn test_bidding_lookup_total() {
        let api = FakeRegistry {
            bidding: Some(Ok(BiddingResponse {
                records: Vec::new(),
                total: 7,
            })),
            ..Default::default()
        };
        let lookup = Intent::BiddingLookup {
            cnpj: Some("11222333000181".into()),
        };
        assert_eq!(dispatch(&api, &lookup).await, "Licitações PNCP\nCNPJ: 11222333000181\nTotal encontradas: 7");
        assert_eq!(answer(&api, "licitações").await, "Informe um CNPJ para consultar licitações.");
    }

    #[tokio::test]
    async fn test_partner_reply() {
        let hit = PartnerMatch {
            nome_socio: Some("Maria Silva".into()),
            qualificacao: Some("Sócio".into()),
            cnpj: Some("11222333000181".into()),
            ..Default::default()
        };
        let api = FakeRegistry {
            partners: Some(Ok(vec![hit])),
            ..Default::default()
        };
        assert_eq!(
            answer(&api, "sócio nome Maria Silva").await,
            "Sócios encontrados (top 5)\nMaria Silva • Sócio • 11222333000181"
        );
        let none = FakeRegistry {
            partners: Some(Ok(Vec::new())),
            ..Default::default()
        };
        assert_eq!(answer(&none, "socio x").await, "Nenhum sócio encontrado.");
    }

    #[tokio::test]
    async fn test_nl_fallback() {
        let api = FakeRegistry {
            nl: Some(Ok(NlQueryResult {
                columns: vec!["uf".into(), "total".into()],
                rows: vec![vec![json!("SP"), json!(10)], vec![json!("RJ"), Value::Null]],
                sql: Some("SELECT uf, count(*) FROM empresas".into()),
            })),
            ..Default::default()
        };
        assert_eq!(
            answer(&api, "quantas empresas por estado").await,
            "Consulta NL → SQL\nColunas: uf, total\nAmostra:\nSP | 10\nRJ | \nSQL: SELECT uf, count(*) FROM empresas"
        );
        assert_eq!(api.calls.borrow()[0], "nl quantas empresas por estado 20");

        let rejected = FakeRegistry {
            nl: Some(Err(ApiError::Status(400))),
            ..Default::default()
        };
        assert_eq!(answer(&rejected, "quantas empresas por estado").await, NOT_UNDERSTOOD);
        let offline = FakeRegistry::default();
        assert_eq!(answer(&offline, "quantas empresas por estado").await, "Falha ao interpretar sua pergunta.");
    }

    #[tokio::test]
    async fn test_help_needs_no_backend() {
        let api = FakeRegistry::default();
        assert_eq!(answer(&api, "oi").await, HELP_TEXT);
        assert!(api.calls.borrow().is_empty());
    }

    #[test]
    fn test_partner_fallback_names() {
        let p = Partner {
            nome: Some("Carlos".into()),
            ..Default::default()
        };
        assert_eq!(p.name(), "Carlos");
        assert_eq!(p.qualification(), DASH);
    }
}
