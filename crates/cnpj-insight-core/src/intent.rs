//! Chat Intent Router
//!
//! Classifies one message into one intent. Rules are checked in a fixed
//! order over the lowercased message and the first match wins; there is no
//! scoring and no conversation state.

use std::sync::OnceLock;

use regex::Regex;

use crate::format::{digits_only, is_state_code, normalize_cnpj};

// ========================
// Patterns
// ========================

static PROCUREMENT: OnceLock<Regex> = OnceLock::new();
static B2B: OnceLock<Regex> = OnceLock::new();
static MARKET: OnceLock<Regex> = OnceLock::new();
static CNAE_CODE: OnceLock<Regex> = OnceLock::new();
static UF_AFTER_PREPOSITION: OnceLock<Regex> = OnceLock::new();
static TWO_LETTER_WORD: OnceLock<Regex> = OnceLock::new();
static PARTNER_NAME: OnceLock<Regex> = OnceLock::new();
static GREETING: OnceLock<Regex> = OnceLock::new();
static DOMAIN_KEYWORD: OnceLock<Regex> = OnceLock::new();
static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();
static CNPJ_TOKEN: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).unwrap_or_else(|e| panic!("invalid pattern {source}: {e}")))
}

fn procurement() -> &'static Regex {
    pattern(&PROCUREMENT, r"(b2g|oportunidad|licit|pncp|governo|públic|public)")
}

fn b2b() -> &'static Regex {
    pattern(&B2B, r"(b2b|empresa|prospect|negócio|negocio|match|compatibilidade)")
}

fn market() -> &'static Regex {
    pattern(&MARKET, r"(mercado|cnae|setorial|analisar|análise|analise)")
}

fn cnae_code() -> &'static Regex {
    pattern(&CNAE_CODE, r"cnae\s*(\d{4,7})")
}

fn uf_after_preposition() -> &'static Regex {
    pattern(&UF_AFTER_PREPOSITION, r"\s(?:em|no)\s([a-z]{2})\b")
}

fn two_letter_word() -> &'static Regex {
    pattern(&TWO_LETTER_WORD, r"\b([a-z]{2})\b")
}

fn partner_name() -> &'static Regex {
    pattern(&PARTNER_NAME, r"(?i)nome\s(.+)")
}

fn greeting() -> &'static Regex {
    pattern(&GREETING, r"^(oi|ol[áa]|bom dia|boa tarde|boa noite|hello|hi|hey)$")
}

fn domain_keyword() -> &'static Regex {
    pattern(
        &DOMAIN_KEYWORD,
        r"(cnpj|empresa|cnae|licit|pncp|uf|municipio|município|socio|sócio|contrato|editais|itens)",
    )
}

fn digit_run() -> &'static Regex {
    pattern(&DIGIT_RUN, r"\d{4,}")
}

/// Punctuated or bare CNPJ not glued to other digits
fn cnpj_token() -> &'static Regex {
    pattern(&CNPJ_TOKEN, r"(?:^|\D)(\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2})(?:\D|$)")
}

/// CNPJ embedded in a message. Other digits (years, CNAE codes, `b2g`) are
/// ignored; the whole message is reduced only when no token stands out.
pub fn extract_cnpj(message: &str) -> Option<String> {
    cnpj_token()
        .captures(message)
        .map(|c| digits_only(&c[1]))
        .or_else(|| normalize_cnpj(message))
}

// ========================
// Intents
// ========================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Procurement keyword plus an embedded CNPJ
    BiddingForCnpj { cnpj: String },
    /// "consultar cnpj"; `None` when the message carries no 14-digit CNPJ
    CompanyProfile { cnpj: Option<String> },
    SectorAnalysis { cnae: Option<String>, uf: Option<String> },
    BiddingLookup { cnpj: Option<String> },
    PartnerSearch { name: String },
    Help,
    NaturalLanguage { question: String },
}

fn is_help_request(lower: &str) -> bool {
    let trimmed = lower.trim();
    if greeting().is_match(trimmed) {
        return true;
    }
    let has_keyword = domain_keyword().is_match(lower) || digit_run().is_match(lower);
    !has_keyword && lower.split_whitespace().count() < 2
}

pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();
    let cnpj = extract_cnpj(message);

    if procurement().is_match(&lower) {
        if let Some(cnpj) = &cnpj {
            return Intent::BiddingForCnpj { cnpj: cnpj.clone() };
        }
    }

    if lower.contains("consultar cnpj") {
        return Intent::CompanyProfile { cnpj };
    }

    if lower.contains("cnae") {
        let cnae = cnae_code().captures(&lower).map(|c| c[1].to_string());
        let uf = uf_after_preposition().captures(&lower).map(|c| c[1].to_uppercase());
        return Intent::SectorAnalysis { cnae, uf };
    }

    if lower.contains("licita") || lower.contains("pncp") {
        return Intent::BiddingLookup { cnpj };
    }

    if lower.contains("sócio") || lower.contains("socio") {
        let name = partner_name()
            .captures(message)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_else(|| message.trim().to_string());
        return Intent::PartnerSearch { name };
    }

    if is_help_request(&lower) {
        return Intent::Help;
    }

    Intent::NaturalLanguage {
        question: message.to_string(),
    }
}

// ========================
// Section jump
// ========================

/// Top-level dashboard views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Section {
    #[default]
    Chat,
    Market,
    Companies,
    Opportunities,
    CnpjLookup,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Chat,
        Section::Market,
        Section::Companies,
        Section::Opportunities,
        Section::CnpjLookup,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Chat => "Assistente",
            Section::Market => "Análise de Mercado",
            Section::Companies => "Prospecção B2B",
            Section::Opportunities => "Oportunidades B2G",
            Section::CnpjLookup => "Consulta CNPJ",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Section::Chat => "💬",
            Section::Market => "📊",
            Section::Companies => "🏢",
            Section::Opportunities => "🏛️",
            Section::CnpjLookup => "🔎",
        }
    }
}

/// Where a chat message sends the dashboard, with what to prefill
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionJump {
    Opportunities { search: String },
    Companies { search: String },
    Market { cnae: String, uf: Option<String> },
}

impl SectionJump {
    pub fn section(&self) -> Section {
        match self {
            SectionJump::Opportunities { .. } => Section::Opportunities,
            SectionJump::Companies { .. } => Section::Companies,
            SectionJump::Market { .. } => Section::Market,
        }
    }
}

/// Procurement beats B2B beats market; `None` keeps the current view
pub fn section_jump(message: &str) -> Option<SectionJump> {
    let lower = message.to_lowercase();
    if procurement().is_match(&lower) {
        return Some(SectionJump::Opportunities {
            search: message.to_string(),
        });
    }
    if b2b().is_match(&lower) {
        return Some(SectionJump::Companies {
            search: message.to_string(),
        });
    }
    if market().is_match(&lower) {
        let cnae = cnae_code().captures(&lower).map(|c| c[1].to_string()).unwrap_or_default();
        let uf = two_letter_word()
            .captures_iter(&lower)
            .map(|c| c[1].to_string())
            .find(|w| is_state_code(w))
            .map(|w| w.to_uppercase());
        return Some(SectionJump::Market { cnae, uf });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_bidding_with_cnpj_beats_everything() {
        assert_eq!(
            classify("Ver licitação do CNPJ 11.222.333/0001-81"),
            Intent::BiddingForCnpj {
                cnpj: "11222333000181".into()
            }
        );
        assert_eq!(
            classify("consultar cnpj 11222333000181 oportunidades"),
            Intent::BiddingForCnpj {
                cnpj: "11222333000181".into()
            }
        );
    }

    #[test]
    fn test_cnpj_found_among_other_digits() {
        assert_eq!(
            classify("b2g 11222333000181"),
            Intent::BiddingForCnpj {
                cnpj: "11222333000181".into()
            }
        );
        assert_eq!(
            classify("licitações de 2024 para o CNPJ 11.222.333/0001-81"),
            Intent::BiddingForCnpj {
                cnpj: "11222333000181".into()
            }
        );
        assert_eq!(
            classify("consultar cnpj 11.222.333/0001-81 em 2023"),
            Intent::CompanyProfile {
                cnpj: Some("11222333000181".into())
            }
        );
        assert_eq!(
            classify("pncp do cnpj 11222333000181 desde 2022"),
            Intent::BiddingForCnpj {
                cnpj: "11222333000181".into()
            }
        );
    }

    #[test]
    fn test_cnae_and_cnpj_in_one_message() {
        // procurement with a CNPJ outranks the cnae rule
        assert_eq!(
            classify("licitação cnae 6204000 do cnpj 11222333000181"),
            Intent::BiddingForCnpj {
                cnpj: "11222333000181".into()
            }
        );
        assert_eq!(
            classify("consultar cnpj 11222333000181 cnae 6204000"),
            Intent::CompanyProfile {
                cnpj: Some("11222333000181".into())
            }
        );
        assert_eq!(
            classify("cnae 6204000 da empresa 11222333000181"),
            Intent::SectorAnalysis {
                cnae: Some("6204000".into()),
                uf: None
            }
        );
    }

    #[test]
    fn test_extract_cnpj() {
        assert_eq!(extract_cnpj("cnpj 11.222.333/0001-81 em 2023").as_deref(), Some("11222333000181"));
        assert_eq!(extract_cnpj("b2g 11222333000181").as_deref(), Some("11222333000181"));
        // 15 digits is not a CNPJ token
        assert_eq!(extract_cnpj("112223330001810"), None);
        assert_eq!(extract_cnpj("cnae 6204000 em 2024"), None);
        // scattered digits still reduce when nothing else matches
        assert_eq!(extract_cnpj("11 222 333 0001 81").as_deref(), Some("11222333000181"));
    }

    #[test]
    fn test_company_profile() {
        assert_eq!(
            classify("Consultar CNPJ 11222333000181"),
            Intent::CompanyProfile {
                cnpj: Some("11222333000181".into())
            }
        );
        assert_eq!(classify("consultar cnpj 123"), Intent::CompanyProfile { cnpj: None });
    }

    #[test]
    fn test_sector_analysis_extraction() {
        assert_eq!(
            classify("Analisar CNAE 6204000 em SP"),
            Intent::SectorAnalysis {
                cnae: Some("6204000".into()),
                uf: Some("SP".into())
            }
        );
        assert_eq!(classify("cnae de TI"), Intent::SectorAnalysis { cnae: None, uf: None });
    }

    #[test]
    fn test_bidding_lookup_without_cnpj() {
        assert_eq!(classify("licitações abertas"), Intent::BiddingLookup { cnpj: None });
        assert_eq!(classify("dados do pncp"), Intent::BiddingLookup { cnpj: None });
    }

    #[test]
    fn test_partner_search_name() {
        assert_eq!(
            classify("buscar sócio por nome Maria Silva"),
            Intent::PartnerSearch {
                name: "Maria Silva".into()
            }
        );
        assert_eq!(
            classify("socio João"),
            Intent::PartnerSearch {
                name: "socio João".into()
            }
        );
    }

    #[test]
    fn test_help_and_fallback() {
        assert_eq!(classify("Olá"), Intent::Help);
        assert_eq!(classify("  bom dia  "), Intent::Help);
        assert_eq!(classify("ajuda"), Intent::Help);
        // single token with a digit run is not help
        assert_eq!(
            classify("62040000"),
            Intent::NaturalLanguage {
                question: "62040000".into()
            }
        );
        assert_eq!(
            classify("quantas empresas abriram em 2024"),
            Intent::NaturalLanguage {
                question: "quantas empresas abriram em 2024".into()
            }
        );
    }

    #[test]
    fn test_section_jumps() {
        assert_eq!(
            section_jump("oportunidades de obras").map(|j| j.section()),
            Some(Section::Opportunities)
        );
        assert_eq!(
            section_jump("prospectar empresas de software"),
            Some(SectionJump::Companies {
                search: "prospectar empresas de software".into()
            })
        );
        assert_eq!(
            section_jump("analisar mercado cnae 6204000 de ti em sp"),
            Some(SectionJump::Market {
                cnae: "6204000".into(),
                uf: Some("SP".into())
            })
        );
        assert_eq!(section_jump("olá"), None);
    }

    proptest! {
        #[test]
        fn prop_cnpj_plus_licitacao_routes_to_bidding(digits in "[0-9]{14}", prefix in "[a-z0-9 ]{0,12}") {
            let message = format!("{} licitação {}", prefix, digits);
            prop_assert_eq!(classify(&message), Intent::BiddingForCnpj { cnpj: digits });
        }
    }
}
