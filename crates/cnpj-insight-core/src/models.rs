//! Data Models
//!
//! `Raw*` structs mirror what the backend sends, with every alternative field
//! name optional. Normalized structs are what the views and the list pipeline
//! work with.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::{self, DeadlineStatus, DASH};
use crate::lenient::{opt_number, opt_string, string_list, unwrap_list, value_number, value_text};

/// First alternative that is present
fn first(options: &[&Option<String>]) -> Option<String> {
    options.iter().find_map(|o| (*o).clone())
}

fn score(value: Option<f64>) -> Option<u8> {
    value.map(|v| v.round().clamp(0.0, 100.0) as u8)
}

// ========================
// Companies
// ========================

/// A company row as the listing endpoints send it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompany {
    #[serde(default, deserialize_with = "opt_string")]
    pub cnpj: Option<String>,
    #[serde(default, rename = "nomeFantasia", deserialize_with = "opt_string")]
    pub nome_fantasia: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub razao: Option<String>,
    #[serde(default, rename = "razaoSocial", deserialize_with = "opt_string")]
    pub razao_social: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnae: Option<String>,
    #[serde(default, rename = "cnaeDesc", deserialize_with = "opt_string")]
    pub cnae_desc: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub setor: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub uf: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub municipio: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub porte: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub idade: Option<f64>,
    #[serde(default, rename = "matchScore", deserialize_with = "opt_number")]
    pub match_score: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "string_list")]
    pub badges: Vec<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub situacao: Option<String>,
    #[serde(default, rename = "capitalSocial", deserialize_with = "opt_number")]
    pub capital_social: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub socios: Option<f64>,
}

/// Company the way the table renders and filters it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub cnpj: Option<String>,
    pub trade_name: String,
    pub legal_name: String,
    pub cnae: String,
    pub cnae_desc: String,
    pub uf: String,
    pub municipality: String,
    pub size: String,
    pub age: Option<u32>,
    pub match_score: Option<u8>,
    pub badges: Vec<String>,
    pub share_capital: Option<f64>,
    pub partners: Option<u32>,
    pub situation: String,
}

impl From<RawCompany> for Company {
    fn from(raw: RawCompany) -> Self {
        let trade_name = first(&[&raw.nome_fantasia, &raw.razao, &raw.razao_social]).unwrap_or_else(|| DASH.to_string());
        let legal_name = first(&[&raw.razao_social, &raw.razao, &raw.nome_fantasia]).unwrap_or_else(|| DASH.to_string());
        let badges = if raw.badges.is_empty() {
            raw.situacao.iter().cloned().collect()
        } else {
            raw.badges
        };
        Self {
            cnpj: raw.cnpj,
            trade_name,
            legal_name,
            cnae: raw.cnae.unwrap_or_default(),
            cnae_desc: first(&[&raw.cnae_desc, &raw.setor]).unwrap_or_default(),
            uf: raw.uf.unwrap_or_default(),
            municipality: raw.municipio.unwrap_or_default(),
            size: raw.porte.unwrap_or_default(),
            age: raw.idade.filter(|a| *a >= 0.0).map(|a| a as u32),
            match_score: score(raw.match_score.or(raw.score)),
            badges,
            share_capital: raw.capital_social,
            partners: raw.socios.filter(|s| *s >= 0.0).map(|s| s as u32),
            situation: raw.situacao.unwrap_or_default(),
        }
    }
}

/// Company block nested in a compatibility result
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompatCompany {
    #[serde(default, deserialize_with = "opt_string")]
    pub cnpj: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub nome_fantasia: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub razao_social: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnae_fiscal: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnae_descricao: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub uf: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub municipio: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub porte_da_empresa: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub idade: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub capital_social_da_empresa: Option<f64>,
}

/// One entry of `POST /api/analise/compat/empresas` → `resultados`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompatEntry {
    #[serde(default)]
    pub empresa: RawCompatCompany,
    #[serde(default, deserialize_with = "opt_number")]
    pub compatibilidade: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub score_base: Option<f64>,
}

impl From<RawCompatEntry> for Company {
    fn from(entry: RawCompatEntry) -> Self {
        let emp = entry.empresa;
        Self {
            cnpj: emp.cnpj,
            trade_name: first(&[&emp.nome_fantasia, &emp.razao_social]).unwrap_or_else(|| DASH.to_string()),
            legal_name: emp.razao_social.unwrap_or_else(|| DASH.to_string()),
            cnae: emp.cnae_fiscal.unwrap_or_default(),
            cnae_desc: emp.cnae_descricao.unwrap_or_default(),
            uf: emp.uf.unwrap_or_default(),
            municipality: emp.municipio.unwrap_or_default(),
            size: emp.porte_da_empresa.unwrap_or_default(),
            age: emp.idade.filter(|a| *a >= 0.0).map(|a| a as u32),
            match_score: score(Some(entry.compatibilidade.or(entry.score_base).unwrap_or(0.0))),
            badges: Vec::new(),
            share_capital: emp.capital_social_da_empresa,
            partners: None,
            situation: String::new(),
        }
    }
}

/// Decode a list endpoint body into normalized companies, skipping malformed rows
pub fn companies_from_value(body: Value) -> Vec<Company> {
    unwrap_list(body, &["data", "items", "empresas"])
        .into_iter()
        .filter_map(|row| serde_json::from_value::<RawCompany>(row).ok())
        .map(Company::from)
        .collect()
}

pub fn compat_companies_from_value(body: Value) -> Vec<Company> {
    unwrap_list(body, &["resultados", "data"])
        .into_iter()
        .filter_map(|row| serde_json::from_value::<RawCompatEntry>(row).ok())
        .map(Company::from)
        .collect()
}

// ========================
// Opportunities
// ========================

/// A procurement notice from the PNCP listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOpportunity {
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default, rename = "numeroControlePNCP", deserialize_with = "opt_string")]
    pub numero_controle_pncp: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub objeto: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub resumo: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub descricao: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub titulo: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub orgao: Option<String>,
    #[serde(default, rename = "unidadeGestora", deserialize_with = "opt_string")]
    pub unidade_gestora: Option<String>,
    /// Either a name or an object carrying `razaoSocial`
    #[serde(default, rename = "orgaoEntidade")]
    pub orgao_entidade: Option<Value>,
    #[serde(default, deserialize_with = "opt_string")]
    pub modalidade: Option<String>,
    #[serde(default, rename = "codigoModalidadeContratacao", deserialize_with = "opt_string")]
    pub codigo_modalidade: Option<String>,
    #[serde(default, rename = "valorTotalEstimado", deserialize_with = "opt_number")]
    pub valor_total_estimado: Option<f64>,
    #[serde(default, rename = "valorTotal", deserialize_with = "opt_number")]
    pub valor_total: Option<f64>,
    #[serde(default, rename = "dataFinal", deserialize_with = "opt_string")]
    pub data_final: Option<String>,
    #[serde(default, rename = "dataAbertura", deserialize_with = "opt_string")]
    pub data_abertura: Option<String>,
    #[serde(default, rename = "dataPublicacaoPncp", deserialize_with = "opt_string")]
    pub data_publicacao_pncp: Option<String>,
    #[serde(default, rename = "dataPublicacao", deserialize_with = "opt_string")]
    pub data_publicacao: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub uf: Option<String>,
    #[serde(default, rename = "ufSigla", deserialize_with = "opt_string")]
    pub uf_sigla: Option<String>,
    #[serde(default, rename = "municipioNome", deserialize_with = "opt_string")]
    pub municipio_nome: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub situacao: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub status: Option<String>,
    #[serde(default, rename = "matchScore", deserialize_with = "opt_number")]
    pub match_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub agency: String,
    pub modality: String,
    pub value: f64,
    /// Deadline as received; shown through `format_date_br`
    pub deadline: String,
    pub deadline_days: Option<i64>,
    pub situation: String,
    pub uf: String,
    pub municipality: String,
    pub published: String,
    pub match_score: u8,
}

impl Opportunity {
    /// Normalize against `today`, which fixes `deadline_days`
    pub fn from_raw(raw: RawOpportunity, today: NaiveDate) -> Self {
        let entity_name = raw.orgao_entidade.as_ref().and_then(|v| match v {
            Value::Object(map) => map.get("razaoSocial").and_then(value_text),
            other => value_text(other),
        });
        let deadline = first(&[&raw.data_final, &raw.data_abertura, &raw.data_publicacao_pncp, &raw.data_publicacao])
            .unwrap_or_default();
        let published = first(&[&raw.data_publicacao, &raw.data_publicacao_pncp]).unwrap_or_default();
        let title = first(&[&raw.objeto, &raw.resumo, &raw.descricao, &raw.titulo]).unwrap_or_else(|| DASH.to_string());
        let id = first(&[&raw.id, &raw.numero_controle_pncp]).unwrap_or_else(|| format!("{}|{}", title, published));

        Self {
            id,
            title,
            agency: first(&[&raw.orgao, &raw.unidade_gestora, &entity_name]).unwrap_or_else(|| DASH.to_string()),
            modality: first(&[&raw.modalidade, &raw.codigo_modalidade]).unwrap_or_else(|| DASH.to_string()),
            value: raw.valor_total_estimado.or(raw.valor_total).unwrap_or(0.0),
            deadline_days: DeadlineStatus::from_text(&deadline, today).days(),
            deadline,
            situation: first(&[&raw.situacao, &raw.status]).unwrap_or_default(),
            uf: first(&[&raw.uf, &raw.uf_sigla]).unwrap_or_default(),
            municipality: raw.municipio_nome.unwrap_or_default(),
            published,
            match_score: score(raw.match_score).unwrap_or(0),
        }
    }

    pub fn deadline_status(&self, today: NaiveDate) -> DeadlineStatus {
        DeadlineStatus::from_text(&self.deadline, today)
    }
}

pub fn opportunities_from_value(body: Value, today: NaiveDate) -> Vec<Opportunity> {
    unwrap_list(body, &["data", "items", "resultados"])
        .into_iter()
        .filter_map(|row| serde_json::from_value::<RawOpportunity>(row).ok())
        .map(|raw| Opportunity::from_raw(raw, today))
        .collect()
}

// ========================
// Sector analysis
// ========================

/// Company card in the sector players grid
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Player {
    #[serde(default, deserialize_with = "opt_string")]
    pub razao_social_nome_empresarial: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub razao_social: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub nome_empresarial: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnpj: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnpj_basico: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub uf: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub situacao_cadastral: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub porte_da_empresa: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub porte: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub capital_social_da_empresa: Option<f64>,
}

impl Player {
    pub fn legal_name(&self) -> String {
        first(&[&self.razao_social_nome_empresarial, &self.razao_social, &self.nome_empresarial])
            .unwrap_or_else(|| DASH.to_string())
    }

    pub fn cnpj_display(&self) -> String {
        format::format_cnpj(self.cnpj.as_deref().or(self.cnpj_basico.as_deref()).unwrap_or_default())
    }

    pub fn uf_display(&self) -> String {
        self.uf.clone().unwrap_or_else(|| DASH.to_string())
    }

    pub fn situation(&self) -> String {
        format::situation_label(self.situacao_cadastral.as_deref())
    }

    pub fn size(&self) -> String {
        first(&[&self.porte_da_empresa, &self.porte]).unwrap_or_else(|| DASH.to_string())
    }

    pub fn share_capital(&self) -> f64 {
        self.capital_social_da_empresa.unwrap_or(0.0)
    }
}

/// Body of `POST /api/analise/setorial`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorQuery {
    pub cnae_codes: Vec<String>,
    pub uf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limite: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub somente_ativas: Option<bool>,
}

impl SectorQuery {
    pub fn new(cnae: &str, uf: &str) -> Self {
        let cnae = format::normalize_cnae(cnae);
        Self {
            cnae_codes: if cnae.is_empty() { Vec::new() } else { vec![cnae] },
            uf: uf.trim().to_uppercase(),
            limite: None,
            somente_ativas: None,
        }
    }

    /// Active companies only, capped at `limit`
    pub fn players(cnae: &str, uf: &str, limit: u32) -> Self {
        Self {
            limite: Some(limit),
            somente_ativas: Some(true),
            ..Self::new(cnae, uf)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SectorAnalysis {
    #[serde(default)]
    pub kpis: Option<Value>,
    #[serde(default, deserialize_with = "opt_string")]
    pub resumo: Option<String>,
    #[serde(default)]
    pub empresas: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CnaeSuggestion {
    pub code: String,
    pub description: String,
}

impl CnaeSuggestion {
    pub fn label(&self) -> String {
        if self.description.is_empty() {
            self.code.clone()
        } else {
            format!("{} — {}", self.code, self.description)
        }
    }
}

/// `{codigo|code, descricao|desc}` rows, capped at `limit`
pub fn cnae_suggestions_from_value(body: Value, limit: usize) -> Vec<CnaeSuggestion> {
    unwrap_list(body, &["data", "items", "sugestoes"])
        .iter()
        .filter_map(|row| {
            let code = row.get("codigo").or_else(|| row.get("code")).and_then(value_text)?;
            let description = row
                .get("descricao")
                .or_else(|| row.get("desc"))
                .and_then(value_text)
                .unwrap_or_default();
            Some(CnaeSuggestion { code, description })
        })
        .take(limit)
        .collect()
}

/// Sector names from `GET /api/analise/cnaes/setores`
pub fn sectors_from_value(body: Value) -> Vec<String> {
    unwrap_list(body, &["data", "setores"])
        .iter()
        .filter_map(|row| value_text(row).or_else(|| row.get("nome").and_then(value_text)))
        .collect()
}

// ========================
// Company profile
// ========================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Partner {
    #[serde(default, deserialize_with = "opt_string")]
    pub nome_socio: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub qualificacao_socio: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub qualificacao: Option<String>,
}

impl Partner {
    pub fn name(&self) -> String {
        first(&[&self.nome_socio, &self.nome]).unwrap_or_else(|| DASH.to_string())
    }

    pub fn qualification(&self) -> String {
        first(&[&self.qualificacao_socio, &self.qualificacao]).unwrap_or_else(|| DASH.to_string())
    }

    pub fn is_administrator(&self) -> bool {
        self.qualification().to_lowercase().contains("administrador")
    }
}

/// `GET /api/consulta/cnpj/{cnpj}` as rendered by the chat and the profile card
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompanyProfile {
    #[serde(default, deserialize_with = "opt_string")]
    pub cnpj: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnpj_basico: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub razao_social_nome_empresarial: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub razao_social: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub nome_empresarial: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub nome_fantasia: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub data_abertura: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub data_inicio_atividade: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub data_de_inicio_atividade: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub natureza_juridica_nome: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub natureza_juridica: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub situacao_cadastral_nome: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub situacao_cadastral: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub situacao: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub porte_da_empresa: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub capital_social: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub tipo_de_logradouro: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub logradouro: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub numero: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub complemento: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub bairro: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub municipio: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub municipio_nome: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub uf: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cep: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnae_principal: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnae_fiscal: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnae_fiscal_principal: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnae_principal_descricao: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnae_descricao: Option<String>,
    #[serde(default)]
    pub cnaes_secundarios: Option<Value>,
    #[serde(default)]
    pub qsa: Option<Vec<Partner>>,
    #[serde(default)]
    pub socios: Option<Vec<Partner>>,
    #[serde(default, deserialize_with = "opt_string")]
    pub correio_eletronico: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub telefone_1: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub ddd_telefone_1: Option<String>,
}

impl CompanyProfile {
    pub fn legal_name(&self) -> String {
        first(&[&self.razao_social_nome_empresarial, &self.razao_social, &self.nome_empresarial])
            .unwrap_or_else(|| DASH.to_string())
    }

    pub fn trade_name(&self) -> String {
        self.nome_fantasia.clone().unwrap_or_else(|| DASH.to_string())
    }

    /// Raw digits as received, falling back to `fallback`
    pub fn cnpj_or(&self, fallback: &str) -> String {
        first(&[&self.cnpj, &self.cnpj_basico]).unwrap_or_else(|| fallback.to_string())
    }

    pub fn opening_date(&self) -> Option<String> {
        first(&[&self.data_abertura, &self.data_inicio_atividade, &self.data_de_inicio_atividade])
    }

    pub fn legal_nature(&self) -> String {
        first(&[&self.natureza_juridica_nome, &self.natureza_juridica]).unwrap_or_else(|| DASH.to_string())
    }

    /// Textual status (`ATIVA`, `INAPTA`, or the bare code)
    pub fn status_text(&self) -> String {
        first(&[&self.situacao_cadastral_nome, &self.situacao_cadastral, &self.situacao])
            .unwrap_or_else(|| DASH.to_string())
    }

    /// Card badge; a missing status counts as active
    pub fn is_active(&self) -> bool {
        format::is_active_status(self.situacao_cadastral.as_deref())
    }

    pub fn size_label(&self) -> Option<&'static str> {
        self.porte_da_empresa.as_deref().map(format::size_label)
    }

    pub fn share_capital(&self) -> Option<f64> {
        self.capital_social.as_deref().and_then(format::parse_lenient_number)
    }

    pub fn municipality(&self) -> Option<String> {
        first(&[&self.municipio, &self.municipio_nome])
    }

    pub fn main_cnae(&self) -> Option<String> {
        first(&[&self.cnae_principal, &self.cnae_fiscal, &self.cnae_fiscal_principal])
    }

    pub fn main_cnae_description(&self) -> Option<String> {
        first(&[&self.cnae_principal_descricao, &self.cnae_descricao])
    }

    pub fn secondary_cnae_count(&self) -> usize {
        match &self.cnaes_secundarios {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    pub fn partners(&self) -> &[Partner] {
        self.qsa
            .as_deref()
            .or(self.socios.as_deref())
            .unwrap_or_default()
    }

    /// Administrators when there are any, otherwise everyone; at most `limit`
    pub fn highlighted_partners(&self, limit: usize) -> Vec<&Partner> {
        let all = self.partners();
        let admins: Vec<&Partner> = all.iter().filter(|p| p.is_administrator()).collect();
        let chosen = if admins.is_empty() { all.iter().collect() } else { admins };
        chosen.into_iter().take(limit).collect()
    }

    /// Street line for the card: type, street, number, complement
    pub fn street_line(&self) -> String {
        let parts: Vec<&str> = [&self.tipo_de_logradouro, &self.logradouro, &self.numero, &self.complemento]
            .iter()
            .filter_map(|p| p.as_deref())
            .collect();
        if parts.is_empty() {
            DASH.to_string()
        } else {
            parts.join(" ")
        }
    }

    pub fn phone(&self) -> Option<String> {
        first(&[&self.telefone_1, &self.ddd_telefone_1])
    }
}

// ========================
// Partners, bidding, NL query
// ========================

/// Row of the partner search endpoints
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartnerMatch {
    #[serde(default, deserialize_with = "opt_string")]
    pub nome_socio: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub qualificacao: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub qualificacao_socio: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnpj: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnpj_basico: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub razao_social: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub razao_social_nome_empresarial: Option<String>,
}

impl PartnerMatch {
    pub fn cnpj(&self) -> Option<String> {
        first(&[&self.cnpj, &self.cnpj_basico])
    }

    pub fn company_name(&self) -> String {
        first(&[&self.razao_social, &self.razao_social_nome_empresarial])
            .unwrap_or_else(|| "Nome não disponível".to_string())
    }

    pub fn qualification(&self) -> Option<String> {
        first(&[&self.qualificacao_socio, &self.qualificacao])
    }
}

/// Only a JSON array counts; anything else is "no matches"
pub fn partner_matches_from_value(body: Value) -> Vec<PartnerMatch> {
    unwrap_list(body, &["data"])
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect()
}

/// Bidding record for a CNPJ; fields arrive under several names
#[derive(Debug, Clone, PartialEq)]
pub struct BiddingRecord {
    pub title: String,
    pub agency: String,
    pub modality: String,
    /// Only numeric values count; formatted strings are ignored
    pub value: Option<f64>,
    pub deadline: String,
}

impl BiddingRecord {
    pub fn from_value(v: &Value) -> Self {
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| v.get(*k).and_then(value_text))
                .unwrap_or_else(|| DASH.to_string())
        };
        let number = |k: &str| v.get(k).and_then(Value::as_f64);
        Self {
            title: text(&["titulo", "objeto", "resumo"]),
            agency: text(&["orgao", "orgao_nome", "unidade_gestora", "orgao_descricao"]),
            modality: text(&["modalidade", "modalidade_nome"]),
            value: number("valor").or_else(|| number("valor_estimado")),
            deadline: text(&["prazo", "data_limite", "data"]),
        }
    }
}

/// `GET /api/integracoes/licitacoes/cnpj/{cnpj}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiddingResponse {
    pub records: Vec<BiddingRecord>,
    /// Array length, or the `total` field of an object body
    pub total: u64,
}

impl BiddingResponse {
    pub fn from_value(body: Value) -> Self {
        let total = match &body {
            Value::Array(items) => items.len() as u64,
            Value::Object(map) => map.get("total").and_then(value_number).map(|t| t.max(0.0) as u64).unwrap_or(0),
            _ => 0,
        };
        let records = unwrap_list(body, &["items", "dados"]).iter().map(BiddingRecord::from_value).collect();
        Self { records, total }
    }
}

/// `POST /api/analise/nl2sql`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NlQueryResult {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    #[serde(default)]
    pub sql: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NlQuery {
    pub pergunta: String,
    pub limite: u32,
}

// ========================
// Stored records
// ========================

/// Market filters kept under `saved_filters`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedFilters {
    #[serde(default)]
    pub cnae: String,
    #[serde(default)]
    pub uf: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn test_company_name_fallbacks() {
        let c: Company = serde_json::from_value::<RawCompany>(json!({"razao": "Kappa Transportes", "score": 71, "setor": "Transporte", "situacao": "Ativa"}))
            .map(Company::from)
            .unwrap();
        assert_eq!(c.trade_name, "Kappa Transportes");
        assert_eq!(c.legal_name, "Kappa Transportes");
        assert_eq!(c.cnae_desc, "Transporte");
        assert_eq!(c.match_score, Some(71));
        assert_eq!(c.badges, vec!["Ativa".to_string()]);

        let empty = Company::from(RawCompany::default());
        assert_eq!(empty.trade_name, DASH);
        assert_eq!(empty.match_score, None);
    }

    #[test]
    fn test_company_listing_body() {
        let body = json!({"data": [
            {"nomeFantasia": "SecureNet", "razaoSocial": "SecureNet LTDA", "idade": "6", "matchScore": 91, "capitalSocial": "750000", "socios": 4},
            "garbage"
        ]});
        let list = companies_from_value(body);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].age, Some(6));
        assert_eq!(list[0].share_capital, Some(750000.0));
        assert_eq!(list[0].partners, Some(4));
    }

    #[test]
    fn test_compat_mapping() {
        let body = json!({"resultados": [{"empresa": {"razao_social": "Alpha SA", "cnae_fiscal": 6204000, "porte_da_empresa": "03"}, "score_base": 64.6}]});
        let list = compat_companies_from_value(body);
        assert_eq!(list[0].trade_name, "Alpha SA");
        assert_eq!(list[0].cnae, "6204000");
        assert_eq!(list[0].match_score, Some(65));
    }

    #[test]
    fn test_opportunity_mapping() {
        let raw: RawOpportunity = serde_json::from_value(json!({
            "numeroControlePNCP": "123-1-2024",
            "descricao": "Aquisição de notebooks",
            "orgaoEntidade": {"razaoSocial": "Prefeitura de Campinas"},
            "codigoModalidadeContratacao": 6,
            "valorTotal": "120000.50",
            "dataAbertura": "2024-06-13",
            "dataPublicacaoPncp": "2024-06-01T09:00:00",
            "ufSigla": "SP"
        }))
        .unwrap();
        let o = Opportunity::from_raw(raw, today());
        assert_eq!(o.id, "123-1-2024");
        assert_eq!(o.title, "Aquisição de notebooks");
        assert_eq!(o.agency, "Prefeitura de Campinas");
        assert_eq!(o.modality, "6");
        assert_eq!(o.value, 120000.5);
        assert_eq!(o.deadline_days, Some(3));
        assert_eq!(o.published, "2024-06-01T09:00:00");
        assert_eq!(o.uf, "SP");
        assert_eq!(o.match_score, 0);
    }

    #[test]
    fn test_player_accessors() {
        let p: Player = serde_json::from_value(json!({"razao_social": "Beta", "cnpj": "11222333000181", "situacao_cadastral": "02", "capital_social_da_empresa": 1000})).unwrap();
        assert_eq!(p.legal_name(), "Beta");
        assert_eq!(p.cnpj_display(), "11.222.333/0001-81");
        assert_eq!(p.situation(), "Ativa");
        assert_eq!(p.size(), DASH);
        assert_eq!(p.share_capital(), 1000.0);
    }

    #[test]
    fn test_profile_partners_prefer_admins() {
        let profile: CompanyProfile = serde_json::from_value(json!({
            "qsa": [
                {"nome_socio": "Ana", "qualificacao_socio": "Sócio"},
                {"nome_socio": "Bruno", "qualificacao_socio": "Sócio-Administrador"}
            ],
            "cnaes_secundarios": [1, 2, 3],
            "capital_social": "1.500,00"
        }))
        .unwrap();
        let highlighted: Vec<String> = profile.highlighted_partners(5).iter().map(|p| p.name()).collect();
        assert_eq!(highlighted, vec!["Bruno".to_string()]);
        assert_eq!(profile.secondary_cnae_count(), 3);
        assert_eq!(profile.share_capital(), Some(1500.0));
        assert!(profile.is_active());
    }

    #[test]
    fn test_bidding_response_shapes() {
        let arr = BiddingResponse::from_value(json!([{"objeto": "Obra", "valor_estimado": 10.0}, {}]));
        assert_eq!(arr.total, 2);
        assert_eq!(arr.records[0].title, "Obra");
        assert_eq!(arr.records[0].value, Some(10.0));
        assert_eq!(arr.records[1].agency, DASH);

        let obj = BiddingResponse::from_value(json!({"total": 7, "dados": [{"titulo": "X", "valor": "9"}]}));
        assert_eq!(obj.total, 7);
        assert_eq!(obj.records[0].value, None);
    }

    #[test]
    fn test_cnae_suggestions_cap() {
        let rows: Vec<Value> = (0..20).map(|i| json!({"codigo": format!("62{:02}", i), "desc": "TI"})).collect();
        let list = cnae_suggestions_from_value(Value::Array(rows), 12);
        assert_eq!(list.len(), 12);
        assert_eq!(list[0].label(), "6200 — TI");
    }

    #[test]
    fn test_sector_query_body() {
        let q = SectorQuery::players("6204-0/00", " sp ", 12);
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            json!({"cnae_codes": ["6204000"], "uf": "SP", "limite": 12, "somente_ativas": true})
        );
        assert_eq!(serde_json::to_value(SectorQuery::new("", "")).unwrap(), json!({"cnae_codes": [], "uf": ""}));
    }
}
