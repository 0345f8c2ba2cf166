//! Market KPIs
//!
//! Derives the overview cards and chart series from the KPI payload
//! (`/api/analise/kpis/base` or `/api/analise/kpis/geral`).

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::format::{format_fixed1, DASH};
use crate::lenient::{number_list, opt_number, opt_string, string_list};
use crate::models::SavedFilters;

/// Share of the active base assumed to close per month when no exit series exists
const CHURN_ESTIMATE: f64 = 0.0085;
const CHURN_60_FACTOR: f64 = 2.1;
const GROWTH_60_FACTOR: f64 = 1.5;
const RANKING_LIMIT: usize = 5;
const HEATMAP_LIMIT: usize = 10;

// ========================
// Payload
// ========================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LabeledCount {
    #[serde(default, deserialize_with = "opt_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub cnae: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub count: Option<f64>,
}

impl LabeledCount {
    fn count_or_zero(&self) -> f64 {
        self.count.unwrap_or(0.0).trunc()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KpiCards {
    #[serde(default, deserialize_with = "opt_number")]
    pub total_ativas: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub entradas_mes_vigente: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub entradas_mes_anterior: Option<f64>,
    #[serde(default, deserialize_with = "opt_string")]
    pub entradas_mes_vigente_label: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub entradas_mes_anterior_label: Option<String>,
    #[serde(default)]
    pub entradas_mensais: Vec<LabeledCount>,
    #[serde(default)]
    pub saidas_mensais: Vec<LabeledCount>,
    #[serde(default, deserialize_with = "opt_number")]
    pub entradas_30_dias: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub idade_media: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub pct_dados_validos: Option<f64>,
    #[serde(default, deserialize_with = "opt_number")]
    pub risk_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Series {
    #[serde(default, deserialize_with = "string_list")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "number_list")]
    pub valores: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntriesExitsRaw {
    #[serde(default, deserialize_with = "string_list")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "number_list")]
    pub entradas: Vec<f64>,
    #[serde(default, deserialize_with = "number_list")]
    pub saidas: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Charts {
    #[serde(default)]
    pub evolucao_ativas: Series,
    #[serde(default)]
    pub entradas_vs_saidas: EntriesExitsRaw,
    #[serde(default)]
    pub mapa_calor: Series,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GrowthEntry {
    #[serde(default, deserialize_with = "opt_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "opt_number")]
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ranking {
    #[serde(default)]
    pub setores_top: Vec<LabeledCount>,
    #[serde(default)]
    pub estados_crescimento: Vec<GrowthEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopLists {
    #[serde(default)]
    pub situacao_cadastral: Vec<LabeledCount>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiPayload {
    pub cards: KpiCards,
    pub charts: Charts,
    pub ranking: Ranking,
    pub top: TopLists,
    pub total_filtered: Option<f64>,
}

fn part<T: DeserializeOwned + Default>(body: &Value, key: &str) -> T {
    match body.get(key).cloned().map(serde_json::from_value) {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            debug!(key, error = %e, "kpi block ignored");
            T::default()
        }
        None => T::default(),
    }
}

impl KpiPayload {
    /// Each block decodes on its own; a malformed block reads as empty
    pub fn from_value(body: &Value) -> Self {
        Self {
            cards: part(body, "cards"),
            charts: part(body, "graficos"),
            ranking: part(body, "ranking"),
            top: part(body, "top"),
            total_filtered: body.get("total_filtrados").and_then(Value::as_f64),
        }
    }
}

// ========================
// Derivation
// ========================

/// Churn and growth cards toggle between a 30 and a 60 day view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    #[default]
    Days30,
    Days60,
}

impl Window {
    pub fn days(self) -> u32 {
        match self {
            Window::Days30 => 30,
            Window::Days60 => 60,
        }
    }
}

/// Percent change; a zero baseline reads as 100 % growth (or 0 % when flat)
pub fn delta_pct(prev: f64, cur: f64) -> f64 {
    if prev == 0.0 {
        return if cur > 0.0 { 100.0 } else { 0.0 };
    }
    (cur - prev) / prev.max(1.0) * 100.0
}

/// Delta between the last two points of a series
pub fn series_delta(values: &[f64]) -> f64 {
    match values {
        [.., prev, cur] => delta_pct(prev.trunc(), cur.trunc()),
        _ => 0.0,
    }
}

/// `YoY 2023: 12.5%` when the series holds the same month one year back
pub fn year_over_year(latest_label: &str, series: &[LabeledCount], current: Option<f64>) -> Option<String> {
    let current = current?;
    let (year, month) = latest_label.split_once('-')?;
    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().get(..2).unwrap_or(month.trim()).parse().ok()?;
    let target = format!("{}-{:02}", year - 1, month);
    let previous = series.iter().find(|x| x.label.as_deref() == Some(target.as_str()))?;
    let pv = previous.count_or_zero();
    let yoy = if pv > 0.0 {
        (current - pv) / pv * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    };
    Some(format!("YoY {}: {}%", year - 1, format_fixed1(yoy)))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.values.is_empty()
    }

    pub fn max(&self) -> i64 {
        self.values.iter().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntriesExits {
    pub labels: Vec<String>,
    pub entries: Vec<i64>,
    pub exits: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingRow {
    pub label: String,
    pub value: i64,
}

/// Everything the overview cards and charts display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSummary {
    pub total_active: Option<i64>,
    pub entries: Option<i64>,
    pub exits: Option<i64>,
    pub average_age: Option<f64>,
    pub valid_pct: Option<f64>,
    pub period_label: String,
    pub entries_delta: f64,
    pub exits_delta: f64,
    pub active_delta: f64,
    pub yoy: Option<String>,
    pub growth_potential: f64,
    pub risk_score: Option<i64>,
    pub top_sectors: Vec<RankingRow>,
    pub growing_states: Vec<RankingRow>,
    pub evolution: ChartSeries,
    pub entries_vs_exits: EntriesExits,
    pub by_state: ChartSeries,
    pub total_filtered: Option<i64>,
}

impl MarketSummary {
    pub fn validity_message(&self) -> &'static str {
        if self.valid_pct.is_some() {
            "Base com cobertura de dados válida"
        } else {
            "Dados sendo processados"
        }
    }
}

fn to_ints(values: &[f64]) -> Vec<i64> {
    values.iter().map(|v| v.trunc() as i64).collect()
}

fn estimated_exits(cards: &KpiCards, total_active: Option<f64>, window: Window) -> Option<f64> {
    let series = &cards.saidas_mensais;
    if let Some(last) = series.last() {
        let last = last.count_or_zero();
        return Some(match window {
            Window::Days30 => last,
            Window::Days60 => {
                let penult = series.len().checked_sub(2).map(|i| series[i].count_or_zero()).unwrap_or(0.0);
                last + penult
            }
        });
    }
    let total = total_active.filter(|t| *t > 0.0)?;
    let monthly = (total * CHURN_ESTIMATE).floor();
    Some(match window {
        Window::Days30 => monthly,
        Window::Days60 => (monthly * CHURN_60_FACTOR).floor(),
    })
}

fn entries_vs_exits(payload: &KpiPayload) -> EntriesExits {
    let raw = &payload.charts.entradas_vs_saidas;
    if !raw.labels.is_empty() {
        return EntriesExits {
            labels: raw.labels.clone(),
            entries: to_ints(&raw.entradas),
            exits: to_ints(&raw.saidas),
        };
    }
    // fall back to the card series, trimmed to their common tail
    let ent = &payload.cards.entradas_mensais;
    let sai = &payload.cards.saidas_mensais;
    let m = ent.len().min(sai.len());
    let ent = &ent[ent.len() - m..];
    let sai = &sai[sai.len() - m..];
    EntriesExits {
        labels: ent.iter().map(|x| x.label.clone().unwrap_or_else(|| DASH.to_string())).collect(),
        entries: ent.iter().map(|x| x.count_or_zero() as i64).collect(),
        exits: sai.iter().map(|x| x.count_or_zero() as i64).collect(),
    }
}

pub fn summarize(payload: &KpiPayload, churn: Window, growth: Window) -> MarketSummary {
    let cards = &payload.cards;
    let active_from_top = payload
        .top
        .situacao_cadastral
        .iter()
        .find(|x| x.label.as_deref().is_some_and(|l| l.eq_ignore_ascii_case("ativa")))
        .and_then(|x| x.count);
    let total_active = cards.total_ativas.or(active_from_top);

    let last_entry = cards.entradas_mensais.last().and_then(|x| x.count);
    let entries = cards.entradas_mes_vigente.or(cards.entradas_30_dias).or(last_entry);

    let entries_delta = match (cards.entradas_mes_vigente, cards.entradas_mes_anterior) {
        (Some(cur), Some(prev)) => delta_pct(prev, cur),
        _ => series_delta(&cards.entradas_mensais.iter().map(LabeledCount::count_or_zero).collect::<Vec<_>>()),
    };
    let exits_delta = series_delta(&cards.saidas_mensais.iter().map(LabeledCount::count_or_zero).collect::<Vec<_>>());
    let active_delta = series_delta(&payload.charts.evolucao_ativas.valores);

    let period_label = match (&cards.entradas_mes_vigente_label, &cards.entradas_mes_anterior_label) {
        (Some(cur), Some(prev)) => format!("Período: {} vs {}", cur, prev),
        (Some(cur), None) => format!("Período: {}", cur),
        _ => DASH.to_string(),
    };
    let latest_label = cards
        .entradas_mes_vigente_label
        .clone()
        .or_else(|| cards.entradas_mensais.last().and_then(|x| x.label.clone()))
        .unwrap_or_default();

    let growth_potential = match growth {
        Window::Days30 => entries_delta,
        Window::Days60 => entries_delta * GROWTH_60_FACTOR,
    };

    let evolution = ChartSeries {
        labels: payload.charts.evolucao_ativas.labels.clone(),
        values: to_ints(&payload.charts.evolucao_ativas.valores),
    };
    let mapa = &payload.charts.mapa_calor;
    let by_state = ChartSeries {
        labels: mapa.labels.iter().take(HEATMAP_LIMIT).cloned().collect(),
        values: to_ints(&mapa.valores).into_iter().take(HEATMAP_LIMIT).collect(),
    };

    let summary = MarketSummary {
        total_active: total_active.map(|t| t as i64),
        entries: entries.map(|e| e as i64),
        exits: estimated_exits(cards, total_active, churn).map(|e| e as i64),
        average_age: cards.idade_media.filter(|a| *a != 0.0),
        valid_pct: cards.pct_dados_validos,
        period_label,
        entries_delta,
        exits_delta,
        active_delta,
        yoy: year_over_year(&latest_label, &cards.entradas_mensais, cards.entradas_mes_vigente),
        growth_potential,
        risk_score: cards.risk_score.map(|r| r.round() as i64),
        top_sectors: payload
            .ranking
            .setores_top
            .iter()
            .take(RANKING_LIMIT)
            .map(|s| RankingRow {
                label: s.label.clone().or_else(|| s.cnae.clone()).unwrap_or_else(|| DASH.to_string()),
                value: s.count_or_zero() as i64,
            })
            .collect(),
        growing_states: payload
            .ranking
            .estados_crescimento
            .iter()
            .take(RANKING_LIMIT)
            .map(|e| RankingRow {
                label: e.label.clone().unwrap_or_else(|| DASH.to_string()),
                value: e.delta.unwrap_or(0.0).trunc() as i64,
            })
            .collect(),
        evolution,
        entries_vs_exits: entries_vs_exits(payload),
        by_state,
        total_filtered: payload.total_filtered.map(|t| t as i64),
    };
    debug!(total_active = ?summary.total_active, entries = ?summary.entries, "market summary derived");
    summary
}

// ========================
// Filters
// ========================

impl SavedFilters {
    /// CNAE as bare digits, UF uppercased
    pub fn normalized(cnae: &str, uf: &str) -> Self {
        Self {
            cnae: crate::format::normalize_cnae(cnae),
            uf: uf.trim().to_uppercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cnae.is_empty() && self.uf.is_empty()
    }

    /// Query string for the share link; both values are URL-safe once normalized
    pub fn share_query(&self) -> String {
        let uf: String = self.uf.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        format!("?cnae={}&uf={}", self.cnae, uf)
    }

    /// `/api/analise/kpis/geral` query, omitting empty values
    pub fn kpi_query(&self) -> String {
        let mut params = Vec::new();
        if !self.cnae.is_empty() {
            params.push(format!("cnae={}", self.cnae));
        }
        if !self.uf.is_empty() {
            params.push(format!("uf={}", self.uf));
        }
        if params.is_empty() {
            String::new()
        } else {
            format!("?{}", params.join("&"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "cards": {
                "total_ativas": 100000,
                "entradas_mes_vigente": 1200,
                "entradas_mes_anterior": 1000,
                "entradas_mes_vigente_label": "2024-05",
                "entradas_mes_anterior_label": "2024-04",
                "entradas_mensais": [
                    {"label": "2023-05", "count": 800},
                    {"label": "2024-04", "count": 1000},
                    {"label": "2024-05", "count": 1200}
                ],
                "saidas_mensais": [
                    {"label": "2024-04", "count": 300},
                    {"label": "2024-05", "count": 330}
                ],
                "idade_media": 9.43,
                "pct_dados_validos": 97.2,
                "risk_score": 41.6
            },
            "graficos": {
                "evolucao_ativas": {"labels": ["2024-04", "2024-05"], "valores": [200, "250"]}
            },
            "ranking": {
                "setores_top": [{"cnae": "6204000", "count": 10}, {"label": "Comércio", "count": "7"}],
                "estados_crescimento": [{"label": "SP", "delta": 12.8}]
            },
            "total_filtrados": 4321
        })
    }

    #[test]
    fn test_summary_from_full_payload() {
        let s = summarize(&KpiPayload::from_value(&sample()), Window::Days30, Window::Days30);
        assert_eq!(s.total_active, Some(100000));
        assert_eq!(s.entries, Some(1200));
        assert_eq!(s.exits, Some(330));
        assert_eq!(s.entries_delta, 20.0);
        assert_eq!(s.exits_delta, 10.0);
        assert_eq!(s.active_delta, 25.0);
        assert_eq!(s.period_label, "Período: 2024-05 vs 2024-04");
        assert_eq!(s.yoy.as_deref(), Some("YoY 2023: 50.0%"));
        assert_eq!(s.risk_score, Some(42));
        assert_eq!(s.top_sectors[0].label, "6204000");
        assert_eq!(s.top_sectors[1].value, 7);
        assert_eq!(s.growing_states[0].value, 12);
        assert_eq!(s.entries_vs_exits.labels, vec!["2024-04", "2024-05"]);
        assert_eq!(s.entries_vs_exits.entries, vec![1000, 1200]);
        assert_eq!(s.total_filtered, Some(4321));
    }

    #[test]
    fn test_sixty_day_windows() {
        let s = summarize(&KpiPayload::from_value(&sample()), Window::Days60, Window::Days60);
        assert_eq!(s.exits, Some(630));
        assert_eq!(s.growth_potential, 30.0);
    }

    #[test]
    fn test_churn_estimate_without_series() {
        let body = json!({"top": {"situacao_cadastral": [{"label": "ATIVA", "count": 10000}]}});
        let payload = KpiPayload::from_value(&body);
        assert_eq!(summarize(&payload, Window::Days30, Window::Days30).exits, Some(85));
        assert_eq!(summarize(&payload, Window::Days60, Window::Days30).exits, Some(178));
        assert_eq!(summarize(&payload, Window::Days30, Window::Days30).total_active, Some(10000));
    }

    #[test]
    fn test_empty_payload_is_dashes() {
        let s = summarize(&KpiPayload::from_value(&json!({"cards": null})), Window::Days30, Window::Days30);
        assert_eq!(s.total_active, None);
        assert_eq!(s.exits, None);
        assert_eq!(s.period_label, DASH);
        assert_eq!(s.validity_message(), "Dados sendo processados");
        assert!(s.evolution.is_empty());
    }

    #[test]
    fn test_delta_pct_zero_baseline() {
        assert_eq!(delta_pct(0.0, 5.0), 100.0);
        assert_eq!(delta_pct(0.0, 0.0), 0.0);
        assert_eq!(delta_pct(200.0, 100.0), -50.0);
        assert_eq!(series_delta(&[3.0]), 0.0);
    }

    #[test]
    fn test_filter_queries() {
        let f = SavedFilters::normalized("6204-0/00", "sp");
        assert_eq!(f.share_query(), "?cnae=6204000&uf=SP");
        assert_eq!(f.kpi_query(), "?cnae=6204000&uf=SP");
        assert_eq!(SavedFilters::default().kpi_query(), "");
        assert!(SavedFilters::normalized("12", " ").is_empty());
    }
}
