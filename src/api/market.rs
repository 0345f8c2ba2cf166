//! Market Endpoints

use cnpj_insight_core::error::ApiResult;
use cnpj_insight_core::market::KpiPayload;
use cnpj_insight_core::models::{
    cnae_suggestions_from_value, sectors_from_value, CnaeSuggestion, SavedFilters, SectorAnalysis, SectorQuery,
};
use serde_json::Value;

use super::{query_string, ApiClient};

/// Suggestions shown under the CNAE input
pub const MAX_SUGGESTIONS: usize = 12;

impl ApiClient {
    pub async fn base_kpis(&self) -> ApiResult<Value> {
        self.get_json("/api/analise/kpis/base").await
    }

    /// Raw body is kept for the JSON export
    pub async fn filtered_kpis(&self, filters: &SavedFilters) -> ApiResult<Value> {
        self.get_json(&format!("/api/analise/kpis/geral{}", filters.kpi_query())).await
    }

    /// Filtered KPIs when any filter is set, base KPIs otherwise
    pub async fn market_kpis(&self, filters: &SavedFilters) -> ApiResult<(Value, KpiPayload)> {
        let body = if filters.is_empty() {
            self.base_kpis().await?
        } else {
            self.filtered_kpis(filters).await?
        };
        let payload = KpiPayload::from_value(&body);
        Ok((body, payload))
    }

    pub async fn cnae_suggestions(&self, term: &str, sector: &str) -> ApiResult<Vec<CnaeSuggestion>> {
        let qs = if sector.is_empty() {
            query_string(&[("termo", term)])
        } else {
            query_string(&[("termo", term), ("setor", sector)])
        };
        let body = self.get_json(&format!("/api/analise/cnaes/sugerir{}", qs)).await?;
        Ok(cnae_suggestions_from_value(body, MAX_SUGGESTIONS))
    }

    pub async fn sectors(&self) -> ApiResult<Vec<String>> {
        let body = self.get_json("/api/analise/cnaes/setores").await?;
        Ok(sectors_from_value(body))
    }

    pub async fn analyze_sector(&self, query: &SectorQuery) -> ApiResult<SectorAnalysis> {
        let body = self.post_json("/api/analise/setorial", query).await?;
        Ok(serde_json::from_value(body)?)
    }
}
