//! Procurement Endpoints
//!
//! PNCP notices for the opportunity board and the per-CNPJ bidding history.

use chrono::NaiveDate;
use cnpj_insight_core::error::ApiResult;
use cnpj_insight_core::format::digits_only;
use cnpj_insight_core::models::{opportunities_from_value, BiddingResponse, Opportunity};

use super::{query_string, ApiClient};

impl ApiClient {
    /// Blank arguments are sent empty; the backend treats them as unset
    pub async fn list_opportunities(
        &self,
        keyword: &str,
        agency: &str,
        modality: &str,
        today: NaiveDate,
    ) -> ApiResult<Vec<Opportunity>> {
        let qs = query_string(&[("palavraChave", keyword.trim()), ("orgao", agency), ("modalidade", modality)]);
        let body = self.get_json(&format!("/api/analise/pncp/editais{}", qs)).await?;
        Ok(opportunities_from_value(body, today))
    }

    pub async fn bidding_for_cnpj(&self, cnpj: &str) -> ApiResult<BiddingResponse> {
        let body = self
            .get_json(&format!("/api/integracoes/licitacoes/cnpj/{}", digits_only(cnpj)))
            .await?;
        Ok(BiddingResponse::from_value(body))
    }
}
