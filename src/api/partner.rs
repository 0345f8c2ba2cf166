//! Partner Search

use cnpj_insight_core::error::ApiResult;
use cnpj_insight_core::models::{partner_matches_from_value, PartnerMatch};

use super::{query_string, ApiClient};

impl ApiClient {
    pub async fn search_partners(&self, name: &str) -> ApiResult<Vec<PartnerMatch>> {
        let body = self
            .get_json(&format!("/api/consulta/socio{}", query_string(&[("q", name.trim())])))
            .await?;
        Ok(partner_matches_from_value(body))
    }
}
