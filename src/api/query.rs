//! Natural-Language Query

use cnpj_insight_core::error::ApiResult;
use cnpj_insight_core::models::{NlQuery, NlQueryResult};

use super::ApiClient;

impl ApiClient {
    pub async fn run_nl_query(&self, query: &NlQuery) -> ApiResult<NlQueryResult> {
        let body = self.post_json("/api/analise/nl2sql", query).await?;
        Ok(serde_json::from_value(body)?)
    }
}
