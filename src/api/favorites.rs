//! Favourite Mirroring
//!
//! The local list is authoritative; these calls only keep the backend copy
//! in step.

use cnpj_insight_core::error::ApiResult;
use cnpj_insight_core::favorites::FavoriteRequest;
use cnpj_insight_core::models::Opportunity;

use super::{encode, ApiClient};

impl ApiClient {
    pub async fn add_favorite(&self, opportunity: &Opportunity) -> ApiResult<()> {
        let args = FavoriteRequest {
            licitacao_id: &opportunity.id,
            licitacao_data: opportunity,
        };
        self.post("/api/favoritos/licitacao", &args).await.map(|_| ())
    }

    pub async fn remove_favorite(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/api/favoritos/licitacao/{}", encode(id))).await
    }
}
