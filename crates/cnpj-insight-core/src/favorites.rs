//! Starred Opportunities
//!
//! The local list is the source of truth; the backend copy is best-effort.

use serde::{Deserialize, Serialize};

use crate::models::Opportunity;

/// Entry under the `b2g_favoritos` storage key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteOpportunity {
    pub id: String,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "orgao", default)]
    pub agency: String,
    #[serde(rename = "valor", default)]
    pub value: f64,
    /// RFC 3339 timestamp
    #[serde(rename = "adicionadoEm", default)]
    pub added_at: String,
}

impl FavoriteOpportunity {
    pub fn from_opportunity(o: &Opportunity, added_at: impl Into<String>) -> Self {
        Self {
            id: o.id.clone(),
            title: o.title.clone(),
            agency: o.agency.clone(),
            value: o.value,
            added_at: added_at.into(),
        }
    }
}

/// Body of `POST /api/favoritos/licitacao`
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteRequest<'a> {
    pub licitacao_id: &'a str,
    pub licitacao_data: &'a Opportunity,
}

pub fn is_favorite(list: &[FavoriteOpportunity], id: &str) -> bool {
    list.iter().any(|f| f.id == id)
}

/// Appends unless already starred; returns whether the list changed
pub fn add_favorite(list: &mut Vec<FavoriteOpportunity>, entry: FavoriteOpportunity) -> bool {
    if is_favorite(list, &entry.id) {
        return false;
    }
    list.push(entry);
    true
}

pub fn remove_favorite(list: &mut Vec<FavoriteOpportunity>, id: &str) -> bool {
    let before = list.len();
    list.retain(|f| f.id != id);
    list.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn make_opportunity(id: &str) -> Opportunity {
        Opportunity {
            id: id.to_string(),
            title: "Aquisição de notebooks".to_string(),
            agency: "Prefeitura".to_string(),
            modality: "Pregão".to_string(),
            value: 1000.0,
            deadline: String::new(),
            deadline_days: None,
            situation: String::new(),
            uf: "SP".to_string(),
            municipality: String::new(),
            published: String::new(),
            match_score: 0,
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut list = Vec::new();
        let o = make_opportunity("a");
        assert!(add_favorite(&mut list, FavoriteOpportunity::from_opportunity(&o, "2024-06-10T12:00:00Z")));
        assert!(!add_favorite(&mut list, FavoriteOpportunity::from_opportunity(&o, "later")));
        assert_eq!(list.len(), 1);
        assert!(is_favorite(&list, "a"));
    }

    #[test]
    fn test_remove() {
        let mut list = vec![FavoriteOpportunity::from_opportunity(&make_opportunity("a"), "t")];
        assert!(!remove_favorite(&mut list, "b"));
        assert!(remove_favorite(&mut list, "a"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_storage_shape() {
        let fav = FavoriteOpportunity::from_opportunity(&make_opportunity("a"), "t");
        assert_eq!(
            serde_json::to_value(&fav).unwrap(),
            json!({"id": "a", "titulo": "Aquisição de notebooks", "orgao": "Prefeitura", "valor": 1000.0, "adicionadoEm": "t"})
        );
        let stored: Vec<FavoriteOpportunity> = serde_json::from_value(json!([{"id": "x"}])).unwrap();
        assert_eq!(stored[0].title, "");
    }
}
