//! Company Endpoints
//!
//! Profile by CNPJ, registry search, the paginated listing and the
//! compatibility ranking used by the prospecting table.

use cnpj_insight_core::error::ApiResult;
use cnpj_insight_core::format::digits_only;
use cnpj_insight_core::models::{companies_from_value, compat_companies_from_value, Company, CompanyProfile};
use serde::Serialize;
use serde_json::Value;

use super::{encode, query_string, ApiClient};

// ========================
// Argument Structs
// ========================

/// Query of `GET /api/analise/players/lista`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyListing {
    pub search: String,
    pub uf: String,
    pub size: String,
    pub age: String,
    pub situation: String,
    pub order: String,
    pub page: usize,
}

#[derive(Serialize)]
struct CompatFilters<'a> {
    uf: &'a str,
}

#[derive(Serialize)]
struct CompatArgs<'a> {
    cnpj_prestador: &'a str,
    filtros: CompatFilters<'a>,
    limite: u32,
}

const COMPAT_LIMIT: u32 = 50;

/// Some deployments wrap the record in `{ data: {...} }`
fn unwrap_record(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

// ========================
// Commands
// ========================

impl ApiClient {
    pub async fn profile_by_cnpj(&self, cnpj: &str) -> ApiResult<CompanyProfile> {
        let body = self.get_json(&format!("/api/consulta/cnpj/{}", digits_only(cnpj))).await?;
        Ok(serde_json::from_value(unwrap_record(body))?)
    }

    /// 14 digits look up one company; anything else searches by name
    pub async fn search_registry(&self, term: &str) -> ApiResult<Vec<Company>> {
        let digits = digits_only(term);
        let path = if digits.len() == 14 {
            format!("/api/cnpj/dados/{}", digits)
        } else {
            format!("/api/cnpj/buscar/{}", encode(term.trim()))
        };
        let body = self.get_json(&path).await?;
        let body = match unwrap_record(body) {
            record @ Value::Object(_) if record.get("cnpj").is_some() => Value::Array(vec![record]),
            other => other,
        };
        Ok(companies_from_value(body))
    }

    pub async fn list_companies(&self, listing: &CompanyListing) -> ApiResult<Vec<Company>> {
        let page = listing.page.max(1).to_string();
        let qs = query_string(&[
            ("busca", &listing.search),
            ("uf", &listing.uf),
            ("porte", &listing.size),
            ("idade", &listing.age),
            ("situacao", &listing.situation),
            ("ordem", &listing.order),
            ("pagina", &page),
        ]);
        let body = self.get_json(&format!("/api/analise/players/lista{}", qs)).await?;
        Ok(companies_from_value(body))
    }

    /// Companies ranked by compatibility with the given supplier
    pub async fn compatible_companies(&self, cnpj: &str, uf: &str) -> ApiResult<Vec<Company>> {
        let args = CompatArgs {
            cnpj_prestador: cnpj,
            filtros: CompatFilters { uf },
            limite: COMPAT_LIMIT,
        };
        let body = self.post_json("/api/analise/compat/empresas", &args).await?;
        Ok(compat_companies_from_value(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_record() {
        assert_eq!(unwrap_record(json!({"data": {"cnpj": "1"}})), json!({"cnpj": "1"}));
        assert_eq!(unwrap_record(json!({"data": [1]})), json!({"data": [1]}));
        assert_eq!(unwrap_record(json!({"cnpj": "1"})), json!({"cnpj": "1"}));
    }

    #[test]
    fn test_compat_body_shape() {
        let args = CompatArgs {
            cnpj_prestador: "11222333000181",
            filtros: CompatFilters { uf: "SP" },
            limite: COMPAT_LIMIT,
        };
        assert_eq!(
            serde_json::to_value(&args).unwrap(),
            json!({"cnpj_prestador": "11222333000181", "filtros": {"uf": "SP"}, "limite": 50})
        );
    }
}
