//! Company & Opportunity Criteria
//!
//! Each filter is a plain struct of optional predicates; an empty field is
//! "always true". The select-box values (`90+`, `0-50k`, `score_desc`...) parse
//! into enums so the views can round-trip them.

use std::cmp::Ordering;

use crate::format::normalize_cnpj;
use crate::models::{Company, Opportunity};
use crate::pipeline::{Criteria, SortOrder};

/// Stand-in for an unknown numeric field in comparisons
const UNKNOWN: f64 = -1.0;

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Parsing and printing for select-box values
pub trait SelectValue: Sized + Copy + 'static {
    const ALL: &'static [Self];
    fn value(self) -> &'static str;
    fn label(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.value() == value)
    }
}

// ========================
// Companies
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchBand {
    Above90,
    From75To90,
    From60To75,
}

impl MatchBand {
    pub fn contains(self, score: u8) -> bool {
        match self {
            MatchBand::Above90 => score >= 90,
            MatchBand::From75To90 => (75..90).contains(&score),
            MatchBand::From60To75 => (60..75).contains(&score),
        }
    }
}

impl SelectValue for MatchBand {
    const ALL: &'static [Self] = &[MatchBand::Above90, MatchBand::From75To90, MatchBand::From60To75];

    fn value(self) -> &'static str {
        match self {
            MatchBand::Above90 => "90+",
            MatchBand::From75To90 => "75-90",
            MatchBand::From60To75 => "60-75",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MatchBand::Above90 => "90% ou mais",
            MatchBand::From75To90 => "75% a 90%",
            MatchBand::From60To75 => "60% a 75%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeRange {
    UpTo2,
    From2To5,
    From5To10,
    Over10,
}

impl AgeRange {
    /// Bounds are inclusive on both ends
    pub fn contains(self, age: u32) -> bool {
        match self {
            AgeRange::UpTo2 => age <= 2,
            AgeRange::From2To5 => (2..=5).contains(&age),
            AgeRange::From5To10 => (5..=10).contains(&age),
            AgeRange::Over10 => age >= 10,
        }
    }
}

impl SelectValue for AgeRange {
    const ALL: &'static [Self] = &[AgeRange::UpTo2, AgeRange::From2To5, AgeRange::From5To10, AgeRange::Over10];

    fn value(self) -> &'static str {
        match self {
            AgeRange::UpTo2 => "0-2",
            AgeRange::From2To5 => "2-5",
            AgeRange::From5To10 => "5-10",
            AgeRange::Over10 => "10+",
        }
    }

    fn label(self) -> &'static str {
        match self {
            AgeRange::UpTo2 => "Até 2 anos",
            AgeRange::From2To5 => "2 a 5 anos",
            AgeRange::From5To10 => "5 a 10 anos",
            AgeRange::Over10 => "Mais de 10 anos",
        }
    }
}

/// Per-column filters in the table header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFilters {
    pub name: String,
    pub size: String,
    pub min_age: Option<u32>,
    pub min_capital: Option<f64>,
    pub min_partners: Option<u32>,
    pub sector: String,
    pub min_match: Option<u8>,
}

impl ColumnFilters {
    fn matches(&self, c: &Company) -> bool {
        let name = self.name.trim().to_lowercase();
        let sector = self.sector.trim().to_lowercase();
        let age = c.age.map(f64::from).unwrap_or(UNKNOWN);
        let capital = c.share_capital.unwrap_or(UNKNOWN);
        let partners = c.partners.map(f64::from).unwrap_or(UNKNOWN);

        (name.is_empty() || contains_ci(&c.trade_name, &name) || contains_ci(&c.legal_name, &name))
            && (self.size.is_empty() || c.size.contains(self.size.as_str()))
            && self.min_age.map_or(true, |min| age >= f64::from(min))
            && self.min_capital.map_or(true, |min| capital >= min)
            && self.min_partners.map_or(true, |min| partners >= f64::from(min))
            && (sector.is_empty() || contains_ci(&c.cnae_desc, &sector))
            && self.min_match.map_or(true, |min| c.match_score.unwrap_or(0) >= min)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFilter {
    pub term: String,
    pub uf: String,
    pub match_band: Option<MatchBand>,
    /// Used when no band is selected
    pub min_match: Option<u8>,
    pub size: String,
    pub age_range: Option<AgeRange>,
    pub situation: String,
    pub columns: ColumnFilters,
}

impl CompanyFilter {
    /// A term that is a CNPJ asks the backend for compatible companies instead
    pub fn is_cnpj_search(&self) -> bool {
        normalize_cnpj(self.term.trim()).is_some()
    }

    fn term_matches(&self, c: &Company) -> bool {
        let term = self.term.trim().to_lowercase();
        term.is_empty()
            || self.is_cnpj_search()
            || contains_ci(&c.trade_name, &term)
            || contains_ci(&c.legal_name, &term)
            || contains_ci(&c.cnae, &term)
            || contains_ci(&c.cnae_desc, &term)
    }

    fn match_matches(&self, c: &Company) -> bool {
        let score = c.match_score.unwrap_or(0);
        match (self.match_band, self.min_match) {
            (Some(band), _) => band.contains(score),
            (None, Some(min)) => score >= min,
            (None, None) => true,
        }
    }
}

impl Criteria<Company> for CompanyFilter {
    fn matches(&self, c: &Company) -> bool {
        self.term_matches(c)
            && (self.uf.is_empty() || c.uf == self.uf)
            && self.match_matches(c)
            && (self.size.is_empty() || c.size == self.size)
            && match (self.age_range, c.age) {
                (Some(range), Some(age)) => range.contains(age),
                _ => true,
            }
            && (self.situation.is_empty() || c.badges.contains(&self.situation) || c.situation == self.situation)
            && self.columns.matches(c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompanySort {
    #[default]
    ScoreDesc,
    ScoreAsc,
    CapitalDesc,
    CapitalAsc,
    AgeDesc,
    AgeAsc,
}

impl SelectValue for CompanySort {
    const ALL: &'static [Self] = &[
        CompanySort::ScoreDesc,
        CompanySort::ScoreAsc,
        CompanySort::CapitalDesc,
        CompanySort::CapitalAsc,
        CompanySort::AgeDesc,
        CompanySort::AgeAsc,
    ];

    fn value(self) -> &'static str {
        match self {
            CompanySort::ScoreDesc => "score_desc",
            CompanySort::ScoreAsc => "score_asc",
            CompanySort::CapitalDesc => "capital_desc",
            CompanySort::CapitalAsc => "capital_asc",
            CompanySort::AgeDesc => "idade_desc",
            CompanySort::AgeAsc => "idade_asc",
        }
    }

    fn label(self) -> &'static str {
        match self {
            CompanySort::ScoreDesc => "Maior compatibilidade",
            CompanySort::ScoreAsc => "Menor compatibilidade",
            CompanySort::CapitalDesc => "Maior capital",
            CompanySort::CapitalAsc => "Menor capital",
            CompanySort::AgeDesc => "Mais antigas",
            CompanySort::AgeAsc => "Mais novas",
        }
    }
}

impl SortOrder<Company> for CompanySort {
    fn compare(&self, a: &Company, b: &Company) -> Ordering {
        let score = |c: &Company| f64::from(c.match_score.unwrap_or(0));
        let capital = |c: &Company| c.share_capital.unwrap_or(UNKNOWN);
        let age = |c: &Company| c.age.map(f64::from).unwrap_or(UNKNOWN);
        let (x, y) = match self {
            CompanySort::ScoreDesc => (score(b), score(a)),
            CompanySort::ScoreAsc => (score(a), score(b)),
            CompanySort::CapitalDesc => (capital(b), capital(a)),
            CompanySort::CapitalAsc => (capital(a), capital(b)),
            CompanySort::AgeDesc => (age(b), age(a)),
            CompanySort::AgeAsc => (age(a), age(b)),
        };
        x.total_cmp(&y)
    }
}

// ========================
// Opportunities
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRange {
    UpTo50k,
    From50kTo500k,
    Over500k,
}

impl ValueRange {
    pub fn contains(self, value: f64) -> bool {
        match self {
            ValueRange::UpTo50k => value <= 50_000.0,
            ValueRange::From50kTo500k => (50_000.0..=500_000.0).contains(&value),
            ValueRange::Over500k => value >= 500_000.0,
        }
    }
}

impl SelectValue for ValueRange {
    const ALL: &'static [Self] = &[ValueRange::UpTo50k, ValueRange::From50kTo500k, ValueRange::Over500k];

    fn value(self) -> &'static str {
        match self {
            ValueRange::UpTo50k => "0-50k",
            ValueRange::From50kTo500k => "50k-500k",
            ValueRange::Over500k => "500k+",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ValueRange::UpTo50k => "Até R$ 50 mil",
            ValueRange::From50kTo500k => "R$ 50 mil a R$ 500 mil",
            ValueRange::Over500k => "Acima de R$ 500 mil",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpportunityFilter {
    pub term: String,
    pub agency: String,
    pub modality: String,
    pub value_range: Option<ValueRange>,
}

impl Criteria<Opportunity> for OpportunityFilter {
    fn matches(&self, o: &Opportunity) -> bool {
        let term = self.term.trim().to_lowercase();
        let modality = self.modality.to_lowercase();
        (term.is_empty() || contains_ci(&o.title, &term) || contains_ci(&o.municipality, &term))
            && (self.agency.is_empty() || o.agency.to_lowercase() == self.agency.to_lowercase())
            && (modality.is_empty() || contains_ci(&o.modality, &modality))
            && self.value_range.map_or(true, |r| r.contains(o.value))
    }
}

/// Removable chip for one active criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Term,
    Agency,
    Modality,
    Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterChip {
    pub field: FilterField,
    pub label: String,
}

impl OpportunityFilter {
    pub fn chips(&self) -> Vec<FilterChip> {
        let mut chips = Vec::new();
        let term = self.term.trim();
        if !term.is_empty() {
            chips.push(FilterChip {
                field: FilterField::Term,
                label: format!("\"{}\"", term),
            });
        }
        if !self.agency.is_empty() {
            chips.push(FilterChip {
                field: FilterField::Agency,
                label: self.agency.clone(),
            });
        }
        if !self.modality.is_empty() {
            chips.push(FilterChip {
                field: FilterField::Modality,
                label: self.modality.clone(),
            });
        }
        if let Some(range) = self.value_range {
            chips.push(FilterChip {
                field: FilterField::Value,
                label: range.value().to_string(),
            });
        }
        chips
    }

    pub fn clear(&mut self, field: FilterField) {
        match field {
            FilterField::Term => self.term.clear(),
            FilterField::Agency => self.agency.clear(),
            FilterField::Modality => self.modality.clear(),
            FilterField::Value => self.value_range = None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpportunitySort {
    /// Publication date, newest first
    #[default]
    Recent,
    ValueDesc,
    ValueAsc,
    DeadlineDesc,
    DeadlineAsc,
}

impl SelectValue for OpportunitySort {
    const ALL: &'static [Self] = &[
        OpportunitySort::Recent,
        OpportunitySort::ValueDesc,
        OpportunitySort::ValueAsc,
        OpportunitySort::DeadlineDesc,
        OpportunitySort::DeadlineAsc,
    ];

    fn value(self) -> &'static str {
        match self {
            OpportunitySort::Recent => "recente",
            OpportunitySort::ValueDesc => "valor_desc",
            OpportunitySort::ValueAsc => "valor_asc",
            OpportunitySort::DeadlineDesc => "prazo_desc",
            OpportunitySort::DeadlineAsc => "prazo_asc",
        }
    }

    fn label(self) -> &'static str {
        match self {
            OpportunitySort::Recent => "Mais recentes",
            OpportunitySort::ValueDesc => "Maior valor",
            OpportunitySort::ValueAsc => "Menor valor",
            OpportunitySort::DeadlineDesc => "Prazo mais longo",
            OpportunitySort::DeadlineAsc => "Prazo mais curto",
        }
    }
}

impl SortOrder<Opportunity> for OpportunitySort {
    fn compare(&self, a: &Opportunity, b: &Opportunity) -> Ordering {
        let days = |o: &Opportunity| o.deadline_days.unwrap_or(0);
        match self {
            // ISO date text sorts chronologically
            OpportunitySort::Recent => b.published.cmp(&a.published),
            OpportunitySort::ValueDesc => b.value.total_cmp(&a.value),
            OpportunitySort::ValueAsc => a.value.total_cmp(&b.value),
            OpportunitySort::DeadlineDesc => days(b).cmp(&days(a)),
            OpportunitySort::DeadlineAsc => days(a).cmp(&days(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::paginate;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn make_company(name: &str, uf: &str, score: Option<u8>, age: Option<u32>) -> Company {
        Company {
            cnpj: None,
            trade_name: name.to_string(),
            legal_name: format!("{} LTDA", name),
            cnae: "6204000".to_string(),
            cnae_desc: "Consultoria em TI".to_string(),
            uf: uf.to_string(),
            municipality: String::new(),
            size: "Pequeno Porte".to_string(),
            age,
            match_score: score,
            badges: vec!["Crescimento".to_string()],
            share_capital: None,
            partners: None,
            situation: String::new(),
        }
    }

    fn make_opportunity(title: &str, value: f64, published: &str, days: Option<i64>) -> Opportunity {
        Opportunity {
            id: title.to_string(),
            title: title.to_string(),
            agency: "Prefeitura de Campinas".to_string(),
            modality: "Pregão Eletrônico".to_string(),
            value,
            deadline: String::new(),
            deadline_days: days,
            situation: String::new(),
            uf: "SP".to_string(),
            municipality: "Campinas".to_string(),
            published: published.to_string(),
            match_score: 0,
        }
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let list = vec![make_company("A", "SP", None, None), make_company("B", "RJ", Some(10), Some(3))];
        let page = paginate(&list, &CompanyFilter::default(), &CompanySort::default(), 1, 9);
        assert_eq!(page.total_items, 2);
    }

    #[test]
    fn test_term_matches_names_and_cnae() {
        let c = make_company("SecureNet", "SP", None, None);
        let by = |term: &str| CompanyFilter { term: term.into(), ..Default::default() }.matches(&c);
        assert!(by("secure"));
        assert!(by("ltda"));
        assert!(by("6204"));
        assert!(by("consultoria"));
        assert!(!by("logística"));
        // a CNPJ term is answered by the backend, not filtered locally
        assert!(by("11.222.333/0001-81"));
    }

    #[test]
    fn test_match_band_and_min_match() {
        let c = make_company("A", "SP", Some(80), None);
        let band = |b| CompanyFilter { match_band: Some(b), ..Default::default() }.matches(&c);
        assert!(band(MatchBand::From75To90));
        assert!(!band(MatchBand::Above90));
        assert!(CompanyFilter { min_match: Some(80), ..Default::default() }.matches(&c));
        assert!(!CompanyFilter { min_match: Some(81), ..Default::default() }.matches(&c));
    }

    #[test]
    fn test_age_range_inclusive_and_unknown_passes() {
        let range = |r, age| CompanyFilter { age_range: Some(r), ..Default::default() }.matches(&make_company("A", "SP", None, age));
        assert!(range(AgeRange::From2To5, Some(2)));
        assert!(range(AgeRange::From2To5, Some(5)));
        assert!(range(AgeRange::From5To10, Some(5)));
        assert!(!range(AgeRange::Over10, Some(9)));
        assert!(range(AgeRange::Over10, None));
    }

    #[test]
    fn test_situation_checks_badges() {
        let c = make_company("A", "SP", None, None);
        assert!(CompanyFilter { situation: "Crescimento".into(), ..Default::default() }.matches(&c));
        assert!(!CompanyFilter { situation: "Startup".into(), ..Default::default() }.matches(&c));
    }

    #[test]
    fn test_column_filters_use_sentinel() {
        let c = make_company("A", "SP", None, None);
        let cols = |columns| CompanyFilter { columns, ..Default::default() }.matches(&c);
        assert!(!cols(ColumnFilters { min_capital: Some(0.0), ..Default::default() }));
        assert!(!cols(ColumnFilters { min_age: Some(0), ..Default::default() }));
        assert!(cols(ColumnFilters { size: "Pequeno".into(), sector: "ti".into(), ..Default::default() }));
    }

    #[test]
    fn test_company_sort_missing_capital_lowest() {
        let mut rich = make_company("Rich", "SP", Some(50), None);
        rich.share_capital = Some(10.0);
        let unknown = make_company("Unknown", "SP", Some(90), None);
        let list = vec![unknown, rich];
        let page = paginate(&list, &CompanyFilter::default(), &CompanySort::CapitalDesc, 1, 9);
        assert_eq!(page.items[0].trade_name, "Rich");
        let page = paginate(&list, &CompanyFilter::default(), &CompanySort::ScoreDesc, 1, 9);
        assert_eq!(page.items[0].trade_name, "Unknown");
    }

    #[test]
    fn test_select_values_round_trip() {
        for sort in CompanySort::ALL {
            assert_eq!(CompanySort::parse(sort.value()), Some(*sort));
        }
        assert_eq!(ValueRange::parse("500k+"), Some(ValueRange::Over500k));
        assert_eq!(OpportunitySort::parse("bogus"), None);
    }

    #[test]
    fn test_opportunity_filter() {
        let o = make_opportunity("Aquisição de notebooks", 50_000.0, "2024-06-01", None);
        let f = |filter: OpportunityFilter| filter.matches(&o);
        assert!(f(OpportunityFilter { term: "campinas".into(), ..Default::default() }));
        assert!(f(OpportunityFilter { agency: "prefeitura de campinas".into(), ..Default::default() }));
        assert!(!f(OpportunityFilter { agency: "prefeitura".into(), ..Default::default() }));
        assert!(f(OpportunityFilter { modality: "pregão".into(), ..Default::default() }));
        // 50k sits in both of the lower bands
        assert!(f(OpportunityFilter { value_range: Some(ValueRange::UpTo50k), ..Default::default() }));
        assert!(f(OpportunityFilter { value_range: Some(ValueRange::From50kTo500k), ..Default::default() }));
        assert!(!f(OpportunityFilter { value_range: Some(ValueRange::Over500k), ..Default::default() }));
    }

    #[test]
    fn test_opportunity_sorts() {
        let list = vec![
            make_opportunity("old", 10.0, "2024-01-01", Some(20)),
            make_opportunity("new", 5.0, "2024-05-01", None),
            make_opportunity("mid", 30.0, "2024-03-01", Some(2)),
        ];
        let titles = |sort: OpportunitySort| -> Vec<String> {
            paginate(&list, &OpportunityFilter::default(), &sort, 1, 9).items.into_iter().map(|o| o.title).collect()
        };
        assert_eq!(titles(OpportunitySort::Recent), vec!["new", "mid", "old"]);
        assert_eq!(titles(OpportunitySort::ValueDesc), vec!["mid", "old", "new"]);
        assert_eq!(titles(OpportunitySort::DeadlineAsc), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_chips_and_clear() {
        let mut filter = OpportunityFilter {
            term: " obras ".into(),
            modality: "Pregão".into(),
            value_range: Some(ValueRange::Over500k),
            ..Default::default()
        };
        let labels: Vec<String> = filter.chips().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["\"obras\"", "Pregão", "500k+"]);
        filter.clear(FilterField::Value);
        assert_eq!(filter.value_range, None);
        assert_eq!(filter.chips().len(), 2);
    }

    fn arb_company() -> impl Strategy<Value = Company> {
        (
            "[a-z]{1,8}",
            prop::sample::select(vec!["SP", "RJ", "MG"]),
            prop::option::of(0u8..=100),
            prop::option::of(0u32..30),
            prop::option::of(0.0f64..1e7),
        )
            .prop_map(|(name, uf, score, age, capital)| {
                let mut c = make_company(&name, uf, score, age);
                c.share_capital = capital;
                c
            })
    }

    fn arb_filter() -> impl Strategy<Value = CompanyFilter> {
        (
            prop::option::of("[a-z]{1,2}"),
            prop::option::of(prop::sample::select(vec!["SP", "RJ"])),
            prop::option::of(prop::sample::select(MatchBand::ALL.to_vec())),
            prop::option::of(prop::sample::select(AgeRange::ALL.to_vec())),
            prop::option::of(0.0f64..1e7),
        )
            .prop_map(|(term, uf, band, age, min_capital)| CompanyFilter {
                term: term.unwrap_or_default(),
                uf: uf.unwrap_or_default().to_string(),
                match_band: band,
                age_range: age,
                columns: ColumnFilters { min_capital, ..Default::default() },
                ..Default::default()
            })
    }

    proptest! {
        #[test]
        fn prop_filtered_is_subset_satisfying_predicates(
            list in prop::collection::vec(arb_company(), 0..40),
            filter in arb_filter(),
        ) {
            let page = paginate(&list, &filter, &CompanySort::default(), 1, list.len().max(1));
            prop_assert!(page.items.len() <= list.len());
            for c in &page.items {
                prop_assert!(list.contains(c));
                prop_assert!(filter.uf.is_empty() || c.uf == filter.uf);
                if let Some(band) = filter.match_band {
                    prop_assert!(band.contains(c.match_score.unwrap_or(0)));
                }
                if let (Some(range), Some(age)) = (filter.age_range, c.age) {
                    prop_assert!(range.contains(age));
                }
                if let Some(min) = filter.columns.min_capital {
                    prop_assert!(c.share_capital.unwrap_or(-1.0) >= min);
                }
            }
        }
    }
}
