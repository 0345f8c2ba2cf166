//! Formatter Utilities
//!
//! Pure, total functions: nothing here panics or returns an empty string
//! for display purposes.

use chrono::{NaiveDate, NaiveDateTime};

/// Placeholder shown for absent values
pub const DASH: &str = "—";

// ========================
// Numbers & currency
// ========================

/// Parse a number written either plainly (`1234.5`) or pt-BR style (`R$ 1.234,50`)
pub fn parse_lenient_number(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let negative = kept.starts_with('-');
    let body = kept.replace('-', "");

    let normalized = if body.contains(',') {
        // pt-BR: dots group thousands, the comma is the decimal mark
        body.replace('.', "").replacen(',', ".", 1).replace(',', "")
    } else if body.matches('.').count() > 1 {
        body.replace('.', "")
    } else {
        body
    };

    let value: f64 = normalized.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// `R$ 1.234,56` (pt-BR, non-breaking space after the symbol)
pub fn format_brl(value: f64, with_cents: bool) -> String {
    if !value.is_finite() {
        return DASH.to_string();
    }
    let places = if with_cents { 2 } else { 0 };
    let fixed = format!("{:.*}", places, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (fixed, None),
    };
    let sign = if value < 0.0 && fixed_is_nonzero(&int_part, frac_part.as_deref()) { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}R$\u{a0}{},{}", sign, group_thousands(&int_part), f),
        None => format!("{}R$\u{a0}{}", sign, group_thousands(&int_part)),
    }
}

fn fixed_is_nonzero(int_part: &str, frac: Option<&str>) -> bool {
    int_part.chars().any(|c| c != '0') || frac.is_some_and(|f| f.chars().any(|c| c != '0'))
}

/// Currency from raw backend text; falls back to the raw text when it is not a number
pub fn format_currency(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DASH.to_string();
    }
    match parse_lenient_number(trimmed) {
        Some(v) => format_brl(v, true),
        None => trimmed.to_string(),
    }
}

/// List views show whole reais
pub fn format_currency_rounded(value: f64) -> String {
    format_brl(value, false)
}

/// `1.234.567`
pub fn format_integer(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_optional_integer(value: Option<i64>) -> String {
    value.map(format_integer).unwrap_or_else(|| DASH.to_string())
}

/// One decimal place, `12.5`
pub fn format_fixed1(value: f64) -> String {
    format!("{:.1}", value)
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_fixed1(value))
}

// ========================
// CNPJ / CNAE / CEP
// ========================

pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The 14 digits of a CNPJ, if the text reduces to exactly that
pub fn normalize_cnpj(text: &str) -> Option<String> {
    let digits = digits_only(text);
    (digits.len() == 14).then_some(digits)
}

fn check_digit(digits: &[u32]) -> u32 {
    // weights run from (len - 7) down to 2, then restart at 9
    let mut weight = digits.len() as u32 - 7;
    let mut sum = 0;
    for d in digits {
        sum += d * weight;
        weight -= 1;
        if weight < 2 {
            weight = 9;
        }
    }
    let rest = sum % 11;
    if rest < 2 {
        0
    } else {
        11 - rest
    }
}

/// Two mod-11 check digits; same-digit sequences are rejected outright
pub fn is_valid_cnpj(text: &str) -> bool {
    let Some(cnpj) = normalize_cnpj(text) else {
        return false;
    };
    let digits: Vec<u32> = cnpj.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }
    check_digit(&digits[..12]) == digits[12] && check_digit(&digits[..13]) == digits[13]
}

/// `00.000.000/0000-00`; anything that is not 14 digits is returned unchanged
pub fn format_cnpj(text: &str) -> String {
    match normalize_cnpj(text) {
        Some(d) if d.len() == text.len() => {
            format!("{}.{}.{}/{}-{}", &d[0..2], &d[2..5], &d[5..8], &d[8..12], &d[12..14])
        }
        _ => text.to_string(),
    }
}

/// CNAE codes are compared as bare digits; fewer than 4 digits means "no code"
pub fn normalize_cnae(text: &str) -> String {
    let digits = digits_only(text);
    if digits.len() >= 4 {
        digits
    } else {
        String::new()
    }
}

pub fn format_cep(text: &str) -> String {
    let digits = digits_only(text);
    if digits.len() == 8 && digits.len() == text.trim().len() {
        format!("{}-{}", &digits[..5], &digits[5..])
    } else {
        text.to_string()
    }
}

// ========================
// Dates
// ========================

/// ISO date, ISO datetime or the registry's compact `yyyymmdd`
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(d);
    }
    if t.len() == 8 && t.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(d) = NaiveDate::parse_from_str(t, "%Y%m%d") {
            return Some(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(t) {
        return Some(dt.date_naive());
    }
    // keep the date part of anything else shaped like "2024-05-01 ..."
    t.get(..10).and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}

/// `dd/mm/yyyy`; unparseable text is shown as received
pub fn format_date_br(text: &str) -> String {
    if text.trim().is_empty() {
        return DASH.to_string();
    }
    match parse_date(text) {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => text.to_string(),
    }
}

// ========================
// Registry codes
// ========================

pub const STATES: [&str; 27] = [
    "AC", "AL", "AM", "AP", "BA", "CE", "DF", "ES", "GO", "MA", "MG", "MS", "MT", "PA", "PB", "PE", "PI", "PR", "RJ",
    "RN", "RO", "RR", "RS", "SC", "SE", "SP", "TO",
];

/// Case-insensitive check against the 27 federative units
pub fn is_state_code(code: &str) -> bool {
    STATES.iter().any(|s| s.eq_ignore_ascii_case(code))
}

/// Company size (porte) code to label
pub fn size_label(code: &str) -> &'static str {
    match code.trim() {
        "01" | "1" => "Microempresa",
        "02" | "2" => "Pequena",
        "03" | "3" => "Média",
        "04" | "4" => "Grande",
        "05" | "5" => "Demais",
        _ => "Não Informado",
    }
}

/// Registration status `02` means active; a missing status is assumed active
pub fn is_active_status(code: Option<&str>) -> bool {
    matches!(code.map(str::trim), None | Some("02") | Some("2"))
}

pub fn situation_label(code: Option<&str>) -> String {
    match code.map(str::trim) {
        Some("02") => "Ativa".to_string(),
        Some(other) if !other.is_empty() => other.to_string(),
        _ => DASH.to_string(),
    }
}

// ========================
// Inline CNPJ feedback
// ========================

#[derive(Debug, Clone, PartialEq)]
pub enum CnpjFeedback {
    Empty,
    Incomplete { digits: usize },
    InvalidCheckDigits,
    Valid { cnpj: String },
}

pub fn cnpj_feedback(input: &str) -> CnpjFeedback {
    let digits = digits_only(input);
    match digits.len() {
        0 => CnpjFeedback::Empty,
        14 if is_valid_cnpj(&digits) => CnpjFeedback::Valid { cnpj: digits },
        14 => CnpjFeedback::InvalidCheckDigits,
        n => CnpjFeedback::Incomplete { digits: n },
    }
}

impl CnpjFeedback {
    pub fn message(&self) -> String {
        match self {
            CnpjFeedback::Empty => String::new(),
            CnpjFeedback::Incomplete { digits } => format!("⚠ Digite 14 dígitos ({}/14)", digits),
            CnpjFeedback::InvalidCheckDigits => "⚠ Dígitos verificadores inválidos".to_string(),
            CnpjFeedback::Valid { .. } => "✓ CNPJ válido".to_string(),
        }
    }

    pub fn input_class(&self) -> &'static str {
        match self {
            CnpjFeedback::Empty => "",
            CnpjFeedback::Valid { .. } => "border-green-500",
            _ => "border-red-500",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, CnpjFeedback::Valid { .. })
    }
}

// ========================
// Colour tiers
// ========================

/// Company table match badge
pub fn company_match_class(score: u8) -> &'static str {
    if score >= 90 {
        "bg-green-100 text-green-700 border-green-200"
    } else if score >= 75 {
        "bg-blue-100 text-blue-700 border-blue-200"
    } else {
        "bg-gray-100 text-gray-700 border-gray-200"
    }
}

/// Opportunity card match badge
pub fn opportunity_match_class(score: u8) -> &'static str {
    if score >= 80 {
        "text-green-600 bg-green-50"
    } else if score >= 60 {
        "text-blue-600 bg-blue-50"
    } else if score >= 40 {
        "text-orange-600 bg-orange-50"
    } else {
        "text-gray-600 bg-gray-50"
    }
}

pub fn chance_of_success(score: u8) -> &'static str {
    if score >= 80 {
        "🎯 Alta chance"
    } else if score >= 60 {
        "⭐ Média chance"
    } else if score >= 40 {
        "💡 Possível"
    } else {
        "⚠️ Baixa chance"
    }
}

pub fn badge_class(badge: &str) -> &'static str {
    match badge {
        "Exportadora" => "bg-purple-100 text-purple-700",
        "Crescimento" => "bg-green-100 text-green-700",
        "Consolidada" => "bg-blue-100 text-blue-700",
        "Startup" => "bg-orange-100 text-orange-700",
        "Madura" => "bg-indigo-100 text-indigo-700",
        "Especializada" => "bg-pink-100 text-pink-700",
        _ => "bg-gray-100 text-gray-700",
    }
}

// ========================
// Deadline status
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    NoDeadline,
    Closed { days: i64 },
    Today,
    Urgent { days: i64 },
    Soon { days: i64 },
    Upcoming { days: i64 },
    Open { days: i64 },
}

impl DeadlineStatus {
    pub fn from_dates(deadline: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(deadline) = deadline else {
            return DeadlineStatus::NoDeadline;
        };
        let days = (deadline - today).num_days();
        match days {
            d if d < 0 => DeadlineStatus::Closed { days: d },
            0 => DeadlineStatus::Today,
            d if d <= 3 => DeadlineStatus::Urgent { days: d },
            d if d <= 7 => DeadlineStatus::Soon { days: d },
            d if d <= 15 => DeadlineStatus::Upcoming { days: d },
            d => DeadlineStatus::Open { days: d },
        }
    }

    pub fn from_text(deadline: &str, today: NaiveDate) -> Self {
        Self::from_dates(parse_date(deadline), today)
    }

    /// Days left, when there is a deadline
    pub fn days(&self) -> Option<i64> {
        match *self {
            DeadlineStatus::NoDeadline => None,
            DeadlineStatus::Today => Some(0),
            DeadlineStatus::Closed { days }
            | DeadlineStatus::Urgent { days }
            | DeadlineStatus::Soon { days }
            | DeadlineStatus::Upcoming { days }
            | DeadlineStatus::Open { days } => Some(days),
        }
    }

    pub fn label(&self) -> String {
        match self {
            DeadlineStatus::NoDeadline => "Sem prazo".to_string(),
            DeadlineStatus::Closed { .. } => "Encerrada".to_string(),
            DeadlineStatus::Today => "⚠️ Hoje!".to_string(),
            DeadlineStatus::Urgent { days } => format!("🔥 {}d", days),
            DeadlineStatus::Soon { days } => format!("⏰ {}d", days),
            DeadlineStatus::Upcoming { days } => format!("{} dias", days),
            DeadlineStatus::Open { days } => format!("✓ {} dias", days),
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            DeadlineStatus::NoDeadline => "bg-gray-400 text-white",
            DeadlineStatus::Closed { .. } => "bg-gray-500 text-white",
            DeadlineStatus::Today => "bg-red-600 text-white animate-pulse font-bold",
            DeadlineStatus::Urgent { .. } => "bg-red-500 text-white animate-pulse",
            DeadlineStatus::Soon { .. } => "bg-orange-500 text-white",
            DeadlineStatus::Upcoming { .. } => "bg-yellow-500 text-gray-900",
            DeadlineStatus::Open { .. } => "bg-green-500 text-white",
        }
    }

    /// Footer text on opportunity cards
    pub fn remaining_text(&self) -> String {
        match self.days() {
            Some(d) if d >= 0 => format!("{}d restantes", d),
            _ => "Encerrado".to_string(),
        }
    }
}
