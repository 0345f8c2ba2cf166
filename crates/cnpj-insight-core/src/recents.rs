//! Recent chat searches, most recent first

/// Kept in storage
pub const MAX_RECENTS: usize = 20;
/// Shown in the sidebar
pub const SHOWN_RECENTS: usize = 10;

/// Move `query` to the front, dropping case-insensitive duplicates.
/// Blank queries are ignored; returns whether the list changed.
pub fn push_recent(list: &mut Vec<String>, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }
    let lower = query.to_lowercase();
    list.retain(|x| x.to_lowercase() != lower);
    list.insert(0, query.to_string());
    list.truncate(MAX_RECENTS);
    true
}

pub fn shown(list: &[String]) -> &[String] {
    &list[..list.len().min(SHOWN_RECENTS)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dedupe_moves_to_front() {
        let mut list = vec!["Consultar CNPJ".to_string(), "cnae 6204".to_string()];
        assert!(push_recent(&mut list, "  CNAE 6204 "));
        assert_eq!(list, vec!["CNAE 6204".to_string(), "Consultar CNPJ".to_string()]);
    }

    #[test]
    fn test_blank_ignored() {
        let mut list = Vec::new();
        assert!(!push_recent(&mut list, "   "));
        assert!(list.is_empty());
    }

    #[test]
    fn test_capped() {
        let mut list = Vec::new();
        for i in 0..30 {
            push_recent(&mut list, &format!("busca {}", i));
        }
        assert_eq!(list.len(), MAX_RECENTS);
        assert_eq!(list[0], "busca 29");
        assert_eq!(shown(&list).len(), SHOWN_RECENTS);
        assert_eq!(shown(&list[..3]).len(), 3);
    }
}
