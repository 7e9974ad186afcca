//! Known Mistakes — static corrections for documented frequent LLM errors
//!
//! Field names that generated strategies get wrong often enough that we
//! hard-code the fix. The table is independent of the loaded catalog: it is
//! consulted only after a name fails to resolve, and its right-hand sides
//! are canonical names of the standard Taiwanese market-data catalog.

/// `(mistake, canonical)` pairs, matched exactly (case-sensitive).
pub const KNOWN_MISTAKES: &[(&str, &str)] = &[
    ("price", "收盤價"),
    ("stock_price", "收盤價"),
    ("closing", "收盤價"),
    ("closeprice", "收盤價"),
    ("trading_volume", "成交金額"),
    ("volumes", "成交金額"),
    ("turnover_value", "成交金額"),
    ("per", "本益比"),
    ("pbr", "股價淨值比"),
    ("earnings", "每股盈餘"),
    ("sales", "營業收入"),
    ("div_yield", "殖利率"),
];

/// Look up a documented mistake. Returns the canonical replacement, if any.
pub fn known_mistake(name: &str) -> Option<&'static str> {
    KNOWN_MISTAKES
        .iter()
        .find(|(mistake, _)| *mistake == name)
        .map(|(_, canonical)| *canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_mistakes_resolve() {
        assert_eq!(known_mistake("price"), Some("收盤價"));
        assert_eq!(known_mistake("trading_volume"), Some("成交金額"));
        assert_eq!(known_mistake("per"), Some("本益比"));
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert_eq!(known_mistake("definitely_not_a_field"), None);
        assert_eq!(known_mistake(""), None);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(known_mistake("PRICE"), None);
    }

    #[test]
    fn test_no_duplicate_keys() {
        let mut keys: Vec<&str> = KNOWN_MISTAKES.iter().map(|(m, _)| *m).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), KNOWN_MISTAKES.len());
    }
}
