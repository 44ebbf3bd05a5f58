//! Query normalization for common domain-specific confusions.
//!
//! A small fixed table of misspellings and near-synonyms is applied before
//! the query reaches the index, raising recall for near-miss queries. The
//! original raw query is kept around by the ranker for a fallback retry.

/// `(problematic substring, canonical substring)` pairs.
///
/// "tolk"/"talk" are the most common ways people reach for Tact; the rest
/// are recurring misspellings of TON terms.
const REWRITES: &[(&str, &str)] = &[
    ("tolk", "tact"),
    ("talk", "tact"),
    ("tackt", "tact"),
    ("jeton", "jetton"),
    ("fun c", "func"),
    ("tocken", "token"),
    ("mini-app", "mini app"),
    ("miniapp", "mini app"),
];

/// Lower-case and trim the query, then apply the rewrite table.
///
/// The table is scanned once; for every key contained in the query, the
/// first occurrence is replaced with its canonical form.
pub fn normalize_query(query: &str) -> String {
    let mut normalized = query.trim().to_lowercase();

    for (from, to) in REWRITES {
        if normalized.contains(from) {
            normalized = normalized.replacen(from, to, 1);
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_query("  Smart Contracts  "), "smart contracts");
    }

    #[test]
    fn rewrites_tolk_to_tact() {
        assert_eq!(normalize_query("tolk"), "tact");
        assert_eq!(normalize_query("tolk language"), "tact language");
    }

    #[test]
    fn rewrites_common_misspellings() {
        assert_eq!(normalize_query("Jeton standard"), "jetton standard");
        assert_eq!(normalize_query("fun c syntax"), "func syntax");
        assert_eq!(normalize_query("telegram miniapp"), "telegram mini app");
    }

    #[test]
    fn plural_jeton_rewrites_through_singular_rule() {
        assert_eq!(normalize_query("jetons"), "jettons");
    }

    #[test]
    fn only_first_occurrence_per_key() {
        assert_eq!(normalize_query("tolk tolk"), "tact tolk");
    }

    #[test]
    fn untouched_query_passes_through() {
        assert_eq!(normalize_query("tvm gas fees"), "tvm gas fees");
    }
}
