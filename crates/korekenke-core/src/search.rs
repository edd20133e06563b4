//! Search index tokens.
//!
//! Records store a precomputed array of normalised tokens (`search_index`);
//! list queries match it with "any token" array predicates. Both sides must use
//! the functions below so that a token written by one matches a token queried
//! by the other.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, strip diacritics and drop everything but letters and digits.
pub fn normalize_token(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Normalise a list of tokens, dropping empties and duplicates (first occurrence wins).
pub fn searchify<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        let normalized = normalize_token(token.as_ref());
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

/// Split a free-text search term on whitespace and normalise the pieces.
pub fn search_tokens(term: &str) -> Vec<String> {
    searchify(term.split_whitespace())
}

/// Token set stored on a record, built from its searchable text fields.
pub fn build_search_index<'a, I>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    searchify(fields.into_iter().flat_map(str::split_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_case_and_diacritics() {
        assert_eq!(normalize_token("Perú"), "peru");
        assert_eq!(normalize_token("MUÑOZ"), "munoz");
        assert_eq!(normalize_token("Ávila,"), "avila");
    }

    #[test]
    fn tokens_split_on_any_whitespace() {
        assert_eq!(search_tokens("  abc\tdef\n"), vec!["abc", "def"]);
        assert!(search_tokens("   ").is_empty());
        assert!(search_tokens("-- !!").is_empty());
    }

    #[test]
    fn duplicates_after_normalisation_collapse() {
        assert_eq!(search_tokens("José jose JOSÉ"), vec!["jose"]);
    }

    #[test]
    fn index_and_query_agree() {
        let index = build_search_index(["R-0042", "María López"]);
        assert_eq!(index, vec!["r0042", "maria", "lopez"]);
        for token in search_tokens("LOPEZ maría") {
            assert!(index.contains(&token));
        }
    }
}
