use std::sync::OnceLock;

use regex::Regex;

/// Normalize a string for fuzzy matching: lowercase + ASCII alphanumeric only.
pub fn normalize_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Trim an optional text field, collapsing blank strings to `None`.
pub fn clean_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Build a `LIKE` pattern that matches `query` as a literal substring.
///
/// `%`, `_` and the escape character itself are escaped with `\`, so the
/// SQL must use `ESCAPE '\'`.
pub fn like_pattern(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 2);
    out.push('%');
    for c in query.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Loose shape check for an email address: `local@domain.tld`, no spaces.
pub fn looks_like_email(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
        .is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Rental Studio"), "rentalstudio");
        assert_eq!(normalize_key("rental_studio"), "rentalstudio");
    }

    #[test]
    fn test_clean_opt() {
        assert_eq!(clean_opt(Some("  x ".into())), Some("x".to_string()));
        assert_eq!(clean_opt(Some("   ".into())), None);
        assert_eq!(clean_opt(None), None);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern(" 100%_co "), "%100\\%\\_co%");
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("desk@acme.com"));
        assert!(!looks_like_email("desk@acme"));
        assert!(!looks_like_email("de sk@acme.com"));
        assert!(!looks_like_email(""));
    }
}
