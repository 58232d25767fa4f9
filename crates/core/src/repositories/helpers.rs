//! Query-building utilities shared by the repositories.

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 50;

/// Hard page-size cap, protecting the catalog endpoints from `limit=1e9`.
pub const MAX_LIMIT: i64 = 200;

/// Clamps client-supplied pagination into `(limit, offset)`.
pub fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Builds a case-insensitive `LIKE` pattern from raw search text.
///
/// The pattern characters `%`, `_` and `\` are escaped so user input is
/// matched literally inside the surrounding wildcards.
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_page_applies_defaults_and_caps() {
        assert_eq!(clamp_page(None, None), (DEFAULT_LIMIT, 0));
        assert_eq!(clamp_page(Some(10), Some(30)), (10, 30));
        assert_eq!(clamp_page(Some(0), Some(-5)), (1, 0));
        assert_eq!(clamp_page(Some(10_000), None), (MAX_LIMIT, 0));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("silva"), "%silva%");
        assert_eq!(like_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
        assert_eq!(like_pattern("  maria  "), "%maria%");
    }
}
