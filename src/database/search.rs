/// Parsed `?search=` parameter.
///
/// Terms are split on whitespace and commas. A record matches when every term
/// is a case-insensitive substring of at least one searchable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let terms = raw
            .unwrap_or_default()
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn matches(&self, fields: &[&str]) -> bool {
        let fields: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
        self.terms
            .iter()
            .all(|term| fields.iter().any(|field| field.contains(term.as_str())))
    }

    /// ILIKE pattern for a term with LIKE wildcards escaped
    pub fn like_pattern(term: &str) -> String {
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_commas() {
        let query = SearchQuery::parse(Some(" Sam,  smith  "));
        assert_eq!(query.terms(), &["sam".to_string(), "smith".to_string()]);
        assert!(SearchQuery::parse(None).is_empty());
        assert!(SearchQuery::parse(Some(" , ")).is_empty());
    }

    #[test]
    fn matches_case_insensitive_substrings_across_fields() {
        let query = SearchQuery::parse(Some("AMAN example"));
        assert!(query.matches(&["Samantha", "sam@example.com"]));
        assert!(!query.matches(&["Samantha", "sam@test.org"]));
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(SearchQuery::default().matches(&["anything"]));
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(SearchQuery::like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
