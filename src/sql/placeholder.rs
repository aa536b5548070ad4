/// Placeholder Binder Module
///
/// Scans SQL text for named placeholders of the form `@identifier` and
/// resolves each against a criteria map. This is a lexical pre-pass over the
/// final command text; the driver performs the actual binding.
use crate::core::{LitedalError, Result};
use crate::criteria::Criteria;
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

// Matches a run of '@' markers followed by word characters. A doubled
// marker ("@@IDENTITY") is a literal SQL token, not a placeholder, so
// matches starting with "@@" are filtered out below.
static RX_PARAMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"@+\w+").expect("valid regex"));

/// Finds every named placeholder in the SQL text.
///
/// A placeholder is `@` followed by one or more word characters, excluding
/// occurrences where the `@` is preceded by another `@`. Results keep
/// discovery order; a placeholder appearing more than once is reported at
/// its first occurrence only.
///
/// # Examples
///
/// ```
/// use litedal::sql::find_placeholders;
///
/// let found = find_placeholders("UPDATE t SET a = @a WHERE id = @id");
/// assert_eq!(found, vec!["@a", "@id"]);
/// assert!(find_placeholders("SELECT @@IDENTITY").is_empty());
/// ```
pub fn find_placeholders(sql_text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in RX_PARAMS.find_iter(sql_text) {
        let token = m.as_str();
        if token.starts_with("@@") {
            continue;
        }
        if !found.iter().any(|f| f == token) {
            found.push(token.to_string());
        }
    }
    found
}

/// Resolves every placeholder in the SQL text against the criteria map.
///
/// Returns `(placeholder, value)` pairs in discovery order, ready to bind as
/// named parameters. Criteria entries not referenced by any placeholder are
/// silently unused.
///
/// # Errors
///
/// - `MissingCriteria` if the text contains placeholders but the criteria
///   map is absent or empty.
/// - `MissingBinding` naming the placeholder when a placeholder has no
///   criteria entry.
pub fn resolve_placeholders<'a>(
    sql_text: &str,
    criteria: Option<&'a Criteria>,
) -> Result<Vec<(String, &'a Value)>> {
    let placeholders = find_placeholders(sql_text);
    if placeholders.is_empty() {
        return Ok(Vec::new());
    }

    let criteria = match criteria {
        Some(c) if !c.is_empty() => c,
        _ => {
            return Err(LitedalError::MissingCriteria(format!(
                "statement references {} placeholder(s) but no criteria were supplied",
                placeholders.len()
            )))
        }
    };

    let mut params = Vec::with_capacity(placeholders.len());
    for placeholder in placeholders {
        let value = criteria
            .get(&placeholder[1..])
            .ok_or_else(|| LitedalError::MissingBinding(placeholder.clone()))?;
        params.push((placeholder, value));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_placeholders_basic() {
        let found = find_placeholders("SELECT * FROM t WHERE name = @name AND age = @age");
        assert_eq!(found, vec!["@name", "@age"]);
    }

    #[test]
    fn test_find_placeholders_discovery_order() {
        let found = find_placeholders("UPDATE t SET z = @z, a = @a WHERE m = @m");
        assert_eq!(found, vec!["@z", "@a", "@m"]);
    }

    #[test]
    fn test_doubled_marker_is_not_a_placeholder() {
        assert!(find_placeholders("SELECT @@IDENTITY").is_empty());

        let found = find_placeholders("INSERT INTO t (a) VALUES (@a) SELECT @@IDENTITY");
        assert_eq!(found, vec!["@a"]);
    }

    #[test]
    fn test_tripled_marker_is_not_a_placeholder() {
        assert!(find_placeholders("SELECT @@@version").is_empty());
    }

    #[test]
    fn test_duplicates_reported_once() {
        let found = find_placeholders("SELECT * FROM t WHERE a = @x OR b = @x");
        assert_eq!(found, vec!["@x"]);
    }

    #[test]
    fn test_no_placeholders() {
        assert!(find_placeholders("SELECT * FROM t").is_empty());
        assert!(find_placeholders("").is_empty());
    }

    #[test]
    fn test_resolve_in_discovery_order() {
        // Criteria order differs from placeholder order in the text.
        let criteria = Criteria::new().with("a", 1).with("z", 2);
        let params =
            resolve_placeholders("SELECT * FROM t WHERE z = @z AND a = @a", Some(&criteria))
                .unwrap();
        let names: Vec<&str> = params.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["@z", "@a"]);
    }

    #[test]
    fn test_resolve_missing_criteria() {
        let err = resolve_placeholders("SELECT * FROM t WHERE a = @a", None).unwrap_err();
        assert!(matches!(err, LitedalError::MissingCriteria(_)));

        let empty = Criteria::new();
        let err =
            resolve_placeholders("SELECT * FROM t WHERE a = @a", Some(&empty)).unwrap_err();
        assert!(matches!(err, LitedalError::MissingCriteria(_)));
    }

    #[test]
    fn test_resolve_missing_binding_names_placeholder() {
        let criteria = Criteria::new().with("a", 1);
        let err = resolve_placeholders("SELECT * FROM t WHERE b = @b", Some(&criteria))
            .unwrap_err();
        match err {
            LitedalError::MissingBinding(name) => assert_eq!(name, "@b"),
            other => panic!("Expected MissingBinding, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unreferenced_entries_are_ignored() {
        let criteria = Criteria::new().with("a", 1).with("unused", 2);
        let params =
            resolve_placeholders("SELECT * FROM t WHERE a = @a", Some(&criteria)).unwrap();
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_resolve_no_placeholders_ignores_criteria_entirely() {
        let params = resolve_placeholders("SELECT * FROM t", None).unwrap();
        assert!(params.is_empty());
    }
}
