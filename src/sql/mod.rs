/// SQL Generation Module
///
/// This module turns criteria maps and table names into SQL text with named
/// placeholders. It is purely textual: no statement is prepared here, and
/// nothing touches a connection.
///
/// The placeholder submodule handles the other direction: discovering
/// `@name` placeholders in arbitrary SQL text and resolving them against a
/// criteria map.

pub mod placeholder;

pub use placeholder::{find_placeholders, resolve_placeholders};

use crate::criteria::Criteria;
use crate::dialect::Dialect;
use std::fmt::Write;

/// Builds a `WHERE` clause from a criteria map.
///
/// Non-empty criteria produce `"WHERE f1 = @f1 AND f2 = @f2 ..."` in
/// insertion order; empty criteria produce an empty string. Field names are
/// interpolated into the text without escaping; they come from trusted
/// code, not external input.
///
/// # Examples
///
/// ```
/// use litedal::{sql, Criteria};
///
/// let criteria = Criteria::new().with("name", "A").with("age", 5);
/// assert_eq!(sql::where_clause(&criteria), "WHERE name = @name AND age = @age");
/// ```
pub fn where_clause(criteria: &Criteria) -> String {
    if criteria.is_empty() {
        return String::new();
    }

    let mut clause = String::from("WHERE ");
    for (i, (field, _)) in criteria.iter().enumerate() {
        if i > 0 {
            clause.push_str(" AND ");
        }
        // Infallible for String targets.
        let _ = write!(clause, "{0} = @{0}", field);
    }
    clause
}

/// Builds `SELECT * FROM [table]` for the given dialect.
pub fn select_all(dialect: Dialect, table: &str) -> String {
    format!("SELECT * FROM {}", dialect.quote_identifier(table))
}

/// Builds `SELECT COUNT(0) FROM [table]` for the given dialect.
pub fn count_rows(dialect: Dialect, table: &str) -> String {
    format!("SELECT COUNT(0) FROM {}", dialect.quote_identifier(table))
}
