/// Record Module
///
/// A record is one result row materialized into an insertion-ordered map
/// from lower-cased column name to value. Records are produced by the
/// default binder during row iteration; callers who want typed results
/// supply their own `Fn(&Row) -> Result<T>` binder instead and never see
/// this type.
use crate::core::Result;
use crate::value::Value;
use indexmap::IndexMap;
use rusqlite::Row;

/// A generic result row: lower-cased column names mapped to values in
/// cursor column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Looks up a field by its lower-cased column name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in cursor order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates `(column, value)` pairs in cursor order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Converts the record into a JSON object, preserving column order in
    /// the textual output.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (field, value) in &self.fields {
            object.insert(field.clone(), value.to_json());
        }
        serde_json::Value::Object(object)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = IndexMap::new();
        for (field, value) in iter {
            fields.insert(field.into(), value.into());
        }
        Record { fields }
    }
}

/// Default row binder: lower-cases every column name and normalizes NULL
/// columns to an empty string value.
pub fn bind_record(row: &Row) -> Result<Record> {
    let statement = row.as_ref();
    let mut fields = IndexMap::with_capacity(statement.column_count());

    for i in 0..statement.column_count() {
        let name = statement.column_name(i)?.to_lowercase();
        let value = match row.get_ref(i)? {
            rusqlite::types::ValueRef::Null => Value::Text(String::new()),
            other => Value::from_sql_ref(other),
        };
        fields.insert(name, value);
    }

    Ok(Record { fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_bind_record_lowercases_and_normalizes_null() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 1 AS ID, NULL AS Missing, 'x' AS name")
            .unwrap();
        let mut rows = stmt.query([]).unwrap();
        let row = rows.next().unwrap().unwrap();

        let record = bind_record(row).unwrap();
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["id", "missing", "name"]);
        assert_eq!(record.get("id"), Some(&Value::Integer(1)));
        assert_eq!(record.get("missing"), Some(&Value::Text(String::new())));
        assert_eq!(record.get("name"), Some(&Value::Text("x".to_string())));
    }

    #[test]
    fn test_to_json() {
        let record: Record = vec![("id", Value::Integer(7)), ("name", Value::from("A"))]
            .into_iter()
            .collect();
        assert_eq!(record.to_json(), serde_json::json!({"id": 7, "name": "A"}));
    }
}
