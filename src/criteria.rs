/// Criteria Module
///
/// A criteria map is an insertion-ordered mapping from field name to scalar
/// value. Depending on the operation that receives it, it represents either
/// equality conditions ANDed together (for WHERE-clause generation) or the
/// values to bind into an insert/update statement.
///
/// Keys are bare field names without the `@` placeholder prefix. Insertion
/// order determines clause construction only; conjunction semantics are
/// commutative. An empty criteria map is a valid state: most operations
/// treat it as "no filter", but `find_one` and the raw-condition variants
/// require at least one entry.
use crate::core::Result;
use crate::value::Value;
use indexmap::IndexMap;

/// An ordered field-name to value mapping for query conditions and
/// statement parameters.
///
/// # Examples
///
/// ```
/// use litedal::Criteria;
///
/// let criteria = Criteria::new().with("name", "A").with("age", 5);
/// assert_eq!(criteria.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    fields: IndexMap<String, Value>,
}

impl Criteria {
    /// Creates an empty criteria map.
    pub fn new() -> Self {
        Criteria {
            fields: IndexMap::new(),
        }
    }

    /// Adds a field, returning the map for chaining.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Inserts or replaces a field. Replacing keeps the field's original
    /// insertion position.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Looks up a field by bare name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns true if the field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Builds a criteria map from a JSON object. Nested arrays and objects
    /// are rejected since they have no scalar SQL representation.
    ///
    /// Field order follows the JSON object's iteration order.
    pub fn from_json(json: &serde_json::Value) -> Result<Criteria> {
        let object = json.as_object().ok_or_else(|| {
            crate::core::LitedalError::InvalidArgument(
                "criteria JSON must be an object".to_string(),
            )
        })?;

        let mut criteria = Criteria::new();
        for (field, value) in object {
            criteria.set(field.clone(), Value::from_json(value)?);
        }
        Ok(criteria)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut criteria = Criteria::new();
        for (field, value) in iter {
            criteria.set(field, value);
        }
        criteria
    }
}
