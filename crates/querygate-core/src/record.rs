//! Result records returned by the store.

use crate::query::Row;
use std::fmt;

/// One result row as an ordered tuple of string fields.
///
/// Every record in a result set has the same arity: the number of columns
/// the query projected. NULL values are rendered as `"NULL"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Build a record from already-rendered fields
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Field at `index`, if present
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Number of fields
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// All fields in column order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Consume the record, returning its fields
    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl From<Row> for Record {
    fn from(row: Row) -> Self {
        Self {
            fields: row.values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl From<&Row> for Record {
    fn from(row: &Row) -> Self {
        Self {
            fields: row.values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Column, Value};

    #[test]
    fn test_from_row_renders_values() {
        let row = Row {
            columns: vec![
                Column {
                    name: "ID".to_string(),
                    alias: None,
                },
                Column {
                    name: "NAME".to_string(),
                    alias: None,
                },
                Column {
                    name: "NOTE".to_string(),
                    alias: None,
                },
            ],
            values: vec![
                Value::Integer(1),
                Value::String("Fred".to_string()),
                Value::Null,
            ],
        };

        let record = Record::from(row);
        assert_eq!(record.arity(), 3);
        assert_eq!(record.get(0), Some("1"));
        assert_eq!(record.get(1), Some("Fred"));
        assert_eq!(record.get(2), Some("NULL"));
        assert_eq!(record.get(3), None);
        assert_eq!(record.to_string(), "(1, Fred, NULL)");
    }

    #[test]
    fn test_new() {
        let record = Record::new(["2", "Barney", "Rubble"]);
        assert_eq!(record.fields(), &["2", "Barney", "Rubble"]);
    }
}
