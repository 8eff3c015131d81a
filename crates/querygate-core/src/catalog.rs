//! Table catalog for the in-memory store.
//!
//! Holds table schemas and their rows, and enforces column constraints on
//! insert. Table and column names are matched case-insensitively.

use crate::error::{Error, Result};
use crate::query::ast::{ColumnDef, CreateTable, DataType, Insert, Literal};
use crate::query::Value;
use crate::security::validate_identifier;
use std::collections::HashMap;

/// A table: schema plus rows in insertion order.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<ColumnDef>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Declared table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column definitions in declaration order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Stored rows in insertion order
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }
}

/// All tables known to one database.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(&name.to_ascii_uppercase())
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Declared names of all tables, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.values().map(|t| t.name.clone()).collect();
        names.sort();
        names
    }

    /// Register a new table
    pub fn create_table(&mut self, create: &CreateTable) -> Result<()> {
        validate_identifier(&create.name)?;

        let key = create.name.to_ascii_uppercase();
        if self.tables.contains_key(&key) {
            return Err(Error::TableExists(create.name.clone()));
        }

        if create.columns.is_empty() {
            return Err(Error::InvalidOperation(format!(
                "table {} must have at least one column",
                create.name
            )));
        }

        for (i, column) in create.columns.iter().enumerate() {
            validate_identifier(&column.name)?;
            if create.columns[..i]
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&column.name))
            {
                return Err(Error::InvalidOperation(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
        }

        if create.columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(Error::InvalidOperation(format!(
                "table {} has more than one primary key",
                create.name
            )));
        }

        self.tables.insert(
            key,
            Table {
                name: create.name.clone(),
                columns: create.columns.clone(),
                rows: Vec::new(),
            },
        );

        Ok(())
    }

    /// Insert rows into an existing table, returning the number inserted.
    ///
    /// The statement is applied all-or-nothing: if any row fails a
    /// constraint, no row from the statement is stored.
    pub fn insert(&mut self, insert: &Insert) -> Result<usize> {
        let key = insert.table.to_ascii_uppercase();
        let table = self
            .tables
            .get_mut(&key)
            .ok_or_else(|| Error::UnknownTable(insert.table.clone()))?;

        let targets = match insert.columns {
            Some(ref names) => names
                .iter()
                .map(|name| table.column_index(name))
                .collect::<Result<Vec<_>>>()?,
            None => (0..table.columns.len()).collect(),
        };

        let pk = table.columns.iter().position(|c| c.primary_key);
        let mut pending: Vec<Vec<Value>> = Vec::with_capacity(insert.rows.len());

        for literals in &insert.rows {
            if literals.len() != targets.len() {
                return Err(Error::ConstraintViolation(format!(
                    "{} values for {} columns",
                    literals.len(),
                    targets.len()
                )));
            }

            let mut row = vec![Value::Null; table.columns.len()];
            for (&idx, literal) in targets.iter().zip(literals) {
                row[idx] = coerce(&table.columns[idx], literal)?;
            }

            for (def, value) in table.columns.iter().zip(&row) {
                if (def.not_null || def.primary_key) && value.is_null() {
                    return Err(Error::ConstraintViolation(format!(
                        "NOT NULL constraint failed: {}.{}",
                        table.name, def.name
                    )));
                }
            }

            if let Some(pk) = pk {
                let duplicate = table
                    .rows
                    .iter()
                    .chain(pending.iter())
                    .any(|existing| existing[pk] == row[pk]);
                if duplicate {
                    return Err(Error::ConstraintViolation(format!(
                        "UNIQUE constraint failed: {}.{}",
                        table.name, table.columns[pk].name
                    )));
                }
            }

            pending.push(row);
        }

        let inserted = pending.len();
        table.rows.extend(pending);
        Ok(inserted)
    }
}

/// Convert a literal into the declared column type
fn coerce(def: &ColumnDef, literal: &Literal) -> Result<Value> {
    let mismatch = || Error::TypeMismatch {
        column: def.name.clone(),
        expected: def.data_type.to_string(),
        found: literal.to_string(),
    };

    let value = match (def.data_type, literal) {
        (_, Literal::Null) => Value::Null,
        (DataType::Integer, Literal::Integer(i)) => Value::Integer(*i),
        (DataType::Integer, Literal::Boolean(b)) => Value::Integer(i64::from(*b)),
        (DataType::Integer, Literal::Float(f)) if f.fract() == 0.0 => {
            // `i64::MAX as f64` is 2^63, one past the range
            if *f < i64::MIN as f64 || *f >= i64::MAX as f64 {
                return Err(mismatch());
            }
            Value::Integer(*f as i64)
        }
        (DataType::Integer, Literal::String(s)) => {
            Value::Integer(s.trim().parse().map_err(|_| mismatch())?)
        }
        (DataType::Real, Literal::Integer(i)) => Value::Float(*i as f64),
        (DataType::Real, Literal::Float(f)) => Value::Float(*f),
        (DataType::Real, Literal::String(s)) => {
            Value::Float(s.trim().parse().map_err(|_| mismatch())?)
        }
        (DataType::Text, Literal::String(s)) => Value::String(s.clone()),
        (DataType::Text, Literal::Integer(i)) => Value::String(i.to_string()),
        (DataType::Text, Literal::Float(f)) => Value::String(f.to_string()),
        _ => return Err(mismatch()),
    };

    Ok(value)
}
