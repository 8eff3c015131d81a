//! Runs a [`PhysicalPlan`] against the catalog, materializing each
//! operator's output before the next one consumes it.

use super::ast::*;
use super::planner::{PhysicalOperator, PhysicalPlan};
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// Query result row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub columns: Vec<Column>,
    pub values: Vec<Value>,
}

impl Row {
    /// Look up a value by column name or alias (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.matches(name))
            .and_then(|idx| self.values.get(idx))
    }
}

/// One `column = value` line per field, for display-only result dumps
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (column, value) in self.columns.iter().zip(&self.values) {
            writeln!(f, "{} = {}", column.display_name(), value)?;
        }
        Ok(())
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub alias: Option<String>,
}

impl Column {
    /// Name shown to callers: the alias when present
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(name))
    }
}

/// Value types in query results
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl Value {
    /// Compare values. Any comparison involving NULL is false.
    pub fn compare(&self, other: &Value, op: CompareOp) -> bool {
        self.ordering(other).is_some_and(|ordering| match op {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::Ne => ordering.is_ne(),
            CompareOp::Lt => ordering.is_lt(),
            CompareOp::Le => ordering.is_le(),
            CompareOp::Gt => ordering.is_gt(),
            CompareOp::Ge => ordering.is_ge(),
        })
    }

    /// Ordering between two values of comparable types
    fn ordering(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Integer(b)) => Some(i64::from(*a).cmp(b)),
            (Value::Integer(a), Value::Boolean(b)) => Some(a.cmp(&i64::from(*b))),
            _ => None,
        }
    }

    /// Truthiness of a value used directly as a condition
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Boolean(b) => *b,
            Value::String(s) => s.trim().parse::<f64>().is_ok_and(|n| n != 0.0),
            Value::Null => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", i64::from(*b)),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Integer(i) => Value::Integer(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Null => Value::Null,
        }
    }
}

/// Intermediate result: a header plus value tuples
struct RowSet {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl RowSet {
    fn index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.matches(name))
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }
}

/// Query executor
pub struct Executor<'a> {
    catalog: &'a Catalog,
}

impl<'a> Executor<'a> {
    /// Create new executor over a catalog snapshot
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Execute a physical plan
    pub fn execute(&self, plan: &PhysicalPlan) -> Result<Vec<Row>> {
        let set = self.execute_operator(&plan.root)?;
        let columns = set.columns;
        Ok(set
            .rows
            .into_iter()
            .map(|values| Row {
                columns: columns.clone(),
                values,
            })
            .collect())
    }

    fn execute_operator(&self, op: &PhysicalOperator) -> Result<RowSet> {
        match op {
            PhysicalOperator::TableScan { table } => self.execute_table_scan(table),
            PhysicalOperator::Filter { input, condition } => self.execute_filter(input, condition),
            PhysicalOperator::Sort { input, keys } => self.execute_sort(input, keys),
            PhysicalOperator::Limit {
                input,
                count,
                offset,
            } => self.execute_limit(input, *count, *offset),
            PhysicalOperator::Project { input, columns } => self.execute_project(input, columns),
        }
    }

    fn execute_table_scan(&self, table: &str) -> Result<RowSet> {
        let table = self.catalog.table(table)?;
        Ok(RowSet {
            columns: table
                .columns()
                .iter()
                .map(|def| Column {
                    name: def.name.clone(),
                    alias: None,
                })
                .collect(),
            rows: table.rows().to_vec(),
        })
    }

    fn execute_filter(&self, input: &PhysicalOperator, condition: &Expression) -> Result<RowSet> {
        let mut set = self.execute_operator(input)?;
        // Resolve every column up front so an unknown name fails even on an empty table
        self.check_columns(&set, condition)?;

        let rows = std::mem::take(&mut set.rows);
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if self.evaluate_condition(&set, &row, condition)? {
                kept.push(row);
            }
        }
        set.rows = kept;

        Ok(set)
    }

    fn execute_sort(&self, input: &PhysicalOperator, keys: &[SortKey]) -> Result<RowSet> {
        let mut set = self.execute_operator(input)?;

        let keys = keys
            .iter()
            .map(|key| Ok((set.index_of(&key.column)?, key.descending)))
            .collect::<Result<Vec<_>>>()?;

        set.rows.sort_by(|a, b| {
            keys.iter()
                .map(|&(idx, descending)| {
                    let ordering = null_first(&a[idx], &b[idx]);
                    if descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        Ok(set)
    }

    fn execute_limit(&self, input: &PhysicalOperator, count: usize, offset: usize) -> Result<RowSet> {
        let mut set = self.execute_operator(input)?;
        set.rows = set.rows.into_iter().skip(offset).take(count).collect();
        Ok(set)
    }

    fn execute_project(&self, input: &PhysicalOperator, columns: &[SelectColumn]) -> Result<RowSet> {
        let set = self.execute_operator(input)?;

        let mut indices = Vec::new();
        let mut header = Vec::new();
        for col in columns {
            match col {
                SelectColumn::Wildcard => {
                    indices.extend(0..set.columns.len());
                    header.extend(set.columns.iter().cloned());
                }
                SelectColumn::Column { name, alias } => {
                    let idx = set.index_of(name)?;
                    indices.push(idx);
                    header.push(Column {
                        name: set.columns[idx].name.clone(),
                        alias: alias.clone(),
                    });
                }
            }
        }

        let rows = set
            .rows
            .into_iter()
            .map(|row| indices.iter().map(|&idx| row[idx].clone()).collect())
            .collect();

        Ok(RowSet {
            columns: header,
            rows,
        })
    }

    fn check_columns(&self, set: &RowSet, expr: &Expression) -> Result<()> {
        let mut missing = None;
        expr.for_each_column(&mut |name| {
            if missing.is_none() && set.index_of(name).is_err() {
                missing = Some(name);
            }
        });
        match missing {
            Some(name) => Err(Error::UnknownColumn(name.to_string())),
            None => Ok(()),
        }
    }

    fn evaluate_condition(&self, set: &RowSet, row: &[Value], condition: &Expression) -> Result<bool> {
        Ok(match condition {
            Expression::Column(_) | Expression::Literal(_) => {
                self.evaluate_expression(set, row, condition)?.is_truthy()
            }
            Expression::Compare { left, op, right } => {
                let left = self.evaluate_expression(set, row, left)?;
                let right = self.evaluate_expression(set, row, right)?;
                left.compare(&right, *op)
            }
            Expression::And(left, right) => {
                self.evaluate_condition(set, row, left)? && self.evaluate_condition(set, row, right)?
            }
            Expression::Or(left, right) => {
                self.evaluate_condition(set, row, left)? || self.evaluate_condition(set, row, right)?
            }
            Expression::Not(inner) => !self.evaluate_condition(set, row, inner)?,
            Expression::Like { expr, pattern } => match self.evaluate_expression(set, row, expr)? {
                Value::Null => false,
                value => like_matches(pattern, &value.to_string()),
            },
            Expression::InList { expr, values } => {
                let value = self.evaluate_expression(set, row, expr)?;
                values
                    .iter()
                    .any(|lit| value.compare(&Value::from(lit), CompareOp::Eq))
            }
            Expression::Between { expr, low, high } => {
                let value = self.evaluate_expression(set, row, expr)?;
                let low = self.evaluate_expression(set, row, low)?;
                let high = self.evaluate_expression(set, row, high)?;
                value.compare(&low, CompareOp::Ge) && value.compare(&high, CompareOp::Le)
            }
        })
    }

    fn evaluate_expression(&self, set: &RowSet, row: &[Value], expr: &Expression) -> Result<Value> {
        match expr {
            Expression::Column(name) => Ok(row[set.index_of(name)?].clone()),
            Expression::Literal(lit) => Ok(Value::from(lit)),
            other => Ok(Value::Boolean(self.evaluate_condition(set, row, other)?)),
        }
    }
}

/// Ordering used by ORDER BY: NULLs first, incomparable values tie
fn null_first(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (a, b) => a.ordering(b).unwrap_or(Ordering::Equal),
    }
}

/// SQL LIKE with `%` and `_` wildcards, ASCII case-insensitive
fn like_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len()
            && (pattern[p] == '_' || pattern[p].eq_ignore_ascii_case(&text[t]))
        {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((bp, bt)) = backtrack {
            p = bp + 1;
            t = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}
