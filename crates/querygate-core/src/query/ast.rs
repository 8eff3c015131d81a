//! Syntax tree for the SQL subset the store understands: CREATE TABLE,
//! INSERT, and single-table SELECT.

use std::fmt;

/// One parsed SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    Insert(Insert),
    Select(Query),
}

impl Statement {
    /// Leading keyword(s), for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::Insert(_) => "INSERT",
            Statement::Select(_) => "SELECT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub primary_key: bool,
    pub not_null: bool,
}

/// Storage class of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Real,
    Text,
}

impl DataType {
    /// Resolve a declared type name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        match upper.as_str() {
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" => Some(DataType::Integer),
            "REAL" | "FLOAT" | "DOUBLE" => Some(DataType::Real),
            "TEXT" | "VARCHAR" | "CHAR" | "STRING" => Some(DataType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataType::Integer => "INTEGER",
            DataType::Real => "REAL",
            DataType::Text => "TEXT",
        })
    }
}

/// `INSERT INTO table [(columns)] VALUES (...), ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    /// Explicit column list; `None` means declaration order
    pub columns: Option<Vec<String>>,
    pub rows: Vec<Vec<Literal>>,
}

/// A single-table SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub projection: Vec<SelectColumn>,
    pub table: String,
    pub filter: Option<Expression>,
    pub order_by: Vec<SortKey>,
    pub limit: Option<Limit>,
}

/// One entry of the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumn {
    /// `*`
    Wildcard,
    /// `name [AS alias]`
    Column { name: String, alias: Option<String> },
}

impl fmt::Display for SelectColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectColumn::Wildcard => f.write_str("*"),
            SelectColumn::Column { name, alias: None } => f.write_str(name),
            SelectColumn::Column {
                name,
                alias: Some(alias),
            } => write!(f, "{} AS {}", name, alias),
        }
    }
}

/// WHERE-clause expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Column(String),
    Literal(Literal),
    Compare {
        left: Box<Expression>,
        op: CompareOp,
        right: Box<Expression>,
    },
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Like {
        expr: Box<Expression>,
        pattern: String,
    },
    InList {
        expr: Box<Expression>,
        values: Vec<Literal>,
    },
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },
}

impl Expression {
    /// Visit every column name referenced by this expression
    pub fn for_each_column<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Expression::Column(name) => f(name),
            Expression::Literal(_) => {}
            Expression::Compare { left, right, .. }
            | Expression::And(left, right)
            | Expression::Or(left, right) => {
                left.for_each_column(f);
                right.for_each_column(f);
            }
            Expression::Not(inner)
            | Expression::Like { expr: inner, .. }
            | Expression::InList { expr: inner, .. } => inner.for_each_column(f),
            Expression::Between { expr, low, high } => {
                expr.for_each_column(f);
                low.for_each_column(f);
                high.for_each_column(f);
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Column(name) => f.write_str(name),
            Expression::Literal(lit) => write!(f, "{}", lit),
            Expression::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expression::And(left, right) => write!(f, "({} AND {})", left, right),
            Expression::Or(left, right) => write!(f, "({} OR {})", left, right),
            Expression::Not(inner) => write!(f, "NOT {}", inner),
            Expression::Like { expr, pattern } => {
                write!(f, "{} LIKE {}", expr, Literal::String(pattern.clone()))
            }
            Expression::InList { expr, values } => {
                let values: Vec<String> = values.iter().map(Literal::to_string).collect();
                write!(f, "{} IN ({})", expr, values.join(", "))
            }
            Expression::Between { expr, low, high } => {
                write!(f, "{} BETWEEN {} AND {}", expr, low, high)
            }
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        })
    }
}

/// Constant written in the query text
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("NULL"),
        }
    }
}

/// `ORDER BY` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{} DESC", self.column)
        } else {
            f.write_str(&self.column)
        }
    }
}

/// `LIMIT count [OFFSET offset]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub count: usize,
    pub offset: usize,
}
