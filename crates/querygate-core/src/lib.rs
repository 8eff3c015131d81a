//! # QueryGate Core
//!
//! In-memory relational store used behind the query gate: a small SQL
//! engine (lexer, parser, planner, executor) over a case-insensitive table
//! catalog.
//!
//! ```rust
//! use querygate_core::Database;
//!
//! # fn main() -> Result<(), querygate_core::Error> {
//! let db = Database::in_memory()?;
//! db.execute("CREATE TABLE USERS(ID INT PRIMARY KEY NOT NULL, NAME TEXT NOT NULL);")?;
//! db.execute("INSERT INTO USERS (ID, NAME) VALUES (1, 'Fred');")?;
//!
//! let records = db.execute("SELECT * from USERS")?;
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].get(1), Some("Fred"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod error;
pub mod query;
pub mod record;
pub mod security;

pub use catalog::{Catalog, Table};
pub use error::{Error, Result};
pub use query::{Column, Row, Value};
pub use record::Record;

use query::{Executor, Parser, Planner, Statement};
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};

/// The in-memory database handle.
///
/// Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct Database {
    inner: Arc<RwLock<Catalog>>,
}

impl Database {
    /// Creates an empty in-memory database.
    pub fn in_memory() -> Result<Self> {
        debug!("Opening in-memory database");
        Ok(Self::default())
    }

    /// Executes every `;`-separated statement in `sql`, in order, and
    /// returns the rows produced by all SELECT statements as records.
    ///
    /// Execution stops at the first failing statement; statements before it
    /// stay applied.
    pub fn execute(&self, sql: &str) -> Result<Vec<Record>> {
        Ok(self.query(sql)?.into_iter().map(Record::from).collect())
    }

    /// Like [`Database::execute`], but keeps column metadata on each row.
    #[instrument(level = "debug", skip(self), fields(len = sql.len()))]
    pub fn query(&self, sql: &str) -> Result<Vec<Row>> {
        security::validate_query(sql)?;
        let statements = Parser::new(sql)?.parse()?;

        let read_only = statements
            .iter()
            .all(|stmt| matches!(stmt, Statement::Select(_)));

        let mut rows = Vec::new();
        if read_only {
            let catalog = self.inner.read().map_err(|_| Error::LockPoisoned)?;
            for statement in &statements {
                if let Statement::Select(query) = statement {
                    rows.extend(run_select(&catalog, query)?);
                }
            }
        } else {
            let mut catalog = self.inner.write().map_err(|_| Error::LockPoisoned)?;
            for statement in &statements {
                match statement {
                    Statement::CreateTable(create) => {
                        catalog.create_table(create)?;
                        debug!(table = %create.name, "Created table");
                    }
                    Statement::Insert(insert) => {
                        let count = catalog.insert(insert)?;
                        debug!(table = %insert.table, rows = count, "Inserted rows");
                    }
                    Statement::Select(query) => rows.extend(run_select(&catalog, query)?),
                }
            }
        }

        Ok(rows)
    }

    /// Declared names of all tables, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let catalog = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        Ok(catalog.table_names())
    }

    /// Number of rows stored in `table`.
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let catalog = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        Ok(catalog.table(table)?.len())
    }
}

fn run_select(catalog: &Catalog, query: &query::Query) -> Result<Vec<Row>> {
    let plan = Planner::new().plan(query);
    debug!(plan = %plan, "Executing query plan");
    Executor::new(catalog).execute(&plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Database {
        let db = Database::in_memory().unwrap();
        db.execute(
            "CREATE TABLE USERS(ID INT PRIMARY KEY NOT NULL, NAME TEXT NOT NULL, PASSWORD TEXT NOT NULL);",
        )
        .unwrap();
        db.execute(
            "INSERT INTO USERS (ID, NAME, PASSWORD)VALUES (1, 'Fred', 'Flinstone');\
             INSERT INTO USERS (ID, NAME, PASSWORD)VALUES (2, 'Barney', 'Rubble');",
        )
        .unwrap();
        db
    }

    #[test]
    fn test_in_memory_database() {
        let db = seeded();
        assert_eq!(db.table_names().unwrap(), vec!["USERS".to_string()]);
        assert_eq!(db.row_count("users").unwrap(), 2);
    }

    #[test]
    fn test_multi_statement_select_concatenates_rows() {
        let db = seeded();
        let records = db
            .execute("SELECT NAME FROM USERS WHERE ID=1; SELECT NAME FROM USERS WHERE ID=2;")
            .unwrap();
        let names: Vec<&str> = records.iter().filter_map(|r| r.get(0)).collect();
        assert_eq!(names, vec!["Fred", "Barney"]);
    }

    #[test]
    fn test_statements_before_failure_stay_applied() {
        let db = seeded();
        let err = db
            .execute("INSERT INTO USERS VALUES (3, 'Wilma', 'Flinstone'); INSERT INTO NOPE VALUES (1);")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTable(_)));
        assert_eq!(db.row_count("USERS").unwrap(), 3);
    }

    #[test]
    fn test_query_keeps_columns() {
        let db = seeded();
        let rows = db.query("SELECT * from USERS").unwrap();
        let names: Vec<&str> = rows[0].columns.iter().map(|c| c.display_name()).collect();
        assert_eq!(names, vec!["ID", "NAME", "PASSWORD"]);
    }

    #[test]
    fn test_empty_query_rejected() {
        let db = seeded();
        assert!(matches!(db.execute(""), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_clones_share_tables() {
        let db = seeded();
        let other = db.clone();
        other.execute("INSERT INTO USERS VALUES (4, 'Betty', 'Rubble')").unwrap();
        assert_eq!(db.row_count("USERS").unwrap(), 3);
    }
}
