//! Store interface the gate delegates to.

use querygate_core::{Database, Record, Result};

/// Something that can execute SQL text and return result records.
///
/// The gate borrows the store mutably for the duration of one query.
pub trait QueryStore {
    /// Execute `sql` and return every result row, in order.
    fn execute(&mut self, sql: &str) -> Result<Vec<Record>>;
}

impl QueryStore for Database {
    fn execute(&mut self, sql: &str) -> Result<Vec<Record>> {
        Database::execute(self, sql)
    }
}

impl<S: QueryStore + ?Sized> QueryStore for &mut S {
    fn execute(&mut self, sql: &str) -> Result<Vec<Record>> {
        (**self).execute(sql)
    }
}

impl<S: QueryStore + ?Sized> QueryStore for Box<S> {
    fn execute(&mut self, sql: &str) -> Result<Vec<Record>> {
        (**self).execute(sql)
    }
}

/// Wraps a store and records every statement that reaches it.
#[derive(Debug, Default)]
pub struct CountingStore<S> {
    inner: S,
    executed: Vec<String>,
}

impl<S: QueryStore> CountingStore<S> {
    /// Wrap `inner`
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            executed: Vec::new(),
        }
    }

    /// Number of `execute` calls that reached the inner store
    pub fn calls(&self) -> usize {
        self.executed.len()
    }

    /// SQL text of every call, in order
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap, returning the inner store
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: QueryStore> QueryStore for CountingStore<S> {
    fn execute(&mut self, sql: &str) -> Result<Vec<Record>> {
        self.executed.push(sql.to_string());
        self.inner.execute(sql)
    }
}
