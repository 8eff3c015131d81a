//! The SQL injection demo: seeds a users table, then sends a safe read,
//! a filter read, and a series of tautology-injected filter reads through
//! the gate, printing every result set.

use crate::config::DemoConfig;
use crate::gate::{GateError, QueryGate, RejectionReason, FULL_TABLE_READ};
use crate::injection::inject_tautology;
use crate::store::{CountingStore, QueryStore};
use querygate_core::{Database, Error, Record};
use rand::Rng;
use std::fmt;
use std::io::{self, Write};
use tracing::{info, warn};

/// Schema of the users table
pub const CREATE_USERS_SQL: &str = "CREATE TABLE USERS(\
    ID INT PRIMARY KEY     NOT NULL,\
    NAME           TEXT    NOT NULL,\
    PASSWORD       TEXT    NOT NULL);";

/// The four seed users
pub const SEED_USERS_SQL: &str = "INSERT INTO USERS (ID, NAME, PASSWORD)\
    VALUES (1, 'Fred', 'Flinstone');\
    INSERT INTO USERS (ID, NAME, PASSWORD)\
    VALUES (2, 'Barney', 'Rubble');\
    INSERT INTO USERS (ID, NAME, PASSWORD)\
    VALUES (3, 'Wilma', 'Flinstone');\
    INSERT INTO USERS (ID, NAME, PASSWORD)\
    VALUES (4, 'Betty', 'Rubble');";

/// Filter read for the first seed user
pub const FILTER_FRED: &str = "SELECT ID, NAME, PASSWORD FROM USERS WHERE NAME='Fred'";

/// One row of the users table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// `ID` column
    pub id: String,
    /// `NAME` column
    pub name: String,
    /// `PASSWORD` column
    pub password: String,
}

impl TryFrom<&Record> for UserRecord {
    type Error = Error;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        match record.fields() {
            [id, name, password] => Ok(Self {
                id: id.clone(),
                name: name.clone(),
                password: password.clone(),
            }),
            fields => Err(Error::InvalidInput(format!(
                "expected 3 fields (ID, NAME, PASSWORD), got {}",
                fields.len()
            ))),
        }
    }
}

impl fmt::Display for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User: {} [UID={} PWD={}]", self.name, self.id, self.password)
    }
}

/// Outcome counts of [`Demo::run_queries`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Queries the gate admitted and the store executed
    pub executed: usize,
    /// Queries the gate refused
    pub rejected: usize,
    /// Queries the gate admitted but the store failed on
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Result<Vec<Record>, GateError>) {
        match outcome {
            Ok(_) => self.executed += 1,
            Err(GateError::Rejected(_)) => self.rejected += 1,
            Err(GateError::Store(_)) => self.failed += 1,
        }
    }
}

/// Runs the demo, writing its report to `out`.
pub struct Demo<W: Write> {
    config: DemoConfig,
    gate: QueryGate,
    out: W,
}

impl<W: Write> Demo<W> {
    /// Demo over the users gate
    pub fn new(config: DemoConfig, out: W) -> Self {
        Self {
            config,
            gate: QueryGate::users(),
            out,
        }
    }

    /// Replace the gate
    pub fn with_gate(mut self, gate: QueryGate) -> Self {
        self.gate = gate;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Consume the demo, returning the report sink
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the whole demo against a fresh in-memory database and return
    /// the process exit code.
    pub fn run(&mut self) -> io::Result<i32> {
        writeln!(self.out, "SQL Injection Example")?;

        let db = match Database::in_memory() {
            Ok(db) => db,
            Err(e) => {
                writeln!(
                    self.out,
                    "Failed to connect to the database and terminating. ERROR={}",
                    e
                )?;
                return Ok(-1);
            }
        };
        writeln!(self.out, "Connected to the database.")?;

        let mut store = CountingStore::new(db);
        if !self.initialize_database(&mut store)? {
            writeln!(self.out, "Database Initialization Failed. Terminating.")?;
            return Ok(-1);
        }

        let mut rng = self.config.rng();
        let summary = self.run_queries(&mut store, &mut rng)?;
        info!(
            executed = summary.executed,
            rejected = summary.rejected,
            failed = summary.failed,
            store_calls = store.calls(),
            "Demo finished"
        );

        self.out.flush()?;
        Ok(0)
    }

    /// Create and seed the users table. Returns `false` if either step fails.
    pub fn initialize_database<S>(&mut self, store: &mut S) -> io::Result<bool>
    where
        S: QueryStore + ?Sized,
    {
        if let Err(e) = store.execute(CREATE_USERS_SQL) {
            warn!(error = %e, "Schema creation failed");
            writeln!(self.out, "Failed to create USERS table. ERROR = {}", e)?;
            return Ok(false);
        }
        writeln!(self.out, "USERS table created.")?;

        if let Err(e) = store.execute(SEED_USERS_SQL) {
            warn!(error = %e, "Seeding failed");
            writeln!(self.out, "Data failed to insert to USERS table. ERROR = {}", e)?;
            return Ok(false);
        }

        Ok(true)
    }

    /// Send the full read, the filter read, and the configured number of
    /// injected filter reads through the gate.
    ///
    /// A failure of either of the first two stops the run; a failed
    /// injected read is reported and the next round proceeds.
    pub fn run_queries<S, R>(&mut self, store: &mut S, rng: &mut R) -> io::Result<RunSummary>
    where
        S: QueryStore + ?Sized,
        R: Rng + ?Sized,
    {
        let mut summary = RunSummary::default();

        for sql in [FULL_TABLE_READ, FILTER_FRED] {
            let outcome = self.gate.evaluate(&mut *store, sql);
            summary.record(&outcome);
            match outcome {
                Ok(records) => self.dump_results(sql, &records)?,
                Err(e) => {
                    self.report(sql, &e)?;
                    return Ok(summary);
                }
            }
        }

        for round in 0..self.config.injection_rounds {
            let injected = inject_tautology(FILTER_FRED, &mut *rng);
            info!(round, sql = %injected, "Trying injected query");

            let outcome = self.gate.evaluate(&mut *store, &injected);
            summary.record(&outcome);
            match outcome {
                Ok(records) => self.dump_results(&injected, &records)?,
                Err(e) => self.report(&injected, &e)?,
            }
        }

        Ok(summary)
    }

    /// Print a result set: a header with the record count, then one line
    /// per user.
    pub fn dump_results(&mut self, sql: &str, records: &[Record]) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "SQL: {} ==> {} records found.", sql, records.len())?;

        for record in records {
            match UserRecord::try_from(record) {
                Ok(user) => writeln!(self.out, "{}", user)?,
                Err(_) => writeln!(self.out, "Record: {}", record)?,
            }
        }
        Ok(())
    }

    fn report(&mut self, sql: &str, err: &GateError) -> io::Result<()> {
        match err {
            GateError::Rejected(RejectionReason::SuspiciousParameter) => writeln!(
                self.out,
                "{}. Parameter entered is: {}",
                err,
                self.gate.trailing_parameter(sql).unwrap_or("")
            ),
            GateError::Rejected(RejectionReason::UnrecognizedShape) => {
                writeln!(self.out, "{}. SQL: {}", err, sql)
            }
            GateError::Store(e) => writeln!(
                self.out,
                "Data failed to be queried from USERS table. ERROR = {}",
                e
            ),
        }
    }
}
