//! # QueryGate
//!
//! A whitelist gate that sits in front of a SQL store and only lets a
//! closed set of query shapes through.
//!
//! The users gate admits two shapes:
//! - the full-table read `SELECT * from USERS`, matched exactly
//! - the filter read `SELECT ID, NAME, PASSWORD FROM USERS WHERE NAME=<param>`,
//!   admitted only when `<param>` contains no whitespace
//!
//! Everything else is rejected before it reaches the store.
//!
//! ## Quick Start
//!
//! ```rust
//! use querygate::{Database, GateError, QueryGate, RejectionReason};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut db = Database::in_memory()?;
//! db.execute("CREATE TABLE USERS (ID INT PRIMARY KEY, NAME TEXT, PASSWORD TEXT)")?;
//! db.execute("INSERT INTO USERS VALUES (1, 'Fred', 'Flinstone')")?;
//!
//! let gate = QueryGate::users();
//!
//! let rows = gate.evaluate(&mut db, "SELECT * from USERS")?;
//! assert_eq!(rows.len(), 1);
//!
//! let attack = "SELECT ID, NAME, PASSWORD FROM USERS WHERE NAME='Fred' or 1=1;";
//! assert!(matches!(
//!     gate.evaluate(&mut db, attack),
//!     Err(GateError::Rejected(RejectionReason::SuspiciousParameter))
//! ));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod demo;
pub mod gate;
pub mod injection;
pub mod logging;
pub mod store;

pub use config::DemoConfig;
pub use demo::{Demo, RunSummary, UserRecord};
pub use gate::{Admission, GateError, QueryGate, QueryTemplate, RejectionReason, TemplateKind};
pub use injection::inject_tautology;
pub use querygate_core::{Database, Error, Record, Result};
pub use store::{CountingStore, QueryStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
