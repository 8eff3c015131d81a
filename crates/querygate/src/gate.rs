//! Whitelist gate in front of the store.
//!
//! A candidate query is executed only if it has one of a closed set of
//! shapes. The gate does not try to recognize injection syntax (quotes,
//! tautologies, comment tokens). It admits a fixed full-table read and a
//! filter whose single trailing parameter contains no whitespace, and
//! rejects everything else.
//!
//! The whitespace rule is a deliberately narrow heuristic: a one-token
//! payload such as `'x'or'1'='1'` passes it. Real protection comes from
//! bound parameters, not from this gate.

use crate::store::QueryStore;
use querygate_core::{Error, Record};
use std::fmt;
use tracing::{debug, warn};

/// Full-table read of the users table.
pub const FULL_TABLE_READ: &str = "SELECT * from USERS";

/// Prefix of the filter-by-name read; the user name follows the `=`.
pub const FILTER_BY_NAME: &str = "SELECT ID, NAME, PASSWORD FROM USERS WHERE NAME=";

/// How a template matches a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// The candidate must equal the template text exactly
    Exact,
    /// The candidate must start with the template text; the remainder is a
    /// single parameter that may not contain whitespace
    TrailingParameter,
}

/// One permitted query shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    name: String,
    text: String,
    kind: TemplateKind,
}

impl QueryTemplate {
    /// A template that only admits its own text
    pub fn exact<N: Into<String>, T: Into<String>>(name: N, text: T) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            kind: TemplateKind::Exact,
        }
    }

    /// A template that admits `prefix` followed by one whitespace-free parameter
    pub fn with_parameter<N: Into<String>, T: Into<String>>(name: N, prefix: T) -> Self {
        Self {
            name: name.into(),
            text: prefix.into(),
            kind: TemplateKind::TrailingParameter,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template text (the whole query, or the prefix before the parameter)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Matching rule
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }
}

/// Why a candidate was not executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The candidate matches no permitted shape
    UnrecognizedShape,
    /// The trailing parameter contains whitespace
    SuspiciousParameter,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UnrecognizedShape => {
                write!(f, "query does not match any permitted shape")
            }
            RejectionReason::SuspiciousParameter => write!(
                f,
                "query parameter contains whitespace, likely SQL injection"
            ),
        }
    }
}

impl std::error::Error for RejectionReason {}

/// Failure of [`QueryGate::evaluate`]
#[derive(Debug)]
pub enum GateError {
    /// The gate refused to execute the candidate
    Rejected(RejectionReason),
    /// The candidate was admitted but the store failed to execute it
    Store(Error),
}

impl GateError {
    /// The rejection reason, if the gate refused the candidate
    pub fn rejection(&self) -> Option<RejectionReason> {
        match self {
            GateError::Rejected(reason) => Some(*reason),
            GateError::Store(_) => None,
        }
    }
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::Rejected(reason) => write!(f, "Query rejected: {}", reason),
            GateError::Store(err) => write!(f, "Query failed: {}", err),
        }
    }
}

impl std::error::Error for GateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GateError::Rejected(reason) => Some(reason),
            GateError::Store(err) => Some(err),
        }
    }
}

impl From<RejectionReason> for GateError {
    fn from(reason: RejectionReason) -> Self {
        GateError::Rejected(reason)
    }
}

impl From<Error> for GateError {
    fn from(err: Error) -> Self {
        GateError::Store(err)
    }
}

/// A candidate the gate has admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission<'a> {
    template: &'a QueryTemplate,
    sql: &'a str,
    parameter: Option<&'a str>,
}

impl<'a> Admission<'a> {
    /// The template that admitted the candidate
    pub fn template(&self) -> &'a QueryTemplate {
        self.template
    }

    /// The exact text handed to the store
    pub fn sql(&self) -> &'a str {
        self.sql
    }

    /// The trailing parameter, for parameterized templates
    pub fn parameter(&self) -> Option<&'a str> {
        self.parameter
    }
}

/// Decides whether a candidate query may reach the store.
///
/// Templates are checked in the order they were given; the first one that
/// matches decides. The gate holds no mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryGate {
    templates: Vec<QueryTemplate>,
}

impl QueryGate {
    /// Gate over an explicit, ordered template list
    pub fn new(templates: Vec<QueryTemplate>) -> Self {
        Self { templates }
    }

    /// Gate for the users table: full-table read, then filter-by-name
    pub fn users() -> Self {
        Self::new(vec![
            QueryTemplate::exact("full_table_read", FULL_TABLE_READ),
            QueryTemplate::with_parameter("filter_by_name", FILTER_BY_NAME),
        ])
    }

    /// Templates in priority order
    pub fn templates(&self) -> &[QueryTemplate] {
        &self.templates
    }

    /// Classify a candidate without executing it
    pub fn classify<'a>(&'a self, candidate: &'a str) -> Result<Admission<'a>, RejectionReason> {
        for template in &self.templates {
            match template.kind {
                TemplateKind::Exact => {
                    if candidate == template.text {
                        return Ok(Admission {
                            template,
                            sql: candidate,
                            parameter: None,
                        });
                    }
                }
                TemplateKind::TrailingParameter => {
                    if let Some(parameter) = candidate.strip_prefix(template.text.as_str()) {
                        if parameter.chars().any(char::is_whitespace) {
                            return Err(RejectionReason::SuspiciousParameter);
                        }
                        return Ok(Admission {
                            template,
                            sql: candidate,
                            parameter: Some(parameter),
                        });
                    }
                }
            }
        }

        Err(RejectionReason::UnrecognizedShape)
    }

    /// Classify `candidate` and, if admitted, execute it unmodified.
    ///
    /// A rejected candidate never reaches the store.
    pub fn evaluate<S>(&self, store: &mut S, candidate: &str) -> Result<Vec<Record>, GateError>
    where
        S: QueryStore + ?Sized,
    {
        let admission = match self.classify(candidate) {
            Ok(admission) => admission,
            Err(reason) => {
                warn!(
                    %reason,
                    parameter = self.trailing_parameter(candidate).unwrap_or(""),
                    candidate,
                    "Rejected query"
                );
                return Err(GateError::Rejected(reason));
            }
        };

        debug!(
            template = admission.template().name(),
            parameter = admission.parameter().unwrap_or(""),
            "Admitted query"
        );

        let records = store.execute(admission.sql())?;
        debug!(records = records.len(), "Query executed");
        Ok(records)
    }

    /// Trailing parameter of the first parameterized template `candidate`
    /// starts with, whether or not the candidate would be admitted
    pub fn trailing_parameter<'a>(&self, candidate: &'a str) -> Option<&'a str> {
        self.templates
            .iter()
            .filter(|t| t.kind == TemplateKind::TrailingParameter)
            .find_map(|t| candidate.strip_prefix(t.text.as_str()))
    }
}

impl Default for QueryGate {
    fn default() -> Self {
        Self::users()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_table_read_admitted() {
        let gate = QueryGate::users();
        let admission = gate.classify(FULL_TABLE_READ).unwrap();
        assert_eq!(admission.template().name(), "full_table_read");
        assert_eq!(admission.sql(), FULL_TABLE_READ);
        assert_eq!(admission.parameter(), None);
    }

    #[test]
    fn test_full_table_read_with_suffix_is_unrecognized() {
        let gate = QueryGate::users();
        assert_eq!(
            gate.classify("SELECT * from USERS; DROP TABLE USERS"),
            Err(RejectionReason::UnrecognizedShape)
        );
    }

    #[test]
    fn test_filter_parameter_extracted() {
        let gate = QueryGate::users();
        let candidate = format!("{}'Fred'", FILTER_BY_NAME);
        let admission = gate.classify(&candidate).unwrap();
        assert_eq!(admission.template().kind(), TemplateKind::TrailingParameter);
        assert_eq!(admission.parameter(), Some("'Fred'"));
        assert_eq!(admission.sql(), candidate);
    }

    #[test]
    fn test_any_whitespace_is_suspicious() {
        let gate = QueryGate::users();
        for parameter in ["'Fred' or 1=1;", "'Fred'\tor\t1=1", "'Fred'\n", "'a\u{a0}b'"] {
            let candidate = format!("{}{}", FILTER_BY_NAME, parameter);
            assert_eq!(
                gate.classify(&candidate),
                Err(RejectionReason::SuspiciousParameter),
                "{:?}",
                parameter
            );
        }
    }

    #[test]
    fn test_single_token_payload_passes() {
        // The heuristic only looks for whitespace
        let gate = QueryGate::users();
        let candidate = format!("{}'x'or'1'='1'", FILTER_BY_NAME);
        assert!(gate.classify(&candidate).is_ok());
    }

    #[test]
    fn test_empty_parameter_admitted() {
        let gate = QueryGate::users();
        assert!(gate.classify(FILTER_BY_NAME).is_ok());
    }

    #[test]
    fn test_trailing_parameter_of_rejected_candidate() {
        let gate = QueryGate::users();
        let candidate = format!("{}'Fred' or 1=1;", FILTER_BY_NAME);
        assert_eq!(gate.trailing_parameter(&candidate), Some("'Fred' or 1=1;"));
        assert_eq!(gate.trailing_parameter(FULL_TABLE_READ), None);
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let gate = QueryGate::users();
        assert_eq!(
            gate.classify("select * from users"),
            Err(RejectionReason::UnrecognizedShape)
        );
    }

    #[test]
    fn test_priority_order() {
        let gate = QueryGate::new(vec![
            QueryTemplate::with_parameter("wide", "SELECT "),
            QueryTemplate::exact("narrow", "SELECT * from USERS"),
        ]);
        // The first template wins and rejects on the space in its parameter
        assert_eq!(
            gate.classify("SELECT * from USERS"),
            Err(RejectionReason::SuspiciousParameter)
        );
    }

    #[test]
    fn test_gate_error_display_and_source() {
        use std::error::Error as _;

        let rejected = GateError::from(RejectionReason::UnrecognizedShape);
        assert_eq!(
            rejected.to_string(),
            "Query rejected: query does not match any permitted shape"
        );
        assert_eq!(rejected.rejection(), Some(RejectionReason::UnrecognizedShape));

        let failed = GateError::from(Error::UnknownTable("USERS".to_string()));
        assert_eq!(failed.to_string(), "Query failed: no such table: USERS");
        assert!(failed.rejection().is_none());
        assert!(failed.source().is_some());
    }

    #[test]
    fn test_gate_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryGate>();
    }
}
