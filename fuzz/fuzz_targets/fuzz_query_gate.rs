#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use querygate::demo::{CREATE_USERS_SQL, SEED_USERS_SQL};
use querygate::gate::FILTER_BY_NAME;
use querygate::{CountingStore, Database, QueryGate, RejectionReason};

#[derive(Arbitrary, Debug)]
enum Candidate {
    /// Any text at all
    Raw(String),
    /// Filter prefix followed by a fuzzed parameter
    Filter(String),
}

fuzz_target!(|candidate: Candidate| {
    let Ok(db) = Database::in_memory() else {
        return;
    };
    if db.execute(CREATE_USERS_SQL).is_err() || db.execute(SEED_USERS_SQL).is_err() {
        return;
    }

    let sql = match candidate {
        Candidate::Raw(sql) => sql,
        Candidate::Filter(param) => format!("{}{}", FILTER_BY_NAME, param),
    };
    if sql.len() > 10_000 {
        return;
    }

    let gate = QueryGate::users();
    let mut store = CountingStore::new(db);
    match gate.evaluate(&mut store, &sql) {
        Err(err) if err.rejection().is_some() => assert_eq!(store.calls(), 0),
        _ => assert_eq!(store.executed(), [sql.clone()]),
    }

    if let Some(param) = gate.trailing_parameter(&sql) {
        if param.chars().any(char::is_whitespace) {
            assert_eq!(
                gate.classify(&sql).unwrap_err(),
                RejectionReason::SuspiciousParameter
            );
        }
    }
});
