#![no_main]

use libfuzzer_sys::fuzz_target;
use querygate_core::query::parser::Parser;
use querygate_core::Database;

fuzz_target!(|data: &[u8]| {
    let Ok(sql) = std::str::from_utf8(data) else {
        return;
    };
    if sql.len() > 10_000 {
        return;
    }

    // Parsing must never panic
    if let Ok(mut parser) = Parser::new(sql) {
        let _ = parser.parse();
    }

    // Neither may executing against an empty store
    if let Ok(db) = Database::in_memory() {
        let _ = db.execute(sql);
    }
});
