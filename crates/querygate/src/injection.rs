//! Generates tautology-injection samples for exercising the gate.

use rand::Rng;

/// Suffixes appended to a query's WHERE clause; each makes the filter match
/// every row if executed.
pub const TAUTOLOGY_SUFFIXES: [&str; 4] = [
    " or 1=1;",
    " or 2=2;",
    " or 'hi'='hi';",
    " or 'hack'='hack';",
];

/// Returns `sql` with a randomly chosen tautology appended to its WHERE
/// clause.
///
/// One trailing `;` is dropped before appending. A query without a
/// ` where ` clause (matched case-insensitively) is returned unchanged.
pub fn inject_tautology<R: Rng + ?Sized>(sql: &str, rng: &mut R) -> String {
    if !has_where_clause(sql) {
        return sql.to_string();
    }

    let base = sql.strip_suffix(';').unwrap_or(sql);
    let suffix = TAUTOLOGY_SUFFIXES[rng.gen_range(0..TAUTOLOGY_SUFFIXES.len())];

    let mut injected = String::with_capacity(base.len() + suffix.len());
    injected.push_str(base);
    injected.push_str(suffix);
    injected
}

fn has_where_clause(sql: &str) -> bool {
    sql.to_lowercase().contains(" where ")
}
