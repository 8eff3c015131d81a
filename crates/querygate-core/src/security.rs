//! Size and character limits checked before SQL text reaches the parser.
//!
//! These bound the work one call can cause. They do not filter injection;
//! that is the gate's job, in front of the store.

use crate::error::{Error, Result};

/// Longest SQL text accepted, in bytes
pub const MAX_QUERY_LENGTH: usize = 1 << 20;

/// Longest table or column name accepted, in bytes
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Reject blank text, text over [`MAX_QUERY_LENGTH`], and NUL bytes.
///
/// # Errors
///
/// [`Error::InvalidInput`] naming the violated limit.
pub fn validate_query(sql: &str) -> Result<()> {
    let problem = if sql.trim().is_empty() {
        "query is empty".to_string()
    } else if sql.len() > MAX_QUERY_LENGTH {
        format!("query is {} bytes, limit is {}", sql.len(), MAX_QUERY_LENGTH)
    } else if sql.contains('\0') {
        "query contains a NUL byte".to_string()
    } else {
        return Ok(());
    };
    Err(Error::InvalidInput(problem))
}

/// Require `[A-Za-z_][A-Za-z0-9_]*`, at most [`MAX_IDENTIFIER_LENGTH`] bytes.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(Error::InvalidInput(format!(
            "name is {} bytes, limit is {}",
            name.len(),
            MAX_IDENTIFIER_LENGTH
        )));
    }

    let bytes = name.as_bytes();
    let well_formed = match bytes.split_first() {
        Some((first, rest)) => {
            (first.is_ascii_alphabetic() || *first == b'_')
                && rest.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
        }
        None => false,
    };
    if !well_formed {
        return Err(Error::InvalidInput(format!("malformed name '{}'", name)));
    }

    Ok(())
}
