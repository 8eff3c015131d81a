//! Query engine module
//!
//! SQL parsing, planning, and execution.

/// Abstract Syntax Tree types
#[allow(missing_docs)]
pub mod ast;
/// Query executor
#[allow(missing_docs)]
pub mod executor;
/// SQL lexer
#[allow(missing_docs)]
pub mod lexer;
/// SQL parser
#[allow(missing_docs)]
pub mod parser;
/// Query planner
#[allow(missing_docs)]
pub mod planner;

// Re-export main types
pub use ast::*;
pub use executor::{Column, Executor, Row, Value};
pub use lexer::{Keyword, Lexer, LexerError, Token};
pub use parser::{ParseError, Parser, MAX_EXPRESSION_DEPTH};
pub use planner::{PhysicalOperator, PhysicalPlan, Planner};
