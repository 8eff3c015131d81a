//! Turns a parsed [`Query`] into a chain of physical operators.
//!
//! The chain always reads bottom-up as scan, filter, sort, limit, project.
//! Sorting happens before projection so ORDER BY may name a column that
//! is not selected.

use super::ast::*;
use std::fmt;

/// Root of an operator chain
#[derive(Debug, Clone)]
pub struct PhysicalPlan {
    pub root: PhysicalOperator,
}

#[derive(Debug, Clone)]
pub enum PhysicalOperator {
    TableScan {
        table: String,
    },
    Filter {
        input: Box<PhysicalOperator>,
        condition: Expression,
    },
    Sort {
        input: Box<PhysicalOperator>,
        keys: Vec<SortKey>,
    },
    Limit {
        input: Box<PhysicalOperator>,
        count: usize,
        offset: usize,
    },
    Project {
        input: Box<PhysicalOperator>,
        columns: Vec<SelectColumn>,
    },
}

impl PhysicalOperator {
    fn wrap(self, build: impl FnOnce(Box<PhysicalOperator>) -> PhysicalOperator) -> Self {
        build(Box::new(self))
    }
}

#[derive(Debug, Default)]
pub struct Planner;

impl Planner {
    pub fn new() -> Self {
        Self
    }

    /// Build the operator chain for `query`
    pub fn plan(&self, query: &Query) -> PhysicalPlan {
        let mut root = PhysicalOperator::TableScan {
            table: query.table.clone(),
        };

        if let Some(condition) = &query.filter {
            root = root.wrap(|input| PhysicalOperator::Filter {
                input,
                condition: condition.clone(),
            });
        }

        if !query.order_by.is_empty() {
            root = root.wrap(|input| PhysicalOperator::Sort {
                input,
                keys: query.order_by.clone(),
            });
        }

        if let Some(Limit { count, offset }) = query.limit {
            root = root.wrap(|input| PhysicalOperator::Limit {
                input,
                count,
                offset,
            });
        }

        root = root.wrap(|input| PhysicalOperator::Project {
            input,
            columns: query.projection.clone(),
        });

        PhysicalPlan { root }
    }
}

impl fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(T::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for PhysicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalOperator::TableScan { table } => write!(f, "TableScan({})", table),
            PhysicalOperator::Filter { input, condition } => {
                write!(f, "Filter({}) <- {}", condition, input)
            }
            PhysicalOperator::Sort { input, keys } => {
                write!(f, "Sort({}) <- {}", join(keys), input)
            }
            PhysicalOperator::Limit {
                input,
                count,
                offset,
            } => write!(f, "Limit({}, offset {}) <- {}", count, offset, input),
            PhysicalOperator::Project { input, columns } => {
                write!(f, "Project({}) <- {}", join(columns), input)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parser::Parser;

    fn plan(sql: &str) -> PhysicalPlan {
        let query = Parser::new(sql).unwrap().parse_query().unwrap();
        Planner::new().plan(&query)
    }

    #[test]
    fn test_full_scan_is_scan_then_project() {
        assert_eq!(
            plan("SELECT * from USERS").to_string(),
            "Project(*) <- TableScan(USERS)"
        );
    }

    #[test]
    fn test_operator_order() {
        assert_eq!(
            plan("SELECT NAME FROM USERS WHERE ID > 1 ORDER BY ID DESC LIMIT 2").to_string(),
            "Project(NAME) <- Limit(2, offset 0) <- Sort(ID DESC) <- Filter(ID > 1) <- TableScan(USERS)"
        );
    }

    #[test]
    fn test_filter_only() {
        let plan = plan("SELECT ID, NAME, PASSWORD FROM USERS WHERE NAME='Fred'");
        let PhysicalOperator::Project { input, columns } = plan.root else {
            panic!("expected projection at the root");
        };
        assert_eq!(columns.len(), 3);
        assert!(matches!(*input, PhysicalOperator::Filter { .. }));
    }
}
