//! The query engine stages a session is composed of. They are opaque to
//! the session container, which only constructs and hands them out.

pub mod analyzer;
pub mod optimizer;
pub mod parser;
pub mod planner;

pub use analyzer::{Analyzer, CatalogAnalyzer};
pub use optimizer::{Optimizer, RuleOptimizer};
pub use parser::{DefaultParser, SqlParser};
pub use planner::{DefaultPlanner, Planner};
