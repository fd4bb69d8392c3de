pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod ll1_table;
pub mod parse;
pub mod pretty_print;
pub mod validate;

pub use error::{GrammarError, GrammarNotLl1, GrammarWarning, Rejection};
pub use first_follow::{FirstFollow, FirstSet};
pub use grammar::{Grammar, Production, ProductionId, Symbol};
pub use ll1_table::{Conflict, Ll1Table};
pub use validate::{ParseStep, ParseTrace, StepAction};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";
