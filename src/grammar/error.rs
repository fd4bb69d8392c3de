use thiserror::Error;

use super::{ll1_table::Conflict, ProductionId, Symbol};

/// A grammar that cannot be analysed at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("Line {line}: too many \"->\"")]
    TooManyArrows { line: usize },

    #[error("Line {line}: empty left side")]
    EmptyLeftSide { line: usize },

    #[error("Line {line}: left side contains whitespace")]
    LeftSideContainsWhitespace { line: usize },

    #[error("Line {line}: cannot find left side")]
    MissingLeftSide { line: usize },

    #[error("{non_terminal}: empty alternative, write ε instead")]
    EmptyAlternative { non_terminal: String },

    #[error("{non_terminal}: ε must be the only symbol of an alternative")]
    EpsilonInSequence { non_terminal: String },

    #[error("{non_terminal}: \"{token}\" is reserved")]
    ReservedToken { non_terminal: String, token: String },

    #[error("grammar has no start symbol")]
    NoStartSymbol,
}

/// Non-fatal findings collected while a grammar is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarWarning {
    /// A right-hand side names something that looks like a non-terminal but
    /// has no productions; it is treated as a terminal.
    #[error("{non_terminal}: \"{symbol}\" has no productions and is treated as a terminal")]
    UnknownSymbolReference { non_terminal: String, symbol: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("grammar is not LL(1): {} conflicting cell(s)", .conflicts.len())]
pub struct GrammarNotLl1 {
    pub conflicts: Vec<Conflict>,
}

/// Why the table-driven validator rejected an input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("token {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: Symbol,
        found: Symbol,
        position: usize,
    },

    #[error("token {position}: no production of {non_terminal} applies on {found}")]
    NoApplicableProduction {
        non_terminal: String,
        found: Symbol,
        position: usize,
    },

    #[error("token {position}: {non_terminal} has {} productions on {found}", .productions.len())]
    AmbiguousDecision {
        non_terminal: String,
        found: Symbol,
        position: usize,
        productions: Vec<ProductionId>,
    },

    #[error("token {position}: input remains after the stack is empty")]
    TrailingInput { position: usize },
}
