use std::fmt;

use indexmap::IndexMap;
use log::warn;

use super::{GrammarError, GrammarWarning, END_MARK, EPSILON};

/// Index of a production in declaration order.
pub type ProductionId = usize;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(String),
    NonTerminal(String),
    Epsilon,
    EndOfInput,
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name.as_str(),
            Symbol::Epsilon => EPSILON,
            Symbol::EndOfInput => END_MARK,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub left: String,
    pub right: Vec<Symbol>,
}

impl Production {
    pub fn is_epsilon(&self) -> bool {
        self.right == [Symbol::Epsilon]
    }

    pub fn right_to_string(&self) -> String {
        self.right
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.left, self.right_to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Grammar {
    start_symbol: String,
    rules: IndexMap<String, Vec<ProductionId>>,
    productions: Vec<Production>,
    terminals: Vec<String>,
    warnings: Vec<GrammarWarning>,
}

impl Grammar {
    /// Builds a grammar from `(non-terminal, alternatives)` pairs. The first
    /// pair names the start symbol; each alternative is a whitespace separated
    /// list of symbols and `ε` stands for the empty alternative.
    ///
    /// ```
    /// let g = ll1_helper::Grammar::from_rules(&[("S", &["a S", "ε"])]).unwrap();
    /// assert_eq!(g.start_symbol(), "S");
    /// ```
    pub fn from_rules(rules: &[(&str, &[&str])]) -> Result<Self, GrammarError> {
        let mut raw: Vec<(&str, Vec<&str>)> = Vec::new();
        for (i, (left, rights)) in rules.iter().enumerate() {
            let left = left.trim();
            if left.is_empty() {
                return Err(GrammarError::EmptyLeftSide { line: i + 1 });
            }
            if left.split_whitespace().count() != 1 {
                return Err(GrammarError::LeftSideContainsWhitespace { line: i + 1 });
            }
            raw.push((left, rights.to_vec()));
        }
        Self::build(raw)
    }

    pub(super) fn build(raw: Vec<(&str, Vec<&str>)>) -> Result<Self, GrammarError> {
        let mut rules: IndexMap<String, Vec<ProductionId>> = IndexMap::new();
        for (left, _) in &raw {
            if *left == EPSILON || *left == END_MARK {
                return Err(GrammarError::ReservedToken {
                    non_terminal: left.to_string(),
                    token: left.to_string(),
                });
            }
            rules.entry(left.to_string()).or_insert_with(Vec::new);
        }

        let start_symbol = match rules.keys().next() {
            Some(s) => s.clone(),
            None => return Err(GrammarError::NoStartSymbol),
        };

        let mut g = Self {
            start_symbol,
            rules,
            productions: Vec::new(),
            terminals: Vec::new(),
            warnings: Vec::new(),
        };

        for (left, rights) in raw {
            for right in rights {
                let right = g.tokenize(left, right)?;
                g.add_production(left, right);
            }
        }

        Ok(g)
    }

    fn tokenize(&mut self, left: &str, right: &str) -> Result<Vec<Symbol>, GrammarError> {
        let tokens: Vec<&str> = right.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(GrammarError::EmptyAlternative {
                non_terminal: left.to_string(),
            });
        }
        if tokens.contains(&EPSILON) {
            if tokens.len() > 1 {
                return Err(GrammarError::EpsilonInSequence {
                    non_terminal: left.to_string(),
                });
            }
            return Ok(vec![Symbol::Epsilon]);
        }

        let mut symbols = Vec::with_capacity(tokens.len());
        for token in tokens {
            if token == END_MARK {
                return Err(GrammarError::ReservedToken {
                    non_terminal: left.to_string(),
                    token: token.to_string(),
                });
            }
            if self.rules.contains_key(token) {
                symbols.push(Symbol::NonTerminal(token.to_string()));
                continue;
            }
            if token.starts_with(|c: char| c.is_ascii_uppercase()) {
                let warning = GrammarWarning::UnknownSymbolReference {
                    non_terminal: left.to_string(),
                    symbol: token.to_string(),
                };
                if !self.warnings.contains(&warning) {
                    warn!("{}", warning);
                    self.warnings.push(warning);
                }
            }
            if !self.terminals.iter().any(|t| t == token) {
                self.terminals.push(token.to_string());
            }
            symbols.push(Symbol::Terminal(token.to_string()));
        }
        Ok(symbols)
    }

    fn add_production(&mut self, left: &str, right: Vec<Symbol>) {
        let id = self.productions.len();
        self.productions.push(Production {
            left: left.to_string(),
            right,
        });
        if let Some(ids) = self.rules.get_mut(left) {
            ids.push(id);
        }
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|k| k.as_str())
    }

    /// Terminals in order of first appearance. The end marker is not included.
    pub fn terminal_iter(&self) -> impl Iterator<Item = &str> {
        self.terminals.iter().map(|t| t.as_str())
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Productions of `non_terminal`, empty if it is not defined.
    pub fn productions_of(&self, non_terminal: &str) -> &[ProductionId] {
        self.rules
            .get(non_terminal)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id]
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn warnings(&self) -> &[GrammarWarning] {
        &self.warnings
    }
}
