use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{debug, warn};

use super::{FirstFollow, Grammar, GrammarNotLl1, ProductionId, Symbol};

/// A cell that holds more than one production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub non_terminal: String,
    pub lookahead: Symbol,
    pub productions: Vec<ProductionId>,
}

/// Predictive parsing table: non-terminal x lookahead -> productions.
#[derive(Debug, Clone)]
pub struct Ll1Table<'g> {
    grammar: &'g Grammar,
    terminals: Vec<Symbol>,
    rows: IndexMap<String, BTreeMap<Symbol, Vec<ProductionId>>>,
}

impl<'g> Ll1Table<'g> {
    pub fn build(ff: &FirstFollow<'g>) -> Self {
        let grammar = ff.grammar();
        let terminals: Vec<Symbol> = grammar
            .terminal_iter()
            .map(|t| Symbol::Terminal(t.to_string()))
            .chain(std::iter::once(Symbol::EndOfInput))
            .collect();

        let mut rows: IndexMap<String, BTreeMap<Symbol, Vec<ProductionId>>> = IndexMap::new();
        for nt in grammar.non_terminal_iter() {
            let mut row: BTreeMap<Symbol, Vec<ProductionId>> = BTreeMap::new();
            for &id in grammar.productions_of(nt) {
                let first = ff.first_of_sequence(&grammar.production(id).right);

                let mut lookaheads: Vec<&Symbol> = first.terminals.iter().collect();
                if first.nullable {
                    if let Some(follow) = ff.follow(nt) {
                        lookaheads.extend(follow.iter());
                    }
                }

                for lookahead in lookaheads {
                    let cell = row.entry(lookahead.clone()).or_default();
                    if !cell.contains(&id) {
                        cell.push(id);
                    }
                }
            }
            rows.insert(nt.to_string(), row);
        }

        let table = Self {
            grammar,
            terminals,
            rows,
        };
        for conflict in table.conflicts() {
            warn!(
                "conflict at ({}, {}): {}",
                conflict.non_terminal,
                conflict.lookahead,
                table.productions_to_string(&conflict.productions)
            );
        }
        debug!(
            "built LL(1) table with {} rows and {} columns",
            table.rows.len(),
            table.terminals.len()
        );
        table
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// Column headers: every terminal of the grammar followed by `$`.
    pub fn terminals(&self) -> &[Symbol] {
        &self.terminals
    }

    /// Productions in cell (`non_terminal`, `lookahead`); empty means no rule
    /// applies.
    pub fn get(&self, non_terminal: &str, lookahead: &Symbol) -> &[ProductionId] {
        self.rows
            .get(non_terminal)
            .and_then(|row| row.get(lookahead))
            .map(|cell| cell.as_slice())
            .unwrap_or(&[])
    }

    /// Non-empty cells in row order.
    pub fn cell_iter(&self) -> impl Iterator<Item = (&str, &Symbol, &[ProductionId])> {
        self.rows.iter().flat_map(|(nt, row)| {
            row.iter()
                .map(move |(lookahead, cell)| (nt.as_str(), lookahead, cell.as_slice()))
        })
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        self.cell_iter()
            .filter(|(_, _, cell)| cell.len() > 1)
            .map(|(nt, lookahead, cell)| Conflict {
                non_terminal: nt.to_string(),
                lookahead: lookahead.clone(),
                productions: cell.to_vec(),
            })
            .collect()
    }

    pub fn is_ll1(&self) -> bool {
        self.cell_iter().all(|(_, _, cell)| cell.len() <= 1)
    }

    pub fn ensure_ll1(&self) -> Result<(), GrammarNotLl1> {
        let conflicts = self.conflicts();
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(GrammarNotLl1 { conflicts })
        }
    }

    pub fn productions_to_string(&self, ids: &[ProductionId]) -> String {
        ids.iter()
            .map(|&id| self.grammar.production(id).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
