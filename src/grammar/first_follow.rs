use std::collections::{BTreeSet, HashMap};

use log::{debug, trace};

use super::{Grammar, Symbol};

/// Terminals (or the end marker) that can begin a derivation, with the
/// empty string tracked separately as `nullable`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: BTreeSet<Symbol>,
    pub nullable: bool,
}

/// One analysis session over a grammar. The caches live as long as this value
/// and are filled completely by [`FirstFollow::compute`].
#[derive(Debug)]
pub struct FirstFollow<'g> {
    grammar: &'g Grammar,
    first: HashMap<String, FirstSet>,
    follow: HashMap<String, BTreeSet<Symbol>>,
}

impl<'g> FirstFollow<'g> {
    pub fn compute(grammar: &'g Grammar) -> Self {
        let mut ff = Self {
            grammar,
            first: grammar
                .non_terminal_iter()
                .map(|nt| (nt.to_string(), FirstSet::default()))
                .collect(),
            follow: grammar
                .non_terminal_iter()
                .map(|nt| (nt.to_string(), BTreeSet::new()))
                .collect(),
        };
        ff.calculate_nullable();
        ff.calculate_first();
        ff.calculate_follow();
        ff
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn first(&self, symbol: &Symbol) -> FirstSet {
        match symbol {
            Symbol::Terminal(_) | Symbol::EndOfInput => FirstSet {
                terminals: BTreeSet::from([symbol.clone()]),
                nullable: false,
            },
            Symbol::Epsilon => FirstSet {
                terminals: BTreeSet::new(),
                nullable: true,
            },
            Symbol::NonTerminal(name) => self.first.get(name).cloned().unwrap_or_default(),
        }
    }

    /// FIRST of a symbol sequence; an empty sequence is nullable.
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> FirstSet {
        let mut result = FirstSet::default();
        for symbol in symbols {
            if !self.extend_with_first(&mut result.terminals, symbol) {
                return result;
            }
        }
        result.nullable = true;
        result
    }

    /// `None` when `non_terminal` has no productions.
    pub fn follow(&self, non_terminal: &str) -> Option<&BTreeSet<Symbol>> {
        self.follow.get(non_terminal)
    }

    pub fn is_nullable(&self, symbol: &Symbol) -> bool {
        match symbol {
            Symbol::Terminal(_) | Symbol::EndOfInput => false,
            Symbol::Epsilon => true,
            Symbol::NonTerminal(name) => self.first.get(name).map_or(false, |f| f.nullable),
        }
    }

    /// Adds FIRST(`symbol`) to `set` and returns whether `symbol` is nullable.
    fn extend_with_first(&self, set: &mut BTreeSet<Symbol>, symbol: &Symbol) -> bool {
        match symbol {
            Symbol::Terminal(_) | Symbol::EndOfInput => {
                set.insert(symbol.clone());
                false
            }
            Symbol::Epsilon => true,
            Symbol::NonTerminal(name) => match self.first.get(name) {
                Some(first) => {
                    set.extend(first.terminals.iter().cloned());
                    first.nullable
                }
                None => false,
            },
        }
    }

    fn calculate_nullable(&mut self) {
        let mut pass = 0;
        let mut changed = true;
        while changed {
            changed = false;
            pass += 1;
            for nt in self.grammar.non_terminal_iter() {
                if self.first[nt].nullable {
                    continue;
                }
                let nullable = self.grammar.productions_of(nt).iter().any(|&id| {
                    self.grammar
                        .production(id)
                        .right
                        .iter()
                        .all(|s| self.is_nullable(s))
                });
                if nullable {
                    trace!("nullable pass {}: {} is nullable", pass, nt);
                    if let Some(first) = self.first.get_mut(nt) {
                        first.nullable = true;
                    }
                    changed = true;
                }
            }
        }
        debug!("nullable reached a fixpoint after {} passes", pass);
    }

    fn calculate_first(&mut self) {
        let mut pass = 0;
        let mut changed = true;
        while changed {
            changed = false;
            pass += 1;
            for nt in self.grammar.non_terminal_iter() {
                let mut first: BTreeSet<Symbol> = BTreeSet::new();
                for &id in self.grammar.productions_of(nt) {
                    for symbol in &self.grammar.production(id).right {
                        if !self.extend_with_first(&mut first, symbol) {
                            break;
                        }
                    }
                }

                if let Some(entry) = self.first.get_mut(nt) {
                    if entry.terminals.len() != first.len() {
                        trace!("first pass {}: First({}) grew to {}", pass, nt, first.len());
                        entry.terminals = first;
                        changed = true;
                    }
                }
            }
        }
        debug!("first reached a fixpoint after {} passes", pass);
    }

    fn calculate_follow(&mut self) {
        let start = self.grammar.start_symbol().to_string();
        if let Some(follow) = self.follow.get_mut(&start) {
            follow.insert(Symbol::EndOfInput);
        }

        let mut pass = 0;
        let mut changed = true;
        while changed {
            changed = false;
            pass += 1;
            for production in self.grammar.productions() {
                for (i, symbol) in production.right.iter().enumerate() {
                    let target = match symbol {
                        Symbol::NonTerminal(name) => name,
                        _ => continue,
                    };

                    let rest = self.first_of_sequence(&production.right[i + 1..]);
                    let mut addition = rest.terminals;
                    if rest.nullable && production.left != *target {
                        addition.extend(self.follow[&production.left].iter().cloned());
                    }

                    if let Some(follow) = self.follow.get_mut(target) {
                        let before = follow.len();
                        follow.extend(addition);
                        if follow.len() != before {
                            trace!("follow pass {}: Follow({}) grew to {}", pass, target, follow.len());
                            changed = true;
                        }
                    }
                }
            }
        }
        debug!("follow reached a fixpoint after {} passes", pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(name: &str) -> Symbol {
        Symbol::Terminal(name.to_string())
    }

    fn set(symbols: &[Symbol]) -> BTreeSet<Symbol> {
        symbols.iter().cloned().collect()
    }

    fn first_of(ff: &FirstFollow, nt: &str) -> FirstSet {
        ff.first(&Symbol::NonTerminal(nt.to_string()))
    }

    fn reference() -> Grammar {
        Grammar::from_rules(&[
            ("S", &["A B C", "D"]),
            ("A", &["a", "ε"]),
            ("B", &["b", "ε"]),
            ("C", &["( S )", "c"]),
            ("D", &["A C"]),
        ])
        .unwrap()
    }

    #[test]
    fn reference_first() {
        let g = reference();
        let ff = FirstFollow::compute(&g);

        let a = first_of(&ff, "A");
        assert_eq!(a.terminals, set(&[t("a")]));
        assert!(a.nullable);

        let b = first_of(&ff, "B");
        assert_eq!(b.terminals, set(&[t("b")]));
        assert!(b.nullable);

        let c = first_of(&ff, "C");
        assert_eq!(c.terminals, set(&[t("("), t("c")]));
        assert!(!c.nullable);

        let d = first_of(&ff, "D");
        assert_eq!(d.terminals, set(&[t("a"), t("("), t("c")]));
        assert!(!d.nullable);

        let s = first_of(&ff, "S");
        assert_eq!(s.terminals, set(&[t("a"), t("b"), t("("), t("c")]));
        assert!(!s.nullable);
    }

    #[test]
    fn reference_follow() {
        let g = reference();
        let ff = FirstFollow::compute(&g);

        assert_eq!(ff.follow("A").unwrap(), &set(&[t("b"), t("("), t("c")]));
        assert_eq!(ff.follow("B").unwrap(), &set(&[t("("), t("c")]));
        let end = set(&[Symbol::EndOfInput, t(")")]);
        assert_eq!(ff.follow("C").unwrap(), &end);
        assert_eq!(ff.follow("D").unwrap(), &end);
        assert_eq!(ff.follow("S").unwrap(), &end);
        assert_eq!(ff.follow("a"), None);
    }

    #[test]
    fn first_sets_never_contain_epsilon() {
        let g = reference();
        let ff = FirstFollow::compute(&g);
        for nt in g.non_terminal_iter() {
            assert!(!first_of(&ff, nt).terminals.contains(&Symbol::Epsilon));
            assert!(!ff.follow(nt).unwrap().contains(&Symbol::Epsilon));
        }
    }

    #[test]
    fn terminal_and_epsilon_first() {
        let g = reference();
        let ff = FirstFollow::compute(&g);
        assert_eq!(
            ff.first(&t("x")),
            FirstSet {
                terminals: set(&[t("x")]),
                nullable: false
            }
        );
        assert_eq!(
            ff.first(&Symbol::EndOfInput).terminals,
            set(&[Symbol::EndOfInput])
        );
        assert!(ff.first(&Symbol::Epsilon).nullable);
        assert!(ff.first(&Symbol::Epsilon).terminals.is_empty());
    }

    #[test]
    fn sequence_first() {
        let g = reference();
        let ff = FirstFollow::compute(&g);
        let a = Symbol::NonTerminal("A".to_string());
        let b = Symbol::NonTerminal("B".to_string());

        let ab = ff.first_of_sequence(&[a.clone(), b.clone()]);
        assert_eq!(ab.terminals, set(&[t("a"), t("b")]));
        assert!(ab.nullable);

        let abx = ff.first_of_sequence(&[a, b, t("x"), t("y")]);
        assert_eq!(abx.terminals, set(&[t("a"), t("b"), t("x")]));
        assert!(!abx.nullable);

        assert!(ff.first_of_sequence(&[]).nullable);
    }

    #[test]
    fn left_recursion_converges() {
        let g = Grammar::parse(
            "E -> E + T | T
             T -> T * F | F
             F -> ( E ) | id",
        )
        .unwrap();
        let ff = FirstFollow::compute(&g);

        for nt in ["E", "T", "F"] {
            assert_eq!(first_of(&ff, nt).terminals, set(&[t("("), t("id")]));
        }
        assert_eq!(
            ff.follow("E").unwrap(),
            &set(&[Symbol::EndOfInput, t("+"), t(")")])
        );
        assert_eq!(
            ff.follow("F").unwrap(),
            &set(&[Symbol::EndOfInput, t("+"), t("*"), t(")")])
        );
    }

    #[test]
    fn recursion_through_nullable_prefix_converges() {
        let g = Grammar::parse(
            "S -> A S b | c
             A -> ε | a",
        )
        .unwrap();
        let ff = FirstFollow::compute(&g);
        assert_eq!(first_of(&ff, "S").terminals, set(&[t("a"), t("c")]));
        assert_eq!(ff.follow("A").unwrap(), &set(&[t("a"), t("c")]));
        assert_eq!(ff.follow("S").unwrap(), &set(&[Symbol::EndOfInput, t("b")]));
    }

    #[test]
    fn mutually_dependent_follow_sets() {
        let g = Grammar::parse(
            "S -> X x
             X -> Y | a
             Y -> X | b",
        )
        .unwrap();
        let ff = FirstFollow::compute(&g);
        assert_eq!(ff.follow("X").unwrap(), &set(&[t("x")]));
        assert_eq!(ff.follow("Y").unwrap(), &set(&[t("x")]));
    }

    #[test]
    fn unused_production_does_not_change_follow() {
        let g = reference();
        let ff = FirstFollow::compute(&g);
        let before = ff.follow("A").unwrap().clone();

        let extended = Grammar::from_rules(&[
            ("S", &["A B C", "D"]),
            ("A", &["a", "ε"]),
            ("B", &["b", "ε"]),
            ("C", &["( S )", "c"]),
            ("D", &["A C"]),
            ("E", &["e B"]),
        ])
        .unwrap();
        let ff = FirstFollow::compute(&extended);
        assert_eq!(ff.follow("A").unwrap(), &before);
    }

    #[test]
    fn repeated_runs_agree() {
        let g = reference();
        let first = FirstFollow::compute(&g);
        let second = FirstFollow::compute(&g);
        for nt in g.non_terminal_iter() {
            assert_eq!(first_of(&first, nt), first_of(&second, nt));
            assert_eq!(first.follow(nt), second.follow(nt));
        }
    }
}
