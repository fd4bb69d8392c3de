use log::debug;

use super::{Ll1Table, ProductionId, Rejection, Symbol};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    Match(Symbol),
    Expand(ProductionId),
    Accept,
    Reject(Rejection),
}

/// Machine state before `action` is applied. The stack top is the last element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStep {
    pub stack: Vec<Symbol>,
    pub input: Vec<Symbol>,
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTrace {
    pub steps: Vec<ParseStep>,
    pub outcome: Result<(), Rejection>,
}

impl ParseTrace {
    pub fn accepted(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl Ll1Table<'_> {
    /// Runs the predictive parser over `tokens`. `$` is appended implicitly.
    /// Any empty or ambiguous cell rejects immediately.
    pub fn validate(&self, tokens: &[&str]) -> Result<(), Rejection> {
        self.run(tokens, |_, _, _| {})
    }

    /// Validates one line of whitespace separated tokens.
    pub fn validate_line(&self, line: &str) -> Result<(), Rejection> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        self.validate(&tokens)
    }

    pub fn trace(&self, tokens: &[&str]) -> ParseTrace {
        let mut steps = Vec::new();
        let outcome = self.run(tokens, |stack, input, action| {
            steps.push(ParseStep {
                stack: stack.to_vec(),
                input: input.to_vec(),
                action: action.clone(),
            })
        });
        ParseTrace { steps, outcome }
    }

    fn run<F>(&self, tokens: &[&str], mut on_step: F) -> Result<(), Rejection>
    where
        F: FnMut(&[Symbol], &[Symbol], &StepAction),
    {
        let input: Vec<Symbol> = tokens
            .iter()
            .map(|t| Symbol::Terminal(t.to_string()))
            .chain(std::iter::once(Symbol::EndOfInput))
            .collect();
        let mut stack: Vec<Symbol> = vec![
            Symbol::EndOfInput,
            Symbol::NonTerminal(self.grammar().start_symbol().to_string()),
        ];
        let mut position = 0;
        let end = Symbol::EndOfInput;

        while let Some(top) = stack.last() {
            let current = input.get(position).unwrap_or(&end);
            let action = match top {
                Symbol::Epsilon => {
                    stack.pop();
                    continue;
                }
                Symbol::NonTerminal(name) => match self.get(name, current) {
                    [] => StepAction::Reject(Rejection::NoApplicableProduction {
                        non_terminal: name.clone(),
                        found: current.clone(),
                        position,
                    }),
                    [id] => StepAction::Expand(*id),
                    ids => StepAction::Reject(Rejection::AmbiguousDecision {
                        non_terminal: name.clone(),
                        found: current.clone(),
                        position,
                        productions: ids.to_vec(),
                    }),
                },
                _ if top == current => StepAction::Match(current.clone()),
                _ => StepAction::Reject(Rejection::UnexpectedToken {
                    expected: top.clone(),
                    found: current.clone(),
                    position,
                }),
            };

            on_step(&stack, &input[position.min(input.len())..], &action);

            match action {
                StepAction::Match(symbol) => {
                    debug!("match {} at {}", symbol, position);
                    stack.pop();
                    position += 1;
                }
                StepAction::Expand(id) => {
                    let production = self.grammar().production(id);
                    debug!("expand {} on {}", production, current);
                    stack.pop();
                    stack.extend(
                        production
                            .right
                            .iter()
                            .rev()
                            .filter(|s| **s != Symbol::Epsilon)
                            .cloned(),
                    );
                }
                StepAction::Reject(rejection) => {
                    debug!("reject: {}", rejection);
                    return Err(rejection);
                }
                StepAction::Accept => break,
            }
        }

        if position < input.len() {
            let rejection = Rejection::TrailingInput { position };
            on_step(&stack, &input[position..], &StepAction::Reject(rejection.clone()));
            return Err(rejection);
        }
        on_step(&stack, &[], &StepAction::Accept);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{FirstFollow, Grammar};
    use pretty_assertions::assert_eq;

    fn t(name: &str) -> Symbol {
        Symbol::Terminal(name.to_string())
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

    fn reduced() -> Grammar {
        Grammar::from_rules(&[
            ("S", &["A B C"]),
            ("A", &["a", "ε"]),
            ("B", &["b", "ε"]),
            ("C", &["( S )", "c"]),
        ])
        .unwrap()
    }

    #[test]
    fn ambiguous_cell_fails_closed() {
        let g = reference();
        let ff = FirstFollow::compute(&g);
        let table = Ll1Table::build(&ff);

        // "a c" is in the language, but (S, a) holds two productions.
        assert_eq!(
            table.validate_line("a c"),
            Err(Rejection::AmbiguousDecision {
                non_terminal: "S".to_string(),
                found: t("a"),
                position: 0,
                productions: vec![0, 1],
            })
        );
        match table.validate_line("a") {
            Err(Rejection::AmbiguousDecision { position, .. }) => assert_eq!(position, 0),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn unambiguous_rows_of_ambiguous_grammar_still_parse() {
        let g = reference();
        let ff = FirstFollow::compute(&g);
        let table = Ll1Table::build(&ff);
        // (S, b) only holds S -> A B C
        assert_eq!(table.validate_line("b c"), Ok(()));
    }

    #[test]
    fn reduced_grammar_accepts() {
        let g = reduced();
        let ff = FirstFollow::compute(&g);
        let table = Ll1Table::build(&ff);

        for input in ["c", "a c", "b c", "a b c", "( a c )", "a ( b ( c ) )"] {
            assert_eq!(table.validate_line(input), Ok(()), "input {:?}", input);
        }
    }

    #[test]
    fn reduced_grammar_rejections() {
        let g = reduced();
        let ff = FirstFollow::compute(&g);
        let table = Ll1Table::build(&ff);

        // C is not nullable, so the input ends too early.
        assert_eq!(
            table.validate_line("a b"),
            Err(Rejection::NoApplicableProduction {
                non_terminal: "C".to_string(),
                found: Symbol::EndOfInput,
                position: 2,
            })
        );
        assert_eq!(
            table.validate_line("( a c"),
            Err(Rejection::UnexpectedToken {
                expected: t(")"),
                found: Symbol::EndOfInput,
                position: 3,
            })
        );
        assert_eq!(
            table.validate_line("c c"),
            Err(Rejection::UnexpectedToken {
                expected: Symbol::EndOfInput,
                found: t("c"),
                position: 1,
            })
        );
        assert_eq!(
            table.validate_line("x"),
            Err(Rejection::NoApplicableProduction {
                non_terminal: "S".to_string(),
                found: t("x"),
                position: 0,
            })
        );
    }

    #[test]
    fn literal_dollar_is_not_end_of_input() {
        let g = reduced();
        let ff = FirstFollow::compute(&g);
        let table = Ll1Table::build(&ff);
        assert_eq!(
            table.validate(&["c", "$"]),
            Err(Rejection::UnexpectedToken {
                expected: Symbol::EndOfInput,
                found: t("$"),
                position: 1,
            })
        );
    }

    #[test]
    fn nullable_start_accepts_empty_input() {
        let g = Grammar::parse("L -> , a L | ε").unwrap();
        let ff = FirstFollow::compute(&g);
        let table = Ll1Table::build(&ff);
        assert_eq!(table.validate_line(""), Ok(()));
        assert_eq!(table.validate_line(", a , a"), Ok(()));
        assert!(table.validate_line(", a ,").is_err());
    }

    #[test]
    fn recursive_descent_grammar_via_table() {
        let g = Grammar::parse(
            "S -> ( L ) | a
             L -> S L'
             L' -> , S L' | ε",
        )
        .unwrap();
        let ff = FirstFollow::compute(&g);
        let table = Ll1Table::build(&ff);
        assert!(table.is_ll1());

        for input in ["a", "( a )", "( a , a )", "( a , ( a , a ) , a )"] {
            assert!(table.validate_line(input).is_ok(), "input {:?}", input);
        }
        for input in ["( a , a ) , ( a , a )", "a )", "( a", "a , a", "a ,"] {
            assert!(table.validate_line(input).is_err(), "input {:?}", input);
        }
    }

    #[test]
    fn trace_records_every_step() {
        let g = reduced();
        let ff = FirstFollow::compute(&g);
        let table = Ll1Table::build(&ff);
        let trace = table.trace(&["c"]);

        assert!(trace.accepted());
        let actions: Vec<StepAction> = trace.steps.iter().map(|s| s.action.clone()).collect();
        assert_eq!(
            actions,
            vec![
                StepAction::Expand(0), // S -> A B C
                StepAction::Expand(2), // A -> ε
                StepAction::Expand(4), // B -> ε
                StepAction::Expand(6), // C -> c
                StepAction::Match(t("c")),
                StepAction::Match(Symbol::EndOfInput),
                StepAction::Accept,
            ]
        );
        assert_eq!(
            trace.steps[0].stack,
            vec![Symbol::EndOfInput, Symbol::NonTerminal("S".to_string())]
        );
        assert_eq!(trace.steps[0].input, vec![t("c"), Symbol::EndOfInput]);
    }

    #[test]
    fn trace_ends_with_rejection() {
        let g = reference();
        let ff = FirstFollow::compute(&g);
        let table = Ll1Table::build(&ff);
        let trace = table.trace(&["a"]);
        assert!(!trace.accepted());
        assert_eq!(trace.steps.len(), 1);
        assert!(matches!(
            trace.steps[0].action,
            StepAction::Reject(Rejection::AmbiguousDecision { .. })
        ));
    }
}
