use crate::Grammar;

use super::GrammarError;

impl Grammar {
    /// Parses the line based text form:
    ///
    /// ```text
    /// S -> A B C | D
    /// A -> a
    ///    | ε
    /// ```
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut raw_productions: Vec<(&str, Vec<&str>)> = Vec::new();

        let mut previous_left: Option<&str> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(GrammarError::TooManyArrows { line: i + 1 });
            }
            let (left, rights): (&str, &str) = if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    return Err(GrammarError::EmptyLeftSide { line: i + 1 });
                } else if left_str.split_whitespace().count() != 1 {
                    return Err(GrammarError::LeftSideContainsWhitespace { line: i + 1 });
                }
                (left_str, parts[1].trim())
            } else {
                match (previous_left, parts[0].trim().strip_prefix('|')) {
                    (Some(left), Some(rest)) => (left, rest.trim()),
                    _ => return Err(GrammarError::MissingLeftSide { line: i + 1 }),
                }
            };

            previous_left = Some(left);

            raw_productions.push((left, rights.split('|').collect()));
        }

        Grammar::build(raw_productions)
    }
}
