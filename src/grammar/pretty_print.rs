use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    validate::StepAction, FirstFollow, Grammar, Ll1Table, ParseTrace, Symbol, EPSILON,
};

fn tex_symbol(s: &str) -> String {
    if s == EPSILON {
        "\\epsilon".to_string()
    } else {
        escape::tex(s).to_string()
    }
}

fn join_symbols(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(" ")
}

fn align(output: &[Vec<String>]) -> String {
    let columns = output.iter().map(|line| line.len()).max().unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            output
                .iter()
                .filter_map(|line| line.get(j))
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();
    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<String>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self) -> String {
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .split(' ')
                    .map(tex_symbol)
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");
        format!("{} & \\rightarrow & {}", escape::tex(self.left), right)
    }
}

#[derive(Debug, Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex()))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminal_iter()
            .map(|nt| ProductionOutput {
                left: nt,
                rights: self
                    .productions_of(nt)
                    .iter()
                    .map(|&id| self.production(id).right_to_string())
                    .collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

#[derive(Debug, Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<String>,
    follow: Vec<String>,
}

impl NonTerminalOutput<'_> {
    fn first_to_plaintext(&self) -> String {
        format!("First({}) = {{{}}}", self.name, self.first.join(", "))
    }

    fn follow_to_plaintext(&self) -> String {
        format!("Follow({}) = {{{}}}", self.name, self.follow.join(", "))
    }

    fn to_latex(&self) -> String {
        fn f(a: &[String]) -> String {
            a.iter()
                .map(|s| tex_symbol(s))
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Debug, Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.first_to_plaintext())
            .chain(self.data.iter().map(|s| s.follow_to_plaintext()))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl<'g> FirstFollow<'g> {
    /// Sets are listed in symbol order, with `ε` last in nullable FIRST sets.
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec<'g> {
        let g = self.grammar();
        let data = g
            .non_terminal_iter()
            .map(|nt| {
                let first = self.first(&Symbol::NonTerminal(nt.to_string()));
                let mut first_names: Vec<String> =
                    first.terminals.iter().map(|s| s.to_string()).collect();
                if first.nullable {
                    first_names.push(EPSILON.to_string());
                }
                NonTerminalOutput {
                    name: nt,
                    nullable: first.nullable,
                    first: first_names,
                    follow: self
                        .follow(nt)
                        .map(|f| f.iter().map(|s| s.to_string()).collect())
                        .unwrap_or_default(),
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Debug, Serialize)]
struct CellOutput {
    lookahead: String,
    productions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RowOutput<'a> {
    name: &'a str,
    cells: Vec<CellOutput>,
}

#[derive(Debug, Serialize)]
pub struct Ll1TableOutput<'a> {
    terminals: Vec<String>,
    rows: Vec<RowOutput<'a>>,
    conflicts: Vec<(String, String)>,
    ll1: bool,
}

impl Ll1TableOutput<'_> {
    /// `(N, t) : P1, P2` lines, one line per conflict and the verdict.
    pub fn to_plaintext(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for row in &self.rows {
            for cell in &row.cells {
                lines.push(format!(
                    "({}, {}) : {}",
                    row.name,
                    cell.lookahead,
                    cell.productions.join(", ")
                ));
            }
        }
        for (name, lookahead) in &self.conflicts {
            let cell = self.cell(name, lookahead).map(|c| c.productions.join(", "));
            lines.push(format!(
                "conflict at ({}, {}) : {}",
                name,
                lookahead,
                cell.unwrap_or_default()
            ));
        }
        lines.push(if self.ll1 { "LL(1)" } else { "not LL(1)" }.to_string());
        lines.join("\n")
    }

    /// Bordered grid with one column per terminal.
    pub fn to_grid(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().cloned());
        let mut output: Vec<Vec<String>> = vec![header];
        for row in &self.rows {
            let mut line: Vec<String> = vec![row.name.to_string()];
            line.extend(self.terminals.iter().map(|t| {
                row.cells
                    .iter()
                    .find(|c| &c.lookahead == t)
                    .map(|c| c.productions.join(", "))
                    .unwrap_or_default()
            }));
            output.push(line);
        }
        align(&output)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|t| format!("\\text{{{}}}", escape::tex(t.as_str()))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for row in &self.rows {
            let mut line: Vec<String> = vec![escape::tex(row.name).to_string()];
            line.extend(self.terminals.iter().map(|t| {
                match row.cells.iter().find(|c| &c.lookahead == t) {
                    Some(cell) => {
                        let r = cell
                            .productions
                            .iter()
                            .map(|p| {
                                p.split(' ')
                                    .map(|s| if s == "->" { "\\rightarrow".to_string() } else { tex_symbol(s) })
                                    .collect::<Vec<_>>()
                                    .join(" \\ ")
                            })
                            .collect::<Vec<_>>()
                            .join("; ");
                        if cell.productions.len() > 1 {
                            format!("{{\\color{{red}}{}}}", r)
                        } else {
                            r
                        }
                    }
                    None => String::new(),
                }
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }

    fn cell(&self, name: &str, lookahead: &str) -> Option<&CellOutput> {
        self.rows
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| r.cells.iter().find(|c| c.lookahead == lookahead))
    }
}

impl<'g> Ll1Table<'g> {
    pub fn to_output(&self) -> Ll1TableOutput<'g> {
        let g = self.grammar();
        let rows = g
            .non_terminal_iter()
            .map(|nt| RowOutput {
                name: nt,
                cells: self
                    .cell_iter()
                    .filter(|(name, _, _)| *name == nt)
                    .map(|(_, lookahead, ids)| CellOutput {
                        lookahead: lookahead.to_string(),
                        productions: ids.iter().map(|&id| g.production(id).to_string()).collect(),
                    })
                    .collect(),
            })
            .collect();
        let conflicts = self
            .conflicts()
            .into_iter()
            .map(|c| (c.non_terminal, c.lookahead.to_string()))
            .collect();
        Ll1TableOutput {
            terminals: self.terminals().iter().map(|t| t.to_string()).collect(),
            rows,
            conflicts,
            ll1: self.is_ll1(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StepOutput {
    stack: String,
    input: String,
    action: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationOutput {
    input: String,
    accepted: bool,
    reason: Option<String>,
    steps: Vec<StepOutput>,
}

impl ValidationOutput {
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn to_plaintext(&self) -> String {
        let verdict = match &self.reason {
            None => format!("{} : accepted", self.input),
            Some(reason) => format!("{} : rejected: {}", self.input, reason),
        };
        if self.steps.is_empty() {
            return verdict;
        }
        let mut output: Vec<Vec<String>> =
            vec![vec!["stack".to_string(), "input".to_string(), "action".to_string()]];
        output.extend(
            self.steps
                .iter()
                .map(|s| vec![s.stack.clone(), s.input.clone(), s.action.clone()]),
        );
        format!("{}\n{}", align(&output), verdict)
    }

    pub fn to_latex(&self) -> String {
        let verdict = match &self.reason {
            None => "accepted".to_string(),
            Some(reason) => format!("rejected: {}", escape::tex(reason.as_str())),
        };
        let content = self
            .steps
            .iter()
            .map(|s| {
                format!(
                    "{} & {} & {}",
                    escape::tex(s.stack.as_str()),
                    escape::tex(s.input.as_str()),
                    escape::tex(s.action.as_str())
                )
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");
        format!(
            "\\begin{{tabular}}{{l|l|l}}\nStack & Input & Action\\\\\\hline\n{}\n\\end{{tabular}}\n\n\\texttt{{{}}}: {}",
            content,
            escape::tex(self.input.as_str()),
            verdict
        )
    }
}

impl Ll1Table<'_> {
    /// Validates `line`, keeping the step trace when `with_steps` is set.
    pub fn to_validation_output(&self, line: &str, with_steps: bool) -> ValidationOutput {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let trace: ParseTrace = self.trace(&tokens);
        let steps = if with_steps {
            trace
                .steps
                .iter()
                .map(|step| StepOutput {
                    stack: join_symbols(&step.stack),
                    input: join_symbols(&step.input),
                    action: match &step.action {
                        StepAction::Match(symbol) => format!("match {}", symbol),
                        StepAction::Expand(id) => self.grammar().production(*id).to_string(),
                        StepAction::Accept => "accept".to_string(),
                        StepAction::Reject(rejection) => format!("reject: {}", rejection),
                    },
                })
                .collect()
        } else {
            Vec::new()
        };
        ValidationOutput {
            input: tokens.join(" "),
            accepted: trace.accepted(),
            reason: trace.outcome.err().map(|r| r.to_string()),
            steps,
        }
    }
}
