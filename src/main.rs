//! ll1-helper command line interface
//!
//! Usage:
//!   ll1-helper nff ll1 -f grammar.txt
//!   ll1-helper validate -i "a b c" -i "( c )" -t < grammar.txt

use std::{fs, io::Read, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};

use ll1_helper::{FirstFollow, Grammar, Ll1Table};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Productions
    Prod,
    /// Nullable, first and follow sets
    Nff,
    /// LL(1) parsing table cells, conflicts and verdict
    Ll1,
    /// LL(1) parsing table as a grid
    Grid,
    /// Validate the inputs given with -i
    Validate,
}

#[derive(Parser, Debug)]
#[command(name = "ll1-helper")]
#[command(version)]
#[command(about = "FIRST/FOLLOW sets, LL(1) tables and predictive parsing", long_about = None)]
struct Cli {
    /// What to print
    #[arg(value_enum, required = true, num_args = 1..)]
    outputs: Vec<Output>,

    /// Grammar file (defaults to stdin)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Whitespace separated tokens to validate (repeatable)
    #[arg(short, long = "input", value_name = "TOKENS")]
    inputs: Vec<String>,

    /// Print the parser steps of each validation
    #[arg(short, long)]
    trace: bool,

    /// Print in LaTeX format
    #[arg(short = 'l', long, conflicts_with = "json")]
    latex: bool,

    /// Print in JSON format
    #[arg(short = 'j', long)]
    json: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let output_format = if cli.latex {
        OutputFormat::LaTeX
    } else if cli.json {
        OutputFormat::JSON
    } else {
        OutputFormat::Plain
    };

    let input = match &cli.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read grammar from stdin")?;
            buf
        }
    };

    let g = Grammar::parse(&input).context("Malformed grammar")?;
    info!(
        "parsed {} productions, start symbol {}",
        g.productions().len(),
        g.start_symbol()
    );

    let ff = FirstFollow::compute(&g);
    let table = Ll1Table::build(&ff);

    if cli.outputs.contains(&Output::Validate) && cli.inputs.is_empty() {
        bail!("validate needs at least one -i input");
    }

    for output in &cli.outputs {
        debug!("printing {:?}", output);
        let text = match output {
            Output::Prod => {
                let t = g.to_production_output_vec();
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => serde_json::to_string(&t)?,
                }
            }
            Output::Nff => {
                let t = ff.to_non_terminal_output_vec();
                match output_format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => t.to_json()?,
                }
            }
            Output::Ll1 | Output::Grid => {
                let t = table.to_output();
                match output_format {
                    OutputFormat::Plain if *output == Output::Grid => t.to_grid(),
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => serde_json::to_string(&t)?,
                }
            }
            Output::Validate => {
                let mut texts = Vec::new();
                for line in &cli.inputs {
                    let t = table.to_validation_output(line, cli.trace);
                    texts.push(match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::JSON => serde_json::to_string(&t)?,
                    });
                }
                texts.join("\n")
            }
        };
        println!("{}", text);
    }

    Ok(())
}
