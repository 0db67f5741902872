use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;

use crate::grammar::Nonterminal;
use crate::normalize::NormalForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Chomsky,
    Greibach,
    Both,
}

impl Target {
    pub fn forms(self) -> &'static [NormalForm] {
        match self {
            Target::Chomsky => &[NormalForm::Chomsky],
            Target::Greibach => &[NormalForm::Greibach],
            Target::Both => &[NormalForm::Chomsky, NormalForm::Greibach],
        }
    }
}

fn parse_nonterminal(text: &str) -> Result<Nonterminal, String> {
    Nonterminal::parse(text)
        .ok_or_else(|| format!("`{}` is not a nonterminal (an uppercase letter and a digit)", text))
}

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Base name of the output files (default: FILE without its extension)
    #[arg(short, long, value_name = "BASE")]
    pub output: Option<PathBuf>,

    /// Normal form to produce
    #[arg(short, long, value_enum, default_value_t = Target::Both)]
    pub form: Target,

    /// Start symbol (default: first in the file)
    #[arg(short, long, value_name = "SYMBOL", value_parser = parse_nonterminal)]
    pub start: Option<Nonterminal>,

    /// Also write every word up to this length to BASE.<form>.words
    #[arg(short, long, value_name = "LEN")]
    pub words: Option<usize>,

    /// Random sentences to print from each normalized grammar (default: none)
    #[arg(short = 'n', long, value_name = "AMOUNT")]
    pub amount: Option<u32>,

    /// Deepest derivation tried for random sentences
    #[arg(short, long, value_name = "DEPTH", default_value_t = 64)]
    pub depth: usize,

    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG overrides it
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn output_base(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.file.with_extension(""))
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
