mod cli;
mod error_handling;
mod generator;
mod grammar;
mod normalize;
mod parser;
mod writer;

use std::fmt::Display;
use std::process::ExitCode;

use clap::Parser;
use log::info;
use rand::thread_rng;

use cli::Cli;
use error_handling::Location;
use generator::GenerateError;
use normalize::NormalizeError;
use parser::{CompileError, CompileErrorType, CompileErrors};
use writer::OutputError;

// Everything that can stop a run, one variant per stage
enum Failure {
    Compile(CompileErrors),
    Normalize(NormalizeError),
    Generate(GenerateError),
    Output(OutputError),
}

impl From<CompileErrors> for Failure {
    fn from(errors: CompileErrors) -> Self {
        Failure::Compile(errors)
    }
}

impl From<NormalizeError> for Failure {
    fn from(error: NormalizeError) -> Self {
        Failure::Normalize(error)
    }
}

impl From<GenerateError> for Failure {
    fn from(error: GenerateError) -> Self {
        Failure::Generate(error)
    }
}

impl From<OutputError> for Failure {
    fn from(error: OutputError) -> Self {
        Failure::Output(error)
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Compile(errors) => {
                for error in errors {
                    writeln!(f, "{}", error)?;
                }
                write!(f, "{} error(s) in the grammar", errors.len())
            }
            Failure::Normalize(error) => write!(f, "{}", error),
            Failure::Generate(error) => write!(f, "{}", error),
            Failure::Output(error) => write!(f, "{}", error),
        }
    }
}

fn run(cli: &Cli) -> Result<(), Failure> {
    let mut grammar = parser::parse_file(&cli.file)?;
    if let Some(start) = cli.start {
        if !grammar.contains_rule(start) {
            return Err(Failure::Compile(vec![CompileError {
                location: Location::file(cli.file.clone()),
                error: CompileErrorType::UndefinedNonterminal(start)
            }]));
        }
        grammar.start_symbol = start;
    }
    info!("Read {} rules from {}, axiom {}", grammar.len(), cli.file.display(), grammar.start_symbol);

    let base = cli.output_base();
    let mut rng = thread_rng();

    for &form in cli.form.forms() {
        let normalized = form.normalize(grammar.clone())?;
        let path = writer::save(&normalized, &base, form)?;

        if let Some(max_len) = cli.words {
            let words = generator::enumerate(&normalized, max_len);
            writer::save_words(&words, &writer::output_path(&path, "words"))?;
        }

        if let Some(amount) = cli.amount {
            for sentence in generator::sample(&normalized, &mut rng, amount as usize, cli.depth, &path)? {
                println!("{}", sentence);
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("{}", failure);
            ExitCode::FAILURE
        }
    }
}
