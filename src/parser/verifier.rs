use std::collections::HashSet;

use crate::grammar::Nonterminal;
use super::CompileErrorType::UndefinedNonterminal;
use super::{CompileError, CompileErrors, FileResult, Location, Production, RuleLine};

fn get_production_undefined_symbols(production: &Production, location: &Location, defined: &HashSet<Nonterminal>) -> CompileErrors {
    production.nonterminals()
        .filter(|symbol| !defined.contains(symbol))
        .map(|symbol| CompileError {
            location: location.to_owned(),
            error: UndefinedNonterminal(symbol)
        })
        .collect()
}

fn get_line_undefined_symbols(line: &RuleLine, defined: &HashSet<Nonterminal>) -> CompileErrors {
    // Get the undefined nonterminals in each production, while flattening
    // into all the undefined nonterminals on the line
    line.productions.iter()
        .flat_map(|production| get_production_undefined_symbols(production, &line.location, defined))
        .collect()
}

// Every non-terminal used on a right hand side must be defined by some line,
// so that no pass ever meets a dangling reference
pub fn verify_rules(lines: &[RuleLine]) -> FileResult<()> {
    let defined: HashSet<Nonterminal> = lines.iter().map(|line| line.symbol).collect();

    let errors: CompileErrors = lines.iter()
        .flat_map(|line| get_line_undefined_symbols(line, &defined))
        .collect();

    if errors.len() > 0 {
        Err(errors)
    } else {
        Ok(())
    }
}
