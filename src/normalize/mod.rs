/*
    This module rewrites grammars into Chomsky and Greibach normal form
*/

mod axiom;
mod chomsky;
mod epsilon;
mod factor;
mod greibach;
mod left_recursion;
mod prune;
mod regroup;
mod unit;
mod validate;

use std::collections::HashMap;
use std::fmt::Display;

use itertools::Itertools;
use log::{debug, info};

use crate::error_handling::*;
use crate::grammar::*;

pub use axiom::isolate_axiom;
pub use chomsky::{binarize, isolate_terminals};
pub use epsilon::eliminate_epsilon;
pub use factor::factor_prefixes;
pub use greibach::{eliminate_heads, reorder_terminals};
pub use left_recursion::{eliminate_left_recursion, has_left_recursion};
pub use prune::remove_unreachable;
pub use regroup::regroup_terminals;
pub use unit::eliminate_units;
pub use validate::{check_chomsky, check_greibach, Violation};
#[cfg(test)]
pub use validate::{is_chomsky, is_greibach};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    EpsilonElimination,
    UnitElimination,
    LeftRecursion,
    Factoring,
    AxiomIsolation,
    TerminalIsolation,
    Binarization,
    HeadElimination,
    TerminalReordering,
    TerminalRegrouping,
    Pruning,
    Validation,
}

impl Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Pass::EpsilonElimination => "epsilon elimination",
            Pass::UnitElimination => "unit rule elimination",
            Pass::LeftRecursion => "left recursion elimination",
            Pass::Factoring => "prefix factoring",
            Pass::AxiomIsolation => "axiom isolation",
            Pass::TerminalIsolation => "terminal isolation",
            Pass::Binarization => "binarization",
            Pass::HeadElimination => "head elimination",
            Pass::TerminalReordering => "terminal reordering",
            Pass::TerminalRegrouping => "terminal regrouping",
            Pass::Pruning => "pruning",
            Pass::Validation => "validation",
        };
        write!(f, "{}", name)
    }
}

// Where a transformation failed: the pass and, if known, the rule it was
// rewriting
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub pass: Pass,
    pub rule: Option<Nonterminal>
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.rule {
            Some(rule) => write!(f, "{} of {}", self.pass, rule),
            None => write!(f, "{}", self.pass)
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum NormalizeErrorType {
    // Every identifier from A0 to Z9 is taken
    SymbolSpaceExhausted,
    // A production names a non-terminal without a rule
    UndefinedNonterminal(Nonterminal),
    // Leading non-terminals loop back on themselves, e.g. A0 : B0a, B0 : A0b,
    // or a rule still starts with itself (the cycle is then [A0, A0])
    LeftRecursionCycle(Vec<Nonterminal>),
    // The finished grammar failed its normal form check
    NotNormalized(Violation),
}

impl ErrorType for NormalizeErrorType {}

impl Display for NormalizeErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeErrorType::SymbolSpaceExhausted => write!(f, "Ran out of fresh nonterminals (A0 to Z9 are all in use)"),
            NormalizeErrorType::UndefinedNonterminal(nonterminal) => write!(f, "No definition for nonterminal `{}`", nonterminal),
            NormalizeErrorType::LeftRecursionCycle(cycle) if cycle.len() == 2 => write!(f, "Left recursion of `{}` on itself survived epsilon and unit elimination", cycle[0]),
            NormalizeErrorType::LeftRecursionCycle(cycle) => write!(f, "Indirect left recursion through {}", cycle.iter().join(" -> ")),
            NormalizeErrorType::NotNormalized(violation) => write!(f, "{}", violation),
        }
    }
}

pub type NormalizeError = Error<NormalizeErrorType, Stage>;
pub type NormalizeResult<T> = Result<T, NormalizeError>;

fn fail(pass: Pass, rule: Option<Nonterminal>, error: NormalizeErrorType) -> NormalizeError {
    NormalizeError {
        location: Stage { pass, rule },
        error
    }
}

// Draws a fresh non-terminal for `rule`, turning exhaustion into a
// diagnostic that names the pass
fn allocate(fresh: &mut FreshSymbols, grammar: &Grammar, pass: Pass, rule: Nonterminal) -> NormalizeResult<Nonterminal> {
    fresh.next(grammar)
        .map_err(|SymbolSpaceExhausted| fail(pass, Some(rule), NormalizeErrorType::SymbolSpaceExhausted))
}

// The non-terminal standing in for `terminal`, creating a `N : terminal`
// rule the first time a pass asks for it
fn terminal_standin(grammar: &mut Grammar, standins: &mut HashMap<char, Nonterminal>, terminal: char, fresh: &mut FreshSymbols, pass: Pass, rule: Nonterminal) -> NormalizeResult<Nonterminal> {
    if let Some(&standin) = standins.get(&terminal) {
        return Ok(standin);
    }

    let standin = allocate(fresh, grammar, pass, rule)?;
    grammar.push_rule(Rule::with_productions(standin, [Production::terminal(terminal)]));
    standins.insert(terminal, standin);
    Ok(standin)
}

// Passes assume every referenced non-terminal has a rule
fn check_references(grammar: &Grammar) -> NormalizeResult<()> {
    match grammar.undefined_references().first() {
        Some(&(owner, missing)) => Err(fail(Pass::Validation, Some(owner), NormalizeErrorType::UndefinedNonterminal(missing))),
        None => Ok(())
    }
}

fn traced(pass: Pass, grammar: Grammar) -> Grammar {
    debug!("after {} ({} rules, {} productions):\n{}", pass, grammar.len(), grammar.production_count(), grammar);
    grammar
}

pub fn to_chomsky(grammar: Grammar) -> NormalizeResult<Grammar> {
    to_chomsky_with(grammar, &mut FreshSymbols::new())
}

pub fn to_chomsky_with(grammar: Grammar, fresh: &mut FreshSymbols) -> NormalizeResult<Grammar> {
    info!("Converting {} rules to Chomsky normal form", grammar.len());
    check_references(&grammar)?;

    let grammar = traced(Pass::LeftRecursion, eliminate_left_recursion(grammar, fresh)?);
    let grammar = traced(Pass::Factoring, factor_prefixes(grammar, fresh)?);
    let grammar = traced(Pass::AxiomIsolation, isolate_axiom(grammar, fresh)?);
    let grammar = traced(Pass::TerminalIsolation, isolate_terminals(grammar, fresh)?);
    let grammar = traced(Pass::Binarization, binarize(grammar, fresh)?);
    let grammar = traced(Pass::EpsilonElimination, eliminate_epsilon(grammar));
    let grammar = traced(Pass::UnitElimination, eliminate_units(grammar));
    let grammar = traced(Pass::TerminalRegrouping, regroup_terminals(grammar));
    let mut grammar = traced(Pass::Pruning, remove_unreachable(grammar));
    grammar.lead_with_axiom();

    info!("Chomsky normal form has {} rules after {} fresh nonterminals", grammar.len(), fresh.issued().len());
    Ok(grammar)
}

/// Converts to Greibach normal form.
///
/// Only immediate left recursion is removed, including the kind epsilon
/// elimination exposes. Recursion through other rules (`A0 : B0a`,
/// `B0 : A0b`) fails with `LeftRecursionCycle`, as does left recursion that
/// is still there after the second round.
pub fn to_greibach(grammar: Grammar) -> NormalizeResult<Grammar> {
    to_greibach_with(grammar, &mut FreshSymbols::new())
}

pub fn to_greibach_with(grammar: Grammar, fresh: &mut FreshSymbols) -> NormalizeResult<Grammar> {
    info!("Converting {} rules to Greibach normal form", grammar.len());
    check_references(&grammar)?;

    let grammar = traced(Pass::Factoring, factor_prefixes(grammar, fresh)?);
    let grammar = traced(Pass::LeftRecursion, eliminate_left_recursion(grammar, fresh)?);
    let grammar = traced(Pass::AxiomIsolation, isolate_axiom(grammar, fresh)?);
    let grammar = traced(Pass::EpsilonElimination, eliminate_epsilon(grammar));
    let grammar = traced(Pass::UnitElimination, eliminate_units(grammar));

    // Dropping a nullable head can expose new left recursion (`A : BAa` with
    // nullable B gives `A : Aa`), so that case gets one more round
    let grammar = if has_left_recursion(&grammar) {
        debug!("epsilon elimination exposed left recursion");
        let grammar = traced(Pass::LeftRecursion, eliminate_left_recursion(grammar, fresh)?);
        let grammar = traced(Pass::EpsilonElimination, eliminate_epsilon(grammar));
        traced(Pass::UnitElimination, eliminate_units(grammar))
    } else {
        grammar
    };

    let grammar = traced(Pass::HeadElimination, eliminate_heads(grammar)?);
    let grammar = traced(Pass::TerminalReordering, reorder_terminals(grammar, fresh)?);
    let grammar = traced(Pass::TerminalRegrouping, regroup_terminals(grammar));
    let mut grammar = traced(Pass::Pruning, remove_unreachable(grammar));
    grammar.lead_with_axiom();

    info!("Greibach normal form has {} rules after {} fresh nonterminals", grammar.len(), fresh.issued().len());
    Ok(grammar)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalForm {
    Chomsky,
    Greibach,
}

impl NormalForm {
    // Suffix of the file the grammar is saved to
    pub fn extension(self) -> &'static str {
        match self {
            NormalForm::Chomsky => "chomsky",
            NormalForm::Greibach => "greibach",
        }
    }

    pub fn check(self, grammar: &Grammar) -> Result<(), Violation> {
        match self {
            NormalForm::Chomsky => check_chomsky(grammar),
            NormalForm::Greibach => check_greibach(grammar),
        }
    }

    /// Runs the pipeline for this form and refuses a result that does not
    /// pass its validator.
    pub fn normalize(self, grammar: Grammar) -> NormalizeResult<Grammar> {
        let normalized = match self {
            NormalForm::Chomsky => to_chomsky(grammar)?,
            NormalForm::Greibach => to_greibach(grammar)?,
        };

        self.check(&normalized)
            .map_err(|violation| fail(Pass::Validation, Some(violation.rule), NormalizeErrorType::NotNormalized(violation)))?;

        Ok(normalized)
    }
}

impl Display for NormalForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalForm::Chomsky => write!(f, "Chomsky"),
            NormalForm::Greibach => write!(f, "Greibach"),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use crate::grammar::{Grammar, Nonterminal};
    use crate::parser::parse_str;

    pub fn grammar(text: &str) -> Grammar {
        parse_str(text, Path::new("inline")).unwrap()
    }

    pub fn nt(text: &str) -> Nonterminal {
        Nonterminal::parse(text).unwrap()
    }
}
