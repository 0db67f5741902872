use log::debug;

use crate::grammar::*;
use super::{allocate, NormalizeResult, Pass};

/// Makes sure the axiom never occurs on a right hand side.
///
/// The old axiom rule is renamed to a fresh symbol `S'`, every occurrence is
/// rewritten to `S'`, and a new first rule `S : S'` keeps the axiom name.
pub fn isolate_axiom(mut grammar: Grammar, fresh: &mut FreshSymbols) -> NormalizeResult<Grammar> {
    let axiom = grammar.start_symbol;
    if !grammar.is_referenced(axiom) {
        return Ok(grammar);
    }

    let renamed = allocate(fresh, &grammar, Pass::AxiomIsolation, axiom)?;
    debug!("axiom {} appears on a right hand side, its rule becomes {}", axiom, renamed);

    for rule in grammar.rules_mut() {
        if rule.symbol == axiom {
            rule.symbol = renamed;
        }
        rule.map_productions(|production| production.replace(axiom, renamed));
    }
    grammar.insert_rule(0, Rule::with_productions(axiom, [Production::nonterminal(renamed)]));

    Ok(grammar)
}
