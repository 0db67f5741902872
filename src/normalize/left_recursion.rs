use log::debug;

use crate::grammar::*;
use super::{allocate, NormalizeResult, Pass};

/// Whether some rule has a production starting with its own symbol.
pub fn has_left_recursion(grammar: &Grammar) -> bool {
    grammar.productions().any(|(owner, production)| production.starts_with(owner))
}

/// Removes immediate left recursion.
///
/// `A : Aa | b` becomes `A : bA'` and `A' : aA' | E` with a fresh `A'`.
/// Recursion through other rules (`A : Ba`, `B : Ab`) is left alone.
pub fn eliminate_left_recursion(mut grammar: Grammar, fresh: &mut FreshSymbols) -> NormalizeResult<Grammar> {
    let symbols: Vec<Nonterminal> = grammar.rules().iter().map(|rule| rule.symbol).collect();

    for symbol in symbols {
        let Some(rule) = grammar.rule(symbol) else {
            continue;
        };

        let (recursive, others): (Vec<Production>, Vec<Production>) = rule.productions()
            .iter()
            .cloned()
            .partition(|production| production.starts_with(symbol));
        if recursive.is_empty() {
            continue;
        }

        // `A : A` adds nothing and would only turn into `A' : A'`
        let tails: Vec<Production> = recursive.iter()
            .map(|production| production.suffix(1))
            .filter(|tail| !tail.is_epsilon())
            .collect();
        if tails.is_empty() {
            if let Some(rule) = grammar.rule_mut(symbol) {
                rule.set_productions(others);
            }
            continue;
        }

        let repeat = allocate(fresh, &grammar, Pass::LeftRecursion, symbol)?;
        let repeat_tail = Production::nonterminal(repeat);
        debug!("{} is left recursive, moving the recursion into {}", symbol, repeat);

        if let Some(rule) = grammar.rule_mut(symbol) {
            rule.set_productions(others.iter().map(|production| production.concat(&repeat_tail)));
        }

        let mut repeat_rule = Rule::with_productions(repeat, tails.iter().map(|tail| tail.concat(&repeat_tail)));
        repeat_rule.push(Production::epsilon());
        grammar.push_rule(repeat_rule);
    }

    Ok(grammar)
}
