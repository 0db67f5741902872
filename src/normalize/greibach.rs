use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use log::{debug, trace};

use crate::grammar::*;
use super::{fail, terminal_standin, NormalizeErrorType, NormalizeResult, Pass};

fn leading_nonterminals(grammar: &Grammar, symbol: Nonterminal) -> Vec<Nonterminal> {
    grammar.rule(symbol)
        .map(|rule| rule.productions().iter()
            .filter_map(|production| production.first()?.as_nonterminal())
            .unique()
            .collect())
        .unwrap_or_default()
}

fn visit(grammar: &Grammar, symbol: Nonterminal, path: &mut Vec<Nonterminal>, finished: &mut HashSet<Nonterminal>) -> Option<Vec<Nonterminal>> {
    if finished.contains(&symbol) {
        return None;
    }
    if let Some(start) = path.iter().position(|n| *n == symbol) {
        let mut cycle = path[start..].to_vec();
        cycle.push(symbol);
        return Some(cycle);
    }

    path.push(symbol);
    for head in leading_nonterminals(grammar, symbol) {
        if let Some(cycle) = visit(grammar, head, path, finished) {
            return Some(cycle);
        }
    }
    path.pop();
    finished.insert(symbol);

    None
}

// A loop of rules each starting with the next one, e.g. [A0, B0, A0]. Head
// substitution never terminates on such a loop
fn find_head_cycle(grammar: &Grammar) -> Option<Vec<Nonterminal>> {
    let mut finished = HashSet::new();
    grammar.rules().iter()
        .find_map(|rule| visit(grammar, rule.symbol, &mut Vec::new(), &mut finished))
}

/// Substitutes leading non-terminals until every production starts with a
/// terminal (or is the axiom's epsilon).
///
/// Needs a grammar without left recursion, direct or indirect, and without
/// epsilon or unit productions outside the axiom. A cycle of leading
/// non-terminals is reported instead of looping.
pub fn eliminate_heads(mut grammar: Grammar) -> NormalizeResult<Grammar> {
    if let Some(cycle) = find_head_cycle(&grammar) {
        return Err(fail(Pass::HeadElimination, cycle.first().copied(), NormalizeErrorType::LeftRecursionCycle(cycle)));
    }

    loop {
        let mut changed = false;

        for index in 0..grammar.len() {
            let symbol = grammar.rule_at(index).symbol;

            let mut position = 0;
            while position < grammar.rule_at(index).productions().len() {
                let production = grammar.rule_at(index).productions()[position].clone();
                let Some(Symbol::Nonterminal(head)) = production.first() else {
                    position += 1;
                    continue;
                };

                let substitutes = match grammar.rule(head) {
                    Some(rule) => rule.productions().to_vec(),
                    None => return Err(fail(Pass::HeadElimination, Some(symbol), NormalizeErrorType::UndefinedNonterminal(head)))
                };
                trace!("{}: expanding the head of `{}` into {} alternatives", symbol, production, substitutes.len());

                // The next production slides into `position`, so it is not advanced
                let rest = production.suffix(1);
                let rule = grammar.rule_at_mut(index);
                rule.remove(position);
                rule.extend(substitutes.iter().map(|substitute| substitute.concat(&rest)));
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    Ok(grammar)
}

/// Replaces every terminal after the first symbol of a production by a
/// non-terminal deriving just that terminal.
pub fn reorder_terminals(mut grammar: Grammar, fresh: &mut FreshSymbols) -> NormalizeResult<Grammar> {
    let mut standins = HashMap::new();

    for index in 0..grammar.len() {
        let symbol = grammar.rule_at(index).symbol;
        let productions = grammar.rule_at(index).productions().to_vec();
        if !productions.iter().any(|production| production.symbols().iter().skip(1).any(Symbol::is_terminal)) {
            continue;
        }

        let mut rewritten = Vec::with_capacity(productions.len());
        for production in productions {
            let mut symbols = Vec::with_capacity(production.len());
            for (position, &symbol_in_production) in production.symbols().iter().enumerate() {
                symbols.push(match symbol_in_production {
                    Symbol::Terminal(c) if position > 0 => Symbol::Nonterminal(
                        terminal_standin(&mut grammar, &mut standins, c, fresh, Pass::TerminalReordering, symbol)?
                    ),
                    other => other
                });
            }
            rewritten.push(Production::new(symbols));
        }

        grammar.rule_at_mut(index).set_productions(rewritten);
    }

    debug!("{} terminals given a standin", standins.len());
    Ok(grammar)
}
