use std::collections::HashMap;

use log::debug;

use crate::grammar::*;
use super::{allocate, terminal_standin, NormalizeResult, Pass};

/// Replaces the terminals of every production longer than one symbol by
/// non-terminals deriving just that terminal. `A : a` stays as it is.
pub fn isolate_terminals(mut grammar: Grammar, fresh: &mut FreshSymbols) -> NormalizeResult<Grammar> {
    let mut standins = HashMap::new();

    // Rules added below are all `N : a` and need no rewriting
    for index in 0..grammar.len() {
        let symbol = grammar.rule_at(index).symbol;
        let productions = grammar.rule_at(index).productions().to_vec();

        let mut rewritten = Vec::with_capacity(productions.len());
        for production in productions {
            if production.len() < 2 || !production.symbols().iter().any(Symbol::is_terminal) {
                rewritten.push(production);
                continue;
            }

            let mut symbols = Vec::with_capacity(production.len());
            for symbol_in_production in production.symbols() {
                symbols.push(match *symbol_in_production {
                    Symbol::Terminal(c) => Symbol::Nonterminal(
                        terminal_standin(&mut grammar, &mut standins, c, fresh, Pass::TerminalIsolation, symbol)?
                    ),
                    other => other
                });
            }
            rewritten.push(Production::new(symbols));
        }

        grammar.rule_at_mut(index).set_productions(rewritten);
    }

    Ok(grammar)
}

// Splits `X1 X2 ... Xn` (n > 2) into `X1 N1`, `N1 : X2 N2`, ...,
// `N(n-2) : X(n-1) Xn` and returns the new head production
fn split_production(grammar: &mut Grammar, production: &Production, owner: Nonterminal, fresh: &mut FreshSymbols) -> NormalizeResult<Production> {
    let symbols = production.symbols();
    let last = symbols.len() - 1;

    let mut link = allocate(fresh, grammar, Pass::Binarization, owner)?;
    let head = Production::new(vec![symbols[0], Symbol::Nonterminal(link)]);

    for &symbol in &symbols[1..last - 1] {
        let next = allocate(fresh, grammar, Pass::Binarization, owner)?;
        grammar.push_rule(Rule::with_productions(link, [Production::new(vec![symbol, Symbol::Nonterminal(next)])]));
        link = next;
    }
    grammar.push_rule(Rule::with_productions(link, [Production::new(vec![symbols[last - 1], symbols[last]])]));

    debug!("{}: split `{}` into {} binary rules", owner, production, last - 1);
    Ok(head)
}

/// Breaks every production of three or more symbols into a right-leaning
/// chain of two-symbol productions.
pub fn binarize(mut grammar: Grammar, fresh: &mut FreshSymbols) -> NormalizeResult<Grammar> {
    // Rules added by the split are binary already
    for index in 0..grammar.len() {
        let symbol = grammar.rule_at(index).symbol;
        let productions = grammar.rule_at(index).productions().to_vec();
        if productions.iter().all(|production| production.len() <= 2) {
            continue;
        }

        let mut rewritten = Vec::with_capacity(productions.len());
        for production in productions {
            if production.len() <= 2 {
                rewritten.push(production);
            } else {
                rewritten.push(split_production(&mut grammar, &production, symbol, fresh)?);
            }
        }

        grammar.rule_at_mut(index).set_productions(rewritten);
    }

    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::testing::grammar;

    #[test]
    fn terminals_in_long_productions_are_isolated() {
        let result = isolate_terminals(grammar("S0 : a S0 b | c | a b\nA0 : a"), &mut FreshSymbols::new()).unwrap();

        assert_eq!(result.to_string(), "S0 : Z9S0Z8 | c | Z9Z8\nA0 : a\nZ9 : a\nZ8 : b\n");
    }

    #[test]
    fn nonterminal_only_productions_are_untouched() {
        let original = grammar("S0 : A0 A0 | E\nA0 : a");
        let result = isolate_terminals(original.clone(), &mut FreshSymbols::new()).unwrap();

        assert_eq!(result, original);
    }

    #[test]
    fn long_productions_become_a_chain() {
        let result = binarize(grammar("S0 : A0 B0 C0 D0 | A0 B0\nA0 : a\nB0 : b\nC0 : c\nD0 : d"), &mut FreshSymbols::new()).unwrap();

        assert_eq!(
            result.to_string(),
            "S0 : A0Z9 | A0B0\nA0 : a\nB0 : b\nC0 : c\nD0 : d\nZ9 : B0Z8\nZ8 : C0D0\n"
        );
    }

    #[test]
    fn three_symbols_need_one_link() {
        let result = binarize(grammar("S0 : A0 S0 A0 | a\nA0 : a"), &mut FreshSymbols::new()).unwrap();

        assert_eq!(result.to_string(), "S0 : A0Z9 | a\nA0 : a\nZ9 : S0A0\n");
    }
}
