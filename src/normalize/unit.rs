use itertools::Itertools;
use log::trace;

use crate::grammar::*;

// Non-unit productions of `symbol` and of everything it reaches through unit
// productions, in breadth first order. Each rule is visited once, so unit
// cycles such as A0 : B0, B0 : A0 end after one round
fn unit_closure(grammar: &Grammar, symbol: Nonterminal) -> Vec<Production> {
    let mut reached = vec![symbol];
    let mut productions = Vec::new();
    let mut index = 0;

    while index < reached.len() {
        let current = reached[index];
        index += 1;

        let Some(rule) = grammar.rule(current) else {
            continue;
        };
        for production in rule.productions() {
            match production.as_unit() {
                Some(target) if !reached.contains(&target) => reached.push(target),
                Some(_) => {},
                None => productions.push(production.clone())
            }
        }
    }

    if reached.len() > 1 {
        trace!("{} inherits from {}", symbol, reached[1..].iter().join(", "));
    }
    productions
}

/// Replaces every `A : B` by the productions of `B`.
pub fn eliminate_units(grammar: Grammar) -> Grammar {
    let rules: Vec<Rule> = grammar.rules().iter()
        .map(|rule| Rule::with_productions(rule.symbol, unit_closure(&grammar, rule.symbol)))
        .collect();

    Grammar::from_rules(grammar.start_symbol, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::testing::grammar;

    #[test]
    fn chains_are_followed() {
        let result = eliminate_units(grammar("A0 : B0 | a\nB0 : C0 | b\nC0 : c | cc"));

        assert_eq!(result.to_string(), "A0 : a | b | c | cc\nB0 : b | c | cc\nC0 : c | cc\n");
    }

    #[test]
    fn cycles_terminate() {
        let result = eliminate_units(grammar("S0 : A0 | bS0\nA0 : B0\nB0 : a | A0"));

        assert_eq!(result.to_string(), "S0 : bS0 | a\nA0 : a\nB0 : a\n");
    }

    #[test]
    fn self_unit_is_dropped() {
        let result = eliminate_units(grammar("S0 : S0 | a"));

        assert_eq!(result.to_string(), "S0 : a\n");
    }

    #[test]
    fn duplicates_are_skipped() {
        let result = eliminate_units(grammar("S0 : A0 | a | E\nA0 : a | bA0"));

        assert_eq!(result.to_string(), "S0 : a | E | bA0\nA0 : a | bA0\n");
    }
}
