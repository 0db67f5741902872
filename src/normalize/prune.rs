use std::collections::{HashSet, VecDeque};

use itertools::Itertools;
use log::debug;

use crate::grammar::*;

pub fn reachable(grammar: &Grammar) -> HashSet<Nonterminal> {
    let mut seen = HashSet::from([grammar.start_symbol]);
    let mut queue = VecDeque::from([grammar.start_symbol]);

    while let Some(symbol) = queue.pop_front() {
        let Some(rule) = grammar.rule(symbol) else {
            continue;
        };
        for next in rule.productions().iter().flat_map(Production::nonterminals) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen
}

/// Drops every rule the axiom can never reach.
pub fn remove_unreachable(mut grammar: Grammar) -> Grammar {
    let reachable = reachable(&grammar);

    let unreachable = grammar.rules().iter()
        .map(|rule| rule.symbol)
        .filter(|symbol| !reachable.contains(symbol))
        .collect_vec();
    if !unreachable.is_empty() {
        debug!("dropping unreachable rules {}", unreachable.iter().join(", "));
        grammar.retain_rules(|rule| reachable.contains(&rule.symbol));
    }

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::testing::{grammar, nt};

    #[test]
    fn unreachable_rules_are_dropped() {
        let result = remove_unreachable(grammar("S0 : a A0\nA0 : b | A0 c\nB0 : C0\nC0 : B0 | d"));

        assert_eq!(result.to_string(), "S0 : aA0\nA0 : b | A0c\n");
    }

    #[test]
    fn reachability_follows_every_position() {
        let result = reachable(&grammar("S0 : a A0 B0\nA0 : a\nB0 : b C0\nC0 : c\nD0 : d"));

        assert_eq!(result, HashSet::from([nt("S0"), nt("A0"), nt("B0"), nt("C0")]));
    }
}
