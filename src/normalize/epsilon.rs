use std::collections::HashSet;

use itertools::Itertools;
use log::debug;

use crate::grammar::*;

/// Non-terminals that can derive the empty string.
pub fn nullable_set(grammar: &Grammar) -> HashSet<Nonterminal> {
    let mut nullable = HashSet::new();

    // Each sweep either marks a new rule or stops, so at most one sweep per rule
    loop {
        let before = nullable.len();

        for rule in grammar.rules() {
            if nullable.contains(&rule.symbol) {
                continue;
            }
            let derives_empty = rule.productions().iter().any(|production| {
                production.symbols().iter().all(|symbol| match symbol {
                    Symbol::Nonterminal(n) => nullable.contains(n),
                    Symbol::Terminal(_) => false,
                    Symbol::Epsilon => true
                })
            });
            if derives_empty {
                nullable.insert(rule.symbol);
            }
        }

        if nullable.len() == before {
            return nullable;
        }
    }
}

// Adds every production obtained by leaving out nullable occurrences. New
// variants are appended and scanned in turn, which covers every subset
fn add_variants(rule: &mut Rule, nullable: &HashSet<Nonterminal>) {
    let mut index = 0;
    while index < rule.productions().len() {
        let production = rule.productions()[index].clone();

        for (position, symbol) in production.symbols().iter().enumerate() {
            if matches!(symbol, Symbol::Nonterminal(n) if nullable.contains(n)) {
                let variant = production.without(position);
                if !variant.is_epsilon() {
                    rule.push(variant);
                }
            }
        }

        index += 1;
    }
}

// Drops rules left without productions, then every production that still
// mentions one of them. Repeats since that can empty further rules
fn remove_empty_rules(grammar: &mut Grammar) {
    let axiom = grammar.start_symbol;

    loop {
        let empty: HashSet<Nonterminal> = grammar.rules().iter()
            .filter(|rule| rule.is_empty() && rule.symbol != axiom)
            .map(|rule| rule.symbol)
            .collect();
        if empty.is_empty() {
            return;
        }

        debug!("removing rules without productions: {}", empty.iter().sorted().join(", "));
        grammar.retain_rules(|rule| !empty.contains(&rule.symbol));
        for rule in grammar.rules_mut() {
            rule.retain(|production| !production.nonterminals().any(|n| empty.contains(&n)));
        }
    }
}

/// Removes epsilon productions from every rule but the axiom, which keeps
/// (or gains) one exactly when it could derive the empty string before.
pub fn eliminate_epsilon(mut grammar: Grammar) -> Grammar {
    let axiom = grammar.start_symbol;
    let nullable = nullable_set(&grammar);
    debug!("nullable nonterminals: {}", nullable.iter().sorted().join(", "));

    for rule in grammar.rules_mut() {
        add_variants(rule, &nullable);
    }

    for rule in grammar.rules_mut() {
        if rule.symbol != axiom {
            rule.retain(|production| !production.is_epsilon());
        }
    }

    remove_empty_rules(&mut grammar);

    if nullable.contains(&axiom) {
        if let Some(rule) = grammar.rule_mut(axiom) {
            rule.push(Production::epsilon());
        }
    }

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::testing::{grammar, nt};

    #[test]
    fn finds_indirectly_nullable_rules() {
        let original = grammar("S0 : A0 B0 | a\nA0 : E | a\nB0 : A0 A0 | b\nC0 : A0 c");
        let nullable = nullable_set(&original);

        assert_eq!(nullable, HashSet::from([nt("S0"), nt("A0"), nt("B0")]));
    }

    #[test]
    fn epsilon_moves_to_the_axiom() {
        let result = eliminate_epsilon(grammar("S0 : A0 B0 | a\nA0 : a A0 | E\nB0 : b | E"));

        assert_eq!(result.to_string(), "S0 : A0B0 | a | B0 | A0 | E\nA0 : aA0 | a\nB0 : b\n");
    }

    #[test]
    fn every_subset_of_nullable_occurrences_is_dropped() {
        let result = eliminate_epsilon(grammar("S0 : a A0 b A0 c\nA0 : d | E"));

        assert_eq!(result.rule(nt("S0")).unwrap().productions().len(), 4);
        assert_eq!(result.to_string(), "S0 : aA0bA0c | abA0c | aA0bc | abc\nA0 : d\n");
    }

    #[test]
    fn non_nullable_axiom_gets_no_epsilon() {
        let result = eliminate_epsilon(grammar("S0 : a A0\nA0 : b | E"));

        assert!(!result.rule(nt("S0")).unwrap().has_epsilon());
        assert!(!result.rule(nt("A0")).unwrap().has_epsilon());
    }

    #[test]
    fn rules_that_only_derived_epsilon_disappear() {
        let result = eliminate_epsilon(grammar("S0 : a A0 | b\nA0 : E"));

        assert_eq!(result.to_string(), "S0 : b | a\n");
        assert!(result.undefined_references().is_empty());
    }

    #[test]
    fn existing_axiom_epsilon_is_not_duplicated() {
        let result = eliminate_epsilon(grammar("S0 : E | a S0"));

        assert_eq!(result.to_string(), "S0 : E | aS0 | a\n");
    }
}
