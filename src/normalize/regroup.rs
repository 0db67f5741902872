use std::collections::HashMap;

use log::debug;

use crate::grammar::*;

/// Merges rules that derive nothing but the same single terminal.
///
/// The first such rule for each terminal is kept and every reference to a
/// duplicate is pointed at it. The axiom is never merged away.
pub fn regroup_terminals(mut grammar: Grammar) -> Grammar {
    let mut kept: HashMap<char, Nonterminal> = HashMap::new();
    let mut merged: HashMap<Nonterminal, Nonterminal> = HashMap::new();

    for rule in grammar.rules() {
        if rule.symbol == grammar.start_symbol {
            continue;
        }
        let [production] = rule.productions() else {
            continue;
        };
        let Some(terminal) = production.as_terminal() else {
            continue;
        };

        match kept.get(&terminal) {
            Some(&canonical) => {
                debug!("{} duplicates {} : {}", rule.symbol, canonical, terminal);
                merged.insert(rule.symbol, canonical);
            }
            None => {
                kept.insert(terminal, rule.symbol);
            }
        }
    }

    if merged.is_empty() {
        return grammar;
    }

    grammar.retain_rules(|rule| !merged.contains_key(&rule.symbol));
    for rule in grammar.rules_mut() {
        rule.map_productions(|production| production.rename(|n| merged.get(&n).copied().unwrap_or(n)));
    }

    grammar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::testing::grammar;

    #[test]
    fn duplicates_point_to_the_first_rule() {
        let result = regroup_terminals(grammar("S0 : A0 B0 | C0 A0\nA0 : a\nB0 : b\nC0 : a"));

        assert_eq!(result.to_string(), "S0 : A0B0 | A0A0\nA0 : a\nB0 : b\n");
    }

    #[test]
    fn regrouping_twice_changes_nothing() {
        let once = regroup_terminals(grammar("S0 : A0 B0 | C0 D0\nA0 : a\nB0 : b\nC0 : a\nD0 : b | c"));
        let twice = regroup_terminals(once.clone());

        assert_eq!(once, twice);
        assert_eq!(once.to_string(), "S0 : A0B0 | A0D0\nA0 : a\nB0 : b\nD0 : b | c\n");
    }

    #[test]
    fn merged_references_collapse() {
        let result = regroup_terminals(grammar("S0 : A0 A0 | B0 A0 | A0 B0\nA0 : a\nB0 : a"));

        assert_eq!(result.to_string(), "S0 : A0A0\nA0 : a\n");
    }

    #[test]
    fn axiom_is_never_merged() {
        let original = grammar("S0 : a\nA0 : a");

        assert_eq!(regroup_terminals(original.clone()), original);
    }
}
