use log::debug;

use crate::grammar::*;
use super::{allocate, NormalizeResult, Pass};

// Scans pairs of productions of one rule in index order. Whenever a pair
// shares a prefix, the first becomes `prefix F`, the second is removed and the
// scan for the first restarts, since the merged production may share a
// (shorter) prefix with later ones
fn factor_rule(grammar: &mut Grammar, rule_index: usize, fresh: &mut FreshSymbols) -> NormalizeResult<()> {
    let symbol = grammar.rule_at(rule_index).symbol;

    let mut i = 0;
    while i < grammar.rule_at(rule_index).productions().len() {
        let mut j = i + 1;
        while j < grammar.rule_at(rule_index).productions().len() {
            let productions = grammar.rule_at(rule_index).productions();
            let (first, second) = (productions[i].clone(), productions[j].clone());

            let shared = first.common_prefix_len(&second);
            if shared == 0 {
                j += 1;
                continue;
            }

            let factored = allocate(fresh, grammar, Pass::Factoring, symbol)?;
            debug!("{}: `{}` and `{}` share `{}`, continuing in {}", symbol, first, second, first.prefix(shared), factored);

            grammar.push_rule(Rule::with_productions(factored, [first.suffix(shared), second.suffix(shared)]));

            let rule = grammar.rule_at_mut(rule_index);
            rule.remove(j);
            rule.replace(i, first.prefix(shared).append(Symbol::Nonterminal(factored)));
            j = i + 1;
        }
        i += 1;
    }

    Ok(())
}

/// Left-factors every rule, including the ones this pass creates.
pub fn factor_prefixes(mut grammar: Grammar, fresh: &mut FreshSymbols) -> NormalizeResult<Grammar> {
    let mut rule_index = 0;
    while rule_index < grammar.len() {
        factor_rule(&mut grammar, rule_index, fresh)?;
        rule_index += 1;
    }

    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::enumerate;
    use crate::normalize::testing::{grammar, nt};

    #[test]
    fn shared_prefix_is_pulled_out() {
        let result = factor_prefixes(grammar("X0 : abc | abd"), &mut FreshSymbols::new()).unwrap();

        assert_eq!(result.rule(nt("X0")).unwrap().productions().len(), 1);
        assert_eq!(result.to_string(), "X0 : abZ9\nZ9 : c | d\n");
    }

    #[test]
    fn three_way_prefix_is_factored_pairwise() {
        let original = grammar("X0 : abc | abd | a");
        let result = factor_prefixes(original.clone(), &mut FreshSymbols::new()).unwrap();

        assert_eq!(result.to_string(), "X0 : aZ8\nZ9 : c | d\nZ8 : bZ9 | E\n");
        assert_eq!(enumerate(&result, 4), enumerate(&original, 4));
    }

    #[test]
    fn new_rules_are_factored_too() {
        let original = grammar("X0 : abcd | abce | a b f");
        let result = factor_prefixes(original.clone(), &mut FreshSymbols::new()).unwrap();

        for rule in result.rules() {
            let productions = rule.productions();
            for (i, first) in productions.iter().enumerate() {
                for second in &productions[i + 1..] {
                    assert_eq!(first.common_prefix_len(second), 0, "{}", result);
                }
            }
        }
        assert_eq!(enumerate(&result, 4), enumerate(&original, 4));
    }

    #[test]
    fn distinct_heads_are_untouched() {
        let original = grammar("S0 : a S0 b | c | E");
        let mut fresh = FreshSymbols::new();
        let result = factor_prefixes(original.clone(), &mut fresh).unwrap();

        assert_eq!(result, original);
        assert!(fresh.issued().is_empty());
    }
}
