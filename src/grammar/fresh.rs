use log::trace;

use super::{Grammar, Nonterminal, NONTERMINAL_COUNT};

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SymbolSpaceExhausted;

/// Hands out non-terminals that are unused in the grammar being rewritten,
/// from `Z9` down to `A0`.
///
/// One allocator belongs to one transformation run. The cursor only moves
/// down, so two allocations never return the same identifier even when the
/// first one has not been added to the grammar yet.
#[derive(Debug, Clone)]
pub struct FreshSymbols {
    remaining: usize,
    issued: Vec<Nonterminal>,
}

impl FreshSymbols {
    pub fn new() -> Self {
        FreshSymbols {
            remaining: NONTERMINAL_COUNT,
            issued: Vec::new()
        }
    }

    pub fn next(&mut self, grammar: &Grammar) -> Result<Nonterminal, SymbolSpaceExhausted> {
        while self.remaining > 0 {
            self.remaining -= 1;
            let Some(candidate) = Nonterminal::from_index(self.remaining) else {
                continue;
            };

            if candidate == grammar.start_symbol
                || grammar.contains_rule(candidate)
                || grammar.is_referenced(candidate) {
                continue;
            }

            trace!("allocated fresh non-terminal {}", candidate);
            self.issued.push(candidate);
            return Ok(candidate);
        }

        Err(SymbolSpaceExhausted)
    }

    /// Every identifier handed out so far, in allocation order.
    pub fn issued(&self) -> &[Nonterminal] {
        &self.issued
    }
}

impl Default for FreshSymbols {
    fn default() -> Self {
        FreshSymbols::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Production, Rule};

    fn nt(text: &str) -> Nonterminal {
        Nonterminal::parse(text).unwrap()
    }

    #[test]
    fn counts_down_from_z9() {
        let grammar = Grammar::from_rules(nt("S0"), vec![
            Rule::with_productions(nt("S0"), vec![Production::terminal('a')])
        ]);
        let mut fresh = FreshSymbols::new();

        let allocated: Vec<_> = (0..3).map(|_| fresh.next(&grammar).unwrap()).collect();
        assert_eq!(allocated, vec![nt("Z9"), nt("Z8"), nt("Z7")]);
        assert_eq!(fresh.issued(), &allocated[..]);
    }

    #[test]
    fn skips_symbols_in_use() {
        let grammar = Grammar::from_rules(nt("Z9"), vec![
            Rule::with_productions(nt("Z9"), vec![Production::nonterminal(nt("Z7"))]),
            Rule::with_productions(nt("Z8"), vec![Production::terminal('a')]),
            Rule::with_productions(nt("Z7"), vec![Production::terminal('b')]),
        ]);
        let mut fresh = FreshSymbols::new();

        assert_eq!(fresh.next(&grammar), Ok(nt("Z6")));
        assert_eq!(fresh.next(&grammar), Ok(nt("Z5")));
    }

    #[test]
    fn exhaustion_is_an_error() {
        let rules = (0..NONTERMINAL_COUNT)
            .filter_map(Nonterminal::from_index)
            .filter(|n| *n != nt("A0"))
            .map(|n| Rule::with_productions(n, vec![Production::terminal('a')]));
        let grammar = Grammar::from_rules(nt("A0"), rules);
        let mut fresh = FreshSymbols::new();

        assert_eq!(fresh.next(&grammar), Err(SymbolSpaceExhausted));
        assert_eq!(fresh.next(&grammar), Err(SymbolSpaceExhausted));
        assert!(fresh.issued().is_empty());
    }

    #[test]
    fn separate_runs_do_not_share_state() {
        let grammar = Grammar::new(nt("S0"));
        let mut first = FreshSymbols::new();
        first.next(&grammar).unwrap();
        first.next(&grammar).unwrap();

        let mut second = FreshSymbols::new();
        assert_eq!(second.next(&grammar), Ok(nt("Z9")));
    }
}
