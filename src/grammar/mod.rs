/*
    This module is for storing and manipulating grammars
*/

mod fresh;

use std::fmt::Display;

use itertools::Itertools;

pub use fresh::{FreshSymbols, SymbolSpaceExhausted};

// Letters A-Z times digits 0-9
pub const NONTERMINAL_COUNT: usize = 260;

// The token standing for the empty string in grammar files
pub const EPSILON_MARKER: char = 'E';

/// A non-terminal identifier: one uppercase letter followed by one digit.
///
/// Stored as its position in `A0, A1, ..., Z9`, so ordering follows the
/// identifier text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nonterminal(u16);

impl Nonterminal {
    pub fn new(letter: char, digit: char) -> Option<Self> {
        if !letter.is_ascii_uppercase() || !digit.is_ascii_digit() {
            return None;
        }
        let index = (letter as u16 - 'A' as u16) * 10 + (digit as u16 - '0' as u16);
        Some(Nonterminal(index))
    }

    /// Parses the two character form, e.g. `"S0"`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(letter), Some(digit), None) => Nonterminal::new(letter, digit),
            _ => None
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < NONTERMINAL_COUNT).then_some(Nonterminal(index as u16))
    }

    pub fn letter(self) -> char {
        (b'A' + (self.0 / 10) as u8) as char
    }

    pub fn digit(self) -> char {
        (b'0' + (self.0 % 10) as u8) as char
    }
}

impl Display for Nonterminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.letter(), self.digit())
    }
}

// The base unit in a grammar rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(char),
    Nonterminal(Nonterminal),
    Epsilon,
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn as_nonterminal(&self) -> Option<Nonterminal> {
        match self {
            Symbol::Nonterminal(nonterminal) => Some(*nonterminal),
            _ => None
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(c) => write!(f, "{}", c),
            Symbol::Nonterminal(nonterminal) => write!(f, "{}", nonterminal),
            Symbol::Epsilon => write!(f, "{}", EPSILON_MARKER),
        }
    }
}

/// The right hand side of a rule.
///
/// Epsilon markers are never stored: the empty sequence is the empty
/// string, and `Symbol::Epsilon` only exists at the text boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Production(Vec<Symbol>);

impl Production {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Production(symbols.into_iter().filter(|s| *s != Symbol::Epsilon).collect())
    }

    pub fn epsilon() -> Self {
        Production(Vec::new())
    }

    pub fn terminal(c: char) -> Self {
        Production(vec![Symbol::Terminal(c)])
    }

    pub fn nonterminal(nonterminal: Nonterminal) -> Self {
        Production(vec![Symbol::Nonterminal(nonterminal)])
    }

    pub fn is_epsilon(&self) -> bool {
        self.0.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<Symbol> {
        self.0.first().copied()
    }

    /// The single non-terminal of a unit production.
    pub fn as_unit(&self) -> Option<Nonterminal> {
        match self.0[..] {
            [Symbol::Nonterminal(nonterminal)] => Some(nonterminal),
            _ => None
        }
    }

    pub fn as_terminal(&self) -> Option<char> {
        match self.0[..] {
            [Symbol::Terminal(c)] => Some(c),
            _ => None
        }
    }

    pub fn starts_with(&self, nonterminal: Nonterminal) -> bool {
        self.first() == Some(Symbol::Nonterminal(nonterminal))
    }

    pub fn contains(&self, nonterminal: Nonterminal) -> bool {
        self.0.contains(&Symbol::Nonterminal(nonterminal))
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = Nonterminal> + '_ {
        self.0.iter().filter_map(Symbol::as_nonterminal)
    }

    pub fn concat(&self, other: &Production) -> Production {
        Production(self.0.iter().chain(other.0.iter()).copied().collect())
    }

    pub fn append(&self, symbol: Symbol) -> Production {
        Production::new(self.0.iter().copied().chain(std::iter::once(symbol)).collect())
    }

    /// Everything from `start` on; empty (epsilon) past the end.
    pub fn suffix(&self, start: usize) -> Production {
        Production(self.0.get(start..).unwrap_or_default().to_vec())
    }

    pub fn prefix(&self, end: usize) -> Production {
        Production(self.0[..end.min(self.0.len())].to_vec())
    }

    pub fn without(&self, index: usize) -> Production {
        let mut symbols = self.0.clone();
        symbols.remove(index);
        Production(symbols)
    }

    // Length of the longest run of leading symbols shared with `other`
    pub fn common_prefix_len(&self, other: &Production) -> usize {
        self.0.iter().zip(other.0.iter()).take_while(|(a, b)| a == b).count()
    }

    pub fn replace(&self, from: Nonterminal, to: Nonterminal) -> Production {
        self.rename(|n| if n == from { to } else { n })
    }

    pub fn rename(&self, f: impl Fn(Nonterminal) -> Nonterminal) -> Production {
        Production(self.0.iter().map(|s| match s {
            Symbol::Nonterminal(n) => Symbol::Nonterminal(f(*n)),
            other => *other
        }).collect())
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_epsilon() {
            return write!(f, "{}", Symbol::Epsilon);
        }
        for symbol in &self.0 {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

/// A non-terminal and its alternatives, in insertion order and without
/// duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub symbol: Nonterminal,
    productions: Vec<Production>,
}

impl Rule {
    pub fn new(symbol: Nonterminal) -> Self {
        Rule { symbol, productions: Vec::new() }
    }

    pub fn with_productions(symbol: Nonterminal, productions: impl IntoIterator<Item = Production>) -> Self {
        let mut rule = Rule::new(symbol);
        rule.extend(productions);
        rule
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    pub fn contains(&self, production: &Production) -> bool {
        self.productions.contains(production)
    }

    pub fn has_epsilon(&self) -> bool {
        self.productions.iter().any(Production::is_epsilon)
    }

    /// Adds a production unless it is already present. Returns whether it
    /// was added.
    pub fn push(&mut self, production: Production) -> bool {
        if self.contains(&production) {
            return false;
        }
        self.productions.push(production);
        true
    }

    pub fn extend(&mut self, productions: impl IntoIterator<Item = Production>) {
        for production in productions {
            self.push(production);
        }
    }

    pub fn remove(&mut self, index: usize) -> Production {
        self.productions.remove(index)
    }

    /// Puts `production` at `index`, or just removes the old one if the
    /// new production is already present elsewhere.
    pub fn replace(&mut self, index: usize, production: Production) {
        if self.productions.iter().enumerate().any(|(i, p)| i != index && *p == production) {
            self.productions.remove(index);
        } else {
            self.productions[index] = production;
        }
    }

    pub fn set_productions(&mut self, productions: impl IntoIterator<Item = Production>) {
        self.productions.clear();
        self.extend(productions);
    }

    pub fn retain(&mut self, keep: impl FnMut(&Production) -> bool) {
        self.productions.retain(keep);
    }

    /// Rewrites every production, dropping results that collide.
    pub fn map_productions(&mut self, f: impl FnMut(&Production) -> Production) {
        let mapped = self.productions.iter().map(f).collect_vec();
        self.set_productions(mapped);
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.symbol, self.productions.iter().join(" | "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub start_symbol: Nonterminal,
    rules: Vec<Rule>,
}

impl Grammar {
    pub fn new(start_symbol: Nonterminal) -> Self {
        Grammar { start_symbol, rules: Vec::new() }
    }

    pub fn from_rules(start_symbol: Nonterminal, rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut grammar = Grammar::new(start_symbol);
        for rule in rules {
            grammar.push_rule(rule);
        }
        grammar
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> impl Iterator<Item = &mut Rule> {
        self.rules.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_index(&self, symbol: Nonterminal) -> Option<usize> {
        self.rules.iter().position(|rule| rule.symbol == symbol)
    }

    pub fn rule(&self, symbol: Nonterminal) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.symbol == symbol)
    }

    pub fn rule_mut(&mut self, symbol: Nonterminal) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|rule| rule.symbol == symbol)
    }

    pub fn rule_at(&self, index: usize) -> &Rule {
        &self.rules[index]
    }

    pub fn rule_at_mut(&mut self, index: usize) -> &mut Rule {
        &mut self.rules[index]
    }

    pub fn contains_rule(&self, symbol: Nonterminal) -> bool {
        self.rule_index(symbol).is_some()
    }

    /// Appends a rule, merging it into the existing one if the key is
    /// already defined.
    pub fn push_rule(&mut self, rule: Rule) {
        match self.rule_mut(rule.symbol) {
            Some(existing) => existing.extend(rule.productions),
            None => self.rules.push(rule)
        }
    }

    pub fn insert_rule(&mut self, index: usize, rule: Rule) {
        self.rules.insert(index, rule);
    }

    /// Moves the axiom's rule to the front, since files name the axiom by
    /// their first line.
    pub fn lead_with_axiom(&mut self) {
        if let Some(index) = self.rule_index(self.start_symbol) {
            self.rules[..=index].rotate_right(1);
        }
    }

    pub fn retain_rules(&mut self, keep: impl FnMut(&Rule) -> bool) {
        self.rules.retain(keep);
    }

    /// Whether `symbol` occurs on any right hand side.
    pub fn is_referenced(&self, symbol: Nonterminal) -> bool {
        self.productions().any(|(_, production)| production.contains(symbol))
    }

    pub fn productions(&self) -> impl Iterator<Item = (Nonterminal, &Production)> + '_ {
        self.rules.iter().flat_map(|rule| rule.productions.iter().map(move |p| (rule.symbol, p)))
    }

    /// Every (rule, symbol) pair where the symbol has no rule of its own.
    pub fn undefined_references(&self) -> Vec<(Nonterminal, Nonterminal)> {
        self.productions()
            .flat_map(|(owner, production)| production.nonterminals().map(move |n| (owner, n)))
            .filter(|(_, referenced)| !self.contains_rule(*referenced))
            .unique()
            .collect()
    }

    pub fn production_count(&self) -> usize {
        self.rules.iter().map(|rule| rule.productions.len()).sum()
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nt(text: &str) -> Nonterminal {
        Nonterminal::parse(text).unwrap()
    }

    #[test]
    fn nonterminal_indices() {
        assert_eq!(Nonterminal::from_index(0), Some(nt("A0")));
        assert_eq!(Nonterminal::from_index(9), Some(nt("A9")));
        assert_eq!(Nonterminal::from_index(10), Some(nt("B0")));
        assert!(nt("A9") < nt("B0"));
        assert_eq!(Nonterminal::from_index(259), Some(nt("Z9")));
        assert_eq!(Nonterminal::from_index(260), None);
        assert_eq!(nt("Q7").to_string(), "Q7");
    }

    #[test]
    fn malformed_nonterminals() {
        for text in ["a0", "A", "AA", "A10", "", "0A"] {
            assert_eq!(Nonterminal::parse(text), None, "{}", text);
        }
    }

    #[test]
    fn production_drops_epsilon_markers() {
        let production = Production::new(vec![
            Symbol::Epsilon,
            Symbol::Terminal('a'),
            Symbol::Epsilon
        ]);
        assert_eq!(production, Production::terminal('a'));
        assert!(Production::new(vec![Symbol::Epsilon]).is_epsilon());
        assert_eq!(Production::epsilon().to_string(), "E");
    }

    #[test]
    fn production_slicing() {
        let production = Production::new(vec![
            Symbol::Terminal('a'),
            Symbol::Nonterminal(nt("S0")),
            Symbol::Terminal('b')
        ]);
        assert_eq!(production.to_string(), "aS0b");
        assert_eq!(production.suffix(1).to_string(), "S0b");
        assert!(production.suffix(3).is_epsilon());
        assert!(production.suffix(7).is_epsilon());
        assert_eq!(production.prefix(1).to_string(), "a");
        assert_eq!(production.without(1).to_string(), "ab");
        assert_eq!(production.replace(nt("S0"), nt("Z9")).to_string(), "aZ9b");
        assert_eq!(production.common_prefix_len(&production.prefix(2)), 2);
    }

    #[test]
    fn rule_refuses_duplicates() {
        let mut rule = Rule::new(nt("S0"));
        assert!(rule.push(Production::terminal('a')));
        assert!(!rule.push(Production::terminal('a')));
        assert!(rule.push(Production::epsilon()));
        assert_eq!(rule.productions().len(), 2);
        assert!(rule.has_epsilon());
        assert_eq!(rule.to_string(), "S0 : a | E");
    }

    #[test]
    fn grammar_merges_rules_with_same_key() {
        let grammar = Grammar::from_rules(nt("S0"), vec![
            Rule::with_productions(nt("S0"), vec![Production::terminal('a')]),
            Rule::with_productions(nt("A0"), vec![Production::terminal('b')]),
            Rule::with_productions(nt("S0"), vec![Production::terminal('c'), Production::terminal('a')]),
        ]);
        assert_eq!(grammar.to_string(), "S0 : a | c\nA0 : b\n");
    }

    #[test]
    fn axiom_rule_moves_to_the_front() {
        let mut grammar = Grammar::from_rules(nt("B0"), vec![
            Rule::with_productions(nt("S0"), vec![Production::terminal('a')]),
            Rule::with_productions(nt("A0"), vec![Production::terminal('b')]),
            Rule::with_productions(nt("B0"), vec![Production::nonterminal(nt("S0"))]),
        ]);

        grammar.lead_with_axiom();
        assert_eq!(grammar.to_string(), "B0 : S0\nS0 : a\nA0 : b\n");

        grammar.lead_with_axiom();
        assert_eq!(grammar.to_string(), "B0 : S0\nS0 : a\nA0 : b\n");
    }

    #[test]
    fn grammar_reports_undefined_references() {
        let grammar = Grammar::from_rules(nt("S0"), vec![
            Rule::with_productions(nt("S0"), vec![
                Production::new(vec![Symbol::Nonterminal(nt("A0")), Symbol::Nonterminal(nt("B1"))]),
                Production::nonterminal(nt("B1"))
            ]),
            Rule::with_productions(nt("A0"), vec![Production::terminal('b')]),
        ]);
        assert_eq!(grammar.undefined_references(), vec![(nt("S0"), nt("B1"))]);
        assert!(grammar.is_referenced(nt("A0")));
        assert!(!grammar.is_referenced(nt("S0")));
    }
}
