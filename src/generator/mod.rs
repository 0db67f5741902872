/*
    This module generates sentences: every word up to a length, or random ones
*/

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::path::Path;

use itertools::Itertools;
use log::{debug, trace};
use rand::prelude::*;

use crate::error_handling::*;
use crate::grammar::*;

// Depth-limited draws that are retried before `sample` gives up
const MAX_RETRIES: usize = 100;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // An undefined nonterminal was used
    UndefinedNonterminal(Nonterminal),
    // A derivation went deeper than allowed
    DepthExceeded(usize),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::UndefinedNonterminal(nonterminal) => write!(f, "No definition for nonterminal `{}`", nonterminal),
            GenerateErrorType::DepthExceeded(depth) => write!(f, "Derivation nested deeper than {} rules", depth),
        }
    }
}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult = Result<String, GenerateError>;

fn word_length(word: &str) -> usize {
    word.chars().count()
}

// Every way to derive `production` into a word of at most `max_len`
// characters, given the words found so far for each nonterminal
fn production_words(production: &Production, words: &HashMap<Nonterminal, HashSet<String>>, max_len: usize) -> HashSet<String> {
    let empty = HashSet::new();
    let mut prefixes = HashSet::from([String::new()]);

    for symbol in production.symbols() {
        let terminal;
        let options = match symbol {
            Symbol::Terminal(c) => {
                terminal = HashSet::from([c.to_string()]);
                &terminal
            }
            Symbol::Nonterminal(n) => words.get(n).unwrap_or(&empty),
            Symbol::Epsilon => continue,
        };

        prefixes = prefixes.iter()
            .cartesian_product(options.iter())
            .filter(|(prefix, word)| word_length(prefix) + word_length(word) <= max_len)
            .map(|(prefix, word)| format!("{}{}", prefix, word))
            .collect();
        if prefixes.is_empty() {
            break;
        }
    }

    prefixes
}

/// All words of at most `max_len` characters derivable from the axiom,
/// shortest first and alphabetical within a length. The empty word is "".
///
/// The word sets of all rules grow together until nothing changes, which
/// terminates for any grammar since the sets are bounded.
pub fn enumerate(grammar: &Grammar, max_len: usize) -> Vec<String> {
    let mut words: HashMap<Nonterminal, HashSet<String>> = grammar.rules().iter()
        .map(|rule| (rule.symbol, HashSet::new()))
        .collect();

    let mut rounds = 0;
    loop {
        let mut changed = false;
        rounds += 1;

        for rule in grammar.rules() {
            let found: HashSet<String> = rule.productions().iter()
                .flat_map(|production| production_words(production, &words, max_len))
                .collect();

            if let Some(known) = words.get_mut(&rule.symbol) {
                let before = known.len();
                known.extend(found);
                changed |= known.len() != before;
            }
        }

        if !changed {
            break;
        }
    }

    let result = words.remove(&grammar.start_symbol)
        .unwrap_or_default()
        .into_iter()
        .sorted_by(|a, b| word_length(a).cmp(&word_length(b)).then_with(|| a.cmp(b)))
        .collect_vec();
    debug!("{} words of length at most {} after {} rounds", result.len(), max_len, rounds);
    result
}

fn generate_nonterminal<R: Rng>(nonterminal: Nonterminal, grammar: &Grammar, rng: &mut R, depth: usize, max_depth: usize, location: &Location) -> GenResult {
    if depth > max_depth {
        return Err(GenerateError {
            location: location.clone(),
            error: GenerateErrorType::DepthExceeded(max_depth)
        });
    }

    let rule = grammar.rule(nonterminal)
        .ok_or_else(|| GenerateError {
            location: location.clone(),
            error: GenerateErrorType::UndefinedNonterminal(nonterminal)
        })?;

    let alternative = match rule.productions().choose(rng) {
        Some(a) => a,
        None => return Ok(String::new()),
    };

    let mut result = String::new();
    for symbol in alternative.symbols() {
        match *symbol {
            Symbol::Nonterminal(n) => result.push_str(&generate_nonterminal(n, grammar, rng, depth + 1, max_depth, location)?),
            Symbol::Terminal(c) => result.push(c),
            Symbol::Epsilon => {}
        }
    }

    return Ok(result);
}

/// Derives one random sentence from the axiom.
///
/// Fails with `DepthExceeded` when the derivation nests more than
/// `max_depth` rules deep.
pub fn generate<R: Rng>(grammar: &Grammar, rng: &mut R, max_depth: usize, file: &Path) -> GenResult {
    generate_nonterminal(grammar.start_symbol, grammar, rng, 1, max_depth, &Location::file(file.to_path_buf()))
}

/// Draws `amount` sentences, retrying derivations that ran too deep.
pub fn sample<R: Rng>(grammar: &Grammar, rng: &mut R, amount: usize, max_depth: usize, file: &Path) -> Result<Vec<String>, GenerateError> {
    let mut sentences = Vec::with_capacity(amount);
    let mut retries = 0;

    while sentences.len() < amount {
        match generate(grammar, rng, max_depth, file) {
            Ok(sentence) => sentences.push(sentence),
            Err(GenerateError { error: GenerateErrorType::DepthExceeded(_), .. }) if retries < MAX_RETRIES => {
                retries += 1;
                trace!("derivation too deep, retrying ({} of {})", retries, MAX_RETRIES);
            }
            Err(error) => return Err(error),
        }
    }

    Ok(sentences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use std::path::PathBuf;

    use crate::normalize::testing::{grammar, nt};

    #[test]
    fn words_are_sorted_by_length_then_text() {
        let questions = [
            ("S0 : a S0 b | c", 5),
            ("A0 : A0 a | b", 5),
            ("S0 : A0 B0\nA0 : a A0 | E\nB0 : b | E", 3),
            ("S0 : A0 | a\nA0 : S0 | b", 5),
        ];
        let answers: [&[&str]; 4] = [
            &["c", "acb", "aacbb"],
            &["b", "ba", "baa", "baaa", "baaaa"],
            &["", "a", "b", "aa", "ab", "aaa", "aab"],
            &["a", "b"],
        ];

        for ((question, bound), answer) in questions.iter().zip(answers) {
            let answer = answer.iter().map(|word| word.to_string()).collect_vec();
            assert_eq!(enumerate(&grammar(question), *bound), answer, "{}", question);
        }
    }

    #[test]
    fn undefined_rules_derive_nothing() {
        let grammar = Grammar::from_rules(nt("S0"), [
            Rule::with_productions(nt("S0"), [
                Production::terminal('a'),
                Production::new(vec![Symbol::Terminal('b'), Symbol::Nonterminal(nt("X0"))])
            ])
        ]);

        assert_eq!(enumerate(&grammar, 4), vec!["a"]);
    }

    #[test]
    fn generated_sentences_belong_to_the_language() {
        let grammar = grammar("S0 : a S0 b | c");
        let mut rng = StdRng::seed_from_u64(17);

        for sentence in sample(&grammar, &mut rng, 20, 200, Path::new("inline")).unwrap() {
            let half = sentence.len() / 2;
            assert_eq!(sentence.len() % 2, 1, "{}", sentence);
            assert!(sentence[..half].chars().all(|c| c == 'a'), "{}", sentence);
            assert_eq!(&sentence[half..half + 1], "c", "{}", sentence);
            assert!(sentence[half + 1..].chars().all(|c| c == 'b'), "{}", sentence);
        }
    }

    #[test]
    fn same_seed_same_sentences() {
        let grammar = grammar("S0 : a S0 | b S0 | E");
        let first = sample(&grammar, &mut StdRng::seed_from_u64(3), 10, 500, Path::new("inline")).unwrap();
        let second = sample(&grammar, &mut StdRng::seed_from_u64(3), 10, 500, Path::new("inline")).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
    }

    #[test]
    fn endless_derivation_is_cut_off() {
        let grammar = grammar("S0 : a S0");
        let file = PathBuf::from("inline");

        let error = generate(&grammar, &mut StdRng::seed_from_u64(0), 10, &file).unwrap_err();
        assert_eq!(error, GenerateError {
            location: Location::file(file.clone()),
            error: GenerateErrorType::DepthExceeded(10)
        });

        let error = sample(&grammar, &mut StdRng::seed_from_u64(0), 1, 10, &file).unwrap_err();
        assert_eq!(error.error, GenerateErrorType::DepthExceeded(10));
    }

    #[test]
    fn undefined_nonterminal_is_reported() {
        let grammar = Grammar::from_rules(nt("S0"), [
            Rule::with_productions(nt("S0"), [Production::nonterminal(nt("X0"))])
        ]);

        let error = generate(&grammar, &mut StdRng::seed_from_u64(0), 10, Path::new("inline")).unwrap_err();
        assert_eq!(error.error, GenerateErrorType::UndefinedNonterminal(nt("X0")));
    }
}
