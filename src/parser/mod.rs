/*
    This module parses grammar files of the form `S0 : aS0b | c`
*/

mod lexer;
mod verifier;

use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::grammar::*;
use crate::error_handling::*;
use itertools::Itertools;
use lexer::*;
use log::{info, warn};
use verifier::verify_rules;

#[derive(Debug)]
pub enum CompileErrorType {
    // A rule line has no `:` after its non-terminal
    MissingColon,
    // A rule has multiple colons
    UnexpectedColon,
    // The user starts a rule line with something other than a nonterminal
    MissingNonterminal,
    // Two `|` with nothing between them, or nothing after the colon
    EmptyProduction,
    // A character that is neither a symbol nor a separator
    InvalidCharacter(char),
    // An uppercase letter not followed by a digit
    UnfinishedNonterminal(char),
    // A non-terminal that no line defines
    UndefinedNonterminal(Nonterminal),
    // The file holds no rule at all, so there is no axiom
    EmptyGrammar,
    // Somehow a full rewrite was parsed as a single production
    // This is a problem with the parser, not the grammar
    UnsplitRewrite,
    // A blank line got too deep into the parser
    // This is a problem with the parser, not the grammar
    UnexpectedBlankLine,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for CompileErrorType {}

impl PartialEq for CompileErrorType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CompileErrorType::FileError(a), CompileErrorType::FileError(b)) => a.kind() == b.kind(),
            (CompileErrorType::InvalidCharacter(a), CompileErrorType::InvalidCharacter(b)) => a == b,
            (CompileErrorType::UnfinishedNonterminal(a), CompileErrorType::UnfinishedNonterminal(b)) => a == b,
            (CompileErrorType::UndefinedNonterminal(a), CompileErrorType::UndefinedNonterminal(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other)
        }
    }
}

impl Display for CompileErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileErrorType::MissingColon => write!(f, "Expected `:` after nonterminal"),
            CompileErrorType::UnexpectedColon => write!(f, "Unexpected `:` encountered"),
            CompileErrorType::MissingNonterminal => write!(f, "Tried to define something other than a nonterminal"),
            CompileErrorType::EmptyProduction => write!(f, "Empty production (write `{}` for the empty string)", EPSILON_MARKER),
            CompileErrorType::InvalidCharacter(c) => write!(f, "Unexpected character `{}`", c),
            CompileErrorType::UnfinishedNonterminal(c) => write!(f, "Nonterminal `{}` is missing its digit", c),
            CompileErrorType::UndefinedNonterminal(nonterminal) => write!(f, "Could not find definition for `{}`", nonterminal),
            CompileErrorType::EmptyGrammar => write!(f, "The grammar has no rules"),
            CompileErrorType::UnsplitRewrite => write!(f, "Rewrite was not fully split (this is a problem with the parser, not the grammar)"),
            CompileErrorType::UnexpectedBlankLine => write!(f, "Blank line encountered in rule parser (this is a problem with the parser, not the grammar)"),
            CompileErrorType::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<CompileErrorType>;
pub type CompileErrors = Errors<CompileErrorType>;

fn io_error(error: std::io::Error, file: PathBuf) -> CompileError {
    CompileError {
        location: Location::file(file),
        error: CompileErrorType::FileError(error)
    }
}

pub type Result<T> = std::result::Result<T, CompileErrorType>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

#[derive(PartialEq, Debug)]
struct RuleLine {
    symbol: Nonterminal,
    productions: Vec<Production>,
    location: Location
}

fn parse_production(tokens: &[Token]) -> Result<Production> {
    if tokens.is_empty() {
        return Err(CompileErrorType::EmptyProduction);
    }

    let symbols: Vec<Symbol> = tokens.iter().map(|t| match t {
        Token::Colon => Err(CompileErrorType::UnexpectedColon),
        Token::Or => Err(CompileErrorType::UnsplitRewrite),
        Token::Epsilon => Ok(Symbol::Epsilon),
        Token::Nonterminal(n) => Ok(Symbol::Nonterminal(*n)),
        Token::Terminal(c) => Ok(Symbol::Terminal(*c))
    }).collect::<Result<_>>()?;

    let production = Production::new(symbols);
    if !production.is_epsilon() && production.len() != tokens.len() {
        warn!("Dropping epsilon marker mixed into production `{}`", production);
    }

    Ok(production)
}

fn parse_rewrite(tokens: &[Token]) -> Result<Vec<Production>> {
    tokens.split(|t| *t == Token::Or).map(parse_production).collect()
}

fn parse_line(tokens: &[Token], location: Location) -> Result<RuleLine> {
    let symbol = match tokens.get(0) {
        Some(Token::Nonterminal(n)) => Ok(*n),
        Some(_) => Err(CompileErrorType::MissingNonterminal),
        None => Err(CompileErrorType::UnexpectedBlankLine)
    }?;

    if tokens.get(1) != Some(&Token::Colon) {
        return Err(CompileErrorType::MissingColon)
    }

    let productions = parse_rewrite(&tokens[2..])?;

    return Ok(RuleLine {
        symbol,
        productions,
        location
    });
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<RuleLine> {
    lexer::lex_line(line)
        .and_then(|lexed_line| parse_line(&lexed_line, location.clone()))
        .map_err(|error| CompileError { location: location, error })
}

fn is_rule_line(line: &String) -> bool {
    let line = line.trim_start();
    !line.is_empty() && !line.starts_with(';')
}

// Returns an iterator over the lines of a reader, with the io errors wrapped
// in CompileError and enumerated
fn reader_line_nums<'a>(reader: impl BufRead + 'a, path: &'a Path) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    reader
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path.to_path_buf())))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

fn grammar_from_rules(rule_lines: Vec<RuleLine>, path: &Path) -> FileResult<Grammar> {
    let start_symbol = match rule_lines.first() {
        Some(line) => line.symbol,
        None => return Err(vec![CompileError {
            location: Location::file(path.to_path_buf()),
            error: CompileErrorType::EmptyGrammar
        }])
    };

    verify_rules(&rule_lines)?;

    let mut grammar = Grammar::new(start_symbol);
    for line in rule_lines {
        if grammar.contains_rule(line.symbol) {
            info!("{}: merging repeated rule for `{}`", line.location, line.symbol);
        }
        grammar.push_rule(Rule::with_productions(line.symbol, line.productions));
    }

    return Ok(grammar);
}

fn parse_reader(reader: impl BufRead, path: &Path) -> FileResult<Grammar> {
    let lines = reader_line_nums(reader, path);

    let parsed_lines = lines.map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_line(&line, Location {
            file: path.to_path_buf(),
            line: num
        }))
    });

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if errors.len() > 0 {
        return Err(errors);
    }

    return grammar_from_rules(rules, path);
}

/// Parses grammar text; `path` is only used to label errors.
pub fn parse_str(text: &str, path: &Path) -> FileResult<Grammar> {
    parse_reader(text.as_bytes(), path)
}

pub fn parse_file(path: &Path) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path.to_path_buf())])?;
    parse_reader(std::io::BufReader::new(file), path)
}
