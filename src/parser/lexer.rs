use itertools::PeekingNext;

use crate::grammar::{Nonterminal, EPSILON_MARKER};
use super::{CompileErrorType, Result};

#[derive(PartialEq, Debug)]
pub enum Token {
    Colon,
    Or,
    Epsilon,
    Nonterminal(Nonterminal),
    Terminal(char)
}

// Reads an uppercase letter and, if a digit follows, turns the pair into a
// non-terminal. A lone `E` is the epsilon marker
pub fn lex_uppercase(line: &mut impl PeekingNext<Item = char>) -> Result<Token> {
    let letter = match line.next() {
        Some(c) => c,
        None => return Err(CompileErrorType::UnexpectedBlankLine)
    };

    match line.peeking_next(|c| c.is_ascii_digit()) {
        Some(digit) => Nonterminal::new(letter, digit)
            .map(Token::Nonterminal)
            .ok_or(CompileErrorType::InvalidCharacter(letter)),
        None if letter == EPSILON_MARKER => Ok(Token::Epsilon),
        None => Err(CompileErrorType::UnfinishedNonterminal(letter))
    }
}

pub fn lex_line(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    // Whitespace carries no meaning anywhere in a rule line
    let mut line_chars = line.chars().filter(|c| !c.is_whitespace()).peekable();

    while let Some(&c) = line_chars.peek() {
        if c == ':' {
            line_chars.next();
            tokens.push(Token::Colon);
        } else if c == '|' {
            line_chars.next();
            tokens.push(Token::Or);
        } else if c.is_ascii_lowercase() {
            line_chars.next();
            tokens.push(Token::Terminal(c));
        } else if c.is_ascii_uppercase() {
            tokens.push(lex_uppercase(&mut line_chars)?);
        } else {
            return Err(CompileErrorType::InvalidCharacter(c));
        }
    }

    return Ok(tokens);
}
