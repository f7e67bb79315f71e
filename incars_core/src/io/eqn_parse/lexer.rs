//! Lex a reaction equation into a series of tokens for later parsing

use std::collections::VecDeque;

use thiserror::Error;

use crate::io::eqn_parse::token::Token;

pub struct Lexer {
    source: Vec<char>,
    tokens: VecDeque<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: VecDeque::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the source into a vec of tokens ending in [`Token::Eof`]
    pub fn lex(&mut self) -> Result<Vec<Token>, LexerError> {
        self.scan_tokens()?;
        Ok(self.tokens.iter().cloned().collect())
    }

    pub fn scan_tokens(&mut self) -> Result<&VecDeque<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push_back(Token::Eof);
        Ok(&self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        if self.at_arrow() {
            self.current += 2;
            self.add_token(Token::Arrow);
            return Ok(());
        }
        if self.at_reversible_arrow() {
            self.current += 3;
            self.add_token(Token::ReversibleArrow);
            return Ok(());
        }
        let c: char = self.advance();
        match c {
            '+' => self.add_token(Token::Plus),
            '*' => self.add_token(Token::Star),
            '(' => self.read_atom_map()?,
            ')' => return Err(LexerError::UnmatchedParenthesis(self.start)),
            ' ' | '\r' | '\n' | '\t' => {}
            _ => self.read_term(),
        };
        Ok(())
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn read_term(&mut self) {
        while !self.is_at_end() && Lexer::is_term_char(self.peek()) && !self.at_any_arrow() {
            self.advance();
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        self.add_token(Token::Term(text));
    }

    fn read_atom_map(&mut self) -> Result<(), LexerError> {
        while !self.is_at_end() && self.peek() != ')' {
            if self.peek() == '(' {
                return Err(LexerError::UnmatchedParenthesis(self.current));
            }
            self.advance();
        }
        if self.is_at_end() {
            return Err(LexerError::UnterminatedAtomMap(self.start));
        }
        let text: String = self.source[self.start + 1..self.current].iter().collect();
        // consume the closing parenthesis
        self.advance();
        self.add_token(Token::AtomMap(text.trim().to_string()));
        Ok(())
    }

    fn is_term_char(c: char) -> bool {
        !matches!(c, ' ' | '\r' | '\n' | '\t' | '+' | '*' | '(' | ')')
    }

    fn at_arrow(&self) -> bool {
        self.matches_at(self.current, "->")
    }

    fn at_reversible_arrow(&self) -> bool {
        self.matches_at(self.current, "<->")
    }

    fn at_any_arrow(&self) -> bool {
        self.at_arrow() || self.at_reversible_arrow()
    }

    fn matches_at(&self, position: usize, pattern: &str) -> bool {
        let pattern: Vec<char> = pattern.chars().collect();
        position + pattern.len() <= self.source.len()
            && self.source[position..position + pattern.len()] == pattern[..]
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn add_token(&mut self, token: Token) {
        self.tokens.push_back(token);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexerError {
    #[error("Unmatched parenthesis at position {0}")]
    UnmatchedParenthesis(usize),
    #[error("Atom map starting at position {0} is never closed")]
    UnterminatedAtomMap(usize),
}
