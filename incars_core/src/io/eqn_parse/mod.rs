//! Module for parsing reaction equations with atom maps into [`ReactionEquation`] values

use crate::data::reaction::ReactionEquation;
use crate::io::eqn_parse::lexer::LexerError;
use crate::io::eqn_parse::parser::ParseError;
use thiserror::Error;

mod lexer;
pub mod parser;
mod token;

/// Parse a reaction equation such as `A (C1:a C2:b) -> B (C1:b C2:a)`
///
/// # Examples
/// ```rust
/// use incars_core::io::eqn_parse::parse_reaction_equation;
/// let eqn = parse_reaction_equation("G3P + B -> 3PG").unwrap();
/// assert_eq!(eqn.reactants.len(), 2);
/// assert!(!eqn.reversible);
/// ```
pub fn parse_reaction_equation(input: &str) -> Result<ReactionEquation, EquationParseError> {
    let mut lexer = lexer::Lexer::new(input);
    let tokens = lexer.lex()?;
    let mut parser = parser::EquationParser::new(tokens);
    Ok(parser.parse()?)
}

/// Enum representing possible lex and parse errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EquationParseError {
    /// Lexing Error
    #[error("Error occurred during lexing of the reaction equation: {0}")]
    LexingError(#[from] LexerError),
    /// Parsing Error
    #[error("Error occurred during parsing of the reaction equation: {0}")]
    ParsingError(#[from] ParseError),
}
