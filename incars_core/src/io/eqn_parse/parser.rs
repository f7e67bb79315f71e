use crate::data::reaction::{Participant, ReactionEquation};
use crate::io::eqn_parse::token::Token;

use thiserror::Error;
/*
Reaction equation grammar:
equation -> side arrow side ;
arrow -> "->" | "<->" ;
side -> participant ( "+" participant )* ;
participant -> ( NUMBER "*" )? METABOLITE ATOM_MAP? ;

e.g. A.ext (C1:a C2:b) + 2*B -> C (C1:a C2:b)
 */

/// Reaction equation parser
pub struct EquationParser {
    /// Vector of tokens from the equation string
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
}

impl EquationParser {
    /// Create a new EquationParser
    pub fn new(tokens: Vec<Token>) -> EquationParser {
        EquationParser { tokens, current: 0 }
    }

    // region Parsing Functions

    /// Parse the token vector into a [`ReactionEquation`]
    pub fn parse(&mut self) -> Result<ReactionEquation, ParseError> {
        let reactants = self.side()?;
        let reversible = if self.match_token(&[Token::Arrow]) {
            false
        } else if self.match_token(&[Token::ReversibleArrow]) {
            true
        } else {
            return Err(ParseError::MissingArrow);
        };
        let products = self.side()?;
        if !self.is_at_end() {
            return Err(ParseError::EarlyTermination);
        }
        Ok(ReactionEquation {
            reactants,
            products,
            reversible,
        })
    }

    fn side(&mut self) -> Result<Vec<Participant>, ParseError> {
        let mut participants = vec![self.participant()?];
        while self.match_token(&[Token::Plus]) {
            participants.push(self.participant()?);
        }
        Ok(participants)
    }

    fn participant(&mut self) -> Result<Participant, ParseError> {
        let first = self.match_term().ok_or(ParseError::ExpectedMetabolite)?;
        let (coefficient, metabolite) = if self.match_token(&[Token::Star]) {
            let coefficient = first
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidCoefficient(first.clone()))?;
            let metabolite = self.match_term().ok_or(ParseError::ExpectedMetabolite)?;
            (coefficient, metabolite)
        } else {
            (1.0, first)
        };
        let atom_map = self.match_atom_map();
        Ok(Participant {
            coefficient,
            metabolite,
            atom_map,
        })
    }

    // endregion Parsing Functions

    // region parsing helper functions

    /// Check whether the token at the current position matches one of the provided `tokens`,
    /// if it does advance [`self.current`] and return true, otherwise return false
    fn match_token(&mut self, tokens: &[Token]) -> bool {
        for t in tokens {
            if self.check(t) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn match_term(&mut self) -> Option<String> {
        if let Token::Term(text) = self.peek().clone() {
            self.advance();
            return Some(text);
        }
        None
    }

    fn match_atom_map(&mut self) -> Option<String> {
        if let Token::AtomMap(text) = self.peek().clone() {
            self.advance();
            return Some(text);
        }
        None
    }

    fn check(&self, token: &Token) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek() == token
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn peek(&self) -> &Token {
        // The lexer always terminates the vec with Eof
        self.tokens.get(self.current).unwrap_or(&Token::Eof)
    }

    // endregion parsing helper functions
}

/// Enum representing possible parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseError {
    /// Neither `->` nor `<->` separates the two sides
    #[error("Missing reaction arrow, expected `->` or `<->`")]
    MissingArrow,
    /// A side of the equation is empty or a `+` is dangling
    #[error("Expected a metabolite")]
    ExpectedMetabolite,
    /// Text before a `*` is not a number
    #[error("Invalid stoichiometric coefficient: {0}")]
    InvalidCoefficient(String),
    /// Tokens left over after the products, e.g. a second arrow
    #[error("Parsing terminated early, check for a second arrow or a missing `+`")]
    EarlyTermination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::eqn_parse::lexer::Lexer;

    fn parse(source: &str) -> Result<ReactionEquation, ParseError> {
        let tokens = Lexer::new(source).lex().unwrap();
        EquationParser::new(tokens).parse()
    }

    #[test]
    fn simple_parse() {
        let eqn = parse("A -> B").unwrap();
        assert!(!eqn.reversible);
        assert_eq!(eqn.reactants.len(), 1);
        assert_eq!(eqn.reactants[0].metabolite, "A");
        assert_eq!(eqn.products[0].metabolite, "B");
        assert!((eqn.products[0].coefficient - 1.0).abs() < 1e-25);
    }

    #[test]
    fn coefficient_and_atom_map_parse() {
        let eqn = parse("0.5*A (C1:a) + B <-> C (C1:a)").unwrap();
        assert!(eqn.reversible);
        assert_eq!(eqn.reactants.len(), 2);
        assert!((eqn.reactants[0].coefficient - 0.5).abs() < 1e-25);
        assert_eq!(eqn.reactants[0].atom_map.as_deref(), Some("C1:a"));
        assert_eq!(eqn.reactants[1].atom_map, None);
        assert_eq!(eqn.products[0].atom_map.as_deref(), Some("C1:a"));
    }

    #[test]
    fn missing_arrow() {
        assert_eq!(parse("A + B"), Err(ParseError::MissingArrow));
    }

    #[test]
    fn empty_side() {
        assert_eq!(parse("A -> "), Err(ParseError::ExpectedMetabolite));
        assert_eq!(parse("A + -> B"), Err(ParseError::ExpectedMetabolite));
    }

    #[test]
    fn invalid_coefficient() {
        assert_eq!(
            parse("x*A -> B"),
            Err(ParseError::InvalidCoefficient("x".to_string()))
        );
    }

    #[test]
    fn second_arrow() {
        assert_eq!(parse("A -> B -> C"), Err(ParseError::EarlyTermination));
    }
}
