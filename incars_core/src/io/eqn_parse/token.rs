//! Module providing Token struct for lexing reaction equations

/// Represents Tokens in a reaction equation
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    /// Metabolite id or stoichiometric coefficient
    Term(String),
    /// Atom map written in parentheses after a metabolite, without the parentheses
    AtomMap(String),
    Plus,
    Star,
    /// `->`
    Arrow,
    /// `<->`
    ReversibleArrow,
    Eof,
}
