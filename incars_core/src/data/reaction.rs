//! This module provides the reaction record and the parsed form of its equation
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use log::info;
use serde::{Deserialize, Serialize};

use crate::io::eqn_parse::{parse_reaction_equation, EquationParseError};

/// Represents one reaction of the model, with its atom mapped equation
#[derive(Builder, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct ReactionRecord {
    /// Used to identify the reaction (must be unique)
    pub rxn_id: String,
    /// Reaction equation with atom map, e.g. `A (C1:a C2:b) -> B (C1:b C2:a)`
    pub rxn_eqn: String,
}

impl ReactionRecord {
    pub fn new(rxn_id: &str, rxn_eqn: &str) -> Self {
        ReactionRecord {
            rxn_id: rxn_id.to_string(),
            rxn_eqn: rxn_eqn.to_string(),
        }
    }

    /// Parse the equation of this reaction
    pub fn equation(&self) -> Result<ReactionEquation, EquationParseError> {
        parse_reaction_equation(&self.rxn_eqn)
    }
}

/// A parsed reaction equation
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionEquation {
    pub reactants: Vec<Participant>,
    pub products: Vec<Participant>,
    /// Whether the equation used `<->`
    pub reversible: bool,
}

/// One side-term of a reaction equation
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub coefficient: f64,
    pub metabolite: String,
    /// Atom map without the surrounding parentheses
    pub atom_map: Option<String>,
}

impl ReactionEquation {
    /// Whether `other` is this reaction written in the opposite direction
    ///
    /// Participants are compared as written, including atom maps, so `A (ab) -> B (ab)` is not
    /// recognised as the inverse of `B (cd) -> A (cd)`.
    pub fn is_inverse(&self, other: &ReactionEquation) -> bool {
        same_participants(&self.reactants, &other.products)
            && same_participants(&self.products, &other.reactants)
    }
}

fn same_participants(left: &[Participant], right: &[Participant]) -> bool {
    let mut left: Vec<String> = left.iter().map(|p| p.to_string()).collect();
    let mut right: Vec<String> = right.iter().map(|p| p.to_string()).collect();
    left.sort();
    right.sort();
    left == right
}

impl Display for Participant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if (self.coefficient - 1.0).abs() > f64::EPSILON {
            write!(f, "{}*", self.coefficient)?;
        }
        write!(f, "{}", self.metabolite)?;
        if let Some(ref atom_map) = self.atom_map {
            write!(f, " ({})", atom_map)?;
        }
        Ok(())
    }
}

impl Display for ReactionEquation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let join = |side: &[Participant]| {
            side.iter()
                .map(|p| p.to_string())
                .collect::<Vec<String>>()
                .join(" + ")
        };
        let arrow = if self.reversible { "<->" } else { "->" };
        write!(f, "{} {} {}", join(&self.reactants), arrow, join(&self.products))
    }
}

/// Merge pairs of irreversible reactions that are the inverse of each other
///
/// The first reaction of a pair keeps its id and gets a `<->` arrow, the second one is dropped.
/// Equations that fail to parse, and reversible equations, are kept as they are.
pub fn merge_reversible_reactions(reactions: &[ReactionRecord]) -> Vec<ReactionRecord> {
    let equations: Vec<Option<ReactionEquation>> = reactions
        .iter()
        .map(|r| r.equation().ok().filter(|eqn| !eqn.reversible))
        .collect();
    let mut merged: Vec<Option<ReactionRecord>> = reactions.iter().cloned().map(Some).collect();
    let mut n_merged = 0;
    for i in 0..reactions.len() {
        let Some(ref first) = equations[i] else {
            continue;
        };
        if merged[i].is_none() {
            continue;
        }
        for j in (i + 1)..reactions.len() {
            let Some(ref second) = equations[j] else {
                continue;
            };
            if merged[j].is_none() || !first.is_inverse(second) {
                continue;
            }
            info!(
                "Found inverse reactions: {} and {}",
                reactions[i].rxn_eqn, reactions[j].rxn_eqn
            );
            if let Some(ref mut record) = merged[i] {
                record.rxn_eqn = record.rxn_eqn.replacen("->", "<->", 1);
            }
            merged[j] = None;
            n_merged += 1;
            break;
        }
    }
    info!("Merged {} reactions", n_merged);
    merged.into_iter().flatten().collect()
}

#[cfg(test)]
mod reaction_tests {
    use super::*;

    #[test]
    fn builder() {
        let reaction = ReactionRecordBuilder::default()
            .rxn_id("r1")
            .rxn_eqn("A -> B")
            .build()
            .unwrap();
        assert_eq!(reaction, ReactionRecord::new("r1", "A -> B"));
    }

    #[test]
    fn is_inverse() {
        let eqn = ReactionRecord::new("R1", "G3P + B -> 3PG").equation().unwrap();
        let inverse = ReactionRecord::new("R2", "3PG -> G3P + B").equation().unwrap();
        let other = ReactionRecord::new("R3", "3PG -> G3P + A").equation().unwrap();
        assert!(eqn.is_inverse(&inverse));
        assert!(!eqn.is_inverse(&other));
    }

    #[test]
    fn atom_maps_must_match_for_inverse() {
        let eqn = ReactionRecord::new("R1", "A (C1:a) -> B (C1:a)").equation().unwrap();
        let relabelled = ReactionRecord::new("R2", "B (C1:b) -> A (C1:b)").equation().unwrap();
        assert!(!eqn.is_inverse(&relabelled));
    }

    #[test]
    fn merge() {
        let reactions = vec![
            ReactionRecord::new("R1", "G3P + B -> 3PG"),
            ReactionRecord::new("R2", "3PG -> G3P + B"),
            ReactionRecord::new("R3", "A -> B"),
            ReactionRecord::new("R4", "C -> D"),
        ];
        let merged = merge_reversible_reactions(&reactions);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].rxn_eqn, "G3P + B <-> 3PG");
        assert_eq!(merged[1].rxn_id, "R3");
        assert_eq!(merged[2].rxn_id, "R4");
    }

    #[test]
    fn display_round_trip() {
        let eqn = ReactionRecord::new("r", "2*A (C1:a) + B <-> C").equation().unwrap();
        assert_eq!(eqn.to_string(), "2*A (C1:a) + B <-> C");
    }
}
