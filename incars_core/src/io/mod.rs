//! Module for reading and writing input tables and for parsing reaction equations
pub mod eqn_parse;
pub mod json;
