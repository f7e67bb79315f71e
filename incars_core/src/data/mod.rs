//! Typed input tables describing the metabolic model and the measurements of each experiment

pub mod measurement;
pub mod reaction;
pub mod schema;
pub mod tracer;
