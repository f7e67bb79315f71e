//! Core rust implementation of INCA.rs, a crate for writing INCA scripts for isotope based
//! metabolic flux analysis and reading back the results.
//!
//! Input tables ([`data`]) are validated and turned into an INCA script ([`script`]), the script
//! is run by the engine ([`engine`]), and the saved results are decoded into tables
//! ([`results`]).

pub mod configuration;
pub mod data;
pub mod engine;
pub mod io;
pub mod results;
pub mod script;
pub mod utils;
