//! Reader/writer for the Timbuk tree-automaton text format (§6): `Ops`,
//! `Automaton`, `States`, `Final States`, and `Transitions` sections, with
//! string names resolved against the core's opaque [`vata_core::alphabet::Symbol`]/
//! [`vata_core::state::State`] ids via [`document::NameTable`].
pub mod document;
mod error;
pub mod parse;
pub mod write;

pub use document::{Document, NameTable, StateTable, SymbolTable};
pub use error::Error;
pub use parse::{parse, parse_with_symbols};
pub use write::{write_finite_automaton, write_tree_automaton};
