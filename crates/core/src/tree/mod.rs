//! Explicit bottom-up tree automata and their transition store (C3).
mod automaton;
mod store;

pub use automaton::Automaton;
pub use store::{ChildTuple, Cluster, TransitionStore, TupleCache};
