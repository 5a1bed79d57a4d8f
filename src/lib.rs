//! This library provides an implementation of explicit and symbolic tree
//! automata over ranked alphabets, together with the finite-automaton
//! counterpart used by the congruence-closure inclusion checker. It is meant
//! to be embedded inside model checkers and program analyzers, the way the
//! original [`libvata`] C++ library is.
//!
//! [`libvata`]: <https://github.com/ondrik/libvata>
pub use vata_core::alphabet::{Alphabet, Arity, Symbol};
pub use vata_core::antichain::{Antichain1C, Antichain2Cv2, OrderedAntichain2C};
pub use vata_core::dispatch::{Direction, InclusionParams, Representation};
pub use vata_core::error::Error;
pub use vata_core::finite::FiniteAutomaton;
pub use vata_core::mtbdd::{Mtbdd, NodeId};
pub use vata_core::prune;
pub use vata_core::simulation::{self, Preorder};
pub use vata_core::dispatch::{sanitize_finite, sanitize_tree};
pub use vata_core::state::State;
pub use vata_core::tree::{Automaton as TreeAutomaton, ChildTuple, TupleCache};

pub use vata_timbuk as timbuk;
