//! Core automata engine: MTBDD primitives (C1/C2), explicit tree- and
//! finite-automaton transition stores (C3), antichain/cache utilities
//! (C4), the simulation engine (C5), the downward/upward/congruence
//! inclusion checkers (C6/C7/C8), the inclusion dispatcher (C9), and
//! pruning (C10).
//!
//! The MTBDD node tables hash-cons via `Rc`/`Weak` rather than the
//! source's explicit ref-counted node pool with manual `delete`: a node
//! is freed exactly when its last `Rc` handle drops, which is the
//! idiomatic Rust rendering of the same "shared, reduced, garbage-
//! collected by reference count" contract (§5).
pub mod alphabet;
pub mod antichain;
pub mod cache;
pub mod dispatch;
pub mod error;
pub mod finite;
pub mod incl_congr;
pub mod incl_down;
pub mod incl_up;
pub mod lts;
pub mod mtbdd;
pub mod prune;
pub mod simulation;
pub mod state;
pub mod tree;
