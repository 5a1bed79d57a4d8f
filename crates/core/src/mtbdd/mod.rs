//! Multi-terminal binary decision diagrams (C1, C2).
//!
//! A [`Mtbdd`] manager owns the hash-cons tables for one family of diagrams
//! sharing a variable order and a leaf type `D`. Node identities
//! ([`NodeId`]) are reference-counted [`std::rc::Rc`] handles: dropping the
//! last handle to a node removes it from the manager's hash-cons table and
//! recursively releases its children, which is the idiomatic-Rust rendering
//! of the explicit `delete`/ref-count contract in the source design (see
//! `DESIGN.md`) — `Drop` does the bookkeeping manual C++ destructors did by
//! hand.
mod apply;
mod node;

pub use apply::{apply1, apply2, apply3, VoidApply2};
pub use node::{Mtbdd, NodeId, VarId};
