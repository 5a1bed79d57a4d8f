use crate::alphabet::{Arity, Symbol};
use crate::state::State;

/// Errors surfaced at the narrow interfaces between the core and its
/// collaborators (§7). Internal invariant breaks (ref-count underflow, a
/// null MTBDD child) are not represented here: they are bugs, and the core
/// panics with a diagnostic instead of threading a `Result` through every
/// hot loop, matching the teacher's use of `debug_assert!`/`unreachable!`
/// for conditions that "cannot happen" given well-formed input.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum Error {
	#[error("symbol {symbol} was declared with arity {expected} but used with arity {found}")]
	ArityMismatch {
		symbol: Symbol,
		expected: Arity,
		found: Arity,
	},

	#[error("transition for symbol {symbol} supplies {found} children, expected {expected}")]
	WrongTupleArity {
		symbol: Symbol,
		expected: Arity,
		found: usize,
	},

	#[error("unknown symbol {0}")]
	UnknownSymbol(Symbol),

	#[error("unknown state {0}")]
	UnknownState(State),

	#[error("configuration does not support this operation: {0}")]
	PreconditionViolated(&'static str),

	#[error("this configuration is not implemented: {0}")]
	Unimplemented(&'static str),
}
