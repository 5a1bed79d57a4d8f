use vata_core::alphabet::Arity;

/// Errors surfaced while reading or writing a Timbuk document (§6).
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("line {line}: expected a `name:arity` entry, found `{found}`")]
	MalformedArityEntry { line: usize, found: String },

	#[error("line {line}: `Automaton` expects exactly one name, found `{found}`")]
	MalformedAutomatonHeader { line: usize, found: String },

	#[error("line {line}: expected `<lhs> -> <state>`, found `{found}`")]
	MalformedTransition { line: usize, found: String },

	#[error("line {line}: unclosed `(` in transition `{found}`")]
	UnclosedChildList { line: usize, found: String },

	#[error("line {line}: text outside any recognized section: `{found}`")]
	OutsideSection { line: usize, found: String },

	#[error("document declares no `Automaton` name")]
	MissingAutomatonName,

	#[error("symbol `{0}` was used but never declared in the `Ops` section")]
	UndeclaredSymbol(String),

	#[error("`{symbol}` was declared with arity {declared} but used with {found} children")]
	ArityMismatchInTransition {
		symbol: String,
		declared: Arity,
		found: usize,
	},

	#[error(transparent)]
	Automaton(#[from] vata_core::error::Error),
}
