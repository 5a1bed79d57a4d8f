use std::collections::HashMap;
use std::fmt;

/// The number of children a symbol's transitions take.
pub type Arity = u16;

/// A ranked symbol identifier.
///
/// Tree-automaton symbols carry a fixed [`Arity`]; finite-automaton symbols
/// always have arity 1 and are represented the same way with `arity() == 1`
/// enforced by [`Alphabet::arity_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol(pub u32);

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "sym{}", self.0)
	}
}

/// An external symbol dictionary: the core treats [`Symbol`] as opaque and
/// never looks names up itself, but every operation that needs an arity
/// (tuple-shape checking, MTBDD arity tagging) goes through this narrow
/// interface rather than a process-wide global table.
pub trait Alphabet {
	fn arity_of(&self, symbol: Symbol) -> Option<Arity>;

	fn symbols(&self) -> Box<dyn Iterator<Item = Symbol> + '_>;
}

/// A simple owned alphabet: symbol id -> arity. Used by the Timbuk reader
/// and by tests; a production embedding would supply its own [`Alphabet`]
/// backed by a name<->id dictionary.
#[derive(Debug, Default, Clone)]
pub struct RankedAlphabet {
	arities: HashMap<Symbol, Arity>,
}

impl RankedAlphabet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares `symbol` with the given arity. Returns an error if the
	/// symbol was already declared with a different arity.
	pub fn declare(&mut self, symbol: Symbol, arity: Arity) -> Result<(), crate::error::Error> {
		match self.arities.insert(symbol, arity) {
			Some(old) if old != arity => Err(crate::error::Error::ArityMismatch {
				symbol,
				expected: old,
				found: arity,
			}),
			_ => Ok(()),
		}
	}
}

impl Alphabet for RankedAlphabet {
	fn arity_of(&self, symbol: Symbol) -> Option<Arity> {
		self.arities.get(&symbol).copied()
	}

	fn symbols(&self) -> Box<dyn Iterator<Item = Symbol> + '_> {
		Box::new(self.arities.keys().copied())
	}
}
