use std::collections::HashMap;
use std::rc::Rc;

use vata_core::alphabet::{Arity, RankedAlphabet, Symbol};
use vata_core::finite::FiniteAutomaton;
use vata_core::state::State;
use vata_core::tree::Automaton as TreeAutomaton;

use crate::Error;

/// A bidirectional name<->id table, used for both symbols and states: the
/// core treats both as opaque integers, but Timbuk text names them (§6).
///
/// `Default`/`Clone` are hand-written rather than derived: a derive would
/// add a spurious `T: Default`/`T: Clone` bound (neither `Symbol` nor
/// `State` need one for an empty or copied table).
#[derive(Debug)]
pub struct NameTable<T> {
	by_name: HashMap<String, T>,
	by_id: HashMap<T, String>,
}

impl<T> Default for NameTable<T> {
	fn default() -> Self {
		Self {
			by_name: HashMap::new(),
			by_id: HashMap::new(),
		}
	}
}

impl<T: Clone> Clone for NameTable<T> {
	fn clone(&self) -> Self {
		Self {
			by_name: self.by_name.clone(),
			by_id: self.by_id.clone(),
		}
	}
}

impl<T: Copy + Eq + std::hash::Hash> NameTable<T> {
	pub fn name_of(&self, id: T) -> Option<&str> {
		self.by_id.get(&id).map(String::as_str)
	}

	pub fn id_of(&self, name: &str) -> Option<T> {
		self.by_name.get(name).copied()
	}

	fn insert(&mut self, name: &str, id: T) {
		self.by_name.insert(name.to_owned(), id);
		self.by_id.insert(id, name.to_owned());
	}
}

pub type SymbolTable = NameTable<Symbol>;
pub type StateTable = NameTable<State>;

impl SymbolTable {
	fn intern(&mut self, name: &str) -> Symbol {
		if let Some(id) = self.id_of(name) {
			return id;
		}
		let id = Symbol(self.by_name.len() as u32);
		self.insert(name, id);
		id
	}
}

impl StateTable {
	fn intern(&mut self, name: &str) -> State {
		if let Some(id) = self.id_of(name) {
			return id;
		}
		let id = State(self.by_name.len() as u32);
		self.insert(name, id);
		id
	}
}

/// A single parsed `Transitions` line. Timbuk's bare `sym -> q` form is
/// genuinely ambiguous between a ground (arity-0) tree transition and a
/// finite-automaton start production (§6); [`Document::build_tree_automaton`]
/// and [`Document::build_finite_automaton`] each resolve it their own way,
/// rather than the parser guessing.
#[derive(Debug, Clone)]
pub enum ParsedTransition {
	Bare { symbol: Symbol, state: State },
	WithChildren { symbol: Symbol, children: Vec<State>, state: State },
}

/// The parsed, not-yet-specialized contents of a Timbuk file (§6).
#[derive(Debug, Clone, Default)]
pub struct Document {
	pub automaton_name: String,
	pub symbols: SymbolTable,
	pub states: StateTable,
	pub arities: HashMap<Symbol, Arity>,
	pub declared_states: Vec<State>,
	pub final_states: Vec<State>,
	pub transitions: Vec<ParsedTransition>,
}

impl Document {
	pub(crate) fn intern_symbol(&mut self, name: &str) -> Symbol {
		self.symbols.intern(name)
	}

	pub(crate) fn intern_state(&mut self, name: &str) -> State {
		self.states.intern(name)
	}

	/// Builds a [`RankedAlphabet`] + [`TreeAutomaton`] from the document,
	/// treating bare `sym -> q` lines as ground (arity-0) transitions.
	pub fn build_tree_automaton(&self) -> Result<(Rc<RankedAlphabet>, TreeAutomaton<RankedAlphabet>), Error> {
		let mut alphabet = RankedAlphabet::new();
		for (&symbol, &arity) in &self.arities {
			alphabet.declare(symbol, arity)?;
		}
		let alphabet = Rc::new(alphabet);

		let mut aut = TreeAutomaton::new(alphabet.clone());
		for transition in &self.transitions {
			match transition {
				ParsedTransition::Bare { symbol, state } => {
					aut.add_transition(Vec::new(), *symbol, *state)?;
				}
				ParsedTransition::WithChildren { symbol, children, state } => {
					aut.add_transition(children.clone(), *symbol, *state)?;
				}
			}
		}
		for &f in &self.final_states {
			aut.add_final(f);
		}

		Ok((alphabet, aut))
	}

	/// Builds a [`FiniteAutomaton`] from the document: bare `sym -> q` lines
	/// become start productions, and `sym(q1) -> q2` lines become ordinary
	/// transitions (finite-automaton symbols have arity 1, so exactly one
	/// child is expected).
	pub fn build_finite_automaton(&self) -> Result<FiniteAutomaton, Error> {
		let mut aut = FiniteAutomaton::new();
		for transition in &self.transitions {
			match transition {
				ParsedTransition::Bare { symbol, state } => {
					aut.add_start(*state, *symbol);
				}
				ParsedTransition::WithChildren { symbol, children, state } => {
					let &[from] = children.as_slice() else {
						return Err(Error::ArityMismatchInTransition {
							symbol: self.symbols.name_of(*symbol).unwrap_or_default().to_owned(),
							declared: 1,
							found: children.len(),
						});
					};
					aut.add_transition(from, *symbol, *state);
				}
			}
		}
		for &f in &self.final_states {
			aut.add_final(f);
		}

		Ok(aut)
	}
}
