//! Finite automata (rank-1 tree automata) used by the congruence-closure
//! inclusion/equivalence checker (C8).
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::alphabet::Symbol;
use crate::state::{State, StateAllocator};

/// A finite automaton: start states (each carrying the set of symbols that
/// may fire from it as an initial move, per the Timbuk encoding `sym -> q`
/// in §6), final states, and a deterministic-or-not transition relation
/// `state -> symbol -> {next states}` (§3).
#[derive(Debug, Clone, Default)]
pub struct FiniteAutomaton {
	start_states: HashMap<State, HashSet<Symbol>>,
	final_states: HashSet<State>,
	transitions: HashMap<State, HashMap<Symbol, HashSet<State>>>,
}

impl FiniteAutomaton {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_start(&mut self, state: State, symbol: Symbol) {
		self.start_states.entry(state).or_default().insert(symbol);
	}

	pub fn add_final(&mut self, state: State) {
		self.final_states.insert(state);
	}

	pub fn add_transition(&mut self, from: State, symbol: Symbol, to: State) {
		self.transitions
			.entry(from)
			.or_default()
			.entry(symbol)
			.or_default()
			.insert(to);
	}

	pub fn start_states(&self) -> impl Iterator<Item = State> + '_ {
		self.start_states.keys().copied()
	}

	pub fn start_symbols(&self, state: State) -> impl Iterator<Item = Symbol> + '_ {
		self.start_states
			.get(&state)
			.into_iter()
			.flat_map(|s| s.iter().copied())
	}

	pub fn is_start(&self, state: State) -> bool {
		self.start_states.contains_key(&state)
	}

	pub fn is_final(&self, state: State) -> bool {
		self.final_states.contains(&state)
	}

	pub fn final_states(&self) -> &HashSet<State> {
		&self.final_states
	}

	pub fn successors(&self, state: State, symbol: Symbol) -> impl Iterator<Item = State> + '_ {
		self.transitions
			.get(&state)
			.and_then(|m| m.get(&symbol))
			.into_iter()
			.flatten()
			.copied()
	}

	pub fn transitions_from(&self, state: State) -> impl Iterator<Item = (Symbol, State)> + '_ {
		self.transitions
			.get(&state)
			.into_iter()
			.flat_map(|m| m.iter())
			.flat_map(|(&sym, targets)| targets.iter().map(move |&t| (sym, t)))
	}

	pub fn alphabet(&self) -> HashSet<Symbol> {
		let mut symbols: HashSet<Symbol> = self
			.transitions
			.values()
			.flat_map(|m| m.keys().copied())
			.collect();
		symbols.extend(self.start_states.values().flat_map(|s| s.iter().copied()));
		symbols
	}

	pub fn states(&self) -> HashSet<State> {
		let mut states: HashSet<State> = self.start_states.keys().copied().collect();
		states.extend(self.final_states.iter().copied());
		states.extend(self.transitions.keys().copied());
		for m in self.transitions.values() {
			for targets in m.values() {
				states.extend(targets.iter().copied());
			}
		}
		states
	}

	/// The successor macro-state reachable from `from` on `symbol`.
	pub fn macro_step(&self, from: &BTreeSet<State>, symbol: Symbol) -> BTreeSet<State> {
		from.iter()
			.flat_map(|&q| self.successors(q, symbol))
			.collect()
	}

	/// The macro-state reached by starting the automaton and firing
	/// `symbol` as the first move.
	pub fn macro_initial(&self, symbol: Symbol) -> BTreeSet<State> {
		self.start_states
			.iter()
			.filter(|(_, symbols)| symbols.contains(&symbol))
			.map(|(&q, _)| q)
			.collect()
	}

	pub fn union(&mut self, other: &Self) {
		for (&state, symbols) in &other.start_states {
			self.start_states.entry(state).or_default().extend(symbols.iter().copied());
		}
		self.final_states.extend(other.final_states.iter().copied());
		for (&from, by_symbol) in &other.transitions {
			for (&symbol, targets) in by_symbol {
				for &to in targets {
					self.add_transition(from, symbol, to);
				}
			}
		}
	}

	/// Unreachable-state pruning: BFS forward from the start states.
	pub fn remove_unreachable(&self) -> Self {
		let mut reached: HashSet<State> = self.start_states.keys().copied().collect();
		let mut stack: Vec<State> = reached.iter().copied().collect();
		while let Some(q) = stack.pop() {
			for (_, r) in self.transitions_from(q) {
				if reached.insert(r) {
					stack.push(r);
				}
			}
		}

		let mut result = Self::new();
		for (&q, symbols) in &self.start_states {
			if reached.contains(&q) {
				for &s in symbols {
					result.add_start(q, s);
				}
			}
		}
		for &q in &self.final_states {
			if reached.contains(&q) {
				result.add_final(q);
			}
		}
		for (&from, by_symbol) in &self.transitions {
			if !reached.contains(&from) {
				continue;
			}
			for (&symbol, targets) in by_symbol {
				for &to in targets {
					if reached.contains(&to) {
						result.add_transition(from, symbol, to);
					}
				}
			}
		}
		result
	}

	/// `true` iff no state has two distinct transitions on the same symbol
	/// and no two start states share a starting symbol — the precondition
	/// for [`Self::complement`] (§6 `cmpl`: "DFA assumption").
	pub fn is_deterministic(&self) -> bool {
		let mut symbol_starts: HashMap<Symbol, HashSet<State>> = HashMap::new();
		for (&state, symbols) in &self.start_states {
			for &symbol in symbols {
				symbol_starts.entry(symbol).or_default().insert(state);
			}
		}
		if symbol_starts.values().any(|states| states.len() > 1) {
			return false;
		}

		self.transitions
			.values()
			.all(|m| m.values().all(|targets| targets.len() <= 1))
	}

	/// Completes a deterministic automaton with a sink state and
	/// complements the final states.
	pub fn complement(&self, alloc: &mut StateAllocator) -> Result<Self, crate::error::Error> {
		if !self.is_deterministic() {
			return Err(crate::error::Error::PreconditionViolated(
				"complement requires a deterministic finite automaton",
			));
		}

		let alphabet = self.alphabet();
		let mut states: HashSet<State> = self.states();
		for &s in &states {
			alloc.reserve_up_to(s);
		}
		let sink = alloc.fresh();
		states.insert(sink);

		let mut result = self.clone();
		for &symbol in &alphabet {
			if self.macro_initial(symbol).is_empty() {
				result.add_start(sink, symbol);
			}
		}
		for &q in &states {
			for &symbol in &alphabet {
				if self.successors(q, symbol).next().is_none() {
					result.add_transition(q, symbol, sink);
				}
			}
		}

		result.final_states = states.difference(&self.final_states).copied().collect();
		Ok(result)
	}

	/// Reverses every transition and swaps the roles of start and final
	/// states, grounded in the original's `explicit_finite_reverse.hh`.
	///
	/// There is no canonical single "first symbol" to tag a new start
	/// state with once acceptance and initiation swap roles in this
	/// symbol-tagged-start encoding, so every former final state is made a
	/// start state for every symbol that was a start symbol somewhere in
	/// the original (see DESIGN.md).
	pub fn reverse(&self) -> Self {
		let mut result = Self::new();

		for (&from, by_symbol) in &self.transitions {
			for (&symbol, targets) in by_symbol {
				for &to in targets {
					result.add_transition(to, symbol, from);
				}
			}
		}

		let start_symbols: HashSet<Symbol> = self
			.start_states
			.values()
			.flat_map(|s| s.iter().copied())
			.collect();
		for &q in &self.final_states {
			for &symbol in &start_symbols {
				result.add_start(q, symbol);
			}
		}
		for &q in self.start_states.keys() {
			result.add_final(q);
		}

		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn remove_unreachable_drops_dead_state() {
		let mut a = FiniteAutomaton::new();
		a.add_start(State(0), Symbol(0));
		a.add_transition(State(0), Symbol(1), State(1));
		a.add_final(State(1));
		a.add_transition(State(2), Symbol(0), State(2)); // unreachable island

		let pruned = a.remove_unreachable();
		assert!(!pruned.states().contains(&State(2)));
	}

	#[test]
	fn complement_flips_acceptance() {
		let mut a = FiniteAutomaton::new();
		a.add_start(State(0), Symbol(0));
		a.add_final(State(0));

		let mut alloc = StateAllocator::new();
		let comp = a.complement(&mut alloc).unwrap();
		assert!(!comp.is_final(State(0)));
	}
}
