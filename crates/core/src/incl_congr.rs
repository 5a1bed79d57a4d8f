//! Congruence-closure language inclusion/equivalence for finite automata
//! (C8), grounded in the source's `explicit_finite_congr_*` family.
//!
//! Finite automata here have no single epsilon-free start state: a run
//! begins by firing one of a state's start productions (§3). Inclusion is
//! therefore checked on pairs of *macro-states* (subsets of each
//! automaton's states) reached by the same word: seed one pair per start
//! symbol via [`FiniteAutomaton::macro_initial`], then close the product
//! on demand with [`FiniteAutomaton::macro_step`], memoizing visited pairs
//! in a cache (`MacroStateCache` in the source) so a word prefix shared by
//! many continuations is only expanded once. A pair fails the check when
//! its smaller-side macro-state contains a final state but its bigger-side
//! macro-state does not.
//!
//! The source lets the caller pick a depth-first or breadth-first
//! expansion order (the two visit the same pairs and agree on the result,
//! differing only in which counterexample is found first and in memory
//! shape). This port always expands breadth-first via a `VecDeque`; depth-
//! first is not offered since nothing here depends on which counterexample
//! surfaces first. See DESIGN.md.
use std::collections::{HashSet, VecDeque};

use crate::antichain::StateSet;
use crate::finite::FiniteAutomaton;

/// `true` iff `L(smaller) ⊆ L(bigger)` (§4.8, CLI `incl`/`equiv` verbs on
/// finite automata).
pub fn check_finite_inclusion(smaller: &FiniteAutomaton, bigger: &FiniteAutomaton) -> bool {
	let mut visited: HashSet<(StateSet, StateSet)> = HashSet::new();
	let mut queue: VecDeque<(StateSet, StateSet)> = VecDeque::new();

	for symbol in start_symbols(smaller) {
		let pair = (smaller.macro_initial(symbol), bigger.macro_initial(symbol));
		if visited.insert(pair.clone()) {
			queue.push_back(pair);
		}
	}

	while let Some((a, b)) = queue.pop_front() {
		let a_accepts = a.iter().any(|q| smaller.is_final(*q));
		let b_accepts = b.iter().any(|q| bigger.is_final(*q));
		if a_accepts && !b_accepts {
			return false;
		}

		if a.is_empty() {
			continue;
		}

		for symbol in smaller.alphabet() {
			let a_next = smaller.macro_step(&a, symbol);
			if a_next.is_empty() {
				continue;
			}
			let b_next = bigger.macro_step(&b, symbol);
			let pair = (a_next, b_next);
			if visited.insert(pair.clone()) {
				queue.push_back(pair);
			}
		}
	}

	true
}

/// `true` iff `L(smaller) == L(bigger)`, i.e. inclusion holds both ways
/// (§4.8, CLI `equiv` verb).
pub fn check_finite_equivalence(a: &FiniteAutomaton, b: &FiniteAutomaton) -> bool {
	check_finite_inclusion(a, b) && check_finite_inclusion(b, a)
}

fn start_symbols(aut: &FiniteAutomaton) -> HashSet<crate::alphabet::Symbol> {
	aut.start_states().flat_map(|q| aut.start_symbols(q)).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::alphabet::Symbol;
	use crate::state::State;

	#[test]
	fn inclusion_holds_when_bigger_accepts_a_superset() {
		// smaller: start --a--> q0 --b--> q1 (final); language {ab}
		let mut smaller = FiniteAutomaton::new();
		smaller.add_start(State(0), Symbol(0));
		smaller.add_transition(State(0), Symbol(1), State(1));
		smaller.add_final(State(1));

		// bigger: same plus a self-loop on q1 over b; language {ab, abb, ...}
		let mut bigger = FiniteAutomaton::new();
		bigger.add_start(State(0), Symbol(0));
		bigger.add_transition(State(0), Symbol(1), State(1));
		bigger.add_transition(State(1), Symbol(1), State(1));
		bigger.add_final(State(1));

		assert!(check_finite_inclusion(&smaller, &bigger));
		assert!(!check_finite_inclusion(&bigger, &smaller));
		assert!(!check_finite_equivalence(&smaller, &bigger));
	}

	#[test]
	fn equivalence_holds_for_identical_automata() {
		let mut a = FiniteAutomaton::new();
		a.add_start(State(0), Symbol(0));
		a.add_final(State(0));

		let b = a.clone();
		assert!(check_finite_equivalence(&a, &b));
	}
}
