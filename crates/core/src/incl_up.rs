//! Upward language inclusion for explicit tree automata (C7).
//!
//! Decides `L(smaller) ⊆ L(bigger)` with the same witness-antichain model
//! as [`crate::incl_down`] (a state `p` of `smaller` is witnessed by a set
//! `S` of `bigger` states when every tree at `p` is also derivable at some
//! state of `S`), but propagates it the opposite way: starting from ground
//! transitions and pushing newly-discovered witnesses up through
//! [`crate::tree::TransitionStore::bottom_up_indexes`] to the parents that
//! are affected, rather than rescanning every transition every round.
//!
//! The source pairs this traversal order with a `next`/`processed`/
//! `temporary` antichain triple, a `biggerTypeCache`, and explicit
//! `ChoiceVector` enumeration over a transition's sibling positions. This
//! port's worklist plays the role of `next`/`temporary` (a parent is
//! requeued whenever one of its children's witnesses grows), the
//! per-transition combination search below plays `ChoiceVector`
//! enumeration, and a [`crate::cache::CachedBinaryOp`] plays
//! `biggerTypeCache`/`evalTransitionsCache`, memoizing which `bigger`
//! parents cover a given `(symbol, combo)` pair across positions. See
//! DESIGN.md.
use std::collections::{HashMap, HashSet, VecDeque};

use crate::alphabet::{Alphabet, Symbol};
use crate::antichain::{Antichain1C, StateSet};
use crate::cache::CachedBinaryOp;
use crate::state::State;
use crate::tree::Automaton as TreeAutomaton;

/// `true` iff `L(smaller) ⊆ L(bigger)` (§4.7, CLI `incl` verb, direction
/// "upward").
pub fn check_upward_inclusion<A: Alphabet>(
	smaller: &TreeAutomaton<A>,
	bigger: &TreeAutomaton<A>,
) -> bool {
	let witness = match compute_witnesses_upward(smaller, bigger) {
		Some(w) => w,
		None => return false,
	};

	smaller.finals().iter().any(|f| {
		witness
			.get(f)
			.is_some_and(|ac| ac.data().iter().any(|w| w.iter().all(|s| bigger.finals().contains(s))))
	})
}

/// Returns `None` on a hard refutation: some ground symbol of `smaller`
/// has no matching ground transition in `bigger` at all, or some
/// fully-witnessed transition finds no covering `bigger` transition while
/// its parent is final in `smaller` (§4.7: "if empty while A-parent is
/// final, refute", mirroring `explicit_tree_incl_up.hh`'s unconditional
/// `if (post.data().empty()) return false`).
fn compute_witnesses_upward<A: Alphabet>(
	smaller: &TreeAutomaton<A>,
	bigger: &TreeAutomaton<A>,
) -> Option<HashMap<State, Antichain1C<StateSet>>> {
	let leq = |a: &StateSet, b: &StateSet| a.is_subset(b);
	let mut witness: HashMap<State, Antichain1C<StateSet>> = HashMap::new();
	let indexes = smaller.transitions().bottom_up_indexes();
	let bigger_indexes = bigger.transitions().bottom_up_indexes();
	// Memoizes, per (symbol, combo), the `bigger` parents covering that
	// combo — the role of the source's `biggerTypeCache`/`evalTransitionsCache`
	// (§4.7), since a sibling position can resubmit the same combo more
	// than once as other siblings' witnesses grow.
	let mut combo_cache: CachedBinaryOp<Symbol, Vec<StateSet>, StateSet> = CachedBinaryOp::new();

	let mut worklist: VecDeque<State> = VecDeque::new();
	let mut queued: HashSet<State> = HashSet::new();

	// Seed from ground transitions (arity 0): a "choice vector" of zero
	// children, matched directly against bigger's ground transitions.
	for symbol in indexes.ground_symbols() {
		let candidates: StateSet = bigger_indexes
			.ground_transitions(symbol)
			.iter()
			.map(|&(_, q)| q)
			.collect();
		if candidates.is_empty() {
			if indexes
				.ground_transitions(symbol)
				.iter()
				.any(|&(_, parent)| smaller.finals().contains(&parent))
			{
				return None;
			}
			continue;
		}
		for &(_, parent) in indexes.ground_transitions(symbol) {
			if witness.entry(parent).or_default().insert(candidates.clone(), leq)
				&& queued.insert(parent)
			{
				worklist.push_back(parent);
			}
		}
	}

	while let Some(child) = worklist.pop_front() {
		queued.remove(&child);

		for (symbol, pos) in indexes.positions_of(child) {
			for &(parent, ref tuple) in indexes.at_position(child, symbol, pos) {
				// Every sibling's witness must already be known for this
				// transition's choice vector to be computable.
				let mut siblings_known = true;
				let mut per_position: Vec<&[StateSet]> = Vec::with_capacity(tuple.len());
				for sibling in tuple.iter() {
					match witness.get(sibling) {
						Some(ac) => per_position.push(ac.data()),
						None => {
							siblings_known = false;
							break;
						}
					}
				}
				if !siblings_known {
					continue;
				}

				let mut new_states = StateSet::new();
				for combo in choice_vectors(&per_position) {
					let covering = combo_cache.get_or_compute(symbol, combo.clone(), || {
						let mut found = StateSet::new();
						for (b_parent, b_symbol, b_tuple) in bigger.transitions().all_transitions() {
							if b_symbol != symbol || b_tuple.len() != combo.len() {
								continue;
							}
							if b_tuple
								.iter()
								.zip(combo.iter())
								.all(|(d, set)| set.contains(d))
							{
								found.insert(b_parent);
							}
						}
						found
					});
					new_states.extend(covering.iter().copied());
				}

				if new_states.is_empty() {
					if smaller.finals().contains(&parent) {
						return None;
					}
				} else if witness.entry(parent).or_default().insert(new_states, leq)
					&& queued.insert(parent)
				{
					worklist.push_back(parent);
				}
			}
		}
	}

	Some(witness)
}

/// Enumerates every combination of one witness-antichain entry per sibling
/// position (the source's `ChoiceVector`).
fn choice_vectors(sets: &[&[StateSet]]) -> Vec<Vec<StateSet>> {
	let mut result: Vec<Vec<StateSet>> = vec![Vec::new()];
	for entries in sets {
		let mut next = Vec::with_capacity(result.len() * entries.len().max(1));
		for prefix in &result {
			for entry in entries.iter() {
				let mut v = prefix.clone();
				v.push(entry.clone());
				next.push(v);
			}
		}
		result = next;
	}
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::alphabet::{RankedAlphabet, Symbol};
	use std::rc::Rc;

	fn alphabet() -> Rc<RankedAlphabet> {
		let mut a = RankedAlphabet::new();
		a.declare(Symbol(0), 0).unwrap(); // a
		a.declare(Symbol(1), 1).unwrap(); // unary b
		Rc::new(a)
	}

	#[test]
	fn upward_inclusion_agrees_with_downward_on_the_same_pair() {
		let alpha = alphabet();

		let mut smaller = TreeAutomaton::new(alpha.clone());
		smaller.add_transition(vec![], Symbol(0), State(0)).unwrap();
		smaller
			.add_transition(vec![State(0)], Symbol(1), State(1))
			.unwrap();
		smaller.add_final(State(1));

		let mut bigger = TreeAutomaton::new(alpha);
		bigger.add_transition(vec![], Symbol(0), State(0)).unwrap();
		bigger
			.add_transition(vec![State(0)], Symbol(1), State(1))
			.unwrap();
		bigger
			.add_transition(vec![State(1)], Symbol(1), State(1))
			.unwrap();
		bigger.add_final(State(1));

		assert!(check_upward_inclusion(&smaller, &bigger));
		assert!(!check_upward_inclusion(&bigger, &smaller));
	}
}
