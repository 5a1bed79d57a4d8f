//! Downward language inclusion for explicit tree automata (C6).
//!
//! Decides `L(smaller) ⊆ L(bigger)` by computing, for every state `p` of
//! `smaller`, an antichain of minimal "witness" state sets of `bigger`:
//! `S` witnesses `p` when every tree derivable at `p` in `smaller` is also
//! derivable at some state of `S` in `bigger`. `smaller`'s language is
//! included in `bigger`'s iff some witness of a final state of `smaller`
//! lies entirely within `bigger`'s final states.
//!
//! The source computes this demand-driven, with a `(state, StateSet)`
//! workset split into `processed`/`nonincluded`/`workset` antichains and a
//! `lte_cache` of pairwise state comparisons, plus a non-recursive
//! `ExpandStackFrame`-based variant that avoids growing the native call
//! stack on deep automata. This port instead runs a bottom-up
//! least-fixpoint over every state's witness antichain simultaneously
//! (the same style as [`crate::simulation::refine`]'s relation refinement
//! and [`crate::tree::TransitionStore::useful_states`]'s fixpoint): it
//! reaches the same answer, is naturally total on cyclic transition
//! graphs, but does not pursue the source's single-final-state laziness
//! or its stack-depth guarantee; it does reuse the source's caching idea
//! via [`crate::cache::CachedBinaryOp`] to avoid rescanning `bigger`'s
//! transitions for a combo already seen in an earlier round. See
//! DESIGN.md.
use std::collections::HashMap;

use crate::alphabet::{Alphabet, Symbol};
use crate::antichain::{Antichain1C, StateSet};
use crate::cache::CachedBinaryOp;
use crate::state::State;
use crate::tree::Automaton as TreeAutomaton;

/// `true` iff `L(smaller) ⊆ L(bigger)` (§4.6, CLI `incl` verb, direction
/// "downward").
pub fn check_downward_inclusion<A: Alphabet>(
	smaller: &TreeAutomaton<A>,
	bigger: &TreeAutomaton<A>,
) -> bool {
	let witness = match compute_witnesses(smaller, bigger) {
		Some(w) => w,
		None => return false,
	};

	smaller.finals().iter().any(|f| {
		witness
			.get(f)
			.is_some_and(|ac| ac.data().iter().any(|w| w.iter().all(|s| bigger.finals().contains(s))))
	})
}

/// The least fixpoint mapping each state of `smaller` to the antichain of
/// minimal `bigger` state sets witnessing it, or `None` if some transition
/// whose children are already witnessed finds no covering `bigger`
/// transition at all while its parent is final in `smaller` — a hard
/// refutation (§4.6/§4.7: "if empty while A-parent is final, refute"; see
/// `explicit_tree_incl_up.hh`'s unconditional `if (post.data().empty())
/// return false`).
fn compute_witnesses<A: Alphabet>(
	smaller: &TreeAutomaton<A>,
	bigger: &TreeAutomaton<A>,
) -> Option<HashMap<State, Antichain1C<StateSet>>> {
	let leq = |a: &StateSet, b: &StateSet| a.is_subset(b);
	let mut witness: HashMap<State, Antichain1C<StateSet>> = HashMap::new();
	// Memoizes, per (symbol, combo), the `bigger` parents covering that
	// combo: `bigger` never changes, so a combo recurring across fixpoint
	// rounds (every transition is rescanned each round) is a guaranteed
	// cache hit (§4.6: "`lte_cache` ... pairwise state comparisons").
	let mut combo_cache: CachedBinaryOp<Symbol, Vec<StateSet>, StateSet> = CachedBinaryOp::new();

	loop {
		let mut changed = false;

		for (parent, symbol, tuple) in smaller.transitions().all_transitions() {
			let children: Vec<State> = tuple.to_vec();

			let combos: Vec<Vec<StateSet>> = if children.is_empty() {
				vec![Vec::new()]
			} else {
				let mut per_child: Vec<&[StateSet]> = Vec::with_capacity(children.len());
				let mut all_known = true;
				for c in &children {
					match witness.get(c) {
						Some(ac) => per_child.push(ac.data()),
						None => {
							all_known = false;
							break;
						}
					}
				}
				if !all_known {
					// Some child has no witness yet; this transition cannot
					// contribute a candidate this round.
					continue;
				}
				cartesian_product(&per_child)
			};

			let mut new_states = StateSet::new();
			for combo in combos {
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
			} else {
				let entry = witness.entry(parent).or_default();
				if entry.insert(new_states, leq) {
					changed = true;
				}
			}
		}

		if !changed {
			break;
		}
	}

	Some(witness)
}

fn cartesian_product(sets: &[&[StateSet]]) -> Vec<Vec<StateSet>> {
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
	fn downward_inclusion_positive_and_its_reverse_is_negative() {
		let alpha = alphabet();

		// smaller: a -> q0, b(q0) -> q1, final q1 (language: {b(a)})
		let mut smaller = TreeAutomaton::new(alpha.clone());
		smaller.add_transition(vec![], Symbol(0), State(0)).unwrap();
		smaller
			.add_transition(vec![State(0)], Symbol(1), State(1))
			.unwrap();
		smaller.add_final(State(1));

		// bigger: a -> p0, b(p0) -> p1, b(p1) -> p1, final p1
		// (language: {b(a), b(b(a)), ...} ⊇ {b(a)})
		let mut bigger = TreeAutomaton::new(alpha);
		bigger.add_transition(vec![], Symbol(0), State(0)).unwrap();
		bigger
			.add_transition(vec![State(0)], Symbol(1), State(1))
			.unwrap();
		bigger
			.add_transition(vec![State(1)], Symbol(1), State(1))
			.unwrap();
		bigger.add_final(State(1));

		assert!(check_downward_inclusion(&smaller, &bigger));
		assert!(!check_downward_inclusion(&bigger, &smaller));
	}
}
