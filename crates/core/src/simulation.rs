//! The simulation engine (C5): partition-relation refinement on an
//! intermediate LTS, producing a state preorder used to strengthen the
//! inclusion checkers.
use std::collections::{HashMap, HashSet};

use crate::alphabet::Alphabet;
use crate::finite::FiniteAutomaton;
use crate::lts::{Label, Lts};
use crate::state::State;
use crate::tree::Automaton as TreeAutomaton;

/// A reflexive, transitive preorder on states, as produced by
/// [`refine`] (§3, §4.5).
#[derive(Debug, Clone, Default)]
pub struct Preorder {
	relation: HashSet<(State, State)>,
}

impl Preorder {
	/// The preorder relating every state only to itself (used when
	/// simulation is disabled, §4.9).
	pub fn identity(states: impl IntoIterator<Item = State>) -> Self {
		let relation = states.into_iter().map(|s| (s, s)).collect();
		Self { relation }
	}

	pub fn leq(&self, p: State, q: State) -> bool {
		p == q || self.relation.contains(&(p, q))
	}

	pub fn pairs(&self) -> impl Iterator<Item = (State, State)> + '_ {
		self.relation.iter().copied()
	}

	fn from_pairs(relation: HashSet<(State, State)>) -> Self {
		let mut result = Self { relation };
		result.close_transitively();
		result
	}

	fn close_transitively(&mut self) {
		loop {
			let mut added = Vec::new();
			for &(a, b) in &self.relation {
				for &(c, d) in &self.relation {
					if b == c && !self.relation.contains(&(a, d)) {
						added.push((a, d));
					}
				}
			}
			if added.is_empty() {
				break;
			}
			self.relation.extend(added);
		}
	}
}

/// Refines the LTS's initial partition-induced relation to the coarsest
/// simulation compatible with it (the maximal downward/upward simulation,
/// §4.5).
///
/// This computes the same greatest fixpoint the source's counter-driven
/// OLRT refinement computes, but by directly shrinking a candidate
/// relation each round rather than maintaining per-label `SharedCounter`
/// "remove" worklists. OLRT's bookkeeping exists to amortize the
/// refinement to near-linear time; it does not change the fixpoint being
/// computed, so the two are observationally identical on the contract in
/// §4.5 ("Determinism: output is a function of (LTS, partition, relation),
/// not of iteration order"). See DESIGN.md.
pub fn refine(lts: &Lts) -> Preorder {
	let mut adjacency: HashMap<State, Vec<(Label, State)>> = HashMap::new();
	for &(src, label, dst) in &lts.edges {
		adjacency.entry(src).or_default().push((label, dst));
	}

	let mut relation: HashSet<(State, State)> = HashSet::new();
	for &p in &lts.states {
		for &q in &lts.states {
			if compatible(lts, p, q) {
				relation.insert((p, q));
			}
		}
	}

	loop {
		let mut next = relation.clone();
		let mut changed = false;

		for &(p, q) in &relation {
			let p_moves = adjacency.get(&p).map_or(&[][..], |v| v.as_slice());
			let q_moves = adjacency.get(&q).map_or(&[][..], |v| v.as_slice());

			let matched = p_moves.iter().all(|&(label, p_succ)| {
				q_moves
					.iter()
					.any(|&(q_label, q_succ)| q_label == label && relation.contains(&(p_succ, q_succ)))
			});

			if !matched {
				next.remove(&(p, q));
				changed = true;
			}
		}

		relation = next;
		if !changed {
			break;
		}
	}

	Preorder::from_pairs(relation)
}

/// `true` iff `p` and `q` are allowed to relate under the initial
/// partition. The leaf/start sentinel class only ever relates to itself.
/// Otherwise, an ordered LTS (downward simulation: final=1, non-final=0)
/// allows `p <= q` whenever `class(p) <= class(q)` — so a final state can
/// only be simulated by another final state, while a non-final state may
/// be simulated by either — and an unordered LTS (upward simulation's
/// environment buckets) requires exact class equality.
fn compatible(lts: &Lts, p: State, q: State) -> bool {
	use crate::lts::SENTINEL_CLASS;
	match (lts.class_of.get(&p), lts.class_of.get(&q)) {
		(Some(&cp), Some(&cq)) => {
			if cp == SENTINEL_CLASS || cq == SENTINEL_CLASS {
				cp == cq
			} else if lts.ordered {
				cp <= cq
			} else {
				cp == cq
			}
		}
		_ => false,
	}
}

/// Computes the maximal downward simulation on an explicit tree automaton
/// and projects it back onto the automaton's own state space (§4.5 step 5).
pub fn compute_downward_simulation<A: Alphabet>(aut: &TreeAutomaton<A>) -> Preorder {
	let (lts, leaf) = Lts::downward_tree(aut);
	let full = refine(&lts);
	project_out(full, leaf)
}

/// Computes the maximal downward simulation on a finite automaton.
pub fn compute_downward_simulation_finite(aut: &FiniteAutomaton) -> Preorder {
	let (lts, sentinel) = Lts::downward_finite(aut);
	let full = refine(&lts);
	project_out(full, sentinel)
}

/// Computes the maximal upward simulation on an explicit tree automaton,
/// projecting out the synthetic environment states (§4.5).
pub fn compute_upward_simulation<A: Alphabet>(aut: &TreeAutomaton<A>) -> Preorder {
	let lts = Lts::upward_tree(aut);
	let real_states: HashSet<State> = aut.states();
	let full = refine(&lts);

	let relation = full
		.pairs()
		.filter(|(p, q)| real_states.contains(p) && real_states.contains(q))
		.collect();
	Preorder::from_pairs(relation)
}

/// Maps every state to the smallest-numbered state it's simulation-
/// equivalent to (`p <= q` and `q <= p`), giving one canonical
/// representative per equivalence class.
fn representatives(states: &HashSet<State>, preorder: &Preorder) -> HashMap<State, State> {
	let mut ordered: Vec<State> = states.iter().copied().collect();
	ordered.sort();

	let mut repr: HashMap<State, State> = HashMap::new();
	for &s in &ordered {
		if repr.contains_key(&s) {
			continue;
		}
		repr.insert(s, s);
		for &t in &ordered {
			if t > s && !repr.contains_key(&t) && preorder.leq(s, t) && preorder.leq(t, s) {
				repr.insert(t, s);
			}
		}
	}
	repr
}

/// Quotients a tree automaton by simulation equivalence (§4.5, CLI `red`):
/// states related both ways under `preorder` collapse onto their smallest-
/// numbered representative.
pub fn quotient_tree<A: Alphabet>(aut: &TreeAutomaton<A>, preorder: &Preorder) -> TreeAutomaton<A> {
	let repr = representatives(&aut.states(), preorder);

	let mut result = TreeAutomaton::new(aut.alphabet().clone());
	for (parent, symbol, tuple) in aut.transitions().all_transitions() {
		let children: Vec<State> = tuple.iter().map(|c| repr[c]).collect();
		result
			.add_transition(children, symbol, repr[&parent])
			.expect("quotienting preserves each symbol's arity");
	}
	for &f in aut.finals() {
		result.add_final(repr[&f]);
	}
	result
}

/// The finite-automaton counterpart of [`quotient_tree`].
pub fn quotient_finite(aut: &FiniteAutomaton, preorder: &Preorder) -> FiniteAutomaton {
	let repr = representatives(&aut.states(), preorder);

	let mut result = FiniteAutomaton::new();
	for q in aut.states() {
		for symbol in aut.start_symbols(q) {
			result.add_start(repr[&q], symbol);
		}
		for (symbol, to) in aut.transitions_from(q) {
			result.add_transition(repr[&q], symbol, repr[&to]);
		}
	}
	for &f in aut.final_states() {
		result.add_final(repr[&f]);
	}
	result
}

fn project_out(preorder: Preorder, sentinel: State) -> Preorder {
	let relation = preorder
		.pairs()
		.filter(|&(p, q)| p != sentinel && q != sentinel)
		.collect();
	Preorder::from_pairs(relation)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::alphabet::{RankedAlphabet, Symbol};
	use std::rc::Rc;

	fn alphabet() -> Rc<RankedAlphabet> {
		let mut a = RankedAlphabet::new();
		a.declare(Symbol(0), 0).unwrap(); // a
		a.declare(Symbol(1), 1).unwrap(); // b
		Rc::new(a)
	}

	#[test]
	fn simulation_is_a_preorder() {
		let alpha = alphabet();
		let mut aut = TreeAutomaton::new(alpha);
		aut.add_transition(vec![], Symbol(0), State(0)).unwrap();
		aut.add_transition(vec![State(0)], Symbol(1), State(1)).unwrap();
		aut.add_final(State(1));

		let sim = compute_downward_simulation(&aut);
		for q in aut.states() {
			assert!(sim.leq(q, q), "reflexivity fails for {q:?}");
		}
	}

	#[test]
	fn non_final_is_simulated_by_final_but_not_vice_versa() {
		let alpha = alphabet();
		let mut aut = TreeAutomaton::new(alpha);
		aut.add_transition(vec![], Symbol(0), State(0)).unwrap(); // non-final
		aut.add_transition(vec![], Symbol(0), State(1)).unwrap();
		aut.add_final(State(1));

		let sim = compute_downward_simulation(&aut);
		assert!(sim.leq(State(0), State(1)));
		assert!(!sim.leq(State(1), State(0)));
	}

	#[test]
	fn quotient_tree_merges_equivalent_ground_states() {
		let alpha = alphabet();
		let mut aut = TreeAutomaton::new(alpha);
		aut.add_transition(vec![], Symbol(0), State(0)).unwrap();
		aut.add_transition(vec![], Symbol(0), State(1)).unwrap();
		aut.add_final(State(0));
		aut.add_final(State(1));

		let sim = compute_downward_simulation(&aut);
		let quotient = quotient_tree(&aut, &sim);
		assert_eq!(quotient.states().len(), 1);
		assert!(!quotient.is_language_empty());
	}
}
