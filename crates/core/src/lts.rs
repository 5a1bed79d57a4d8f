//! The intermediate labeled-transition-system representation (§3, §4.5)
//! that [`crate::simulation`] refines into a state preorder.
use std::collections::{HashMap, HashSet};

use crate::alphabet::{Alphabet, Symbol};
use crate::finite::FiniteAutomaton;
use crate::state::State;
use crate::tree::Automaton as TreeAutomaton;

/// An LTS label: `(symbol, child position)` for a downward move, or a
/// dedicated ground-move marker for a 0-ary transition (§4.5: "a
/// distinguished leaf state carries ground transitions").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
	Child(Symbol, u16),
	Ground(Symbol),
	/// The single label used on the edge from an environment state up to
	/// the parent it completes, in the upward-simulation LTS.
	Up,
}

/// A labeled transition system over a dense `0..states.len()` state space,
/// with an initial partition (used to seed the simulation relation, §4.5
/// step 2) expressed as a class id per state.
pub struct Lts {
	pub edges: Vec<(State, Label, State)>,
	pub class_of: HashMap<State, u32>,
	pub states: HashSet<State>,
	/// `true` for the finality-ordered downward partitions (final=1,
	/// non-final=0, so a pair is only initially related when
	/// `class(p) <= class(q)`); `false` for the upward environment-bucket
	/// partition, where only equal buckets are initially related.
	pub ordered: bool,
}

/// Class id reserved for the leaf/start sentinel: it only relates to
/// itself, regardless of `ordered`.
pub const SENTINEL_CLASS: u32 = u32::MAX;

impl Lts {
	/// The LTS used to compute downward simulation on an explicit tree
	/// automaton: one edge per `(transition, child position)`, plus a
	/// ground edge into a shared sentinel leaf state. The initial partition
	/// separates final from non-final states, with the leaf sentinel in
	/// its own singleton class (§4.5 step 2).
	pub fn downward_tree<A: Alphabet>(aut: &TreeAutomaton<A>) -> (Self, State) {
		let leaf = fresh_sentinel(aut.states().iter().copied());
		let mut edges = Vec::new();
		let mut states: HashSet<State> = aut.states();
		states.insert(leaf);

		for (parent, symbol, tuple) in aut.transitions().all_transitions() {
			if tuple.is_empty() {
				edges.push((parent, Label::Ground(symbol), leaf));
			} else {
				for (i, &child) in tuple.iter().enumerate() {
					edges.push((parent, Label::Child(symbol, i as u16), child));
				}
			}
		}

		let mut class_of = HashMap::new();
		for &q in &states {
			let class = if q == leaf {
				SENTINEL_CLASS
			} else if aut.is_final(q) {
				1
			} else {
				0
			};
			class_of.insert(q, class);
		}

		(
			Self {
				edges,
				class_of,
				states,
				ordered: true,
			},
			leaf,
		)
	}

	/// The LTS used to compute downward simulation on a finite automaton:
	/// `(symbol)` edges plus a sentinel `start` state from which every
	/// start production emanates, mirroring the start-state sentinel noted
	/// in §4.5 step 2.
	pub fn downward_finite(aut: &FiniteAutomaton) -> (Self, State) {
		let start_sentinel = fresh_sentinel(aut.states().into_iter());
		let mut states: HashSet<State> = aut.states();
		states.insert(start_sentinel);

		let mut edges = Vec::new();
		for (from, symbol, to) in aut
			.states()
			.into_iter()
			.flat_map(|q| aut.transitions_from(q).map(move |(s, t)| (q, s, t)))
		{
			edges.push((from, Label::Child(symbol, 0), to));
		}
		for q in aut.start_states() {
			for symbol in aut.start_symbols(q) {
				edges.push((start_sentinel, Label::Child(symbol, 0), q));
			}
		}

		let mut class_of = HashMap::new();
		for &q in &states {
			let class = if q == start_sentinel {
				SENTINEL_CLASS
			} else if aut.is_final(q) {
				1
			} else {
				0
			};
			class_of.insert(q, class);
		}

		(
			Self {
				edges,
				class_of,
				states,
				ordered: true,
			},
			start_sentinel,
		)
	}

	/// The LTS used to compute upward simulation on an explicit tree
	/// automaton. For every transition `symbol(p1..pk) -> p` and position
	/// `i`, an environment state captures the sibling tuple with position
	/// `i` left out; `p_i` moves into that environment on `(symbol, i)`,
	/// and the environment moves up to `p` on [`Label::Up`] (§4.5 step 1).
	/// The initial partition groups states by which set of environments
	/// they can enter, approximating "one class per observed
	/// environment-equivalence bucket" (§4.5 step 2) by environment
	/// identity rather than a coarser semantic bucketing; see DESIGN.md.
	pub fn upward_tree<A: Alphabet>(aut: &TreeAutomaton<A>) -> Self {
		let mut edges = Vec::new();
		let mut env_id: HashMap<(Symbol, u16, Vec<State>, State), State> = HashMap::new();
		let mut next_env = fresh_sentinel(aut.states().iter().copied()).0;
		let mut states: HashSet<State> = aut.states();

		for (parent, symbol, tuple) in aut.transitions().all_transitions() {
			for (i, &pi) in tuple.iter().enumerate() {
				let others: Vec<State> = tuple
					.iter()
					.enumerate()
					.filter(|(j, _)| *j != i)
					.map(|(_, &s)| s)
					.collect();
				let key = (symbol, i as u16, others, parent);
				let env = *env_id.entry(key).or_insert_with(|| {
					let id = State(next_env);
					next_env += 1;
					id
				});
				states.insert(env);
				edges.push((pi, Label::Child(symbol, i as u16), env));
				edges.push((env, Label::Up, parent));
			}
		}

		// Bucket states by their outgoing environment-edge signature.
		let mut signature: HashMap<State, Vec<(Symbol, u16, State)>> = HashMap::new();
		for &(src, label, dst) in &edges {
			if let Label::Child(sym, pos) = label {
				signature.entry(src).or_default().push((sym, pos, dst));
			}
		}
		for sigs in signature.values_mut() {
			sigs.sort();
		}

		let mut bucket_of_sig: HashMap<Vec<(Symbol, u16, State)>, u32> = HashMap::new();
		let mut class_of = HashMap::new();
		for &q in &states {
			let sig = signature.get(&q).cloned().unwrap_or_default();
			let next_id = bucket_of_sig.len() as u32;
			let class = *bucket_of_sig.entry(sig).or_insert(next_id);
			class_of.insert(q, class);
		}

		Self {
			edges,
			class_of,
			states,
			ordered: false,
		}
	}

	pub fn edges_from(&self, q: State) -> impl Iterator<Item = (Label, State)> + '_ {
		self.edges
			.iter()
			.filter(move |(src, _, _)| *src == q)
			.map(|&(_, l, dst)| (l, dst))
	}
}

fn fresh_sentinel(existing: impl Iterator<Item = State>) -> State {
	State(existing.map(|s| s.0).max().map_or(0, |m| m + 1))
}
