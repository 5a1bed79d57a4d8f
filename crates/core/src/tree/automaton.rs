use std::collections::HashSet;
use std::rc::Rc;

use crate::alphabet::{Alphabet, Symbol};
use crate::error::Error;
use crate::state::State;

use super::store::{ChildTuple, TransitionStore, TupleCache};

/// An explicit bottom-up tree automaton: final states + transition store +
/// a reference to the (externally owned) alphabet giving each symbol's
/// arity (§3).
///
/// `Clone` is derived via `educe` rather than `#[derive(Clone)]`: cloning
/// only clones the `Rc<A>` handle, so it should not require `A: Clone`
/// (a plain derive would add that bound unconditionally).
#[derive(educe::Educe)]
#[educe(Clone)]
pub struct Automaton<A> {
	finals: HashSet<State>,
	transitions: TransitionStore,
	alphabet: Rc<A>,
}

impl<A: Alphabet> Automaton<A> {
	pub fn new(alphabet: Rc<A>) -> Self {
		Self {
			finals: HashSet::new(),
			transitions: TransitionStore::default(),
			alphabet,
		}
	}

	pub fn with_tuple_cache(alphabet: Rc<A>, tuple_cache: Rc<TupleCache>) -> Self {
		Self {
			finals: HashSet::new(),
			transitions: TransitionStore::new(tuple_cache),
			alphabet,
		}
	}

	pub fn alphabet(&self) -> &Rc<A> {
		&self.alphabet
	}

	pub fn transitions(&self) -> &TransitionStore {
		&self.transitions
	}

	pub fn finals(&self) -> &HashSet<State> {
		&self.finals
	}

	pub fn is_final(&self, q: State) -> bool {
		self.finals.contains(&q)
	}

	pub fn add_final(&mut self, q: State) {
		self.finals.insert(q);
	}

	/// Adds a transition, checking the symbol's declared arity against the
	/// supplied child tuple (§4.3: "malformed tuples are caller errors").
	pub fn add_transition(
		&mut self,
		children: Vec<State>,
		symbol: Symbol,
		parent: State,
	) -> Result<(), Error> {
		let arity = self
			.alphabet
			.arity_of(symbol)
			.ok_or(Error::UnknownSymbol(symbol))?;

		if children.len() != arity as usize {
			return Err(Error::WrongTupleArity {
				symbol,
				expected: arity,
				found: children.len(),
			});
		}

		self.transitions.add_transition(children, symbol, parent);
		Ok(())
	}

	pub fn states(&self) -> HashSet<State> {
		let mut states: HashSet<State> = self.transitions.states().collect();
		states.extend(self.finals.iter().copied());
		for (_, _, tuple) in self.transitions.all_transitions() {
			states.extend(tuple.iter().copied());
		}
		states
	}

	/// Unreachable-state pruning (§4.3, §4.10).
	pub fn remove_unreachable(&self) -> Self {
		let (transitions, reached) = self.transitions.remove_unreachable(&self.finals);
		Self {
			finals: self.finals.intersection(&reached).copied().collect(),
			transitions,
			alphabet: self.alphabet.clone(),
		}
	}

	/// Useless-state pruning followed by unreachable-state pruning
	/// (§4.3, §4.10).
	pub fn remove_useless(&self) -> Self {
		let (transitions, reached) = self.transitions.remove_useless(&self.finals);
		Self {
			finals: self.finals.intersection(&reached).copied().collect(),
			transitions,
			alphabet: self.alphabet.clone(),
		}
	}

	/// A minimal sub-automaton accepting at least one tree, or an empty
	/// automaton if `L(self)` is empty (§4.3, §4.10, CLI `witness` verb).
	pub fn candidate_tree(&self) -> Self {
		let (transitions, finals) = self.transitions.candidate_tree(&self.finals);
		Self {
			finals,
			transitions,
			alphabet: self.alphabet.clone(),
		}
	}

	pub fn is_language_empty(&self) -> bool {
		self.transitions.useful_states().is_disjoint(&self.finals)
	}

	/// Adds `other`'s transitions and final states into `self`. Callers are
	/// responsible for ensuring the two automata's states don't collide
	/// unless that's intended (mirrors `NFA::union`/`mapped_union` in the
	/// teacher crate, which leaves renumbering to the caller).
	pub fn union(&mut self, other: &Self) {
		for (parent, symbol, tuple) in other.transitions.all_transitions() {
			self.transitions.add_transition(tuple.to_vec(), symbol, parent);
		}
		self.finals.extend(other.finals.iter().copied());
	}

	/// The product automaton of `self` and `other`: a transition
	/// `f(p1..pk) -> p` in `self` and `f(q1..qk) -> q` in `other` yield
	/// `f((p1,q1)..(pk,qk)) -> (p,q)` in the result, via `pair_state`. Final
	/// states are exactly the pairs where both components are final.
	/// Unreachable/useless pruning is a separate step (C10); this mirrors
	/// the source's `explicit_tree_isect.cc`, which does not prune.
	pub fn intersection(
		&self,
		other: &Self,
		mut pair_state: impl FnMut(State, State) -> State,
	) -> Self {
		let mut result = Self::new(self.alphabet.clone());

		for (p, symbol_a, tuple_a) in self.transitions.all_transitions() {
			let arity = tuple_a.len();
			for (q, symbol_b, tuple_b) in other.transitions.all_transitions() {
				if symbol_a != symbol_b || tuple_b.len() != arity {
					continue;
				}

				let children: Vec<State> = tuple_a
					.iter()
					.zip(tuple_b.iter())
					.map(|(&a, &b)| pair_state(a, b))
					.collect();
				let parent = pair_state(p, q);

				result.transitions.add_transition(children, symbol_a, parent);
				if self.finals.contains(&p) && other.finals.contains(&q) {
					result.finals.insert(parent);
				}
			}
		}

		result
	}

}

impl TransitionStore {
	/// Whether a transition on `symbol` with exactly `tuple` as children
	/// already exists, regardless of parent.
	fn down_iter_matching(&self, symbol: Symbol, tuple: &[State]) -> Option<ChildTuple> {
		self.states().find_map(|parent| {
			self.down_iter(parent)
				.find(|(s, t)| *s == symbol && t.as_ref() == tuple)
				.map(|(_, t)| t)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::alphabet::RankedAlphabet;

	fn alphabet() -> Rc<RankedAlphabet> {
		let mut a = RankedAlphabet::new();
		a.declare(Symbol(0), 0).unwrap(); // a
		a.declare(Symbol(1), 0).unwrap(); // b
		a.declare(Symbol(2), 1).unwrap(); // unary c
		Rc::new(a)
	}

	#[test]
	fn intersection_of_disjoint_ground_languages_is_empty() {
		let alpha = alphabet();
		let mut a = Automaton::new(alpha.clone());
		a.add_transition(vec![], Symbol(0), State(0)).unwrap();
		a.add_final(State(0));

		let mut b = Automaton::new(alpha);
		b.add_transition(vec![], Symbol(1), State(0)).unwrap();
		b.add_final(State(0));

		let product = a.intersection(&b, |p, q| State(p.0 * 100 + q.0));
		assert!(product.is_language_empty());
	}

	#[test]
	fn intersection_keeps_common_ground_tree() {
		let alpha = alphabet();
		let mut a = Automaton::new(alpha.clone());
		a.add_transition(vec![], Symbol(0), State(0)).unwrap();
		a.add_final(State(0));

		let mut b = Automaton::new(alpha);
		b.add_transition(vec![], Symbol(0), State(0)).unwrap();
		b.add_final(State(0));

		let product = a.intersection(&b, |p, q| State(p.0 * 100 + q.0));
		assert!(!product.is_language_empty());
	}
}
