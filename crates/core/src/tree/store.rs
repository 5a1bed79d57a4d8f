use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use mown::Mown;

use crate::alphabet::Symbol;
use crate::state::State;

/// A hash-consed, ref-counted child tuple. Equal tuples share storage and
/// compare by pointer identity (`Rc::ptr_eq`), matching §3's "tuple handle
/// is compared by pointer identity"; `PartialEq`/`Hash` on the underlying
/// slice still work structurally for callers that don't have a live
/// `TupleCache` at hand (e.g. deserializing), so a [`ChildTuple`] can be
/// used as a `HashSet`/`HashMap` key either way.
pub type ChildTuple = Rc<[State]>;

/// Interns child tuples for one or more automata that choose to share it.
/// A tuple is created on first insertion and removed once the last owning
/// cluster releases it, via the `Weak` entry failing to upgrade — the same
/// discipline as the MTBDD hash-cons tables.
#[derive(Default)]
pub struct TupleCache {
	table: RefCell<HashMap<Vec<State>, Weak<[State]>>>,
}

impl TupleCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn intern(&self, children: Vec<State>) -> ChildTuple {
		let mut table = self.table.borrow_mut();
		if let Some(weak) = table.get(&children) {
			if let Some(rc) = weak.upgrade() {
				return rc;
			}
		}

		let rc: Rc<[State]> = Rc::from(children.clone().into_boxed_slice());
		table.insert(children, Rc::downgrade(&rc));
		rc
	}

	/// Number of tuples currently alive (debugging/diagnostics only).
	pub fn live_count(&self) -> usize {
		self.table
			.borrow()
			.values()
			.filter(|w| w.strong_count() > 0)
			.count()
	}
}

/// A transition cluster: symbol -> set of tuples of children. Shared via
/// `Rc` and cloned on first mutation (`Rc::make_mut`), per §3's "copy-on-
/// write" cluster contract.
pub type Cluster = HashMap<Symbol, Rc<HashSet<ChildTuple>>>;

type StateClusterMap = HashMap<State, Rc<Cluster>>;

/// A bottom-up explicit tree automaton's transitions, with structural
/// sharing and cheap cloning (C3).
///
/// Cloning a `TransitionStore` is O(1) (an `Rc` clone of the top-level
/// map); subsequent mutation of either the clone or the original clones
/// only the parts of the structure that are actually touched.
#[derive(Clone)]
pub struct TransitionStore {
	tuple_cache: Rc<TupleCache>,
	map: Rc<StateClusterMap>,
}

impl Default for TransitionStore {
	fn default() -> Self {
		Self::new(Rc::new(TupleCache::new()))
	}
}

impl TransitionStore {
	pub fn new(tuple_cache: Rc<TupleCache>) -> Self {
		Self {
			tuple_cache,
			map: Rc::new(StateClusterMap::new()),
		}
	}

	pub fn tuple_cache(&self) -> &Rc<TupleCache> {
		&self.tuple_cache
	}

	/// Interns `children`, clones whichever layers (state map, cluster,
	/// tuple set) are currently shared, and inserts the transition.
	/// Idempotent.
	pub fn add_transition(&mut self, children: Vec<State>, symbol: Symbol, parent: State) {
		let tuple = self.tuple_cache.intern(children);

		let map = Rc::make_mut(&mut self.map);
		let cluster_rc = map.entry(parent).or_insert_with(|| Rc::new(Cluster::new()));
		let cluster = Rc::make_mut(cluster_rc);
		let tuple_set_rc = cluster
			.entry(symbol)
			.or_insert_with(|| Rc::new(HashSet::new()));
		let tuple_set = Rc::make_mut(tuple_set_rc);
		tuple_set.insert(tuple);
	}

	/// The cluster of transitions out of `parent`, or an empty view if the
	/// state has none. Borrows when possible; only allocates an empty
	/// `Cluster` when `parent` is absent.
	pub fn transitions_from(&self, parent: State) -> Mown<'_, Cluster> {
		match self.map.get(&parent) {
			Some(cluster) => Mown::Borrowed(cluster),
			None => Mown::Owned(Cluster::new()),
		}
	}

	/// Iterator over `(symbol, child tuple)` emanating from `parent`.
	pub fn down_iter(&self, parent: State) -> impl Iterator<Item = (Symbol, ChildTuple)> + '_ {
		self.map
			.get(&parent)
			.into_iter()
			.flat_map(|cluster| cluster.iter())
			.flat_map(|(&symbol, tuples)| tuples.iter().map(move |t| (symbol, t.clone())))
	}

	pub fn states(&self) -> impl Iterator<Item = State> + '_ {
		self.map.keys().copied()
	}

	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}

	/// All `(state, symbol, tuple)` triples in the store.
	pub fn all_transitions(&self) -> impl Iterator<Item = (State, Symbol, ChildTuple)> + '_ {
		self.map.iter().flat_map(|(&parent, cluster)| {
			cluster.iter().flat_map(move |(&symbol, tuples)| {
				tuples.iter().map(move |t| (parent, symbol, t.clone()))
			})
		})
	}

	/// Builds the derived indexes used by upward algorithms (§4.3
	/// "bottom_up_indexes"): ground transitions grouped by symbol, and a
	/// `state -> symbol -> position -> [(parent, tuple)]` index of the
	/// transitions in which a state occurs at a given child position.
	pub fn bottom_up_indexes(&self) -> BottomUpIndexes {
		let mut leaves: HashMap<Symbol, Vec<(ChildTuple, State)>> = HashMap::new();
		let mut by_child_position: HashMap<State, HashMap<Symbol, HashMap<usize, Vec<(State, ChildTuple)>>>> =
			HashMap::new();

		for (parent, symbol, tuple) in self.all_transitions() {
			if tuple.is_empty() {
				leaves.entry(symbol).or_default().push((tuple.clone(), parent));
			}

			for (pos, &child) in tuple.iter().enumerate() {
				by_child_position
					.entry(child)
					.or_default()
					.entry(symbol)
					.or_default()
					.entry(pos)
					.or_default()
					.push((parent, tuple.clone()));
			}
		}

		BottomUpIndexes {
			leaves,
			by_child_position,
		}
	}

	/// Keeps only states reachable from `finals` by descending through
	/// child tuples, and their incoming transitions (§4.3, §4.10).
	pub fn remove_unreachable(&self, finals: &HashSet<State>) -> (TransitionStore, HashSet<State>) {
		let mut reached: HashSet<State> = finals.clone();
		let mut stack: Vec<State> = finals.iter().copied().collect();

		while let Some(q) = stack.pop() {
			for (_, tuple) in self.down_iter(q) {
				for &child in tuple.iter() {
					if reached.insert(child) {
						stack.push(child);
					}
				}
			}
		}

		let mut result = TransitionStore::new(self.tuple_cache.clone());
		for parent in reached.iter().copied() {
			for (symbol, tuple) in self.down_iter(parent) {
				if tuple.iter().all(|c| reached.contains(c)) {
					result.add_transition(tuple.to_vec(), symbol, parent);
				}
			}
		}

		(result, reached)
	}

	/// Computes the set of useful states (states that can produce at least
	/// one ground tree) by iterating to a fixed point, then prunes
	/// everything else and runs `remove_unreachable` (§4.3, §4.10).
	pub fn remove_useless(&self, finals: &HashSet<State>) -> (TransitionStore, HashSet<State>) {
		let useful = self.useful_states();

		let mut pruned = TransitionStore::new(self.tuple_cache.clone());
		for (parent, symbol, tuple) in self.all_transitions() {
			if useful.contains(&parent) && tuple.iter().all(|c| useful.contains(c)) {
				pruned.add_transition(tuple.to_vec(), symbol, parent);
			}
		}

		let reachable_finals: HashSet<State> = finals.intersection(&useful).copied().collect();
		pruned.remove_unreachable(&reachable_finals)
	}

	/// The set of states from which at least one ground tree is derivable.
	pub fn useful_states(&self) -> HashSet<State> {
		let mut useful: HashSet<State> = HashSet::new();
		loop {
			let mut changed = false;
			for (parent, _symbol, tuple) in self.all_transitions() {
				if !useful.contains(&parent) && tuple.iter().all(|c| useful.contains(c)) {
					useful.insert(parent);
					changed = true;
				}
			}
			if !changed {
				break;
			}
		}
		useful
	}

	/// A minimal sub-automaton that still accepts at least one tree, or an
	/// empty automaton if the language is empty (§4.3, §4.10).
	///
	/// Ties among multiple witnessing trees are broken by transition
	/// insertion order, which is the only order a `HashSet`-backed cluster
	/// can offer deterministically within one process run; see DESIGN.md
	/// for why we do not attempt to reproduce a specific total order here.
	pub fn candidate_tree(&self, finals: &HashSet<State>) -> (TransitionStore, HashSet<State>) {
		let mut usable: HashSet<State> = HashSet::new();
		let mut witness_transition: HashMap<State, (Symbol, ChildTuple)> = HashMap::new();

		loop {
			let mut changed = false;
			for (parent, symbol, tuple) in self.all_transitions() {
				if !usable.contains(&parent) && tuple.iter().all(|c| usable.contains(c)) {
					usable.insert(parent);
					witness_transition.insert(parent, (symbol, tuple));
					changed = true;
				}
			}

			if finals.iter().any(|f| usable.contains(f)) {
				break;
			}
			if !changed {
				return (TransitionStore::new(self.tuple_cache.clone()), HashSet::new());
			}
		}

		let mut result = TransitionStore::new(self.tuple_cache.clone());
		let mut stack: Vec<State> = finals.iter().copied().filter(|f| usable.contains(f)).collect();
		let mut seen = HashSet::new();
		let mut kept_finals = HashSet::new();

		while let Some(q) = stack.pop() {
			kept_finals.insert(q);
			if !seen.insert(q) {
				continue;
			}
			if let Some((symbol, tuple)) = witness_transition.get(&q) {
				result.add_transition(tuple.to_vec(), *symbol, q);
				stack.extend(tuple.iter().copied());
			}
		}

		(result, finals.intersection(&usable).copied().collect())
	}
}

/// Derived bottom-up lookup structures (§4.3).
pub struct BottomUpIndexes {
	leaves: HashMap<Symbol, Vec<(ChildTuple, State)>>,
	by_child_position: HashMap<State, HashMap<Symbol, HashMap<usize, Vec<(State, ChildTuple)>>>>,
}

impl BottomUpIndexes {
	pub fn ground_transitions(&self, symbol: Symbol) -> &[(ChildTuple, State)] {
		self.leaves.get(&symbol).map_or(&[], |v| v.as_slice())
	}

	pub fn ground_symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
		self.leaves.keys().copied()
	}

	/// Transitions where `state` occurs at child position `pos` under
	/// `symbol`.
	pub fn at_position(&self, state: State, symbol: Symbol, pos: usize) -> &[(State, ChildTuple)] {
		self.by_child_position
			.get(&state)
			.and_then(|by_symbol| by_symbol.get(&symbol))
			.and_then(|by_pos| by_pos.get(&pos))
			.map_or(&[], |v| v.as_slice())
	}

	/// Every `(symbol, position)` at which `state` occurs as a child in
	/// some transition, used to drive upward/demand-driven propagation
	/// from a state to its parents.
	pub fn positions_of(&self, state: State) -> impl Iterator<Item = (Symbol, usize)> + '_ {
		self.by_child_position
			.get(&state)
			.into_iter()
			.flat_map(|by_symbol| by_symbol.iter())
			.flat_map(|(&symbol, by_pos)| by_pos.keys().map(move |&pos| (symbol, pos)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sym(id: u32) -> Symbol {
		Symbol(id)
	}

	fn st(id: u32) -> State {
		State(id)
	}

	#[test]
	fn add_transition_is_idempotent_and_shares_tuples() {
		let mut store = TransitionStore::default();
		store.add_transition(vec![st(0), st(0)], sym(0), st(1));
		store.add_transition(vec![st(0), st(0)], sym(0), st(1));

		let cluster = store.transitions_from(st(1));
		assert_eq!(cluster.get(&sym(0)).unwrap().len(), 1);
	}

	#[test]
	fn clone_is_copy_on_write() {
		let mut a = TransitionStore::default();
		a.add_transition(vec![], sym(0), st(0));

		let mut b = a.clone();
		b.add_transition(vec![st(0)], sym(1), st(1));

		assert!(a.transitions_from(st(1)).is_empty());
		assert_eq!(b.transitions_from(st(1)).len(), 1);
	}

	#[test]
	fn remove_unreachable_drops_dead_branch() {
		let mut store = TransitionStore::default();
		store.add_transition(vec![], sym(0), st(0)); // a -> q
		store.add_transition(vec![st(0)], sym(1), st(99)); // b(q) -> dead

		let finals: HashSet<_> = [st(0)].into_iter().collect();
		let (pruned, reached) = store.remove_unreachable(&finals);

		assert_eq!(reached, finals);
		assert!(pruned.transitions_from(st(99)).is_empty());
		assert_eq!(pruned.down_iter(st(0)).count(), 1);
	}

	#[test]
	fn useful_states_require_all_children_useful() {
		let mut store = TransitionStore::default();
		store.add_transition(vec![], sym(0), st(0)); // ground
		store.add_transition(vec![st(0), st(1)], sym(1), st(2)); // needs st(1), which has no transition

		let useful = store.useful_states();
		assert!(useful.contains(&st(0)));
		assert!(!useful.contains(&st(2)));
	}
}
