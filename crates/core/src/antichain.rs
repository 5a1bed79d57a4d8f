//! Antichain utilities (C4): compact frontiers of inclusion-checking
//! obligations that no element subsumes another.
use std::collections::BTreeSet;

use crate::state::State;

/// A set of states used as the "bigger side" of an inclusion obligation.
pub type StateSet = BTreeSet<State>;

/// A 1-column antichain over a preorder `<=` supplied by the caller at
/// each call site (§3, §4.4): inserting `x` discards every already-stored
/// `y` with `x <= y`, and `contains(x)` succeeds if some stored `y <= x`.
#[derive(Debug, Clone, Default)]
pub struct Antichain1C<T> {
	items: Vec<T>,
}

impl<T: Clone> Antichain1C<T> {
	pub fn new() -> Self {
		Self { items: Vec::new() }
	}

	pub fn contains(&self, x: &T, leq: impl Fn(&T, &T) -> bool) -> bool {
		self.items.iter().any(|y| leq(y, x))
	}

	/// Removes every stored `z` with `x <= z`.
	pub fn refine(&mut self, x: &T, leq: impl Fn(&T, &T) -> bool) {
		self.items.retain(|z| !leq(x, z));
	}

	/// Inserts `x`, refining away anything it dominates. Returns `false`
	/// without modifying the antichain if `x` is already subsumed.
	pub fn insert(&mut self, x: T, leq: impl Fn(&T, &T) -> bool) -> bool {
		if self.contains(&x, &leq) {
			return false;
		}
		self.refine(&x, &leq);
		self.items.push(x);
		true
	}

	pub fn data(&self) -> &[T] {
		&self.items
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

/// A 2-column antichain of `(key, value)` obligations with subsumption
/// `(k, v) ⊑ (k', v')` iff `k <= k'` under a preorder and `v ⊑ v'` under a
/// caller-supplied set comparer (§3, §4.4).
///
/// The source couples this with a secondary index keyed by `K` to avoid a
/// linear scan of every bucket on `contains`/`refine`. This port keeps the
/// flat representation and takes the key comparator as a parameter instead;
/// the antichains used by the inclusion checkers stay small enough (bounded
/// by the number of distinct obligations actually explored) that the
/// asymptotic difference does not change which algorithm wins. See
/// DESIGN.md.
#[derive(Debug, Clone, Default)]
pub struct Antichain2Cv2<K, V> {
	data: Vec<(K, V)>,
}

impl<K: Clone, V: Clone> Antichain2Cv2<K, V> {
	pub fn new() -> Self {
		Self { data: Vec::new() }
	}

	pub fn contains(
		&self,
		k: &K,
		v: &V,
		key_leq: impl Fn(&K, &K) -> bool,
		cmp_v: impl Fn(&V, &V) -> bool,
	) -> bool {
		self.data
			.iter()
			.any(|(k2, v2)| key_leq(k, k2) && cmp_v(v2, v))
	}

	/// Removes every stored `(k', v')` dominated by `(k, v)`.
	pub fn refine(
		&mut self,
		k: &K,
		v: &V,
		key_leq: impl Fn(&K, &K) -> bool,
		cmp_v: impl Fn(&V, &V) -> bool,
	) {
		self.data.retain(|(k2, v2)| !(key_leq(k, k2) && cmp_v(v, v2)));
	}

	/// Inserts `(k, v)` without checking subsumption; callers that need the
	/// antichain invariant call `contains` first and `refine` afterward
	/// (this mirrors the source API, which separates the three operations
	/// so callers can batch the `contains` check against `processed` and
	/// `nonincluded` before committing an insert).
	pub fn insert(&mut self, k: K, v: V) {
		self.data.push((k, v));
	}

	pub fn data(&self) -> &[(K, V)] {
		&self.data
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}
}

/// An ordered variant of [`Antichain2Cv2`] over `(State, StateSet)`
/// obligations, giving a deterministic worklist pop order: smallest
/// bigger-set first, ties broken by the smaller state, then by the
/// bigger-set's own element order (§4.4, §4.7, §5).
#[derive(Debug, Clone, Default)]
pub struct OrderedAntichain2C {
	inner: Antichain2Cv2<State, StateSet>,
}

impl OrderedAntichain2C {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, k: State, v: &StateSet, key_leq: impl Fn(State, State) -> bool) -> bool {
		self.inner
			.contains(&k, v, |a, b| key_leq(*a, *b), |a, b| a.is_subset(b))
	}

	pub fn refine(&mut self, k: State, v: &StateSet, key_leq: impl Fn(State, State) -> bool) {
		self.inner
			.refine(&k, v, |a, b| key_leq(*a, *b), |a, b| a.is_subset(b));
	}

	pub fn insert(&mut self, k: State, v: StateSet) {
		self.inner.insert(k, v);
	}

	pub fn is_empty(&self) -> bool {
		self.inner.data().is_empty()
	}

	/// Removes and returns the obligation that sorts first under
	/// `(bigger_set.len(), smaller_state, bigger_set)`.
	pub fn pop_min(&mut self) -> Option<(State, StateSet)> {
		let idx = self
			.inner
			.data
			.iter()
			.enumerate()
			.min_by(|(_, (k1, v1)), (_, (k2, v2))| {
				(v1.len(), *k1, v1.clone()).cmp(&(v2.len(), *k2, v2.clone()))
			})
			.map(|(idx, _)| idx)?;
		Some(self.inner.data.remove(idx))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn antichain1c_refines_on_insert() {
		let mut ac: Antichain1C<u32> = Antichain1C::new();
		let leq = |a: &u32, b: &u32| a <= b;

		ac.insert(5, leq);
		ac.insert(3, leq); // 3 <= 5, so 5 gets removed
		assert_eq!(ac.data(), &[3]);
		assert!(ac.contains(&10, leq));
	}

	#[test]
	fn ordered_antichain_pops_smallest_first() {
		let mut oc = OrderedAntichain2C::new();
		oc.insert(State(0), [State(1), State(2)].into_iter().collect());
		oc.insert(State(0), [State(1)].into_iter().collect());

		let (_, set) = oc.pop_min().unwrap();
		assert_eq!(set.len(), 1);
	}
}
