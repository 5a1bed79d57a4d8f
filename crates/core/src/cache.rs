//! `CachedBinaryOp` (C4): memoizes a binary operator and lets its result be
//! invalidated when one of its operands stops being useful.
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Memoizes `f(a, b)` computed through [`CachedBinaryOp::get_or_compute`].
/// `invalidate_first`/`invalidate_second` purge every cached entry whose
/// first/second key matches, which the inclusion checkers use to drop
/// subsumption results computed against an antichain bucket that has since
/// been freed (§4.4, §4.6: "`lte_cache` ... invalidated when the backing
/// set is cached out").
#[derive(Debug, Clone, Default)]
pub struct CachedBinaryOp<A, B, R> {
	cache: HashMap<(A, B), R>,
	by_first: HashMap<A, HashSet<B>>,
	by_second: HashMap<B, HashSet<A>>,
}

impl<A, B, R> CachedBinaryOp<A, B, R>
where
	A: Clone + Eq + Hash,
	B: Clone + Eq + Hash,
	R: Clone,
{
	pub fn new() -> Self {
		Self {
			cache: HashMap::new(),
			by_first: HashMap::new(),
			by_second: HashMap::new(),
		}
	}

	pub fn get(&self, a: &A, b: &B) -> Option<&R> {
		self.cache.get(&(a.clone(), b.clone()))
	}

	pub fn get_or_compute(&mut self, a: A, b: B, f: impl FnOnce() -> R) -> R {
		if let Some(hit) = self.cache.get(&(a.clone(), b.clone())) {
			return hit.clone();
		}

		let result = f();
		self.by_first.entry(a.clone()).or_default().insert(b.clone());
		self.by_second.entry(b.clone()).or_default().insert(a.clone());
		self.cache.insert((a, b), result.clone());
		result
	}

	/// Purges every cached entry keyed by `a` as the first component.
	pub fn invalidate_first(&mut self, a: &A) {
		if let Some(seconds) = self.by_first.remove(a) {
			for b in seconds {
				self.cache.remove(&(a.clone(), b.clone()));
				if let Some(firsts) = self.by_second.get_mut(&b) {
					firsts.remove(a);
				}
			}
		}
	}

	/// Purges every cached entry keyed by `b` as the second component.
	pub fn invalidate_second(&mut self, b: &B) {
		if let Some(firsts) = self.by_second.remove(b) {
			for a in firsts {
				self.cache.remove(&(a.clone(), b.clone()));
				if let Some(seconds) = self.by_first.get_mut(&a) {
					seconds.remove(b);
				}
			}
		}
	}

	pub fn len(&self) -> usize {
		self.cache.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cache.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn caches_and_invalidates() {
		let calls = std::cell::Cell::new(0);
		let mut op: CachedBinaryOp<u32, u32, u32> = CachedBinaryOp::new();

		let compute = |op: &mut CachedBinaryOp<u32, u32, u32>, a, b| {
			op.get_or_compute(a, b, || {
				calls.set(calls.get() + 1);
				a + b
			})
		};

		assert_eq!(compute(&mut op, 1, 2), 3);
		assert_eq!(compute(&mut op, 1, 2), 3);
		assert_eq!(calls.get(), 1);

		op.invalidate_first(&1);
		assert_eq!(compute(&mut op, 1, 2), 3);
		assert_eq!(calls.get(), 2);
	}
}
