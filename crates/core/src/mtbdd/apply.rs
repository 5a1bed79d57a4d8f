use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::node::{Mtbdd, NodeId};

fn ptr_key<D>(n: &NodeId<D>) -> usize {
	n.ptr_key()
}

/// Lifts a unary operation on leaf values to a whole-MTBDD operation
/// (§4.2). Memoized on the root's node identity so structurally equal
/// recursive calls return the same physical output node.
pub fn apply1<D, D2>(
	out: &Mtbdd<D2>,
	root: &NodeId<D>,
	op: &mut impl FnMut(&D) -> D2,
) -> NodeId<D2>
where
	D: Clone + Eq + Hash,
	D2: Clone + Eq + Hash,
{
	let mut memo = HashMap::new();
	apply1_rec(out, root, op, &mut memo)
}

fn apply1_rec<D, D2>(
	out: &Mtbdd<D2>,
	node: &NodeId<D>,
	op: &mut impl FnMut(&D) -> D2,
	memo: &mut HashMap<usize, NodeId<D2>>,
) -> NodeId<D2>
where
	D: Clone + Eq + Hash,
	D2: Clone + Eq + Hash,
{
	if let Some(hit) = memo.get(&ptr_key(node)) {
		return hit.clone();
	}

	let result = match node.internal_parts() {
		None => out.make_leaf(op(node.leaf_value().unwrap())),
		Some((var, low, high)) => {
			let low = apply1_rec(out, low, op, memo);
			let high = apply1_rec(out, high, op, memo);
			out.make_internal(low, high, var)
		}
	};

	memo.insert(ptr_key(node), result.clone());
	result
}

/// Lifts a binary operation on leaf values to a whole-MTBDD operation
/// (§4.2). The two inputs may live in different [`Mtbdd`] managers as long
/// as they share a variable order; the result is hash-consed in `out`.
pub fn apply2<D, D2>(
	out: &Mtbdd<D2>,
	a: &NodeId<D>,
	b: &NodeId<D>,
	op: &mut impl FnMut(&D, &D) -> D2,
) -> NodeId<D2>
where
	D: Clone + Eq + Hash,
	D2: Clone + Eq + Hash,
{
	let mut memo = HashMap::new();
	apply2_rec(out, a, b, op, &mut memo)
}

fn apply2_rec<D, D2>(
	out: &Mtbdd<D2>,
	a: &NodeId<D>,
	b: &NodeId<D>,
	op: &mut impl FnMut(&D, &D) -> D2,
	memo: &mut HashMap<(usize, usize), NodeId<D2>>,
) -> NodeId<D2>
where
	D: Clone + Eq + Hash,
	D2: Clone + Eq + Hash,
{
	let cache_key = (ptr_key(a), ptr_key(b));
	if let Some(hit) = memo.get(&cache_key) {
		return hit.clone();
	}

	let result = match (a.internal_parts(), b.internal_parts()) {
		(None, None) => out.make_leaf(op(a.leaf_value().unwrap(), b.leaf_value().unwrap())),
		(Some((va, la, ha)), None) => {
			let low = apply2_rec(out, la, b, op, memo);
			let high = apply2_rec(out, ha, b, op, memo);
			out.make_internal(low, high, va)
		}
		(None, Some((vb, lb, hb))) => {
			let low = apply2_rec(out, a, lb, op, memo);
			let high = apply2_rec(out, a, hb, op, memo);
			out.make_internal(low, high, vb)
		}
		(Some((va, la, ha)), Some((vb, lb, hb))) => {
			if va == vb {
				let low = apply2_rec(out, la, lb, op, memo);
				let high = apply2_rec(out, ha, hb, op, memo);
				out.make_internal(low, high, va)
			} else if va < vb {
				let low = apply2_rec(out, la, b, op, memo);
				let high = apply2_rec(out, ha, b, op, memo);
				out.make_internal(low, high, va)
			} else {
				let low = apply2_rec(out, a, lb, op, memo);
				let high = apply2_rec(out, a, hb, op, memo);
				out.make_internal(low, high, vb)
			}
		}
	};

	memo.insert(cache_key, result.clone());
	result
}

/// Lifts a ternary operation on leaf values to a whole-MTBDD operation
/// (§4.2). At each step, the inputs with the smallest current variable are
/// descended into; inputs whose variable is strictly larger pass through
/// unchanged to both branches, guaranteeing termination by lexicographic
/// descent on the tuple of variables.
pub fn apply3<D, D2>(
	out: &Mtbdd<D2>,
	a: &NodeId<D>,
	b: &NodeId<D>,
	c: &NodeId<D>,
	op: &mut impl FnMut(&D, &D, &D) -> D2,
) -> NodeId<D2>
where
	D: Clone + Eq + Hash,
	D2: Clone + Eq + Hash,
{
	let mut memo = HashMap::new();
	apply3_rec(out, a, b, c, op, &mut memo)
}

fn apply3_rec<D, D2>(
	out: &Mtbdd<D2>,
	a: &NodeId<D>,
	b: &NodeId<D>,
	c: &NodeId<D>,
	op: &mut impl FnMut(&D, &D, &D) -> D2,
	memo: &mut HashMap<(usize, usize, usize), NodeId<D2>>,
) -> NodeId<D2>
where
	D: Clone + Eq + Hash,
	D2: Clone + Eq + Hash,
{
	let cache_key = (ptr_key(a), ptr_key(b), ptr_key(c));
	if let Some(hit) = memo.get(&cache_key) {
		return hit.clone();
	}

	let va = a.internal_parts().map(|(v, ..)| v);
	let vb = b.internal_parts().map(|(v, ..)| v);
	let vc = c.internal_parts().map(|(v, ..)| v);

	let result = match (va, vb, vc) {
		(None, None, None) => out.make_leaf(op(
			a.leaf_value().unwrap(),
			b.leaf_value().unwrap(),
			c.leaf_value().unwrap(),
		)),
		_ => {
			let min_var = [va, vb, vc].into_iter().flatten().min().unwrap();

			let (a_low, a_high) = branch_at(a, min_var);
			let (b_low, b_high) = branch_at(b, min_var);
			let (c_low, c_high) = branch_at(c, min_var);

			let low = apply3_rec(out, &a_low, &b_low, &c_low, op, memo);
			let high = apply3_rec(out, &a_high, &b_high, &c_high, op, memo);
			out.make_internal(low, high, min_var)
		}
	};

	memo.insert(cache_key, result.clone());
	result
}

fn branch_at<D: Clone>(node: &NodeId<D>, min_var: super::node::VarId) -> (NodeId<D>, NodeId<D>) {
	match node.internal_parts() {
		Some((var, low, high)) if var == min_var => (low.clone(), high.clone()),
		_ => (node.clone(), node.clone()),
	}
}

/// A memoized, stoppable visitor over pairs of leaves reachable from two
/// MTBDD roots. Models the "void" apply functors of §4.2: they accumulate
/// side effects instead of building a result MTBDD, and can abandon the
/// traversal early via [`VoidApply2::stop_processing`].
pub trait VoidApply2<D> {
	fn visit_leaves(&mut self, a: &D, b: &D);

	fn stop_processing(&self) -> bool {
		false
	}

	/// Runs the traversal over `a` and `b`.
	fn run(&mut self, a: &NodeId<D>, b: &NodeId<D>)
	where
		D: Clone + Eq + Hash,
		Self: Sized,
	{
		let mut visited = HashSet::new();
		void_apply2_rec(a, b, self, &mut visited);
	}
}

fn void_apply2_rec<D, V>(
	a: &NodeId<D>,
	b: &NodeId<D>,
	visitor: &mut V,
	visited: &mut HashSet<(usize, usize)>,
) where
	D: Clone + Eq + Hash,
	V: VoidApply2<D> + ?Sized,
{
	if visitor.stop_processing() {
		return;
	}

	let cache_key = (ptr_key(a), ptr_key(b));
	if !visited.insert(cache_key) {
		return;
	}

	match (a.internal_parts(), b.internal_parts()) {
		(None, None) => visitor.visit_leaves(a.leaf_value().unwrap(), b.leaf_value().unwrap()),
		(Some((va, la, ha)), None) => {
			void_apply2_rec(la, b, visitor, visited);
			if visitor.stop_processing() {
				return;
			}
			void_apply2_rec(ha, b, visitor, visited);
			let _ = va;
		}
		(None, Some((vb, lb, hb))) => {
			void_apply2_rec(a, lb, visitor, visited);
			if visitor.stop_processing() {
				return;
			}
			void_apply2_rec(a, hb, visitor, visited);
			let _ = vb;
		}
		(Some((va, la, ha)), Some((vb, lb, hb))) => {
			if va == vb {
				void_apply2_rec(la, lb, visitor, visited);
				if visitor.stop_processing() {
					return;
				}
				void_apply2_rec(ha, hb, visitor, visited);
			} else if va < vb {
				void_apply2_rec(la, b, visitor, visited);
				if visitor.stop_processing() {
					return;
				}
				void_apply2_rec(ha, b, visitor, visited);
			} else {
				void_apply2_rec(a, lb, visitor, visited);
				if visitor.stop_processing() {
					return;
				}
				void_apply2_rec(a, hb, visitor, visited);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn apply2_squares_leaves() {
		// Fixture from §8.6: leaves 0,3,4,9,14,15 squared elementwise.
		let src: Mtbdd<u32> = Mtbdd::new(0);
		let out: Mtbdd<u32> = Mtbdd::new(0);

		let leaves = [0u32, 3, 4, 9, 14, 15];
		let nodes: Vec<_> = leaves.iter().map(|&v| src.make_leaf(v)).collect();

		// Build a small balanced tree over 3 variables so every leaf is
		// reachable, then Apply2 the node against itself with `*`.
		let n01 = src.make_internal(nodes[0].clone(), nodes[1].clone(), 2);
		let n23 = src.make_internal(nodes[2].clone(), nodes[3].clone(), 2);
		let n45 = src.make_internal(nodes[4].clone(), nodes[5].clone(), 2);
		let n0123 = src.make_internal(n01, n23, 1);
		let root = src.make_internal(n0123.clone(), n45.clone(), 0);

		let squared = apply2(&out, &root, &root, &mut |a, b| a * b);

		for (assignment, expected) in [
			([false, false, false], 0u32),
			([false, false, true], 9),
			([false, true, false], 16),
			([false, true, true], 81),
			([true, false, false], 196),
			([true, false, true], 225),
		] {
			let v = out.value_at(&squared, |var| assignment[var as usize]);
			assert_eq!(v, expected, "assignment {assignment:?}");
		}
	}

	struct CountLeaves {
		count: usize,
		limit: usize,
	}

	impl VoidApply2<u32> for CountLeaves {
		fn visit_leaves(&mut self, _a: &u32, _b: &u32) {
			self.count += 1;
		}

		fn stop_processing(&self) -> bool {
			self.count >= self.limit
		}
	}

	#[test]
	fn void_apply2_stops_early() {
		let mgr: Mtbdd<u32> = Mtbdd::new(0);
		let l0 = mgr.make_leaf(0);
		let l1 = mgr.make_leaf(1);
		let l2 = mgr.make_leaf(2);
		let l3 = mgr.make_leaf(3);
		let n0 = mgr.make_internal(l0, l1, 1);
		let n1 = mgr.make_internal(l2, l3, 1);
		let root = mgr.make_internal(n0, n1, 0);

		let mut visitor = CountLeaves { count: 0, limit: 2 };
		visitor.run(&root, &root);
		assert_eq!(visitor.count, 2);
	}
}
