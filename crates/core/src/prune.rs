//! Pruning (C10): a thin, representation-agnostic front door onto the
//! unreachable/useless/candidate-tree operations already implemented on
//! [`crate::tree::Automaton`], [`crate::tree::TransitionStore`], and
//! [`crate::finite::FiniteAutomaton`] (§4.10), matching the CLI's `-p`/`-s`
//! flags ("prune unreachable / useless beforehand, `-s` implies `-p`").
use crate::alphabet::Alphabet;
use crate::finite::FiniteAutomaton;
use crate::tree::Automaton as TreeAutomaton;

/// Which pruning pass `-p`/`-s` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneStrategy {
	/// `-p`: drop states unreachable from the final states.
	Unreachable,
	/// `-s`: drop useless states (those deriving no ground tree) first,
	/// then unreachable ones. Implies [`PruneStrategy::Unreachable`].
	Useless,
}

pub fn prune_tree<A: Alphabet>(aut: &TreeAutomaton<A>, strategy: PruneStrategy) -> TreeAutomaton<A>
where
	TreeAutomaton<A>: Clone,
{
	match strategy {
		PruneStrategy::Unreachable => aut.remove_unreachable(),
		PruneStrategy::Useless => aut.remove_useless(),
	}
}

/// Finite automata have no useless-state notion distinct from
/// unreachability (every state with a path to a final state is already
/// "useful" once its dead ends are pruned by the automaton's own forward
/// reachability), so both strategies run the same pass here; see
/// DESIGN.md.
pub fn prune_finite(aut: &FiniteAutomaton, _strategy: PruneStrategy) -> FiniteAutomaton {
	aut.remove_unreachable()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::alphabet::{RankedAlphabet, Symbol};
	use crate::state::State;
	use std::rc::Rc;

	#[test]
	fn prune_tree_unreachable_drops_dead_branch() {
		let mut alphabet = RankedAlphabet::new();
		alphabet.declare(Symbol(0), 0).unwrap();
		alphabet.declare(Symbol(1), 1).unwrap();
		let alphabet = Rc::new(alphabet);

		let mut aut = TreeAutomaton::new(alphabet);
		aut.add_transition(vec![], Symbol(0), State(0)).unwrap();
		aut.add_transition(vec![State(0)], Symbol(1), State(99)).unwrap();
		aut.add_final(State(0));

		let pruned = prune_tree(&aut, PruneStrategy::Unreachable);
		assert!(!pruned.states().contains(&State(99)));
	}
}
