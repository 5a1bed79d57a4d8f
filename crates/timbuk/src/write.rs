use vata_core::alphabet::{Alphabet, RankedAlphabet};
use vata_core::finite::FiniteAutomaton;
use vata_core::tree::Automaton as TreeAutomaton;

use crate::document::{StateTable, SymbolTable};

fn symbol_name(table: &SymbolTable, symbol: vata_core::alphabet::Symbol) -> String {
	table.name_of(symbol).map(str::to_owned).unwrap_or_else(|| symbol.to_string())
}

fn state_name(table: &StateTable, state: vata_core::state::State) -> String {
	table.name_of(state).map(str::to_owned).unwrap_or_else(|| state.to_string())
}

/// Serializes a tree automaton to Timbuk text (§6, CLI `load`/dump), using
/// `symbols`/`states` to recover original names and falling back to the
/// core's `sym{n}`/`q{n}` display form for any state or symbol the tables
/// don't name (e.g. states introduced by `union`/`isect`/`complement`).
pub fn write_tree_automaton(
	name: &str,
	symbols: &SymbolTable,
	states: &StateTable,
	alphabet: &RankedAlphabet,
	aut: &TreeAutomaton<RankedAlphabet>,
) -> String {
	let mut out = String::new();

	out.push_str("Ops");
	for symbol in alphabet.symbols() {
		let arity = alphabet.arity_of(symbol).unwrap_or(0);
		out.push_str(&format!(" {}:{}", symbol_name(symbols, symbol), arity));
	}
	out.push('\n');

	out.push_str(&format!("Automaton {name}\n"));

	out.push_str("States");
	for state in sorted(aut.states()) {
		out.push_str(&format!(" {}", state_name(states, state)));
	}
	out.push('\n');

	out.push_str("Final States");
	for &state in sorted_ref(aut.finals()) {
		out.push_str(&format!(" {}", state_name(states, state)));
	}
	out.push('\n');

	out.push_str("Transitions\n");
	for (parent, symbol, tuple) in aut.transitions().all_transitions() {
		let lhs = if tuple.is_empty() {
			symbol_name(symbols, symbol)
		} else {
			let children: Vec<String> = tuple.iter().map(|&c| state_name(states, c)).collect();
			format!("{}({})", symbol_name(symbols, symbol), children.join(","))
		};
		out.push_str(&format!("{lhs} -> {}\n", state_name(states, parent)));
	}

	out
}

/// The finite-automaton counterpart of [`write_tree_automaton`]. Start
/// productions are written as bare `sym -> q` lines, matching the encoding
/// [`crate::document::Document::build_finite_automaton`] expects on
/// read-back.
pub fn write_finite_automaton(name: &str, symbols: &SymbolTable, states: &StateTable, aut: &FiniteAutomaton) -> String {
	let mut out = String::new();

	out.push_str("Ops");
	for symbol in sorted(aut.alphabet()) {
		out.push_str(&format!(" {}:1", symbol_name(symbols, symbol)));
	}
	out.push('\n');

	out.push_str(&format!("Automaton {name}\n"));

	out.push_str("States");
	for state in sorted(aut.states()) {
		out.push_str(&format!(" {}", state_name(states, state)));
	}
	out.push('\n');

	out.push_str("Final States");
	for &state in sorted_ref(aut.final_states()) {
		out.push_str(&format!(" {}", state_name(states, state)));
	}
	out.push('\n');

	out.push_str("Transitions\n");
	for state in sorted(aut.states()) {
		for symbol in sorted(aut.start_symbols(state).collect::<std::collections::HashSet<_>>()) {
			out.push_str(&format!("{} -> {}\n", symbol_name(symbols, symbol), state_name(states, state)));
		}
		for (symbol, to) in aut.transitions_from(state) {
			out.push_str(&format!(
				"{}({}) -> {}\n",
				symbol_name(symbols, symbol),
				state_name(states, state),
				state_name(states, to)
			));
		}
	}

	out
}

fn sorted<T: Ord>(items: impl IntoIterator<Item = T>) -> Vec<T> {
	let mut items: Vec<T> = items.into_iter().collect();
	items.sort();
	items
}

fn sorted_ref<T: Ord + Copy>(items: &std::collections::HashSet<T>) -> Vec<&T> {
	let mut items: Vec<&T> = items.iter().collect();
	items.sort();
	items
}
