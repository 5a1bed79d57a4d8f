//! Parse-build-serialize-reparse round trips for both automaton models
//! (§6, §8 scenario 1: "load a file, dump it back out, compare").

const TREE_SOURCE: &str = "
Ops a:0 b:1 f:2
Automaton Tree1
States q0 q1 q2
Final States q2
Transitions
a -> q0
b(q0) -> q1
f(q0,q1) -> q2
";

const FINITE_SOURCE: &str = "
Ops a:1 b:1
Automaton Finite1
States q0 q1
Final States q1
Transitions
a -> q0
b(q0) -> q1
";

#[test]
fn tree_document_builds_the_expected_automaton() {
	let doc = vata_timbuk::parse(TREE_SOURCE).unwrap();
	assert_eq!(doc.automaton_name, "Tree1");

	let (_alphabet, aut) = doc.build_tree_automaton().unwrap();
	assert_eq!(aut.finals().len(), 1);
	assert!(!aut.is_language_empty());
}

#[test]
fn tree_round_trip_preserves_language() {
	let doc = vata_timbuk::parse(TREE_SOURCE).unwrap();
	let (alphabet, aut) = doc.build_tree_automaton().unwrap();

	let dumped = vata_timbuk::write_tree_automaton(&doc.automaton_name, &doc.symbols, &doc.states, &alphabet, &aut);

	let reparsed = vata_timbuk::parse(&dumped).unwrap();
	let (_alphabet2, aut2) = reparsed.build_tree_automaton().unwrap();

	assert_eq!(aut.is_language_empty(), aut2.is_language_empty());
	assert_eq!(aut2.finals().len(), aut.finals().len());
}

#[test]
fn finite_document_builds_start_and_step_transitions() {
	let doc = vata_timbuk::parse(FINITE_SOURCE).unwrap();
	let aut = doc.build_finite_automaton().unwrap();

	let start = doc.states.id_of("q0").unwrap();
	let accept = doc.states.id_of("q1").unwrap();
	assert!(aut.is_start(start));
	assert!(aut.is_final(accept));
}

#[test]
fn finite_round_trip_preserves_transitions() {
	let doc = vata_timbuk::parse(FINITE_SOURCE).unwrap();
	let aut = doc.build_finite_automaton().unwrap();

	let dumped = vata_timbuk::write_finite_automaton(&doc.automaton_name, &doc.symbols, &doc.states, &aut);
	let reparsed = vata_timbuk::parse(&dumped).unwrap();
	let aut2 = reparsed.build_finite_automaton().unwrap();

	assert_eq!(aut.states().len(), aut2.states().len());
	assert_eq!(aut.final_states().len(), aut2.final_states().len());
}

#[test]
fn shared_symbol_table_assigns_the_same_id_to_a_common_symbol() {
	let (doc1, symbols) = vata_timbuk::parse_with_symbols(TREE_SOURCE, vata_timbuk::SymbolTable::default()).unwrap();
	let (doc2, _) = vata_timbuk::parse_with_symbols(TREE_SOURCE, symbols).unwrap();

	let a_in_doc1 = doc1.symbols.id_of("a").unwrap();
	let a_in_doc2 = doc2.symbols.id_of("a").unwrap();
	assert_eq!(a_in_doc1, a_in_doc2);
}

#[test]
fn malformed_arity_entry_is_rejected() {
	let err = vata_timbuk::parse("Ops a\nAutomaton X\nTransitions\n").unwrap_err();
	assert!(matches!(err, vata_timbuk::Error::MalformedArityEntry { .. }));
}

#[test]
fn missing_automaton_name_is_rejected() {
	let err = vata_timbuk::parse("Ops a:0\nStates q0\n").unwrap_err();
	assert!(matches!(err, vata_timbuk::Error::MissingAutomatonName));
}
