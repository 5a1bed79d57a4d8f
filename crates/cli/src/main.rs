//! `vata`: the command-line front end over [`vata_core`] and
//! [`vata_timbuk`] (§6).
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use vata_core::alphabet::RankedAlphabet;
use vata_core::dispatch::{self, Direction, InclusionParams, Representation};
use vata_core::prune::{self, PruneStrategy};
use vata_core::simulation;
use vata_core::state::StateAllocator;
use vata_timbuk::{Document, SymbolTable};

#[derive(Parser)]
#[command(name = "vata", about = "Tree and finite automata over ranked alphabets")]
struct Cli {
	#[command(subcommand)]
	verb: Verb,

	/// Representation: `expl`, `expl_fa`, `bdd-td`, `bdd-bu`.
	#[arg(short = 'r', long = "rep", default_value = "expl", global = true)]
	representation: String,

	/// Input format (`timbuk` only).
	#[arg(short = 'I', long = "in-format", global = true)]
	input_format: Option<String>,
	/// Output format (`timbuk` only).
	#[arg(short = 'O', long = "out-format", global = true)]
	output_format: Option<String>,
	/// Sets both input and output format at once.
	#[arg(short = 'F', long = "format", global = true)]
	both_format: Option<String>,

	/// Print elapsed CPU time on stderr.
	#[arg(short = 't', global = true)]
	timing: bool,
	/// Verbose logging.
	#[arg(short = 'v', global = true)]
	verbose: bool,
	/// Suppress result-automaton output.
	#[arg(short = 'n', global = true)]
	no_output: bool,
	/// Prune unreachable states beforehand.
	#[arg(short = 'p', global = true)]
	prune_unreachable: bool,
	/// Prune useless states beforehand (implies `-p`).
	#[arg(short = 's', global = true)]
	prune_useless: bool,

	/// Algorithm options, `k=v,k=v` (§4.9).
	#[arg(short = 'o', global = true)]
	options: Option<String>,
}

#[derive(Subcommand)]
enum Verb {
	/// Print usage.
	Help,
	/// Parse and echo.
	Load { file: PathBuf },
	/// Print a candidate tree.
	Witness { file: PathBuf },
	/// Complement (DFA assumption).
	Cmpl { file: PathBuf },
	/// Language union.
	Union { f1: PathBuf, f2: PathBuf },
	/// Language intersection.
	Isect { f1: PathBuf, f2: PathBuf },
	/// Print the simulation relation.
	Sim { file: PathBuf },
	/// Quotient under simulation.
	Red { file: PathBuf },
	/// Emit `1` if `L(f1) subseteq L(f2)`, else `0`.
	Incl { f1: PathBuf, f2: PathBuf },
	/// Language equivalence.
	Equiv { f1: PathBuf, f2: PathBuf },
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	if cli.verbose || cli.timing {
		tracing_subscriber::fmt()
			.with_env_filter(if cli.verbose { "debug" } else { "info" })
			.init();
	}

	let started = std::time::Instant::now();
	let outcome = run(&cli);
	if cli.timing {
		eprintln!("elapsed: {:?}", started.elapsed());
	}

	if let Err(err) = outcome {
		eprintln!("An error occured: {err}");
		std::process::exit(1);
	}
	Ok(())
}

fn run(cli: &Cli) -> Result<()> {
	if matches!(cli.verb, Verb::Help) {
		print_help();
		return Ok(());
	}

	for flag in [&cli.input_format, &cli.output_format, &cli.both_format] {
		if let Some(flag) = flag {
			if flag != "timbuk" {
				bail!("only the timbuk text format is supported, found `{flag}`");
			}
		}
	}

	let representation = Representation::from_flag(&cli.representation)?;
	if matches!(representation, Representation::BddTopDown | Representation::BddBottomUp) {
		bail!("the symbolic BDD representations are not implemented in this build");
	}

	let prune_strategy = if cli.prune_useless {
		Some(PruneStrategy::Useless)
	} else if cli.prune_unreachable {
		Some(PruneStrategy::Unreachable)
	} else {
		None
	};

	let params = match &cli.options {
		Some(opts) => InclusionParams::from_options(opts)?,
		None => InclusionParams::default(),
	};

	match representation {
		Representation::ExplicitFinite => run_finite(cli, prune_strategy, &params),
		Representation::ExplicitTree => run_tree(cli, prune_strategy, &params),
		Representation::BddTopDown | Representation::BddBottomUp => unreachable!("rejected above"),
	}
}

fn print_help() {
	println!("vata [-r rep] [-I/-O/-F fmt] [-t] [-v] [-n] [-p|-s] [-o k=v,...] <verb> <args>");
	println!("verbs: help, load, witness, cmpl, union, isect, sim, red, incl, equiv");
}

fn read(path: &PathBuf) -> Result<String> {
	std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn run_tree(cli: &Cli, prune_strategy: Option<PruneStrategy>, params: &InclusionParams) -> Result<()> {
	match &cli.verb {
		Verb::Help => unreachable!(),
		Verb::Load { file } => {
			let doc = vata_timbuk::parse(&read(file)?)?;
			let (alphabet, aut) = doc.build_tree_automaton()?;
			let aut = apply_prune_tree(&aut, prune_strategy);
			emit_tree(cli, &doc, &alphabet, &aut);
			Ok(())
		}
		Verb::Witness { file } => {
			let doc = vata_timbuk::parse(&read(file)?)?;
			let (alphabet, aut) = doc.build_tree_automaton()?;
			let aut = apply_prune_tree(&aut, prune_strategy);
			let witness = aut.candidate_tree();
			emit_tree(cli, &doc, &alphabet, &witness);
			Ok(())
		}
		Verb::Cmpl { file: _ } => {
			bail!(
				"cmpl is not supported for tree automata (-r expl): complementing a \
				 nondeterministic tree automaton requires determinization, which this \
				 build does not implement for trees; use -r expl_fa for finite automata"
			);
		}
		Verb::Union { f1, f2 } => {
			let (doc1, doc2, alphabet, a, b) = load_tree_pair(f1, f2)?;
			let a = apply_prune_tree(&a, prune_strategy);
			let b = apply_prune_tree(&b, prune_strategy);
			let (mut result, b_san) = dispatch::sanitize_tree(&a, &b);
			result.union(&b_san);
			emit_tree(cli, &doc1, &alphabet, &result);
			let _ = doc2;
			Ok(())
		}
		Verb::Isect { f1, f2 } => {
			let (doc1, _doc2, alphabet, a, b) = load_tree_pair(f1, f2)?;
			let a = apply_prune_tree(&a, prune_strategy);
			let b = apply_prune_tree(&b, prune_strategy);

			let mut allocator = StateAllocator::new();
			let mut pairs = std::collections::HashMap::new();
			let result = a.intersection(&b, |p, q| {
				*pairs.entry((p, q)).or_insert_with(|| allocator.fresh())
			});
			emit_tree(cli, &doc1, &alphabet, &result);
			Ok(())
		}
		Verb::Sim { file } => {
			let doc = vata_timbuk::parse(&read(file)?)?;
			let (_alphabet, aut) = doc.build_tree_automaton()?;
			let preorder = match params.direction {
				Direction::Downward => simulation::compute_downward_simulation(&aut),
				Direction::Upward => simulation::compute_upward_simulation(&aut),
			};
			print_preorder(&doc, &preorder);
			Ok(())
		}
		Verb::Red { file } => {
			let doc = vata_timbuk::parse(&read(file)?)?;
			let (alphabet, aut) = doc.build_tree_automaton()?;
			let preorder = match params.direction {
				Direction::Downward => simulation::compute_downward_simulation(&aut),
				Direction::Upward => simulation::compute_upward_simulation(&aut),
			};
			let quotient = simulation::quotient_tree(&aut, &preorder);
			emit_tree(cli, &doc, &alphabet, &quotient);
			Ok(())
		}
		Verb::Incl { f1, f2 } => {
			let (_doc1, _doc2, _alphabet, a, b) = load_tree_pair(f1, f2)?;
			let holds = dispatch::check_tree_inclusion(&a, &b, params)?;
			println!("{}", if holds { 1 } else { 0 });
			Ok(())
		}
		Verb::Equiv { f1, f2 } => {
			let (_doc1, _doc2, _alphabet, a, b) = load_tree_pair(f1, f2)?;
			let mut params = *params;
			params.check_equivalence = true;
			let holds = dispatch::check_tree_inclusion(&a, &b, &params)?;
			println!("{}", if holds { 1 } else { 0 });
			Ok(())
		}
	}
}

fn load_tree_pair(
	f1: &PathBuf,
	f2: &PathBuf,
) -> Result<(
	Document,
	Document,
	std::rc::Rc<RankedAlphabet>,
	vata_core::tree::Automaton<RankedAlphabet>,
	vata_core::tree::Automaton<RankedAlphabet>,
)> {
	let (doc1, symbols) = vata_timbuk::parse_with_symbols(&read(f1)?, SymbolTable::default())?;
	let (doc2, _symbols) = vata_timbuk::parse_with_symbols(&read(f2)?, symbols)?;

	let mut alphabet = RankedAlphabet::new();
	for (&symbol, &arity) in doc1.arities.iter().chain(doc2.arities.iter()) {
		alphabet.declare(symbol, arity)?;
	}
	let alphabet = std::rc::Rc::new(alphabet);

	let a = build_tree_with_alphabet(&doc1, alphabet.clone())?;
	let b = build_tree_with_alphabet(&doc2, alphabet.clone())?;
	Ok((doc1, doc2, alphabet, a, b))
}

fn build_tree_with_alphabet(
	doc: &Document,
	alphabet: std::rc::Rc<RankedAlphabet>,
) -> Result<vata_core::tree::Automaton<RankedAlphabet>> {
	use vata_core::tree::Automaton as TreeAutomaton;
	use vata_timbuk::document::ParsedTransition;

	let mut aut = TreeAutomaton::new(alphabet);
	for transition in &doc.transitions {
		match transition {
			ParsedTransition::Bare { symbol, state } => {
				aut.add_transition(Vec::new(), *symbol, *state)?;
			}
			ParsedTransition::WithChildren { symbol, children, state } => {
				aut.add_transition(children.clone(), *symbol, *state)?;
			}
		}
	}
	for &f in &doc.final_states {
		aut.add_final(f);
	}
	Ok(aut)
}

fn apply_prune_tree(
	aut: &vata_core::tree::Automaton<RankedAlphabet>,
	strategy: Option<PruneStrategy>,
) -> vata_core::tree::Automaton<RankedAlphabet> {
	match strategy {
		Some(s) => prune::prune_tree(aut, s),
		None => aut.clone(),
	}
}

fn emit_tree(cli: &Cli, doc: &Document, alphabet: &RankedAlphabet, aut: &vata_core::tree::Automaton<RankedAlphabet>) {
	if cli.no_output {
		return;
	}
	print!(
		"{}",
		vata_timbuk::write_tree_automaton(&doc.automaton_name, &doc.symbols, &doc.states, alphabet, aut)
	);
}

fn print_preorder(doc: &Document, preorder: &simulation::Preorder) {
	let mut pairs: Vec<_> = preorder.pairs().collect();
	pairs.sort();
	for (p, q) in pairs {
		let p_name = doc.states.name_of(p).map(str::to_owned).unwrap_or_else(|| p.to_string());
		let q_name = doc.states.name_of(q).map(str::to_owned).unwrap_or_else(|| q.to_string());
		println!("{p_name} <= {q_name}");
	}
}

fn run_finite(cli: &Cli, prune_strategy: Option<PruneStrategy>, params: &InclusionParams) -> Result<()> {
	use vata_core::finite::FiniteAutomaton;

	match &cli.verb {
		Verb::Help => unreachable!(),
		Verb::Load { file } => {
			let doc = vata_timbuk::parse(&read(file)?)?;
			let aut = doc.build_finite_automaton()?;
			let aut = apply_prune_finite(&aut, prune_strategy);
			emit_finite(cli, &doc, &aut);
			Ok(())
		}
		Verb::Witness { file } => {
			let doc = vata_timbuk::parse(&read(file)?)?;
			let aut = doc.build_finite_automaton()?;
			let aut = apply_prune_finite(&aut, prune_strategy);
			let witness = witness_finite(&aut);
			emit_finite(cli, &doc, &witness);
			Ok(())
		}
		Verb::Cmpl { file } => {
			let doc = vata_timbuk::parse(&read(file)?)?;
			let aut = doc.build_finite_automaton()?;
			let aut = apply_prune_finite(&aut, prune_strategy);
			let mut alloc = StateAllocator::new();
			for s in aut.states() {
				alloc.reserve_up_to(s);
			}
			let comp = aut.complement(&mut alloc)?;
			emit_finite(cli, &doc, &comp);
			Ok(())
		}
		Verb::Union { f1, f2 } => {
			let (doc1, _doc2, a, b) = load_finite_pair(f1, f2)?;
			let mut a = apply_prune_finite(&a, prune_strategy);
			let b = apply_prune_finite(&b, prune_strategy);
			let (a_san, b_san) = dispatch::sanitize_finite(&a, &b);
			a = a_san;
			a.union(&b_san);
			emit_finite(cli, &doc1, &a);
			Ok(())
		}
		Verb::Isect { f1, f2 } => {
			let (doc1, _doc2, a, b) = load_finite_pair(f1, f2)?;
			let a = apply_prune_finite(&a, prune_strategy);
			let b = apply_prune_finite(&b, prune_strategy);
			let result = finite_intersection(&a, &b);
			emit_finite(cli, &doc1, &result);
			Ok(())
		}
		Verb::Sim { file } => {
			let doc = vata_timbuk::parse(&read(file)?)?;
			let aut = doc.build_finite_automaton()?;
			let preorder = simulation::compute_downward_simulation_finite(&aut);
			print_preorder(&doc, &preorder);
			Ok(())
		}
		Verb::Red { file } => {
			let doc = vata_timbuk::parse(&read(file)?)?;
			let aut = doc.build_finite_automaton()?;
			let preorder = simulation::compute_downward_simulation_finite(&aut);
			let quotient = simulation::quotient_finite(&aut, &preorder);
			emit_finite(cli, &doc, &quotient);
			Ok(())
		}
		Verb::Incl { f1, f2 } => {
			let (_doc1, _doc2, a, b) = load_finite_pair(f1, f2)?;
			let holds = dispatch::check_finite_inclusion(&a, &b, params)?;
			println!("{}", if holds { 1 } else { 0 });
			Ok(())
		}
		Verb::Equiv { f1, f2 } => {
			let (_doc1, _doc2, a, b) = load_finite_pair(f1, f2)?;
			let mut params = *params;
			params.check_equivalence = true;
			let holds = dispatch::check_finite_inclusion(&a, &b, &params)?;
			println!("{}", if holds { 1 } else { 0 });
			Ok(())
		}
	}
}

fn load_finite_pair(
	f1: &PathBuf,
	f2: &PathBuf,
) -> Result<(Document, Document, vata_core::finite::FiniteAutomaton, vata_core::finite::FiniteAutomaton)> {
	let (doc1, symbols) = vata_timbuk::parse_with_symbols(&read(f1)?, SymbolTable::default())?;
	let (doc2, _symbols) = vata_timbuk::parse_with_symbols(&read(f2)?, symbols)?;
	let a = doc1.build_finite_automaton()?;
	let b = doc2.build_finite_automaton()?;
	Ok((doc1, doc2, a, b))
}

fn apply_prune_finite(
	aut: &vata_core::finite::FiniteAutomaton,
	strategy: Option<PruneStrategy>,
) -> vata_core::finite::FiniteAutomaton {
	match strategy {
		Some(s) => prune::prune_finite(aut, s),
		None => aut.clone(),
	}
}

fn emit_finite(cli: &Cli, doc: &Document, aut: &vata_core::finite::FiniteAutomaton) {
	if cli.no_output {
		return;
	}
	print!(
		"{}",
		vata_timbuk::write_finite_automaton(&doc.automaton_name, &doc.symbols, &doc.states, aut)
	);
}

/// A minimal accepting sub-automaton for a finite automaton, built by BFS
/// from the start productions to the nearest final state and replaying the
/// path back — the finite-automaton counterpart of
/// [`vata_core::tree::Automaton::candidate_tree`], for the `witness` verb.
fn witness_finite(aut: &vata_core::finite::FiniteAutomaton) -> vata_core::finite::FiniteAutomaton {
	use std::collections::{HashMap, HashSet, VecDeque};
	use vata_core::alphabet::Symbol;
	use vata_core::finite::FiniteAutomaton;
	use vata_core::state::State;

	let mut visited: HashSet<State> = HashSet::new();
	let mut parent: HashMap<State, (State, Symbol)> = HashMap::new();
	let mut start_symbol_for: HashMap<State, Symbol> = HashMap::new();
	let mut queue: VecDeque<State> = VecDeque::new();

	for state in aut.states() {
		if let Some(symbol) = aut.start_symbols(state).next() {
			if visited.insert(state) {
				start_symbol_for.insert(state, symbol);
				queue.push_back(state);
			}
		}
	}

	let mut target = visited.iter().copied().find(|&s| aut.is_final(s));
	while target.is_none() {
		let Some(q) = queue.pop_front() else { break };
		for (symbol, r) in aut.transitions_from(q) {
			if visited.insert(r) {
				parent.insert(r, (q, symbol));
				if aut.is_final(r) {
					target = Some(r);
					break;
				}
				queue.push_back(r);
			}
		}
	}

	let mut result = FiniteAutomaton::new();
	let Some(mut current) = target else {
		return result;
	};
	result.add_final(current);
	while let Some(&(prev, symbol)) = parent.get(&current) {
		result.add_transition(prev, symbol, current);
		current = prev;
	}
	if let Some(&symbol) = start_symbol_for.get(&current) {
		result.add_start(current, symbol);
	}
	result
}

/// The finite-automaton product construction used by `isect`: reachable
/// pairs of states related by a common symbol on both sides.
fn finite_intersection(
	a: &vata_core::finite::FiniteAutomaton,
	b: &vata_core::finite::FiniteAutomaton,
) -> vata_core::finite::FiniteAutomaton {
	use vata_core::finite::FiniteAutomaton;
	use vata_core::state::State;

	let mut allocator = StateAllocator::new();
	let mut pairs: std::collections::HashMap<(State, State), State> = std::collections::HashMap::new();
	let mut pair_state = |p: State, q: State| *pairs.entry((p, q)).or_insert_with(|| allocator.fresh());

	let mut result = FiniteAutomaton::new();
	for pa in a.states() {
		for pb in b.states() {
			for symbol in a.start_symbols(pa) {
				if b.start_symbols(pb).any(|s| s == symbol) {
					result.add_start(pair_state(pa, pb), symbol);
				}
			}
			for (symbol, ra) in a.transitions_from(pa) {
				for rb in b.successors(pb, symbol) {
					result.add_transition(pair_state(pa, pb), symbol, pair_state(ra, rb));
				}
			}
			if a.is_final(pa) && b.is_final(pb) {
				result.add_final(pair_state(pa, pb));
			}
		}
	}
	result
}
