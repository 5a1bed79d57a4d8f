use crate::document::{Document, ParsedTransition, SymbolTable};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
	None,
	Ops,
	Automaton,
	States,
	FinalStates,
	Transitions,
}

/// Parses a Timbuk document (§6): `Ops`, `Automaton`, `States`,
/// `Final States`, and `Transitions` sections, in any order, each header
/// optionally followed by entries on the same line and continuing on
/// subsequent lines until the next header.
pub fn parse(text: &str) -> Result<Document, Error> {
	parse_with_symbols(text, SymbolTable::default()).map(|(doc, _)| doc)
}

/// Like [`parse`], but interns symbols into a caller-supplied table instead
/// of starting from an empty one, and hands the (possibly grown) table back
/// alongside the document. Used by operations that load two files and need
/// the same symbol name to resolve to the same [`vata_core::alphabet::Symbol`]
/// id in both (`union`, `isect`, `incl`, `equiv`).
pub fn parse_with_symbols(text: &str, symbols: SymbolTable) -> Result<(Document, SymbolTable), Error> {
	let mut doc = Document {
		symbols,
		..Document::default()
	};
	let mut section = Section::None;

	for (idx, raw_line) in text.lines().enumerate() {
		let line_no = idx + 1;
		let line = strip_comment(raw_line).trim();
		if line.is_empty() {
			continue;
		}

		let (header, rest) = split_header(line);
		match header {
			Some("Ops") => {
				section = Section::Ops;
				parse_ops_entries(&mut doc, rest, line_no)?;
			}
			Some("Automaton") => {
				section = Section::Automaton;
				let name = rest.trim();
				if name.is_empty() || name.split_whitespace().count() != 1 {
					return Err(Error::MalformedAutomatonHeader {
						line: line_no,
						found: rest.trim().to_owned(),
					});
				}
				doc.automaton_name = name.to_owned();
			}
			Some("States") => {
				section = Section::States;
				for name in rest.split_whitespace() {
					let state = doc.intern_state(name);
					doc.declared_states.push(state);
				}
			}
			Some("Final States") => {
				section = Section::FinalStates;
				for name in rest.split_whitespace() {
					let state = doc.intern_state(name);
					doc.final_states.push(state);
				}
			}
			Some("Transitions") => {
				section = Section::Transitions;
				if !rest.trim().is_empty() {
					let transition = parse_transition(&mut doc, rest, line_no)?;
					doc.transitions.push(transition);
				}
			}
			Some(_) | None => match section {
				Section::Ops => parse_ops_entries(&mut doc, line, line_no)?,
				Section::States => {
					for name in line.split_whitespace() {
						let state = doc.intern_state(name);
						doc.declared_states.push(state);
					}
				}
				Section::FinalStates => {
					for name in line.split_whitespace() {
						let state = doc.intern_state(name);
						doc.final_states.push(state);
					}
				}
				Section::Transitions => {
					let transition = parse_transition(&mut doc, line, line_no)?;
					doc.transitions.push(transition);
				}
				Section::Automaton | Section::None => {
					return Err(Error::OutsideSection {
						line: line_no,
						found: line.to_owned(),
					});
				}
			},
		}
	}

	if doc.automaton_name.is_empty() {
		return Err(Error::MissingAutomatonName);
	}

	let symbols = doc.symbols.clone();
	Ok((doc, symbols))
}

fn strip_comment(line: &str) -> &str {
	match line.find('%') {
		Some(pos) => &line[..pos],
		None => line,
	}
}

/// Recognizes a known section header at the start of `line`, returning the
/// header keyword and the remainder of the line. `Final States` is the only
/// two-word header.
fn split_header(line: &str) -> (Option<&'static str>, &str) {
	const HEADERS: [&str; 5] = ["Ops", "Automaton", "Final States", "States", "Transitions"];
	for header in HEADERS {
		if let Some(rest) = line.strip_prefix(header) {
			if rest.is_empty() || rest.starts_with(char::is_whitespace) {
				let canonical = match header {
					"Ops" => "Ops",
					"Automaton" => "Automaton",
					"Final States" => "Final States",
					"States" => "States",
					_ => "Transitions",
				};
				return (Some(canonical), rest);
			}
		}
	}
	(None, line)
}

fn parse_ops_entries(doc: &mut Document, text: &str, line_no: usize) -> Result<(), Error> {
	for entry in text.split_whitespace() {
		let (name, arity) = entry.split_once(':').ok_or_else(|| Error::MalformedArityEntry {
			line: line_no,
			found: entry.to_owned(),
		})?;
		let arity: vata_core::alphabet::Arity =
			arity.parse().map_err(|_| Error::MalformedArityEntry {
				line: line_no,
				found: entry.to_owned(),
			})?;
		let symbol = doc.intern_symbol(name);
		doc.arities.insert(symbol, arity);
	}
	Ok(())
}

/// Parses one `Transitions` line: either `sym -> q` or
/// `sym(c1,...,ck) -> q`.
fn parse_transition(doc: &mut Document, line: &str, line_no: usize) -> Result<ParsedTransition, Error> {
	let (lhs, rhs) = line.split_once("->").ok_or_else(|| Error::MalformedTransition {
		line: line_no,
		found: line.to_owned(),
	})?;
	let lhs = lhs.trim();
	let state_name = rhs.trim();
	if state_name.is_empty() {
		return Err(Error::MalformedTransition {
			line: line_no,
			found: line.to_owned(),
		});
	}
	let state = doc.intern_state(state_name);

	match lhs.find('(') {
		None => {
			let symbol = doc.intern_symbol(lhs);
			Ok(ParsedTransition::Bare { symbol, state })
		}
		Some(open) => {
			if !lhs.ends_with(')') {
				return Err(Error::UnclosedChildList {
					line: line_no,
					found: lhs.to_owned(),
				});
			}
			let symbol_name = lhs[..open].trim();
			let args = &lhs[open + 1..lhs.len() - 1];
			let symbol = doc.intern_symbol(symbol_name);
			let children = if args.trim().is_empty() {
				Vec::new()
			} else {
				args.split(',').map(|c| doc.intern_state(c.trim())).collect()
			};
			Ok(ParsedTransition::WithChildren { symbol, children, state })
		}
	}
}
