use std::fmt;

/// A state identifier.
///
/// States are dense per automaton: sanitization (see [`crate::dispatch`])
/// renumbers the states of two operands into disjoint or shared ranges
/// before any algorithm that needs a contiguous index space runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State(pub u32);

impl State {
	pub fn new(id: u32) -> Self {
		Self(id)
	}

	pub fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for State {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "q{}", self.0)
	}
}

impl From<u32> for State {
	fn from(id: u32) -> Self {
		Self(id)
	}
}

/// Allocates fresh, never-reused state identifiers.
#[derive(Debug, Default, Clone)]
pub struct StateAllocator {
	next: u32,
}

impl StateAllocator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes sure the allocator will never hand out an id `<= used`.
	pub fn reserve_up_to(&mut self, used: State) {
		if used.0 >= self.next {
			self.next = used.0 + 1;
		}
	}

	pub fn fresh(&mut self) -> State {
		let id = self.next;
		self.next += 1;
		State(id)
	}
}
