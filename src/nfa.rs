use crate::automaton::{
	synthetic_names, Automaton, AutomatonError, Label, StateId, StateSet, SymbolId,
};
use indexmap::IndexSet;
use itertools::Itertools;
use std::{
	collections::{BTreeMap, HashSet},
	fmt,
};
use tracing::{debug, trace};

/// Result of converting an automaton into a DFA.
#[derive(Debug, Clone)]
pub enum Conversion {
	/// The automaton was deterministic already; nothing was built.
	AlreadyDeterministic,
	/// The equivalent DFA produced by subset construction.
	Converted(Automaton),
}

impl Conversion {
	pub fn is_already_deterministic(&self) -> bool {
		matches!(self, Self::AlreadyDeterministic)
	}

	/// Returns the converted automaton, if a conversion took place.
	pub fn into_automaton(self) -> Option<Automaton> {
		match self {
			Self::AlreadyDeterministic => None,
			Self::Converted(automaton) => Some(automaton),
		}
	}
}

impl fmt::Display for Conversion {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::AlreadyDeterministic => write!(f, "It is already DFA."),
			Self::Converted(automaton) => write!(f, "{}", automaton),
		}
	}
}

impl Automaton {
	/// States reachable from `states` using zero or more epsilon moves, `states` included.
	pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
		let mut closure = states.clone();
		let mut stack: Vec<StateId> = states.iter().copied().collect();
		while let Some(state) = stack.pop() {
			for &next in self.targets(state, Label::Epsilon) {
				if closure.insert(next) {
					stack.push(next);
				}
			}
		}
		closure
	}

	/// Direct targets of `states` under `symbol`, without epsilon closure.
	pub fn move_on_symbol(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
		states
			.iter()
			.flat_map(|&state| self.targets(state, Label::Symbol(symbol)))
			.copied()
			.collect()
	}

	/// Explores every run on `input` with a stack of `(state, cursor)` entries.
	///
	/// Each pair is pushed at most once, which bounds the search even with epsilon cycles.
	pub(crate) fn run_nondeterministic(&self, input: &[SymbolId]) -> bool {
		let mut stack = vec![(self.start(), 0)];
		let mut visited: HashSet<(StateId, usize)> = stack.iter().copied().collect();

		while let Some((state, cursor)) = stack.pop() {
			for &next in self.targets(state, Label::Epsilon) {
				if visited.insert((next, cursor)) {
					stack.push((next, cursor));
				}
			}

			if cursor == input.len() {
				if self.is_accepting(state) {
					return true;
				}
				continue;
			}

			for &next in self.targets(state, Label::Symbol(input[cursor])) {
				if visited.insert((next, cursor + 1)) {
					stack.push((next, cursor + 1));
				}
			}
		}

		trace!(explored = visited.len(), "no accepting run");
		false
	}

	/// Converts the automaton into an equivalent DFA.
	///
	/// Returns [`Conversion::AlreadyDeterministic`] without building anything if
	/// [`is_deterministic`](Automaton::is_deterministic) holds.
	pub fn to_dfa(&self) -> Result<Conversion, AutomatonError> {
		if self.is_deterministic() {
			debug!("automaton is already deterministic");
			return Ok(Conversion::AlreadyDeterministic);
		}
		self.subset_construction().map(Conversion::Converted)
	}

	/// Subset construction. The result may be incomplete: empty moves are left out instead of
	/// leading into a dead state.
	pub(crate) fn subset_construction(&self) -> Result<Automaton, AutomatonError> {
		let mut initial = StateSet::new();
		initial.insert(self.start());

		// discovery order doubles as the FIFO worklist and as the new state numbering
		let mut subsets = IndexSet::new();
		subsets.insert(self.epsilon_closure(&initial));
		let mut transitions = BTreeMap::new();

		let mut cursor = 0;
		while let Some(current) = subsets.get_index(cursor).cloned() {
			for symbol in 0..self.symbol_count() {
				let target = self.epsilon_closure(&self.move_on_symbol(&current, symbol));
				if target.is_empty() {
					continue;
				}
				let (id, fresh) = subsets.insert_full(target);
				if fresh {
					trace!(
						"discovered Q{} = {{{}}}",
						id,
						subsets[id]
							.iter()
							.filter_map(|&state| self.state_name(state))
							.join(",")
					);
				}
				transitions.insert((cursor, Label::Symbol(symbol)), StateSet::from([id]));
			}
			cursor += 1;
		}

		let accepting = subsets
			.iter()
			.positions(|subset| !subset.is_disjoint(self.accepting()))
			.collect();

		debug!(
			from = self.state_count(),
			to = subsets.len(),
			"subset construction finished"
		);
		Automaton::from_parts(
			synthetic_names(subsets.len()),
			self.alphabet().map(String::from).collect(),
			0,
			accepting,
			transitions,
		)
	}
}
