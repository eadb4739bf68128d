use crate::automaton::{
	synthetic_names, Automaton, AutomatonError, Label, StateId, StateSet, SymbolId,
};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Symmetric distinguishability relation over `size` states, stored as a full matrix.
struct Distinguishable {
	size: usize,
	marks: Vec<bool>,
}

impl Distinguishable {
	fn new(size: usize) -> Self {
		Self {
			size,
			marks: vec![false; size * size],
		}
	}

	fn index(&self, a: usize, b: usize) -> usize {
		let (low, high) = if a < b { (a, b) } else { (b, a) };
		low * self.size + high
	}

	fn get(&self, a: usize, b: usize) -> bool {
		a != b && self.marks[self.index(a, b)]
	}

	fn mark(&mut self, a: usize, b: usize) {
		let index = self.index(a, b);
		self.marks[index] = true;
	}
}

impl Automaton {
	/// Checks whether every state has exactly one move per symbol and no epsilon moves.
	pub fn is_deterministic(&self) -> bool {
		(0..self.state_count()).all(|state| {
			self.targets(state, Label::Epsilon).is_empty()
				&& (0..self.symbol_count())
					.all(|symbol| self.targets(state, Label::Symbol(symbol)).len() == 1)
		})
	}

	pub(crate) fn run_deterministic(&self, input: &[SymbolId]) -> bool {
		let mut current = self.start();
		for &symbol in input {
			match self.successor(current, symbol) {
				Some(next) => current = next,
				None => return false,
			}
		}
		self.is_accepting(current)
	}

	/// Builds the minimal DFA equivalent to this automaton.
	///
	/// Automata with epsilon moves or several targets per move are converted by subset
	/// construction first. States unreachable from the start state are dropped. Missing moves
	/// count as moves into a rejecting sink while distinguishing states, but stay missing in the
	/// result.
	pub fn minimize(&self) -> Result<Automaton, AutomatonError> {
		if !self.is_functional() {
			debug!("minimizing non-deterministic automaton, converting first");
			return self.subset_construction()?.minimize();
		}

		let reachable: Vec<_> = self.reachable_states().into_iter().collect();
		let mut local = vec![None; self.state_count()];
		for (index, &state) in reachable.iter().enumerate() {
			local[state] = Some(index);
		}

		// the sink takes the last local index and loops on every symbol
		let sink = reachable.len();
		let size = sink + 1;
		let symbols = self.symbol_count();
		let successors: Vec<Vec<usize>> = (0..size)
			.map(|index| {
				(0..symbols)
					.map(|symbol| {
						reachable
							.get(index)
							.and_then(|&state| self.successor(state, symbol))
							.and_then(|next| local[next])
							.unwrap_or(sink)
					})
					.collect()
			})
			.collect();
		let accepting: Vec<bool> = (0..size)
			.map(|index| reachable.get(index).map_or(false, |&state| self.is_accepting(state)))
			.collect();

		let mut table = Distinguishable::new(size);
		for a in 0..size {
			for b in a + 1..size {
				if accepting[a] != accepting[b] {
					table.mark(a, b);
				}
			}
		}

		let mut passes = 0;
		loop {
			let mut changed = false;
			for a in 0..size {
				for b in a + 1..size {
					if table.get(a, b) {
						continue;
					}
					let split = (0..symbols)
						.any(|symbol| table.get(successors[a][symbol], successors[b][symbol]));
					if split {
						table.mark(a, b);
						changed = true;
					}
				}
			}
			passes += 1;
			if !changed {
				break;
			}
		}
		trace!(passes, "table filling reached a fixed point");

		let mut representatives: Vec<usize> = Vec::new();
		let mut class_of = vec![0; sink];
		for index in 0..sink {
			match representatives.iter().position(|&rep| !table.get(rep, index)) {
				Some(class) => class_of[index] = class,
				None => {
					class_of[index] = representatives.len();
					representatives.push(index);
				}
			}
		}

		let mut transitions = BTreeMap::new();
		let mut accepting_classes = StateSet::new();
		for (class, &rep) in representatives.iter().enumerate() {
			if accepting[rep] {
				accepting_classes.insert(class);
			}
			for symbol in 0..symbols {
				let target = successors[rep][symbol];
				if target != sink {
					let to = StateSet::from([class_of[target]]);
					transitions.insert((class, Label::Symbol(symbol)), to);
				}
			}
		}

		let start = local[self.start()]
			.map(|index| class_of[index])
			.ok_or_else(|| AutomatonError::Internal("start state is not reachable".into()))?;

		// a representative missing a move its class partners have can orphan a class
		let live = live_classes(start, &transitions);
		let mut renumber = vec![None; representatives.len()];
		for (new, &old) in live.iter().enumerate() {
			renumber[old] = Some(new);
		}
		let transitions = transitions
			.into_iter()
			.filter_map(|((class, label), to)| {
				let from = renumber[class]?;
				let to = to
					.iter()
					.map(|&target| renumber[target])
					.collect::<Option<StateSet>>()?;
				Some(((from, label), to))
			})
			.collect();
		let accepting_classes = accepting_classes
			.iter()
			.filter_map(|&class| renumber[class])
			.collect();
		let start = renumber[start]
			.ok_or_else(|| AutomatonError::Internal("start class dropped as unreachable".into()))?;

		debug!(
			from = self.state_count(),
			reachable = reachable.len(),
			classes = representatives.len(),
			to = live.len(),
			"minimized automaton"
		);
		Automaton::from_parts(
			synthetic_names(live.len()),
			self.alphabet().map(String::from).collect(),
			start,
			accepting_classes,
			transitions,
		)
	}
}

/// Classes reachable from `start` over the class transitions.
fn live_classes(start: StateId, transitions: &BTreeMap<(StateId, Label), StateSet>) -> StateSet {
	let mut live = StateSet::new();
	live.insert(start);
	let mut stack = vec![start];
	while let Some(class) = stack.pop() {
		for to in transitions
			.range((class, Label::Symbol(0))..=(class, Label::Epsilon))
			.map(|(_, to)| to)
		{
			for &next in to {
				if live.insert(next) {
					stack.push(next);
				}
			}
		}
	}
	live
}
