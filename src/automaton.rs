use crate::definition::{Definition, TransitionRow};
use indexmap::IndexSet;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;
use tracing::{debug, trace};

/// Reserved name of the pseudo-symbol labelling moves that consume no input.
pub const EPSILON: &str = "epsilon";

/// Index of a state in the declared state order.
pub type StateId = usize;

/// Index of a symbol in the declared alphabet order.
pub type SymbolId = usize;

/// Ordered set of states. Equal sets iterate identically, so a set is its own canonical key.
pub type StateSet = BTreeSet<StateId>;

static NO_TARGETS: StateSet = BTreeSet::new();

/// Label of a transition.
///
/// `Epsilon` orders after every symbol, so the transitions of one state form a contiguous range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
	Symbol(SymbolId),
	Epsilon,
}

/// A finite automaton, possibly non-deterministic and with epsilon moves.
///
/// States and symbols are interned at construction time; every algorithm works on their indices.
/// Derived automata (see [`Automaton::to_dfa`] and [`Automaton::minimize`]) are built from scratch
/// and never share storage with their source.
#[derive(Debug, Clone)]
pub struct Automaton {
	states: IndexSet<String>,
	alphabet: IndexSet<String>,
	start: StateId,
	accepting: StateSet,
	transitions: BTreeMap<(StateId, Label), StateSet>,
}

impl Automaton {
	/// Creates a new automaton from named states, symbols and transition rows.
	///
	/// Target duplicates under one `(state, symbol)` pair collapse, as do duplicate accepting states.
	/// Every referenced state must be declared and every transition symbol must be part of the
	/// alphabet or [`EPSILON`].
	pub fn new<S, A, F, R>(
		states: S,
		alphabet: A,
		start: &str,
		accepting: F,
		rows: R,
	) -> Result<Self, AutomatonError>
	where
		S: IntoIterator,
		S::Item: Into<String>,
		A: IntoIterator,
		A::Item: Into<String>,
		F: IntoIterator,
		F::Item: AsRef<str>,
		R: IntoIterator<Item = TransitionRow>,
	{
		let states = intern(states, AutomatonError::DuplicateState)?;
		let alphabet = intern(alphabet, AutomatonError::DuplicateSymbol)?;
		if states.is_empty() {
			return Err(AutomatonError::EmptyStates);
		}
		if alphabet.is_empty() {
			return Err(AutomatonError::EmptyAlphabet);
		}
		if alphabet.contains(EPSILON) {
			return Err(AutomatonError::ReservedSymbol);
		}

		let start = lookup_state(&states, start)?;
		let accepting = accepting
			.into_iter()
			.map(|name| lookup_state(&states, name.as_ref()))
			.collect::<Result<StateSet, _>>()?;

		let mut transitions = BTreeMap::<_, StateSet>::new();
		for TransitionRow { from, symbol, to } in rows {
			let from = lookup_state(&states, &from)?;
			let label = lookup_label(&alphabet, &symbol)?;
			let to = to
				.iter()
				.map(|name| lookup_state(&states, name))
				.collect::<Result<StateSet, _>>()?;
			if !to.is_empty() {
				transitions.entry((from, label)).or_default().extend(to);
			}
		}

		debug!(
			states = states.len(),
			symbols = alphabet.len(),
			transitions = transitions.len(),
			"constructed automaton"
		);
		Ok(Self {
			states,
			alphabet,
			start,
			accepting,
			transitions,
		})
	}

	/// Assembles a derived automaton from already interned parts.
	/// Returns an `AutomatonError::Internal` error if the parts are inconsistent.
	pub(crate) fn from_parts(
		states: IndexSet<String>,
		alphabet: IndexSet<String>,
		start: StateId,
		accepting: StateSet,
		transitions: BTreeMap<(StateId, Label), StateSet>,
	) -> Result<Self, AutomatonError> {
		let automaton = Self {
			states,
			alphabet,
			start,
			accepting,
			transitions,
		};
		automaton.check()?;
		Ok(automaton)
	}

	fn check(&self) -> Result<(), AutomatonError> {
		let state_count = self.states.len();
		if self.start >= state_count {
			return Err(AutomatonError::Internal(format!(
				"start state {} out of {} states",
				self.start, state_count
			)));
		}
		if let Some(state) = self.accepting.iter().find(|&&state| state >= state_count) {
			return Err(AutomatonError::Internal(format!(
				"accepting state {} out of {} states",
				state, state_count
			)));
		}
		for (&(from, label), to) in &self.transitions {
			let symbol_ok = match label {
				Label::Symbol(symbol) => symbol < self.alphabet.len(),
				Label::Epsilon => true,
			};
			if from >= state_count
				|| !symbol_ok || to.is_empty()
				|| to.iter().any(|&state| state >= state_count)
			{
				return Err(AutomatonError::Internal(format!(
					"malformed transition from state {} on {:?}",
					from, label
				)));
			}
		}
		Ok(())
	}

	/// Names of all states in declaration order.
	pub fn states(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
		self.states.iter().map(String::as_str)
	}

	/// Number of states.
	pub fn state_count(&self) -> usize {
		self.states.len()
	}

	/// Names of all symbols in declaration order, epsilon excluded.
	pub fn alphabet(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
		self.alphabet.iter().map(String::as_str)
	}

	pub fn symbol_count(&self) -> usize {
		self.alphabet.len()
	}

	pub fn start(&self) -> StateId {
		self.start
	}

	/// Name of the start state.
	pub fn start_state(&self) -> &str {
		&self.states[self.start]
	}

	pub fn accepting(&self) -> &StateSet {
		&self.accepting
	}

	/// Names of the accepting states in declaration order.
	pub fn accepting_states(&self) -> impl Iterator<Item = &str> + '_ {
		self.accepting.iter().map(move |&state| self.states[state].as_str())
	}

	pub fn is_accepting(&self, state: StateId) -> bool {
		self.accepting.contains(&state)
	}

	pub fn state_id(&self, name: &str) -> Option<StateId> {
		self.states.get_index_of(name)
	}

	pub fn state_name(&self, state: StateId) -> Option<&str> {
		self.states.get_index(state).map(String::as_str)
	}

	pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
		self.alphabet.get_index_of(name)
	}

	pub fn symbol_name(&self, symbol: SymbolId) -> Option<&str> {
		self.alphabet.get_index(symbol).map(String::as_str)
	}

	/// Name of a label, [`EPSILON`] for epsilon moves.
	pub fn label_name(&self, label: Label) -> Option<&str> {
		match label {
			Label::Symbol(symbol) => self.symbol_name(symbol),
			Label::Epsilon => Some(EPSILON),
		}
	}

	/// Direct targets of `state` under `label`; empty if there is no such move.
	pub fn targets(&self, state: StateId, label: Label) -> &StateSet {
		self.transitions.get(&(state, label)).unwrap_or(&NO_TARGETS)
	}

	/// All outgoing transitions of `state`, symbols in alphabet order followed by epsilon.
	pub fn outgoing(&self, state: StateId) -> impl Iterator<Item = (Label, &StateSet)> + '_ {
		self.transitions
			.range((state, Label::Symbol(0))..=(state, Label::Epsilon))
			.map(|(&(_, label), to)| (label, to))
	}

	/// The unique target of `state` under `symbol`, if there is exactly one.
	pub(crate) fn successor(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
		let targets = self.targets(state, Label::Symbol(symbol));
		match targets.len() {
			1 => targets.iter().next().copied(),
			_ => None,
		}
	}

	/// Whether every stored move is a single-target symbol move, i.e. the automaton is a
	/// possibly incomplete DFA.
	pub(crate) fn is_functional(&self) -> bool {
		self.transitions
			.iter()
			.all(|(&(_, label), to)| label != Label::Epsilon && to.len() == 1)
	}

	/// States reachable from the start state over any transitions, epsilon moves included.
	pub fn reachable_states(&self) -> StateSet {
		let mut reachable = StateSet::new();
		reachable.insert(self.start);
		let mut queue = VecDeque::from([self.start]);
		while let Some(state) = queue.pop_front() {
			for (_, to) in self.outgoing(state) {
				for &next in to {
					if reachable.insert(next) {
						queue.push_back(next);
					}
				}
			}
		}
		reachable
	}

	/// Checks whether the automaton accepts a sequence of symbols.
	///
	/// A symbol outside the alphabet rejects the input; this is not an error.
	pub fn accepts<I>(&self, input: I) -> bool
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let mut symbols = Vec::new();
		for token in input {
			match self.symbol_id(token.as_ref()) {
				Some(symbol) => symbols.push(symbol),
				None => {
					trace!(symbol = token.as_ref(), "input symbol outside alphabet");
					return false;
				}
			}
		}

		if self.is_deterministic() {
			self.run_deterministic(&symbols)
		} else {
			self.run_nondeterministic(&symbols)
		}
	}

	/// Checks whether the automaton accepts a string, reading every `char` as one symbol.
	pub fn accepts_chars(&self, input: &str) -> bool {
		self.accepts(input.chars().map(String::from))
	}

	/// All transitions as named rows, ordered by source state then label.
	pub fn rows(&self) -> Vec<TransitionRow> {
		self.transitions
			.iter()
			.map(|(&(from, label), to)| TransitionRow {
				from: self.states[from].clone(),
				symbol: self.label_name(label).unwrap_or(EPSILON).to_owned(),
				to: to.iter().map(|&state| self.states[state].clone()).collect(),
			})
			.collect()
	}

	/// Construction input that rebuilds this automaton.
	pub fn definition(&self) -> Definition {
		Definition::from_rows(
			self.states().map(String::from).collect(),
			self.alphabet().map(String::from).collect(),
			self.start_state().to_owned(),
			self.accepting_states().map(String::from).collect(),
			self.rows(),
		)
	}
}

impl TryFrom<Definition> for Automaton {
	type Error = AutomatonError;

	fn try_from(definition: Definition) -> Result<Self, Self::Error> {
		let Definition {
			states,
			alphabet,
			start,
			accepting,
			transitions,
		} = definition;
		let rows = transitions.into_iter().flat_map(|(from, moves)| {
			moves
				.into_iter()
				.map(move |(symbol, to)| TransitionRow::new(from.clone(), symbol, to))
		});
		Self::new(states, alphabet, &start, accepting, rows)
	}
}

/// Synthetic state names `Q0, Q1, ...` for derived automata.
pub(crate) fn synthetic_names(count: usize) -> IndexSet<String> {
	(0..count).map(|index| format!("Q{}", index)).collect()
}

fn intern<I>(
	items: I,
	duplicate: fn(String) -> AutomatonError,
) -> Result<IndexSet<String>, AutomatonError>
where
	I: IntoIterator,
	I::Item: Into<String>,
{
	let mut set = IndexSet::new();
	for item in items {
		let item = item.into();
		if set.contains(&item) {
			return Err(duplicate(item));
		}
		set.insert(item);
	}
	Ok(set)
}

fn lookup_state(states: &IndexSet<String>, name: &str) -> Result<StateId, AutomatonError> {
	states
		.get_index_of(name)
		.ok_or_else(|| AutomatonError::InexistentState(name.to_owned()))
}

fn lookup_label(alphabet: &IndexSet<String>, name: &str) -> Result<Label, AutomatonError> {
	if name == EPSILON {
		return Ok(Label::Epsilon);
	}
	alphabet
		.get_index_of(name)
		.map(Label::Symbol)
		.ok_or_else(|| AutomatonError::InexistentSymbol(name.to_owned()))
}

/// Enum representing an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
	#[error("States cannot be empty")]
	EmptyStates,
	#[error("Alphabet cannot be empty")]
	EmptyAlphabet,
	#[error("Duplicate State ID \"{0}\"")]
	DuplicateState(String),
	#[error("Duplicate Symbol \"{0}\"")]
	DuplicateSymbol(String),
	#[error("\"epsilon\" is reserved and cannot be part of the alphabet")]
	ReservedSymbol,
	#[error("Inexistent State ID \"{0}\"")]
	InexistentState(String),
	#[error("Inexistent Symbol \"{0}\"")]
	InexistentSymbol(String),
	#[error("Internal error: {0}")]
	Internal(String),
}
