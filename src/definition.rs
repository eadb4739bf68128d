use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single row of a transition table: every target of `from` under `symbol`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionRow {
	pub from: String,
	pub symbol: String,
	pub to: Vec<String>,
}

impl TransitionRow {
	pub fn new<F, S, T>(from: F, symbol: S, to: T) -> Self
	where
		F: Into<String>,
		S: Into<String>,
		T: IntoIterator,
		T::Item: Into<String>,
	{
		Self {
			from: from.into(),
			symbol: symbol.into(),
			to: to.into_iter().map(Into::into).collect(),
		}
	}

	/// Whether the row names a source, a symbol and at least one target.
	pub fn is_complete(&self) -> bool {
		!self.from.is_empty() && !self.symbol.is_empty() && !self.to.is_empty()
	}
}

/// Serializable construction input of an [`Automaton`](crate::Automaton).
///
/// Transitions map a source state to a map from symbol (or `epsilon`) to target states.
/// The definition is not validated until it is converted into an automaton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Definition {
	pub states: Vec<String>,
	pub alphabet: Vec<String>,
	pub start: String,
	pub accepting: Vec<String>,
	pub transitions: IndexMap<String, IndexMap<String, Vec<String>>>,
}

impl Definition {
	/// Creates a definition from a table of transition rows.
	///
	/// Incomplete rows are skipped. Rows sharing a source and symbol are merged, keeping
	/// the first occurrence of every target.
	pub fn from_rows<R>(
		states: Vec<String>,
		alphabet: Vec<String>,
		start: String,
		accepting: Vec<String>,
		rows: R,
	) -> Self
	where
		R: IntoIterator<Item = TransitionRow>,
	{
		let mut transitions = IndexMap::<String, IndexMap<String, Vec<String>>>::new();
		for row in rows.into_iter().filter(TransitionRow::is_complete) {
			let targets = transitions
				.entry(row.from)
				.or_default()
				.entry(row.symbol)
				.or_default();
			for target in row.to {
				if !targets.contains(&target) {
					targets.push(target);
				}
			}
		}
		Self {
			states,
			alphabet,
			start,
			accepting,
			transitions,
		}
	}

	/// The transitions as rows, in insertion order.
	pub fn rows(&self) -> impl Iterator<Item = TransitionRow> + '_ {
		self.transitions.iter().flat_map(|(from, moves)| {
			moves
				.iter()
				.map(move |(symbol, to)| TransitionRow::new(from.as_str(), symbol.as_str(), to))
		})
	}
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_list(text: &str) -> Vec<String> {
	text.split(',')
		.map(str::trim)
		.filter(|item| !item.is_empty())
		.map(String::from)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Automaton;

	#[test]
	fn parse() {
		assert_eq!(vec!["q0", "q1", "q2"], parse_list(" q0, q1 ,q2"));
		assert_eq!(vec!["a"], parse_list("a,, ,"));
		assert!(parse_list("  ").is_empty(), "Blank list not empty");
	}

	#[test]
	fn from_rows() {
		let definition = Definition::from_rows(
			parse_list("q0, q1"),
			parse_list("a"),
			"q0".into(),
			parse_list("q1"),
			vec![
				TransitionRow::new("q0", "a", ["q1"]),
				TransitionRow::new("", "a", ["q1"]),
				TransitionRow::new("q1", "", ["q0"]),
				TransitionRow::new("q1", "a", Vec::<String>::new()),
				TransitionRow::new("q0", "a", ["q0", "q1"]),
			],
		);

		assert_eq!(
			vec![TransitionRow::new("q0", "a", ["q1", "q0"])],
			definition.rows().collect::<Vec<_>>(),
			"Incomplete rows not skipped or duplicate rows not merged"
		);
	}

	#[test]
	fn deserialize() {
		let yaml = r"{states: [p, q], alphabet: [x], start: p, accepting: [q], transitions: {p: {x: [q], epsilon: [q]}, q: {x: [q]}}}";
		let definition: Definition = serde_yaml::from_str(yaml).unwrap();
		assert_eq!(2, definition.rows().filter(|row| row.from == "p").count());

		let automaton = Automaton::try_from(definition).unwrap();
		assert!(
			automaton.accepts_chars("xx"),
			"Incorrect result after run"
		);
		assert!(automaton.accepts_chars(""), "Epsilon move not taken");
	}

	#[test]
	fn deserialize_rejects_unknown_fields() {
		let yaml = r"{states: [p], alphabet: [x], start: p, final: [p]}";
		assert!(serde_yaml::from_str::<Definition>(yaml).is_err());
	}

	#[test]
	fn serialize_round_trip() {
		let definition = Definition::from_rows(
			parse_list("p, q"),
			parse_list("x, y"),
			"p".into(),
			parse_list("q"),
			vec![TransitionRow::new("p", "y", ["q"])],
		);
		let yaml = serde_yaml::to_string(&definition).unwrap();

		assert_eq!(definition, serde_yaml::from_str::<Definition>(&yaml).unwrap());
	}
}
