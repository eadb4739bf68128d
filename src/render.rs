use crate::automaton::Automaton;
use itertools::Itertools;
use std::fmt;
use tabled::{builder::Builder, settings::Style};

impl Automaton {
	/// Transition table with `From`, `Symbol` and `To` columns.
	pub fn transition_table(&self) -> String {
		let mut builder = Builder::default();
		builder.push_record(["From", "Symbol", "To"].map(String::from));
		for row in self.rows() {
			builder.push_record([row.from, row.symbol, row.to.join(", ")]);
		}
		builder.build().with(Style::ascii()).to_string()
	}
}

/// Lists the states (start marked with `->`, accepting with `(F)`), the alphabet and the
/// transition table.
impl fmt::Display for Automaton {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let states = self
			.states()
			.enumerate()
			.map(|(state, name)| {
				let start = if state == self.start() { "->" } else { "" };
				let accepting = if self.is_accepting(state) { " (F)" } else { "" };
				format!("{}{}{}", start, name, accepting)
			})
			.join(", ");
		writeln!(f, "States: {}", states)?;
		writeln!(f, "Alphabet: {}", self.alphabet().join(", "))?;
		write!(f, "{}", self.transition_table())
	}
}

#[cfg(test)]
mod tests {
	use crate::{Automaton, TransitionRow, EPSILON};

	fn automaton() -> Automaton {
		Automaton::new(
			["p", "q"],
			["a", "b"],
			"p",
			["q"],
			vec![
				TransitionRow::new("q", "b", ["q"]),
				TransitionRow::new("p", EPSILON, ["q"]),
				TransitionRow::new("p", "a", ["q", "p"]),
			],
		)
		.unwrap()
	}

	#[test]
	fn rows() {
		let rows = automaton().rows();

		assert_eq!(
			vec![
				TransitionRow::new("p", "a", ["p", "q"]),
				TransitionRow::new("p", EPSILON, ["q"]),
				TransitionRow::new("q", "b", ["q"]),
			],
			rows,
			"Rows not ordered by state, then symbol, epsilon last"
		);
	}

	#[test]
	fn display() {
		let shown = automaton().to_string();
		let mut lines = shown.lines();

		assert_eq!(Some("States: ->p, q (F)"), lines.next());
		assert_eq!(Some("Alphabet: a, b"), lines.next());
		assert!(shown.contains("| From | Symbol  | To   |"), "Header missing:\n{}", shown);
		assert!(shown.contains("| p    | epsilon | q    |"), "Epsilon row missing:\n{}", shown);
		assert!(shown.contains("| p    | a       | p, q |"));
	}
}
