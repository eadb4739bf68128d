//! Fixtures and language checks shared by the unit tests.

use crate::{Automaton, Definition};
use itertools::Itertools;

/// Words over {a, b} containing `abb`, with a non-deterministic guess of where it starts.
pub(crate) fn contains_abb() -> Automaton {
	let yaml = r"
states: [q0, q1, q2, q3]
alphabet: [a, b]
start: q0
accepting: [q3]
transitions:
  q0: {a: [q0, q1], b: [q0]}
  q1: {b: [q2]}
  q2: {b: [q3]}
  q3: {a: [q3], b: [q3]}
";
	Automaton::try_from(serde_yaml::from_str::<Definition>(yaml).unwrap()).unwrap()
}

/// All words over `alphabet` up to `max_len` symbols, shortest first.
pub(crate) fn all_words(alphabet: &[&str], max_len: usize) -> Vec<Vec<String>> {
	let mut words = vec![Vec::new()];
	for len in 1..=max_len {
		words.extend(
			(0..len)
				.map(|_| alphabet.iter().copied())
				.multi_cartesian_product()
				.map(|word| word.into_iter().map(String::from).collect()),
		);
	}
	words
}

/// Compares acceptance of every word up to `max_len` symbols over the alphabet of `left`.
pub(crate) fn assert_same_language(left: &Automaton, right: &Automaton, max_len: usize) {
	let alphabet = left.alphabet().collect::<Vec<_>>();
	for word in all_words(&alphabet, max_len) {
		assert_eq!(
			left.accepts(&word),
			right.accepts(&word),
			"Languages differ on {:?}",
			word
		);
	}
}
