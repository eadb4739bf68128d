mod automaton;
mod definition;
mod dfa;
mod nfa;
mod render;
#[cfg(test)]
mod testing;

pub use automaton::{Automaton, AutomatonError, Label, StateId, StateSet, SymbolId, EPSILON};
pub use definition::{parse_list, Definition, TransitionRow};
pub use nfa::Conversion;
