use std::fmt::{Debug, Display};
use std::hash::Hash;

use itertools::Itertools;

/// A symbol of an alphabet, which is also the type of the symbols in a word. Anything that can
/// be cloned, compared, hashed and printed qualifies, so `char` works for the classic textbook
/// setting while `String` admits multi-character symbols.
pub trait Symbol: Clone + PartialEq + Eq + PartialOrd + Ord + Hash + Debug + Display {}
impl<S: Clone + PartialEq + Eq + PartialOrd + Ord + Hash + Debug + Display> Symbol for S {}

/// An ordered collection of distinct symbols. The order in which symbols were first given is the
/// order in which [`Alphabet::universe`] yields them, which in turn fixes the iteration order of
/// the closedness and consistency checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet<S: Symbol>(Vec<S>);

impl<S: Symbol> Alphabet<S> {
    /// Creates an alphabet from the given symbols, dropping later duplicates.
    pub fn new<I: IntoIterator<Item = S>>(symbols: I) -> Self {
        Self(symbols.into_iter().unique().collect())
    }

    /// Returns an iterator over all symbols of the alphabet, in their fixed order.
    pub fn universe(&self) -> impl Iterator<Item = &S> + '_ {
        self.0.iter()
    }

    /// Returns true if the given symbol is present in the alphabet.
    pub fn contains(&self, symbol: &S) -> bool {
        self.0.contains(symbol)
    }

    /// Returns the number of symbols in the alphabet.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Alphabet<String> {
    /// Parses a comma-separated list of symbols, trimming surrounding whitespace and skipping
    /// empty fragments. `"a, b, ab"` yields the three symbols `a`, `b` and `ab`.
    pub fn parse(input: &str) -> Self {
        Self::new(
            input
                .split(',')
                .map(|chunk| chunk.trim().to_string())
                .filter(|sym| !sym.is_empty()),
        )
    }
}

impl From<&str> for Alphabet<char> {
    fn from(value: &str) -> Self {
        Self::new(value.chars())
    }
}

impl<S: Symbol> FromIterator<S> for Alphabet<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
