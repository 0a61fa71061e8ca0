use std::fmt;

use itertools::Itertools;

use crate::alphabet::Symbol;

/// A finite word over some alphabet. The empty word ε is represented by the empty sequence, so
/// it can never collide with a literal symbol of the alphabet.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word<S: Symbol>(Vec<S>);

impl<S: Symbol> Word<S> {
    /// The empty word ε.
    pub fn epsilon() -> Self {
        Self(Vec::new())
    }

    /// The word consisting of a single symbol.
    pub fn letter(symbol: S) -> Self {
        Self(vec![symbol])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the symbols of the word in order.
    pub fn symbols(&self) -> impl Iterator<Item = &S> + '_ {
        self.0.iter()
    }

    /// Concatenates two words. ε is the identity element, `concat(ε, w)` and `concat(w, ε)`
    /// both give back `w` unchanged.
    pub fn concat(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        Self(self.0.iter().chain(other.0.iter()).cloned().collect())
    }

    /// Extends the word by a single symbol on the right.
    pub fn append(&self, symbol: S) -> Self {
        self.concat(&Self::letter(symbol))
    }

    /// All non-empty prefixes, from length 1 up to and including the full word.
    pub fn prefixes(&self) -> Vec<Self> {
        (1..=self.len()).map(|i| Self(self.0[..i].to_vec())).collect()
    }

    /// All suffixes, from the full word down to and including ε.
    pub fn suffixes(&self) -> Vec<Self> {
        (0..=self.len()).map(|i| Self(self.0[i..].to_vec())).collect()
    }
}

impl<S: Symbol> fmt::Display for Word<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "ε")
        } else {
            write!(f, "{}", self.0.iter().join(""))
        }
    }
}

impl<S: Symbol> fmt::Debug for Word<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl<S: Symbol> FromIterator<S> for Word<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&str> for Word<char> {
    fn from(value: &str) -> Self {
        value.chars().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Word;

    #[test]
    fn epsilon_is_the_concatenation_identity() {
        let epsilon = Word::epsilon();
        let word = Word::from("aba");
        assert_eq!(epsilon.concat(&word), word);
        assert_eq!(word.concat(&epsilon), word);
        assert_eq!(epsilon.concat(&epsilon), epsilon);
    }

    #[test]
    fn concatenation_adds_lengths() {
        let u = Word::from("ab");
        let v = Word::from("bba");
        assert_eq!(u.concat(&v).len(), u.len() + v.len());
        assert_eq!(u.concat(&v), Word::from("abbba"));
    }

    #[test]
    fn prefixes_are_nonempty_and_ascending() {
        let word = Word::from("abc");
        assert_eq!(
            word.prefixes(),
            vec![Word::from("a"), Word::from("ab"), Word::from("abc")]
        );
        assert!(Word::<char>::epsilon().prefixes().is_empty());
    }

    #[test]
    fn suffixes_run_down_to_epsilon() {
        let word = Word::from("abc");
        assert_eq!(
            word.suffixes(),
            vec![
                Word::from("abc"),
                Word::from("bc"),
                Word::from("c"),
                Word::epsilon()
            ]
        );
        assert_eq!(Word::<char>::epsilon().suffixes(), vec![Word::epsilon()]);
    }

    #[test]
    fn display_writes_epsilon_for_the_empty_word() {
        assert_eq!(Word::<char>::epsilon().to_string(), "ε");
        assert_eq!(Word::from("ab").to_string(), "ab");
    }
}
