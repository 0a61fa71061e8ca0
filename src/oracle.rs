use std::collections::VecDeque;

use itertools::Itertools;

use crate::alphabet::{Alphabet, Symbol};
use crate::hypothesis::Dfa;
use crate::math;
use crate::word::Word;

/// Answers membership queries: is the given word in the target language? The implementor may be
/// a human behind a UI, a reference implementation or a test fixture, the learner does not care.
pub trait MembershipOracle<S: Symbol> {
    fn membership(&self, word: &Word<S>) -> bool;
}

/// Answers equivalence queries: either confirms the hypothesis or yields a word on which it
/// disagrees with the target language.
pub trait EquivalenceOracle<S: Symbol> {
    fn equivalence(&self, hypothesis: &Dfa<S>) -> Result<(), Word<S>>;
}

/// An oracle backed by a reference automaton. Membership queries run the word through the
/// target; equivalence queries explore the product of target and hypothesis breadth-first and
/// report the access word of the first disagreeing state pair, so counterexamples are always of
/// minimal length.
#[derive(Debug, Clone)]
pub struct DfaOracle<S: Symbol> {
    target: Dfa<S>,
}

impl<S: Symbol> DfaOracle<S> {
    pub fn new(target: Dfa<S>) -> Self {
        Self { target }
    }

    pub fn alphabet(&self) -> &Alphabet<S> {
        self.target.alphabet()
    }
}

impl<S: Symbol> MembershipOracle<S> for DfaOracle<S> {
    fn membership(&self, word: &Word<S>) -> bool {
        self.target.accepts(word)
    }
}

impl<S: Symbol> EquivalenceOracle<S> for DfaOracle<S> {
    fn equivalence(&self, hypothesis: &Dfa<S>) -> Result<(), Word<S>> {
        let mut seen = math::Set::default();
        let mut queue = VecDeque::new();

        let initial = (self.target.start(), hypothesis.start());
        seen.insert(initial);
        queue.push_back((initial, Word::epsilon()));

        while let Some(((left, right), access)) = queue.pop_front() {
            if self.target.is_accepting(left) != hypothesis.is_accepting(right) {
                return Err(access);
            }
            for a in self.target.alphabet().universe() {
                let (Some(l), Some(r)) = (
                    self.target.successor(left, a),
                    hypothesis.successor(right, a),
                ) else {
                    continue;
                };
                if seen.insert((l, r)) {
                    queue.push_back(((l, r), access.append(a.clone())));
                }
            }
        }
        Ok(())
    }
}

/// An oracle built from a membership predicate, with equivalence decided by exhaustively
/// comparing the hypothesis against the predicate on every word up to a length bound. Only
/// sensible as a test fixture or for demos, real equivalence lies with the caller.
pub struct BoundedOracle<S: Symbol, F> {
    alphabet: Alphabet<S>,
    predicate: F,
    horizon: usize,
}

impl<S: Symbol, F: Fn(&Word<S>) -> bool> BoundedOracle<S, F> {
    pub fn new(alphabet: Alphabet<S>, horizon: usize, predicate: F) -> Self {
        Self {
            alphabet,
            predicate,
            horizon,
        }
    }

    /// All words of length at most `horizon`, shortest first.
    fn words_up_to_horizon(&self) -> Vec<Word<S>> {
        let mut words = vec![Word::epsilon()];
        let mut frontier = vec![Word::epsilon()];
        for _ in 0..self.horizon {
            frontier = frontier
                .iter()
                .flat_map(|w| {
                    self.alphabet
                        .universe()
                        .map(|a| w.append(a.clone()))
                        .collect_vec()
                })
                .collect();
            words.extend(frontier.iter().cloned());
        }
        words
    }
}

impl<S: Symbol, F: Fn(&Word<S>) -> bool> MembershipOracle<S> for BoundedOracle<S, F> {
    fn membership(&self, word: &Word<S>) -> bool {
        (self.predicate)(word)
    }
}

impl<S: Symbol, F: Fn(&Word<S>) -> bool> EquivalenceOracle<S> for BoundedOracle<S, F> {
    fn equivalence(&self, hypothesis: &Dfa<S>) -> Result<(), Word<S>> {
        for word in self.words_up_to_horizon() {
            if hypothesis.accepts(&word) != (self.predicate)(&word) {
                return Err(word);
            }
        }
        Ok(())
    }
}
