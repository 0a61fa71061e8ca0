use std::time::Instant;

use itertools::Itertools;
use tracing::{debug, info, trace};

use crate::alphabet::{Alphabet, Symbol};
use crate::check::{check_closed, check_consistent, Closedness, Consistency};
use crate::error::LearnError;
use crate::hypothesis::{build, Dfa};
use crate::oracle::{EquivalenceOracle, MembershipOracle};
use crate::table::ObservationTable;
use crate::word::Word;

const ITERATION_THRESHOLD: usize = if cfg!(debug_assertions) { 300 } else { 200000 };

/// Where the refinement currently stands. The states are defined by conditions on the table:
/// `AwaitingAnswers` holds while at least one boundary entry is unanswered, `CheckingTable` once
/// all entries are known, and `ReadyForHypothesis` after a step found the table closed and
/// consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    AwaitingAnswers,
    CheckingTable,
    ReadyForHypothesis,
}

/// What a single refinement step did to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome<S: Symbol> {
    /// The table was not closed; all prefixes of the witness were merged into `I`.
    ExtendedPrefixes { witness: Word<S> },
    /// The table was not consistent; all suffixes of the distinguishing word were merged into `E`.
    ExtendedSuffixes { distinguisher: Word<S> },
    /// The table is closed and consistent, a hypothesis can be built.
    Ready,
}

/// The state machine orchestrating queries, checks and table growth. It owns the single
/// [`ObservationTable`] of the session and is the only place that mutates it.
pub struct RefinementDriver<S: Symbol> {
    table: ObservationTable<S>,
    state: DriverState,
}

impl<S: Symbol> RefinementDriver<S> {
    pub fn new(alphabet: Alphabet<S>) -> Self {
        let table = ObservationTable::new(alphabet);
        let mut driver = Self {
            table,
            state: DriverState::AwaitingAnswers,
        };
        driver.refresh_state();
        driver
    }

    pub fn table(&self) -> &ObservationTable<S> {
        &self.table
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    fn refresh_state(&mut self) {
        self.state = if self.table.has_missing() {
            DriverState::AwaitingAnswers
        } else {
            DriverState::CheckingTable
        };
    }

    /// Records one membership answer. Any answer invalidates a previously reached
    /// `ReadyForHypothesis`, the state is recomputed from the table afterwards.
    pub fn record_answer(&mut self, word: Word<S>, accepted: bool) -> Result<(), LearnError<S>> {
        self.table.record_answer(word, accepted)?;
        self.refresh_state();
        Ok(())
    }

    /// Runs one refinement step: bail out while answers are pending, otherwise grow `I` on a
    /// closedness defect, grow `E` on a consistency defect, or report readiness.
    pub fn apply_step(&mut self) -> Result<StepOutcome<S>, LearnError<S>> {
        let pending = self.table.missing_entries().count();
        if pending > 0 {
            return Err(LearnError::PendingQueries { pending });
        }
        self.state = DriverState::CheckingTable;

        if let Closedness::NotClosed { witness } = check_closed(&self.table)? {
            debug!("table not closed, merging prefixes of {} into I", witness);
            self.table.add_prefixes(witness.prefixes());
            self.refresh_state();
            return Ok(StepOutcome::ExtendedPrefixes { witness });
        }

        if let Consistency::Inconsistent {
            rows,
            symbol,
            suffix,
        } = check_consistent(&self.table)?
        {
            let distinguisher = Word::letter(symbol).concat(&suffix);
            debug!(
                "rows {} and {} are inconsistent, merging suffixes of {} into E",
                rows.0, rows.1, distinguisher
            );
            self.table.add_suffixes(distinguisher.suffixes());
            self.refresh_state();
            return Ok(StepOutcome::ExtendedSuffixes { distinguisher });
        }

        self.state = DriverState::ReadyForHypothesis;
        Ok(StepOutcome::Ready)
    }

    /// Incorporates a counterexample to the current hypothesis by merging all its prefixes into
    /// `I`. The empty word is rejected, it cannot distinguish anything.
    pub fn process_counterexample(
        &mut self,
        counterexample: &Word<S>,
    ) -> Result<(), LearnError<S>> {
        if counterexample.is_empty() {
            return Err(LearnError::EmptyCounterexample);
        }
        trace!("incorporating counterexample {}", counterexample);
        self.table.add_prefixes(counterexample.prefixes());
        self.refresh_state();
        Ok(())
    }

    /// Derives the hypothesis DFA. Only valid in `ReadyForHypothesis`.
    pub fn hypothesis(&self) -> Result<Dfa<S>, LearnError<S>> {
        if self.state != DriverState::ReadyForHypothesis {
            return Err(LearnError::TableNotReady);
        }
        build(&self.table)
    }

    /// Discards the session, restoring the initial table.
    pub fn reset(&mut self) {
        self.table.reset();
        self.refresh_state();
    }

    /// Replaces the alphabet, which discards the session (recorded answers would otherwise refer
    /// to boundary rows of the old alphabet).
    pub fn set_alphabet(&mut self, alphabet: Alphabet<S>) {
        self.table.set_alphabet(alphabet);
        self.refresh_state();
    }
}

/// Drives the refinement loop to completion against a pair of oracles: answer every pending
/// membership query, step until the table is closed and consistent, pose the hypothesis to the
/// equivalence oracle and incorporate its counterexample, until the hypothesis is confirmed.
pub fn learn<S, M, Q>(
    alphabet: Alphabet<S>,
    membership: &M,
    equivalence: &Q,
) -> Result<Dfa<S>, LearnError<S>>
where
    S: Symbol,
    M: MembershipOracle<S> + ?Sized,
    Q: EquivalenceOracle<S> + ?Sized,
{
    let start = Instant::now();
    let mut driver = RefinementDriver::new(alphabet);

    for iteration in 0..ITERATION_THRESHOLD {
        let queries = driver
            .table()
            .missing_entries()
            .map(|(row, col)| row.concat(&col))
            .unique()
            .collect_vec();
        for query in queries {
            let accepted = membership.membership(&query);
            driver.record_answer(query, accepted)?;
        }

        match driver.apply_step()? {
            StepOutcome::Ready => {
                let hypothesis = driver.hypothesis()?;
                trace!("posing equivalence query for a hypothesis with {} states", hypothesis.size());
                match equivalence.equivalence(&hypothesis) {
                    Ok(()) => {
                        info!(
                            "learning finished after {} iterations in {}ms",
                            iteration + 1,
                            start.elapsed().as_millis()
                        );
                        return Ok(hypothesis);
                    }
                    Err(counterexample) => driver.process_counterexample(&counterexample)?,
                }
            }
            outcome => trace!("refinement step returned {:?}", outcome),
        }
    }

    panic!("iteration threshold exceeded, the oracles do not converge")
}

#[cfg(test)]
mod tests {
    use super::{DriverState, RefinementDriver, StepOutcome};
    use crate::alphabet::Alphabet;
    use crate::word::Word;
    use crate::LearnError;

    fn answer(driver: &mut RefinementDriver<char>, entries: &[(&str, bool)]) {
        for (word, bit) in entries {
            let word = if word.is_empty() {
                Word::epsilon()
            } else {
                Word::from(*word)
            };
            driver.record_answer(word, *bit).unwrap();
        }
    }

    #[test]
    fn stepping_with_pending_queries_fails() {
        let mut driver = RefinementDriver::new(Alphabet::from("ab"));
        assert_eq!(driver.state(), DriverState::AwaitingAnswers);
        assert_eq!(
            driver.apply_step(),
            Err(LearnError::PendingQueries { pending: 3 })
        );
        // no state change
        assert_eq!(driver.state(), DriverState::AwaitingAnswers);
    }

    #[test_log::test]
    fn refinement_reaches_a_hypothesis_for_words_ending_in_a() {
        let mut driver = RefinementDriver::new(Alphabet::from("ab"));
        answer(&mut driver, &[("", false), ("a", true), ("b", false)]);
        assert_eq!(driver.state(), DriverState::CheckingTable);

        assert_eq!(
            driver.apply_step(),
            Ok(StepOutcome::ExtendedPrefixes {
                witness: Word::from("a")
            })
        );
        assert_eq!(driver.table().base(), [Word::epsilon(), Word::from("a")]);
        assert_eq!(driver.state(), DriverState::AwaitingAnswers);

        answer(&mut driver, &[("aa", true), ("ab", false)]);
        assert_eq!(driver.apply_step(), Ok(StepOutcome::Ready));
        assert_eq!(driver.state(), DriverState::ReadyForHypothesis);

        let dfa = driver.hypothesis().unwrap();
        assert_eq!(dfa.size(), 2);
        assert!(!dfa.is_accepting(dfa.start()));
        for (word, expected) in [("a", true), ("b", false), ("aa", true), ("ab", false)] {
            assert_eq!(dfa.accepts(&Word::from(word)), expected, "on {word}");
        }
    }

    #[test]
    fn inconsistency_extends_the_suffix_set() {
        // learning "aa" over Σ = {a}: after the counterexample round the prefixes ε and a
        // carry equal rows but diverge one symbol later, so E must grow.
        let mut driver = RefinementDriver::new(Alphabet::from("a"));
        answer(&mut driver, &[("", false), ("a", false)]);
        assert_eq!(driver.apply_step(), Ok(StepOutcome::Ready));

        driver.process_counterexample(&Word::from("aa")).unwrap();
        answer(&mut driver, &[("aa", true), ("aaa", false)]);
        assert_eq!(
            driver.apply_step(),
            Ok(StepOutcome::ExtendedSuffixes {
                distinguisher: Word::from("a")
            })
        );
        assert_eq!(
            driver.table().experiments(),
            [Word::epsilon(), Word::from("a")]
        );
        assert_eq!(driver.state(), DriverState::AwaitingAnswers);
    }

    #[test]
    fn counterexample_round_preserves_recorded_answers() {
        let mut driver = RefinementDriver::new(Alphabet::from("ab"));
        answer(&mut driver, &[("", false), ("a", true), ("b", false)]);
        driver.apply_step().unwrap();
        answer(&mut driver, &[("aa", true), ("ab", false)]);
        assert_eq!(driver.apply_step(), Ok(StepOutcome::Ready));

        driver.process_counterexample(&Word::from("ba")).unwrap();
        assert_eq!(
            driver.table().base(),
            [
                Word::epsilon(),
                Word::from("a"),
                Word::from("b"),
                Word::from("ba")
            ]
        );
        assert_eq!(driver.state(), DriverState::AwaitingAnswers);

        answer(
            &mut driver,
            &[("ba", true), ("bb", false), ("baa", true), ("bab", false)],
        );
        assert_eq!(driver.apply_step(), Ok(StepOutcome::Ready));

        // earlier entries were not altered by the new round
        for (word, expected) in [("", false), ("a", true), ("aa", true), ("ab", false)] {
            let word = if word.is_empty() {
                Word::epsilon()
            } else {
                Word::from(word)
            };
            assert_eq!(driver.table().lookup(&word), Some(expected));
        }
        assert_eq!(driver.hypothesis().unwrap().size(), 2);
    }

    #[test]
    fn empty_counterexamples_are_rejected() {
        let mut driver = RefinementDriver::new(Alphabet::from("ab"));
        assert_eq!(
            driver.process_counterexample(&Word::epsilon()),
            Err(LearnError::EmptyCounterexample)
        );
    }

    #[test]
    fn hypothesis_requires_readiness() {
        let driver = RefinementDriver::new(Alphabet::from("ab"));
        assert_eq!(driver.hypothesis(), Err(LearnError::TableNotReady));
    }

    #[test]
    fn changing_the_alphabet_discards_the_session() {
        let mut driver = RefinementDriver::new(Alphabet::from("ab"));
        answer(&mut driver, &[("", false), ("a", true), ("b", false)]);
        driver.apply_step().unwrap();

        driver.set_alphabet(Alphabet::from("abc"));
        assert_eq!(driver.table().base(), [Word::epsilon()]);
        assert_eq!(driver.table().lookup(&Word::from("a")), None);
        assert_eq!(driver.state(), DriverState::AwaitingAnswers);
    }
}
