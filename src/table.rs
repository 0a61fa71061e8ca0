use std::fmt;

use itertools::Itertools;
use owo_colors::OwoColorize;

use crate::alphabet::{Alphabet, Symbol};
use crate::error::LearnError;
use crate::math;
use crate::word::Word;

/// The ordered tuple of membership answers for one row against every suffix in `E`. Two rows are
/// equal exactly if all their entries coincide; no derived numeric or string encoding is ever
/// used as a comparison key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowSignature(Vec<bool>);

impl RowSignature {
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RowSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.0 {
            write!(f, "{}", u8::from(*bit))?;
        }
        Ok(())
    }
}

impl fmt::Debug for RowSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// The observation table `(I, E, T)`. `I` is the ordered set of access prefixes (always holding
/// ε), `E` the ordered set of distinguishing suffixes (always holding ε) and `T` the partial map
/// of membership answers, populated exclusively through [`ObservationTable::record_answer`].
///
/// Both `I` and `E` only ever grow by appending, so their insertion order doubles as the
/// deterministic iteration order of all checks. The only contraction is a full
/// [`ObservationTable::reset`].
#[derive(Clone)]
pub struct ObservationTable<S: Symbol> {
    alphabet: Alphabet<S>,
    base: Vec<Word<S>>,
    experiments: Vec<Word<S>>,
    answers: math::Map<Word<S>, bool>,
}

impl<S: Symbol> ObservationTable<S> {
    /// Creates a fresh table with `I = E = {ε}` and no recorded answers.
    pub fn new(alphabet: Alphabet<S>) -> Self {
        Self {
            alphabet,
            base: vec![Word::epsilon()],
            experiments: vec![Word::epsilon()],
            answers: math::Map::default(),
        }
    }

    /// Restores the initial state, discarding all prefixes, suffixes and answers.
    pub fn reset(&mut self) {
        self.base = vec![Word::epsilon()];
        self.experiments = vec![Word::epsilon()];
        self.answers.clear();
    }

    /// Replaces the alphabet. Recorded answers refer to boundary rows of the old alphabet, so
    /// this forces a full [`ObservationTable::reset`].
    pub fn set_alphabet(&mut self, alphabet: Alphabet<S>) {
        self.alphabet = alphabet;
        self.reset();
    }

    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// The prefix set `I`, in insertion order.
    pub fn base(&self) -> &[Word<S>] {
        &self.base
    }

    /// The suffix set `E`, in insertion order.
    pub fn experiments(&self) -> &[Word<S>] {
        &self.experiments
    }

    /// Merges the given words into `I`, appending only those not already present. Returns the
    /// number of words that were actually appended; merging the current `I` is a no-op.
    pub fn add_prefixes<I: IntoIterator<Item = Word<S>>>(&mut self, words: I) -> usize {
        let mut added = 0;
        for word in words {
            if !self.base.contains(&word) {
                self.base.push(word);
                added += 1;
            }
        }
        added
    }

    /// Merges the given words into `E`, same contract as [`ObservationTable::add_prefixes`].
    pub fn add_suffixes<I: IntoIterator<Item = Word<S>>>(&mut self, words: I) -> usize {
        let mut added = 0;
        for word in words {
            if !self.experiments.contains(&word) {
                self.experiments.push(word);
                added += 1;
            }
        }
        added
    }

    /// Records a membership answer for the given word. Membership is a stable function of the
    /// word, so re-recording the same bit is a no-op while a differing bit is a conflict.
    pub fn record_answer(&mut self, word: Word<S>, accepted: bool) -> Result<(), LearnError<S>> {
        match self.answers.get(&word) {
            Some(&stored) if stored != accepted => Err(LearnError::DuplicateAnswerConflict {
                word,
                stored,
                submitted: accepted,
            }),
            Some(_) => Ok(()),
            None => {
                self.answers.insert(word, accepted);
                Ok(())
            }
        }
    }

    /// Looks up the recorded membership answer for a word, if any.
    pub fn lookup(&self, word: &Word<S>) -> Option<bool> {
        self.answers.get(word).copied()
    }

    /// `I` followed by every one-letter extension of an `I`-element, deduplicated with the
    /// earlier occurrence winning. The order is `I`'s insertion order, then per `I`-element the
    /// alphabet's fixed order.
    pub fn boundary_rows(&self) -> Vec<Word<S>> {
        self.base
            .iter()
            .cloned()
            .chain(self.base.iter().flat_map(|s| {
                self.alphabet.universe().map(move |a| s.append(a.clone()))
            }))
            .unique()
            .collect()
    }

    /// The `(row, column)` pairs over `boundary_rows() × E` for which no answer has been
    /// recorded yet. Lazily recomputed from the current state on every call.
    pub fn missing_entries(&self) -> impl Iterator<Item = (Word<S>, Word<S>)> + '_ {
        self.boundary_rows().into_iter().flat_map(move |row| {
            self.experiments
                .iter()
                .filter_map(|col| {
                    if self.lookup(&row.concat(col)).is_none() {
                        Some((row.clone(), col.clone()))
                    } else {
                        None
                    }
                })
                .collect_vec()
        })
    }

    /// Returns true while at least one boundary entry is unanswered.
    pub fn has_missing(&self) -> bool {
        self.missing_entries().next().is_some()
    }

    /// The row signature of the given word. Only defined once every entry of the row has been
    /// answered, otherwise the first missing suffix is reported.
    pub fn row(&self, word: &Word<S>) -> Result<RowSignature, LearnError<S>> {
        let mut bits = Vec::with_capacity(self.experiments.len());
        for suffix in &self.experiments {
            match self.lookup(&word.concat(suffix)) {
                Some(bit) => bits.push(bit),
                None => {
                    return Err(LearnError::IncompleteRow {
                        row: word.clone(),
                        suffix: suffix.clone(),
                    })
                }
            }
        }
        Ok(RowSignature(bits))
    }
}

impl<S: Symbol> fmt::Debug for ObservationTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        let mut header = vec!["T".to_string()];
        for suffix in &self.experiments {
            header.push(suffix.to_string());
        }
        builder.push_record(header);

        for row in self.boundary_rows() {
            let mut record = vec![row.to_string()];
            for suffix in &self.experiments {
                record.push(match self.lookup(&row.concat(suffix)) {
                    Some(true) => "1".to_string(),
                    Some(false) => "0".to_string(),
                    None => "?".yellow().to_string(),
                });
            }
            builder.push_record(record);
        }

        write!(f, "{}", builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::ObservationTable;
    use crate::alphabet::Alphabet;
    use crate::word::Word;
    use crate::LearnError;

    fn table() -> ObservationTable<char> {
        ObservationTable::new(Alphabet::from("ab"))
    }

    #[test]
    fn fresh_table_has_epsilon_everywhere() {
        let table = table();
        assert_eq!(table.base(), [Word::epsilon()]);
        assert_eq!(table.experiments(), [Word::epsilon()]);
        assert_eq!(
            table.boundary_rows(),
            vec![Word::epsilon(), Word::from("a"), Word::from("b")]
        );
        assert_eq!(table.missing_entries().count(), 3);
    }

    #[test]
    fn merging_the_current_sets_changes_nothing() {
        let mut table = table();
        table.add_prefixes([Word::from("a")]);
        let base_before = table.base().to_vec();
        let experiments_before = table.experiments().to_vec();

        assert_eq!(table.add_prefixes(base_before.clone()), 0);
        assert_eq!(table.add_suffixes(experiments_before.clone()), 0);
        assert_eq!(table.base(), base_before);
        assert_eq!(table.experiments(), experiments_before);
    }

    #[test]
    fn boundary_rows_prefer_base_occurrences() {
        let mut table = table();
        table.add_prefixes([Word::from("a")]);
        // ε·a collides with the base entry "a", which keeps its earlier position
        assert_eq!(
            table.boundary_rows(),
            vec![
                Word::epsilon(),
                Word::from("a"),
                Word::from("b"),
                Word::from("aa"),
                Word::from("ab")
            ]
        );
    }

    #[test]
    fn conflicting_answers_are_rejected() {
        let mut table = table();
        assert!(table.record_answer(Word::from("a"), true).is_ok());
        // same bit is a no-op
        assert!(table.record_answer(Word::from("a"), true).is_ok());
        assert_eq!(
            table.record_answer(Word::from("a"), false),
            Err(LearnError::DuplicateAnswerConflict {
                word: Word::from("a"),
                stored: true,
                submitted: false,
            })
        );
        assert_eq!(table.lookup(&Word::from("a")), Some(true));
    }

    #[test]
    fn missing_entries_is_restartable() {
        let mut table = table();
        table.record_answer(Word::from("a"), true).unwrap();
        let first: Vec<_> = table.missing_entries().collect();
        let second: Vec<_> = table.missing_entries().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn incomplete_rows_report_the_missing_suffix() {
        let mut table = table();
        table.add_suffixes([Word::from("a")]);
        table.record_answer(Word::epsilon(), false).unwrap();
        assert_eq!(
            table.row(&Word::epsilon()),
            Err(LearnError::IncompleteRow {
                row: Word::epsilon(),
                suffix: Word::from("a"),
            })
        );
    }

    #[test]
    fn row_signatures_use_suffix_order() {
        let mut table = table();
        table.add_suffixes([Word::from("a")]);
        table.record_answer(Word::epsilon(), false).unwrap();
        table.record_answer(Word::from("a"), true).unwrap();
        let row = table.row(&Word::epsilon()).unwrap();
        assert_eq!(row.bits(), [false, true]);
        assert_eq!(row.to_string(), "01");
    }

    #[test]
    fn changing_the_alphabet_resets_everything() {
        let mut table = table();
        table.add_prefixes([Word::from("a")]);
        table.record_answer(Word::from("a"), true).unwrap();

        table.set_alphabet(Alphabet::from("abc"));
        assert_eq!(table.base(), [Word::epsilon()]);
        assert_eq!(table.experiments(), [Word::epsilon()]);
        assert_eq!(table.lookup(&Word::from("a")), None);
        assert_eq!(table.boundary_rows().len(), 4);
    }
}
