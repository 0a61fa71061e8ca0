use thiserror::Error;

use crate::alphabet::Symbol;
use crate::word::Word;

/// Everything that can go wrong while refining the table or deriving a hypothesis. All of these
/// are returned as values to the caller of the respective operation, none of them crosses more
/// than one layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LearnError<S: Symbol> {
    /// The table still has unanswered boundary entries, more membership answers are needed
    /// before the next refinement step. Recoverable.
    #[error("{pending} boundary entries still await a membership answer")]
    PendingQueries { pending: usize },
    /// The membership oracle contradicted an answer it gave earlier. Fatal to the session, the
    /// only way out is a full reset.
    #[error("membership oracle contradicted itself on {word}: recorded {stored}, now given {submitted}")]
    DuplicateAnswerConflict {
        word: Word<S>,
        stored: bool,
        submitted: bool,
    },
    /// A row signature was requested while an entry of that row is still unanswered. This is a
    /// contract violation, it cannot occur when going through [`crate::driver::RefinementDriver`].
    #[error("row {row} has no recorded answer for suffix {suffix}")]
    IncompleteRow { row: Word<S>, suffix: Word<S> },
    /// A hypothesis was requested from a table that is not closed and consistent.
    #[error("observation table is not closed and consistent, no hypothesis can be built")]
    TableNotReady,
    /// The equivalence oracle returned the empty word, which cannot distinguish anything.
    /// Recoverable, the current hypothesis stays valid.
    #[error("the empty word cannot serve as a counterexample")]
    EmptyCounterexample,
}
