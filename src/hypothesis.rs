use std::time::Instant;

use tracing::debug;

use crate::alphabet::{Alphabet, Symbol};
use crate::check::{check_closed, check_consistent, Closedness, Consistency};
use crate::error::LearnError;
use crate::math;
use crate::table::{ObservationTable, RowSignature};
use crate::word::Word;

/// Index of a hypothesis state. States are numbered in the order in which their signature first
/// appears in `I`, so the start state of a freshly built hypothesis is always `0`.
pub type StateId = usize;

/// A transition bundle of the hypothesis. Each `(from, to)` pair occurs at most once, carrying
/// every alphabet symbol that realizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<S: Symbol> {
    pub from: StateId,
    pub to: StateId,
    pub symbols: Vec<S>,
}

/// A deterministic finite automaton derived from a closed-and-consistent observation table. This
/// is a pure snapshot: it holds no reference back into the table and is recomputed on demand.
///
/// The struct is also the hand-off format for external consumers (equivalence oracles,
/// renderers), which only need the accessors below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa<S: Symbol> {
    alphabet: Alphabet<S>,
    states: Vec<RowSignature>,
    start: StateId,
    accepting: Vec<StateId>,
    edges: Vec<Edge<S>>,
}

impl<S: Symbol> Dfa<S> {
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// The distinct row signatures observed over `I`, indexable by [`StateId`].
    pub fn states(&self) -> &[RowSignature] {
        &self.states
    }

    pub fn size(&self) -> usize {
        self.states.len()
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accepting(&self) -> &[StateId] {
        &self.accepting
    }

    pub fn edges(&self) -> &[Edge<S>] {
        &self.edges
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    /// The state reached from `state` on `symbol`, if the symbol belongs to the alphabet.
    pub fn successor(&self, state: StateId, symbol: &S) -> Option<StateId> {
        self.edges
            .iter()
            .find(|edge| edge.from == state && edge.symbols.contains(symbol))
            .map(|edge| edge.to)
    }

    /// Runs the word from the start state and reports acceptance.
    pub fn accepts(&self, word: &Word<S>) -> bool {
        let mut current = self.start;
        for symbol in word.symbols() {
            match self.successor(current, symbol) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.is_accepting(current)
    }
}

/// Derives the hypothesis DFA from the given table.
///
/// The first `I`-element with a given signature is the canonical representative of that state;
/// representatives are processed in `I`'s order and their one-letter extensions in the alphabet's
/// order, so the resulting automaton is the same on every call. Fails with
/// [`LearnError::TableNotReady`] unless the table is complete, closed and consistent.
pub fn build<S: Symbol>(table: &ObservationTable<S>) -> Result<Dfa<S>, LearnError<S>> {
    if table.has_missing()
        || !matches!(check_closed(table)?, Closedness::Closed)
        || !matches!(check_consistent(table)?, Consistency::Consistent)
    {
        return Err(LearnError::TableNotReady);
    }
    let start_time = Instant::now();

    let mut states: Vec<RowSignature> = Vec::new();
    let mut index_of: math::Bijection<StateId, RowSignature> = math::Bijection::new();
    let mut representatives: Vec<(StateId, Word<S>)> = Vec::new();

    for s in table.base() {
        let signature = table.row(s)?;
        if index_of.contains_right(&signature) {
            continue;
        }
        let id = states.len();
        index_of.insert(id, signature.clone());
        states.push(signature);
        representatives.push((id, s.clone()));
    }

    let epsilon = Word::epsilon();
    let start = *index_of
        .get_by_right(&table.row(&epsilon)?)
        .expect("the empty word is always in I");

    let mut accepting = Vec::new();
    for s in table.base() {
        if table.lookup(&s.concat(&epsilon)) == Some(true) {
            let id = *index_of
                .get_by_right(&table.row(s)?)
                .expect("every I-row has a registered state");
            if !accepting.contains(&id) {
                accepting.push(id);
            }
        }
    }

    let mut edges: Vec<Edge<S>> = Vec::new();
    for (id, s) in &representatives {
        for a in table.alphabet().universe() {
            let target = table.row(&s.append(a.clone()))?;
            let to = *index_of
                .get_by_right(&target)
                .expect("closedness guarantees a representative for every boundary row");
            if let Some(edge) = edges.iter_mut().find(|e| e.from == *id && e.to == to) {
                edge.symbols.push(a.clone());
            } else {
                edges.push(Edge {
                    from: *id,
                    to,
                    symbols: vec![a.clone()],
                });
            }
        }
    }

    debug!(
        "building a hypothesis with {} states took {}µs",
        states.len(),
        start_time.elapsed().as_micros()
    );

    Ok(Dfa {
        alphabet: table.alphabet().clone(),
        states,
        start,
        accepting,
        edges,
    })
}
