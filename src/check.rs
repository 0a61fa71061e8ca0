use tracing::trace;

use crate::alphabet::Symbol;
use crate::error::LearnError;
use crate::math;
use crate::table::ObservationTable;
use crate::word::Word;

/// Result of the closedness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closedness<S: Symbol> {
    Closed,
    /// The first boundary row (in boundary order) whose signature has no representative in `I`.
    NotClosed { witness: Word<S> },
}

/// Result of the consistency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consistency<S: Symbol> {
    Consistent,
    /// Two `I`-rows with equal signatures diverge after reading `symbol` and checking `suffix`.
    Inconsistent {
        rows: (Word<S>, Word<S>),
        symbol: S,
        suffix: Word<S>,
    },
}

/// Checks whether every boundary row's signature is already represented by some row in `I`.
///
/// Boundary rows are visited in their fixed order (`I`'s insertion order, then per `I`-element
/// the alphabet's order), so repeated runs on identical state report the same witness. Requires
/// all boundary entries to be answered.
pub fn check_closed<S: Symbol>(
    table: &ObservationTable<S>,
) -> Result<Closedness<S>, LearnError<S>> {
    let mut represented = math::Set::default();
    for s in table.base() {
        represented.insert(table.row(s)?);
    }

    for s in table.boundary_rows() {
        let signature = table.row(&s)?;
        if !represented.contains(&signature) {
            trace!("table is not closed, row({}) = {} has no representative in I", s, signature);
            return Ok(Closedness::NotClosed { witness: s });
        }
    }
    Ok(Closedness::Closed)
}

/// Checks whether any two `I`-rows with identical signatures diverge after one symbol of
/// lookahead.
///
/// The nested iteration order (`s1` over `I`, `s2` over `I`, then the alphabet, then `E`) is part
/// of the contract: it determines which witness is reported when several violations exist. Only
/// pairs of entries that are both answered are compared.
pub fn check_consistent<S: Symbol>(
    table: &ObservationTable<S>,
) -> Result<Consistency<S>, LearnError<S>> {
    for s1 in table.base() {
        for s2 in table.base() {
            if table.row(s1)? != table.row(s2)? {
                continue;
            }

            for a in table.alphabet().universe() {
                let left = s1.append(a.clone());
                let right = s2.append(a.clone());
                for e in table.experiments() {
                    let (Some(l), Some(r)) =
                        (table.lookup(&left.concat(e)), table.lookup(&right.concat(e)))
                    else {
                        continue;
                    };
                    if l != r {
                        trace!(
                            "table is not consistent, row({}) = row({}) but they diverge on {}·{}",
                            s1,
                            s2,
                            a,
                            e
                        );
                        return Ok(Consistency::Inconsistent {
                            rows: (s1.clone(), s2.clone()),
                            symbol: a.clone(),
                            suffix: e.clone(),
                        });
                    }
                }
            }
        }
    }
    Ok(Consistency::Consistent)
}
