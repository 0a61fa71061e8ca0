//! Active learning of deterministic finite automata via Angluin's L* algorithm.
//!
//! The learner maintains an observation table over a prefix set `I`, a suffix set `E` and a
//! partial map `T` of membership answers. Whenever the table is *closed* (every one-letter
//! extension of a prefix has a row that is already represented in `I`) and *consistent* (prefixes
//! with equal rows do not diverge after one more symbol), a minimal DFA hypothesis can be read
//! off. A counterexample to that hypothesis grows `I` and triggers another refinement round.
//!
//! The crate deliberately separates three concerns:
//! - [`table::ObservationTable`] stores `(I, E, T)` and answers structural queries such as
//!   [`table::ObservationTable::boundary_rows`] and [`table::ObservationTable::row`].
//! - [`driver::RefinementDriver`] owns the table and implements the step-refinement state
//!   machine; it is the only place that mutates the table.
//! - [`hypothesis::Dfa`] is a pure snapshot derived from a closed-and-consistent table, which is
//!   what gets handed to an equivalence oracle or a renderer.
//!
//! Membership and equivalence answers come from the outside through the traits in [`oracle`];
//! the bundled [`oracle::DfaOracle`] and [`oracle::BoundedOracle`] are convenient stand-ins for
//! tests and demos. The closed loop tying everything together lives in [`driver::learn`].
#![deny(rustdoc::broken_intra_doc_links)]

/// Symbols and the ordered alphabet they form.
pub mod alphabet;

/// Words over an alphabet, with ε-aware concatenation and prefix/suffix enumeration.
pub mod word;

/// Type aliases hiding the concrete map/set implementations in use.
pub mod math;

/// The observation table `(I, E, T)` and row signatures.
pub mod table;

/// Closedness and consistency checks with deterministic witness order.
pub mod check;

/// The refinement state machine and the oracle-driven learning loop.
pub mod driver;

/// Hypothesis DFAs derived from closed-and-consistent tables.
pub mod hypothesis;

/// Interfaces to the membership and equivalence oracles, plus two implementations.
pub mod oracle;

mod error;
pub use error::LearnError;

/// Everything needed to use the crate, `use angluin::prelude::*;` should suffice.
pub mod prelude {
    pub use crate::{
        alphabet::{Alphabet, Symbol},
        check::{check_closed, check_consistent, Closedness, Consistency},
        driver::{learn, DriverState, RefinementDriver, StepOutcome},
        hypothesis::{build, Dfa, Edge, StateId},
        math,
        oracle::{BoundedOracle, DfaOracle, EquivalenceOracle, MembershipOracle},
        table::{ObservationTable, RowSignature},
        word::Word,
        LearnError,
    };
}
