//! The causal algebra: compact dot sets, per-replica entries, and the
//! [[Clock]] operations a store builds reads, writes, and anti-entropy on.

mod clock;
mod dots;
mod entry;
mod happened_before;
mod resolve;
mod version_vector;

pub use clock::Clock;
pub use dots::{Dot, DotSet};
pub use entry::Entry;
pub use happened_before::{
    HappenedBeforeOrd, HappenedBeforeOrdering, HappenedBeforePartialOrdWrapper,
};
pub use version_vector::VersionVector;
