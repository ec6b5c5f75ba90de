//! Per-key causal histories for an eventually-consistent, multi-master
//! key-value store.
//!
//! The central type is the [[Clock]]: a compact summary of every write a key
//! has seen, together with the *sibling* values of concurrent writes that
//! causality alone cannot order. A store keeps one clock per key, hands the
//! [[Clock::join]] summary to reading clients, and lets them echo it back as
//! the context of their next write:
//!
//! ```
//! use dotsync_core::{Clock, ReplicaId};
//!
//! let replica = ReplicaId::from("replica-1");
//!
//! // First write for the key: no context yet.
//! let server = Clock::new("shopping list v1").update(replica.clone());
//!
//! // A client reads, edits, and writes back under the summary it was given.
//! let write = Clock::with_context(server.join(), "shopping list v2");
//! let server = write.update_with(&server, replica.clone());
//!
//! assert_eq!(server.values().collect::<Vec<_>>(), [&"shopping list v2"]);
//! ```
//!
//! Everything here is a pure function over immutable values; the embedding
//! store owns persistence, transport, and per-key write serialization.
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]

pub mod causal;
pub mod errors;
pub mod replica;

pub use causal::{
    Clock, Dot, DotSet, Entry, HappenedBeforeOrd, HappenedBeforeOrdering, VersionVector,
};
pub use errors::EmptyClockError;
pub use replica::ReplicaId;
