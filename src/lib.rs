//! Tapestry - a causal-tree (CT) replicated data type engine for
//! collaborative editing of strings, counters, and lists.
//!
//! Every site holds an independent [`Replica`](replica::Replica) that can
//! be mutated offline and merged with any peer; merge is deterministic,
//! commutative, associative, and idempotent, and always converges to the
//! same state regardless of the order operations are applied in.
//!
//! # Quick start
//!
//! ```
//! use tapestry::replica::Replica;
//!
//! let mut doc = Replica::new();
//! doc.insert_char('H').unwrap();
//! doc.insert_char('i').unwrap();
//! assert_eq!(doc.to_text(), "Hi");
//!
//! let mut peer = doc.fork().unwrap();
//! doc.insert_char('!').unwrap();
//! peer.insert_char('?').unwrap();
//! doc.merge(&peer);
//! peer.merge(&doc);
//! assert_eq!(doc.to_text(), peer.to_text());
//! ```

pub mod atom;
pub mod crdt;
pub mod error;
pub mod fork;
pub mod handle;
pub mod merge;
pub mod replica;
pub mod site;
pub mod value;
pub mod weave;
pub mod weft;
pub mod yarn;
