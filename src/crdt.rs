//! The `Crdt` trait: a data type with a merge operator that is
//! commutative, associative, and idempotent.

/// A CRDT is a data type with a merge operator that is commutative,
/// associative, and idempotent.
pub trait Crdt {
    fn merge(&mut self, other: &Self);
}
