//! Position-cached handles onto typed registers (§9).
//!
//! A handle remembers the weave index of the atom it points at. Because
//! atoms are append-only and never move left in the weave, a stale cached
//! index is always a safe lower bound for a fresh [`crate::weave::Weave::search`]
//! (the same invariant the teacher's `SpanList` prefix-sum cache relies on
//! in `crdt/skip_list.rs`).

use crate::atom::AtomId;
use crate::value::{render, Value};
use crate::weave::Weave;

/// A cached reference to a typed register atom somewhere in the weave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handle {
    id: AtomId,
    cached_index: usize,
}

impl Handle {
    pub fn new(id: AtomId, index: usize) -> Handle {
        return Handle {
            id,
            cached_index: index,
        };
    }

    pub fn id(&self) -> AtomId {
        return self.id;
    }

    /// Resolve the handle's current weave index, rescanning forward from
    /// the cached hint if it has gone stale.
    fn resolve(&mut self, weave: &Weave) -> Option<usize> {
        if let Some(atom) = weave.get(self.cached_index) {
            if atom.id == self.id {
                return Some(self.cached_index);
            }
        }
        let found = weave.search(self.id, Some(self.cached_index))?;
        self.cached_index = found;
        return Some(found);
    }

    /// Render the current value at this handle.
    pub fn snapshot(&mut self, weave: &Weave) -> Value {
        match self.resolve(weave) {
            Some(index) => render(weave, index),
            None => Value::Absent,
        }
    }
}

/// A handle onto a `string` register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StringHandle(pub Handle);

/// A handle onto a `counter` register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterHandle(pub Handle);

/// A handle onto a `list` register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListHandle(pub Handle);

impl StringHandle {
    pub fn snapshot(&mut self, weave: &Weave) -> String {
        return self.0.snapshot(weave).to_text();
    }

    pub fn id(&self) -> AtomId {
        return self.0.id();
    }
}

impl CounterHandle {
    pub fn snapshot(&mut self, weave: &Weave) -> i64 {
        match self.0.snapshot(weave) {
            Value::Counter(n) => n,
            _ => 0,
        }
    }

    pub fn id(&self) -> AtomId {
        return self.0.id();
    }
}

impl ListHandle {
    pub fn snapshot(&mut self, weave: &Weave) -> Vec<Value> {
        match self.0.snapshot(weave) {
            Value::List(items) => items,
            _ => Vec::new(),
        }
    }

    pub fn id(&self) -> AtomId {
        return self.0.id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{Lamport, Payload, Tag};
    use crate::site::SiteIdx;

    #[test]
    fn handle_resolves_after_cache_goes_stale() {
        let mut weave = Weave::new();
        let root_id = AtomId {
            site: SiteIdx::new(0),
            yarn_index: 0,
            timestamp: Lamport(1),
        };
        weave.push(crate::atom::Atom::new(
            root_id,
            AtomId::NONE,
            Tag::String,
            Payload::None,
        ));
        let mut handle = StringHandle(Handle::new(root_id, 0));
        assert_eq!(handle.snapshot(&weave), "");

        // Simulate a prior atom arriving earlier in the weave (e.g. via a
        // merge), shifting our root's real index without moving it left
        // of the cached hint.
        let other_id = AtomId {
            site: SiteIdx::new(1),
            yarn_index: 0,
            timestamp: Lamport(0),
        };
        let _ = other_id;
        let mut weave2 = Weave::new();
        weave2.push(crate::atom::Atom::new(
            AtomId {
                site: SiteIdx::new(1),
                yarn_index: 0,
                timestamp: Lamport(2),
            },
            AtomId::NONE,
            Tag::Counter,
            Payload::None,
        ));
        weave2.push(crate::atom::Atom::new(
            root_id,
            AtomId::NONE,
            Tag::String,
            Payload::None,
        ));
        let mut handle2 = StringHandle(Handle::new(root_id, 0));
        assert_eq!(handle2.snapshot(&weave2), "");
    }
}
