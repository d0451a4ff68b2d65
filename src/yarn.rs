//! Yarns: per-site append-only atom logs.
//!
//! Mirrors the teacher's `Column` (`crdt/rga.rs`), a per-user append-only
//! content buffer indexed by sequence number; a yarn is the same idea
//! generalized from "bytes of inserted text" to "atoms this site created".

use smallvec::SmallVec;

use crate::atom::Atom;

/// One site's append-only log of atoms it authored. `yarn_index` in an
/// [`crate::atom::AtomId`] is the position within this vector.
#[derive(Clone, Debug, Default)]
pub struct Yarn {
    atoms: SmallVec<[Atom; 8]>,
}

impl Yarn {
    pub fn new() -> Yarn {
        return Yarn {
            atoms: SmallVec::new(),
        };
    }

    pub fn len(&self) -> usize {
        return self.atoms.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.atoms.is_empty();
    }

    pub fn get(&self, index: u32) -> Option<&Atom> {
        return self.atoms.get(index as usize);
    }

    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        return self.atoms.iter();
    }

    pub fn as_slice(&self) -> &[Atom] {
        return &self.atoms;
    }
}
