//! Site identity and the sitemap: the sorted registry of sites that assigns
//! each one a compact index.
//!
//! Every atom embeds a [`SiteIdx`] rather than a full [`SiteId`] to keep
//! storage compact, the same trade the teacher's `UserTable` makes for
//! public-key identities. Unlike `UserTable`, the sitemap must stay sorted
//! by the underlying identifier at all times (the weave's merge algorithm
//! depends on sitemap order being comparable across replicas), so inserting
//! a new site can land anywhere in the sequence, not just at the end.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Maximum number of sites a sitemap can hold.
pub const MAX_SITES: usize = u16::MAX as usize;

/// Globally unique, time-ordered identifier for a site (replica origin).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteId(pub Uuid);

impl SiteId {
    /// Generate a fresh site identifier.
    pub fn generate() -> SiteId {
        return SiteId(Uuid::now_v7());
    }
}

/// A compact index into the sitemap. `NONE` is reserved for the "none"
/// sentinel atom id (cause/position of the implicit root).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteIdx(pub u16);

impl SiteIdx {
    /// Sentinel used by the "none" atom id.
    pub const NONE: SiteIdx = SiteIdx(u16::MAX);

    pub fn new(idx: u16) -> SiteIdx {
        return SiteIdx(idx);
    }

    pub fn is_none(&self) -> bool {
        return self.0 == u16::MAX;
    }

    fn as_usize(&self) -> usize {
        return self.0 as usize;
    }
}

/// The sorted registry of site identifiers, mapping each to a compact
/// [`SiteIdx`] used throughout atom ids.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Sitemap {
    /// Site identifiers in ascending order; position is the site's index.
    ids: Vec<SiteId>,
}

/// Describes how an insertion into the sitemap shifted existing indices.
pub struct ForkInsertion {
    /// Index assigned to the newly inserted site.
    pub new_idx: SiteIdx,
    /// Every existing index `>= shift_from` moved up by one; `None` if
    /// the new site was appended and nothing shifted.
    pub shift_from: Option<SiteIdx>,
}

impl Sitemap {
    pub fn new() -> Sitemap {
        return Sitemap { ids: Vec::new() };
    }

    /// A sitemap containing a single, freshly-generated site.
    pub fn with_single_site() -> (Sitemap, SiteId) {
        let id = SiteId::generate();
        return (Sitemap { ids: vec![id] }, id);
    }

    pub fn len(&self) -> usize {
        return self.ids.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.ids.is_empty();
    }

    pub fn get(&self, idx: SiteIdx) -> Option<SiteId> {
        if idx.is_none() {
            return None;
        }
        return self.ids.get(idx.as_usize()).copied();
    }

    pub fn index_of(&self, id: SiteId) -> Option<SiteIdx> {
        return self
            .ids
            .binary_search(&id)
            .ok()
            .map(|i| SiteIdx::new(i as u16));
    }

    pub fn iter(&self) -> impl Iterator<Item = SiteId> + '_ {
        return self.ids.iter().copied();
    }

    /// Insert a new site, preserving sort order. Returns the index it was
    /// assigned and, if existing indices shifted, the lowest index that
    /// moved (so callers can remap embedded ids).
    pub fn insert(&mut self, id: SiteId) -> EngineResult<ForkInsertion> {
        if self.ids.len() >= MAX_SITES {
            return Err(EngineError::SiteExhausted);
        }
        match self.ids.binary_search(&id) {
            Ok(existing) => {
                return Ok(ForkInsertion {
                    new_idx: SiteIdx::new(existing as u16),
                    shift_from: None,
                });
            }
            Err(pos) => {
                self.ids.insert(pos, id);
                let shift_from = if pos == self.ids.len() - 1 {
                    None
                } else {
                    Some(SiteIdx::new(pos as u16))
                };
                return Ok(ForkInsertion {
                    new_idx: SiteIdx::new(pos as u16),
                    shift_from,
                });
            }
        }
    }

    /// Merge `other` into `self`, returning the sorted union plus remap
    /// tables from each input's old indices to the union's indices.
    pub fn union(&self, other: &Sitemap) -> (Sitemap, Vec<SiteIdx>, Vec<SiteIdx>) {
        let mut merged: Vec<SiteId> = self.ids.clone();
        for id in &other.ids {
            if self.ids.binary_search(id).is_err() {
                merged.push(*id);
            }
        }
        merged.sort();

        let remap = |ids: &[SiteId]| -> Vec<SiteIdx> {
            ids.iter()
                .map(|id| {
                    let pos = merged.binary_search(id).expect("id present in union");
                    SiteIdx::new(pos as u16)
                })
                .collect()
        };

        let local_remap = remap(&self.ids);
        let remote_remap = remap(&other.ids);
        return (Sitemap { ids: merged }, local_remap, remote_remap);
    }
}

impl PartialEq for Sitemap {
    fn eq(&self, other: &Self) -> bool {
        return self.ids == other.ids;
    }
}
impl Eq for Sitemap {}
