//! Time travel: wefts (per-site timestamp cuts) and historical views
//! (§4.10).

use serde::{Deserialize, Serialize};

use crate::atom::Lamport;
use crate::error::{EngineError, EngineResult};
use crate::replica::Replica;
use crate::weave::Weave;
use crate::yarn::Yarn;

/// A per-site timestamp vector defining a historical cut: site `i`'s entry
/// is the highest timestamp from that site included in the cut.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weft {
    entries: Vec<u32>,
}

impl Weft {
    pub fn new(entries: Vec<u32>) -> Weft {
        return Weft { entries };
    }

    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    pub fn get(&self, site_idx: usize) -> u32 {
        return self.entries.get(site_idx).copied().unwrap_or(0);
    }

    pub fn as_slice(&self) -> &[u32] {
        return &self.entries;
    }
}

impl Replica {
    /// §4.10 `now()`: the weft of the replica's current full state.
    pub fn now(&self) -> Weft {
        let entries = self
            .yarns
            .iter()
            .map(|yarn| yarn.iter().map(|a| a.id.timestamp.0).max().unwrap_or(0))
            .collect();
        return Weft::new(entries);
    }

    /// §4.10 `check-weft`: validates a weft is well-formed for this
    /// replica's sitemap and causally closed.
    pub fn check_weft(&self, weft: &Weft) -> EngineResult<()> {
        if weft.len() != self.sitemap.len() {
            return Err(EngineError::WeftInvalidLength);
        }
        for (site_idx, yarn) in self.yarns.iter().enumerate() {
            let cut_ts = weft.get(site_idx);
            for atom in yarn.iter() {
                if atom.id.timestamp.0 > cut_ts {
                    continue;
                }
                if atom.cause.is_none() {
                    continue;
                }
                let cause_cut = weft.get(atom.cause.site.0 as usize);
                if atom.cause.timestamp.0 > cause_cut {
                    return Err(EngineError::WeftDisconnected);
                }
            }
        }
        return Ok(());
    }

    /// §4.10 `view-at`: a new, detached replica cut at `weft`.
    pub fn view_at(&self, weft: &Weft) -> EngineResult<Replica> {
        self.check_weft(weft)?;

        let mut yarns = Vec::with_capacity(self.yarns.len());
        for (site_idx, yarn) in self.yarns.iter().enumerate() {
            let cut_ts = weft.get(site_idx);
            let mut cut_yarn = Yarn::new();
            for atom in yarn.iter() {
                if atom.id.timestamp.0 <= cut_ts {
                    cut_yarn.push(*atom);
                }
            }
            yarns.push(cut_yarn);
        }

        let mut weave = Weave::new();
        for atom in self.weave.iter() {
            let cut_ts = weft.get(atom.id.site.0 as usize);
            if atom.id.timestamp.0 <= cut_ts {
                weave.push(*atom);
            }
        }

        let cursor = if self.cursor.is_none() {
            self.cursor
        } else {
            let cut_ts = weft.get(self.cursor.site.0 as usize);
            if self.cursor.timestamp.0 <= cut_ts {
                self.cursor
            } else {
                crate::atom::AtomId::NONE
            }
        };

        let root_string = self.root_string.and_then(|id| {
            let cut_ts = weft.get(id.site.0 as usize);
            if id.timestamp.0 <= cut_ts {
                Some(id)
            } else {
                None
            }
        });

        let clock = Lamport(weft.as_slice().iter().copied().max().unwrap_or(0));

        return Ok(Replica {
            site_id: self.site_id,
            site_idx: self.site_idx,
            sitemap: self.sitemap.clone(),
            yarns,
            weave,
            clock,
            cursor,
            root_string,
        });
    }
}
