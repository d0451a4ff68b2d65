//! Merge: combine a remote replica into the local one (§4.9).

use tracing::info;

use crate::atom::{Atom, AtomId, Lamport};
use crate::replica::Replica;
use crate::site::SiteIdx;
use crate::weave::Weave;
use crate::yarn::Yarn;

fn remap_id(id: AtomId, remap: &[SiteIdx]) -> AtomId {
    if id.is_none() {
        return id;
    }
    return AtomId {
        site: remap[id.site.0 as usize],
        yarn_index: id.yarn_index,
        timestamp: id.timestamp,
    };
}

fn remap_atom(atom: &Atom, remap: &[SiteIdx]) -> Atom {
    return Atom {
        id: remap_id(atom.id, remap),
        cause: remap_id(atom.cause, remap),
        tag: atom.tag,
        payload: atom.payload,
    };
}

fn remap_weave(weave: &Weave, remap: &[SiteIdx]) -> Weave {
    let mut out = Weave::new();
    for atom in weave.iter() {
        out.push(remap_atom(atom, remap));
    }
    return out;
}

/// Rebuild the per-site yarn array in merged-sitemap index space.
fn remap_yarns(yarns: &[Yarn], remap: &[SiteIdx], merged_len: usize) -> Vec<Yarn> {
    let mut out: Vec<Yarn> = (0..merged_len).map(|_| Yarn::new()).collect();
    for (old_idx, yarn) in yarns.iter().enumerate() {
        let new_idx = remap[old_idx].0 as usize;
        for atom in yarn.iter() {
            out[new_idx].push(remap_atom(atom, remap));
        }
    }
    return out;
}

/// Two-pointer weave interleave (§4.9 step 4).
fn interleave_weaves(local: &Weave, remote: &Weave) -> Weave {
    let local_atoms = local.as_slice();
    let remote_atoms = remote.as_slice();
    let mut out = Weave::new();
    let mut i = 0usize;
    let mut j = 0usize;

    while i < local_atoms.len() && j < remote_atoms.len() {
        let a = &local_atoms[i];
        let b = &remote_atoms[j];
        if a.id == b.id {
            out.push(*a);
            i += 1;
            j += 1;
        } else if a.id.site == b.id.site {
            if a.id.timestamp.0 > b.id.timestamp.0 {
                out.push(*a);
                i += 1;
            } else {
                out.push(*b);
                j += 1;
            }
        } else if a > b {
            let block_len = local.causal_block_len(i);
            for k in i..i + block_len {
                out.push(local_atoms[k]);
            }
            i += block_len;
        } else {
            let block_len = remote.causal_block_len(j);
            for k in j..j + block_len {
                out.push(remote_atoms[k]);
            }
            j += block_len;
        }
    }
    while i < local_atoms.len() {
        out.push(local_atoms[i]);
        i += 1;
    }
    while j < remote_atoms.len() {
        out.push(remote_atoms[j]);
        j += 1;
    }
    return out;
}

impl Replica {
    /// §4.9: merge `other` into `self`. Deterministic, commutative,
    /// associative, and idempotent (§8).
    pub fn merge(&mut self, other: &Replica) {
        let (merged_sitemap, local_remap, remote_remap) = self.sitemap.union(&other.sitemap);

        let local_weave = remap_weave(&self.weave, &local_remap);
        let remote_weave = remap_weave(&other.weave, &remote_remap);
        let local_yarns = remap_yarns(&self.yarns, &local_remap, merged_sitemap.len());
        let remote_yarns = remap_yarns(&other.yarns, &remote_remap, merged_sitemap.len());

        let mut merged_yarns = local_yarns;
        for site_idx in 0..merged_sitemap.len() {
            let remote_yarn = &remote_yarns[site_idx];
            let local_len = merged_yarns[site_idx].len();
            for i in local_len..remote_yarn.len() {
                let atom = *remote_yarn.get(i as u32).expect("within bounds");
                merged_yarns[site_idx].push(atom);
            }
        }

        let merged_weave = interleave_weaves(&local_weave, &remote_weave);

        let new_site_idx = local_remap[self.site_idx.0 as usize];
        let new_cursor = remap_id(self.cursor, &local_remap);
        let new_root_string = self.root_string.map(|id| remap_id(id, &local_remap));

        let before_weave_len = self.weave.len();
        let before_sitemap_len = self.sitemap.len();

        self.sitemap = merged_sitemap;
        self.site_idx = new_site_idx;
        self.yarns = merged_yarns;
        self.weave = merged_weave;
        self.clock = Lamport(self.clock.0.max(other.clock.0).saturating_add(1));
        self.cursor = new_cursor;
        self.root_string = new_root_string;

        self.fixup_cursor();

        info!(
            before_sitemap_len,
            after_sitemap_len = self.sitemap.len(),
            before_weave_len,
            after_weave_len = self.weave.len(),
            "merged replica"
        );
    }
}

impl crate::crdt::Crdt for Replica {
    fn merge(&mut self, other: &Self) {
        Replica::merge(self, other);
    }
}
