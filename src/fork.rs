//! Fork: clone a replica under a fresh site identity (§4.8).

use tracing::{info, warn};

use crate::atom::{Atom, AtomId, Lamport};
use crate::error::{EngineError, EngineResult};
use crate::replica::Replica;
use crate::site::{SiteId, SiteIdx};
use crate::weave::Weave;
use crate::yarn::Yarn;

fn shift_site_idx(idx: SiteIdx, shift_from: SiteIdx) -> SiteIdx {
    if idx.is_none() || idx.0 < shift_from.0 {
        return idx;
    }
    return SiteIdx::new(idx.0 + 1);
}

fn shift_atom_id(id: AtomId, shift_from: SiteIdx) -> AtomId {
    if id.is_none() {
        return id;
    }
    return AtomId {
        site: shift_site_idx(id.site, shift_from),
        yarn_index: id.yarn_index,
        timestamp: id.timestamp,
    };
}

/// Renumber every embedded site index `>= shift_from` up by one, across
/// the weave, every yarn, and the cursor/root-register state (§4.8: "every
/// id embedded in yarns, weave, and cursor is remapped by this shift").
fn renumber(weave: &mut Weave, yarns: &mut [Yarn], cursor: &mut AtomId, root_string: &mut Option<AtomId>, shift_from: SiteIdx) {
    let remapped: Vec<Atom> = weave
        .iter()
        .map(|a| Atom {
            id: shift_atom_id(a.id, shift_from),
            cause: shift_atom_id(a.cause, shift_from),
            tag: a.tag,
            payload: a.payload,
        })
        .collect();
    *weave = Weave::new();
    for atom in remapped {
        weave.push(atom);
    }

    for yarn in yarns.iter_mut() {
        let remapped: Vec<Atom> = yarn
            .iter()
            .map(|a| Atom {
                id: shift_atom_id(a.id, shift_from),
                cause: shift_atom_id(a.cause, shift_from),
                tag: a.tag,
                payload: a.payload,
            })
            .collect();
        *yarn = Yarn::new();
        for atom in remapped {
            yarn.push(atom);
        }
    }

    *cursor = shift_atom_id(*cursor, shift_from);
    if let Some(id) = *root_string {
        *root_string = Some(shift_atom_id(id, shift_from));
    }
}

impl Replica {
    /// §4.8: produce an independent replica sharing this one's history,
    /// under a freshly generated site identity.
    pub fn fork(&mut self) -> EngineResult<Replica> {
        let next_clock = self
            .clock
            .0
            .checked_add(1)
            .ok_or(EngineError::StateExhausted)?;
        self.clock = Lamport(next_clock);

        let new_id = SiteId::generate();
        let insertion = match self.sitemap.insert(new_id) {
            Ok(insertion) => insertion,
            Err(e) => {
                warn!(sitemap_len = self.sitemap.len(), "sitemap exhausted on fork");
                return Err(e);
            }
        };

        if let Some(shift_from) = insertion.shift_from {
            renumber(
                &mut self.weave,
                &mut self.yarns,
                &mut self.cursor,
                &mut self.root_string,
                shift_from,
            );
            self.yarns.insert(shift_from.0 as usize, Yarn::new());
            self.site_idx = shift_site_idx(self.site_idx, shift_from);
        } else {
            self.yarns.push(Yarn::new());
        }

        info!(
            new_site = ?new_id,
            sitemap_len = self.sitemap.len(),
            "forked replica"
        );

        return Ok(Replica {
            site_id: new_id,
            site_idx: insertion.new_idx,
            sitemap: self.sitemap.clone(),
            yarns: self.yarns.clone(),
            weave: self.weave.clone(),
            clock: self.clock,
            cursor: self.cursor,
            root_string: self.root_string,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_gets_fresh_site_and_shares_history() {
        let mut r = Replica::new();
        r.insert_char('a').unwrap();
        let forked = r.fork().unwrap();

        assert_ne!(r.site_id(), forked.site_id());
        assert_eq!(forked.sitemap().len(), 2);
        assert_eq!(r.sitemap().len(), 2);
        assert_eq!(forked.to_text(), "a");
    }

    #[test]
    fn forked_replica_edits_independently() {
        let mut r = Replica::new();
        r.insert_char('a').unwrap();
        let mut forked = r.fork().unwrap();

        r.insert_char('b').unwrap();
        forked.insert_char('c').unwrap();

        assert_eq!(r.to_text(), "ab");
        assert_eq!(forked.to_text(), "ac");
    }

    #[test]
    fn double_fork_keeps_weave_readable_after_renumbering() {
        let mut r = Replica::new();
        r.insert_char('a').unwrap();
        let _f1 = r.fork().unwrap();
        let f2 = r.fork().unwrap();
        // Forking twice may insert a site index ahead of an existing one
        // depending on UUID ordering; either way the shared history must
        // still render correctly after any renumbering.
        assert_eq!(f2.to_text(), "a");
        assert_eq!(r.to_text(), "a");
    }
}
