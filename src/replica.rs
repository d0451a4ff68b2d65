//! The replica: one site's view of the causal tree, and the operation
//! surface (§4.4, §4.5, §4.7, §6) that mutates it.

use tracing::warn;

use crate::atom::{Atom, AtomId, Lamport, Payload, Tag};
use crate::error::{EngineError, EngineResult};
use crate::handle::{CounterHandle, Handle, ListHandle, StringHandle};
use crate::site::{SiteId, SiteIdx, Sitemap};
use crate::value::{render, Value};
use crate::weave::Weave;
use crate::yarn::Yarn;

/// One site's replica of the causal tree.
#[derive(Clone, Debug)]
pub struct Replica {
    pub(crate) site_id: SiteId,
    pub(crate) site_idx: SiteIdx,
    pub(crate) sitemap: Sitemap,
    pub(crate) yarns: Vec<Yarn>,
    pub(crate) weave: Weave,
    pub(crate) clock: Lamport,
    pub(crate) cursor: AtomId,
    /// The lazily-vivified top-level string register the cursor-based API
    /// operates on (SPEC_FULL.md §3 "Top-level string register").
    pub(crate) root_string: Option<AtomId>,
}

impl Replica {
    /// A fresh replica: empty weave, single-entry sitemap, clock at zero.
    pub fn new() -> Replica {
        let (sitemap, site_id) = Sitemap::with_single_site();
        return Replica {
            site_id,
            site_idx: SiteIdx::new(0),
            sitemap,
            yarns: vec![Yarn::new()],
            weave: Weave::new(),
            clock: Lamport(0),
            cursor: AtomId::NONE,
            root_string: None,
        };
    }

    pub fn site_id(&self) -> SiteId {
        return self.site_id;
    }

    pub fn clock(&self) -> Lamport {
        return self.clock;
    }

    pub fn sitemap(&self) -> &Sitemap {
        return &self.sitemap;
    }

    pub fn weave(&self) -> &Weave {
        return &self.weave;
    }

    fn tick(&mut self) -> EngineResult<Lamport> {
        let next = self.clock.0.checked_add(1).ok_or(EngineError::StateExhausted);
        let next = match next {
            Ok(n) => n,
            Err(e) => {
                warn!("lamport clock exhausted on site {:?}", self.site_id);
                return Err(e);
            }
        };
        self.clock = Lamport(next);
        return Ok(self.clock);
    }

    fn tag_of(&self, id: AtomId) -> Option<Tag> {
        if id.is_none() {
            return None;
        }
        let index = self.weave.search(id, None)?;
        return self.weave.get(index).map(|a| a.tag);
    }

    /// Core mutator (§4.4): allocate and splice a new atom under `cause`.
    pub fn add_atom(&mut self, cause: AtomId, tag: Tag, payload: Payload) -> EngineResult<AtomId> {
        let parent_tag = self.tag_of(cause);
        if !Tag::permits_child(parent_tag, tag) {
            return Err(EngineError::InvalidChild);
        }

        let ts = self.tick()?;
        let yarn_index = self.yarns[self.site_idx.0 as usize].len() as u32;
        let id = AtomId {
            site: self.site_idx,
            yarn_index,
            timestamp: ts,
        };
        let atom = Atom::new(id, cause, tag, payload);

        let position = self.weave.insertion_position(cause, &atom);
        self.weave.insert(position, atom);
        self.yarns[self.site_idx.0 as usize].push(atom);

        return Ok(id);
    }

    /// Ensure the lazily-vivified top-level string register exists,
    /// creating it if this is the first mutation on an otherwise-empty
    /// replica.
    fn ensure_root_string(&mut self) -> EngineResult<AtomId> {
        if let Some(id) = self.root_string {
            return Ok(id);
        }
        let id = self.add_atom(AtomId::NONE, Tag::String, Payload::None)?;
        self.root_string = Some(id);
        return Ok(id);
    }

    /// The visible (non-deleted) linearization of the top-level string, as
    /// a list of (weave-index, atom-id) pairs in display order. Chars
    /// chain off one another rather than all attaching directly to the
    /// string root (§3's tag table), so this scans the whole causal block
    /// in weave order rather than walking direct children.
    fn visible_chars(&self) -> Vec<(usize, AtomId)> {
        let root = match self.root_string {
            Some(id) => id,
            None => return Vec::new(),
        };
        let head_index = match self.weave.search(root, None) {
            Some(i) => i,
            None => return Vec::new(),
        };
        let block_len = self.weave.causal_block_len(head_index);
        let mut out = Vec::new();
        for offset in 1..block_len {
            let i = head_index + offset;
            let atom = self.weave.get(i).expect("within causal block");
            if atom.tag == Tag::Char && !self.weave.is_deleted(i) {
                out.push((i, atom.id));
            }
        }
        return out;
    }

    /// §4.5 `set-cursor`: `-1` positions at "none"; otherwise indexes into
    /// the visible linearization.
    pub fn set_cursor(&mut self, index: i64) -> EngineResult<()> {
        if index == -1 {
            self.cursor = AtomId::NONE;
            return Ok(());
        }
        if index < 0 {
            return Err(EngineError::CursorOutOfRange);
        }
        let visible = self.visible_chars();
        let idx = index as usize;
        let entry = visible.get(idx).ok_or(EngineError::CursorOutOfRange)?;
        self.cursor = entry.1;
        return Ok(());
    }

    /// §4.5 `insert-char`. A cursor of "none" means "before the first
    /// char", which attaches the new char to the string register itself
    /// rather than the tree root (only `string`/`counter`/`list` are valid
    /// root children, per §3's tag table).
    pub fn insert_char(&mut self, c: char) -> EngineResult<()> {
        let root = self.ensure_root_string()?;
        let cause = if self.cursor.is_none() {
            root
        } else {
            self.cursor
        };
        let id = self.add_atom(cause, Tag::Char, Payload::Char(c))?;
        self.cursor = id;
        return Ok(());
    }

    pub fn insert_char_at(&mut self, c: char, index: i64) -> EngineResult<()> {
        self.set_cursor(index)?;
        return self.insert_char(c);
    }

    /// §4.5 `delete-char`, followed by the §4.7 delete-cursor fix-up.
    pub fn delete_char(&mut self) -> EngineResult<()> {
        if self.cursor.is_none() {
            return Err(EngineError::NoAtomToDelete);
        }
        let target = self.cursor;
        self.add_atom(target, Tag::Delete, Payload::None)?;
        self.fixup_cursor();
        return Ok(());
    }

    pub fn delete_char_at(&mut self, index: i64) -> EngineResult<()> {
        self.set_cursor(index)?;
        return self.delete_char();
    }

    /// §4.7: walk the cursor back through `cause` links while the current
    /// atom is deleted, stopping at "none" or the first live ancestor.
    pub(crate) fn fixup_cursor(&mut self) {
        loop {
            if self.cursor.is_none() {
                return;
            }
            let index = match self.weave.search(self.cursor, None) {
                Some(i) => i,
                None => {
                    self.cursor = AtomId::NONE;
                    return;
                }
            };
            if !self.weave.is_deleted(index) {
                return;
            }
            let cause = self.weave.get(index).expect("checked above").cause;
            self.cursor = cause;
        }
    }

    /// §4.5 register setters: attach a fresh typed atom as a child of the
    /// current cursor position and return a handle to it.
    pub fn set_string(&mut self) -> EngineResult<StringHandle> {
        let cause = self.cursor;
        let id = self.add_atom(cause, Tag::String, Payload::None)?;
        let index = self.weave.search(id, None).expect("just inserted");
        return Ok(StringHandle(Handle::new(id, index)));
    }

    pub fn set_counter(&mut self) -> EngineResult<CounterHandle> {
        let cause = self.cursor;
        let id = self.add_atom(cause, Tag::Counter, Payload::None)?;
        let index = self.weave.search(id, None).expect("just inserted");
        return Ok(CounterHandle(Handle::new(id, index)));
    }

    pub fn set_list(&mut self) -> EngineResult<ListHandle> {
        let cause = self.cursor;
        let id = self.add_atom(cause, Tag::List, Payload::None)?;
        let index = self.weave.search(id, None).expect("just inserted");
        return Ok(ListHandle(Handle::new(id, index)));
    }

    /// Append a new element to a list, returning the element's atom id so
    /// a caller can attach a typed child (`set_string`-style, but scoped to
    /// this element) under it.
    pub fn push_element(&mut self, list: &ListHandle) -> EngineResult<AtomId> {
        return self.add_atom(list.id(), Tag::Element, Payload::None);
    }

    pub fn set_str_container_under(&mut self, element: AtomId) -> EngineResult<StringHandle> {
        let id = self.add_atom(element, Tag::StrContainer, Payload::None)?;
        let index = self.weave.search(id, None).expect("just inserted");
        return Ok(StringHandle(Handle::new(id, index)));
    }

    pub fn increment(&mut self, counter: &CounterHandle, delta: i32) -> EngineResult<()> {
        self.add_atom(counter.id(), Tag::Increment, Payload::Delta(delta))?;
        return Ok(());
    }

    pub fn decrement(&mut self, counter: &CounterHandle, delta: i32) -> EngineResult<()> {
        return self.increment(counter, -delta);
    }

    /// §4.6 snapshot of the top-level string register.
    pub fn snapshot(&self) -> Value {
        let root = match self.root_string {
            Some(id) => id,
            None => return Value::Str(String::new()),
        };
        let index = match self.weave.search(root, None) {
            Some(i) => i,
            None => return Value::Str(String::new()),
        };
        return render(&self.weave, index);
    }

    /// §6 `to-string`: convenience projection of [`Replica::snapshot`].
    pub fn to_text(&self) -> String {
        return self.snapshot().to_text();
    }
}

impl Default for Replica {
    fn default() -> Self {
        return Self::new();
    }
}
