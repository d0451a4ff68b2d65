//! Atoms: the tagged records that make up the weave, and their ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::site::SiteIdx;

/// A monotonically increasing per-replica Lamport timestamp. `0` is the
/// "none" sentinel used by the root/cause-less id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lamport(pub u32);

impl Lamport {
    pub const NONE: Lamport = Lamport(0);

    pub fn is_none(&self) -> bool {
        return self.0 == 0;
    }
}

/// The identity of an atom: which site created it, its position in that
/// site's yarn, and the Lamport timestamp it was stamped with.
///
/// Comparison is ascending by timestamp, then **descending** by site index
/// (§4.1): among concurrent atoms with equal timestamp, the lower site
/// index sorts greater. This is never supposed to happen for atoms created
/// honestly (each site's own clock advances strictly), but the tie-break is
/// still total so merges of adversarial or replayed traces stay
/// deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtomId {
    pub site: SiteIdx,
    pub yarn_index: u32,
    pub timestamp: Lamport,
}

impl AtomId {
    /// The sentinel id denoting "no cause" / "before the first element".
    pub const NONE: AtomId = AtomId {
        site: SiteIdx::NONE,
        yarn_index: 0,
        timestamp: Lamport::NONE,
    };

    pub fn is_none(&self) -> bool {
        return self.timestamp.is_none();
    }
}

impl PartialOrd for AtomId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        return Some(self.cmp(other));
    }
}

impl Ord for AtomId {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.timestamp.cmp(&other.timestamp) {
            Ordering::Equal => other.site.cmp(&self.site),
            ord => ord,
        }
    }
}

/// The kind of an atom, plus its priority for sibling ordering (§3).
/// Higher priority sorts first among siblings (§4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Delete,
    Char,
    Increment,
    String,
    Counter,
    List,
    Element,
    StrContainer,
}

impl Tag {
    pub fn priority(&self) -> i32 {
        match self {
            Tag::Delete => -1,
            Tag::Char | Tag::Increment | Tag::String | Tag::Counter | Tag::List => 0,
            Tag::Element => 1,
            Tag::StrContainer => 30,
        }
    }

    /// Whether `child` is a permitted child of `self` per the §3 table.
    /// `parent = None` means the child is being attached to the tree root.
    pub fn permits_child(parent: Option<Tag>, child: Tag) -> bool {
        match parent {
            None => matches!(child, Tag::String | Tag::Counter | Tag::List),
            Some(Tag::String) => matches!(child, Tag::Char | Tag::Delete),
            Some(Tag::Char) => matches!(child, Tag::Char | Tag::Delete),
            Some(Tag::Counter) => matches!(child, Tag::Increment | Tag::Delete),
            Some(Tag::Increment) => false,
            Some(Tag::List) => matches!(child, Tag::Element | Tag::Delete),
            Some(Tag::Element) => matches!(
                child,
                Tag::String | Tag::Counter | Tag::List | Tag::Element | Tag::Delete
            ),
            Some(Tag::Delete) => false,
            Some(Tag::StrContainer) => matches!(child, Tag::Char | Tag::Delete),
        }
    }
}

/// The payload carried by an atom. Only `Char` and `Increment` carry data;
/// other tags are structural markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payload {
    None,
    Char(char),
    Delta(i32),
}

/// One recorded operation in the causal tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    pub id: AtomId,
    pub cause: AtomId,
    pub tag: Tag,
    pub payload: Payload,
}

impl Atom {
    pub fn new(id: AtomId, cause: AtomId, tag: Tag, payload: Payload) -> Atom {
        return Atom {
            id,
            cause,
            tag,
            payload,
        };
    }
}

/// Sibling ordering (§4.1, §3 W3): descending by tag priority, ties broken
/// by descending [`AtomId`].
impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        return Some(self.cmp(other));
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.tag.priority().cmp(&other.tag.priority()) {
            Ordering::Equal => self.id.cmp(&other.id),
            ord => ord,
        }
    }
}
