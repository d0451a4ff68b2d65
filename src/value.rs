//! Snapshot values: the concrete rendering of a weave subtree (§4.6).

use serde::{Deserialize, Serialize};

use crate::atom::{Atom, Payload, Tag};
use crate::weave::Weave;

/// The rendered value of a typed register.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No live typed child was found under the register (§4.6).
    Absent,
    Str(String),
    Counter(i64),
    List(Vec<Value>),
}

/// Render the typed atom at `index` into a [`Value`] (§4.6). `index` must
/// point at a `String`, `Counter`, or `List` atom (or `StrContainer`, for
/// the nested string-container leaves under a list element).
pub fn render(weave: &Weave, index: usize) -> Value {
    let atom = match weave.get(index) {
        Some(a) => a,
        None => return Value::Absent,
    };
    if weave.is_deleted(index) {
        return Value::Absent;
    }
    match atom.tag {
        Tag::String | Tag::StrContainer => render_string(weave, index),
        Tag::Counter => render_counter(weave, index),
        Tag::List => render_list(weave, index),
        _ => Value::Absent,
    }
}

/// Chars chain off one another (a char's permitted children are `char` and
/// `delete`, per §3's tag table), so the visible text is not the direct
/// children of the string root but every live `char` atom within its whole
/// causal block, in weave order -- the weave's W1-W3 ordering already
/// places them left-to-right.
fn render_string(weave: &Weave, index: usize) -> Value {
    let block_len = weave.causal_block_len(index);
    let mut s = String::new();
    for offset in 1..block_len {
        let i = index + offset;
        let atom = weave.get(i).expect("within causal block");
        if atom.tag == Tag::Char && !weave.is_deleted(i) {
            if let Payload::Char(c) = atom.payload {
                s.push(c);
            }
        }
    }
    return Value::Str(s);
}

fn render_counter(weave: &Weave, index: usize) -> Value {
    let mut total: i64 = 0;
    weave.walk_children(index, |i, child: &Atom| {
        if child.tag == Tag::Increment && !weave.is_deleted(i) {
            if let Payload::Delta(d) = child.payload {
                total += d as i64;
            }
        }
        return true;
    });
    return Value::Counter(total);
}

fn render_list(weave: &Weave, index: usize) -> Value {
    let mut elements = Vec::new();
    weave.walk_children(index, |i, child: &Atom| {
        if child.tag == Tag::Element && !weave.is_deleted(i) {
            elements.push(render_element(weave, i));
        }
        return true;
    });
    return Value::List(elements);
}

/// An element renders as the first non-deleted typed child it has, or
/// `Absent` if none exists (§4.6, §9 container deletion semantics).
fn render_element(weave: &Weave, index: usize) -> Value {
    let mut result = Value::Absent;
    weave.walk_children(index, |i, child: &Atom| {
        let is_typed = matches!(
            child.tag,
            Tag::String | Tag::Counter | Tag::List | Tag::StrContainer
        );
        if is_typed && !weave.is_deleted(i) {
            result = render(weave, i);
            return false;
        }
        return true;
    });
    return result;
}

impl Value {
    /// Convenience projection: renders a `Str` value as plain text, and
    /// anything else as an empty string (§6 `to-string`).
    pub fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{AtomId, Lamport};
    use crate::site::SiteIdx;

    fn mk(idx: u32, ts: u32, cause: AtomId, tag: Tag, payload: Payload) -> Atom {
        return Atom::new(
            AtomId {
                site: SiteIdx::new(0),
                yarn_index: idx,
                timestamp: Lamport(ts),
            },
            cause,
            tag,
            payload,
        );
    }

    #[test]
    fn renders_string_skipping_deleted_chars() {
        let mut weave = Weave::new();
        let root = mk(0, 1, AtomId::NONE, Tag::String, Payload::None);
        let a = mk(1, 2, root.id, Tag::Char, Payload::Char('a'));
        let b = mk(2, 3, a.id, Tag::Char, Payload::Char('b'));
        let del_b = mk(3, 4, b.id, Tag::Delete, Payload::None);
        weave.push(root);
        weave.push(a);
        weave.push(b);
        weave.push(del_b);

        assert_eq!(render(&weave, 0), Value::Str("a".to_string()));
    }

    #[test]
    fn renders_counter_as_sum() {
        let mut weave = Weave::new();
        let root = mk(0, 1, AtomId::NONE, Tag::Counter, Payload::None);
        let inc1 = mk(1, 2, root.id, Tag::Increment, Payload::Delta(5));
        let inc2 = mk(2, 3, root.id, Tag::Increment, Payload::Delta(-2));
        weave.push(root);
        weave.push(inc1);
        weave.push(inc2);

        assert_eq!(render(&weave, 0), Value::Counter(3));
    }

    #[test]
    fn deleted_register_renders_absent() {
        let mut weave = Weave::new();
        let root = mk(0, 1, AtomId::NONE, Tag::String, Payload::None);
        let del = mk(1, 2, root.id, Tag::Delete, Payload::None);
        weave.push(root);
        weave.push(del);

        assert_eq!(render(&weave, 0), Value::Absent);
    }
}
