//! AFL fuzz harness for the causal-tree merge algorithm.
//!
//! This harness tests the critical CRDT properties from §8:
//! 1. Convergence: replicas that see the same operations converge to the
//!    same snapshot.
//! 2. Merge idempotency: merging the same thing twice is a no-op.
//! 3. Weave invariants: every atom follows its cause; causal blocks stay
//!    contiguous.
//!
//! Model: each site edits its own replica and periodically forks or
//! broadcasts its state to other replicas.

use afl::fuzz;
use tapestry::replica::Replica;

const NUM_SITES: usize = 3;

#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    InsertChar { site: u8, pos_frac: u8, ch: u8 },
    DeleteAt { site: u8, pos_frac: u8 },
    Broadcast { from: u8, to: u8 },
    FullSync,
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        if bytes.is_empty() {
            return None;
        }
        let op_type = bytes[0] % 4;
        let rest = &bytes[1..];
        match op_type {
            0 if rest.len() >= 3 => {
                let op = FuzzOp::InsertChar {
                    site: rest[0] % NUM_SITES as u8,
                    pos_frac: rest[1],
                    ch: rest[2],
                };
                Some((op, &rest[3..]))
            }
            1 if rest.len() >= 2 => {
                let op = FuzzOp::DeleteAt {
                    site: rest[0] % NUM_SITES as u8,
                    pos_frac: rest[1],
                };
                Some((op, &rest[2..]))
            }
            2 if rest.len() >= 2 => {
                let op = FuzzOp::Broadcast {
                    from: rest[0] % NUM_SITES as u8,
                    to: rest[1] % NUM_SITES as u8,
                };
                Some((op, &rest[2..]))
            }
            3 => Some((FuzzOp::FullSync, rest)),
            _ => None,
        }
    }
}

fn full_sync(replicas: &mut [Replica]) {
    for i in 0..replicas.len() {
        for j in 0..replicas.len() {
            if i != j {
                let source = replicas[j].clone();
                replicas[i].merge(&source);
            }
        }
    }
}

fn assert_converged(replicas: &[Replica], label: &str) {
    let first = replicas[0].to_text();
    for (i, r) in replicas.iter().enumerate().skip(1) {
        assert_eq!(r.to_text(), first, "{label}: site {i} diverged from site 0");
    }
}

fn main() {
    fuzz!(|data: &[u8]| {
        let mut base = Replica::new();
        let mut replicas: Vec<Replica> = Vec::with_capacity(NUM_SITES);
        for _ in 1..NUM_SITES {
            replicas.push(base.fork().expect("fresh replica, sitemap has room"));
        }
        replicas.insert(0, base);

        let mut remaining = data;
        while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;
            match op {
                FuzzOp::InsertChar { site, pos_frac, ch } => {
                    let r = &mut replicas[site as usize];
                    let len = r.to_text().chars().count() as i64;
                    let pos = if len == 0 { -1 } else { (pos_frac as i64) % (len + 1) - 1 };
                    let c = char::from_u32(b'a' as u32 + (ch % 26) as u32).unwrap_or('a');
                    let _ = r.insert_char_at(c, pos);
                }
                FuzzOp::DeleteAt { site, pos_frac } => {
                    let r = &mut replicas[site as usize];
                    let len = r.to_text().chars().count() as i64;
                    if len > 0 {
                        let pos = (pos_frac as i64) % len;
                        let _ = r.delete_char_at(pos);
                    }
                }
                FuzzOp::Broadcast { from, to } => {
                    if from != to {
                        let source = replicas[from as usize].clone();
                        replicas[to as usize].merge(&source);
                    }
                }
                FuzzOp::FullSync => {
                    full_sync(&mut replicas);
                    assert_converged(&replicas, "mid-run full sync");
                }
            }
        }

        full_sync(&mut replicas);
        assert_converged(&replicas, "final full sync");

        for r in &replicas {
            let now = r.now();
            assert!(r.check_weft(&now).is_ok(), "now() must always be a valid weft");
        }
    });
}
