// Quick benchmark for getting summary results on replica operations.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tapestry::replica::Replica;

fn time_ops<F: Fn() -> usize>(f: F, iterations: usize) -> f64 {
    for _ in 0..3 {
        let _ = f();
    }
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = f();
    }
    let elapsed = start.elapsed();
    return elapsed.as_nanos() as f64 / iterations as f64;
}

fn main() {
    let content: Vec<u8> = (0..100).map(|i| b'a' + (i % 26)).collect();

    let seq_fwd = time_ops(
        || {
            let mut r = Replica::new();
            for byte in &content {
                r.insert_char(*byte as char).unwrap();
            }
            r.weave().len()
        },
        100,
    );
    println!("sequential forward (100 chars): {:.1} ns/op", seq_fwd);

    let random_ins = time_ops(
        || {
            let mut r = Replica::new();
            let mut rng = StdRng::seed_from_u64(42);
            for byte in &content {
                let len = r.to_text().chars().count() as i64;
                let pos = if len == 0 { -1 } else { rng.gen_range(0..=len) - 1 };
                r.insert_char_at(*byte as char, pos).unwrap();
            }
            r.weave().len()
        },
        100,
    );
    println!("random inserts (100 chars): {:.1} ns/op", random_ins);

    let merge_cost = time_ops(
        || {
            let mut base = Replica::new();
            for byte in content.iter().take(50) {
                base.insert_char(*byte as char).unwrap();
            }
            let mut other = base.fork().unwrap();
            for byte in content.iter().skip(50) {
                other.insert_char(*byte as char).unwrap();
            }
            base.merge(&other);
            base.weave().len()
        },
        100,
    );
    println!("fork + 50 edits + merge: {:.1} ns/op", merge_cost);
}
