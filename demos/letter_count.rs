//! Twenty-six threads, one per lowercase letter, each bump their own slot
//! in a shared 26-`i32` array 1000 times: read the current array, copy it,
//! increment their slot, publish the copy. Illustrative only — not part of
//! the crate's contract (see the crate's design document).

use rcu_cell::RcuCell;
use std::thread;

const ITERATIONS: usize = 1000;

fn main() {
    let cell = RcuCell::new([0i32; 26]);

    println!("spawning threads...");
    thread::scope(|scope| {
        for i in 0..26 {
            let cell = &cell;
            scope.spawn(move || {
                for _ in 0..ITERATIONS {
                    let snapshot = cell.read();
                    let mut next = *snapshot;
                    snapshot.release();
                    next[i] += 1;
                    cell.update(next);
                }
            });
        }
    });
    println!("joined threads.");

    println!("final data");
    let final_snapshot = cell.read();
    for (i, count) in final_snapshot.iter().enumerate() {
        let letter = (b'a' + i as u8) as char;
        println!("{letter}: {count}");
    }
    final_snapshot.release();

    cell.dispose();
}
