use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Wraps a value and decrements a shared counter exactly once when dropped,
/// having incremented it exactly once on construction. A test that drives
/// an `RcuCell<Tracked<T>>` through some sequence of reads/updates/dispose
/// and then observes `live.load() == 0` has confirmed every payload it ever
/// published was freed exactly once, with nothing leaked and nothing freed
/// twice.
pub struct Tracked<T> {
    pub value: T,
    live: Arc<AtomicUsize>,
}

impl<T> Tracked<T> {
    pub fn new(value: T, live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Tracked {
            value,
            live: live.clone(),
        }
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        let prev = self.live.fetch_sub(1, Ordering::SeqCst);
        assert!(prev > 0, "Tracked value dropped more times than constructed");
    }
}
