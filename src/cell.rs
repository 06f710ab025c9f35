//! The user-facing RCU container.

use crate::atomic::{self, AtomicBool, AtomicPtr, AtomicUsize, Ordering};
use crate::payload::PayloadRef;
use crate::stack::RetirementStack;
use std::ptr;

/// A read-biased concurrent single-value container.
///
/// Holds one logical value of type `T`. Any number of threads may call
/// [`read`](RcuCell::read) concurrently without blocking each other or the
/// writer; a single logical writer calls [`update`](RcuCell::update) to
/// publish a new value. Values displaced by `update` are freed once it is
/// safe to do so, which [`read`](RcuCell::read) itself determines and acts
/// on — there is no background thread and nothing to poll.
///
/// `RcuCell` is not itself a mutex substitute for *writers*: if more than
/// one thread calls `update` concurrently, both succeed (the CAS simply
/// retries), but callers that need writes to be linearized with respect
/// to each other's side effects must serialize their own calls to
/// `update`, exactly as the CAS-retry writer model in a real RCU
/// implementation requires.
pub struct RcuCell<T> {
    /// The currently published payload. Never null during normal
    /// operation; only set to null transiently inside `Drop`/`dispose`.
    data_ptr: AtomicPtr<crate::payload::PayloadInner<T>>,
    /// Count of readers currently inside the publish-window (between the
    /// increment and decrement in `read`).
    readers: AtomicUsize,
    /// `true` while some thread owns the right to rotate epochs.
    epoch_lock: AtomicBool,
    /// Retirees pushed here by the writer during the current epoch.
    current: RetirementStack<T>,
    /// Retirees that have survived one full rotation and are eligible for
    /// destruction at the next one.
    final_stack: RetirementStack<T>,
    /// Count of elections this cell has won. Test-only: lets tests check
    /// rotation fairness (bounded, monotone) under real concurrency.
    #[cfg(test)]
    rotations: AtomicUsize,
}

// SAFETY: exactly the `Writer`/`Reader` reasoning from the SPMC slot this
// crate is descended from: `RcuCell<T>` is safe to share across threads
// whenever `T` itself is, because every access to the payload goes through
// a `PayloadRef<T>` that already requires `T: Send + Sync` to cross a
// thread boundary.
unsafe impl<T: Send + Sync> Send for RcuCell<T> {}
unsafe impl<T: Send + Sync> Sync for RcuCell<T> {}

impl<T> RcuCell<T> {
    /// Construct a new cell publishing `initial`.
    pub fn new(initial: T) -> Self {
        let ptr = PayloadRef::new(initial).into_raw();
        RcuCell {
            data_ptr: AtomicPtr::new(ptr),
            readers: AtomicUsize::new(0),
            epoch_lock: AtomicBool::new(false),
            current: RetirementStack::new(),
            final_stack: RetirementStack::new(),
            #[cfg(test)]
            rotations: AtomicUsize::new(0),
        }
    }

    /// Take a snapshot of the currently published value.
    ///
    /// Wait-free except for the (bounded, amortized) work done by whichever
    /// reader happens to be elected rotator. The returned handle keeps its
    /// payload alive until dropped (or [`PayloadRef::release`]d); there is
    /// no requirement to drop it promptly, but retirement stacks will grow
    /// unboundedly if readers overlap forever (see module docs).
    pub fn read(&self) -> PayloadRef<T> {
        // Step 1: announce entry into the publish-window.
        self.readers.fetch_add(1, Ordering::Relaxed);

        // Step 2: snapshot the live payload and acquire a reference to it.
        let ptr = self.data_ptr.load(Ordering::Relaxed);
        // SAFETY: `data_ptr` is non-null and live for the duration of the
        // publish-window we just entered; a writer can displace it but
        // cannot free it until `readers` returns to zero and the rotator
        // drains it two epochs later.
        let snapshot = unsafe { PayloadRef::acquire_from_raw(ptr) };

        // Step 3: announce departure. `prev_readers` is the count observed
        // immediately before this decrement.
        let prev_readers = self.readers.fetch_sub(1, Ordering::Release);

        // Step 4: if we were the last reader in the window and we win the
        // rotator election, rotate epochs.
        if prev_readers == 1
            && self
                .epoch_lock
                .compare_exchange(false, true, Ordering::Release, Ordering::Relaxed)
                .is_ok()
        {
            self.rotate_epoch();
        }

        // Step 5.
        snapshot
    }

    /// Run one epoch rotation. Called with `epoch_lock` held (as `true`)
    /// by the caller, who is solely responsible for releasing it again.
    fn rotate_epoch(&self) {
        // Synchronize with every reader's release-decrement of `readers`
        // and with any writer's relaxed push onto `current` that happened
        // before this reader observed `readers` hit zero.
        atomic::fence(Ordering::Acquire);

        let c_old = self.current.take_and_replace_with_sentinel();
        let f_old = self.final_stack.install(c_old);

        // `f_old` was `current`'s chain as of the *previous* rotation: by
        // construction no reader that began its publish-window before this
        // rotation can still be looking at any payload retired into it, so
        // draining now is sound.
        RetirementStack::drain_chain(f_old);

        #[cfg(test)]
        self.rotations.fetch_add(1, Ordering::Relaxed);

        self.epoch_lock.store(false, Ordering::Release);
    }

    /// Publish `new_value`, displacing and retiring whatever was live
    /// before.
    ///
    /// Lock-free: the only contention is a CAS retry loop against other
    /// concurrent `update` callers. The displaced payload is not dropped
    /// here — it is pushed onto the `current` retirement stack and will be
    /// freed once a reader rotates it through to `final` and drains it.
    pub fn update(&self, new_value: T) {
        let new_ptr = PayloadRef::new(new_value).into_raw();

        let mut old = self.data_ptr.load(Ordering::Relaxed);
        loop {
            match self
                .data_ptr
                .compare_exchange_weak(old, new_ptr, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(actual) => old = actual,
            }
        }

        // SAFETY: we just won the CAS that displaced `old`, so we are the
        // unique owner of the reference-count unit it represented.
        let old_ref = unsafe { PayloadRef::from_raw_owned(old) };
        self.current.push(old_ref);
    }

    /// Tear the cell down: release the live payload and drain both
    /// retirement stacks.
    ///
    /// The caller must ensure no `read` or `update` call on this cell is
    /// concurrently in flight — this is not checked in release builds (see
    /// the crate's error-handling design), only asserted in debug builds.
    /// Equivalent to dropping the cell; spelled out as its own method so
    /// teardown can be a deliberate, visible step at the call site.
    pub fn dispose(self) {
        drop(self)
    }

    /// Number of entries awaiting drain across both retirement stacks.
    /// Test-only: lets tests confirm rotation actually drains down to
    /// "only sentinels remain" (property 3 in the design notes).
    #[cfg(test)]
    pub(crate) fn retired_len(&self) -> usize {
        self.current.non_sentinel_len() + self.final_stack.non_sentinel_len()
    }

    /// Number of rotation elections this cell has won so far. Test-only.
    #[cfg(test)]
    pub(crate) fn rotation_count(&self) -> usize {
        self.rotations.load(Ordering::Relaxed)
    }
}

impl<T> Drop for RcuCell<T> {
    fn drop(&mut self) {
        debug_assert_eq!(
            self.readers.load(Ordering::Relaxed),
            0,
            "RcuCell dropped while a reader was still inside a publish-window"
        );

        let ptr = self.data_ptr.swap(ptr::null_mut(), Ordering::Relaxed);
        if !ptr.is_null() {
            // SAFETY: `data_ptr` owned exactly one reference-count unit.
            drop(unsafe { PayloadRef::from_raw_owned(ptr) });
        }

        // `current` and `final_stack` drain themselves via their own
        // `Drop` impls immediately after this function returns.
    }
}
