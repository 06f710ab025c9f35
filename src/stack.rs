//! Lock-free LIFO retirement stack.
//!
//! Each [`RcuCell`](crate::RcuCell) owns two of these: `current`, which
//! writers push onto as they retire displaced payloads, and `final`,
//! which accumulates everything `current` held at the start of the
//! previous epoch. Pushing is safe under unbounded concurrent producers.
//! Draining is safe only when the caller holds exclusive access to the
//! chain being drained — in this crate that precondition is upheld by the
//! `epoch_lock` interlock in [`cell`](crate::cell), never by the stack
//! itself.
//!
//! No ABA protection is needed: nodes popped off a chain by `drain_chain`
//! are never observed by a concurrent `push`, because pushing only ever
//! targets `current`, and `current`'s head is only ever swapped out (handed
//! off for draining) by the single thread that currently owns `epoch_lock`.

use crate::atomic::{AtomicPtr, Ordering};
use crate::payload::PayloadRef;
use std::ptr;

pub(crate) struct RetirementNode<T> {
    /// `None` marks the sentinel every non-empty chain is terminated by.
    payload: Option<PayloadRef<T>>,
    next: *mut RetirementNode<T>,
}

/// A Treiber-style lock-free LIFO of retired [`PayloadRef`] handles.
pub(crate) struct RetirementStack<T> {
    head: AtomicPtr<RetirementNode<T>>,
}

impl<T> RetirementStack<T> {
    /// Build a new, empty stack: just a sentinel node, so `push` never has
    /// to special-case a null head.
    pub(crate) fn new() -> Self {
        RetirementStack {
            head: AtomicPtr::new(Self::new_sentinel()),
        }
    }

    fn new_sentinel() -> *mut RetirementNode<T> {
        Box::into_raw(Box::new(RetirementNode {
            payload: None,
            next: ptr::null_mut(),
        }))
    }

    /// Push a retired payload onto this stack. Lock-free, safe under any
    /// number of concurrent pushers.
    pub(crate) fn push(&self, payload: PayloadRef<T>) {
        let node = Box::into_raw(Box::new(RetirementNode {
            payload: Some(payload),
            next: ptr::null_mut(),
        }));

        let mut observed = self.head.load(Ordering::Relaxed);
        loop {
            // SAFETY: `node` was just allocated by us and is not yet
            // published; writing to it is exclusive.
            unsafe {
                (*node).next = observed;
            }
            match self
                .head
                .compare_exchange_weak(observed, node, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                // Re-read the observed head from the CAS's own report and
                // retry with `node.next` re-linked to it.
                Err(actual) => observed = actual,
            }
        }
    }

    /// Atomically replace this stack's head with a fresh sentinel, handing
    /// the previous chain (including its own sentinel, at the tail) back to
    /// the caller. Used by the rotator to retarget `current` at the start
    /// of a rotation.
    pub(crate) fn take_and_replace_with_sentinel(&self) -> *mut RetirementNode<T> {
        let sentinel = Self::new_sentinel();
        self.head.swap(sentinel, Ordering::Relaxed)
    }

    /// Atomically install `new_head` as this stack's head, handing back
    /// whatever chain was previously there. Used by the rotator to move
    /// `current`'s outgoing chain onto `final`, capturing `final`'s
    /// previous (now two-epochs-old) chain for drain.
    pub(crate) fn install(&self, new_head: *mut RetirementNode<T>) -> *mut RetirementNode<T> {
        self.head.swap(new_head, Ordering::Relaxed)
    }

    /// Walk an exclusively-owned chain, releasing every payload and
    /// freeing every node, sentinel included.
    ///
    /// # Safety (upheld by construction, not by the type system)
    /// `head` must not be concurrently reachable from any `push` on the
    /// stack it came from; the whole point of `epoch_lock` is to guarantee
    /// that by the time a chain reaches here, it has already been rotated
    /// out of `current` and therefore out of reach of `push`.
    pub(crate) fn drain_chain(head: *mut RetirementNode<T>) {
        let mut cur = head;
        while !cur.is_null() {
            // SAFETY: exclusive ownership per the contract above.
            let node = unsafe { Box::from_raw(cur) };
            cur = node.next;
            // Dropping `node` here drops `node.payload`, which is exactly
            // "release" for any non-sentinel entry.
        }
    }

    /// Count non-sentinel entries currently on this stack. Test-only: not
    /// part of the external interface, used to check that rotation has
    /// actually drained everything it should have.
    #[cfg(test)]
    pub(crate) fn non_sentinel_len(&self) -> usize {
        let mut n = 0;
        let mut cur = self.head.load(Ordering::Relaxed);
        while !cur.is_null() {
            // SAFETY: single-threaded test context, chain is well-formed.
            let node = unsafe { &*cur };
            if node.payload.is_some() {
                n += 1;
            }
            cur = node.next;
        }
        n
    }
}

impl<T> Drop for RetirementStack<T> {
    fn drop(&mut self) {
        let head = self.head.load(Ordering::Relaxed);
        Self::drain_chain(head);
    }
}
