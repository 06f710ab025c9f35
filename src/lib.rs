//! A read-biased concurrent single-value container based on Read-Copy-Update.
//!
//! [`RcuCell<T>`] holds one logical value at a time. Readers call
//! [`RcuCell::read`] to obtain a cheap, reference-counted snapshot: one
//! relaxed increment to announce presence, one relaxed load of the live
//! pointer, one relaxed increment of that payload's reference count, then
//! a release decrement to announce departure. A writer calls
//! [`RcuCell::update`] to publish a new value with a single CAS loop.
//!
//! The value displaced by an update is not freed immediately. It is pushed
//! onto a retirement stack and destroyed only once a reader notices it was
//! the last one inside the "publish window" and rotates two retirement
//! stacks through each other — which buys one full epoch of delay before
//! anything is actually freed, enough to guarantee no reader can still be
//! holding a pointer to it.
//!
//! There are no mutexes and no condition variables anywhere in this crate:
//! reads are wait-free, updates are lock-free (CAS retry only), and
//! reclamation happens opportunistically whenever a reader happens to be
//! the one to bring the reader count back to zero.
//!
//! ```
//! use rcu_cell::RcuCell;
//!
//! let cell = RcuCell::new(vec![0i32; 4]);
//!
//! let snapshot = cell.read();
//! assert_eq!(&*snapshot, &[0, 0, 0, 0]);
//! drop(snapshot);
//!
//! cell.update(vec![1, 2, 3, 4]);
//! assert_eq!(&*cell.read(), &[1, 2, 3, 4]);
//!
//! cell.dispose();
//! ```
//!
//! The only orderings that matter for correctness are the release/acquire
//! pair around a payload's reference count ([`payload`]) and the
//! release/acquire pair around the epoch-rotation lock ([`cell`]).
//! Everything touching the live pointer itself can be relaxed, because
//! payload lifetime is carried entirely by reference counting plus the
//! two-epoch delay, never by pointer visibility alone.

#![warn(missing_docs)]

mod payload;
mod stack;
mod cell;

pub use cell::RcuCell;
pub use payload::PayloadRef;

#[cfg(loom)]
pub(crate) use loom::sync::atomic;
#[cfg(not(loom))]
pub(crate) use std::sync::atomic;
