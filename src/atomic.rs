//! Allocation-light, thread-safe [`Binding`] using an [`AtomicU32`] as a
//! tether counter.
//!
//! Severing an [`Atomic`] anchor blocks (through `atomic-wait`) until every
//! [`Tether`](crate::Tether) bound to it has been dropped. In exchange,
//! [`Tether::borrow`](crate::Tether::borrow) never fails for a tether that was
//! bound before the severance and borrows cost a single load.
//!
//! # Trade-offs
//!
//! - **Pros:**
//!   - The captured reference is valid for the whole life of every tether.
//!   - No lock is taken to borrow.
//! - **Cons:**
//!   - Dropping the anchor while a tether is kept alive (in a detached task,
//!     in a `static`, through [`core::mem::forget`] or simply by the thread
//!     that drops the anchor) blocks forever.
//!
//! # Usage
//!
//! ```
//! use tether::{Anchor, atomic::Atomic, launch};
//!
//! let numbers = vec![1, 2, 3];
//! let mut task = Anchor::<_, Atomic>::with(&numbers, |anchor| {
//!     let tether = anchor.tether_target();
//!     // The task may outlive this closure: the anchor waits for its tether.
//!     launch(move || tether.borrow().map(|numbers| numbers.iter().sum::<i32>()))
//! });
//! assert_eq!(task.join().unwrap(), Some(6));
//! ```

use crate::Binding;
use atomic_wait::{wait, wake_all};
use core::sync::atomic::{AtomicU32, Ordering};

const SEVERED: u32 = u32::MAX;

/// The `atomic` [`Binding`] variant.
///
/// See the [module-level documentation](self) for more details.
#[derive(Debug)]
#[repr(transparent)]
pub struct Atomic(AtomicU32);

pub type Anchor<T> = crate::Anchor<T, Atomic>;
pub type Tether<T> = crate::Tether<T, Atomic>;
pub type Guard<'a, T> = crate::Guard<'a, T, Atomic>;

unsafe impl Binding for Atomic {
    type Guard<'a> = ();

    fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    fn bind(&self) -> bool {
        let mut value = self.0.load(Ordering::Relaxed);
        loop {
            if value == SEVERED {
                break false;
            }
            assert!(value < SEVERED - 1);
            match self
                .0
                .compare_exchange_weak(value, value + 1, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => break true,
                Err(current) => value = current,
            }
        }
    }

    fn unbind(&self) {
        if self.0.fetch_sub(1, Ordering::Release) == 1 {
            wake_all(&self.0);
        }
    }

    fn borrow(&self) -> Option<Self::Guard<'_>> {
        // A bound tether keeps the count above zero, so it can not be
        // severed here.
        if self.0.load(Ordering::Relaxed) == SEVERED {
            None
        } else {
            Some(())
        }
    }

    fn sever<const FORCE: bool>(&self) -> bool {
        loop {
            match self
                .0
                .compare_exchange(0, SEVERED, Ordering::Acquire, Ordering::Relaxed)
            {
                Ok(_) | Err(SEVERED) => break true,
                Err(value) if FORCE => wait(&self.0, value),
                Err(_) => break false,
            }
        }
    }

    fn bindings(&self) -> u32 {
        match self.0.load(Ordering::Relaxed) {
            SEVERED => 0,
            value => value,
        }
    }

    fn is_bound(&self) -> bool {
        self.0.load(Ordering::Acquire) != SEVERED
    }
}
