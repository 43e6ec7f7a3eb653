//! `RwLock`-based, thread-safe [`Binding`] that detects dangling captures.
//!
//! Severing a [`Lock`] anchor takes the write side of its lock: it waits for
//! the borrows that are in progress, then flips the binding to severed. From
//! then on, every [`Tether::borrow`](crate::Tether::borrow) returns [`None`]
//! and every tethered member task fails with
//! [`Error::DanglingCapture`](crate::Error::DanglingCapture) instead of
//! reaching freed memory.
//!
//! Tethers may outlive their anchor. Note that severing from a thread that is
//! itself holding a [`Guard`](crate::Guard) of the same anchor deadlocks.

use crate::Binding;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{RwLock, RwLockReadGuard, TryLockError};

/// The `lock` [`Binding`] variant.
///
/// See the [module-level documentation](self) for more details.
#[derive(Debug)]
pub struct Lock {
    bound: RwLock<bool>,
    severed: AtomicBool,
    bindings: AtomicU32,
}

pub type Anchor<T> = crate::Anchor<T, Lock>;
pub type Tether<T> = crate::Tether<T, Lock>;
pub type Guard<'a, T> = crate::Guard<'a, T, Lock>;

unsafe impl Binding for Lock {
    type Guard<'a> = RwLockReadGuard<'a, bool>;

    fn new() -> Self {
        Self {
            bound: RwLock::new(true),
            severed: AtomicBool::new(false),
            bindings: AtomicU32::new(0),
        }
    }

    fn bind(&self) -> bool {
        if self.severed.load(Ordering::Acquire) {
            return false;
        }
        let value = self.bindings.fetch_add(1, Ordering::Relaxed);
        assert!(value < u32::MAX - 1);
        true
    }

    fn unbind(&self) {
        let value = self.bindings.fetch_sub(1, Ordering::Relaxed);
        debug_assert!(value > 0);
    }

    fn borrow(&self) -> Option<Self::Guard<'_>> {
        // A poisoned lock only means that a borrower panicked; the flag itself
        // is always consistent.
        let guard = match self.bound.read() {
            Ok(guard) => guard,
            Err(error) => error.into_inner(),
        };
        if *guard { Some(guard) } else { None }
    }

    fn sever<const FORCE: bool>(&self) -> bool {
        let mut guard = if FORCE {
            match self.bound.write() {
                Ok(guard) => guard,
                Err(error) => error.into_inner(),
            }
        } else {
            match self.bound.try_write() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(error)) => error.into_inner(),
                Err(TryLockError::WouldBlock) => return false,
            }
        };
        *guard = false;
        self.severed.store(true, Ordering::Release);
        true
    }

    fn bindings(&self) -> u32 {
        self.bindings.load(Ordering::Relaxed)
    }

    fn is_bound(&self) -> bool {
        !self.severed.load(Ordering::Acquire)
    }
}
