//! The caller side of a by-reference capture.
//!
//! An [`Anchor<T, B>`] owns a value `T` and must be pinned before it can hand
//! out [`Tether`]s to it. Pinning guarantees that the anchor's [`Drop`] runs
//! before its memory is reused, and that drop severs every tether through
//! the [`Binding`] `B`:
//!
//! - with [`Lock`](crate::lock::Lock), severance waits for in-progress
//!   borrows and later borrows fail with
//!   [`Error::DanglingCapture`](crate::Error::DanglingCapture);
//! - with [`Atomic`](crate::atomic::Atomic), severance waits until every
//!   tether is dropped, so borrows never fail.
//!
//! A `'static` value can be anchored with [`Anchor::new`] and pinned
//! anywhere. A value that borrows from the stack (very often a plain
//! `&'a U`) can only be anchored for the duration of [`Anchor::with`], which
//! keeps the anchor on its own stack frame so that it can not be leaked.
//!
//! ```
//! use std::sync::Mutex;
//! use tether::{Anchor, launch_member, lock::Lock};
//!
//! let name = Mutex::new(String::from("Main"));
//! Anchor::<_, Lock>::with(&name, |anchor| {
//!     let mut task = launch_member(
//!         anchor.tether_target(),
//!         |name: &Mutex<String>, suffix: &str| name.lock().unwrap().push_str(suffix),
//!         " (from Thread)",
//!     );
//!     task.join().unwrap();
//! });
//! assert_eq!(name.into_inner().unwrap(), "Main (from Thread)");
//! ```

use crate::{Binding, shroud::Shroud, tether::Tether};
use core::{
    fmt,
    marker::PhantomPinned,
    mem::ManuallyDrop,
    ops::Deref,
    pin::{Pin, pin},
    ptr::{NonNull, drop_in_place, read},
};
use std::sync::Arc;
use tracing::trace;

pub struct Anchor<T, B: Binding> {
    _marker: PhantomPinned,
    binding: Arc<B>,
    value: T,
}

impl<T: 'static, B: Binding> Anchor<T, B> {
    /// Anchors a `'static` value. Use [`Anchor::with`] to anchor a value that
    /// borrows from the stack.
    pub fn new(value: T) -> Self {
        Self::unpinned(value)
    }
}

impl<T, B: Binding> Anchor<T, B> {
    /// Anchors `value` for the duration of `function`. Every tether is
    /// severed when `function` returns or unwinds, before `value` can be
    /// dropped.
    pub fn with<R>(value: T, function: impl FnOnce(Pin<&Self>) -> R) -> R {
        let anchor = pin!(Self::unpinned(value));
        function(anchor.as_ref())
    }

    fn unpinned(value: T) -> Self {
        Self {
            value,
            binding: Arc::new(B::new()),
            _marker: PhantomPinned,
        }
    }

    /// Creates a [`Tether`] to the anchored value itself.
    pub fn tether(self: Pin<&Self>) -> Tether<T, B> {
        let value = NonNull::from(&self.get_ref().value);
        self.bind(value)
    }

    /// Creates a [`Tether`] to the target of the anchored value. This is the
    /// usual way to tether a `&'a U` borrowed from the stack into a `'static`
    /// `Tether<U, B>`.
    pub fn tether_target(self: Pin<&Self>) -> Tether<T::Target, B>
    where
        T: Deref,
    {
        let value = NonNull::from(self.get_ref().value.deref());
        self.bind(value)
    }

    /// Creates a [`Tether`] to the anchored value erased as `S` (usually a
    /// `dyn Trait`), which drops any lifetime `T` carries.
    pub fn tether_as<S: Shroud<T> + ?Sized>(self: Pin<&Self>) -> Tether<S, B> {
        let value = S::shroud(NonNull::from(&self.get_ref().value));
        self.bind(value)
    }

    /// Returns the number of live bound tethers.
    pub fn bindings(&self) -> usize {
        self.binding.bindings() as _
    }

    /// Returns `false` once the anchor has been severed.
    pub fn is_bound(&self) -> bool {
        self.binding.is_bound()
    }

    /// Returns `true` if `tether` was created from this anchor.
    pub fn owns<S: ?Sized>(&self, tether: &Tether<S, B>) -> bool {
        Arc::ptr_eq(&self.binding, &tether.binding)
    }

    /// Disposes of `tether` if it was created from this anchor and returns
    /// the number of tethers still bound. Otherwise, gives it back.
    pub fn redeem<S: ?Sized>(&self, tether: Tether<S, B>) -> Result<usize, Tether<S, B>> {
        if self.owns(&tether) {
            drop(tether);
            Ok(self.bindings())
        } else {
            Err(tether)
        }
    }

    /// Severs every tether to this anchor. Blocks as described by the
    /// [`Binding`] `B`.
    pub fn sever(&self) -> bool {
        trace!(bindings = self.bindings(), "severing anchor");
        self.binding.sever::<true>()
    }

    /// Severs every tether to this anchor if it can be done without
    /// blocking.
    pub fn try_sever(&self) -> bool {
        self.binding.sever::<false>()
    }

    /// Severs the anchor (blocking if required) and gives back the value.
    pub fn into_inner(this: Pin<Box<Self>>) -> T {
        this.sever();
        // # Safety
        // The anchor is severed so no tether can reach `value` anymore; it is
        // now free to move.
        let this = unsafe { Pin::into_inner_unchecked(this) };
        let mut this = ManuallyDrop::new(*this);
        unsafe { drop_in_place(&mut this.binding) };
        unsafe { read(&this.value) }
    }

    fn bind<S: ?Sized>(self: Pin<&Self>, value: NonNull<S>) -> Tether<S, B> {
        Tether {
            value,
            binding: self.binding.clone(),
            bound: self.binding.bind(),
        }
    }
}

impl<T, B: Binding> Deref for Anchor<T, B> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug, B: Binding> fmt::Debug for Anchor<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anchor")
            .field("value", &self.value)
            .field("bound", &self.is_bound())
            .field("bindings", &self.bindings())
            .finish()
    }
}

impl<T, B: Binding> Drop for Anchor<T, B> {
    fn drop(&mut self) {
        trace!(bindings = self.bindings(), "dropping anchor");
        self.binding.sever::<true>();
    }
}
