use crate::Binding;
use core::{fmt, ops::Deref, ptr::NonNull};
use std::sync::Arc;

/// The task side of a by-reference capture.
///
/// A [`Tether<T, B>`] is created from a pinned [`Anchor`](crate::Anchor) and
/// points into the anchored value. It can be `'static` even when that value
/// borrows from the stack, which lets it cross [`std::thread::spawn`]. Every
/// access goes through [`Tether::borrow`], which fails once the anchor has
/// been severed or dropped.
pub struct Tether<T: ?Sized, B: Binding> {
    pub(crate) value: NonNull<T>,
    pub(crate) binding: Arc<B>,
    pub(crate) bound: bool,
}

pub struct Guard<'a, T: ?Sized, B: Binding> {
    value: &'a T,
    _guard: B::Guard<'a>,
}

// # Safety
// A `Tether<T, B>` only ever hands out `&T`, so it behaves like an `&T` across
// threads. The `Binding` is `Send + Sync` by definition.
unsafe impl<T: ?Sized + Sync, B: Binding> Send for Tether<T, B> {}
unsafe impl<T: ?Sized + Sync, B: Binding> Sync for Tether<T, B> {}

impl<T: ?Sized, B: Binding> Tether<T, B> {
    /// Borrows the anchored value.
    ///
    /// Returns [`None`] if the [`Anchor`](crate::Anchor) has been severed or
    /// dropped, or if this tether was created after the severance.
    pub fn borrow(&self) -> Option<Guard<'_, T, B>> {
        if !self.bound {
            return None;
        }
        let guard = self.binding.borrow()?;
        Some(Guard {
            // # Safety
            // The binding guarantees that the anchored value is alive and
            // immutable for as long as `guard` lives.
            value: unsafe { self.value.as_ref() },
            _guard: guard,
        })
    }

    pub fn is_bound(&self) -> bool {
        self.bound && self.binding.is_bound()
    }

    pub fn bindings(&self) -> usize {
        self.binding.bindings() as _
    }
}

impl<T: ?Sized, B: Binding> Clone for Tether<T, B> {
    fn clone(&self) -> Self {
        Self {
            value: self.value,
            binding: self.binding.clone(),
            bound: self.bound && self.binding.bind(),
        }
    }
}

impl<T: ?Sized, B: Binding> Drop for Tether<T, B> {
    fn drop(&mut self) {
        if self.bound {
            self.binding.unbind();
        }
    }
}

impl<T: ?Sized, B: Binding> fmt::Debug for Tether<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tether")
            .field("bound", &self.is_bound())
            .field("bindings", &self.bindings())
            .finish()
    }
}

impl<T: ?Sized, B: Binding> Deref for Guard<'_, T, B> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value
    }
}

impl<T: ?Sized, B: Binding> AsRef<T> for Guard<'_, T, B> {
    fn as_ref(&self) -> &T {
        self.value
    }
}
