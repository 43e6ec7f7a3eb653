//! Member dispatch: bind a target object, a method and its arguments into a
//! task.
//!
//! The ownership mode of the target is never inferred from the shape of an
//! argument. It is stated by the wrapper the caller chooses:
//!
//! | Wrapper                     | [`Mode`]         | The task sees                                 |
//! |-----------------------------|------------------|-----------------------------------------------|
//! | [`ByValue<T>`]              | [`Mode::Copy`]   | its own copy, taken at launch time            |
//! | [`ByRef<'a, T>`]            | [`Mode::Borrow`] | the caller's storage (scoped tasks only)      |
//! | [`Tether<T, B>`](crate::Tether) | [`Mode::Borrow`] | the caller's storage, checked at runtime  |
//! | [`ByShared<T>`]             | [`Mode::Shared`] | an [`Arc<T>`] kept alive until the task ends  |
//!
//! Every mode but [`Mode::Copy`] lets several tasks reach the same object at
//! once. The `Sync` bound on those targets means concurrent mutation must go
//! through a `Mutex`, an atomic or another synchronized type. Only a
//! [`ByValue`] target implements [`TargetMut`], which lets the method take
//! `&mut self` on the task's own copy.

use crate::{
    error::{Error, Result},
    tether::Tether,
    Binding,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Copy,
    Borrow,
    Shared,
}

#[rustversion::attr(
    since(1.78),
    diagnostic::on_unimplemented(
        message = "`{Self}` is not a task target",
        note = "wrap the object in `ByValue`, `ByRef`, `ByShared` or a `Tether` to choose how the task reaches it"
    )
)]
pub trait Target: Send {
    type Object: ?Sized;
    const MODE: Mode;

    /// Calls `method` with the target object. Fails if the object can no
    /// longer be reached.
    fn invoke<R, F: FnOnce(&Self::Object) -> R>(self, method: F) -> Result<R>;
}

/// A [`Target`] that the task owns outright, so its method may take
/// `&mut self`. Mutations only ever reach the task's own copy.
#[rustversion::attr(
    since(1.78),
    diagnostic::on_unimplemented(
        message = "`{Self}` can not be mutated by a task",
        note = "only a `ByValue` target gives the task its own copy to mutate"
    )
)]
pub trait TargetMut: Target {
    fn invoke_mut<R, F: FnOnce(&mut Self::Object) -> R>(self, method: F) -> Result<R>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByValue<T>(T);

#[derive(Debug, Clone, Copy)]
pub struct ByRef<'a, T: ?Sized>(&'a T);

#[derive(Debug, Default)]
pub struct ByShared<T: ?Sized>(Arc<T>);

impl<T> ByValue<T> {
    /// Moves `value` into the target.
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Copies `value` into the target. Later changes to either copy are not
    /// visible to the other.
    pub fn copy(value: &T) -> Self
    where
        T: Clone,
    {
        Self(value.clone())
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<'a, T: ?Sized> ByRef<'a, T> {
    pub const fn new(value: &'a T) -> Self {
        Self(value)
    }
}

impl<T: ?Sized> ByShared<T> {
    /// Clones the `Arc<T>`, so the object lives at least until the task is
    /// done with it.
    pub fn new(value: &Arc<T>) -> Self {
        Self(value.clone())
    }

    pub fn into_inner(self) -> Arc<T> {
        self.0
    }
}

impl<T: ?Sized> Clone for ByShared<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> From<Arc<T>> for ByShared<T> {
    fn from(value: Arc<T>) -> Self {
        Self(value)
    }
}

impl<T: Send> Target for ByValue<T> {
    type Object = T;
    const MODE: Mode = Mode::Copy;

    fn invoke<R, F: FnOnce(&T) -> R>(self, method: F) -> Result<R> {
        Ok(method(&self.0))
    }
}

impl<T: Send> TargetMut for ByValue<T> {
    fn invoke_mut<R, F: FnOnce(&mut T) -> R>(mut self, method: F) -> Result<R> {
        Ok(method(&mut self.0))
    }
}

impl<T: ?Sized + Sync> Target for ByRef<'_, T> {
    type Object = T;
    const MODE: Mode = Mode::Borrow;

    fn invoke<R, F: FnOnce(&T) -> R>(self, method: F) -> Result<R> {
        Ok(method(self.0))
    }
}

impl<T: ?Sized + Send + Sync> Target for ByShared<T> {
    type Object = T;
    const MODE: Mode = Mode::Shared;

    fn invoke<R, F: FnOnce(&T) -> R>(self, method: F) -> Result<R> {
        Ok(method(&self.0))
    }
}

impl<T: ?Sized + Sync, B: Binding> Target for Tether<T, B> {
    type Object = T;
    const MODE: Mode = Mode::Borrow;

    fn invoke<R, F: FnOnce(&T) -> R>(self, method: F) -> Result<R> {
        let guard = self.borrow().ok_or(Error::DanglingCapture)?;
        Ok(method(&*guard))
    }
}
