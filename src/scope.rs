//! Statically checked by-reference captures.
//!
//! Tasks launched from a [`Scope`] may borrow anything that outlives the
//! call to [`scope`](crate::scope). The borrow checker proves that the
//! storage outlives the task, so no [`Anchor`](crate::Anchor) is needed.
//!
//! ```
//! let mut name = String::from("Main");
//! tether::scope(|scope| {
//!     let mut task = scope.launch(|| name.push_str(" (from Thread)"));
//!     task.join().unwrap();
//! });
//! assert_eq!(name, "Main (from Thread)");
//! ```

use crate::{
    builder::Builder,
    error::{Error, Result},
    target::{Target, TargetMut},
    task::{self, Id, Leak, State},
};
use core::fmt;
use std::thread::{self, ScopedJoinHandle};
use tracing::{debug, warn};

pub struct Scope<'scope, 'env: 'scope> {
    inner: &'scope thread::Scope<'scope, 'env>,
    builder: Builder,
}

/// A [`Task`](crate::Task) that may borrow from its [`Scope`]. It follows the
/// same join rules; if it is never joined, its [`Leak`] policy applies when it
/// drops and the scope joins it at the latest when it ends.
pub struct ScopedTask<'scope, T> {
    handle: Option<ScopedJoinHandle<'scope, Result<T>>>,
    id: Id,
    name: Option<String>,
    state: State,
    leak: Leak,
}

impl<'scope, 'env> Scope<'scope, 'env> {
    pub(crate) fn new(inner: &'scope thread::Scope<'scope, 'env>, builder: Builder) -> Self {
        Self { inner, builder }
    }

    /// Launches `function` on a new thread. It may borrow from outside of the
    /// scope.
    ///
    /// # Panics
    /// Panics if the operating system fails to create a thread. Use
    /// [`Scope::try_launch`] to handle this failure.
    pub fn launch<F, T>(&self, function: F) -> ScopedTask<'scope, T>
    where
        F: FnOnce() -> T + Send + 'scope,
        T: Send + 'scope,
    {
        match self.try_launch(function) {
            Ok(task) => task,
            Err(error) => panic!("failed to launch scoped task: {error}"),
        }
    }

    pub fn try_launch<F, T>(&self, function: F) -> Result<ScopedTask<'scope, T>>
    where
        F: FnOnce() -> T + Send + 'scope,
        T: Send + 'scope,
    {
        self.spawn(move || Ok(function()))
    }

    /// See [`launch_with`](crate::launch_with).
    pub fn launch_with<F, A, R>(&self, function: F, arguments: A) -> ScopedTask<'scope, R>
    where
        F: FnOnce(A) -> R + Send + 'scope,
        A: Send + 'scope,
        R: Send + 'scope,
    {
        self.launch(move || function(arguments))
    }

    /// See [`launch_member`](crate::launch_member). The `target` may also be a
    /// [`ByRef`](crate::ByRef).
    pub fn launch_member<G, M, A, R>(&self, target: G, method: M, arguments: A) -> ScopedTask<'scope, R>
    where
        G: Target + 'scope,
        M: FnOnce(&G::Object, A) -> R + Send + 'scope,
        A: Send + 'scope,
        R: Send + 'scope,
    {
        let spawned = self.spawn(move || target.invoke(|object| method(object, arguments)));
        match spawned {
            Ok(task) => task,
            Err(error) => panic!("failed to launch scoped task: {error}"),
        }
    }

    /// See [`launch_member_mut`](crate::launch_member_mut).
    pub fn launch_member_mut<G, M, A, R>(&self, target: G, method: M, arguments: A) -> ScopedTask<'scope, R>
    where
        G: TargetMut + 'scope,
        M: FnOnce(&mut G::Object, A) -> R + Send + 'scope,
        A: Send + 'scope,
        R: Send + 'scope,
    {
        let spawned = self.spawn(move || target.invoke_mut(|object| method(object, arguments)));
        match spawned {
            Ok(task) => task,
            Err(error) => panic!("failed to launch scoped task: {error}"),
        }
    }

    fn spawn<F, T>(&self, body: F) -> Result<ScopedTask<'scope, T>>
    where
        F: FnOnce() -> Result<T> + Send + 'scope,
        T: Send + 'scope,
    {
        let handle = self
            .builder
            .thread()
            .spawn_scoped(self.inner, body)
            .map_err(Error::Spawn)?;
        let id = Id::from(handle.thread().id());
        let name = self.builder.name.clone();
        debug!(task = %id, name = name.as_deref(), "launched scoped task");
        Ok(ScopedTask {
            handle: Some(handle),
            id,
            name,
            state: State::Running,
            leak: self.builder.leak,
        })
    }
}

impl<T> ScopedTask<'_, T> {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |handle| handle.is_finished())
    }

    /// See [`Task::join`](crate::Task::join).
    pub fn join(&mut self) -> Result<T> {
        let Some(handle) = self.handle.take() else {
            warn!(task = %self.id, state = ?self.state, "rejected invalid join");
            return Err(Error::InvalidJoin(self.state));
        };
        self.state = State::Joined;
        debug!(task = %self.id, name = self.name.as_deref(), "joining scoped task");
        match handle.join() {
            Ok(result) => result,
            Err(payload) => Err(Error::Panicked {
                id: self.id,
                message: task::message(payload),
            }),
        }
    }
}

impl<T> fmt::Debug for ScopedTask<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("leak", &self.leak)
            .finish()
    }
}

impl<T> Drop for ScopedTask<'_, T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            task::leaked(self.leak, self.id, self.name.take(), || handle.join().is_ok());
        }
    }
}
