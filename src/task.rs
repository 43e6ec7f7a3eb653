//! The [`Task<T>`] handle returned by every launch.
//!
//! A [`Task<T>`] must be [`join`](Task::join)ed (or explicitly
//! [`detach`](Task::detach)ed) exactly once. A second join is rejected with
//! [`Error::InvalidJoin`] and an unjoined handle is never silently leaked:
//! its [`Leak`] policy decides what happens when it drops.

use crate::error::{Error, Result};
use core::{any::Any, fmt};
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, error, warn};

/// The opaque identity of a launched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(ThreadId);

/// The lifecycle of a [`Task<T>`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Never launched; see [`Task::default`].
    Empty,
    Running,
    Joined,
    Detached,
}

/// What to do when a [`Task<T>`] is dropped without having been joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Leak {
    /// Block in [`Drop`] until the task completes.
    #[default]
    Join,
    /// Panic with [`Error::LeakedTask`], unless the current thread is already
    /// panicking in which case the task is detached.
    Panic,
}

pub struct Task<T> {
    handle: Option<JoinHandle<Result<T>>>,
    id: Option<Id>,
    name: Option<String>,
    state: State,
    leak: Leak,
}

impl From<ThreadId> for Id {
    fn from(id: ThreadId) -> Self {
        Self(id)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl<T> Task<T> {
    pub(crate) fn new(handle: JoinHandle<Result<T>>, name: Option<String>, leak: Leak) -> Self {
        let id = Id(handle.thread().id());
        debug!(task = %id, name = name.as_deref(), "launched task");
        Self {
            handle: Some(handle),
            id: Some(id),
            name,
            state: State::Running,
            leak,
        }
    }

    /// Returns `None` if the task was never launched.
    pub fn id(&self) -> Option<Id> {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn leak(&self) -> Leak {
        self.leak
    }

    /// Returns `true` if the task body has returned. A joined task is always
    /// finished and an empty task never is.
    pub fn is_finished(&self) -> bool {
        match (&self.handle, self.state) {
            (Some(handle), _) => handle.is_finished(),
            (None, State::Joined) => true,
            (None, _) => false,
        }
    }

    /// Blocks the calling thread until the task completes and returns its
    /// output.
    ///
    /// Fails with [`Error::InvalidJoin`] if the task was already joined or
    /// was never launched, and with [`Error::Panicked`] if the task body
    /// panicked. Errors produced by the task body itself (such as
    /// [`Error::DanglingCapture`]) are returned as is.
    pub fn join(&mut self) -> Result<T> {
        let Some(handle) = self.handle.take() else {
            warn!(task = ?self.id, state = ?self.state, "rejected invalid join");
            return Err(Error::InvalidJoin(self.state));
        };
        self.state = State::Joined;
        let id = Id(handle.thread().id());
        debug!(task = %id, name = self.name.as_deref(), "joining task");
        match handle.join() {
            Ok(result) => result,
            Err(payload) => Err(Error::Panicked {
                id,
                message: message(payload),
            }),
        }
    }

    /// Lets the task run to completion on its own. Its output is discarded.
    pub fn detach(mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(task = ?self.id, name = self.name.as_deref(), "detached task");
            self.state = State::Detached;
            drop(handle);
        }
    }
}

impl<T> Default for Task<T> {
    /// Creates an empty handle that was never launched. Joining it fails with
    /// [`Error::InvalidJoin`].
    fn default() -> Self {
        Self {
            handle: None,
            id: None,
            name: None,
            state: State::Empty,
            leak: Leak::default(),
        }
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("leak", &self.leak)
            .finish()
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let id = Id(handle.thread().id());
        leaked(self.leak, id, self.name.take(), || handle.join().is_ok());
    }
}

/// Joins every task, even after a failure, and returns their outputs in
/// launch order or the first error.
pub fn join_all<T>(tasks: impl IntoIterator<Item = Task<T>>) -> Result<Vec<T>> {
    tasks
        .into_iter()
        .map(|mut task| task.join())
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

pub(crate) fn leaked(leak: Leak, id: Id, name: Option<String>, join: impl FnOnce() -> bool) {
    let error = Error::LeakedTask { id, name };
    match leak {
        Leak::Join => {
            warn!(%error, "joining leaked task");
            if !join() {
                error!(task = %id, "leaked task panicked");
            }
        }
        Leak::Panic if thread::panicking() => {
            error!(%error, "detaching leaked task while panicking");
        }
        Leak::Panic => panic!("{error}"),
    }
}

pub(crate) fn message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_owned(),
            Err(_) => "non-string panic payload".to_owned(),
        },
    }
}
