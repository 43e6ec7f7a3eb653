//! Run one borrowed function on many `'static` threads.
//!
//! The function is anchored for the duration of the broadcast and every
//! task reaches it through its own [`Tether`](crate::Tether), so it may
//! borrow from the caller's stack even though the tasks are not scoped.

use crate::{
    builder::Builder,
    error::Result,
    lock::Lock,
    task::{self, Task},
    Anchor,
};
use core::num::NonZeroUsize;
use tracing::debug;

impl Builder {
    /// Launches `parallelism` tasks that each call `function` with their
    /// index, then joins them and returns their outputs in index order. The
    /// task names, if any, are suffixed with their index.
    ///
    /// ```
    /// use core::sync::atomic::{AtomicUsize, Ordering};
    /// use tether::{Builder, parallelism};
    ///
    /// let calls = AtomicUsize::new(0);
    /// let square = |index: usize| {
    ///     calls.fetch_add(1, Ordering::Relaxed);
    ///     index * index
    /// };
    /// let squares = Builder::new().broadcast(parallelism(), &square).unwrap();
    /// assert_eq!(squares.len(), calls.into_inner());
    /// assert!(squares.iter().enumerate().all(|(index, square)| *square == index * index));
    /// ```
    pub fn broadcast<F, R>(&self, parallelism: NonZeroUsize, function: &F) -> Result<Vec<R>>
    where
        F: Fn(usize) -> R + Sync,
        R: Send + 'static,
    {
        Anchor::<_, Lock>::with(function, |anchor| {
            let tether = anchor.tether_as::<dyn Fn(usize) -> R + Send + Sync>();
            let tasks = (0..parallelism.get())
                .map(|index| {
                    self.indexed(index).launch_member(
                        tether.clone(),
                        |function, index| function(index),
                        index,
                    )
                })
                .collect::<Result<Vec<Task<R>>>>()?;
            debug!(tasks = tasks.len(), "launched broadcast");
            task::join_all(tasks)
        })
    }

    fn indexed(&self, index: usize) -> Self {
        match &self.name {
            Some(name) => self.clone().name(format!("{name}-{index}")),
            None => self.clone(),
        }
    }
}

/// See [`Builder::broadcast`].
///
/// # Panics
/// Panics if the operating system fails to create a thread.
pub fn broadcast<F, R>(parallelism: NonZeroUsize, function: &F) -> Result<Vec<R>>
where
    F: Fn(usize) -> R + Sync,
    R: Send + 'static,
{
    Builder::new().broadcast(parallelism, function)
}
