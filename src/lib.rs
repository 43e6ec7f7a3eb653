#![doc = include_str!("../README.md")]

#[cfg(feature = "atomic")]
pub mod atomic;
#[cfg(feature = "lock")]
pub mod broadcast;
#[cfg(feature = "lock")]
pub mod lock;

pub mod anchor;
pub mod builder;
pub mod error;
pub mod scope;
pub mod shroud;
pub mod target;
pub mod task;
pub mod tether;
pub mod work;

pub use anchor::Anchor;
#[cfg(feature = "lock")]
pub use broadcast::broadcast;
pub use builder::Builder;
pub use error::{Error, Result};
pub use scope::{Scope, ScopedTask};
pub use target::{ByRef, ByShared, ByValue, Mode, Target, TargetMut};
pub use task::{Id, Leak, State, Task, join_all};
pub use tether::{Guard, Tether};
pub use work::Work;

use core::num::NonZeroUsize;
use std::thread;

/// Represents the shared state that ties an [`Anchor`] to all of its
/// [`Tether`]s.
///
/// # Safety
/// Once [`Binding::sever`] returns `true`, no [`Tether`] bound to this binding
/// may produce a new [`Binding::Guard`] and no previously produced guard may
/// still be alive. [`Binding::bind`] must refuse new tethers that could
/// observe the value after a completed severance. A wrong implementation
/// leads to use-after-free of the anchored value.
///
/// See [`Lock`](lock::Lock) and [`Atomic`](atomic::Atomic) as implementation
/// examples.
pub unsafe trait Binding: Send + Sync + Sized + 'static {
    /// Held for the duration of a [`Tether::borrow`].
    type Guard<'a>;

    fn new() -> Self;
    /// Registers a new [`Tether`]. Returns `false` if the binding is already
    /// severed, in which case the tether will never be able to borrow.
    fn bind(&self) -> bool;
    /// Unregisters a [`Tether`] that was successfully bound.
    fn unbind(&self);
    fn borrow(&self) -> Option<Self::Guard<'_>>;
    /// - When `FORCE = true`, the severance **must** have completed when this
    ///   call returns. This may block.
    /// - When `FORCE = false`, the severance is allowed to fail instead of
    ///   blocking.
    ///
    /// Returns `true` if the binding is severed when this call returns.
    fn sever<const FORCE: bool>(&self) -> bool;
    /// Returns the number of live bound [`Tether`]s.
    fn bindings(&self) -> u32;
    /// Returns `false` once the binding has been severed.
    fn is_bound(&self) -> bool;
}

/// Launches `work` on a new thread with the default [`Builder`].
///
/// # Panics
/// Panics if the operating system fails to create a thread. Use
/// [`Builder::launch`] to handle this failure.
pub fn launch<W: Work>(work: W) -> Task<W::Output> {
    spawned(Builder::new().launch(work))
}

/// Launches `function(arguments)` on a new thread. The `arguments` are moved
/// into the task at launch time: pass a clone to keep the caller's value
/// untouched, or [`core::mem::take`] it to transfer ownership.
///
/// # Panics
/// See [`launch`].
pub fn launch_with<F, A, R>(function: F, arguments: A) -> Task<R>
where
    F: FnOnce(A) -> R + Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    spawned(Builder::new().launch_with(function, arguments))
}

/// Launches `method(object, arguments)` on a new thread where `object` is
/// reached through `target`, whose type states the ownership mode
/// ([`ByValue`], [`ByShared`] or [`Tether`]).
///
/// # Panics
/// See [`launch`].
pub fn launch_member<G, M, A, R>(target: G, method: M, arguments: A) -> Task<R>
where
    G: Target + 'static,
    M: FnOnce(&G::Object, A) -> R + Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    spawned(Builder::new().launch_member(target, method, arguments))
}

/// Launches `method(object, arguments)` on a new thread where `object` is the
/// task's own copy held by `target` (a [`ByValue`]), so `method` may take
/// `&mut self`. The caller's original is never affected.
///
/// ```
/// use tether::{ByValue, launch_member_mut};
///
/// let names = vec![String::from("Main")];
/// let mut task = launch_member_mut(ByValue::copy(&names), |names: &mut Vec<String>, name: &str| {
///     names.push(name.to_owned());
///     names.len()
/// }, "Thread");
/// assert_eq!(task.join().unwrap(), 2);
/// assert_eq!(names.len(), 1);
/// ```
///
/// # Panics
/// See [`launch`].
pub fn launch_member_mut<G, M, A, R>(target: G, method: M, arguments: A) -> Task<R>
where
    G: TargetMut + 'static,
    M: FnOnce(&mut G::Object, A) -> R + Send + 'static,
    A: Send + 'static,
    R: Send + 'static,
{
    spawned(Builder::new().launch_member_mut(target, method, arguments))
}

/// Creates a [`Scope`] in which tasks may borrow from the enclosing stack
/// frame. Every task still running when `function` returns is joined before
/// this call returns.
pub fn scope<'env, F, T>(function: F) -> T
where
    F: for<'scope> FnOnce(&Scope<'scope, 'env>) -> T,
{
    Builder::new().scope(function)
}

/// Returns the [`Id`] of the calling thread.
pub fn current() -> Id {
    Id::from(thread::current().id())
}

/// Returns the amount of tasks that can run in parallel on this machine, or
/// `1` if it can not be determined.
pub fn parallelism() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

fn spawned<T>(result: Result<Task<T>>) -> Task<T> {
    match result {
        Ok(task) => task,
        Err(error) => panic!("failed to launch task: {error}"),
    }
}

#[allow(dead_code)]
mod fails {
    macro_rules! fail {
        ($function: ident, $block: block) => {
            #[doc = concat!("```compile_fail\n", stringify!($block), "\n```")]
            const fn $function() {}
        };
    }

    fail!(can_not_clone_task, {
        let task = tether::launch(|| {});
        let other = task.clone();
    });

    fail!(can_not_launch_with_stack_borrow, {
        let name = String::from("main");
        let task = tether::launch(|| name.len());
    });

    fail!(can_not_anchor_stack_borrow_without_scope, {
        use tether::{Anchor, lock::Lock};

        let name = String::from("main");
        let anchor = Box::pin(Anchor::<_, Lock>::new(&name));
    });

    fail!(can_not_mutate_while_anchored, {
        use tether::{Anchor, lock::Lock};

        let mut name = String::from("main");
        Anchor::<_, Lock>::with(&name, |anchor| {
            let tether = anchor.tether_target();
            name.push('!');
        });
    });

    fail!(can_not_escape_anchor_scope, {
        use tether::{Anchor, lock::Lock};

        let name = String::from("main");
        let anchor = Anchor::<_, Lock>::with(&name, |anchor| anchor);
    });

    fail!(can_not_tether_unpinned, {
        use tether::{Anchor, lock::Lock};

        let anchor = Anchor::<_, Lock>::new(String::new());
        let tether = anchor.tether();
    });

    fail!(can_not_send_unsync_tether, {
        use core::cell::Cell;
        use tether::{Anchor, lock::Lock};

        Anchor::<_, Lock>::with(Cell::new(1), |anchor| {
            let tether = anchor.tether();
            std::thread::spawn(move || drop(tether));
        });
    });

    fail!(can_not_share_unsync_target, {
        use std::{cell::Cell, sync::Arc};
        use tether::{ByShared, launch_member};

        let counter = Arc::new(Cell::new(0));
        launch_member(ByShared::new(&counter), |counter, _| counter.set(1), ());
    });

    fail!(can_not_mutate_shared_target, {
        use std::sync::Arc;
        use tether::{ByShared, launch_member_mut};

        let names = Arc::new(Vec::<String>::new());
        launch_member_mut(ByShared::new(&names), |names, name: String| names.push(name), String::new());
    });

    fail!(can_not_escape_scope, {
        let mut name = String::from("main");
        let task = tether::scope(|scope| scope.launch(|| name.push('!')));
    });
}
