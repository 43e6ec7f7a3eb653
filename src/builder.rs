use crate::{
    error::{Error, Result},
    scope::Scope,
    target::{Target, TargetMut},
    task::{Leak, Task},
    work::Work,
};
use std::thread;

/// Configures the threads that run tasks.
///
/// ```
/// use tether::{Builder, Leak};
///
/// let mut task = Builder::new()
///     .name("worker")
///     .stack_size(64 * 1024)
///     .leak(Leak::Panic)
///     .launch(|| std::thread::current().name().map(str::to_owned))
///     .unwrap();
/// assert_eq!(task.join().unwrap().as_deref(), Some("worker"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) name: Option<String>,
    pub(crate) stack_size: Option<usize>,
    pub(crate) leak: Leak,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the thread of the launched tasks.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the stack size, in bytes, of the thread of the launched tasks.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Sets what happens to launched tasks that are dropped without having
    /// been joined.
    pub fn leak(mut self, leak: Leak) -> Self {
        self.leak = leak;
        self
    }

    pub fn launch<W: Work>(&self, work: W) -> Result<Task<W::Output>> {
        self.spawn(move || Ok(work.run()))
    }

    /// See [`launch_with`](crate::launch_with).
    pub fn launch_with<F, A, R>(&self, function: F, arguments: A) -> Result<Task<R>>
    where
        F: FnOnce(A) -> R + Send + 'static,
        A: Send + 'static,
        R: Send + 'static,
    {
        self.launch(move || function(arguments))
    }

    /// See [`launch_member`](crate::launch_member).
    pub fn launch_member<G, M, A, R>(&self, target: G, method: M, arguments: A) -> Result<Task<R>>
    where
        G: Target + 'static,
        M: FnOnce(&G::Object, A) -> R + Send + 'static,
        A: Send + 'static,
        R: Send + 'static,
    {
        self.spawn(move || target.invoke(|object| method(object, arguments)))
    }

    /// See [`launch_member_mut`](crate::launch_member_mut).
    pub fn launch_member_mut<G, M, A, R>(&self, target: G, method: M, arguments: A) -> Result<Task<R>>
    where
        G: TargetMut + 'static,
        M: FnOnce(&mut G::Object, A) -> R + Send + 'static,
        A: Send + 'static,
        R: Send + 'static,
    {
        self.spawn(move || target.invoke_mut(|object| method(object, arguments)))
    }

    /// See [`scope`](crate::scope). Tasks launched from the scope use this
    /// configuration.
    pub fn scope<'env, F, T>(&self, function: F) -> T
    where
        F: for<'scope> FnOnce(&Scope<'scope, 'env>) -> T,
    {
        thread::scope(|inner| function(&Scope::new(inner, self.clone())))
    }

    pub(crate) fn thread(&self) -> thread::Builder {
        let mut builder = thread::Builder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }
        builder
    }

    fn spawn<T, F>(&self, body: F) -> Result<Task<T>>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = self.thread().spawn(body).map_err(Error::Spawn)?;
        Ok(Task::new(handle, self.name.clone(), self.leak))
    }
}
