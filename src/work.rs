/// A unit of work that can be launched as a [`Task`](crate::Task).
///
/// It is implemented for every `FnOnce() -> R` closure. Implement it for a
/// type to launch that type as a callable object: its state is moved into
/// the task at launch time.
///
/// ```
/// use tether::{Work, launch};
///
/// struct Vehicle(usize);
///
/// impl Work for Vehicle {
///     type Output = String;
///
///     fn run(self) -> String {
///         format!("Vehicle #{} has been created", self.0)
///     }
/// }
///
/// let mut task = launch(Vehicle(1));
/// assert_eq!(task.join().unwrap(), "Vehicle #1 has been created");
/// ```
#[rustversion::attr(
    since(1.78),
    diagnostic::on_unimplemented(
        message = "`{Self}` can not be launched as a task",
        note = "tasks must own their captures (`move`) or borrow them through `tether::scope` or a `Tether`"
    )
)]
pub trait Work: Send + 'static {
    type Output: Send + 'static;

    fn run(self) -> Self::Output;
}

impl<F: FnOnce() -> R + Send + 'static, R: Send + 'static> Work for F {
    type Output = R;

    #[inline]
    fn run(self) -> R {
        self()
    }
}
