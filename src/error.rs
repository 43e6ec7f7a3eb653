use crate::task::{Id, State};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A [`Task`](crate::Task) was joined after having already been joined,
    /// or without ever having been launched.
    #[error("can not join a task in state `{0:?}`")]
    InvalidJoin(State),
    /// A [`Tether`](crate::Tether) tried to reach a value whose
    /// [`Anchor`](crate::Anchor) had already been severed.
    #[error("the captured reference was severed from its anchor before the task could use it")]
    DanglingCapture,
    #[error("task `{id}` ({}) was dropped without being joined", .name.as_deref().unwrap_or("unnamed"))]
    LeakedTask { id: Id, name: Option<String> },
    #[error("task `{id}` panicked: {message}")]
    Panicked { id: Id, message: String },
    #[error("failed to spawn a thread for the task")]
    Spawn(#[source] io::Error),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
