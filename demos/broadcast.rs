//! Runs a function that borrows from the stack of `main` on `'static` threads.
//!
//! Contrary to [`std::thread::scope`], nothing here ties the tasks to a
//! scope: each of them reaches the function through its own `Tether`, and the
//! `Anchor` that owns the borrow severs every tether before the borrow ends.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tether::{Anchor, Builder, Error, Result, launch_member, lock::Lock, parallelism};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let lines = Mutex::new(Vec::new());
    let calls = AtomicUsize::new(0);
    let squares = Builder::new().name("square").broadcast(parallelism(), &|index: usize| {
        calls.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut lines) = lines.lock() {
            lines.push(format!("{:?} squared {index}", std::thread::current().name()));
        }
        index * index
    })?;
    println!("{} calls produced {squares:?}", calls.into_inner());
    for line in lines.into_inner().unwrap_or_default() {
        println!("{line}");
    }

    // A tether that outlives its anchor can not reach the captured value.
    let message = String::from("too late");
    let tether = Anchor::<_, Lock>::with(&message, |anchor| anchor.tether_target());
    let mut task = launch_member(tether, |message: &String, ()| message.len(), ());
    match task.join() {
        Err(Error::DanglingCapture) => println!("the captured message was severed"),
        result => println!("unexpected result: {result:?}"),
    }
    Ok(())
}
