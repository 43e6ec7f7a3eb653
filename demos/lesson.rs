//! Walks through every way of launching a task: from a free function, from a
//! callable object, from closures that capture by value or by reference, and
//! from bound methods.
//!
//! The task lifecycle is logged at the `DEBUG` level.

use std::{
    sync::{Arc, Mutex},
    thread::sleep,
    time::Duration,
};
use tether::{
    Anchor, ByShared, ByValue, Result, Work, current, join_all, launch, launch_member,
    launch_with, lock::Lock, parallelism, scope,
};

fn work(who: &str) {
    sleep(Duration::from_millis(50));
    println!("Finished work 1 in {who}");
    sleep(Duration::from_millis(50));
    println!("Finished work 2 in {who}");
}

fn worker() {
    println!("The other thread id = {}", current());
    work("thread");
}

struct Vehicle {
    id: usize,
    name: String,
}

impl Vehicle {
    fn describe(&self, prefix: &str) -> String {
        format!("{prefix} Vehicle #{} ({})", self.id, self.name)
    }
}

impl Work for Vehicle {
    type Output = ();

    fn run(self) {
        println!("Vehicle #{} has been created", self.id);
    }
}

fn functions() -> Result<()> {
    println!("Hello concurrent world from main! Thread id = {}", current());
    println!("This machine supports concurrency with {parallelism} cores available", parallelism = parallelism());

    let mut function = launch(worker);
    let mut object = launch(Vehicle { id: 1, name: String::new() });
    work("main");
    function.join()?;
    object.join()
}

fn closures() -> Result<()> {
    let mut id = 0;
    id += 1;
    // A copy of `id` is taken when the closure is created.
    let mut by_value = launch(move || println!("ID (by value) = {id}"));
    id += 1;
    by_value.join()?;

    // Mutating a copy never affects the caller.
    let mut mutable = launch(move || {
        id += 1;
        println!("ID (mutable copy) = {id}");
    });
    mutable.join()?;
    let mut parameter = launch_with(|id: i32| println!("ID (parameter) = {id}"), id);
    parameter.join()?;

    // Borrowing requires a scope: every task is joined before `id` can be
    // used again.
    scope(|scope| {
        let mut by_reference = scope.launch(|| {
            sleep(Duration::from_millis(100));
            println!("a) ID in Thread (by reference) = {id}");
        });
        let mut by_value = scope.launch(move || {
            sleep(Duration::from_millis(50));
            println!("b) ID in Thread (by value) = {id}");
        });
        println!("c) ID in Main = {}", id + 1);
        by_reference.join()?;
        by_value.join()
    })?;
    id += 1;
    println!("ID in Main after the scope = {id}");
    Ok(())
}

fn members() -> Result<()> {
    let vehicle = Vehicle { id: 2, name: String::from("Copy") };
    let mut copy = launch_member(ByValue::new(vehicle), Vehicle::describe, "Copied");
    println!("{}", copy.join()?);

    let vehicle = Arc::new(Vehicle { id: 3, name: String::from("Shared") });
    let tasks = (0..3)
        .map(|_| launch_member(ByShared::new(&vehicle), Vehicle::describe, "Shared"))
        .collect::<Vec<_>>();
    for description in join_all(tasks)? {
        println!("{description}");
    }

    // A `'static` task can still mutate the caller's value through a tether.
    let name = Mutex::new(String::from("Main"));
    Anchor::<_, Lock>::with(&name, |anchor| {
        let mut task = launch_member(
            anchor.tether_target(),
            |name: &Mutex<String>, suffix: &str| {
                if let Ok(mut name) = name.lock() {
                    name.push_str(suffix);
                }
            },
            " (from Thread)",
        );
        task.join()
    })?;
    if let Ok(name) = name.lock() {
        println!("Name = {name}");
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();
    functions()?;
    closures()?;
    members()
}
