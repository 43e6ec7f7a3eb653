use core::sync::atomic::{AtomicUsize, Ordering};
use std::{
    panic::catch_unwind,
    sync::{Barrier, Mutex},
    thread::sleep,
    time::Duration,
};
use tether::{Builder, Error, Leak, State, scope};

#[test]
fn can_borrow_mutably_in_scope() {
    let mut name = String::from("Main");
    scope(|scope| {
        let mut task = scope.launch(|| name.push_str(" (from Thread)"));
        task.join().unwrap();
    });
    assert_eq!(name, "Main (from Thread)");
}

#[test]
fn can_borrow_shared_in_many_tasks() {
    let numbers = vec![1, 2, 3, 4];
    let sums = scope(|scope| {
        let tasks = numbers
            .chunks(2)
            .map(|chunk| scope.launch(move || chunk.iter().sum::<i32>()))
            .collect::<Vec<_>>();
        tasks.into_iter().map(|mut task| task.join().unwrap()).collect::<Vec<_>>()
    });
    assert_eq!(sums, [3, 7]);
}

#[test]
fn dropped_scoped_tasks_are_joined() {
    let counter = AtomicUsize::new(0);
    scope(|scope| {
        for _ in 0..4 {
            scope.launch(|| {
                sleep(Duration::from_millis(10));
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    });
    assert_eq!(counter.into_inner(), 4);
}

#[test]
fn scoped_join_twice_fails() {
    scope(|scope| {
        let mut task = scope.launch(|| 'a');
        assert_eq!(task.join().unwrap(), 'a');
        assert_eq!(task.state(), State::Joined);
        assert!(matches!(task.join(), Err(Error::InvalidJoin(State::Joined))));
    });
}

#[test]
fn scoped_panic_is_reported() {
    scope(|scope| {
        let mut task = scope.launch(|| panic!("boom"));
        assert!(matches!(task.join(), Err(Error::Panicked { message, .. }) if message == "boom"));
    });
}

#[test]
fn scoped_by_reference_sees_caller_updates() {
    let value = Mutex::new(0);
    let barrier = Barrier::new(2);
    scope(|scope| {
        let mut task = scope.launch(|| {
            barrier.wait();
            *value.lock().unwrap()
        });
        *value.lock().unwrap() += 1;
        barrier.wait();
        assert_eq!(task.join().unwrap(), 1);
    });
}

#[test]
fn scoped_launch_with_moves_arguments() {
    let prefix = String::from("Vehicle");
    let description = scope(|scope| {
        scope
            .launch_with(|id: usize| format!("{prefix} #{id}"), 1)
            .join()
            .unwrap()
    });
    assert_eq!(description, "Vehicle #1");
}

#[test]
fn dropped_scoped_task_panics_with_leak_panic() {
    let result = catch_unwind(|| {
        Builder::new().leak(Leak::Panic).scope(|scope| {
            let task = scope.launch(|| 'a');
            assert_eq!(task.state(), State::Running);
            drop(task);
        })
    });
    let payload = result.unwrap_err();
    let message = payload.downcast_ref::<String>().unwrap();
    assert!(message.contains("dropped without being joined"));
}

#[test]
fn scoped_tasks_use_builder() {
    let names = Builder::new().name("scoped").leak(Leak::Panic).scope(|scope| {
        let mut task = scope
            .try_launch(|| std::thread::current().name().map(str::to_owned))
            .unwrap();
        assert_eq!(task.name(), Some("scoped"));
        task.join().unwrap()
    });
    assert_eq!(names.as_deref(), Some("scoped"));
}
