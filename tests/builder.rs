use core::{
    num::NonZeroUsize,
    sync::atomic::{AtomicUsize, Ordering},
};
use std::{sync::Mutex, thread};
use tether::{Builder, ByValue, Error, Leak};

fn name() -> Option<String> {
    thread::current().name().map(str::to_owned)
}

#[test]
fn default_builder_launches_unnamed_tasks() {
    let mut task = Builder::new().launch(name).unwrap();
    assert_eq!(task.name(), None);
    assert_eq!(task.leak(), Leak::Join);
    assert_eq!(task.join().unwrap(), None);
}

#[test]
fn named_builder_names_threads() {
    let mut task = Builder::new().name("worker").launch(name).unwrap();
    assert_eq!(task.name(), Some("worker"));
    assert_eq!(task.join().unwrap().as_deref(), Some("worker"));
}

#[test]
fn builder_sets_stack_size() {
    let mut task = Builder::new()
        .stack_size(4 * 1024 * 1024)
        .launch(|| {
            let buffer = [1u8; 1024 * 1024];
            buffer.iter().map(|&value| value as usize).sum::<usize>()
        })
        .unwrap();
    assert_eq!(task.join().unwrap(), 1024 * 1024);
}

#[test]
fn builder_can_launch_with_and_member() {
    let builder = Builder::new().name("member");
    let mut with = builder.launch_with(|value: usize| value + 1, 1).unwrap();
    let mut member = builder
        .launch_member(ByValue::new(vec![1, 2, 3]), |numbers: &Vec<i32>, ()| numbers.len(), ())
        .unwrap();
    assert_eq!(with.join().unwrap(), 2);
    assert_eq!(member.join().unwrap(), 3);
}

#[cfg(feature = "lock")]
mod broadcast {
    use super::*;

    #[test]
    fn broadcast_calls_function_once_per_index() {
        let calls = AtomicUsize::new(0);
        let indices = Mutex::new(Vec::new());
        let parallelism = NonZeroUsize::new(4).unwrap();
        let squares = Builder::new()
            .broadcast(parallelism, &|index: usize| {
                calls.fetch_add(1, Ordering::Relaxed);
                indices.lock().unwrap().push(index);
                index * index
            })
            .unwrap();
        assert_eq!(squares, [0, 1, 4, 9]);
        assert_eq!(calls.into_inner(), 4);
        let mut indices = indices.into_inner().unwrap();
        indices.sort();
        assert_eq!(indices, [0, 1, 2, 3]);
    }

    #[test]
    fn broadcast_names_tasks_by_index() {
        let parallelism = NonZeroUsize::new(3).unwrap();
        let names = Builder::new()
            .name("square")
            .broadcast(parallelism, &|_: usize| name())
            .unwrap();
        assert_eq!(
            names.iter().map(|name| name.as_deref()).collect::<Vec<_>>(),
            [Some("square-0"), Some("square-1"), Some("square-2")]
        );
    }

    #[test]
    fn broadcast_reports_panics() {
        let parallelism = NonZeroUsize::new(2).unwrap();
        let result = tether::broadcast(parallelism, &|index: usize| {
            if index == 1 {
                panic!("index {index}");
            }
        });
        assert!(matches!(result, Err(Error::Panicked { message, .. }) if message == "index 1"));
    }

    #[test]
    fn broadcast_on_available_parallelism() {
        let total = AtomicUsize::new(0);
        let outputs = tether::broadcast(tether::parallelism(), &|index: usize| {
            total.fetch_add(index, Ordering::Relaxed);
        })
        .unwrap();
        let count = tether::parallelism().get();
        assert_eq!(outputs.len(), count);
        assert_eq!(total.into_inner(), count * (count - 1) / 2);
    }
}
