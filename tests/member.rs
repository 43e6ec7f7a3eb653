use std::sync::{Arc, Mutex, mpsc::channel};
use tether::{
    ByRef, ByShared, ByValue, Mode, Target, launch_member, launch_member_mut, scope,
};

#[derive(Clone, Debug, PartialEq)]
struct Vehicle {
    id: usize,
    name: String,
}

impl Vehicle {
    fn new(id: usize) -> Self {
        Self { id, name: format!("Vehicle #{id}") }
    }

    fn describe(&self, prefix: &str) -> String {
        format!("{prefix} {}", self.name)
    }

    fn id(&self, (): ()) -> usize {
        self.id
    }

    fn add_id(&mut self, offset: usize) -> usize {
        self.id += offset;
        self.id
    }
}

#[test]
fn modes_are_stated_by_target() {
    assert_eq!(<ByValue<Vehicle> as Target>::MODE, Mode::Copy);
    assert_eq!(<ByRef<Vehicle> as Target>::MODE, Mode::Borrow);
    assert_eq!(<ByShared<Vehicle> as Target>::MODE, Mode::Shared);
}

#[test]
fn can_launch_method_on_copy() {
    let mut vehicle = Vehicle::new(1);
    let mut task = launch_member(ByValue::copy(&vehicle), Vehicle::describe, "Copied");
    vehicle.name.push_str(" (renamed)");
    assert_eq!(task.join().unwrap(), "Copied Vehicle #1");
    assert_eq!(vehicle.name, "Vehicle #1 (renamed)");
}

#[test]
fn can_launch_method_on_moved_object() {
    let mut task = launch_member(ByValue::new(Vehicle::new(2)), Vehicle::id, ());
    assert_eq!(task.join().unwrap(), 2);
}

#[test]
fn can_launch_mutating_method_on_copy() {
    let vehicle = Vehicle::new(1);
    let mut task = launch_member_mut(ByValue::copy(&vehicle), Vehicle::add_id, 10);
    assert_eq!(task.join().unwrap(), 11);
    assert_eq!(vehicle, Vehicle::new(1));
}

#[test]
fn mutating_copies_are_independent() {
    let vehicle = Vehicle::new(1);
    let tasks = (1..=3)
        .map(|offset| {
            launch_member_mut(ByValue::copy(&vehicle), |vehicle: &mut Vehicle, offset| {
                vehicle.name.push_str(" (from Thread)");
                vehicle.add_id(offset);
                vehicle.clone()
            }, offset)
        })
        .collect::<Vec<_>>();
    let copies = tether::join_all(tasks).unwrap();
    assert_eq!(copies.iter().map(|copy| copy.id).collect::<Vec<_>>(), [2, 3, 4]);
    assert!(copies.iter().all(|copy| copy.name == "Vehicle #1 (from Thread)"));
    assert_eq!(vehicle.name, "Vehicle #1");
}

#[test]
fn can_launch_mutating_method_in_scope() {
    let vehicle = Vehicle::new(5);
    let id = scope(|scope| {
        scope
            .launch_member_mut(ByValue::copy(&vehicle), Vehicle::add_id, 1)
            .join()
            .unwrap()
    });
    assert_eq!((id, vehicle.id), (6, 5));
}

#[test]
fn copy_is_taken_at_launch() {
    let mut vehicle = Vehicle::new(1);
    let target = ByValue::copy(&vehicle);
    vehicle.id = 5;
    let mut task = launch_member(target, Vehicle::id, ());
    assert_eq!(task.join().unwrap(), 1);
    assert_eq!(vehicle.id, 5);
}

#[test]
fn shared_object_outlives_launching_scope() {
    let (start, started) = channel();
    let (report, reported) = channel();
    let (mut task, vehicle) = {
        let vehicle = Arc::new(Vehicle::new(3));
        let task = launch_member(ByShared::new(&vehicle), move |vehicle: &Vehicle, ()| {
            started.recv().unwrap();
            report.send(vehicle.describe("Shared")).unwrap();
        }, ());
        (task, Arc::downgrade(&vehicle))
    };
    assert_eq!(vehicle.strong_count(), 1);
    start.send(()).unwrap();
    assert_eq!(reported.recv().unwrap(), "Shared Vehicle #3");
    task.join().unwrap();
    assert!(vehicle.upgrade().is_none());
}

#[test]
fn shared_object_is_released_after_tasks() {
    let vehicle = Arc::new(Vehicle::new(4));
    let tasks = (0..4)
        .map(|_| launch_member(ByShared::new(&vehicle), Vehicle::id, ()))
        .collect::<Vec<_>>();
    assert_eq!(tether::join_all(tasks).unwrap(), [4, 4, 4, 4]);
    assert_eq!(Arc::strong_count(&vehicle), 1);
}

#[test]
fn shared_object_sees_synchronized_mutations() {
    let names = Arc::new(Mutex::new(Vec::new()));
    let tasks = (0..4)
        .map(|index| {
            launch_member(ByShared::from(names.clone()), |names: &Mutex<Vec<usize>>, index| {
                names.lock().unwrap().push(index)
            }, index)
        })
        .collect::<Vec<_>>();
    tether::join_all(tasks).unwrap();
    let mut names = names.lock().unwrap().clone();
    names.sort();
    assert_eq!(names, [0, 1, 2, 3]);
}

#[test]
fn can_launch_method_on_borrowed_object_in_scope() {
    let vehicle = Mutex::new(Vehicle::new(5));
    scope(|scope| {
        let mut task = scope.launch_member(ByRef::new(&vehicle), |vehicle: &Mutex<Vehicle>, suffix: &str| {
            vehicle.lock().unwrap().name.push_str(suffix)
        }, " (from Thread)");
        task.join().unwrap();
    });
    assert_eq!(vehicle.into_inner().unwrap().name, "Vehicle #5 (from Thread)");
}

#[test]
fn borrowed_object_is_shared_by_scoped_tasks() {
    let vehicle = Vehicle::new(6);
    let descriptions = scope(|scope| {
        let tasks = ["a", "b"].map(|prefix| scope.launch_member(ByRef::new(&vehicle), Vehicle::describe, prefix));
        tasks.map(|mut task| task.join().unwrap())
    });
    assert_eq!(descriptions, ["a Vehicle #6", "b Vehicle #6"]);
}
