#![cfg(feature = "lock")]

use tether::{Anchor, launch_member, lock::Lock, shroud};

pub trait Describe {
    fn describe(&self) -> String;
}

shroud!(Describe +);

pub trait Count: Send + Sync {
    fn count(&self) -> usize;
}

shroud!(Count);

struct Vehicle<'a> {
    name: &'a str,
    wheels: &'a [usize],
}

impl Describe for Vehicle<'_> {
    fn describe(&self) -> String {
        format!("{} with {} wheels", self.name, self.count())
    }
}

impl Count for Vehicle<'_> {
    fn count(&self) -> usize {
        self.wheels.iter().sum()
    }
}

#[test]
fn can_shroud_custom_trait() {
    let wheels = vec![2, 2];
    let vehicle = Vehicle { name: "Car", wheels: &wheels };
    let count = Anchor::<_, Lock>::with(vehicle, |anchor| {
        let tether = anchor.tether_as::<dyn Count>();
        launch_member(tether, |vehicle, ()| vehicle.count(), ()).join()
    });
    assert_eq!(count.unwrap(), 4);
}

#[test]
fn can_shroud_with_marker_traits() {
    let wheels = [1, 1, 1];
    let vehicle = Vehicle { name: "Tricycle", wheels: &wheels };
    let description = Anchor::<_, Lock>::with(vehicle, |anchor| {
        let tether = anchor.tether_as::<dyn Describe + Send + Sync>();
        launch_member(tether, |vehicle, ()| vehicle.describe(), ()).join()
    });
    assert_eq!(description.unwrap(), "Tricycle with 3 wheels");
}

#[test]
fn can_shroud_function_arities() {
    let offset = 1;
    let zero = || offset;
    let one = |a: usize| a + offset;
    let four = |a: usize, b: usize, c: usize, d: usize| a + b + c + d + offset;
    let results = Anchor::<_, Lock>::with(&zero, |zero| {
        Anchor::<_, Lock>::with(&one, |one| {
            Anchor::<_, Lock>::with(&four, |four| {
                let zero = zero.tether_as::<dyn Fn() -> usize + Send + Sync>();
                let one = one.tether_as::<dyn Fn(usize) -> usize + Send + Sync>();
                let four = four.tether_as::<dyn Fn(usize, usize, usize, usize) -> usize + Sync>();
                (
                    zero.borrow().map(|zero| zero()),
                    one.borrow().map(|one| one(1)),
                    four.borrow().map(|four| four(1, 2, 3, 4)),
                )
            })
        })
    });
    assert_eq!(results, (Some(1), Some(2), Some(11)));
}
