//! The [`Shroud<T>`] trait erases the concrete type (and with it, any
//! lifetime) of an anchored value behind a `dyn Trait`, so that
//! [`Anchor::tether_as`](crate::Anchor::tether_as) can produce a `'static`
//! [`Tether`](crate::Tether) to a value that borrows from the stack.

use core::ptr::NonNull;

/// A trait for erasing the type of a pointer by converting it to a dynamic
/// trait pointer.
///
/// It is already implemented for `Fn(T0, .., T3) -> T` and its combinations
/// with [`Send`] and [`Sync`]. See the [`shroud`](crate::shroud!) macro to
/// implement it for other traits.
pub trait Shroud<T: ?Sized> {
    fn shroud(from: NonNull<T>) -> NonNull<Self>;
}

/// Implements [`Shroud<T>`] for `dyn Trait`, for all `T: Trait`.
///
/// ```
/// use tether::{Anchor, launch_member, lock::Lock, shroud};
///
/// pub trait Describe: Send + Sync {
///     fn describe(&self) -> String;
/// }
///
/// // Implements `Shroud<T: Describe>` for `dyn Describe`.
/// shroud!(Describe);
///
/// struct Vehicle<'a>(&'a str);
///
/// impl Describe for Vehicle<'_> {
///     fn describe(&self) -> String {
///         format!("Vehicle {}", self.0)
///     }
/// }
///
/// let name = String::from("#1");
/// let description = Anchor::<_, Lock>::with(Vehicle(&name), |anchor| {
///     let tether = anchor.tether_as::<dyn Describe>();
///     launch_member(tether, |vehicle, ()| vehicle.describe(), ()).join()
/// });
/// assert_eq!(description.unwrap(), "Vehicle #1");
/// ```
#[macro_export]
macro_rules! shroud {
    ($type: ident) => {
        $crate::shroud!(@IMPLEMENT { type: $type, traits: () });
    };
    ($type: ident +) => {
        $crate::shroud!(@IMPLEMENT { type: $type, traits: () });
        $crate::shroud!(@IMPLEMENT { type: $type, traits: (Send) });
        $crate::shroud!(@IMPLEMENT { type: $type, traits: (Sync) });
        $crate::shroud!(@IMPLEMENT { type: $type, traits: (Send, Sync) });
    };
    ($type: ident $(+ $trait: ident)+) => {
        $crate::shroud!(@IMPLEMENT { type: $type, traits: ($($trait),*) });
    };
    (@IMPLEMENT { type: $type: ident, traits: ($($trait: path),*) $(,)? }) => {
        #[automatically_derived]
        impl<TConcrete: $type $(+ $trait)*> $crate::shroud::Shroud<TConcrete> for dyn $type $(+ $trait)* {
            #[inline(always)]
            fn shroud(from: ::core::ptr::NonNull<TConcrete>) -> ::core::ptr::NonNull<Self> {
                // # Safety
                // The pointer comes from a `NonNull` and only its lifetime is
                // changed; the anchor keeps it valid.
                unsafe {
                    ::core::ptr::NonNull::new_unchecked(::core::mem::transmute::<
                        *mut (dyn $type $(+ $trait)*),
                        *mut Self,
                    >(from.as_ptr() as _))
                }
            }
        }
    };
}

macro_rules! shroud_fn {
    ($function: ident($(,)?) -> $return: ident) => {
        shroud_fn!(@TRAITS { function: $function, parameters: (), return: $return });
    };
    ($function: ident($parameter: ident $(, $parameters: ident)* $(,)?) -> $return: ident) => {
        shroud_fn!($function($($parameters),*) -> $return);
        shroud_fn!(@TRAITS { function: $function, parameters: ($parameter $(, $parameters)*), return: $return });
    };
    (@TRAITS { function: $function: ident, parameters: $parameters: tt, return: $return: ident }) => {
        shroud_fn!(@IMPLEMENT { function: $function, parameters: $parameters, return: $return, traits: () });
        shroud_fn!(@IMPLEMENT { function: $function, parameters: $parameters, return: $return, traits: (Send) });
        shroud_fn!(@IMPLEMENT { function: $function, parameters: $parameters, return: $return, traits: (Sync) });
        shroud_fn!(@IMPLEMENT { function: $function, parameters: $parameters, return: $return, traits: (Send, Sync) });
    };
    (@IMPLEMENT { function: $function: ident, parameters: ($($parameter: ident),*), return: $return: ident, traits: ($($trait: path),*) $(,)? }) => {
        #[automatically_derived]
        #[allow(unused_parens)]
        impl<$($parameter,)* $return, TConcrete: $function($($parameter),*) -> $return $(+ $trait)*> Shroud<TConcrete> for dyn $function($($parameter),*) -> $return $(+ $trait)* {
            #[inline(always)]
            fn shroud(from: NonNull<TConcrete>) -> NonNull<Self> {
                unsafe {
                    NonNull::new_unchecked(::core::mem::transmute::<
                        *mut (dyn $function($($parameter),*) -> $return $(+ $trait)*),
                        *mut Self,
                    >(from.as_ptr() as _))
                }
            }
        }
    };
}

shroud_fn!(Fn(T0, T1, T2, T3) -> T);
