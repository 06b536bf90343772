//! A minimal heterogeneous list used to hold a statically typed chain of
//! markdown plugins.
//!
//! Items are inserted at the head, so the first item inserted ends up at the
//! tail. [`rfold!`] visits the tail first, which replays insertion order.

#[derive(Debug, Copy, Clone)]
pub struct Nil;

#[derive(Debug, Clone)]
pub struct Cons<H, T> {
    pub head: H,
    pub tail: T,
}

pub trait HList: Sized {
    const LEN: usize;

    fn insert<V>(self, value: V) -> Cons<V, Self> {
        Cons { head: value, tail: self }
    }

    fn len(&self) -> usize { Self::LEN }

    fn is_empty(&self) -> bool { Self::LEN == 0 }
}

impl HList for Nil {
    const LEN: usize = 0;
}

impl<H, T: HList> HList for Cons<H, T> {
    const LEN: usize = T::LEN + 1;
}

impl<H, T> Cons<H, T> {
    pub fn pop(self) -> (H, T) {
        (self.head, self.tail)
    }
}

pub trait ToMut<'a> {
    type Output;

    fn to_mut(&'a mut self) -> Self::Output;
}

impl<'a> ToMut<'a> for Nil {
    type Output = Nil;

    fn to_mut(&'a mut self) -> Self::Output { Nil }
}

impl<'a, H: 'a, T: ToMut<'a>> ToMut<'a> for Cons<H, T> {
    type Output = Cons<&'a mut H, T::Output>;

    fn to_mut(&'a mut self) -> Self::Output {
        Cons { head: &mut self.head, tail: self.tail.to_mut() }
    }
}

pub trait ToRef<'a> {
    type Output;

    fn to_ref(&'a self) -> Self::Output;
}

impl<'a> ToRef<'a> for Nil {
    type Output = Nil;

    fn to_ref(&'a self) -> Self::Output { Nil }
}

impl<'a, H: 'a, T: ToRef<'a>> ToRef<'a> for Cons<H, T> {
    type Output = Cons<&'a H, T::Output>;

    fn to_ref(&'a self) -> Self::Output {
        Cons { head: &self.head, tail: self.tail.to_ref() }
    }
}

mod macros {
    #[doc(hidden)]
    #[macro_export]
    macro_rules! hlist {
        () => ( $crate::util::hlist::Nil );

        ($h:expr $(, $t:expr)* $(,)?) => {
            $crate::util::hlist::Cons {
                head: $h,
                tail: $crate::util::hlist::hlist!($($t),*)
            }
        };
    }

    #[doc(hidden)]
    #[macro_export]
    macro_rules! HList {
        () => ($crate::util::hlist::Nil);

        (.. $T:ty) => ($T);

        ($H:ty) => {
            $crate::util::hlist::Cons<$H, $crate::util::hlist::Nil>
        };

        ($H:ty , $($T:tt)*) => {
            $crate::util::hlist::Cons<$H, $crate::util::hlist::HList!($($T)*)>
        };
    }

    /// Folds `$hlist` from its tail to its head. `[$dots]` must hold one
    /// token per list element.
    #[doc(hidden)]
    #[macro_export]
    macro_rules! rfold {
        ([] $hlist:expr, $acc:expr, |$i:pat_param, $j:pat_param| $f:expr) => ({
            $acc
        });

        ([$dot:tt $($dots:tt)*] $hlist:expr, $acc:expr, |$i:pat_param, $j:pat_param| $f:expr) => ({
            let list = $hlist;
            let ($i, _rest) = list.pop();
            let $j = $crate::util::hlist::rfold!([$($dots)*] _rest, $acc, |$i, $j| $f);
            $f
        })
    }

    #[doc(hidden)]
    #[macro_export]
    macro_rules! for_each_mut {
        ([$($dots:tt)*] $hlist:expr, |$i:pat_param| $f:expr) => (
            $crate::util::hlist::rfold!([$($dots)*] $hlist, (), |$i, _| $f)
        )
    }

    pub use {HList, hlist, rfold, for_each_mut};
}

#[doc(inline)]
pub use macros::*;
