//! Uniform calling convention for functions of any arity.
//!
//! Arguments travel as a tuple so the engine can treat every function the
//! same way: `f.invoke((a, b))` calls `f(a, b)`.

use std::any::type_name;

use crate::extract::Arguments;

/// A function callable with an argument tuple.
pub trait Callable<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_callable {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> Callable<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                (self)($($arg),*)
            }
        }

        impl<$($arg,)*> Arguments for ($($arg,)*) {
            fn type_names(&self) -> Vec<&'static str> {
                vec![$(type_name::<$arg>()),*]
            }
        }
    };
}

impl_callable!();
impl_callable!(A1);
impl_callable!(A1, A2);
impl_callable!(A1, A2, A3);
impl_callable!(A1, A2, A3, A4);
impl_callable!(A1, A2, A3, A4, A5);
impl_callable!(A1, A2, A3, A4, A5, A6);
impl_callable!(A1, A2, A3, A4, A5, A6, A7);
impl_callable!(A1, A2, A3, A4, A5, A6, A7, A8);
