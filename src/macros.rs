pub use enclose::*;

/// Builds a slot closure for `connect`, cloning the listed captures first.
///
/// ```
/// use signal_slots::{slot, Signal, Value};
///
/// let total = Value::new(0);
/// let signal = Signal::<i32>::new();
/// signal.connect(slot!((total) amount => {
/// 	total.update(total.get() + *amount);
/// }));
///
/// signal.emit(5);
/// assert_eq!(total.get(), 5);
/// ```
#[macro_export]
macro_rules! slot {
    (( $($d_tt:tt)* ) $value:ident => $($b:tt)*) => {
        $crate::macros::enclose!(($( $d_tt )*) move |$value: &_| { $($b)* })
    };
    ($value:ident => $($b:tt)*) => {
        move |$value: &_| { $($b)* }
    };
}

/// Builds a listener closure for `listen`, receiving the new and old value.
#[macro_export]
macro_rules! listener {
    (( $($d_tt:tt)* ) $value:ident, $old:ident => $($b:tt)*) => {
        $crate::macros::enclose!(($( $d_tt )*) move |$value: &_, $old: Option<&_>| { $($b)* })
    };
    ($value:ident, $old:ident => $($b:tt)*) => {
        move |$value: &_, $old: Option<&_>| { $($b)* }
    };
}
