//! Signals and observable values for single-threaded, event-driven code.
//!
//! Producers [`emit`](Signal::emit) events or [`update`](Value::update)
//! values, and every connected slot runs synchronously, highest priority
//! first and in registration order among equal priorities. Slots may connect,
//! disconnect or emit from inside their own invocation: changes to a
//! connection list made during a dispatch take effect once that dispatch is
//! done, except that a disconnected slot never fires again.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use signal_slots::Value;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let count = Value::new(1);
//! let doubled = count.map(|count| count * 2);
//!
//! doubled.listen({
//! 	let seen = seen.clone();
//! 	move |value, old| seen.borrow_mut().push((*value, old.copied()))
//! });
//!
//! count.update(2);
//! count.update(2);
//! assert_eq!(*seen.borrow(), [(4, Some(2))]);
//! ```

pub mod macros;
pub mod values;

mod addr;
mod connection;
mod mapped;
mod reactor;
mod signal;
mod value;

pub use connection::Connection;
pub use mapped::MappedValue;
pub use reactor::{Priority, DEFAULT_PRIORITY};
pub use signal::Signal;
pub use value::{Value, ValueView};
