use std::fmt::Debug;
use std::rc::Rc;

use crate::connection::Connection;
use crate::reactor::{Priority, Reactor, Slot, DEFAULT_PRIORITY};

/// A stream of discrete events with no retained state.
///
/// Every [`emit`](Signal::emit) reaches every connected slot, highest
/// priority first.
pub struct Signal<T> {
	reactor: Rc<Reactor<T>>,
}

impl<T> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			reactor: self.reactor.clone(),
		}
	}
}

impl<T: 'static> Default for Signal<T> {
	fn default() -> Self {
		Signal::new()
	}
}

impl<T> Signal<T>
where
	T: 'static,
{
	pub fn new() -> Self {
		Self::new_with_name("<unnamed>")
	}

	pub fn new_with_name(name: &'static str) -> Self {
		Signal {
			reactor: Reactor::new(name),
		}
	}

	/// Delivers `event` to every connected slot before returning.
	pub fn emit(&self, event: T) {
		self.reactor.dispatch(&event, None);
	}

	pub fn connect(&self, slot: impl Fn(&T) + 'static) -> Connection {
		self.connect_with_priority(DEFAULT_PRIORITY, slot)
	}

	pub fn connect_with_priority(
		&self,
		priority: Priority,
		slot: impl Fn(&T) + 'static,
	) -> Connection {
		self.reactor.connect(Slot::Emit(Box::new(slot)), priority)
	}

	/// Connects a slot that ignores the emitted event.
	pub fn connect_unit(&self, slot: impl Fn() + 'static) -> Connection {
		self.connect_unit_with_priority(DEFAULT_PRIORITY, slot)
	}

	pub fn connect_unit_with_priority(
		&self,
		priority: Priority,
		slot: impl Fn() + 'static,
	) -> Connection {
		self.reactor.connect(Slot::Unit(Box::new(slot)), priority)
	}

	/// Whether an `emit` of this signal is in progress.
	pub fn is_dispatching(&self) -> bool {
		self.reactor.is_dispatching()
	}

	pub fn has_connections(&self) -> bool {
		self.connection_count() > 0
	}

	pub fn connection_count(&self) -> usize {
		self.reactor.len()
	}
}

impl<T> Debug for Signal<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Signal")
			.field("name", &self.reactor.name())
			.finish()
	}
}
