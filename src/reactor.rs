//! The connection list and dispatcher shared by every observable.
//!
//! A [`Reactor`] keeps its connections sorted by descending priority, with
//! ties kept in registration order. While a dispatch walks the list, the list
//! itself is frozen: connections added or removed from inside a slot are
//! queued and applied once the outermost dispatch of that reactor finishes.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use fxhash::FxHashSet;
use smallvec::SmallVec;

use crate::addr::RcAddr;
use crate::connection::{Connection, Link};

/// Ordering key for slots. Higher priorities fire first.
pub type Priority = i32;

pub const DEFAULT_PRIORITY: Priority = 0;

/// Everything a connection can invoke.
pub(crate) enum Slot<T> {
	/// Receives the emitted value or the new value of a value.
	Emit(Box<dyn Fn(&T)>),
	/// Receives the new value and, when there is one, the old value.
	Change(Box<dyn Fn(&T, Option<&T>)>),
	Unit(Box<dyn Fn()>),
}

impl<T> Slot<T> {
	fn invoke(&self, value: &T, old: Option<&T>) {
		match self {
			Slot::Emit(func) => func(value),
			Slot::Change(func) => func(value, old),
			Slot::Unit(func) => func(),
		}
	}
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum ConsState {
	Connected,
	OneShot,
	Disconnected,
}

pub(crate) struct Cons<T> {
	slot: Slot<T>,
	priority: Priority,
	state: Cell<ConsState>,
	owner: Weak<Reactor<T>>,
	this: Weak<Cons<T>>,
}

impl<T: 'static> Cons<T> {
	fn fire(&self, value: &T, old: Option<&T>) {
		match self.state.get() {
			ConsState::Disconnected => return,
			ConsState::OneShot => self.disconnect(),
			ConsState::Connected => {}
		}

		self.slot.invoke(value, old);
	}
}

impl<T: 'static> Link for Cons<T> {
	fn disconnect(&self) {
		if self.state.replace(ConsState::Disconnected) == ConsState::Disconnected {
			return;
		}

		if let (Some(owner), Some(this)) = (self.owner.upgrade(), self.this.upgrade()) {
			owner.remove(this);
		}
	}

	fn once(&self) {
		if self.state.get() == ConsState::Connected {
			self.state.set(ConsState::OneShot);
		}
	}

	fn is_connected(&self) -> bool {
		self.state.get() != ConsState::Disconnected
	}
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum Phase {
	Idle,
	/// Nested dispatches of the same reactor bump the depth.
	Dispatching { depth: usize },
}

impl Phase {
	pub fn is_dispatching(self) -> bool {
		matches!(self, Phase::Dispatching { .. })
	}
}

pub(crate) struct Reactor<T> {
	name: &'static str,
	inner: RefCell<ReactorInner<T>>,
	this: Weak<Reactor<T>>,
}

struct ReactorInner<T> {
	listeners: Rc<Vec<Rc<Cons<T>>>>,
	phase: Phase,
	to_add: SmallVec<[Rc<Cons<T>>; 4]>,
	to_remove: FxHashSet<RcAddr<Cons<T>>>,
}

impl<T> Reactor<T> {
	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl<T: 'static> Reactor<T> {
	pub fn new(name: &'static str) -> Rc<Self> {
		Rc::new_cyclic(|this| Reactor {
			name,
			inner: RefCell::new(ReactorInner {
				listeners: Rc::new(Vec::new()),
				phase: Phase::Idle,
				to_add: SmallVec::new(),
				to_remove: FxHashSet::default(),
			}),
			this: this.clone(),
		})
	}

	pub fn connect(&self, slot: Slot<T>, priority: Priority) -> Connection {
		let cons = Rc::new_cyclic(|this| Cons {
			slot,
			priority,
			state: Cell::new(ConsState::Connected),
			owner: self.this.clone(),
			this: this.clone(),
		});
		self.insert(cons.clone());
		Connection::new(cons)
	}

	pub fn phase(&self) -> Phase {
		self.inner.borrow().phase
	}

	pub fn is_dispatching(&self) -> bool {
		self.phase().is_dispatching()
	}

	/// Live connections, counting those queued by an in-progress dispatch.
	pub fn len(&self) -> usize {
		let inner = self.inner.borrow();
		inner
			.listeners
			.iter()
			.chain(inner.to_add.iter())
			.filter(|cons| cons.is_connected())
			.count()
	}

	fn insert(&self, cons: Rc<Cons<T>>) {
		let mut inner = self.inner.borrow_mut();
		let deferred = inner.phase.is_dispatching();

		tracing::trace!(
			reactor = self.name,
			priority = cons.priority,
			deferred,
			"connect"
		);

		if deferred {
			inner.to_add.push(cons);
		} else {
			splice(Rc::make_mut(&mut inner.listeners), cons);
		}
	}

	fn remove(&self, cons: Rc<Cons<T>>) {
		let removed = {
			let mut inner = self.inner.borrow_mut();
			let deferred = inner.phase.is_dispatching();

			tracing::trace!(
				reactor = self.name,
				priority = cons.priority,
				deferred,
				"disconnect"
			);

			if deferred {
				inner.to_remove.insert(RcAddr::new(cons));
				None
			} else {
				let index = inner
					.listeners
					.iter()
					.position(|other| Rc::ptr_eq(other, &cons));
				index.map(|index| Rc::make_mut(&mut inner.listeners).remove(index))
			}
		};

		// Slots may own handles whose drop reenters this reactor.
		std::mem::drop(removed);
	}

	/// Invokes every connected slot in order, synchronously.
	///
	/// A slot that panics unwinds out of here and the remaining slots are
	/// skipped. The list is reconciled on the way out either way.
	pub fn dispatch(&self, value: &T, old: Option<&T>) {
		let guard = DispatchGuard::enter(self);

		tracing::trace!(
			reactor = self.name,
			listeners = guard.snapshot.len(),
			depth = guard.depth,
			"dispatch"
		);

		for cons in guard.snapshot.iter() {
			cons.fire(value, old);
		}
	}

	fn leave(&self) {
		let (to_remove, dropped) = {
			let mut inner = self.inner.borrow_mut();
			match inner.phase {
				Phase::Dispatching { depth } if depth > 1 => {
					inner.phase = Phase::Dispatching { depth: depth - 1 };
					return;
				}
				_ => inner.phase = Phase::Idle,
			}

			let to_remove = std::mem::take(&mut inner.to_remove);
			let to_add = std::mem::take(&mut inner.to_add);
			if to_remove.is_empty() && to_add.is_empty() {
				return;
			}

			tracing::trace!(
				reactor = self.name,
				removed = to_remove.len(),
				added = to_add.len(),
				"reconcile"
			);

			let listeners = Rc::make_mut(&mut inner.listeners);
			if !to_remove.is_empty() {
				listeners.retain(|cons| !to_remove.contains(&RcAddr::of(cons)));
			}

			let mut dropped = SmallVec::<[Rc<Cons<T>>; 4]>::new();
			for cons in to_add {
				if cons.is_connected() {
					splice(listeners, cons);
				} else {
					dropped.push(cons);
				}
			}

			(to_remove, dropped)
		};

		std::mem::drop(to_remove);
		std::mem::drop(dropped);
	}
}

/// Inserts after every connection of equal or higher priority.
fn splice<T>(listeners: &mut Vec<Rc<Cons<T>>>, cons: Rc<Cons<T>>) {
	let index = listeners.partition_point(|other| other.priority >= cons.priority);
	listeners.insert(index, cons);
}

struct DispatchGuard<'a, T: 'static> {
	reactor: &'a Reactor<T>,
	snapshot: Rc<Vec<Rc<Cons<T>>>>,
	depth: usize,
}

impl<'a, T: 'static> DispatchGuard<'a, T> {
	fn enter(reactor: &'a Reactor<T>) -> Self {
		let mut inner = reactor.inner.borrow_mut();
		let depth = match inner.phase {
			Phase::Idle => 1,
			Phase::Dispatching { depth } => depth + 1,
		};
		inner.phase = Phase::Dispatching { depth };

		DispatchGuard {
			reactor,
			snapshot: inner.listeners.clone(),
			depth,
		}
	}
}

impl<'a, T: 'static> Drop for DispatchGuard<'a, T> {
	fn drop(&mut self) {
		std::mem::drop(std::mem::take(&mut self.snapshot));
		self.reactor.leave();
	}
}

impl<T> Debug for Reactor<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.inner.borrow();
		f.debug_struct("Reactor")
			.field("name", &self.name)
			.field("listeners", &inner.listeners.len())
			.field("phase", &inner.phase)
			.finish()
	}
}
