use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Deref;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::connection::Connection;
use crate::mapped::MappedValue;
use crate::reactor::{Priority, Reactor, Slot, DEFAULT_PRIORITY};

pub(crate) struct ValueBody<T> {
	value: RefCell<T>,
	reactor: Rc<Reactor<T>>,
	/// Link that keeps a derived value fed. Detached for plain values.
	upstream: RefCell<Connection>,
	/// Observables a derived value reads from, kept alive as long as it is.
	sources: RefCell<SmallVec<[Rc<dyn Any>; 1]>>,
}

impl<T> Drop for ValueBody<T> {
	fn drop(&mut self) {
		self.upstream.get_mut().disconnect();
	}
}

impl<T> ValueBody<T>
where
	T: Clone + PartialEq + 'static,
{
	pub fn new(name: &'static str, value: T) -> Rc<Self> {
		Rc::new(ValueBody {
			value: RefCell::new(value),
			reactor: Reactor::new(name),
			upstream: RefCell::new(Connection::detached()),
			sources: RefCell::new(SmallVec::new()),
		})
	}

	pub fn get(&self) -> T {
		self.value.borrow().clone()
	}

	pub fn upstream(&self) -> Connection {
		self.upstream.borrow().clone()
	}

	/// Makes this a derived value fed through `connection`.
	pub fn attach(&self, connection: Connection, sources: impl IntoIterator<Item = Rc<dyn Any>>) {
		let previous = self.upstream.replace(connection);
		previous.disconnect();
		self.sources.borrow_mut().extend(sources);
	}

	/// Stores and announces `value` unless it equals the current one.
	pub fn update_and_notify_if(&self, value: T) -> bool {
		let unchanged = *self.value.borrow() == value;
		if unchanged {
			return false;
		}

		self.update_and_notify(value);
		true
	}

	/// Stores `value`, then notifies listeners with the new and old values.
	/// Returns the previous value.
	pub fn update_and_notify(&self, value: T) -> T {
		let old = self.value.replace(value.clone());
		self.reactor.dispatch(&value, Some(&old));
		old
	}
}

/// Read-only handle to an observable value.
///
/// Every value kind converts into a `ValueView`, which exposes reading and
/// listening but no way to change the value.
pub struct ValueView<T> {
	pub(crate) body: Rc<ValueBody<T>>,
}

impl<T> Clone for ValueView<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T> ValueView<T>
where
	T: Clone + PartialEq + 'static,
{
	pub(crate) fn new(body: Rc<ValueBody<T>>) -> Self {
		ValueView { body }
	}

	/// Returns a copy of the current value.
	#[inline]
	pub fn get(&self) -> T {
		self.body.get()
	}

	/// Borrows the current value. The value cannot be updated until `func`
	/// returns.
	#[inline]
	pub fn with<R>(&self, func: impl FnOnce(&T) -> R) -> R {
		func(&*self.borrow())
	}

	#[inline]
	pub fn borrow(&self) -> Ref<'_, T> {
		self.body.value.borrow()
	}

	/// Calls `slot` with the new value on every change.
	pub fn connect(&self, slot: impl Fn(&T) + 'static) -> Connection {
		self.connect_with_priority(DEFAULT_PRIORITY, slot)
	}

	pub fn connect_with_priority(
		&self,
		priority: Priority,
		slot: impl Fn(&T) + 'static,
	) -> Connection {
		self.body.reactor.connect(Slot::Emit(Box::new(slot)), priority)
	}

	/// Connects `slot` and immediately calls it with the current value.
	pub fn connect_notify(&self, slot: impl Fn(&T) + 'static) -> Connection {
		let slot = Rc::new(slot);
		let connection = self.connect({
			let slot = slot.clone();
			move |value| slot(value)
		});
		slot(&self.get());
		connection
	}

	pub fn connect_unit(&self, slot: impl Fn() + 'static) -> Connection {
		self.connect_unit_with_priority(DEFAULT_PRIORITY, slot)
	}

	pub fn connect_unit_with_priority(
		&self,
		priority: Priority,
		slot: impl Fn() + 'static,
	) -> Connection {
		self.body.reactor.connect(Slot::Unit(Box::new(slot)), priority)
	}

	/// Calls `listener` with the new and the old value on every change.
	pub fn listen(&self, listener: impl Fn(&T, Option<&T>) + 'static) -> Connection {
		self.listen_with_priority(DEFAULT_PRIORITY, listener)
	}

	pub fn listen_with_priority(
		&self,
		priority: Priority,
		listener: impl Fn(&T, Option<&T>) + 'static,
	) -> Connection {
		self.body
			.reactor
			.connect(Slot::Change(Box::new(listener)), priority)
	}

	/// Connects `listener` and immediately calls it with the current value
	/// and no old value.
	pub fn listen_notify(&self, listener: impl Fn(&T, Option<&T>) + 'static) -> Connection {
		let listener = Rc::new(listener);
		let connection = self.listen({
			let listener = listener.clone();
			move |value, old| listener(value, old)
		});
		listener(&self.get(), None);
		connection
	}

	/// Derives a value that follows this one through `func`.
	///
	/// The derived value only notifies when its own result changes, so a
	/// non-injective `func` can swallow changes of this value.
	pub fn map<R, F>(&self, func: F) -> MappedValue<R>
	where
		R: Clone + PartialEq + 'static,
		F: Fn(&T) -> R + 'static,
	{
		self.map_with_name("<mapped>", func)
	}

	/// Same as [`map`](ValueView::map), naming the derived value in trace
	/// events and `Debug` output.
	///
	/// The derived value is recomputed from the source's current value, not
	/// from the dispatched one, so a listener that updates the source
	/// reentrantly cannot leave it stale.
	pub fn map_with_name<R, F>(&self, name: &'static str, func: F) -> MappedValue<R>
	where
		R: Clone + PartialEq + 'static,
		F: Fn(&T) -> R + 'static,
	{
		let mapped = ValueBody::new(name, self.with(&func));
		let source = Rc::downgrade(&self.body);
		let target = Rc::downgrade(&mapped);
		let connection = self.connect_unit(move || {
			if let (Some(source), Some(mapped)) = (source.upgrade(), target.upgrade()) {
				let next = func(&*source.value.borrow());
				mapped.update_and_notify_if(next);
			}
		});
		mapped.attach(connection, [self.body.clone() as Rc<dyn Any>]);

		MappedValue::new(mapped)
	}

	/// Whether listeners of this value are being notified right now.
	pub fn is_dispatching(&self) -> bool {
		self.body.reactor.is_dispatching()
	}

	pub fn has_connections(&self) -> bool {
		self.connection_count() > 0
	}

	pub fn connection_count(&self) -> usize {
		self.body.reactor.len()
	}
}

impl<T> PartialEq for ValueView<T>
where
	T: PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		*self.body.value.borrow() == *other.body.value.borrow()
	}
}

impl<T> Hash for ValueView<T>
where
	T: Hash,
{
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.body.value.borrow().hash(state)
	}
}

impl<T> Debug for ValueView<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple(self.body.reactor.name())
			.field(&*self.body.value.borrow())
			.finish()
	}
}

/// A mutable observable value.
///
/// Listeners fire only when an update changes the value by `PartialEq`,
/// unless the update is forced.
pub struct Value<T> {
	view: ValueView<T>,
}

impl<T> Clone for Value<T> {
	fn clone(&self) -> Self {
		Self {
			view: self.view.clone(),
		}
	}
}

impl<T> Default for Value<T>
where
	T: Clone + PartialEq + Default + 'static,
{
	fn default() -> Self {
		Value::new(Default::default())
	}
}

impl<T> Value<T>
where
	T: Clone + PartialEq + 'static,
{
	pub fn new(value: T) -> Self {
		Self::new_with_name("<unnamed>", value)
	}

	pub fn new_with_name(name: &'static str, value: T) -> Self {
		Value {
			view: ValueView::new(ValueBody::new(name, value)),
		}
	}

	/// Replaces the value and notifies listeners if it changed.
	///
	/// Returns whether listeners were notified.
	#[inline]
	pub fn update(&self, value: T) -> bool {
		self.view.body.update_and_notify_if(value)
	}

	/// Replaces the value and notifies listeners even if it is equal to the
	/// current one. Returns the previous value.
	#[inline]
	pub fn update_force(&self, value: T) -> T {
		self.view.body.update_and_notify(value)
	}

	/// Applies `func` to a copy of the value and stores the result.
	pub fn modify(&self, func: impl FnOnce(&mut T)) -> bool {
		let mut value = self.get();
		func(&mut value);
		self.update(value)
	}

	#[inline]
	pub fn view(&self) -> ValueView<T> {
		self.view.clone()
	}
}

impl Value<bool> {
	pub fn toggle(&self) {
		self.modify(|value| *value = !*value);
	}
}

impl<T> Deref for Value<T> {
	type Target = ValueView<T>;
	fn deref(&self) -> &Self::Target {
		&self.view
	}
}

impl<T> PartialEq for Value<T>
where
	T: PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.view == other.view
	}
}

impl<T> Hash for Value<T>
where
	T: Hash,
{
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.view.hash(state)
	}
}

impl<T> Debug for Value<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.view.fmt(f)
	}
}

impl<T> From<Value<T>> for ValueView<T> {
	fn from(value: Value<T>) -> Self {
		value.view
	}
}

impl<T> From<&Value<T>> for ValueView<T> {
	fn from(value: &Value<T>) -> Self {
		value.view.clone()
	}
}
