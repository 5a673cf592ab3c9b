use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Deref;
use std::rc::Rc;

use crate::connection::Connection;
use crate::value::{ValueBody, ValueView};

/// A read-only value derived from another observable.
///
/// It owns the single connection that feeds it. Disconnecting that
/// connection freezes the mapped value at its last result while leaving its
/// own listeners registered. Dropping the last handle disconnects it too.
pub struct MappedValue<T> {
	view: ValueView<T>,
}

impl<T> Clone for MappedValue<T> {
	fn clone(&self) -> Self {
		Self {
			view: self.view.clone(),
		}
	}
}

impl<T> MappedValue<T>
where
	T: Clone + PartialEq + 'static,
{
	pub(crate) fn new(body: Rc<ValueBody<T>>) -> Self {
		MappedValue {
			view: ValueView::new(body),
		}
	}

	/// The upstream connection that keeps this value up to date.
	#[inline]
	pub fn connection(&self) -> Connection {
		self.view.body.upstream()
	}

	#[inline]
	pub fn view(&self) -> ValueView<T> {
		self.view.clone()
	}
}

impl<T> Deref for MappedValue<T> {
	type Target = ValueView<T>;
	fn deref(&self) -> &Self::Target {
		&self.view
	}
}

impl<T> PartialEq for MappedValue<T>
where
	T: PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.view == other.view
	}
}

impl<T> Hash for MappedValue<T>
where
	T: Hash,
{
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.view.hash(state)
	}
}

impl<T> Debug for MappedValue<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.view.fmt(f)
	}
}

impl<T> From<MappedValue<T>> for ValueView<T> {
	fn from(mapped: MappedValue<T>) -> Self {
		mapped.view
	}
}

impl<T> From<&MappedValue<T>> for ValueView<T> {
	fn from(mapped: &MappedValue<T>) -> Self {
		mapped.view.clone()
	}
}
