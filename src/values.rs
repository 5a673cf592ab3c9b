//! Boolean combinators built on top of values and signals.

use std::any::Any;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::connection::Connection;
use crate::mapped::MappedValue;
use crate::signal::Signal;
use crate::value::{ValueBody, ValueView};

type Sources = SmallVec<[Weak<ValueBody<bool>>; 4]>;

/// A boolean that flips every time `signal` fires.
pub fn toggler<E: 'static>(signal: &Signal<E>, initial: bool) -> MappedValue<bool> {
	toggler_with_name("<toggler>", signal, initial)
}

pub fn toggler_with_name<E: 'static>(
	name: &'static str,
	signal: &Signal<E>,
	initial: bool,
) -> MappedValue<bool> {
	let toggled = ValueBody::new(name, initial);
	let target = Rc::downgrade(&toggled);
	let connection = signal.connect_unit(move || {
		if let Some(toggled) = target.upgrade() {
			let next = !toggled.get();
			toggled.update_and_notify_if(next);
		}
	});
	toggled.attach(connection, std::iter::empty());

	MappedValue::new(toggled)
}

/// The logical NOT of `value`.
pub fn not(value: impl Into<ValueView<bool>>) -> MappedValue<bool> {
	value.into().map(|value| !value)
}

/// The logical AND of `values`. True when `values` is empty.
pub fn and<I>(values: I) -> MappedValue<bool>
where
	I: IntoIterator,
	I::Item: Into<ValueView<bool>>,
{
	aggregate("<and>", values, |sources| current(sources).all(|value| value))
}

/// The logical OR of `values`. False when `values` is empty.
pub fn or<I>(values: I) -> MappedValue<bool>
where
	I: IntoIterator,
	I::Item: Into<ValueView<bool>>,
{
	aggregate("<or>", values, |sources| current(sources).any(|value| value))
}

fn current(sources: &Sources) -> impl Iterator<Item = bool> + '_ {
	sources
		.iter()
		.filter_map(Weak::upgrade)
		.map(|source| source.get())
}

/// Recomputes `fold` over every source whenever any of them changes. The
/// resulting connection fans out to one link per source.
fn aggregate<I>(name: &'static str, values: I, fold: fn(&Sources) -> bool) -> MappedValue<bool>
where
	I: IntoIterator,
	I::Item: Into<ValueView<bool>>,
{
	let views: SmallVec<[ValueView<bool>; 4]> = values.into_iter().map(Into::into).collect();
	let sources: Rc<Sources> = Rc::new(views.iter().map(|view| Rc::downgrade(&view.body)).collect());

	let aggregated = ValueBody::new(name, fold(&sources));
	let target = Rc::downgrade(&aggregated);
	let connections = views.iter().map(|view| {
		let sources = sources.clone();
		let target = target.clone();
		view.connect_unit(move || {
			if let Some(aggregated) = target.upgrade() {
				aggregated.update_and_notify_if(fold(&sources));
			}
		})
	});

	aggregated.attach(
		Connection::join(connections),
		views.iter().map(|view| view.body.clone() as Rc<dyn Any>),
	);

	MappedValue::new(aggregated)
}
