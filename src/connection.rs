use std::fmt::Debug;
use std::rc::Rc;

use smallvec::SmallVec;

/// One registration inside some observable's connection list.
pub(crate) trait Link: 'static {
	fn disconnect(&self);

	/// Marks the registration to be detached after its next firing.
	fn once(&self);

	fn is_connected(&self) -> bool;
}

/// Handle to a registered slot or listener.
///
/// Dropping a `Connection` does not disconnect it. Every operation is a
/// no-op once the registration has been detached, either explicitly, by a
/// one-shot firing, or because the observable it was registered with is gone.
#[derive(Clone)]
pub struct Connection {
	kind: Kind,
}

#[derive(Clone)]
enum Kind {
	Detached,
	Single(Rc<dyn Link>),
	Composite(Rc<SmallVec<[Connection; 4]>>),
}

impl Connection {
	pub(crate) fn new(link: Rc<dyn Link>) -> Self {
		Connection {
			kind: Kind::Single(link),
		}
	}

	/// A connection that is not attached to anything.
	pub fn detached() -> Self {
		Connection {
			kind: Kind::Detached,
		}
	}

	/// Bundles several connections so that `disconnect` and `once` fan out
	/// to every member.
	pub fn join(connections: impl IntoIterator<Item = Connection>) -> Self {
		let members: SmallVec<[Connection; 4]> = connections.into_iter().collect();
		Connection {
			kind: Kind::Composite(Rc::new(members)),
		}
	}

	pub fn disconnect(&self) {
		match &self.kind {
			Kind::Detached => {}
			Kind::Single(link) => link.disconnect(),
			Kind::Composite(members) => {
				for member in members.iter() {
					member.disconnect();
				}
			}
		}
	}

	/// Converts the registration into a one-shot: it is disconnected the
	/// next time it fires.
	pub fn once(self) -> Self {
		match &self.kind {
			Kind::Detached => {}
			Kind::Single(link) => link.once(),
			Kind::Composite(members) => {
				for member in members.iter() {
					member.clone().once();
				}
			}
		}
		self
	}

	/// A composite is connected while any of its members is.
	pub fn is_connected(&self) -> bool {
		match &self.kind {
			Kind::Detached => false,
			Kind::Single(link) => link.is_connected(),
			Kind::Composite(members) => members.iter().any(Connection::is_connected),
		}
	}
}

impl Default for Connection {
	fn default() -> Self {
		Connection::detached()
	}
}

impl Debug for Connection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.kind {
			Kind::Detached => f.write_str("Connection(detached)"),
			Kind::Single(link) => f
				.debug_struct("Connection")
				.field("connected", &link.is_connected())
				.finish(),
			Kind::Composite(members) => f.debug_list().entries(members.iter()).finish(),
		}
	}
}
