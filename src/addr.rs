use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Keys an `Rc` by the address it points to rather than by its contents.
pub struct RcAddr<T: ?Sized> {
	ptr: Rc<T>,
}

impl<T: ?Sized> RcAddr<T> {
	pub fn new(ptr: Rc<T>) -> Self {
		RcAddr { ptr }
	}

	pub fn of(ptr: &Rc<T>) -> Self {
		RcAddr { ptr: ptr.clone() }
	}
}

impl<T: ?Sized> PartialEq for RcAddr<T> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.ptr, &other.ptr)
	}
}

impl<T: ?Sized> Eq for RcAddr<T> {}

impl<T: ?Sized> Ord for RcAddr<T> {
	fn cmp(&self, other: &Self) -> Ordering {
		Rc::as_ptr(&self.ptr).cmp(&Rc::as_ptr(&other.ptr))
	}
}

impl<T: ?Sized> PartialOrd for RcAddr<T> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<T: ?Sized> Hash for RcAddr<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		(Rc::as_ptr(&self.ptr) as *const () as usize).hash(state)
	}
}
