//! Reference-counted collection of fetched units
//!
//! A [`UnitList`] is a shared handle: [`UnitList::acquire`] hands out another
//! reference and [`UnitList::release`] (or dropping the handle) gives one
//! back. The units are released together with the last handle.

use bluechi_rs::UnitInfo;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Inner {
    units: RefCell<Vec<Rc<UnitInfo>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        tracing::trace!("Releasing unit list with {} units", self.units.get_mut().len());
    }
}

/// Insertion-ordered list of units, filled during a fetch and read when rendering
///
/// # Examples
///
/// ```
/// use bluechictl_core::unit_list::UnitList;
/// use bluechi_rs::UnitInfo;
/// use std::rc::Rc;
///
/// let list = UnitList::new();
/// list.append(Rc::new(UnitInfo { id: "a.service".into(), ..Default::default() }));
/// assert_eq!(list.len(), 1);
///
/// let shared = list.acquire();
/// assert_eq!(list.ref_count(), 2);
/// shared.release();
/// assert_eq!(list.ref_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnitList {
    inner: Rc<Inner>,
}

impl UnitList {
    /// Create an empty list holding one reference
    pub fn new() -> Self {
        Self::default()
    }

    /// Take another reference to the same list
    pub fn acquire(&self) -> Self {
        self.clone()
    }

    /// Give back this reference; the units are released with the last one
    pub fn release(self) {
        drop(self);
    }

    /// Number of live references to this list
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Append a unit, taking over the caller's reference to it
    pub fn append(&self, unit: Rc<UnitInfo>) {
        self.inner.units.borrow_mut().push(unit);
    }

    /// Units in insertion order
    ///
    /// The returned guard must be dropped before the next [`UnitList::append`].
    pub fn units(&self) -> Ref<'_, [Rc<UnitInfo>]> {
        Ref::map(self.inner.units.borrow(), Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.inner.units.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.units.borrow().is_empty()
    }
}
