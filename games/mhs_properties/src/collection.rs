//! Property collections with parent fallthrough.
//!
//! A [`PropertyCollection`] is an ordered map from [`PropertyId`] to
//! [`PropertyValue`]. A collection may be attached to a parent: reads that
//! miss locally fall through to the parent chain, writes always land
//! locally. The child holds only a weak link, so it never keeps its parent
//! alive.
//!
//! Collections are shared through [`PropertyCollectionRef`], a
//! single-threaded `Rc<RefCell<_>>` handle. Entities, global tables, and
//! scratch stack frames all hand out these handles.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use mhs_gamedata::PrototypeId;

use crate::{PropertyError, PropertyId, PropertyValue};

/// Ordered property store.
#[derive(Default)]
pub struct PropertyCollection {
    values: BTreeMap<PropertyId, PropertyValue>,
    parent: Option<Weak<RefCell<PropertyCollection>>>,
}

impl PropertyCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `id`, falling through to the parent chain.
    pub fn get(&self, id: PropertyId) -> Option<PropertyValue> {
        if let Some(value) = self.values.get(&id) {
            return Some(*value);
        }
        let parent = self.parent.as_ref()?.upgrade()?;
        let parent = parent.borrow();
        parent.get(id)
    }

    /// Value of `id` in this collection only.
    pub fn get_local(&self, id: PropertyId) -> Option<PropertyValue> {
        self.values.get(&id).copied()
    }

    /// Whether `id` is set here or anywhere up the parent chain.
    pub fn has_property(&self, id: PropertyId) -> bool {
        self.get(id).is_some()
    }

    /// Prototype stored under `id`, or `INVALID` when absent or not a prototype.
    pub fn get_prototype(&self, id: PropertyId) -> PrototypeId {
        self.get(id)
            .and_then(PropertyValue::as_prototype)
            .unwrap_or(PrototypeId::INVALID)
    }

    /// Integer stored under `id`, or `0` when absent or not an integer.
    pub fn get_integer(&self, id: PropertyId) -> i64 {
        self.get(id).and_then(PropertyValue::as_integer).unwrap_or(0)
    }

    /// Set `id` locally, returning the previous local value.
    pub fn set(&mut self, id: PropertyId, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.values.insert(id, value.into())
    }

    /// Remove the local value of `id`.
    pub fn remove(&mut self, id: PropertyId) -> Option<PropertyValue> {
        self.values.remove(&id)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of local entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Local entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, PropertyValue)> + '_ {
        self.values.iter().map(|(id, value)| (*id, *value))
    }

    /// Whether this collection is attached to a live parent.
    pub fn has_parent(&self) -> bool {
        self.parent.as_ref().is_some_and(|p| p.strong_count() > 0)
    }
}

impl fmt::Debug for PropertyCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCollection")
            .field("values", &self.values)
            .field("has_parent", &self.has_parent())
            .finish()
    }
}

/// Shared, single-threaded handle to a [`PropertyCollection`].
#[repr(transparent)]
#[derive(Default)]
pub struct PropertyCollectionRef(Rc<RefCell<PropertyCollection>>);

impl PropertyCollectionRef {
    /// Create a handle to a fresh empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, PropertyCollection> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, PropertyCollection> {
        self.0.borrow_mut()
    }

    /// Whether both handles point at the same collection.
    #[inline]
    pub fn ptr_eq(&self, other: &PropertyCollectionRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Live parent of this collection, if attached.
    pub fn parent(&self) -> Option<PropertyCollectionRef> {
        let parent = self.0.borrow().parent.as_ref().and_then(Weak::upgrade);
        parent.map(PropertyCollectionRef)
    }

    /// Make reads on this collection fall through to `parent`.
    ///
    /// Replaces any previous parent. Attaching to a descendant (or to
    /// itself) is rejected.
    pub fn attach_to_parent(&self, parent: &PropertyCollectionRef) -> Result<(), PropertyError> {
        let mut ancestor = Some(parent.clone());
        while let Some(current) = ancestor {
            if current.ptr_eq(self) {
                return Err(PropertyError::ParentCycle);
            }
            ancestor = current.parent();
        }
        self.0.borrow_mut().parent = Some(Rc::downgrade(&parent.0));
        Ok(())
    }

    /// Cut the parent link. Returns whether a parent was attached.
    pub fn detach_from_parent(&self) -> bool {
        self.0.borrow_mut().parent.take().is_some()
    }
}

impl From<PropertyCollection> for PropertyCollectionRef {
    fn from(collection: PropertyCollection) -> Self {
        PropertyCollectionRef(Rc::new(RefCell::new(collection)))
    }
}

impl Clone for PropertyCollectionRef {
    #[inline]
    fn clone(&self) -> Self {
        PropertyCollectionRef(Rc::clone(&self.0))
    }
}

impl PartialEq for PropertyCollectionRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for PropertyCollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(collection) => f
                .debug_tuple("PropertyCollectionRef")
                .field(&*collection)
                .finish(),
            Err(_) => f.write_str("PropertyCollectionRef(<borrowed>)"),
        }
    }
}
