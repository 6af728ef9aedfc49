//! Owned element buffers and the shared handle tensors view them through.
//!
//! [`Storage`] is the only place element memory lives. Tensors never own a
//! `Storage` directly: they hold a [`SharedStorage`] handle, and every tensor
//! holding a clone of the same handle aliases the same elements. The handle
//! is reference counted and single-threaded, so sharing and detaching stay
//! explicit (see [`SharedStorage::share_count`] and [`SharedStorage::same_as`]).

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::algebra::Scalar;
use crate::error::{Error, Result};
use crate::node::Node;

/// A resizable, contiguous buffer of elements.
///
/// `len() <= capacity()` always holds. Shrinking never reallocates; growing past
/// the capacity reallocates and moves the live elements.
#[derive(Clone, PartialEq, Default)]
pub struct Storage<T: Scalar> {
    data: Vec<T>,
}

impl<T: Scalar> Storage<T> {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a storage of `len` copies of `fill`.
    pub fn with_len(len: usize, fill: T) -> Self {
        Self {
            data: vec![fill; len],
        }
    }

    /// Create a storage holding a copy of `values`.
    pub fn from_slice(values: &[T]) -> Self {
        Self {
            data: values.to_vec(),
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if storage is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of elements that fit without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Set the length to `len`, filling new slots with `fill`.
    ///
    /// Truncation keeps the allocation. Growth past the capacity reallocates to
    /// exactly `len` slots.
    pub fn resize(&mut self, len: usize, fill: T) {
        if len > self.data.capacity() {
            self.data.reserve_exact(len - self.data.len());
        }
        self.data.resize(len, fill);
    }

    /// Make sure at least `capacity` elements fit without reallocating.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.data.capacity() {
            self.data.reserve_exact(capacity - self.data.len());
        }
    }

    /// Append one element.
    pub fn push(&mut self, value: T) {
        self.data.push(value);
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Append a copy of `values`.
    pub fn append(&mut self, values: &[T]) {
        self.data.extend_from_slice(values);
    }

    /// Remove the element at `index`, shifting later elements down by one.
    pub fn erase(&mut self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.data.remove(index))
    }

    /// Remove all elements, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Result<T> {
        self.check_index(index)?;
        Ok(self.data[index])
    }

    /// Overwrite the element at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;
        self.data[index] = value;
        Ok(())
    }

    /// Mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.check_index(index)?;
        Ok(&mut self.data[index])
    }

    /// First element.
    pub fn front(&self) -> Option<T> {
        self.data.first().copied()
    }

    /// Last element.
    pub fn back(&self) -> Option<T> {
        self.data.last().copied()
    }

    /// Iterate over the live elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Iterate mutably over the live elements.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Borrow the live elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutably borrow the live elements.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Address of the first element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Save as a flat list node.
    pub fn save(&self) -> Node {
        Node::List(self.data.iter().map(|v| v.to_node()).collect())
    }

    /// Restore from a flat list node.
    pub fn from_node(node: &Node) -> Result<Self> {
        let items = node
            .as_list()
            .ok_or_else(|| Error::node(format!("expected list, found {}", node.kind())))?;
        let data = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                T::from_node(item).ok_or_else(|| {
                    Error::node(format!("element {i}: cannot read {} as scalar", item.kind()))
                })
            })
            .collect::<Result<Vec<T>>>()?;
        Ok(Self { data })
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.data.len() {
            return Err(Error::StorageOutOfBounds {
                index,
                len: self.data.len(),
            });
        }
        Ok(())
    }
}

impl<T: Scalar> From<Vec<T>> for Storage<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T: Scalar> FromIterator<T> for Storage<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a, T: Scalar> IntoIterator for &'a Storage<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<T: Scalar> fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .finish()
    }
}

/// Reference-counted handle to a [`Storage`].
///
/// Cloning the handle shares the storage. The storage is freed when the last
/// handle is dropped.
pub struct SharedStorage<T: Scalar> {
    inner: Rc<RefCell<Storage<T>>>,
}

impl<T: Scalar> SharedStorage<T> {
    /// Wrap a storage in a fresh handle.
    pub fn new(storage: Storage<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(storage)),
        }
    }

    /// Number of handles (and therefore tensors) sharing this storage.
    #[inline]
    pub fn share_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Check whether this is the only handle.
    #[inline]
    pub fn is_unique(&self) -> bool {
        Rc::strong_count(&self.inner) == 1
    }

    /// Check whether both handles refer to the same storage.
    #[inline]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrow the storage.
    ///
    /// # Panics
    ///
    /// Panics if the storage is currently borrowed mutably.
    #[inline]
    pub fn borrow(&self) -> Ref<'_, Storage<T>> {
        self.inner.borrow()
    }

    /// Mutably borrow the storage.
    ///
    /// # Panics
    ///
    /// Panics if the storage is currently borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, Storage<T>> {
        self.inner.borrow_mut()
    }

    /// Number of live elements in the storage.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Check if the storage is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A new handle to a private copy of the storage.
    pub fn detached_copy(&self) -> Self {
        Self::new(self.inner.borrow().clone())
    }
}

impl<T: Scalar> Clone for SharedStorage<T> {
    /// Clone increments the share count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Scalar> fmt::Debug for SharedStorage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStorage")
            .field("len", &self.len())
            .field("shares", &self.share_count())
            .finish()
    }
}
