//! Specialized collection types

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle to one element of a [`LinkedList`]
    pub struct LinkHandle;
}

#[derive(Debug, Clone)]
struct Link<T> {
    value: T,
    prev: Option<LinkHandle>,
    next: Option<LinkHandle>,
}

/// Doubly-linked list with stable element handles
///
/// Links live in a slot map so removing one element never invalidates the
/// handles of the others. The octree uses it as the transient bucket that
/// objects are moved between while a node is being subdivided.
#[derive(Debug, Clone)]
pub struct LinkedList<T> {
    links: SlotMap<LinkHandle, Link<T>>,
    head: Option<LinkHandle>,
    tail: Option<LinkHandle>,
}

impl<T> LinkedList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            links: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True when the list holds no elements
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Handle of the first element
    pub fn front(&self) -> Option<LinkHandle> {
        self.head
    }

    /// Handle of the last element
    pub fn back(&self) -> Option<LinkHandle> {
        self.tail
    }

    /// Append a value and return its handle
    pub fn push_back(&mut self, value: T) -> LinkHandle {
        let prev = self.tail;
        let handle = self.links.insert(Link { value, prev, next: None });
        match prev.and_then(|key| self.links.get_mut(key)) {
            Some(link) => link.next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        handle
    }

    /// Prepend a value and return its handle
    pub fn push_front(&mut self, value: T) -> LinkHandle {
        let next = self.head;
        let handle = self.links.insert(Link { value, prev: None, next });
        match next.and_then(|key| self.links.get_mut(key)) {
            Some(link) => link.prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        handle
    }

    /// Value behind a handle, if it is still linked
    pub fn get(&self, handle: LinkHandle) -> Option<&T> {
        self.links.get(handle).map(|link| &link.value)
    }

    /// Handle of the element after `handle`
    pub fn next(&self, handle: LinkHandle) -> Option<LinkHandle> {
        self.links.get(handle).and_then(|link| link.next)
    }

    /// Unlink an element and hand back its value
    pub fn remove(&mut self, handle: LinkHandle) -> Option<T> {
        let link = self.links.remove(handle)?;

        match link.prev.and_then(|key| self.links.get_mut(key)) {
            Some(prev) => prev.next = link.next,
            None => self.head = link.next,
        }
        match link.next.and_then(|key| self.links.get_mut(key)) {
            Some(next) => next.prev = link.prev,
            None => self.tail = link.prev,
        }

        Some(link.value)
    }

    /// Remove and return the first element
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        self.remove(head)
    }

    /// Move every element matching `predicate` into a new list, keeping order
    pub fn extract_if<F>(&mut self, mut predicate: F) -> LinkedList<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut extracted = LinkedList::new();
        let mut cursor = self.head;

        while let Some(handle) = cursor {
            cursor = self.next(handle);
            let matches = self.get(handle).is_some_and(&mut predicate);
            if matches {
                if let Some(value) = self.remove(handle) {
                    extracted.push_back(value);
                }
            }
        }

        extracted
    }

    /// Iterate values front to back
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.links.clear();
        self.head = None;
        self.tail = None;
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for LinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = LinkedList::new();
        for value in iter {
            list.push_back(value);
        }
        list
    }
}

impl<T> Extend<T> for LinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

/// Borrowing iterator over a [`LinkedList`]
pub struct Iter<'a, T> {
    list: &'a LinkedList<T>,
    cursor: Option<LinkHandle>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.list.links.get(self.cursor?)?;
        self.cursor = link.next;
        Some(&link.value)
    }
}

impl<'a, T> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over a [`LinkedList`]
pub struct IntoIter<T> {
    list: LinkedList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for LinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}
