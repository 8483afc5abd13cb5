//! Ordering Index Module
//!
//! A doubly-linked sequence of cache entries threaded through a slot arena,
//! paired with a `key -> slot` map. Front is the oldest position, back is the
//! most recently inserted/moved one.

use std::collections::HashMap;

use crate::cache::CacheEntry;

type Slot = usize;

#[derive(Debug)]
struct Node<V> {
    entry: CacheEntry<V>,
    prev: Option<Slot>,
    next: Option<Slot>,
}

// == Ordering Index ==
/// Entry ordering with O(1) push-back, unlink and move-to-back.
///
/// Every mutating method updates the links and the key map together, so each
/// mapped key has exactly one linked node and every linked node is mapped.
#[derive(Debug)]
pub struct OrderingIndex<V> {
    slots: Vec<Option<Node<V>>>,
    /// Recycled slot indices
    free: Vec<Slot>,
    map: HashMap<String, Slot>,
    head: Option<Slot>,
    tail: Option<Slot>,
}

impl<V> Default for OrderingIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderingIndex<V> {
    // == Constructor ==
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty index with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            map: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        let slot = *self.map.get(key)?;
        Some(&self.node(slot).entry)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut CacheEntry<V>> {
        let slot = *self.map.get(key)?;
        Some(&mut self.node_mut(slot).entry)
    }

    /// The entry at the front (oldest position), if any.
    pub fn front(&self) -> Option<&CacheEntry<V>> {
        self.head.map(|slot| &self.node(slot).entry)
    }

    // == Push Back ==
    /// Appends an entry at the back.
    ///
    /// If an entry with the same key is already linked it is unlinked first and
    /// returned, keeping the key map one-to-one with the list.
    pub fn push_back(&mut self, entry: CacheEntry<V>) -> Option<CacheEntry<V>> {
        let displaced = self.remove(entry.key());
        let key = entry.key().to_string();

        let node = Node {
            entry,
            prev: self.tail,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.map.insert(key, slot);

        displaced
    }

    // == Move To Back ==
    /// Moves the entry for `key` to the back. Returns false if the key is absent.
    pub fn move_to_back(&mut self, key: &str) -> bool {
        let Some(&slot) = self.map.get(key) else {
            return false;
        };
        if self.tail == Some(slot) {
            return true;
        }

        self.unlink(slot);
        let old_tail = self.tail;
        {
            let node = self.node_mut(slot);
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail) => self.node_mut(tail).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        true
    }

    // == Remove ==
    /// Unlinks and returns the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let slot = self.map.remove(key)?;
        Some(self.release(slot))
    }

    /// Unlinks and returns the front entry.
    pub fn pop_front(&mut self) -> Option<CacheEntry<V>> {
        let slot = self.head?;
        let entry = self.release(slot);
        self.map.remove(entry.key());
        Some(entry)
    }

    /// Iterates entries from front to back.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            index: self,
            cursor: self.head,
        }
    }

    /// Keys from front to back.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(CacheEntry::key)
    }

    fn release(&mut self, slot: Slot) -> CacheEntry<V> {
        self.unlink(slot);
        self.free.push(slot);
        match self.slots[slot].take() {
            Some(node) => node.entry,
            None => unreachable!("released slot {slot} was not occupied"),
        }
    }

    /// Detaches a node from its neighbours, patching head/tail.
    fn unlink(&mut self, slot: Slot) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }

        let node = self.node_mut(slot);
        node.prev = None;
        node.next = None;
    }

    fn node(&self, slot: Slot) -> &Node<V> {
        match self.slots[slot].as_ref() {
            Some(node) => node,
            None => unreachable!("linked slot {slot} is vacant"),
        }
    }

    fn node_mut(&mut self, slot: Slot) -> &mut Node<V> {
        match self.slots[slot].as_mut() {
            Some(node) => node,
            None => unreachable!("linked slot {slot} is vacant"),
        }
    }

    /// Walks the list and checks it against the key map in both directions.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let mut seen = 0;
        let mut prev = None;
        let mut cursor = self.head;

        while let Some(slot) = cursor {
            let Some(node) = self.slots[slot].as_ref() else {
                return false;
            };
            if node.prev != prev || self.map.get(node.entry.key()) != Some(&slot) {
                return false;
            }
            seen += 1;
            if seen > self.map.len() {
                return false;
            }
            prev = Some(slot);
            cursor = node.next;
        }

        prev == self.tail && seen == self.map.len()
    }
}

// == Iterator ==
/// Front-to-back iterator over an [`OrderingIndex`].
#[derive(Debug)]
pub struct Iter<'a, V> {
    index: &'a OrderingIndex<V>,
    cursor: Option<Slot>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a CacheEntry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.index.node(self.cursor?);
        self.cursor = node.next;
        Some(&node.entry)
    }
}
