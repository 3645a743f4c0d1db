//! An open-addressed hash table with linear probing and tombstones.
//!
//! Used both as the globals table and as the string-interning pool. Keys are
//! string handles compared by identity (sound only because every key passes
//! through [`crate::object::StringArena::make_string`] first); the one place
//! content comparison is needed — interning itself — is [`Table::find_string`].

use crate::object::{StringHandle, StringObject};
use crate::value::Value;

const MAX_LOAD: f64 = 0.75;

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: Option<StringHandle>,
    hash: u32,
    value: Value,
}

impl Entry {
    const fn empty() -> Self {
        Entry {
            key: None,
            hash: 0,
            value: Value::Null,
        }
    }

    fn is_empty_slot(&self) -> bool {
        self.key.is_none() && matches!(self.value, Value::Null)
    }
}

/// An open-addressed hash map from string handle to [`Value`].
#[derive(Debug, Default)]
pub struct Table {
    entries: Vec<Entry>,
    /// Live entries plus tombstones, matching the source's `table->count`.
    count: usize,
}

impl Table {
    /// An empty table with no allocated buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries plus tombstones.
    pub fn count(&self) -> usize {
        self.count
    }

    fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Locate the slot `key`/`hash` belongs in: the matching entry if
    /// present, else the earliest tombstone seen, else the first empty slot.
    fn find_entry(entries: &[Entry], capacity: usize, key: StringHandle, hash: u32) -> usize {
        let mut index = hash as usize % capacity;
        let mut tombstone: Option<usize> = None;

        loop {
            let entry = &entries[index];
            match entry.key {
                None if entry.is_empty_slot() => return tombstone.unwrap_or(index),
                None => {
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                Some(k) if k == key => return index,
                Some(_) => {}
            }
            index = (index + 1) % capacity;
        }
    }

    /// Grow (or initialize) the backing storage, re-inserting every live
    /// entry and dropping tombstones, matching the source's `adjustCapacity`.
    fn adjust_capacity(&mut self, capacity: usize) {
        let mut entries = vec![Entry::empty(); capacity];

        let mut live = 0;
        for entry in &self.entries {
            let Some(key) = entry.key else { continue };
            let index = Self::find_entry(&entries, capacity, key, entry.hash);
            entries[index] = *entry;
            live += 1;
        }

        self.entries = entries;
        self.count = live;
    }

    /// Get the value bound to `key`, given its (externally supplied) cached
    /// hash.
    pub fn get(&self, key: StringHandle, hash: u32) -> Option<Value> {
        if self.count == 0 {
            return None;
        }
        let index = Self::find_entry(&self.entries, self.capacity(), key, hash);
        self.entries[index].key.map(|_| self.entries[index].value)
    }

    /// Bind `key` to `value`. Returns `true` if `key` was not previously
    /// present (a fresh key, as opposed to an overwrite or a tombstone
    /// reuse).
    pub fn set(&mut self, key: StringHandle, hash: u32, value: Value) -> bool {
        if (self.count + 1) as f64 > self.capacity() as f64 * MAX_LOAD {
            let new_capacity = grow_capacity(self.capacity());
            self.adjust_capacity(new_capacity);
        }

        let index = Self::find_entry(&self.entries, self.capacity(), key, hash);
        let is_new_key = self.entries[index].key.is_none();
        if is_new_key && self.entries[index].is_empty_slot() {
            self.count += 1;
        }

        self.entries[index] = Entry {
            key: Some(key),
            hash,
            value,
        };
        is_new_key
    }

    /// Replace the entry for `key` with a tombstone. Returns `true` if `key`
    /// was present.
    pub fn delete(&mut self, key: StringHandle, hash: u32) -> bool {
        if self.count == 0 {
            return false;
        }
        let index = Self::find_entry(&self.entries, self.capacity(), key, hash);
        if self.entries[index].key.is_none() {
            return false;
        }
        self.entries[index] = Entry {
            key: None,
            hash,
            value: Value::Bool(true),
        };
        true
    }

    /// Find the unique interned string matching `bytes`/`hash` by content,
    /// not identity. Used only during interning.
    pub fn find_string(
        &self,
        objects: &[StringObject],
        bytes: &[u8],
        hash: u32,
    ) -> Option<StringHandle> {
        if self.count == 0 {
            return None;
        }
        let capacity = self.capacity();
        let mut index = hash as usize % capacity;
        loop {
            let entry = &self.entries[index];
            match entry.key {
                None if entry.is_empty_slot() => return None,
                None => {}
                Some(handle) => {
                    let candidate = &objects[handle.0 as usize];
                    if candidate.hash() == hash && candidate.bytes() == bytes {
                        return Some(handle);
                    }
                }
            }
            index = (index + 1) % capacity;
        }
    }
}

fn grow_capacity(capacity: usize) -> usize {
    if capacity < 8 {
        8
    } else {
        capacity * 2
    }
}
