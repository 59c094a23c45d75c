use std::mem;

use crate::error::Error;

/// Index of a cell inside a [`Pool`].
pub type PoolIndex = u32;

/// A cell of the pool: either holds an item or sits on the free list.
enum Slot<T> {
    /// Free cell, linking to the next free cell (if any).
    Vacant { next: Option<PoolIndex> },
    /// Cell currently owned by the container.
    Occupied(T),
}

/// Fixed-capacity allocator of same-sized cells.
///
/// The pool hands out cells one at a time and accepts them back for reuse.
/// Released cells are threaded onto a free list; until the free list is
/// exhausted, acquisition reuses them before touching fresh capacity. The
/// backing storage is reserved up front and never grows past `capacity`,
/// so no acquisition performs a heap allocation after construction.
///
/// Indices are stable for the lifetime of the cell: a released index is
/// only reused by a later acquisition, never invalidated by other cells
/// coming and going.
pub struct Pool<T> {
    /// Cell storage. Grows monotonically up to `capacity`.
    slots: Vec<Slot<T>>,
    /// Head of the free list of released cells.
    free_head: Option<PoolIndex>,
    /// Number of occupied cells.
    len: usize,
    /// Maximum number of cells this pool will ever hold.
    capacity: usize,
}

impl<T> Pool<T> {
    /// Creates a pool that can hold up to `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
            capacity,
        }
    }

    /// Returns the number of occupied cells.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Indicates whether the pool has no occupied cells.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum number of cells the pool can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of cells still available for acquisition.
    pub fn remaining(&self) -> usize {
        self.capacity - self.len
    }

    /// Indicates whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Moves `item` into a free cell and returns its index.
    ///
    /// Reuses the most recently released cell first; falls back to fresh
    /// capacity. Fails with [`Error::PoolExhausted`] once `capacity` cells
    /// are occupied, dropping `item`.
    pub fn acquire(&mut self, item: T) -> Result<PoolIndex, Error> {
        if let Some(index) = self.free_head {
            match mem::replace(&mut self.slots[index as usize], Slot::Occupied(item)) {
                Slot::Vacant { next } => self.free_head = next,
                Slot::Occupied(_) => panic!("pool free list points at an occupied cell"),
            }
            self.len += 1;
            Ok(index)
        } else if self.slots.len() < self.capacity {
            let index = self.slots.len() as PoolIndex;
            self.slots.push(Slot::Occupied(item));
            self.len += 1;
            Ok(index)
        } else {
            Err(Error::PoolExhausted)
        }
    }

    /// Moves the item out of an occupied cell and puts the cell on the
    /// free list.
    ///
    /// # Panics
    ///
    /// Panics if `index` refers to a vacant cell.
    pub fn release(&mut self, index: PoolIndex) -> T {
        let next = self.free_head;
        match mem::replace(&mut self.slots[index as usize], Slot::Vacant { next }) {
            Slot::Occupied(item) => {
                self.free_head = Some(index);
                self.len -= 1;
                item
            }
            Slot::Vacant { .. } => panic!("released a vacant pool cell"),
        }
    }

    /// Returns a reference to the item in an occupied cell.
    ///
    /// # Panics
    ///
    /// Panics if `index` refers to a vacant cell.
    pub fn get(&self, index: PoolIndex) -> &T {
        match &self.slots[index as usize] {
            Slot::Occupied(item) => item,
            Slot::Vacant { .. } => panic!("accessed a vacant pool cell"),
        }
    }

    /// Returns a mutable reference to the item in an occupied cell.
    ///
    /// # Panics
    ///
    /// Panics if `index` refers to a vacant cell.
    pub fn get_mut(&mut self, index: PoolIndex) -> &mut T {
        match &mut self.slots[index as usize] {
            Slot::Occupied(item) => item,
            Slot::Vacant { .. } => panic!("accessed a vacant pool cell"),
        }
    }

    /// Swaps the contents of two occupied cells, leaving both indices
    /// valid.
    ///
    /// # Panics
    ///
    /// Panics if either index refers to a vacant cell.
    pub fn swap(&mut self, a: PoolIndex, b: PoolIndex) {
        if a == b {
            return;
        }
        if matches!(self.slots[a as usize], Slot::Vacant { .. })
            || matches!(self.slots[b as usize], Slot::Vacant { .. })
        {
            panic!("swapped a vacant pool cell");
        }
        self.slots.swap(a as usize, b as usize);
    }

    /// Releases every cell in one step, dropping all items.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }
}
