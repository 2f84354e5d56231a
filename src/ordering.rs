//! Ordered Collections
//!
//! Dense zero-based ordering shared by cards within a list and lists within
//! a board. After every mutation through [`OrderedCollection`], element `i`
//! carries `position == i`.

use crate::domain::Entity;

/// An entity with a position among its siblings
pub trait Positioned: Entity<Id = u32> {
    fn position(&self) -> u32;
    fn set_position(&mut self, position: u32);
}

/// Position-maintaining operations over a sibling sequence
pub trait OrderedCollection<T: Positioned> {
    /// Renumber positions to `0..len` in current sequence order
    fn reindex(&mut self);

    /// Splice `item` in at `index` (clamped to the end) and renumber.
    /// Returns the index actually used.
    fn insert_at(&mut self, item: T, index: usize) -> usize;

    /// Remove the element with `id` and close the gap
    fn remove_by_id(&mut self, id: u32) -> Option<T>;

    fn index_of(&self, id: u32) -> Option<usize>;

    /// Stable sort by stored position, ties broken by id
    fn sort_by_position(&mut self);

    /// True when positions are exactly `0..len` in sequence order
    fn is_dense(&self) -> bool;
}

impl<T: Positioned> OrderedCollection<T> for Vec<T> {
    fn reindex(&mut self) {
        for (index, item) in self.iter_mut().enumerate() {
            item.set_position(index as u32);
        }
    }

    fn insert_at(&mut self, item: T, index: usize) -> usize {
        let index = index.min(self.len());
        self.insert(index, item);
        // Everything before the splice point already holds its index.
        for (offset, item) in self[index..].iter_mut().enumerate() {
            item.set_position((index + offset) as u32);
        }
        index
    }

    fn remove_by_id(&mut self, id: u32) -> Option<T> {
        let index = self.index_of(id)?;
        let removed = self.remove(index);
        for (offset, item) in self[index..].iter_mut().enumerate() {
            item.set_position((index + offset) as u32);
        }
        Some(removed)
    }

    fn index_of(&self, id: u32) -> Option<usize> {
        self.iter().position(|item| item.id() == id)
    }

    fn sort_by_position(&mut self) {
        self.sort_by_key(|item| (item.position(), item.id()));
    }

    fn is_dense(&self) -> bool {
        self.iter()
            .enumerate()
            .all(|(index, item)| item.position() as usize == index)
    }
}
