//! In-place mutation of counted collections.
//!
//! Every operation keeps `quantity == items.len()`. The remote API rejects
//! documents where the two diverge.

use edgeplane_storage::ItemList;

/// Mutations over a counted collection.
///
/// Indices passed to [`replace_at`](Self::replace_at) and
/// [`remove_at`](Self::remove_at) come from [`locate`](crate::locate) in the
/// same cycle; an out-of-range index panics.
pub trait CollectionMutator<T> {
    /// Appends `item`; existing order is preserved.
    fn insert(&mut self, item: T);

    /// Overwrites the entry at `index`, returning the old one.
    fn replace_at(&mut self, index: usize, item: T) -> T;

    /// Removes the entry at `index`, shifting later entries left.
    fn remove_at(&mut self, index: usize) -> T;

    /// Removes every entry matching `predicate`, keeping the rest in order.
    fn remove_where<F>(&mut self, predicate: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool;
}

impl<T> CollectionMutator<T> for ItemList<T> {
    fn insert(&mut self, item: T) {
        self.items.push(item);
        self.quantity = self.quantity.saturating_add(1);
        debug_assert!(self.is_consistent());
    }

    fn replace_at(&mut self, index: usize, item: T) -> T {
        std::mem::replace(&mut self.items[index], item)
    }

    fn remove_at(&mut self, index: usize) -> T {
        let removed = self.items.remove(index);
        self.quantity = self.quantity.saturating_sub(1);
        debug_assert!(self.is_consistent());
        removed
    }

    fn remove_where<F>(&mut self, mut predicate: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let (removed, kept): (Vec<T>, Vec<T>) =
            std::mem::take(&mut self.items).into_iter().partition(|item| predicate(item));
        self.items = kept;
        let count = u32::try_from(removed.len()).unwrap_or(u32::MAX);
        self.quantity = self.quantity.saturating_sub(count);
        debug_assert!(self.is_consistent());
        removed
    }
}
