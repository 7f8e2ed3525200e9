//! # Sparse Set Storage
//!
//! Dense component storage keyed by entity id.
//!
//! The set keeps three arrays:
//! - `sparse[id]` holds the dense position of `id`, or [`ABSENT`]
//! - `dense[i]` holds the id stored at dense position `i`
//! - `values[i]` holds the component of `dense[i]`
//!
//! `dense` and `values` always have the same length and contain no gaps, so
//! iteration is a walk over two contiguous slices. Removal swaps the last
//! element into the hole, which keeps the arrays packed but does not keep
//! insertion order.

use std::any::type_name;
use std::mem;
use std::ops::{Index, IndexMut};

use super::entity::EntityId;
use super::error::EcsError;

/// Sparse entry of an id that is not in the set.
pub(crate) const ABSENT: u32 = u32::MAX;

/// Dense position of `id` according to `sparse`.
#[inline]
pub(crate) fn lookup(sparse: &[u32], id: EntityId) -> Option<usize> {
    match sparse.get(id.index()) {
        Some(&slot) if slot != ABSENT => Some(slot as usize),
        _ => None,
    }
}

/// Storage for a single component type.
///
/// This storage guarantees:
/// - O(1) insert, lookup, contains and remove by entity id
/// - Contiguous ids and values for cache-friendly iteration
///
/// # Example
///
/// ```rust
/// use tessera_core::{EntityId, SparseSet};
///
/// let mut set = SparseSet::new();
/// set.insert(EntityId::from_raw(10), "ten");
/// set.insert(EntityId::from_raw(3), "three");
///
/// assert!(set.contains(EntityId::from_raw(10)));
/// assert_eq!(set[EntityId::from_raw(3)], "three");
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SparseSet<C> {
    /// Id -> dense position, `ABSENT` when missing.
    sparse: Vec<u32>,
    /// Dense position -> id.
    dense: Vec<EntityId>,
    /// Dense position -> component, in lock-step with `dense`.
    values: Vec<C>,
}

impl<C> SparseSet<C> {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates an empty set with room for `capacity` components.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of components (and of ids `0..capacity`) to reserve for
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: Vec::with_capacity(capacity),
            dense: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if the set holds no components.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Returns `true` if `id` has a component in this set.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        lookup(&self.sparse, id).is_some()
    }

    /// Inserts the component for `id`.
    ///
    /// If `id` already has a component it is overwritten in place and the
    /// previous value is returned; the dense position does not change.
    ///
    /// # Arguments
    ///
    /// * `id` - The entity id (must not be `u32::MAX`)
    /// * `value` - The component value to store
    #[allow(clippy::cast_possible_truncation)]
    pub fn insert(&mut self, id: EntityId, value: C) -> Option<C> {
        if let Some(slot) = lookup(&self.sparse, id) {
            return Some(mem::replace(&mut self.values[slot], value));
        }

        let index = id.index();
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, ABSENT);
        }

        // One dense entry per distinct id, and ids are `u32`.
        self.sparse[index] = self.dense.len() as u32;
        self.dense.push(id);
        self.values.push(value);
        None
    }

    /// Gets the component of `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&C> {
        lookup(&self.sparse, id).map(|slot| &self.values[slot])
    }

    /// Gets the component of `id` mutably.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut C> {
        lookup(&self.sparse, id).map(|slot| &mut self.values[slot])
    }

    /// Removes the component of `id` and returns it.
    ///
    /// The last dense element moves into the freed position, so iteration
    /// order after a removal differs from insertion order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn remove(&mut self, id: EntityId) -> Option<C> {
        let slot = lookup(&self.sparse, id)?;
        self.sparse[id.index()] = ABSENT;

        self.dense.swap_remove(slot);
        let value = self.values.swap_remove(slot);

        // The former last element now sits in `slot`.
        if let Some(&moved) = self.dense.get(slot) {
            self.sparse[moved.index()] = slot as u32;
        }

        Some(value)
    }

    /// Removes every component, keeping the allocations.
    pub fn clear(&mut self) {
        for id in &self.dense {
            self.sparse[id.index()] = ABSENT;
        }
        self.dense.clear();
        self.values.clear();
    }

    /// Returns the ids in dense order.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.dense
    }

    /// Returns the components in dense order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[C] {
        &self.values
    }

    /// Returns the components in dense order, mutably.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [C] {
        &mut self.values
    }

    /// Iterates over `(id, component)` pairs in dense order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.dense.iter().copied().zip(self.values.iter())
    }

    /// Iterates mutably over `(id, component)` pairs in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut C)> {
        self.dense.iter().copied().zip(self.values.iter_mut())
    }

    /// Borrows the dense ids and the components at the same time.
    #[inline]
    pub(crate) fn dense_parts_mut(&mut self) -> (&[EntityId], &mut [C]) {
        (&self.dense, &mut self.values)
    }

    /// Borrows the sparse index and the components at the same time.
    #[inline]
    pub(crate) fn sparse_parts_mut(&mut self) -> (&[u32], &mut [C]) {
        (&self.sparse, &mut self.values)
    }
}

impl<C> Default for SparseSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Index<EntityId> for SparseSet<C> {
    type Output = C;

    /// # Panics
    ///
    /// Panics if `id` has no component in this set.
    fn index(&self, id: EntityId) -> &Self::Output {
        match self.get(id) {
            Some(value) => value,
            None => missing_component::<C>(id),
        }
    }
}

impl<C> IndexMut<EntityId> for SparseSet<C> {
    /// # Panics
    ///
    /// Panics if `id` has no component in this set.
    fn index_mut(&mut self, id: EntityId) -> &mut Self::Output {
        match lookup(&self.sparse, id) {
            Some(slot) => &mut self.values[slot],
            None => missing_component::<C>(id),
        }
    }
}

/// Panics with the [`EcsError::MissingComponent`] message for `C` on `id`.
#[cold]
#[inline(never)]
pub(crate) fn missing_component<C>(id: EntityId) -> ! {
    panic!(
        "{}",
        EcsError::MissingComponent {
            entity: id,
            component: type_name::<C>(),
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> EntityId {
        EntityId::from_raw(raw)
    }

    /// Checks that every stored id maps back to its own dense position and
    /// that no other sparse entry is set.
    fn assert_dense<C>(set: &SparseSet<C>) {
        assert_eq!(set.dense.len(), set.values.len());
        for (slot, stored) in set.dense.iter().enumerate() {
            assert_eq!(set.sparse[stored.index()] as usize, slot);
        }
        let mapped = set.sparse.iter().filter(|&&slot| slot != ABSENT).count();
        assert_eq!(mapped, set.len());
    }

    #[test]
    fn test_insert_get_contains() {
        let mut set = SparseSet::new();
        assert!(set.is_empty());
        assert_eq!(set.insert(id(5), 50), None);
        assert_eq!(set.insert(id(1), 10), None);

        assert!(set.contains(id(5)));
        assert!(set.contains(id(1)));
        assert!(!set.contains(id(2)));
        assert!(!set.contains(id(500)));
        assert_eq!(set.get(id(5)), Some(&50));
        assert_eq!(set[id(1)], 10);
        assert_eq!(set.len(), 2);
        assert_dense(&set);
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut set = SparseSet::new();
        set.insert(id(0), "a");
        set.insert(id(1), "b");

        assert_eq!(set.insert(id(0), "c"), Some("a"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.ids(), &[id(0), id(1)]);
        assert_eq!(set.values(), &["c", "b"]);
        assert_dense(&set);
    }

    #[test]
    fn test_swap_remove_last() {
        let (a, b, x) = (id(0), id(1), id(2));
        let mut set = SparseSet::new();
        set.insert(a, 'a');
        set.insert(b, 'b');
        set.insert(x, 'x');

        assert_eq!(set.remove(x), Some('x'));
        assert!(set.contains(a));
        assert!(set.contains(b));
        assert!(!set.contains(x));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![(a, &'a'), (b, &'b')]);
        assert_dense(&set);
    }

    #[test]
    fn test_swap_remove_middle_moves_last() {
        let (a, x, b) = (id(0), id(1), id(2));
        let mut set = SparseSet::new();
        set.insert(a, 'a');
        set.insert(x, 'x');
        set.insert(b, 'b');

        assert_eq!(set.remove(x), Some('x'));
        assert_eq!(set[a], 'a');
        assert_eq!(set[b], 'b');
        // `b` took over the freed position.
        assert_eq!(set.ids(), &[a, b]);
        assert_eq!(set.remove(x), None);
        assert_dense(&set);
    }

    #[test]
    fn test_density_after_mixed_operations() {
        let mut set = SparseSet::new();
        let mut state = 0x2545_f491_u32;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };

        for step in 0..2_000 {
            let key = id(next() % 64);
            if next() % 3 == 0 {
                set.remove(key);
            } else {
                set.insert(key, step);
            }
            assert_dense(&set);
        }
    }

    #[test]
    fn test_iter_mut_updates_values() {
        let mut set = SparseSet::with_capacity(8);
        for raw in 0..8 {
            set.insert(id(raw), raw * 10);
        }
        for (key, value) in set.iter_mut() {
            *value += key.raw();
        }
        for raw in 0..8 {
            assert_eq!(set[id(raw)], raw * 11);
        }
        set.values_mut()[0] = 0;
        assert_eq!(set[id(0)], 0);
    }

    #[test]
    fn test_clear_keeps_set_usable() {
        let mut set = SparseSet::new();
        set.insert(id(3), 3);
        set.insert(id(9), 9);
        set.clear();

        assert!(set.is_empty());
        assert!(!set.contains(id(3)));
        set.insert(id(9), 90);
        assert_eq!(set[id(9)], 90);
        assert_dense(&set);
    }

    #[test]
    #[should_panic(expected = "entity 4 has no")]
    fn test_index_missing_panics() {
        let set: SparseSet<u32> = SparseSet::new();
        let _ = set[id(4)];
    }
}
