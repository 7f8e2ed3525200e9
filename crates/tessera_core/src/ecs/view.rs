//! # Views
//!
//! Iteration over every entity holding a given set of components.
//!
//! - A single component type walks that component's dense arrays directly.
//!   Order is dense order, which is insertion order until a removal swaps.
//! - A tuple of component types scans ids from `0` to the manager's id bound
//!   in ascending order and yields the ids that hold every member. If any
//!   member's slot was never populated the scan is skipped entirely.
//!
//! ## Safety
//!
//! Mutable tuple views hand out `&mut` references into several sparse sets
//! at once. [`ColumnMut`] keeps a raw pointer to one set's values because a
//! safe `&mut [C]` cannot lend out elements that outlive the `next` call.
//! Soundness rests on three facts:
//! - the sets come from [`SlotParts`](super::slot::SlotParts), which hands
//!   each slot out once, so columns never alias each other
//! - the scan visits every id once, so each value is lent at most once
//! - the sparse/dense invariant keeps every looked-up position in bounds

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::slice;

use super::component::Component;
use super::entity::{Entity, EntityId, ManagerId};
use super::manager::EntityManager;
use super::sparse_set::{lookup, SparseSet};

/// A component type, or a tuple of up to eight component types, that can be
/// iterated with [`EntityManager::view`] and [`EntityManager::view_mut`].
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, EntityManager};
///
/// struct Position(f32, f32);
/// struct Velocity(f32, f32);
/// impl Component for Position { const ID: u8 = 0; }
/// impl Component for Velocity { const ID: u8 = 1; }
///
/// let mut manager = EntityManager::new();
/// manager.create_entity().add(Position(0.0, 0.0)).add(Velocity(1.0, 2.0));
/// manager.create_entity().add(Position(5.0, 5.0));
///
/// for (_, (position, velocity)) in manager.view_mut::<(Position, Velocity)>() {
///     position.0 += velocity.0;
///     position.1 += velocity.1;
/// }
///
/// let xs: Vec<f32> = manager.view::<Position>().map(|(_, p)| p.0).collect();
/// assert_eq!(xs, vec![1.0, 5.0]);
/// ```
pub trait Query: 'static {
    /// Shared item: `&C` or a tuple of `&C`.
    type Item<'w>;

    /// Exclusive item: `&mut C` or a tuple of `&mut C`.
    type ItemMut<'w>;

    /// Iterator returned by [`EntityManager::view`].
    type Iter<'w>: Iterator<Item = (Entity, Self::Item<'w>)>;

    /// Iterator returned by [`EntityManager::view_mut`].
    type IterMut<'w>: Iterator<Item = (Entity, Self::ItemMut<'w>)>;

    /// Builds the shared iterator.
    fn iter(manager: &EntityManager) -> Self::Iter<'_>;

    /// Builds the exclusive iterator.
    ///
    /// # Panics
    ///
    /// Panics if the query names the same component type twice.
    fn iter_mut(manager: &mut EntityManager) -> Self::IterMut<'_>;
}

// =============================================================================
// SINGLE COMPONENT
// =============================================================================

impl<C: Component> Query for C {
    type Item<'w> = &'w C;
    type ItemMut<'w> = &'w mut C;
    type Iter<'w> = SingleIter<'w, C>;
    type IterMut<'w> = SingleIterMut<'w, C>;

    fn iter(manager: &EntityManager) -> SingleIter<'_, C> {
        let (ids, values) = match manager.storage::<C>() {
            Some(set) => (set.ids(), set.values()),
            None => (Default::default(), Default::default()),
        };
        SingleIter {
            manager: manager.id(),
            ids: ids.iter(),
            values: values.iter(),
        }
    }

    fn iter_mut(manager: &mut EntityManager) -> SingleIterMut<'_, C> {
        let owner = manager.id();
        let (ids, values) = match manager.sets_mut().get_mut::<C>() {
            Some(set) => set.dense_parts_mut(),
            None => (Default::default(), Default::default()),
        };
        SingleIterMut {
            manager: owner,
            ids: ids.iter(),
            values: values.iter_mut(),
        }
    }
}

/// Dense walk over one component, yielding `(Entity, &C)`.
///
/// Two walks compare equal when they belong to the same manager and have
/// the same number of entities left.
pub struct SingleIter<'w, C> {
    manager: ManagerId,
    ids: slice::Iter<'w, EntityId>,
    values: slice::Iter<'w, C>,
}

impl<'w, C> Iterator for SingleIter<'w, C> {
    type Item = (Entity, &'w C);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.ids.next()?;
        let value = self.values.next()?;
        Some((Entity::new(id, self.manager), value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<C> ExactSizeIterator for SingleIter<'_, C> {}

impl<C> PartialEq for SingleIter<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        self.manager == other.manager && self.ids.len() == other.ids.len()
    }
}

/// Dense walk over one component, yielding `(Entity, &mut C)`.
pub struct SingleIterMut<'w, C> {
    manager: ManagerId,
    ids: slice::Iter<'w, EntityId>,
    values: slice::IterMut<'w, C>,
}

impl<'w, C> Iterator for SingleIterMut<'w, C> {
    type Item = (Entity, &'w mut C);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.ids.next()?;
        let value = self.values.next()?;
        Some((Entity::new(id, self.manager), value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<C> ExactSizeIterator for SingleIterMut<'_, C> {}

impl<C> PartialEq for SingleIterMut<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        self.manager == other.manager && self.ids.len() == other.ids.len()
    }
}

// =============================================================================
// COMPONENT TUPLES
// =============================================================================

/// Ascending id scan over several components.
///
/// `T` is the tuple of columns being joined. Two scans compare equal when
/// they belong to the same manager and stand at the same id.
pub struct ScanIter<T> {
    manager: ManagerId,
    /// `None` when a member slot was never populated.
    columns: Option<T>,
    cursor: u32,
    end: u32,
}

/// Exclusive counterpart of [`ScanIter`].
pub struct ScanIterMut<T> {
    manager: ManagerId,
    columns: Option<T>,
    cursor: u32,
    end: u32,
}

impl<T> PartialEq for ScanIter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.manager == other.manager && self.cursor == other.cursor
    }
}

impl<T> PartialEq for ScanIterMut<T> {
    fn eq(&self, other: &Self) -> bool {
        self.manager == other.manager && self.cursor == other.cursor
    }
}

/// Exclusive access to the values of one sparse set during a scan.
pub struct ColumnMut<'w, C> {
    sparse: &'w [u32],
    values: *mut C,
    marker: PhantomData<&'w mut [C]>,
}

// SAFETY: a column is an exclusive borrow of `[C]` and moves across threads
// under the same conditions as `&mut [C]`.
unsafe impl<C: Send> Send for ColumnMut<'_, C> {}
// SAFETY: shared access to a column hands out nothing; same bounds as `&mut [C]`.
unsafe impl<C: Sync> Sync for ColumnMut<'_, C> {}

impl<'w, C> ColumnMut<'w, C> {
    fn new(set: &'w mut SparseSet<C>) -> Self {
        let (sparse, values) = set.sparse_parts_mut();
        Self {
            sparse,
            values: values.as_mut_ptr(),
            marker: PhantomData,
        }
    }

    /// Lends the value of `id` for the rest of `'w`.
    ///
    /// # Safety
    ///
    /// Each `id` may be fetched at most once per column.
    #[inline]
    unsafe fn fetch(&self, id: EntityId) -> Option<&'w mut C> {
        let slot = lookup(self.sparse, id)?;
        // SAFETY: `slot` indexes the value array by the sparse/dense invariant,
        // and the caller guarantees this element is not lent twice.
        Some(unsafe { &mut *self.values.add(slot) })
    }
}

macro_rules! impl_query_tuple {
    ($(($name:ident, $column:ident)),+) => {
        impl<$($name: Component),+> Query for ($($name,)+) {
            type Item<'w> = ($(&'w $name,)+);
            type ItemMut<'w> = ($(&'w mut $name,)+);
            type Iter<'w> = ScanIter<($(&'w SparseSet<$name>,)+)>;
            type IterMut<'w> = ScanIterMut<($(ColumnMut<'w, $name>,)+)>;

            fn iter(manager: &EntityManager) -> Self::Iter<'_> {
                let columns = match ($(manager.storage::<$name>(),)+) {
                    ($(Some($column),)+) => Some(($($column,)+)),
                    _ => None,
                };
                let end = if columns.is_some() { manager.id_bound() } else { 0 };
                ScanIter {
                    manager: manager.id(),
                    columns,
                    cursor: 0,
                    end,
                }
            }

            fn iter_mut(manager: &mut EntityManager) -> Self::IterMut<'_> {
                let owner = manager.id();
                let bound = manager.id_bound();
                let mut parts = manager.sets_mut().parts_mut();
                $(let $column = parts.take::<$name>();)+
                let columns = match ($($column,)+) {
                    ($(Some($column),)+) => Some(($(ColumnMut::new($column),)+)),
                    _ => None,
                };
                let end = if columns.is_some() { bound } else { 0 };
                ScanIterMut {
                    manager: owner,
                    columns,
                    cursor: 0,
                    end,
                }
            }
        }

        impl<'w, $($name: Component),+> Iterator for ScanIter<($(&'w SparseSet<$name>,)+)> {
            type Item = (Entity, ($(&'w $name,)+));

            fn next(&mut self) -> Option<Self::Item> {
                let ($($column,)+) = self.columns?;
                while self.cursor < self.end {
                    let id = EntityId::from_raw(self.cursor);
                    self.cursor += 1;
                    let item = ($(
                        match $column.get(id) {
                            Some(value) => value,
                            None => continue,
                        },
                    )+);
                    return Some((Entity::new(id, self.manager), item));
                }
                None
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                (0, Some((self.end - self.cursor) as usize))
            }
        }

        impl<'w, $($name: Component),+> Iterator for ScanIterMut<($(ColumnMut<'w, $name>,)+)> {
            type Item = (Entity, ($(&'w mut $name,)+));

            fn next(&mut self) -> Option<Self::Item> {
                let ($($column,)+) = self.columns.as_ref()?;
                while self.cursor < self.end {
                    let id = EntityId::from_raw(self.cursor);
                    self.cursor += 1;
                    // SAFETY: the cursor has moved past `id`, so it is never fetched again.
                    let item = unsafe { ($(
                        match $column.fetch(id) {
                            Some(value) => value,
                            None => continue,
                        },
                    )+) };
                    return Some((Entity::new(id, self.manager), item));
                }
                None
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                (0, Some((self.end - self.cursor) as usize))
            }
        }
    };
}

impl_query_tuple!((A, a));
impl_query_tuple!((A, a), (B, b));
impl_query_tuple!((A, a), (B, b), (C, c));
impl_query_tuple!((A, a), (B, b), (C, c), (D, d));
impl_query_tuple!((A, a), (B, b), (C, c), (D, d), (E, e));
impl_query_tuple!((A, a), (B, b), (C, c), (D, d), (E, e), (F, f));
impl_query_tuple!((A, a), (B, b), (C, c), (D, d), (E, e), (F, f), (G, g));
impl_query_tuple!((A, a), (B, b), (C, c), (D, d), (E, e), (F, f), (G, g), (H, h));
