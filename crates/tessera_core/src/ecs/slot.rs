//! # Component Slots
//!
//! The manager stores one [`SparseSet`] per component type behind a fixed
//! array of type-erased slots. A slot is filled the first time its component
//! type is attached and is indexed by `Component::ID`.
//!
//! Typed access goes through a checked downcast: a slot asked for a type it
//! was not built with panics with [`EcsError::SlotConflict`].

use std::any::{type_name, Any};
use std::array;
use std::mem;

use super::component::{Component, ComponentSlot, MAX_COMPONENT_TYPES};
use super::entity::EntityId;
use super::error::EcsError;
use super::sparse_set::SparseSet;

/// Operations available on a sparse set without knowing its component type.
pub(crate) trait ErasedSet: Any + Send + Sync {
    /// Type name of the stored component.
    fn component_name(&self) -> &'static str;

    /// Number of stored components.
    fn len(&self) -> usize;

    /// Removes the component of `id`, returning `true` if there was one.
    fn remove_entity(&mut self, id: EntityId) -> bool;

    /// Removes every component.
    fn clear(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedSet for SparseSet<C> {
    fn component_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn remove_entity(&mut self, id: EntityId) -> bool {
        self.remove(id).is_some()
    }

    fn clear(&mut self) {
        SparseSet::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Recovers the typed set behind a slot.
///
/// # Panics
///
/// Panics if the slot was populated by a different component type.
fn downcast_ref<'a, C: Component>(set: &'a (dyn ErasedSet + 'static)) -> &'a SparseSet<C> {
    match set.as_any().downcast_ref::<SparseSet<C>>() {
        Some(typed) => typed,
        None => conflict::<C>(set.component_name()),
    }
}

/// Mutable counterpart of [`downcast_ref`].
fn downcast_mut<'a, C: Component>(set: &'a mut (dyn ErasedSet + 'static)) -> &'a mut SparseSet<C> {
    let bound = set.component_name();
    match set.as_any_mut().downcast_mut::<SparseSet<C>>() {
        Some(typed) => typed,
        None => conflict::<C>(bound),
    }
}

#[cold]
#[inline(never)]
fn conflict<C: Component>(bound: &'static str) -> ! {
    panic!(
        "{}",
        EcsError::SlotConflict {
            slot: C::SLOT,
            bound,
            requested: type_name::<C>(),
        }
    )
}

/// Fixed array of lazily populated component sets.
pub(crate) struct SlotArray {
    slots: [Option<Box<dyn ErasedSet>>; MAX_COMPONENT_TYPES],
}

impl SlotArray {
    pub(crate) fn new() -> Self {
        Self {
            slots: array::from_fn(|_| None),
        }
    }

    /// Returns the set of `C`, or `None` if `C` was never attached.
    #[inline]
    pub(crate) fn get<C: Component>(&self) -> Option<&SparseSet<C>> {
        self.slots[C::SLOT].as_deref().map(downcast_ref::<C>)
    }

    /// Mutable counterpart of [`SlotArray::get`].
    #[inline]
    pub(crate) fn get_mut<C: Component>(&mut self) -> Option<&mut SparseSet<C>> {
        self.slots[C::SLOT].as_deref_mut().map(downcast_mut::<C>)
    }

    /// Returns the set of `C`, populating its slot on first use.
    pub(crate) fn get_or_init<C: Component>(&mut self) -> &mut SparseSet<C> {
        let set = self.slots[C::SLOT].get_or_insert_with(|| {
            tracing::debug!(
                slot = C::SLOT,
                component = type_name::<C>(),
                "populating component slot"
            );
            Box::new(SparseSet::<C>::new())
        });
        downcast_mut::<C>(set.as_mut())
    }

    /// Removes `id` from every populated slot. Returns how many components
    /// were dropped.
    pub(crate) fn remove_entity(&mut self, id: EntityId) -> usize {
        self.slots
            .iter_mut()
            .flatten()
            .map(|set| usize::from(set.remove_entity(id)))
            .sum()
    }

    /// Empties every populated slot. Slots stay bound to their types.
    pub(crate) fn clear(&mut self) {
        for set in self.slots.iter_mut().flatten() {
            set.clear();
        }
    }

    /// Iterates over `(slot, component name, len)` of populated slots.
    pub(crate) fn populated(&self) -> impl Iterator<Item = (usize, &'static str, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, set)| set.as_ref().map(|set| (slot, set.component_name(), set.len())))
    }

    /// Splits the array into independently borrowable slots.
    pub(crate) fn parts_mut(&mut self) -> SlotParts<'_> {
        let mut slots = self.slots.iter_mut();
        SlotParts {
            parts: array::from_fn(|_| slots.next().and_then(|slot| slot.as_deref_mut())),
            taken: [false; MAX_COMPONENT_TYPES],
        }
    }
}

/// Disjoint mutable borrows of every slot, handed out once per slot.
pub(crate) struct SlotParts<'w> {
    parts: [Option<&'w mut (dyn ErasedSet + 'static)>; MAX_COMPONENT_TYPES],
    taken: [bool; MAX_COMPONENT_TYPES],
}

impl<'w> SlotParts<'w> {
    /// Takes the set of `C` for the rest of `'w`.
    ///
    /// Returns `None` if the slot of `C` was never populated.
    ///
    /// # Panics
    ///
    /// Panics if the slot of `C` was already taken from these parts.
    pub(crate) fn take<C: Component>(&mut self) -> Option<&'w mut SparseSet<C>> {
        let first = !mem::replace(&mut self.taken[C::SLOT], true);
        assert!(first, "{}", EcsError::DuplicateComponent(type_name::<C>()));
        self.parts[C::SLOT].take().map(downcast_mut::<C>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Mass(f32);
    #[derive(Debug, PartialEq)]
    struct Charge(i8);
    struct Impostor;

    impl Component for Mass {
        const ID: u8 = 3;
    }
    impl Component for Charge {
        const ID: u8 = 4;
    }
    impl Component for Impostor {
        const ID: u8 = 3;
    }

    #[test]
    fn test_slots_populate_lazily() {
        let mut slots = SlotArray::new();
        assert!(slots.get::<Mass>().is_none());
        assert_eq!(slots.populated().count(), 0);

        slots.get_or_init::<Mass>().insert(EntityId::from_raw(0), Mass(1.5));
        assert_eq!(slots.get::<Mass>().map(SparseSet::len), Some(1));
        assert!(slots.get_mut::<Charge>().is_none());

        let populated: Vec<_> = slots.populated().collect();
        assert_eq!(populated.len(), 1);
        assert_eq!(populated[0].0, 3);
        assert!(populated[0].1.ends_with("Mass"));
    }

    #[test]
    fn test_remove_entity_visits_every_slot() {
        let mut slots = SlotArray::new();
        let id = EntityId::from_raw(2);
        slots.get_or_init::<Mass>().insert(id, Mass(2.0));
        slots.get_or_init::<Charge>().insert(id, Charge(-1));
        slots.get_or_init::<Charge>().insert(EntityId::from_raw(5), Charge(1));

        assert_eq!(slots.remove_entity(id), 2);
        assert_eq!(slots.remove_entity(id), 0);
        assert_eq!(slots.get::<Charge>().map(SparseSet::len), Some(1));

        slots.clear();
        assert_eq!(slots.get::<Charge>().map(SparseSet::len), Some(0));
    }

    #[test]
    fn test_parts_hand_out_disjoint_sets() {
        let mut slots = SlotArray::new();
        let id = EntityId::from_raw(0);
        slots.get_or_init::<Mass>().insert(id, Mass(1.0));
        slots.get_or_init::<Charge>().insert(id, Charge(3));

        let mut parts = slots.parts_mut();
        let masses = parts.take::<Mass>();
        let charges = parts.take::<Charge>();
        if let (Some(masses), Some(charges)) = (masses, charges) {
            masses[id].0 += f32::from(charges[id].0);
            charges[id].0 = 0;
        }

        assert_eq!(slots.get::<Mass>().map(|set| &set[id]), Some(&Mass(4.0)));
        assert_eq!(slots.get::<Charge>().map(|set| &set[id]), Some(&Charge(0)));
    }

    #[test]
    #[should_panic(expected = "requested twice")]
    fn test_parts_reject_second_take() {
        let mut slots = SlotArray::new();
        slots.get_or_init::<Mass>();
        let mut parts = slots.parts_mut();
        let _first = parts.take::<Mass>();
        let _second = parts.take::<Mass>();
    }

    #[test]
    #[should_panic(expected = "cannot access it as")]
    fn test_shared_id_conflicts_on_read() {
        let mut slots = SlotArray::new();
        slots.get_or_init::<Mass>().insert(EntityId::from_raw(0), Mass(1.0));
        let _ = slots.get::<Impostor>().map(SparseSet::len);
    }

    #[test]
    #[should_panic(expected = "cannot access it as")]
    fn test_shared_id_conflicts() {
        let mut slots = SlotArray::new();
        slots.get_or_init::<Mass>();
        slots.get_or_init::<Impostor>().insert(EntityId::from_raw(0), Impostor);
    }
}
