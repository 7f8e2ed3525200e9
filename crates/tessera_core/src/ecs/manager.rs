//! # Entity Manager
//!
//! Owns every entity and every component of one world.
//!
//! ## Id policy
//!
//! Ids start at zero and increase by one per created entity. Destroyed ids
//! are retired, never handed out again, so:
//! - ascending id order is creation order
//! - a stale [`Entity`] handle can never alias a newer entity
//!
//! The liveness table therefore grows with the number of entities ever
//! created, and multi-component views scan up to [`EntityManager::id_bound`].

use std::fmt;

use super::component::{Component, ComponentSet};
use super::entity::{Entity, EntityId, EntityMut, EntityRef, ManagerId};
use super::error::{EcsError, EcsResult};
use super::slot::SlotArray;
use super::sparse_set::{missing_component, SparseSet};
use super::view::Query;

/// Sole owner of entity ids and component storage.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, EntityManager};
///
/// #[derive(Debug, PartialEq)]
/// struct Health(u32);
/// impl Component for Health { const ID: u8 = 0; }
///
/// let mut manager = EntityManager::new();
/// let id = manager.create_entity().id();
/// manager.add_component(id, Health(100));
///
/// assert_eq!(manager.get_component::<Health>(id), &Health(100));
/// assert_eq!(manager.entity_count(), 1);
/// ```
pub struct EntityManager {
    /// Token stamped into every handle this manager creates.
    id: ManagerId,
    /// One lazily populated sparse set per component id.
    sets: SlotArray,
    /// `alive[id]` for every id handed out so far.
    alive: Vec<bool>,
    /// Number of `true` entries in `alive`.
    count: usize,
}

impl EntityManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty manager with its liveness table sized for `capacity` entities.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: ManagerId::next(),
            sets: SlotArray::new(),
            alive: Vec::with_capacity(capacity),
            count: 0,
        }
    }

    /// Returns this manager's token.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ManagerId {
        self.id
    }

    // =========================================================================
    // ENTITIES
    // =========================================================================

    /// Creates a new entity with no components.
    ///
    /// # Returns
    ///
    /// A mutable handle, so components can be attached in a chain.
    ///
    /// # Panics
    ///
    /// Panics if every id up to [`EntityId::MAX`] has been handed out.
    pub fn create_entity(&mut self) -> EntityMut<'_> {
        let entity = Entity::new(self.allocate(), self.id);
        EntityMut::new(entity, self)
    }

    fn allocate(&mut self) -> EntityId {
        let raw = self.id_bound();
        assert!(raw <= EntityId::MAX.raw(), "{}", EcsError::IdSpaceExhausted);
        self.alive.push(true);
        self.count += 1;
        EntityId::from_raw(raw)
    }

    /// Destroys the entity `id` and drops all of its components.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn destroy_entity(&mut self, id: EntityId) {
        if let Err(error) = self.try_destroy_entity(id) {
            panic!("{error}");
        }
    }

    /// Checked variant of [`EntityManager::destroy_entity`].
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotAlive`] if `id` was already destroyed or
    /// never created.
    pub fn try_destroy_entity(&mut self, id: EntityId) -> EcsResult<()> {
        if !self.is_alive(id) {
            return Err(EcsError::EntityNotAlive(id));
        }

        let dropped = self.sets.remove_entity(id);
        self.alive[id.index()] = false;
        self.count -= 1;

        tracing::trace!(entity = id.raw(), components = dropped, "destroyed entity");
        Ok(())
    }

    /// Destroys every entity. Ids stay retired.
    pub fn clear(&mut self) {
        self.sets.clear();
        self.alive.fill(false);
        self.count = 0;
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.count
    }

    /// Returns the id the next created entity will get.
    ///
    /// Every id ever handed out is below this bound.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn id_bound(&self) -> u32 {
        // `allocate` stops at `EntityId::MAX`, so the length fits.
        self.alive.len() as u32
    }

    /// Returns `true` if `id` was created by this manager and not destroyed.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.alive.get(id.index()).copied().unwrap_or(false)
    }

    /// Returns `true` if `entity` belongs to this manager and is alive.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.check(entity).is_ok()
    }

    /// Validates a handle against this manager.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ForeignEntity`] if another manager created the handle
    /// - [`EcsError::EntityNotAlive`] if the entity was destroyed
    pub fn check(&self, entity: Entity) -> EcsResult<()> {
        if entity.manager() != self.id {
            return Err(EcsError::ForeignEntity(entity.id()));
        }
        if !self.is_alive(entity.id()) {
            return Err(EcsError::EntityNotAlive(entity.id()));
        }
        Ok(())
    }

    /// Returns a read-only handle to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is foreign or dead.
    #[must_use]
    pub fn entity(&self, entity: Entity) -> EntityRef<'_> {
        if let Err(error) = self.check(entity) {
            panic!("{error}");
        }
        EntityRef::new(entity, self)
    }

    /// Returns a mutable handle to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is foreign or dead.
    pub fn entity_mut(&mut self, entity: Entity) -> EntityMut<'_> {
        if let Err(error) = self.check(entity) {
            panic!("{error}");
        }
        EntityMut::new(entity, self)
    }

    // =========================================================================
    // COMPONENTS
    // =========================================================================

    /// Attaches `component` to `id`.
    ///
    /// # Returns
    ///
    /// The previous component of the same type, if there was one.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn add_component<C: Component>(&mut self, id: EntityId, component: C) -> Option<C> {
        assert!(self.is_alive(id), "{}", EcsError::EntityNotAlive(id));
        self.sets.get_or_init::<C>().insert(id, component)
    }

    /// Returns the component `C` of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not have `C`.
    #[inline]
    #[must_use]
    pub fn get_component<C: Component>(&self, id: EntityId) -> &C {
        match self.try_get_component::<C>(id) {
            Some(component) => component,
            None => missing_component::<C>(id),
        }
    }

    /// Returns the component `C` of `id` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not have `C`.
    #[inline]
    pub fn get_component_mut<C: Component>(&mut self, id: EntityId) -> &mut C {
        match self.try_get_component_mut::<C>(id) {
            Some(component) => component,
            None => missing_component::<C>(id),
        }
    }

    /// Returns the component `C` of `id`, if attached.
    #[inline]
    #[must_use]
    pub fn try_get_component<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.sets.get::<C>()?.get(id)
    }

    /// Returns the component `C` of `id` mutably, if attached.
    #[inline]
    pub fn try_get_component_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        self.sets.get_mut::<C>()?.get_mut(id)
    }

    /// Returns `true` if `id` has component `C`.
    #[inline]
    #[must_use]
    pub fn has_component<C: Component>(&self, id: EntityId) -> bool {
        self.sets.get::<C>().is_some_and(|set| set.contains(id))
    }

    /// Returns `true` if `id` has every component in `S`.
    ///
    /// `S` is a component type or a tuple of component types.
    #[inline]
    #[must_use]
    pub fn has_components<S: ComponentSet>(&self, id: EntityId) -> bool {
        S::contained_in(self, id)
    }

    /// Detaches component `C` from `id`.
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> Option<C> {
        self.sets.get_mut::<C>()?.remove(id)
    }

    /// Returns how many entities hold component `C`.
    #[must_use]
    pub fn component_count<C: Component>(&self) -> usize {
        self.sets.get::<C>().map_or(0, SparseSet::len)
    }

    /// Returns the storage of component `C`, if it was ever attached.
    #[inline]
    #[must_use]
    pub fn storage<C: Component>(&self) -> Option<&SparseSet<C>> {
        self.sets.get::<C>()
    }

    #[inline]
    pub(crate) fn sets_mut(&mut self) -> &mut SlotArray {
        &mut self.sets
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    /// Iterates over every entity holding the components of `Q`.
    ///
    /// `Q` is a component type (dense walk) or a tuple of component types
    /// (ascending id scan). See [`Query`].
    #[inline]
    #[must_use]
    pub fn view<Q: Query>(&self) -> Q::Iter<'_> {
        Q::iter(self)
    }

    /// Mutable counterpart of [`EntityManager::view`].
    ///
    /// # Panics
    ///
    /// Panics if `Q` names the same component type twice.
    #[inline]
    pub fn view_mut<Q: Query>(&mut self) -> Q::IterMut<'_> {
        Q::iter_mut(self)
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Slots<'a>(&'a SlotArray);

        impl fmt::Debug for Slots<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map()
                    .entries(self.0.populated().map(|(slot, name, len)| ((slot, name), len)))
                    .finish()
            }
        }

        f.debug_struct("EntityManager")
            .field("id", &self.id)
            .field("entity_count", &self.count)
            .field("id_bound", &self.id_bound())
            .field("components", &Slots(&self.sets))
            .finish_non_exhaustive()
    }
}
