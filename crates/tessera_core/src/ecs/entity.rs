//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An [`EntityId`], the key into every component's sparse set
//! - A [`ManagerId`] naming the [`EntityManager`] that created it
//!
//! [`EntityRef`] and [`EntityMut`] pair an [`Entity`] with a borrow of its
//! manager and forward every query and mutation to it.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use super::component::{Component, ComponentSet};
use super::manager::EntityManager;

/// Unique identifier for an entity within one manager.
///
/// Ids are handed out in strictly increasing order starting at zero and are
/// never reused, so ascending id order is creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Largest id a manager can hand out. `u32::MAX` marks absent sparse entries.
    pub const MAX: Self = Self(u32::MAX - 1);

    /// Creates an entity ID from a raw integer.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the id as an index into sparse arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Process-unique token identifying an [`EntityManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ManagerId(u32);

impl ManagerId {
    /// Allocates a token no other manager in this process holds.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to an entity.
///
/// A plain value: it does not borrow its manager, so it can be stored in
/// components or collections. Use [`EntityManager::entity`] or
/// [`EntityManager::entity_mut`] to operate on it; both check that the
/// handle belongs to that manager and is still alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    id: EntityId,
    manager: ManagerId,
}

impl Entity {
    #[inline]
    pub(crate) const fn new(id: EntityId, manager: ManagerId) -> Self {
        Self { id, manager }
    }

    /// Returns the entity's id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.id
    }

    /// Returns the token of the manager that created this entity.
    #[inline]
    #[must_use]
    pub const fn manager(self) -> ManagerId {
        self.manager
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.id)
    }
}

/// Read-only view of one entity.
#[derive(Clone, Copy)]
pub struct EntityRef<'m> {
    entity: Entity,
    manager: &'m EntityManager,
}

impl<'m> EntityRef<'m> {
    #[inline]
    pub(crate) const fn new(entity: Entity, manager: &'m EntityManager) -> Self {
        Self { entity, manager }
    }

    /// Returns the underlying handle.
    #[inline]
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns the entity's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.entity.id
    }

    /// Returns the entity's component `C`.
    ///
    /// # Panics
    ///
    /// Panics if the entity does not have `C`.
    #[inline]
    #[must_use]
    pub fn get<C: Component>(&self) -> &'m C {
        self.manager.get_component::<C>(self.entity.id)
    }

    /// Returns the entity's component `C`, if attached.
    #[inline]
    #[must_use]
    pub fn try_get<C: Component>(&self) -> Option<&'m C> {
        self.manager.try_get_component::<C>(self.entity.id)
    }

    /// Returns `true` if the entity has every component in `S`.
    #[inline]
    #[must_use]
    pub fn has<S: ComponentSet>(&self) -> bool {
        self.manager.has_components::<S>(self.entity.id)
    }
}

/// Mutable view of one entity.
///
/// Holds the manager exclusively, so attach calls can be chained:
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
/// let entity = manager
///     .create_entity()
///     .add(Position(2.0, 4.0))
///     .add(Velocity(4.0, 6.0))
///     .entity();
///
/// assert!(manager.entity(entity).has::<(Position, Velocity)>());
/// ```
pub struct EntityMut<'m> {
    entity: Entity,
    manager: &'m mut EntityManager,
}

impl<'m> EntityMut<'m> {
    #[inline]
    pub(crate) fn new(entity: Entity, manager: &'m mut EntityManager) -> Self {
        Self { entity, manager }
    }

    /// Returns the underlying handle.
    #[inline]
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns the entity's id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.entity.id
    }

    /// Attaches `component`, replacing any previous value of the same type.
    #[inline]
    pub fn add<C: Component>(&mut self, component: C) -> &mut Self {
        self.manager.add_component(self.entity.id, component);
        self
    }

    /// Returns the entity's component `C`.
    ///
    /// # Panics
    ///
    /// Panics if the entity does not have `C`.
    #[inline]
    #[must_use]
    pub fn get<C: Component>(&self) -> &C {
        self.manager.get_component::<C>(self.entity.id)
    }

    /// Returns the entity's component `C` mutably.
    ///
    /// # Panics
    ///
    /// Panics if the entity does not have `C`.
    #[inline]
    pub fn get_mut<C: Component>(&mut self) -> &mut C {
        self.manager.get_component_mut::<C>(self.entity.id)
    }

    /// Returns the entity's component `C`, if attached.
    #[inline]
    #[must_use]
    pub fn try_get<C: Component>(&self) -> Option<&C> {
        self.manager.try_get_component::<C>(self.entity.id)
    }

    /// Returns the entity's component `C` mutably, if attached.
    #[inline]
    pub fn try_get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.manager.try_get_component_mut::<C>(self.entity.id)
    }

    /// Returns `true` if the entity has every component in `S`.
    #[inline]
    #[must_use]
    pub fn has<S: ComponentSet>(&self) -> bool {
        self.manager.has_components::<S>(self.entity.id)
    }

    /// Detaches component `C`, returning it if it was attached.
    #[inline]
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        self.manager.remove_component::<C>(self.entity.id)
    }

    /// Destroys the entity, dropping all of its components.
    pub fn destroy(self) {
        self.manager.destroy_entity(self.entity.id);
    }
}
