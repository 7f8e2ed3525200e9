//! # ECS World
//!
//! The central container: one [`EntityManager`] plus an ordered list of
//! [`System`]s that [`World::update`] runs once per frame.

use std::fmt;
use std::mem;
use std::time::Instant;

use super::entity::{Entity, EntityId, EntityMut, EntityRef};
use super::manager::EntityManager;
use super::system::System;
use super::view::Query;

/// The ECS world.
///
/// Entity and view operations forward to the owned [`EntityManager`];
/// [`World::manager`] and [`World::manager_mut`] expose the rest of its API.
pub struct World {
    manager: EntityManager,
    /// Run order is registration order.
    systems: Vec<Box<dyn System>>,
    /// Number of completed [`World::update`] calls.
    frame: u64,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty world sized for `capacity` entities.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Expected number of entities (e.g., 1_000_000)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            manager: EntityManager::with_capacity(capacity),
            systems: Vec::new(),
            frame: 0,
        }
    }

    // =========================================================================
    // ENTITIES
    // =========================================================================

    /// Creates an entity with no components.
    #[inline]
    pub fn create_entity(&mut self) -> EntityMut<'_> {
        self.manager.create_entity()
    }

    /// Returns a read-only handle to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is foreign or dead.
    #[inline]
    #[must_use]
    pub fn entity(&self, entity: Entity) -> EntityRef<'_> {
        self.manager.entity(entity)
    }

    /// Returns a mutable handle to `entity`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is foreign or dead.
    #[inline]
    pub fn entity_mut(&mut self, entity: Entity) -> EntityMut<'_> {
        self.manager.entity_mut(entity)
    }

    /// Destroys the entity `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    #[inline]
    pub fn destroy_entity(&mut self, id: EntityId) {
        self.manager.destroy_entity(id);
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.manager.entity_count()
    }

    // =========================================================================
    // VIEWS
    // =========================================================================

    /// See [`EntityManager::view`].
    #[inline]
    #[must_use]
    pub fn view<Q: Query>(&self) -> Q::Iter<'_> {
        self.manager.view::<Q>()
    }

    /// See [`EntityManager::view_mut`].
    #[inline]
    pub fn view_mut<Q: Query>(&mut self) -> Q::IterMut<'_> {
        self.manager.view_mut::<Q>()
    }

    // =========================================================================
    // SYSTEMS
    // =========================================================================

    /// Registers `system` after every system already registered.
    pub fn add_system<S: System>(&mut self, system: S) -> &mut Self {
        tracing::debug!(system = system.name(), order = self.systems.len(), "registered system");
        self.systems.push(Box::new(system));
        self
    }

    /// Runs every system once, in registration order, with `dt` seconds.
    ///
    /// Systems registered while the update runs first run on the next update.
    pub fn update(&mut self, dt: f32) {
        let mut systems = mem::take(&mut self.systems);

        for system in &mut systems {
            let start = Instant::now();
            system.update(self, dt);
            tracing::trace!(
                system = system.name(),
                frame = self.frame,
                elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
                "system updated"
            );
        }

        // Anything in `self.systems` now was registered during this update.
        systems.append(&mut self.systems);
        self.systems = systems;
        self.frame += 1;
    }

    /// Returns the number of registered systems.
    #[inline]
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Returns the number of completed updates.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns the entity manager.
    #[inline]
    #[must_use]
    pub const fn manager(&self) -> &EntityManager {
        &self.manager
    }

    /// Returns the entity manager mutably.
    #[inline]
    pub fn manager_mut(&mut self) -> &mut EntityManager {
        &mut self.manager
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("manager", &self.manager)
            .field(
                "systems",
                &self.systems.iter().map(|system| system.name()).collect::<Vec<_>>(),
            )
            .field("frame", &self.frame)
            .finish()
    }
}
