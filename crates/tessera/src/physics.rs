//! # Simulation Systems
//!
//! - [`PhysicsSystem`]: explicit Euler step, `position += velocity * dt`
//! - [`LifetimeSystem`]: counts lifetimes down and destroys expired entities

use tessera_core::{Entity, System, World};

use crate::components::{Lifetime, Position, Velocity};

/// Moves every entity holding both a [`Position`] and a [`Velocity`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PhysicsSystem;

impl System for PhysicsSystem {
    fn update(&mut self, world: &mut World, dt: f32) {
        for (_, (position, velocity)) in world.view_mut::<(Position, Velocity)>() {
            position.x += velocity.x * dt;
            position.y += velocity.y * dt;
        }
    }

    fn name(&self) -> &str {
        "physics"
    }
}

/// Destroys entities whose [`Lifetime`] ran out.
///
/// Expired entities are collected during the view and destroyed after it,
/// since the view borrows the world.
#[derive(Debug, Default)]
pub struct LifetimeSystem {
    /// Reused between frames.
    expired: Vec<Entity>,
}

impl LifetimeSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for LifetimeSystem {
    fn update(&mut self, world: &mut World, dt: f32) {
        self.expired.clear();
        for (entity, lifetime) in world.view_mut::<Lifetime>() {
            lifetime.remaining -= dt;
            if lifetime.is_expired() {
                self.expired.push(entity);
            }
        }

        for &entity in &self.expired {
            world.entity_mut(entity).destroy();
        }

        if !self.expired.is_empty() {
            tracing::debug!(
                expired = self.expired.len(),
                live = world.entity_count(),
                "expired entities"
            );
        }
    }

    fn name(&self) -> &str {
        "lifetime"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_step() {
        let mut world = World::new();
        let moving = world
            .create_entity()
            .add(Position::new(2.0, 4.0))
            .add(Velocity::new(4.0, 6.0))
            .entity();
        let still = world.create_entity().add(Position::new(1.0, 1.0)).entity();
        world.add_system(PhysicsSystem);

        world.update(1.0);

        assert_eq!(world.entity(moving).get::<Position>(), &Position::new(6.0, 10.0));
        assert_eq!(world.entity(still).get::<Position>(), &Position::new(1.0, 1.0));
    }

    #[test]
    fn test_physics_scales_with_dt() {
        let mut world = World::new();
        let entity = world
            .create_entity()
            .add(Position::new(0.0, 0.0))
            .add(Velocity::new(10.0, -4.0))
            .entity();
        world.add_system(PhysicsSystem);

        world.update(0.5);
        world.update(0.5);

        assert_eq!(world.entity(entity).get::<Position>(), &Position::new(10.0, -4.0));
    }

    #[test]
    fn test_lifetime_destroys_expired() {
        let mut world = World::new();
        let short = world.create_entity().add(Lifetime::new(0.1)).entity();
        let long = world.create_entity().add(Lifetime::new(1.0)).entity();
        let immortal = world.create_entity().add(Position::default()).entity();
        world.add_system(LifetimeSystem::new());

        world.update(0.25);

        assert!(!world.manager().contains(short));
        assert!(world.manager().contains(long));
        assert!(world.manager().contains(immortal));
        assert_eq!(world.entity_count(), 2);

        let remaining = world.entity(long).get::<Lifetime>().remaining;
        assert!((remaining - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_system_names() {
        assert_eq!(PhysicsSystem.name(), "physics");
        assert_eq!(LifetimeSystem::new().name(), "lifetime");
    }
}
