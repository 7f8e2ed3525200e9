//! # Systems
//!
//! Behavior that runs once per [`World::update`](super::world::World::update).

use super::world::World;

/// A unit of per-frame behavior.
///
/// Systems receive the whole world, so they can both iterate views and
/// change structure. A view borrows the world, so structural changes
/// (create, destroy) happen after the iteration that decided them.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, System, World};
///
/// struct Age(f32);
/// impl Component for Age { const ID: u8 = 0; }
///
/// struct Aging;
///
/// impl System for Aging {
///     fn update(&mut self, world: &mut World, dt: f32) {
///         for (_, age) in world.view_mut::<Age>() {
///             age.0 += dt;
///         }
///     }
/// }
///
/// let mut world = World::new();
/// let entity = world.create_entity().add(Age(0.0)).entity();
/// world.add_system(Aging);
/// world.update(0.5);
///
/// assert_eq!(world.entity(entity).get::<Age>().0, 0.5);
/// ```
pub trait System: Send + 'static {
    /// Runs the system for one frame of `dt` seconds.
    fn update(&mut self, world: &mut World, dt: f32);

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
