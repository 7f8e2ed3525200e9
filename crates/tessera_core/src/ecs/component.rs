//! # Component System
//!
//! Components are plain data containers with no behavior. Every component
//! type claims one of [`MAX_COMPONENT_TYPES`] storage slots through its
//! compile-time [`Component::ID`].

use super::entity::EntityId;
use super::manager::EntityManager;

/// Number of component slots in every [`EntityManager`].
///
/// Component ids must be in `0..MAX_COMPONENT_TYPES`.
pub const MAX_COMPONENT_TYPES: usize = 16;

/// Marker trait for ECS components.
///
/// Components must be:
/// - `'static`: stored behind a type-erased slot and recovered by downcast
/// - `Send + Sync`: a world can be moved to (or shared with) another thread
///
/// The id is a property of the *type*: each distinct component type in a
/// program must use a distinct id. An id of `MAX_COMPONENT_TYPES` or more is
/// rejected when the crate using it is compiled.
///
/// # Example
///
/// ```rust
/// use tessera_core::Component;
///
/// #[repr(u8)]
/// enum ComponentKind {
///     Position = 0,
///     Velocity = 1,
/// }
///
/// struct Position { x: f32, y: f32 }
/// struct Velocity { x: f32, y: f32 }
///
/// impl Component for Position {
///     const ID: u8 = ComponentKind::Position as u8;
/// }
///
/// impl Component for Velocity {
///     const ID: u8 = ComponentKind::Velocity as u8;
/// }
/// ```
///
/// An out-of-range id fails to build as soon as the type is stored:
///
/// ```compile_fail
/// use tessera_core::{Component, World};
///
/// struct Oversized;
///
/// impl Component for Oversized {
///     const ID: u8 = 16;
/// }
///
/// World::new().create_entity().add(Oversized);
/// ```
pub trait Component: Send + Sync + 'static {
    /// Unique identifier for this component type (0-15).
    ///
    /// This ID selects the storage slot of the component's sparse set.
    const ID: u8;
}

/// Resolves a component type to its slot index, with a compile-time range check.
pub(crate) trait ComponentSlot: Component {
    /// Slot index in the manager's slot array.
    const SLOT: usize;
}

impl<C: Component> ComponentSlot for C {
    const SLOT: usize = {
        assert!(
            (C::ID as usize) < MAX_COMPONENT_TYPES,
            "component id must be below MAX_COMPONENT_TYPES"
        );
        C::ID as usize
    };
}

/// A set of component types, tested together against one entity.
///
/// Implemented for every [`Component`] and for tuples of up to eight
/// components. The test is an AND over the members, evaluated left to right
/// and stopping at the first missing type.
///
/// ```rust
/// use tessera_core::{Component, World};
///
/// struct Position(f32, f32);
/// struct Velocity(f32, f32);
/// impl Component for Position { const ID: u8 = 0; }
/// impl Component for Velocity { const ID: u8 = 1; }
///
/// let mut world = World::new();
/// let mut entity = world.create_entity();
/// entity.add(Position(2.0, 4.0));
///
/// assert!(entity.has::<Position>());
/// assert!(!entity.has::<(Position, Velocity)>());
/// ```
pub trait ComponentSet: 'static {
    /// Returns `true` if the entity `id` holds every member of the set.
    fn contained_in(manager: &EntityManager, id: EntityId) -> bool;
}

impl<C: Component> ComponentSet for C {
    #[inline]
    fn contained_in(manager: &EntityManager, id: EntityId) -> bool {
        manager.has_component::<C>(id)
    }
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            #[inline]
            fn contained_in(manager: &EntityManager, id: EntityId) -> bool {
                $(manager.has_component::<$name>(id))&&+
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    struct Velocity;
    struct Health;
    struct Last;

    impl Component for Position {
        const ID: u8 = 0;
    }
    impl Component for Velocity {
        const ID: u8 = 1;
    }
    impl Component for Health {
        const ID: u8 = 2;
    }
    impl Component for Last {
        const ID: u8 = 15;
    }

    #[test]
    fn test_slot_matches_id() {
        assert_eq!(<Position as ComponentSlot>::SLOT, 0);
        assert_eq!(<Velocity as ComponentSlot>::SLOT, 1);
        assert_eq!(<Last as ComponentSlot>::SLOT, MAX_COMPONENT_TYPES - 1);
    }

    #[test]
    fn test_component_set_short_circuits_on_missing() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity().add(Position).add(Health).id();
        let other = manager.create_entity().add(Velocity).add(Last).id();

        assert!(<Position as ComponentSet>::contained_in(&manager, id));
        assert!(<(Position, Health) as ComponentSet>::contained_in(&manager, id));
        assert!(!<(Position, Velocity, Health) as ComponentSet>::contained_in(&manager, id));
        assert!(!<(Velocity,) as ComponentSet>::contained_in(&manager, id));
        assert!(<(Velocity, Last) as ComponentSet>::contained_in(&manager, other));
        assert!(!<(Velocity, Position) as ComponentSet>::contained_in(&manager, other));
    }
}
