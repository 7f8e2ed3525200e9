//! # TESSERA Core Engine
//!
//! Sparse-set Entity Component System (ECS) designed for:
//! - Millions of entities per world
//! - O(1) attach / detach / lookup of components
//! - Branch-free dense iteration over a single component type
//!
//! ## Architecture Rules
//!
//! 1. **One sparse set per component type** - no archetype tables
//! 2. **Compile-time slot ids** - every component type names its own slot
//! 3. **Contract violations panic** - hot paths carry no error values
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{Component, World};
//!
//! struct Position { x: f32, y: f32 }
//! impl Component for Position { const ID: u8 = 0; }
//!
//! let mut world = World::new();
//! let entity = world.create_entity().add(Position { x: 2.0, y: 4.0 }).entity();
//!
//! for (e, position) in world.view::<Position>() {
//!     assert_eq!(e, entity);
//!     assert_eq!(position.x, 2.0);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;

pub use ecs::{
    ColumnMut, Component, ComponentSet, EcsError, EcsResult, Entity, EntityId, EntityManager,
    EntityMut, EntityRef, ManagerId, Query, ScanIter, ScanIterMut, SingleIter, SingleIterMut,
    SparseSet, System, World, MAX_COMPONENT_TYPES,
};
