//! # Entity Component System
//!
//! A sparse-set ECS: every component type owns one [`SparseSet`], all sets
//! live in a fixed array of type-erased slots inside the [`EntityManager`].
//!
//! ## Design Philosophy
//!
//! - Component types pick their slot at compile time (`Component::ID`)
//! - Entity ids are plain, strictly increasing integers that are never reused
//! - Single-component views walk dense arrays, multi-component views scan ids
//!   in ascending order
//! - No dynamic dispatch in hot paths (only systems are trait objects)

mod component;
mod entity;
mod error;
mod manager;
mod slot;
mod sparse_set;
mod system;
mod view;
mod world;

pub use component::{Component, ComponentSet, MAX_COMPONENT_TYPES};
pub use entity::{Entity, EntityId, EntityMut, EntityRef, ManagerId};
pub use error::{EcsError, EcsResult};
pub use manager::EntityManager;
pub use sparse_set::SparseSet;
pub use system::System;
pub use view::{ColumnMut, Query, ScanIter, ScanIterMut, SingleIter, SingleIterMut};
pub use world::World;
