//! # ECS Error Types
//!
//! Contract violations detected by the ECS. The panicking APIs format their
//! messages from these variants; the `try_*` and `check` APIs return them.

use thiserror::Error;

use super::entity::EntityId;

/// Errors that can occur in the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity was destroyed or never created by this manager.
    #[error("entity {0} is not alive")]
    EntityNotAlive(EntityId),

    /// The handle was created by a different manager.
    #[error("entity {0} belongs to a different entity manager")]
    ForeignEntity(EntityId),

    /// The entity does not hold the requested component.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        /// The entity that was queried.
        entity: EntityId,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// Two component types declared the same id.
    #[error("component slot {slot} holds {bound}, cannot access it as {requested}")]
    SlotConflict {
        /// The contested slot index.
        slot: usize,
        /// Type name of the component that populated the slot first.
        bound: &'static str,
        /// Type name of the component that was requested.
        requested: &'static str,
    },

    /// The same component type appeared twice in a mutable view.
    #[error("component {0} requested twice in one mutable view")]
    DuplicateComponent(&'static str),

    /// Every id the manager can represent has been handed out.
    #[error("entity id space exhausted")]
    IdSpaceExhausted,
}

/// Result type for checked ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let id = EntityId::from_raw(3);
        assert_eq!(EcsError::EntityNotAlive(id).to_string(), "entity 3 is not alive");
        assert_eq!(
            EcsError::MissingComponent {
                entity: id,
                component: "Position",
            }
            .to_string(),
            "entity 3 has no Position component"
        );
        assert_eq!(
            EcsError::SlotConflict {
                slot: 1,
                bound: "Velocity",
                requested: "Health",
            }
            .to_string(),
            "component slot 1 holds Velocity, cannot access it as Health"
        );
    }
}
