//! # Simulation Components
//!
//! Plain data attached to simulated entities. Slot ids are listed once in
//! [`ComponentKind`] so no two components can claim the same one.

use tessera_core::Component;

/// Slot id of every component type in this crate.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// [`Position`]
    Position = 0,
    /// [`Velocity`]
    Velocity = 1,
    /// [`Lifetime`]
    Lifetime = 2,
}

/// 2D position in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Component for Position {
    const ID: u8 = ComponentKind::Position as u8;
}

/// 2D velocity in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the speed (magnitude).
    #[inline]
    #[must_use]
    pub fn speed(self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Component for Velocity {
    const ID: u8 = ComponentKind::Velocity as u8;
}

/// Time an entity has left before it is destroyed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lifetime {
    /// Remaining seconds. The entity expires once this reaches zero.
    pub remaining: f32,
}

impl Lifetime {
    /// Creates a lifetime of `seconds`.
    #[inline]
    #[must_use]
    pub const fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Returns `true` once no time is left.
    #[inline]
    #[must_use]
    pub fn is_expired(self) -> bool {
        self.remaining <= 0.0
    }
}

impl Component for Lifetime {
    const ID: u8 = ComponentKind::Lifetime as u8;
}
