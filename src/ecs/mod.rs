// src/ecs/mod.rs
//! ECS (Entity-Ability-Runner) core implementation.

pub mod abilities;
pub mod ability;
pub mod entities;
pub mod entity;
pub mod error;
pub mod runner;

// Re-export key types for easier use via `crate::ecs::X`
pub use abilities::{Abilities, Pooled};
pub use ability::{Ability, AbilityId};
pub use entities::Entities;
pub use entity::{Entity, EntityMut, EntityRef};
pub use error::{EcsError, EcsResult};
pub use runner::{Membership, Runner, RunnerId, Signature};
