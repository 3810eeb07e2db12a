//! Interaction domain — игрок: ходьба, лазание по лестнице, подбор/бросок/установка
//!
//! Содержит:
//! - Intent (per-frame ввод)
//! - PlayerState (grounded / climbing / held / placed ladder)
//! - ContactTracker (fold контактов от physics collaborator)
//! - PlayerInteractionController (state machine)
//! - Collaborator traits (PhysicsBody, Carryables, SpawnService, Presentation)
//!
//! Engine-agnostic: ECS хост живёт в `crate::host`.

pub mod collaborators;
pub mod contacts;
pub mod controller;
pub mod intent;
pub mod state;

#[cfg(test)]
mod mock_host;

pub use collaborators::*;
pub use contacts::*;
pub use controller::*;
pub use intent::*;
pub use state::*;
