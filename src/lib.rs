//! Faction Economy - growth, resource equilibrium and unrest for AI factions

pub mod core;
pub mod economy;
pub mod rebellion;
pub mod simulation;
pub mod unrest;

pub use crate::core::config::EconomyConfig;
pub use crate::core::error::{ConfigError, EconomyError};
pub use crate::core::types::{Difficulty, FactionId, Resource, SocialGroup, Tick};
pub use economy::{EconomyService, EconomyState, Faction, UpdateContext};
pub use rebellion::{FactionRegistry, RebelFaction, RebelFactionFactory, SourceLedger};
pub use simulation::FactionSimulation;
pub use unrest::{UnrestAction, UnrestStage, UnrestState, UnrestTracker};
