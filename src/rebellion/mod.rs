//! Secession: rebel factions, their factory and the registry they join

pub mod faction;
pub mod factory;
pub mod registry;

pub use faction::{IdSource, RebelFaction, SequentialIds};
pub use factory::{OfficialProfile, RebelFactionFactory, RebelSpawn, SourceDebit, SourceLedger};
pub use registry::FactionRegistry;
