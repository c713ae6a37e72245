//! AI faction economy: state, growth, resource equilibrium and the update service

pub mod growth;
pub mod legacy;
pub mod resources;
pub mod service;
pub mod state;

pub use growth::{GrowthContext, PopulationGrowth, WealthGrowth};
pub use legacy::{migrate_all, migrate_nation, LegacyNation};
pub use resources::{BasePrices, MarketPrices};
pub use service::{EconomyService, UpdateContext};
pub use state::{EconomyState, Faction};
