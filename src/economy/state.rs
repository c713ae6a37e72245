//! Economy state - the per-faction record the service reads and rewrites

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::RebellionConfig;
use crate::core::error::{EconomyError, Result};
use crate::core::types::{FactionId, Resource, Tick};
use crate::rebellion::RebelFaction;

/// Economic state of one AI faction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    pub population: u64,
    pub wealth: f64,
    pub epoch: u32,

    // Growth baselines, reset after every growth step
    pub base_population: u64,
    pub base_wealth: f64,

    pub inventory: AHashMap<Resource, f64>,
    pub budget: f64,
    pub development_rate: f64,
    pub resource_bias: AHashMap<Resource, f64>, // missing = 1.0
    pub population_factor: f64,                 // nation-power capacity trait

    pub last_update_tick: Tick,
    pub last_growth_tick: Tick,
    pub last_epoch_upgrade_tick: Tick,

    pub is_at_war: bool,
    pub is_vassal: bool,
}

impl EconomyState {
    pub fn new(population: u64, wealth: f64, epoch: u32) -> Self {
        Self {
            population,
            wealth,
            epoch,
            base_population: population,
            base_wealth: wealth,
            inventory: AHashMap::new(),
            budget: wealth * 0.5,
            development_rate: 1.0,
            resource_bias: AHashMap::new(),
            population_factor: 1.0,
            last_update_tick: 0,
            last_growth_tick: 0,
            last_epoch_upgrade_tick: 0,
            is_at_war: false,
            is_vassal: false,
        }
    }

    pub fn with_bias(mut self, resource: Resource, bias: f64) -> Self {
        self.resource_bias.insert(resource, bias);
        self
    }

    pub fn with_stock(mut self, resource: Resource, amount: f64) -> Self {
        self.inventory.insert(resource, amount);
        self
    }

    /// Development baseline for a freshly generated AI faction
    ///
    /// `wealth_template` scales the baseline relative to an 800-wealth
    /// reference nation; aggressive factions develop slightly faster.
    pub fn seed_baseline(
        wealth_template: f64,
        aggression: f64,
        epoch: u32,
        tick: Tick,
        rng: &mut impl Rng,
    ) -> Self {
        let template_factor = wealth_template.max(0.0) / 800.0;
        let population =
            ((16.0 * template_factor * rng.gen_range(0.8..1.2)).round() as u64).max(5);
        let wealth = (1000.0 * template_factor * rng.gen_range(0.8..1.2))
            .round()
            .max(500.0);

        let mut state = Self::new(population, wealth, epoch);
        state.development_rate = 0.8 + aggression * 0.3 + rng.gen_range(0.0..0.4);
        state.last_growth_tick = tick;
        state.last_update_tick = tick;
        state
    }

    /// Economy of a rebel faction, held close to its spawn values
    pub fn for_rebel(rebel: &RebelFaction, epoch: u32, tick: Tick, config: &RebellionConfig) -> Self {
        let base_population = rebel.population.max(5);
        let base_wealth = rebel.wealth.max(100.0);

        let max_population = base_population
            .max((base_population as f64 * (1.0 + config.economy_population_margin)) as u64);
        let max_wealth =
            base_wealth.max((base_wealth * (1.0 + config.economy_wealth_margin)).floor());

        let population = rebel.population.clamp(5, max_population);
        let wealth = rebel.wealth.round().clamp(base_wealth * 0.5, max_wealth);

        let mut state = Self::new(population, wealth, epoch);
        state.base_population = base_population;
        state.base_wealth = base_wealth;
        state.budget = rebel.budget.max(0.0).min(wealth);
        state.inventory = rebel.inventory.clone();
        state.is_at_war = rebel.is_at_war;
        state.population_factor = rebel.population_factor;
        state.last_growth_tick = tick;
        state.last_update_tick = tick;
        state
    }

    pub fn per_capita_wealth(&self) -> f64 {
        self.wealth / self.population.max(1) as f64
    }

    pub fn bias(&self, resource: Resource) -> f64 {
        self.resource_bias.get(&resource).copied().unwrap_or(1.0)
    }

    pub fn stock(&self, resource: Resource) -> f64 {
        self.inventory.get(&resource).copied().unwrap_or(0.0)
    }

    /// Reject records the calculators cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.population < 1 {
            return Err(EconomyError::InvalidPopulation(self.population as f64));
        }
        if !self.wealth.is_finite() || self.wealth < 0.0 {
            return Err(EconomyError::InvalidWealth(self.wealth));
        }
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(EconomyError::InvalidBudget(self.budget));
        }
        if !self.development_rate.is_finite() || self.development_rate <= 0.0 {
            return Err(EconomyError::InvalidDevelopmentRate(self.development_rate));
        }
        if let Some((resource, amount)) = self
            .inventory
            .iter()
            .find(|(_, amount)| !amount.is_finite() || **amount < 0.0)
        {
            return Err(EconomyError::InvalidInventory {
                resource: resource.key().to_string(),
                amount: *amount,
            });
        }
        Ok(())
    }
}

/// An AI-controlled faction as seen by the economy engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub aggression: f64,
    pub economy: EconomyState,
}

impl Faction {
    pub fn new(id: FactionId, name: impl Into<String>, economy: EconomyState) -> Self {
        Self {
            id,
            name: name.into(),
            aggression: 0.2,
            economy,
        }
    }

    pub fn with_aggression(mut self, aggression: f64) -> Self {
        self.aggression = aggression;
        self
    }

    /// AI faction built from a drained rebel spawn
    pub fn from_rebel(rebel: &RebelFaction, epoch: u32, tick: Tick, config: &RebellionConfig) -> Self {
        Self {
            id: rebel.id,
            name: rebel.name.clone(),
            aggression: rebel.aggression,
            economy: EconomyState::for_rebel(rebel, epoch, tick, config),
        }
    }
}
