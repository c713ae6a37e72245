//! Adapters for the nested nation record of older saves
//!
//! The old format keeps baselines under `economyTraits` and stores numbers as
//! plain JSON numbers. Unknown fields are carried through untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{EconomyError, Result};
use crate::core::types::{Resource, Tick};
use crate::economy::state::EconomyState;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EconomyTraits {
    pub own_base_population: Option<f64>,
    pub own_base_wealth: Option<f64>,
    pub development_rate: Option<f64>,
    pub last_growth_tick: Option<Tick>,
    pub resource_bias: BTreeMap<String, f64>,
}

/// Nation record as written by older saves
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyNation {
    pub name: String,
    pub population: Option<f64>,
    pub wealth: Option<f64>,
    pub epoch: Option<f64>,
    pub budget: Option<f64>,
    pub inventory: BTreeMap<String, f64>,
    pub economy_traits: Option<EconomyTraits>,
    pub is_at_war: bool,
    pub vassal_of: Option<Value>,
    #[serde(rename = "_lastEpochUpgradeTick")]
    pub last_epoch_upgrade_tick: Option<Tick>,
    #[serde(rename = "_economyMigrated")]
    pub economy_migrated: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn resource_map(raw: &BTreeMap<String, f64>) -> ahash::AHashMap<Resource, f64> {
    raw.iter()
        .filter_map(|(key, value)| Resource::from_key(key).map(|r| (r, *value)))
        .collect()
}

impl EconomyState {
    /// Flatten a legacy record; missing numbers take the usual defaults
    pub fn from_legacy(nation: &LegacyNation) -> Result<Self> {
        let population = nation.population.unwrap_or(100.0);
        if !population.is_finite() || population < 1.0 {
            return Err(EconomyError::InvalidPopulation(population));
        }
        let wealth = nation.wealth.unwrap_or(1000.0);
        if !wealth.is_finite() || wealth < 0.0 {
            return Err(EconomyError::InvalidWealth(wealth));
        }
        let epoch = nation.epoch.unwrap_or(0.0);
        if !epoch.is_finite() || epoch < 0.0 || epoch.fract() != 0.0 {
            return Err(EconomyError::InvalidEpoch(epoch));
        }

        let mut state = EconomyState::new(population.floor() as u64, wealth, epoch as u32);
        state.budget = nation.budget.unwrap_or(wealth * 0.5);
        state.inventory = resource_map(&nation.inventory);
        state.is_at_war = nation.is_at_war;
        state.is_vassal = nation.vassal_of.as_ref().is_some_and(|v| !v.is_null());
        state.last_epoch_upgrade_tick = nation.last_epoch_upgrade_tick.unwrap_or(0);

        if let Some(traits) = &nation.economy_traits {
            if let Some(base) = traits.own_base_population.filter(|b| b.is_finite() && *b >= 1.0) {
                state.base_population = base.floor() as u64;
            }
            if let Some(base) = traits.own_base_wealth.filter(|b| b.is_finite() && *b >= 0.0) {
                state.base_wealth = base;
            }
            state.development_rate = traits.development_rate.unwrap_or(1.0);
            state.last_growth_tick = traits.last_growth_tick.unwrap_or(0);
            state.resource_bias = resource_map(&traits.resource_bias);
        }

        state.validate()?;
        Ok(state)
    }

    /// Write this state back over `nation`, keeping fields it doesn't own
    pub fn to_legacy(&self, nation: &LegacyNation) -> LegacyNation {
        let mut next = nation.clone();
        next.population = Some(self.population as f64);
        next.wealth = Some(self.wealth);
        next.epoch = Some(self.epoch as f64);
        next.budget = Some(self.budget);
        for (resource, amount) in &self.inventory {
            next.inventory.insert(resource.key().to_string(), *amount);
        }

        let mut traits = nation.economy_traits.clone().unwrap_or_default();
        traits.own_base_population = Some(self.base_population as f64);
        traits.own_base_wealth = Some(self.base_wealth);
        traits.development_rate = Some(self.development_rate);
        traits.last_growth_tick = Some(self.last_growth_tick);
        traits.resource_bias = self
            .resource_bias
            .iter()
            .map(|(resource, bias)| (resource.key().to_string(), *bias))
            .collect();
        next.economy_traits = Some(traits);
        next.last_epoch_upgrade_tick = Some(self.last_epoch_upgrade_tick);
        next
    }
}

/// Normalize one legacy nation, or hand it back untouched if it won't convert
pub fn migrate_nation(nation: &LegacyNation) -> LegacyNation {
    if nation.economy_migrated {
        return nation.clone();
    }

    match EconomyState::from_legacy(nation) {
        Ok(state) => {
            let mut migrated = state.to_legacy(nation);
            migrated.economy_migrated = true;
            migrated
        }
        Err(error) => {
            tracing::warn!(nation = %nation.name, %error, "economy migration failed");
            nation.clone()
        }
    }
}

pub fn migrate_all(nations: &[LegacyNation]) -> Vec<LegacyNation> {
    nations.iter().map(migrate_nation).collect()
}
