//! Growth calculator - logistic population growth and bounded wealth growth
//!
//! Both calculations are pure: they read an `EconomyState`, return a
//! breakdown, and leave writing the result back to the service.

use rand::Rng;
use serde::Serialize;

use crate::core::config::EconomyConfig;
use crate::core::types::{Difficulty, Resource};
use crate::economy::resources::target_inventory;
use crate::economy::state::EconomyState;

/// Inputs shared by the growth calculations of one cadence window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthContext {
    pub epoch: u32,
    pub difficulty: Difficulty,
    pub player_population: u64,
    pub ticks_since_update: u64,
}

/// Result of one population growth step, with every factor that shaped it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationGrowth {
    pub new_population: u64,
    pub growth: i64,
    pub growth_rate: f64,
    pub carrying_capacity: f64,
    pub intrinsic_rate: f64,
    pub logistic_factor: f64,
    pub overcapacity_penalty: f64,
    pub resource_factor: f64,
    pub difficulty_multiplier: f64,
    pub small_faction_bonus: f64,
    pub random_factor: f64,
    pub war_penalized: bool,
    pub decline_capped: bool,
    pub minimum_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WealthGrowth {
    pub new_wealth: f64,
    pub growth: f64,
    pub growth_rate: f64,
    pub target_wealth: f64,
    pub abundance_ratio: f64,
    pub abundance_factor: f64,
    pub catch_up_factor: f64,
    pub effective_max_rate: f64,
    /// The per-capita ceiling cut the result
    pub capped: bool,
}

// === CARRYING CAPACITY ===

/// Population the faction's land, food and development can sustain
pub fn carrying_capacity(state: &EconomyState, ctx: &GrowthContext, config: &EconomyConfig) -> f64 {
    let growth = &config.growth;

    let base = growth
        .epoch_minimum_base(ctx.epoch)
        .max(ctx.player_population as f64 * growth.capacity_per_player);

    let development = (0.5 + 0.5 * state.development_rate).clamp(0.5, 1.5);
    let epoch = 1.0 + 0.1 * ctx.epoch as f64;
    let food_ratio =
        (state.stock(Resource::Food) + 100.0) / (state.population.max(1) as f64 * 10.0);
    let food = 0.6 + 0.3 * food_ratio.min(2.0);
    let difficulty = config.difficulty.capacity(ctx.difficulty);

    let capacity = base * development * epoch * food * state.population_factor * difficulty;
    capacity.max(growth.epoch_minimum_final(ctx.epoch))
}

// === POPULATION ===

pub fn calculate_population_growth(
    state: &EconomyState,
    ctx: &GrowthContext,
    config: &EconomyConfig,
    rng: &mut impl Rng,
) -> PopulationGrowth {
    let growth_config = &config.growth;
    let population = state.population.max(1);
    let current = population as f64;

    let capacity = carrying_capacity(state, ctx, config);
    let ratio = current / capacity;
    let logistic_factor = 1.0 - ratio;
    let overcapacity_penalty = if ratio > 1.0 {
        (-growth_config.overcapacity_steepness * (ratio - 1.0)).exp()
    } else {
        1.0
    };

    let per_capita = state.per_capita_wealth();
    let mut resource_factor = if per_capita < growth_config.poor_per_capita {
        growth_config.poor_factor
    } else if per_capita > growth_config.rich_per_capita {
        growth_config.rich_factor
    } else {
        1.0
    };
    resource_factor *= 0.9 + 0.1 * state.development_rate;

    let intrinsic_rate = growth_config.base_rate * growth_config.tick_scale(ctx.ticks_since_update);
    let difficulty_multiplier = config.difficulty.growth(ctx.difficulty);
    let small_faction_bonus = growth_config.small_faction_bonus_for(population);
    let spread = growth_config.random_spread;
    let random_factor = if spread > 0.0 {
        rng.gen_range(1.0 - spread..=1.0 + spread)
    } else {
        1.0
    };

    let mut growth = current
        * intrinsic_rate
        * logistic_factor
        * resource_factor
        * overcapacity_penalty
        * difficulty_multiplier
        * small_faction_bonus
        * random_factor;

    // Whole people only; sub-unit drift must not round a stable faction down
    growth = growth.trunc();

    let war_penalized = state.is_at_war;
    if war_penalized {
        growth = (growth * growth_config.war_penalty).trunc();
    }

    let mut decline_capped = false;
    let mut minimum_applied = false;
    if growth < 0.0 {
        let max_decline = (current * growth_config.max_decline_ratio).floor().max(1.0);
        if growth < -max_decline {
            growth = -max_decline;
            decline_capped = true;
        }
    } else {
        let minimum = growth_config.minimum_growth_for(population) as f64;
        if growth < minimum {
            growth = minimum;
            minimum_applied = true;
        }
    }

    let new_population = ((current + growth).floor() as u64).max(1);
    let delta = new_population as i64 - population as i64;

    PopulationGrowth {
        new_population,
        growth: delta,
        growth_rate: delta as f64 / current,
        carrying_capacity: capacity,
        intrinsic_rate,
        logistic_factor,
        overcapacity_penalty,
        resource_factor,
        difficulty_multiplier,
        small_faction_bonus,
        random_factor,
        war_penalized,
        decline_capped,
        minimum_applied,
    }
}

// === WEALTH ===

/// Mean stock/target ratio over tradable resources
pub fn abundance_ratio(state: &EconomyState, config: &EconomyConfig) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for resource in Resource::tradable() {
        let target = target_inventory(state, resource, &config.resources);
        if target > 0.0 {
            total += state.stock(resource) / target;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

fn abundance_factor(ratio: f64, config: &EconomyConfig) -> f64 {
    let abundance = &config.wealth.abundance;
    if !abundance.enabled {
        return 1.0;
    }
    if ratio <= abundance.optimal_ratio {
        1.0 + abundance.max_bonus * (ratio / abundance.optimal_ratio)
    } else {
        1.0 + abundance.max_bonus * (-(ratio - abundance.optimal_ratio)).exp()
    }
}

/// Wealth after one cadence window, given the population that window produced
pub fn calculate_wealth_growth(
    state: &EconomyState,
    population: &PopulationGrowth,
    ctx: &GrowthContext,
    config: &EconomyConfig,
) -> WealthGrowth {
    let wealth_config = &config.wealth;
    let wealth = state.wealth;
    let new_population = population.new_population.max(1) as f64;

    let target_per_capita = wealth_config.target_per_capita(ctx.epoch);
    let target_wealth = new_population * target_per_capita;

    let ratio = abundance_ratio(state, config);
    let abundance = abundance_factor(ratio, config);

    let catch_up = if target_wealth > 0.0 && wealth < target_wealth {
        (1.0 + (target_wealth - wealth) / target_wealth).min(wealth_config.catch_up_cap)
    } else if wealth / new_population > wealth_config.overshoot_ratio * target_per_capita {
        wealth_config.overshoot_factor
    } else {
        1.0
    };

    let population_rate =
        (population.new_population as f64 - state.population as f64) / state.population.max(1) as f64;
    let raw_rate = (population_rate
        + wealth_config.base_growth_rate
        + wealth_config.development_bonus * (state.development_rate - 1.0)
        + wealth_config.epoch_bonus * ctx.epoch as f64)
        * abundance
        * catch_up
        * config.growth.tick_scale(ctx.ticks_since_update);

    let effective_max_rate = if catch_up >= wealth_config.strong_catch_up {
        wealth_config.max_growth_rate * wealth_config.strong_catch_up_boost
    } else {
        wealth_config.max_growth_rate
    };
    let rate = raw_rate.clamp(-wealth_config.max_decline_rate, effective_max_rate);

    let mut new_wealth = (wealth * (1.0 + rate)).round();
    if rate >= 0.0 {
        new_wealth = new_wealth.max(wealth + wealth_config.minimum_growth);
    }

    let ceiling = new_population * wealth_config.per_capita_cap(ctx.epoch);
    let capped = new_wealth > ceiling;
    if capped {
        new_wealth = ceiling;
    }
    new_wealth = new_wealth.max(wealth_config.wealth_floor);

    WealthGrowth {
        new_wealth,
        growth: new_wealth - wealth,
        growth_rate: rate,
        target_wealth,
        abundance_ratio: ratio,
        abundance_factor: abundance,
        catch_up_factor: catch_up,
        effective_max_rate,
        capped,
    }
}
