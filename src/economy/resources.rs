//! Resource manager - keeps each tradable stock oscillating around its target
//!
//! Production and consumption follow a long deterministic market cycle per
//! resource. A graduated feedback on the stock/target ratio, a linear
//! correction and a small random shock pull the stock back into its band.

use std::f64::consts::PI;

use ahash::AHashMap;
use rand::Rng;

use crate::core::config::{ResourceConfig, WealthConfig};
use crate::core::types::{Resource, Tick};
use crate::economy::state::EconomyState;

/// Bias below this would collapse the target to zero
const MIN_BIAS: f64 = 0.05;

/// Price source used to value inventory
pub trait MarketPrices {
    /// Unit price in silver; unknown resources are worth 1
    fn price(&self, resource: Resource) -> f64;
}

impl MarketPrices for AHashMap<Resource, f64> {
    fn price(&self, resource: Resource) -> f64 {
        self.get(&resource).copied().unwrap_or(1.0)
    }
}

/// Static list prices from the resource catalogue
#[derive(Debug, Default, Clone, Copy)]
pub struct BasePrices;

impl MarketPrices for BasePrices {
    fn price(&self, resource: Resource) -> f64 {
        resource.base_price()
    }
}

pub fn epoch_multiplier(epoch: u32) -> f64 {
    let epoch = epoch as f64;
    1.0 + 0.5 * epoch + 0.1 * epoch.powf(1.3)
}

pub fn wealth_factor(wealth: f64) -> f64 {
    (wealth / 1000.0).clamp(0.8, 2.0)
}

fn effective_bias(state: &EconomyState, resource: Resource) -> f64 {
    state.bias(resource).max(MIN_BIAS)
}

/// Stock level the faction tries to hold for `resource`
pub fn target_inventory(state: &EconomyState, resource: Resource, config: &ResourceConfig) -> f64 {
    let bias = effective_bias(state, resource);
    (config.base_inventory_target
        * bias.powf(1.2)
        * epoch_multiplier(state.epoch)
        * wealth_factor(state.wealth))
    .round()
}

/// Phase of the long market cycle, in [-1, 1]
///
/// Depends only on the resource and the tick, so every faction sees the
/// same market weather.
pub fn cycle_phase(resource: Resource, tick: Tick, config: &ResourceConfig) -> f64 {
    let offset: u64 = resource.key().bytes().map(u64::from).sum();
    let span = config.cycle_period_max.saturating_sub(config.cycle_period_min).max(1);
    let period = (config.cycle_period_min + offset % span) as f64;
    (2.0 * PI * tick as f64 / period + 0.1 * offset as f64).sin()
}

/// One tick of flow for a single resource
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceFlow {
    pub target: f64,
    pub production: f64,
    pub consumption: f64,
    pub new_stock: f64,
}

/// Per-tick inputs that don't live on the state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowContext {
    pub tick: Tick,
    pub game_speed: f64,
    pub aggression: f64,
}

pub fn resource_flow(
    state: &EconomyState,
    resource: Resource,
    ctx: &FlowContext,
    config: &ResourceConfig,
    rng: &mut impl Rng,
) -> ResourceFlow {
    let bias = effective_bias(state, resource);
    let stock = state.stock(resource);
    let target = target_inventory(state, resource, config);
    let scale = epoch_multiplier(state.epoch) * wealth_factor(state.wealth);
    let speed = ctx.game_speed;

    let phase = cycle_phase(resource, ctx.tick, config).max(0.0);
    let amplitude = config.trend_amplitude + config.bias_amplitude * (bias - 1.0).abs();

    // Specialties produce more on the upswing, scarce goods are eaten faster
    let production_trend = if bias > 1.0 {
        1.0 + phase * amplitude + 0.2
    } else {
        1.0 - phase * amplitude * 0.4
    };
    let consumption_trend = if bias < 1.0 {
        1.0 + phase * amplitude + 0.15
    } else {
        1.0 - phase * amplitude * 0.25
    };

    let war = if state.is_at_war {
        config.war_consumption_multiplier + config.war_aggression_weight * ctx.aggression
    } else {
        1.0
    };

    let base_production =
        config.base_production_rate * scale * bias.powf(1.2) * production_trend * speed;
    let base_consumption = config.base_consumption_rate
        * scale
        * (1.0 / bias).powf(0.8)
        * consumption_trend
        * war
        * speed;

    let stock_ratio = if target > 0.0 { stock / target } else { 1.0 };
    let (production_adjust, consumption_adjust) = if stock_ratio > 1.5 {
        (0.5, 1.15)
    } else if stock_ratio > 1.1 {
        (0.8, 1.05)
    } else if stock_ratio < 0.5 {
        (1.5, 0.85)
    } else if stock_ratio < 0.9 {
        (1.2, 0.95)
    } else {
        (1.0, 1.0)
    };

    let correction = (target - stock) * config.correction_rate * speed;
    let shock = (rng.gen::<f64>() - 0.5) * target * config.shock_ratio * speed;

    let production = base_production * production_adjust + correction + shock;
    let consumption = base_consumption * consumption_adjust;

    let min = target * config.min_inventory_ratio;
    let max = target * config.max_inventory_ratio;
    let new_stock = (stock + production - consumption).clamp(min, max);

    ResourceFlow {
        target,
        production,
        consumption,
        new_stock,
    }
}

/// Advance every tradable stock by one tick
///
/// Non-tradable entries already in the inventory are left as they are.
pub fn update_inventory(
    state: &EconomyState,
    ctx: &FlowContext,
    config: &ResourceConfig,
    rng: &mut impl Rng,
) -> AHashMap<Resource, f64> {
    let mut inventory = state.inventory.clone();
    for resource in Resource::tradable() {
        let flow = resource_flow(state, resource, ctx, config, rng);
        inventory.insert(resource, flow.new_stock);
    }
    inventory
}

/// Move the budget toward its share of wealth, never outside [0, wealth]
pub fn update_budget(budget: f64, wealth: f64, game_speed: f64, config: &WealthConfig) -> f64 {
    let target = wealth * config.budget_ratio;
    let next = budget + (target - budget) * config.budget_recovery_rate * game_speed;
    next.clamp(0.0, wealth.max(0.0))
}

/// Silver value of the given stocks
pub fn inventory_value(inventory: &AHashMap<Resource, f64>, prices: &impl MarketPrices) -> f64 {
    inventory
        .iter()
        .map(|(resource, amount)| amount * prices.price(*resource))
        .sum()
}
