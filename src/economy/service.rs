//! Economy service - the single entry point an outer scheduler calls
//!
//! Per faction and per tick:
//! 1. Validate the record (fail-soft: invalid records come back unchanged)
//! 2. Run the growth step once per cadence window
//! 3. Run the resource step and the budget drift every call

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::core::config::EconomyConfig;
use crate::core::telemetry::{EconomyObserver, TracingObserver};
use crate::core::types::{Difficulty, FactionId, Tick};
use crate::economy::growth::{calculate_population_growth, calculate_wealth_growth, GrowthContext};
use crate::economy::resources::{update_budget, update_inventory, FlowContext};
use crate::economy::state::{EconomyState, Faction};

static TRACING: TracingObserver = TracingObserver;

/// World-level inputs for one update call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateContext {
    pub tick: Tick,
    pub epoch: u32,
    pub difficulty: Difficulty,
    pub player_population: u64,
    pub game_speed: f64,
}

impl UpdateContext {
    pub fn new(tick: Tick, epoch: u32, difficulty: Difficulty, player_population: u64) -> Self {
        Self {
            tick,
            epoch,
            difficulty,
            player_population,
            game_speed: 1.0,
        }
    }
}

pub struct EconomyService<'a> {
    config: &'a EconomyConfig,
    observer: &'a dyn EconomyObserver,
}

impl<'a> EconomyService<'a> {
    /// Service reporting through `tracing`
    pub fn new(config: &'a EconomyConfig) -> Self {
        Self {
            config,
            observer: &TRACING,
        }
    }

    pub fn with_observer(config: &'a EconomyConfig, observer: &'a dyn EconomyObserver) -> Self {
        Self { config, observer }
    }

    pub fn config(&self) -> &EconomyConfig {
        self.config
    }

    /// Whether the growth step is due for this state at `tick`
    pub fn growth_due(&self, state: &EconomyState, tick: Tick) -> bool {
        tick.saturating_sub(state.last_growth_tick) >= self.config.growth.update_interval
    }

    /// Advance one faction's economy to `ctx.tick`
    pub fn update(&self, faction: &Faction, ctx: &UpdateContext, rng: &mut impl Rng) -> Faction {
        if let Err(error) = faction.economy.validate() {
            tracing::error!(faction = %faction.id, name = %faction.name, %error, "invalid economy state");
            self.observer.on_validation_failure(faction.id, &error);
            return faction.clone();
        }

        let mut next = faction.clone();

        if self.growth_due(&faction.economy, ctx.tick) {
            self.apply_growth(&mut next, ctx, rng);
        }

        let state = &next.economy;
        let flow = FlowContext {
            tick: ctx.tick,
            game_speed: ctx.game_speed,
            aggression: next.aggression,
        };
        let inventory = update_inventory(state, &flow, &self.config.resources, rng);
        let budget = update_budget(state.budget, state.wealth, ctx.game_speed, &self.config.wealth);

        next.economy.inventory = inventory;
        next.economy.budget = budget;
        next
    }

    fn apply_growth(&self, faction: &mut Faction, ctx: &UpdateContext, rng: &mut impl Rng) {
        let state = &faction.economy;
        let growth_ctx = GrowthContext {
            epoch: ctx.epoch,
            difficulty: ctx.difficulty,
            player_population: ctx.player_population,
            ticks_since_update: ctx.tick.saturating_sub(state.last_growth_tick),
        };

        let population = calculate_population_growth(state, &growth_ctx, self.config, rng);
        let wealth = calculate_wealth_growth(state, &population, &growth_ctx, self.config);
        self.observer.on_population_growth(faction.id, &population);
        self.observer.on_wealth_growth(faction.id, &wealth);

        let state = &mut faction.economy;
        state.population = population.new_population;
        state.base_population = population.new_population;
        state.wealth = wealth.new_wealth;
        state.base_wealth = wealth.new_wealth;
        state.last_growth_tick = ctx.tick;
        state.last_update_tick = ctx.tick;
    }

    /// Update many factions in parallel
    ///
    /// Each faction draws from its own RNG seeded by `(seed, id, tick)`, so the
    /// result does not depend on thread scheduling.
    pub fn update_all(&self, factions: &[Faction], ctx: &UpdateContext, seed: u64) -> Vec<Faction> {
        factions
            .par_iter()
            .map(|faction| {
                let mut rng = faction_rng(seed, faction.id, ctx.tick);
                self.update(faction, ctx, &mut rng)
            })
            .collect()
    }
}

fn mix(seed: u64, modifier: u64) -> u64 {
    let mut h = seed.wrapping_add(modifier);
    h = h.wrapping_mul(6364136223846793005);
    h = h.wrapping_add(1442695040888963407);
    h ^ (h >> 32)
}

/// Deterministic per-faction RNG for one tick
pub fn faction_rng(seed: u64, faction: FactionId, tick: Tick) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(mix(mix(seed, faction.0 as u64), tick))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EconomyError;
    use crate::core::telemetry::{RecordingObserver, TelemetryEvent};

    fn faction(population: u64, wealth: f64) -> Faction {
        Faction::new(FactionId(1), "Ostmark", EconomyState::new(population, wealth, 0))
    }

    #[test]
    fn test_invalid_state_returned_unchanged() {
        let config = EconomyConfig::default();
        let observer = RecordingObserver::new();
        let service = EconomyService::with_observer(&config, &observer);
        let broken = faction(0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = service.update(&broken, &UpdateContext::new(50, 0, Difficulty::Normal, 100), &mut rng);

        assert_eq!(result, broken);
        assert_eq!(
            observer.events(),
            vec![TelemetryEvent::ValidationFailure(
                FactionId(1),
                EconomyError::InvalidPopulation(0.0)
            )]
        );
    }

    #[test]
    fn test_growth_runs_on_cadence_only() {
        let config = EconomyConfig::default();
        let observer = RecordingObserver::new();
        let service = EconomyService::with_observer(&config, &observer);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let start = faction(200, 2_000.0);

        let early = service.update(&start, &UpdateContext::new(5, 0, Difficulty::Normal, 100), &mut rng);
        assert_eq!(early.economy.population, 200);
        assert_eq!(early.economy.last_growth_tick, 0);
        assert!(observer.is_empty());

        let due = service.update(&early, &UpdateContext::new(10, 0, Difficulty::Normal, 100), &mut rng);
        assert!(due.economy.population > 200);
        assert_eq!(due.economy.last_growth_tick, 10);
        assert_eq!(due.economy.last_update_tick, 10);
        assert_eq!(due.economy.base_population, due.economy.population);
        assert_eq!(due.economy.base_wealth, due.economy.wealth);
        assert_eq!(observer.len(), 2);
    }

    #[test]
    fn test_growth_is_idempotent_within_a_tick() {
        let config = EconomyConfig::default();
        let service = EconomyService::with_observer(&config, &crate::core::telemetry::NullObserver);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let ctx = UpdateContext::new(30, 0, Difficulty::Hard, 400);

        let once = service.update(&faction(300, 3_000.0), &ctx, &mut rng);
        let twice = service.update(&once, &ctx, &mut rng);

        assert_eq!(once.economy.population, twice.economy.population);
        assert_eq!(once.economy.wealth, twice.economy.wealth);
    }

    #[test]
    fn test_budget_stays_within_wealth() {
        let config = EconomyConfig::default();
        let service = EconomyService::new(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut current = faction(150, 1_500.0);
        current.economy.budget = 1_500.0;

        for tick in 1..200 {
            current = service.update(&current, &UpdateContext::new(tick, 0, Difficulty::Normal, 100), &mut rng);
            assert!(current.economy.budget >= 0.0);
            assert!(current.economy.budget <= current.economy.wealth);
        }
    }

    #[test]
    fn test_parallel_update_matches_serial() {
        let config = EconomyConfig::default();
        let service = EconomyService::with_observer(&config, &crate::core::telemetry::NullObserver);
        let ctx = UpdateContext::new(20, 1, Difficulty::Normal, 800);
        let factions: Vec<Faction> = (1..=16)
            .map(|i| {
                Faction::new(
                    FactionId(i),
                    format!("Faction {i}"),
                    EconomyState::new(100 * i as u64, 1_000.0 * i as f64, 1),
                )
            })
            .collect();

        let parallel = service.update_all(&factions, &ctx, 99);
        let serial: Vec<Faction> = factions
            .iter()
            .map(|f| service.update(f, &ctx, &mut faction_rng(99, f.id, ctx.tick)))
            .collect();

        assert_eq!(parallel, serial);
    }
}
