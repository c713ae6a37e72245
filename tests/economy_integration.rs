//! Integration tests for the economy service over many ticks

use std::path::Path;

use faction_economy::core::telemetry::TelemetryEvent;
use faction_economy::core::RecordingObserver;
use faction_economy::economy::resources::target_inventory;
use faction_economy::economy::service::faction_rng;
use faction_economy::{
    Difficulty, EconomyConfig, EconomyError, EconomyService, EconomyState, Faction, FactionId, Resource,
    UpdateContext,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn world(seed: u64) -> Vec<Faction> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    [(600.0, 0.1), (900.0, 0.5), (1_600.0, 0.9)]
        .into_iter()
        .enumerate()
        .map(|(i, (template, aggression))| {
            let economy = EconomyState::seed_baseline(template, aggression, 1, 0, &mut rng)
                .with_bias(Resource::Iron, 1.6)
                .with_bias(Resource::Food, 0.6)
                .with_stock(Resource::Food, 300.0)
                .with_stock(Resource::Iron, 50.0);
            Faction::new(FactionId(i as u32 + 1), format!("Realm {i}"), economy).with_aggression(aggression)
        })
        .collect()
}

#[test]
fn test_sample_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/economy.toml");
    let config = EconomyConfig::from_file(&path).unwrap();
    assert_eq!(config, EconomyConfig::default());
}

#[test]
fn test_small_faction_grows_at_least_minimum() {
    let config = EconomyConfig::default();
    let service = EconomyService::new(&config);
    let faction = Faction::new(FactionId(1), "Hollow", EconomyState::new(75, 7_500.0, 0));
    let ctx = UpdateContext::new(10, 0, Difficulty::Normal, 1_000);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let next = service.update(&faction, &ctx, &mut rng);

    assert!(next.economy.population >= 80);
    assert_eq!(next.economy.last_growth_tick, 10);
}

#[test]
fn test_long_run_stays_within_bounds() {
    let config = EconomyConfig::default();
    let service = EconomyService::new(&config);
    let mut factions = world(3);

    for tick in 1..=300 {
        let mut ctx = UpdateContext::new(tick, 1, Difficulty::Hard, 4_000);
        ctx.game_speed = 1.5;
        factions = service.update_all(&factions, &ctx, 99);

        for faction in &factions {
            let economy = &faction.economy;
            assert!(economy.population >= 1);
            assert!(economy.wealth >= config.wealth.wealth_floor);
            assert!(economy.budget >= 0.0 && economy.budget <= economy.wealth);
            for resource in Resource::tradable() {
                let target = target_inventory(economy, resource, &config.resources);
                let stock = economy.stock(resource);
                assert!(stock >= target * config.resources.min_inventory_ratio - 1e-6);
                assert!(stock <= target * config.resources.max_inventory_ratio + 1e-6);
            }
        }
    }
}

#[test]
fn test_factions_grow_over_a_season() {
    let config = EconomyConfig::default();
    let service = EconomyService::new(&config);
    let start = world(5);
    let mut factions = start.clone();

    for tick in 1..=200 {
        let ctx = UpdateContext::new(tick, 1, Difficulty::Normal, 4_000);
        factions = service.update_all(&factions, &ctx, 5);
    }

    for (before, after) in start.iter().zip(&factions) {
        assert!(after.economy.population > before.economy.population, "{} did not grow", after.name);
    }
}

#[test]
fn test_war_never_grows_faster_than_peace() {
    let config = EconomyConfig::default();
    let service = EconomyService::new(&config);
    let peace = Faction::new(FactionId(4), "Calder", EconomyState::new(2_000, 30_000.0, 1));
    let mut war = peace.clone();
    war.economy.is_at_war = true;
    let ctx = UpdateContext::new(10, 1, Difficulty::Normal, 10_000);

    let at_peace = service.update(&peace, &ctx, &mut faction_rng(8, peace.id, 10));
    let at_war = service.update(&war, &ctx, &mut faction_rng(8, war.id, 10));

    assert!(at_war.economy.population <= at_peace.economy.population);
}

#[test]
fn test_invalid_faction_reported_and_returned_unchanged() {
    let config = EconomyConfig::default();
    let recorder = RecordingObserver::new();
    let service = EconomyService::with_observer(&config, &recorder);
    let mut broken = Faction::new(FactionId(9), "Ashen", EconomyState::new(100, 1_000.0, 0));
    broken.economy.wealth = f64::NAN;
    let ctx = UpdateContext::new(10, 0, Difficulty::Normal, 1_000);

    let result = service.update_all(std::slice::from_ref(&broken), &ctx, 1);

    assert_eq!(result[0].economy.population, 100);
    assert!(result[0].economy.wealth.is_nan());
    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        TelemetryEvent::ValidationFailure(FactionId(9), EconomyError::InvalidWealth(_))
    ));
}

#[test]
fn test_growth_reported_to_observer() {
    let config = EconomyConfig::default();
    let recorder = RecordingObserver::new();
    let service = EconomyService::with_observer(&config, &recorder);
    let factions = world(11);
    let ctx = UpdateContext::new(10, 1, Difficulty::Normal, 4_000);

    service.update_all(&factions, &ctx, 11);

    let events = recorder.events();
    let population = events
        .iter()
        .filter(|e| matches!(e, TelemetryEvent::PopulationGrowth(..)))
        .count();
    let wealth = events
        .iter()
        .filter(|e| matches!(e, TelemetryEvent::WealthGrowth(..)))
        .count();
    assert_eq!(population, 3);
    assert_eq!(wealth, 3);
}
