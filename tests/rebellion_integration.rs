//! Integration tests for secession: factory, ledger conservation, registry hand-off

use ahash::AHashMap;
use faction_economy::core::config::RebellionConfig;
use faction_economy::economy::BasePrices;
use faction_economy::rebellion::{IdSource, SequentialIds};
use faction_economy::simulation::{UprisingOutcome, UprisingResolution};
use faction_economy::unrest::SocietySnapshot;
use faction_economy::{
    Difficulty, EconomyConfig, EconomyState, Faction, FactionId, FactionRegistry, FactionSimulation,
    RebelFactionFactory, Resource, SocialGroup, SourceLedger, UnrestStage, UpdateContext,
};

#[test]
fn test_peasant_secession_takes_eighty_percent() {
    let config = RebellionConfig::default();
    let factory = RebelFactionFactory::new(&config);
    let mut ledger = SourceLedger::new().with_group(SocialGroup::Peasant, 1_000, 5_000.0);
    let mut ids = SequentialIds::default();

    let spawn = factory.spawn_from_group(SocialGroup::Peasant, 0.3, &mut ledger, &BasePrices, &mut ids);

    assert_eq!(spawn.faction.population, 800);
    assert_eq!(spawn.faction.wealth, 2_500.0);
    assert!(spawn.faction.is_at_war);
    assert_eq!(spawn.faction.war_score, 0.0);
    assert_eq!(spawn.faction.war_duration, 0);
}

#[test]
fn test_loot_is_valued_at_market_prices() {
    let config = RebellionConfig::default();
    let factory = RebelFactionFactory::new(&config);
    let mut ledger = SourceLedger::new()
        .with_group(SocialGroup::Miner, 400, 1_000.0)
        .with_stock(Resource::Tools, 200.0)
        .with_stock(Resource::Stone, 100.0);
    let mut prices: AHashMap<Resource, f64> = AHashMap::new();
    prices.insert(Resource::Tools, 20.0);
    let mut ids = SequentialIds::default();

    // share 0.4 -> ratio min(0.3, 0.2) = 0.2
    let spawn = factory.spawn_from_group(SocialGroup::Miner, 0.4, &mut ledger, &prices, &mut ids);

    assert_eq!(spawn.debit.resource(Resource::Tools), 40.0);
    assert_eq!(spawn.debit.resource(Resource::Stone), 20.0);
    // Stone has no listed price and counts at 1
    assert_eq!(spawn.faction.looted_value, 820.0);
    assert_eq!(spawn.faction.wealth, 1_320.0);
}

#[test]
fn test_ledger_conserves_people_and_goods() {
    let config = RebellionConfig::default();
    let factory = RebelFactionFactory::new(&config);
    let mut ledger = SourceLedger::new()
        .with_group(SocialGroup::Peasant, 700, 1_400.0)
        .with_group(SocialGroup::Worker, 300, 900.0)
        .with_group(SocialGroup::Merchant, 90, 4_000.0)
        .with_stock(Resource::Food, 500.0);
    let mut ids = SequentialIds::default();
    let snapshot = SocietySnapshot::new(0.0)
        .with_group(SocialGroup::Peasant, 10.0, 30.0)
        .with_group(SocialGroup::Worker, 10.0, 30.0)
        .with_group(SocialGroup::Merchant, 70.0, 40.0);
    let before = ledger.clone();

    let coalition = factory
        .spawn_coalition(&[SocialGroup::Peasant, SocialGroup::Worker], &snapshot, &mut ledger, &mut ids)
        .unwrap();
    let single = factory.spawn_from_group(SocialGroup::Merchant, 0.2, &mut ledger, &BasePrices, &mut ids);

    for debit in [&coalition.debit, &single.debit] {
        for (group, taken) in &debit.population {
            assert!(*taken <= before.population(*group));
        }
    }
    let taken_people = coalition.debit.total_population() + single.debit.total_population();
    assert_eq!(ledger.total_population() + taken_people, before.total_population());
    assert_eq!(ledger.stock(Resource::Food) + single.debit.resource(Resource::Food), 500.0);
    assert_eq!(ledger.wealth(SocialGroup::Merchant), 2_000.0);
    assert_ne!(coalition.faction.id, single.faction.id);
}

#[test]
fn test_drained_rebel_economy_stays_near_spawn_values() {
    let config = EconomyConfig::default();
    let factory = RebelFactionFactory::new(&config.rebellion);
    let mut registry = FactionRegistry::new(vec![Faction::new(
        FactionId(1),
        "Arvel",
        EconomyState::new(400, 8_000.0, 1),
    )]);
    let mut ledger = SourceLedger::new().with_group(SocialGroup::Serf, 500, 3_000.0);

    let spawn = factory.spawn_from_group(SocialGroup::Serf, 0.25, &mut ledger, &BasePrices, &mut registry);
    assert_eq!(spawn.faction.id, FactionId(2));
    registry.enqueue(spawn.faction.clone());
    registry.drain_spawns(1, 100, &config.rebellion);

    let rebel = registry.get(FactionId(2)).unwrap();
    let economy = &rebel.economy;
    assert_eq!(economy.population, spawn.faction.population);
    assert!(economy.wealth <= spawn.faction.wealth * 1.15);
    assert!(economy.budget <= economy.wealth);
    assert!(economy.is_at_war);
    assert_eq!(economy.last_growth_tick, 100);
    assert_eq!(registry.next_id(), FactionId(3));
}

#[test]
fn test_simulation_secession_joins_economy() {
    let ledger = SourceLedger::new()
        .with_group(SocialGroup::Peasant, 1_200, 3_000.0)
        .with_group(SocialGroup::Merchant, 200, 6_000.0);
    let factions = vec![Faction::new(FactionId(1), "Arvel", EconomyState::new(300, 5_000.0, 0))];
    let mut sim = FactionSimulation::new(EconomyConfig::default(), factions, 21).with_ledger(ledger);
    let snapshot = SocietySnapshot::new(10.0)
        .with_group(SocialGroup::Peasant, 8.0, 60.0)
        .with_group(SocialGroup::Merchant, 75.0, 40.0);

    let mut seceded = None;
    for day in 1..=240u64 {
        for note in sim.advance_day(&snapshot) {
            if note.new_stage == UnrestStage::Uprising {
                seceded = sim.resolve_uprising(note.group, UprisingResolution::AcceptWar, &snapshot);
            }
        }
        sim.tick_economy(&UpdateContext::new(day * 10, 0, Difficulty::Normal, 1_400));
    }

    let Some(UprisingOutcome::Seceded(spawn)) = seceded else {
        panic!("peasants never seceded");
    };
    assert_eq!(spawn.faction.population, 960);
    assert_eq!(sim.ledger().population(SocialGroup::Peasant), 240);
    assert_eq!(sim.registry().len(), 2);
    assert!(sim.registry().pending().is_empty());
    let rebel = sim.registry().get(spawn.faction.id).unwrap();
    assert!(rebel.economy.population >= 960);
    // Reset at secession; the remaining peasants start over
    assert_eq!(sim.unrest().stage_of(SocialGroup::Peasant), UnrestStage::Grumbling);
    assert_eq!(sim.unrest().state(SocialGroup::Peasant).unwrap().dissatisfaction_days, 60);
}
