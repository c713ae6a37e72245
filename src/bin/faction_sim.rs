//! Faction Sim - scripted economy and unrest run
//!
//! Three AI factions grow alongside a player realm whose peasants and
//! workers slowly turn against it. Uprisings are let go and join the world
//! as rebel factions. Prints a JSON summary at the end.

use std::path::PathBuf;

use clap::Parser;
use faction_economy::core::types::SocialGroup;
use faction_economy::rebellion::SourceLedger;
use faction_economy::simulation::{UprisingOutcome, UprisingResolution};
use faction_economy::unrest::SocietySnapshot;
use faction_economy::{
    Difficulty, EconomyConfig, EconomyState, Faction, FactionId, FactionSimulation, Resource, UnrestStage,
    UpdateContext,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Faction Sim - run the faction economy for a number of days
#[derive(Parser, Debug)]
#[command(name = "faction_sim")]
#[command(about = "Run AI faction economies against a restless player realm")]
struct Args {
    /// Days to simulate
    #[arg(long, default_value_t = 365)]
    days: u32,

    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// veryEasy, easy, normal, hard, veryHard or extreme
    #[arg(long, default_value = "normal")]
    difficulty: String,

    /// TOML file overriding the default tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Economy ticks per simulated day
    #[arg(long, default_value_t = 10)]
    ticks_per_day: u64,
}

#[derive(Serialize)]
struct FactionSummary {
    id: FactionId,
    name: String,
    population: u64,
    wealth: f64,
    budget: f64,
    at_war: bool,
}

#[derive(Serialize)]
struct Summary {
    days: u32,
    seed: u64,
    difficulty: Difficulty,
    notifications: usize,
    rebels_spawned: usize,
    factions: Vec<FactionSummary>,
}

fn starting_factions(seed: u64) -> Vec<Faction> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    [("Arvel", 800.0, 0.2), ("Dun Mor", 1_200.0, 0.5), ("Kesh", 600.0, 0.8)]
        .into_iter()
        .enumerate()
        .map(|(i, (name, template, aggression))| {
            let economy = EconomyState::seed_baseline(template, aggression, 0, 0, &mut rng)
                .with_stock(Resource::Food, 400.0)
                .with_stock(Resource::Wood, 300.0);
            Faction::new(FactionId(i as u32 + 1), name, economy).with_aggression(aggression)
        })
        .collect()
}

fn player_realm() -> (SourceLedger, SocietySnapshot) {
    let ledger = SourceLedger::new()
        .with_group(SocialGroup::Peasant, 2_400, 6_000.0)
        .with_group(SocialGroup::Worker, 900, 4_500.0)
        .with_group(SocialGroup::Merchant, 300, 9_000.0)
        .with_group(SocialGroup::Official, 60, 3_000.0)
        .with_stock(Resource::Food, 1_200.0)
        .with_stock(Resource::Iron, 150.0)
        .with_stock(Resource::Silver, 500.0);
    let snapshot = SocietySnapshot::new(25.0)
        .with_group(SocialGroup::Peasant, 22.0, 35.0)
        .with_group(SocialGroup::Worker, 30.0, 20.0)
        .with_group(SocialGroup::Merchant, 65.0, 35.0)
        .with_group(SocialGroup::Official, 70.0, 10.0);
    (ledger, snapshot)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let difficulty = Difficulty::parse(&args.difficulty)
        .ok_or_else(|| format!("unknown difficulty '{}'", args.difficulty))?;
    let config = match &args.config {
        Some(path) => EconomyConfig::from_file(path)?,
        None => EconomyConfig::default(),
    };

    tracing::info!(days = args.days, seed = args.seed, ?difficulty, "faction sim starting");

    let (ledger, snapshot) = player_realm();
    let mut sim = FactionSimulation::new(config, starting_factions(args.seed), args.seed).with_ledger(ledger);
    let mut notifications = 0;
    let mut rebels_spawned = 0;

    for day in 1..=args.days {
        let raised = sim.advance_day(&snapshot);
        notifications += raised.len();

        for note in raised.iter().filter(|n| n.new_stage == UnrestStage::Uprising) {
            if sim.unrest().stage_of(note.group) != UnrestStage::Uprising {
                continue; // left with an earlier coalition
            }
            if let Some(UprisingOutcome::Seceded(spawn)) =
                sim.resolve_uprising(note.group, UprisingResolution::AcceptWar, &snapshot)
            {
                tracing::info!(day, name = %spawn.faction.name, "rebels declare war");
                rebels_spawned += 1;
            }
        }

        let player_population = sim.ledger().total_population();
        for step in 0..args.ticks_per_day {
            let tick = u64::from(day - 1) * args.ticks_per_day + step + 1;
            let ctx = UpdateContext::new(tick, 0, difficulty, player_population);
            sim.tick_economy(&ctx);
        }
    }

    let factions = sim
        .registry()
        .factions()
        .iter()
        .map(|f| FactionSummary {
            id: f.id,
            name: f.name.clone(),
            population: f.economy.population,
            wealth: f.economy.wealth,
            budget: f.economy.budget,
            at_war: f.economy.is_at_war,
        })
        .collect();

    let summary = Summary {
        days: args.days,
        seed: args.seed,
        difficulty,
        notifications,
        rebels_spawned,
        factions,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
