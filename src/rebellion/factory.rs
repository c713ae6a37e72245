//! Rebel faction factory
//!
//! Turns a seceding group, a coalition of groups or a defecting official into
//! a new hostile faction. Whatever the rebels take with them is debited from
//! the [`SourceLedger`] in the same call, so people and goods are never
//! counted twice.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::RebellionConfig;
use crate::core::types::{Resource, SocialGroup};
use crate::economy::resources::MarketPrices;
use crate::rebellion::faction::{IdSource, RebelFaction};
use crate::unrest::SocietySnapshot;

// === SOURCE LEDGER ===

/// Population and wealth per social group, plus the national stockpile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceLedger {
    population: AHashMap<SocialGroup, u64>,
    wealth: AHashMap<SocialGroup, f64>,
    inventory: AHashMap<Resource, f64>,
}

/// What one secession removed from the ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDebit {
    pub population: AHashMap<SocialGroup, u64>,
    pub wealth: AHashMap<SocialGroup, f64>,
    pub resources: AHashMap<Resource, f64>,
}

impl SourceDebit {
    pub fn total_population(&self) -> u64 {
        self.population.values().sum()
    }

    pub fn total_wealth(&self) -> f64 {
        self.wealth.values().sum()
    }

    pub fn resource(&self, resource: Resource) -> f64 {
        self.resources.get(&resource).copied().unwrap_or(0.0)
    }
}

/// Amounts a spawn wants to take, before clamping
#[derive(Debug, Clone, Default)]
struct DebitRequest {
    population: Vec<(SocialGroup, u64)>,
    wealth: Vec<(SocialGroup, f64)>,
    resources: Vec<(Resource, f64)>,
}

impl SourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: SocialGroup, population: u64, wealth: f64) -> Self {
        self.set_group(group, population, wealth);
        self
    }

    pub fn with_stock(mut self, resource: Resource, amount: f64) -> Self {
        self.set_stock(resource, amount);
        self
    }

    pub fn set_group(&mut self, group: SocialGroup, population: u64, wealth: f64) {
        self.population.insert(group, population);
        self.wealth.insert(group, wealth.max(0.0));
    }

    pub fn set_stock(&mut self, resource: Resource, amount: f64) {
        self.inventory.insert(resource, amount.max(0.0));
    }

    pub fn population(&self, group: SocialGroup) -> u64 {
        self.population.get(&group).copied().unwrap_or(0)
    }

    pub fn wealth(&self, group: SocialGroup) -> f64 {
        self.wealth.get(&group).copied().unwrap_or(0.0)
    }

    pub fn stock(&self, resource: Resource) -> f64 {
        self.inventory.get(&resource).copied().unwrap_or(0.0)
    }

    pub fn total_population(&self) -> u64 {
        self.population.values().sum()
    }

    /// Remove everything in `request`, each amount clamped to what is there
    fn debit(&mut self, request: DebitRequest) -> SourceDebit {
        let mut debit = SourceDebit::default();

        for (group, wanted) in request.population {
            let available = self.population.entry(group).or_insert(0);
            let taken = wanted.min(*available);
            *available -= taken;
            *debit.population.entry(group).or_insert(0) += taken;
        }
        for (group, wanted) in request.wealth {
            let available = self.wealth.entry(group).or_insert(0.0);
            let taken = wanted.max(0.0).min(*available);
            *available -= taken;
            *debit.wealth.entry(group).or_insert(0.0) += taken;
        }
        for (resource, wanted) in request.resources {
            let available = self.inventory.entry(resource).or_insert(0.0);
            let taken = wanted.max(0.0).min(*available);
            *available -= taken;
            *debit.resources.entry(resource).or_insert(0.0) += taken;
        }

        debit
    }
}

// === FACTORY ===

/// A defecting official and what they own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficialProfile {
    pub id: u32,
    pub name: String,
    pub wealth: f64,
    pub property_value: f64,
}

/// A freshly created rebel and the debit that paid for it
#[derive(Debug, Clone, PartialEq)]
pub struct RebelSpawn {
    pub faction: RebelFaction,
    pub debit: SourceDebit,
}

pub struct RebelFactionFactory<'a> {
    config: &'a RebellionConfig,
}

impl<'a> RebelFactionFactory<'a> {
    pub fn new(config: &'a RebellionConfig) -> Self {
        Self { config }
    }

    /// One group secedes, taking part of its people, its wealth and some loot
    pub fn spawn_from_group(
        &self,
        group: SocialGroup,
        influence_share: f64,
        ledger: &mut SourceLedger,
        prices: &impl MarketPrices,
        ids: &mut impl IdSource,
    ) -> RebelSpawn {
        let cfg = self.config;
        let share = influence_share.clamp(0.0, 1.0);

        let wanted = cfg.population_override.unwrap_or_else(|| {
            let defectors = (ledger.population(group) as f64 * cfg.defection_ratio).floor() as u64;
            defectors.max(cfg.min_population)
        });
        let population = wanted.min(ledger.population(group));
        let group_wealth = (ledger.wealth(group) * cfg.wealth_share).floor();

        let loot_ratio = (cfg.loot_share_weight * share).min(cfg.max_loot_ratio);
        let loot: Vec<(Resource, f64)> = Resource::ALL
            .into_iter()
            .filter(|r| r.is_lootable())
            .filter_map(|r| {
                let amount = (ledger.stock(r) * loot_ratio).floor();
                (amount > 0.0).then_some((r, amount))
            })
            .collect();
        let loot_value: f64 = loot.iter().map(|(r, amount)| amount * prices.price(*r)).sum();

        let debit = ledger.debit(DebitRequest {
            population: vec![(group, population)],
            wealth: vec![(group, group_wealth)],
            resources: loot,
        });

        let wealth = (debit.total_wealth() + loot_value).max(cfg.base_wealth);
        let mut faction = RebelFaction::new(
            ids.next_id(),
            format!("{} Rebel Government", group.display_name()),
            debit.total_population(),
            wealth,
        );
        faction.military_strength =
            (cfg.military_base + cfg.military_share_weight * share).min(cfg.military_cap);
        faction.aggression = cfg.aggression;
        faction.budget = (wealth * cfg.budget_ratio).floor();
        faction.inventory = debit.resources.clone();
        faction.looted_value = loot_value;
        faction.source_groups = vec![group];

        tracing::debug!(
            id = %faction.id,
            group = %group,
            population = faction.population,
            wealth = faction.wealth,
            "rebel faction spawned"
        );
        RebelSpawn { faction, debit }
    }

    /// Several groups in revolt unite; `None` for fewer than two
    ///
    /// Military strength follows the members' combined influence in
    /// `snapshot`. Groups missing from it count for nothing.
    pub fn spawn_coalition(
        &self,
        groups: &[SocialGroup],
        snapshot: &SocietySnapshot,
        ledger: &mut SourceLedger,
        ids: &mut impl IdSource,
    ) -> Option<RebelSpawn> {
        let mut members: Vec<SocialGroup> = groups.to_vec();
        members.sort();
        members.dedup();
        if members.len() < 2 {
            tracing::warn!(groups = members.len(), "coalition needs at least two groups");
            return None;
        }

        let cfg = &self.config.coalition;
        let share = members
            .iter()
            .map(|g| snapshot.influence_share(*g))
            .sum::<f64>()
            .clamp(0.0, 1.0);
        let request = DebitRequest {
            population: members
                .iter()
                .map(|g| (*g, (ledger.population(*g) as f64 * cfg.population_share).floor() as u64))
                .collect(),
            wealth: members
                .iter()
                .map(|g| (*g, (ledger.wealth(*g) * cfg.wealth_share).floor()))
                .collect(),
            resources: Vec::new(),
        };
        let debit = ledger.debit(request);

        let unity = 1.0 + cfg.unity_bonus;
        let population =
            ((debit.total_population() as f64 * unity).floor() as u64).max(cfg.min_population);
        let wealth = (debit.total_wealth() * unity).floor().max(cfg.min_wealth);

        let mut faction = RebelFaction::new(ids.next_id(), coalition_name(&members), population, wealth);
        faction.military_strength =
            (cfg.military_base + cfg.military_share_weight * share).min(cfg.military_cap);
        faction.aggression = cfg.aggression.min(1.0);
        faction.budget = (wealth * cfg.budget_ratio).floor();
        faction.population_factor = cfg.population_factor;
        faction.is_coalition = true;
        faction.source_groups = members;

        tracing::debug!(
            id = %faction.id,
            members = faction.source_groups.len(),
            population,
            wealth,
            "coalition faction spawned"
        );
        Some(RebelSpawn { faction, debit })
    }

    /// A high official walks out with their fortune and a following
    pub fn spawn_from_official(
        &self,
        official: &OfficialProfile,
        followers: u64,
        ledger: &mut SourceLedger,
        ids: &mut impl IdSource,
    ) -> RebelSpawn {
        let cfg = &self.config.official;
        let wealth = (official.wealth + official.property_value)
            .floor()
            .max(cfg.min_wealth);
        let wanted = followers.max(cfg.min_population);

        // Followers come from the bureaucracy; the fortune is the official's own
        let debit = ledger.debit(DebitRequest {
            population: vec![(SocialGroup::Official, wanted)],
            ..DebitRequest::default()
        });

        let mut faction = RebelFaction::new(
            ids.next_id(),
            format!("{} Coup Government", official.name),
            debit.total_population(),
            wealth,
        );
        faction.military_strength =
            (cfg.military_base + cfg.military_wealth_weight * (wealth + 1.0).log10()).min(cfg.military_cap);
        faction.aggression = cfg.aggression;
        faction.budget = (wealth * cfg.budget_ratio).floor();
        faction.source_groups = vec![SocialGroup::Official];
        faction.source_official_id = Some(official.id);

        tracing::debug!(id = %faction.id, official = official.id, wealth, "coup faction spawned");
        RebelSpawn { faction, debit }
    }
}

fn coalition_name(members: &[SocialGroup]) -> String {
    match members {
        [a, b] => format!("{} and {} Coalition Government", a.display_name(), b.display_name()),
        [a, b, c] => format!(
            "{}, {} and {} Coalition Government",
            a.display_name(),
            b.display_name(),
            c.display_name()
        ),
        _ => "People's Revolutionary Coalition".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FactionId;
    use crate::economy::resources::BasePrices;
    use crate::rebellion::faction::SequentialIds;

    fn peasant_ledger() -> SourceLedger {
        SourceLedger::new().with_group(SocialGroup::Peasant, 1_000, 5_000.0)
    }

    fn society() -> SocietySnapshot {
        SocietySnapshot::new(0.0)
            .with_group(SocialGroup::Peasant, 20.0, 25.0)
            .with_group(SocialGroup::Worker, 20.0, 25.0)
            .with_group(SocialGroup::Merchant, 70.0, 50.0)
    }

    #[test]
    fn test_group_spawn_without_loot() {
        let config = RebellionConfig::default();
        let factory = RebelFactionFactory::new(&config);
        let mut ledger = peasant_ledger();
        let mut ids = SequentialIds::starting_at(10);

        let spawn = factory.spawn_from_group(SocialGroup::Peasant, 0.3, &mut ledger, &BasePrices, &mut ids);
        let rebel = &spawn.faction;

        assert_eq!(rebel.id, FactionId(10));
        assert_eq!(rebel.population, 800);
        assert_eq!(rebel.wealth, 2_500.0);
        assert_eq!(rebel.budget, 750.0);
        assert!((rebel.military_strength - 1.1).abs() < 1e-9);
        assert_eq!(rebel.aggression, 0.7);
        assert!(rebel.is_at_war);
        assert_eq!(rebel.name, "Peasants Rebel Government");

        assert_eq!(ledger.population(SocialGroup::Peasant), 200);
        assert_eq!(ledger.wealth(SocialGroup::Peasant), 2_500.0);
        assert_eq!(spawn.debit.total_population(), 800);
    }

    #[test]
    fn test_loot_skips_unlootable_resources() {
        let config = RebellionConfig::default();
        let factory = RebelFactionFactory::new(&config);
        let mut ledger = peasant_ledger()
            .with_stock(Resource::Iron, 100.0)
            .with_stock(Resource::Silver, 1_000.0)
            .with_stock(Resource::Science, 50.0);
        let mut ids = SequentialIds::default();

        let spawn = factory.spawn_from_group(SocialGroup::Peasant, 0.8, &mut ledger, &BasePrices, &mut ids);

        // ratio capped at 0.3 -> 30 iron worth 6 each
        assert_eq!(spawn.faction.inventory.get(&Resource::Iron), Some(&30.0));
        assert!(!spawn.faction.inventory.contains_key(&Resource::Silver));
        assert_eq!(spawn.faction.looted_value, 180.0);
        assert_eq!(spawn.faction.wealth, 2_680.0);
        assert_eq!(ledger.stock(Resource::Iron), 70.0);
        assert_eq!(ledger.stock(Resource::Silver), 1_000.0);
        assert_eq!(ledger.stock(Resource::Science), 50.0);
    }

    #[test]
    fn test_small_group_is_clamped_to_available() {
        let config = RebellionConfig::default();
        let factory = RebelFactionFactory::new(&config);
        let mut ledger = SourceLedger::new().with_group(SocialGroup::Artisan, 6, 100.0);
        let mut ids = SequentialIds::default();

        let spawn = factory.spawn_from_group(SocialGroup::Artisan, 0.2, &mut ledger, &BasePrices, &mut ids);

        assert_eq!(spawn.faction.population, 6);
        assert_eq!(spawn.faction.wealth, 300.0);
        assert_eq!(ledger.population(SocialGroup::Artisan), 0);
        assert_eq!(ledger.wealth(SocialGroup::Artisan), 50.0);
    }

    #[test]
    fn test_population_override() {
        let config = RebellionConfig {
            population_override: Some(42),
            ..RebellionConfig::default()
        };
        let factory = RebelFactionFactory::new(&config);
        let mut ledger = peasant_ledger();
        let mut ids = SequentialIds::default();

        let spawn = factory.spawn_from_group(SocialGroup::Peasant, 0.3, &mut ledger, &BasePrices, &mut ids);
        assert_eq!(spawn.faction.population, 42);
        assert_eq!(ledger.population(SocialGroup::Peasant), 958);
    }

    #[test]
    fn test_coalition_pools_groups() {
        let config = RebellionConfig::default();
        let factory = RebelFactionFactory::new(&config);
        let mut ledger = SourceLedger::new()
            .with_group(SocialGroup::Peasant, 1_000, 2_000.0)
            .with_group(SocialGroup::Worker, 500, 1_000.0);
        let mut ids = SequentialIds::default();

        let spawn = factory
            .spawn_coalition(&[SocialGroup::Worker, SocialGroup::Peasant], &society(), &mut ledger, &mut ids)
            .unwrap();
        let rebel = &spawn.faction;

        // (700 + 350) * 1.1 and (1000 + 500) * 1.1
        assert_eq!(rebel.population, 1_155);
        assert_eq!(rebel.wealth, 1_650.0);
        assert_eq!(rebel.budget, 660.0);
        assert!((rebel.military_strength - 1.85).abs() < 1e-9);
        assert_eq!(rebel.aggression, 0.8);
        assert!(rebel.is_coalition);
        assert_eq!(rebel.population_factor, 1.2);
        assert_eq!(rebel.name, "Peasants and Workers Coalition Government");
        assert_eq!(ledger.population(SocialGroup::Peasant), 300);
        assert_eq!(ledger.population(SocialGroup::Worker), 150);
    }

    #[test]
    fn test_coalition_names_and_minimum_size() {
        let config = RebellionConfig::default();
        let factory = RebelFactionFactory::new(&config);
        let mut ids = SequentialIds::default();
        let mut ledger = SourceLedger::new();

        assert!(factory
            .spawn_coalition(&[SocialGroup::Peasant], &society(), &mut ledger, &mut ids)
            .is_none());

        let three = [SocialGroup::Peasant, SocialGroup::Worker, SocialGroup::Merchant];
        let spawn = factory.spawn_coalition(&three, &society(), &mut ledger, &mut ids).unwrap();
        assert_eq!(spawn.faction.name, "Peasants, Workers and Merchants Coalition Government");
        assert_eq!(spawn.faction.population, 20);
        assert_eq!(spawn.faction.wealth, 600.0);

        let four = [
            SocialGroup::Peasant,
            SocialGroup::Worker,
            SocialGroup::Merchant,
            SocialGroup::Artisan,
        ];
        let spawn = factory.spawn_coalition(&four, &society(), &mut ledger, &mut ids).unwrap();
        assert_eq!(spawn.faction.name, "People's Revolutionary Coalition");
    }

    #[test]
    fn test_coalition_share_comes_from_snapshot() {
        let config = RebellionConfig::default();
        let factory = RebelFactionFactory::new(&config);
        let mut ids = SequentialIds::default();
        let mut ledger = SourceLedger::new();

        // Neither member holds any influence
        let outsiders = [SocialGroup::Miner, SocialGroup::Serf];
        let spawn = factory.spawn_coalition(&outsiders, &society(), &mut ledger, &mut ids).unwrap();
        assert!((spawn.faction.military_strength - 0.6).abs() < 1e-9);

        // Repeating a member does not count its share twice
        let doubled = [SocialGroup::Peasant, SocialGroup::Peasant, SocialGroup::Worker];
        let spawn = factory.spawn_coalition(&doubled, &society(), &mut ledger, &mut ids).unwrap();
        assert!((spawn.faction.military_strength - 1.85).abs() < 1e-9);

        // Everyone together is capped at the whole realm
        let everyone = [SocialGroup::Peasant, SocialGroup::Worker, SocialGroup::Merchant];
        let spawn = factory.spawn_coalition(&everyone, &society(), &mut ledger, &mut ids).unwrap();
        assert_eq!(spawn.faction.military_strength, 2.0);
    }

    #[test]
    fn test_official_defection() {
        let config = RebellionConfig::default();
        let factory = RebelFactionFactory::new(&config);
        let mut ledger = SourceLedger::new().with_group(SocialGroup::Official, 40, 800.0);
        let mut ids = SequentialIds::default();
        let official = OfficialProfile {
            id: 7,
            name: "Chancellor Vey".into(),
            wealth: 9_000.0,
            property_value: 999.5,
        };

        let spawn = factory.spawn_from_official(&official, 25, &mut ledger, &mut ids);
        let rebel = &spawn.faction;

        assert_eq!(rebel.wealth, 9_999.0);
        assert_eq!(rebel.population, 25);
        assert!((rebel.military_strength - 1.2).abs() < 1e-9);
        assert_eq!(rebel.source_official_id, Some(7));
        assert_eq!(rebel.name, "Chancellor Vey Coup Government");
        assert_eq!(ledger.population(SocialGroup::Official), 15);
        assert_eq!(ledger.wealth(SocialGroup::Official), 800.0);
    }
}
