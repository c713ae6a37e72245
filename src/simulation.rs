//! Simulation driver - runs the economy cadence and the player's unrest day
//!
//! Owns everything one game needs: config, AI factions, the player's unrest
//! tracker and the ledger rebels are paid from. The outer game calls
//! `advance_day` once per day and `tick_economy` on its own tick clock.

use std::sync::Arc;

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::EconomyConfig;
use crate::core::telemetry::{EconomyObserver, TracingObserver};
use crate::core::types::{FactionId, Resource, SocialGroup};
use crate::economy::service::{EconomyService, UpdateContext};
use crate::economy::state::Faction;
use crate::rebellion::{FactionRegistry, OfficialProfile, RebelFactionFactory, RebelSpawn, SourceLedger};
use crate::unrest::{ActionOutcome, SocietySnapshot, UnrestAction, UnrestNotification, UnrestStage, UnrestTracker};

/// How the player answers a group in open revolt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UprisingResolution {
    /// Let the group go; it secedes and declares war
    AcceptWar,
    /// Send the army in
    Suppress { army_size: u32, military_strength: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UprisingOutcome {
    Seceded(RebelSpawn),
    Suppressed(ActionOutcome),
}

pub struct FactionSimulation {
    config: EconomyConfig,
    registry: FactionRegistry,
    unrest: UnrestTracker,
    ledger: SourceLedger,
    prices: AHashMap<Resource, f64>,
    observer: Arc<dyn EconomyObserver>,
    rng: ChaCha8Rng,
    seed: u64,
}

impl FactionSimulation {
    pub fn new(config: EconomyConfig, factions: Vec<Faction>, seed: u64) -> Self {
        let prices = Resource::ALL.into_iter().map(|r| (r, r.base_price())).collect();
        Self {
            config,
            registry: FactionRegistry::new(factions),
            unrest: UnrestTracker::new(),
            ledger: SourceLedger::new(),
            prices,
            observer: Arc::new(TracingObserver),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn EconomyObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_ledger(mut self, ledger: SourceLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn registry(&self) -> &FactionRegistry {
        &self.registry
    }

    pub fn unrest(&self) -> &UnrestTracker {
        &self.unrest
    }

    pub fn ledger(&self) -> &SourceLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut SourceLedger {
        &mut self.ledger
    }

    pub fn set_price(&mut self, resource: Resource, price: f64) {
        self.prices.insert(resource, price);
    }

    /// Queued rebels join first, then every faction runs its economy step
    pub fn tick_economy(&mut self, ctx: &UpdateContext) -> Vec<FactionId> {
        let joined = self
            .registry
            .drain_spawns(ctx.epoch, ctx.tick, &self.config.rebellion);

        let service = EconomyService::with_observer(&self.config, self.observer.as_ref());
        let updated = service.update_all(self.registry.factions(), ctx, self.seed);
        self.registry.replace_factions(updated);
        joined
    }

    /// One day of the player's society
    pub fn advance_day(&mut self, snapshot: &SocietySnapshot) -> Vec<UnrestNotification> {
        let notifications = self.unrest.update_daily(snapshot, &self.config.unrest);
        for notification in &notifications {
            if notification.new_stage == UnrestStage::Uprising {
                tracing::warn!(
                    group = %notification.group,
                    day = notification.day,
                    share = notification.influence_share,
                    "uprising"
                );
            }
            self.observer.on_unrest(notification);
        }
        notifications
    }

    /// Intervene against a group short of revolt; `None` if the action is not on offer
    pub fn intervene(
        &mut self,
        group: SocialGroup,
        action: UnrestAction,
        army_size: u32,
        military_strength: f64,
    ) -> Option<ActionOutcome> {
        let has_military = self.unrest.has_available_military(army_size);
        let offered = UnrestAction::options_for(self.unrest.stage_of(group), has_military);
        if !offered.contains(&action) {
            tracing::debug!(group = %group, ?action, "action not available");
            return None;
        }
        Some(
            self.unrest
                .apply_action(group, action, army_size, military_strength, &self.config.unrest, &mut self.rng),
        )
    }

    /// Settle a group in Uprising
    ///
    /// Accepting war spawns a rebel; when several groups are in revolt they
    /// leave together as a coalition. Returns `None` if the group is not in
    /// Uprising or no loyal army is available to suppress with.
    pub fn resolve_uprising(
        &mut self,
        group: SocialGroup,
        resolution: UprisingResolution,
        snapshot: &SocietySnapshot,
    ) -> Option<UprisingOutcome> {
        if self.unrest.stage_of(group) != UnrestStage::Uprising {
            tracing::warn!(group = %group, "resolve_uprising on a group not in revolt");
            return None;
        }

        match resolution {
            UprisingResolution::AcceptWar => {
                let factory = RebelFactionFactory::new(&self.config.rebellion);
                let candidates = self.unrest.coalition_candidates();

                let (spawn, seceded) = if candidates.len() >= 2 {
                    let spawn =
                        factory.spawn_coalition(&candidates, snapshot, &mut self.ledger, &mut self.registry)?;
                    (spawn, candidates)
                } else {
                    let spawn = factory.spawn_from_group(
                        group,
                        snapshot.influence_share(group),
                        &mut self.ledger,
                        &self.prices,
                        &mut self.registry,
                    );
                    (spawn, vec![group])
                };

                for member in seceded {
                    self.unrest.reset_group(member);
                }
                self.registry.enqueue(spawn.faction.clone());
                Some(UprisingOutcome::Seceded(spawn))
            }
            UprisingResolution::Suppress { army_size, military_strength } => {
                if !self.unrest.has_available_military(army_size) {
                    tracing::warn!(group = %group, "no loyal army to suppress with");
                    return None;
                }
                let outcome = self.unrest.apply_action(
                    group,
                    UnrestAction::Suppress,
                    army_size,
                    military_strength,
                    &self.config.unrest,
                    &mut self.rng,
                );
                Some(UprisingOutcome::Suppressed(outcome))
            }
        }
    }

    /// A disloyal official breaks away with a following
    pub fn defect_official(&mut self, official: &OfficialProfile, followers: u64) -> RebelSpawn {
        let factory = RebelFactionFactory::new(&self.config.rebellion);
        let spawn = factory.spawn_from_official(official, followers, &mut self.ledger, &mut self.registry);
        self.registry.enqueue(spawn.faction.clone());
        spawn
    }
}
