//! Faction registry with an append-only spawn queue
//!
//! Rebels are queued as they are created and only become AI factions when
//! the scheduler drains the queue, so a spawn never races an economy pass.

use serde::{Deserialize, Serialize};

use crate::core::config::RebellionConfig;
use crate::core::types::{FactionId, Tick};
use crate::economy::state::Faction;
use crate::rebellion::faction::{IdSource, RebelFaction, SequentialIds};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionRegistry {
    factions: Vec<Faction>,
    spawn_queue: Vec<RebelFaction>,
    ids: SequentialIds,
}

impl FactionRegistry {
    /// Ids continue after the highest one already in use
    pub fn new(factions: Vec<Faction>) -> Self {
        let next = factions.iter().map(|f| f.id.0).max().map_or(1, |max| max + 1);
        Self {
            factions,
            spawn_queue: Vec::new(),
            ids: SequentialIds::starting_at(next),
        }
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn get(&self, id: FactionId) -> Option<&Faction> {
        self.factions.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    /// Swap in the results of an economy pass
    pub fn replace_factions(&mut self, factions: Vec<Faction>) {
        self.factions = factions;
    }

    pub fn enqueue(&mut self, rebel: RebelFaction) {
        tracing::debug!(id = %rebel.id, name = %rebel.name, "rebel queued");
        self.spawn_queue.push(rebel);
    }

    pub fn pending(&self) -> &[RebelFaction] {
        &self.spawn_queue
    }

    /// Promote every queued rebel to an AI faction, in queue order
    pub fn drain_spawns(&mut self, epoch: u32, tick: Tick, config: &RebellionConfig) -> Vec<FactionId> {
        let drained: Vec<RebelFaction> = self.spawn_queue.drain(..).collect();
        let mut added = Vec::with_capacity(drained.len());
        for rebel in &drained {
            let faction = Faction::from_rebel(rebel, epoch, tick, config);
            added.push(faction.id);
            self.factions.push(faction);
        }
        if !added.is_empty() {
            tracing::debug!(count = added.len(), tick, "rebel factions joined");
        }
        added
    }
}

impl IdSource for FactionRegistry {
    fn next_id(&mut self) -> FactionId {
        self.ids.next_id()
    }
}
