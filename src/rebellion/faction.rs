//! Rebel faction record and id allocation

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Day, FactionId, Resource, SocialGroup};

/// Hands out faction ids; never repeats one
pub trait IdSource {
    fn next_id(&mut self) -> FactionId;
}

/// Monotonic counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequentialIds {
    next: u32,
}

impl SequentialIds {
    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> FactionId {
        let id = FactionId(self.next);
        self.next += 1;
        id
    }
}

/// A hostile faction born from a secession
///
/// Created once by the factory, then handed to the registry untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RebelFaction {
    pub id: FactionId,
    pub name: String,
    pub population: u64,
    pub wealth: f64,
    pub military_strength: f64,
    pub aggression: f64,
    pub relation: f64,
    pub is_at_war: bool,
    pub war_score: f64,
    pub war_duration: u32,
    pub war_start_day: Option<Day>, // set by the war layer
    pub inventory: AHashMap<Resource, f64>,
    pub looted_value: f64,
    pub budget: f64,
    pub population_factor: f64,

    // Provenance
    pub source_groups: Vec<SocialGroup>,
    pub is_coalition: bool,
    pub source_official_id: Option<u32>,
}

impl RebelFaction {
    /// Fresh rebel at war with its former rulers
    pub fn new(id: FactionId, name: String, population: u64, wealth: f64) -> Self {
        Self {
            id,
            name,
            population,
            wealth,
            military_strength: 1.0,
            aggression: 0.7,
            relation: 0.0,
            is_at_war: true,
            war_score: 0.0,
            war_duration: 0,
            war_start_day: None,
            inventory: AHashMap::new(),
            looted_value: 0.0,
            budget: 0.0,
            population_factor: 1.0,
            source_groups: Vec::new(),
            is_coalition: false,
            source_official_id: None,
        }
    }
}
