//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Game day counter used by the unrest pipeline
pub type Day = u32;

/// Unique identifier for factions (AI nations and spawned rebels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl FactionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faction#{}", self.0)
    }
}

/// Difficulty tier chosen by the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    VeryEasy,
    Easy,
    #[default]
    Normal,
    Hard,
    VeryHard,
    #[serde(alias = "impossible")]
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 6] = [
        Difficulty::VeryEasy,
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::VeryHard,
        Difficulty::Extreme,
    ];

    /// Position in the six-tier tables of the config
    pub fn index(self) -> usize {
        match self {
            Difficulty::VeryEasy => 0,
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
            Difficulty::VeryHard => 4,
            Difficulty::Extreme => 5,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "veryEasy" | "very_easy" => Some(Difficulty::VeryEasy),
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "veryHard" | "very_hard" => Some(Difficulty::VeryHard),
            "extreme" | "impossible" => Some(Difficulty::Extreme),
            _ => None,
        }
    }
}

/// Resources a faction can hold in its inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Food,
    Wood,
    Stone,
    Plank,
    Brick,
    Iron,
    Tools,
    Silver,
    Science,
    Culture,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Food,
        Resource::Wood,
        Resource::Stone,
        Resource::Plank,
        Resource::Brick,
        Resource::Iron,
        Resource::Tools,
        Resource::Silver,
        Resource::Science,
        Resource::Culture,
    ];

    /// Stable key, also the input of the cycle hash
    pub fn key(self) -> &'static str {
        match self {
            Resource::Food => "food",
            Resource::Wood => "wood",
            Resource::Stone => "stone",
            Resource::Plank => "plank",
            Resource::Brick => "brick",
            Resource::Iron => "iron",
            Resource::Tools => "tools",
            Resource::Silver => "silver",
            Resource::Science => "science",
            Resource::Culture => "culture",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.key() == key)
    }

    /// Silver is the currency and never sits in a foreign inventory
    pub fn is_tradable(self) -> bool {
        !matches!(self, Resource::Silver)
    }

    /// Abstract goods (currency, research, culture) can't be carried off by rebels
    pub fn is_lootable(self) -> bool {
        !matches!(self, Resource::Silver | Resource::Science | Resource::Culture)
    }

    pub fn tradable() -> impl Iterator<Item = Resource> {
        Self::ALL.into_iter().filter(|r| r.is_tradable())
    }

    pub fn base_price(self) -> f64 {
        match self {
            Resource::Food => 1.0,
            Resource::Wood => 2.0,
            Resource::Stone => 3.0,
            Resource::Plank => 4.0,
            Resource::Brick => 5.0,
            Resource::Iron => 6.0,
            Resource::Tools => 8.0,
            Resource::Silver => 1.0,
            Resource::Science => 10.0,
            Resource::Culture => 6.0,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Social groups (strata) whose approval drives unrest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialGroup {
    Slave,
    Unemployed,
    Peasant,
    Serf,
    Lumberjack,
    Miner,
    Worker,
    Artisan,
    Soldier,
    Cleric,
    Scribe,
    Merchant,
    Navigator,
    Engineer,
    Official,
    Knight,
    Landowner,
    Capitalist,
}

impl SocialGroup {
    pub const ALL: [SocialGroup; 18] = [
        SocialGroup::Slave,
        SocialGroup::Unemployed,
        SocialGroup::Peasant,
        SocialGroup::Serf,
        SocialGroup::Lumberjack,
        SocialGroup::Miner,
        SocialGroup::Worker,
        SocialGroup::Artisan,
        SocialGroup::Soldier,
        SocialGroup::Cleric,
        SocialGroup::Scribe,
        SocialGroup::Merchant,
        SocialGroup::Navigator,
        SocialGroup::Engineer,
        SocialGroup::Official,
        SocialGroup::Knight,
        SocialGroup::Landowner,
        SocialGroup::Capitalist,
    ];

    /// Idle and enslaved groups never organize
    pub fn is_exempt(self) -> bool {
        matches!(self, SocialGroup::Unemployed | SocialGroup::Slave)
    }

    /// Groups whose rebellion takes the army with them
    pub fn is_military(self) -> bool {
        matches!(self, SocialGroup::Soldier | SocialGroup::Knight)
    }

    /// How readily the group turns grievance into organization
    pub fn organization_multiplier(self) -> f64 {
        match self {
            SocialGroup::Landowner => 1.5,
            SocialGroup::Capitalist => 2.0,
            SocialGroup::Knight => 1.3,
            SocialGroup::Official => 1.2,
            SocialGroup::Merchant => 1.1,
            SocialGroup::Engineer => 1.0,
            SocialGroup::Navigator => 1.0,
            SocialGroup::Cleric => 0.9,
            SocialGroup::Scribe => 0.9,
            SocialGroup::Artisan => 0.8,
            SocialGroup::Worker => 1.0,
            SocialGroup::Miner => 0.9,
            SocialGroup::Lumberjack => 0.8,
            SocialGroup::Soldier => 1.2,
            SocialGroup::Peasant => 0.8,
            SocialGroup::Serf => 0.6,
            SocialGroup::Slave => 0.3,
            SocialGroup::Unemployed => 0.2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SocialGroup::Slave => "Slaves",
            SocialGroup::Unemployed => "Unemployed",
            SocialGroup::Peasant => "Peasants",
            SocialGroup::Serf => "Serfs",
            SocialGroup::Lumberjack => "Lumberjacks",
            SocialGroup::Miner => "Miners",
            SocialGroup::Worker => "Workers",
            SocialGroup::Artisan => "Artisans",
            SocialGroup::Soldier => "Soldiers",
            SocialGroup::Cleric => "Clergy",
            SocialGroup::Scribe => "Scribes",
            SocialGroup::Merchant => "Merchants",
            SocialGroup::Navigator => "Navigators",
            SocialGroup::Engineer => "Engineers",
            SocialGroup::Official => "Officials",
            SocialGroup::Knight => "Knights",
            SocialGroup::Landowner => "Landowners",
            SocialGroup::Capitalist => "Capitalists",
        }
    }
}

impl fmt::Display for SocialGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
