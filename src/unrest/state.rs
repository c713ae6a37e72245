//! Per-group unrest state and the society snapshot it is driven by

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::UnrestConfig;
use crate::core::types::{Day, SocialGroup};

/// Escalation stages, in order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnrestStage {
    #[default]
    Calm,
    Grumbling,
    Brewing,
    Plotting,
    Uprising,
}

impl UnrestStage {
    pub fn next(self) -> Option<UnrestStage> {
        match self {
            UnrestStage::Calm => Some(UnrestStage::Grumbling),
            UnrestStage::Grumbling => Some(UnrestStage::Brewing),
            UnrestStage::Brewing => Some(UnrestStage::Plotting),
            UnrestStage::Plotting => Some(UnrestStage::Uprising),
            UnrestStage::Uprising => None,
        }
    }

    /// Organization needed to enter this stage; Calm and Grumbling have none
    pub fn threshold(self, config: &UnrestConfig) -> Option<f64> {
        match self {
            UnrestStage::Calm | UnrestStage::Grumbling => None,
            UnrestStage::Brewing => Some(config.brewing_threshold),
            UnrestStage::Plotting => Some(config.plotting_threshold),
            UnrestStage::Uprising => Some(config.uprising_threshold),
        }
    }

    /// Stage implied by an organization level
    pub fn for_organization(organization: f64, dissatisfaction_days: u32, config: &UnrestConfig) -> Self {
        if organization >= config.uprising_threshold {
            UnrestStage::Uprising
        } else if organization >= config.plotting_threshold {
            UnrestStage::Plotting
        } else if organization >= config.brewing_threshold {
            UnrestStage::Brewing
        } else if dissatisfaction_days > 0 {
            UnrestStage::Grumbling
        } else {
            UnrestStage::Calm
        }
    }
}

/// Unrest bookkeeping for one social group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnrestState {
    pub dissatisfaction_days: u32,
    pub(crate) organization: f64, // [0, 100]
    pub stage: UnrestStage,
    pub influence_share: f64,
    /// Days organization stays frozen after an intervention
    pub paused_days: u32,
    /// Last daily organization delta
    pub growth_rate: f64,
    pub last_stage_change: Day,
}

impl UnrestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn organization(&self) -> f64 {
        self.organization
    }

    pub fn set_organization(&mut self, value: f64) {
        self.organization = if value.is_finite() {
            value.clamp(0.0, 100.0)
        } else {
            0.0
        };
    }

    /// Whether the group may escalate: unhappy, influential and patient enough
    pub fn is_eligible(&self, approval: f64, config: &UnrestConfig) -> bool {
        approval < config.approval_threshold
            && self.influence_share >= config.min_influence_share
            && self.dissatisfaction_days >= config.min_dissatisfaction_days
    }
}

/// Daily organization delta before clamping
///
/// Grievance grows organization below `grievance_approval`, scaled by the
/// group's temperament and influence and damped by national stability;
/// contentment erodes it.
pub fn organization_growth_rate(
    group: SocialGroup,
    approval: f64,
    influence_share: f64,
    stability: f64,
    config: &UnrestConfig,
) -> f64 {
    if approval < config.grievance_approval {
        let grievance = (config.grievance_approval - approval) / config.grievance_approval;
        let stability = stability.clamp(0.0, 100.0);
        grievance
            * config.base_organization_growth
            * group.organization_multiplier()
            * (1.0 + config.influence_weight * influence_share)
            * (1.0 - config.stability_dampening * stability / 100.0)
    } else if approval > config.loyal_approval {
        -config.loyal_decay
    } else if approval > config.content_approval {
        -config.content_decay
    } else {
        0.0
    }
}

/// Approval and influence of every group on one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocietySnapshot {
    pub approval: AHashMap<SocialGroup, f64>,
    pub influence: AHashMap<SocialGroup, f64>,
    pub total_influence: f64,
    pub stability: f64,
}

impl SocietySnapshot {
    pub fn new(stability: f64) -> Self {
        Self {
            stability,
            ..Self::default()
        }
    }

    /// Add a group; the total influence is kept in step
    pub fn with_group(mut self, group: SocialGroup, approval: f64, influence: f64) -> Self {
        self.approval.insert(group, approval);
        if let Some(previous) = self.influence.insert(group, influence) {
            self.total_influence -= previous;
        }
        self.total_influence += influence;
        self
    }

    /// Approval defaults to a neutral 50 for unlisted groups
    pub fn approval(&self, group: SocialGroup) -> f64 {
        self.approval.get(&group).copied().unwrap_or(50.0)
    }

    pub fn influence_share(&self, group: SocialGroup) -> f64 {
        if self.total_influence <= 0.0 {
            return 0.0;
        }
        let influence = self.influence.get(&group).copied().unwrap_or(0.0);
        (influence / self.total_influence).clamp(0.0, 1.0)
    }

    /// Groups present in the snapshot, in stable order
    pub fn groups(&self) -> impl Iterator<Item = SocialGroup> + '_ {
        SocialGroup::ALL
            .into_iter()
            .filter(|g| self.approval.contains_key(g) || self.influence.contains_key(g))
    }
}
