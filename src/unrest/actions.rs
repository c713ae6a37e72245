//! Interventions against an organizing group
//!
//! Every action is a single Bernoulli trial. Outcomes are plain values; a
//! failed action is a result, not an error.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::{ActionTuning, UnrestConfig};
use crate::unrest::state::{UnrestStage, UnrestState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnrestAction {
    Investigate,
    Arrest,
    Suppress,
    Appease,
    Negotiate,
    Bribe,
}

impl UnrestAction {
    pub const ALL: [UnrestAction; 6] = [
        UnrestAction::Investigate,
        UnrestAction::Arrest,
        UnrestAction::Suppress,
        UnrestAction::Appease,
        UnrestAction::Negotiate,
        UnrestAction::Bribe,
    ];

    pub fn tuning(self, config: &UnrestConfig) -> &ActionTuning {
        let table = &config.actions;
        match self {
            UnrestAction::Investigate => &table.investigate,
            UnrestAction::Arrest => &table.arrest,
            UnrestAction::Suppress => &table.suppress,
            UnrestAction::Appease => &table.appease,
            UnrestAction::Negotiate => &table.negotiate,
            UnrestAction::Bribe => &table.bribe,
        }
    }

    /// Arrests and suppressions need loyal troops
    pub fn requires_military(self) -> bool {
        matches!(self, UnrestAction::Arrest | UnrestAction::Suppress)
    }

    /// Interventions offered at a given stage
    pub fn options_for(stage: UnrestStage, has_military: bool) -> Vec<UnrestAction> {
        let candidates: &[UnrestAction] = match stage {
            UnrestStage::Calm => &[],
            UnrestStage::Grumbling => &[UnrestAction::Appease, UnrestAction::Investigate],
            UnrestStage::Brewing => &[
                UnrestAction::Appease,
                UnrestAction::Investigate,
                UnrestAction::Bribe,
            ],
            UnrestStage::Plotting => &[
                UnrestAction::Negotiate,
                UnrestAction::Bribe,
                UnrestAction::Arrest,
            ],
            UnrestStage::Uprising => &[UnrestAction::Negotiate, UnrestAction::Suppress],
        };
        candidates
            .iter()
            .copied()
            .filter(|action| has_military || !action.requires_military())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub action: UnrestAction,
    pub success: bool,
    pub organization_before: f64,
    pub organization_after: f64,
    pub new_stage: UnrestStage,
    pub pause_days: u32,
    /// Approval the caller should grant the group
    pub approval_change: f64,
    pub player_losses: u32,
    pub rebel_losses: u32,
}

pub fn success_chance(action: UnrestAction, military_strength: f64, config: &UnrestConfig) -> f64 {
    let bonus = (config.military_bonus_per_strength * military_strength.max(0.0))
        .min(config.max_military_bonus);
    (action.tuning(config).base_success + bonus).clamp(0.0, 1.0)
}

/// Roll one intervention against `state` without touching it
pub fn resolve_action(
    action: UnrestAction,
    state: &UnrestState,
    army_size: u32,
    military_strength: f64,
    config: &UnrestConfig,
    rng: &mut impl Rng,
) -> ActionOutcome {
    let tuning = action.tuning(config);
    let before = state.organization();
    let success = rng.gen::<f64>() < success_chance(action, military_strength, config);

    let target = match (success, action) {
        (true, UnrestAction::Suppress) if state.stage == UnrestStage::Uprising => {
            config.suppressed_uprising_organization
        }
        (true, _) => before - tuning.success_reduction,
        (false, _) => before + tuning.failure_increase,
    };
    let organization_after = target.clamp(0.0, 100.0);

    let army = army_size as f64;
    let rebel_strength = state.influence_share * config.rebel_strength_scale;
    let (player_losses, rebel_losses) = match (action, success) {
        (UnrestAction::Arrest, false) => {
            ((army * config.arrest_failure_losses * rng.gen::<f64>()).floor(), 0.0)
        }
        (UnrestAction::Suppress, true) => (
            (army * config.suppress_success_losses * rng.gen::<f64>()).floor(),
            (rebel_strength * rng.gen_range(0.5..=1.0)).floor(),
        ),
        (UnrestAction::Suppress, false) => (
            (army * config.suppress_failure_losses * rng.gen::<f64>()).floor(),
            (rebel_strength * 0.3 * rng.gen::<f64>()).floor(),
        ),
        _ => (0.0, 0.0),
    };

    // Actions never escalate; only the daily update may
    let new_stage = if success {
        state
            .stage
            .min(UnrestStage::for_organization(organization_after, state.dissatisfaction_days, config))
    } else {
        state.stage
    };

    ActionOutcome {
        action,
        success,
        organization_before: before,
        organization_after,
        new_stage,
        pause_days: if success { tuning.cooldown_days } else { 0 },
        approval_change: if success { tuning.approval_change } else { 0.0 },
        player_losses: player_losses as u32,
        rebel_losses: rebel_losses as u32,
    }
}
