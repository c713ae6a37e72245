//! Unrest tracker - daily dissatisfaction, organization and stage escalation
//!
//! Escalation is level-triggered and deterministic: an eligible group whose
//! organization is at or past the next stage's threshold advances, one stage
//! at a time, and every advance yields exactly one notification.

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::UnrestConfig;
use crate::core::types::{Day, SocialGroup};
use crate::unrest::actions::{resolve_action, ActionOutcome, UnrestAction};
use crate::unrest::state::{organization_growth_rate, SocietySnapshot, UnrestStage, UnrestState};

/// Emitted when a group advances to a new escalation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrestNotification {
    pub group: SocialGroup,
    pub new_stage: UnrestStage,
    pub organization: f64,
    pub influence_share: f64,
    pub day: Day,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnrestTracker {
    states: AHashMap<SocialGroup, UnrestState>,
    day: Day,
}

impl UnrestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn state(&self, group: SocialGroup) -> Option<&UnrestState> {
        self.states.get(&group)
    }

    pub fn state_mut(&mut self, group: SocialGroup) -> &mut UnrestState {
        self.states.entry(group).or_default()
    }

    /// Observed groups in stable order
    pub fn groups(&self) -> Vec<SocialGroup> {
        let mut groups: Vec<SocialGroup> = self.states.keys().copied().collect();
        groups.sort();
        groups
    }

    /// Advance one day for every group in the snapshot
    pub fn update_daily(&mut self, snapshot: &SocietySnapshot, config: &UnrestConfig) -> Vec<UnrestNotification> {
        self.day += 1;
        let day = self.day;
        let mut notifications = Vec::new();

        for group in snapshot.groups() {
            if group.is_exempt() {
                continue;
            }
            let approval = snapshot.approval(group);
            let state = self.states.entry(group).or_default();
            state.influence_share = snapshot.influence_share(group);

            if approval < config.approval_threshold {
                state.dissatisfaction_days += 1;
                if state.stage == UnrestStage::Calm {
                    state.stage = UnrestStage::Grumbling;
                    state.last_stage_change = day;
                }
            } else {
                state.dissatisfaction_days = state.dissatisfaction_days.saturating_sub(config.recovery_days);
                if state.dissatisfaction_days == 0
                    && state.stage != UnrestStage::Uprising
                    && state.stage != UnrestStage::Calm
                {
                    state.stage = UnrestStage::Calm;
                    state.last_stage_change = day;
                }
            }

            if state.paused_days > 0 {
                state.paused_days -= 1;
                state.growth_rate = 0.0;
            } else {
                let rate = organization_growth_rate(
                    group,
                    approval,
                    state.influence_share,
                    snapshot.stability,
                    config,
                );
                let before = state.organization();
                state.set_organization(before + rate);
                state.growth_rate = state.organization() - before;
            }

            if state.is_eligible(approval, config) {
                while let Some(next) = state.stage.next() {
                    let reached = next
                        .threshold(config)
                        .is_some_and(|threshold| state.organization() >= threshold);
                    if !reached {
                        break;
                    }
                    state.stage = next;
                    state.last_stage_change = day;
                    notifications.push(UnrestNotification {
                        group,
                        new_stage: next,
                        organization: state.organization(),
                        influence_share: state.influence_share,
                        day,
                    });
                }
            }
        }

        if !notifications.is_empty() {
            tracing::debug!(day, count = notifications.len(), "unrest stage changes");
        }
        notifications
    }

    /// Resolve an intervention against a group and write the result back
    pub fn apply_action(
        &mut self,
        group: SocialGroup,
        action: UnrestAction,
        army_size: u32,
        military_strength: f64,
        config: &UnrestConfig,
        rng: &mut impl Rng,
    ) -> ActionOutcome {
        let day = self.day;
        let state = self.states.entry(group).or_default();
        let outcome = resolve_action(action, state, army_size, military_strength, config, rng);

        state.set_organization(outcome.organization_after);
        if outcome.new_stage != state.stage {
            state.last_stage_change = day;
        }
        state.stage = outcome.new_stage;
        state.paused_days = state.paused_days.max(outcome.pause_days);
        outcome
    }

    /// Forget a group's grievances, e.g. after it has seceded
    pub fn reset_group(&mut self, group: SocialGroup) {
        self.states.insert(group, UnrestState::new());
    }

    /// Groups currently in open revolt, in stable order
    pub fn coalition_candidates(&self) -> Vec<SocialGroup> {
        self.groups()
            .into_iter()
            .filter(|group| self.stage_of(*group) == UnrestStage::Uprising)
            .collect()
    }

    pub fn stage_of(&self, group: SocialGroup) -> UnrestStage {
        self.states.get(&group).map(|s| s.stage).unwrap_or_default()
    }

    /// Whether soldiers or knights are themselves in revolt
    pub fn is_military_rebelling(&self) -> bool {
        self.states
            .iter()
            .any(|(group, state)| group.is_military() && state.stage == UnrestStage::Uprising)
    }

    /// Loyal troops exist to arrest or suppress with
    pub fn has_available_military(&self, army_size: u32) -> bool {
        army_size > 0 && !self.is_military_rebelling()
    }

    /// Days until the group could reach Uprising under constant conditions
    ///
    /// `None` when organization is not growing. Eligibility also needs the
    /// dissatisfaction streak, so the estimate never undercuts it.
    pub fn predict_days_to_uprising(
        &self,
        group: SocialGroup,
        approval: f64,
        stability: f64,
        config: &UnrestConfig,
    ) -> Option<u32> {
        if group.is_exempt() {
            return None;
        }
        let state = self.states.get(&group).cloned().unwrap_or_default();
        if state.stage == UnrestStage::Uprising {
            return Some(0);
        }
        if approval >= config.approval_threshold || state.influence_share < config.min_influence_share {
            return None;
        }
        let rate = organization_growth_rate(group, approval, state.influence_share, stability, config);
        if rate <= 0.0 {
            return None;
        }

        let remaining = (config.uprising_threshold - state.organization()).max(0.0);
        let organizing = state.paused_days + (remaining / rate).ceil() as u32;
        let streak = config
            .min_dissatisfaction_days
            .saturating_sub(state.dissatisfaction_days);
        Some(organizing.max(streak))
    }
}
