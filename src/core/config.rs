//! Economy configuration with documented constants
//!
//! Every tuning number used by the growth model, the resource equilibrium,
//! the unrest pipeline and the rebel factory lives here. The config is an
//! immutable value passed by reference to each component; a partial TOML file
//! overrides only the keys it names.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::core::types::Difficulty;

/// One row of a population-bucketed table: applies while `population < below`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationTier {
    pub below: u64,
    pub value: f64,
}

impl PopulationTier {
    pub const fn new(below: u64, value: f64) -> Self {
        Self { below, value }
    }
}

/// First tier whose bound exceeds `population`, or `fallback` above them all
pub fn tier_value(tiers: &[PopulationTier], population: u64, fallback: f64) -> f64 {
    tiers
        .iter()
        .find(|tier| population < tier.below)
        .map(|tier| tier.value)
        .unwrap_or(fallback)
}

/// Epoch lookup that repeats the last entry past the end of the table
fn epoch_entry(table: &[f64], epoch: u32, fallback: f64) -> f64 {
    table
        .get(epoch as usize)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(fallback)
}

// === TOP LEVEL ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub growth: GrowthConfig,
    pub wealth: WealthConfig,
    pub resources: ResourceConfig,
    pub difficulty: DifficultyConfig,
    pub unrest: UnrestConfig,
    pub rebellion: RebellionConfig,
}

impl EconomyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document and validate the result
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EconomyConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.growth.validate()?;
        self.wealth.validate()?;
        self.resources.validate()?;
        self.difficulty.validate()?;
        self.unrest.validate()?;
        self.rebellion.validate()?;
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

fn check_ascending(name: &str, tiers: &[PopulationTier]) -> Result<(), ConfigError> {
    if tiers.windows(2).any(|pair| pair[0].below >= pair[1].below) {
        return Err(invalid(format!("{name} tiers must have ascending bounds")));
    }
    Ok(())
}

fn check_unit(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(format!("{name} ({value}) must be within [0, 1]")));
    }
    Ok(())
}

// === POPULATION GROWTH ===

/// Logistic population model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Intrinsic growth rate per full cadence window
    ///
    /// Scaled by `min(ticks / tick_scale_divisor, max_tick_scale)` so a
    /// late update does not compound more than twice.
    pub base_rate: f64,

    /// Ticks between two growth steps of the same faction
    pub update_interval: u64,

    /// Share of growth kept while the faction is at war (truncated toward zero)
    pub war_penalty: f64,

    /// Largest fraction of the population that may be lost in one step
    pub max_decline_ratio: f64,

    /// Absolute growth guaranteed when growth is non-negative
    ///
    /// Small factions would otherwise stall on integer truncation.
    pub minimum_growth: Vec<PopulationTier>,

    /// Growth multiplier for small factions, so late spawns catch up
    pub small_faction_bonus: Vec<PopulationTier>,

    /// Capacity granted per head of the player's population
    pub capacity_per_player: f64,

    /// Base carrying capacity by epoch, before modifiers
    pub epoch_minimum_base: Vec<f64>,

    /// Carrying capacity floor by epoch, after modifiers
    pub epoch_minimum_final: Vec<f64>,

    /// Steepness of the exponential penalty above carrying capacity
    pub overcapacity_steepness: f64,

    /// Wealth per capita under which growth is slowed
    pub poor_per_capita: f64,
    pub poor_factor: f64,

    /// Wealth per capita over which growth is boosted
    pub rich_per_capita: f64,
    pub rich_factor: f64,

    /// Half-width of the uniform random factor around 1.0
    pub random_spread: f64,

    pub tick_scale_divisor: f64,
    pub max_tick_scale: f64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.02,
            update_interval: 10,
            war_penalty: 0.3,
            max_decline_ratio: 0.02,
            minimum_growth: vec![
                PopulationTier::new(50, 5.0),
                PopulationTier::new(100, 3.0),
                PopulationTier::new(500, 2.0),
                PopulationTier::new(1_000, 5.0),
                PopulationTier::new(5_000, 10.0),
                PopulationTier::new(10_000, 20.0),
            ],
            small_faction_bonus: vec![
                PopulationTier::new(100, 5.0),
                PopulationTier::new(500, 3.0),
                PopulationTier::new(1_000, 2.0),
                PopulationTier::new(5_000, 1.5),
                PopulationTier::new(10_000, 1.2),
            ],
            capacity_per_player: 50.0,
            epoch_minimum_base: vec![500.0, 2_000.0, 10_000.0, 50_000.0, 200_000.0],
            epoch_minimum_final: vec![1_000.0, 5_000.0, 20_000.0, 100_000.0, 500_000.0],
            overcapacity_steepness: 3.0,
            poor_per_capita: 20.0,
            poor_factor: 0.8,
            rich_per_capita: 200.0,
            rich_factor: 1.2,
            random_spread: 0.1,
            tick_scale_divisor: 10.0,
            max_tick_scale: 2.0,
        }
    }
}

impl GrowthConfig {
    /// Minimum absolute growth for a faction of this size (0 above the table)
    pub fn minimum_growth_for(&self, population: u64) -> i64 {
        tier_value(&self.minimum_growth, population, 0.0) as i64
    }

    pub fn small_faction_bonus_for(&self, population: u64) -> f64 {
        tier_value(&self.small_faction_bonus, population, 1.0)
    }

    pub fn epoch_minimum_base(&self, epoch: u32) -> f64 {
        epoch_entry(&self.epoch_minimum_base, epoch, 500.0)
    }

    pub fn epoch_minimum_final(&self, epoch: u32) -> f64 {
        epoch_entry(&self.epoch_minimum_final, epoch, 1_000.0)
    }

    /// Time scaling shared by population and wealth growth
    pub fn tick_scale(&self, ticks: u64) -> f64 {
        (ticks as f64 / self.tick_scale_divisor).min(self.max_tick_scale)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval == 0 {
            return Err(invalid("growth.update_interval must be positive"));
        }
        if self.tick_scale_divisor <= 0.0 {
            return Err(invalid("growth.tick_scale_divisor must be positive"));
        }
        check_unit("growth.war_penalty", self.war_penalty)?;
        check_unit("growth.max_decline_ratio", self.max_decline_ratio)?;
        check_unit("growth.random_spread", self.random_spread)?;
        check_ascending("growth.minimum_growth", &self.minimum_growth)?;
        check_ascending("growth.small_faction_bonus", &self.small_faction_bonus)?;
        if self.epoch_minimum_base.is_empty() || self.epoch_minimum_final.is_empty() {
            return Err(invalid("growth epoch minimum tables must not be empty"));
        }
        if self.poor_per_capita >= self.rich_per_capita {
            return Err(invalid(format!(
                "growth.poor_per_capita ({}) should be < rich_per_capita ({})",
                self.poor_per_capita, self.rich_per_capita
            )));
        }
        Ok(())
    }
}

// === WEALTH GROWTH ===

/// Bonus for holding a healthy inventory relative to its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbundanceConfig {
    pub enabled: bool,
    pub max_bonus: f64,
    /// Stock/target ratio at which the bonus peaks
    pub optimal_ratio: f64,
}

impl Default for AbundanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_bonus: 0.5,
            optimal_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WealthConfig {
    /// Hard ceiling on wealth per capita, by epoch (doubles every epoch)
    pub per_capita_caps: Vec<f64>,

    /// Wealth per capita the catch-up factor steers toward, by epoch
    pub target_per_capita: Vec<f64>,

    pub base_growth_rate: f64,

    /// Added per point of development above 1.0
    pub development_bonus: f64,

    /// Added per epoch
    pub epoch_bonus: f64,

    pub max_growth_rate: f64,
    pub max_decline_rate: f64,

    pub abundance: AbundanceConfig,

    /// Upper bound of the catch-up factor when below target
    pub catch_up_cap: f64,
    /// Per-capita multiple of the target that counts as overshooting
    pub overshoot_ratio: f64,
    pub overshoot_factor: f64,
    /// Catch-up at which the growth ceiling is widened
    pub strong_catch_up: f64,
    pub strong_catch_up_boost: f64,

    /// Absolute growth guaranteed when the rate is non-negative
    pub minimum_growth: f64,
    pub wealth_floor: f64,

    /// Share of wealth the budget drifts toward
    pub budget_ratio: f64,
    pub budget_recovery_rate: f64,
}

impl Default for WealthConfig {
    fn default() -> Self {
        Self {
            per_capita_caps: (0..7).map(|epoch| 2_000.0 * 2f64.powi(epoch)).collect(),
            target_per_capita: vec![0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0],
            base_growth_rate: 0.01,
            development_bonus: 0.01,
            epoch_bonus: 0.002,
            max_growth_rate: 0.05,
            max_decline_rate: 0.02,
            abundance: AbundanceConfig::default(),
            catch_up_cap: 2.0,
            overshoot_ratio: 2.0,
            overshoot_factor: 0.5,
            strong_catch_up: 1.5,
            strong_catch_up_boost: 1.5,
            minimum_growth: 5.0,
            wealth_floor: 100.0,
            budget_ratio: 0.5,
            budget_recovery_rate: 0.02,
        }
    }
}

impl WealthConfig {
    /// Per-capita ceiling for an epoch; unknown epochs use 50,000
    pub fn per_capita_cap(&self, epoch: u32) -> f64 {
        self.per_capita_caps
            .get(epoch as usize)
            .copied()
            .unwrap_or(50_000.0)
    }

    /// Per-capita target for an epoch; unknown epochs use 1.0
    pub fn target_per_capita(&self, epoch: u32) -> f64 {
        self.target_per_capita
            .get(epoch as usize)
            .copied()
            .unwrap_or(1.0)
    }

    /// Highest epoch the wealth tables describe
    pub fn max_epoch(&self) -> u32 {
        self.per_capita_caps.len().saturating_sub(1) as u32
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.per_capita_caps.is_empty() {
            return Err(invalid("wealth.per_capita_caps must not be empty"));
        }
        if self.per_capita_caps.iter().any(|cap| *cap <= 0.0) {
            return Err(invalid("wealth.per_capita_caps must be positive"));
        }
        if self.max_growth_rate < 0.0 || self.max_decline_rate < 0.0 {
            return Err(invalid("wealth growth bounds must be non-negative"));
        }
        if self.abundance.optimal_ratio <= 0.0 {
            return Err(invalid("wealth.abundance.optimal_ratio must be positive"));
        }
        check_unit("wealth.budget_ratio", self.budget_ratio)?;
        check_unit("wealth.budget_recovery_rate", self.budget_recovery_rate)?;
        Ok(())
    }
}

// === RESOURCE EQUILIBRIUM ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Inventory target for a neutral-bias resource at epoch 0
    pub base_inventory_target: f64,
    pub base_production_rate: f64,
    pub base_consumption_rate: f64,

    /// Consumption multiplier at war, plus `war_aggression_weight · aggression`
    pub war_consumption_multiplier: f64,
    pub war_aggression_weight: f64,

    /// Stock is kept within these multiples of the target
    pub min_inventory_ratio: f64,
    pub max_inventory_ratio: f64,

    /// Long market cycle period range, in ticks
    pub cycle_period_min: u64,
    pub cycle_period_max: u64,

    pub trend_amplitude: f64,
    /// Extra amplitude per unit of bias distance from 1.0
    pub bias_amplitude: f64,

    /// Fraction of the stock gap closed per tick
    pub correction_rate: f64,
    /// Random shock width as a fraction of target
    pub shock_ratio: f64,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            base_inventory_target: 500.0,
            base_production_rate: 5.0,
            base_consumption_rate: 5.0,
            war_consumption_multiplier: 1.3,
            war_aggression_weight: 0.5,
            min_inventory_ratio: 0.2,
            max_inventory_ratio: 3.0,
            cycle_period_min: 600,
            cycle_period_max: 800,
            trend_amplitude: 0.35,
            bias_amplitude: 0.45,
            correction_rate: 0.01,
            shock_ratio: 0.1,
        }
    }
}

impl ResourceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_inventory_ratio >= self.max_inventory_ratio {
            return Err(invalid(format!(
                "resources.min_inventory_ratio ({}) should be < max_inventory_ratio ({})",
                self.min_inventory_ratio, self.max_inventory_ratio
            )));
        }
        if self.cycle_period_min == 0 || self.cycle_period_min >= self.cycle_period_max {
            return Err(invalid(
                "resources.cycle_period_min must be positive and below cycle_period_max",
            ));
        }
        if self.base_inventory_target <= 0.0 {
            return Err(invalid("resources.base_inventory_target must be positive"));
        }
        Ok(())
    }
}

// === DIFFICULTY ===

/// Per-tier multipliers, indexed by `Difficulty::index`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    pub capacity_multipliers: [f64; 6],
    pub growth_multipliers: [f64; 6],
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            capacity_multipliers: [0.5, 0.7, 1.0, 1.3, 1.6, 2.0],
            growth_multipliers: [0.8, 0.9, 1.0, 1.1, 1.2, 1.3],
        }
    }
}

impl DifficultyConfig {
    pub fn capacity(&self, difficulty: Difficulty) -> f64 {
        self.capacity_multipliers[difficulty.index()]
    }

    pub fn growth(&self, difficulty: Difficulty) -> f64 {
        self.growth_multipliers[difficulty.index()]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut all = self
            .capacity_multipliers
            .iter()
            .chain(self.growth_multipliers.iter());
        if all.any(|m| *m <= 0.0) {
            return Err(invalid("difficulty multipliers must be positive"));
        }
        Ok(())
    }
}

// === UNREST ===

/// Tuning for one intervention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionTuning {
    pub base_success: f64,
    /// Organization removed on success
    pub success_reduction: f64,
    /// Organization added on failure
    pub failure_increase: f64,
    /// Days during which organization stops growing after success
    pub cooldown_days: u32,
    /// Approval granted to the group on success
    pub approval_change: f64,
}

impl ActionTuning {
    pub const fn new(
        base_success: f64,
        success_reduction: f64,
        failure_increase: f64,
        cooldown_days: u32,
        approval_change: f64,
    ) -> Self {
        Self {
            base_success,
            success_reduction,
            failure_increase,
            cooldown_days,
            approval_change,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTable {
    pub investigate: ActionTuning,
    pub arrest: ActionTuning,
    pub suppress: ActionTuning,
    pub appease: ActionTuning,
    pub negotiate: ActionTuning,
    pub bribe: ActionTuning,
}

impl Default for ActionTable {
    fn default() -> Self {
        Self {
            investigate: ActionTuning::new(0.6, 20.0, 5.0, 5, 0.0),
            arrest: ActionTuning::new(0.4, 35.0, 10.0, 7, 0.0),
            suppress: ActionTuning::new(0.5, 60.0, 15.0, 0, 0.0),
            appease: ActionTuning::new(0.85, 10.0, 5.0, 0, 10.0),
            negotiate: ActionTuning::new(0.7, 15.0, 8.0, 0, 15.0),
            bribe: ActionTuning::new(0.75, 10.0, 10.0, 10, 0.0),
        }
    }
}

impl ActionTable {
    fn iter(&self) -> impl Iterator<Item = &ActionTuning> {
        [
            &self.investigate,
            &self.arrest,
            &self.suppress,
            &self.appease,
            &self.negotiate,
            &self.bribe,
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnrestConfig {
    /// Approval below which a group accumulates dissatisfaction days
    pub approval_threshold: f64,
    /// Days a group must stay dissatisfied before it may escalate
    pub min_dissatisfaction_days: u32,
    /// Influence share a group needs to escalate
    pub min_influence_share: f64,
    /// Days forgiven per content day
    pub recovery_days: u32,

    // Stage thresholds on organization
    pub brewing_threshold: f64,
    pub plotting_threshold: f64,
    pub uprising_threshold: f64,

    /// Approval under which organization grows
    pub grievance_approval: f64,
    /// Daily organization gain at zero approval
    pub base_organization_growth: f64,
    pub influence_weight: f64,
    /// Fraction of growth removed at full stability
    pub stability_dampening: f64,

    /// Approval above which organization decays
    pub content_approval: f64,
    pub content_decay: f64,
    pub loyal_approval: f64,
    pub loyal_decay: f64,

    /// Organization left after a successful suppression of an uprising
    pub suppressed_uprising_organization: f64,

    pub military_bonus_per_strength: f64,
    pub max_military_bonus: f64,

    /// Army losses as a fraction of army size
    pub arrest_failure_losses: f64,
    pub suppress_success_losses: f64,
    pub suppress_failure_losses: f64,
    /// Rebel strength per unit of influence share
    pub rebel_strength_scale: f64,

    pub actions: ActionTable,
}

impl Default for UnrestConfig {
    fn default() -> Self {
        Self {
            approval_threshold: 35.0,
            min_dissatisfaction_days: 180,
            min_influence_share: 0.15,
            recovery_days: 2,
            brewing_threshold: 30.0,
            plotting_threshold: 70.0,
            uprising_threshold: 100.0,
            grievance_approval: 45.0,
            base_organization_growth: 2.0,
            influence_weight: 0.5,
            stability_dampening: 0.8,
            content_approval: 50.0,
            content_decay: 0.5,
            loyal_approval: 80.0,
            loyal_decay: 1.0,
            suppressed_uprising_organization: 30.0,
            military_bonus_per_strength: 0.1,
            max_military_bonus: 0.3,
            arrest_failure_losses: 0.1,
            suppress_success_losses: 0.1,
            suppress_failure_losses: 0.2,
            rebel_strength_scale: 100.0,
            actions: ActionTable::default(),
        }
    }
}

impl UnrestConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.brewing_threshold < self.plotting_threshold
            && self.plotting_threshold < self.uprising_threshold
            && self.uprising_threshold <= 100.0)
        {
            return Err(invalid(
                "unrest thresholds must satisfy brewing < plotting < uprising <= 100",
            ));
        }
        if self.approval_threshold > self.grievance_approval {
            return Err(invalid(format!(
                "unrest.approval_threshold ({}) should be <= grievance_approval ({})",
                self.approval_threshold, self.grievance_approval
            )));
        }
        check_unit("unrest.min_influence_share", self.min_influence_share)?;
        check_unit("unrest.stability_dampening", self.stability_dampening)?;
        for tuning in self.actions.iter() {
            check_unit("unrest action base_success", tuning.base_success)?;
        }
        Ok(())
    }
}

// === REBELLION ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoalitionConfig {
    pub population_share: f64,
    pub wealth_share: f64,
    /// Multiplies the pooled totals
    pub unity_bonus: f64,
    pub min_population: u64,
    pub min_wealth: f64,
    pub military_base: f64,
    pub military_share_weight: f64,
    pub military_cap: f64,
    pub aggression: f64,
    pub budget_ratio: f64,
    /// Capacity trait of the new faction's economy
    pub population_factor: f64,
}

impl Default for CoalitionConfig {
    fn default() -> Self {
        Self {
            population_share: 0.7,
            wealth_share: 0.5,
            unity_bonus: 0.1,
            min_population: 20,
            min_wealth: 600.0,
            military_base: 0.6,
            military_share_weight: 2.5,
            military_cap: 2.0,
            aggression: 0.8,
            budget_ratio: 0.4,
            population_factor: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficialDefectionConfig {
    pub min_wealth: f64,
    pub min_population: u64,
    pub military_base: f64,
    /// Strength gained per order of magnitude of wealth
    pub military_wealth_weight: f64,
    pub military_cap: f64,
    pub aggression: f64,
    pub budget_ratio: f64,
}

impl Default for OfficialDefectionConfig {
    fn default() -> Self {
        Self {
            min_wealth: 300.0,
            min_population: 10,
            military_base: 0.6,
            military_wealth_weight: 0.15,
            military_cap: 1.6,
            aggression: 0.7,
            budget_ratio: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebellionConfig {
    /// Share of the group's population that defects
    pub defection_ratio: f64,
    /// Fixed defector count, used instead of the ratio when set
    pub population_override: Option<u64>,
    pub min_population: u64,
    pub wealth_share: f64,
    /// Wealth floor of a freshly spawned rebel
    pub base_wealth: f64,

    /// Loot ratio is `min(max_loot_ratio, loot_share_weight · share)`
    pub max_loot_ratio: f64,
    pub loot_share_weight: f64,

    pub military_base: f64,
    pub military_share_weight: f64,
    pub military_cap: f64,
    pub aggression: f64,
    pub budget_ratio: f64,

    pub coalition: CoalitionConfig,
    pub official: OfficialDefectionConfig,

    /// Rebel economy may exceed its spawn baselines by these margins
    pub economy_population_margin: f64,
    pub economy_wealth_margin: f64,
}

impl Default for RebellionConfig {
    fn default() -> Self {
        Self {
            defection_ratio: 0.8,
            population_override: None,
            min_population: 10,
            wealth_share: 0.5,
            base_wealth: 300.0,
            max_loot_ratio: 0.3,
            loot_share_weight: 0.5,
            military_base: 0.5,
            military_share_weight: 2.0,
            military_cap: 1.5,
            aggression: 0.7,
            budget_ratio: 0.3,
            coalition: CoalitionConfig::default(),
            official: OfficialDefectionConfig::default(),
            economy_population_margin: 0.1,
            economy_wealth_margin: 0.15,
        }
    }
}

impl RebellionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_unit("rebellion.defection_ratio", self.defection_ratio)?;
        check_unit("rebellion.wealth_share", self.wealth_share)?;
        check_unit("rebellion.max_loot_ratio", self.max_loot_ratio)?;
        check_unit("rebellion.coalition.population_share", self.coalition.population_share)?;
        check_unit("rebellion.coalition.wealth_share", self.coalition.wealth_share)?;
        check_unit("rebellion.aggression", self.aggression)?;
        if self.coalition.unity_bonus < 0.0 {
            return Err(invalid("rebellion.coalition.unity_bonus must be non-negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EconomyConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_tables_match_documented_values() {
        let config = EconomyConfig::default();
        assert_eq!(config.wealth.per_capita_cap(0), 2_000.0);
        assert_eq!(config.wealth.per_capita_cap(6), 128_000.0);
        assert_eq!(config.wealth.target_per_capita(3), 4.0);
        assert_eq!(config.growth.minimum_growth_for(75), 3);
        assert_eq!(config.growth.minimum_growth_for(20_000), 0);
        assert_eq!(config.growth.small_faction_bonus_for(75), 5.0);
        assert_eq!(config.growth.small_faction_bonus_for(50_000), 1.0);
    }

    #[test]
    fn test_epoch_tables_fall_back() {
        let config = EconomyConfig::default();
        assert_eq!(config.growth.epoch_minimum_final(9), 500_000.0);
        assert_eq!(config.wealth.per_capita_cap(9), 50_000.0);
        assert_eq!(config.wealth.target_per_capita(9), 1.0);
    }

    #[test]
    fn test_partial_toml_overrides_only_named_keys() {
        let config = EconomyConfig::from_toml_str(
            r#"
            [growth]
            base_rate = 0.05

            [unrest.actions.arrest]
            base_success = 0.9
            success_reduction = 40.0
            failure_increase = 10.0
            cooldown_days = 3
            approval_change = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.growth.base_rate, 0.05);
        assert_eq!(config.growth.update_interval, 10);
        assert_eq!(config.unrest.actions.arrest.base_success, 0.9);
        assert_eq!(config.unrest.actions.investigate.base_success, 0.6);
    }

    #[test]
    fn test_inverted_inventory_bounds_rejected() {
        let mut config = EconomyConfig::default();
        config.resources.min_inventory_ratio = 4.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = EconomyConfig::from_toml_str("[growth\nbase_rate = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = EconomyConfig::from_file(Path::new("/nonexistent/economy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
