//! Telemetry sink for the economy and unrest engines
//!
//! Calculators stay pure and hand their breakdowns to an `EconomyObserver`.
//! The service and the daily driver decide which observer to use.

use std::sync::Mutex;

use crate::core::error::EconomyError;
use crate::core::types::FactionId;
use crate::economy::growth::{PopulationGrowth, WealthGrowth};
use crate::unrest::UnrestNotification;

/// Receives growth breakdowns, validation failures and unrest notifications
///
/// Shared across rayon workers by `EconomyService::update_all`, hence `Sync`.
pub trait EconomyObserver: Send + Sync {
    fn on_population_growth(&self, _faction: FactionId, _growth: &PopulationGrowth) {}
    fn on_wealth_growth(&self, _faction: FactionId, _growth: &WealthGrowth) {}
    fn on_validation_failure(&self, _faction: FactionId, _error: &EconomyError) {}
    fn on_unrest(&self, _notification: &UnrestNotification) {}
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl EconomyObserver for NullObserver {}

/// Forwards to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl EconomyObserver for TracingObserver {
    fn on_population_growth(&self, faction: FactionId, growth: &PopulationGrowth) {
        tracing::debug!(
            %faction,
            new_population = growth.new_population,
            growth = growth.growth,
            capacity = growth.carrying_capacity,
            logistic = growth.logistic_factor,
            "population growth"
        );
    }

    fn on_wealth_growth(&self, faction: FactionId, growth: &WealthGrowth) {
        tracing::debug!(
            %faction,
            new_wealth = growth.new_wealth,
            rate = growth.growth_rate,
            catch_up = growth.catch_up_factor,
            capped = growth.capped,
            "wealth growth"
        );
    }

    fn on_validation_failure(&self, faction: FactionId, error: &EconomyError) {
        tracing::warn!(%faction, %error, "economy state rejected");
    }

    fn on_unrest(&self, notification: &UnrestNotification) {
        tracing::warn!(
            group = %notification.group,
            stage = ?notification.new_stage,
            organization = notification.organization,
            "unrest escalated"
        );
    }
}

/// Everything an observer can be told, as a value
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    PopulationGrowth(FactionId, PopulationGrowth),
    WealthGrowth(FactionId, WealthGrowth),
    ValidationFailure(FactionId, EconomyError),
    Unrest(UnrestNotification),
}

/// Collects events in memory for inspection
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, event: TelemetryEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl EconomyObserver for RecordingObserver {
    fn on_population_growth(&self, faction: FactionId, growth: &PopulationGrowth) {
        self.push(TelemetryEvent::PopulationGrowth(faction, growth.clone()));
    }

    fn on_wealth_growth(&self, faction: FactionId, growth: &WealthGrowth) {
        self.push(TelemetryEvent::WealthGrowth(faction, growth.clone()));
    }

    fn on_validation_failure(&self, faction: FactionId, error: &EconomyError) {
        self.push(TelemetryEvent::ValidationFailure(faction, error.clone()));
    }

    fn on_unrest(&self, notification: &UnrestNotification) {
        self.push(TelemetryEvent::Unrest(notification.clone()));
    }
}
