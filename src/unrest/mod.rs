//! Social unrest: per-group organization, escalation stages and interventions

pub mod actions;
pub mod state;
pub mod tracker;

pub use actions::{resolve_action, ActionOutcome, UnrestAction};
pub use state::{SocietySnapshot, UnrestStage, UnrestState};
pub use tracker::{UnrestNotification, UnrestTracker};
