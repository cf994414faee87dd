//! Worlds: independently configured, capacity-bounded correlation contexts

mod config;
mod cross;
mod orchestrator;
mod state;

pub use config::{validate_worlds, WorldConfig};
pub use cross::{
    cross_world_confidence, natural_identity_match, CrossWorldCorrelation, CrossWorldLog,
    CrossWorldRetention, CROSS_WORLD_RULE,
};
pub use orchestrator::{Admission, World, WorldOrchestrator};
pub use state::{WorldPerformance, WorldState};
