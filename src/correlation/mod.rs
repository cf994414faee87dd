//! Intra-world correlation: entity registry and proximity rules

mod engine;
mod rules;

pub use engine::{correlation_confidence, CorrelationEngine, CorrelationMatch, CorrelationOutcome};
pub use rules::{
    correlate_pair, CorrelationRule, MAX_INCLINATION_DELTA_DEG, MAX_SEMI_MAJOR_AXIS_DELTA_KM,
};
