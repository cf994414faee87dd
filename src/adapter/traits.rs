//! DomainAdapter trait: the contract domain adapters implement
//!
//! An adapter normalizes raw domain observations into `FusedEntity` values,
//! keeps whatever derived state its domain needs, and raises alerts. It never
//! fetches data itself; producers hand it descriptors.

use super::alert::Alert;
use crate::entity::Domain;

pub trait DomainAdapter: Send + Sync {
    /// Unique identifier for this adapter
    fn id(&self) -> &str;

    /// The domain whose observations this adapter normalizes
    fn domain(&self) -> Domain;

    /// Alerts raised within the adapter's active window
    fn alerts(&self) -> Vec<Alert>;
}
