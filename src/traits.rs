//! Core domain traits for the evacuation router.
//!
//! These are intentionally minimal. Concrete apps implement them for their
//! own site registries and rainfall providers.

use crate::error::FeedError;
use crate::rainfall::RainfallIndex;

/// Cooperative stop signal polled by long-running searches.
///
/// Polled from rayon workers, hence `Sync`.
pub trait Cancellation: Sync {
    fn is_cancelled(&self) -> bool;
}

/// Produces a fresh rainfall grid snapshot.
pub trait RainfallFeed {
    fn fetch(&self) -> Result<RainfallIndex, FeedError>;
}

/// An evacuation site a route may end at.
pub trait EvacuationSite {
    fn id(&self) -> &str;

    /// Display name shown to operators.
    fn name(&self) -> &str;

    /// Barangay or district label, if known.
    fn district(&self) -> Option<&str> {
        None
    }

    /// Location coordinates (lat, lon).
    fn location(&self) -> (f64, f64);
}
