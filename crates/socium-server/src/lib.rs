//! Shared application plumbing for the Socium HTTP boundary.
//!
//! The engine is synchronous and single-threaded by contract, so the whole
//! boundary funnels through one exclusive lock per engine instance.

use std::sync::{Mutex, MutexGuard};

use socium_core::{PersonalityCatalog, Simulation};

pub mod catalog;
pub mod error;
pub mod handlers;
pub mod router;

pub use error::ApiError;
pub use router::build_router;

/// Shared handle used by every request handler to reach the running engine.
pub struct AppState {
    simulation: Mutex<Simulation>,
    catalog: PersonalityCatalog,
}

impl AppState {
    /// Wrap a freshly constructed engine and the catalog it was built from.
    ///
    /// The catalog is kept so that `reset` can rebuild the engine without
    /// re-reading the catalog file.
    #[must_use]
    pub fn new(simulation: Simulation, catalog: PersonalityCatalog) -> Self {
        Self {
            simulation: Mutex::new(simulation),
            catalog,
        }
    }

    /// Acquire the engine lock, mapping poisoning into an API error.
    pub fn lock_simulation(&self) -> Result<MutexGuard<'_, Simulation>, ApiError> {
        self.simulation.lock().map_err(|_| ApiError::Lock)
    }

    /// The catalog this instance was booted with.
    #[must_use]
    pub fn catalog(&self) -> &PersonalityCatalog {
        &self.catalog
    }
}
