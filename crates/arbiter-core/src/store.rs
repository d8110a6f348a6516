// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — Reference Store
// ─────────────────────────────────────────────────────────────────────
//! Versioned, immutable reference snapshots.
//!
//! A cycle clones the current `Arc` once and scores against it; a
//! concurrent `replace` installs a new snapshot without disturbing
//! cycles already in flight.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use arbiter_types::{ArbiterResult, CorrelationSource, EngineConfig, ReferenceTables};

use crate::correlation::{ComputedProvider, CorrelationModel, StaticProvider};
use crate::measurability::MeasurabilityModel;

/// Measurability and correlation models built from one set of tables.
pub struct ReferenceSnapshot {
    pub measurability: MeasurabilityModel,
    pub correlation: Box<dyn CorrelationModel>,
    pub version: u64,
}

impl ReferenceSnapshot {
    /// Validate `tables` and build the provider selected by `config`.
    pub fn build(
        tables: &ReferenceTables,
        config: &EngineConfig,
        version: u64,
    ) -> ArbiterResult<Self> {
        tables.validate()?;
        let correlation: Box<dyn CorrelationModel> = match config.correlation_source {
            CorrelationSource::Static => Box::new(StaticProvider::from_tables(tables)),
            CorrelationSource::Computed => Box::new(ComputedProvider::from_tables(
                tables,
                config.directional_correlation,
            )),
        };
        Ok(Self {
            measurability: MeasurabilityModel::from_tables(tables),
            correlation,
            version,
        })
    }
}

impl fmt::Debug for ReferenceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceSnapshot")
            .field("version", &self.version)
            .field("profiles", &self.measurability.len())
            .field("provider", &self.correlation.provider_name())
            .finish()
    }
}

/// Thread-safe holder of the current reference snapshot.
pub struct ReferenceStore {
    config: EngineConfig,
    current: RwLock<Arc<ReferenceSnapshot>>,
}

impl ReferenceStore {
    pub fn new(tables: &ReferenceTables, config: &EngineConfig) -> ArbiterResult<Self> {
        let snapshot = ReferenceSnapshot::build(tables, config, 1)?;
        Ok(Self {
            config: config.clone(),
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// The snapshot to use for one whole cycle.
    pub fn snapshot(&self) -> Arc<ReferenceSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Build and install a new snapshot; returns its version.
    ///
    /// Invalid tables leave the current snapshot in place. The snapshot
    /// is built before the write lock is taken, so readers only wait for
    /// the swap.
    pub fn replace(&self, tables: &ReferenceTables) -> ArbiterResult<u64> {
        let mut snapshot = ReferenceSnapshot::build(tables, &self.config, 0)?;
        let version = {
            let mut guard = self.current.write();
            snapshot.version = guard.version + 1;
            let version = snapshot.version;
            *guard = Arc::new(snapshot);
            version
        };
        log::info!("reference snapshot replaced (version {version})");
        Ok(version)
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }
}
