//! Serializable view of a store for reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sr_core::Real;

use crate::var::SimVar;

/// Owned copy of a `SimData`, keyed in name order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimDataSnapshot {
    pub time_entries: Vec<Real>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, SimVar>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub results: BTreeMap<String, Vec<Real>>,
}

impl SimDataSnapshot {
    /// Sample count, taken from the time entries.
    pub fn len(&self) -> usize {
        self.time_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_entries.is_empty()
    }

    /// `(t, value)` pairs for one result, truncated to the shorter side.
    pub fn samples(&self, name: &str) -> Option<impl Iterator<Item = (Real, Real)> + '_> {
        let series = self.results.get(name)?;
        Some(self.time_entries.iter().copied().zip(series.iter().copied()))
    }
}
