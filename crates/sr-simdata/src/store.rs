//! The data exchange store.

use std::collections::HashMap;

use sr_core::{Real, ensure_non_decreasing};
use tracing::{debug, info};

use crate::snapshot::SimDataSnapshot;
use crate::var::SimVar;
use crate::{SimDataError, SimDataResult};

/// Variables, named result series, and the time samples they are indexed by.
///
/// Writes never check that a series matches the time entries in length;
/// call [`SimData::validate`] once a run is complete.
#[derive(Debug, Clone, Default)]
pub struct SimData {
    vars: HashMap<String, SimVar>,
    results: HashMap<String, Vec<Real>>,
    time_entries: Vec<Real>,
}

impl SimData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a variable.
    pub fn add(&mut self, name: impl Into<String>, var: SimVar) {
        self.vars.insert(name.into(), var);
    }

    pub fn get(&self, name: &str) -> SimDataResult<&SimVar> {
        self.vars.get(name).ok_or_else(|| SimDataError::VarNotFound {
            name: name.to_string(),
        })
    }

    /// Store `series` under `name`, replacing any previous series.
    pub fn add_output_results(&mut self, name: impl Into<String>, series: Vec<Real>) {
        self.results.insert(name.into(), series);
    }

    /// Copy the series stored under `name` into `out`, replacing its contents.
    ///
    /// `out` is left untouched when the series does not exist.
    pub fn get_output_results(&self, name: &str, out: &mut Vec<Real>) -> SimDataResult<()> {
        let series = self
            .results
            .get(name)
            .ok_or_else(|| SimDataError::ResultNotFound {
                name: name.to_string(),
            })?;
        out.clear();
        out.extend_from_slice(series);
        Ok(())
    }

    pub fn add_time_entries(&mut self, entries: Vec<Real>) {
        self.time_entries = entries;
    }

    pub fn get_time_entries(&self, out: &mut Vec<Real>) {
        out.clear();
        out.extend_from_slice(&self.time_entries);
    }

    pub fn time_entries(&self) -> &[Real] {
        &self.time_entries
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
    }

    pub fn clear_vars(&mut self) {
        self.vars.clear();
    }

    /// Drop every variable, result series and time entry.
    ///
    /// The store stays usable afterwards.
    pub fn destroy(&mut self) {
        info!(
            vars = self.vars.len(),
            results = self.results.len(),
            time_entries = self.time_entries.len(),
            "sim data destroyed"
        );
        self.vars.clear();
        self.results.clear();
        self.time_entries.clear();
    }

    pub fn contains_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn contains_result(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }

    /// Variable names, sorted.
    pub fn var_names(&self) -> Vec<&str> {
        sorted_keys(&self.vars)
    }

    /// Result series names, sorted.
    pub fn result_names(&self) -> Vec<&str> {
        sorted_keys(&self.results)
    }

    /// Check the store is ready for reporting.
    ///
    /// Time entries must be finite and non-decreasing, and every result
    /// series must have one sample per time entry.
    pub fn validate(&self) -> SimDataResult<()> {
        ensure_non_decreasing(&self.time_entries, "time entries")?;

        let expected = self.time_entries.len();
        for name in self.result_names() {
            let len = self.results[name].len();
            if len != expected {
                return Err(SimDataError::LengthMismatch {
                    name: name.to_string(),
                    len,
                    expected,
                });
            }
        }
        debug!(results = self.results.len(), expected, "sim data validated");
        Ok(())
    }

    /// Owned, ordered copy of the whole store.
    pub fn snapshot(&self) -> SimDataSnapshot {
        SimDataSnapshot {
            time_entries: self.time_entries.clone(),
            vars: self
                .vars
                .iter()
                .map(|(name, var)| (name.clone(), var.clone()))
                .collect(),
            results: self
                .results
                .iter()
                .map(|(name, series)| (name.clone(), series.clone()))
                .collect(),
        }
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
