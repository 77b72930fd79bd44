//! Five independent ordered collections keyed by record id.

use std::collections::BTreeMap;

use maternal_core::{
    CareError, HealthAlert, HealthMetrics, HealthcareProvider, MaternalProfile, PrenatalVisit,
};
use serde::{Deserialize, Serialize};

use crate::validation;

/// Ordered map from id to record. Inserting an existing id replaces the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    records: BTreeMap<String, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.get(id)
    }

    /// Returns the record previously stored under `id`, if any.
    pub fn insert(&mut self, id: impl Into<String>, record: T) -> Option<T> {
        self.records.insert(id.into(), record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordStore {
    pub profiles: Collection<MaternalProfile>,
    pub providers: Collection<HealthcareProvider>,
    pub metrics: Collection<HealthMetrics>,
    pub visits: Collection<PrenatalVisit>,
    pub alerts: Collection<HealthAlert>,
    /// Last sequence number handed to a metrics, visit or alert record.
    pub last_sequence: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> Result<String, CareError> {
        serde_json::to_string_pretty(self)
            .map_err(|err| CareError::Internal(format!("failed to serialize store: {err}")))
    }

    /// Restores a snapshot and rejects it when any record breaks its invariants.
    pub fn from_json(snapshot: &str) -> Result<Self, CareError> {
        let store: Self = serde_json::from_str(snapshot)
            .map_err(|err| CareError::Internal(format!("failed to restore store: {err}")))?;
        store.verify()?;
        Ok(store)
    }

    /// Numbers records in creation order so reads can break timestamp ties.
    pub fn next_sequence(&mut self) -> u64 {
        self.last_sequence += 1;
        self.last_sequence
    }

    pub fn verify(&self) -> Result<(), CareError> {
        check_keys("profile", &self.profiles, |p| &p.id)?;
        check_keys("provider", &self.providers, |p| &p.id)?;
        check_keys("metrics", &self.metrics, |m| &m.id)?;
        check_keys("visit", &self.visits, |v| &v.id)?;
        check_keys("alert", &self.alerts, |a| &a.id)?;

        for metrics in self.metrics.values() {
            validation::validate_stored_metrics(metrics)
                .map_err(|err| corrupt(format!("metrics {}: {err}", metrics.id)))?;
            self.check_sequence("metrics", &metrics.id, metrics.sequence)?;
        }

        for visit in self.visits.values() {
            if visit.completed && visit.is_cancelled() {
                return Err(corrupt(format!(
                    "visit {} is both completed and cancelled",
                    visit.id
                )));
            }
            self.check_sequence("visit", &visit.id, visit.sequence)?;
        }

        for alert in self.alerts.values() {
            if !(1..=HealthAlert::MAX_ESCALATION_LEVEL).contains(&alert.escalation_level) {
                return Err(corrupt(format!(
                    "alert {} has escalation level {}",
                    alert.id, alert.escalation_level
                )));
            }
            if alert.is_resolved != alert.resolved_at.is_some() {
                return Err(corrupt(format!(
                    "alert {} resolution time does not match its resolved flag",
                    alert.id
                )));
            }
            self.check_sequence("alert", &alert.id, alert.sequence)?;
        }

        Ok(())
    }

    fn check_sequence(&self, kind: &str, id: &str, sequence: u64) -> Result<(), CareError> {
        if sequence == 0 || sequence > self.last_sequence {
            return Err(corrupt(format!(
                "{kind} {id} has sequence {sequence} outside 1..={}",
                self.last_sequence
            )));
        }
        Ok(())
    }
}

fn check_keys<T>(
    kind: &str,
    collection: &Collection<T>,
    id_of: impl Fn(&T) -> &String,
) -> Result<(), CareError> {
    for (key, record) in collection.iter() {
        if id_of(record) != key {
            return Err(corrupt(format!(
                "{kind} stored under {key} has id {}",
                id_of(record)
            )));
        }
    }
    Ok(())
}

fn corrupt(detail: String) -> CareError {
    CareError::Internal(format!("corrupt snapshot: {detail}"))
}
