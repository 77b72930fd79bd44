use std::collections::BTreeSet;

use maternal_core::{
    parse_date, store_time, BloodType, CareConfig, CareError, HealthAlert, HealthMetrics,
    HealthcareProvider, MaternalProfile, MetricsInput, PrenatalVisit, ProfileInput, ProfileUpdate,
    ProviderInput, RecordKind, RiskLevel, Timestamp, Trimester, VisitInput, VisitOutcome,
};
use tracing::{debug, error, info, warn};

use crate::alerts;
use crate::clock::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::risk::{self, RiskVerdict};
use crate::store::RecordStore;
use crate::validation;

/// Maternal care records with risk assessment and alerting.
///
/// Every mutating operation takes `&mut self` and runs validate, store,
/// assess and alert to completion. A multi-threaded host wraps the service in
/// a lock so each operation is one critical section.
#[derive(Debug)]
pub struct MaternalCare<C = SystemClock, G = UuidGenerator> {
    store: RecordStore,
    config: CareConfig,
    clock: C,
    ids: G,
}

impl MaternalCare {
    pub fn new(config: CareConfig) -> Self {
        Self::with_parts(RecordStore::new(), config, SystemClock::new(), UuidGenerator)
    }
}

impl<C: Clock, G: IdGenerator> MaternalCare<C, G> {
    pub fn with_parts(store: RecordStore, config: CareConfig, clock: C, ids: G) -> Self {
        Self {
            store,
            config,
            clock,
            ids,
        }
    }

    /// Rebuilds the service from a snapshot produced by [`MaternalCare::snapshot`].
    /// A snapshot whose records break their invariants is refused.
    pub fn restore(
        snapshot: &str,
        config: CareConfig,
        clock: C,
        ids: G,
    ) -> Result<Self, CareError> {
        let store = RecordStore::from_json(snapshot).map_err(internal)?;
        Ok(Self::with_parts(store, config, clock, ids))
    }

    pub fn snapshot(&self) -> Result<String, CareError> {
        self.store.to_json().map_err(internal)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn config(&self) -> &CareConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn register_provider(
        &mut self,
        input: ProviderInput,
    ) -> Result<HealthcareProvider, CareError> {
        validation::validate_provider(&input).map_err(rejected)?;

        let provider = HealthcareProvider {
            id: self.ids.next_id(),
            name: input.name.trim().to_string(),
            specialization: input.specialization,
            license_number: input.license_number.trim().to_string(),
            contact_info: input.contact_info,
            facility_id: input.facility_id,
            is_active: true,
            role: input.role,
            last_updated: self.clock.now(),
        };

        self.store
            .providers
            .insert(provider.id.clone(), provider.clone());
        info!(provider_id = %provider.id, "healthcare provider registered");
        Ok(provider)
    }

    pub fn deactivate_provider(&mut self, id: &str) -> Result<HealthcareProvider, CareError> {
        let mut provider = self.provider(id)?.clone();
        provider.is_active = false;
        provider.last_updated = self.clock.now();

        self.store
            .providers
            .insert(provider.id.clone(), provider.clone());
        info!(provider_id = %provider.id, "healthcare provider deactivated");
        Ok(provider)
    }

    /// New profiles start at risk LOW in the FIRST trimester.
    pub fn create_profile(&mut self, input: ProfileInput) -> Result<MaternalProfile, CareError> {
        validation::validate_profile(&input).map_err(rejected)?;
        let blood_type: BloodType = input.blood_type.parse()?;
        let due_date = self.stamp_date(&input.due_date, "Invalid due date")?;
        self.active_provider(&input.primary_care_provider_id)?;

        let now = self.clock.now();
        let profile = MaternalProfile {
            id: self.ids.next_id(),
            name: input.name.trim().to_string(),
            age: input.age,
            blood_type,
            emergency_contact: input.emergency_contact,
            due_date,
            current_trimester: Trimester::First,
            risk_level: RiskLevel::Low,
            primary_care_provider_id: input.primary_care_provider_id,
            medical_history: non_blank(input.medical_history).collect(),
            allergies: non_blank(input.allergies).collect::<BTreeSet<_>>(),
            is_high_risk: input.is_high_risk,
            created_at: now,
            last_updated: now,
        };

        self.store
            .profiles
            .insert(profile.id.clone(), profile.clone());
        info!(profile_id = %profile.id, "maternal profile created");
        Ok(profile)
    }

    pub fn update_profile(
        &mut self,
        id: &str,
        update: ProfileUpdate,
    ) -> Result<MaternalProfile, CareError> {
        let mut profile = self.profile(id)?.clone();

        if let Some(contact) = &update.emergency_contact {
            validation::validate_emergency_contact(contact).map_err(rejected)?;
        }
        if let Some(provider_id) = &update.primary_care_provider_id {
            self.active_provider(provider_id)?;
        }

        if let Some(level) = update.risk_level {
            profile.risk_level = level;
        }
        if let Some(trimester) = update.current_trimester {
            profile.current_trimester = trimester;
        }
        if let Some(flag) = update.is_high_risk {
            profile.is_high_risk = flag;
        }
        if let Some(contact) = update.emergency_contact {
            profile.emergency_contact = contact;
        }
        if let Some(provider_id) = update.primary_care_provider_id {
            profile.primary_care_provider_id = provider_id;
        }
        profile
            .medical_history
            .extend(non_blank(update.add_medical_history));
        profile.allergies.extend(non_blank(update.add_allergies));
        profile.last_updated = self.clock.now();

        self.store
            .profiles
            .insert(profile.id.clone(), profile.clone());
        info!(profile_id = %profile.id, "maternal profile updated");
        Ok(profile)
    }

    /// Recomputes the trimester from the due date and the current time.
    pub fn refresh_trimester(&mut self, id: &str) -> Result<MaternalProfile, CareError> {
        let mut profile = self.profile(id)?.clone();
        let now = self.clock.now();
        let trimester = Trimester::for_due_date(profile.due_date, now);

        if trimester != profile.current_trimester {
            profile.current_trimester = trimester;
            profile.last_updated = now;
            self.store
                .profiles
                .insert(profile.id.clone(), profile.clone());
            info!(profile_id = %profile.id, ?trimester, "trimester advanced");
        }
        Ok(profile)
    }

    /// Stores the measurement and, when it is high-risk, raises one new alert.
    pub fn record_metrics(&mut self, input: MetricsInput) -> Result<HealthMetrics, CareError> {
        validation::validate_metrics(&input).map_err(rejected)?;
        self.profile(&input.maternal_profile_id)?;
        self.active_provider(&input.recorded_by)?;

        let now = self.clock.now();
        let mut metrics = HealthMetrics {
            id: self.ids.next_id(),
            maternal_profile_id: input.maternal_profile_id,
            recorded_at: now,
            weight: input.weight,
            systolic_bp: input.systolic_bp,
            diastolic_bp: input.diastolic_bp,
            blood_sugar: input.blood_sugar,
            hemoglobin_level: input.hemoglobin_level,
            fetal_heart_rate: input.fetal_heart_rate,
            notes: input.notes,
            recorded_by: input.recorded_by,
            is_flagged_for_review: false,
            sequence: self.store.next_sequence(),
        };

        let verdict = self.assess(&metrics);
        metrics.is_flagged_for_review = verdict.is_high_risk();
        self.store
            .metrics
            .insert(metrics.id.clone(), metrics.clone());
        info!(
            metrics_id = %metrics.id,
            profile_id = %metrics.maternal_profile_id,
            flagged = metrics.is_flagged_for_review,
            "health metrics recorded"
        );

        if let RiskVerdict::HighRisk(findings) = &verdict {
            let alert = alerts::high_risk_alert(
                self.ids.next_id(),
                self.store.next_sequence(),
                &metrics,
                findings,
                &self.config,
                now,
            );
            warn!(
                alert_id = %alert.id,
                profile_id = %alert.maternal_profile_id,
                findings = findings.len(),
                "high-risk metrics, alert raised"
            );
            self.store.alerts.insert(alert.id.clone(), alert);
        }

        Ok(metrics)
    }

    pub fn assess(&self, metrics: &HealthMetrics) -> RiskVerdict {
        risk::assess(metrics, &self.config.thresholds)
    }

    pub fn resolve_alert(
        &mut self,
        id: &str,
        notes: Option<String>,
    ) -> Result<HealthAlert, CareError> {
        let mut alert = self.alert(id)?.clone();
        alerts::resolve(&mut alert, notes, self.clock.now()).map_err(refused)?;

        self.store.alerts.insert(alert.id.clone(), alert.clone());
        info!(alert_id = %alert.id, "health alert resolved");
        Ok(alert)
    }

    pub fn escalate_alert(&mut self, id: &str) -> Result<HealthAlert, CareError> {
        let mut alert = self.alert(id)?.clone();
        alerts::escalate(&mut alert).map_err(refused)?;

        self.store.alerts.insert(alert.id.clone(), alert.clone());
        warn!(
            alert_id = %alert.id,
            level = alert.escalation_level,
            "health alert escalated"
        );
        Ok(alert)
    }

    pub fn schedule_visit(&mut self, input: VisitInput) -> Result<PrenatalVisit, CareError> {
        validation::validate_visit(&input).map_err(rejected)?;
        let scheduled_date = self.stamp_date(&input.scheduled_date, "Invalid scheduled date")?;
        self.profile(&input.maternal_profile_id)?;
        self.active_provider(&input.provider_id)?;

        let visit = PrenatalVisit {
            id: self.ids.next_id(),
            maternal_profile_id: input.maternal_profile_id,
            provider_id: input.provider_id,
            scheduled_date,
            completed: false,
            visit_type: input.visit_type.trim().to_string(),
            findings: String::new(),
            recommendations: String::new(),
            next_visit_date: None,
            prescriptions: Vec::new(),
            follow_up_required: false,
            cancellation_reason: None,
            sequence: self.store.next_sequence(),
        };

        self.store.visits.insert(visit.id.clone(), visit.clone());
        info!(visit_id = %visit.id, profile_id = %visit.maternal_profile_id, "prenatal visit scheduled");
        Ok(visit)
    }

    pub fn complete_visit(
        &mut self,
        id: &str,
        outcome: VisitOutcome,
    ) -> Result<PrenatalVisit, CareError> {
        let mut visit = self.visit(id)?.clone();
        if visit.is_cancelled() {
            return Err(refused(CareError::Precondition(format!(
                "Prenatal visit {id} was cancelled"
            ))));
        }
        if visit.completed {
            return Err(refused(CareError::Precondition(format!(
                "Prenatal visit {id} is already completed"
            ))));
        }
        let next_visit_date = match outcome.next_visit_date.as_deref() {
            Some(text) => Some(self.stamp_date(text, "Invalid next visit date")?),
            None => None,
        };

        visit.completed = true;
        visit.findings = outcome.findings;
        visit.recommendations = outcome.recommendations;
        visit.prescriptions = non_blank(outcome.prescriptions).collect();
        visit.follow_up_required = outcome.follow_up_required;
        visit.next_visit_date = next_visit_date;

        self.store.visits.insert(visit.id.clone(), visit.clone());
        info!(visit_id = %visit.id, "prenatal visit completed");
        Ok(visit)
    }

    pub fn cancel_visit(&mut self, id: &str, reason: &str) -> Result<PrenatalVisit, CareError> {
        let mut visit = self.visit(id)?.clone();
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(rejected(CareError::Validation(
                "Cancellation reason is required".to_string(),
            )));
        }
        if visit.completed {
            return Err(refused(CareError::Precondition(format!(
                "Prenatal visit {id} is already completed"
            ))));
        }
        if visit.is_cancelled() {
            return Err(refused(CareError::Precondition(format!(
                "Prenatal visit {id} was cancelled"
            ))));
        }

        visit.cancellation_reason = Some(reason.to_string());
        self.store.visits.insert(visit.id.clone(), visit.clone());
        info!(visit_id = %visit.id, "prenatal visit cancelled");
        Ok(visit)
    }

    pub fn profile(&self, id: &str) -> Result<&MaternalProfile, CareError> {
        self.store
            .profiles
            .get(id)
            .ok_or_else(|| CareError::not_found(RecordKind::Profile, id))
    }

    pub fn provider(&self, id: &str) -> Result<&HealthcareProvider, CareError> {
        self.store
            .providers
            .get(id)
            .ok_or_else(|| CareError::not_found(RecordKind::Provider, id))
    }

    pub fn metrics(&self, id: &str) -> Result<&HealthMetrics, CareError> {
        self.store
            .metrics
            .get(id)
            .ok_or_else(|| CareError::not_found(RecordKind::Metrics, id))
    }

    pub fn visit(&self, id: &str) -> Result<&PrenatalVisit, CareError> {
        self.store
            .visits
            .get(id)
            .ok_or_else(|| CareError::not_found(RecordKind::Visit, id))
    }

    pub fn alert(&self, id: &str) -> Result<&HealthAlert, CareError> {
        self.store
            .alerts
            .get(id)
            .ok_or_else(|| CareError::not_found(RecordKind::Alert, id))
    }

    /// Oldest first; readings taken at the same instant keep their recording order.
    pub fn metrics_for_profile(&self, profile_id: &str) -> Result<Vec<&HealthMetrics>, CareError> {
        self.profile(profile_id)?;
        let mut records: Vec<&HealthMetrics> = self
            .store
            .metrics
            .values()
            .filter(|m| m.maternal_profile_id == profile_id)
            .collect();
        records.sort_by_key(|m| (m.recorded_at, m.sequence));
        Ok(records)
    }

    /// Oldest first, resolved alerts included.
    pub fn alerts_for_profile(&self, profile_id: &str) -> Result<Vec<&HealthAlert>, CareError> {
        self.profile(profile_id)?;
        let mut records: Vec<&HealthAlert> = self
            .store
            .alerts
            .values()
            .filter(|a| a.maternal_profile_id == profile_id)
            .collect();
        records.sort_by_key(|a| (a.created_at, a.sequence));
        Ok(records)
    }

    /// Highest escalation level first, then oldest.
    pub fn open_alerts(&self) -> Vec<&HealthAlert> {
        let mut records: Vec<&HealthAlert> =
            self.store.alerts.values().filter(|a| a.is_open()).collect();
        records.sort_by(|a, b| {
            b.escalation_level
                .cmp(&a.escalation_level)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.sequence.cmp(&b.sequence))
        });
        records
    }

    /// Ordered by scheduled date.
    pub fn visits_for_profile(&self, profile_id: &str) -> Result<Vec<&PrenatalVisit>, CareError> {
        self.profile(profile_id)?;
        let mut records: Vec<&PrenatalVisit> = self
            .store
            .visits
            .values()
            .filter(|v| v.maternal_profile_id == profile_id)
            .collect();
        records.sort_by_key(|v| (v.scheduled_date, v.sequence));
        Ok(records)
    }

    fn active_provider(&self, id: &str) -> Result<&HealthcareProvider, CareError> {
        let provider = self.provider(id)?;
        if !provider.is_active {
            return Err(refused(CareError::Precondition(format!(
                "Healthcare provider {id} is not active"
            ))));
        }
        Ok(provider)
    }

    fn stamp_date(&self, text: &str, message: &str) -> Result<Timestamp, CareError> {
        parse_date(text)
            .and_then(|date| store_time(&date).ok())
            .ok_or_else(|| rejected(CareError::Validation(message.to_string())))
    }
}

fn internal(err: CareError) -> CareError {
    if let CareError::Internal(detail) = &err {
        error!(%detail, "internal error");
    }
    err
}

fn rejected(err: CareError) -> CareError {
    debug!(reason = %err, "input rejected");
    err
}

fn refused(err: CareError) -> CareError {
    warn!(reason = %err, "operation refused");
    err
}

fn non_blank(entries: Vec<String>) -> impl Iterator<Item = String> {
    entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
}
