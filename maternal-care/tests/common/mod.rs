#![allow(dead_code)]

use std::cell::Cell;

use maternal_care::{Clock, IdGenerator, MaternalCare, RecordStore};
use maternal_core::{
    parse_date, store_time, CareConfig, HealthcareProvider, MaternalProfile, MetricsInput,
    ProfileInput, ProviderInput, Timestamp, NANOS_PER_MILLI,
};

/// 2025-01-15T08:00:00Z
pub const START: Timestamp = 1_736_928_000_000 * NANOS_PER_MILLI;
pub const MINUTE: Timestamp = 60_000 * NANOS_PER_MILLI;

/// Starts at [`START`] and only moves when told to.
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, by: Timestamp) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Hands out `id-1`, `id-2`, ...
#[derive(Default)]
pub struct SequentialIds {
    next: Cell<u64>,
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let value = self.next.get() + 1;
        self.next.set(value);
        format!("id-{value}")
    }
}

pub type TestCare = MaternalCare<ManualClock, SequentialIds>;

pub fn care() -> TestCare {
    MaternalCare::with_parts(
        RecordStore::new(),
        CareConfig::default(),
        ManualClock::at(START),
        SequentialIds::default(),
    )
}

pub fn timestamp(text: &str) -> Timestamp {
    let date = parse_date(text).expect("không đọc được ngày");
    store_time(&date).expect("không lưu được ngày")
}

pub fn provider_input(name: &str) -> ProviderInput {
    ProviderInput {
        name: name.to_string(),
        specialization: "Obstetrics".to_string(),
        license_number: "OB-20931".to_string(),
        contact_info: "obstetrics@stmary.example".to_string(),
        facility_id: "st-mary".to_string(),
        ..ProviderInput::default()
    }
}

pub fn register_provider(care: &mut TestCare) -> HealthcareProvider {
    care.register_provider(provider_input("Dr. Amara Obi"))
        .expect("provider hợp lệ")
}

pub fn profile_input(provider_id: &str) -> ProfileInput {
    ProfileInput {
        name: "Jane Doe".to_string(),
        age: 28,
        blood_type: "O+".to_string(),
        emergency_contact: "John Doe +1 555 0100".to_string(),
        due_date: "2025-07-20".to_string(),
        primary_care_provider_id: provider_id.to_string(),
        medical_history: vec!["Gestational diabetes (2021)".to_string()],
        allergies: vec!["Penicillin".to_string()],
        is_high_risk: false,
    }
}

pub fn create_profile(care: &mut TestCare, provider_id: &str) -> MaternalProfile {
    care.create_profile(profile_input(provider_id))
        .expect("profile hợp lệ")
}

pub fn reading(
    profile_id: &str,
    provider_id: &str,
    systolic: f64,
    diastolic: f64,
    sugar: f64,
    hemoglobin: f64,
) -> MetricsInput {
    MetricsInput {
        maternal_profile_id: profile_id.to_string(),
        weight: Some(68.5),
        systolic_bp: Some(systolic),
        diastolic_bp: Some(diastolic),
        blood_sugar: Some(sugar),
        hemoglobin_level: Some(hemoglobin),
        fetal_heart_rate: Some(142.0),
        notes: String::new(),
        recorded_by: provider_id.to_string(),
    }
}
