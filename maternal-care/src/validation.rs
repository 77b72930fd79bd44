//! Input checks run before anything touches the store.
//!
//! Each rule returns the first violation it finds; the order of checks is
//! fixed so the same input always yields the same message.

use std::ops::RangeInclusive;

use maternal_core::{
    parse_date, store_time, BloodType, CareError, HealthMetrics, MetricsInput, ProfileInput,
    ProviderInput, VisitInput,
};

const NAME_LENGTH: RangeInclusive<usize> = 2..=100;
const AGE: RangeInclusive<u32> = 16..=60;

const SYSTOLIC_BP: RangeInclusive<f64> = 70.0..=190.0;
const DIASTOLIC_BP: RangeInclusive<f64> = 40.0..=120.0;
const BLOOD_SUGAR: RangeInclusive<f64> = 30.0..=500.0;
const HEMOGLOBIN: RangeInclusive<f64> = 3.0..=25.0;
const WEIGHT: RangeInclusive<f64> = 30.0..=300.0;
const FETAL_HEART_RATE: RangeInclusive<f64> = 50.0..=240.0;

/// Name, age, blood type, due date, emergency contact.
pub fn validate_profile(input: &ProfileInput) -> Result<(), CareError> {
    validate_name(&input.name)?;

    if !AGE.contains(&input.age) {
        return Err(invalid(format!(
            "Age must be between {} and {}",
            AGE.start(),
            AGE.end()
        )));
    }

    input.blood_type.parse::<BloodType>()?;

    validate_date(&input.due_date, "Invalid due date")?;
    validate_emergency_contact(&input.emergency_contact)
}

/// Only fields that are present are checked.
pub fn validate_metrics(input: &MetricsInput) -> Result<(), CareError> {
    check_measurements([
        input.systolic_bp,
        input.diastolic_bp,
        input.blood_sugar,
        input.hemoglobin_level,
        input.weight,
        input.fetal_heart_rate,
    ])
}

/// Same ranges as [`validate_metrics`], applied to a record read back from a snapshot.
pub(crate) fn validate_stored_metrics(metrics: &HealthMetrics) -> Result<(), CareError> {
    check_measurements([
        metrics.systolic_bp,
        metrics.diastolic_bp,
        metrics.blood_sugar,
        metrics.hemoglobin_level,
        metrics.weight,
        metrics.fetal_heart_rate,
    ])
}

pub(crate) fn validate_emergency_contact(contact: &str) -> Result<(), CareError> {
    if contact.trim().is_empty() {
        return Err(invalid("Emergency contact must not be empty"));
    }
    Ok(())
}

pub fn validate_provider(input: &ProviderInput) -> Result<(), CareError> {
    validate_name(&input.name)?;
    if input.license_number.trim().is_empty() {
        return Err(invalid("License number is required"));
    }
    Ok(())
}

pub fn validate_visit(input: &VisitInput) -> Result<(), CareError> {
    if input.visit_type.trim().is_empty() {
        return Err(invalid("Visit type is required"));
    }
    validate_date(&input.scheduled_date, "Invalid scheduled date")
}

fn validate_name(name: &str) -> Result<(), CareError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("Name is required"));
    }
    if !NAME_LENGTH.contains(&trimmed.chars().count()) {
        return Err(invalid(format!(
            "Name must be between {} and {} characters",
            NAME_LENGTH.start(),
            NAME_LENGTH.end()
        )));
    }
    Ok(())
}

/// The date must parse and fit the stored nanosecond representation.
pub(crate) fn validate_date(value: &str, message: &str) -> Result<(), CareError> {
    match parse_date(value) {
        Some(date) if store_time(&date).is_ok() => Ok(()),
        _ => Err(invalid(message)),
    }
}

/// Systolic, diastolic, blood sugar, hemoglobin, weight, fetal heart rate.
fn check_measurements(values: [Option<f64>; 6]) -> Result<(), CareError> {
    let [systolic, diastolic, sugar, hemoglobin, weight, fetal_heart_rate] = values;
    check_range(systolic, &SYSTOLIC_BP, "Systolic blood pressure")?;
    check_range(diastolic, &DIASTOLIC_BP, "Diastolic blood pressure")?;
    check_range(sugar, &BLOOD_SUGAR, "Blood sugar")?;
    check_range(hemoglobin, &HEMOGLOBIN, "Hemoglobin level")?;
    check_range(weight, &WEIGHT, "Weight")?;
    check_range(fetal_heart_rate, &FETAL_HEART_RATE, "Fetal heart rate")
}

fn check_range(
    value: Option<f64>,
    range: &RangeInclusive<f64>,
    label: &str,
) -> Result<(), CareError> {
    match value {
        Some(v) if !range.contains(&v) => Err(invalid(format!(
            "{label} must be between {} and {}",
            range.start(),
            range.end()
        ))),
        _ => Ok(()),
    }
}

fn invalid(message: impl Into<String>) -> CareError {
    CareError::Validation(message.into())
}
