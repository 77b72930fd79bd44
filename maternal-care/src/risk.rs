//! Threshold-based risk assessment for a single metrics record.

use std::fmt;

use maternal_core::{HealthMetrics, RiskThresholds};
use serde::Serialize;

/// One measurement that crossed its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RiskFinding {
    ElevatedSystolic(f64),
    ElevatedDiastolic(f64),
    ElevatedBloodSugar(f64),
    LowHemoglobin(f64),
}

impl fmt::Display for RiskFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFinding::ElevatedSystolic(v) => {
                write!(f, "systolic blood pressure {} mmHg", format_numeric(*v))
            }
            RiskFinding::ElevatedDiastolic(v) => {
                write!(f, "diastolic blood pressure {} mmHg", format_numeric(*v))
            }
            RiskFinding::ElevatedBloodSugar(v) => {
                write!(f, "blood sugar {} mg/dL", format_numeric(*v))
            }
            RiskFinding::LowHemoglobin(v) => {
                write!(f, "hemoglobin {} g/dL", format_numeric(*v))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiskVerdict {
    Normal,
    /// Never empty.
    HighRisk(Vec<RiskFinding>),
}

impl RiskVerdict {
    pub fn is_high_risk(&self) -> bool {
        matches!(self, RiskVerdict::HighRisk(_))
    }

    pub fn findings(&self) -> &[RiskFinding] {
        match self {
            RiskVerdict::Normal => &[],
            RiskVerdict::HighRisk(findings) => findings,
        }
    }
}

/// Any single breach is enough for a high-risk verdict. Absent values never breach.
pub fn assess(metrics: &HealthMetrics, thresholds: &RiskThresholds) -> RiskVerdict {
    let mut findings = Vec::new();

    if let Some(v) = metrics.systolic_bp {
        if v >= thresholds.systolic_at_or_above {
            findings.push(RiskFinding::ElevatedSystolic(v));
        }
    }

    if let Some(v) = metrics.diastolic_bp {
        if v >= thresholds.diastolic_at_or_above {
            findings.push(RiskFinding::ElevatedDiastolic(v));
        }
    }

    if let Some(v) = metrics.blood_sugar {
        if v > thresholds.blood_sugar_above {
            findings.push(RiskFinding::ElevatedBloodSugar(v));
        }
    }

    if let Some(v) = metrics.hemoglobin_level {
        if v < thresholds.hemoglobin_below {
            findings.push(RiskFinding::LowHemoglobin(v));
        }
    }

    if findings.is_empty() {
        RiskVerdict::Normal
    } else {
        RiskVerdict::HighRisk(findings)
    }
}

fn format_numeric(value: f64) -> String {
    if (value.fract() - 0.0).abs() < f64::EPSILON {
        format!("{value:.0}")
    } else if (value * 10.0).fract().abs() < f64::EPSILON {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
