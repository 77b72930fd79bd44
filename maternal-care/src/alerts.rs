//! Alert lifecycle: Open -> Resolved, with escalation while open.

use maternal_core::{CareConfig, CareError, HealthAlert, HealthMetrics, RiskLevel, Timestamp};

use crate::risk::RiskFinding;

/// Builds the alert for a high-risk metrics record. New alerts are always
/// severity HIGH, open, at escalation level 1.
pub fn high_risk_alert(
    id: String,
    sequence: u64,
    metrics: &HealthMetrics,
    findings: &[RiskFinding],
    config: &CareConfig,
    created_at: Timestamp,
) -> HealthAlert {
    HealthAlert {
        id,
        maternal_profile_id: metrics.maternal_profile_id.clone(),
        created_at,
        severity: RiskLevel::High,
        description: describe(findings),
        recommended_action: config.recommended_action.clone(),
        is_resolved: false,
        resolved_at: None,
        provider_id: metrics.recorded_by.clone(),
        resolution_notes: None,
        escalation_level: 1,
        sequence,
    }
}

/// Resolved is terminal; resolving twice is rejected and leaves the alert as is.
pub fn resolve(
    alert: &mut HealthAlert,
    notes: Option<String>,
    now: Timestamp,
) -> Result<(), CareError> {
    if alert.is_resolved {
        return Err(CareError::Precondition(format!(
            "Health alert {} is already resolved",
            alert.id
        )));
    }

    alert.is_resolved = true;
    alert.resolved_at = Some(now);
    alert.resolution_notes = notes
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());
    Ok(())
}

pub fn escalate(alert: &mut HealthAlert) -> Result<(), CareError> {
    if alert.is_resolved {
        return Err(CareError::Precondition(format!(
            "Health alert {} is already resolved",
            alert.id
        )));
    }
    if alert.escalation_level >= HealthAlert::MAX_ESCALATION_LEVEL {
        return Err(CareError::Precondition(format!(
            "Health alert {} is already at the maximum escalation level",
            alert.id
        )));
    }

    alert.escalation_level += 1;
    Ok(())
}

fn describe(findings: &[RiskFinding]) -> String {
    if findings.is_empty() {
        return "High-risk health metrics detected".to_string();
    }
    let details = findings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("High-risk health metrics detected: {details}")
}
