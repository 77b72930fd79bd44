mod common;

use std::fs;

use common::*;
use maternal_care::MaternalCare;
use maternal_core::{display_time, CareConfig, CareError};
use serde_json::Value;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn run_scenario() -> TestCare {
    let mut care = care();
    let provider = register_provider(&mut care);
    let profile = create_profile(&mut care, &provider.id);

    care.clock().advance(MINUTE);
    care.record_metrics(reading(&profile.id, &provider.id, 150.0, 95.0, 95.0, 12.0))
        .expect("Không ghi được chỉ số");

    care.clock().advance(30 * MINUTE);
    let alert_id = care.open_alerts()[0].id.clone();
    care.resolve_alert(&alert_id, Some("reviewed, stable".to_string()))
        .expect("Không xử lý được cảnh báo");

    care
}

#[test]
fn scenario_store_matches_golden() {
    let care = run_scenario();

    let snapshot = care.snapshot().expect("Không serialize store");
    let actual: Value = serde_json::from_str(&snapshot).expect("Snapshot không hợp lệ");

    let expected = fs::read_to_string(fixture_path("prenatal_store_snapshot.json"))
        .expect("Không đọc được golden snapshot");
    let expected_value: Value = serde_json::from_str(&expected).expect("Golden không hợp lệ");

    assert_eq!(actual, expected_value);
}

#[test]
fn snapshot_restores_identical_store() {
    let care = run_scenario();
    let snapshot = care.snapshot().expect("Không serialize store");

    let restored = MaternalCare::restore(
        &snapshot,
        CareConfig::default(),
        ManualClock::at(START),
        SequentialIds::default(),
    )
    .expect("Không khôi phục được store");

    assert_eq!(restored.store(), care.store());
}

#[test]
fn stored_timestamps_render_as_iso_strings() {
    let care = run_scenario();
    let alert = care.alert("id-4").expect("có một cảnh báo");

    assert_eq!(
        display_time(alert.created_at).expect("Không hiển thị được thời gian"),
        "2025-01-15T08:01:00.000Z"
    );
    assert_eq!(
        display_time(alert.resolved_at.expect("đã xử lý")).expect("Không hiển thị được thời gian"),
        "2025-01-15T08:31:00.000Z"
    );
}

fn restore_edited(edit: impl FnOnce(&mut Value)) -> Result<TestCare, CareError> {
    let snapshot = run_scenario().snapshot().expect("Không serialize store");
    let mut value: Value = serde_json::from_str(&snapshot).expect("Snapshot không hợp lệ");
    edit(&mut value);
    MaternalCare::restore(
        &value.to_string(),
        CareConfig::default(),
        ManualClock::at(START),
        SequentialIds::default(),
    )
}

fn assert_corrupt(result: Result<TestCare, CareError>, detail: &str) {
    match result {
        Err(CareError::Internal(message)) => {
            assert_eq!(message, format!("corrupt snapshot: {detail}"))
        }
        Err(other) => panic!("expected an internal error, got {other:?}"),
        Ok(_) => panic!("corrupt snapshot was restored"),
    }
}

#[test]
fn restore_rejects_escalation_level_outside_range() {
    for level in [0, 9] {
        let result = restore_edited(|value| {
            value["alerts"]["id-4"]["escalation_level"] = Value::from(level);
        });
        assert_corrupt(result, &format!("alert id-4 has escalation level {level}"));
    }
}

#[test]
fn restore_rejects_resolution_time_on_open_alert() {
    let result = restore_edited(|value| {
        value["alerts"]["id-4"]["is_resolved"] = Value::Bool(false);
    });
    assert_corrupt(
        result,
        "alert id-4 resolution time does not match its resolved flag",
    );
}

#[test]
fn restore_rejects_out_of_range_measurement() {
    let result = restore_edited(|value| {
        value["metrics"]["id-3"]["systolic_bp"] = Value::from(400.0);
    });
    assert_corrupt(
        result,
        "metrics id-3: Systolic blood pressure must be between 70 and 190",
    );
}

#[test]
fn restore_rejects_sequence_beyond_counter() {
    let result = restore_edited(|value| {
        value["last_sequence"] = Value::from(1);
    });
    assert_corrupt(result, "alert id-4 has sequence 2 outside 1..=1");
}

#[test]
fn restored_store_continues_numbering() {
    let mut restored = restore_edited(|_| {}).expect("Không khôi phục được store");
    let provider_id = "id-1";
    let profile_id = "id-2";

    restored.clock().set(START + 40 * MINUTE);
    let metrics = restored
        .record_metrics(reading(profile_id, provider_id, 120.0, 80.0, 95.0, 12.0))
        .expect("chỉ số hợp lệ");

    assert_eq!(metrics.sequence, 3);
    assert_eq!(restored.store().last_sequence, 3);
}
