//! End-to-end validation of reviewer submissions and schema checks on the
//! accepted log-line shape.

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use schemars::schema_for;
use serde_json::json;

use dv_core::edit::{Edit, EditAction, NormalizedEdit};
use dv_core::errors::ValidationFailure;
use dv_core::tables::EntityTable;
use dv_core::validate::validate;

fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

fn snapshot() -> HashSet<(EntityTable, i64)> {
    HashSet::from([
        (EntityTable::Timestamp, 789),
        (EntityTable::Location, 12),
        (EntityTable::SplitLocationMatch, 40),
        (EntityTable::Event, 3),
    ])
}

#[test]
fn accepted_edits_match_the_log_schema() {
    let accepted_at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 12, 44).unwrap();
    let submissions = [
        json!({"table": "timestamp", "id": 789, "action": "correct_field",
               "field": "normalized_datetime", "new_value": "1895-03-15T14:00:00",
               "reason": "off by one day"}),
        json!({"table": "location", "id": 12, "action": "correct_field",
               "field": "country", "new_value": null}),
        json!({"table": "splitlocationmatch", "id": 40, "action": "mark_unusable",
               "reason": "wrong parish", "reviewer": "kh"}),
        json!({"table": "event", "id": 3, "action": "mark_blocked",
               "reason": "needs the original newspaper"}),
        json!({"table": "event", "id": 3, "action": "report",
               "description": "excerpt is truncated"}),
        json!({"table": "location", "id": 12, "action": "mark_valid"}),
    ];

    let schema = serde_json::to_value(schema_for!(NormalizedEdit)).unwrap();
    for raw in &submissions {
        let edit = validate(raw, &snapshot(), accepted_at).unwrap();
        let line = serde_json::to_value(&edit).unwrap();
        let errors = validate_against_schema(&schema, &line);
        assert!(errors.is_empty(), "{raw}: {errors:?}");

        let back: NormalizedEdit = serde_json::from_value(line).unwrap();
        assert_eq!(back, edit);
    }
}

#[test]
fn correction_sets_only_the_named_field() {
    let accepted_at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 12, 44).unwrap();
    let edit = validate(
        &json!({"table": "timestamp", "id": 789, "action": "correct_field",
                "field": "normalized_datetime", "new_value": "1895-03-15T14:00:00",
                "reason": "off by one day"}),
        &snapshot(),
        accepted_at,
    )
    .unwrap();

    let changes = edit.record.edit.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes["normalized_datetime"], json!("1895-03-15T14:00:00"));
    assert!(!changes.contains_key("use"));
    assert!(!changes.contains_key("blocked"));
}

#[test]
fn rejections_carry_one_failure_each() {
    let accepted_at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 12, 44).unwrap();
    let cases = [
        (json!({"table": "timestamp", "id": 9999, "action": "correct_field",
                "field": "normalized_datetime", "new_value": "1895-03-15T14:00:00",
                "reason": "off by one day"}), "entity_not_found"),
        (json!({"table": "timestamps", "id": 789, "action": "mark_valid"}), "unknown_table"),
        (json!({"table": "event", "id": 3, "action": "correct_field",
                "field": "excerpt", "new_value": "x"}), "ineligible_field"),
        (json!({"table": "timestamp", "id": 789, "action": "correct_field",
                "field": "normalized_datetime", "new_value": "15 March 1895"}), "type_mismatch"),
        (json!({"table": "location", "id": 12, "action": "mark_unusable",
                "reason": "EDIT THIS: Describe why this should be removed"}), "missing_reason"),
        (json!("mark it valid"), "malformed_record"),
    ];

    let schema = serde_json::to_value(schema_for!(ValidationFailure)).unwrap();
    for (raw, kind) in cases {
        let failure = validate(&raw, &snapshot(), accepted_at).unwrap_err();
        assert_eq!(failure.kind(), kind, "{raw}");
        let errors = validate_against_schema(&schema, &serde_json::to_value(&failure).unwrap());
        assert!(errors.is_empty(), "{kind}: {errors:?}");
    }
}

#[test]
fn report_is_stored_under_description() {
    let accepted_at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 12, 44).unwrap();
    let edit = validate(
        &json!({"table": "event", "id": 3, "action": "report", "reason": "duplicate of 4"}),
        &snapshot(),
        accepted_at,
    )
    .unwrap();
    assert_eq!(edit.action(), EditAction::Report);
    assert_eq!(
        edit.record.edit,
        Edit::Report {
            description: "duplicate of 4".into()
        }
    );
    let line = serde_json::to_value(&edit).unwrap();
    assert_eq!(line["description"], json!("duplicate of 4"));
    assert!(line.get("reason").is_none());
}
