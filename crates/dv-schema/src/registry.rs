//! Named schemas for every JSON shape dataview reads or writes.

use std::collections::HashMap;

use schemars::schema_for;

use crate::error::SchemaError;

/// Schema name of one persisted edit-log line.
pub const LOG_LINE: &str = "normalized_edit";

/// Central store of dataview's JSON Schemas, keyed by snake-case name.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, serde_json::Value::from(schema_for!($ty)));
    };
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // Edit model
        register!(schemas, LOG_LINE, dv_core::edit::NormalizedEdit);
        register!(schemas, "edit_record", dv_core::edit::EditRecord);
        register!(schemas, "validation_failure", dv_core::errors::ValidationFailure);

        // Entities
        register!(schemas, "entity", dv_core::entity::Entity);
        register!(schemas, "status_counts", dv_core::status::StatusCounts);

        // CLI responses
        register!(schemas, "submit_response", dv_core::responses::SubmitResponse);
        register!(schemas, "apply_report", dv_core::responses::ApplyReport);
        register!(schemas, "status_response", dv_core::responses::StatusResponse);
        register!(schemas, "list_response", dv_core::responses::ListResponse);
        register!(schemas, "links_response", dv_core::responses::LinksResponse);

        Self { schemas }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` with every validator message.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator =
            jsonschema::validator_for(schema).map_err(|e| SchemaError::Compile(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// All registered schema names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dv_core::edit::{Edit, EditRecord, NormalizedEdit};
    use dv_core::tables::EntityTable;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn registry_has_expected_count() {
        assert_eq!(SchemaRegistry::new().schema_count(), 10);
    }

    #[test]
    fn list_is_sorted() {
        let names = SchemaRegistry::new().list();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&LOG_LINE));
    }

    #[test]
    fn every_schema_compiles() {
        let reg = SchemaRegistry::new();
        for name in reg.list() {
            let schema = reg.get(name).unwrap();
            assert!(
                jsonschema::validator_for(schema).is_ok(),
                "{name} does not compile"
            );
        }
    }

    #[test]
    fn log_line_validates() {
        let edit = NormalizedEdit {
            record: EditRecord {
                table: EntityTable::Actor,
                id: 8,
                edit: Edit::MarkUnusable {
                    reason: "duplicate of 7".into(),
                },
                reviewer: Some("kh".into()),
            },
            submitted_at: Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap(),
        };
        let reg = SchemaRegistry::new();
        assert!(reg.validate(LOG_LINE, &serde_json::to_value(&edit).unwrap()).is_ok());
    }

    #[test]
    fn log_line_without_timestamp_fails() {
        let reg = SchemaRegistry::new();
        let line = json!({"table": "actor", "id": 8, "action": "mark_valid"});
        let err = reg.validate(LOG_LINE, &line).unwrap_err();
        assert!(matches!(err, SchemaError::ValidationFailed { .. }));
    }

    #[test]
    fn unknown_table_fails() {
        let reg = SchemaRegistry::new();
        let line = json!({
            "table": "article", "id": 8, "action": "mark_valid",
            "submitted_at": "2026-10-16T08:00:00Z"
        });
        assert!(reg.validate(LOG_LINE, &line).is_err());
    }

    #[test]
    fn links_response_carries_related_rows() {
        use dv_core::entity::Entity;
        use dv_core::navigation::RecordNav;
        use dv_core::responses::{LinksResponse, ListRow, RelatedRows, RelationDirection};
        use dv_core::status::EntityStatus;

        let alias = Entity::new(EntityTable::ActorAlias, 1).with_field("alias", json!("Orator Hunt"));
        let response = LinksResponse {
            table: EntityTable::AuthoritativeActor,
            id: 8,
            page_path: "/authoritativeactor/8/".into(),
            status: EntityStatus::Unknown,
            navigation: RecordNav::for_position(&[8], 0).unwrap(),
            links: Vec::new(),
            related: vec![RelatedRows {
                table: EntityTable::ActorAlias,
                via: "authoritative_actor_id".into(),
                direction: RelationDirection::ReferencedBy,
                rows: vec![ListRow::from_entity(&alias)],
            }],
        };
        let reg = SchemaRegistry::new();
        let mut value = serde_json::to_value(&response).unwrap();
        assert!(reg.validate("links_response", &value).is_ok());

        value["related"][0]["direction"] = json!("sideways");
        assert!(reg.validate("links_response", &value).is_err());
    }

    #[test]
    fn unknown_schema_name() {
        let err = SchemaRegistry::new().validate("finding", &json!({})).unwrap_err();
        assert!(matches!(err, SchemaError::NotFound(name) if name == "finding"));
    }
}
