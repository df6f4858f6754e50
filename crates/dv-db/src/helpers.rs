//! Conversions between libSQL values and the JSON values entities carry.
//!
//! Review flags are stored as INTEGER 0/1 (`use` may be NULL). Pipeline
//! exports occasionally carry them as text, so reads accept `"true"`/`"false"`
//! and `"1"`/`"0"` too.

use dv_core::entity::Entity;
use dv_core::tables::{EntityTable, FLAG_COLUMNS, PRIMARY_KEY};

use crate::error::DatabaseError;

/// Quote an identifier for interpolation into SQL.
///
/// Only registry names reach this function, but `"when"` and `"timestamp"`
/// are keywords and must be quoted regardless.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column list in the order [`entity_from_row`] expects:
/// `id`, `use`, `blocked`, `reason`, then the table's data columns.
#[must_use]
pub fn select_columns(table: EntityTable) -> String {
    std::iter::once(PRIMARY_KEY)
        .chain(FLAG_COLUMNS)
        .chain(table.spec().column_names())
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether `column` exists on `table`: key, flag, or data column.
#[must_use]
pub fn has_column(table: EntityTable, column: &str) -> bool {
    column == PRIMARY_KEY
        || FLAG_COLUMNS.contains(&column)
        || table.spec().field(column).is_some()
}

/// Interpret a stored flag. `None` means unset.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for values that are not a recognizable
/// boolean.
pub fn flag_from_sql(value: &libsql::Value) -> Result<Option<bool>, DatabaseError> {
    match value {
        libsql::Value::Null => Ok(None),
        libsql::Value::Integer(n) => Ok(Some(*n != 0)),
        libsql::Value::Real(f) => Ok(Some(f.abs() > f64::EPSILON)),
        libsql::Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" => Ok(Some(true)),
            "0" | "false" => Ok(Some(false)),
            other => Err(DatabaseError::Query(format!("Not a flag value: '{other}'"))),
        },
        libsql::Value::Blob(_) => Err(DatabaseError::Query("Flag stored as BLOB".into())),
    }
}

/// Convert a stored value to JSON.
#[must_use]
pub fn sql_to_json(value: libsql::Value) -> serde_json::Value {
    match value {
        libsql::Value::Null => serde_json::Value::Null,
        libsql::Value::Integer(n) => serde_json::Value::from(n),
        libsql::Value::Real(f) => serde_json::Number::from_f64(f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        libsql::Value::Text(s) => serde_json::Value::String(s),
        libsql::Value::Blob(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Convert a JSON value to what gets stored. Booleans become 0/1; arrays and
/// objects are stored as their JSON text.
#[must_use]
pub fn json_to_sql(value: &serde_json::Value) -> libsql::Value {
    match value {
        serde_json::Value::Null => libsql::Value::Null,
        serde_json::Value::Bool(b) => libsql::Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => n.as_i64().map_or_else(
            || libsql::Value::Real(n.as_f64().unwrap_or(f64::NAN)),
            libsql::Value::Integer,
        ),
        serde_json::Value::String(s) => libsql::Value::Text(s.clone()),
        other => libsql::Value::Text(other.to_string()),
    }
}

/// Build an [`Entity`] from a row selected with [`select_columns`].
///
/// # Errors
///
/// Returns `DatabaseError` if a column cannot be read or a flag is not a
/// boolean.
pub fn entity_from_row(table: EntityTable, row: &libsql::Row) -> Result<Entity, DatabaseError> {
    let id = row.get::<i64>(0)?;
    let mut entity = Entity::new(table, id);
    entity.use_flag = flag_from_sql(&row.get_value(1)?)?;
    entity.blocked = flag_from_sql(&row.get_value(2)?)?.unwrap_or(false);
    entity.reason = match row.get_value(3)? {
        libsql::Value::Text(s) if !s.is_empty() => Some(s),
        _ => None,
    };

    for (offset, column) in (4..).zip(table.spec().column_names()) {
        entity
            .fields
            .insert(column.to_string(), sql_to_json(row.get_value(offset)?));
    }
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn keywords_are_quoted() {
        assert_eq!(quote_ident("when"), "\"when\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(
            select_columns(EntityTable::Timestamp),
            r#""id", "use", "blocked", "reason", "when", "normalized_datetime""#
        );
    }

    #[rstest]
    #[case(libsql::Value::Null, None)]
    #[case(libsql::Value::Integer(1), Some(true))]
    #[case(libsql::Value::Integer(0), Some(false))]
    #[case(libsql::Value::Text("True".into()), Some(true))]
    #[case(libsql::Value::Text("0".into()), Some(false))]
    #[case(libsql::Value::Text(String::new()), None)]
    fn flags_accept_integer_and_text(#[case] stored: libsql::Value, #[case] expected: Option<bool>) {
        assert_eq!(flag_from_sql(&stored).unwrap(), expected);
    }

    #[test]
    fn unrecognized_flag_text_is_an_error() {
        assert!(flag_from_sql(&libsql::Value::Text("maybe".into())).is_err());
    }

    #[test]
    fn json_values_map_to_storage_types() {
        assert!(matches!(json_to_sql(&json!(true)), libsql::Value::Integer(1)));
        assert!(matches!(json_to_sql(&json!(null)), libsql::Value::Null));
        assert!(matches!(json_to_sql(&json!(7)), libsql::Value::Integer(7)));
        assert!(matches!(json_to_sql(&json!(0.5)), libsql::Value::Real(f) if (f - 0.5).abs() < f64::EPSILON));
        assert!(matches!(json_to_sql(&json!("x")), libsql::Value::Text(s) if s == "x"));
    }

    #[test]
    fn column_membership() {
        assert!(has_column(EntityTable::Timestamp, "use"));
        assert!(has_column(EntityTable::Timestamp, "normalized_datetime"));
        assert!(!has_column(EntityTable::Timestamp, "name"));
    }
}
