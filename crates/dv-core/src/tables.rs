//! Static registry of reviewable tables.
//!
//! Every table the pipeline produces is listed here with its data columns,
//! their declared types, and whether a reviewer may overwrite them through a
//! `correct_field` edit. The registry is closed: a table or column that is not
//! listed here does not exist as far as review is concerned.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::errors::ValidationFailure;

/// Primary key column shared by every table.
pub const PRIMARY_KEY: &str = "id";

/// Review flag columns. Only changed through `mark_*` actions.
pub const FLAG_COLUMNS: [&str; 3] = ["use", "blocked", "reason"];

// ---------------------------------------------------------------------------
// EntityTable
// ---------------------------------------------------------------------------

/// One of the fixed set of pipeline output tables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityTable {
    Event,
    Location,
    SplitLocation,
    Actor,
    SplitActor,
    Timestamp,
    MeetingType,
    AuthoritativeEvent,
    EventMatch,
    AuthoritativeLocation,
    SplitLocationMatch,
    AuthoritativeActor,
    ActorAlias,
    SplitActorMatch,
    AuthoritativeMeetingType,
    MeetingTypeMatch,
    AuthoritativeEventActor,
}

impl EntityTable {
    /// Every table, in page-generation order.
    pub const ALL: [Self; 17] = [
        Self::Event,
        Self::Location,
        Self::SplitLocation,
        Self::Actor,
        Self::SplitActor,
        Self::Timestamp,
        Self::MeetingType,
        Self::AuthoritativeEvent,
        Self::EventMatch,
        Self::AuthoritativeLocation,
        Self::SplitLocationMatch,
        Self::AuthoritativeActor,
        Self::ActorAlias,
        Self::SplitActorMatch,
        Self::AuthoritativeMeetingType,
        Self::MeetingTypeMatch,
        Self::AuthoritativeEventActor,
    ];

    /// Table name as used in SQL, submissions, and page paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Location => "location",
            Self::SplitLocation => "splitlocation",
            Self::Actor => "actor",
            Self::SplitActor => "splitactor",
            Self::Timestamp => "timestamp",
            Self::MeetingType => "meetingtype",
            Self::AuthoritativeEvent => "authoritativeevent",
            Self::EventMatch => "eventmatch",
            Self::AuthoritativeLocation => "authoritativelocation",
            Self::SplitLocationMatch => "splitlocationmatch",
            Self::AuthoritativeActor => "authoritativeactor",
            Self::ActorAlias => "actoralias",
            Self::SplitActorMatch => "splitactormatch",
            Self::AuthoritativeMeetingType => "authoritativemeetingtype",
            Self::MeetingTypeMatch => "meetingtypematch",
            Self::AuthoritativeEventActor => "authoritativeeventactor",
        }
    }

    /// Look a table up by name. Returns `None` for names outside the registry.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|table| table.as_str() == name)
    }

    /// Static column description for this table.
    #[must_use]
    pub const fn spec(self) -> &'static TableSpec {
        match self {
            Self::Event => &EVENT,
            Self::Location => &LOCATION,
            Self::SplitLocation => &SPLIT_LOCATION,
            Self::Actor => &ACTOR,
            Self::SplitActor => &SPLIT_ACTOR,
            Self::Timestamp => &TIMESTAMP,
            Self::MeetingType => &MEETING_TYPE,
            Self::AuthoritativeEvent => &AUTHORITATIVE_EVENT,
            Self::EventMatch => &EVENT_MATCH,
            Self::AuthoritativeLocation => &AUTHORITATIVE_LOCATION,
            Self::SplitLocationMatch => &SPLIT_LOCATION_MATCH,
            Self::AuthoritativeActor => &AUTHORITATIVE_ACTOR,
            Self::ActorAlias => &ACTOR_ALIAS,
            Self::SplitActorMatch => &SPLIT_ACTOR_MATCH,
            Self::AuthoritativeMeetingType => &AUTHORITATIVE_MEETING_TYPE,
            Self::MeetingTypeMatch => &MEETING_TYPE_MATCH,
            Self::AuthoritativeEventActor => &AUTHORITATIVE_EVENT_ACTOR,
        }
    }
}

impl EntityTable {
    /// Foreign keys declared on this table.
    pub fn references(self) -> impl Iterator<Item = &'static Relation> {
        RELATIONS.iter().filter(move |relation| relation.table == self)
    }

    /// Foreign keys on other tables that point at this one.
    pub fn referenced_by(self) -> impl Iterator<Item = &'static Relation> {
        RELATIONS.iter().filter(move |relation| relation.target == self)
    }

    /// Tables too large to list whole are listed only where this relation
    /// points at a row.
    #[must_use]
    pub fn listing_filter(self) -> Option<&'static Relation> {
        match self {
            Self::AuthoritativeLocation => Relation::find(
                Self::SplitLocationMatch,
                "authoritative_location_id",
            ),
            _ => None,
        }
    }
}

impl fmt::Display for EntityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityTable {
    type Err = ValidationFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ValidationFailure::UnknownTable {
            table: s.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// Declared type of a data column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Real,
    /// ISO-8601 datetime, stored as the literal text the reviewer supplied.
    DateTime,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::DateTime => "datetime",
        }
    }

    /// Whether a non-null JSON value is acceptable for this type.
    #[must_use]
    pub fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Real => value.is_number(),
            Self::DateTime => value.as_str().is_some_and(is_iso8601),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts RFC 3339 (with offset), `YYYY-MM-DDTHH:MM:SS[.fff]`, and `YYYY-MM-DD`.
#[must_use]
pub fn is_iso8601(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Short JSON type name used in type-mismatch messages.
#[must_use]
pub const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// FieldSpec / TableSpec
// ---------------------------------------------------------------------------

/// One data column of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
    /// Whether `correct_field` may overwrite this column.
    pub correctable: bool,
}

impl FieldSpec {
    const fn fixed(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
            correctable: false,
        }
    }

    const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            correctable: true,
        }
    }

    const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
            correctable: true,
        }
    }
}

/// Column layout and display metadata for one table.
#[derive(Debug)]
pub struct TableSpec {
    pub table: EntityTable,
    pub display_name: &'static str,
    /// Column shown as the row label on list pages.
    pub primary_field: &'static str,
    pub secondary_field: Option<&'static str>,
    /// Data columns, excluding the primary key and review flags.
    pub fields: &'static [FieldSpec],
}

impl TableSpec {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fields a reviewer may overwrite with `correct_field`.
    pub fn correctable_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|field| field.correctable)
    }

    /// Every data column name, in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|field| field.name)
    }

    /// Check that `field` may be corrected on this table and that `value`
    /// matches its declared type.
    ///
    /// # Errors
    ///
    /// Returns `IneligibleField` for unknown, read-only, key, or flag columns,
    /// and `TypeMismatch` when the value does not fit the column type.
    pub fn check_correction(
        &self,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<&'static FieldSpec, ValidationFailure> {
        let spec = self
            .field(field)
            .filter(|spec| spec.correctable)
            .ok_or_else(|| ValidationFailure::IneligibleField {
                table: self.table.to_string(),
                field: field.to_string(),
            })?;

        let fits = if value.is_null() {
            spec.nullable
        } else {
            spec.ty.accepts(value)
        };
        if !fits {
            return Err(ValidationFailure::TypeMismatch {
                table: self.table.to_string(),
                field: field.to_string(),
                expected: if spec.nullable {
                    format!("{} or null", spec.ty)
                } else {
                    spec.ty.to_string()
                },
                found: json_type_name(value).to_string(),
            });
        }
        Ok(spec)
    }
}

// ---------------------------------------------------------------------------
// Relation
// ---------------------------------------------------------------------------

/// A foreign key: `table.column` holds the id of a `target` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub table: EntityTable,
    pub column: &'static str,
    pub target: EntityTable,
}

impl Relation {
    const fn new(table: EntityTable, column: &'static str, target: EntityTable) -> Self {
        Self {
            table,
            column,
            target,
        }
    }

    #[must_use]
    pub fn find(table: EntityTable, column: &str) -> Option<&'static Self> {
        RELATIONS
            .iter()
            .find(|relation| relation.table == table && relation.column == column)
    }

    /// Target ids that `rows` (of `self.table`) point at. Nulls and
    /// non-integer values are ignored.
    pub fn target_ids<'a>(&self, rows: impl IntoIterator<Item = &'a Entity>) -> HashSet<i64> {
        rows.into_iter()
            .filter(|entity| entity.table == self.table)
            .filter_map(|entity| entity.column_value(self.column).as_i64())
            .collect()
    }
}

/// Every foreign key between reviewable tables. `event.article_id` is left
/// out: articles are not reviewed.
pub static RELATIONS: [Relation; 18] = {
    use EntityTable as T;
    [
        Relation::new(T::Event, "location_id", T::Location),
        Relation::new(T::Event, "date_id", T::Timestamp),
        Relation::new(T::Event, "type_id", T::MeetingType),
        Relation::new(T::SplitLocation, "location_id", T::Location),
        Relation::new(T::Actor, "event_id", T::Event),
        Relation::new(T::SplitActor, "actor_id", T::Actor),
        Relation::new(
            T::AuthoritativeEvent,
            "authoritative_location_id",
            T::AuthoritativeLocation,
        ),
        Relation::new(T::EventMatch, "event_id", T::Event),
        Relation::new(T::EventMatch, "authoritative_event_id", T::AuthoritativeEvent),
        Relation::new(T::SplitLocationMatch, "split_location_id", T::SplitLocation),
        Relation::new(
            T::SplitLocationMatch,
            "authoritative_location_id",
            T::AuthoritativeLocation,
        ),
        Relation::new(T::ActorAlias, "authoritative_actor_id", T::AuthoritativeActor),
        Relation::new(T::SplitActorMatch, "split_actor_id", T::SplitActor),
        Relation::new(T::SplitActorMatch, "authoritative_actor_id", T::AuthoritativeActor),
        Relation::new(T::MeetingTypeMatch, "meetingtype_id", T::MeetingType),
        Relation::new(
            T::MeetingTypeMatch,
            "authoritative_meetingtype_id",
            T::AuthoritativeMeetingType,
        ),
        Relation::new(
            T::AuthoritativeEventActor,
            "authoritative_event_id",
            T::AuthoritativeEvent,
        ),
        Relation::new(
            T::AuthoritativeEventActor,
            "authoritative_actor_id",
            T::AuthoritativeActor,
        ),
    ]
};

use FieldType::{DateTime as Dt, Integer as Int, Real, Text};

static EVENT: TableSpec = TableSpec {
    table: EntityTable::Event,
    display_name: "Events",
    primary_field: "excerpt",
    secondary_field: None,
    fields: &[
        FieldSpec::fixed("excerpt", Text),
        FieldSpec::fixed("article_id", Int),
        FieldSpec::fixed("location_id", Int),
        FieldSpec::fixed("date_id", Int),
        FieldSpec::fixed("type_id", Int),
    ],
};

static LOCATION: TableSpec = TableSpec {
    table: EntityTable::Location,
    display_name: "Locations",
    primary_field: "name",
    secondary_field: Some("country"),
    fields: &[
        FieldSpec::required("name", Text),
        FieldSpec::optional("country", Text),
    ],
};

static SPLIT_LOCATION: TableSpec = TableSpec {
    table: EntityTable::SplitLocation,
    display_name: "Split Locations",
    primary_field: "name",
    secondary_field: Some("country"),
    fields: &[
        FieldSpec::fixed("location_id", Int),
        FieldSpec::required("name", Text),
        FieldSpec::optional("country", Text),
    ],
};

static ACTOR: TableSpec = TableSpec {
    table: EntityTable::Actor,
    display_name: "Actors",
    primary_field: "name",
    secondary_field: Some("description"),
    fields: &[
        FieldSpec::fixed("event_id", Int),
        FieldSpec::required("name", Text),
        FieldSpec::optional("description", Text),
    ],
};

static SPLIT_ACTOR: TableSpec = TableSpec {
    table: EntityTable::SplitActor,
    display_name: "Split Actors",
    primary_field: "name",
    secondary_field: Some("actor_type"),
    fields: &[
        FieldSpec::fixed("actor_id", Int),
        FieldSpec::required("name", Text),
        FieldSpec::optional("actor_type", Text),
    ],
};

static TIMESTAMP: TableSpec = TableSpec {
    table: EntityTable::Timestamp,
    display_name: "Timestamps",
    primary_field: "when",
    secondary_field: None,
    fields: &[
        FieldSpec::fixed("when", Text),
        FieldSpec::optional("normalized_datetime", Dt),
    ],
};

static MEETING_TYPE: TableSpec = TableSpec {
    table: EntityTable::MeetingType,
    display_name: "Meeting Types",
    primary_field: "name",
    secondary_field: Some("category"),
    fields: &[
        FieldSpec::required("name", Text),
        FieldSpec::optional("category", Text),
    ],
};

static AUTHORITATIVE_EVENT: TableSpec = TableSpec {
    table: EntityTable::AuthoritativeEvent,
    display_name: "Authoritative Events",
    primary_field: "canonical_name",
    secondary_field: Some("category"),
    fields: &[
        FieldSpec::required("canonical_name", Text),
        FieldSpec::optional("category", Text),
        FieldSpec::fixed("authoritative_location_id", Int),
    ],
};

static EVENT_MATCH: TableSpec = TableSpec {
    table: EntityTable::EventMatch,
    display_name: "Event Matches",
    primary_field: "composite_score",
    secondary_field: Some("algorithm"),
    fields: &[
        FieldSpec::fixed("event_id", Int),
        FieldSpec::fixed("authoritative_event_id", Int),
        FieldSpec::fixed("composite_score", Real),
        FieldSpec::fixed("algorithm", Text),
    ],
};

static AUTHORITATIVE_LOCATION: TableSpec = TableSpec {
    table: EntityTable::AuthoritativeLocation,
    display_name: "Authoritative Locations",
    primary_field: "name",
    secondary_field: Some("county"),
    fields: &[
        FieldSpec::required("name", Text),
        FieldSpec::optional("county", Text),
    ],
};

static SPLIT_LOCATION_MATCH: TableSpec = TableSpec {
    table: EntityTable::SplitLocationMatch,
    display_name: "Split Location Matches",
    primary_field: "confidence_score",
    secondary_field: Some("algorithm"),
    fields: &[
        FieldSpec::fixed("split_location_id", Int),
        FieldSpec::fixed("authoritative_location_id", Int),
        FieldSpec::fixed("confidence_score", Real),
        FieldSpec::fixed("algorithm", Text),
    ],
};

static AUTHORITATIVE_ACTOR: TableSpec = TableSpec {
    table: EntityTable::AuthoritativeActor,
    display_name: "Authoritative Actors",
    primary_field: "name",
    secondary_field: Some("actor_type"),
    fields: &[
        FieldSpec::required("name", Text),
        FieldSpec::optional("actor_type", Text),
    ],
};

static ACTOR_ALIAS: TableSpec = TableSpec {
    table: EntityTable::ActorAlias,
    display_name: "Actor Aliases",
    primary_field: "alias",
    secondary_field: Some("alias_normalized"),
    fields: &[
        FieldSpec::fixed("authoritative_actor_id", Int),
        FieldSpec::required("alias", Text),
        FieldSpec::optional("alias_normalized", Text),
    ],
};

static SPLIT_ACTOR_MATCH: TableSpec = TableSpec {
    table: EntityTable::SplitActorMatch,
    display_name: "Split Actor Matches",
    primary_field: "confidence_score",
    secondary_field: Some("algorithm"),
    fields: &[
        FieldSpec::fixed("split_actor_id", Int),
        FieldSpec::fixed("authoritative_actor_id", Int),
        FieldSpec::fixed("confidence_score", Real),
        FieldSpec::fixed("algorithm", Text),
    ],
};

static AUTHORITATIVE_MEETING_TYPE: TableSpec = TableSpec {
    table: EntityTable::AuthoritativeMeetingType,
    display_name: "Authoritative Meeting Types",
    primary_field: "name",
    secondary_field: Some("category"),
    fields: &[
        FieldSpec::required("name", Text),
        FieldSpec::optional("category", Text),
    ],
};

static MEETING_TYPE_MATCH: TableSpec = TableSpec {
    table: EntityTable::MeetingTypeMatch,
    display_name: "Meeting Type Matches",
    primary_field: "confidence_score",
    secondary_field: Some("algorithm"),
    fields: &[
        FieldSpec::fixed("meetingtype_id", Int),
        FieldSpec::fixed("authoritative_meetingtype_id", Int),
        FieldSpec::fixed("confidence_score", Real),
        FieldSpec::fixed("algorithm", Text),
    ],
};

static AUTHORITATIVE_EVENT_ACTOR: TableSpec = TableSpec {
    table: EntityTable::AuthoritativeEventActor,
    display_name: "Authoritative Event Actors",
    primary_field: "role",
    secondary_field: Some("source_event_count"),
    fields: &[
        FieldSpec::fixed("authoritative_event_id", Int),
        FieldSpec::fixed("authoritative_actor_id", Int),
        FieldSpec::optional("role", Text),
        FieldSpec::fixed("source_event_count", Int),
    ],
};
