//! Rows shown beside an entity on its page.
//!
//! One hop along every foreign key in the registry: the rows the entity's own
//! key columns point at, then the rows of other tables that point back at it.

use dv_core::entity::Entity;
use dv_core::responses::{ListRow, RelatedRows, RelationDirection};

use crate::error::DatabaseError;
use crate::store::RowStore;

/// Related rows of `entity`, grouped per foreign key. Groups with no rows
/// (null keys, dangling ids, nothing pointing back) are left out.
///
/// # Errors
///
/// Any storage error.
pub async fn related_rows<S: RowStore>(
    store: &S,
    entity: &Entity,
) -> Result<Vec<RelatedRows>, DatabaseError> {
    let mut groups = Vec::new();

    for relation in entity.table.references() {
        let Some(target_id) = entity.column_value(relation.column).as_i64() else {
            continue;
        };
        if let Some(row) = store.read_row(relation.target, target_id).await? {
            groups.push(RelatedRows {
                table: relation.target,
                via: relation.column.to_string(),
                direction: RelationDirection::References,
                rows: vec![ListRow::from_entity(&row)],
            });
        }
    }

    for relation in entity.table.referenced_by() {
        let rows = store
            .read_where(relation.table, relation.column, entity.id)
            .await?;
        if rows.is_empty() {
            continue;
        }
        groups.push(RelatedRows {
            table: relation.table,
            via: relation.column.to_string(),
            direction: RelationDirection::ReferencedBy,
            rows: rows.iter().map(ListRow::from_entity).collect(),
        });
    }

    tracing::debug!(
        table = %entity.table,
        id = entity.id,
        groups = groups.len(),
        "related rows loaded"
    );
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_actor, seed_timestamp, test_db};
    use dv_core::tables::EntityTable;
    use pretty_assertions::assert_eq;

    async fn exec(db: &crate::DvDb, sql: &str) {
        db.conn().execute(sql, ()).await.unwrap();
    }

    #[tokio::test]
    async fn event_shows_its_timestamp_and_actors() {
        let db = test_db().await;
        seed_timestamp(&db, 789, "14 March 1895", None).await;
        exec(&db, "INSERT INTO event (id, excerpt, date_id, location_id) VALUES (5, 'a meeting', 789, 404)").await;
        exec(&db, "INSERT INTO actor (id, event_id, name) VALUES (1, 5, 'Hunt'), (2, 5, 'Bamford')").await;
        seed_actor(&db, 3, "unrelated").await;

        let event = db.read_row(EntityTable::Event, 5).await.unwrap().unwrap();
        let groups = related_rows(&db, &event).await.unwrap();

        let summary: Vec<(EntityTable, &str, RelationDirection, Vec<i64>)> = groups
            .iter()
            .map(|g| {
                (
                    g.table,
                    g.via.as_str(),
                    g.direction,
                    g.rows.iter().map(|r| r.id).collect(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (EntityTable::Timestamp, "date_id", RelationDirection::References, vec![789]),
                (EntityTable::Actor, "event_id", RelationDirection::ReferencedBy, vec![1, 2]),
            ]
        );
        assert_eq!(groups[0].rows[0].label, "14 March 1895");
    }

    #[tokio::test]
    async fn authoritative_actor_shows_aliases() {
        let db = test_db().await;
        exec(&db, "INSERT INTO authoritativeactor (id, name) VALUES (8, 'Henry Hunt')").await;
        exec(
            &db,
            "INSERT INTO actoralias (id, authoritative_actor_id, alias) VALUES (1, 8, 'Orator Hunt'), (2, 9, 'someone else')",
        )
        .await;

        let actor = db
            .read_row(EntityTable::AuthoritativeActor, 8)
            .await
            .unwrap()
            .unwrap();
        let groups = related_rows(&db, &actor).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].table, EntityTable::ActorAlias);
        assert_eq!(groups[0].direction, RelationDirection::ReferencedBy);
        assert_eq!(groups[0].rows.len(), 1);
        assert_eq!(groups[0].rows[0].label, "Orator Hunt");
    }

    #[tokio::test]
    async fn unlinked_row_has_no_groups() {
        let db = test_db().await;
        seed_actor(&db, 1, "Hunt").await;
        let actor = db.read_row(EntityTable::Actor, 1).await.unwrap().unwrap();
        assert!(related_rows(&db, &actor).await.unwrap().is_empty());
    }
}
