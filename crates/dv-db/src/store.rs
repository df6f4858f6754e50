//! Row access the snapshot reader and applier go through.

use dv_core::edit::FieldChanges;
use dv_core::entity::Entity;
use dv_core::tables::{EntityTable, PRIMARY_KEY};

use crate::DvDb;
use crate::error::DatabaseError;
use crate::helpers::{entity_from_row, has_column, json_to_sql, quote_ident, select_columns};

/// Read and update rows of the reviewable tables.
#[allow(async_fn_in_trait)]
pub trait RowStore {
    /// Every row of `table`, ordered by id.
    async fn read_all(&self, table: EntityTable) -> Result<Vec<Entity>, DatabaseError>;

    async fn read_row(&self, table: EntityTable, id: i64)
    -> Result<Option<Entity>, DatabaseError>;

    /// Rows of `table` whose integer `column` equals `value`, ordered by id.
    async fn read_where(
        &self,
        table: EntityTable,
        column: &str,
        value: i64,
    ) -> Result<Vec<Entity>, DatabaseError>;

    /// Set the named columns of one row. Returns `false` when the row does
    /// not exist.
    async fn update_fields(
        &self,
        table: EntityTable,
        id: i64,
        changes: &FieldChanges,
    ) -> Result<bool, DatabaseError>;
}

impl RowStore for DvDb {
    async fn read_all(&self, table: EntityTable) -> Result<Vec<Entity>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            select_columns(table),
            quote_ident(table.as_str()),
            quote_ident(PRIMARY_KEY)
        );
        let mut rows = self.conn().query(&sql, ()).await?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next().await? {
            entities.push(entity_from_row(table, &row)?);
        }
        Ok(entities)
    }

    async fn read_row(
        &self,
        table: EntityTable,
        id: i64,
    ) -> Result<Option<Entity>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            select_columns(table),
            quote_ident(table.as_str()),
            quote_ident(PRIMARY_KEY)
        );
        let mut rows = self.conn().query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(entity_from_row(table, &row)?)),
            None => Ok(None),
        }
    }

    async fn read_where(
        &self,
        table: EntityTable,
        column: &str,
        value: i64,
    ) -> Result<Vec<Entity>, DatabaseError> {
        if !has_column(table, column) {
            return Err(DatabaseError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY {}",
            select_columns(table),
            quote_ident(table.as_str()),
            quote_ident(column),
            quote_ident(PRIMARY_KEY)
        );
        let mut rows = self.conn().query(&sql, [value]).await?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next().await? {
            entities.push(entity_from_row(table, &row)?);
        }
        Ok(entities)
    }

    async fn update_fields(
        &self,
        table: EntityTable,
        id: i64,
        changes: &FieldChanges,
    ) -> Result<bool, DatabaseError> {
        if changes.is_empty() {
            return Ok(self.read_row(table, id).await?.is_some());
        }

        let mut assignments = Vec::with_capacity(changes.len());
        let mut params = Vec::with_capacity(changes.len() + 1);
        for (index, (column, value)) in changes.iter().enumerate() {
            if column == PRIMARY_KEY || !has_column(table, column) {
                return Err(DatabaseError::UnknownColumn {
                    table: table.to_string(),
                    column: column.clone(),
                });
            }
            assignments.push(format!("{} = ?{}", quote_ident(column), index + 1));
            params.push(json_to_sql(value));
        }
        params.push(libsql::Value::Integer(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            quote_ident(table.as_str()),
            assignments.join(", "),
            quote_ident(PRIMARY_KEY),
            params.len()
        );
        let affected = self.conn().execute(&sql, params).await?;
        Ok(affected > 0)
    }
}
