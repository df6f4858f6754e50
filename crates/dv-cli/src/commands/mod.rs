pub mod apply;
pub mod dispatch;
pub mod links;
pub mod list;
pub mod log;
pub mod schema;
pub mod status;
pub mod submission;
pub mod submit;
pub mod validate;

use dv_core::errors::ValidationFailure;
use thiserror::Error;

/// A submission the validator turned down. Exits with status 2.
#[derive(Debug, Error)]
#[error("submission rejected: {0}")]
pub struct Rejected(pub ValidationFailure);

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use dv_config::DataViewConfig;
    use dv_core::edit::{Edit, EditRecord, NormalizedEdit};
    use dv_core::errors::ValidationFailure;
    use dv_core::tables::EntityTable;
    use dv_db::store::RowStore;
    use serde_json::json;

    use super::Rejected;
    use crate::cli::root_commands::{ApplyArgs, LinksArgs, SubmissionArgs};
    use crate::cli::{GlobalFlags, OutputFormat};
    use crate::commands::{apply, links, submit, validate};
    use crate::context::AppContext;

    fn flags() -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Raw,
            limit: None,
            project: None,
        }
    }

    async fn project() -> (tempfile::TempDir, AppContext) {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let ctx = AppContext::init(dir.path(), DataViewConfig::default())
            .await
            .expect("context should init");
        ctx.db
            .conn()
            .execute(
                r#"INSERT INTO "timestamp" (id, "when", normalized_datetime) VALUES (789, 'Thursday last', '1895-03-14T14:00:00')"#,
                (),
            )
            .await
            .expect("seed row");
        (dir, ctx)
    }

    fn submission(dir: &tempfile::TempDir, name: &str, body: &str) -> SubmissionArgs {
        let path = dir.path().join(name);
        std::fs::write(&path, body).expect("submission should write");
        SubmissionArgs {
            input: Some(path.to_string_lossy().into_owned()),
            reviewer: None,
        }
    }

    #[tokio::test]
    async fn submit_then_apply_updates_the_row() {
        let (dir, ctx) = project().await;
        let args = submission(
            &dir,
            "issue.md",
            "<!-- EDIT JSON BELOW -->\n```json\n{\"table\": \"timestamp\", \"id\": 789, \"action\": \"correct_field\", \"field\": \"normalized_datetime\", \"new_value\": \"1895-03-15T14:00:00\", \"reason\": \"off by one day\"}\n```\n",
        );

        validate::handle(&args, &ctx, &flags()).await.expect("validates");
        assert!(!ctx.log.exists());

        submit::handle(&args, &ctx, &flags()).await.expect("submits");
        assert_eq!(ctx.log.load_all().expect("log reads").len(), 1);
        assert!(dir.path().join(".dataview/edits.jsonl").is_file());

        apply::handle(&ApplyArgs { dry_run: false }, &ctx, &flags())
            .await
            .expect("applies");
        let row = ctx
            .db
            .read_row(EntityTable::Timestamp, 789)
            .await
            .expect("row reads")
            .expect("row exists");
        assert_eq!(
            row.column_value("normalized_datetime"),
            json!("1895-03-15T14:00:00")
        );
    }

    #[tokio::test]
    async fn submit_stamps_after_a_log_from_the_future() {
        let (dir, ctx) = project().await;
        let ahead = Utc::now() + TimeDelta::days(1);
        ctx.log
            .append(&NormalizedEdit {
                record: EditRecord {
                    table: EntityTable::Timestamp,
                    id: 789,
                    edit: Edit::MarkValid { reason: None },
                    reviewer: None,
                },
                submitted_at: ahead,
            })
            .expect("seed edit appends");

        let args = submission(
            &dir,
            "block.json",
            r#"{"table": "timestamp", "id": 789, "action": "mark_blocked", "reason": "ask an archivist"}"#,
        );
        submit::handle(&args, &ctx, &flags()).await.expect("submits");

        let logged = ctx.log.load_all().expect("log reads");
        assert_eq!(logged.len(), 2);
        assert!(logged[1].submitted_at > ahead);
    }

    #[tokio::test]
    async fn rejected_submission_is_not_logged() {
        let (dir, ctx) = project().await;
        let args = submission(
            &dir,
            "bad.json",
            r#"{"table": "timestamp", "id": 9999, "action": "correct_field", "field": "normalized_datetime", "new_value": "1895-03-15T14:00:00", "reason": "off by one day"}"#,
        );

        let error = submit::handle(&args, &ctx, &flags())
            .await
            .expect_err("should reject");
        let rejected = error.downcast_ref::<Rejected>().expect("rejection error");
        assert_eq!(rejected.0.kind(), "entity_not_found");
        assert!(!ctx.log.exists());
    }

    #[tokio::test]
    async fn links_skip_unmatched_authoritative_locations() {
        let (_dir, ctx) = project().await;
        for sql in [
            "INSERT INTO authoritativelocation (id, name) VALUES (1, 'Manchester'), (2, 'Salford')",
            "INSERT INTO splitlocationmatch (id, split_location_id, authoritative_location_id) VALUES (1, 10, 1)",
        ] {
            ctx.db.conn().execute(sql, ()).await.expect("seed rows");
        }
        let args = |id| LinksArgs {
            table: "authoritativelocation".into(),
            id,
        };

        links::handle(&args(1), &ctx, &flags()).await.expect("matched row has links");
        let error = links::handle(&args(2), &ctx, &flags())
            .await
            .expect_err("unmatched row has no page");
        let failure = error
            .downcast_ref::<ValidationFailure>()
            .expect("not-found failure");
        assert_eq!(failure.kind(), "entity_not_found");
    }
}
