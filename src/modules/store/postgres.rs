use std::collections::{BTreeMap, BTreeSet, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::ModerationStore;
use crate::core::error::{AppError, Result};
use crate::features::appeals::models::Appeal;
use crate::features::moderation::models::{
    Category, ContentItem, ContentPayload, ContentType, Decision, DeclaredContext,
    ModerationResult, Severity,
};
use crate::features::review_queue::models::QueueItem;
use crate::features::safety_metrics::models::SafetyMetrics;

const RESULT_COLUMNS: &str = r#"
    id, content_id, user_id, content_type, created_at, decision, is_approved,
    severity, categories, confidence, overall_score, context_aware,
    classifier_id, notes, feedback_message, appealable, content_fingerprint
"#;

const QUEUE_COLUMNS: &str = r#"
    id, content_id, moderation_id, content_type, enqueued_at, initial_assessment,
    reviewed, review_result, reviewed_at, reviewed_by, review_notes
"#;

const APPEAL_COLUMNS: &str =
    "id, moderation_id, user_id, content_id, reason, submitted_at, status";

#[derive(Debug, FromRow)]
struct ContentRow {
    id: String,
    author_id: String,
    payload: Json<ContentPayload>,
    declared_context: Json<DeclaredContext>,
    submitted_at: DateTime<Utc>,
}

impl From<ContentRow> for ContentItem {
    fn from(row: ContentRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            payload: row.payload.0,
            declared_context: row.declared_context.0,
            submitted_at: row.submitted_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ResultRow {
    id: Uuid,
    content_id: String,
    user_id: String,
    content_type: ContentType,
    created_at: DateTime<Utc>,
    decision: Decision,
    is_approved: bool,
    severity: Severity,
    categories: Json<BTreeSet<Category>>,
    confidence: f64,
    overall_score: f64,
    context_aware: bool,
    classifier_id: String,
    notes: Option<String>,
    feedback_message: Option<String>,
    appealable: bool,
    content_fingerprint: String,
}

impl From<ResultRow> for ModerationResult {
    fn from(row: ResultRow) -> Self {
        Self {
            id: row.id,
            content_id: row.content_id,
            user_id: row.user_id,
            content_type: row.content_type,
            timestamp: row.created_at,
            decision: row.decision,
            is_approved: row.is_approved,
            severity: row.severity,
            categories: row.categories.0,
            confidence: row.confidence,
            overall_score: row.overall_score,
            context_aware: row.context_aware,
            classifier_id: row.classifier_id,
            notes: row.notes,
            feedback_message: row.feedback_message,
            appealable: row.appealable,
            content_fingerprint: row.content_fingerprint,
        }
    }
}

#[derive(Debug, FromRow)]
struct MetricsRow {
    user_id: String,
    total_items: i64,
    flagged_items: i64,
    category_counts: Json<BTreeMap<Category, i64>>,
    trend: Json<VecDeque<i32>>,
    updated_at: DateTime<Utc>,
}

impl From<MetricsRow> for SafetyMetrics {
    fn from(row: MetricsRow) -> Self {
        Self {
            user_id: row.user_id,
            total_items: row.total_items,
            flagged_items: row.flagged_items,
            category_counts: row.category_counts.0,
            trend: row.trend.0,
            updated_at: row.updated_at,
        }
    }
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        AppError::Database(e)
    }
}

/// Demote the current authoritative result and append `result` in its place
async fn write_result(conn: &mut PgConnection, result: &ModerationResult) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE moderation_results
        SET is_authoritative = FALSE
        WHERE content_id = $1 AND is_authoritative
        "#,
    )
    .bind(&result.content_id)
    .execute(&mut *conn)
    .await
    .map_err(db_error("Failed to demote previous moderation result"))?;

    sqlx::query(
        r#"
        INSERT INTO moderation_results (
            id, content_id, user_id, content_type, created_at, decision, is_approved,
            severity, categories, confidence, overall_score, context_aware,
            classifier_id, notes, feedback_message, appealable, content_fingerprint,
            is_authoritative
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, TRUE)
        "#,
    )
    .bind(result.id)
    .bind(&result.content_id)
    .bind(&result.user_id)
    .bind(result.content_type)
    .bind(result.timestamp)
    .bind(result.decision)
    .bind(result.is_approved)
    .bind(result.severity)
    .bind(Json(&result.categories))
    .bind(result.confidence)
    .bind(result.overall_score)
    .bind(result.context_aware)
    .bind(&result.classifier_id)
    .bind(&result.notes)
    .bind(&result.feedback_message)
    .bind(result.appealable)
    .bind(&result.content_fingerprint)
    .execute(&mut *conn)
    .await
    .map_err(db_error("Failed to insert moderation result"))?;

    Ok(())
}

async fn write_queue_item(conn: &mut PgConnection, item: &QueueItem) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE queue_items
        SET moderation_id = $2, initial_assessment = $3, reviewed = $4, review_result = $5,
            reviewed_at = $6, reviewed_by = $7, review_notes = $8
        WHERE id = $1
        "#,
    )
    .bind(item.id)
    .bind(item.moderation_id)
    .bind(&item.initial_assessment)
    .bind(item.reviewed)
    .bind(item.review_result)
    .bind(item.reviewed_at)
    .bind(&item.reviewed_by)
    .bind(&item.review_notes)
    .execute(conn)
    .await
    .map_err(db_error("Failed to update queue item"))?;

    Ok(())
}

/// Store backed by Postgres
pub struct PgModerationStore {
    pool: PgPool,
}

impl PgModerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationStore for PgModerationStore {
    async fn save_content(&self, item: &ContentItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO content_items (id, author_id, content_type, payload, declared_context, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                author_id = EXCLUDED.author_id,
                content_type = EXCLUDED.content_type,
                payload = EXCLUDED.payload,
                declared_context = EXCLUDED.declared_context,
                submitted_at = EXCLUDED.submitted_at
            "#,
        )
        .bind(&item.id)
        .bind(&item.author_id)
        .bind(item.content_type())
        .bind(Json(&item.payload))
        .bind(Json(&item.declared_context))
        .bind(item.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save content item"))?;

        Ok(())
    }

    async fn get_content(&self, content_id: &str) -> Result<Option<ContentItem>> {
        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT id, author_id, payload, declared_context, submitted_at
            FROM content_items
            WHERE id = $1
            "#,
        )
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch content item"))?;

        Ok(row.map(Into::into))
    }

    async fn record_result(&self, result: &ModerationResult) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        write_result(&mut tx, result).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit moderation result"))?;

        Ok(())
    }

    async fn get_result(&self, id: Uuid) -> Result<Option<ModerationResult>> {
        let row = sqlx::query_as::<_, ResultRow>(&format!(
            "SELECT {} FROM moderation_results WHERE id = $1",
            RESULT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch moderation result"))?;

        Ok(row.map(Into::into))
    }

    async fn authoritative_result(&self, content_id: &str) -> Result<Option<ModerationResult>> {
        let row = sqlx::query_as::<_, ResultRow>(&format!(
            "SELECT {} FROM moderation_results WHERE content_id = $1 AND is_authoritative",
            RESULT_COLUMNS
        ))
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch authoritative result"))?;

        Ok(row.map(Into::into))
    }

    async fn result_history(&self, content_id: &str) -> Result<Vec<ModerationResult>> {
        let rows = sqlx::query_as::<_, ResultRow>(&format!(
            "SELECT {} FROM moderation_results WHERE content_id = $1 ORDER BY created_at ASC, id ASC",
            RESULT_COLUMNS
        ))
        .bind(content_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch result history"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_queue_item(&self, item: &QueueItem) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO queue_items ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            QUEUE_COLUMNS
        ))
        .bind(item.id)
        .bind(&item.content_id)
        .bind(item.moderation_id)
        .bind(item.content_type)
        .bind(item.enqueued_at)
        .bind(&item.initial_assessment)
        .bind(item.reviewed)
        .bind(item.review_result)
        .bind(item.reviewed_at)
        .bind(&item.reviewed_by)
        .bind(&item.review_notes)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert queue item"))?;

        Ok(())
    }

    async fn update_queue_item(&self, item: &QueueItem) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        write_queue_item(&mut conn, item).await
    }

    async fn record_review(&self, result: &ModerationResult, item: &QueueItem) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        write_result(&mut tx, result).await?;
        write_queue_item(&mut tx, item).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit review"))?;

        Ok(())
    }

    async fn queue_items_for_content(&self, content_id: &str) -> Result<Vec<QueueItem>> {
        sqlx::query_as::<_, QueueItem>(&format!(
            "SELECT {} FROM queue_items WHERE content_id = $1 ORDER BY enqueued_at ASC",
            QUEUE_COLUMNS
        ))
        .bind(content_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch queue items"))
    }

    async fn list_queue(
        &self,
        content_type: ContentType,
        pending_only: bool,
    ) -> Result<Vec<QueueItem>> {
        sqlx::query_as::<_, QueueItem>(&format!(
            r#"
            SELECT {} FROM queue_items
            WHERE content_type = $1 AND (NOT $2 OR NOT reviewed)
            ORDER BY enqueued_at ASC
            "#,
            QUEUE_COLUMNS
        ))
        .bind(content_type)
        .bind(pending_only)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list queue"))
    }

    async fn pending_count(&self, content_type: ContentType) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM queue_items WHERE content_type = $1 AND NOT reviewed",
        )
        .bind(content_type)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count pending queue items"))
    }

    async fn get_metrics(&self, user_id: &str) -> Result<Option<SafetyMetrics>> {
        let row = sqlx::query_as::<_, MetricsRow>(
            r#"
            SELECT user_id, total_items, flagged_items, category_counts, trend, updated_at
            FROM safety_metrics
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to fetch safety metrics"))?;

        Ok(row.map(Into::into))
    }

    async fn save_metrics(&self, metrics: &SafetyMetrics) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO safety_metrics (user_id, total_items, flagged_items, category_counts, trend, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                total_items = EXCLUDED.total_items,
                flagged_items = EXCLUDED.flagged_items,
                category_counts = EXCLUDED.category_counts,
                trend = EXCLUDED.trend,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&metrics.user_id)
        .bind(metrics.total_items)
        .bind(metrics.flagged_items)
        .bind(Json(&metrics.category_counts))
        .bind(Json(&metrics.trend))
        .bind(metrics.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save safety metrics"))?;

        Ok(())
    }

    async fn insert_appeal(&self, appeal: &Appeal) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO appeals ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            APPEAL_COLUMNS
        ))
        .bind(appeal.id)
        .bind(appeal.moderation_id)
        .bind(&appeal.user_id)
        .bind(&appeal.content_id)
        .bind(&appeal.reason)
        .bind(appeal.submitted_at)
        .bind(appeal.status)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert appeal"))?;

        Ok(())
    }

    async fn appeals_for_result(&self, moderation_id: Uuid) -> Result<Vec<Appeal>> {
        sqlx::query_as::<_, Appeal>(&format!(
            "SELECT {} FROM appeals WHERE moderation_id = $1 ORDER BY submitted_at ASC",
            APPEAL_COLUMNS
        ))
        .bind(moderation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch appeals for result"))
    }

    async fn appeals_by_user(&self, user_id: &str) -> Result<Vec<Appeal>> {
        sqlx::query_as::<_, Appeal>(&format!(
            "SELECT {} FROM appeals WHERE user_id = $1 ORDER BY submitted_at DESC",
            APPEAL_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch user appeals"))
    }
}
