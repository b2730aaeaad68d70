use async_trait::async_trait;
use chrono::{DateTime, Utc};
use like_schema::{EntityKind, EntityRef, LikeSnapshot};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::{count_from_sql, LikeStore, StoreError, StoreResult};
use crate::domain::{projection, LikeEdge};

/// Edge row as returned by either like table
#[derive(sqlx::FromRow)]
struct LikeRow {
    id: Uuid,
    user_id: Uuid,
    target_id: Uuid,
    created_at: DateTime<Utc>,
}

/// Aggregate row for batch snapshot reads
#[derive(sqlx::FromRow)]
struct TallyRow {
    target_id: Uuid,
    likes_count: i64,
    liked_by_viewer: bool,
}

/// Table and foreign-key column holding the edges of one entity kind
fn like_table(kind: EntityKind) -> (&'static str, &'static str) {
    match kind {
        EntityKind::Post => ("likes", "post_id"),
        EntityKind::Comment => ("comment_likes", "comment_id"),
    }
}

/// Postgres-backed like store.
///
/// Post likes live in `likes`, comment likes in `comment_likes`; both carry a
/// UNIQUE (user_id, target) constraint and a cascading foreign key to the
/// liked row, which is what turns duplicate and dangling likes into
/// `Conflict` and `NotFound`. The foreign key to `users` turns an
/// unregistered liker into `UnknownUser`.
#[derive(Clone)]
pub struct LikeRepository {
    pool: PgPool,
}

impl LikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn tally(
        &self,
        kind: EntityKind,
        viewer: Option<Uuid>,
        ids: &[Uuid],
    ) -> StoreResult<Vec<TallyRow>> {
        let (table, column) = like_table(kind);
        let rows = sqlx::query_as::<_, TallyRow>(&format!(
            r#"
            SELECT {column} AS target_id,
                   COUNT(*) AS likes_count,
                   COALESCE(BOOL_OR(user_id = $2), FALSE) AS liked_by_viewer
            FROM {table}
            WHERE {column} = ANY($1)
            GROUP BY {column}
            "#
        ))
        .bind(ids)
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Foreign key from a like table to `users`, named in the migration
fn user_fkey(table: &str) -> String {
    format!("{table}_user_id_fkey")
}

/// Map constraint violations on insert to the store's error taxonomy
fn map_insert_error(err: sqlx::Error, user_id: Uuid, entity: EntityRef) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(format!("{} already liked", entity.kind));
        }
        if db_err.is_foreign_key_violation() {
            let (table, _) = like_table(entity.kind);
            if db_err.constraint() == Some(user_fkey(table).as_str()) {
                return StoreError::UnknownUser(user_id);
            }
            return StoreError::NotFound(format!("{} {} not found", entity.kind, entity.id));
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl LikeStore for LikeRepository {
    async fn like(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<LikeEdge> {
        let (table, column) = like_table(entity.kind);
        let row = sqlx::query_as::<_, LikeRow>(&format!(
            r#"
            INSERT INTO {table} (user_id, {column})
            VALUES ($1, $2)
            RETURNING id, user_id, {column} AS target_id, created_at
            "#
        ))
        .bind(user_id)
        .bind(entity.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, user_id, entity))?;

        Ok(LikeEdge {
            id: row.id,
            user_id: row.user_id,
            entity: EntityRef::new(entity.kind, row.target_id),
            created_at: row.created_at,
        })
    }

    async fn unlike(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<()> {
        let (table, column) = like_table(entity.kind);
        let result = sqlx::query(&format!(
            r#"
            DELETE FROM {table}
            WHERE user_id = $1 AND {column} = $2
            "#
        ))
        .bind(user_id)
        .bind(entity.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "{} {} is not liked",
                entity.kind, entity.id
            )));
        }
        Ok(())
    }

    async fn count_likes(&self, entity: EntityRef) -> StoreResult<u64> {
        let (table, column) = like_table(entity.kind);
        let count: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COUNT(*) FROM {table}
            WHERE {column} = $1
            "#
        ))
        .bind(entity.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count_from_sql(count))
    }

    async fn is_liked_by(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<bool> {
        let (table, column) = like_table(entity.kind);
        let exists: bool = sqlx::query_scalar(&format!(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM {table}
                WHERE user_id = $1 AND {column} = $2
            )
            "#
        ))
        .bind(user_id)
        .bind(entity.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn snapshots(
        &self,
        viewer: Option<Uuid>,
        entities: &[EntityRef],
    ) -> StoreResult<HashMap<EntityRef, LikeSnapshot>> {
        let mut result: HashMap<EntityRef, LikeSnapshot> = entities
            .iter()
            .map(|entity| (*entity, LikeSnapshot::default()))
            .collect();

        for kind in [EntityKind::Post, EntityKind::Comment] {
            let ids: Vec<Uuid> = entities
                .iter()
                .filter(|e| e.kind == kind)
                .map(|e| e.id)
                .collect();
            if ids.is_empty() {
                continue;
            }

            for row in self.tally(kind, viewer, &ids).await? {
                result.insert(
                    EntityRef::new(kind, row.target_id),
                    projection::from_tally(row.likes_count, row.liked_by_viewer),
                );
            }
        }

        Ok(result)
    }
}
