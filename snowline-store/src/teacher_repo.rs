use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use snowline_core::repository::{DuplicateKey, RepoError, RepoResult, TeacherRepository};
use snowline_order::Teacher;

pub struct StoreTeacherRepository {
    pool: PgPool,
}

impl StoreTeacherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TeacherRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TeacherRow> for Teacher {
    fn from(row: TeacherRow) -> Self {
        Teacher {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The `LOWER(name)` unique index reports a concurrent duplicate as 23505
fn name_taken(err: sqlx::Error, name: &str) -> RepoError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => Box::new(DuplicateKey(format!("teacher '{name}'"))),
        _ => Box::new(err),
    }
}

#[async_trait]
impl TeacherRepository for StoreTeacherRepository {
    async fn create_teacher(&self, teacher: &Teacher) -> RepoResult<()> {
        sqlx::query("INSERT INTO teachers (id, name, created_at, updated_at) VALUES ($1, $2, $3, $4)")
            .bind(teacher.id)
            .bind(&teacher.name)
            .bind(teacher.created_at)
            .bind(teacher.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| name_taken(e, &teacher.name))?;

        Ok(())
    }

    async fn get_teacher(&self, id: Uuid) -> RepoResult<Option<Teacher>> {
        let row = sqlx::query_as::<_, TeacherRow>("SELECT id, name, created_at, updated_at FROM teachers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Teacher::from))
    }

    async fn find_teacher_by_name(&self, name: &str) -> RepoResult<Option<Teacher>> {
        let row = sqlx::query_as::<_, TeacherRow>(
            "SELECT id, name, created_at, updated_at FROM teachers WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Teacher::from))
    }

    async fn list_teachers(&self) -> RepoResult<Vec<Teacher>> {
        let rows = sqlx::query_as::<_, TeacherRow>("SELECT id, name, created_at, updated_at FROM teachers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Teacher::from).collect())
    }

    async fn update_teacher(&self, teacher: &Teacher) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE teachers SET name = $1, updated_at = $2 WHERE id = $3")
            .bind(&teacher.name)
            .bind(teacher.updated_at)
            .bind(teacher.id)
            .execute(&self.pool)
            .await
            .map_err(|e| name_taken(e, &teacher.name))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_teacher(&self, id: Uuid) -> RepoResult<bool> {
        // lessons.teacher_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
