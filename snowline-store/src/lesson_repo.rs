use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use snowline_core::repository::{LessonFilter, LessonRepository, RepoResult};
use snowline_order::{Lesson, Participant};
use snowline_shared::CustomerContact;

use crate::database::contains_pattern;

pub struct StoreLessonRepository {
    pool: PgPool,
}

impl StoreLessonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const LESSON_COLUMNS: &str = "id, customer_name, email, phone, lesson_date, start_time, duration_hours, \
     discipline, level, language, teacher_id, status, total_price_cents, notes, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LessonRow {
    id: Uuid,
    customer_name: String,
    email: String,
    phone: String,
    lesson_date: NaiveDate,
    start_time: NaiveTime,
    duration_hours: i32,
    discipline: String,
    level: String,
    language: String,
    teacher_id: Option<Uuid>,
    status: String,
    total_price_cents: i64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ParticipantRow {
    lesson_id: Uuid,
    name: String,
    age: Option<i32>,
}

impl LessonRow {
    fn into_lesson(self, participants: Vec<Participant>) -> RepoResult<Lesson> {
        Ok(Lesson {
            id: self.id,
            contact: CustomerContact::new(self.customer_name, self.email, self.phone),
            participants,
            date: self.lesson_date,
            start_time: self.start_time,
            duration_hours: u32::try_from(self.duration_hours)?,
            discipline: self.discipline.parse()?,
            level: self.level.parse()?,
            language: self.language,
            teacher_id: self.teacher_id,
            status: self.status.parse()?,
            total_price_cents: self.total_price_cents,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl StoreLessonRepository {
    async fn load_participants(&self, lesson_ids: &[Uuid]) -> RepoResult<HashMap<Uuid, Vec<Participant>>> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT lesson_id, name, age
            FROM lesson_participants
            WHERE lesson_id = ANY($1)
            ORDER BY lesson_id, position
            "#,
        )
        .bind(lesson_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut participants: HashMap<Uuid, Vec<Participant>> = HashMap::new();
        for row in rows {
            participants.entry(row.lesson_id).or_default().push(Participant {
                name: row.name,
                age: row.age.and_then(|a| u32::try_from(a).ok()),
            });
        }
        Ok(participants)
    }

    async fn assemble(&self, rows: Vec<LessonRow>) -> RepoResult<Vec<Lesson>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut participants = self.load_participants(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let people = participants.remove(&row.id).unwrap_or_default();
                row.into_lesson(people)
            })
            .collect()
    }

    async fn insert_participants(tx: &mut Transaction<'_, Postgres>, lesson: &Lesson) -> Result<(), sqlx::Error> {
        for (position, participant) in lesson.participants.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO lesson_participants (id, lesson_id, position, name, age)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(lesson.id)
            .bind(position as i32)
            .bind(participant.name.trim())
            .bind(participant.age.map(|a| a as i32))
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl LessonRepository for StoreLessonRepository {
    async fn create_lesson(&self, lesson: &Lesson) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO lessons (id, customer_name, email, phone, lesson_date, start_time, duration_hours,
                                 discipline, level, language, teacher_id, status, total_price_cents, notes,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(lesson.id)
        .bind(&lesson.contact.name)
        .bind(lesson.contact.email())
        .bind(lesson.contact.phone())
        .bind(lesson.date)
        .bind(lesson.start_time)
        .bind(lesson.duration_hours as i32)
        .bind(lesson.discipline.as_str())
        .bind(lesson.level.as_str())
        .bind(&lesson.language)
        .bind(lesson.teacher_id)
        .bind(lesson.status.as_str())
        .bind(lesson.total_price_cents)
        .bind(&lesson.notes)
        .bind(lesson.created_at)
        .bind(lesson.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::insert_participants(&mut tx, lesson).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_lesson(&self, id: Uuid) -> RepoResult<Option<Lesson>> {
        let row = sqlx::query_as::<_, LessonRow>(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_lessons(&self, filter: &LessonFilter) -> RepoResult<Vec<Lesson>> {
        let search = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(contains_pattern);

        let rows = sqlx::query_as::<_, LessonRow>(&format!(
            r#"
            SELECT {LESSON_COLUMNS} FROM lessons
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::DATE IS NULL OR lesson_date >= $2)
              AND ($3::DATE IS NULL OR lesson_date <= $3)
              AND ($4::UUID IS NULL OR teacher_id = $4)
              AND ($5::TEXT IS NULL OR LOWER(customer_name) LIKE $5 ESCAPE '\' OR email LIKE $5 ESCAPE '\' OR phone LIKE $5 ESCAPE '\')
            ORDER BY lesson_date DESC, start_time
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.teacher_id)
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        self.assemble(rows).await
    }

    async fn update_lesson(&self, lesson: &Lesson) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE lessons
            SET customer_name = $1, email = $2, phone = $3, lesson_date = $4, start_time = $5,
                duration_hours = $6, discipline = $7, level = $8, language = $9, teacher_id = $10,
                status = $11, total_price_cents = $12, notes = $13, updated_at = $14
            WHERE id = $15
            "#,
        )
        .bind(&lesson.contact.name)
        .bind(lesson.contact.email())
        .bind(lesson.contact.phone())
        .bind(lesson.date)
        .bind(lesson.start_time)
        .bind(lesson.duration_hours as i32)
        .bind(lesson.discipline.as_str())
        .bind(lesson.level.as_str())
        .bind(&lesson.language)
        .bind(lesson.teacher_id)
        .bind(lesson.status.as_str())
        .bind(lesson.total_price_cents)
        .bind(&lesson.notes)
        .bind(lesson.updated_at)
        .bind(lesson.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM lesson_participants WHERE lesson_id = $1")
            .bind(lesson.id)
            .execute(&mut *tx)
            .await?;
        Self::insert_participants(&mut tx, lesson).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_lesson(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
