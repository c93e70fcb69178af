//! PostgreSQL note repository.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use mainote_core::{
    defaults, logging, metadata, Error, ListNotesQuery, Note, NoteCategory, NotePage, NoteRepository,
    NoteStatus, Result,
};

use crate::query::{self, InsertNote, QueryParam, UpdateNote};

/// Bind a `Vec<QueryParam>` onto any sqlx query type, in placeholder order.
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut q = $query;
        for param in $params {
            q = match param {
                QueryParam::Uuid(v) => q.bind(v),
                QueryParam::Text(v) => q.bind(v),
                QueryParam::OptText(v) => q.bind(v),
                QueryParam::Int(v) => q.bind(v),
                QueryParam::Timestamp(v) => q.bind(v),
            };
        }
        q
    }};
}

/// PostgreSQL implementation of NoteRepository.
///
/// Every call is bounded by `query_timeout`; a call that exceeds it fails
/// with a Store error and its in-flight work is dropped.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
    query_timeout: Duration,
}

impl PgNoteRepository {
    /// Create a repository with the default per-call timeout.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_query_timeout(pool, Duration::from_millis(defaults::QUERY_TIMEOUT_MS))
    }

    pub fn with_query_timeout(pool: Pool<Postgres>, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Await one database round trip under the per-call time budget.
    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        let err = match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => Error::store(operation, e),
            Err(_) => Error::store_timeout(operation, self.query_timeout),
        };
        warn!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "notes",
            op = operation,
            error = %err,
            "Store call failed"
        );
        Err(err)
    }

    async fn fetch_page(&self, list: &ListNotesQuery) -> std::result::Result<(i64, Vec<PgRow>), sqlx::Error> {
        // Count and page read from one snapshot so `total` matches the page.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let count = query::count_notes(list);
        let total: i64 = bind_params!(sqlx::query_scalar(&count.sql), count.params)
            .fetch_one(&mut *tx)
            .await?;

        let page = query::select_notes_page(list);
        let rows = bind_params!(sqlx::query(&page.sql), page.params)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((total, rows))
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| Error::Decoding(format!("column {}: {}", name, e)))
}

/// Map a database row to a Note.
fn note_from_row(row: &PgRow) -> Result<Note> {
    let category: String = column(row, "category")?;
    let category = NoteCategory::parse(&category)
        .ok_or_else(|| Error::Decoding(format!("unknown category {:?}", category)))?;

    let status: String = column(row, "status")?;
    let status = NoteStatus::parse(&status)
        .ok_or_else(|| Error::Decoding(format!("unknown status {:?}", status)))?;

    let raw_metadata: Option<String> = column(row, "metadata")?;

    Ok(Note {
        id: column(row, "id")?,
        owner_key: column(row, "chat_id")?,
        content: column(row, "content")?,
        title: column(row, "title")?,
        category,
        status,
        metadata: metadata::decode(raw_metadata.as_deref())?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, note: &mut Note) -> Result<()> {
        let start = Instant::now();
        let id = if note.has_id() { note.id } else { Uuid::now_v7() };
        let source = note.source().unwrap_or(defaults::DEFAULT_SOURCE).to_string();
        let encoded = metadata::encode(note.metadata.as_ref())?;

        let insert = query::insert_note(InsertNote {
            id,
            owner_key: note.owner_key.clone(),
            content: note.content.clone(),
            title: note.title.clone(),
            category: note.category.as_str(),
            status: note.status.as_str(),
            source,
            metadata: encoded,
            now: Utc::now(),
        });

        let row = self
            .timed(
                "create note",
                bind_params!(sqlx::query(&insert.sql), insert.params).fetch_one(&self.pool),
            )
            .await?;

        let id: Uuid = column(&row, "id")?;
        let created_at: DateTime<Utc> = column(&row, "created_at")?;
        let updated_at: DateTime<Utc> = column(&row, "updated_at")?;
        note.id = id;
        note.created_at = created_at;
        note.updated_at = updated_at;

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "notes",
            op = "create",
            note_id = %id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note inserted"
        );
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Note> {
        let start = Instant::now();
        let select = query::select_note_by_id(id);
        let row = self
            .timed(
                "fetch note",
                bind_params!(sqlx::query(&select.sql), select.params).fetch_optional(&self.pool),
            )
            .await?
            .ok_or(Error::NotFound(id))?;

        let note = note_from_row(&row)?;
        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "notes",
            op = "fetch",
            note_id = %id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note fetched"
        );
        Ok(note)
    }

    async fn list(&self, list: &ListNotesQuery) -> Result<NotePage> {
        let start = Instant::now();
        let (total, rows) = self.timed("list notes", self.fetch_page(list)).await?;
        let notes = rows.iter().map(note_from_row).collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "notes",
            op = "list",
            owner_key = %list.owner_key,
            result_count = notes.len(),
            total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Notes listed"
        );
        Ok(NotePage { notes, total })
    }

    async fn update(&self, note: &mut Note) -> Result<()> {
        let start = Instant::now();
        let encoded = metadata::encode(note.metadata.as_ref())?;
        let update = query::update_note(UpdateNote {
            id: note.id,
            content: note.content.clone(),
            title: note.title.clone(),
            category: note.category.as_str(),
            status: note.status.as_str(),
            metadata: encoded,
            now: Utc::now(),
        });

        let row = self
            .timed(
                "update note",
                bind_params!(sqlx::query(&update.sql), update.params).fetch_optional(&self.pool),
            )
            .await?
            .ok_or(Error::NotFound(note.id))?;

        note.updated_at = column(&row, "updated_at")?;

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "notes",
            op = "update",
            note_id = %note.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note updated"
        );
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let start = Instant::now();
        let delete = query::delete_note(id);
        let result = self
            .timed(
                "delete note",
                bind_params!(sqlx::query(&delete.sql), delete.params).execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(id));
        }

        debug!(
            subsystem = logging::SUBSYSTEM_DB,
            component = "notes",
            op = "delete",
            note_id = %id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note deleted"
        );
        Ok(())
    }
}
