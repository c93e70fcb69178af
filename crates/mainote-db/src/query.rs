//! SQL query construction for the notes table.
//!
//! Every statement is produced as SQL text with numbered placeholders plus the
//! ordered list of values to bind. No caller-supplied value is ever spliced
//! into the SQL text; only fixed column names, table names and keywords are.
//!
//! ```rust,ignore
//! use mainote_db::query::{self, QueryParam};
//!
//! let q = query::count_notes(&ListNotesQuery::new("123", 20, 0));
//! // q.sql:    "SELECT COUNT(*) FROM notes WHERE chat_id = $1"
//! // q.params: [QueryParam::Text("123")]
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use mainote_core::ListNotesQuery;

/// Table holding every note.
pub const NOTES_TABLE: &str = "notes";

/// Column list shared by every statement that reads a full note.
///
/// `metadata` is read back as text so the metadata codec owns decoding.
pub const NOTE_COLUMNS: &str = "id, chat_id, content, title, category, status, source, \
     metadata::text AS metadata, created_at, updated_at";

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// Single UUID parameter.
    Uuid(Uuid),
    /// Non-null string parameter.
    Text(String),
    /// Nullable string parameter (also used for JSON text, cast in SQL).
    OptText(Option<String>),
    /// Integer parameter (limit/offset).
    Int(i64),
    /// Timestamp parameter.
    Timestamp(DateTime<Utc>),
}

/// A finished statement: SQL text plus its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Incremental SQL writer that numbers placeholders as values are pushed.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    sql: String,
    params: Vec<QueryParam>,
}

impl QueryBuilder {
    pub fn new(head: &str) -> Self {
        Self {
            sql: head.to_string(),
            params: Vec::new(),
        }
    }

    /// Append fixed SQL text.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a placeholder for `param` and record the value.
    pub fn push_bind(&mut self, param: QueryParam) -> &mut Self {
        self.params.push(param);
        self.sql.push('$');
        self.sql.push_str(&self.params.len().to_string());
        self
    }

    /// Append a placeholder followed by a SQL cast, e.g. `$3::jsonb`.
    pub fn push_bind_cast(&mut self, param: QueryParam, cast: &str) -> &mut Self {
        self.push_bind(param);
        self.sql.push_str("::");
        self.sql.push_str(cast);
        self
    }

    /// Append one placeholder per value, separated by `, `.
    pub fn push_values(&mut self, values: Vec<QueryParam>) -> &mut Self {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.push_bind(value);
        }
        self
    }

    pub fn build(self) -> SqlQuery {
        SqlQuery {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Values written by an insert. Assembled by the Store after it has stamped
/// id, timestamps and source.
#[derive(Debug, Clone)]
pub struct InsertNote {
    pub id: Uuid,
    pub owner_key: String,
    pub content: String,
    pub title: Option<String>,
    pub category: &'static str,
    pub status: &'static str,
    pub source: String,
    pub metadata: Option<String>,
    pub now: DateTime<Utc>,
}

/// Values written by an update.
#[derive(Debug, Clone)]
pub struct UpdateNote {
    pub id: Uuid,
    pub content: String,
    pub title: Option<String>,
    pub category: &'static str,
    pub status: &'static str,
    pub metadata: Option<String>,
    pub now: DateTime<Utc>,
}

pub fn insert_note(note: InsertNote) -> SqlQuery {
    let mut q = QueryBuilder::new(&format!(
        "INSERT INTO {} (id, chat_id, content, title, category, status, source, metadata, created_at, updated_at) VALUES (",
        NOTES_TABLE
    ));
    q.push_values(vec![
        QueryParam::Uuid(note.id),
        QueryParam::Text(note.owner_key),
        QueryParam::Text(note.content),
        QueryParam::OptText(note.title),
        QueryParam::Text(note.category.to_string()),
        QueryParam::Text(note.status.to_string()),
        QueryParam::Text(note.source),
    ]);
    q.push(", ");
    q.push_bind_cast(QueryParam::OptText(note.metadata), "jsonb");
    q.push(", ");
    q.push_values(vec![
        QueryParam::Timestamp(note.now),
        QueryParam::Timestamp(note.now),
    ]);
    q.push(") RETURNING id, created_at, updated_at");
    q.build()
}

pub fn select_note_by_id(id: Uuid) -> SqlQuery {
    let mut q = QueryBuilder::new(&format!(
        "SELECT {} FROM {} WHERE id = ",
        NOTE_COLUMNS, NOTES_TABLE
    ));
    q.push_bind(QueryParam::Uuid(id));
    q.build()
}

/// Append the WHERE clause shared by the count and page queries.
fn push_list_filters(q: &mut QueryBuilder, query: &ListNotesQuery) {
    q.push(" WHERE chat_id = ");
    q.push_bind(QueryParam::Text(query.owner_key.clone()));
    if let Some(category) = query.category {
        q.push(" AND category = ");
        q.push_bind(QueryParam::Text(category.as_str().to_string()));
    }
    if let Some(status) = query.status {
        q.push(" AND status = ");
        q.push_bind(QueryParam::Text(status.as_str().to_string()));
    }
}

/// Count every note matching the list filters, ignoring pagination.
pub fn count_notes(query: &ListNotesQuery) -> SqlQuery {
    let mut q = QueryBuilder::new(&format!("SELECT COUNT(*) FROM {}", NOTES_TABLE));
    push_list_filters(&mut q, query);
    q.build()
}

/// One page of notes, newest first. `id` breaks ties between equal
/// `created_at` values so a page boundary is stable for a given query.
pub fn select_notes_page(query: &ListNotesQuery) -> SqlQuery {
    let mut q = QueryBuilder::new(&format!("SELECT {} FROM {}", NOTE_COLUMNS, NOTES_TABLE));
    push_list_filters(&mut q, query);
    q.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    q.push_bind(QueryParam::Int(query.limit));
    q.push(" OFFSET ");
    q.push_bind(QueryParam::Int(query.offset));
    q.build()
}

/// `updated_at` never drops below `created_at`, even if the server clock
/// moved backwards since creation.
pub fn update_note(note: UpdateNote) -> SqlQuery {
    let mut q = QueryBuilder::new(&format!("UPDATE {} SET content = ", NOTES_TABLE));
    q.push_bind(QueryParam::Text(note.content));
    q.push(", title = ");
    q.push_bind(QueryParam::OptText(note.title));
    q.push(", category = ");
    q.push_bind(QueryParam::Text(note.category.to_string()));
    q.push(", status = ");
    q.push_bind(QueryParam::Text(note.status.to_string()));
    q.push(", metadata = ");
    q.push_bind_cast(QueryParam::OptText(note.metadata), "jsonb");
    q.push(", updated_at = GREATEST(");
    q.push_bind(QueryParam::Timestamp(note.now));
    q.push(", created_at) WHERE id = ");
    q.push_bind(QueryParam::Uuid(note.id));
    q.push(" RETURNING updated_at");
    q.build()
}

pub fn delete_note(id: Uuid) -> SqlQuery {
    let mut q = QueryBuilder::new(&format!("DELETE FROM {} WHERE id = ", NOTES_TABLE));
    q.push_bind(QueryParam::Uuid(id));
    q.build()
}
