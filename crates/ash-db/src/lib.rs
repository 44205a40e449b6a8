//! Storage layer for AmigaShare.
//!
//! Provides persistence for saved expense sessions and the friends directory
//! using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared across threads without external synchronization.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 format (e.g.,
//! `2025-06-01T12:00:00.000Z`), always UTC, so lexicographic ordering matches
//! chronological ordering. Birth dates are stored as `YYYY-MM-DD` TEXT.
//!
//! The participant, surcharge, and result lists of a session are stored as
//! JSON payloads in TEXT columns, using the same camelCase field names the
//! original web app wrote. Adding fields to these payloads is
//! backward-compatible; removing or renaming fields requires a migration.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use ash_core::{
    DivisionMode, ExpenseResult, ExpenseSession, Friend, FriendId, Participant, SessionId,
    SubExpense,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp or date.
    #[error("invalid timestamp for record {record_id}: {value}")]
    TimestampParse {
        record_id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored JSON payload or identifier could not be decoded.
    #[error("invalid data for record {record_id}: {message}")]
    InvalidRecordData { record_id: String, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Saved expense sessions: inputs plus the computed results
            -- snapshot. List columns hold camelCase JSON payloads.
            CREATE TABLE IF NOT EXISTS expense_sessions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                total_expense REAL NOT NULL,
                division_mode TEXT NOT NULL,
                global_days REAL,
                participants TEXT NOT NULL,
                sub_expenses TEXT NOT NULL,
                results TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_created ON expense_sessions(created_at);

            CREATE TABLE IF NOT EXISTS friends (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                surname TEXT NOT NULL,
                email TEXT NOT NULL,
                birth_date TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_friends_created ON friends(created_at);
            ",
        )?;
        Ok(())
    }

    /// Saves a session, replacing any existing record with the same ID.
    pub fn save_session(&mut self, session: &ExpenseSession) -> Result<(), DbError> {
        let participants = encode_payload(session.id.as_str(), &session.participants)?;
        let sub_expenses = encode_payload(session.id.as_str(), &session.sub_expenses)?;
        let results = encode_payload(session.id.as_str(), &session.results)?;

        self.conn.execute(
            "
            INSERT OR REPLACE INTO expense_sessions
            (id, name, total_expense, division_mode, global_days, participants, sub_expenses, results, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                session.id.as_str(),
                session.name,
                session.total_expense,
                session.division_mode.as_str(),
                session.global_days,
                participants,
                sub_expenses,
                results,
                format_timestamp(session.created_at),
                format_timestamp(session.updated_at),
            ],
        )?;
        tracing::debug!(session_id = %session.id, "session saved");
        Ok(())
    }

    /// Lists all saved sessions, newest first.
    pub fn list_sessions(&self) -> Result<Vec<ExpenseSession>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, total_expense, division_mode, global_days,
                   participants, sub_expenses, results, created_at, updated_at
            FROM expense_sessions
            ORDER BY created_at DESC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], session_row)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(decode_session(row?)?);
        }
        Ok(sessions)
    }

    /// Fetches a single session by ID.
    pub fn get_session(&self, id: &str) -> Result<Option<ExpenseSession>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, total_expense, division_mode, global_days,
                   participants, sub_expenses, results, created_at, updated_at
            FROM expense_sessions
            WHERE id = ?
            ",
        )?;
        let row = stmt.query_row([id], session_row).optional()?;
        row.map(decode_session).transpose()
    }

    /// Inserts a new friend record.
    pub fn insert_friend(&mut self, friend: &Friend) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO friends
            (id, name, surname, email, birth_date, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                friend.id.as_str(),
                friend.name,
                friend.surname,
                friend.email,
                friend.birth_date.format("%Y-%m-%d").to_string(),
                friend.description,
                format_timestamp(friend.created_at),
                format_timestamp(friend.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Lists all friends, most recently added first.
    pub fn list_friends(&self) -> Result<Vec<Friend>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, surname, email, birth_date, description, created_at, updated_at
            FROM friends
            ORDER BY created_at DESC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], friend_row)?;
        let mut friends = Vec::new();
        for row in rows {
            friends.push(decode_friend(row?)?);
        }
        Ok(friends)
    }

    /// Fetches a single friend by ID.
    pub fn get_friend(&self, id: &str) -> Result<Option<Friend>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, surname, email, birth_date, description, created_at, updated_at
            FROM friends
            WHERE id = ?
            ",
        )?;
        let row = stmt.query_row([id], friend_row).optional()?;
        row.map(decode_friend).transpose()
    }

    /// Updates an existing friend record. Returns false if the ID is unknown.
    pub fn update_friend(&mut self, friend: &Friend) -> Result<bool, DbError> {
        let updated = self.conn.execute(
            "
            UPDATE friends
            SET name = ?, surname = ?, email = ?, birth_date = ?, description = ?, updated_at = ?
            WHERE id = ?
            ",
            params![
                friend.name,
                friend.surname,
                friend.email,
                friend.birth_date.format("%Y-%m-%d").to_string(),
                friend.description,
                format_timestamp(friend.updated_at),
                friend.id.as_str(),
            ],
        )?;
        Ok(updated > 0)
    }

    /// Removes a friend record. Returns false if the ID is unknown.
    pub fn delete_friend(&mut self, id: &str) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM friends WHERE id = ?", [id])?;
        Ok(deleted > 0)
    }
}

/// A raw session row before payload decoding.
struct SessionRow {
    id: String,
    name: String,
    total_expense: f64,
    division_mode: String,
    global_days: Option<f64>,
    participants: String,
    sub_expenses: String,
    results: String,
    created_at: String,
    updated_at: String,
}

fn session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        name: row.get(1)?,
        total_expense: row.get(2)?,
        division_mode: row.get(3)?,
        global_days: row.get(4)?,
        participants: row.get(5)?,
        sub_expenses: row.get(6)?,
        results: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn decode_session(row: SessionRow) -> Result<ExpenseSession, DbError> {
    let division_mode: DivisionMode =
        row.division_mode
            .parse()
            .map_err(|_| DbError::InvalidRecordData {
                record_id: row.id.clone(),
                message: format!("unknown division mode {}", row.division_mode),
            })?;
    let participants: Vec<Participant> = decode_payload(&row.id, &row.participants)?;
    let sub_expenses: Vec<SubExpense> = decode_payload(&row.id, &row.sub_expenses)?;
    let results: Vec<ExpenseResult> = decode_payload(&row.id, &row.results)?;
    let created_at = parse_timestamp(&row.created_at, &row.id)?;
    let updated_at = parse_timestamp(&row.updated_at, &row.id)?;
    let id = SessionId::new(row.id.clone()).map_err(|err| DbError::InvalidRecordData {
        record_id: row.id,
        message: err.to_string(),
    })?;

    Ok(ExpenseSession {
        id,
        name: row.name,
        total_expense: row.total_expense,
        division_mode,
        global_days: row.global_days,
        participants,
        sub_expenses,
        results,
        created_at,
        updated_at,
    })
}

/// A raw friend row before date parsing.
struct FriendRow {
    id: String,
    name: String,
    surname: String,
    email: String,
    birth_date: String,
    description: Option<String>,
    created_at: String,
    updated_at: String,
}

fn friend_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FriendRow> {
    Ok(FriendRow {
        id: row.get(0)?,
        name: row.get(1)?,
        surname: row.get(2)?,
        email: row.get(3)?,
        birth_date: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn decode_friend(row: FriendRow) -> Result<Friend, DbError> {
    let birth_date = NaiveDate::parse_from_str(&row.birth_date, "%Y-%m-%d").map_err(|source| {
        DbError::TimestampParse {
            record_id: row.id.clone(),
            value: row.birth_date.clone(),
            source,
        }
    })?;
    let created_at = parse_timestamp(&row.created_at, &row.id)?;
    let updated_at = parse_timestamp(&row.updated_at, &row.id)?;
    let id = FriendId::new(row.id.clone()).map_err(|err| DbError::InvalidRecordData {
        record_id: row.id,
        message: err.to_string(),
    })?;

    Ok(Friend {
        id,
        name: row.name,
        surname: row.surname,
        email: row.email,
        birth_date,
        description: row.description,
        created_at,
        updated_at,
    })
}

fn encode_payload<T: serde::Serialize>(record_id: &str, value: &T) -> Result<String, DbError> {
    serde_json::to_string(value).map_err(|err| DbError::InvalidRecordData {
        record_id: record_id.to_string(),
        message: err.to_string(),
    })
}

fn decode_payload<T: serde::de::DeserializeOwned>(
    record_id: &str,
    payload: &str,
) -> Result<T, DbError> {
    serde_json::from_str(payload).map_err(|err| DbError::InvalidRecordData {
        record_id: record_id.to_string(),
        message: err.to_string(),
    })
}

fn parse_timestamp(timestamp: &str, record_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            record_id: record_id.to_string(),
            value: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
