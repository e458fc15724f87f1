use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{AuthApi, BackendError, MIN_PASSWORD_LEN, TaskStore};
use crate::models::{AuthSession, Category, Credentials, NewTask, Profile, Task, User};

/// Local stand-in for a hosted auth + database service, backed by one SQLite file
pub struct SqliteBackend {
    conn: Connection,
    hash_cost: u32,
}

impl SqliteBackend {
    /// Open (or create) the database at `path` and initialize the schema
    pub fn new(path: &str) -> Result<Self, BackendError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BackendError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, gone when dropped
    pub fn open_in_memory() -> Result<Self, BackendError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, BackendError> {
        let backend = SqliteBackend {
            conn,
            hash_cost: bcrypt::DEFAULT_COST,
        };
        backend.initialize_schema()?;
        Ok(backend)
    }

    /// Override the bcrypt work factor (tests use the minimum)
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn initialize_schema(&self) -> Result<(), BackendError> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id              TEXT PRIMARY KEY,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS auth_sessions (
                access_token    TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS profiles (
                id              TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                email           TEXT NOT NULL,
                full_name       TEXT,
                avatar_url      TEXT,
                study_goal      INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title           TEXT NOT NULL,
                category        TEXT NOT NULL,
                start_time      TEXT NOT NULL,
                end_time        TEXT,
                duration        INTEGER NOT NULL DEFAULT 0,
                is_productive   INTEGER NOT NULL DEFAULT 1,
                notes           TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_user_start ON tasks(user_id, start_time);",
        )?;
        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Resolve an access token to its user id, rejecting revoked or forged sessions
    fn authenticate(&self, session: &AuthSession) -> Result<String, BackendError> {
        let user_id: Option<String> = self
            .conn
            .query_row(
                "SELECT user_id FROM auth_sessions WHERE access_token = ?1",
                rusqlite::params![session.access_token],
                |row| row.get(0),
            )
            .optional()?;

        match user_id {
            Some(id) if id == session.user.id => Ok(id),
            _ => Err(BackendError::NotAuthenticated),
        }
    }

    /// Helper function to map a row to a Task
    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        let category: String = row.get(3)?;
        let category = category.parse::<Category>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Task {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            category,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            duration: row.get(6)?,
            is_productive: row.get::<_, i64>(7)? != 0,
            notes: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthApi for SqliteBackend {
    fn sign_up(&self, credentials: &Credentials) -> Result<User, BackendError> {
        let email = normalize_email(&credentials.email);
        if !email.contains('@') {
            return Err(BackendError::InvalidRequest(
                "Unable to validate email address: invalid format".to_string(),
            ));
        }
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::WeakPassword(MIN_PASSWORD_LEN));
        }

        let exists: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            rusqlite::params![email],
            |row| row.get(0),
        )?;
        if exists > 0 {
            info!(%email, "sign-up rejected, email already registered");
            return Err(BackendError::UserAlreadyRegistered);
        }

        let password_hash = bcrypt::hash(&credentials.password, self.hash_cost)?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
        };
        let now = Utc::now();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user.id, user.email, password_hash, db_time(now)],
        )?;
        tx.execute(
            "INSERT INTO profiles (id, email, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![user.id, user.email, db_time(now)],
        )?;
        tx.commit()?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession, BackendError> {
        let email = normalize_email(&credentials.email);
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?1",
                rusqlite::params![email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((user_id, password_hash)) = row else {
            info!(%email, "sign-in for unknown email");
            return Err(BackendError::InvalidCredentials);
        };

        if !bcrypt::verify(&credentials.password, &password_hash)? {
            info!(%email, "sign-in with wrong password");
            return Err(BackendError::InvalidCredentials);
        }

        let session = AuthSession {
            access_token: Uuid::new_v4().to_string(),
            user: User { id: user_id, email },
        };
        self.conn.execute(
            "INSERT INTO auth_sessions (access_token, user_id, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![session.access_token, session.user.id, db_time(Utc::now())],
        )?;

        info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    fn sign_out(&self, session: &AuthSession) -> Result<(), BackendError> {
        let removed = self.conn.execute(
            "DELETE FROM auth_sessions WHERE access_token = ?1",
            rusqlite::params![session.access_token],
        )?;
        // Revoking an already revoked token still counts as signed out
        if removed == 0 {
            warn!(user_id = %session.user.id, "sign-out for a token that was not active");
        } else {
            info!(user_id = %session.user.id, "signed out");
        }
        Ok(())
    }

    fn get_profile(&self, session: &AuthSession) -> Result<Option<Profile>, BackendError> {
        let user_id = self.authenticate(session)?;
        let profile = self
            .conn
            .query_row(
                "SELECT id, email, full_name, avatar_url, study_goal, created_at
                 FROM profiles WHERE id = ?1",
                rusqlite::params![user_id],
                |row| {
                    Ok(Profile {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        full_name: row.get(2)?,
                        avatar_url: row.get(3)?,
                        study_goal: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }
}

impl TaskStore for SqliteBackend {
    fn list_tasks(&self, session: &AuthSession, user_id: &str) -> Result<Vec<Task>, BackendError> {
        let owner = self.authenticate(session)?;

        // Row-level security: other users' rows are simply not visible
        if owner != user_id {
            debug!(%owner, requested = %user_id, "list for another user filtered to nothing");
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, category, start_time, end_time, duration, is_productive, notes, created_at
             FROM tasks WHERE user_id = ?1 ORDER BY start_time DESC",
        )?;
        let tasks = stmt
            .query_map(rusqlite::params![user_id], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = tasks.len(), "tasks loaded");
        Ok(tasks)
    }

    fn insert_task(&self, session: &AuthSession, task: &NewTask) -> Result<Task, BackendError> {
        let owner = self.authenticate(session)?;
        if owner != task.user_id {
            warn!(%owner, row_user = %task.user_id, "insert for another user rejected");
            return Err(BackendError::PermissionDenied);
        }

        let id = Uuid::new_v4().to_string();
        let created_at: DateTime<Utc> = Utc::now().trunc_subsecs(6);

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tasks (id, user_id, title, category, start_time, end_time, duration, is_productive, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                id,
                task.user_id,
                task.title,
                task.category.id(),
                db_time(task.start_time),
                task.end_time.map(db_time),
                task.duration,
                if task.is_productive { 1 } else { 0 },
                task.notes,
                db_time(created_at)
            ],
        )?;
        tx.commit()?;

        info!(task_id = %id, duration = task.duration, category = task.category.id(), "task inserted");
        Ok(Task {
            id,
            user_id: task.user_id.clone(),
            title: task.title.clone(),
            category: task.category,
            start_time: task.start_time.trunc_subsecs(6),
            end_time: task.end_time.map(|t| t.trunc_subsecs(6)),
            duration: task.duration,
            is_productive: task.is_productive,
            notes: task.notes.clone(),
            created_at,
        })
    }
}

/// Fixed-width RFC 3339 in UTC, so text order matches time order.
/// Values read back are truncated to microseconds.
fn db_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, false)
}
