/// SQLite-backed problem record store.
///
/// Persists `Problem` rows in a `problems` table. The two terminal updates
/// (`mark_solved`, `mark_error`) are guarded by `status = 'processing'` so a
/// record reaches a terminal state at most once; callers learn via the
/// returned bool whether their write actually transitioned the row.
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use snapsolve_core::{Problem, ProblemStatus, Solution};

/// Store interface for problem records: insert, fetch-by-id, terminal
/// updates, and a recent listing.
#[async_trait]
pub trait ProblemStore: Send + Sync {
    async fn insert(&self, problem: &Problem) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Problem>>;

    /// Move a `processing` record to `solved`, filling the solution fields.
    /// Returns false if the record was already terminal (or unknown).
    async fn mark_solved(&self, id: Uuid, recognized_eq: &str, solution: &Solution)
        -> Result<bool>;

    /// Move a `processing` record to `error` with the given message.
    /// Returns false if the record was already terminal (or unknown).
    async fn mark_error(&self, id: Uuid, message: &str) -> Result<bool>;

    /// Most recent problems, newest first, optionally filtered by owner.
    async fn list_recent(&self, owner_id: Option<&str>, limit: usize) -> Result<Vec<Problem>>;
}

pub struct SqliteProblemStore {
    conn: Mutex<Connection>,
}

impl SqliteProblemStore {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .context("Failed to open SQLite problem database")?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init_schema(&conn)?;
        info!("Problem store opened at {:?}", path.as_ref());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite")?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS problems (
                 id            TEXT PRIMARY KEY,
                 owner_id      TEXT,
                 image_url     TEXT NOT NULL,
                 status        TEXT NOT NULL,
                 recognized_eq TEXT,
                 latex_form    TEXT,
                 steps         TEXT NOT NULL DEFAULT '{}',
                 final_answer  TEXT,
                 error_message TEXT,
                 created_at    TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_problems_owner ON problems(owner_id);
             CREATE INDEX IF NOT EXISTS idx_problems_created ON problems(created_at);",
        )
        .context("Failed to initialize problems schema")?;
        Ok(())
    }
}

#[async_trait]
impl ProblemStore for SqliteProblemStore {
    async fn insert(&self, problem: &Problem) -> Result<()> {
        let conn = self.conn.lock().await;
        let steps_json = serde_json::to_string(&problem.steps)?;
        conn.execute(
            "INSERT INTO problems (id, owner_id, image_url, status, recognized_eq,
                                   latex_form, steps, final_answer, error_message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                problem.id.to_string(),
                problem.owner_id,
                problem.image_url,
                problem.status.as_str(),
                problem.recognized_eq,
                problem.latex_form,
                steps_json,
                problem.final_answer,
                problem.error_message,
                problem.created_at.to_rfc3339(),
            ],
        )?;
        debug!("Inserted problem {}", problem.id);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Problem>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, image_url, status, recognized_eq,
                    latex_form, steps, final_answer, error_message, created_at
             FROM problems WHERE id = ?1",
        )?;
        let mut rows = stmt
            .query_map(params![id.to_string()], row_to_problem)?
            .filter_map(|r| r.ok());
        Ok(rows.next())
    }

    async fn mark_solved(
        &self,
        id: Uuid,
        recognized_eq: &str,
        solution: &Solution,
    ) -> Result<bool> {
        let conn = self.conn.lock().await;
        let steps_json = serde_json::to_string(&solution.steps)?;
        let updated = conn.execute(
            "UPDATE problems
             SET status = 'solved', recognized_eq = ?2, latex_form = ?3,
                 steps = ?4, final_answer = ?5
             WHERE id = ?1 AND status = 'processing'",
            params![
                id.to_string(),
                recognized_eq,
                solution.latex,
                steps_json,
                solution.answer,
            ],
        )?;
        debug!(problem_id = %id, updated, "Marked problem solved");
        Ok(updated > 0)
    }

    async fn mark_error(&self, id: Uuid, message: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let updated = conn.execute(
            "UPDATE problems SET status = 'error', error_message = ?2
             WHERE id = ?1 AND status = 'processing'",
            params![id.to_string(), message],
        )?;
        debug!(problem_id = %id, updated, "Marked problem errored");
        Ok(updated > 0)
    }

    async fn list_recent(&self, owner_id: Option<&str>, limit: usize) -> Result<Vec<Problem>> {
        let conn = self.conn.lock().await;
        let problems = if let Some(owner) = owner_id {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, image_url, status, recognized_eq,
                        latex_form, steps, final_answer, error_message, created_at
                 FROM problems WHERE owner_id = ?1
                 ORDER BY created_at DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![owner, limit], row_to_problem)?
                .filter_map(|r| r.ok())
                .collect();
            rows
        } else {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, image_url, status, recognized_eq,
                        latex_form, steps, final_answer, error_message, created_at
                 FROM problems ORDER BY created_at DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], row_to_problem)?
                .filter_map(|r| r.ok())
                .collect();
            rows
        };
        Ok(problems)
    }
}

// ---------------------------------------------------------------------------
// Row deserialization helper
// ---------------------------------------------------------------------------

fn row_to_problem(row: &rusqlite::Row) -> rusqlite::Result<Problem> {
    let id_str: String = row.get(0)?;
    let owner_id: Option<String> = row.get(1)?;
    let image_url: String = row.get(2)?;
    let status_str: String = row.get(3)?;
    let recognized_eq: Option<String> = row.get(4)?;
    let latex_form: Option<String> = row.get(5)?;
    let steps_json: String = row.get(6)?;
    let final_answer: Option<String> = row.get(7)?;
    let error_message: Option<String> = row.get(8)?;
    let created_at_str: String = row.get(9)?;

    let id = Uuid::parse_str(&id_str)
        .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?;
    let status = ProblemStatus::parse(&status_str)
        .ok_or_else(|| rusqlite::Error::InvalidParameterName(format!("bad status: {status_str}")))?;
    let steps = serde_json::from_str(&steps_json)
        .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| rusqlite::Error::InvalidParameterName(e.to_string()))?
        .with_timezone(&chrono::Utc);

    Ok(Problem {
        id,
        owner_id,
        image_url,
        status,
        recognized_eq,
        latex_form,
        steps,
        final_answer,
        error_message,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn sample_solution() -> Solution {
        let mut steps = BTreeMap::new();
        steps.insert("1".to_string(), "Factor the quadratic".to_string());
        steps.insert("2".to_string(), "Set each factor to zero".to_string());
        Solution {
            latex: "x^2 + 5x + 6 = 0".to_string(),
            steps,
            answer: "x = -2 or x = -3".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_get_roundtrip() {
        let store = SqliteProblemStore::in_memory().unwrap();
        let problem = Problem::new(Some("user-1".into()), "/media/eq.png");
        store.insert(&problem).await.unwrap();

        let fetched = store.get(problem.id).await.unwrap().expect("problem exists");
        assert_eq!(fetched.id, problem.id);
        assert_eq!(fetched.owner_id.as_deref(), Some("user-1"));
        assert_eq!(fetched.image_url, "/media/eq.png");
        assert_eq!(fetched.status, ProblemStatus::Processing);
        assert!(fetched.steps.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_returns_none() {
        let store = SqliteProblemStore::in_memory().unwrap();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_solved_fills_solution_fields() {
        let store = SqliteProblemStore::in_memory().unwrap();
        let problem = Problem::new(None, "/media/eq.png");
        store.insert(&problem).await.unwrap();

        let transitioned = store
            .mark_solved(problem.id, "x^2 + 5x + 6 = 0", &sample_solution())
            .await
            .unwrap();
        assert!(transitioned);

        let fetched = store.get(problem.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProblemStatus::Solved);
        assert_eq!(fetched.recognized_eq.as_deref(), Some("x^2 + 5x + 6 = 0"));
        assert_eq!(fetched.final_answer.as_deref(), Some("x = -2 or x = -3"));
        assert_eq!(fetched.steps.len(), 2);
        assert!(fetched.error_message.is_none());
    }

    #[tokio::test]
    async fn test_terminal_state_reached_at_most_once() {
        let store = SqliteProblemStore::in_memory().unwrap();
        let problem = Problem::new(None, "/media/eq.png");
        store.insert(&problem).await.unwrap();

        assert!(store.mark_error(problem.id, "upstream failed").await.unwrap());
        // Second terminal write is a no-op in either direction.
        assert!(!store.mark_error(problem.id, "other").await.unwrap());
        assert!(!store
            .mark_solved(problem.id, "1 + 1 = 2", &sample_solution())
            .await
            .unwrap());

        let fetched = store.get(problem.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ProblemStatus::Error);
        assert_eq!(fetched.error_message.as_deref(), Some("upstream failed"));
        assert!(fetched.final_answer.is_none());
    }

    #[tokio::test]
    async fn test_mark_on_unknown_id_is_noop() {
        let store = SqliteProblemStore::in_memory().unwrap();
        assert!(!store.mark_error(Uuid::new_v4(), "nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_recent_orders_and_filters() {
        let store = SqliteProblemStore::in_memory().unwrap();

        let mut older = Problem::new(Some("alice".into()), "/media/a.png");
        let newer = Problem::new(Some("alice".into()), "/media/b.png");
        let other = Problem::new(Some("bob".into()), "/media/c.png");
        older.created_at = newer.created_at - Duration::seconds(10);

        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();
        store.insert(&other).await.unwrap();

        let alices = store.list_recent(Some("alice"), 50).await.unwrap();
        assert_eq!(alices.len(), 2);
        assert_eq!(alices[0].id, newer.id);
        assert_eq!(alices[1].id, older.id);

        let all = store.list_recent(None, 2).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
