use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

use crate::judge::EvaluationOutcome;

const DATABASE_NAME: &str = "mission.sqlite3";

pub fn get_db_path() -> PathBuf {
    use directories::ProjectDirs;

    let proj_dirs = ProjectDirs::from("", "", "mission").expect("Unable to find user directory");
    let data_dir = proj_dirs.data_local_dir();

    fs::create_dir_all(data_dir).expect("Failed to create local data dir");

    data_dir.join(DATABASE_NAME)
}

pub async fn init_db(db_path: impl AsRef<Path>) -> sqlx::Result<SqlitePool> {
    let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display()); // rwc = read/write/create
    let db_pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(&db_url)
        .await?;

    for sql in &[
        "PRAGMA foreign_keys = ON;",
        "PRAGMA busy_timeout = 2000;", // 2 seconds timeout for lock contention
        "PRAGMA journal_mode = WAL;",  // Write-Ahead Logging for better concurrency
        "PRAGMA synchronous = NORMAL;", // Balance between safety and performance
        r"
        CREATE TABLE IF NOT EXISTS submissions (
            id            INTEGER  PRIMARY KEY AUTOINCREMENT,
            user_id       INTEGER  NOT NULL,
            challenge_id  INTEGER  NOT NULL,
            code          TEXT     NOT NULL,
            language      TEXT     NOT NULL,
            result        TEXT     NOT NULL,
            passed        INTEGER  NOT NULL,
            created_time  TEXT     NOT NULL
        );",
        "CREATE INDEX IF NOT EXISTS idx_submissions_user
         ON submissions(user_id, challenge_id, created_time);",
        r"
        CREATE TABLE IF NOT EXISTS challenge_progress (
            user_id          INTEGER  PRIMARY KEY,
            challenge_id     INTEGER  NOT NULL,
            completed        INTEGER  NOT NULL DEFAULT 0,
            submission_date  TEXT     NOT NULL
        );",
    ] {
        sqlx::query(sql).execute(&db_pool).await?;
    }

    log::info!("Initialized database at {}", db_path.as_ref().display());

    Ok(db_pool)
}

pub fn remove_db(db_path: impl AsRef<Path>) {
    // Remove WAL and SHM files (ignore errors as they might not exist)
    let wal_path = format!("{}-wal", db_path.as_ref().display());
    let shm_path = format!("{}-shm", db_path.as_ref().display());
    let _ = fs::remove_file(wal_path);
    let _ = fs::remove_file(shm_path);

    if let Err(e) = std::fs::remove_file(&db_path) {
        log::warn!(
            "Unable to remove database at {}: {e}",
            db_path.as_ref().display()
        );
    } else {
        log::info!("Removed database at {}", db_path.as_ref().display());
    }
}

/// One immutable ledger entry per evaluation attempt
#[derive(Serialize, Debug, Clone)]
pub struct SubmissionRecord {
    pub id: i64,
    pub user_id: i64,
    pub challenge_id: u32,
    pub code: String,
    pub language: String,
    pub result: EvaluationOutcome,
    pub passed: bool,
    pub created_time: String,
}

/// The candidate's code-challenge completion flag
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChallengeProgress {
    pub challenge_id: u32,
    pub completed: bool,
    pub submission_date: String,
}

/// Appends one submission to the ledger. Never updates an existing row:
/// rapid-fire duplicate submits each get their own entry.
///
/// `passed` is derived from the evaluation status, not supplied by the
/// caller.
pub async fn record_submission(
    user_id: i64,
    challenge_id: u32,
    code: &str,
    language: &str,
    result: &EvaluationOutcome,
    pool: Arc<SqlitePool>,
) -> anyhow::Result<SubmissionRecord> {
    let created_time = crate::create_timestamp();
    let passed = result.passed();
    let result_json = serde_json::to_string(result)?;

    let insert = sqlx::query(
        r#"
        INSERT INTO submissions (user_id, challenge_id, code, language, result, passed, created_time)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(challenge_id)
    .bind(code)
    .bind(language)
    .bind(&result_json)
    .bind(passed)
    .bind(&created_time)
    .execute(pool.as_ref())
    .await?;

    Ok(SubmissionRecord {
        id: insert.last_insert_rowid(),
        user_id,
        challenge_id,
        code: code.to_string(),
        language: language.to_string(),
        result: result.clone(),
        passed,
        created_time,
    })
}

/// Flags the challenge as completed for this user, unconditionally.
///
/// Completion tracks that the candidate attempted the challenge; it is
/// independent of whether any recorded submission passed.
pub async fn mark_attempted(
    user_id: i64,
    challenge_id: u32,
    pool: Arc<SqlitePool>,
) -> sqlx::Result<()> {
    let now = crate::create_timestamp();

    sqlx::query(
        r#"
        INSERT INTO challenge_progress (user_id, challenge_id, completed, submission_date)
        VALUES (?, ?, 1, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            challenge_id = excluded.challenge_id,
            completed = 1,
            submission_date = excluded.submission_date
        "#,
    )
    .bind(user_id)
    .bind(challenge_id)
    .bind(&now)
    .execute(pool.as_ref())
    .await?;

    Ok(())
}

pub async fn fetch_progress(
    user_id: i64,
    pool: Arc<SqlitePool>,
) -> sqlx::Result<Option<ChallengeProgress>> {
    let row = sqlx::query(
        r#"
        SELECT challenge_id, completed, submission_date
        FROM challenge_progress
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool.as_ref())
    .await?;

    Ok(row.map(|row| ChallengeProgress {
        challenge_id: row.get::<i64, _>("challenge_id") as u32,
        completed: row.get::<i64, _>("completed") != 0,
        submission_date: row.get("submission_date"),
    }))
}

/// The user's most recent ledger entry for a challenge, if any
pub async fn latest_submission(
    user_id: i64,
    challenge_id: u32,
    pool: Arc<SqlitePool>,
) -> anyhow::Result<Option<SubmissionRecord>> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, challenge_id, code, language, result, passed, created_time
        FROM submissions
        WHERE user_id = ? AND challenge_id = ?
        ORDER BY created_time DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(challenge_id)
    .fetch_optional(pool.as_ref())
    .await?;

    row.map(submission_from_row).transpose()
}

fn submission_from_row(row: SqliteRow) -> anyhow::Result<SubmissionRecord> {
    let result_json: String = row.get("result");
    let result: EvaluationOutcome = serde_json::from_str(&result_json)?;

    Ok(SubmissionRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        challenge_id: row.get::<i64, _>("challenge_id") as u32,
        code: row.get("code"),
        language: row.get("language"),
        result,
        passed: row.get::<i64, _>("passed") != 0,
        created_time: row.get("created_time"),
    })
}
