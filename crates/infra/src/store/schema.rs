//! Table definitions, applied idempotently at connect time.
//!
//! `pack_courses` cascades on pack deletion and follows course renames
//! (`ON UPDATE CASCADE`). Course deletion is not cascaded: the store removes
//! the links itself inside the deleting transaction.

use sqlx::SqlitePool;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        code     TEXT    NOT NULL,
        kind     TEXT    NOT NULL,
        part     INTEGER NOT NULL DEFAULT 1,
        parts    INTEGER NOT NULL DEFAULT 1,
        name     TEXT    NOT NULL DEFAULT '',
        quantity INTEGER NOT NULL,
        total    INTEGER NOT NULL,
        shown    INTEGER NOT NULL DEFAULT 1,
        semester TEXT    NOT NULL,
        PRIMARY KEY (code, kind, part)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS packs (
        id   INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pack_courses (
        pack_id     INTEGER NOT NULL,
        course_code TEXT    NOT NULL,
        course_kind TEXT    NOT NULL,
        course_part INTEGER NOT NULL,
        PRIMARY KEY (pack_id, course_code, course_kind, course_part),
        FOREIGN KEY (pack_id) REFERENCES packs(id) ON DELETE CASCADE,
        FOREIGN KEY (course_code, course_kind, course_part)
            REFERENCES courses(code, kind, part) ON UPDATE CASCADE
    )
    "#,
];

pub async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
