//! SQLite-backed inventory store.
//!
//! ## Transactions
//!
//! Every mutating operation opens one `BEGIN IMMEDIATE` transaction, reads
//! and writes on it, and commits as a unit. The write lock is taken up front,
//! so concurrent writers wait on the busy timeout and run one after another.
//! Any early return drops the transaction, which rolls it back; callers never
//! observe a half-applied change (a pack row without its links, a course
//! without refreshed `parts`).
//!
//! ## Thread Safety
//!
//! `SqliteInventory` is `Send + Sync` and cheap to clone. Nothing is cached
//! between calls: every read goes back to the database.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool, Transaction};

use polybase_core::{CourseId, DomainError, PackId};
use polybase_inventory::pack::sort_members;
use polybase_inventory::{Course, MemberStock, Pack};

use super::schema::apply_schema;
use crate::audit::AuditLog;
use crate::config::{Config, DatabaseConfig};
use crate::error::{InventoryResult, store};

/// How long a writer waits for the database write lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Course and pack store over a shared SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteInventory {
    pub(super) pool: SqlitePool,
    pub(super) audit: AuditLog,
}

impl SqliteInventory {
    /// Open (creating if needed) the database file and apply the schema.
    pub async fn connect(config: &DatabaseConfig, audit: AuditLog) -> InventoryResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(store("connect"))?;

        tracing::info!(path = %config.path.display(), "connected to inventory database");
        Self::from_pool(pool, audit).await
    }

    /// Wire the store from a loaded [`Config`]: database file and audit trail.
    pub async fn from_config(config: &Config) -> InventoryResult<Self> {
        let audit = AuditLog::from_config(&config.audit);
        if !audit.is_enabled() {
            tracing::warn!("audit log disabled");
        }
        Self::connect(&config.database, audit).await
    }

    /// Private in-memory database.
    ///
    /// The pool holds exactly one connection for its whole lifetime: an
    /// in-memory SQLite database lives and dies with its connection.
    pub async fn in_memory(audit: AuditLog) -> InventoryResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(store("connect"))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(store("connect"))?;

        Self::from_pool(pool, audit).await
    }

    pub async fn from_pool(pool: SqlitePool, audit: AuditLog) -> InventoryResult<Self> {
        apply_schema(&pool).await.map_err(store("apply_schema"))?;
        Ok(Self { pool, audit })
    }

    /// Open a write transaction holding the database write lock.
    pub(super) async fn begin_write(&self) -> InventoryResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(store("begin_transaction"))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }
}

// SQLx row types

#[derive(Debug, FromRow)]
pub(super) struct CourseRow {
    code: String,
    kind: String,
    part: i64,
    parts: i64,
    name: String,
    quantity: i64,
    total: i64,
    shown: bool,
    semester: String,
}

impl CourseRow {
    pub(super) fn into_course(self) -> Result<Course, sqlx::Error> {
        let semester = self
            .semester
            .parse()
            .map_err(|e: DomainError| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Course {
            id: CourseId::new(self.code, self.kind, self.part),
            parts: self.parts,
            name: self.name,
            quantity: self.quantity,
            total: self.total,
            shown: self.shown,
            semester,
        })
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    code: String,
    kind: String,
    part: i64,
    quantity: i64,
    total: i64,
}

// Connection-level helpers, shared by the course, pack and quantity operations.
// They take a bare connection so they run equally on a pool connection or
// inside a transaction.

pub(super) async fn fetch_course(
    conn: &mut SqliteConnection,
    id: &CourseId,
) -> Result<Option<Course>, sqlx::Error> {
    let row = sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT code, kind, part, parts, name, quantity, total, shown, semester
        FROM courses
        WHERE code = ?1 AND kind = ?2 AND part = ?3
        "#,
    )
    .bind(&id.code)
    .bind(&id.kind)
    .bind(id.part)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(CourseRow::into_course).transpose()
}

pub(super) async fn course_exists(
    conn: &mut SqliteConnection,
    id: &CourseId,
) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM courses WHERE code = ?1 AND kind = ?2 AND part = ?3",
    )
    .bind(&id.code)
    .bind(&id.kind)
    .bind(id.part)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(found.is_some())
}

pub(super) async fn pack_exists(conn: &mut SqliteConnection, id: PackId) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM packs WHERE id = ?1")
        .bind(id.as_i64())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Set `parts` to the highest surviving `part` across a `(code, kind)` family.
pub(super) async fn refresh_parts(
    conn: &mut SqliteConnection,
    code: &str,
    kind: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE courses
        SET parts = (
            SELECT COALESCE(MAX(part), 0)
            FROM courses
            WHERE code = ?1 AND kind = ?2
        )
        WHERE code = ?1 AND kind = ?2
        "#,
    )
    .bind(code)
    .bind(kind)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Members of a pack in canonical order. Links are resolved through
/// `courses`, so a link can only surface for a course that exists.
pub(super) async fn fetch_members(
    conn: &mut SqliteConnection,
    pack: PackId,
) -> Result<Vec<CourseId>, sqlx::Error> {
    let mut members: Vec<CourseId> = fetch_member_stock(conn, pack)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    sort_members(&mut members);
    Ok(members)
}

pub(super) async fn fetch_member_stock(
    conn: &mut SqliteConnection,
    pack: PackId,
) -> Result<Vec<MemberStock>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT c.code, c.kind, c.part, c.quantity, c.total
        FROM courses c
        JOIN pack_courses pc ON c.code = pc.course_code
          AND c.kind = pc.course_kind
          AND c.part = pc.course_part
        WHERE pc.pack_id = ?1
        "#,
    )
    .bind(pack.as_i64())
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| MemberStock {
            id: CourseId::new(r.code, r.kind, r.part),
            quantity: r.quantity,
            total: r.total,
        })
        .collect())
}

pub(super) async fn fetch_pack(
    conn: &mut SqliteConnection,
    id: PackId,
) -> Result<Option<Pack>, sqlx::Error> {
    let name: Option<String> = sqlx::query_scalar("SELECT name FROM packs WHERE id = ?1")
        .bind(id.as_i64())
        .fetch_optional(&mut *conn)
        .await?;

    let Some(name) = name else {
        return Ok(None);
    };

    let courses = fetch_members(conn, id).await?;
    Ok(Some(Pack { id, name, courses }))
}

pub(super) async fn insert_links(
    conn: &mut SqliteConnection,
    pack: PackId,
    courses: &[CourseId],
) -> Result<(), sqlx::Error> {
    for course in courses {
        sqlx::query(
            r#"
            INSERT INTO pack_courses (pack_id, course_code, course_kind, course_part)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(pack.as_i64())
        .bind(&course.code)
        .bind(&course.kind)
        .bind(course.part)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
