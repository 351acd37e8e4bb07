//! Record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append physical records and resolve the current version per `uuid`.
//! - Store and query ownership edges between records.
//!
//! # Invariants
//! - `seq` is assigned by storage and strictly increases with insert order.
//! - Queries filter by `kind`, so a `uuid` reused by different kinds (an
//!   element and an IO value, say) never collides.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::kind::{EntityKind, Relation};
use crate::model::meta::{Document, EntityId, Meta};
use log::debug;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    r.seq AS seq,
    r.uuid AS uuid,
    r.kind AS kind,
    r.name AS name,
    r.summary AS summary,
    r.documentation AS documentation,
    r.version_label AS version_label,
    r.draft AS draft,
    r.creator AS creator,
    r.created_date AS created_date,
    r.updator AS updator,
    r.updated_date AS updated_date,
    r.body AS body,
    r.recorded_at AS recorded_at
FROM records r";

/// Storage-assigned sequence number of one physical record.
pub type RecordSeq = i64;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Entity body could not be encoded or decoded as JSON.
    Serialization(serde_json::Error),
    /// Persisted row violates a record invariant.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "record body serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "record repository requires table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// One physical record: an entity version as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub seq: RecordSeq,
    pub kind: EntityKind,
    pub meta: Meta,
    /// JSON object with the entity's own fields; owned collections excluded.
    pub body: String,
    /// Epoch milliseconds at insert time.
    pub recorded_at: i64,
}

/// Repository interface for the identity and versioning layer.
pub trait RecordRepository {
    /// Appends one physical record and returns its new sequence number.
    fn insert_record(&self, kind: EntityKind, meta: &Meta, body: &str) -> RepoResult<RecordSeq>;
    /// Records that `child` sits at `position` of `parent`'s `relation`.
    fn link_child(
        &self,
        parent: RecordSeq,
        relation: Relation,
        position: usize,
        child: RecordSeq,
    ) -> RepoResult<()>;
    /// Returns the record with the greatest `seq` for `(kind, uuid)`.
    fn current_version(&self, kind: EntityKind, uuid: EntityId)
        -> RepoResult<Option<StoredRecord>>;
    /// Returns whether any record exists for `(kind, uuid)`.
    fn exists(&self, kind: EntityKind, uuid: EntityId) -> RepoResult<bool>;
    /// Lists every retained version for `(kind, uuid)`, oldest first.
    fn list_versions(&self, kind: EntityKind, uuid: EntityId) -> RepoResult<Vec<StoredRecord>>;
    /// Lists the current version of up to `limit` distinct `uuid`s of `kind`,
    /// newest first.
    fn list_current_by_kind(&self, kind: EntityKind, limit: u32)
        -> RepoResult<Vec<StoredRecord>>;
    /// Lists the children linked under `parent` for `relation`, in declared
    /// order, keeping only the greatest `seq` per child `uuid`.
    fn owned_children(&self, parent: RecordSeq, relation: Relation)
        -> RepoResult<Vec<StoredRecord>>;
    /// Deletes every version of `(kind, uuid)`; returns removed record count.
    ///
    /// Child records linked from the removed records are left in place.
    fn delete_versions(&self, kind: EntityKind, uuid: EntityId) -> RepoResult<usize>;
    /// Runs `f` inside one write transaction; any `Err` rolls everything back.
    fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        Self: Sized,
        E: From<RepoError>,
        F: FnOnce(&Self) -> Result<T, E>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_record_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn insert_record(&self, kind: EntityKind, meta: &Meta, body: &str) -> RepoResult<RecordSeq> {
        let documentation = meta
            .documentation
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO records (
                uuid,
                kind,
                name,
                summary,
                documentation,
                version_label,
                draft,
                creator,
                created_date,
                updator,
                updated_date,
                body,
                recorded_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                meta.uuid.to_string(),
                kind.as_str(),
                non_empty(&meta.name),
                non_empty(&meta.summary),
                documentation,
                non_empty(&meta.version),
                bool_to_int(meta.draft),
                non_empty(&meta.creator),
                meta.created_date.as_deref(),
                non_empty(&meta.updator),
                meta.updated_date.as_deref(),
                body,
                now_epoch_ms(),
            ],
        )?;

        let seq = self.conn.last_insert_rowid();
        debug!(
            "event=record_insert module=repo status=ok kind={kind} uuid={} seq={seq}",
            meta.uuid
        );
        Ok(seq)
    }

    fn link_child(
        &self,
        parent: RecordSeq,
        relation: Relation,
        position: usize,
        child: RecordSeq,
    ) -> RepoResult<()> {
        let position = i64::try_from(position).map_err(|_| {
            RepoError::InvalidData(format!("link position {position} exceeds storage range"))
        })?;
        self.conn.execute(
            "INSERT INTO record_links (parent_seq, relation, position, child_seq)
             VALUES (?1, ?2, ?3, ?4);",
            params![parent, relation.label(), position, child],
        )?;
        Ok(())
    }

    fn current_version(
        &self,
        kind: EntityKind,
        uuid: EntityId,
    ) -> RepoResult<Option<StoredRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE r.kind = ?1
               AND r.uuid = ?2
             ORDER BY r.seq DESC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![kind.as_str(), uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn exists(&self, kind: EntityKind, uuid: EntityId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM records
                WHERE kind = ?1
                  AND uuid = ?2
            );",
            params![kind.as_str(), uuid.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn list_versions(&self, kind: EntityKind, uuid: EntityId) -> RepoResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE r.kind = ?1
               AND r.uuid = ?2
             ORDER BY r.seq ASC;"
        ))?;
        let mut rows = stmt.query(params![kind.as_str(), uuid.to_string()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn list_current_by_kind(
        &self,
        kind: EntityKind,
        limit: u32,
    ) -> RepoResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             INNER JOIN (
                SELECT MAX(seq) AS seq
                FROM records
                WHERE kind = ?1
                GROUP BY uuid
             ) latest ON latest.seq = r.seq
             ORDER BY r.seq DESC
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![kind.as_str(), i64::from(limit)])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn owned_children(
        &self,
        parent: RecordSeq,
        relation: Relation,
    ) -> RepoResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             INNER JOIN record_links l ON l.child_seq = r.seq
             WHERE l.parent_seq = ?1
               AND l.relation = ?2
               AND r.seq = (
                 SELECT MAX(sibling.seq)
                 FROM record_links sibling_link
                 INNER JOIN records sibling ON sibling.seq = sibling_link.child_seq
                 WHERE sibling_link.parent_seq = l.parent_seq
                   AND sibling_link.relation = l.relation
                   AND sibling.uuid = r.uuid
               )
             ORDER BY l.position ASC, r.seq ASC;"
        ))?;
        let mut rows = stmt.query(params![parent, relation.label()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let record = parse_record_row(row)?;
            if record.kind != relation.child_kind() {
                return Err(RepoError::InvalidData(format!(
                    "record {} of kind `{}` linked as `{}`",
                    record.seq,
                    record.kind,
                    relation.label()
                )));
            }
            records.push(record);
        }
        Ok(records)
    }

    fn delete_versions(&self, kind: EntityKind, uuid: EntityId) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM records
             WHERE kind = ?1
               AND uuid = ?2;",
            params![kind.as_str(), uuid.to_string()],
        )?;
        Ok(removed)
    }

    fn in_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce(&Self) -> Result<T, E>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(|err| E::from(RepoError::from(err)))?;
        // Dropping `tx` on the error path rolls back.
        let value = f(self)?;
        tx.commit().map_err(|err| E::from(RepoError::from(err)))?;
        Ok(value)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<StoredRecord> {
    let seq: RecordSeq = row.get("seq")?;

    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in records.uuid"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = EntityKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid kind `{kind_text}` in records.kind"))
    })?;

    let draft = match row.get::<_, i64>("draft")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid draft value `{other}` in records.draft"
            )));
        }
    };

    let documentation = row
        .get::<_, Option<String>>("documentation")?
        .map(|text| serde_json::from_str::<Document>(&text))
        .transpose()?;

    let meta = Meta {
        uuid,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        summary: row.get::<_, Option<String>>("summary")?.unwrap_or_default(),
        documentation,
        version: row
            .get::<_, Option<String>>("version_label")?
            .unwrap_or_default(),
        draft,
        creator: row.get::<_, Option<String>>("creator")?.unwrap_or_default(),
        created_date: row.get("created_date")?,
        updator: row.get::<_, Option<String>>("updator")?.unwrap_or_default(),
        updated_date: row.get("updated_date")?,
    };

    Ok(StoredRecord {
        seq,
        kind,
        meta,
        body: row.get("body")?,
        recorded_at: row.get("recorded_at")?,
    })
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Wall-clock insert time in epoch milliseconds.
fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_record_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["records", "record_links"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}
