//! SQLite-based storage implementation
//!
//! Users and rooms are kept as JSON documents so compiled search filters can
//! run against them through `json_extract`/`json_each`. Requests are plain
//! rows; a partial unique index allows one pending request per
//! (room, requester).

use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use roomshare_core::{
    Filter, Query, RequestId, RequestStatus, Room, RoomId, RoomRequest, RoomUpdate,
    RoommateProfile, User, UserId,
};
use rusqlite::types::{Type, Value as SqlValue};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::{
    PendingVerification, RequestStore, RoomStore, Session, SessionId, SessionStore, StoreResult,
    UserStore,
};
use crate::error::MarketError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

const REQUEST_COLUMNS: &str =
    "id, room_id, requester_id, owner_id, message, status, created_at, updated_at";

/// SQLite-based store implementing every storage trait
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn db_err(e: rusqlite::Error) -> MarketError {
    MarketError::Internal(e.to_string())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation)
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, MarketError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::from_connection(conn)
    }

    /// A private in-memory database
    pub fn open_in_memory() -> Result<Self, MarketError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, MarketError> {
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), MarketError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(db_err)?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, MarketError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(db_err)?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(db_err)
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), MarketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS users (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                aadhar_number TEXT NOT NULL UNIQUE,
                doc TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS rooms (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                owner_id TEXT NOT NULL,
                doc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_rooms_owner ON rooms(owner_id);

            CREATE TABLE IF NOT EXISTS room_requests (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                room_id TEXT NOT NULL,
                requester_id TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                message TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_requests_one_pending
                ON room_requests(room_id, requester_id) WHERE status = 'pending';
            CREATE INDEX IF NOT EXISTS idx_requests_owner ON room_requests(owner_id, status);
            CREATE INDEX IF NOT EXISTS idx_requests_requester ON room_requests(requester_id);

            CREATE TABLE IF NOT EXISTS pending_verifications (
                email TEXT PRIMARY KEY,
                code TEXT NOT NULL,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(db_err)?;

        Ok(())
    }

    /// Read-modify-write a user document while holding the connection
    fn modify_user<F>(&self, user_id: UserId, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut User),
    {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT doc FROM users WHERE id = ?1",
                params![user_id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        let mut user: User = decode(&raw.ok_or(MarketError::NotFound("User"))?)?;
        f(&mut user);
        user.updated_at = Utc::now();
        conn.execute(
            "UPDATE users SET doc = ?1 WHERE id = ?2",
            params![encode(&user)?, user_id.to_string()],
        )
        .map_err(db_err)?;
        Ok(())
    }

    /// Read-modify-write one room inside a transaction
    ///
    /// `f` decides whether the change is written; the written room is returned.
    fn modify_room<F>(&self, room_id: RoomId, f: F) -> StoreResult<Option<Room>>
    where
        F: FnOnce(&mut Room) -> StoreResult<bool>,
    {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(db_err)?;
        let raw: Option<String> = tx
            .query_row(
                "SELECT doc FROM rooms WHERE id = ?1",
                params![room_id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        let mut room: Room = decode(&raw.ok_or(MarketError::NotFound("Room"))?)?;
        if !f(&mut room)? {
            return Ok(None);
        }
        tx.execute(
            "UPDATE rooms SET doc = ?1 WHERE id = ?2",
            params![encode(&room)?, room_id.to_string()],
        )
        .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        Ok(Some(room))
    }

    /// Run a compiled query over one of the document tables
    fn find_docs<T: DeserializeOwned>(&self, table: &str, query: &Query) -> StoreResult<Vec<T>> {
        let mut args = Vec::new();
        let predicate = filter_sql(&query.filter, &mut args)?;
        let sort_key = json_extract(query.sort.field)?;
        let direction = query.sort.direction.as_sql();
        let sql = format!(
            "SELECT doc FROM {table} WHERE {predicate} \
             ORDER BY {sort_key} {direction}, seq {direction} LIMIT ? OFFSET ?"
        );
        args.push(SqlValue::Integer(query.page.limit as i64));
        args.push(SqlValue::Integer(
            i64::try_from(query.page.skip()).unwrap_or(i64::MAX),
        ));

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| row.get::<_, String>(0))
            .map_err(db_err)?;

        let mut docs = Vec::new();
        for raw in rows {
            docs.push(decode(&raw.map_err(db_err)?)?);
        }
        Ok(docs)
    }

    fn count_docs(&self, table: &str, filter: &Filter) -> StoreResult<u64> {
        let mut args = Vec::new();
        let predicate = filter_sql(filter, &mut args)?;
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE {predicate}");

        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(&sql, params_from_iter(args.iter()), |row| row.get(0))
            .map_err(db_err)?;
        Ok(count as u64)
    }

    fn query_requests(
        &self,
        clause: &str,
        args: &[SqlValue],
    ) -> StoreResult<Vec<RoomRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM room_requests WHERE {clause}");
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), request_from_row)
            .map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }
}

fn encode<T: serde::Serialize>(doc: &T) -> StoreResult<String> {
    serde_json::to_string(doc).map_err(MarketError::internal)
}

fn decode<T: DeserializeOwned>(raw: &str) -> StoreResult<T> {
    serde_json::from_str(raw).map_err(MarketError::internal)
}

/// `json_extract(doc, '$.<path>')` for a compiler-chosen field path
fn json_extract(field: &str) -> StoreResult<String> {
    Ok(format!("json_extract(doc, '{}')", json_path(field)?))
}

fn json_path(field: &str) -> StoreResult<String> {
    if field.is_empty()
        || !field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return Err(MarketError::Internal(format!(
            "refusing unsafe field path {:?}",
            field
        )));
    }
    Ok(format!("$.{}", field))
}

fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Translate a filter into a SQL predicate, appending positional arguments
fn filter_sql(filter: &Filter, args: &mut Vec<SqlValue>) -> StoreResult<String> {
    let sql = match filter {
        Filter::Eq(field, Value::Null) => format!("{} IS NULL", json_extract(field)?),
        Filter::Eq(field, value) => {
            args.push(json_to_sql(value));
            format!("{} = ?", json_extract(field)?)
        }
        Filter::Contains(field, needle) => {
            args.push(SqlValue::Text(needle.clone()));
            format!("instr(lower({}), ?) > 0", json_extract(field)?)
        }
        Filter::Range { field, min, max } => {
            let column = json_extract(field)?;
            let mut parts = Vec::new();
            if let Some(min) = min {
                args.push(SqlValue::Integer(*min));
                parts.push(format!("{} >= ?", column));
            }
            if let Some(max) = max {
                args.push(SqlValue::Integer(*max));
                parts.push(format!("{} <= ?", column));
            }
            if parts.is_empty() {
                format!("{} IS NOT NULL", column)
            } else {
                format!("({})", parts.join(" AND "))
            }
        }
        Filter::ContainsAll(field, values) => {
            let path = json_path(field)?;
            let parts: Vec<String> = values
                .iter()
                .map(|v| {
                    args.push(SqlValue::Text(v.clone()));
                    format!(
                        "EXISTS (SELECT 1 FROM json_each(doc, '{}') WHERE json_each.value = ?)",
                        path
                    )
                })
                .collect();
            if parts.is_empty() {
                "1".to_string()
            } else {
                format!("({})", parts.join(" AND "))
            }
        }
        Filter::AnyElementContains(field, needles) => {
            if needles.is_empty() {
                return Ok("0".to_string());
            }
            let path = json_path(field)?;
            let tests: Vec<&str> = needles
                .iter()
                .map(|n| {
                    args.push(SqlValue::Text(n.clone()));
                    "instr(lower(json_each.value), ?) > 0"
                })
                .collect();
            format!(
                "EXISTS (SELECT 1 FROM json_each(doc, '{}') WHERE {})",
                path,
                tests.join(" OR ")
            )
        }
        Filter::And(filters) => join_filters(filters, " AND ", "1", args)?,
        Filter::Or(filters) => join_filters(filters, " OR ", "0", args)?,
    };
    Ok(sql)
}

fn join_filters(
    filters: &[Filter],
    op: &str,
    empty: &str,
    args: &mut Vec<SqlValue>,
) -> StoreResult<String> {
    if filters.is_empty() {
        return Ok(empty.to_string());
    }
    let parts = filters
        .iter()
        .map(|f| filter_sql(f, args))
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(format!("({})", parts.join(op)))
}

fn parse_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now)
}

/// Fixed-width UTC timestamps so stored values compare as text
fn pending_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_rfc3339(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn request_from_row(row: &Row) -> rusqlite::Result<RoomRequest> {
    let status: String = row.get(5)?;
    Ok(RoomRequest {
        id: parse_column(row, 0)?,
        room: parse_column(row, 1)?,
        requester: parse_column(row, 2)?,
        owner: parse_column(row, 3)?,
        message: row.get(4)?,
        status: RequestStatus::parse(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                Type::Text,
                format!("unknown request status {:?}", status).into(),
            )
        })?,
        created_at: millis_to_datetime(row.get(6)?),
        updated_at: millis_to_datetime(row.get(7)?),
    })
}

impl UserStore for SqliteStore {
    fn create_user(&self, user: &User) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (id, email, aadhar_number, doc) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.email.to_lowercase(),
                user.aadhar_number,
                encode(user)?,
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                if e.to_string().contains("aadhar_number") {
                    MarketError::Conflict("Aadhar number already registered".to_string())
                } else {
                    MarketError::Conflict("Email already registered".to_string())
                }
            } else {
                db_err(e)
            }
        })?;
        Ok(())
    }

    fn get_user(&self, user_id: UserId) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT doc FROM users WHERE id = ?1",
                params![user_id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        raw.as_deref().map(decode).transpose()
    }

    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let normalized = email.trim().to_lowercase();
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT doc FROM users WHERE email = ?1",
                params![normalized],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        raw.as_deref().map(decode).transpose()
    }

    fn set_verified(&self, user_id: UserId) -> StoreResult<()> {
        self.modify_user(user_id, |u| u.is_verified = true)
    }

    fn set_roommate_profile(
        &self,
        user_id: UserId,
        profile: Option<RoommateProfile>,
    ) -> StoreResult<()> {
        self.modify_user(user_id, |u| u.roommate_profile = profile)
    }

    fn add_listed_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()> {
        self.modify_user(user_id, |u| {
            if !u.listed_rooms.contains(&room_id) {
                u.listed_rooms.push(room_id);
            }
        })
    }

    fn remove_listed_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()> {
        self.modify_user(user_id, |u| u.listed_rooms.retain(|r| *r != room_id))
    }

    fn add_rented_room(&self, user_id: UserId, room_id: RoomId) -> StoreResult<()> {
        self.modify_user(user_id, |u| {
            if !u.rented_rooms.contains(&room_id) {
                u.rented_rooms.push(room_id);
            }
        })
    }

    fn find_users(&self, query: &Query) -> StoreResult<Vec<User>> {
        self.find_docs("users", query)
    }

    fn count_users(&self, filter: &Filter) -> StoreResult<u64> {
        self.count_docs("users", filter)
    }

    fn create_pending(&self, pending: PendingVerification) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO pending_verifications (email, code, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                pending.email.to_lowercase(),
                pending.code,
                pending.user_id.to_string(),
                pending_timestamp(pending.created_at),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn get_pending(&self, email: &str) -> StoreResult<Option<PendingVerification>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT email, code, user_id, created_at FROM pending_verifications WHERE email = ?1",
            params![email.trim().to_lowercase()],
            |row| {
                let created_at: String = row.get(3)?;
                Ok(PendingVerification {
                    email: row.get(0)?,
                    code: row.get(1)?,
                    user_id: parse_column(row, 2)?,
                    created_at: parse_rfc3339(&created_at),
                })
            },
        )
        .optional()
        .map_err(db_err)
    }

    fn delete_pending(&self, email: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM pending_verifications WHERE email = ?1",
            params![email.trim().to_lowercase()],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn cleanup_expired_pending(&self, max_age_minutes: i64) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let cutoff = Utc::now() - chrono::Duration::minutes(max_age_minutes);

        let rows_deleted = conn
            .execute(
                "DELETE FROM pending_verifications WHERE created_at < ?1",
                params![pending_timestamp(cutoff)],
            )
            .map_err(db_err)?;

        Ok(rows_deleted as u64)
    }
}

impl RoomStore for SqliteStore {
    fn insert_room(&self, room: &Room) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO rooms (id, owner_id, doc) VALUES (?1, ?2, ?3)",
            params![room.id.to_string(), room.owner.to_string(), encode(room)?],
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn get_room(&self, room_id: RoomId) -> StoreResult<Option<Room>> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT doc FROM rooms WHERE id = ?1",
                params![room_id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        raw.as_deref().map(decode).transpose()
    }

    fn update_room(&self, room_id: RoomId, update: RoomUpdate) -> StoreResult<Room> {
        self.modify_room(room_id, |room| {
            update.apply(room)?;
            Ok(true)
        })?
        .ok_or(MarketError::NotFound("Room"))
    }

    fn delete_room(&self, room_id: RoomId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                "DELETE FROM rooms WHERE id = ?1",
                params![room_id.to_string()],
            )
            .map_err(db_err)?;
        Ok(changed > 0)
    }

    fn occupy_room(&self, room_id: RoomId, roommate: UserId) -> StoreResult<bool> {
        Ok(self
            .modify_room(room_id, |room| Ok(room.occupy(roommate)))?
            .is_some())
    }

    fn find_rooms(&self, query: &Query) -> StoreResult<Vec<Room>> {
        self.find_docs("rooms", query)
    }

    fn count_rooms(&self, filter: &Filter) -> StoreResult<u64> {
        self.count_docs("rooms", filter)
    }

    fn distinct_cities(&self, filter: &Filter) -> StoreResult<Vec<String>> {
        let mut args = Vec::new();
        let predicate = filter_sql(filter, &mut args)?;
        let city = json_extract("address.city")?;
        let sql = format!(
            "SELECT DISTINCT {city} FROM rooms WHERE {predicate} AND {city} IS NOT NULL ORDER BY 1"
        );

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), |row| row.get::<_, String>(0))
            .map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    fn rooms_by_owner(&self, owner: UserId) -> StoreResult<Vec<Room>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT doc FROM rooms WHERE owner_id = ?1 ORDER BY seq")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![owner.to_string()], |row| row.get::<_, String>(0))
            .map_err(db_err)?;
        let mut rooms = Vec::new();
        for raw in rows {
            rooms.push(decode(&raw.map_err(db_err)?)?);
        }
        Ok(rooms)
    }
}

impl RequestStore for SqliteStore {
    fn insert_request(&self, request: &RoomRequest) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO room_requests
                (id, room_id, requester_id, owner_id, message, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                request.id.to_string(),
                request.room.to_string(),
                request.requester.to_string(),
                request.owner.to_string(),
                request.message,
                request.status.as_str(),
                request.created_at.timestamp_millis(),
                request.updated_at.timestamp_millis(),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                MarketError::Conflict(
                    "You already have a pending request for this room".to_string(),
                )
            } else {
                db_err(e)
            }
        })?;
        Ok(())
    }

    fn get_request(&self, request_id: RequestId) -> StoreResult<Option<RoomRequest>> {
        Ok(self
            .query_requests("id = ?", &[SqlValue::Text(request_id.to_string())])?
            .into_iter()
            .next())
    }

    fn find_pending_request(
        &self,
        room_id: RoomId,
        requester: UserId,
    ) -> StoreResult<Option<RoomRequest>> {
        Ok(self
            .query_requests(
                "room_id = ? AND requester_id = ? AND status = 'pending'",
                &[
                    SqlValue::Text(room_id.to_string()),
                    SqlValue::Text(requester.to_string()),
                ],
            )?
            .into_iter()
            .next())
    }

    fn update_request_status(
        &self,
        request_id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                "UPDATE room_requests SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                params![
                    to.as_str(),
                    Utc::now().timestamp_millis(),
                    request_id.to_string(),
                    from.as_str(),
                ],
            )
            .map_err(db_err)?;
        if changed > 0 {
            return Ok(true);
        }

        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM room_requests WHERE id = ?1)",
                params![request_id.to_string()],
                |row| row.get(0),
            )
            .map_err(db_err)?;
        if exists {
            Ok(false)
        } else {
            Err(MarketError::NotFound("Request"))
        }
    }

    fn requests_by_requester(&self, requester: UserId) -> StoreResult<Vec<RoomRequest>> {
        self.query_requests(
            "requester_id = ? ORDER BY created_at DESC, seq DESC",
            &[SqlValue::Text(requester.to_string())],
        )
    }

    fn requests_for_owner(
        &self,
        owner: UserId,
        status: Option<RequestStatus>,
    ) -> StoreResult<Vec<RoomRequest>> {
        match status {
            Some(status) => self.query_requests(
                "owner_id = ? AND status = ? ORDER BY created_at DESC, seq DESC",
                &[
                    SqlValue::Text(owner.to_string()),
                    SqlValue::Text(status.as_str().to_string()),
                ],
            ),
            None => self.query_requests(
                "owner_id = ? ORDER BY created_at DESC, seq DESC",
                &[SqlValue::Text(owner.to_string())],
            ),
        }
    }

    fn requests_with_status(&self, status: RequestStatus) -> StoreResult<Vec<RoomRequest>> {
        self.query_requests(
            "status = ? ORDER BY seq",
            &[SqlValue::Text(status.as_str().to_string())],
        )
    }
}

impl SessionStore for SqliteStore {
    fn create(&self, user_id: UserId) -> StoreResult<Session> {
        let conn = self.conn.lock().unwrap();
        let session = Session {
            id: SessionId(Uuid::new_v4().to_string()),
            user_id,
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO sessions (id, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                session.id.0,
                session.user_id.to_string(),
                session.created_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;

        Ok(session)
    }

    fn get(&self, session_id: &SessionId) -> StoreResult<Option<Session>> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, user_id, created_at FROM sessions WHERE id = ?1",
            params![session_id.0],
            |row| {
                let created_at: String = row.get(2)?;
                Ok(Session {
                    id: SessionId(row.get(0)?),
                    user_id: parse_column(row, 1)?,
                    created_at: parse_rfc3339(&created_at),
                })
            },
        )
        .optional()
        .map_err(db_err)
    }

    fn delete(&self, session_id: &SessionId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id.0])
            .map_err(db_err)?;

        Ok(())
    }
}
