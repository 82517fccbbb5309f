use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use crate::wrapped::{DuoInvitation, TimeRange, WrapSnapshot};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::auth::{AuthToken, AuthTokenValue};
use super::models::{SavedWrap, User, WrapSummary};
use super::wrap_store::{AuthTokenStore, DuoStore, UserStore, WrapStore};

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("first_name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_user_handle", "handle")],
};
const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    indices: &[("idx_auth_token_value", "value")],
};
const WRAP_TABLE_V_0: Table = Table {
    name: "wrap",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("time_range", &SqlType::Text, non_null = true),
        sqlite_column!("wrap_data", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_wrap_user_id", "user_id")],
};

/// V 1
const DUO_INVITATION_TABLE_V_1: Table = Table {
    name: "duo_invitation",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "inviter_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!(
            "invitee_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("invitee_wrap_data", &SqlType::Text),
        sqlite_column!(
            "is_accepted",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_duo_invitation_invitee_id", "invitee_id")],
};

fn migrate_to_duo_invitations(conn: &Connection) -> Result<()> {
    DUO_INVITATION_TABLE_V_1.create(conn)
}

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[USER_TABLE_V_0, AUTH_TOKEN_TABLE_V_0, WRAP_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            USER_TABLE_V_0,
            AUTH_TOKEN_TABLE_V_0,
            WRAP_TABLE_V_0,
            DUO_INVITATION_TABLE_V_1,
        ],
        migration: Some(migrate_to_duo_invitations),
    },
];

fn system_time_from_column_result(value: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(value.max(0) as u64)
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Raw `wrap` row, the snapshot is decoded outside of rusqlite's row
/// mapping so that JSON errors surface with context.
struct WrapRow {
    id: usize,
    user_id: usize,
    time_range: String,
    wrap_data: String,
    created: i64,
}

impl WrapRow {
    fn into_saved_wrap(self) -> Result<SavedWrap> {
        let snapshot: WrapSnapshot = serde_json::from_str(&self.wrap_data)
            .with_context(|| format!("Corrupted wrap data for wrap {}", self.id))?;
        Ok(SavedWrap {
            id: self.id,
            user_id: self.user_id,
            time_range: self.time_range.parse()?,
            snapshot,
            created: system_time_from_column_result(self.created),
        })
    }
}

struct InvitationRow {
    id: usize,
    inviter_id: usize,
    invitee_id: usize,
    invitee_wrap_data: Option<String>,
    is_accepted: bool,
    created: i64,
}

impl InvitationRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(InvitationRow {
            id: row.get(0)?,
            inviter_id: row.get(1)?,
            invitee_id: row.get(2)?,
            invitee_wrap_data: row.get(3)?,
            is_accepted: row.get::<_, i64>(4)? != 0,
            created: row.get(5)?,
        })
    }

    fn into_invitation(self) -> Result<DuoInvitation> {
        let invitee_wrap_data = self
            .invitee_wrap_data
            .as_deref()
            .map(serde_json::from_str::<WrapSnapshot>)
            .transpose()
            .with_context(|| format!("Corrupted wrap data for invitation {}", self.id))?;
        Ok(DuoInvitation {
            id: self.id,
            inviter_id: self.inviter_id,
            invitee_id: self.invitee_id,
            invitee_wrap_data,
            is_accepted: self.is_accepted,
            created: system_time_from_column_result(self.created),
        })
    }
}

const INVITATION_COLUMNS: &str =
    "id, inviter_id, invitee_id, invitee_wrap_data, is_accepted, created";

#[derive(Clone)]
pub struct SqliteWrapStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWrapStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned(db_path, VERSIONED_SCHEMAS)?;
        Ok(SqliteWrapStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            handle: row.get(1)?,
            first_name: row.get(2)?,
            created: system_time_from_column_result(row.get(3)?),
        })
    }

    fn query_wrap(&self, sql: &str, params: impl rusqlite::Params) -> Result<Option<SavedWrap>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(sql, params, |row| {
                Ok(WrapRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    time_range: row.get(2)?,
                    wrap_data: row.get(3)?,
                    created: row.get(4)?,
                })
            })
            .optional()?;
        row.map(WrapRow::into_saved_wrap).transpose()
    }
}

impl UserStore for SqliteWrapStore {
    fn create_user(&self, handle: &str, first_name: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user (handle, first_name) VALUES (?1, ?2)",
            params![handle, first_name],
        )
        .with_context(|| format!("Failed to create user {}", handle))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, handle, first_name, created FROM user WHERE id = ?1",
                params![user_id],
                Self::user_from_row,
            )
            .optional()?)
    }

    fn get_user_id(&self, handle: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id FROM user WHERE handle = ?1",
                params![handle],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, handle, first_name, created FROM user ORDER BY id")?;
        let users = stmt
            .query_map([], Self::user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    fn delete_user(&self, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM user WHERE id = ?1", params![user_id])?;
        debug!("Deleted user {}: {}", user_id, deleted > 0);
        Ok(deleted > 0)
    }
}

impl AuthTokenStore for SqliteWrapStore {
    fn add_auth_token(&self, token: &AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (user_id, value) VALUES (?1, ?2)",
            params![token.user_id, token.value.0],
        )
        .with_context(|| format!("Failed to add auth token for user {}", token.user_id))?;
        Ok(())
    }

    fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT user_id, value, created, last_used FROM auth_token WHERE value = ?1",
                params![value.0],
                |row| {
                    Ok(AuthToken {
                        user_id: row.get(0)?,
                        value: AuthTokenValue(row.get(1)?),
                        created: system_time_from_column_result(row.get(2)?),
                        last_used: row
                            .get::<_, Option<i64>>(3)?
                            .map(system_time_from_column_result),
                    })
                },
            )
            .optional()?)
    }

    fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE auth_token SET last_used = ?1 WHERE value = ?2",
            params![now_secs(), value.0],
        )?;
        Ok(())
    }
}

impl WrapStore for SqliteWrapStore {
    fn save_wrap(&self, user_id: usize, snapshot: &WrapSnapshot) -> Result<usize> {
        let wrap_data = serde_json::to_string(snapshot).context("Failed to encode wrap data")?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO wrap (user_id, time_range, wrap_data, created) VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                snapshot.time_range.as_str(),
                wrap_data,
                snapshot.created_at.timestamp()
            ],
        )
        .with_context(|| format!("Failed to save wrap for user {}", user_id))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn list_wraps(&self, user_id: usize) -> Result<Vec<WrapSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, time_range, created FROM wrap WHERE user_id = ?1 ORDER BY created DESC, id DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, usize>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, time_range, created)| {
                Ok(WrapSummary {
                    id,
                    time_range: time_range.parse::<TimeRange>()?,
                    created: system_time_from_column_result(created),
                })
            })
            .collect()
    }

    fn get_wrap(&self, user_id: usize, wrap_id: usize) -> Result<Option<SavedWrap>> {
        self.query_wrap(
            "SELECT id, user_id, time_range, wrap_data, created FROM wrap WHERE id = ?1 AND user_id = ?2",
            params![wrap_id, user_id],
        )
    }

    fn delete_wrap(&self, user_id: usize, wrap_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM wrap WHERE id = ?1 AND user_id = ?2",
            params![wrap_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    fn get_latest_wrap(&self, user_id: usize) -> Result<Option<SavedWrap>> {
        self.query_wrap(
            "SELECT id, user_id, time_range, wrap_data, created FROM wrap WHERE user_id = ?1 ORDER BY created DESC, id DESC LIMIT 1",
            params![user_id],
        )
    }
}

impl DuoStore for SqliteWrapStore {
    fn create_invitation(&self, inviter_id: usize, invitee_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO duo_invitation (inviter_id, invitee_id) VALUES (?1, ?2)",
            params![inviter_id, invitee_id],
        )
        .with_context(|| {
            format!(
                "Failed to create invitation from {} to {}",
                inviter_id, invitee_id
            )
        })?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn has_pending_invitation(&self, inviter_id: usize, invitee_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM duo_invitation WHERE inviter_id = ?1 AND invitee_id = ?2 AND is_accepted = 0",
            params![inviter_id, invitee_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn list_pending_invitations(&self, invitee_id: usize) -> Result<Vec<DuoInvitation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM duo_invitation WHERE invitee_id = ?1 AND is_accepted = 0 ORDER BY created DESC, id DESC",
            INVITATION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![invitee_id], InvitationRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(InvitationRow::into_invitation).collect()
    }

    fn get_invitation(&self, invitation_id: usize) -> Result<Option<DuoInvitation>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM duo_invitation WHERE id = ?1",
                    INVITATION_COLUMNS
                ),
                params![invitation_id],
                InvitationRow::from_row,
            )
            .optional()?;
        row.map(InvitationRow::into_invitation).transpose()
    }

    fn accept_invitation(
        &self,
        invitation_id: usize,
        invitee_wrap: &WrapSnapshot,
    ) -> Result<bool> {
        let wrap_data =
            serde_json::to_string(invitee_wrap).context("Failed to encode wrap data")?;
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE duo_invitation SET is_accepted = 1, invitee_wrap_data = ?1 WHERE id = ?2 AND is_accepted = 0",
            params![wrap_data, invitation_id],
        )?;
        Ok(updated == 1)
    }
}
