// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity and session queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use reparto_domain::{Role, UserId};
use tracing::debug;

use crate::data_models::{SessionData, UserData, parse_timestamp};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct UserRow {
    user_id: i64,
    display_name: String,
    role: String,
    created_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    user_id: i64,
    expires_at: String,
    created_at: String,
}

/// Retrieves a user by id.
///
/// # Errors
///
/// Returns an error if the query fails or the stored role is unknown.
/// Returns `Ok(None)` if the user does not exist.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Option<UserData>, PersistenceError> {
    debug!(user_id = user_id.value(), "Looking up user");

    let row: Option<UserRow> = users::table
        .filter(users::user_id.eq(user_id.value()))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| -> Result<UserData, PersistenceError> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| PersistenceError::corrupt("users", e))?;
        Ok(UserData {
            user_id: UserId::new(row.user_id),
            display_name: row.display_name,
            role,
            created_at: parse_timestamp("users", &row.created_at)?,
        })
    })
    .transpose()
}

/// Retrieves a session by its token, whether or not it has expired.
///
/// # Errors
///
/// Returns an error if the query fails.
/// Returns `Ok(None)` if no session has this token.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    let row: Option<SessionRow> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| -> Result<SessionData, PersistenceError> {
        Ok(SessionData {
            session_id: row.session_id,
            session_token: row.session_token,
            user_id: UserId::new(row.user_id),
            expires_at: parse_timestamp("sessions", &row.expires_at)?,
            created_at: parse_timestamp("sessions", &row.created_at)?,
        })
    })
    .transpose()
}
