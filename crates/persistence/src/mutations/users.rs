// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity and session mutations, used by the credential issuer and tests.

use diesel::SqliteConnection;
use diesel::prelude::*;
use reparto_domain::{Role, UserId};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Creates a user.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_user(
    conn: &mut SqliteConnection,
    display_name: &str,
    role: Role,
    created_at: OffsetDateTime,
) -> Result<UserId, PersistenceError> {
    diesel::insert_into(users::table)
        .values((
            users::display_name.eq(display_name),
            users::role.eq(role.as_str()),
            users::created_at.eq(format_timestamp(created_at)?),
        ))
        .execute(conn)?;

    let user_id: i64 = get_last_insert_rowid(conn)?;
    info!(user_id, role = role.as_str(), "Created user");
    Ok(UserId::new(user_id))
}

/// Creates a session for a user.
///
/// # Errors
///
/// Returns an error if the insert fails, for example on a duplicate token.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: UserId,
    expires_at: OffsetDateTime,
    created_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id.value()),
            sessions::expires_at.eq(format_timestamp(expires_at)?),
            sessions::created_at.eq(format_timestamp(created_at)?),
        ))
        .execute(conn)?;

    let session_id: i64 = get_last_insert_rowid(conn)?;
    debug!(session_id, user_id = user_id.value(), "Created session");
    Ok(session_id)
}

/// Deletes a session by token. Returns whether a session was removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<bool, PersistenceError> {
    let deleted: usize = diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;
    Ok(deleted > 0)
}
