// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only conversation log queries.

use rusqlite::{OptionalExtension, Row, params};
use shopkeep_core::{ConversationTurn, ShopError};

use crate::database::{Database, map_tr_err};
use crate::queries::{now_timestamp, parse_timestamp};

fn row_to_turn(row: &Row<'_>) -> Result<ConversationTurn, rusqlite::Error> {
    let timestamp: String = row.get(3)?;
    Ok(ConversationTurn {
        id: row.get(0)?,
        user_message: row.get(1)?,
        agent_response: row.get(2)?,
        timestamp: parse_timestamp(3, &timestamp)?,
        session_id: row.get(4)?,
    })
}

/// Appends a turn and returns its row id.
pub async fn append_turn(
    db: &Database,
    user_message: &str,
    agent_response: &str,
    session_id: &str,
) -> Result<i64, ShopError> {
    let user_message = user_message.to_string();
    let agent_response = agent_response.to_string();
    let session_id = session_id.to_string();
    let timestamp = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO conversations (user_message, agent_response, timestamp, session_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_message, agent_response, timestamp, session_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// The `limit` most recent turns, newest first.
pub async fn list_recent(db: &Database, limit: usize) -> Result<Vec<ConversationTurn>, ShopError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<ConversationTurn>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, user_message, agent_response, timestamp, session_id
                 FROM conversations ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_turn)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// The newest turn recorded for `session_id`.
pub async fn latest_for_session(
    db: &Database,
    session_id: &str,
) -> Result<Option<ConversationTurn>, ShopError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<ConversationTurn>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, user_message, agent_response, timestamp, session_id
                 FROM conversations WHERE session_id = ?1 ORDER BY id DESC LIMIT 1",
                params![session_id],
                row_to_turn,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}
