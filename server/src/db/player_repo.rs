//! Player registry: the named competitor profiles a user owns.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    config::settings,
    db::{begin_write, models::Player},
    error::{conflict_on_unique, AppError, AppResult},
    game::types::{PlayerId, UserId},
};

const PLAYER_COLUMNS: &str = "id, user_id, display_name, wins, losses, avatar, created_at";
const MAX_DISPLAY_NAME: usize = 32;

fn clean_display_name(raw: &str) -> AppResult<&str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("display name is required"));
    }
    if name.chars().count() > MAX_DISPLAY_NAME {
        return Err(AppError::validation(format!(
            "display name must be at most {MAX_DISPLAY_NAME} characters"
        )));
    }
    Ok(name)
}

pub async fn create_player(db: &SqlitePool, owner: UserId, display_name: &str) -> AppResult<Player> {
    let name = clean_display_name(display_name)?;
    let limit = settings().max_players_per_user;

    let mut tx = begin_write(db).await?;

    let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players WHERE user_id = $1")
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;
    if owned >= limit {
        return Err(AppError::validation(format!(
            "a user may own at most {limit} players"
        )));
    }

    let player = sqlx::query_as::<_, Player>(&format!(
        "INSERT INTO players (user_id, display_name, created_at)
         VALUES ($1, $2, $3)
         RETURNING {PLAYER_COLUMNS}"
    ))
    .bind(owner)
    .bind(name)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, "display name already taken"))?;

    tx.commit().await?;
    Ok(player)
}

pub async fn get_player(db: &SqlitePool, id: PlayerId) -> AppResult<Player> {
    sqlx::query_as::<_, Player>(&format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("player {id} not found")))
}

pub async fn list_players(db: &SqlitePool, owner: UserId) -> AppResult<Vec<Player>> {
    Ok(sqlx::query_as::<_, Player>(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE user_id = $1 ORDER BY id"
    ))
    .bind(owner)
    .fetch_all(db)
    .await?)
}

pub async fn rename_player(
    db: &SqlitePool,
    id: PlayerId,
    owner: UserId,
    display_name: &str,
) -> AppResult<Player> {
    let name = clean_display_name(display_name)?;

    sqlx::query_as::<_, Player>(&format!(
        "UPDATE players SET display_name = $1
          WHERE id = $2 AND user_id = $3
      RETURNING {PLAYER_COLUMNS}"
    ))
    .bind(name)
    .bind(id)
    .bind(owner)
    .fetch_optional(db)
    .await
    .map_err(|e| conflict_on_unique(e, "display name already taken"))?
    .ok_or_else(|| AppError::not_found("player not found or unauthorized"))
}

/// Delete a player; its match participations go with it.
pub async fn delete_player(db: &SqlitePool, id: PlayerId, owner: UserId) -> AppResult<()> {
    let rows = sqlx::query("DELETE FROM players WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(db)
        .await?
        .rows_affected();

    if rows == 0 {
        return Err(AppError::not_found("player not found or unauthorized"));
    }
    Ok(())
}
