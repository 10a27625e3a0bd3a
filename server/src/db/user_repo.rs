//! Account rows.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    db::models::User,
    error::{conflict_on_unique, AppError, AppResult},
    game::types::UserId,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, online, avatar, created_at";

pub async fn create_user(
    db: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: Option<&str>,
) -> AppResult<User> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(AppError::validation("username and email are required"));
    }
    if !email.contains('@') {
        return Err(AppError::validation("invalid email address"));
    }

    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password_hash, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(db)
    .await
    .map_err(|e| conflict_on_unique(e, "username or email already taken"))
}

pub async fn get_user(db: &SqlitePool, id: UserId) -> AppResult<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("user {id} not found")))
}

pub async fn find_by_username(db: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    Ok(
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await?,
    )
}

pub async fn set_online(db: &SqlitePool, id: UserId, online: bool) -> AppResult<()> {
    sqlx::query("UPDATE users SET online = $1 WHERE id = $2")
        .bind(online)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Apply the provided fields; absent ones keep their value.
pub async fn update_profile(db: &SqlitePool, id: UserId, update: ProfileUpdate) -> AppResult<User> {
    let username = update.username.as_deref().map(str::trim);
    let email = update.email.as_deref().map(str::trim);
    if username == Some("") || email == Some("") {
        return Err(AppError::validation("username and email cannot be empty"));
    }
    if email.is_some_and(|e| !e.contains('@')) {
        return Err(AppError::validation("invalid email address"));
    }

    sqlx::query_as::<_, User>(&format!(
        "UPDATE users
            SET username = COALESCE($1, username),
                email    = COALESCE($2, email),
                avatar   = COALESCE($3, avatar)
          WHERE id = $4
      RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(email)
    .bind(update.avatar)
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(|e| conflict_on_unique(e, "username or email already taken"))?
    .ok_or_else(|| AppError::not_found(format!("user {id} not found")))
}

/// Remove the account; players, tournaments and matches cascade.
pub async fn delete_user(db: &SqlitePool, id: UserId) -> AppResult<()> {
    let rows = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    if rows == 0 {
        return Err(AppError::not_found(format!("user {id} not found")));
    }
    log::info!("user {id} deleted");
    Ok(())
}
