use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    db::models::PublicUser,
    error::{conflict_on_unique, AppError, AppResult},
    game::types::UserId,
};

pub async fn add_friend(db: &SqlitePool, user: UserId, friend: UserId) -> AppResult<()> {
    if user == friend {
        return Err(AppError::validation("cannot befriend yourself"));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(friend)
        .fetch_one(db)
        .await?;
    if !exists {
        return Err(AppError::not_found(format!("user {friend} not found")));
    }

    let already: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2)",
    )
    .bind(user)
    .bind(friend)
    .fetch_one(db)
    .await?;
    if already {
        return Err(AppError::conflict("already friends"));
    }

    sqlx::query("INSERT INTO friendships (user_id, friend_id, created_at) VALUES ($1, $2, $3)")
        .bind(user)
        .bind(friend)
        .bind(Utc::now())
        .execute(db)
        .await
        .map_err(|e| conflict_on_unique(e, "already friends"))?;
    Ok(())
}

pub async fn remove_friend(db: &SqlitePool, user: UserId, friend: UserId) -> AppResult<()> {
    let rows = sqlx::query("DELETE FROM friendships WHERE user_id = $1 AND friend_id = $2")
        .bind(user)
        .bind(friend)
        .execute(db)
        .await?
        .rows_affected();

    if rows == 0 {
        Err(AppError::not_found(format!("user {friend} is not a friend")))
    } else {
        Ok(())
    }
}

pub async fn list_friends(db: &SqlitePool, user: UserId) -> AppResult<Vec<PublicUser>> {
    Ok(sqlx::query_as::<_, PublicUser>(
        r#"
        SELECT u.id, u.username, u.online, u.avatar
          FROM friendships f
          JOIN users u ON u.id = f.friend_id
         WHERE f.user_id = $1
         ORDER BY u.username
        "#,
    )
    .bind(user)
    .fetch_all(db)
    .await?)
}
