//! Shared fixtures: in-memory and file-backed stores plus a few users and
//! players.

#![allow(dead_code)]

use std::path::PathBuf;

use pong_server::{
    db::{self, models::Player, player_repo, user_repo},
    game::types::{PlayerId, UserId},
};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fresh in-memory database with the schema applied.
pub async fn pool() -> SqlitePool {
    db::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory database")
}

/// A WAL database file shared by several pooled connections, removed on drop.
pub struct FileDb {
    pub pool: SqlitePool,
    path: PathBuf,
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub async fn file_pool() -> FileDb {
    let path = std::env::temp_dir().join(format!("pong_{}.sqlite", Uuid::new_v4()));
    let pool = db::connect(&format!("sqlite://{}", path.display()), 5)
        .await
        .expect("file database");
    FileDb { pool, path }
}

pub async fn user(db: &SqlitePool, username: &str) -> UserId {
    user_repo::create_user(db, username, &format!("{username}@example.com"), None)
        .await
        .expect("create user")
        .id
}

pub async fn players(db: &SqlitePool, owner: UserId, names: &[&str]) -> Vec<PlayerId> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        ids.push(
            player_repo::create_player(db, owner, name)
                .await
                .expect("create player")
                .id,
        );
    }
    ids
}

pub async fn player(db: &SqlitePool, id: PlayerId) -> Player {
    player_repo::get_player(db, id).await.expect("player exists")
}

pub async fn count(db: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db)
        .await
        .expect("count rows")
}
