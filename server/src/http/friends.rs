use actix_web::{delete, get, post, web, HttpResponse};
use sqlx::SqlitePool;

use crate::{db::friend_repo, error::AppResult, game::types::UserId, http::auth::JwtAuth};

/// GET /api/friends
#[get("/friends")]
pub async fn list(auth: JwtAuth, db: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(friend_repo::list_friends(&db, auth.user_id).await?))
}

/// POST /api/friends/{user_id}
#[post("/friends/{user_id}")]
pub async fn add(
    auth: JwtAuth,
    path: web::Path<UserId>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    friend_repo::add_friend(&db, auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "status": "added" })))
}

/// DELETE /api/friends/{user_id}
#[delete("/friends/{user_id}")]
pub async fn remove(
    auth: JwtAuth,
    path: web::Path<UserId>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    friend_repo::remove_friend(&db, auth.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "removed" })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list).service(add).service(remove);
}
