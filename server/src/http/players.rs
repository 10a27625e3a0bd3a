//! Player profiles owned by the calling account.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{db::player_repo, error::AppResult, game::types::PlayerId, http::auth::JwtAuth};

#[derive(Deserialize)]
pub struct PlayerReq {
    pub display_name: String,
}

/// GET /api/players
#[get("/players")]
pub async fn list(auth: JwtAuth, db: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(player_repo::list_players(&db, auth.user_id).await?))
}

/// GET /api/players/{id}
#[get("/players/{id}")]
pub async fn show(path: web::Path<PlayerId>, db: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(player_repo::get_player(&db, path.into_inner()).await?))
}

/// POST /api/players
#[post("/players")]
pub async fn create(
    auth: JwtAuth,
    info: web::Json<PlayerReq>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    let player = player_repo::create_player(&db, auth.user_id, &info.display_name).await?;
    Ok(HttpResponse::Created().json(player))
}

/// PUT /api/players/{id}
#[put("/players/{id}")]
pub async fn rename(
    auth: JwtAuth,
    path: web::Path<PlayerId>,
    info: web::Json<PlayerReq>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    let player =
        player_repo::rename_player(&db, path.into_inner(), auth.user_id, &info.display_name).await?;
    Ok(HttpResponse::Ok().json(player))
}

/// DELETE /api/players/{id}
#[delete("/players/{id}")]
pub async fn remove(
    auth: JwtAuth,
    path: web::Path<PlayerId>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    player_repo::delete_player(&db, path.into_inner(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "deleted" })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(show)
        .service(create)
        .service(rename)
        .service(remove);
}
