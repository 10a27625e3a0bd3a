//! Account profile endpoints.

use actix_web::{delete, get, put, web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::{models::PublicUser, user_repo},
    error::AppResult,
    game::types::UserId,
    http::auth::JwtAuth,
};

#[derive(Deserialize)]
pub struct UpdateReq {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// GET /api/users/me
#[get("/users/me")]
pub async fn me(auth: JwtAuth, db: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(user_repo::get_user(&db, auth.user_id).await?))
}

/// PUT /api/users/me
#[put("/users/me")]
pub async fn update_me(
    auth: JwtAuth,
    info: web::Json<UpdateReq>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    let UpdateReq {
        username,
        email,
        avatar,
    } = info.into_inner();
    let user = user_repo::update_profile(
        &db,
        auth.user_id,
        user_repo::ProfileUpdate {
            username,
            email,
            avatar,
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /api/users/me
#[delete("/users/me")]
pub async fn delete_me(auth: JwtAuth, db: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    user_repo::delete_user(&db, auth.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "deleted" })))
}

/// GET /api/users/{id}
#[get("/users/{id}")]
pub async fn profile(path: web::Path<UserId>, db: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let user = user_repo::get_user(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // `/users/me` must be registered before `/users/{id}`
    cfg.service(me)
        .service(update_me)
        .service(delete_me)
        .service(profile);
}
