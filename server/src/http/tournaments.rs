//! Single-elimination tournaments.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use sqlx::SqlitePool;

use crate::{
    chain::ChainRecorder,
    db::{
        models::MatchView,
        tournament_repo::{self, Advancement},
    },
    error::{AppError, AppResult},
    game::types::{PlayerId, TournamentId, UserId},
    http::auth::JwtAuth,
};

#[derive(Deserialize)]
pub struct CreateReq {
    pub name: String,
    pub players: Vec<PlayerId>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub user_id: Option<UserId>,
}

#[skip_serializing_none]
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvanceResponse {
    Advanced {
        round: i64,
        matches: Vec<MatchView>,
    },
    Finished {
        round: Option<i64>,
        winner_id: Option<PlayerId>,
        message: Option<&'static str>,
    },
}

/// GET /api/tournaments
#[get("/tournaments")]
pub async fn list(
    web::Query(params): web::Query<ListParams>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(tournament_repo::list_tournaments(&db, params.user_id).await?))
}

/// GET /api/tournaments/{id}
#[get("/tournaments/{id}")]
pub async fn show(path: web::Path<TournamentId>, db: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(tournament_repo::get_tournament(&db, path.into_inner()).await?))
}

/// POST /api/tournaments
#[post("/tournaments")]
pub async fn create(
    auth: JwtAuth,
    info: web::Json<CreateReq>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    // Clients treat a taken name like any other bad input.
    let tournament = tournament_repo::create_tournament(&db, auth.user_id, &info.name, &info.players)
        .await
        .map_err(|e| match e {
            AppError::Conflict(msg) => AppError::Validation(msg),
            other => other,
        })?;
    Ok(HttpResponse::Ok().json(tournament))
}

/// PUT /api/tournaments/{id}
#[put("/tournaments/{id}")]
pub async fn advance(
    auth: JwtAuth,
    path: web::Path<TournamentId>,
    db: web::Data<SqlitePool>,
    recorder: web::Data<ChainRecorder>,
) -> AppResult<HttpResponse> {
    let body = match tournament_repo::advance_tournament(&db, &recorder, path.into_inner(), auth.user_id)
        .await
    {
        Ok(Advancement::Advanced { round, matches }) => AdvanceResponse::Advanced { round, matches },
        Ok(Advancement::Finished { round, winner_id }) => AdvanceResponse::Finished {
            round: Some(round),
            winner_id: Some(winner_id),
            message: None,
        },
        // Nothing left to do; not a failure from the caller's point of view.
        Err(AppError::AlreadyFinished { winner_id }) => AdvanceResponse::Finished {
            round: None,
            winner_id,
            message: Some("tournament already finished"),
        },
        Err(e) => return Err(e),
    };
    Ok(HttpResponse::Ok().json(body))
}

/// DELETE /api/tournaments/{id}
#[delete("/tournaments/{id}")]
pub async fn remove(
    auth: JwtAuth,
    path: web::Path<TournamentId>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    tournament_repo::delete_tournament(&db, path.into_inner(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "deleted" })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(show)
        .service(create)
        .service(advance)
        .service(remove);
}
