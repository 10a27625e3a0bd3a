//! Match history: standalone 1v1 games and individual bracket matches.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::match_repo::{self, FinalScore, NewMatch},
    error::AppResult,
    game::types::{MatchId, MatchType, PlayerId, TournamentId},
    http::auth::JwtAuth,
};

#[derive(Deserialize)]
pub struct CreateReq {
    #[serde(rename = "type", default = "default_match_type")]
    pub match_type: MatchType,
    pub players: Vec<PlayerId>,
    pub tournament_id: Option<TournamentId>,
    pub round: Option<i64>,
}

fn default_match_type() -> MatchType {
    MatchType::OneVsOne
}

#[derive(Deserialize)]
pub struct FinalizeReq {
    pub winner_id: PlayerId,
    pub players: Vec<FinalScore>,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub player_id: Option<PlayerId>,
}

/// GET /api/match-histories
#[get("/match-histories")]
pub async fn list(
    auth: JwtAuth,
    web::Query(params): web::Query<HistoryParams>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    let rows = match_repo::list_matches(&db, auth.user_id, params.player_id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /api/match-histories/{id}
#[get("/match-histories/{id}")]
pub async fn show(path: web::Path<MatchId>, db: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(match_repo::get_match(&db, path.into_inner()).await?))
}

/// POST /api/match-histories
#[post("/match-histories")]
pub async fn create(
    auth: JwtAuth,
    info: web::Json<CreateReq>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    let CreateReq {
        match_type,
        players,
        tournament_id,
        round,
    } = info.into_inner();

    let match_id = match_repo::create_match(
        &db,
        auth.user_id,
        NewMatch {
            match_type,
            players,
            tournament_id,
            round,
        },
    )
    .await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "match_id": match_id })))
}

/// PUT /api/match-histories/{id}
#[put("/match-histories/{id}")]
pub async fn finalize(
    auth: JwtAuth,
    path: web::Path<MatchId>,
    info: web::Json<FinalizeReq>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    let match_id = path.into_inner();
    match_repo::finalize_match(&db, match_id, auth.user_id, info.winner_id, &info.players).await?;
    Ok(HttpResponse::Ok().json(match_repo::get_match(&db, match_id).await?))
}

/// DELETE /api/match-histories/{id}
#[delete("/match-histories/{id}")]
pub async fn remove(
    auth: JwtAuth,
    path: web::Path<MatchId>,
    db: web::Data<SqlitePool>,
) -> AppResult<HttpResponse> {
    match_repo::delete_match(&db, path.into_inner(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "deleted" })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(show)
        .service(create)
        .service(finalize)
        .service(remove);
}
