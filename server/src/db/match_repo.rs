//! Match recorder: creating, finalizing and reading individual matches,
//! standalone or as part of a tournament bracket.

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    db::{
        begin_write,
        models::{MatchRow, MatchView, ParticipantRow, ParticipantView},
    },
    error::{AppError, AppResult},
    game::types::{MatchId, MatchStatus, MatchType, PlayerId, TournamentId, UserId},
};

/// Input for [`create_match`].
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub match_type: MatchType,
    pub players: Vec<PlayerId>,
    pub tournament_id: Option<TournamentId>,
    pub round: Option<i64>,
}

/// A participant's final score, as reported by the client.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FinalScore {
    #[serde(alias = "id")]
    pub player_id: PlayerId,
    pub score: i64,
}

/// Which matches to read. Every field narrows the result; `None` means
/// "any".
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchFilter {
    pub match_id: Option<MatchId>,
    pub tournament_id: Option<TournamentId>,
    pub round: Option<i64>,
    pub user_id: Option<UserId>,
    pub player_id: Option<PlayerId>,
}

// Single WHERE clause shared by the match and participant queries, using the
// `$n IS NULL OR ...` pattern to keep one prepared statement per query.
macro_rules! match_filter {
    () => {
        "($1 IS NULL OR m.id = $1)
         AND ($2 IS NULL OR m.tournament_id = $2)
         AND ($3 IS NULL OR m.round = $3)
         AND ($4 IS NULL OR m.user_id = $4)
         AND ($5 IS NULL OR EXISTS (
                SELECT 1 FROM match_players x
                 WHERE x.match_id = m.id AND x.player_id = $5))"
    };
}

/// Record a new match with two participants (score 0).
///
/// Creating a `1v1` match first discards the owner's other unfinished `1v1`
/// matches, so abandoned games do not pile up.
pub async fn create_match(db: &SqlitePool, owner: UserId, new: NewMatch) -> AppResult<MatchId> {
    if new.players.len() != 2 {
        return Err(AppError::validation("Must have 2 players"));
    }
    match (new.match_type, new.tournament_id) {
        (MatchType::OneVsOne, Some(_)) => {
            return Err(AppError::validation(
                "a 1v1 match cannot belong to a tournament",
            ))
        }
        (MatchType::Tournament, None) => {
            return Err(AppError::validation(
                "a tournament match requires a tournament_id",
            ))
        }
        _ => {}
    }

    let mut tx = begin_write(db).await?;

    if let Some(tid) = new.tournament_id {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tournaments WHERE id = $1 AND user_id = $2)",
        )
        .bind(tid)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;
        if !owned {
            return Err(AppError::not_found("tournament not found or unauthorized"));
        }
    }

    if new.match_type == MatchType::OneVsOne {
        let purged = sqlx::query(
            "DELETE FROM matches WHERE user_id = $1 AND type = '1v1' AND status = 'pending'",
        )
        .bind(owner)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if purged > 0 {
            log::info!("discarded {purged} unfinished 1v1 match(es) of user {owner}");
        }
    }

    let match_id = insert_match(
        &mut tx,
        owner,
        new.match_type,
        MatchStatus::Pending,
        new.tournament_id,
        new.round,
    )
    .await?;
    for player in &new.players {
        insert_participant(&mut tx, match_id, *player).await?;
    }

    tx.commit().await?;
    log::info!(
        "user {owner} created {} match {match_id}",
        new.match_type.as_str()
    );
    Ok(match_id)
}

/// Record scores and the winner of a match, crediting wins and losses the
/// first time a winner is declared.
pub async fn finalize_match(
    db: &SqlitePool,
    match_id: MatchId,
    requester: UserId,
    winner_id: PlayerId,
    players: &[FinalScore],
) -> AppResult<()> {
    if !players.iter().any(|p| p.player_id == winner_id) {
        return Err(AppError::validation("winner must be a participant"));
    }

    let mut tx = begin_write(db).await?;

    let owner: Option<UserId> = sqlx::query_scalar("SELECT user_id FROM matches WHERE id = $1")
        .bind(match_id)
        .fetch_optional(&mut *tx)
        .await?;
    match owner {
        None => return Err(AppError::not_found(format!("match {match_id} not found"))),
        Some(owner) if owner != requester => {
            return Err(AppError::Forbidden(format!(
                "match {match_id} belongs to another user"
            )))
        }
        Some(_) => {}
    }

    for p in players {
        let updated = sqlx::query(
            "UPDATE match_players SET score = $1 WHERE match_id = $2 AND player_id = $3",
        )
        .bind(p.score)
        .bind(match_id)
        .bind(p.player_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            return Err(AppError::not_found(format!(
                "player {} is not a participant of match {match_id}",
                p.player_id
            )));
        }
    }

    let recorded: Option<PlayerId> =
        sqlx::query_scalar("SELECT player_id FROM match_winners WHERE match_id = $1")
            .bind(match_id)
            .fetch_optional(&mut *tx)
            .await?;

    match recorded {
        Some(existing) if existing != winner_id => {
            return Err(AppError::conflict(format!(
                "match {match_id} already has winner {existing}"
            )));
        }
        Some(_) => {}
        None => {
            insert_winner(&mut tx, match_id, winner_id).await?;

            sqlx::query("UPDATE players SET wins = wins + 1 WHERE id = $1")
                .bind(winner_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "UPDATE players SET losses = losses + 1
                  WHERE id IN (SELECT player_id FROM match_players
                                WHERE match_id = $1 AND player_id <> $2)",
            )
            .bind(match_id)
            .bind(winner_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    sqlx::query("UPDATE matches SET status = 'finished' WHERE id = $1")
        .bind(match_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    log::info!("match {match_id} finalized, winner {winner_id}");
    Ok(())
}

pub async fn delete_match(db: &SqlitePool, match_id: MatchId, requester: UserId) -> AppResult<()> {
    let rows = sqlx::query("DELETE FROM matches WHERE id = $1 AND user_id = $2")
        .bind(match_id)
        .bind(requester)
        .execute(db)
        .await?
        .rows_affected();

    if rows == 0 {
        return Err(AppError::not_found("match not found or unauthorized"));
    }
    Ok(())
}

pub async fn get_match(db: &SqlitePool, match_id: MatchId) -> AppResult<MatchView> {
    let mut conn = db.acquire().await?;
    let filter = MatchFilter {
        match_id: Some(match_id),
        ..Default::default()
    };
    fetch_match_views(&mut conn, &filter, false)
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found(format!("match {match_id} not found")))
}

/// The caller's matches, newest first.
pub async fn list_matches(
    db: &SqlitePool,
    owner: UserId,
    player_id: Option<PlayerId>,
) -> AppResult<Vec<MatchView>> {
    let mut conn = db.acquire().await?;
    let filter = MatchFilter {
        user_id: Some(owner),
        player_id,
        ..Default::default()
    };
    fetch_match_views(&mut conn, &filter, true).await
}

/// Load matches with their participants and winners attached.
pub(crate) async fn fetch_match_views(
    conn: &mut SqliteConnection,
    filter: &MatchFilter,
    newest_first: bool,
) -> AppResult<Vec<MatchView>> {
    let order = if newest_first { "DESC" } else { "ASC" };
    let matches_sql = format!(
        concat!(
            "SELECT m.id, m.user_id, m.type, m.status, m.tournament_id, m.round,
                    m.created_at, w.player_id AS winner_id
               FROM matches m
               LEFT JOIN match_winners w ON w.match_id = m.id
              WHERE ",
            match_filter!(),
            " ORDER BY m.id {}"
        ),
        order
    );
    let rows = sqlx::query_as::<_, MatchRow>(&matches_sql)
        .bind(filter.match_id)
        .bind(filter.tournament_id)
        .bind(filter.round)
        .bind(filter.user_id)
        .bind(filter.player_id)
        .fetch_all(&mut *conn)
        .await?;

    let participants = sqlx::query_as::<_, ParticipantRow>(concat!(
        "SELECT mp.match_id, mp.player_id, mp.score
           FROM match_players mp
           JOIN matches m ON m.id = mp.match_id
          WHERE ",
        match_filter!(),
        " ORDER BY mp.id"
    ))
    .bind(filter.match_id)
    .bind(filter.tournament_id)
    .bind(filter.round)
    .bind(filter.user_id)
    .bind(filter.player_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_match: HashMap<MatchId, Vec<ParticipantView>> = HashMap::new();
    for p in participants {
        by_match.entry(p.match_id).or_default().push(ParticipantView {
            player_id: p.player_id,
            score: p.score,
        });
    }

    Ok(rows
        .into_iter()
        .map(|m| MatchView {
            players: by_match.remove(&m.id).unwrap_or_default(),
            match_id: m.id,
            match_type: m.match_type,
            status: m.status,
            tournament_id: m.tournament_id,
            round: m.round,
            date: m.created_at,
            winner_id: m.winner_id,
        })
        .collect())
}

pub(crate) async fn insert_match(
    conn: &mut SqliteConnection,
    owner: UserId,
    match_type: MatchType,
    status: MatchStatus,
    tournament_id: Option<TournamentId>,
    round: Option<i64>,
) -> AppResult<MatchId> {
    Ok(sqlx::query_scalar(
        "INSERT INTO matches (user_id, type, status, tournament_id, round, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(owner)
    .bind(match_type)
    .bind(status)
    .bind(tournament_id)
    .bind(round)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?)
}

pub(crate) async fn insert_participant(
    conn: &mut SqliteConnection,
    match_id: MatchId,
    player_id: PlayerId,
) -> AppResult<()> {
    sqlx::query("INSERT INTO match_players (match_id, player_id) VALUES ($1, $2)")
        .bind(match_id)
        .bind(player_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub(crate) async fn insert_winner(
    conn: &mut SqliteConnection,
    match_id: MatchId,
    player_id: PlayerId,
) -> AppResult<()> {
    sqlx::query("INSERT INTO match_winners (match_id, player_id) VALUES ($1, $2)")
        .bind(match_id)
        .bind(player_id)
        .execute(conn)
        .await?;
    Ok(())
}
