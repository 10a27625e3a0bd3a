//! Tournament engine: bracket creation, round advancement and completion.
//!
//! Every mutation runs in a single transaction, so a tournament either has
//! all of a round's matches or none of them.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    chain::{ChainRecorder, TournamentRecord},
    db::{
        begin_write,
        match_repo::{self, MatchFilter},
        models::{MatchView, TournamentRow, TournamentView},
    },
    error::{conflict_on_unique, AppError, AppResult},
    game::{
        bracket::{generate_matchups, Bracket},
        types::{MatchId, MatchStatus, MatchType, PlayerId, TournamentId, TournamentStatus, UserId},
    },
};

const TOURNAMENT_COLUMNS: &str = "id, user_id, name, status, current_round, winner_id, created_at";

/// Outcome of a successful [`advance_tournament`] call.
#[derive(Debug, Clone)]
pub enum Advancement {
    /// A new round was seeded.
    Advanced { round: i64, matches: Vec<MatchView> },
    /// One player was left; the tournament is over.
    Finished { round: i64, winner_id: PlayerId },
}

pub async fn create_tournament(
    db: &SqlitePool,
    owner: UserId,
    name: &str,
    player_ids: &[PlayerId],
) -> AppResult<TournamentView> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("tournament name is required"));
    }
    if player_ids.len() < 2 {
        return Err(AppError::validation(
            "a tournament needs at least 2 players",
        ));
    }
    let mut seen = HashSet::with_capacity(player_ids.len());
    if let Some(dup) = player_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::validation(format!("player {dup} listed twice")));
    }

    let mut tx = begin_write(db).await?;

    for id in player_ids {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM players WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::validation(format!("Invalid player id: {id}")));
        }
    }

    let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tournaments WHERE name = $1)")
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;
    if taken {
        return Err(AppError::conflict(format!(
            "tournament name '{name}' already taken"
        )));
    }

    let tournament_id: TournamentId = sqlx::query_scalar(
        "INSERT INTO tournaments (user_id, name, created_at) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(owner)
    .bind(name)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, "tournament name already taken"))?;

    let bracket = generate_matchups(player_ids, &mut rand::rng());
    seed_round(&mut tx, owner, tournament_id, 0, &bracket).await?;

    tx.commit().await?;
    log::info!(
        "user {owner} created tournament {tournament_id} '{name}' with {} players ({} byes)",
        player_ids.len(),
        bracket.byes.len()
    );

    get_tournament(db, tournament_id).await
}

/// Close the current round and seed the next one from its winners, or
/// crown the champion when a single winner remains.
///
/// The first statement claims the round bump on the tournament row, so two
/// concurrent calls cannot both advance the same round: the loser of the
/// race sees the freshly seeded (unplayed) round and fails.
pub async fn advance_tournament(
    db: &SqlitePool,
    recorder: &ChainRecorder,
    tournament_id: TournamentId,
    requester: UserId,
) -> AppResult<Advancement> {
    let mut tx = begin_write(db).await?;

    let claimed: Option<i64> = sqlx::query_scalar(
        "UPDATE tournaments SET current_round = current_round + 1
          WHERE id = $1 AND user_id = $2 AND status = 'pending'
      RETURNING current_round",
    )
    .bind(tournament_id)
    .bind(requester)
    .fetch_optional(&mut *tx)
    .await?;

    let next_round = match claimed {
        Some(round) => round,
        None => {
            let row: Option<(TournamentStatus, Option<PlayerId>)> = sqlx::query_as(
                "SELECT status, winner_id FROM tournaments WHERE id = $1 AND user_id = $2",
            )
            .bind(tournament_id)
            .bind(requester)
            .fetch_optional(&mut *tx)
            .await?;
            return Err(match row {
                Some((TournamentStatus::Finished, winner_id)) => {
                    AppError::AlreadyFinished { winner_id }
                }
                _ => AppError::not_found("tournament not found or unauthorized"),
            });
        }
    };
    let round = next_round - 1;

    let results: Vec<(MatchId, Option<PlayerId>)> = sqlx::query_as(
        "SELECT m.id, w.player_id
           FROM matches m
           LEFT JOIN match_winners w ON w.match_id = m.id
          WHERE m.tournament_id = $1 AND m.round = $2
          ORDER BY m.id",
    )
    .bind(tournament_id)
    .bind(round)
    .fetch_all(&mut *tx)
    .await?;

    if results.is_empty() {
        return Err(AppError::not_found(format!(
            "no matches found for round {round}"
        )));
    }

    let winners = results
        .iter()
        .map(|(match_id, winner)| {
            winner.ok_or_else(|| {
                AppError::not_found(format!("match {match_id} has not been played yet"))
            })
        })
        .collect::<AppResult<Vec<PlayerId>>>()?;

    let bracket = generate_matchups(&winners, &mut rand::rng());

    if let Some(champion) = bracket.champion() {
        sqlx::query("UPDATE tournaments SET status = 'finished', winner_id = $1 WHERE id = $2")
            .bind(champion)
            .bind(tournament_id)
            .execute(&mut *tx)
            .await?;

        let record = tournament_record(&mut tx, tournament_id, champion).await?;
        tx.commit().await?;

        log::info!("tournament {tournament_id} finished, champion player {champion}");
        recorder.spawn_record(record);

        return Ok(Advancement::Finished {
            round: next_round,
            winner_id: champion,
        });
    }

    seed_round(&mut tx, requester, tournament_id, next_round, &bracket).await?;
    tx.commit().await?;
    log::info!(
        "tournament {tournament_id} advanced to round {next_round} ({} matches, {} byes)",
        bracket.matchups.len(),
        bracket.byes.len()
    );

    let mut conn = db.acquire().await?;
    let matches = match_repo::fetch_match_views(
        &mut conn,
        &MatchFilter {
            tournament_id: Some(tournament_id),
            round: Some(next_round),
            ..Default::default()
        },
        false,
    )
    .await?;

    Ok(Advancement::Advanced {
        round: next_round,
        matches,
    })
}

/// Delete a tournament with all of its matches.
pub async fn delete_tournament(
    db: &SqlitePool,
    tournament_id: TournamentId,
    requester: UserId,
) -> AppResult<()> {
    let rows = sqlx::query("DELETE FROM tournaments WHERE id = $1 AND user_id = $2")
        .bind(tournament_id)
        .bind(requester)
        .execute(db)
        .await?
        .rows_affected();

    if rows == 0 {
        return Err(AppError::not_found("tournament not found or unauthorized"));
    }
    log::info!("tournament {tournament_id} deleted by user {requester}");
    Ok(())
}

pub async fn get_tournament(db: &SqlitePool, tournament_id: TournamentId) -> AppResult<TournamentView> {
    let mut conn = db.acquire().await?;
    let row = sqlx::query_as::<_, TournamentRow>(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1"
    ))
    .bind(tournament_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found(format!("tournament {tournament_id} not found")))?;

    attach_matches(&mut conn, row).await
}

/// All tournaments, newest first; optionally only one user's.
pub async fn list_tournaments(db: &SqlitePool, owner: Option<UserId>) -> AppResult<Vec<TournamentView>> {
    let mut conn = db.acquire().await?;
    let rows = sqlx::query_as::<_, TournamentRow>(&format!(
        "SELECT {TOURNAMENT_COLUMNS} FROM tournaments
          WHERE ($1 IS NULL OR user_id = $1)
          ORDER BY id DESC"
    ))
    .bind(owner)
    .fetch_all(&mut *conn)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(attach_matches(&mut conn, row).await?);
    }
    Ok(out)
}

async fn attach_matches(conn: &mut SqliteConnection, row: TournamentRow) -> AppResult<TournamentView> {
    let matches = match_repo::fetch_match_views(
        conn,
        &MatchFilter {
            tournament_id: Some(row.id),
            ..Default::default()
        },
        false,
    )
    .await?;

    Ok(TournamentView {
        id: row.id,
        user_id: row.user_id,
        name: row.name,
        status: row.status,
        current_round: row.current_round,
        winner_id: row.winner_id,
        created_at: row.created_at,
        matches,
    })
}

/// Insert one round's matches: a two-player match per matchup, and a
/// single-player match with its winner already recorded per bye. Byes do
/// not touch win/loss counters.
async fn seed_round(
    conn: &mut SqliteConnection,
    owner: UserId,
    tournament_id: TournamentId,
    round: i64,
    bracket: &Bracket,
) -> AppResult<()> {
    for matchup in &bracket.matchups {
        let match_id = match_repo::insert_match(
            conn,
            owner,
            MatchType::Tournament,
            MatchStatus::Pending,
            Some(tournament_id),
            Some(round),
        )
        .await?;
        match_repo::insert_participant(conn, match_id, matchup.home).await?;
        if let Some(away) = matchup.away {
            match_repo::insert_participant(conn, match_id, away).await?;
        }
    }

    for &player in &bracket.byes {
        let match_id = match_repo::insert_match(
            conn,
            owner,
            MatchType::Tournament,
            MatchStatus::Finished,
            Some(tournament_id),
            Some(round),
        )
        .await?;
        match_repo::insert_participant(conn, match_id, player).await?;
        match_repo::insert_winner(conn, match_id, player).await?;
    }
    Ok(())
}

async fn tournament_record(
    conn: &mut SqliteConnection,
    tournament_id: TournamentId,
    champion: PlayerId,
) -> AppResult<TournamentRecord> {
    let players: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT p.display_name
           FROM match_players mp
           JOIN matches m ON m.id = mp.match_id
           JOIN players p ON p.id = mp.player_id
          WHERE m.tournament_id = $1
          ORDER BY p.display_name",
    )
    .bind(tournament_id)
    .fetch_all(&mut *conn)
    .await?;

    let winner: String = sqlx::query_scalar("SELECT display_name FROM players WHERE id = $1")
        .bind(champion)
        .fetch_one(&mut *conn)
        .await?;

    Ok(TournamentRecord {
        tournament_id,
        players,
        winner,
    })
}
