use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_with::skip_serializing_none;
use sqlx::FromRow;

use crate::game::types::{
    MatchId, MatchStatus, MatchType, PlayerId, TournamentId, TournamentStatus, UserId,
};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub online: bool,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What other users get to see.
#[skip_serializing_none]
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub online: bool,
    pub avatar: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        PublicUser {
            id: u.id,
            username: u.username,
            online: u.online,
            avatar: u.avatar,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub user_id: UserId,
    pub display_name: String,
    pub wins: i64,
    pub losses: i64,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TournamentRow {
    pub id: TournamentId,
    pub user_id: UserId,
    pub name: String,
    pub status: TournamentStatus,
    pub current_round: i64,
    pub winner_id: Option<PlayerId>,
    pub created_at: DateTime<Utc>,
}

/// One `matches` row joined with its (optional) winner.
#[derive(Debug, Clone, FromRow)]
pub struct MatchRow {
    pub id: MatchId,
    pub user_id: UserId,
    #[sqlx(rename = "type")]
    pub match_type: MatchType,
    pub status: MatchStatus,
    pub tournament_id: Option<TournamentId>,
    pub round: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub winner_id: Option<PlayerId>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRow {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantView {
    pub player_id: PlayerId,
    pub score: i64,
}

/// A match as returned to callers.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub match_id: MatchId,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub status: MatchStatus,
    pub tournament_id: Option<TournamentId>,
    pub round: Option<i64>,
    pub date: DateTime<Utc>,
    pub winner_id: Option<PlayerId>,
    pub players: Vec<ParticipantView>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct TournamentView {
    pub id: TournamentId,
    pub user_id: UserId,
    pub name: String,
    pub status: TournamentStatus,
    pub current_round: i64,
    pub winner_id: Option<PlayerId>,
    pub created_at: DateTime<Utc>,
    pub matches: Vec<MatchView>,
}
