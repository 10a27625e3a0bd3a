use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type PlayerId = i64;
pub type MatchId = i64;
pub type TournamentId = i64;

/// Standalone game or one slot of a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum MatchType {
    #[serde(rename = "1v1")]
    #[sqlx(rename = "1v1")]
    OneVsOne,
    #[serde(rename = "tournament")]
    #[sqlx(rename = "tournament")]
    Tournament,
}

/// Match life-cycle: pending until a winner is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Finished,
}

/// Tournament life-cycle. `Pending → Finished` happens exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TournamentStatus {
    Pending,
    Finished,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::OneVsOne => "1v1",
            MatchType::Tournament => "tournament",
        }
    }
}
