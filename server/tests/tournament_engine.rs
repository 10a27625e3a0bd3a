//! Tournament lifecycle: seeding, advancement and completion.

mod common;

use pong_server::{
    chain::ChainRecorder,
    db::{
        match_repo::{self, FinalScore},
        models::MatchView,
        tournament_repo::{self, Advancement},
    },
    error::AppError,
    game::types::{MatchStatus, MatchType, PlayerId, TournamentStatus, UserId},
};
use sqlx::SqlitePool;

/// Declare the first listed participant the winner of every unplayed match.
async fn play_all(db: &SqlitePool, owner: UserId, matches: &[MatchView]) -> Vec<PlayerId> {
    let mut winners = Vec::new();
    for m in matches.iter().filter(|m| m.winner_id.is_none()) {
        let winner = m.players[0].player_id;
        let scores: Vec<FinalScore> = m
            .players
            .iter()
            .map(|p| FinalScore {
                player_id: p.player_id,
                score: if p.player_id == winner { 11 } else { 6 },
            })
            .collect();
        match_repo::finalize_match(db, m.match_id, owner, winner, &scores)
            .await
            .unwrap();
        winners.push(winner);
    }
    winners
}

#[tokio::test]
async fn three_player_bracket_runs_to_completion() {
    let db = common::pool().await;
    let owner = common::user(&db, "alice").await;
    let ids = common::players(&db, owner, &["A", "B", "C"]).await;
    let recorder = ChainRecorder::Disabled;

    let t = tournament_repo::create_tournament(&db, owner, "Spring Cup", &ids)
        .await
        .unwrap();
    assert_eq!(t.status, TournamentStatus::Pending);
    assert_eq!(t.current_round, 0);
    assert_eq!(t.matches.len(), 2);
    assert!(t.matches.iter().all(|m| m.match_type == MatchType::Tournament));
    assert!(t.matches.iter().all(|m| m.round == Some(0)));

    let bye = t.matches.iter().find(|m| m.players.len() == 1).expect("bye match");
    let duel = t.matches.iter().find(|m| m.players.len() == 2).expect("real match");
    let bye_player = bye.players[0].player_id;
    assert_eq!(bye.winner_id, Some(bye_player));
    assert_eq!(bye.status, MatchStatus::Finished);

    // byes are not games: no counters moved
    let p = common::player(&db, bye_player).await;
    assert_eq!((p.wins, p.losses), (0, 0));

    let round0_winner = play_all(&db, owner, std::slice::from_ref(duel)).await[0];

    let round1 = match tournament_repo::advance_tournament(&db, &recorder, t.id, owner)
        .await
        .unwrap()
    {
        Advancement::Advanced { round, matches } => {
            assert_eq!(round, 1);
            matches
        }
        other => panic!("expected a new round, got {other:?}"),
    };
    assert_eq!(round1.len(), 1);
    let mut finalists: Vec<_> = round1[0].players.iter().map(|p| p.player_id).collect();
    finalists.sort();
    let mut expected = vec![round0_winner, bye_player];
    expected.sort();
    assert_eq!(finalists, expected);

    let champion = play_all(&db, owner, &round1).await[0];
    let matches_before = common::count(&db, "matches").await;

    match tournament_repo::advance_tournament(&db, &recorder, t.id, owner)
        .await
        .unwrap()
    {
        Advancement::Finished { round, winner_id } => {
            assert_eq!(round, 2);
            assert_eq!(winner_id, champion);
        }
        other => panic!("expected the tournament to finish, got {other:?}"),
    }
    assert_eq!(common::count(&db, "matches").await, matches_before);

    let done = tournament_repo::get_tournament(&db, t.id).await.unwrap();
    assert_eq!(done.status, TournamentStatus::Finished);
    assert_eq!(done.winner_id, Some(champion));
    assert_eq!(done.current_round, 2);
}

#[tokio::test]
async fn advancing_needs_every_match_played() {
    let db = common::pool().await;
    let owner = common::user(&db, "alice").await;
    let ids = common::players(&db, owner, &["A", "B", "C", "D"]).await;
    let recorder = ChainRecorder::Disabled;

    let t = tournament_repo::create_tournament(&db, owner, "Gate", &ids).await.unwrap();
    assert_eq!(t.matches.len(), 2);
    play_all(&db, owner, &t.matches[..1]).await;

    let err = tournament_repo::advance_tournament(&db, &recorder, t.id, owner)
        .await
        .unwrap_err();
    match err {
        AppError::NotFound(msg) => assert!(msg.contains(&t.matches[1].match_id.to_string())),
        other => panic!("expected NotFound, got {other:?}"),
    }

    // the failed attempt did not move the round counter
    let after = tournament_repo::get_tournament(&db, t.id).await.unwrap();
    assert_eq!(after.current_round, 0);

    play_all(&db, owner, &t.matches[1..]).await;
    assert!(matches!(
        tournament_repo::advance_tournament(&db, &recorder, t.id, owner).await,
        Ok(Advancement::Advanced { round: 1, .. })
    ));
    let after = tournament_repo::get_tournament(&db, t.id).await.unwrap();
    assert_eq!(after.current_round, 1);
}

#[tokio::test]
async fn finished_tournament_is_left_alone() {
    let db = common::pool().await;
    let owner = common::user(&db, "alice").await;
    let ids = common::players(&db, owner, &["A", "B"]).await;
    let recorder = ChainRecorder::Disabled;

    let t = tournament_repo::create_tournament(&db, owner, "Duel", &ids).await.unwrap();
    let champion = play_all(&db, owner, &t.matches).await[0];
    tournament_repo::advance_tournament(&db, &recorder, t.id, owner)
        .await
        .unwrap();

    for _ in 0..2 {
        let err = tournament_repo::advance_tournament(&db, &recorder, t.id, owner)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyFinished { winner_id: Some(w) } if w == champion));
    }

    let done = tournament_repo::get_tournament(&db, t.id).await.unwrap();
    assert_eq!(done.current_round, 1);
    assert_eq!(done.winner_id, Some(champion));
}

#[tokio::test]
async fn eight_players_take_three_rounds() {
    let db = common::pool().await;
    let owner = common::user(&db, "alice").await;
    let ids = common::players(&db, owner, &["A", "B", "C", "D", "E", "F", "G", "H"]).await;
    let recorder = ChainRecorder::Disabled;

    let t = tournament_repo::create_tournament(&db, owner, "Octo", &ids).await.unwrap();
    assert_eq!(t.matches.len(), 4);
    assert!(t.matches.iter().all(|m| m.players.len() == 2));

    let mut current = t.matches;
    let mut sizes = Vec::new();
    loop {
        play_all(&db, owner, &current).await;
        match tournament_repo::advance_tournament(&db, &recorder, t.id, owner)
            .await
            .unwrap()
        {
            Advancement::Advanced { matches, .. } => {
                sizes.push(matches.len());
                current = matches;
            }
            Advancement::Finished { round, .. } => {
                assert_eq!(round, 3);
                break;
            }
        }
    }
    assert_eq!(sizes, vec![2, 1]);

    // 7 games played: every player lost at most once, champion won 3
    let mut wins = 0;
    let mut losses = 0;
    for id in &ids {
        let p = common::player(&db, *id).await;
        assert!(p.losses <= 1);
        wins += p.wins;
        losses += p.losses;
    }
    assert_eq!((wins, losses), (7, 7));
}

#[tokio::test]
async fn creation_validates_input() {
    let db = common::pool().await;
    let owner = common::user(&db, "alice").await;
    let ids = common::players(&db, owner, &["A", "B", "C"]).await;

    let err = tournament_repo::create_tournament(&db, owner, "Ghosts", &[ids[0], 9_999, ids[1]])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m.contains("9999")));

    assert!(matches!(
        tournament_repo::create_tournament(&db, owner, "Solo", &ids[..1]).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        tournament_repo::create_tournament(&db, owner, "Twice", &[ids[0], ids[0]]).await,
        Err(AppError::Validation(_))
    ));

    tournament_repo::create_tournament(&db, owner, "Cup", &ids).await.unwrap();
    let before = common::count(&db, "matches").await;
    assert!(matches!(
        tournament_repo::create_tournament(&db, owner, "Cup", &ids).await,
        Err(AppError::Conflict(_))
    ));
    assert_eq!(common::count(&db, "tournaments").await, 1);
    assert_eq!(common::count(&db, "matches").await, before);
}

#[tokio::test]
async fn only_the_owner_may_advance_or_delete() {
    let db = common::pool().await;
    let owner = common::user(&db, "alice").await;
    let intruder = common::user(&db, "mallory").await;
    let ids = common::players(&db, owner, &["A", "B"]).await;
    let recorder = ChainRecorder::Disabled;

    let t = tournament_repo::create_tournament(&db, owner, "Mine", &ids).await.unwrap();
    play_all(&db, owner, &t.matches).await;

    assert!(matches!(
        tournament_repo::advance_tournament(&db, &recorder, t.id, intruder).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        tournament_repo::delete_tournament(&db, t.id, intruder).await,
        Err(AppError::NotFound(_))
    ));
    let still = tournament_repo::get_tournament(&db, t.id).await.unwrap();
    assert_eq!(still.current_round, 0);

    tournament_repo::delete_tournament(&db, t.id, owner).await.unwrap();
    assert_eq!(common::count(&db, "matches").await, 0);
    assert_eq!(common::count(&db, "match_players").await, 0);
    assert_eq!(common::count(&db, "match_winners").await, 0);
    assert!(matches!(
        tournament_repo::get_tournament(&db, t.id).await,
        Err(AppError::NotFound(_))
    ));
}
