//! Simultaneous writers against a WAL database file with several pooled
//! connections.

mod common;

use pong_server::{
    chain::ChainRecorder,
    config::settings,
    db::{
        match_repo::{self, FinalScore, NewMatch},
        player_repo,
        tournament_repo::{self, Advancement},
    },
    error::AppError,
    game::types::MatchType,
};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn finalizing_matches_that_share_a_player() {
    let fx = common::file_pool().await;
    let db = &fx.pool;
    let host = common::user(db, "host").await;
    let ids = common::players(db, host, &["Hub", "B", "C", "D", "E", "F", "G", "H"]).await;
    let hub = ids[0];

    // one owner per match, since a new 1v1 discards the owner's pending ones
    let mut games = Vec::new();
    for (i, &opponent) in ids[1..].iter().enumerate() {
        let owner = common::user(db, &format!("owner{i}")).await;
        let new = NewMatch {
            match_type: MatchType::OneVsOne,
            players: vec![hub, opponent],
            tournament_id: None,
            round: None,
        };
        let match_id = match_repo::create_match(db, owner, new).await.unwrap();
        games.push((owner, match_id, opponent));
    }

    let tasks: Vec<_> = games
        .into_iter()
        .map(|(owner, match_id, opponent)| {
            let db = db.clone();
            tokio::spawn(async move {
                let scores = [
                    FinalScore { player_id: hub, score: 11 },
                    FinalScore { player_id: opponent, score: 5 },
                ];
                match_repo::finalize_match(&db, match_id, owner, hub, &scores).await
            })
        })
        .collect();
    for task in tasks {
        task.await.expect("task panicked").expect("finalize");
    }

    let p = common::player(db, hub).await;
    assert_eq!((p.wins, p.losses), (7, 0));
    for &opponent in &ids[1..] {
        let p = common::player(db, opponent).await;
        assert_eq!((p.wins, p.losses), (0, 1));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tournaments_created_side_by_side() {
    let fx = common::file_pool().await;
    let db = &fx.pool;
    let owner = common::user(db, "alice").await;
    let ids = common::players(db, owner, &["A", "B", "C", "D", "E"]).await;

    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let db = db.clone();
            let ids = ids.clone();
            tokio::spawn(async move {
                tournament_repo::create_tournament(&db, owner, &format!("Cup {i}"), &ids).await
            })
        })
        .collect();
    for task in tasks {
        let t = task.await.expect("task panicked").expect("create");
        assert_eq!(t.matches.len(), 4);
    }

    assert_eq!(common::count(db, "tournaments").await, 6);
    assert_eq!(common::count(db, "matches").await, 24);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn player_limit_holds_under_concurrent_creation() {
    let fx = common::file_pool().await;
    let db = &fx.pool;
    let owner = common::user(db, "alice").await;
    let limit = settings().max_players_per_user;

    let tasks: Vec<_> = (0..limit + 4)
        .map(|i| {
            let db = db.clone();
            tokio::spawn(async move { player_repo::create_player(&db, owner, &format!("P{i}")).await })
        })
        .collect();

    let mut created = 0;
    let mut refused = 0;
    for task in tasks {
        match task.await.expect("task panicked") {
            Ok(_) => created += 1,
            Err(AppError::Validation(_)) => refused += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!((created, refused), (limit, 4));
    assert_eq!(common::count(db, "players").await, limit);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_advances_do_not_double_advance() {
    let fx = common::file_pool().await;
    let db = &fx.pool;
    let owner = common::user(db, "alice").await;
    let ids = common::players(db, owner, &["A", "B", "C", "D"]).await;

    let t = tournament_repo::create_tournament(db, owner, "Race", &ids).await.unwrap();
    for m in &t.matches {
        let winner = m.players[0].player_id;
        let scores: Vec<FinalScore> = m
            .players
            .iter()
            .map(|p| FinalScore {
                player_id: p.player_id,
                score: if p.player_id == winner { 11 } else { 4 },
            })
            .collect();
        match_repo::finalize_match(db, m.match_id, owner, winner, &scores)
            .await
            .unwrap();
    }

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let db = db.clone();
            let tid = t.id;
            tokio::spawn(async move {
                tournament_repo::advance_tournament(&db, &ChainRecorder::Disabled, tid, owner).await
            })
        })
        .collect();

    let mut advanced = 0;
    for task in tasks {
        match task.await.expect("task panicked") {
            Ok(Advancement::Advanced { round, .. }) => {
                assert_eq!(round, 1);
                advanced += 1;
            }
            // the loser of the race finds round 1 unplayed
            Err(AppError::NotFound(_)) => {}
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(advanced, 1);

    let after = tournament_repo::get_tournament(db, t.id).await.unwrap();
    assert_eq!(after.current_round, 1);
    assert_eq!(
        after.matches.iter().filter(|m| m.round == Some(1)).count(),
        1
    );
}
