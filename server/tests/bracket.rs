//! Properties of the bracket seeding routine.

use std::collections::HashSet;

use pong_server::game::bracket::{bye_count, generate_matchups};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn every_player_appears_exactly_once() {
    for n in 3..=40i64 {
        for seed in 0..5 {
            let players: Vec<i64> = (1..=n).collect();
            let bracket = generate_matchups(&players, &mut StdRng::seed_from_u64(seed));

            assert_eq!(
                bracket.matchups.len() * 2 + bracket.byes.len(),
                n as usize,
                "n = {n}"
            );
            assert!(bracket.matchups.iter().all(|m| m.away.is_some()));

            let mut seen = HashSet::new();
            for m in &bracket.matchups {
                assert!(seen.insert(m.home));
                assert!(seen.insert(m.away.unwrap()));
            }
            for b in &bracket.byes {
                assert!(seen.insert(*b));
            }
            assert_eq!(seen, players.iter().copied().collect::<HashSet<_>>());
        }
    }
}

#[test]
fn bye_count_pads_to_power_of_two() {
    assert_eq!(bye_count(3), 1);
    assert_eq!(bye_count(5), 3);
    assert_eq!(bye_count(6), 2);
    assert_eq!(bye_count(7), 1);
    assert_eq!(bye_count(12), 4);
    for n in [2usize, 4, 8, 16, 32, 64] {
        assert_eq!(bye_count(n), 0, "n = {n}");
    }
}

#[test]
fn generated_byes_match_formula() {
    for n in 2..=33usize {
        let players: Vec<i64> = (0..n as i64).collect();
        let bracket = generate_matchups(&players, &mut StdRng::seed_from_u64(7));
        let expected = (1usize << (n as f64).log2().ceil() as u32) - n;
        assert_eq!(bracket.byes.len(), expected, "n = {n}");
    }
}

#[test]
fn three_players_give_one_match_and_one_bye() {
    let bracket = generate_matchups(&[10, 20, 30], &mut StdRng::seed_from_u64(3));
    assert_eq!(bracket.matchups.len(), 1);
    assert_eq!(bracket.byes.len(), 1);
    assert_eq!(bracket.champion(), None);
}

#[test]
fn shuffle_varies_with_seed() {
    let players: Vec<i64> = (1..=16).collect();
    let orders: HashSet<Vec<i64>> = (0..20)
        .map(|seed| {
            generate_matchups(&players, &mut StdRng::seed_from_u64(seed))
                .matchups
                .iter()
                .flat_map(|m| [m.home, m.away.unwrap()])
                .collect()
        })
        .collect();
    assert!(orders.len() > 1, "seeding should not be fixed");
}
