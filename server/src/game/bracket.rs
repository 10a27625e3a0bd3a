//! Single-elimination bracket seeding.
//!
//! The same routine seeds round 0 from the entrant list and every later
//! round from the previous round's winners.

use rand::{seq::SliceRandom, Rng};

use crate::game::types::PlayerId;

/// Two players meeting in one round. `away` is only empty when a single
/// player is left, i.e. the bracket has produced its champion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matchup {
    pub home: PlayerId,
    pub away: Option<PlayerId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bracket {
    pub matchups: Vec<Matchup>,
    /// Players advancing without playing this round.
    pub byes: Vec<PlayerId>,
}

impl Bracket {
    /// The sole remaining player, if seeding collapsed to one open slot.
    pub fn champion(&self) -> Option<PlayerId> {
        match self.matchups.as_slice() {
            [only] if only.away.is_none() && self.byes.is_empty() => Some(only.home),
            _ => None,
        }
    }
}

/// Byes needed to pad `n` entrants up to the next power of two.
pub fn bye_count(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    n.next_power_of_two() - n
}

/// Shuffle `players` (Fisher–Yates), hand byes to the tail of the shuffled
/// list, and pair the rest in order.
pub fn generate_matchups<R: Rng + ?Sized>(players: &[PlayerId], rng: &mut R) -> Bracket {
    let mut pool = players.to_vec();
    pool.shuffle(rng);

    let byes = pool.split_off(pool.len() - bye_count(pool.len()));
    let matchups = pool
        .chunks(2)
        .map(|pair| Matchup {
            home: pair[0],
            away: pair.get(1).copied(),
        })
        .collect();

    Bracket { matchups, byes }
}
