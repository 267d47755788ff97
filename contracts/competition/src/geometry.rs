//! Nearest-point search over the bet ledger.

use soroban_sdk::{Env, Vec};

use crate::Bet;

/// Integer square root (floor), Newton iteration.
fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + n / x) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// `sqrt(dx² + dy²)` rounded to the nearest integer.
pub(crate) fn rounded_distance(ax: u32, ay: u32, bx: u32, by: u32) -> u64 {
    let dx = u64::from(ax.abs_diff(bx));
    let dy = u64::from(ay.abs_diff(by));
    let sq = dx * dx + dy * dy;
    let root = isqrt(sq);
    if sq - root * root > root {
        root + 1
    } else {
        root
    }
}

/// Indexes of every bet at the minimum rounded distance from the center.
pub(crate) fn nearest_indexes(env: &Env, bets: &Vec<Bet>, cx: u32, cy: u32) -> Vec<u32> {
    let mut best: Option<u64> = None;
    let mut out = Vec::new(env);
    for (i, bet) in bets.iter().enumerate() {
        let d = rounded_distance(bet.x, bet.y, cx, cy);
        match best {
            Some(b) if d > b => {}
            Some(b) if d == b => out.push_back(i as u32),
            _ => {
                best = Some(d);
                out = Vec::new(env);
                out.push_back(i as u32);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{testutils::Address as _, vec, Address};

    fn bet(env: &Env, x: u32, y: u32) -> Bet {
        Bet {
            player: Address::generate(env),
            prize_id: 1,
            x,
            y,
        }
    }

    #[test]
    fn isqrt_floors() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(24), 4);
        assert_eq!(isqrt(25), 5);
        assert_eq!(isqrt(50_000_000), 7071);
    }

    #[test]
    fn distance_rounds_to_nearest() {
        assert_eq!(rounded_distance(0, 0, 3, 4), 5);
        // sqrt(2) = 1.41
        assert_eq!(rounded_distance(0, 0, 1, 1), 1);
        // sqrt(5) = 2.24
        assert_eq!(rounded_distance(0, 0, 1, 2), 2);
        // sqrt(8) = 2.83
        assert_eq!(rounded_distance(2, 2, 0, 0), 3);
        // sqrt(13) = 3.61
        assert_eq!(rounded_distance(0, 0, 2, 3), 4);
        assert_eq!(rounded_distance(0, 0, 0, 3), 3);
        assert_eq!(rounded_distance(0, 0, 5000, 5000), 7071);
    }

    #[test]
    fn ties_are_kept() {
        let env = Env::default();
        let bets = vec![
            &env,
            bet(&env, 2503, 2504),
            bet(&env, 2497, 2496),
            bet(&env, 2509, 2500),
        ];
        assert_eq!(nearest_indexes(&env, &bets, 2500, 2500), vec![&env, 0u32, 1]);
    }

    #[test]
    fn later_closer_bet_replaces_earlier() {
        let env = Env::default();
        let bets = vec![
            &env,
            bet(&env, 100, 100),
            bet(&env, 120, 120),
            bet(&env, 2500, 2501),
        ];
        assert_eq!(nearest_indexes(&env, &bets, 2500, 2500), vec![&env, 2u32]);
    }

    #[test]
    fn empty_ledger_has_no_candidates() {
        let env = Env::default();
        let bets: Vec<Bet> = Vec::new(&env);
        assert_eq!(nearest_indexes(&env, &bets, 1, 1).len(), 0);
    }
}
